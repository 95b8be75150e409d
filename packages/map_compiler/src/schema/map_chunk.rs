use super::{
    model::{ModelEmbedded, ModelImported},
    water::WaterPlane,
    light::LightPoint,
};
use map_node::{
    bin::BinWriter,
    error::Result,
    journal::ErrorJournal,
    leaf::IntValue,
    list::UniformList,
    node::Inspect,
    composite,
};


/// Binary format version written by this compiler.
pub const CURRENT_BIN_VERSION: i32 = 1;


composite! {
    pub struct MapMetadata {
        pub bin_version: IntValue = IntValue::new(CURRENT_BIN_VERSION),
    }
    encode = MapMetadata::encode_current;
}

impl MapMetadata {
    /// The artifact is always written in the current format, whatever the
    /// document declared.
    fn encode_current(&self, bin: &mut BinWriter) -> Result<()> {
        bin.write_i32(CURRENT_BIN_VERSION);
        Ok(())
    }
}

impl Inspect for MapMetadata {
    fn fill_report(&self, journal: &mut ErrorJournal) {
        if self.bin_version.get() != CURRENT_BIN_VERSION {
            journal.warn(format!(
                "document declares binary version {}, but version {} will be written",
                self.bin_version.get(),
                CURRENT_BIN_VERSION,
            ));
        }
    }
}


composite! {
    /// Root of a map document.
    pub struct MapChunkBuilder {
        pub metadata: MapMetadata = MapMetadata::default(),
        pub embedded_models: UniformList<ModelEmbedded> = UniformList::new(),
        pub imported_models: UniformList<ModelImported> = UniformList::new(),
        pub water_planes: UniformList<WaterPlane> = UniformList::new(),
        pub point_lights: UniformList<LightPoint> = UniformList::new(),
    }
}

impl MapChunkBuilder {
    /// Validate the whole tree.
    pub fn report(&self) -> ErrorJournal {
        let mut journal = ErrorJournal::new("map");
        self.fill_report(&mut journal);
        journal
    }
}

impl Inspect for MapChunkBuilder {
    fn fill_report(&self, journal: &mut ErrorJournal) {
        journal.inspect_child("metadata", &self.metadata);
        journal.inspect_child("embedded_models", &self.embedded_models);
        journal.inspect_child("imported_models", &self.imported_models);
        journal.inspect_child("water_planes", &self.water_planes);
        journal.inspect_child("point_lights", &self.point_lights);
    }
}


#[test]
fn test_version_mismatch_warns_and_is_overwritten() {
    use map_node::node::{from_json, encode_to_vec};
    use serde_json::json;

    let map: MapChunkBuilder = from_json(&json!({ "metadata": { "bin_version": 0 } })).unwrap();
    let report = map.report();
    assert!(report.has_warn_or_worse());
    assert!(!report.has_error());

    let bytes = encode_to_vec(&map).unwrap();
    assert_eq!(&bytes[..4], &CURRENT_BIN_VERSION.to_le_bytes());
    // four empty lists follow
    assert_eq!(bytes.len(), 4 + 4 * 4);
}
