use super::material::Material;
use map_geom::{
    mesh::{MeshData, MeshBuilder},
    rect::RectMesh,
    height_grid::HeightGrid,
    vertex_array::VertexArray,
};
use map_node::{
    error::Result,
    journal::ErrorJournal,
    node::Inspect,
    variant::Variant,
    composite,
    variant_set,
    err,
};


variant_set! {
    /// Where a render unit's geometry comes from. The binary type index is
    /// the declaration order.
    pub enum MeshSource {
        Rect(RectMesh),
        HeightGrid(HeightGrid),
        VertexArray(VertexArray),
    }
    impl Inspect;
}

impl MeshBuilder for MeshSource {
    fn build_mesh(&self) -> Result<MeshData> {
        match self {
            MeshSource::Rect(rect) => rect.build_mesh(),
            MeshSource::HeightGrid(grid) => grid.build_mesh(),
            MeshSource::VertexArray(array) => array.build_mesh(),
        }
    }
}


composite! {
    /// One mesh drawn with one material.
    pub struct RenderUnit {
        pub mesh: Variant<MeshSource> = Variant::new(RectMesh::default()),
        pub material: Material = Material::default(),
    }
}

impl RenderUnit {
    pub fn build_mesh(&self) -> Result<MeshData> {
        self.mesh
            .get()
            .ok_or_else(|| err!(Unset, "render unit has no mesh"))?
            .build_mesh()
    }
}

impl Inspect for RenderUnit {
    fn fill_report(&self, journal: &mut ErrorJournal) {
        journal.inspect_child("mesh", &self.mesh);
        journal.inspect_child("material", &self.material);
    }
}


#[test]
fn test_default_unit_is_a_rectangle() {
    use map_node::node::MapNode;
    use serde_json::json;

    let unit = RenderUnit::default();
    assert_eq!(unit.mesh.type_index(), Some(0));
    assert_eq!(unit.build_mesh().unwrap().num_vertices(), 6);
    assert_eq!(unit.to_json()["mesh"]["type"], json!(0));

    let mut unit = unit;
    unit.set_json(&json!({
        "mesh": { "type": 1, "data": { "rows": 3, "columns": 3, "heights": "" } },
    })).unwrap();
    let e = unit.build_mesh().unwrap_err();
    assert_eq!(e.kind(), map_node::ErrorKind::Geometry);

    let mut journal = ErrorJournal::new("unit");
    unit.fill_report(&mut journal);
    let titles = journal.children()
        .iter()
        .map(ErrorJournal::title)
        .collect::<Vec<_>>();
    assert_eq!(titles, vec!["mesh", "material"]);
}
