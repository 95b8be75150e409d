//! The map document schema.
//!
//! Field order in each composite is the binary order the runtime reads.

pub mod material;
pub mod render_unit;
pub mod actor;
pub mod model;
pub mod water;
pub mod light;
pub mod map_chunk;

pub use self::{
    material::Material,
    render_unit::{RenderUnit, MeshSource},
    actor::{Transform, StaticActor},
    model::{ModelEmbedded, ModelImported},
    water::WaterPlane,
    light::LightPoint,
    map_chunk::{MapMetadata, MapChunkBuilder, CURRENT_BIN_VERSION},
};


#[cfg(test)]
fn assert_default_round_trips<T>()
where
    T: map_node::MapNode + Default + PartialEq + std::fmt::Debug,
{
    use map_node::node::from_json;

    let original = T::default();
    let text = serde_json::to_string(&original.to_json()).unwrap();
    let json = serde_json::from_str(&text).unwrap();
    let back: T = from_json(&json).unwrap();
    assert_eq!(back, original, "{} changed through text", std::any::type_name::<T>());

    let mut reset = back;
    reset.set_default();
    assert_eq!(reset, original);
}

#[test]
fn test_every_default_round_trips() {
    use map_geom::{RectMesh, HeightGrid, VertexArray};

    assert_default_round_trips::<Material>();
    assert_default_round_trips::<RectMesh>();
    assert_default_round_trips::<HeightGrid>();
    assert_default_round_trips::<VertexArray>();
    assert_default_round_trips::<RenderUnit>();
    assert_default_round_trips::<Transform>();
    assert_default_round_trips::<StaticActor>();
    assert_default_round_trips::<ModelEmbedded>();
    assert_default_round_trips::<ModelImported>();
    assert_default_round_trips::<WaterPlane>();
    assert_default_round_trips::<LightPoint>();
    assert_default_round_trips::<MapMetadata>();
    assert_default_round_trips::<MapChunkBuilder>();
}
