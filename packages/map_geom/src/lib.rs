//! Geometry for map documents: collision shapes, vertex streams, and the
//! procedural mesh builders that produce them.

#[allow(unused_imports)]
#[macro_use]
extern crate tracing;

pub mod collider;
pub mod mesh;
pub mod rect;
pub mod height_grid;
pub mod vertex_array;

pub use crate::{
    collider::{
        Aabb,
        Sphere,
        Triangle,
        TriangleSoup,
        Collider,
        ColliderKind,
        BoundingVolume,
    },
    mesh::{
        MeshData,
        MeshBuilder,
        bound_meshes,
    },
    rect::RectMesh,
    height_grid::HeightGrid,
    vertex_array::VertexArray,
};
