//! Flat vertex streams and the bounding shapes derived from them.

use crate::collider::{
    Aabb,
    Sphere,
    TriangleSoup,
    BoundingVolume,
};
use map_node::{
    error::Result,
    err,
    ensure,
};
use vek::*;


/// Vertex indices of the two triangles a quad is split into.
pub const QUAD_TRIANGULATION: [usize; 6] = [0, 1, 2, 0, 2, 3];

/// Texture coordinates of the six vertices of a triangulated quad whose
/// corners run top-left, bottom-left, bottom-right, top-right.
pub const QUAD_TEXCOORDS: [Vec2<f32>; 6] = [
    Vec2 { x: 0.0, y: 1.0 },
    Vec2 { x: 0.0, y: 0.0 },
    Vec2 { x: 1.0, y: 0.0 },
    Vec2 { x: 0.0, y: 1.0 },
    Vec2 { x: 1.0, y: 0.0 },
    Vec2 { x: 1.0, y: 1.0 },
];

/// Split the quad `p1 p2 p3 p4` into `p1 p2 p3` and `p1 p3 p4`.
pub fn triangulate_quad<T: Copy>(corners: [T; 4]) -> [T; 6] {
    QUAD_TRIANGULATION.map(|i| corners[i])
}

/// Unnormalized face normal of a counter-clockwise triangle.
pub fn triangle_cross(p1: Vec3<f32>, p2: Vec3<f32>, p3: Vec3<f32>) -> Vec3<f32> {
    (p2 - p1).cross(p3 - p1)
}

/// Unit face normal of a counter-clockwise triangle, or zero if the
/// triangle has no area.
pub fn triangle_normal(p1: Vec3<f32>, p2: Vec3<f32>, p3: Vec3<f32>) -> Vec3<f32> {
    normalized_or_zero(triangle_cross(p1, p2, p3))
}

pub(crate) fn normalized_or_zero(v: Vec3<f32>) -> Vec3<f32> {
    let len = v.magnitude();
    if len > f32::EPSILON {
        v / len
    } else {
        Vec3::zero()
    }
}


/// Triangle list as three parallel flat streams: `x y z` positions, `u v`
/// texture coordinates and `x y z` normals.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MeshData {
    pub vertices: Vec<f32>,
    pub texcoords: Vec<f32>,
    pub normals: Vec<f32>,
}

impl MeshData {
    pub fn new() -> Self {
        MeshData::default()
    }

    pub fn with_capacity(num_vertices: usize) -> Self {
        MeshData {
            vertices: Vec::with_capacity(num_vertices * 3),
            texcoords: Vec::with_capacity(num_vertices * 2),
            normals: Vec::with_capacity(num_vertices * 3),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn num_vertices(&self) -> usize {
        self.vertices.len() / 3
    }

    pub fn push_vertex(&mut self, pos: Vec3<f32>, tex: Vec2<f32>, normal: Vec3<f32>) {
        self.vertices.extend([pos.x, pos.y, pos.z]);
        self.texcoords.extend([tex.x, tex.y]);
        self.normals.extend([normal.x, normal.y, normal.z]);
    }

    /// Check that the streams describe whole triangles and agree on the
    /// vertex count.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.vertices.len() % 9 == 0,
            Geometry,
            "{} vertex floats is not a multiple of 9",
            self.vertices.len(),
        );
        let num_vertices = self.num_vertices();
        ensure!(
            self.texcoords.len() == num_vertices * 2,
            Geometry,
            "{} texcoord floats for {} vertices, expected {}",
            self.texcoords.len(),
            num_vertices,
            num_vertices * 2,
        );
        ensure!(
            self.normals.len() == self.vertices.len(),
            Geometry,
            "{} normal floats for {} vertex floats",
            self.normals.len(),
            self.vertices.len(),
        );
        Ok(())
    }

    pub fn points(&self) -> impl Iterator<Item=Vec3<f32>> + '_ {
        self.vertices
            .chunks_exact(3)
            .map(|c| Vec3::new(c[0], c[1], c[2]))
    }

    pub fn make_aabb(&self) -> Result<Aabb> {
        self.validate()?;
        Aabb::from_points(self.points())
            .ok_or_else(|| err!(Geometry, "cannot bound a mesh with no vertices"))
    }

    pub fn make_sphere(&self) -> Result<Sphere> {
        self.validate()?;
        let points = self.points().collect::<Vec<_>>();
        Sphere::from_points(&points)
            .ok_or_else(|| err!(Geometry, "cannot bound a mesh with no vertices"))
    }

    pub fn make_triangle_soup(&self) -> Result<TriangleSoup> {
        self.validate()?;
        TriangleSoup::from_vertices(&self.vertices)
    }
}


/// Something that generates render geometry.
pub trait MeshBuilder {
    fn build_mesh(&self) -> Result<MeshData>;
}


/// Bounding volume covering several meshes.
///
/// When any instance of the model may be rotated, an axis-aligned box is no
/// longer valid, so a sphere around the origin is used instead.
pub fn bound_meshes(meshes: &[MeshData], rotating: bool) -> Result<BoundingVolume> {
    let (first, rest) = meshes
        .split_first()
        .ok_or_else(|| err!(Geometry, "no meshes to bound"))?;
    if rotating {
        let mut sphere = first.make_sphere()?;
        for mesh in rest {
            sphere = sphere.containing(&mesh.make_sphere()?);
        }
        Ok(BoundingVolume::Sphere(sphere.recentered()))
    } else {
        let mut aabb = first.make_aabb()?;
        for mesh in rest {
            aabb = aabb.containing(&mesh.make_aabb()?);
        }
        Ok(BoundingVolume::Aabb(aabb))
    }
}


#[cfg(test)]
fn unit_triangle_mesh(offset: Vec3<f32>) -> MeshData {
    let mut mesh = MeshData::new();
    let corners = [Vec3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0)];
    for p in corners {
        mesh.push_vertex(p + offset, Vec2::zero(), Vec3::unit_z());
    }
    mesh
}

#[test]
fn test_mismatched_streams_are_rejected() {
    let mut mesh = unit_triangle_mesh(Vec3::zero());
    mesh.validate().unwrap();

    mesh.texcoords.pop();
    let e = mesh.make_aabb().unwrap_err();
    assert_eq!(e.kind(), map_node::ErrorKind::Geometry);
    assert!(e.to_string().contains("5 texcoord floats"));

    let mut mesh = unit_triangle_mesh(Vec3::zero());
    mesh.vertices.truncate(6);
    assert!(mesh.make_triangle_soup().is_err());
}

#[test]
fn test_bounding_choice() {
    let meshes = [
        unit_triangle_mesh(Vec3::zero()),
        unit_triangle_mesh(Vec3::new(2.0, 0.0, -1.0)),
    ];

    match bound_meshes(&meshes, false).unwrap() {
        BoundingVolume::Aabb(aabb) => {
            assert_eq!(aabb.min(), Vec3::new(0.0, 0.0, -1.0));
            assert_eq!(aabb.max(), Vec3::new(3.0, 1.0, 0.0));
        }
        other => panic!("expected a box, got {:?}", other),
    }

    match bound_meshes(&meshes, true).unwrap() {
        BoundingVolume::Sphere(sphere) => {
            assert_eq!(sphere.center(), Vec3::zero());
            for mesh in &meshes {
                for p in mesh.points() {
                    assert!(sphere.contains_point(p));
                }
            }
        }
        other => panic!("expected a sphere, got {:?}", other),
    }

    assert!(bound_meshes(&[], false).is_err());
}

#[test]
fn test_quad_triangulation() {
    assert_eq!(triangulate_quad(['a', 'b', 'c', 'd']), ['a', 'b', 'c', 'a', 'c', 'd']);
    let n = triangle_normal(Vec3::zero(), Vec3::unit_x(), Vec3::unit_y());
    assert_eq!(n, Vec3::unit_z());
    assert_eq!(triangle_normal(Vec3::zero(), Vec3::unit_x(), Vec3::unit_x() * 2.0), Vec3::zero());
}
