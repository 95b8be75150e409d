//! Raw authored vertex streams.

use crate::mesh::*;
use map_node::{
    error::Result,
    journal::ErrorJournal,
    leaf::FloatBuffer,
    node::Inspect,
    composite,
};
use vek::*;


composite! {
    pub struct VertexArray {
        pub vertices: FloatBuffer = FloatBuffer::default(),
        pub texcoords: FloatBuffer = FloatBuffer::default(),
        pub normals: FloatBuffer = FloatBuffer::default(),
    }
}

impl VertexArray {
    pub fn from_mesh(mesh: MeshData) -> Self {
        VertexArray {
            vertices: FloatBuffer::new(mesh.vertices),
            texcoords: FloatBuffer::new(mesh.texcoords),
            normals: FloatBuffer::new(mesh.normals),
        }
    }

    /// Closed box between two opposite corners, six faces of two triangles
    /// each, with outward flat normals.
    pub fn from_box(a: Vec3<f32>, b: Vec3<f32>) -> Self {
        let lo = a.map2(b, f32::min);
        let hi = a.map2(b, f32::max);
        let corner = |x: bool, y: bool, z: bool| Vec3::new(
            if x { hi.x } else { lo.x },
            if y { hi.y } else { lo.y },
            if z { hi.z } else { lo.z },
        );

        // each face listed top-left, bottom-left, bottom-right, top-right
        // when viewed from outside
        let faces = [
            ([corner(false, true, true), corner(false, false, true), corner(true, false, true), corner(true, true, true)], Vec3::unit_z()),
            ([corner(true, true, true), corner(true, false, true), corner(true, false, false), corner(true, true, false)], Vec3::unit_x()),
            ([corner(true, true, false), corner(true, false, false), corner(false, false, false), corner(false, true, false)], -Vec3::unit_z()),
            ([corner(false, true, false), corner(false, false, false), corner(false, false, true), corner(false, true, true)], -Vec3::unit_x()),
            ([corner(false, true, false), corner(false, true, true), corner(true, true, true), corner(true, true, false)], Vec3::unit_y()),
            ([corner(false, false, true), corner(false, false, false), corner(true, false, false), corner(true, false, true)], -Vec3::unit_y()),
        ];

        let mut mesh = MeshData::with_capacity(36);
        for (corners, normal) in faces {
            for (pos, tex) in triangulate_quad(corners).into_iter().zip(QUAD_TEXCOORDS) {
                mesh.push_vertex(pos, tex, normal);
            }
        }
        VertexArray::from_mesh(mesh)
    }

    fn to_mesh(&self) -> MeshData {
        MeshData {
            vertices: self.vertices.0.clone(),
            texcoords: self.texcoords.0.clone(),
            normals: self.normals.0.clone(),
        }
    }
}

impl MeshBuilder for VertexArray {
    fn build_mesh(&self) -> Result<MeshData> {
        let mesh = self.to_mesh();
        mesh.validate()?;
        Ok(mesh)
    }
}

impl Inspect for VertexArray {
    fn fill_report(&self, journal: &mut ErrorJournal) {
        let num_floats = self.vertices.len();
        if num_floats == 0 {
            journal.warn("vertex array is empty");
            return;
        }
        if num_floats % 9 != 0 {
            journal.error(format!(
                "{} vertex floats is not a multiple of 9 (three points of three floats)",
                num_floats,
            ));
        }
        let num_vertices = num_floats / 3;
        if self.texcoords.len() != num_vertices * 2 {
            journal.error(format!(
                "{} texcoord floats, expected {} for {} vertices",
                self.texcoords.len(),
                num_vertices * 2,
                num_vertices,
            ));
        }
        if self.normals.len() != num_floats {
            journal.error(format!(
                "{} normal floats, expected {}",
                self.normals.len(),
                num_floats,
            ));
        }
    }
}


#[test]
fn test_box_vertex_array() {
    let array = VertexArray::from_box(Vec3::new(1.0, 2.0, 3.0), Vec3::new(-1.0, -2.0, -3.0));
    let mesh = array.build_mesh().unwrap();
    assert_eq!(mesh.num_vertices(), 36);

    let aabb = mesh.make_aabb().unwrap();
    assert_eq!(aabb.min(), Vec3::new(-1.0, -2.0, -3.0));
    assert_eq!(aabb.max(), Vec3::new(1.0, 2.0, 3.0));

    // authored normals agree with the winding of every triangle
    let soup = mesh.make_triangle_soup().unwrap();
    for (tri, normal) in soup.triangles.iter().zip(mesh.normals.chunks_exact(9)) {
        let face = triangle_normal(tri.p1.get(), tri.p2.get(), tri.p3.get());
        assert_eq!(face, Vec3::new(normal[0], normal[1], normal[2]));
    }

    let mut journal = ErrorJournal::new("box");
    array.fill_report(&mut journal);
    assert!(journal.is_empty());
}

#[test]
fn test_vertex_array_report() {
    let mut array = VertexArray::default();
    let mut journal = ErrorJournal::new("empty");
    array.fill_report(&mut journal);
    assert!(journal.has_warn_or_worse());
    assert!(!journal.has_error());

    array.vertices = FloatBuffer::new(vec![0.0; 12]);
    array.texcoords = FloatBuffer::new(vec![0.0; 3]);
    array.normals = FloatBuffer::new(vec![0.0; 9]);
    let mut journal = ErrorJournal::new("broken");
    array.fill_report(&mut journal);
    assert_eq!(journal.note_count(), 3);
    assert!(array.build_mesh().is_err());
}
