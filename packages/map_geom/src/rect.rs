//! Procedural flat rectangle.

use crate::mesh::*;
use map_node::{
    error::Result,
    journal::ErrorJournal,
    leaf::{Vec3Value, BoolValue},
    node::Inspect,
    composite,
    bail,
};
use vek::*;


composite! {
    /// Four corners in counter-clockwise order: top-left, bottom-left,
    /// bottom-right, top-right. Emitted as the triangles `p1 p2 p3` and
    /// `p1 p3 p4`.
    pub struct RectMesh {
        pub p1: Vec3Value = Vec3Value::new(-1.0, 1.0, 0.0),
        pub p2: Vec3Value = Vec3Value::new(-1.0, -1.0, 0.0),
        pub p3: Vec3Value = Vec3Value::new(1.0, -1.0, 0.0),
        pub p4: Vec3Value = Vec3Value::new(1.0, 1.0, 0.0),
        /// Blend the two face normals along the shared diagonal.
        pub smooth: BoolValue = BoolValue::new(false),
    }
}

impl RectMesh {
    pub fn new(corners: [Vec3<f32>; 4], smooth: bool) -> Self {
        let [p1, p2, p3, p4] = corners;
        RectMesh {
            p1: Vec3Value(p1),
            p2: Vec3Value(p2),
            p3: Vec3Value(p3),
            p4: Vec3Value(p4),
            smooth: BoolValue(smooth),
        }
    }

    pub fn corners(&self) -> [Vec3<f32>; 4] {
        [self.p1.get(), self.p2.get(), self.p3.get(), self.p4.get()]
    }

    /// Unnormalized normals of the two faces.
    fn face_crosses(&self) -> [Vec3<f32>; 2] {
        let [p1, p2, p3, p4] = self.corners();
        [triangle_cross(p1, p2, p3), triangle_cross(p1, p3, p4)]
    }
}

impl MeshBuilder for RectMesh {
    fn build_mesh(&self) -> Result<MeshData> {
        let [cross1, cross2] = self.face_crosses();
        let (len1, len2) = (cross1.magnitude(), cross2.magnitude());
        if len1 <= f32::EPSILON || len2 <= f32::EPSILON {
            bail!(Geometry, "rectangle has a face with no area");
        }
        let (n1, n2) = (cross1 / len1, cross2 / len2);

        // p1 and p3 lie on the shared diagonal
        let normals = if self.smooth.get() {
            let avg = (n1 + n2) * 0.5;
            [avg, n1, avg, avg, avg, n2]
        } else {
            [n1, n1, n1, n2, n2, n2]
        };

        let positions = triangulate_quad(self.corners());
        let mut mesh = MeshData::with_capacity(6);
        for i in 0..6 {
            mesh.push_vertex(positions[i], QUAD_TEXCOORDS[i], normals[i]);
        }
        Ok(mesh)
    }
}

impl Inspect for RectMesh {
    fn fill_report(&self, journal: &mut ErrorJournal) {
        for (i, cross) in self.face_crosses().into_iter().enumerate() {
            if cross.magnitude() <= f32::EPSILON {
                journal.error(format!("face {} of the rectangle has no area", i + 1));
            }
        }
    }
}


#[test]
fn test_unit_square_rectangle() {
    let rect = RectMesh::new(
        [
            Vec3::new(-1.0, 1.0, 0.0),
            Vec3::new(-1.0, -1.0, 0.0),
            Vec3::new(1.0, -1.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
        ],
        false,
    );
    let mesh = rect.build_mesh().unwrap();
    mesh.validate().unwrap();
    assert_eq!(mesh.num_vertices(), 6);

    let uvs = mesh.texcoords
        .chunks_exact(2)
        .map(|c| (c[0], c[1]))
        .collect::<Vec<_>>();
    for corner in [(0.0, 0.0), (0.0, 1.0), (1.0, 0.0), (1.0, 1.0)] {
        assert!(uvs.contains(&corner), "missing texcoord {:?}", corner);
    }

    for n in mesh.normals.chunks_exact(3) {
        assert_eq!(n, &[0.0, 0.0, 1.0]);
    }

    let mut journal = ErrorJournal::new("rect");
    rect.fill_report(&mut journal);
    assert!(journal.is_empty());
}

#[test]
fn test_smooth_rectangle_blends_diagonal() {
    // folded along the p1-p3 diagonal
    let rect = RectMesh::new(
        [
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 1.0),
        ],
        true,
    );
    let mesh = rect.build_mesh().unwrap();
    let normals = mesh.normals
        .chunks_exact(3)
        .map(|c| Vec3::new(c[0], c[1], c[2]))
        .collect::<Vec<_>>();
    let (n1, n2) = (normals[1], normals[5]);
    assert!(n1 != n2);
    let avg = (n1 + n2) * 0.5;
    for i in [0, 2, 3, 4] {
        assert!((normals[i] - avg).magnitude() < 1e-6);
    }
}

#[test]
fn test_degenerate_rectangle() {
    let p = Vec3::new(1.0, 2.0, 3.0);
    let rect = RectMesh::new([p, p, Vec3::zero(), Vec3::unit_x()], false);
    assert!(rect.build_mesh().is_err());

    let mut journal = ErrorJournal::new("rect");
    rect.fill_report(&mut journal);
    assert!(journal.has_error());
}
