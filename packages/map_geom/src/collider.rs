//! Collision and bounding shapes.

use map_node::{
    bin::BinWriter,
    error::Result,
    leaf::{Vec3Value, FloatValue},
    list::UniformList,
    node::MapNode,
    type_code,
    composite,
    ensure,
};
use std::ops::AddAssign;
use vek::*;


/// Every shape the binary form can carry, with its fixed type code.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ColliderKind {
    Sphere,
    Aabb,
    Triangle,
    TriangleSoup,
}

impl ColliderKind {
    pub fn code(self) -> u16 {
        match self {
            ColliderKind::Sphere => 1,
            ColliderKind::Aabb => 2,
            ColliderKind::Triangle => 3,
            ColliderKind::TriangleSoup => 4,
        }
    }
}


/// A shape that is written with a leading `i16` type code.
pub trait Collider: MapNode + Sized + 'static {
    const KIND: ColliderKind;

    /// This shape's code, confirmed against the process-wide registry.
    fn type_code() -> Result<u16> {
        type_code::confirm_global::<Self>(Self::KIND.code())
    }

    fn encode_tagged(&self, bin: &mut BinWriter) -> Result<()> {
        bin.write_i16_checked(Self::type_code()?)?;
        self.encode(bin)
    }
}

/// Write the "no shape" code in place of a tagged collider.
pub fn encode_no_collider(bin: &mut BinWriter) {
    bin.write_i16(type_code::NO_TYPE_CODE as i16);
}


composite! {
    /// Axis-aligned box. `min` is kept less than or equal to `max` on every
    /// axis, whichever way the corners were given.
    pub struct Aabb {
        min: Vec3Value = Vec3Value::default(),
        max: Vec3Value = Vec3Value::default(),
    }
    after_load = Aabb::normalize;
}

impl Aabb {
    pub fn new(a: Vec3<f32>, b: Vec3<f32>) -> Self {
        let mut aabb = Aabb::default();
        aabb.set(a, b);
        aabb
    }

    /// Smallest box covering every point. `None` if there are no points.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item=Vec3<f32>>,
    {
        let mut points = points.into_iter();
        let first = points.next()?;
        let mut aabb = Aabb::new(first, first);
        for p in points {
            aabb.cover_point(p);
        }
        Some(aabb)
    }

    pub fn min(&self) -> Vec3<f32> {
        self.min.get()
    }

    pub fn max(&self) -> Vec3<f32> {
        self.max.get()
    }

    pub fn set(&mut self, a: Vec3<f32>, b: Vec3<f32>) {
        self.min.set(a);
        self.max.set(b);
        self.normalize();
    }

    fn normalize(&mut self) {
        let (a, b) = (self.min.get(), self.max.get());
        self.min.set(a.map2(b, f32::min));
        self.max.set(a.map2(b, f32::max));
    }

    /// Grow to include `p`.
    pub fn cover_point(&mut self, p: Vec3<f32>) {
        self.min.set(self.min.get().map2(p, f32::min));
        self.max.set(self.max.get().map2(p, f32::max));
    }

    pub fn containing(&self, other: &Aabb) -> Aabb {
        Aabb::new(
            self.min().map2(other.min(), f32::min),
            self.max().map2(other.max(), f32::max),
        )
    }

    pub fn volume(&self) -> f32 {
        let size = self.max() - self.min();
        size.x * size.y * size.z
    }
}

impl Collider for Aabb {
    const KIND: ColliderKind = ColliderKind::Aabb;
}


composite! {
    pub struct Sphere {
        center: Vec3Value = Vec3Value::default(),
        radius: FloatValue = FloatValue::new(1.0),
    }
}

impl Sphere {
    pub fn new(center: Vec3<f32>, radius: f32) -> Self {
        Sphere {
            center: Vec3Value(center),
            radius: FloatValue(radius),
        }
    }

    /// Sphere around the centroid reaching the farthest point. This is not
    /// the minimal enclosing sphere. `None` if there are no points.
    pub fn from_points(points: &[Vec3<f32>]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        let sum = points.iter().fold(Vec3::zero(), |acc, &p| acc + p);
        let centroid = sum / points.len() as f32;
        let radius = points
            .iter()
            .map(|&p| (p - centroid).magnitude_squared())
            .fold(0.0, f32::max)
            .sqrt();
        Some(Sphere::new(centroid, radius))
    }

    pub fn center(&self) -> Vec3<f32> {
        self.center.get()
    }

    pub fn radius(&self) -> f32 {
        self.radius.get()
    }

    /// Smallest sphere enclosing both spheres.
    pub fn containing(&self, other: &Sphere) -> Sphere {
        let (a, c) = (self.center(), self.radius());
        let (b, d) = (other.center(), other.radius());
        let rel = b - a;
        let dist = rel.magnitude();
        if dist + d <= c {
            return self.clone();
        }
        if dist + c <= d {
            return other.clone();
        }
        let center = (a + b + rel / dist * (d - c)) / 2.0;
        Sphere::new(center, (c + d + dist) / 2.0)
    }

    /// Sphere centered on the origin that still encloses this one.
    pub fn recentered(&self) -> Sphere {
        Sphere::new(Vec3::zero(), self.center().magnitude() + self.radius())
    }

    pub fn contains_point(&self, p: Vec3<f32>) -> bool {
        (p - self.center()).magnitude() <= self.radius() * (1.0 + 1e-5) + 1e-5
    }
}

impl Collider for Sphere {
    const KIND: ColliderKind = ColliderKind::Sphere;
}


composite! {
    pub struct Triangle {
        pub p1: Vec3Value = Vec3Value::default(),
        pub p2: Vec3Value = Vec3Value::default(),
        pub p3: Vec3Value = Vec3Value::default(),
    }
}

impl Triangle {
    pub fn new(p1: Vec3<f32>, p2: Vec3<f32>, p3: Vec3<f32>) -> Self {
        Triangle {
            p1: Vec3Value(p1),
            p2: Vec3Value(p2),
            p3: Vec3Value(p3),
        }
    }

    pub fn area(&self) -> f32 {
        (self.p2.get() - self.p1.get())
            .cross(self.p3.get() - self.p1.get())
            .magnitude() / 2.0
    }
}

impl Collider for Triangle {
    const KIND: ColliderKind = ColliderKind::Triangle;
}


composite! {
    /// Unordered triangle collection for detailed collision.
    pub struct TriangleSoup {
        pub triangles: UniformList<Triangle> = UniformList::new(),
    }
}

impl TriangleSoup {
    /// Group a flat `x, y, z` vertex stream into consecutive triangles.
    pub fn from_vertices(vertices: &[f32]) -> Result<Self> {
        ensure!(
            vertices.len() % 9 == 0,
            Geometry,
            "{} vertex floats do not form whole triangles",
            vertices.len(),
        );
        let triangles = vertices
            .chunks_exact(9)
            .map(|c| Triangle::new(
                Vec3::new(c[0], c[1], c[2]),
                Vec3::new(c[3], c[4], c[5]),
                Vec3::new(c[6], c[7], c[8]),
            ))
            .collect();
        Ok(TriangleSoup { triangles })
    }

    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }
}

impl AddAssign for TriangleSoup {
    fn add_assign(&mut self, rhs: Self) {
        self.triangles += rhs.triangles;
    }
}

impl Collider for TriangleSoup {
    const KIND: ColliderKind = ColliderKind::TriangleSoup;
}


/// The bounding volume chosen for a model.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundingVolume {
    Sphere(Sphere),
    Aabb(Aabb),
}

impl BoundingVolume {
    pub fn encode_tagged(&self, bin: &mut BinWriter) -> Result<()> {
        match self {
            BoundingVolume::Sphere(sphere) => sphere.encode_tagged(bin),
            BoundingVolume::Aabb(aabb) => aabb.encode_tagged(bin),
        }
    }
}


#[test]
fn test_aabb_stays_ordered() {
    use map_node::node::from_json;
    use serde_json::json;

    let aabb = Aabb::new(Vec3::new(1.0, -2.0, 3.0), Vec3::new(-1.0, 2.0, -3.0));
    assert_eq!(aabb.min(), Vec3::new(-1.0, -2.0, -3.0));
    assert_eq!(aabb.max(), Vec3::new(1.0, 2.0, 3.0));
    assert_eq!(aabb.volume(), 2.0 * 4.0 * 6.0);

    let loaded: Aabb = from_json(&json!({ "min": [5, 0, 0], "max": [0, 1, 1] })).unwrap();
    assert_eq!(loaded.min(), Vec3::new(0.0, 0.0, 0.0));
    assert_eq!(loaded.max(), Vec3::new(5.0, 1.0, 1.0));

    let mut grown = loaded.clone();
    grown.cover_point(Vec3::new(-1.0, 3.0, 0.5));
    assert_eq!(grown.min(), Vec3::new(-1.0, 0.0, 0.0));
    assert_eq!(grown.max(), Vec3::new(5.0, 3.0, 1.0));
    assert_eq!(loaded.containing(&grown), grown);
}

#[test]
fn test_sphere_union_contains_both() {
    let a = Sphere::new(Vec3::new(0.0, 0.0, 0.0), 1.0);
    let b = Sphere::new(Vec3::new(4.0, 0.0, 0.0), 1.0);
    let u = a.containing(&b);
    assert_eq!(u.center(), Vec3::new(2.0, 0.0, 0.0));
    assert_eq!(u.radius(), 3.0);
    for p in [Vec3::new(-1.0, 0.0, 0.0), Vec3::new(5.0, 0.0, 0.0), Vec3::new(4.0, 1.0, 0.0)] {
        assert!(u.contains_point(p));
    }

    assert_eq!(a.containing(&a), a);

    let big = Sphere::new(Vec3::new(1.0, 1.0, 0.0), 10.0);
    assert_eq!(a.containing(&big), big);
    assert_eq!(big.containing(&a), big);

    let moved = Sphere::new(Vec3::new(3.0, 4.0, 0.0), 2.0).recentered();
    assert_eq!(moved.center(), Vec3::zero());
    assert_eq!(moved.radius(), 7.0);
}

#[test]
fn test_sphere_from_points_uses_centroid() {
    let points = [
        Vec3::new(-1.0, 0.0, 0.0),
        Vec3::new(1.0, 0.0, 0.0),
        Vec3::new(0.0, 2.0, 0.0),
        Vec3::new(0.0, -2.0, 0.0),
    ];
    let s = Sphere::from_points(&points).unwrap();
    assert_eq!(s.center(), Vec3::zero());
    assert_eq!(s.radius(), 2.0);
    assert!(Sphere::from_points(&[]).is_none());
}

#[test]
fn test_triangle_soup_from_vertices() {
    let verts = [
        0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0,
        0.0, 0.0, 1.0, 1.0, 0.0, 1.0, 0.0, 1.0, 1.0,
    ];
    let mut soup = TriangleSoup::from_vertices(&verts).unwrap();
    assert_eq!(soup.len(), 2);
    assert_eq!(soup.triangles[1].p1.get(), Vec3::new(0.0, 0.0, 1.0));
    assert_eq!(soup.triangles[0].area(), 0.5);

    soup += TriangleSoup::from_vertices(&verts[..9]).unwrap();
    assert_eq!(soup.len(), 3);

    let e = TriangleSoup::from_vertices(&verts[..6]).unwrap_err();
    assert_eq!(e.kind(), map_node::ErrorKind::Geometry);
}

#[test]
fn test_tagged_encoding_uses_fixed_codes() {
    assert_eq!(Sphere::type_code().unwrap(), 1);
    assert_eq!(Aabb::type_code().unwrap(), 2);
    assert_eq!(Triangle::type_code().unwrap(), 3);
    assert_eq!(TriangleSoup::type_code().unwrap(), 4);

    let mut bin = BinWriter::new();
    Sphere::new(Vec3::zero(), 2.0).encode_tagged(&mut bin).unwrap();
    assert_eq!(&bin.as_bytes()[..2], &[1, 0]);
    assert_eq!(bin.len(), 2 + 4 * 4);

    let mut bin = BinWriter::new();
    encode_no_collider(&mut bin);
    assert_eq!(bin.as_bytes(), &[0, 0]);
}
