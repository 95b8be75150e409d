//! Procedural height-field terrain.

use crate::mesh::*;
use map_node::{
    error::Result,
    journal::ErrorJournal,
    leaf::{FloatValue, IntValue, BoolValue, FloatBuffer},
    node::Inspect,
    composite,
    err,
    ensure,
};
use vek::*;


/// Neighbor offsets in `(x, z)` grid steps, in the order whose consecutive
/// pairs give upward-facing cross products.
const NEIGHBOR_OFFSETS: [(isize, isize); 4] = [(0, -1), (-1, 0), (0, 1), (1, 0)];


composite! {
    /// Grid of height samples spanning `x_len` by `z_len`, centered on the
    /// origin. Heights are row-major, with rows running along z and columns
    /// along x.
    pub struct HeightGrid {
        pub x_len: FloatValue = FloatValue::new(1.0),
        pub z_len: FloatValue = FloatValue::new(1.0),
        pub rows: IntValue = IntValue::new(2),
        pub columns: IntValue = IntValue::new(2),
        pub heights: FloatBuffer = FloatBuffer::new(vec![0.0; 4]),
        /// Per-vertex averaged normals instead of per-triangle flat ones.
        pub smooth: BoolValue = BoolValue::new(false),
    }
}

impl HeightGrid {
    /// Flat grid of `rows` by `columns` samples.
    pub fn new(x_len: f32, z_len: f32, rows: usize, columns: usize) -> Result<Self> {
        let to_count = |n: usize, what: &str| i32::try_from(n)
            .map_err(|_| err!(Range, "{} {} does not fit in a 4-byte integer", n, what));
        let rows_count = to_count(rows, "rows")?;
        let columns_count = to_count(columns, "columns")?;
        let num_samples = rows
            .checked_mul(columns)
            .ok_or_else(|| err!(Range, "{} by {} samples overflows", rows, columns))?;

        let mut grid = HeightGrid::default();
        grid.x_len.set(x_len);
        grid.z_len.set(z_len);
        grid.rows.set(rows_count);
        grid.columns.set(columns_count);
        grid.heights = FloatBuffer::new(vec![0.0; num_samples]);
        Ok(grid)
    }

    /// Set the height at column `x`, row `z`.
    pub fn set_height(&mut self, x: usize, z: usize, height: f32) -> Result<()> {
        let (rows, columns) = self.dims()?;
        ensure!(
            x < columns && z < rows,
            Geometry,
            "sample ({}, {}) is outside a {}x{} grid",
            x,
            z,
            columns,
            rows,
        );
        self.heights.0[z * columns + x] = height;
        Ok(())
    }

    /// Row and column counts, checked against the minimum size and the
    /// number of samples.
    pub fn dims(&self) -> Result<(usize, usize)> {
        let (rows, columns) = (self.rows.get(), self.columns.get());
        ensure!(
            rows >= 2 && columns >= 2,
            Geometry,
            "height grid needs at least 2x2 samples, got {} rows and {} columns",
            rows,
            columns,
        );
        let (rows, columns) = (rows as usize, columns as usize);
        ensure!(
            self.heights.len() == rows * columns,
            Geometry,
            "{} height samples for {} rows and {} columns",
            self.heights.len(),
            rows,
            columns,
        );
        Ok((rows, columns))
    }

    fn sampler(&self) -> Result<GridSampler> {
        let (rows, columns) = self.dims()?;
        Ok(GridSampler {
            x_len: self.x_len.get(),
            z_len: self.z_len.get(),
            rows,
            columns,
            heights: self.heights.as_slice(),
        })
    }
}

/// Grid with validated dimensions.
struct GridSampler<'a> {
    x_len: f32,
    z_len: f32,
    rows: usize,
    columns: usize,
    heights: &'a [f32],
}

impl<'a> GridSampler<'a> {
    fn point_at(&self, x: usize, z: usize) -> Vec3<f32> {
        let fx = x as f32 / (self.columns - 1) as f32;
        let fz = z as f32 / (self.rows - 1) as f32;
        Vec3::new(
            self.x_len * (fx - 0.5),
            self.heights[z * self.columns + x],
            self.z_len * (fz - 0.5),
        )
    }

    fn texcoord_at(&self, x: usize, z: usize) -> Vec2<f32> {
        Vec2::new(
            x as f32 / (self.columns - 1) as f32,
            z as f32 / (self.rows - 1) as f32,
        )
    }

    fn neighbor(&self, x: usize, z: usize, (dx, dz): (isize, isize)) -> Option<Vec3<f32>> {
        let nx = x.checked_add_signed(dx)?;
        let nz = z.checked_add_signed(dz)?;
        if nx < self.columns && nz < self.rows {
            Some(self.point_at(nx, nz))
        } else {
            None
        }
    }

    /// Average of the cross products of each consecutive pair of neighbor
    /// edges. Pairs with a missing neighbor are skipped, so border vertices
    /// average fewer contributions than interior ones.
    fn point_normal(&self, x: usize, z: usize) -> Result<Vec3<f32>> {
        let center = self.point_at(x, z);
        let neighbors = NEIGHBOR_OFFSETS.map(|offset| self.neighbor(x, z, offset));

        let mut accum = Vec3::zero();
        let mut added = 0;
        for i in 0..4 {
            let (Some(a), Some(b)) = (neighbors[i], neighbors[(i + 1) % 4]) else {
                continue;
            };
            accum += normalized_or_zero((a - center).cross(b - center));
            added += 1;
        }
        if added == 0 {
            return Err(err!(Geometry, "sample ({}, {}) has no adjacent neighbor pair", x, z));
        }
        Ok(normalized_or_zero(accum / added as f32))
    }
}

impl MeshBuilder for HeightGrid {
    fn build_mesh(&self) -> Result<MeshData> {
        let grid = self.sampler()?;
        let smooth = self.smooth.get();

        let mut point_normals = Vec::new();
        if smooth {
            point_normals.reserve(grid.rows * grid.columns);
            for z in 0..grid.rows {
                for x in 0..grid.columns {
                    point_normals.push(grid.point_normal(x, z)?);
                }
            }
        }

        let num_quads = (grid.rows - 1) * (grid.columns - 1);
        let mut mesh = MeshData::with_capacity(num_quads * 6);
        for x in 0..grid.columns - 1 {
            for z in 0..grid.rows - 1 {
                let cells = triangulate_quad([(x, z), (x, z + 1), (x + 1, z + 1), (x + 1, z)]);
                let points = cells.map(|(x, z)| grid.point_at(x, z));
                let face_normals = [
                    triangle_normal(points[0], points[1], points[2]),
                    triangle_normal(points[3], points[4], points[5]),
                ];
                for (i, &(cx, cz)) in cells.iter().enumerate() {
                    let normal = if smooth {
                        point_normals[cz * grid.columns + cx]
                    } else {
                        face_normals[i / 3]
                    };
                    mesh.push_vertex(points[i], grid.texcoord_at(cx, cz), normal);
                }
            }
        }
        trace!(rows = grid.rows, columns = grid.columns, vertices = mesh.num_vertices(), "built height grid");
        Ok(mesh)
    }
}

impl Inspect for HeightGrid {
    fn fill_report(&self, journal: &mut ErrorJournal) {
        let (rows, columns) = (self.rows.get(), self.columns.get());
        if rows < 2 || columns < 2 {
            journal.error(format!(
                "needs at least 2x2 samples, got {} rows and {} columns",
                rows,
                columns,
            ));
        } else if self.heights.len() != rows as usize * columns as usize {
            journal.error(format!(
                "{} height samples do not match {} rows times {} columns",
                self.heights.len(),
                rows,
                columns,
            ));
        }
        if self.x_len.get() == 0.0 || self.z_len.get() == 0.0 {
            journal.warn("grid has zero extent");
        }
    }
}


#[test]
fn test_single_sample_grid_fails() {
    let grid = HeightGrid::new(4.0, 4.0, 1, 1).unwrap();
    let e = grid.build_mesh().unwrap_err();
    assert_eq!(e.kind(), map_node::ErrorKind::Geometry);

    let mut journal = ErrorJournal::new("grid");
    grid.fill_report(&mut journal);
    assert!(journal.has_error());
}

#[test]
fn test_sample_count_must_match() {
    let mut grid = HeightGrid::new(4.0, 4.0, 3, 3).unwrap();
    grid.heights.0.pop();
    assert!(grid.build_mesh().is_err());
    assert!(grid.set_height(0, 0, 1.0).is_err());

    let mut journal = ErrorJournal::new("grid");
    grid.fill_report(&mut journal);
    assert!(journal.has_error());
}

#[test]
fn test_flat_grid_geometry() {
    let grid = HeightGrid::new(2.0, 4.0, 3, 2).unwrap();
    let mesh = grid.build_mesh().unwrap();
    mesh.validate().unwrap();
    // one column of quads, two rows of quads
    assert_eq!(mesh.num_vertices(), 2 * 6);

    let aabb = mesh.make_aabb().unwrap();
    assert_eq!(aabb.min(), Vec3::new(-1.0, 0.0, -2.0));
    assert_eq!(aabb.max(), Vec3::new(1.0, 0.0, 2.0));

    for n in mesh.normals.chunks_exact(3) {
        assert_eq!(n, &[0.0, 1.0, 0.0]);
    }
    for uv in mesh.texcoords.chunks_exact(2) {
        assert!((0.0..=1.0).contains(&uv[0]) && (0.0..=1.0).contains(&uv[1]));
    }
}

#[test]
fn test_smooth_normals_follow_slope() {
    let mut grid = HeightGrid::new(2.0, 2.0, 3, 3).unwrap();
    grid.smooth.set(true);
    for z in 0..3 {
        for x in 0..3 {
            grid.set_height(x, z, x as f32).unwrap();
        }
    }
    let mesh = grid.build_mesh().unwrap();
    let expected = Vec3::new(-1.0, 1.0, 0.0).normalized();
    for n in mesh.normals.chunks_exact(3) {
        let n = Vec3::new(n[0], n[1], n[2]);
        assert!((n - expected).magnitude() < 1e-5, "normal {:?}", n);
    }
}

#[test]
fn test_oversized_grid_is_a_range_error() {
    let e = HeightGrid::new(1.0, 1.0, i32::MAX as usize + 1, 2).unwrap_err();
    assert_eq!(e.kind(), map_node::ErrorKind::Range);
    let e = HeightGrid::new(1.0, 1.0, 2, usize::MAX).unwrap_err();
    assert_eq!(e.kind(), map_node::ErrorKind::Range);
}
