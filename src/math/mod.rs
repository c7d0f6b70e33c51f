pub mod bits;
pub mod grid;

use binrw::binrw;
use cgmath::Vector3;
use serde::{Deserialize, Serialize};

pub use grid::Grid;

/// Little-endian `[f32; 3]` on disk, cgmath vector in memory.
#[binrw]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[brw(little)]
pub struct VectorData(
    #[br(map = |raw: [f32; 3]| Vector3::new(raw[0], raw[1], raw[2]))]
    #[bw(map = |v: &Vector3<f32>| [v.x, v.y, v.z])]
    pub Vector3<f32>,
);

impl VectorData {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self(Vector3::new(x, y, z))
    }

    pub fn to_slice(&self) -> [f32; 3] {
        let v = &self.0;
        [v.x, v.y, v.z]
    }
}

impl Default for VectorData {
    fn default() -> Self {
        Self(Vector3::new(0.0, 0.0, 0.0))
    }
}

impl From<Vector3<f32>> for VectorData {
    fn from(v: Vector3<f32>) -> Self {
        Self(v)
    }
}

/// Rectangular cell region `[x0, x1) x [z0, z1)` of a square raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Area {
    pub x0: usize,
    pub x1: usize,
    pub z0: usize,
    pub z1: usize,
}

impl Area {
    pub fn new(x0: usize, x1: usize, z0: usize, z1: usize) -> Self {
        Self { x0, x1, z0, z1 }
    }

    /// The whole `res x res` raster.
    pub fn full(res: usize) -> Self {
        Self::new(0, res, 0, res)
    }

    /// Clip the region to a raster of the given resolution.
    pub fn clamp_to(&self, res: usize) -> Self {
        Self {
            x0: self.x0.min(res),
            x1: self.x1.min(res),
            z0: self.z0.min(res),
            z1: self.z1.min(res),
        }
    }
}

/// Smallest power of two that is `>= value`. Zero and negative inputs map to 1.
pub fn next_power_of_two(value: i32) -> usize {
    if value <= 1 {
        return 1;
    }
    (value as u32).next_power_of_two() as usize
}

/// Write `value` into every cell of `area`, leaving the rest untouched.
pub fn set_values<T: Copy + Send + Sync>(mut grid: Grid<T>, value: T, area: Area) -> Grid<T> {
    let area = area.clamp_to(grid.res());
    grid.par_rows_mut(|row, cells| {
        if row >= area.x0 && row < area.x1 {
            for cell in &mut cells[area.z0..area.z1.max(area.z0)] {
                *cell = value;
            }
        }
    });
    grid
}
