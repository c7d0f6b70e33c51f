use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::math::Grid;
use crate::scene::TopologySource;
use crate::terrain_map::{MapElement, TerrainMap};
use crate::world::{Result, WorldError};

/// Named bits of the topology raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum TerrainTopology {
    Field = 1 << 0,
    Cliff = 1 << 1,
    Summit = 1 << 2,
    Beachside = 1 << 3,
    Beach = 1 << 4,
    Forest = 1 << 5,
    Forestside = 1 << 6,
    Ocean = 1 << 7,
    Oceanside = 1 << 8,
    Decor = 1 << 9,
    Monument = 1 << 10,
    Road = 1 << 11,
    Roadside = 1 << 12,
    Swamp = 1 << 13,
    River = 1 << 14,
    Riverside = 1 << 15,
    Lake = 1 << 16,
    Lakeside = 1 << 17,
    Offshore = 1 << 18,
    Rail = 1 << 19,
    Railside = 1 << 20,
    Building = 1 << 21,
    Cliffside = 1 << 22,
    Mountain = 1 << 23,
    Clutter = 1 << 24,
    Alt = 1 << 25,
    Tier0 = 1 << 26,
    Tier1 = 1 << 27,
    Tier2 = 1 << 28,
    Mainland = 1 << 29,
    Hilltop = 1 << 30,
}

impl TerrainTopology {
    pub const COUNT: usize = 31;

    pub const ALL: [TerrainTopology; Self::COUNT] = [
        TerrainTopology::Field,
        TerrainTopology::Cliff,
        TerrainTopology::Summit,
        TerrainTopology::Beachside,
        TerrainTopology::Beach,
        TerrainTopology::Forest,
        TerrainTopology::Forestside,
        TerrainTopology::Ocean,
        TerrainTopology::Oceanside,
        TerrainTopology::Decor,
        TerrainTopology::Monument,
        TerrainTopology::Road,
        TerrainTopology::Roadside,
        TerrainTopology::Swamp,
        TerrainTopology::River,
        TerrainTopology::Riverside,
        TerrainTopology::Lake,
        TerrainTopology::Lakeside,
        TerrainTopology::Offshore,
        TerrainTopology::Rail,
        TerrainTopology::Railside,
        TerrainTopology::Building,
        TerrainTopology::Cliffside,
        TerrainTopology::Mountain,
        TerrainTopology::Clutter,
        TerrainTopology::Alt,
        TerrainTopology::Tier0,
        TerrainTopology::Tier1,
        TerrainTopology::Tier2,
        TerrainTopology::Mainland,
        TerrainTopology::Hilltop,
    ];

    pub fn bits(self) -> i32 {
        self as i32
    }

    pub fn to_index(self) -> usize {
        self.bits().trailing_zeros() as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Every layer whose bit is set in `mask`.
    pub fn decompose(mask: i32) -> Vec<TerrainTopology> {
        Self::ALL
            .iter()
            .copied()
            .filter(|t| mask & t.bits() != 0)
            .collect()
    }
}

/// Topology bitmask raster with per-layer access.
#[derive(Debug, Clone, PartialEq)]
pub struct TopologyData {
    map: TerrainMap<i32>,
}

impl TopologyData {
    pub fn new(res: usize) -> Self {
        Self {
            map: TerrainMap::new(res, 1),
        }
    }

    pub fn from_map(map: TerrainMap<i32>) -> Result<Self> {
        if map.channels() != 1 {
            return Err(WorldError::ShapeMismatch {
                expected: "1 topology channel".to_string(),
                actual: map.as_bytes().len(),
            });
        }
        Ok(Self { map })
    }

    pub fn res(&self) -> usize {
        self.map.res()
    }

    pub fn map(&self) -> &TerrainMap<i32> {
        &self.map
    }

    pub fn into_map(self) -> TerrainMap<i32> {
        self.map
    }

    /// Unpack one layer into a flag grid.
    pub fn layer(&self, layer: TerrainTopology) -> Grid<bool> {
        let bit = layer.bits();
        let res = self.res();
        let plane = self.map.as_bytes();
        Grid::from_fn(res, false, |row, col| {
            let offset = (row * res + col) * i32::SIZE;
            i32::read_le(&plane[offset..offset + i32::SIZE]) & bit != 0
        })
    }

    /// Set or clear one layer's bit in every cell from a flag grid.
    pub fn set_layer(&mut self, layer: TerrainTopology, mask: &Grid<bool>) -> Result<()> {
        let res = self.res();
        if mask.res() != res {
            return Err(WorldError::ResolutionMismatch {
                raster: "topology layer mask".to_string(),
                expected: res,
                actual: mask.res(),
            });
        }
        if res == 0 {
            return Ok(());
        }

        let bit = layer.bits();
        let plane = self.map.channel_bytes_mut().into_iter().next();
        if let Some(plane) = plane {
            plane
                .par_chunks_mut(res * i32::SIZE)
                .enumerate()
                .for_each(|(row, bytes)| {
                    for (col, cell) in bytes.chunks_exact_mut(i32::SIZE).enumerate() {
                        let value = i32::read_le(cell);
                        let value = if mask.get(row, col) {
                            value | bit
                        } else {
                            value & !bit
                        };
                        value.write_le(cell);
                    }
                });
        }
        Ok(())
    }

    pub fn get(&self, row: usize, col: usize) -> Result<i32> {
        self.map.get(0, row, col)
    }

    pub fn set(&mut self, row: usize, col: usize, mask: i32) -> Result<()> {
        self.map.set(0, row, col, mask)
    }
}

impl TopologySource for TopologyData {
    fn serialize_layers(&self) -> Result<Vec<u8>> {
        Ok(self.map.to_bytes())
    }

    fn raster(&self) -> &TerrainMap<i32> {
        &self.map
    }
}
