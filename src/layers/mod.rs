pub mod topology;

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Ground textures of the splat raster. Discriminants are the game's bit
/// values; the raster channel is the bit position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u32)]
pub enum TerrainSplat {
    Dirt = 1,
    Snow = 2,
    Sand = 4,
    Rock = 8,
    Grass = 16,
    Forest = 32,
    Stones = 64,
    Gravel = 128,
}

impl TerrainSplat {
    pub const COUNT: usize = 8;

    pub const ALL: [TerrainSplat; Self::COUNT] = [
        TerrainSplat::Dirt,
        TerrainSplat::Snow,
        TerrainSplat::Sand,
        TerrainSplat::Rock,
        TerrainSplat::Grass,
        TerrainSplat::Forest,
        TerrainSplat::Stones,
        TerrainSplat::Gravel,
    ];

    pub fn to_index(self) -> usize {
        (self as u32).trailing_zeros() as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

impl FromStr for TerrainSplat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|v| format!("{:?}", v).eq_ignore_ascii_case(s))
            .copied()
            .ok_or_else(|| format!("Unknown ground type '{}'", s))
    }
}

/// Biomes of the biome raster, laid out like [`TerrainSplat`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u32)]
pub enum TerrainBiome {
    Arid = 1,
    Temperate = 2,
    Tundra = 4,
    Arctic = 8,
}

impl TerrainBiome {
    pub const COUNT: usize = 4;

    pub const ALL: [TerrainBiome; Self::COUNT] = [
        TerrainBiome::Arid,
        TerrainBiome::Temperate,
        TerrainBiome::Tundra,
        TerrainBiome::Arctic,
    ];

    pub fn to_index(self) -> usize {
        (self as u32).trailing_zeros() as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

impl FromStr for TerrainBiome {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|v| format!("{:?}", v).eq_ignore_ascii_case(s))
            .copied()
            .ok_or_else(|| format!("Unknown biome '{}'", s))
    }
}
