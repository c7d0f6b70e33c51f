// World map conversion: packed world files <-> editor terrain rasters and entity lists.

pub mod convert;
pub mod layers;
pub mod math;
pub mod scene;
pub mod terrain_map;
pub mod world;

pub use convert::{ConvertOptions, MapInfo, WorldConverter};
pub use world::{WorldError, WorldSerialization};
