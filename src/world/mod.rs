pub mod entities;
pub mod error;
pub mod file;

use binrw::binrw;
use serde::{Deserialize, Serialize};

pub use entities::{CircuitData, ConnectionData, ModifierData, ModifierEntry, NpcData, PathData, PrefabData};
pub use error::{Result, WorldError};
pub use file::WORLD_VERSION;

use entities::{read_bytes, read_string, write_string};

/// Map names written by a full world export, in write order.
pub const MAP_NAMES: [&str; 7] = [
    "terrain", "height", "water", "splat", "biome", "alpha", "topology",
];

/// A named raw raster buffer.
#[binrw]
#[brw(little)]
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapData {
    #[br(parse_with = read_string)]
    #[bw(write_with = write_string)]
    pub name: String,
    #[br(temp)]
    #[bw(calc = data.len() as u32)]
    data_len: u32,
    #[br(parse_with = read_bytes, args(data_len))]
    #[serde(skip)]
    pub data: Vec<u8>,
}

#[binrw]
#[brw(little)]
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldData {
    pub size: u32,
    #[br(temp)]
    #[bw(calc = maps.len() as u32)]
    map_count: u32,
    #[br(count = map_count)]
    pub maps: Vec<MapData>,
    #[br(temp)]
    #[bw(calc = prefabs.len() as u32)]
    prefab_count: u32,
    #[br(count = prefab_count)]
    pub prefabs: Vec<PrefabData>,
    #[br(temp)]
    #[bw(calc = paths.len() as u32)]
    path_count: u32,
    #[br(count = path_count)]
    pub paths: Vec<PathData>,
}

#[binrw]
#[brw(little)]
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElectricData {
    #[br(temp)]
    #[bw(calc = circuit_data.len() as u32)]
    circuit_count: u32,
    #[br(count = circuit_count)]
    pub circuit_data: Vec<CircuitData>,
}

#[binrw]
#[brw(little)]
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NpcBots {
    #[br(temp)]
    #[bw(calc = bots.len() as u32)]
    bot_count: u32,
    #[br(count = bot_count)]
    pub bots: Vec<NpcData>,
}

/// Entity-only payload of a reusable prefab export.
#[binrw]
#[brw(little)]
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RePrefabData {
    #[br(temp)]
    #[bw(calc = prefabs.len() as u32)]
    prefab_count: u32,
    #[br(count = prefab_count)]
    pub prefabs: Vec<PrefabData>,
    pub electric: ElectricData,
    pub npcs: NpcBots,
    pub modifiers: ModifierData,
}

/// In-memory world package: named raster maps, placed entities and the
/// reusable-prefab sub-package.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldSerialization {
    pub version: u32,
    pub world: WorldData,
    pub re_prefab: RePrefabData,
}

impl WorldSerialization {
    pub fn new() -> Self {
        Self {
            version: WORLD_VERSION,
            ..Default::default()
        }
    }

    pub fn get_map(&self, name: &str) -> Result<&MapData> {
        self.world
            .maps
            .iter()
            .find(|m| m.name == name)
            .ok_or_else(|| WorldError::MissingMap(name.to_string()))
    }

    pub fn has_map(&self, name: &str) -> bool {
        self.world.maps.iter().any(|m| m.name == name)
    }

    /// Store `data` under `name`, replacing an existing map of that name in place.
    pub fn add_map(&mut self, name: &str, data: Vec<u8>) {
        match self.world.maps.iter_mut().find(|m| m.name == name) {
            Some(existing) => existing.data = data,
            None => self.world.maps.push(MapData {
                name: name.to_string(),
                data,
            }),
        }
    }

    pub fn map_names(&self) -> Vec<&str> {
        self.world.maps.iter().map(|m| m.name.as_str()).collect()
    }
}
