// Common test utilities and helpers
#![allow(dead_code)]

use cgmath::Vector3;
use rme_tools_lib::layers::topology::{TerrainTopology, TopologyData};
use rme_tools_lib::layers::{TerrainBiome, TerrainSplat};
use rme_tools_lib::math::{Grid, VectorData};
use rme_tools_lib::scene::{
    CircuitHolder, NoProgress, PrefabHolder, ProgressIds, ProgressSink, SceneContext, TerrainSource,
};
use rme_tools_lib::world::{CircuitData, ConnectionData, PathData, PrefabData, WorldError};
use rme_tools_lib::{MapInfo, WorldConverter, WorldSerialization};

pub const IDS: ProgressIds = ProgressIds {
    prefab: 1,
    path: 2,
    terrain: 3,
    circuit: 4,
};

/// Small map with varied heights, a two-ground splat, a hole and a road layer.
pub fn varied_map(converter: &WorldConverter) -> MapInfo {
    let mut map = converter.empty_map(64, 500.0, TerrainSplat::Grass, TerrainBiome::Temperate);

    let res = map.terrain_res;
    map.land.heights = Grid::from_fn(res, 0.0, |row, col| {
        ((row * res + col) % 97) as f32 / 96.0
    });

    let splat_res = map.splat_res;
    map.splat_map = Grid::from_fn(splat_res, [0.0; 8], |row, col| {
        let t = col as f32 / (splat_res - 1) as f32;
        let mut weights = [0.0; 8];
        weights[TerrainSplat::Grass.to_index()] = 1.0 - t;
        weights[TerrainSplat::Sand.to_index()] = t;
        if row == 0 {
            weights[TerrainSplat::Snow.to_index()] = 0.3;
        }
        weights
    });
    map.alpha_map.set(3, 4, false);

    let mut topology = TopologyData::from_map(map.topology.clone()).unwrap();
    let road = Grid::from_fn(splat_res, false, |row, _| row == 7);
    topology.set_layer(TerrainTopology::Road, &road).unwrap();
    topology.set(0, 0, TerrainTopology::Beach.bits() | TerrainTopology::Ocean.bits()).unwrap();
    map.topology = topology.into_map();

    map
}

/// Export `map` and the entities of `scene` into a world package.
pub fn export_world(
    converter: &WorldConverter,
    map: &MapInfo,
    scene: &mut SceneContext,
    progress: &dyn ProgressSink,
) -> WorldSerialization {
    let land = map.land_heightmap();
    let water = map.water_heightmap();
    let topology = map.topology_data().unwrap();
    let terrain = TerrainSource {
        land: &land,
        water: &water,
        splat: &map.splat_map,
        biome: &map.biome_map,
        alpha: &map.alpha_map,
        topology: &topology,
    };
    converter
        .terrain_to_world(&terrain, scene, IDS, progress)
        .expect("terrain_to_world failed")
}

pub fn export_quiet(converter: &WorldConverter, map: &MapInfo, scene: &mut SceneContext) -> WorldSerialization {
    export_world(converter, map, scene, &NoProgress)
}

pub fn vec3(x: f32, y: f32, z: f32) -> Vector3<f32> {
    Vector3::new(x, y, z)
}

pub fn prefab(id: u32) -> PrefabData {
    PrefabData {
        category: "Decor".to_string(),
        id,
        ..Default::default()
    }
}

pub fn path(name: &str) -> PathData {
    PathData {
        name: name.to_string(),
        spline: true,
        width: 4.0,
        splat: TerrainSplat::Dirt as i32,
        topology: TerrainTopology::Road.bits(),
        nodes: vec![VectorData::new(0.0, 0.0, 0.0)],
        ..Default::default()
    }
}

pub fn circuit(id: u32, inputs: &[u32], outputs: &[u32]) -> CircuitData {
    let link = |ids: &[u32]| {
        ids.iter()
            .enumerate()
            .map(|(slot, &id)| ConnectionData { id, slot: slot as i32 })
            .collect::<Vec<_>>()
    };
    CircuitData {
        path: format!("assets/electric/switch_{}.prefab", id),
        id,
        branch_in: link(inputs),
        branch_out: link(outputs),
        ..Default::default()
    }
}

/// Circuit holder whose refresh always fails.
pub struct BrokenCircuit {
    pub data: CircuitData,
}

impl CircuitHolder for BrokenCircuit {
    fn refresh(&mut self) -> Result<(), WorldError> {
        Err(WorldError::Scene(format!("circuit {} lost its scene object", self.data.id)))
    }

    fn circuit_data(&self) -> Option<&CircuitData> {
        Some(&self.data)
    }
}

/// Prefab holder whose refresh always fails.
pub struct BrokenPrefab {
    pub data: PrefabData,
}

impl PrefabHolder for BrokenPrefab {
    fn refresh(&mut self) -> Result<(), WorldError> {
        Err(WorldError::Scene(format!("prefab {} lost its scene object", self.data.id)))
    }

    fn prefab_data(&self) -> Option<&PrefabData> {
        Some(&self.data)
    }
}
