//! Scene-side collaborators consumed by the converter.
//!
//! The converter never reaches for global editor state. Callers hand it a
//! [`SceneContext`] (entity holders) and a [`TerrainSource`] (rasters), each
//! part optional where the editor may not have it loaded.

pub mod progress;

use cgmath::Vector3;

use crate::math::{Area, Grid, VectorData};
use crate::terrain_map::TerrainMap;
use crate::world::{CircuitData, ModifierData, NpcData, PathData, PrefabData, Result};

pub use progress::{ChannelProgress, NoProgress, ProgressIds, ProgressSink, ProgressUpdate};

/// A terrain whose heights are normalized to `[0, 1]` of `size.y`.
pub trait HeightProvider: Send + Sync {
    fn size(&self) -> Vector3<f32>;
    fn resolution(&self) -> usize;
    /// Heights of a square region, row-major.
    fn heights(&self, area: Area) -> Grid<f32>;
}

pub trait TopologySource: Send + Sync {
    /// Packed topology raster bytes.
    fn serialize_layers(&self) -> Result<Vec<u8>>;
    fn raster(&self) -> &TerrainMap<i32>;
}

pub trait PrefabHolder: Send {
    /// Recompute the prefab snapshot from the scene object.
    fn refresh(&mut self) -> Result<()>;
    fn prefab_data(&self) -> Option<&PrefabData>;
}

pub trait PathHolder: Send {
    fn path_data_mut(&mut self) -> Option<&mut PathData>;
    /// World positions of the node objects, in child order.
    fn child_positions(&self) -> Vec<Vector3<f32>>;
}

pub trait CircuitHolder: Send {
    fn refresh(&mut self) -> Result<()>;
    fn circuit_data(&self) -> Option<&CircuitData>;
}

pub trait NpcHolder: Send {
    fn bots(&self) -> Option<&NpcData>;
}

/// Entity holders of the current scene. `None` means the collection is not
/// available and contributes nothing.
pub struct SceneContext {
    pub prefabs: Option<Vec<Box<dyn PrefabHolder>>>,
    pub paths: Option<Vec<Box<dyn PathHolder>>>,
    pub circuits: Option<Vec<Box<dyn CircuitHolder>>>,
    pub npcs: Option<Vec<Box<dyn NpcHolder>>>,
    pub modifiers: Option<ModifierData>,
    /// World position of the map origin; path nodes are stored relative to it.
    pub map_offset: Vector3<f32>,
}

impl Default for SceneContext {
    fn default() -> Self {
        Self {
            prefabs: None,
            paths: None,
            circuits: None,
            npcs: None,
            modifiers: None,
            map_offset: Vector3::new(0.0, 0.0, 0.0),
        }
    }
}

impl SceneContext {
    pub fn new(map_offset: Vector3<f32>) -> Self {
        Self {
            prefabs: Some(Vec::new()),
            paths: Some(Vec::new()),
            circuits: Some(Vec::new()),
            npcs: Some(Vec::new()),
            modifiers: None,
            map_offset,
        }
    }
}

/// Rasters of the terrain being exported.
pub struct TerrainSource<'a> {
    pub land: &'a dyn HeightProvider,
    pub water: &'a dyn HeightProvider,
    pub splat: &'a Grid<[f32; 8]>,
    pub biome: &'a Grid<[f32; 4]>,
    /// `true` = solid, `false` = hole.
    pub alpha: &'a Grid<bool>,
    pub topology: &'a dyn TopologySource,
}

/// In-memory height provider.
#[derive(Debug, Clone)]
pub struct Heightmap {
    pub size: Vector3<f32>,
    pub heights: Grid<f32>,
}

impl Heightmap {
    pub fn new(size: Vector3<f32>, heights: Grid<f32>) -> Self {
        Self { size, heights }
    }
}

impl HeightProvider for Heightmap {
    fn size(&self) -> Vector3<f32> {
        self.size
    }

    fn resolution(&self) -> usize {
        self.heights.res()
    }

    fn heights(&self, area: Area) -> Grid<f32> {
        let area = area.clamp_to(self.heights.res());
        let side = (area.x1.saturating_sub(area.x0)).min(area.z1.saturating_sub(area.z0));
        Grid::from_fn(side, 0.0, |row, col| {
            self.heights.get(area.x0 + row, area.z0 + col)
        })
    }
}

/// Local transform of a scene object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vector3<f32>,
    pub rotation: Vector3<f32>,
    pub scale: Vector3<f32>,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vector3::new(0.0, 0.0, 0.0),
            rotation: Vector3::new(0.0, 0.0, 0.0),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }
}

/// A placed prefab whose snapshot follows its transform.
#[derive(Debug, Clone, Default)]
pub struct ScenePrefab {
    pub data: Option<PrefabData>,
    pub transform: Transform,
}

impl PrefabHolder for ScenePrefab {
    fn refresh(&mut self) -> Result<()> {
        if let Some(data) = self.data.as_mut() {
            data.position = VectorData(self.transform.position);
            data.rotation = VectorData(self.transform.rotation);
            data.scale = VectorData(self.transform.scale);
        }
        Ok(())
    }

    fn prefab_data(&self) -> Option<&PrefabData> {
        self.data.as_ref()
    }
}

/// A path with one node object per child, in world space.
#[derive(Debug, Clone, Default)]
pub struct ScenePath {
    pub data: Option<PathData>,
    pub children: Vec<Vector3<f32>>,
}

impl PathHolder for ScenePath {
    fn path_data_mut(&mut self) -> Option<&mut PathData> {
        self.data.as_mut()
    }

    fn child_positions(&self) -> Vec<Vector3<f32>> {
        self.children.clone()
    }
}

#[derive(Debug, Clone)]
pub struct SceneCircuit {
    pub data: Option<CircuitData>,
    pub position: Vector3<f32>,
}

impl SceneCircuit {
    pub fn new(data: CircuitData, position: Vector3<f32>) -> Self {
        Self {
            data: Some(data),
            position,
        }
    }
}

impl CircuitHolder for SceneCircuit {
    fn refresh(&mut self) -> Result<()> {
        if let Some(data) = self.data.as_mut() {
            data.position = VectorData(self.position);
            data.materialize_connections();
        }
        Ok(())
    }

    fn circuit_data(&self) -> Option<&CircuitData> {
        self.data.as_ref()
    }
}

#[derive(Debug, Clone, Default)]
pub struct SceneNpc {
    pub bots: Option<NpcData>,
}

impl NpcHolder for SceneNpc {
    fn bots(&self) -> Option<&NpcData> {
        self.bots.as_ref()
    }
}
