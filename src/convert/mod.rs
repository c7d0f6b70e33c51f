//! Conversion between the editor model ([`MapInfo`]) and the world package
//! ([`WorldSerialization`]).
//!
//! Raster passes are fork-join: independent transcodes run as rayon tasks
//! that each own a disjoint output, joined before the package is assembled.
//! A failing task fails the whole conversion. The one exception is
//! [`WorldConverter::terrain_to_custom_prefab`], which returns whatever it
//! gathered before the failure.

pub mod heights;
pub mod options;

use cgmath::Vector3;
use rayon::prelude::*;

use crate::layers::topology::TopologyData;
use crate::layers::{TerrainBiome, TerrainSplat};
use crate::math::bits::{bool_to_byte, byte_to_bool, byte_to_float, float_to_byte};
use crate::math::{next_power_of_two, set_values, Area, Grid, VectorData};
use crate::scene::{Heightmap, ProgressIds, ProgressSink, SceneContext, TerrainSource};
use crate::terrain_map::TerrainMap;
use crate::world::{
    CircuitData, ModifierData, NpcData, PathData, PrefabData, Result, WorldError,
    WorldSerialization,
};

pub use heights::{float_array_to_bytes, short_map_to_float_array};
pub use options::ConvertOptions;

pub const SPLAT_CHANNELS: usize = TerrainSplat::COUNT;
pub const BIOME_CHANNELS: usize = TerrainBiome::COUNT;

#[derive(Debug, Clone, PartialEq)]
pub struct TerrainInfo {
    /// Normalized heights, `[0, 1]` of the vertical scale.
    pub heights: Grid<f32>,
}

/// Editor-side view of a map, rebuilt on every conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct MapInfo {
    pub terrain_res: usize,
    pub splat_res: usize,
    /// x = z = side length, y = vertical scale.
    pub size: Vector3<f32>,
    pub splat_map: Grid<[f32; SPLAT_CHANNELS]>,
    pub biome_map: Grid<[f32; BIOME_CHANNELS]>,
    /// `true` = solid, `false` = hole.
    pub alpha_map: Grid<bool>,
    pub land: TerrainInfo,
    pub water: TerrainInfo,
    pub topology: TerrainMap<i32>,
    pub prefab_data: Vec<PrefabData>,
    pub path_data: Vec<PathData>,
    pub circuit_data: Vec<CircuitData>,
    pub npc_data: Vec<NpcData>,
    pub modifier_data: Option<ModifierData>,
}

impl Default for MapInfo {
    fn default() -> Self {
        Self {
            terrain_res: 0,
            splat_res: 0,
            size: Vector3::new(0.0, 0.0, 0.0),
            splat_map: Grid::new(0, [0.0; SPLAT_CHANNELS]),
            biome_map: Grid::new(0, [0.0; BIOME_CHANNELS]),
            alpha_map: Grid::new(0, true),
            land: TerrainInfo {
                heights: Grid::new(0, 0.0),
            },
            water: TerrainInfo {
                heights: Grid::new(0, 0.0),
            },
            topology: TerrainMap::new(0, 1),
            prefab_data: Vec::new(),
            path_data: Vec::new(),
            circuit_data: Vec::new(),
            npc_data: Vec::new(),
            modifier_data: None,
        }
    }
}

impl MapInfo {
    pub fn land_heightmap(&self) -> Heightmap {
        Heightmap::new(self.size, self.land.heights.clone())
    }

    pub fn water_heightmap(&self) -> Heightmap {
        Heightmap::new(self.size, self.water.heights.clone())
    }

    pub fn topology_data(&self) -> Result<TopologyData> {
        TopologyData::from_map(self.topology.clone())
    }
}

#[derive(Debug, Clone, Default)]
pub struct WorldConverter {
    pub options: ConvertOptions,
}

impl WorldConverter {
    pub fn new(options: ConvertOptions) -> Self {
        Self { options }
    }

    /// Blank map of side `size`: flat land at `land_height`, water at the
    /// configured level, one ground and one biome everywhere, no holes, no
    /// topology.
    pub fn empty_map(
        &self,
        size: i32,
        land_height: f32,
        ground: TerrainSplat,
        biome: TerrainBiome,
    ) -> MapInfo {
        let (terrain_res, splat_res) = self.resolutions(size);
        let scale = self.options.height_scale;

        let land = set_values(
            Grid::new(terrain_res, 0.0),
            land_height / scale,
            Area::full(terrain_res),
        );
        let water = set_values(
            Grid::new(terrain_res, 0.0),
            self.options.water_level / scale,
            Area::full(terrain_res),
        );

        let ground_idx = ground.to_index();
        let splat_map = Grid::from_fn(splat_res, [0.0; SPLAT_CHANNELS], |_, _| {
            one_hot::<SPLAT_CHANNELS>(ground_idx)
        });
        let biome_idx = biome.to_index();
        let biome_map = Grid::from_fn(splat_res, [0.0; BIOME_CHANNELS], |_, _| {
            one_hot::<BIOME_CHANNELS>(biome_idx)
        });
        let alpha_map = Grid::from_fn(splat_res, false, |_, _| true);

        log::debug!(
            "Created empty map: size={}, terrain_res={}, splat_res={}",
            size,
            terrain_res,
            splat_res
        );

        MapInfo {
            terrain_res,
            splat_res,
            size: Vector3::new(size as f32, scale, size as f32),
            splat_map,
            biome_map,
            alpha_map,
            land: TerrainInfo { heights: land },
            water: TerrainInfo { heights: water },
            topology: TerrainMap::new(splat_res, 1),
            ..Default::default()
        }
    }

    /// `(terrain_res, splat_res)` of a new map with side `size`.
    pub fn resolutions(&self, size: i32) -> (usize, usize) {
        let half_pow2 = next_power_of_two((size as f32 * 0.5) as i32);
        let splat_res = half_pow2.clamp(self.options.min_splat_res, self.options.max_splat_res);
        (half_pow2 + 1, splat_res)
    }

    /// Decode packed splat, biome and alpha maps into `map_info`'s rasters.
    pub fn convert_maps(
        &self,
        mut map_info: MapInfo,
        splat_map: &TerrainMap<u8>,
        biome_map: &TerrainMap<u8>,
        alpha_map: &TerrainMap<u8>,
    ) -> Result<MapInfo> {
        expect_channels("splat", splat_map.channels(), SPLAT_CHANNELS, splat_map.as_bytes().len())?;
        expect_channels("biome", biome_map.channels(), BIOME_CHANNELS, biome_map.as_bytes().len())?;
        expect_channels("alpha", alpha_map.channels(), 1, alpha_map.as_bytes().len())?;

        let (splat, (biome, alpha)) = rayon::join(
            || decode_weights::<SPLAT_CHANNELS>(splat_map),
            || {
                rayon::join(
                    || decode_weights::<BIOME_CHANNELS>(biome_map),
                    || decode_alpha(alpha_map),
                )
            },
        );

        map_info.splat_map = splat?;
        map_info.biome_map = biome?;
        map_info.alpha_map = alpha?;
        map_info.splat_res = splat_map.res();
        Ok(map_info)
    }

    /// Rebuild the editor model from a full world package.
    pub fn world_to_terrain(&self, world: &WorldSerialization) -> Result<MapInfo> {
        let size = world.world.size as f32;

        let terrain_map = TerrainMap::<i16>::from_bytes(world.get_map("terrain")?.data.clone(), 1)?;
        let height_map = TerrainMap::<i16>::from_bytes(world.get_map("height")?.data.clone(), 1)?;
        let water_map = TerrainMap::<i16>::from_bytes(world.get_map("water")?.data.clone(), 1)?;
        let splat_map = TerrainMap::<u8>::from_bytes(world.get_map("splat")?.data.clone(), SPLAT_CHANNELS)?;
        let topology_map = TerrainMap::<i32>::from_bytes(world.get_map("topology")?.data.clone(), 1)?;
        let biome_map = TerrainMap::<u8>::from_bytes(world.get_map("biome")?.data.clone(), BIOME_CHANNELS)?;
        let alpha_map = TerrainMap::<u8>::from_bytes(world.get_map("alpha")?.data.clone(), 1)?;

        if terrain_map != height_map {
            log::debug!("\"terrain\" and \"height\" maps differ; using \"height\"");
        }

        let map_info = MapInfo {
            terrain_res: height_map.res(),
            splat_res: splat_map.res(),
            size: Vector3::new(size, self.options.height_scale, size),
            topology: topology_map,
            prefab_data: world.world.prefabs.clone(),
            path_data: world.world.paths.clone(),
            ..Default::default()
        };

        let ((land, water), map_info) = rayon::join(
            || {
                rayon::join(
                    || short_map_to_float_array(&height_map),
                    || short_map_to_float_array(&water_map),
                )
            },
            || self.convert_maps(map_info, &splat_map, &biome_map, &alpha_map),
        );

        let mut map_info = map_info?;
        map_info.land.heights = land?;
        map_info.water.heights = water?;

        log::info!(
            "Loaded world: size={}, terrain_res={}, splat_res={}, {} prefabs, {} paths",
            size,
            map_info.terrain_res,
            map_info.splat_res,
            map_info.prefab_data.len(),
            map_info.path_data.len()
        );
        Ok(map_info)
    }

    /// Pack the terrain rasters and the scene's prefabs and paths into a
    /// full world package.
    pub fn terrain_to_world(
        &self,
        terrain: &TerrainSource,
        scene: &mut SceneContext,
        ids: ProgressIds,
        progress: &dyn ProgressSink,
    ) -> Result<WorldSerialization> {
        let mut world = WorldSerialization::new();
        let land_size = terrain.land.size();
        world.world.size = land_size.x as u32;

        let texture_res = terrain.splat.res();
        expect_res("biome", terrain.biome.res(), texture_res)?;
        expect_res("alpha", terrain.alpha.res(), texture_res)?;
        let height_res = terrain.land.resolution();
        expect_res("water", terrain.water.resolution(), height_res)?;

        let mut splat_bytes: Result<Vec<u8>> = Ok(Vec::new());
        let mut biome_bytes: Result<Vec<u8>> = Ok(Vec::new());
        let mut alpha_bytes: Result<Vec<u8>> = Ok(Vec::new());
        let mut topology_bytes: Result<Vec<u8>> = Ok(Vec::new());
        let mut land_bytes: Result<Vec<u8>> = Ok(Vec::new());
        let mut water_bytes: Result<Vec<u8>> = Ok(Vec::new());
        let mut entities: Result<()> = Ok(());

        rayon::scope(|s| {
            s.spawn(|_| splat_bytes = encode_weights(terrain.splat));
            s.spawn(|_| biome_bytes = encode_weights(terrain.biome));
            s.spawn(|_| alpha_bytes = encode_alpha(terrain.alpha));
            s.spawn(|_| topology_bytes = terrain.topology.serialize_layers());

            entities = collect_world_entities(&mut world, scene, ids, progress);

            land_bytes = float_array_to_bytes(&terrain.land.heights(Area::full(height_res)));
            water_bytes = float_array_to_bytes(&terrain.water.heights(Area::full(height_res)));
        });

        entities?;
        let land_bytes = land_bytes?;
        let water_bytes = water_bytes?;
        let splat_bytes = splat_bytes?;
        let biome_bytes = biome_bytes?;
        let alpha_bytes = alpha_bytes?;
        let topology_bytes = topology_bytes?;

        progress.report(
            ids.terrain,
            0.99,
            &format!("Saved {} size map.", land_size.x),
        );

        world.add_map("terrain", land_bytes.clone());
        world.add_map("height", land_bytes);
        world.add_map("water", water_bytes);
        world.add_map("splat", splat_bytes);
        world.add_map("biome", biome_bytes);
        world.add_map("alpha", alpha_bytes);
        world.add_map("topology", topology_bytes);

        log::info!(
            "Exported world: size={}, {} prefabs, {} paths",
            world.world.size,
            world.world.prefabs.len(),
            world.world.paths.len()
        );
        Ok(world)
    }

    /// Extract the entity lists of a reusable prefab package, snapshotting
    /// every circuit's connections.
    pub fn world_to_re_prefab(&self, world: &WorldSerialization) -> MapInfo {
        let re_prefab = &world.re_prefab;
        let mut circuit_data = re_prefab.electric.circuit_data.clone();
        for circuit in circuit_data.iter_mut() {
            circuit.materialize_connections();
        }

        MapInfo {
            prefab_data: re_prefab.prefabs.clone(),
            circuit_data,
            npc_data: re_prefab.npcs.bots.clone(),
            modifier_data: Some(re_prefab.modifiers.clone()),
            ..Default::default()
        }
    }

    /// Gather modifiers, NPCs, prefabs and circuits into a reusable prefab
    /// package. A holder failure is logged and the entries gathered before it
    /// are returned.
    pub fn terrain_to_custom_prefab(
        &self,
        scene: &mut SceneContext,
        ids: ProgressIds,
        progress: &dyn ProgressSink,
    ) -> WorldSerialization {
        let mut world = WorldSerialization::new();
        if let Err(e) = collect_re_prefab_entities(&mut world, scene, ids, progress) {
            log::error!("Custom prefab export stopped early: {}", e);
        }
        world
    }
}

fn one_hot<const N: usize>(index: usize) -> [f32; N] {
    let mut weights = [0.0; N];
    if let Some(w) = weights.get_mut(index) {
        *w = 1.0;
    }
    weights
}

fn expect_channels(name: &str, actual: usize, expected: usize, len: usize) -> Result<()> {
    if actual != expected {
        return Err(WorldError::ShapeMismatch {
            expected: format!("{} channel(s) for {} map, found {}", expected, name, actual),
            actual: len,
        });
    }
    Ok(())
}

fn expect_res(name: &str, actual: usize, expected: usize) -> Result<()> {
    if actual != expected {
        return Err(WorldError::ResolutionMismatch {
            raster: name.to_string(),
            expected,
            actual,
        });
    }
    Ok(())
}

fn decode_weights<const N: usize>(map: &TerrainMap<u8>) -> Result<Grid<[f32; N]>> {
    let res = map.res();
    let planes = (0..N)
        .map(|c| map.channel_bytes(c))
        .collect::<Result<Vec<_>>>()?;
    Ok(Grid::from_fn(res, [0.0; N], |row, col| {
        let idx = row * res + col;
        std::array::from_fn(|k| byte_to_float(planes[k][idx]))
    }))
}

fn decode_alpha(map: &TerrainMap<u8>) -> Result<Grid<bool>> {
    let res = map.res();
    let plane = map.channel_bytes(0)?;
    Ok(Grid::from_fn(res, false, |row, col| {
        byte_to_bool(plane[row * res + col])
    }))
}

/// Pack an N-weight raster into an N-channel byte map, one task per channel.
fn encode_weights<const N: usize>(grid: &Grid<[f32; N]>) -> Result<Vec<u8>> {
    let mut map = TerrainMap::<u8>::new(grid.res(), N);
    let cells = grid.cells();
    map.channel_bytes_mut()
        .into_par_iter()
        .enumerate()
        .for_each(|(channel, plane)| {
            for (byte, weights) in plane.iter_mut().zip(cells) {
                *byte = float_to_byte(weights[channel]);
            }
        });
    Ok(map.into_bytes())
}

fn encode_alpha(alpha: &Grid<bool>) -> Result<Vec<u8>> {
    let mut map = TerrainMap::<u8>::new(alpha.res(), 1);
    map.par_fill_channel(0, |row, col| bool_to_byte(alpha.get(row, col)))?;
    Ok(map.into_bytes())
}

/// Insert each staged item at the front of `list`, in staging order.
fn prepend_each<T>(list: &mut Vec<T>, mut staged: Vec<T>) {
    staged.reverse();
    list.splice(0..0, staged);
}

fn collect_world_entities(
    world: &mut WorldSerialization,
    scene: &mut SceneContext,
    ids: ProgressIds,
    progress: &dyn ProgressSink,
) -> Result<()> {
    match scene.prefabs.as_mut() {
        Some(holders) => {
            let mut staged = Vec::new();
            for holder in holders.iter_mut() {
                if holder.prefab_data().is_none() {
                    continue;
                }
                holder.refresh()?;
                if let Some(data) = holder.prefab_data() {
                    staged.push(data.clone());
                }
            }
            let count = staged.len();
            prepend_each(&mut world.world.prefabs, staged);
            progress.report(ids.prefab, 0.99, &format!("Saved {} prefabs.", count));
        }
        None => log::warn!("No prefab holders available; exporting without prefabs"),
    }

    let offset = scene.map_offset;
    match scene.paths.as_mut() {
        Some(holders) => {
            let mut staged = Vec::new();
            for holder in holders.iter_mut() {
                let children = holder.child_positions();
                if let Some(data) = holder.path_data_mut() {
                    data.nodes = children.iter().map(|p| VectorData(*p - offset)).collect();
                    staged.push(data.clone());
                }
            }
            let count = staged.len();
            prepend_each(&mut world.world.paths, staged);
            progress.report(ids.path, 0.99, &format!("Saved {} paths.", count));
        }
        None => log::warn!("No path holders available; exporting without paths"),
    }

    Ok(())
}

fn collect_re_prefab_entities(
    world: &mut WorldSerialization,
    scene: &mut SceneContext,
    ids: ProgressIds,
    progress: &dyn ProgressSink,
) -> Result<()> {
    if let Some(modifiers) = scene.modifiers.as_ref() {
        world.re_prefab.modifiers = modifiers.clone();
    }

    match scene.npcs.as_ref() {
        Some(holders) => {
            let staged = holders
                .iter()
                .filter_map(|h| h.bots().cloned())
                .collect::<Vec<_>>();
            prepend_each(&mut world.re_prefab.npcs.bots, staged);
        }
        None => log::warn!("No NPC holders available"),
    }

    match scene.prefabs.as_mut() {
        Some(holders) => {
            for holder in holders.iter_mut() {
                if holder.prefab_data().is_none() {
                    continue;
                }
                holder.refresh()?;
                if let Some(data) = holder.prefab_data() {
                    world.re_prefab.prefabs.push(data.clone());
                }
            }
        }
        None => log::warn!("No prefab holders available"),
    }

    match scene.circuits.as_mut() {
        Some(holders) => {
            let mut staged = Vec::new();
            let mut failure = None;
            for holder in holders.iter_mut() {
                if holder.circuit_data().is_none() {
                    continue;
                }
                if let Err(e) = holder.refresh() {
                    failure = Some(e);
                    break;
                }
                if let Some(data) = holder.circuit_data() {
                    staged.push(data.clone());
                }
            }
            prepend_each(&mut world.re_prefab.electric.circuit_data, staged);
            if let Some(e) = failure {
                return Err(e);
            }
        }
        None => log::warn!("No circuit holders available"),
    }

    progress.report(
        ids.prefab,
        0.99,
        &format!("Saved {} prefabs.", world.re_prefab.prefabs.len()),
    );
    progress.report(
        ids.circuit,
        0.99,
        &format!("Saved {} circuits.", world.re_prefab.electric.circuit_data.len()),
    );
    Ok(())
}
