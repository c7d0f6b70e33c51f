// Entity export: prefabs and paths gathered from scene holders into a world package,
// and the failures that abort it

use rme_tools_lib::layers::topology::TopologyData;
use rme_tools_lib::layers::{TerrainBiome, TerrainSplat};
use rme_tools_lib::math::{Grid, VectorData};
use rme_tools_lib::scene::{
    ChannelProgress, Heightmap, NoProgress, ProgressUpdate, SceneContext, ScenePath, ScenePrefab,
    TerrainSource, Transform,
};
use rme_tools_lib::world::WorldError;
use rme_tools_lib::WorldConverter;

#[path = "common/mod.rs"]
mod common;

fn small_map(converter: &WorldConverter) -> rme_tools_lib::MapInfo {
    converter.empty_map(32, 500.0, TerrainSplat::Grass, TerrainBiome::Temperate)
}

#[test]
fn prefabs_are_written_in_reverse_holder_order() {
    let converter = WorldConverter::default();
    let map = small_map(&converter);
    let mut scene = SceneContext::new(common::vec3(0.0, 0.0, 0.0));

    let holders = scene.prefabs.as_mut().unwrap();
    for id in 1..=3 {
        holders.push(Box::new(ScenePrefab {
            data: Some(common::prefab(id)),
            transform: Transform {
                position: common::vec3(id as f32, 0.0, 0.0),
                ..Default::default()
            },
        }));
    }
    // A holder without prefab data contributes nothing.
    holders.push(Box::new(ScenePrefab::default()));

    let world = common::export_quiet(&converter, &map, &mut scene);

    let ids: Vec<u32> = world.world.prefabs.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![3, 2, 1]);
    // Each snapshot was refreshed from its transform before being written.
    assert_eq!(world.world.prefabs[0].position, VectorData::new(3.0, 0.0, 0.0));
    assert_eq!(world.world.prefabs[2].scale, VectorData::new(1.0, 1.0, 1.0));
}

#[test]
fn path_nodes_are_relative_to_the_map_offset() {
    let converter = WorldConverter::default();
    let map = small_map(&converter);
    let mut scene = SceneContext::new(common::vec3(10.0, 0.0, 5.0));

    let holders = scene.paths.as_mut().unwrap();
    holders.push(Box::new(ScenePath {
        data: Some(common::path("road_a")),
        children: vec![common::vec3(11.0, 2.0, 6.0), common::vec3(20.0, 3.0, 15.0)],
    }));
    holders.push(Box::new(ScenePath {
        data: Some(common::path("road_b")),
        children: vec![],
    }));

    let world = common::export_quiet(&converter, &map, &mut scene);

    let names: Vec<&str> = world.world.paths.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["road_b", "road_a"]);
    assert_eq!(
        world.world.paths[1].nodes,
        vec![VectorData::new(1.0, 2.0, 1.0), VectorData::new(10.0, 3.0, 10.0)]
    );
    assert!(world.world.paths[0].nodes.is_empty());
    assert_eq!(world.world.paths[1].width, 4.0);
}

#[test]
fn unavailable_holders_export_terrain_only() {
    let converter = WorldConverter::default();
    let map = small_map(&converter);
    let mut scene = SceneContext::default();

    let world = common::export_quiet(&converter, &map, &mut scene);

    assert!(world.world.prefabs.is_empty());
    assert!(world.world.paths.is_empty());
    assert_eq!(world.world.maps.len(), 7);
}

#[test]
fn export_reports_progress_per_step() {
    let converter = WorldConverter::default();
    let map = small_map(&converter);
    let mut scene = SceneContext::new(common::vec3(0.0, 0.0, 0.0));
    scene.prefabs.as_mut().unwrap().push(Box::new(ScenePrefab {
        data: Some(common::prefab(1)),
        ..Default::default()
    }));

    let (progress, mut rx) = ChannelProgress::new(16);
    common::export_world(&converter, &map, &mut scene, &progress);

    let mut updates: Vec<ProgressUpdate> = Vec::new();
    while let Ok(update) = rx.try_recv() {
        updates.push(update);
    }

    let summary: Vec<(i32, &str)> = updates.iter().map(|u| (u.id, u.message.as_str())).collect();
    assert_eq!(
        summary,
        vec![
            (common::IDS.prefab, "Saved 1 prefabs."),
            (common::IDS.path, "Saved 0 paths."),
            (common::IDS.terrain, "Saved 32 size map."),
        ]
    );
    assert!(updates.iter().all(|u| u.progress == 0.99));
}

#[test]
fn full_progress_channel_does_not_fail_the_export() {
    let converter = WorldConverter::default();
    let map = small_map(&converter);
    let mut scene = SceneContext::new(common::vec3(0.0, 0.0, 0.0));

    let (progress, mut rx) = ChannelProgress::new(1);
    let world = common::export_world(&converter, &map, &mut scene, &progress);

    assert_eq!(world.world.maps.len(), 7);
    assert!(rx.try_recv().is_ok());
    assert!(rx.try_recv().is_err());
}

#[test]
fn failing_prefab_holder_aborts_the_export() {
    let converter = WorldConverter::default();
    let map = small_map(&converter);
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

    let mut scene = SceneContext::new(common::vec3(0.0, 0.0, 0.0));
    let holders = scene.prefabs.as_mut().unwrap();
    holders.push(Box::new(ScenePrefab {
        data: Some(common::prefab(1)),
        ..Default::default()
    }));
    holders.push(Box::new(common::BrokenPrefab {
        data: common::prefab(2),
    }));

    let (progress, mut rx) = ChannelProgress::new(8);
    let result = converter.terrain_to_world(&terrain, &mut scene, common::IDS, &progress);

    match result {
        Err(WorldError::Scene(msg)) => assert!(msg.contains("prefab 2")),
        Err(other) => panic!("expected Scene error, got {}", other),
        Ok(world) => panic!("expected failure, got {} prefabs", world.world.prefabs.len()),
    }
    // Nothing past the failing step reports.
    assert!(rx.try_recv().is_err());
}

#[test]
fn water_resolution_must_match_land() {
    let converter = WorldConverter::default();
    let map = small_map(&converter);
    let land = map.land_heightmap();
    let water = Heightmap::new(map.size, Grid::new(map.terrain_res - 1, 0.5));
    let topology = map.topology_data().unwrap();
    let terrain = TerrainSource {
        land: &land,
        water: &water,
        splat: &map.splat_map,
        biome: &map.biome_map,
        alpha: &map.alpha_map,
        topology: &topology,
    };
    let mut scene = SceneContext::default();

    match converter.terrain_to_world(&terrain, &mut scene, common::IDS, &NoProgress) {
        Err(WorldError::ResolutionMismatch {
            raster,
            expected,
            actual,
        }) => {
            assert_eq!(raster, "water");
            assert_eq!(expected, map.terrain_res);
            assert_eq!(actual, map.terrain_res - 1);
        }
        Err(other) => panic!("expected ResolutionMismatch, got {}", other),
        Ok(_) => panic!("expected ResolutionMismatch, got a package"),
    }
}

#[test]
fn biome_and_alpha_resolution_must_match_splat() {
    let converter = WorldConverter::default();
    let map = small_map(&converter);
    let land = map.land_heightmap();
    let water = map.water_heightmap();
    let topology = TopologyData::new(map.splat_res);
    let small_biome = Grid::new(map.splat_res / 2, [0.25f32; 4]);
    let small_alpha = Grid::new(map.splat_res * 2, true);
    let mut scene = SceneContext::default();

    let biome_terrain = TerrainSource {
        land: &land,
        water: &water,
        splat: &map.splat_map,
        biome: &small_biome,
        alpha: &map.alpha_map,
        topology: &topology,
    };
    assert!(matches!(
        converter.terrain_to_world(&biome_terrain, &mut scene, common::IDS, &NoProgress),
        Err(WorldError::ResolutionMismatch { ref raster, .. }) if raster == "biome"
    ));

    let alpha_terrain = TerrainSource {
        land: &land,
        water: &water,
        splat: &map.splat_map,
        biome: &map.biome_map,
        alpha: &small_alpha,
        topology: &topology,
    };
    assert!(matches!(
        converter.terrain_to_world(&alpha_terrain, &mut scene, common::IDS, &NoProgress),
        Err(WorldError::ResolutionMismatch { ref raster, .. }) if raster == "alpha"
    ));
}
