// Round-trip test: editor rasters → world package → world file → editor rasters

use rme_tools_lib::layers::topology::{TerrainTopology, TopologyData};
use rme_tools_lib::layers::{TerrainBiome, TerrainSplat};
use rme_tools_lib::scene::SceneContext;
use rme_tools_lib::world::{WorldError, MAP_NAMES};
use rme_tools_lib::{WorldConverter, WorldSerialization};
use tempfile::TempDir;

#[path = "common/mod.rs"]
mod common;

const STEP: f32 = 1.0 / 255.0;

#[test]
fn terrain_survives_export_and_import() {
    let converter = WorldConverter::default();
    let map = common::varied_map(&converter);
    let mut scene = SceneContext::new(common::vec3(0.0, 0.0, 0.0));

    let world = common::export_quiet(&converter, &map, &mut scene);
    let back = converter.world_to_terrain(&world).unwrap();

    assert_eq!(back.terrain_res, map.terrain_res);
    assert_eq!(back.splat_res, map.splat_res);
    assert_eq!(back.size, map.size);

    for (a, b) in map.land.heights.cells().iter().zip(back.land.heights.cells()) {
        assert!((a - b).abs() <= STEP, "land {} vs {}", a, b);
    }
    for (a, b) in map.water.heights.cells().iter().zip(back.water.heights.cells()) {
        assert!((a - b).abs() <= STEP, "water {} vs {}", a, b);
    }
    for (a, b) in map.splat_map.cells().iter().zip(back.splat_map.cells()) {
        for k in 0..8 {
            assert!((a[k] - b[k]).abs() <= STEP);
        }
    }
    assert_eq!(back.biome_map, map.biome_map);
    assert_eq!(back.alpha_map, map.alpha_map);
    assert!(!back.alpha_map.get(3, 4));
    assert_eq!(back.topology, map.topology);

    let topology = TopologyData::from_map(back.topology).unwrap();
    assert!(topology.layer(TerrainTopology::Road).get(7, 12));
    assert!(!topology.layer(TerrainTopology::Road).get(8, 12));
    assert_eq!(
        TerrainTopology::decompose(topology.get(0, 0).unwrap()),
        vec![TerrainTopology::Beach, TerrainTopology::Ocean]
    );
}

#[test]
fn export_writes_every_map_in_order() {
    let converter = WorldConverter::default();
    let map = converter.empty_map(64, 250.0, TerrainSplat::Rock, TerrainBiome::Temperate);
    let mut scene = SceneContext::new(common::vec3(0.0, 0.0, 0.0));

    let world = common::export_quiet(&converter, &map, &mut scene);

    assert_eq!(world.world.size, 64);
    assert_eq!(world.map_names(), MAP_NAMES.to_vec());
    insta::assert_debug_snapshot!(world.map_names(), @r###"
    [
        "terrain",
        "height",
        "water",
        "splat",
        "biome",
        "alpha",
        "topology",
    ]
    "###);

    // "terrain" and "height" carry the same land raster.
    let terrain = world.get_map("terrain").unwrap();
    let height = world.get_map("height").unwrap();
    assert_eq!(terrain.data, height.data);
    assert_eq!(height.data.len(), 33 * 33 * 2);

    assert_eq!(world.get_map("splat").unwrap().data.len(), 8 * 32 * 32);
    assert_eq!(world.get_map("biome").unwrap().data.len(), 4 * 32 * 32);
    assert_eq!(world.get_map("alpha").unwrap().data.len(), 32 * 32);
    assert_eq!(world.get_map("topology").unwrap().data.len(), 32 * 32 * 4);
}

#[test]
fn world_file_round_trip() {
    let converter = WorldConverter::default();
    let map = common::varied_map(&converter);
    let mut scene = SceneContext::new(common::vec3(0.0, 0.0, 0.0));
    if let Some(prefabs) = scene.prefabs.as_mut() {
        prefabs.push(Box::new(rme_tools_lib::scene::ScenePrefab {
            data: Some(common::prefab(7)),
            ..Default::default()
        }));
    }
    let world = common::export_quiet(&converter, &map, &mut scene);

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("varied.map");
    world.save(&path).unwrap();
    let loaded = WorldSerialization::load(&path).unwrap();

    assert_eq!(loaded, world);
    assert_eq!(
        converter.world_to_terrain(&loaded).unwrap(),
        converter.world_to_terrain(&world).unwrap()
    );
}

#[test]
fn load_reports_the_path_on_failure() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("missing.map");

    let err = WorldSerialization::load(&path).unwrap_err();
    assert!(format!("{:#}", err).contains("missing.map"));
}

#[test]
fn import_rejects_a_missing_alpha_map() {
    let converter = WorldConverter::default();
    let map = converter.empty_map(32, 500.0, TerrainSplat::Grass, TerrainBiome::Temperate);
    let mut scene = SceneContext::default();
    let mut world = common::export_quiet(&converter, &map, &mut scene);
    world.world.maps.retain(|m| m.name != "alpha");

    match converter.world_to_terrain(&world) {
        Err(WorldError::MissingMap(name)) => assert_eq!(name, "alpha"),
        other => panic!("expected MissingMap, got {:?}", other.map(|m| m.terrain_res)),
    }
}

#[test]
fn import_rejects_a_truncated_raster() {
    let converter = WorldConverter::default();
    let map = converter.empty_map(32, 500.0, TerrainSplat::Grass, TerrainBiome::Temperate);
    let mut scene = SceneContext::default();
    let mut world = common::export_quiet(&converter, &map, &mut scene);
    let splat = world.get_map("splat").unwrap().data[..100].to_vec();
    world.add_map("splat", splat);

    assert!(matches!(
        converter.world_to_terrain(&world),
        Err(WorldError::ShapeMismatch { .. })
    ));
}
