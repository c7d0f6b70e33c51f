use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use rme_tools_lib::layers::{TerrainBiome, TerrainSplat};
use rme_tools_lib::scene::{NoProgress, ProgressIds, SceneContext, TerrainSource};
use rme_tools_lib::{WorldConverter, WorldSerialization};

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    let result = match args.get(1).map(|s| s.as_str()) {
        Some("new") if args.len() >= 4 => new_map(&args[2..]),
        Some("info") if args.len() >= 3 => info(&args[2..]),
        _ => {
            print_usage();
            std::process::exit(1);
        }
    };

    if let Err(e) = result {
        eprintln!("Failed: {:?}", e);
        std::process::exit(1);
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  world-cli new <out.map> <size> [--land-height H] [--ground G] [--biome B]");
    eprintln!("  world-cli info <file.map> [--json]");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  world-cli new ./empty.map 2000");
    eprintln!("  world-cli new ./desert.map 3000 --land-height 520 --ground sand --biome arid");
    eprintln!("  world-cli info ./empty.map --json");
}

/// Value following `--name`, if present.
fn flag_value<'a>(args: &'a [String], name: &str) -> Result<Option<&'a str>> {
    match args.iter().position(|a| a == name) {
        Some(i) => args
            .get(i + 1)
            .map(|v| Some(v.as_str()))
            .ok_or_else(|| anyhow!("{} requires a value", name)),
        None => Ok(None),
    }
}

fn new_map(args: &[String]) -> Result<()> {
    let out_path = PathBuf::from(&args[0]);
    let size: i32 = args[1]
        .parse()
        .with_context(|| format!("Invalid map size '{}'", args[1]))?;

    let land_height: f32 = match flag_value(args, "--land-height")? {
        Some(v) => v
            .parse()
            .with_context(|| format!("Invalid land height '{}'", v))?,
        None => 500.0,
    };
    let ground: TerrainSplat = match flag_value(args, "--ground")? {
        Some(v) => v.parse().map_err(|e: String| anyhow!(e))?,
        None => TerrainSplat::Grass,
    };
    let biome: TerrainBiome = match flag_value(args, "--biome")? {
        Some(v) => v.parse().map_err(|e: String| anyhow!(e))?,
        None => TerrainBiome::Temperate,
    };

    eprintln!("Creating {}x{} map ...", size, size);
    eprintln!("  Land height: {}", land_height);
    eprintln!("  Ground: {:?}, biome: {:?}", ground, biome);

    let converter = WorldConverter::default();
    let map = converter.empty_map(size, land_height, ground, biome);

    let land = map.land_heightmap();
    let water = map.water_heightmap();
    let topology = map.topology_data()?;
    let terrain = TerrainSource {
        land: &land,
        water: &water,
        splat: &map.splat_map,
        biome: &map.biome_map,
        alpha: &map.alpha_map,
        topology: &topology,
    };
    let mut scene = SceneContext::new(cgmath::Vector3::new(0.0, 0.0, 0.0));

    let world = converter.terrain_to_world(&terrain, &mut scene, ProgressIds::default(), &NoProgress)?;
    world.save(&out_path)?;

    eprintln!("Saved {}", out_path.display());
    Ok(())
}

fn info(args: &[String]) -> Result<()> {
    let path = PathBuf::from(&args[0]);
    let json = args.iter().any(|a| a == "--json");

    let world = WorldSerialization::load(&path)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&world)?);
        return Ok(());
    }

    println!("World: {}", path.display());
    println!("  Version: {}", world.version);
    println!("  Size: {}", world.world.size);
    println!("  Maps:");
    for map in &world.world.maps {
        println!("    {} ({} bytes)", map.name, map.data.len());
    }
    println!("  Prefabs: {}", world.world.prefabs.len());
    println!("  Paths: {}", world.world.paths.len());
    println!("  Custom prefab:");
    println!("    Prefabs: {}", world.re_prefab.prefabs.len());
    println!("    Circuits: {}", world.re_prefab.electric.circuit_data.len());
    println!("    NPCs: {}", world.re_prefab.npcs.bots.len());
    println!("    Modifiers: {}", world.re_prefab.modifiers.entries.len());

    if world.world.maps.is_empty() {
        return Ok(());
    }

    match WorldConverter::default().world_to_terrain(&world) {
        Ok(map) => {
            println!("  Terrain resolution: {}", map.terrain_res);
            println!("  Splat resolution: {}", map.splat_res);
        }
        Err(e) => eprintln!("  Terrain decode failed: {}", e),
    }
    Ok(())
}
