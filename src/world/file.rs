//! On-disk world package codec.
//!
//! Layout (little-endian): `version: u32`, then the world body (`size`, maps,
//! prefabs, paths), then the reusable-prefab body. The whole input must be
//! consumed.

use std::io::Cursor;
use std::path::Path;

use anyhow::{Context, Result as AnyResult};
use binrw::{BinReaderExt, BinWrite};

use super::{RePrefabData, Result, WorldData, WorldError, WorldSerialization};

pub const WORLD_VERSION: u32 = 10;

impl WorldSerialization {
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut cursor = Cursor::new(Vec::new());
        self.version.write_le(&mut cursor)?;
        self.world.write_le(&mut cursor)?;
        self.re_prefab.write_le(&mut cursor)?;
        Ok(cursor.into_inner())
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut cursor = Cursor::new(bytes);
        let version: u32 = cursor.read_le()?;
        if version != WORLD_VERSION {
            return Err(WorldError::InvalidFormat(format!(
                "Unsupported world version: {}. Expected {}",
                version, WORLD_VERSION
            )));
        }

        let world: WorldData = cursor.read_le()?;
        let re_prefab: RePrefabData = cursor.read_le()?;

        let consumed = cursor.position() as usize;
        if consumed != bytes.len() {
            return Err(WorldError::InvalidFormat(format!(
                "{} trailing byte(s) after package body",
                bytes.len() - consumed
            )));
        }

        Ok(Self {
            version,
            world,
            re_prefab,
        })
    }

    pub fn save(&self, path: &Path) -> AnyResult<()> {
        let bytes = self.to_bytes()?;
        std::fs::write(path, bytes)
            .with_context(|| format!("Failed to write world file: {}", path.display()))?;
        log::info!(
            "Saved world package to {} ({} maps, {} prefabs, {} paths)",
            path.display(),
            self.world.maps.len(),
            self.world.prefabs.len(),
            self.world.paths.len()
        );
        Ok(())
    }

    pub fn load(path: &Path) -> AnyResult<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read world file: {}", path.display()))?;
        let world = Self::from_bytes(&bytes)
            .with_context(|| format!("Failed to parse world file: {}", path.display()))?;
        log::debug!("Loaded world package {} (size {})", path.display(), world.world.size);
        Ok(world)
    }
}
