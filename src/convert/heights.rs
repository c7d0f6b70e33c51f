//! Height raster byte codec.
//!
//! Height maps are declared as one `i16` per cell, but the values written are
//! byte-quantized (`0..=255`) and read back through the byte path. This matches
//! the files the editor has always produced: a round trip is within 1/255,
//! not 1/32767.

use crate::math::bits::{byte_to_float, float_to_byte};
use crate::math::Grid;
use crate::terrain_map::TerrainMap;
use crate::world::Result;

/// Pack normalized heights into a 1-channel `i16` map buffer.
pub fn float_array_to_bytes(heights: &Grid<f32>) -> Result<Vec<u8>> {
    let mut map = TerrainMap::<i16>::new(heights.res(), 1);
    map.par_fill_channel(0, |row, col| float_to_byte(heights.get(row, col)) as i16)?;
    Ok(map.into_bytes())
}

/// Unpack channel 0 of an `i16` height map into normalized heights.
pub fn short_map_to_float_array(map: &TerrainMap<i16>) -> Result<Grid<f32>> {
    let res = map.res();
    let plane = map.channel_bytes(0)?;
    Ok(Grid::from_fn(res, 0.0, |row, col| {
        let offset = (row * res + col) * 2;
        let value = i16::from_le_bytes([plane[offset], plane[offset + 1]]);
        byte_to_float(value.clamp(0, 255) as u8)
    }))
}
