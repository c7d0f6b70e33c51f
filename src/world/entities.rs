//! Entity records carried by a world package.
//!
//! Strings are `u32` length + UTF-8 bytes, lists are `u32` count + items,
//! flags are one byte. Everything is little-endian.

use binrw::io::{Read, Seek, SeekFrom, Write};
use binrw::{binrw, BinRead, BinResult, BinWrite};
use serde::{Deserialize, Serialize};

use crate::math::VectorData;

/// Read `len` bytes, failing before allocation if fewer remain in the stream.
pub(crate) fn read_block<R: Read + Seek>(reader: &mut R, len: u32) -> BinResult<Vec<u8>> {
    let pos = reader.stream_position()?;
    let end = reader.seek(SeekFrom::End(0))?;
    reader.seek(SeekFrom::Start(pos))?;

    let remaining = end.saturating_sub(pos);
    if u64::from(len) > remaining {
        return Err(binrw::Error::AssertFail {
            pos,
            message: format!("length {} exceeds the {} byte(s) left", len, remaining),
        });
    }

    let mut buf = vec![0u8; len as usize];
    reader.read_exact(&mut buf)?;
    Ok(buf)
}

#[binrw::parser(reader, endian)]
pub(crate) fn read_string() -> BinResult<String> {
    let len = u32::read_options(reader, endian, ())?;
    let pos = reader.stream_position()?;
    let buf = read_block(reader, len)?;
    String::from_utf8(buf).map_err(|e| binrw::Error::AssertFail {
        pos,
        message: format!("string is not valid UTF-8: {}", e),
    })
}

/// Length-checked byte payload whose count was read earlier.
#[binrw::parser(reader)]
pub(crate) fn read_bytes(len: u32) -> BinResult<Vec<u8>> {
    read_block(reader, len)
}

#[binrw::writer(writer, endian)]
pub(crate) fn write_string(value: &String) -> BinResult<()> {
    (value.len() as u32).write_options(writer, endian, ())?;
    writer.write_all(value.as_bytes())?;
    Ok(())
}

#[binrw]
#[brw(little)]
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrefabData {
    #[br(parse_with = read_string)]
    #[bw(write_with = write_string)]
    pub category: String,
    pub id: u32,
    pub position: VectorData,
    pub rotation: VectorData,
    pub scale: VectorData,
}

#[binrw]
#[brw(little)]
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathData {
    #[br(parse_with = read_string)]
    #[bw(write_with = write_string)]
    pub name: String,
    #[br(map = |x: u8| x != 0)]
    #[bw(map = |x: &bool| *x as u8)]
    pub spline: bool,
    #[br(map = |x: u8| x != 0)]
    #[bw(map = |x: &bool| *x as u8)]
    pub start: bool,
    #[br(map = |x: u8| x != 0)]
    #[bw(map = |x: &bool| *x as u8)]
    pub end: bool,
    pub width: f32,
    pub inner_padding: f32,
    pub outer_padding: f32,
    pub inner_fade: f32,
    pub outer_fade: f32,
    pub random_scale: f32,
    pub mesh_offset: f32,
    pub terrain_offset: f32,
    pub splat: i32,
    pub topology: i32,
    #[br(temp)]
    #[bw(calc = nodes.len() as u32)]
    node_count: u32,
    /// Node positions relative to the map origin.
    #[br(count = node_count)]
    pub nodes: Vec<VectorData>,
}

/// One end of an electrical connection: the peer circuit and its slot.
#[binrw]
#[brw(little)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionData {
    pub id: u32,
    pub slot: i32,
}

#[binrw]
#[brw(little)]
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CircuitData {
    #[br(parse_with = read_string)]
    #[bw(write_with = write_string)]
    pub path: String,
    pub id: u32,
    pub position: VectorData,
    #[br(temp)]
    #[bw(calc = branch_in.len() as u32)]
    branch_in_count: u32,
    #[br(count = branch_in_count)]
    pub branch_in: Vec<ConnectionData>,
    #[br(temp)]
    #[bw(calc = branch_out.len() as u32)]
    branch_out_count: u32,
    #[br(count = branch_out_count)]
    pub branch_out: Vec<ConnectionData>,
    /// Snapshot of `branch_in`; rebuilt by [`CircuitData::materialize_connections`].
    #[brw(ignore)]
    pub connections_in: Box<[ConnectionData]>,
    /// Snapshot of `branch_out`; rebuilt by [`CircuitData::materialize_connections`].
    #[brw(ignore)]
    pub connections_out: Box<[ConnectionData]>,
}

impl CircuitData {
    /// Rebuild the connection arrays from the branch lists.
    ///
    /// The arrays are independent copies: later edits to the branch lists do
    /// not show through until the next call.
    pub fn materialize_connections(&mut self) {
        self.connections_in = self.branch_in.clone().into_boxed_slice();
        self.connections_out = self.branch_out.clone().into_boxed_slice();
    }
}

#[binrw]
#[brw(little)]
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NpcData {
    #[br(parse_with = read_string)]
    #[bw(write_with = write_string)]
    pub category: String,
    pub id: u32,
    pub position: VectorData,
    pub rotation: VectorData,
    pub scale: VectorData,
}

#[binrw]
#[brw(little)]
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModifierEntry {
    #[br(parse_with = read_string)]
    #[bw(write_with = write_string)]
    pub key: String,
    #[br(parse_with = read_string)]
    #[bw(write_with = write_string)]
    pub value: String,
}

/// Key/value overrides applied when a reusable prefab is placed.
#[binrw]
#[brw(little)]
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModifierData {
    #[br(temp)]
    #[bw(calc = entries.len() as u32)]
    entry_count: u32,
    #[br(count = entry_count)]
    pub entries: Vec<ModifierEntry>,
}
