//! Channel-major multi-channel raster backed by one byte buffer.
//!
//! Layout: for channel `c`, cell `(row, col)` is element
//! `c * res * res + row * res + col`, each element stored little-endian in
//! `size_of::<T>()` bytes. The buffer length is always
//! `channels * res * res * size_of::<T>()`.

use rayon::prelude::*;

use crate::world::{Result, WorldError};

/// Cell type of a [`TerrainMap`].
pub trait MapElement: bytemuck::Pod + Default + Send + Sync {
    const SIZE: usize = std::mem::size_of::<Self>();

    /// Decode from exactly `SIZE` little-endian bytes.
    fn read_le(bytes: &[u8]) -> Self;

    /// Encode into exactly `SIZE` bytes.
    fn write_le(self, out: &mut [u8]);
}

macro_rules! impl_map_element {
    ($($t:ty),*) => {
        $(
            impl MapElement for $t {
                fn read_le(bytes: &[u8]) -> Self {
                    <$t>::from_le(bytemuck::pod_read_unaligned(bytes))
                }

                fn write_le(self, out: &mut [u8]) {
                    out.copy_from_slice(bytemuck::bytes_of(&self.to_le()));
                }
            }
        )*
    };
}

impl_map_element!(u8, i16, i32);

#[derive(Debug, Clone, PartialEq)]
pub struct TerrainMap<T: MapElement> {
    data: Vec<u8>,
    res: usize,
    channels: usize,
    _cell: std::marker::PhantomData<T>,
}

impl<T: MapElement> TerrainMap<T> {
    /// Zero-filled map of `channels` channels at `res x res`.
    pub fn new(res: usize, channels: usize) -> Self {
        Self {
            data: vec![0u8; channels * res * res * T::SIZE],
            res,
            channels,
            _cell: std::marker::PhantomData,
        }
    }

    /// Wrap a packed buffer, inferring the resolution from its length.
    pub fn from_bytes(data: Vec<u8>, channels: usize) -> Result<Self> {
        let res = infer_res(data.len(), channels, T::SIZE).ok_or_else(|| {
            WorldError::ShapeMismatch {
                expected: format!(
                    "{} channel(s) x {} byte(s) x res^2",
                    channels,
                    T::SIZE
                ),
                actual: data.len(),
            }
        })?;

        Ok(Self {
            data,
            res,
            channels,
            _cell: std::marker::PhantomData,
        })
    }

    pub fn res(&self) -> usize {
        self.res
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    fn byte_offset(&self, channel: usize, row: usize, col: usize) -> Result<usize> {
        if channel >= self.channels || row >= self.res || col >= self.res {
            return Err(WorldError::OutOfRange {
                channel,
                row,
                col,
                channels: self.channels,
                res: self.res,
            });
        }
        Ok((channel * self.res * self.res + row * self.res + col) * T::SIZE)
    }

    pub fn get(&self, channel: usize, row: usize, col: usize) -> Result<T> {
        let offset = self.byte_offset(channel, row, col)?;
        Ok(T::read_le(&self.data[offset..offset + T::SIZE]))
    }

    pub fn set(&mut self, channel: usize, row: usize, col: usize, value: T) -> Result<()> {
        let offset = self.byte_offset(channel, row, col)?;
        value.write_le(&mut self.data[offset..offset + T::SIZE]);
        Ok(())
    }

    /// Borrow the packed buffer exactly as laid out.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.data.clone()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Packed bytes of a single channel.
    pub fn channel_bytes(&self, channel: usize) -> Result<&[u8]> {
        if channel >= self.channels {
            return Err(WorldError::OutOfRange {
                channel,
                row: 0,
                col: 0,
                channels: self.channels,
                res: self.res,
            });
        }
        let plane = self.res * self.res * T::SIZE;
        Ok(&self.data[channel * plane..(channel + 1) * plane])
    }

    /// Split the buffer into one disjoint mutable slice per channel.
    pub fn channel_bytes_mut(&mut self) -> Vec<&mut [u8]> {
        let plane = (self.res * self.res * T::SIZE).max(1);
        if self.data.is_empty() {
            return Vec::new();
        }
        self.data.chunks_mut(plane).collect()
    }

    /// Fill one channel row-parallel from `f(row, col)`.
    pub fn par_fill_channel<F>(&mut self, channel: usize, f: F) -> Result<()>
    where
        F: Fn(usize, usize) -> T + Sync + Send,
    {
        if channel >= self.channels {
            return Err(WorldError::OutOfRange {
                channel,
                row: 0,
                col: 0,
                channels: self.channels,
                res: self.res,
            });
        }
        let res = self.res;
        if res == 0 {
            return Ok(());
        }
        let plane = res * res * T::SIZE;
        let start = channel * plane;
        fill_plane(&mut self.data[start..start + plane], res, &f);
        Ok(())
    }
}

/// Write every cell of one channel plane, one row per rayon task.
pub(crate) fn fill_plane<T, F>(plane: &mut [u8], res: usize, f: &F)
where
    T: MapElement,
    F: Fn(usize, usize) -> T + Sync + Send,
{
    plane
        .par_chunks_mut(res * T::SIZE)
        .enumerate()
        .for_each(|(row, bytes)| {
            for (col, cell) in bytes.chunks_exact_mut(T::SIZE).enumerate() {
                f(row, col).write_le(cell);
            }
        });
}

fn infer_res(len: usize, channels: usize, elem_size: usize) -> Option<usize> {
    let stride = channels.checked_mul(elem_size)?;
    if stride == 0 || len % stride != 0 {
        return None;
    }
    let cells = len / stride;
    let res = (cells as f64).sqrt().round() as usize;
    if res * res == cells {
        Some(res)
    } else {
        None
    }
}
