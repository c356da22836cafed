use crate::foundation::core::Canvas;
use crate::foundation::error::{ArgandError, ArgandResult};
use crate::render::color::Rgb8;
use std::sync::Arc;

/// Bytes per pixel of the packed `RGB0` layout (R, G, B, unused).
pub const BYTES_PER_PIXEL: usize = 4;

/// Row alignment used by [`FrameBuffer::new`].
pub const STRIDE_ALIGN: usize = 32;

/// A `width × height` RGB0 pixel grid whose rows are `stride` bytes apart.
///
/// Storage is reference counted: cloning a buffer (as an encoder does when it keeps a frame for
/// lookahead) shares the bytes. Writers must call [`FrameBuffer::make_writable`] first, which
/// copies the bytes only when they are shared.
#[derive(Clone, Debug)]
pub struct FrameBuffer {
    width: u32,
    height: u32,
    stride: usize,
    data: Arc<Vec<u8>>,
}

impl FrameBuffer {
    /// Allocate a zeroed buffer with rows padded to [`STRIDE_ALIGN`] bytes.
    pub fn new(width: u32, height: u32) -> ArgandResult<Self> {
        let packed = (width as usize)
            .checked_mul(BYTES_PER_PIXEL)
            .ok_or_else(|| ArgandError::validation("frame width overflows row size"))?;
        let stride = packed.div_ceil(STRIDE_ALIGN) * STRIDE_ALIGN;
        Self::with_stride(width, height, stride)
    }

    /// Allocate a zeroed buffer with an explicit row stride in bytes.
    pub fn with_stride(width: u32, height: u32, stride: usize) -> ArgandResult<Self> {
        if width == 0 || height == 0 {
            return Err(ArgandError::validation(
                "frame buffer width/height must be non-zero",
            ));
        }
        let min_stride = (width as usize) * BYTES_PER_PIXEL;
        if stride < min_stride {
            return Err(ArgandError::validation(format!(
                "frame stride {stride} is smaller than width*{BYTES_PER_PIXEL} ({min_stride})"
            )));
        }
        let len = stride
            .checked_mul(height as usize)
            .ok_or_else(|| ArgandError::resource_exhausted("frame buffer size overflows usize"))?;

        let mut data = Vec::new();
        data.try_reserve_exact(len).map_err(|e| {
            ArgandError::resource_exhausted(format!("failed to allocate {len} byte frame: {e}"))
        })?;
        data.resize(len, 0);

        Ok(Self {
            width,
            height,
            stride,
            data: Arc::new(data),
        })
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Distance between row starts in bytes.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Frame dimensions.
    pub fn canvas(&self) -> Canvas {
        Canvas {
            width: self.width,
            height: self.height,
        }
    }

    /// Raw bytes including row padding.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Return `true` when no other handle shares the pixel storage.
    pub fn is_writable(&self) -> bool {
        Arc::strong_count(&self.data) == 1
    }

    /// Ensure the pixel storage is exclusively owned, copying it if it is shared.
    ///
    /// Returns `true` when a copy was made.
    pub fn make_writable(&mut self) -> ArgandResult<bool> {
        if Arc::get_mut(&mut self.data).is_some() {
            return Ok(false);
        }

        let len = self.data.len();
        let mut fresh = Vec::new();
        fresh.try_reserve_exact(len).map_err(|e| {
            ArgandError::resource_exhausted(format!(
                "failed to allocate {len} byte frame for copy-on-write: {e}"
            ))
        })?;
        fresh.extend_from_slice(&self.data);
        self.data = Arc::new(fresh);
        Ok(true)
    }

    /// Mutable access to the raw bytes, or `None` while the storage is shared.
    pub fn data_mut(&mut self) -> Option<&mut [u8]> {
        Arc::get_mut(&mut self.data).map(Vec::as_mut_slice)
    }

    /// Byte offset of pixel `(x, y)`.
    pub fn offset(&self, x: u32, y: u32) -> usize {
        self.stride * y as usize + BYTES_PER_PIXEL * x as usize
    }

    /// Read pixel `(x, y)`, or `None` when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let o = self.offset(x, y);
        Some(Rgb8::new(self.data[o], self.data[o + 1], self.data[o + 2]))
    }

    /// Iterate the visible part of each row (`width * 4` bytes, padding excluded).
    pub fn rows(&self) -> impl Iterator<Item = &[u8]> + '_ {
        let visible = self.width as usize * BYTES_PER_PIXEL;
        self.data
            .chunks_exact(self.stride)
            .map(move |row| &row[..visible])
    }

    /// Copy pixels into a tightly packed RGB24 vector (padding and the unused byte dropped).
    pub fn to_packed_rgb(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.canvas().pixels() * 3);
        for row in self.rows() {
            for px in row.chunks_exact(BYTES_PER_PIXEL) {
                out.extend_from_slice(&px[..3]);
            }
        }
        out
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/frame.rs"]
mod tests;
