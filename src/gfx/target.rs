//! Offscreen render targets and the mutable surface view draws go through.

use std::sync::Arc;

use crate::foundation::core::{ColorFormat, Vec4};
use crate::gfx::texture::Texture;

/// Offscreen render target exclusively owned by one pipeline stage.
///
/// Storage is f32 RGBA regardless of format; the declared [`ColorFormat`]
/// governs quantization when a [`Texture`] snapshot is taken. Reallocation
/// happens only when the format or dimensions change.
#[derive(Debug)]
pub struct RenderTarget {
    format: ColorFormat,
    width: u32,
    height: u32,
    pixels: Vec<f32>,
}

impl RenderTarget {
    /// New zero-sized target with the given storage format.
    pub fn new(format: ColorFormat) -> Self {
        Self {
            format,
            width: 0,
            height: 0,
            pixels: Vec::new(),
        }
    }

    /// Declared storage format.
    pub fn format(&self) -> ColorFormat {
        self.format
    }

    /// Current width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Current height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Resize the backing storage if the dimensions changed.
    pub fn resize(&mut self, width: u32, height: u32) {
        if self.width == width && self.height == height {
            return;
        }
        self.width = width;
        self.height = height;
        self.pixels = vec![0.0; (width as usize) * (height as usize) * 4];
    }

    /// Clear to fully transparent black.
    pub fn clear_transparent(&mut self) {
        self.pixels.fill(0.0);
    }

    /// Mutable pixel view for drawing into this target.
    pub fn surface(&mut self) -> SurfaceMut<'_> {
        SurfaceMut {
            width: self.width,
            height: self.height,
            pixels: &mut self.pixels,
        }
    }

    /// Take an immutable shared snapshot, quantized to the declared format.
    pub fn snapshot(&self) -> Texture {
        let data: Vec<f32> = self.pixels.iter().map(|&v| self.format.quantize(v)).collect();
        Texture::new(self.width, self.height, self.format, Arc::from(data))
    }
}

/// Mutable view into a render target's pixels for the duration of one draw.
#[derive(Debug)]
pub struct SurfaceMut<'a> {
    width: u32,
    height: u32,
    pixels: &'a mut [f32],
}

impl SurfaceMut<'_> {
    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Write one texel; out-of-bounds writes are discarded.
    pub fn put(&mut self, x: u32, y: u32, texel: Vec4) {
        if x >= self.width || y >= self.height {
            return;
        }
        let i = ((y as usize) * (self.width as usize) + x as usize) * 4;
        self.pixels[i..i + 4].copy_from_slice(&texel);
    }

    /// Read one texel back (edge-clamped), for blending during draws.
    pub fn get(&self, x: u32, y: u32) -> Vec4 {
        if self.width == 0 || self.height == 0 {
            return [0.0; 4];
        }
        let x = x.min(self.width - 1) as usize;
        let y = y.min(self.height - 1) as usize;
        let i = (y * self.width as usize + x) * 4;
        [
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ]
    }

    /// Fill the whole surface with one texel value.
    pub fn fill(&mut self, texel: Vec4) {
        for px in self.pixels.chunks_exact_mut(4) {
            px.copy_from_slice(&texel);
        }
    }

    /// Parallel iteration over rows: `(row_index, row_pixels)`.
    pub(crate) fn par_rows_mut<'s>(
        &'s mut self,
    ) -> impl rayon::iter::IndexedParallelIterator<Item = (usize, &'s mut [f32])> + 's {
        use rayon::prelude::*;
        let stride = ((self.width as usize) * 4).max(1);
        self.pixels.par_chunks_exact_mut(stride).enumerate()
    }
}
