//! Shared-storage texture views and the sRGB transfer functions.

use std::sync::Arc;

use crate::foundation::core::{ColorFormat, Vec4};

/// Immutable shared view of a rendered surface.
///
/// Textures are cheap to clone; two clones of the same capture share storage,
/// which is what makes the "alias base" path observable ([`Texture::same_view`]).
#[derive(Clone, Debug)]
pub struct Texture {
    width: u32,
    height: u32,
    format: ColorFormat,
    data: Arc<[f32]>,
}

impl Texture {
    pub(crate) fn new(width: u32, height: u32, format: ColorFormat, data: Arc<[f32]>) -> Self {
        debug_assert_eq!(data.len(), (width as usize) * (height as usize) * 4);
        Self {
            width,
            height,
            format,
            data,
        }
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Storage format of the surface this view was taken from.
    pub fn format(&self) -> ColorFormat {
        self.format
    }

    /// Whether the view has no pixels at all.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Fetch the texel at integer coordinates, clamped to the edge.
    pub fn fetch(&self, x: u32, y: u32) -> Vec4 {
        if self.is_empty() {
            return [0.0; 4];
        }
        let x = x.min(self.width - 1) as usize;
        let y = y.min(self.height - 1) as usize;
        let i = (y * self.width as usize + x) * 4;
        [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ]
    }

    /// Nearest sample at normalized coordinates in `[0, 1)`.
    pub fn sample(&self, u: f32, v: f32) -> Vec4 {
        if self.is_empty() {
            return [0.0; 4];
        }
        let x = (u * self.width as f32).floor().clamp(0.0, (self.width - 1) as f32) as u32;
        let y = (v * self.height as f32).floor().clamp(0.0, (self.height - 1) as f32) as u32;
        self.fetch(x, y)
    }

    /// Whether two textures are views of the same underlying storage.
    pub fn same_view(&self, other: &Texture) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }
}

/// Decode one sRGB-encoded channel value to linear.
pub(crate) fn srgb_decode(v: f32) -> f32 {
    if v <= 0.04045 {
        v / 12.92
    } else {
        ((v + 0.055) / 1.055).powf(2.4)
    }
}

/// Encode one linear channel value to sRGB.
pub(crate) fn srgb_encode(v: f32) -> f32 {
    if v <= 0.003_130_8 {
        v * 12.92
    } else {
        1.055 * v.powf(1.0 / 2.4) - 0.055
    }
}

/// Decode the color channels of a texel, leaving alpha linear.
pub(crate) fn srgb_decode_texel(t: Vec4) -> Vec4 {
    [srgb_decode(t[0]), srgb_decode(t[1]), srgb_decode(t[2]), t[3]]
}

/// Encode the color channels of a texel, leaving alpha linear.
pub(crate) fn srgb_encode_texel(t: Vec4) -> Vec4 {
    [srgb_encode(t[0]), srgb_encode(t[1]), srgb_encode(t[2]), t[3]]
}
