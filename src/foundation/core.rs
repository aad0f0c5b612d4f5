/// One scalar component of a pixel, used both as an output-channel and an
/// input-channel role. Indexes fixed-size arrays via [`Channel::idx`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Channel {
    /// Red component.
    Red,
    /// Green component.
    Green,
    /// Blue component.
    Blue,
    /// Alpha component.
    Alpha,
}

impl Channel {
    /// All four channels in ordinal order.
    pub const ALL: [Channel; 4] = [Channel::Red, Channel::Green, Channel::Blue, Channel::Alpha];

    /// Ordinal in `0..4`.
    pub fn idx(self) -> usize {
        match self {
            Channel::Red => 0,
            Channel::Green => 1,
            Channel::Blue => 2,
            Channel::Alpha => 3,
        }
    }

    /// Lowercase name used in settings keys.
    pub fn key(self) -> &'static str {
        match self {
            Channel::Red => "red",
            Channel::Green => "green",
            Channel::Blue => "blue",
            Channel::Alpha => "alpha",
        }
    }
}

/// Color space a source may report for its output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ColorSpace {
    /// Standard sRGB-encoded output (the "default" space).
    #[default]
    Srgb,
    /// sRGB transfer with 16-bit float storage.
    Srgb16F,
    /// Extended-range Rec.709 (linear, HDR-capable).
    Rec709Extended,
    /// scRGB (linear Rec.709 primaries, extended range).
    Rec709ScRgb,
    /// Output the host declines to color-manage.
    Unmanaged,
}

impl ColorSpace {
    /// Whether the space is within the 8-bit sRGB-encodable range.
    ///
    /// Extended/linear spaces are never treated as sRGB-encoded.
    pub fn is_sdr_encodable(self) -> bool {
        matches!(self, ColorSpace::Srgb | ColorSpace::Srgb16F)
    }
}

/// Pixel storage format for a render surface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ColorFormat {
    /// Standard 8-bit RGBA, color-managed.
    #[default]
    Rgba8,
    /// 16-bit float RGBA for extended/HDR spaces.
    Rgba16F,
    /// Explicit non-color-managed 8-bit RGBA fallback.
    Rgba8Unorm,
}

impl ColorFormat {
    /// Quantize a channel value to what this format can actually store.
    ///
    /// 8-bit formats clamp to `[0, 1]` and round to 1/255 steps; the float
    /// format stores values unchanged.
    pub fn quantize(self, v: f32) -> f32 {
        match self {
            ColorFormat::Rgba8 | ColorFormat::Rgba8Unorm => {
                (v.clamp(0.0, 1.0) * 255.0).round() / 255.0
            }
            ColorFormat::Rgba16F => v,
        }
    }
}

/// Output capability flags a source declares to the host.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct OutputFlags {
    /// The source produces sRGB-aware output.
    pub srgb: bool,
}

/// Four-component vector (one lane per channel).
pub type Vec4 = [f32; 4];

/// Row-major 4×4 matrix; row `c` holds the weights for output channel `c`.
pub type Mat4 = [[f32; 4]; 4];

/// Dot product of two channel vectors.
pub fn dot4(a: Vec4, b: Vec4) -> f32 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2] + a[3] * b[3]
}
