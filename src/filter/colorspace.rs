//! Per-tick color-space and capture-format negotiation.

use crate::foundation::core::{ColorFormat, ColorSpace, OutputFlags};
use crate::source::{FilterTarget, VideoSource};

/// The single preferred candidate offered to sources during negotiation.
pub const PREFERRED: &[ColorSpace] = &[ColorSpace::Srgb];

/// Outcome of color-space negotiation for one source.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Negotiated {
    /// Working color space for the capture.
    pub space: ColorSpace,
    /// Pixel format of the backing render target.
    pub format: ColorFormat,
    /// Whether linear-sRGB rendering must be enabled for this source.
    pub srgb: bool,
}

/// Map a reported color space and output flags to a capture configuration.
///
/// The mapping is total and deterministic: the default space keeps the
/// standard 8-bit format, every extended/high-dynamic-range space widens to
/// 16-bit float, and anything else falls back to the explicit
/// non-color-managed 8-bit format. A source is sRGB-eligible only when it
/// declares sRGB-aware output and the selected space is within the 8-bit
/// encodable range.
pub fn select(space: ColorSpace, flags: OutputFlags) -> Negotiated {
    let format = match space {
        ColorSpace::Srgb => ColorFormat::Rgba8,
        ColorSpace::Srgb16F | ColorSpace::Rec709Extended | ColorSpace::Rec709ScRgb => {
            ColorFormat::Rgba16F
        }
        ColorSpace::Unmanaged => ColorFormat::Rgba8Unorm,
    };
    Negotiated {
        space,
        format,
        srgb: flags.srgb && space.is_sdr_encodable(),
    }
}

/// Negotiate for the filter's upstream target. Re-run once per tick.
pub fn negotiate_target(target: &dyn FilterTarget) -> Negotiated {
    select(target.color_space(PREFERRED), target.output_flags())
}

/// Negotiate for an arbitrary secondary source. Re-run once per tick.
pub fn negotiate_source(source: &dyn VideoSource) -> Negotiated {
    select(source.color_space(PREFERRED), source.output_flags())
}
