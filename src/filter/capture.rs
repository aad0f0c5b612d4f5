//! Sandboxed per-tick frame capture into offscreen targets.

use crate::filter::colorspace::Negotiated;
use crate::foundation::core::{ColorFormat, ColorSpace};
use crate::foundation::error::{DynamaskError, DynamaskResult};
use crate::gfx::state::Gfx;
use crate::gfx::target::{RenderTarget, SurfaceMut};
use crate::gfx::texture::Texture;

/// One captured frame: a texture view plus the negotiation that produced it.
///
/// Validity is tick-scoped: a slot starts each tick invalid, becomes valid at
/// most once per tick, and is consumed by any number of render calls within
/// that tick.
#[derive(Clone, Debug, Default)]
pub struct CapturedFrame {
    texture: Option<Texture>,
    /// Working color space of the capture.
    pub space: ColorSpace,
    /// Storage format of the capture.
    pub format: ColorFormat,
    /// Whether the capture was rendered sRGB-eligible.
    pub srgb: bool,
    /// Whether the slot holds a usable capture for the current tick.
    pub valid: bool,
    /// Captured width in pixels.
    pub width: u32,
    /// Captured height in pixels.
    pub height: u32,
}

impl CapturedFrame {
    /// An invalid (not yet captured) slot.
    pub fn invalid() -> Self {
        Self::default()
    }

    /// Clear the slot at a tick boundary.
    pub fn invalidate(&mut self) {
        *self = Self::default();
    }

    /// The captured texture view, if the slot is valid.
    pub fn texture(&self) -> Option<&Texture> {
        self.texture.as_ref()
    }

    /// Alias another slot: same texture view, space, format, and validity.
    ///
    /// Used when no secondary source is selected — the secondary slot then
    /// tracks the base capture without a separate render pass.
    pub fn alias_of(other: &CapturedFrame) -> Self {
        other.clone()
    }
}

/// Renders one source into an owned offscreen buffer under an isolated draw
/// state.
///
/// The backing render target is reallocated only when the negotiated format
/// changes, not per frame. The capture does not know how the source draws —
/// it only sandboxes the draw and records the result.
#[derive(Debug, Default)]
pub struct FrameCapture {
    target: Option<RenderTarget>,
}

impl FrameCapture {
    /// New capture stage with no allocated target.
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture `draw`'s output into the offscreen target.
    ///
    /// Establishes the isolated draw state (replace blending, full RGBA
    /// write, no culling/depth/stencil, ortho matching the extent), clears to
    /// transparent black, and delegates pixel production to `draw`. Prior
    /// sRGB flags and draw state are restored on every exit path.
    ///
    /// On failure nothing is recorded — the returned error leaves no partial
    /// state behind.
    pub fn capture<F>(
        &mut self,
        gfx: &mut Gfx,
        width: u32,
        height: u32,
        negotiated: Negotiated,
        framebuffer_srgb: bool,
        draw: F,
    ) -> DynamaskResult<CapturedFrame>
    where
        F: FnOnce(&mut Gfx, &mut SurfaceMut<'_>) -> DynamaskResult<()>,
    {
        if width == 0 || height == 0 {
            return Err(DynamaskError::dimension(format!(
                "cannot capture a {width}x{height} source"
            )));
        }

        // Recreate the target only when the negotiated format changed.
        let target = match &mut self.target {
            Some(t) if t.format() == negotiated.format => t,
            slot => slot.insert(RenderTarget::new(negotiated.format)),
        };
        target.resize(width, height);
        target.clear_transparent();

        {
            let mut srgb = gfx.srgb_scope(negotiated.srgb, framebuffer_srgb);
            let mut state = srgb.isolated_scope(width, height);
            let mut surface = target.surface();
            draw(&mut state, &mut surface)?;
        }

        Ok(CapturedFrame {
            texture: Some(target.snapshot()),
            space: negotiated.space,
            format: negotiated.format,
            srgb: negotiated.srgb,
            valid: true,
            width,
            height,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/filter/capture.rs"]
mod tests;
