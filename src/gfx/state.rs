//! Host draw state and the scopes that mutate it with guaranteed restore.

use std::ops::{Deref, DerefMut};

/// Rasterizer draw state owned by the host graphics context.
///
/// Captures and the mix pass run under an isolated copy of this state; the
/// final output draw inherits the host's blend state untouched.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawState {
    /// Whether source-over blending is enabled (false = replace semantics).
    pub blend_enabled: bool,
    /// Per-channel color write mask (RGBA).
    pub color_write: [bool; 4],
    /// Back-face culling.
    pub cull_backface: bool,
    /// Depth testing.
    pub depth_test: bool,
    /// Stencil testing.
    pub stencil_test: bool,
    /// Active orthographic projection extent, if one is set.
    pub ortho: Option<(f32, f32)>,
}

impl Default for DrawState {
    fn default() -> Self {
        // What a host compositor typically leaves configured between filters.
        Self {
            blend_enabled: true,
            color_write: [true; 4],
            cull_backface: true,
            depth_test: true,
            stencil_test: false,
            ortho: None,
        }
    }
}

/// Host graphics context: draw state plus the two sRGB-related flags.
#[derive(Debug, Default)]
pub struct Gfx {
    state: DrawState,
    framebuffer_srgb: bool,
    linear_srgb: bool,
}

impl Gfx {
    /// New context with host-default state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current draw state.
    pub fn state(&self) -> &DrawState {
        &self.state
    }

    /// Mutable draw state, for hosts that configure blending themselves.
    pub fn state_mut(&mut self) -> &mut DrawState {
        &mut self.state
    }

    /// Whether stores to the current framebuffer encode to sRGB.
    pub fn framebuffer_srgb(&self) -> bool {
        self.framebuffer_srgb
    }

    /// Enable or disable framebuffer sRGB encoding.
    pub fn enable_framebuffer_srgb(&mut self, on: bool) {
        self.framebuffer_srgb = on;
    }

    /// Whether the host is currently rendering in linear-sRGB mode.
    pub fn linear_srgb(&self) -> bool {
        self.linear_srgb
    }

    /// Set the linear-sRGB rendering flag.
    pub fn set_linear_srgb(&mut self, on: bool) {
        self.linear_srgb = on;
    }

    /// Save both sRGB flags and apply new values; the prior flags are restored
    /// when the returned scope drops, on every exit path.
    pub fn srgb_scope(&mut self, linear: bool, framebuffer: bool) -> SrgbScope<'_> {
        let saved = (self.linear_srgb, self.framebuffer_srgb);
        self.linear_srgb = linear;
        self.framebuffer_srgb = framebuffer;
        SrgbScope { gfx: self, saved }
    }

    /// Save the full draw state and switch to the isolated capture state:
    /// replace blending, full RGBA write, no culling, no depth, no stencil,
    /// and an orthographic projection matching the capture extent.
    pub fn isolated_scope(&mut self, width: u32, height: u32) -> StateScope<'_> {
        let saved = self.state;
        self.state = DrawState {
            blend_enabled: false,
            color_write: [true; 4],
            cull_backface: false,
            depth_test: false,
            stencil_test: false,
            ortho: Some((width as f32, height as f32)),
        };
        StateScope { gfx: self, saved }
    }

    /// Save the full draw state and disable culling/depth/stencil for the
    /// final output draw, leaving the host's blend state untouched.
    pub fn output_scope(&mut self) -> StateScope<'_> {
        let saved = self.state;
        self.state.color_write = [true; 4];
        self.state.cull_backface = false;
        self.state.depth_test = false;
        self.state.stencil_test = false;
        StateScope { gfx: self, saved }
    }
}

/// Restores the saved sRGB flags on drop.
#[derive(Debug)]
pub struct SrgbScope<'a> {
    gfx: &'a mut Gfx,
    saved: (bool, bool),
}

impl Drop for SrgbScope<'_> {
    fn drop(&mut self) {
        self.gfx.linear_srgb = self.saved.0;
        self.gfx.framebuffer_srgb = self.saved.1;
    }
}

impl Deref for SrgbScope<'_> {
    type Target = Gfx;

    fn deref(&self) -> &Gfx {
        self.gfx
    }
}

impl DerefMut for SrgbScope<'_> {
    fn deref_mut(&mut self) -> &mut Gfx {
        self.gfx
    }
}

/// Restores the saved draw state on drop.
#[derive(Debug)]
pub struct StateScope<'a> {
    gfx: &'a mut Gfx,
    saved: DrawState,
}

impl Drop for StateScope<'_> {
    fn drop(&mut self) {
        self.gfx.state = self.saved;
    }
}

impl Deref for StateScope<'_> {
    type Target = Gfx;

    fn deref(&self) -> &Gfx {
        self.gfx
    }
}

impl DerefMut for StateScope<'_> {
    fn deref_mut(&mut self) -> &mut Gfx {
        self.gfx
    }
}
