//! The per-instance engine driving the tick/render protocol.

use std::rc::Rc;

use crate::filter::binding::SecondaryBinding;
use crate::filter::capture::{CapturedFrame, FrameCapture};
use crate::filter::colorspace::{self, Negotiated};
use crate::foundation::core::Channel;
use crate::foundation::error::{DynamaskError, DynamaskResult};
use crate::gfx::program::ShaderProgram;
use crate::gfx::state::Gfx;
use crate::gfx::target::RenderTarget;
use crate::gfx::texture::Texture;
use crate::registry::EffectRegistry;
use crate::settings::channels::{ChannelMixParams, ChannelSettings, keys};
use crate::settings::store::SettingsStore;
use crate::source::{FilterTarget, ResolvedSource, SourceDirectory};

/// Debug selector substituting an intermediate capture for the final result.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DebugView {
    /// No override: present the mixed result.
    #[default]
    None,
    /// Present the base capture.
    Base,
    /// Present the secondary capture.
    Secondary,
}

impl DebugView {
    /// Decode the persisted selector (−1 none / 0 base / 1 secondary).
    pub fn from_i64(v: i64) -> Self {
        match v {
            0 => DebugView::Base,
            1 => DebugView::Secondary,
            _ => DebugView::None,
        }
    }

    /// Encode for persistence.
    pub fn to_i64(self) -> i64 {
        match self {
            DebugView::None => -1,
            DebugView::Base => 0,
            DebugView::Secondary => 1,
        }
    }
}

/// Whether a render call produced visible output.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderResult {
    /// The final texture was drawn into the host's target.
    Drawn,
    /// The host should treat this filter as producing no output this frame.
    Skipped,
}

/// The capture-and-composite engine behind one filter instance.
///
/// Per output tick the host calls [`MaskEngine::tick_update`] exactly once,
/// then [`MaskEngine::render`] one or more times. Each render call reuses
/// already-valid captures, so every upstream frame is rendered at most once
/// per tick no matter how often the render entry point runs.
#[derive(Debug)]
pub struct MaskEngine {
    name: String,
    registry: Rc<EffectRegistry>,
    params: ChannelMixParams,
    binding: SecondaryBinding,
    debug: DebugView,

    base_neg: Negotiated,
    secondary_neg: Negotiated,
    final_srgb: bool,

    base_capture: FrameCapture,
    secondary_capture: FrameCapture,
    final_capture: FrameCapture,
    base: CapturedFrame,
    secondary: CapturedFrame,
    final_frame: CapturedFrame,

    shown: bool,
    active: bool,
}

impl MaskEngine {
    /// New engine for the filter named `name`, using shared programs from the
    /// injected registry.
    pub fn new(name: impl Into<String>, registry: Rc<EffectRegistry>) -> Self {
        let name = name.into();
        Self {
            binding: SecondaryBinding::new(name.clone()),
            name,
            registry,
            params: ChannelMixParams::new(),
            debug: DebugView::None,
            base_neg: Negotiated::default(),
            secondary_neg: Negotiated::default(),
            final_srgb: false,
            base_capture: FrameCapture::new(),
            secondary_capture: FrameCapture::new(),
            final_capture: FrameCapture::new(),
            base: CapturedFrame::invalid(),
            secondary: CapturedFrame::invalid(),
            final_frame: CapturedFrame::invalid(),
            shown: false,
            active: false,
        }
    }

    /// The owning filter's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Settings for one output channel.
    pub fn channel_settings(&self, out: Channel) -> ChannelSettings {
        self.params.channel(out)
    }

    /// Replace one output channel's settings; the packed transform is
    /// recomputed synchronously.
    pub fn set_channel_settings(&mut self, out: Channel, settings: ChannelSettings) {
        self.params.set_channel(out, settings);
    }

    /// The channel-mix parameter set.
    pub fn params(&self) -> &ChannelMixParams {
        &self.params
    }

    /// Currently configured secondary source name (empty = none).
    pub fn secondary_name(&self) -> &str {
        self.binding.name()
    }

    /// Bind (or clear, with an empty name) the secondary source.
    pub fn bind_secondary(&mut self, directory: &SourceDirectory, name: &str) -> DynamaskResult<()> {
        self.binding.rebind(directory, name, self.shown, self.active)
    }

    /// Current debug override selector.
    pub fn debug_override(&self) -> DebugView {
        self.debug
    }

    /// Set the debug override selector.
    pub fn set_debug_override(&mut self, view: DebugView) {
        self.debug = view;
    }

    /// Apply a settings-store update: channel parameters, debug selector, and
    /// the secondary source selection.
    pub fn update(&mut self, directory: &SourceDirectory, store: &SettingsStore) {
        self.params.update(store);
        self.debug = DebugView::from_i64(store.get_i64(keys::DEBUG_VIEW, -1));

        let name = store.get_str(keys::INPUT).to_string();
        let needs_bind =
            name != self.binding.name() || (!name.is_empty() && self.binding.source().is_none());
        if needs_bind
            && let Err(error) = self.bind_secondary(directory, &name)
        {
            tracing::warn!(%error, source = %name, "failed to acquire secondary source");
        }
    }

    /// Write the persisted state back out (inverse of [`MaskEngine::update`]).
    pub fn save(&self, store: &mut SettingsStore) {
        self.params.serialize(store);
        store.set_str(keys::INPUT, self.binding.name());
        store.set_i64(keys::DEBUG_VIEW, self.debug.to_i64());
    }

    /// Report the bound secondary source as a child, for the host's source
    /// enumeration.
    pub fn enumerate_children(&self, mut f: impl FnMut(&ResolvedSource)) {
        if let Some(source) = self.binding.source() {
            f(source);
        }
    }

    /// The owning filter became visible.
    pub fn show(&mut self) {
        self.shown = true;
        self.binding.on_show();
    }

    /// The owning filter was hidden.
    pub fn hide(&mut self) {
        self.shown = false;
        self.binding.on_hide();
    }

    /// The owning filter became active in the output.
    pub fn activate(&mut self) {
        self.active = true;
        self.binding.on_activate();
    }

    /// The owning filter left the active output.
    pub fn deactivate(&mut self) {
        self.active = false;
        self.binding.on_deactivate();
    }

    /// Tick boundary: clear per-tick capture validity and re-negotiate color
    /// spaces for both sources.
    ///
    /// Must be called exactly once before any [`MaskEngine::render`] calls
    /// for a given output frame.
    #[tracing::instrument(skip_all, fields(filter = %self.name))]
    pub fn tick_update(&mut self, target: &dyn FilterTarget) {
        self.base.invalidate();
        self.secondary.invalidate();
        self.final_frame.invalidate();

        self.base_neg = colorspace::negotiate_target(target);
        if let Some(source) = self.binding.source() {
            let handle = source.source();
            self.secondary_neg = colorspace::negotiate_source(&*handle.borrow());
        }
        self.final_srgb = self.base_neg.srgb;
    }

    /// One render call: capture what is still missing this tick, run the mix
    /// pass, apply the debug override, and draw the result into `host`.
    ///
    /// Idempotent within a tick — repeated calls reuse valid captures.
    #[tracing::instrument(skip_all, fields(filter = %self.name))]
    pub fn render(
        &mut self,
        gfx: &mut Gfx,
        target: &mut dyn FilterTarget,
        host: &mut RenderTarget,
        output: Option<&mut dyn ShaderProgram>,
    ) -> RenderResult {
        let width = target.base_width();
        let height = target.base_height();
        if width == 0 || height == 0 {
            tracing::debug!(width, height, "upstream target has no size, skipping");
            return RenderResult::Skipped;
        }

        let secondary_source = self.binding.source().map(|s| s.source());
        if let Some(source) = &secondary_source {
            let source = source.borrow();
            if source.width() == 0 || source.height() == 0 {
                tracing::debug!(source = source.name(), "secondary source has no size, skipping");
                return RenderResult::Skipped;
            }
        }

        // Capture the base frame for later passes.
        if !self.base.valid {
            let captured = self.base_capture.capture(
                gfx,
                width,
                height,
                self.base_neg,
                false,
                |gfx, surface| target.render_into(gfx, surface),
            );
            match captured {
                Ok(frame) => self.base = frame,
                Err(error) => tracing::warn!(%error, "failed to capture base frame"),
            }
        }

        // Capture the secondary frame, or alias the base when none is bound.
        if !self.secondary.valid {
            match &secondary_source {
                Some(source) => {
                    let (sw, sh) = {
                        let source = source.borrow();
                        (source.width(), source.height())
                    };
                    let captured = self.secondary_capture.capture(
                        gfx,
                        sw,
                        sh,
                        self.secondary_neg,
                        false,
                        |gfx, surface| source.borrow_mut().render(gfx, surface),
                    );
                    match captured {
                        Ok(frame) => self.secondary = frame,
                        Err(error) => {
                            tracing::warn!(%error, "failed to capture secondary frame");
                        }
                    }
                }
                None => self.secondary = CapturedFrame::alias_of(&self.base),
            }
        }

        // Run the mixing pass once per tick.
        if !self.final_frame.valid && self.base.valid {
            let negotiated = Negotiated {
                space: self.base.space,
                format: self.base.format,
                srgb: self.final_srgb,
            };
            let base = self.base.clone();
            let secondary = self.secondary.clone();
            let transform = *self.params.transform();
            let program = self.registry.mask_program();
            let mut program = program.borrow_mut();

            let mixed = self.final_capture.capture(
                gfx,
                width,
                height,
                negotiated,
                self.final_srgb,
                |gfx, surface| {
                    let (Some(base_tex), Some(sec_tex)) = (base.texture(), secondary.texture())
                    else {
                        return Err(DynamaskError::capture("mix pass is missing an input capture"));
                    };
                    program.set_texture("mask_a", base_tex, base.srgb)?;
                    program.set_texture("mask_b", sec_tex, secondary.srgb)?;
                    program.set_float4("mask_offset", transform.offset)?;
                    program.set_matrix4("mask_matrix", transform.matrix)?;
                    program.set_float4("mask_scale", transform.scale)?;
                    program.run("Mask", gfx, surface)
                },
            );
            match mixed {
                Ok(frame) => self.final_frame = frame,
                Err(error) => tracing::warn!(%error, "failed to render mixed frame"),
            }
        }

        // Debug override decides what is presented, per call; it never
        // touches the cached slots.
        let presented = match self.debug {
            DebugView::None => self.final_frame.clone(),
            DebugView::Base => self.base.clone(),
            DebugView::Secondary => self.secondary.clone(),
        };
        if !presented.valid {
            return RenderResult::Skipped;
        }
        let Some(texture) = presented.texture().filter(|t| !t.is_empty()) else {
            return RenderResult::Skipped;
        };

        // Draw into the host's current target. The host configured the blend
        // state for filter output; only depth/stencil/cull are overridden,
        // and everything is restored afterwards.
        let mut state = gfx.output_scope();
        let linear = state.linear_srgb();
        let mut srgb = state.srgb_scope(linear, linear);

        let drawn = match output {
            Some(program) => draw_output(&mut srgb, program, texture, host),
            None => {
                let program = self.registry.draw_program();
                let mut program = program.borrow_mut();
                draw_output(&mut srgb, &mut *program, texture, host)
            }
        };
        match drawn {
            Ok(()) => RenderResult::Drawn,
            Err(error) => {
                tracing::warn!(%error, "failed to draw final frame");
                RenderResult::Skipped
            }
        }
    }
}

/// Bind the final texture to the output program's conventional `"image"`
/// parameter and run its `"Draw"` technique over the host target.
///
/// The sRGB texture-binding variant is selected iff the host framebuffer is
/// currently in linear-sRGB mode. A program without the expected parameter is
/// a hard per-call error.
fn draw_output(
    gfx: &mut Gfx,
    program: &mut dyn ShaderProgram,
    texture: &Texture,
    host: &mut RenderTarget,
) -> DynamaskResult<()> {
    if !program.has_param("image") {
        return Err(DynamaskError::shader_parameter(
            "output program is missing the 'image' parameter",
        ));
    }
    program.set_texture("image", texture, gfx.linear_srgb())?;
    program.run("Draw", gfx, &mut host.surface())
}

#[cfg(test)]
#[path = "../../tests/unit/filter/engine.rs"]
mod tests;
