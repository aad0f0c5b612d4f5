//! Dynamask is a per-frame video channel-remixing stage.
//!
//! A filter instance sits between an upstream render chain (its *base*) and
//! the host's output target. Once per output tick it captures the base frame
//! and an optional *secondary* source into offscreen textures, runs a single
//! shader pass that recombines the secondary's RGBA channels through a packed
//! offset/matrix/scale transform, and draws the result into the host target.
//!
//! # Pipeline overview
//!
//! 1. **Tick**: [`MaskEngine::tick_update`] invalidates per-tick captures and
//!    re-negotiates color spaces ([`filter::colorspace`]).
//! 2. **Capture**: base and secondary frames are rendered at most once per
//!    tick into format-stable offscreen targets ([`filter::capture`]).
//! 3. **Mix**: one pass of the channel-mask program combines them under the
//!    current [`MixTransform`] ([`gfx::program`]).
//! 4. **Present**: the final (or debug-selected) texture is drawn to the
//!    host target with the host's blend state intact.
//!
//! The key design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Tick-idempotent**: repeated render calls within a tick reuse captures.
//! - **State-clean**: every sRGB flag and draw-state change is scoped and
//!   restored on all exit paths, including errors.
//! - **No globals**: shared shader programs live in an injected
//!   [`EffectRegistry`].
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;
mod registry;

/// Orchestration: capture slots, color negotiation, secondary binding, and
/// the per-tick engine.
pub mod filter;
/// The software graphics layer: textures, render targets, draw state, and
/// shader programs.
pub mod gfx;
/// Persisted parameters: the generic key/value store and the channel-mix
/// parameter block.
pub mod settings;
/// Host-facing source contracts and the name-resolution directory.
pub mod source;

pub use filter::binding::SecondaryBinding;
pub use filter::capture::{CapturedFrame, FrameCapture};
pub use filter::colorspace::{Negotiated, negotiate_source, negotiate_target, select};
pub use filter::engine::{DebugView, MaskEngine, RenderResult};
pub use foundation::core::{Channel, ColorFormat, ColorSpace, Mat4, OutputFlags, Vec4};
pub use foundation::error::{DynamaskError, DynamaskResult};
pub use gfx::program::{ChannelMaskProgram, DrawProgram, ShaderProgram};
pub use gfx::state::{DrawState, Gfx};
pub use gfx::target::{RenderTarget, SurfaceMut};
pub use gfx::texture::Texture;
pub use registry::EffectRegistry;
pub use settings::channels::{ChannelMixParams, ChannelSettings, MixTransform, keys};
pub use settings::store::SettingsStore;
pub use source::{
    ActiveRef, ChildLink, FilterTarget, ResolvedSource, ShowingRef, SourceDirectory, SourceHandle,
    VideoSource,
};
