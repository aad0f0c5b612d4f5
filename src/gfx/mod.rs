//! Minimal host-graphics model: draw state with scoped restoration, shared
//! texture views, offscreen render targets, and the opaque program contract.

pub mod program;
pub mod state;
pub mod target;
pub mod texture;
