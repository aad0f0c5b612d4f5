//! The capture-and-composite pipeline: color-space negotiation, sandboxed
//! frame capture, secondary-source binding, and the per-tick engine.

pub mod binding;
pub mod capture;
pub mod colorspace;
pub mod engine;
