//! Flat settings storage and the per-channel mix parameters derived from it.

pub mod channels;
pub mod store;
