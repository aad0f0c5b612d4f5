//! Shared value types and the crate-wide error taxonomy.

pub mod core;
pub mod error;
