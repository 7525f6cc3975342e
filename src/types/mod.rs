//! Core value types
//!
//! Boundary types for chunk ingestion and the finalized output of a
//! streaming turn. Provider SDK payloads are converted into these types
//! exactly once, at the edge; everything downstream operates on them only.

mod chunk;
mod message;

pub use chunk::*;
pub use message::*;
