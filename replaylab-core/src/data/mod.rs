//! Data access seam between bar providers and the engine.

pub mod source;

pub use source::{BarSource, InMemoryBarSource};
