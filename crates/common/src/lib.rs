//! Shared value types for the cubefield workspace.

pub mod types;

pub use types::{Color, ColorParseError, Transform};
