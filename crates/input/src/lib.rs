//! Input mapping: raw pointer and key events become high-level actions.
//!
//! # Invariants
//! - Actions never carry non-finite values.
//! - Pointer motion without a held rotate button produces no action.

pub mod action;
pub mod pointer;

pub use action::{Action, HotKey};
pub use pointer::{PointerButton, PointerTracker};

pub fn crate_info() -> &'static str {
    "cubefield-input v0.1.0"
}
