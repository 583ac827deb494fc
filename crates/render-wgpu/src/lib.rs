//! wgpu render backend for the cubefield.
//!
//! Draws a shadow-mapped ground plane and instanced cubes lit by one
//! directional and one ambient light, plus optional grid/axes overlays.
//!
//! # Invariants
//! - Renderer never mutates the scene.
//! - Instance data is rebuilt from cube transforms every frame.

mod gpu;
mod mesh;
mod shaders;
mod uniforms;

pub use gpu::{Overlays, WgpuRenderer, pick_sample_count};
pub use uniforms::light_view_projection;
