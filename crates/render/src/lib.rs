//! Rendering adapter: renderer-agnostic camera rig, viewport and frame loop.
//!
//! # Invariants
//! - Renderers never mutate the scene; only the frame loop's animation step does.
//! - Within a frame, animation and camera update complete before the draw.
//!
//! The `Renderer` trait is implemented here by a debug text renderer used by
//! the headless CLI; the GPU backend lives in `cubefield-render-wgpu`.

mod camera;
mod frame;
mod renderer;
mod rig;
mod viewport;

pub use camera::OrbitCamera;
pub use frame::FrameLoop;
pub use renderer::{DebugTextRenderer, RenderView, Renderer};
pub use rig::CameraRig;
pub use viewport::Viewport;

pub fn crate_info() -> &'static str {
    "cubefield-render v0.1.0"
}
