//! Scene: parameter tables, scene graph construction and per-frame animation.
//!
//! # Invariants
//! - Object count is fixed once a scene is built; there is no public insert/remove.
//! - Each cube's grid cell is unique and assigned in row-major order.
//! - Animation is a pure function of elapsed time and a cube's phase index.

pub mod animation;
pub mod builder;
pub mod clock;
pub mod config;
pub mod scene;

pub use animation::{animate, height_offset};
pub use builder::SceneBuilder;
pub use clock::{Clock, FixedStepClock, TimeSource};
pub use config::{
    AmbientLightParams, AnimationParams, CameraParams, ConfigError, CubeGridParams,
    DirectionalLightParams, GroundParams, HelperParams, MaterialParams, OrbitParams,
    RendererParams, SceneConfig, MIN_ORBIT_DISTANCE,
};
pub use scene::{AmbientLight, Cube, DirectionalLight, GridCell, Ground, Scene, SceneNode};

pub fn crate_info() -> &'static str {
    "cubefield-scene v0.1.0"
}
