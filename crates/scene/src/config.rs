//! Static parameter tables for the scene, camera, lights and renderer.
//!
//! `SceneConfig::default()` is the built-in table. A YAML or JSON file can
//! override any subset of fields; missing fields keep their defaults.

use cubefield_common::Color;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Errors from loading or validating a parameter table.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported config format: {0:?} (expected .yaml, .yml or .json)")]
    UnsupportedFormat(PathBuf),
    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Closest the orbit camera may approach its target.
pub const MIN_ORBIT_DISTANCE: f32 = 0.01;

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

/// Perspective camera parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraParams {
    /// Vertical field of view in degrees.
    pub fov_y_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
    pub look_at: Vec3,
}

impl Default for CameraParams {
    fn default() -> Self {
        Self {
            fov_y_degrees: 60.0,
            near: 0.1,
            far: 100.0,
            position: Vec3::new(8.0, 4.0, 8.0),
            look_at: Vec3::ZERO,
        }
    }
}

/// Output surface parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererParams {
    pub clear_color: Color,
    /// 0.0 leaves the surface fully transparent where nothing is drawn.
    pub clear_alpha: f32,
    pub antialias: bool,
    pub shadows: bool,
    /// Upper bound for the device pixel ratio used to size the output buffer.
    pub max_pixel_ratio: f32,
}

impl Default for RendererParams {
    fn default() -> Self {
        Self {
            clear_color: Color::from_hex(0xf7f7f7),
            clear_alpha: 0.0,
            antialias: true,
            shadows: true,
            max_pixel_ratio: 2.0,
        }
    }
}

/// Cube surface material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialParams {
    pub metalness: f32,
    pub roughness: f32,
    pub transmission: f32,
    pub thickness: f32,
}

impl Default for MaterialParams {
    fn default() -> Self {
        Self {
            metalness: 0.15,
            roughness: 0.15,
            transmission: 0.5,
            thickness: 0.5,
        }
    }
}

/// Layout and randomization ranges for the cube grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CubeGridParams {
    pub count: u32,
    /// Cells per row; rows wrap after this many cubes.
    pub columns: u32,
    /// Lowest cell coordinate on both horizontal axes.
    pub origin: i32,
    /// Added to the cell coordinate to get the cube's world x/z.
    pub cell_offset: f32,
    /// Cube edge length.
    pub size: f32,
    pub min_height: f32,
    /// Base heights are drawn from `[min_height, min_height + height_range)`.
    pub height_range: f32,
    pub cast_shadow: bool,
}

impl Default for CubeGridParams {
    fn default() -> Self {
        Self {
            count: 100,
            columns: 10,
            origin: -5,
            cell_offset: 0.5,
            size: 0.7,
            min_height: 0.5,
            height_range: 1.0,
            cast_shadow: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroundParams {
    /// Edge length of the square plane.
    pub size: f32,
    pub color: Color,
    pub height: f32,
    pub receive_shadow: bool,
}

impl Default for GroundParams {
    fn default() -> Self {
        Self {
            size: 50.0,
            color: Color::from_hex(0xf7f7f7),
            height: -2.4,
            receive_shadow: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectionalLightParams {
    pub color: Color,
    pub intensity: f32,
    pub position: Vec3,
    pub target: Vec3,
    pub cast_shadow: bool,
    /// Shadow map edge length in texels.
    pub shadow_map_size: u32,
    pub shadow_near: f32,
    pub shadow_far: f32,
    /// Half-width of the orthographic shadow frustum.
    pub shadow_extent: f32,
}

impl Default for DirectionalLightParams {
    fn default() -> Self {
        Self {
            color: Color::from_hex(0xfff0dd),
            intensity: 0.6,
            position: Vec3::new(2.0, 5.0, 3.0),
            target: Vec3::ZERO,
            cast_shadow: true,
            shadow_map_size: 256,
            shadow_near: 0.5,
            shadow_far: 5.0,
            shadow_extent: 5.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AmbientLightParams {
    pub color: Color,
    pub intensity: f32,
}

impl Default for AmbientLightParams {
    fn default() -> Self {
        Self {
            color: Color::from_hex(0xcdcdcd),
            intensity: 3.0,
        }
    }
}

/// Coefficients of the height oscillation.
///
/// `offset(i, t) = sin(t * phase_rate * i) * wave_amplitude + sin(t * bob_rate) * bob_amplitude`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationParams {
    pub phase_rate: f32,
    pub wave_amplitude: f32,
    pub bob_rate: f32,
    pub bob_amplitude: f32,
}

impl Default for AnimationParams {
    fn default() -> Self {
        Self {
            phase_rate: 0.05,
            wave_amplitude: 0.4,
            bob_rate: 0.32,
            bob_amplitude: 1.0,
        }
    }
}

/// Debug overlays: a grid helper and an axes helper. Both start hidden.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HelperParams {
    pub show_grid: bool,
    pub grid_size: f32,
    pub grid_divisions: u32,
    pub grid_color: Color,
    pub grid_opacity: f32,
    pub grid_height: f32,
    pub show_axes: bool,
    pub axes_size: f32,
}

impl Default for HelperParams {
    fn default() -> Self {
        Self {
            show_grid: false,
            grid_size: 10.0,
            grid_divisions: 10,
            grid_color: Color::BLACK,
            grid_opacity: 0.2,
            grid_height: -2.3,
            show_axes: false,
            axes_size: 10.0,
        }
    }
}

/// Orbit control tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbitParams {
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl Default for OrbitParams {
    fn default() -> Self {
        Self {
            enable_damping: true,
            damping_factor: 0.05,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            min_distance: 1.0,
            max_distance: 50.0,
        }
    }
}

/// The complete parameter table for one scene.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub camera: CameraParams,
    pub renderer: RendererParams,
    pub material: MaterialParams,
    pub cubes: CubeGridParams,
    pub ground: GroundParams,
    pub directional_light: DirectionalLightParams,
    pub ambient_light: AmbientLightParams,
    pub animation: AnimationParams,
    pub helpers: HelperParams,
    pub orbit: OrbitParams,
}

impl SceneConfig {
    /// Load overrides from a `.yaml`/`.yml` or `.json` file and validate them.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        let config: Self = match ext.as_deref() {
            Some("yaml" | "yml") => serde_yaml::from_str(&text)?,
            Some("json") => serde_json::from_str(&text)?,
            _ => return Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
        };
        config.validate()?;
        tracing::info!("loaded scene config from {}", path.display());
        Ok(config)
    }

    /// Load from `path` when given, otherwise return the built-in table.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject tables the builder or renderer cannot honor.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let cubes = &self.cubes;
        if cubes.count == 0 {
            return Err(invalid("cubes.count", "must be at least 1"));
        }
        if cubes.columns == 0 {
            return Err(invalid("cubes.columns", "must be at least 1"));
        }
        let capacity = cubes.columns as u64 * cubes.columns as u64;
        if cubes.count as u64 > capacity {
            return Err(invalid(
                "cubes.count",
                format!(
                    "{} cubes do not fit a {}x{} grid",
                    cubes.count, cubes.columns, cubes.columns
                ),
            ));
        }
        if !(cubes.size > 0.0) {
            return Err(invalid("cubes.size", "must be positive"));
        }
        if !(cubes.height_range >= 0.0) {
            return Err(invalid("cubes.height_range", "must not be negative"));
        }

        let camera = &self.camera;
        if !(camera.fov_y_degrees > 0.0 && camera.fov_y_degrees < 180.0) {
            return Err(invalid("camera.fov_y_degrees", "must be in (0, 180)"));
        }
        if !(camera.near > 0.0 && camera.near < camera.far) {
            return Err(invalid("camera.near", "must satisfy 0 < near < far"));
        }

        let light = &self.directional_light;
        if light.shadow_map_size == 0 {
            return Err(invalid("directional_light.shadow_map_size", "must be at least 1"));
        }
        if !(light.shadow_near < light.shadow_far) {
            return Err(invalid(
                "directional_light.shadow_near",
                "must be less than shadow_far",
            ));
        }
        if !(light.shadow_extent > 0.0 && light.shadow_extent.is_finite()) {
            return Err(invalid("directional_light.shadow_extent", "must be positive"));
        }

        if !(self.renderer.max_pixel_ratio > 0.0) {
            return Err(invalid("renderer.max_pixel_ratio", "must be positive"));
        }

        let orbit = &self.orbit;
        if !(orbit.damping_factor > 0.0 && orbit.damping_factor <= 1.0) {
            return Err(invalid("orbit.damping_factor", "must be in (0, 1]"));
        }
        if !(orbit.min_distance >= MIN_ORBIT_DISTANCE && orbit.min_distance <= orbit.max_distance)
        {
            return Err(invalid(
                "orbit.min_distance",
                format!("must satisfy {MIN_ORBIT_DISTANCE} <= min_distance <= max_distance"),
            ));
        }
        if !(orbit.rotate_speed > 0.0 && orbit.rotate_speed.is_finite()) {
            return Err(invalid("orbit.rotate_speed", "must be positive and finite"));
        }
        if !(orbit.zoom_speed > 0.0 && orbit.zoom_speed.is_finite()) {
            return Err(invalid("orbit.zoom_speed", "must be positive and finite"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_table_is_valid() {
        SceneConfig::default().validate().unwrap();
    }

    #[test]
    fn default_table_values() {
        let c = SceneConfig::default();
        assert_eq!(c.cubes.count, 100);
        assert_eq!(c.cubes.columns, 10);
        assert_eq!(c.camera.position, Vec3::new(8.0, 4.0, 8.0));
        assert_eq!(c.directional_light.shadow_map_size, 256);
        assert_eq!(c.renderer.clear_color.to_hex(), 0xf7f7f7);
        assert_eq!(c.ambient_light.intensity, 3.0);
    }

    #[test]
    fn partial_yaml_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "cubes:\n  count: 25\n  columns: 5\nground:\n  color: \"#102030\"").unwrap();

        let c = SceneConfig::load(file.path()).unwrap();
        assert_eq!(c.cubes.count, 25);
        assert_eq!(c.cubes.columns, 5);
        assert_eq!(c.cubes.size, 0.7);
        assert_eq!(c.ground.color.to_hex(), 0x102030);
        assert_eq!(c.camera, CameraParams::default());
    }

    #[test]
    fn json_file_loads() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"animation": {{"bob_rate": 0.5}}}}"#).unwrap();

        let c = SceneConfig::load(file.path()).unwrap();
        assert_eq!(c.animation.bob_rate, 0.5);
        assert_eq!(c.animation.phase_rate, 0.05);
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        let err = SceneConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = SceneConfig::load(dir.path().join("absent.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn overfull_grid_is_invalid() {
        let mut c = SceneConfig::default();
        c.cubes.count = 101;
        let err = c.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "cubes.count", .. }));
    }

    #[test]
    fn zero_min_distance_is_invalid() {
        let mut c = SceneConfig::default();
        c.orbit.min_distance = 0.0;
        let err = c.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "orbit.min_distance", .. }));
        c.orbit.min_distance = MIN_ORBIT_DISTANCE;
        c.validate().unwrap();
    }

    #[test]
    fn degenerate_shadow_extent_is_invalid() {
        let mut c = SceneConfig::default();
        c.directional_light.shadow_extent = 0.0;
        let err = c.validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid { field: "directional_light.shadow_extent", .. }
        ));
    }

    #[test]
    fn orbit_speeds_must_be_positive_and_finite() {
        for bad in [f32::NAN, f32::INFINITY, 0.0, -1.0] {
            let mut c = SceneConfig::default();
            c.orbit.rotate_speed = bad;
            let err = c.validate().unwrap_err();
            assert!(matches!(err, ConfigError::Invalid { field: "orbit.rotate_speed", .. }));

            let mut c = SceneConfig::default();
            c.orbit.zoom_speed = bad;
            let err = c.validate().unwrap_err();
            assert!(matches!(err, ConfigError::Invalid { field: "orbit.zoom_speed", .. }));
        }
    }

    #[test]
    fn bad_clip_planes_are_invalid() {
        let mut c = SceneConfig::default();
        c.camera.near = 200.0;
        assert!(c.validate().is_err());
    }

    #[test]
    fn invalid_file_values_fail_load() {
        let mut file = tempfile::Builder::new().suffix(".yml").tempfile().unwrap();
        writeln!(file, "cubes:\n  size: 0.0").unwrap();
        let err = SceneConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "cubes.size", .. }));
    }

    #[test]
    fn yaml_dump_reloads_identically() {
        let c = SceneConfig::default();
        let yaml = c.to_yaml().unwrap();
        let back: SceneConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back, c);
    }
}
