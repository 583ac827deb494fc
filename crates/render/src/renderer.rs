use cubefield_scene::Scene;
use glam::{Mat4, Vec3};
use std::fmt::Write;

/// Camera/view configuration for rendering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderView {
    /// Camera position in world space.
    pub eye: Vec3,
    /// Point the camera is looking at.
    pub target: Vec3,
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for RenderView {
    fn default() -> Self {
        Self {
            eye: Vec3::new(8.0, 4.0, 8.0),
            target: Vec3::ZERO,
            fov_degrees: 60.0,
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 100.0,
        }
    }
}

impl RenderView {
    pub fn view_projection(&self) -> Mat4 {
        let proj = Mat4::perspective_rh(self.fov_degrees.to_radians(), self.aspect, self.near, self.far);
        proj * Mat4::look_at_rh(self.eye, self.target, Vec3::Y)
    }
}

/// Renderer-agnostic interface.
///
/// The renderer reads the scene and a view, then produces output. It never
/// mutates the scene.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame from the given scene and view.
    fn render(&self, scene: &Scene, view: &RenderView) -> Self::Output;
}

/// Produces a human-readable dump of a frame. Used by the headless CLI and
/// for testing the frame loop without a GPU.
#[derive(Debug, Default)]
pub struct DebugTextRenderer {
    /// Print at most this many cubes; `None` prints all of them.
    pub max_cubes: Option<usize>,
}

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_cubes(max_cubes: usize) -> Self {
        Self {
            max_cubes: Some(max_cubes),
        }
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, scene: &Scene, view: &RenderView) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "=== Frame (t={:.3}s) ===", scene.elapsed());
        let _ = writeln!(out, "Cubes: {}", scene.cube_count());
        let _ = writeln!(
            out,
            "Camera: eye=({:.2}, {:.2}, {:.2}) target=({:.1}, {:.1}, {:.1}) fov={:.0} aspect={:.3}",
            view.eye.x,
            view.eye.y,
            view.eye.z,
            view.target.x,
            view.target.y,
            view.target.z,
            view.fov_degrees,
            view.aspect
        );
        if let Some(ground) = scene.ground() {
            let _ = writeln!(out, "Ground: y={:.2} color={}", ground.height, ground.color);
        }

        let limit = self.max_cubes.unwrap_or(usize::MAX);
        for cube in scene.cubes().take(limit) {
            let p = cube.transform.position;
            let _ = writeln!(
                out,
                "  [{:>2},{:>2}] pos=({:.2}, {:.3}, {:.2}) color={}",
                cube.cell.x, cube.cell.z, p.x, p.y, p.z, cube.color
            );
        }
        let hidden = scene.cube_count().saturating_sub(limit);
        if hidden > 0 {
            let _ = writeln!(out, "  ... {hidden} more");
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cubefield_scene::SceneBuilder;

    #[test]
    fn debug_renderer_lists_cubes() {
        let scene = SceneBuilder::default().build_seeded(1);
        let output = DebugTextRenderer::new().render(&scene, &RenderView::default());

        assert!(output.contains("t=0.000"));
        assert!(output.contains("Cubes: 100"));
        assert!(output.contains("[-5,-5]"));
        assert!(output.contains("[ 4, 4]"));
        assert!(output.contains("Ground: y=-2.40 color=#f7f7f7"));
    }

    #[test]
    fn debug_renderer_truncates() {
        let scene = SceneBuilder::default().build_seeded(1);
        let output = DebugTextRenderer::with_max_cubes(3).render(&scene, &RenderView::default());
        assert_eq!(output.matches("pos=").count(), 3);
        assert!(output.contains("... 97 more"));
    }

    #[test]
    fn render_view_default() {
        let view = RenderView::default();
        assert_eq!(view.fov_degrees, 60.0);
        assert_eq!(view.target, Vec3::ZERO);
        assert!(!view.view_projection().col(0).x.is_nan());
    }
}
