use crate::camera::OrbitCamera;
use crate::renderer::{RenderView, Renderer};
use cubefield_scene::{AnimationParams, Scene, animate};

/// One iteration of the per-frame sequence: animate, update camera, draw.
///
/// The host calls this once per display refresh (desktop) or per timer tick
/// (headless). There is no cancellation; the host stops calling it.
#[derive(Debug, Clone)]
pub struct FrameLoop {
    animation: AnimationParams,
    frames: u64,
}

impl FrameLoop {
    pub fn new(animation: AnimationParams) -> Self {
        Self {
            animation,
            frames: 0,
        }
    }

    /// Frames advanced so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Animate the scene at `elapsed`, apply pending camera input, and return
    /// the view the draw call should use.
    pub fn advance(&mut self, elapsed: f32, scene: &mut Scene, camera: &mut OrbitCamera) -> RenderView {
        animate(scene, &self.animation, elapsed);
        camera.update();
        self.frames += 1;
        camera.render_view()
    }

    /// `advance` followed by a draw with `renderer`.
    pub fn run_frame<R: Renderer>(
        &mut self,
        elapsed: f32,
        scene: &mut Scene,
        camera: &mut OrbitCamera,
        renderer: &R,
    ) -> R::Output {
        let view = self.advance(elapsed, scene, camera);
        renderer.render(scene, &view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::DebugTextRenderer;
    use cubefield_scene::{FixedStepClock, SceneBuilder, TimeSource};
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn first_frame_shows_base_heights() {
        let mut scene = SceneBuilder::default().build_seeded(3);
        let mut camera = OrbitCamera::default();
        let mut frames = FrameLoop::new(AnimationParams::default());

        frames.advance(0.0, &mut scene, &mut camera);
        assert_eq!(frames.frames(), 1);
        for cube in scene.cubes() {
            assert_eq!(cube.transform.position.y, cube.base_height);
        }
    }

    #[test]
    fn bob_peak_frame() {
        let params = AnimationParams {
            wave_amplitude: 0.0,
            ..AnimationParams::default()
        };
        let mut scene = SceneBuilder::default().build_seeded(3);
        let mut camera = OrbitCamera::default();
        let mut frames = FrameLoop::new(params);

        frames.advance(FRAC_PI_2 / 0.32, &mut scene, &mut camera);
        for cube in scene.cubes() {
            assert!((cube.transform.position.y - cube.base_height - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn camera_input_lands_before_the_draw() {
        let mut scene = SceneBuilder::default().build_seeded(3);
        let mut camera = OrbitCamera::default();
        camera.resize(800.0, 600.0);
        let start = camera.position;
        camera.rotate(50.0, 0.0);

        let mut frames = FrameLoop::new(AnimationParams::default());
        let view = frames.advance(0.5, &mut scene, &mut camera);
        assert_ne!(view.eye, start);
        assert_eq!(view.eye, camera.position);
    }

    #[test]
    fn fixed_rate_loop_renders_text_frames() {
        let mut scene = SceneBuilder::default().build_seeded(3);
        let mut camera = OrbitCamera::default();
        let mut frames = FrameLoop::new(AnimationParams::default());
        let mut clock = FixedStepClock::from_fps(60);
        let renderer = DebugTextRenderer::with_max_cubes(1);

        let mut last = String::new();
        for _ in 0..120 {
            last = frames.run_frame(clock.elapsed_secs(), &mut scene, &mut camera, &renderer);
            clock.tick();
        }
        assert_eq!(frames.frames(), 120);
        assert!(last.contains("t=1.983"), "{last}");
    }
}
