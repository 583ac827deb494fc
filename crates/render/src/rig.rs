use crate::camera::OrbitCamera;
use crate::viewport::Viewport;
use cubefield_input::Action;
use cubefield_scene::SceneConfig;

/// Camera plus output viewport, kept in sync on resize.
#[derive(Debug, Clone)]
pub struct CameraRig {
    pub camera: OrbitCamera,
    pub viewport: Viewport,
}

impl CameraRig {
    pub fn new(config: &SceneConfig, width: f32, height: f32, device_pixel_ratio: f32) -> Self {
        let viewport = Viewport::new(width, height, device_pixel_ratio, &config.renderer);
        let mut camera = OrbitCamera::new(&config.camera, &config.orbit, viewport.aspect());
        camera.resize(width, height);
        Self { camera, viewport }
    }

    /// Resize to a logical `width × height` at `device_pixel_ratio`.
    pub fn resize(&mut self, width: f32, height: f32, device_pixel_ratio: f32) {
        self.viewport.resize(width, height, device_pixel_ratio);
        self.camera.resize(width, height);
        tracing::debug!(
            width,
            height,
            pixel_ratio = self.viewport.pixel_ratio(),
            "viewport resized"
        );
    }

    /// Feed an input action. Returns true if the rig consumed it.
    pub fn handle(&mut self, action: &Action) -> bool {
        match *action {
            Action::Rotate { dx, dy } => {
                self.camera.rotate(dx, dy);
                true
            }
            Action::Dolly(notches) => {
                self.camera.dolly(notches);
                true
            }
            Action::Resize {
                width,
                height,
                pixel_ratio,
            } => {
                self.resize(width, height, pixel_ratio);
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resize_updates_camera_and_surface() {
        let mut rig = CameraRig::new(&SceneConfig::default(), 1280.0, 720.0, 1.0);
        rig.resize(1000.0, 400.0, 1.0);
        assert_eq!(rig.camera.aspect, 1000.0 / 400.0);
        assert_eq!(rig.viewport.buffer_size(), (1000, 400));
    }

    #[test]
    fn resize_clamps_device_pixel_ratio() {
        let mut rig = CameraRig::new(&SceneConfig::default(), 640.0, 480.0, 1.0);
        rig.handle(&Action::Resize {
            width: 640.0,
            height: 480.0,
            pixel_ratio: 2.5,
        });
        assert_eq!(rig.camera.aspect, 640.0 / 480.0);
        assert_eq!(rig.viewport.buffer_size(), (1280, 960));
    }

    #[test]
    fn rotate_action_moves_camera_after_update() {
        let mut rig = CameraRig::new(&SceneConfig::default(), 800.0, 600.0, 1.0);
        let start = rig.camera.position;
        assert!(rig.handle(&Action::Rotate { dx: 30.0, dy: 0.0 }));
        assert!(rig.camera.update());
        assert_ne!(rig.camera.position, start);
    }

    #[test]
    fn unrelated_actions_are_not_consumed() {
        let mut rig = CameraRig::new(&SceneConfig::default(), 800.0, 600.0, 1.0);
        assert!(!rig.handle(&Action::ToggleHud));
        assert!(!rig.handle(&Action::Noop));
    }
}
