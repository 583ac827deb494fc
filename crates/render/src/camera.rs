use crate::renderer::RenderView;
use cubefield_scene::{CameraParams, MIN_ORBIT_DISTANCE, OrbitParams};
use glam::{Mat4, Vec2, Vec3};
use std::f32::consts::{PI, TAU};

const POLAR_EPSILON: f32 = 1e-6;

/// Perspective camera orbiting a fixed target with damped pointer response.
///
/// Pointer input accumulates a pending spherical delta; `update()` applies a
/// `damping_factor` share of it per frame and decays the rest, so motion eases
/// out after the pointer stops.
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    pub position: Vec3,
    pub target: Vec3,
    pub fov_y_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub controls: OrbitParams,
    viewport_height: f32,
    /// Pending (theta, phi) rotation in radians.
    pending: Vec2,
    scale: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::new(&CameraParams::default(), &OrbitParams::default(), 16.0 / 9.0)
    }
}

impl OrbitCamera {
    pub fn new(camera: &CameraParams, controls: &OrbitParams, aspect: f32) -> Self {
        Self {
            position: camera.position,
            target: camera.look_at,
            fov_y_degrees: camera.fov_y_degrees,
            aspect,
            near: camera.near,
            far: camera.far,
            controls: controls.clone(),
            viewport_height: 1.0,
            pending: Vec2::ZERO,
            scale: 1.0,
        }
    }

    /// Track a new viewport size: aspect becomes exactly `width / height`.
    pub fn resize(&mut self, width: f32, height: f32) {
        if height > 0.0 {
            self.aspect = width / height;
            self.viewport_height = height;
        }
    }

    /// Queue a rotation for a pointer drag of `(dx, dy)` logical pixels.
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        if !dx.is_finite() || !dy.is_finite() {
            return;
        }
        let h = self.viewport_height.max(1.0);
        let speed = self.controls.rotate_speed;
        self.pending.x -= TAU * dx / h * speed;
        self.pending.y -= TAU * dy / h * speed;
    }

    /// Queue a dolly of `notches` wheel steps; positive moves closer.
    pub fn dolly(&mut self, notches: f32) {
        if !notches.is_finite() {
            return;
        }
        self.scale *= 0.95_f32.powf(self.controls.zoom_speed * notches);
    }

    /// Apply pending input. Returns true if the camera moved.
    pub fn update(&mut self) -> bool {
        let offset = self.position - self.target;
        let radius = offset.length();
        if radius <= f32::EPSILON {
            return false;
        }

        if self.pending == Vec2::ZERO && self.scale == 1.0 {
            return false;
        }

        let mut theta = offset.x.atan2(offset.z);
        let mut phi = (offset.y / radius).clamp(-1.0, 1.0).acos();

        let damping = self.controls.enable_damping;
        let factor = self.controls.damping_factor;
        let step = if damping {
            self.pending * factor
        } else {
            self.pending
        };
        theta += step.x;
        phi = (phi + step.y).clamp(POLAR_EPSILON, PI - POLAR_EPSILON);

        // never let the eye reach the target: the orbit basis degenerates there
        let min = self.controls.min_distance.max(MIN_ORBIT_DISTANCE);
        let max = self.controls.max_distance.max(min);
        let radius = (radius * self.scale).clamp(min, max);

        let sin_phi_r = phi.sin() * radius;
        let new_offset = Vec3::new(
            sin_phi_r * theta.sin(),
            phi.cos() * radius,
            sin_phi_r * theta.cos(),
        );

        let previous = self.position;
        self.position = self.target + new_offset;

        if damping {
            self.pending *= 1.0 - factor;
            if self.pending.length_squared() < 1e-12 {
                self.pending = Vec2::ZERO;
            }
        } else {
            self.pending = Vec2::ZERO;
        }
        self.scale = 1.0;

        previous.distance_squared(self.position) > 1e-10
    }

    pub fn distance(&self) -> f32 {
        self.position.distance(self.target)
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y_degrees.to_radians(), self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    pub fn render_view(&self) -> RenderView {
        RenderView {
            eye: self.position,
            target: self.target,
            fov_degrees: self.fov_y_degrees,
            aspect: self.aspect,
            near: self.near,
            far: self.far,
        }
    }
}
