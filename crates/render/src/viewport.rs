use cubefield_common::Color;
use cubefield_scene::RendererParams;

/// Output surface dimensions and clear settings.
///
/// Sizes are logical pixels; the backing buffer is the logical size times the
/// device pixel ratio, with the ratio capped at `max_pixel_ratio`.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    width: f32,
    height: f32,
    pixel_ratio: f32,
    max_pixel_ratio: f32,
    pub clear_color: Color,
    pub clear_alpha: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32, device_pixel_ratio: f32, params: &RendererParams) -> Self {
        let mut viewport = Self {
            width: 0.0,
            height: 0.0,
            pixel_ratio: 1.0,
            max_pixel_ratio: params.max_pixel_ratio,
            clear_color: params.clear_color,
            clear_alpha: params.clear_alpha,
        };
        viewport.resize(width, height, device_pixel_ratio);
        viewport
    }

    pub fn resize(&mut self, width: f32, height: f32, device_pixel_ratio: f32) {
        self.width = width.max(0.0);
        self.height = height.max(0.0);
        self.pixel_ratio = device_pixel_ratio.min(self.max_pixel_ratio);
    }

    pub fn logical_size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    /// Effective pixel ratio after clamping.
    pub fn pixel_ratio(&self) -> f32 {
        self.pixel_ratio
    }

    /// Backing buffer size in physical pixels, never smaller than 1×1.
    pub fn buffer_size(&self) -> (u32, u32) {
        let px = |v: f32| ((v * self.pixel_ratio).round() as u32).max(1);
        (px(self.width), px(self.height))
    }

    pub fn aspect(&self) -> f32 {
        if self.height > 0.0 {
            self.width / self.height
        } else {
            1.0
        }
    }

    /// Clear color in linear space with straight alpha.
    pub fn clear_linear_rgba(&self) -> [f32; 4] {
        self.clear_color.to_linear_rgba(1.0, self.clear_alpha)
    }

    pub fn is_transparent(&self) -> bool {
        self.clear_alpha < 1.0
    }
}
