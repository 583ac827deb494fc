use anyhow::{Context, Result};
use clap::Parser;
use cubefield_input::{Action, HotKey, PointerButton, PointerTracker};
use cubefield_render::{CameraRig, FrameLoop, RenderView};
use cubefield_render_wgpu::{Overlays, WgpuRenderer, pick_sample_count};
use cubefield_scene::{Clock, Scene, SceneBuilder, SceneConfig, TimeSource};
use egui::Context as EguiContext;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

#[derive(Parser)]
#[command(name = "cubefield-desktop", about = "Animated cube field in a desktop window")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// YAML or JSON file overriding the scene parameters
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seed for cube colors and heights (random when omitted)
    #[arg(long)]
    seed: Option<u64>,
}

/// Smoothed frames-per-second estimate.
#[derive(Debug, Default)]
struct FrameRate {
    last: Option<Instant>,
    fps: f32,
}

impl FrameRate {
    fn tick(&mut self, now: Instant) {
        if let Some(last) = self.last.replace(now) {
            let dt = (now - last).as_secs_f32();
            if dt > 0.0 {
                let instant = 1.0 / dt;
                self.fps = if self.fps == 0.0 {
                    instant
                } else {
                    self.fps * 0.9 + instant * 0.1
                };
            }
        }
    }

    fn fps(&self) -> f32 {
        self.fps
    }
}

/// Application state.
struct AppState {
    config: SceneConfig,
    scene: Scene,
    rig: CameraRig,
    frame_loop: FrameLoop,
    clock: Clock,
    pointer: PointerTracker,
    frame_rate: FrameRate,
    overlays: Overlays,
    show_hud: bool,
    quit: bool,
}

impl AppState {
    fn new(config: SceneConfig, seed: Option<u64>) -> Self {
        let builder = SceneBuilder::new(config.clone());
        let scene = match seed {
            Some(seed) => builder.build_seeded(seed),
            None => builder.build(),
        };
        let rig = CameraRig::new(&config, 1280.0, 720.0, 1.0);
        let frame_loop = FrameLoop::new(config.animation.clone());
        let overlays = Overlays::from_params(&config.helpers);

        tracing::info!(
            cubes = scene.cube_count(),
            nodes = scene.node_count(),
            "scene ready"
        );

        Self {
            config,
            scene,
            rig,
            frame_loop,
            clock: Clock::new(),
            pointer: PointerTracker::new(),
            frame_rate: FrameRate::default(),
            overlays,
            show_hud: false,
            quit: false,
        }
    }

    fn handle_action(&mut self, action: &Action) {
        if self.rig.handle(action) {
            return;
        }
        match action {
            Action::ToggleHud => {
                self.show_hud = !self.show_hud;
                tracing::info!(visible = self.show_hud, "HUD toggled");
            }
            Action::ToggleGridHelper => {
                self.overlays.grid = !self.overlays.grid;
                tracing::info!(visible = self.overlays.grid, "grid helper toggled");
            }
            Action::ToggleAxesHelper => {
                self.overlays.axes = !self.overlays.axes;
                tracing::info!(visible = self.overlays.axes, "axes helper toggled");
            }
            Action::Quit => {
                self.quit = true;
            }
            _ => {}
        }
    }

    /// Animate and update the camera for this redraw.
    fn advance(&mut self) -> RenderView {
        self.frame_rate.tick(Instant::now());
        let elapsed = self.clock.elapsed_secs();
        self.frame_loop
            .advance(elapsed, &mut self.scene, &mut self.rig.camera)
    }

    fn draw_hud(&mut self, ctx: &EguiContext) {
        if !self.show_hud {
            return;
        }

        egui::Window::new("Cubefield")
            .default_pos([12.0, 12.0])
            .resizable(false)
            .show(ctx, |ui| {
                ui.label(format!("Time: {:.1} s", self.scene.elapsed()));
                ui.label(format!(
                    "FPS: {:.0}  Frames: {}",
                    self.frame_rate.fps(),
                    self.frame_loop.frames()
                ));
                let p = self.rig.camera.position;
                ui.label(format!("Camera: ({:.1}, {:.1}, {:.1})", p.x, p.y, p.z));
                ui.label(format!("Distance: {:.2}", self.rig.camera.distance()));
                ui.label(format!("Cubes: {}", self.scene.cube_count()));
                ui.separator();

                ui.checkbox(&mut self.overlays.grid, "Grid helper (G)");
                ui.checkbox(&mut self.overlays.axes, "Axes helper (X)");
                ui.checkbox(&mut self.rig.camera.controls.enable_damping, "Damping");

                ui.separator();
                ui.small("F1: HUD | LMB drag: orbit | Wheel: dolly | Esc: quit");
            });
    }
}

fn hotkey(key: KeyCode) -> HotKey {
    match key {
        KeyCode::F1 => HotKey::F1,
        KeyCode::KeyG => HotKey::G,
        KeyCode::KeyX => HotKey::X,
        KeyCode::Escape => HotKey::Escape,
        _ => HotKey::Other,
    }
}

fn pointer_button(button: MouseButton) -> PointerButton {
    match button {
        MouseButton::Left => PointerButton::Primary,
        MouseButton::Right => PointerButton::Secondary,
        MouseButton::Middle => PointerButton::Middle,
        _ => PointerButton::Other,
    }
}

/// Prefer a compositing mode that honors the clear alpha when the window is
/// transparent, and an opaque one otherwise.
fn pick_alpha_mode(
    modes: &[wgpu::CompositeAlphaMode],
    transparent: bool,
) -> wgpu::CompositeAlphaMode {
    use wgpu::CompositeAlphaMode as Mode;
    let preferred: &[Mode] = if transparent {
        &[Mode::PreMultiplied, Mode::PostMultiplied]
    } else {
        &[Mode::Opaque]
    };
    preferred
        .iter()
        .find(|m| modes.contains(*m))
        .or_else(|| modes.first())
        .copied()
        .unwrap_or(Mode::Auto)
}

/// Window and GPU resources, created on `resumed`.
struct Gpu {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    renderer: WgpuRenderer,
    egui_winit: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

impl Gpu {
    fn new(event_loop: &ActiveEventLoop, state: &mut AppState, egui_ctx: &EguiContext) -> Result<Self> {
        let transparent = state.rig.viewport.is_transparent();
        let attrs = Window::default_attributes()
            .with_title("Cubefield")
            .with_inner_size(LogicalSize::new(1280.0, 720.0))
            .with_transparent(transparent);
        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .context("failed to create window")?,
        );

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("failed to create surface")?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("no suitable GPU adapter")?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("cubefield_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .context("failed to create device")?;

        let scale = window.scale_factor();
        let logical = window.inner_size().to_logical::<f32>(scale);
        state.rig.resize(logical.width, logical.height, scale as f32);
        let (width, height) = state.rig.viewport.buffer_size();

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .context("surface reports no formats")?;
        let alpha_mode = pick_alpha_mode(&surface_caps.alpha_modes, transparent);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let sample_count =
            pick_sample_count(&adapter, surface_format, state.config.renderer.antialias);
        let renderer = WgpuRenderer::new(
            &device,
            surface_format,
            alpha_mode,
            sample_count,
            &state.rig.viewport,
            &state.config,
            &state.scene,
        );

        let egui_winit = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(scale as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);

        tracing::info!(
            backend = adapter.get_info().backend.to_str(),
            ?surface_format,
            sample_count,
            "GPU initialized"
        );

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            renderer,
            egui_winit,
            egui_renderer,
        })
    }

    /// Match the surface and attachments to the viewport's buffer size.
    fn reconfigure(&mut self, (width, height): (u32, u32)) {
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.renderer.resize(&self.device, width, height);
    }

    fn draw_egui(
        &mut self,
        target: &wgpu::TextureView,
        egui_ctx: &EguiContext,
        pixel_ratio: f32,
        state: &mut AppState,
    ) {
        let raw_input = self.egui_winit.take_egui_input(&self.window);
        let full_output = egui_ctx.run(raw_input, |ctx| {
            state.draw_hud(ctx);
        });
        self.egui_winit
            .handle_platform_output(&self.window, full_output.platform_output);

        let paint_jobs = egui_ctx.tessellate(full_output.shapes, full_output.pixels_per_point);
        // the surface may be smaller than the window when the pixel ratio is capped
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.config.width, self.config.height],
            pixels_per_point: pixel_ratio,
        };

        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui_renderer
                .update_texture(&self.device, &self.queue, *id, image_delta);
        }
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("egui_encoder"),
            });
        self.egui_renderer.update_buffers(
            &self.device,
            &self.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: target,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();
            self.egui_renderer
                .render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        self.queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }
    }
}

struct GpuApp {
    state: AppState,
    gpu: Option<Gpu>,
    egui_ctx: EguiContext,
    error: Option<anyhow::Error>,
}

impl GpuApp {
    fn new(config: SceneConfig, seed: Option<u64>) -> Self {
        Self {
            state: AppState::new(config, seed),
            gpu: None,
            egui_ctx: EguiContext::default(),
            error: None,
        }
    }

    fn resize(&mut self, size: PhysicalSize<u32>, scale_factor: f64) {
        let logical = size.to_logical::<f32>(scale_factor);
        let Some(action) = Action::resize(logical.width, logical.height, scale_factor as f32)
        else {
            return;
        };
        self.state.handle_action(&action);
        if let Some(gpu) = &mut self.gpu {
            gpu.reconfigure(self.state.rig.viewport.buffer_size());
        }
    }

    fn redraw(&mut self) {
        let Self {
            state,
            gpu,
            egui_ctx,
            ..
        } = self;
        let Some(gpu) = gpu else {
            return;
        };

        let view = state.advance();

        let output = match gpu.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.surface.configure(&gpu.device, &gpu.config);
                return;
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                return;
            }
        };

        let target = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        gpu.renderer.render(
            &gpu.device,
            &gpu.queue,
            &target,
            &state.scene,
            &view,
            &state.rig.viewport,
            state.overlays,
        );

        let pixel_ratio = state.rig.viewport.pixel_ratio();
        gpu.draw_egui(&target, egui_ctx, pixel_ratio, state);

        output.present();
        gpu.window.request_redraw();
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }

        match Gpu::new(event_loop, &mut self.state, &self.egui_ctx) {
            Ok(gpu) => self.gpu = Some(gpu),
            Err(e) => {
                tracing::error!("GPU initialization failed: {e:#}");
                self.error = Some(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(window) = self.gpu.as_ref().map(|g| g.window.clone()) else {
            return;
        };

        if let Some(gpu) = &mut self.gpu {
            let response = gpu.egui_winit.on_window_event(&window, &event);
            if response.consumed {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                self.resize(new_size, window.scale_factor());
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                self.resize(window.inner_size(), scale_factor);
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => {
                self.state.handle_action(&hotkey(key).action());
            }
            WindowEvent::MouseInput { button, state, .. } => {
                self.state
                    .pointer
                    .button(pointer_button(button), state == ElementState::Pressed);
            }
            WindowEvent::CursorMoved { position, .. } => {
                let logical = position.to_logical::<f32>(window.scale_factor());
                if let Some(action) = self.state.pointer.cursor_moved(logical.x, logical.y) {
                    self.state.handle_action(&action);
                }
            }
            WindowEvent::CursorLeft { .. } => {
                self.state.pointer.cursor_left();
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let dy = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(p) => p.y as f32,
                };
                if let Some(action) = self.state.pointer.wheel(dy) {
                    self.state.handle_action(&action);
                }
            }
            WindowEvent::RedrawRequested => {
                self.redraw();
            }
            _ => {}
        }

        if self.state.quit {
            tracing::info!("quit requested");
            event_loop.exit();
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(gpu) = &self.gpu {
            gpu.window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("cubefield-desktop starting");

    let config = SceneConfig::load_or_default(cli.config.as_deref())?;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GpuApp::new(config, cli.seed);
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn state() -> AppState {
        AppState::new(SceneConfig::default(), Some(11))
    }

    #[test]
    fn hotkeys_toggle_overlays_and_hud() {
        let mut s = state();
        assert!(!s.show_hud);
        s.handle_action(&hotkey(KeyCode::F1).action());
        s.handle_action(&hotkey(KeyCode::KeyG).action());
        assert!(s.show_hud);
        assert!(s.overlays.grid);
        assert!(!s.overlays.axes);
        s.handle_action(&hotkey(KeyCode::KeyX).action());
        s.handle_action(&hotkey(KeyCode::KeyG).action());
        assert!(s.overlays.axes);
        assert!(!s.overlays.grid);
    }

    #[test]
    fn escape_requests_quit() {
        let mut s = state();
        s.handle_action(&hotkey(KeyCode::KeyQ).action());
        assert!(!s.quit);
        s.handle_action(&hotkey(KeyCode::Escape).action());
        assert!(s.quit);
    }

    #[test]
    fn left_drag_rotates_camera() {
        let mut s = state();
        let start = s.rig.camera.position;
        s.pointer.button(pointer_button(MouseButton::Left), true);
        assert!(s.pointer.cursor_moved(100.0, 100.0).is_none());
        let action = s.pointer.cursor_moved(140.0, 100.0).unwrap();
        s.handle_action(&action);
        s.advance();
        assert_ne!(s.rig.camera.position, start);
        assert_eq!(s.frame_loop.frames(), 1);
    }

    #[test]
    fn right_drag_does_nothing() {
        let mut s = state();
        s.pointer.button(pointer_button(MouseButton::Right), true);
        s.pointer.cursor_moved(0.0, 0.0);
        assert!(s.pointer.cursor_moved(50.0, 0.0).is_none());
    }

    #[test]
    fn resize_action_reaches_viewport() {
        let mut s = state();
        s.handle_action(&Action::resize(800.0, 400.0, 3.0).unwrap());
        assert_eq!(s.rig.camera.aspect, 2.0);
        assert_eq!(s.rig.viewport.buffer_size(), (1600, 800));
    }

    #[test]
    fn alpha_mode_prefers_premultiplied_when_transparent() {
        use wgpu::CompositeAlphaMode as Mode;
        let all = [Mode::Opaque, Mode::PostMultiplied, Mode::PreMultiplied];
        assert_eq!(pick_alpha_mode(&all, true), Mode::PreMultiplied);
        assert_eq!(pick_alpha_mode(&all, false), Mode::Opaque);
        assert_eq!(pick_alpha_mode(&[Mode::Opaque], true), Mode::Opaque);
        assert_eq!(pick_alpha_mode(&[], true), Mode::Auto);
    }

    #[test]
    fn frame_rate_smooths() {
        let mut rate = FrameRate::default();
        let t0 = Instant::now();
        rate.tick(t0);
        assert_eq!(rate.fps(), 0.0);
        rate.tick(t0 + Duration::from_millis(20));
        assert!((rate.fps() - 50.0).abs() < 0.5);
        rate.tick(t0 + Duration::from_millis(30));
        assert!(rate.fps() > 50.0 && rate.fps() < 100.0);
    }
}
