use anyhow::{Context as _, Result};
use clap::{Parser, ValueEnum};
use egui::Context as EguiContext;
use glam::{UVec2, Vec2};
use ripple_common::{Color, SurfaceKind};
use ripple_input::{Action, Pointer};
use ripple_kernel::{FrameUpdate, ParamChange, ParamError, RippleParams, RippleScene, Spinner};
use ripple_render::{IntersectionResolver, OrbitCamera};
use ripple_render_wgpu::{SceneDraw, WgpuRenderer};
use ripple_tools::FieldInspector;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

/// Pixels of touchpad scroll that count as one wheel line.
const PIXELS_PER_LINE: f32 = 40.0;

#[derive(Parser)]
#[command(name = "ripple-desktop", about = "Ripple plane desktop application")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// YAML parameter file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Which demo to start with
    #[arg(long, value_enum, default_value_t = Demo::Ripple)]
    demo: Demo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Demo {
    /// Pointer-driven ripple plane
    Ripple,
    /// Rotating cone wireframe
    Spinner,
}

/// GPU work the next frame has to do before drawing.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct GpuSync {
    rebuild_surface: bool,
    rebuild_stars: bool,
    upload_field: bool,
}

impl GpuSync {
    fn merge(&mut self, change: ParamChange) {
        self.rebuild_surface |= change.rebuilt_field;
        self.rebuild_stars |= change.regenerated_stars;
        self.upload_field |= change.field_dirty();
    }
}

fn key_action(key: KeyCode) -> Action {
    match key {
        KeyCode::F1 => Action::TogglePanel,
        KeyCode::KeyM => Action::ToggleSurface,
        KeyCode::KeyR => Action::ResetField,
        _ => Action::Noop,
    }
}

fn scroll_lines(delta: MouseScrollDelta) -> f32 {
    match delta {
        MouseScrollDelta::LineDelta(_, y) => y,
        MouseScrollDelta::PixelDelta(p) => p.y as f32 / PIXELS_PER_LINE,
    }
}

/// Apply a setter's result to the panel's bookkeeping.
fn record(result: Result<(), ParamError>, edited: &mut bool, rejected: &mut Option<ParamError>) {
    match result {
        Ok(()) => *edited = true,
        Err(e) => *rejected = Some(e),
    }
}

/// Application state.
struct AppState {
    scene: RippleScene,
    camera: OrbitCamera,
    pointer: Pointer,
    resolver: IntersectionResolver,
    spinner: Spinner,
    demo: Demo,
    show_panel: bool,
    panel_error: Option<String>,
    last_update: FrameUpdate,
    sync: GpuSync,
}

impl AppState {
    fn new(params: RippleParams, demo: Demo) -> Self {
        Self {
            resolver: IntersectionResolver::for_surface(params.surface()),
            scene: RippleScene::new(params),
            camera: OrbitCamera::default(),
            pointer: Pointer::default(),
            spinner: Spinner::default(),
            demo,
            show_panel: true,
            panel_error: None,
            last_update: FrameUpdate::default(),
            sync: GpuSync::default(),
        }
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.pointer.resize(UVec2::new(width, height));
        self.camera.aspect = width as f32 / height.max(1) as f32;
    }

    fn apply(&mut self, action: Action) {
        match action {
            // The pointer already holds the position; picking reads it each frame.
            Action::PointerMoved(_) | Action::PointerLeft | Action::Noop => {}
            Action::Orbit(delta) => self.camera.rotate(delta.x, delta.y),
            Action::Zoom(lines) => self.camera.zoom(lines),
            Action::TogglePanel => self.show_panel = !self.show_panel,
            Action::ToggleSurface => {
                let mut params = *self.scene.params();
                params.set_surface(params.surface().toggled());
                self.apply_params(params);
                tracing::info!(surface = %params.surface(), "surface switched");
            }
            Action::ResetField => {
                self.scene.reset();
                self.sync.upload_field = true;
                tracing::info!("field reset");
            }
        }
    }

    fn apply_params(&mut self, params: RippleParams) {
        let change = self.scene.apply_params(params);
        if change.rebuilt_field {
            self.resolver = IntersectionResolver::for_surface(params.surface());
        }
        self.sync.merge(change);
    }

    /// Advance the active demo by one frame.
    fn advance(&mut self) {
        match self.demo {
            Demo::Ripple => {
                let model = self.scene.surface_transform().matrix();
                let contact =
                    self.resolver
                        .resolve(self.pointer.ndc(), &self.camera, self.scene.field(), model);
                self.last_update = self.scene.step(contact);
                self.sync.upload_field |= self.last_update.needs_update();
            }
            Demo::Spinner => self.spinner.step(),
        }
    }

    fn scene_draw(&self) -> SceneDraw {
        match self.demo {
            Demo::Ripple => SceneDraw {
                surface: Some(self.scene.surface_transform().matrix()),
                spinner: None,
            },
            Demo::Spinner => SceneDraw {
                surface: None,
                spinner: Some(self.spinner.model_matrix()),
            },
        }
    }

    fn draw_ui(&mut self, ctx: &EguiContext) {
        if !self.show_panel {
            return;
        }

        let summary = FieldInspector::summary(&self.scene, self.last_update);
        let mut params = *self.scene.params();
        let mut edited = false;
        let mut rejected: Option<ParamError> = None;
        let mut reset = false;

        egui::SidePanel::left("parameters")
            .default_width(280.0)
            .show(ctx, |ui| {
                ui.heading("Ripple");
                ui.separator();
                ui.horizontal(|ui| {
                    ui.radio_value(&mut self.demo, Demo::Ripple, "Ripple");
                    ui.radio_value(&mut self.demo, Demo::Spinner, "Spinner");
                });
                ui.label(format!(
                    "Frame: {}  Changed: {}  Raised: {}",
                    summary.frame, summary.changed_cells, summary.raised_cells
                ));
                ui.label(format!(
                    "Height: [{:.4}, {:.4}]",
                    summary.min_height, summary.max_height
                ));
                let eye = self.camera.eye();
                ui.label(format!(
                    "Camera: ({:.1}, {:.1}, {:.1})",
                    eye.x, eye.y, eye.z
                ));
                ui.separator();

                ui.heading("Surface");
                let mut surface = params.surface();
                ui.horizontal(|ui| {
                    ui.radio_value(&mut surface, SurfaceKind::Points, "Points");
                    ui.radio_value(&mut surface, SurfaceKind::Mesh, "Mesh");
                });
                if surface != params.surface() {
                    params.set_surface(surface);
                    edited = true;
                }

                let (mut width, mut length) = (params.width(), params.length());
                let w = ui.add(egui::Slider::new(&mut width, 2..=300).text("width"));
                let l = ui.add(egui::Slider::new(&mut length, 2..=300).text("length"));
                if w.changed() || l.changed() {
                    record(params.set_grid_size(width, length), &mut edited, &mut rejected);
                }

                let mut plane_size = params.plane_size();
                if ui
                    .add(egui::Slider::new(&mut plane_size, 1.0..=200.0).text("plane size"))
                    .changed()
                {
                    record(params.set_plane_size(plane_size), &mut edited, &mut rejected);
                }
                ui.separator();

                ui.heading("Raise");
                let mut radius = params.raise_radius();
                if ui
                    .add(egui::Slider::new(&mut radius, 0.0..=0.5).text("radius"))
                    .changed()
                {
                    record(params.set_raise_radius(radius), &mut edited, &mut rejected);
                }

                let mut height = params.raise_height();
                if ui
                    .add(egui::Slider::new(&mut height, -1.0..=1.0).text("height"))
                    .changed()
                {
                    record(params.set_raise_height(height), &mut edited, &mut rejected);
                }

                let mut speed = params.raise_speed();
                if ui
                    .add(
                        egui::Slider::new(&mut speed, 0.0..=0.1)
                            .text("speed")
                            .logarithmic(true),
                    )
                    .changed()
                {
                    record(params.set_raise_speed(speed), &mut edited, &mut rejected);
                }

                let mut slow = params.raise_speed_slow_mult();
                if ui
                    .add(egui::Slider::new(&mut slow, 0.0..=16.0).text("slow multiplier"))
                    .changed()
                {
                    record(params.set_raise_speed_slow_mult(slow), &mut edited, &mut rejected);
                }
                ui.separator();

                ui.heading("Color");
                let mut rgb = params.base_color().to_array();
                ui.horizontal(|ui| {
                    ui.label("base");
                    if ui.color_edit_button_rgb(&mut rgb).changed() {
                        record(
                            params.set_base_color(Color::from(rgb)),
                            &mut edited,
                            &mut rejected,
                        );
                    }
                });

                let mut intensity = params.default_color_intensity();
                if ui
                    .add(egui::Slider::new(&mut intensity, 0.0..=1.0).text("rest intensity"))
                    .changed()
                {
                    record(
                        params.set_default_color_intensity(intensity),
                        &mut edited,
                        &mut rejected,
                    );
                }

                let mut stars = params.star_count();
                if ui
                    .add(egui::Slider::new(&mut stars, 0..=10_000).text("stars"))
                    .changed()
                {
                    params.set_star_count(stars);
                    edited = true;
                }
                ui.separator();

                if ui.button("Reset Field (R)").clicked() {
                    reset = true;
                }
                if let Some(err) = &self.panel_error {
                    ui.colored_label(egui::Color32::LIGHT_RED, err);
                }

                ui.separator();
                ui.small("F1: Toggle Panel | LMB drag: Orbit | Wheel: Zoom | M: Surface");
            });

        if let Some(err) = rejected {
            tracing::warn!(%err, "parameter rejected");
            self.panel_error = Some(err.to_string());
        } else if edited {
            self.panel_error = None;
        }
        if edited {
            self.apply_params(params);
        }
        if reset {
            self.apply(Action::ResetField);
        }
    }
}

struct GpuApp {
    state: AppState,
    window: Option<Arc<Window>>,
    surface: Option<wgpu::Surface<'static>>,
    device: Option<wgpu::Device>,
    queue: Option<wgpu::Queue>,
    config: Option<wgpu::SurfaceConfiguration>,
    renderer: Option<WgpuRenderer>,
    egui_ctx: EguiContext,
    egui_winit: Option<egui_winit::State>,
    egui_renderer: Option<egui_wgpu::Renderer>,
}

impl GpuApp {
    fn new(state: AppState) -> Self {
        Self {
            state,
            window: None,
            surface: None,
            device: None,
            queue: None,
            config: None,
            renderer: None,
            egui_ctx: EguiContext::default(),
            egui_winit: None,
            egui_renderer: None,
        }
    }

    fn init_gpu(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title("Ripple")
            .with_inner_size(PhysicalSize::new(1280u32, 720));
        let window = Arc::new(event_loop.create_window(attrs)?);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone())?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("no suitable GPU adapter")?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("ripple_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))?;

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .context("surface reports no formats")?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        self.state.resize(config.width, config.height);

        let renderer = WgpuRenderer::new(
            &device,
            surface_format,
            config.width,
            config.height,
            &self.state.scene,
            self.state.spinner.edges(),
        );

        let egui_winit = egui_winit::State::new(
            self.egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);

        tracing::info!(
            "GPU initialized with {} backend",
            adapter.get_info().backend.to_str()
        );

        self.window = Some(window);
        self.surface = Some(surface);
        self.device = Some(device);
        self.queue = Some(queue);
        self.config = Some(config);
        self.renderer = Some(renderer);
        self.egui_winit = Some(egui_winit);
        self.egui_renderer = Some(egui_renderer);
        Ok(())
    }

    fn redraw(&mut self) {
        self.state.advance();

        let (
            Some(window),
            Some(surface),
            Some(device),
            Some(queue),
            Some(config),
            Some(renderer),
            Some(egui_winit),
            Some(egui_renderer),
        ) = (
            &self.window,
            &self.surface,
            &self.device,
            &self.queue,
            &self.config,
            &mut self.renderer,
            &mut self.egui_winit,
            &mut self.egui_renderer,
        )
        else {
            return;
        };

        let sync = std::mem::take(&mut self.state.sync);
        if sync.rebuild_surface {
            renderer.rebuild_surface(device, &self.state.scene);
        } else if sync.upload_field {
            renderer.upload_field(queue, self.state.scene.field());
        }
        if sync.rebuild_stars {
            renderer.rebuild_stars(device, self.state.scene.stars());
        }

        let output = match surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                surface.configure(device, config);
                return;
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                return;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        renderer.render(
            device,
            queue,
            &view,
            &self.state.camera,
            &self.state.scene,
            self.state.scene_draw(),
        );

        let raw_input = egui_winit.take_egui_input(window);
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            self.state.draw_ui(ctx);
        });
        egui_winit.handle_platform_output(window, full_output.platform_output);

        let paint_jobs = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [config.width, config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, image_delta) in &full_output.textures_delta.set {
            egui_renderer.update_texture(device, queue, *id, image_delta);
        }
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("egui_encoder"),
        });
        egui_renderer.update_buffers(device, queue, &mut encoder, &paint_jobs, &screen_descriptor);
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
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
            egui_renderer.render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            egui_renderer.free_texture(id);
        }

        output.present();
        window.request_redraw();
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.init_gpu(event_loop) {
            tracing::error!("failed to initialize GPU: {e:#}");
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let (Some(egui_winit), Some(window)) = (&mut self.egui_winit, &self.window) {
            let response = egui_winit.on_window_event(window, &event);
            if response.consumed {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let (Some(surface), Some(device), Some(config)) =
                    (&self.surface, &self.device, &mut self.config)
                {
                    config.width = new_size.width.max(1);
                    config.height = new_size.height.max(1);
                    surface.configure(device, config);
                    self.state.resize(config.width, config.height);
                    if let Some(renderer) = &mut self.renderer {
                        renderer.resize(device, config.width, config.height);
                    }
                }
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
                if key == KeyCode::Escape {
                    event_loop.exit();
                    return;
                }
                self.state.apply(key_action(key));
            }
            WindowEvent::CursorMoved { position, .. } => {
                let action = self
                    .state
                    .pointer
                    .moved(Vec2::new(position.x as f32, position.y as f32));
                self.state.apply(action);
            }
            WindowEvent::CursorLeft { .. } => {
                let action = self.state.pointer.left();
                self.state.apply(action);
            }
            WindowEvent::MouseInput {
                button: MouseButton::Left,
                state: btn_state,
                ..
            } => match btn_state {
                ElementState::Pressed => self.state.pointer.begin_drag(),
                ElementState::Released => self.state.pointer.end_drag(),
            },
            WindowEvent::MouseWheel { delta, .. } => {
                self.state.apply(Action::Zoom(scroll_lines(delta)));
            }
            WindowEvent::RedrawRequested => {
                self.redraw();
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn load_params(path: Option<&Path>) -> Result<RippleParams> {
    let Some(path) = path else {
        return Ok(RippleParams::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    RippleParams::from_yaml(&text).with_context(|| format!("loading {}", path.display()))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let params = load_params(cli.config.as_deref())?;
    tracing::info!(demo = ?cli.demo, surface = %params.surface(), "ripple-desktop starting");

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GpuApp::new(AppState::new(params, cli.demo));
    event_loop.run_app(&mut app)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ripple_render::PickStrategy;

    fn small_state() -> AppState {
        let mut params = RippleParams::default();
        params.set_grid_size(10, 10).unwrap();
        params.set_star_count(8);
        let mut state = AppState::new(params, Demo::Ripple);
        state.resize(800, 600);
        state
    }

    #[test]
    fn keys_map_to_actions() {
        assert_eq!(key_action(KeyCode::F1), Action::TogglePanel);
        assert_eq!(key_action(KeyCode::KeyM), Action::ToggleSurface);
        assert_eq!(key_action(KeyCode::KeyR), Action::ResetField);
        assert_eq!(key_action(KeyCode::KeyQ), Action::Noop);
    }

    #[test]
    fn pixel_scroll_is_scaled_to_lines() {
        let delta = MouseScrollDelta::PixelDelta(winit::dpi::PhysicalPosition::new(0.0, 80.0));
        assert_eq!(scroll_lines(delta), 2.0);
        assert_eq!(scroll_lines(MouseScrollDelta::LineDelta(0.0, -1.0)), -1.0);
    }

    #[test]
    fn toggle_surface_swaps_pick_strategy() {
        let mut state = small_state();
        state.apply(Action::ToggleSurface);
        assert_eq!(state.scene.params().surface(), SurfaceKind::Mesh);
        assert_eq!(state.resolver.strategy(), PickStrategy::Mesh);
        assert!(state.sync.rebuild_surface);
    }

    #[test]
    fn view_actions_leave_scene_alone() {
        let mut state = small_state();
        let yaw = state.camera.yaw;
        let distance = state.camera.distance;
        state.apply(Action::Orbit(Vec2::new(100.0, 0.0)));
        state.apply(Action::Zoom(1.0));
        assert_ne!(state.camera.yaw, yaw);
        assert!(state.camera.distance < distance);
        assert_eq!(state.sync, GpuSync::default());
    }

    #[test]
    fn pointer_off_window_does_not_raise_field() {
        let mut state = small_state();
        state.advance();
        assert!(!state.last_update.needs_update());
        assert!(!state.sync.upload_field);
    }

    #[test]
    fn reset_schedules_upload() {
        let mut state = small_state();
        state.apply(Action::ResetField);
        assert!(state.sync.upload_field);
        assert!(!state.sync.rebuild_surface);
    }

    #[test]
    fn spinner_demo_steps_spinner_only() {
        let mut params = RippleParams::default();
        params.set_grid_size(4, 4).unwrap();
        let mut state = AppState::new(params, Demo::Spinner);
        state.advance();
        assert!(state.spinner.rotation_x() > 0.0);
        assert_eq!(state.scene.frame(), 0);
        let draw = state.scene_draw();
        assert!(draw.surface.is_none() && draw.spinner.is_some());
    }

    #[test]
    fn star_change_schedules_rebuild() {
        let mut state = small_state();
        let mut params = *state.scene.params();
        params.set_star_count(64);
        state.apply_params(params);
        assert!(state.sync.rebuild_stars);
        assert!(!state.sync.upload_field);
    }
}
