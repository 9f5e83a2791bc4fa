use anyhow::{Context as _, Result};
use clap::Parser;
use egui::Context as EguiContext;
use glam::Vec3;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{
    DeviceEvent, DeviceId, ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent,
};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{CursorGrabMode, Window, WindowId};
use ygg_common::MeshId;
use ygg_input::{Action, CameraController, Key, KeyBindings};
use ygg_render::renderer::{DEFAULT_FAR, DEFAULT_NEAR};
use ygg_render::{LineSegment, Scene, SceneDescription};
use ygg_render_wgpu::{BackendError, GpuContext, ShaderProgram, WgpuRenderer};

/// Scroll distance in pixels treated as one wheel line.
const PIXELS_PER_LINE: f32 = 40.0;

#[derive(Parser)]
#[command(name = "ygg-desktop", about = "Procedural meshes drawn with a fly camera")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Scene description (YAML); the built-in demo scene when omitted
    #[arg(long)]
    scene: Option<PathBuf>,

    /// Key bindings (YAML map of key name to binding) layered over the defaults
    #[arg(long)]
    bindings: Option<PathBuf>,

    /// WGSL file replacing the built-in mesh shader
    #[arg(long)]
    shader: Option<PathBuf>,
}

/// Map winit key codes onto the input layer's keys.
fn map_key(code: KeyCode) -> Option<Key> {
    Some(match code {
        KeyCode::KeyW => Key::W,
        KeyCode::KeyA => Key::A,
        KeyCode::KeyS => Key::S,
        KeyCode::KeyD => Key::D,
        KeyCode::KeyQ => Key::Q,
        KeyCode::KeyE => Key::E,
        KeyCode::ArrowUp => Key::Up,
        KeyCode::ArrowDown => Key::Down,
        KeyCode::ArrowLeft => Key::Left,
        KeyCode::ArrowRight => Key::Right,
        KeyCode::Space => Key::Space,
        KeyCode::ShiftLeft => Key::LeftShift,
        KeyCode::ControlLeft => Key::LeftControl,
        KeyCode::Escape => Key::Escape,
        KeyCode::F1 => Key::F1,
        _ => return None,
    })
}

fn load_bindings(path: Option<&PathBuf>) -> Result<KeyBindings> {
    let Some(path) = path else {
        return Ok(KeyBindings::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading bindings {}", path.display()))?;
    let named: BTreeMap<String, String> = serde_yaml::from_str(&text)?;
    Ok(KeyBindings::from_named(named)?)
}

/// Light ray from the scene light down to the floor under the camera.
fn light_ray(scene: &Scene) -> LineSegment {
    let eye = scene.camera.position();
    LineSegment::new(
        scene.light.position,
        Vec3::new(eye.x, -0.5, eye.z),
        Vec3::new(1.0, 0.9, 0.2),
    )
}

/// Application state independent of the GPU.
struct AppState {
    scene: Scene,
    controller: CameraController,
    /// Backend ids, parallel to `scene.objects`.
    mesh_ids: Vec<MeshId>,
    light_ray: Option<MeshId>,
    show_overlay: bool,
    last_frame: Instant,
}

impl AppState {
    fn new(scene: Scene, controller: CameraController) -> Self {
        Self {
            scene,
            controller,
            mesh_ids: Vec::new(),
            light_ray: None,
            show_overlay: true,
            last_frame: Instant::now(),
        }
    }

    /// Route an action to the camera. Returns false when the app should quit.
    fn handle_action(&mut self, action: Action) -> bool {
        match action {
            Action::Quit => return false,
            Action::ToggleOverlay => self.show_overlay = !self.show_overlay,
            other => self.controller.apply(&mut self.scene.camera, other, 0.0),
        }
        true
    }

    fn draw_ui(&self, ctx: &EguiContext) {
        if !self.show_overlay {
            return;
        }
        let cam = &self.scene.camera;

        egui::Window::new("ygg")
            .default_width(260.0)
            .resizable(false)
            .show(ctx, |ui| {
                let p = cam.position();
                ui.label(format!("Position: ({:.2}, {:.2}, {:.2})", p.x, p.y, p.z));
                ui.label(format!(
                    "Yaw: {:.1}  Pitch: {:.1}  FOV: {:.1}",
                    cam.yaw(),
                    cam.pitch(),
                    cam.fov()
                ));
                ui.label(if self.controller.look_active() {
                    "Look: active"
                } else {
                    "Look: hold RMB"
                });
                ui.separator();

                ui.heading("Objects");
                for (object, id) in self.scene.objects.iter().zip(&self.mesh_ids) {
                    ui.label(format!(
                        "{} [{}]: {} verts, {} tris",
                        object.name,
                        id.short(),
                        object.mesh.vertex_count(),
                        object.mesh.triangle_count()
                    ));
                }
                ui.separator();
                ui.small("F1: Overlay | RMB: Look | WASD/Up/Down: Move | Wheel: Zoom | Esc: Quit");
            });
    }
}

/// Window, GPU and overlay resources, created on `resumed`.
struct Graphics {
    window: Arc<Window>,
    gpu: GpuContext,
    renderer: WgpuRenderer,
    egui_winit: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

struct GpuApp {
    state: AppState,
    shader_path: Option<PathBuf>,
    egui_ctx: EguiContext,
    graphics: Option<Graphics>,
    /// Look reads relative mouse motion while grabbed, cursor positions otherwise.
    cursor_grabbed: bool,
    error: Option<anyhow::Error>,
}

impl GpuApp {
    fn new(state: AppState, shader_path: Option<PathBuf>) -> Self {
        Self {
            state,
            shader_path,
            egui_ctx: EguiContext::default(),
            graphics: None,
            cursor_grabbed: false,
            error: None,
        }
    }

    fn init_graphics(&mut self, event_loop: &ActiveEventLoop) -> Result<Graphics> {
        let attrs = Window::default_attributes()
            .with_title("Ygg Engine")
            .with_inner_size(PhysicalSize::new(1280u32, 720));
        let window = Arc::new(event_loop.create_window(attrs)?);
        let size = window.inner_size();

        let gpu = GpuContext::new(window.clone(), size.width, size.height)?;
        let shader = match &self.shader_path {
            Some(path) => ShaderProgram::from_file(&gpu.device, path)?,
            None => ShaderProgram::mesh(&gpu.device)?,
        };
        let (width, height) = gpu.size();
        let mut renderer =
            WgpuRenderer::new(&gpu.device, gpu.surface_format(), width, height, &shader)?;

        self.state.mesh_ids.clear();
        for object in &self.state.scene.objects {
            let id = renderer.upload(&gpu.device, &object.mesh)?;
            self.state.mesh_ids.push(id);
        }
        self.state.light_ray =
            Some(renderer.create_line(&gpu.device, &light_ray(&self.state.scene)));
        tracing::info!(meshes = renderer.mesh_count(), "scene uploaded");

        let egui_winit = egui_winit::State::new(
            self.egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer =
            egui_wgpu::Renderer::new(&gpu.device, gpu.surface_format(), None, 1, false);

        Ok(Graphics {
            window,
            gpu,
            renderer,
            egui_winit,
            egui_renderer,
        })
    }

    fn set_look(&mut self, active: bool) {
        let action = self.state.controller.set_look_active(active);
        self.state.handle_action(action);
        let Some(graphics) = &self.graphics else {
            return;
        };
        let window = &graphics.window;
        if active {
            let grabbed = window
                .set_cursor_grab(CursorGrabMode::Locked)
                .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined));
            match grabbed {
                Ok(()) => self.cursor_grabbed = true,
                Err(e) => tracing::warn!("cursor grab unavailable, looking with cursor positions: {e}"),
            }
        } else {
            if let Err(e) = window.set_cursor_grab(CursorGrabMode::None) {
                tracing::warn!("failed to release cursor: {e}");
            }
            self.cursor_grabbed = false;
        }
        window.set_cursor_visible(!active);
    }

    fn redraw(&mut self) -> Result<(), BackendError> {
        let now = Instant::now();
        let dt = (now - self.state.last_frame).as_secs_f32().min(0.1);
        self.state.last_frame = now;
        self.state
            .controller
            .update(&mut self.state.scene.camera, dt);

        let Some(graphics) = &mut self.graphics else {
            return Ok(());
        };
        let gpu = &graphics.gpu;

        if let Some(id) = self.state.light_ray {
            graphics
                .renderer
                .update_line(&gpu.queue, id, &light_ray(&self.state.scene))?;
        }

        let Some(output) = gpu.acquire_frame()? else {
            return Ok(());
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        // Projection follows the live surface size every frame.
        let camera = self
            .state
            .scene
            .camera
            .uniforms(gpu.aspect_ratio(), DEFAULT_NEAR, DEFAULT_FAR);
        graphics.renderer.render(
            &gpu.device,
            &gpu.queue,
            &view,
            &camera,
            &self.state.scene.light,
            self.state.scene.clear_color,
        );

        let raw_input = graphics.egui_winit.take_egui_input(&graphics.window);
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            self.state.draw_ui(ctx);
        });
        graphics
            .egui_winit
            .handle_platform_output(&graphics.window, full_output.platform_output);

        let paint_jobs = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);
        let (width, height) = gpu.size();
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [width, height],
            pixels_per_point: full_output.pixels_per_point,
        };

        let egui_renderer = &mut graphics.egui_renderer;
        for (id, image_delta) in &full_output.textures_delta.set {
            egui_renderer.update_texture(&gpu.device, &gpu.queue, *id, image_delta);
        }
        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("egui_encoder"),
            });
        egui_renderer.update_buffers(
            &gpu.device,
            &gpu.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );
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
        gpu.queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            egui_renderer.free_texture(id);
        }

        output.present();
        Ok(())
    }

    fn shutdown(&mut self) {
        if let Some(graphics) = &mut self.graphics {
            graphics.renderer.release_all();
            tracing::info!("released GPU meshes");
        }
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.graphics.is_some() {
            return;
        }
        match self.init_graphics(event_loop) {
            Ok(graphics) => self.graphics = Some(graphics),
            Err(e) => {
                tracing::error!("failed to initialize graphics: {e:#}");
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
        if let Some(graphics) = &mut self.graphics {
            let response = graphics
                .egui_winit
                .on_window_event(&graphics.window, &event);
            if response.consumed {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                self.shutdown();
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(graphics) = &mut self.graphics {
                    graphics.gpu.resize(new_size.width, new_size.height);
                    let (width, height) = graphics.gpu.size();
                    graphics.renderer.resize(&graphics.gpu.device, width, height);
                }
            }
            WindowEvent::Focused(false) => {
                self.state.controller.release_all();
                self.set_look(false);
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state: key_state,
                        ..
                    },
                ..
            } => {
                let Some(key) = map_key(code) else {
                    return;
                };
                let action = self
                    .state
                    .controller
                    .handle_key(key, key_state == ElementState::Pressed);
                if !self.state.handle_action(action) {
                    self.shutdown();
                    event_loop.exit();
                }
            }
            WindowEvent::MouseInput {
                button: MouseButton::Right,
                state: button_state,
                ..
            } => {
                self.set_look(button_state == ElementState::Pressed);
            }
            WindowEvent::CursorMoved { position, .. } if !self.cursor_grabbed => {
                let action = self
                    .state
                    .controller
                    .handle_cursor(position.x as f32, position.y as f32);
                self.state.handle_action(action);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(p) => p.y as f32 / PIXELS_PER_LINE,
                };
                let action = self.state.controller.handle_scroll(lines);
                self.state.handle_action(action);
            }
            WindowEvent::RedrawRequested => {
                if let Err(e) = self.redraw() {
                    tracing::error!("frame failed: {e}");
                }
            }
            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta: (dx, dy) } = event {
            if self.cursor_grabbed {
                let action = self.state.controller.handle_mouse_motion(dx as f32, dy as f32);
                self.state.handle_action(action);
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(graphics) = &self.graphics {
            graphics.window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("ygg-desktop starting");

    let description = match &cli.scene {
        Some(path) => SceneDescription::load(path)
            .with_context(|| format!("loading scene {}", path.display()))?,
        None => SceneDescription::demo(),
    };
    let scene = description.build()?;
    let controller = CameraController::new(load_bindings(cli.bindings.as_ref())?);

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GpuApp::new(AppState::new(scene, controller), cli.shader);
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
