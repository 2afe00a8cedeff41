use std::sync::Arc;
use std::time::{Duration, Instant};

use prism_relay::PositionPatch;
use prism_runtime::{
    ConfigurationError, GpuSurface, RcWindow, RuntimeOptions, SceneRuntime, Viewport,
    clamp_pixel_ratio,
};
use prism_scene::{Geometry, SceneObject};
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::{DeviceEvent, DeviceId, StartCause, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop, EventLoopProxy},
    window::{Window, WindowId},
};

use crate::config::Config;
use crate::overlay::{EguiFrame, EguiOverlay};
use crate::relay::RelayLink;
use crate::ui::{Inspector, PanelAction, PanelView};

const FPS: u64 = 120;
const FRAME_TIME: Duration = Duration::from_nanos(1_000_000_000 / FPS);

/// Result of GPU setup, delivered back to the event loop.
pub type Graphics = Result<GpuSurface<EguiOverlay>, ConfigurationError>;

enum State {
    Init(Option<EventLoopProxy<Graphics>>),
    Ready(Box<ReadyState>),
    Failed,
}

struct ReadyState {
    runtime: SceneRuntime<GpuSurface<EguiOverlay>>,
    egui_ctx: egui::Context,
    egui_state: egui_winit::State,
    started: Instant,
    relay: Option<RelayLink>,
}

pub struct App {
    state: State,
    config: Config,
    options: RuntimeOptions,
    render_target: Instant,
    inspector: Inspector,
}

impl App {
    pub fn new(event_loop: &EventLoop<Graphics>, config: Config, options: RuntimeOptions) -> Self {
        Self {
            state: State::Init(Some(event_loop.create_proxy())),
            config,
            options,
            render_target: Instant::now(),
            inspector: Inspector::new(),
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop) {
        self.state = State::Failed;
        event_loop.exit();
    }

    fn draw(&mut self) {
        if let State::Ready(ready) = &mut self.state {
            Self::draw_frame(ready, &mut self.inspector);
        }
    }

    fn viewport_changed(&mut self) {
        if let State::Ready(ready) = &mut self.state {
            let window = ready.runtime.surface().window();
            let viewport = Viewport::from_physical(window.inner_size(), window.scale_factor());
            ready.runtime.on_viewport_resize(viewport);
        }
    }

    fn draw_frame(ready: &mut ReadyState, inspector: &mut Inspector) {
        if let Some(link) = &mut ready.relay {
            link.poll();
        }

        let view = PanelView {
            objects: ready
                .runtime
                .scene()
                .objects()
                .iter()
                .map(|o| (o.id(), object_label(o), o.transform))
                .collect(),
            spinning: ready.runtime.is_spinning(),
            reduced_motion: ready.runtime.reduced_motion(),
            frame_rate: ready.runtime.frame_rate(),
            relay_peer: ready
                .relay
                .as_ref()
                .and_then(RelayLink::peer)
                .map(|peer| peer.to_string()),
        };

        let window = ready.runtime.surface().window();
        let raw_input = ready.egui_state.take_egui_input(window);
        let pixels_per_point =
            clamp_pixel_ratio(window.scale_factor(), ready.runtime.options().max_pixel_ratio) as f32;

        let mut actions = Vec::new();
        let full_output = ready.egui_ctx.run(raw_input, |ctx| {
            actions = inspector.show(ctx, &view);
        });

        let egui::FullOutput {
            platform_output,
            textures_delta,
            shapes,
            ..
        } = full_output;
        ready
            .egui_state
            .handle_platform_output(ready.runtime.surface().window(), platform_output);
        let paint_jobs = ready.egui_ctx.tessellate(shapes, pixels_per_point);

        for action in actions {
            Self::apply_action(ready, action);
        }

        ready
            .runtime
            .surface_mut()
            .overlay_mut()
            .set_frame(EguiFrame {
                paint_jobs,
                textures_delta,
                pixels_per_point,
            });

        ready.runtime.tick(ready.started.elapsed());
    }

    fn apply_action(ready: &mut ReadyState, action: PanelAction) {
        match action {
            PanelAction::Patch(id, patch) => {
                ready.runtime.apply_transform(id, &patch);

                let outbound = PositionPatch {
                    x: patch.x,
                    y: patch.y,
                    z: patch.z,
                };
                if id != ready.runtime.primary_object() || outbound.is_empty() {
                    return;
                }
                if let Some(link) = &mut ready.relay {
                    link.send(&outbound);
                }
            }
            PanelAction::ToggleSpin => {
                let spinning = ready.runtime.toggle_spin();
                log::debug!("spin {}", if spinning { "on" } else { "off" });
            }
            PanelAction::SetReducedMotion(flag) => ready.runtime.set_reduced_motion(flag),
        }
    }
}

fn object_label(object: &SceneObject) -> String {
    let shape = match object.descriptor().geometry {
        Geometry::Box { .. } => "Box",
        Geometry::Sphere { .. } => "Sphere",
        Geometry::Torus { .. } => "Torus",
        Geometry::Plane { .. } => "Ground",
    };
    format!("{shape} #{}", object.id().index())
}

impl ApplicationHandler<Graphics> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let State::Init(proxy) = &mut self.state else {
            return;
        };
        let Some(proxy) = proxy.take() else {
            return;
        };

        let win_attr = Window::default_attributes()
            .with_title(self.config.window.title.clone())
            .with_inner_size(LogicalSize::new(
                self.config.window.width,
                self.config.window.height,
            ));

        let window: RcWindow = match event_loop.create_window(win_attr) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("failed to create window: {e}");
                self.fail(event_loop);
                return;
            }
        };

        let antialias = self.options.antialias;
        let graphics = pollster::block_on(GpuSurface::new(window, EguiOverlay::new))
            .map(|gpu| gpu.with_antialias(antialias));
        if proxy.send_event(graphics).is_err() {
            log::error!("event loop closed before graphics were ready");
            self.fail(event_loop);
        }
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, graphics: Graphics) {
        let gpu = match graphics {
            Ok(gpu) => gpu,
            Err(e) => {
                log::error!("graphics initialization failed: {e}");
                self.fail(event_loop);
                return;
            }
        };

        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui_ctx.viewport_id(),
            gpu.window(),
            None,
            None,
            None,
        );
        let viewport = Viewport::from_physical(gpu.window().inner_size(), gpu.window().scale_factor());

        let runtime = match SceneRuntime::initialize(viewport, self.options.clone(), gpu) {
            Ok(runtime) => runtime,
            Err(e) => {
                log::error!("scene runtime failed to start: {e}");
                self.fail(event_loop);
                return;
            }
        };

        let relay = RelayLink::start(&self.config.relay, runtime.patch_sender());
        runtime.surface().request_redraw();
        self.state = State::Ready(Box::new(ReadyState {
            runtime,
            egui_ctx,
            egui_state,
            started: Instant::now(),
            relay,
        }));
    }

    fn new_events(&mut self, _event_loop: &ActiveEventLoop, _cause: StartCause) {
        if self.render_target <= Instant::now() {
            self.render_target += FRAME_TIME;
            if let State::Ready(ready) = &self.state {
                ready.runtime.surface().request_redraw();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(_) | WindowEvent::ScaleFactorChanged { .. } => self.viewport_changed(),
            WindowEvent::RedrawRequested => {
                self.draw();
                let now = Instant::now();
                if self.render_target <= now {
                    self.render_target = now + FRAME_TIME;
                    if let State::Ready(ready) = &self.state {
                        ready.runtime.surface().request_redraw();
                    }
                }
            }
            other => {
                if let State::Ready(ready) = &mut self.state {
                    let response = ready
                        .egui_state
                        .on_window_event(ready.runtime.surface().window(), &other);
                    if response.repaint {
                        ready.runtime.surface().request_redraw();
                    }
                    if !response.consumed {
                        if let Some(controls) = ready.runtime.controls_mut() {
                            controls.handle_window_event(&other);
                        }
                    }
                }
            }
        }
    }

    fn device_event(&mut self, _event_loop: &ActiveEventLoop, _device_id: DeviceId, event: DeviceEvent) {
        if let State::Ready(ready) = &mut self.state {
            if let Some(controls) = ready.runtime.controls_mut() {
                controls.handle_device_event(&event);
            }
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if !matches!(self.state, State::Failed) {
            event_loop.set_control_flow(ControlFlow::WaitUntil(self.render_target));
        }
    }
}
