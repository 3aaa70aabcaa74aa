//! Application bootstrap and event loop.
//!
//! [`run`] opens the window, builds the [`Context`] and then hands control to
//! a single [`Scene`]. Each frame follows the same pattern:
//! 1. Collect window/device events (Escape closes, input feeds the camera controller)
//! 2. Apply the accumulated input to the camera and upload its uniform
//! 3. Call [`Scene::on_update`] with the frame time
//! 4. Clear colour and depth, call [`Scene::on_render`]
//! 5. Present the frame

use std::{iter, sync::Arc};

use anyhow::Context as _;
use instant::{Duration, Instant};
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{DeviceEvent, DeviceId, ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{CursorGrabMode, Window, WindowId},
};

use crate::{
    config::{CameraConfig, WindowConfig},
    context::Context,
};

/// A renderable scene driven by [`run`].
pub trait Scene {
    /// Called once right after construction, with the surface not yet configured.
    fn on_init(&mut self, _ctx: &mut Context) -> anyhow::Result<()> {
        Ok(())
    }

    /// Called for every window event after the engine handled it.
    fn on_window_event(&mut self, _ctx: &Context, _event: &WindowEvent) {}

    /// Called once per frame after the camera moved, before rendering.
    /// This is the place to flush uniform changes.
    fn on_update(&mut self, _ctx: &Context, _dt: Duration) {}

    /// Issues the draw calls for this frame. The pass is already cleared.
    fn on_render(&self, ctx: &Context, render_pass: &mut wgpu::RenderPass<'_>);
}

/// Builds the scene once the GPU context exists.
pub type SceneConstructor<S> = Box<dyn FnOnce(&mut Context) -> anyhow::Result<S>>;

/// A scene that only clears the window.
#[derive(Debug, Default)]
pub struct EmptyScene;

impl Scene for EmptyScene {
    fn on_render(&self, _: &Context, _: &mut wgpu::RenderPass<'_>) {}
}

struct AppState<S> {
    ctx: Context,
    scene: S,
}

impl<S: Scene> AppState<S> {
    fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        self.ctx.window.request_redraw();

        // Rendering requires the surface to be configured
        if !self.ctx.is_surface_configured {
            return Ok(());
        }

        let output = self.ctx.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.ctx.clear_colour),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.ctx.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            self.scene.on_render(&self.ctx, &mut render_pass);
        }

        self.ctx.queue.submit(iter::once(encoder.finish()));
        output.present();
        Ok(())
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        self.ctx.resize(size.width, size.height);
    }
}

struct App<S: 'static> {
    async_runtime: tokio::runtime::Runtime,
    window_config: WindowConfig,
    camera_config: CameraConfig,
    // Taken once the window exists
    constructor: Option<SceneConstructor<S>>,
    state: Option<AppState<S>>,
    // Startup failure, returned from `run` once the loop stopped
    init_error: Option<anyhow::Error>,
    last_time: Instant,
}

impl<S: Scene + 'static> App<S> {
    fn new(
        window_config: WindowConfig,
        camera_config: CameraConfig,
        constructor: SceneConstructor<S>,
    ) -> anyhow::Result<Self> {
        let async_runtime = tokio::runtime::Runtime::new()?;
        Ok(Self {
            async_runtime,
            window_config,
            camera_config,
            constructor: Some(constructor),
            state: None,
            init_error: None,
            last_time: Instant::now(),
        })
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<AppState<S>> {
        let window_attributes = Window::default_attributes()
            .with_title(self.window_config.title.clone())
            .with_inner_size(PhysicalSize::new(
                self.window_config.width,
                self.window_config.height,
            ));
        let window = Arc::new(
            event_loop
                .create_window(window_attributes)
                .context("Failed to create the window")?,
        );

        if self.window_config.grab_cursor {
            grab_cursor(&window);
        }

        let mut ctx = self.async_runtime.block_on(Context::new(
            window,
            &self.window_config,
            &self.camera_config,
        ))?;

        let constructor = self
            .constructor
            .take()
            .context("The scene was already constructed")?;
        let mut scene = constructor(&mut ctx)?;
        scene.on_init(&mut ctx)?;

        let size = ctx.window.inner_size();
        ctx.resize(size.width, size.height);
        ctx.window.request_redraw();
        Ok(AppState { ctx, scene })
    }
}

fn grab_cursor(window: &Window) {
    // Not every platform supports both modes
    let grabbed = window
        .set_cursor_grab(CursorGrabMode::Locked)
        .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined));
    match grabbed {
        Ok(()) => window.set_cursor_visible(false),
        Err(e) => log::warn!("Could not grab the cursor: {e}"),
    }
}

impl<S: Scene + 'static> ApplicationHandler for App<S> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }
        match self.init(event_loop) {
            Ok(state) => {
                self.last_time = Instant::now();
                self.state = Some(state);
            }
            Err(e) => {
                log::error!("App initialization failed: {e:#}");
                self.init_error = Some(e);
                event_loop.exit();
            }
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        let Some(state) = &mut self.state else {
            return;
        };
        if let DeviceEvent::MouseMotion { delta: (dx, dy) } = event {
            state.ctx.camera.controller.handle_mouse(dx, dy);
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        let Some(state) = &mut self.state else {
            return;
        };

        state.ctx.camera.controller.handle_window_events(&event);
        state.scene.on_window_event(&state.ctx, &event);

        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => event_loop.exit(),
            WindowEvent::Resized(size) => state.resize(size),
            WindowEvent::RedrawRequested => {
                let dt = self.last_time.elapsed();
                self.last_time = Instant::now();

                state.ctx.camera.update(&state.ctx.queue, dt);
                state.scene.on_update(&state.ctx, dt);

                match state.render() {
                    Ok(()) => {}
                    // Reconfigure the surface if it's lost or outdated
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        let size = state.ctx.window.inner_size();
                        state.resize(size);
                    }
                    Err(e) => log::error!("Unable to render {e}"),
                }
            }
            _ => {}
        }
    }
}

/// Opens a window and runs `constructor`'s scene until the window closes.
pub fn run<S, F>(window_config: WindowConfig, camera_config: CameraConfig, constructor: F) -> anyhow::Result<()>
where
    S: Scene + 'static,
    F: FnOnce(&mut Context) -> anyhow::Result<S> + 'static,
{
    if let Err(e) = env_logger::try_init() {
        println!("Warning: Could not initialize logger: {}", e);
    };

    let event_loop = EventLoop::new()?;
    let mut app = App::new(window_config, camera_config, Box::new(constructor))?;
    event_loop.run_app(&mut app)?;

    match app.init_error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

