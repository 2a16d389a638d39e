//! Application event loop and the [`Scene`] trait.
//!
//! The loop drives one frame per `RedrawRequested`:
//!
//! 1. Window/device events drain into the camera controller, the settings
//!    panel and the mouse state
//! 2. The controller applies buffered input to the camera
//! 3. The camera and light uniforms are refreshed and uploaded, and the
//!    panel geometry is rebuilt
//! 4. Scenes update
//! 5. Scenes' renderables are batched per pipeline and drawn, the panel last
//! 6. The frame is presented
//!
//! Input is therefore always applied before the frame's view/projection
//! matrices are read.

use std::{iter, pin::Pin, sync::Arc};

use instant::{Duration, Instant};

use winit::{
    application::ApplicationHandler,
    event::{DeviceEvent, DeviceId, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::Window,
};

use crate::{
    camera::CameraResources,
    context::{Context, InitContext, MouseButtonState},
    data_structures::{model::DrawLight, model::DrawModel, texture::Texture},
    render::{Flat, Instanced, Render},
};

/// Trait for implementing a renderable scene.
///
/// A `Scene` manages a self-contained portion of the application: resource
/// ownership, input handling and per-frame updates. The engine coordinates
/// all scenes, passes events to them, and composes their renders.
///
/// # Lifecycle
///
/// 1. `on_init()` is called once after GPU setup; the only place to mutate
///    the context (camera start position, clear colour, light defaults)
/// 2. `on_window_events()` / `on_device_events()` run for each winit event
/// 3. `on_update()` runs every frame with the elapsed time
/// 4. `on_render()` runs every frame and describes how to draw `self`
pub trait Scene<S> {
    /// Initialize the scene and configure the context.
    fn on_init(&mut self, ctx: &mut Context, state: &mut S);

    /// Update state every frame. Use for animations and other per-frame
    /// logic.
    fn on_update(&mut self, ctx: &Context, state: &mut S, dt: Duration);

    /// Handle raw device events (keyboard, mouse hardware input).
    fn on_device_events(&mut self, ctx: &Context, state: &mut S, event: &DeviceEvent);

    /// Handle window events (keyboard, mouse, window resizing, etc.).
    fn on_window_events(&mut self, ctx: &Context, state: &mut S, event: &WindowEvent);

    /// Return renderable objects for this scene.
    ///
    /// Called each frame. Collect your objects into a [`Render`] and return
    /// it; the engine batches all scenes' renders per pipeline.
    fn on_render<'pass>(&self) -> Render<'_, 'pass>;
}

/// Type alias for a scene constructor (factory function).
///
/// A scene constructor takes an [`InitContext`] and asynchronously returns a
/// boxed [`Scene`]; model and texture loading happen inside the future.
pub type SceneConstructor<S> =
    Box<dyn FnOnce(InitContext) -> Pin<Box<dyn Future<Output = Box<dyn Scene<S>>>>>>;

/// Application state bundle: GPU context, app state, and surface status.
pub struct AppState<S> {
    pub ctx: Context,
    state: S,
    is_surface_configured: bool,
}

impl<S: Default> AppState<S> {
    async fn new(window: Arc<Window>) -> Self {
        let ctx = match Context::new(window).await {
            Ok(ctx) => ctx,
            Err(e) => panic!("App initialization failed. Cannot create the main context: {e}"),
        };
        Self {
            ctx,
            state: S::default(),
            is_surface_configured: false,
        }
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.ctx.config.width = width;
            self.ctx.config.height = height;
            self.is_surface_configured = true;
            self.ctx
                .surface
                .configure(&self.ctx.device, &self.ctx.config);
            self.ctx.depth_texture = Texture::create_depth_texture(
                &self.ctx.device,
                [self.ctx.config.width, self.ctx.config.height],
                "depth_texture",
            );
            self.ctx.panel.resize(width, height);
        }
    }

    /// Apply all input buffered since the last frame, then refresh every
    /// per-frame GPU resource.
    fn apply_frame_input(&mut self, dt: Duration) {
        let aspect = self.ctx.aspect();
        let CameraResources {
            camera, controller, ..
        } = &mut self.ctx.camera;
        controller.update(camera, dt);

        self.ctx.camera.write(&self.ctx.queue, aspect);
        self.ctx.light.write(&self.ctx.queue);

        let (vertices, indices) = self
            .ctx
            .panel
            .build_quads(&self.ctx.camera.camera, &self.ctx.light.settings);
        self.ctx
            .panel_buffers
            .write(&self.ctx.queue, &vertices, &indices);
    }

    fn render(&self, scenes: &[Box<dyn Scene<S>>]) -> Result<(), wgpu::SurfaceError> {
        // keep frames coming
        self.ctx.window.request_redraw();

        // Rendering requires the surface to be configured
        if !self.is_surface_configured {
            return Ok(());
        }

        let output = self.ctx.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder: wgpu::CommandEncoder =
            self.ctx
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("Render Encoder"),
                });
        {
            let mut render_pass: wgpu::RenderPass<'_> =
                encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
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

            if let Some(marker) = &self.ctx.light.model {
                render_pass.set_pipeline(&self.ctx.pipelines.light);
                render_pass.draw_light_model(
                    marker,
                    &self.ctx.camera.bind_group,
                    &self.ctx.light.bind_group,
                );
            }

            let mut basics: Vec<Instanced> = Vec::new();
            let mut guis: Vec<Flat> = Vec::new();
            scenes.iter().for_each(|scene| {
                let render = scene.on_render();
                render.set_pipelines(&self.ctx, &mut render_pass, &mut basics, &mut guis);
            });

            render_pass.set_pipeline(&self.ctx.pipelines.basic);
            for instanced in basics {
                if instanced.amount == 0 || instanced.instance.size() == 0 {
                    log::warn!("you attempted to render something with zero instances");
                    continue;
                }
                render_pass.set_vertex_buffer(1, instanced.instance.slice(..));
                render_pass.draw_model_instanced(
                    instanced.model,
                    0..instanced.amount as u32,
                    &self.ctx.camera.bind_group,
                    &self.ctx.light.bind_group,
                );
            }

            render_pass.set_pipeline(&self.ctx.pipelines.gui);
            for flat in guis {
                render_pass.set_vertex_buffer(0, flat.vertex.slice(..));
                render_pass.set_index_buffer(flat.index.slice(..), wgpu::IndexFormat::Uint16);
                render_pass.draw_indexed(0..flat.amount as u32, 0, 0..1);
            }
            // the settings panel draws over everything
            if self.ctx.panel_buffers.index_count > 0 {
                render_pass.set_vertex_buffer(0, self.ctx.panel_buffers.vertex.slice(..));
                render_pass.set_index_buffer(
                    self.ctx.panel_buffers.index.slice(..),
                    wgpu::IndexFormat::Uint16,
                );
                render_pass.draw_indexed(0..self.ctx.panel_buffers.index_count, 0, 0..1);
            }
        }

        self.ctx.queue.submit(iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}

pub struct App<S: 'static> {
    async_runtime: tokio::runtime::Runtime,
    state: Option<AppState<S>>,
    // Fully initialized scenes once they are ready.
    scenes: Vec<Box<dyn Scene<S>>>,
    // Constructors are taken out on resume.
    constructors: Option<Vec<SceneConstructor<S>>>,
    last_time: Instant,
}

impl<S: 'static> App<S> {
    fn new(constructors: Vec<SceneConstructor<S>>) -> anyhow::Result<Self> {
        Ok(Self {
            async_runtime: tokio::runtime::Runtime::new()?,
            state: None,
            scenes: Vec::new(),
            constructors: Some(constructors),
            last_time: Instant::now(),
        })
    }
}

impl<S: 'static + Default> ApplicationHandler for App<S> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let window_attributes = Window::default_attributes();
        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Cannot create a window: {e}");
                event_loop.exit();
                return;
            }
        };

        let Some(constructors) = self.constructors.take() else {
            return;
        };

        let init_future = async move {
            let app_state = AppState::new(window).await;

            let scene_futures: Vec<_> = constructors
                .into_iter()
                // The Into leverages the internal Arcs of Device and Queue,
                // so only refs are cloned
                .map(|constructor| constructor((&app_state.ctx).into()))
                .collect();
            let scenes: Vec<_> = futures::future::join_all(scene_futures).await;
            (app_state, scenes)
        };

        let (mut app_state, scenes) = self.async_runtime.block_on(init_future);
        self.scenes = scenes;
        self.scenes
            .iter_mut()
            .for_each(|scene| scene.on_init(&mut app_state.ctx, &mut app_state.state));
        self.state = Some(app_state);
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        let state = match &mut self.state {
            Some(state) => state,
            None => return,
        };
        if let DeviceEvent::MouseMotion { delta: (dx, dy) } = event {
            // Mouse-look only while the designated button is held outside the
            // panel
            if let MouseButtonState::Left = state.ctx.mouse.pressed {
                state.ctx.camera.controller.handle_mouse(dx, dy);
            }
        }
        self.scenes
            .iter_mut()
            .for_each(|scene| scene.on_device_events(&state.ctx, &mut state.state, &event));
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let state = match &mut self.state {
            Some(state) => state,
            None => return,
        };

        // The panel captures the scroll wheel while hovered
        match &event {
            WindowEvent::MouseWheel { .. } if state.ctx.panel.wants_pointer() => (),
            other => state.ctx.camera.controller.handle_window_events(other),
        }

        if let WindowEvent::CursorMoved { position, .. } = &event {
            state.ctx.mouse.coords = *position;
            let Context {
                panel,
                camera,
                light,
                ..
            } = &mut state.ctx;
            panel.cursor_moved(
                position.x as f32,
                position.y as f32,
                &mut camera.camera,
                &mut light.settings,
            );
        }

        self.scenes
            .iter_mut()
            .for_each(|scene| scene.on_window_events(&state.ctx, &mut state.state, &event));

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::KeyboardInput { event: key, .. }
                if key.physical_key == PhysicalKey::Code(KeyCode::Escape)
                    && key.state.is_pressed() =>
            {
                event_loop.exit()
            }
            WindowEvent::Resized(size) => state.resize(size.width, size.height),
            WindowEvent::RedrawRequested => {
                let dt = self.last_time.elapsed();
                self.last_time = Instant::now();

                state.apply_frame_input(dt);
                self.scenes
                    .iter_mut()
                    .for_each(|scene| scene.on_update(&state.ctx, &mut state.state, dt));

                match state.render(&self.scenes) {
                    Ok(()) => (),
                    // Reconfigure the surface if it's lost or outdated
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        let size = state.ctx.window.inner_size();
                        state.resize(size.width, size.height);
                    }
                    Err(e) => {
                        log::error!("Unable to render {e}");
                    }
                }

                if state.ctx.exit_requested() {
                    event_loop.exit();
                }
            }
            WindowEvent::MouseInput {
                state: button_state,
                button,
                ..
            } => match (button, button_state.is_pressed()) {
                (MouseButton::Left, true) => {
                    let Context {
                        panel,
                        camera,
                        light,
                        ..
                    } = &mut state.ctx;
                    if panel.mouse_pressed(&mut camera.camera, &mut light.settings) {
                        state.ctx.mouse.pressed = MouseButtonState::Panel;
                    } else {
                        state.ctx.mouse.pressed = MouseButtonState::Left;
                    }
                }
                (MouseButton::Right, true) => state.ctx.mouse.pressed = MouseButtonState::Right,
                (_, false) => {
                    state.ctx.panel.mouse_released();
                    state.ctx.mouse.pressed = MouseButtonState::None;
                }
                _ => (),
            },
            _ => {}
        }
    }
}

/// Initialize logging, build the application and run the event loop until
/// the window closes.
pub fn run<S: 'static + Default>(constructors: Vec<SceneConstructor<S>>) -> anyhow::Result<()> {
    if let Err(e) = env_logger::try_init() {
        eprintln!("Warning: Could not initialize logger: {e}");
    }

    #[cfg(all(feature = "integration-tests", target_os = "linux"))]
    let event_loop: EventLoop<()> = {
        use winit::platform::wayland::EventLoopBuilderExtWayland;

        EventLoop::builder()
            .with_any_thread(true)
            .build()
            .expect("Failed to create an event loop")
    };

    #[cfg(all(feature = "integration-tests", target_os = "windows"))]
    let event_loop: EventLoop<()> = {
        use winit::platform::windows::EventLoopBuilderExtWindows;

        EventLoop::builder()
            .with_any_thread(true)
            .build()
            .expect("Failed to create an event loop")
    };

    #[cfg(any(
        not(feature = "integration-tests"),
        not(any(target_os = "linux", target_os = "windows"))
    ))]
    let event_loop: EventLoop<()> = EventLoop::new()?;

    let mut app: App<S> = App::new(constructors)?;

    event_loop.run_app(&mut app)?;

    Ok(())
}
