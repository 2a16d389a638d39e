//! Central GPU and window context.
//!
//! [`Context`] owns the surface, device, queue and every shared render
//! resource: the camera bundle, the light bundle, the settings panel and the
//! pipelines. One instance exists per application; the event loop and the
//! scenes borrow it.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use winit::{dpi::PhysicalPosition, window::Window};

use crate::{
    camera::{Camera, CameraResources},
    data_structures::{model::Model, primitive::Shape, texture},
    panel::{PanelBuffers, SettingsPanel},
    pipelines::{
        Pipelines,
        light::{LightResources, LightSettings},
    },
};

/// Which mouse button is currently held, and whether the panel captured it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MouseButtonState {
    Left,
    Right,
    /// The press started on the settings panel; the camera never sees it.
    Panel,
    #[default]
    None,
}

#[derive(Debug, Default)]
pub struct MouseState {
    pub coords: PhysicalPosition<f64>,
    pub pressed: MouseButtonState,
}

#[derive(Debug)]
pub struct Context {
    pub(crate) window: Arc<Window>,
    pub(crate) depth_texture: texture::Texture,
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub clear_colour: wgpu::Color,
    pub camera: CameraResources,
    pub light: LightResources,
    pub panel: SettingsPanel,
    pub panel_buffers: PanelBuffers,
    pub pipelines: Pipelines,
    pub mouse: MouseState,
    exit: AtomicBool,
}

impl Context {
    pub async fn new(window: Arc<Window>) -> anyhow::Result<Self> {
        let size = window.inner_size();

        log::info!("WGPU setup");
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone())?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;

        log::info!("device and queue");
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
                trace: wgpu::Trace::Off,
            })
            .await?;

        log::info!("surface configuration");
        let surface_caps = surface.get_capabilities(&adapter);
        // The shaders assume an sRGB surface; a linear one would come out
        // darker
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .unwrap_or(surface_caps.formats[0]);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width,
            height: size.height,
            present_mode: surface_caps.present_modes[0],
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        let camera = CameraResources::new(&device, Camera::default());

        // The marker drawn at the light's position; the light pipeline binds
        // no material, so the model carries none
        let marker = Model {
            meshes: vec![Shape::Cube.mesh_data().upload(&device, "light marker")],
            materials: Vec::new(),
        };
        let light = LightResources::new(&device, LightSettings::default(), Some(marker));

        let pipelines = Pipelines::new(
            &device,
            &config,
            &camera.bind_group_layout,
            &light.bind_group_layout,
        );

        let depth_texture = texture::Texture::create_depth_texture(
            &device,
            [config.width, config.height],
            "depth_texture",
        );

        let panel = SettingsPanel::new(config.width, config.height);
        let panel_buffers = PanelBuffers::new(&device);

        Ok(Self {
            window,
            depth_texture,
            surface,
            device,
            queue,
            config,
            clear_colour: wgpu::Color {
                r: 0.4,
                g: 0.4,
                b: 0.4,
                a: 1.0,
            },
            camera,
            light,
            panel,
            panel_buffers,
            pipelines,
            mouse: MouseState::default(),
            exit: AtomicBool::new(false),
        })
    }

    /// Aspect ratio of the current surface configuration.
    pub fn aspect(&self) -> f32 {
        self.config.width as f32 / self.config.height.max(1) as f32
    }

    /// Ask the event loop to shut down after the current frame. Scenes only
    /// hold `&Context`, so the flag is interior.
    pub fn request_exit(&self) {
        self.exit.store(true, Ordering::Relaxed);
    }

    pub(crate) fn exit_requested(&self) -> bool {
        self.exit.load(Ordering::Relaxed)
    }
}

/// A cheap handle for async scene constructors: device and queue are
/// internally reference-counted, so cloning them out of the [`Context`] is
/// free.
#[derive(Clone, Debug)]
pub struct InitContext {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
}

impl From<&Context> for InitContext {
    fn from(ctx: &Context) -> Self {
        Self {
            device: ctx.device.clone(),
            queue: ctx.queue.clone(),
            config: ctx.config.clone(),
        }
    }
}
