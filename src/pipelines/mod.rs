//! Render pipeline definitions.
//!
//! - `basic` draws instanced, textured, lit models
//! - `light` draws the light marker and owns the light uniform/resources
//! - `gui` draws the 2D colored quads of the settings panel

pub mod basic;
pub mod gui;
pub mod light;

/// All pipelines the frame loop switches between, created once at startup.
#[derive(Debug)]
pub struct Pipelines {
    pub basic: wgpu::RenderPipeline,
    pub light: wgpu::RenderPipeline,
    pub gui: wgpu::RenderPipeline,
}

impl Pipelines {
    pub fn new(
        device: &wgpu::Device,
        config: &wgpu::SurfaceConfiguration,
        camera_bind_group_layout: &wgpu::BindGroupLayout,
        light_bind_group_layout: &wgpu::BindGroupLayout,
    ) -> Self {
        Self {
            basic: basic::mk_basic_pipeline(
                device,
                config,
                light_bind_group_layout,
                camera_bind_group_layout,
            ),
            light: light::mk_light_pipeline(
                device,
                config,
                camera_bind_group_layout,
                light_bind_group_layout,
            ),
            gui: gui::mk_gui_pipeline(device, config),
        }
    }
}
