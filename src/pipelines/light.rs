//! The scene light: live-tunable settings, the GPU uniform they map to, and
//! the marker pipeline.

use cgmath::InnerSpace;
use wgpu::util::DeviceExt;

use crate::data_structures::{
    model::{Model, ModelVertex, Vertex},
    texture,
};

/// The three supported light kinds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LightKind {
    #[default]
    Point,
    Directional,
    Spot,
}

impl LightKind {
    pub const ALL: [LightKind; 3] = [LightKind::Point, LightKind::Directional, LightKind::Spot];

    pub fn name(self) -> &'static str {
        match self {
            LightKind::Point => "point",
            LightKind::Directional => "directional",
            LightKind::Spot => "spot",
        }
    }
}

/// The light parameters the settings panel edits.
#[derive(Clone, Debug, PartialEq)]
pub struct LightSettings {
    pub position: cgmath::Vector3<f32>,
    pub direction: cgmath::Vector3<f32>,
    /// Scale of the marker mesh drawn at the light's position.
    pub scale: cgmath::Vector3<f32>,
    pub color: [f32; 4],
    pub kind: LightKind,
    /// Full cone angle of a spot light, degrees.
    pub spot_angle: f32,
    pub enable_ambient: bool,
    pub enable_diffuse: bool,
    pub enable_specular: bool,
}

impl LightSettings {
    /// Factory configuration, also what the panel's reset button restores.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl Default for LightSettings {
    fn default() -> Self {
        Self {
            position: cgmath::Vector3::new(2.0, 4.0, 2.0),
            direction: cgmath::Vector3::new(0.0, -1.0, 0.0),
            scale: cgmath::Vector3::new(0.25, 0.25, 0.25),
            color: [1.0, 1.0, 1.0, 1.0],
            kind: LightKind::Point,
            spot_angle: 25.0,
            enable_ambient: true,
            enable_diffuse: true,
            enable_specular: true,
        }
    }
}

/// GPU-side light state. Kept in vec4 lanes so the WGSL struct needs no
/// implicit padding.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightUniform {
    /// xyz world position, w = kind (0 point, 1 directional, 2 spot)
    pub position: [f32; 4],
    pub color: [f32; 4],
    /// xyz direction, w = cosine of the spot cone half-angle
    pub direction: [f32; 4],
    /// x/y/z = ambient/diffuse/specular enables
    pub params: [f32; 4],
    /// marker scale
    pub scale: [f32; 4],
}

impl LightUniform {
    pub fn from_settings(settings: &LightSettings) -> Self {
        // A zeroed direction would NaN out the shader's normalize
        let direction = if settings.direction.magnitude2() > 1e-12 {
            settings.direction
        } else {
            cgmath::Vector3::new(0.0, -1.0, 0.0)
        };
        let kind = match settings.kind {
            LightKind::Point => 0.0,
            LightKind::Directional => 1.0,
            LightKind::Spot => 2.0,
        };
        let spot_cutoff = (settings.spot_angle.clamp(0.0, 180.0) / 2.0).to_radians().cos();
        let enable = |on: bool| if on { 1.0 } else { 0.0 };

        Self {
            position: [
                settings.position.x,
                settings.position.y,
                settings.position.z,
                kind,
            ],
            color: settings.color,
            direction: [direction.x, direction.y, direction.z, spot_cutoff],
            params: [
                enable(settings.enable_ambient),
                enable(settings.enable_diffuse),
                enable(settings.enable_specular),
                0.0,
            ],
            scale: [settings.scale.x, settings.scale.y, settings.scale.z, 0.0],
        }
    }
}

/// Light settings plus everything the GPU needs to consume them, and the
/// optional marker model drawn at the light's position.
#[derive(Debug)]
pub struct LightResources {
    pub settings: LightSettings,
    pub model: Option<Model>,
    pub uniform: LightUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

impl LightResources {
    pub fn new(device: &wgpu::Device, settings: LightSettings, model: Option<Model>) -> Self {
        let uniform = LightUniform::from_settings(&settings);
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Light Buffer"),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group_layout = Self::layout(device);
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some("light_bind_group"),
        });

        Self {
            settings,
            model,
            uniform,
            buffer,
            bind_group,
            bind_group_layout,
        }
    }

    pub fn layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
            label: Some("light_bind_group_layout"),
        })
    }

    /// Refresh the uniform from the settings and upload it.
    pub fn write(&mut self, queue: &wgpu::Queue) {
        self.uniform = LightUniform::from_settings(&self.settings);
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[self.uniform]));
    }
}

pub fn mk_light_pipeline(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
    camera_bind_group_layout: &wgpu::BindGroupLayout,
    light_bind_group_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Light Pipeline Layout"),
        bind_group_layouts: &[camera_bind_group_layout, light_bind_group_layout],
        push_constant_ranges: &[],
    });
    let shader = wgpu::ShaderModuleDescriptor {
        label: Some("Light Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("light.wgsl").into()),
    };
    crate::pipelines::basic::mk_render_pipeline(
        device,
        &layout,
        config.format,
        Some(wgpu::BlendState {
            alpha: wgpu::BlendComponent::REPLACE,
            color: wgpu::BlendComponent::REPLACE,
        }),
        Some(texture::Texture::DEPTH_FORMAT),
        &[ModelVertex::desc()],
        shader,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_encodes_kind_in_position_w() {
        let mut settings = LightSettings::default();
        for (kind, expected) in [
            (LightKind::Point, 0.0),
            (LightKind::Directional, 1.0),
            (LightKind::Spot, 2.0),
        ] {
            settings.kind = kind;
            assert_eq!(LightUniform::from_settings(&settings).position[3], expected);
        }
    }

    #[test]
    fn spot_cutoff_is_the_cosine_of_the_half_angle() {
        let settings = LightSettings {
            spot_angle: 90.0,
            ..Default::default()
        };
        let uniform = LightUniform::from_settings(&settings);
        assert!((uniform.direction[3] - 45.0f32.to_radians().cos()).abs() < 1e-6);
    }

    #[test]
    fn degenerate_direction_is_replaced() {
        let settings = LightSettings {
            direction: cgmath::Vector3::new(0.0, 0.0, 0.0),
            ..Default::default()
        };
        let uniform = LightUniform::from_settings(&settings);
        assert_eq!(&uniform.direction[0..3], &[0.0, -1.0, 0.0]);
    }

    #[test]
    fn toggles_map_to_unit_flags() {
        let settings = LightSettings {
            enable_ambient: false,
            enable_diffuse: true,
            enable_specular: false,
            ..Default::default()
        };
        let uniform = LightUniform::from_settings(&settings);
        assert_eq!(&uniform.params[0..3], &[0.0, 1.0, 0.0]);
    }

    #[test]
    fn reset_restores_the_factory_configuration() {
        let mut settings = LightSettings {
            kind: LightKind::Spot,
            spot_angle: 80.0,
            enable_diffuse: false,
            ..Default::default()
        };
        settings.reset();
        assert_eq!(settings, LightSettings::default());
    }
}
