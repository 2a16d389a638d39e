//! Per-instance transformation data for GPU rendering.
//!
//! Every drawable is positioned through an [`Instance`] (position, rotation,
//! scale). The packed [`InstanceRaw`] form lives in a vertex buffer with
//! per-instance step mode, so several copies of one model render in a single
//! draw call.

use cgmath::{Deg, Euler, One};

use crate::data_structures::model;

/// Position, rotation (as quaternion), and scale of one rendered instance.
#[derive(Clone, Debug)]
pub struct Instance {
    pub position: cgmath::Vector3<f32>,
    pub rotation: cgmath::Quaternion<f32>,
    pub scale: cgmath::Vector3<f32>,
}

impl Instance {
    /// Identity transformation: no move, rotate, or scale.
    pub fn new() -> Self {
        Self {
            position: cgmath::Vector3::new(0.0, 0.0, 0.0),
            rotation: cgmath::Quaternion::one(),
            scale: cgmath::Vector3::new(1.0, 1.0, 1.0),
        }
    }

    /// Build an instance from Euler angles in degrees, the way the settings
    /// panel and demo scenes express rotations.
    pub fn from_euler(
        position: cgmath::Vector3<f32>,
        rotation_degrees: cgmath::Vector3<f32>,
        scale: cgmath::Vector3<f32>,
    ) -> Self {
        Self {
            position,
            rotation: Euler {
                x: Deg(rotation_degrees.x),
                y: Deg(rotation_degrees.y),
                z: Deg(rotation_degrees.z),
            }
            .into(),
            scale,
        }
    }

    pub fn to_matrix(&self) -> cgmath::Matrix4<f32> {
        cgmath::Matrix4::from_translation(self.position)
            * cgmath::Matrix4::from(self.rotation)
            * cgmath::Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }

    pub fn to_raw(&self) -> InstanceRaw {
        InstanceRaw {
            model: self.to_matrix().into(),
            normal: cgmath::Matrix3::from(self.rotation).into(),
        }
    }
}

impl From<cgmath::Vector3<f32>> for Instance {
    fn from(position: cgmath::Vector3<f32>) -> Self {
        Instance {
            position,
            ..Default::default()
        }
    }
}

impl Default for Instance {
    fn default() -> Self {
        Self::new()
    }
}

/// The raw instance data as stored on the GPU: the model matrix plus the
/// rotation part for transforming normals.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct InstanceRaw {
    model: [[f32; 4]; 4],
    normal: [[f32; 3]; 3],
}

impl model::Vertex for InstanceRaw {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<InstanceRaw>() as wgpu::BufferAddress,
            // Advance per instance, not per vertex
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &[
                // A mat4 occupies four vec4 slots
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 5,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 4]>() as wgpu::BufferAddress,
                    shader_location: 6,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 8]>() as wgpu::BufferAddress,
                    shader_location: 7,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 12]>() as wgpu::BufferAddress,
                    shader_location: 8,
                    format: wgpu::VertexFormat::Float32x4,
                },
                // Normal matrix as three vec3s
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 16]>() as wgpu::BufferAddress,
                    shader_location: 9,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 19]>() as wgpu::BufferAddress,
                    shader_location: 10,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 22]>() as wgpu::BufferAddress,
                    shader_location: 11,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_instance_produces_identity_matrix() {
        use cgmath::SquareMatrix;
        let matrix = Instance::new().to_matrix();
        assert_eq!(matrix, cgmath::Matrix4::identity());
    }

    #[test]
    fn translation_lands_in_the_last_column() {
        let instance = Instance::from(cgmath::Vector3::new(1.0, 2.0, -3.0));
        let matrix = instance.to_matrix();
        assert_eq!(matrix.w.x, 1.0);
        assert_eq!(matrix.w.y, 2.0);
        assert_eq!(matrix.w.z, -3.0);
    }

    #[test]
    fn euler_rotation_moves_basis_vectors() {
        use cgmath::InnerSpace;
        let instance = Instance::from_euler(
            cgmath::Vector3::new(0.0, 0.0, 0.0),
            cgmath::Vector3::new(0.0, 90.0, 0.0),
            cgmath::Vector3::new(1.0, 1.0, 1.0),
        );
        // +x rotates onto -z under a 90 degree yaw
        let rotated = instance.rotation * cgmath::Vector3::unit_x();
        assert!((rotated - -cgmath::Vector3::unit_z()).magnitude() < 1e-6);
    }
}
