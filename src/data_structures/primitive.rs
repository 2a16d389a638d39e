//! Built-in primitive shapes.
//!
//! Shapes are a closed, data-driven enumeration: each variant maps to a pure
//! mesh-generation function producing vertex/index data, and [`PrimitiveSet`]
//! turns that data plus a material and instance list into GPU buffers. There
//! is no per-shape behavior beyond geometry generation, so no dispatch
//! hierarchy is needed.
//!
//! All shapes fit a unit bounding box centred on the origin; size and
//! placement come from the instance transform.

use std::f32::consts::PI;

use wgpu::util::DeviceExt;

use crate::data_structures::{
    instance::Instance,
    model::{Material, Mesh, Model, ModelVertex},
};

const SPHERE_SECTORS: u32 = 32;
const SPHERE_STACKS: u32 = 16;
const RING_SEGMENTS: u32 = 32;
const TORUS_MAJOR_SEGMENTS: u32 = 32;
const TORUS_MINOR_SEGMENTS: u32 = 16;
const TORUS_MAJOR_RADIUS: f32 = 0.35;
const TORUS_MINOR_RADIUS: f32 = 0.15;

/// The closed set of built-in shapes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shape {
    Cube,
    Plane,
    Sphere,
    Cylinder,
    Cone,
    Torus,
}

/// CPU-side mesh data produced by the shape generators.
#[derive(Clone, Debug, Default)]
pub struct MeshData {
    pub vertices: Vec<ModelVertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Upload the mesh data into GPU buffers as a [`Mesh`] using material
    /// slot 0.
    pub fn upload(&self, device: &wgpu::Device, name: &str) -> Mesh {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{name} Vertex Buffer")),
            contents: bytemuck::cast_slice(&self.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{name} Index Buffer")),
            contents: bytemuck::cast_slice(&self.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Mesh {
            name: name.to_string(),
            vertex_buffer,
            index_buffer,
            num_elements: self.indices.len() as u32,
            material: 0,
        }
    }
}

impl Shape {
    pub fn name(self) -> &'static str {
        match self {
            Shape::Cube => "cube",
            Shape::Plane => "plane",
            Shape::Sphere => "sphere",
            Shape::Cylinder => "cylinder",
            Shape::Cone => "cone",
            Shape::Torus => "torus",
        }
    }

    /// Generate the shape's mesh. Pure: same variant, same data.
    pub fn mesh_data(self) -> MeshData {
        match self {
            Shape::Cube => cube(),
            Shape::Plane => plane(),
            Shape::Sphere => sphere(),
            Shape::Cylinder => cylinder(),
            Shape::Cone => cone(),
            Shape::Torus => torus(),
        }
    }
}

fn vertex(position: [f32; 3], tex_coords: [f32; 2], normal: [f32; 3]) -> ModelVertex {
    ModelVertex {
        position,
        tex_coords,
        normal,
    }
}

/// Push one quad (four corners in counter-clockwise order viewed from
/// outside) as two triangles.
fn push_quad(data: &mut MeshData, corners: [[f32; 3]; 4], normal: [f32; 3]) {
    let base = data.vertices.len() as u32;
    let uvs = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
    for (corner, uv) in corners.into_iter().zip(uvs) {
        data.vertices.push(vertex(corner, uv, normal));
    }
    data.indices
        .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
}

fn cube() -> MeshData {
    let mut data = MeshData::default();
    let h = 0.5;
    // front +z
    push_quad(
        &mut data,
        [[-h, -h, h], [h, -h, h], [h, h, h], [-h, h, h]],
        [0.0, 0.0, 1.0],
    );
    // back -z
    push_quad(
        &mut data,
        [[h, -h, -h], [-h, -h, -h], [-h, h, -h], [h, h, -h]],
        [0.0, 0.0, -1.0],
    );
    // right +x
    push_quad(
        &mut data,
        [[h, -h, h], [h, -h, -h], [h, h, -h], [h, h, h]],
        [1.0, 0.0, 0.0],
    );
    // left -x
    push_quad(
        &mut data,
        [[-h, -h, -h], [-h, -h, h], [-h, h, h], [-h, h, -h]],
        [-1.0, 0.0, 0.0],
    );
    // top +y
    push_quad(
        &mut data,
        [[-h, h, h], [h, h, h], [h, h, -h], [-h, h, -h]],
        [0.0, 1.0, 0.0],
    );
    // bottom -y
    push_quad(
        &mut data,
        [[-h, -h, -h], [h, -h, -h], [h, -h, h], [-h, -h, h]],
        [0.0, -1.0, 0.0],
    );
    data
}

fn plane() -> MeshData {
    let mut data = MeshData::default();
    let h = 0.5;
    data.vertices.extend_from_slice(&[
        vertex([-h, 0.0, -h], [0.0, 0.0], [0.0, 1.0, 0.0]),
        vertex([-h, 0.0, h], [0.0, 1.0], [0.0, 1.0, 0.0]),
        vertex([h, 0.0, h], [1.0, 1.0], [0.0, 1.0, 0.0]),
        vertex([h, 0.0, -h], [1.0, 0.0], [0.0, 1.0, 0.0]),
    ]);
    data.indices.extend_from_slice(&[0, 1, 2, 0, 2, 3]);
    data
}

fn sphere() -> MeshData {
    let mut data = MeshData::default();
    let radius = 0.5;

    for i in 0..=SPHERE_STACKS {
        let v = i as f32 / SPHERE_STACKS as f32;
        let phi = v * PI;
        let y = phi.cos();
        let ring = phi.sin();
        for j in 0..=SPHERE_SECTORS {
            let u = j as f32 / SPHERE_SECTORS as f32;
            let theta = u * 2.0 * PI;
            let normal = [ring * theta.cos(), y, ring * theta.sin()];
            let position = [normal[0] * radius, normal[1] * radius, normal[2] * radius];
            data.vertices.push(vertex(position, [u, v], normal));
        }
    }

    for i in 0..SPHERE_STACKS {
        for j in 0..SPHERE_SECTORS {
            let a = i * (SPHERE_SECTORS + 1) + j;
            let b = a + SPHERE_SECTORS + 1;
            if i != 0 {
                data.indices.extend_from_slice(&[a, a + 1, b]);
            }
            if i != SPHERE_STACKS - 1 {
                data.indices.extend_from_slice(&[b, a + 1, b + 1]);
            }
        }
    }
    data
}

fn cylinder() -> MeshData {
    let mut data = MeshData::default();
    let radius = 0.5;
    let h = 0.5;

    // side
    for j in 0..=RING_SEGMENTS {
        let u = j as f32 / RING_SEGMENTS as f32;
        let theta = u * 2.0 * PI;
        let (sin, cos) = theta.sin_cos();
        let normal = [cos, 0.0, sin];
        data.vertices
            .push(vertex([radius * cos, h, radius * sin], [u, 0.0], normal));
        data.vertices
            .push(vertex([radius * cos, -h, radius * sin], [u, 1.0], normal));
    }
    for j in 0..RING_SEGMENTS {
        let a = j * 2;
        let b = a + 1;
        data.indices.extend_from_slice(&[a, a + 2, b, b, a + 2, b + 2]);
    }

    // caps
    for (y, normal) in [(h, [0.0, 1.0, 0.0]), (-h, [0.0, -1.0, 0.0])] {
        let center = data.vertices.len() as u32;
        data.vertices.push(vertex([0.0, y, 0.0], [0.5, 0.5], normal));
        for j in 0..=RING_SEGMENTS {
            let theta = j as f32 / RING_SEGMENTS as f32 * 2.0 * PI;
            let (sin, cos) = theta.sin_cos();
            data.vertices.push(vertex(
                [radius * cos, y, radius * sin],
                [0.5 + 0.5 * cos, 0.5 + 0.5 * sin],
                normal,
            ));
        }
        for j in 0..RING_SEGMENTS {
            let v = center + 1 + j;
            if y > 0.0 {
                data.indices.extend_from_slice(&[center, v + 1, v]);
            } else {
                data.indices.extend_from_slice(&[center, v, v + 1]);
            }
        }
    }
    data
}

fn cone() -> MeshData {
    let mut data = MeshData::default();
    let radius = 0.5;
    let h = 0.5;
    let slope = radius / (2.0 * h);

    // side, apex duplicated per segment for smooth normals
    for j in 0..=RING_SEGMENTS {
        let u = j as f32 / RING_SEGMENTS as f32;
        let theta = u * 2.0 * PI;
        let (sin, cos) = theta.sin_cos();
        let normal = normalize([cos, slope, sin]);
        data.vertices
            .push(vertex([radius * cos, -h, radius * sin], [u, 1.0], normal));
        data.vertices.push(vertex([0.0, h, 0.0], [u, 0.0], normal));
    }
    for j in 0..RING_SEGMENTS {
        let base = j * 2;
        let apex = base + 1;
        data.indices.extend_from_slice(&[base, apex, base + 2]);
    }

    // base cap
    let center = data.vertices.len() as u32;
    let normal = [0.0, -1.0, 0.0];
    data.vertices.push(vertex([0.0, -h, 0.0], [0.5, 0.5], normal));
    for j in 0..=RING_SEGMENTS {
        let theta = j as f32 / RING_SEGMENTS as f32 * 2.0 * PI;
        let (sin, cos) = theta.sin_cos();
        data.vertices.push(vertex(
            [radius * cos, -h, radius * sin],
            [0.5 + 0.5 * cos, 0.5 + 0.5 * sin],
            normal,
        ));
    }
    for j in 0..RING_SEGMENTS {
        let v = center + 1 + j;
        data.indices.extend_from_slice(&[center, v, v + 1]);
    }
    data
}

fn torus() -> MeshData {
    let mut data = MeshData::default();

    for i in 0..=TORUS_MAJOR_SEGMENTS {
        let u = i as f32 / TORUS_MAJOR_SEGMENTS as f32;
        let theta = u * 2.0 * PI;
        let (theta_sin, theta_cos) = theta.sin_cos();
        for j in 0..=TORUS_MINOR_SEGMENTS {
            let v = j as f32 / TORUS_MINOR_SEGMENTS as f32;
            let phi = v * 2.0 * PI;
            let (phi_sin, phi_cos) = phi.sin_cos();
            let ring = TORUS_MAJOR_RADIUS + TORUS_MINOR_RADIUS * phi_cos;
            data.vertices.push(vertex(
                [
                    ring * theta_cos,
                    TORUS_MINOR_RADIUS * phi_sin,
                    ring * theta_sin,
                ],
                [u, v],
                [phi_cos * theta_cos, phi_sin, phi_cos * theta_sin],
            ));
        }
    }

    for i in 0..TORUS_MAJOR_SEGMENTS {
        for j in 0..TORUS_MINOR_SEGMENTS {
            let a = i * (TORUS_MINOR_SEGMENTS + 1) + j;
            let b = a + TORUS_MINOR_SEGMENTS + 1;
            data.indices.extend_from_slice(&[a, a + 1, b, b, a + 1, b + 1]);
        }
    }
    data
}

fn normalize(v: [f32; 3]) -> [f32; 3] {
    let len = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
    [v[0] / len, v[1] / len, v[2] / len]
}

/// A primitive shape uploaded to the GPU together with its material and
/// instance transforms. Several placements of the same shape render as one
/// instanced draw call.
#[derive(Debug)]
pub struct PrimitiveSet {
    pub shape: Shape,
    pub model: Model,
    pub instances: Vec<Instance>,
    pub instance_buffer: wgpu::Buffer,
}

impl PrimitiveSet {
    pub fn new(
        device: &wgpu::Device,
        shape: Shape,
        material: Material,
        instances: Vec<Instance>,
    ) -> Self {
        let data = shape.mesh_data();
        let model = Model {
            meshes: vec![data.upload(device, shape.name())],
            materials: vec![material],
        };

        let instance_data = instances.iter().map(Instance::to_raw).collect::<Vec<_>>();
        let instance_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Instance Buffer", shape.name())),
            contents: bytemuck::cast_slice(&instance_data),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });

        Self {
            shape,
            model,
            instances,
            instance_buffer,
        }
    }

    /// Upload the current instance transforms. The instance count is fixed at
    /// construction; only transforms change.
    pub fn write_to_buffer(&self, queue: &wgpu::Queue) {
        let instance_data = self.instances.iter().map(Instance::to_raw).collect::<Vec<_>>();
        queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&instance_data));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_SHAPES: [Shape; 6] = [
        Shape::Cube,
        Shape::Plane,
        Shape::Sphere,
        Shape::Cylinder,
        Shape::Cone,
        Shape::Torus,
    ];

    fn length(v: [f32; 3]) -> f32 {
        (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
    }

    #[test]
    fn every_shape_produces_triangles_with_valid_indices() {
        for shape in ALL_SHAPES {
            let data = shape.mesh_data();
            assert!(!data.vertices.is_empty(), "{shape:?}");
            assert_eq!(data.indices.len() % 3, 0, "{shape:?}");
            let max = data.vertices.len() as u32;
            assert!(
                data.indices.iter().all(|i| *i < max),
                "{shape:?} has out-of-range indices"
            );
        }
    }

    #[test]
    fn every_shape_fits_the_unit_box_and_has_unit_normals() {
        for shape in ALL_SHAPES {
            let data = shape.mesh_data();
            for v in &data.vertices {
                assert!(
                    v.position.iter().all(|c| c.abs() <= 0.5 + 1e-6),
                    "{shape:?} vertex {:?} escapes the unit box",
                    v.position
                );
                assert!(
                    (length(v.normal) - 1.0).abs() < 1e-5,
                    "{shape:?} normal {:?} is not unit length",
                    v.normal
                );
            }
        }
    }

    #[test]
    fn cube_has_six_quad_faces() {
        let data = Shape::Cube.mesh_data();
        assert_eq!(data.vertices.len(), 24);
        assert_eq!(data.indices.len(), 36);
    }

    #[test]
    fn plane_faces_up() {
        let data = Shape::Plane.mesh_data();
        assert_eq!(data.vertices.len(), 4);
        assert!(data.vertices.iter().all(|v| v.normal == [0.0, 1.0, 0.0]));
        assert!(data.vertices.iter().all(|v| v.position[1] == 0.0));
    }

    #[test]
    fn sphere_vertices_sit_on_the_half_unit_radius() {
        let data = Shape::Sphere.mesh_data();
        for v in &data.vertices {
            assert!((length(v.position) - 0.5).abs() < 1e-5);
        }
    }

    #[test]
    fn generators_are_pure() {
        for shape in ALL_SHAPES {
            let a = shape.mesh_data();
            let b = shape.mesh_data();
            assert_eq!(a.indices, b.indices);
            assert_eq!(a.vertices.len(), b.vertices.len());
        }
    }
}
