use wgpu::util::DeviceExt;

use crate::data_structures::model;

/**
 * OBJ exports don't always come with vertex normals, and the lighting
 * pipeline needs them. When a mesh has none, face normals are accumulated
 * per vertex and averaged, giving smooth shading across shared vertices.
 */
pub fn load_meshes(
    models: &[tobj::Model],
    file_name: &str,
    device: &wgpu::Device,
) -> Vec<model::Mesh> {
    models
        .iter()
        .map(|m| {
            let mut vertices = (0..m.mesh.positions.len() / 3)
                .map(|i| model::ModelVertex {
                    position: [
                        m.mesh.positions[i * 3],
                        m.mesh.positions[i * 3 + 1],
                        m.mesh.positions[i * 3 + 2],
                    ],
                    tex_coords: [
                        m.mesh.texcoords.get(i * 2).map_or(0.0, |f| *f),
                        1.0 - m.mesh.texcoords.get(i * 2 + 1).map_or(0.0, |f| *f),
                    ],
                    normal: [
                        m.mesh.normals.get(i * 3).map_or(0.0, |f| *f),
                        m.mesh.normals.get(i * 3 + 1).map_or(0.0, |f| *f),
                        m.mesh.normals.get(i * 3 + 2).map_or(0.0, |f| *f),
                    ],
                })
                .collect::<Vec<_>>();

            if m.mesh.normals.is_empty() {
                reconstruct_normals(&mut vertices, &m.mesh.indices);
            }

            let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{:?} Vertex Buffer", file_name)),
                contents: bytemuck::cast_slice(&vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });

            let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{:?} Index Buffer", file_name)),
                contents: bytemuck::cast_slice(&m.mesh.indices),
                usage: wgpu::BufferUsages::INDEX,
            });

            model::Mesh {
                name: file_name.to_string(),
                vertex_buffer,
                index_buffer,
                num_elements: m.mesh.indices.len() as u32,
                material: m.mesh.material_id.unwrap_or(0),
            }
        })
        .collect::<Vec<_>>()
}

fn reconstruct_normals(vertices: &mut [model::ModelVertex], indices: &[u32]) {
    use cgmath::InnerSpace;

    for c in indices.chunks(3) {
        let [i0, i1, i2] = [c[0] as usize, c[1] as usize, c[2] as usize];
        let p0: cgmath::Vector3<f32> = vertices[i0].position.into();
        let p1: cgmath::Vector3<f32> = vertices[i1].position.into();
        let p2: cgmath::Vector3<f32> = vertices[i2].position.into();

        // Area-weighted: the un-normalized cross product weights large faces
        // more
        let face_normal = (p1 - p0).cross(p2 - p0);
        for i in [i0, i1, i2] {
            let accumulated = cgmath::Vector3::from(vertices[i].normal) + face_normal;
            vertices[i].normal = accumulated.into();
        }
    }

    for v in vertices.iter_mut() {
        let n: cgmath::Vector3<f32> = v.normal.into();
        if n.magnitude2() > 0.0 {
            v.normal = n.normalize().into();
        } else {
            v.normal = [0.0, 1.0, 0.0];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::InnerSpace;

    #[test]
    fn reconstructed_normals_are_unit_and_face_outward() {
        // one upward-facing triangle in the xz plane
        let mut vertices = vec![
            model::ModelVertex {
                position: [0.0, 0.0, 0.0],
                tex_coords: [0.0, 0.0],
                normal: [0.0; 3],
            },
            model::ModelVertex {
                position: [0.0, 0.0, 1.0],
                tex_coords: [0.0, 1.0],
                normal: [0.0; 3],
            },
            model::ModelVertex {
                position: [1.0, 0.0, 0.0],
                tex_coords: [1.0, 0.0],
                normal: [0.0; 3],
            },
        ];
        reconstruct_normals(&mut vertices, &[0, 1, 2]);
        for v in &vertices {
            let n: cgmath::Vector3<f32> = v.normal.into();
            assert!((n.magnitude() - 1.0).abs() < 1e-6);
            assert!(n.y > 0.99, "normal {n:?} should face up");
        }
    }

    #[test]
    fn unreferenced_vertices_get_a_safe_default_normal() {
        let mut vertices = vec![model::ModelVertex {
            position: [0.0, 0.0, 0.0],
            tex_coords: [0.0, 0.0],
            normal: [0.0; 3],
        }];
        reconstruct_normals(&mut vertices, &[]);
        assert_eq!(vertices[0].normal, [0.0, 1.0, 0.0]);
    }
}
