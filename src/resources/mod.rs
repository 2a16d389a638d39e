use crate::{
    data_structures::model,
    resources::texture::{diffuse_specular_layout, load_textures},
};

/**
 * This module contains all logic for loading meshes/textures from external files.
 */
pub mod mesh;
pub mod texture;

/// Load an OBJ model (and its MTL materials) from the assets directory.
///
/// Materials with missing texture references fall back to generated solid
/// maps; a model with no materials at all gets one default material so mesh
/// material indices stay valid.
pub async fn load_model_obj(
    file_name: &str,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
) -> anyhow::Result<model::Model> {
    let bind_group_layout = diffuse_specular_layout(device);

    let (mut materials, models) =
        load_textures(file_name, queue, device, &bind_group_layout).await?;
    if materials.is_empty() {
        log::warn!("{file_name} has no materials, using the default material");
        materials.push(texture::default_material(device, queue, &bind_group_layout));
    }
    let meshes = mesh::load_meshes(&models, file_name, device);

    Ok(model::Model { meshes, materials })
}
