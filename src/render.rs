//! Render composition and pipeline batching.
//!
//! Scenes describe what to draw by returning a [`Render`]; the engine sorts
//! the pieces into per-pipeline batches so pipeline switches happen once per
//! frame, not once per object.
//!
//! # Key types
//!
//! - [`Render<'a, 'pass>`] is the primary enum describing render operations
//! - [`Instanced<'a>`] contains data for instanced 3D rendering
//! - [`Flat<'a>`] contains data for flat (2D / GUI) rendering

use wgpu::RenderPass;

use crate::{
    context::Context,
    data_structures::{model::Model, primitive::PrimitiveSet},
};

/// Data for instanced object rendering: a model plus its instance buffer.
pub struct Instanced<'a> {
    pub instance: &'a wgpu::Buffer,
    pub model: &'a Model,
    pub amount: usize,
}

/// Data for flat (2D / GUI) object rendering: vertex and index buffers.
pub struct Flat<'a> {
    pub vertex: &'a wgpu::Buffer,
    pub index: &'a wgpu::Buffer,
    pub amount: usize,
}

/// Specifies how a scene object should be rendered.
///
/// # Variants
///
/// - `None` renders nothing
/// - `Default(Instanced)` renders a single opaque instanced object
/// - `Defaults(Vec<Instanced>)` renders a batch of opaque instanced objects
/// - `GUI(Flat)` renders 2D elements (flat geometry)
/// - `Composed(Vec<Render>)` recursively composes multiple renders
/// - `Custom(...)` invokes a user-defined closure for custom rendering
pub enum Render<'a, 'pass>
where
    'pass: 'a,
{
    None,
    Default(Instanced<'a>),
    Defaults(Vec<Instanced<'a>>),
    GUI(Flat<'a>),
    Composed(Vec<Render<'a, 'pass>>),
    Custom(Box<dyn 'a + FnOnce(&Context, &mut wgpu::RenderPass<'pass>)>),
}

impl<'a, 'pass> Render<'a, 'pass> {
    pub(crate) fn set_pipelines(
        self,
        ctx: &Context,
        render_pass: &mut RenderPass<'pass>,
        basics: &mut Vec<Instanced<'a>>,
        guis: &mut Vec<Flat<'a>>,
    ) {
        match self {
            Render::Default(instanced) => basics.push(instanced),
            Render::Defaults(mut vec) => basics.append(&mut vec),
            Render::GUI(flat) => guis.push(flat),
            Render::Composed(renders) => renders
                .into_iter()
                .for_each(|render| render.set_pipelines(ctx, render_pass, basics, guis)),
            Render::Custom(f) => f(ctx, render_pass),
            Render::None => (),
        }
    }
}

impl<'a, 'pass> From<&'a PrimitiveSet> for Render<'a, 'pass> {
    fn from(set: &'a PrimitiveSet) -> Self {
        Render::Default(Instanced {
            instance: &set.instance_buffer,
            model: &set.model,
            amount: set.instances.len(),
        })
    }
}
