//! Demo viewer: a floor, a few primitives and an imported OBJ model under a
//! tunable light, flown through with the free-fly camera.
//!
//! Controls: WASD + E/Q to fly, hold the left mouse button to look around,
//! scroll to zoom, Space to reset the camera, Escape to quit. The panel on
//! the left edits camera and light settings.

use std::time::Duration;

use freefly::{
    Deg, DeviceEvent, Vector3, WindowEvent,
    app::{Scene, SceneConstructor, run},
    camera::Camera,
    context::{Context, InitContext},
    data_structures::{
        instance::Instance,
        model::{Material, Model},
        primitive::{PrimitiveSet, Shape},
        texture::Texture,
    },
    render::{Instanced, Render},
    resources::{self, texture::diffuse_specular_layout},
    util::DeviceExt,
};

#[derive(Default)]
struct State;

struct Viewer {
    floor: PrimitiveSet,
    sphere: PrimitiveSet,
    cylinder: PrimitiveSet,
    cone: PrimitiveSet,
    torus: PrimitiveSet,
    imported: Model,
    imported_instances: Vec<Instance>,
    imported_buffer: freefly::Buffer,
}

/// Two-colour checkerboard diffuse map.
fn checkerboard(
    device: &freefly::Device,
    queue: &freefly::Queue,
    a: [u8; 4],
    b: [u8; 4],
) -> Texture {
    let image = image_from_fn(256, |x, y| if (x / 32 + y / 32) % 2 == 0 { a } else { b });
    match Texture::from_image(device, queue, &image, Some("checkerboard"), false) {
        Ok(texture) => texture,
        Err(e) => panic!("Cannot build the checkerboard texture: {e}"),
    }
}

fn image_from_fn(size: u32, f: impl Fn(u32, u32) -> [u8; 4]) -> image::DynamicImage {
    let buffer = image::RgbaImage::from_fn(size, size, |x, y| image::Rgba(f(x, y)));
    image::DynamicImage::ImageRgba8(buffer)
}

fn solid_material(
    ctx: &InitContext,
    layout: &freefly::BindGroupLayout,
    name: &str,
    rgba: [u8; 4],
) -> Material {
    let diffuse = Texture::create_solid(&ctx.device, &ctx.queue, rgba, name);
    let specular = Texture::create_solid(&ctx.device, &ctx.queue, [140, 140, 140, 255], name);
    Material::new(&ctx.device, name, diffuse, specular, layout)
}

impl Viewer {
    async fn new(ctx: &InitContext) -> Self {
        let layout = diffuse_specular_layout(&ctx.device);

        let floor_material = {
            let diffuse = checkerboard(
                &ctx.device,
                &ctx.queue,
                [200, 85, 60, 255],
                [235, 225, 210, 255],
            );
            let specular = Texture::create_solid(&ctx.device, &ctx.queue, [90, 90, 90, 255], "floor");
            Material::new(&ctx.device, "floor", diffuse, specular, &layout)
        };
        let floor = PrimitiveSet::new(
            &ctx.device,
            Shape::Plane,
            floor_material,
            vec![Instance::new()],
        );

        let sphere = PrimitiveSet::new(
            &ctx.device,
            Shape::Sphere,
            solid_material(ctx, &layout, "sphere", [70, 130, 200, 255]),
            vec![Instance::new()],
        );
        let cylinder = PrimitiveSet::new(
            &ctx.device,
            Shape::Cylinder,
            solid_material(ctx, &layout, "cylinder", [110, 180, 90, 255]),
            vec![Instance::new()],
        );
        let cone = PrimitiveSet::new(
            &ctx.device,
            Shape::Cone,
            solid_material(ctx, &layout, "cone", [220, 180, 70, 255]),
            vec![Instance::new()],
        );
        let torus = PrimitiveSet::new(
            &ctx.device,
            Shape::Torus,
            solid_material(ctx, &layout, "torus", [170, 95, 190, 255]),
            vec![Instance::new()],
        );

        // The imported model; the viewer still runs when the asset is absent
        let imported = match resources::load_model_obj("cube.obj", &ctx.device, &ctx.queue).await {
            Ok(model) => model,
            Err(e) => {
                log::error!("cube.obj could not be loaded ({e}), substituting a generated cube");
                Model {
                    meshes: vec![Shape::Cube.mesh_data().upload(&ctx.device, "substitute cube")],
                    materials: vec![resources::texture::default_material(
                        &ctx.device,
                        &ctx.queue,
                        &layout,
                    )],
                }
            }
        };
        let imported_instances = vec![Instance::from_euler(
            Vector3::new(-3.0, 0.0, -3.0),
            Vector3::new(0.0, 30.0, 0.0),
            Vector3::new(1.5, 1.5, 1.5),
        )];
        let instance_data = imported_instances
            .iter()
            .map(Instance::to_raw)
            .collect::<Vec<_>>();
        let imported_buffer =
            ctx.device
                .create_buffer_init(&freefly::util::BufferInitDescriptor {
                    label: Some("Imported Model Instance Buffer"),
                    contents: bytemuck::cast_slice(&instance_data),
                    usage: freefly::BufferUsages::VERTEX | freefly::BufferUsages::COPY_DST,
                });

        Self {
            floor,
            sphere,
            cylinder,
            cone,
            torus,
            imported,
            imported_instances,
            imported_buffer,
        }
    }
}

impl Scene<State> for Viewer {
    fn on_init(&mut self, ctx: &mut Context, _: &mut State) {
        ctx.camera.camera = Camera::new((0.0, 1.5, 8.0), (0.0, 1.0, 0.0), Deg(-90.0), Deg(-10.0));

        self.floor.instances[0] = Instance::from_euler(
            Vector3::new(0.0, -1.0, 0.0),
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(20.0, 1.0, 20.0),
        );
        self.sphere.instances[0] = Instance::from_euler(
            Vector3::new(0.0, 0.0, -5.0),
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(2.0, 2.0, 2.0),
        );
        self.cylinder.instances[0] = Instance::from_euler(
            Vector3::new(3.0, 0.0, -2.0),
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(1.0, 2.0, 1.0),
        );
        self.cone.instances[0] = Instance::from_euler(
            Vector3::new(5.5, 0.0, -4.0),
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(1.5, 1.5, 1.5),
        );
        self.torus.instances[0] = Instance::from_euler(
            Vector3::new(-3.0, 0.5, -6.0),
            Vector3::new(90.0, 0.0, 0.0),
            Vector3::new(3.0, 3.0, 3.0),
        );

        for set in [
            &self.floor,
            &self.sphere,
            &self.cylinder,
            &self.cone,
            &self.torus,
        ] {
            set.write_to_buffer(&ctx.queue);
        }
    }

    fn on_update(&mut self, _: &Context, _: &mut State, _: Duration) {}

    fn on_device_events(&mut self, _: &Context, _: &mut State, _: &DeviceEvent) {}

    fn on_window_events(&mut self, _: &Context, _: &mut State, _: &WindowEvent) {}

    fn on_render<'pass>(&self) -> Render<'_, 'pass> {
        Render::Composed(vec![
            (&self.floor).into(),
            (&self.sphere).into(),
            (&self.cylinder).into(),
            (&self.cone).into(),
            (&self.torus).into(),
            Render::Default(Instanced {
                instance: &self.imported_buffer,
                model: &self.imported,
                amount: self.imported_instances.len(),
            }),
        ])
    }
}

fn main() -> anyhow::Result<()> {
    let constructor: SceneConstructor<State> = Box::new(|ctx: InitContext| {
        Box::pin(async move { Box::new(Viewer::new(&ctx).await) as Box<dyn Scene<State>> })
    });
    run(vec![constructor])
}
