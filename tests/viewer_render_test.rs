//! Windowed smoke test: opens a real window, renders a few frames with an
//! empty scene and shuts down through `Context::request_exit`. Needs a
//! display and a GPU, so it only compiles with the `integration-tests`
//! feature.

#[test]
#[cfg(feature = "integration-tests")]
fn empty_scene_renders_and_exits() {
    use std::time::Duration;

    use freefly::{
        DeviceEvent, WindowEvent,
        app::{Scene, SceneConstructor, run},
        context::Context,
        render::Render,
    };

    struct Empty {
        frames: u32,
    }

    impl Scene<()> for Empty {
        fn on_init(&mut self, ctx: &mut Context, _: &mut ()) {
            ctx.clear_colour = freefly::Color::BLACK;
        }

        fn on_update(&mut self, ctx: &Context, _: &mut (), _: Duration) {
            self.frames += 1;
            if self.frames > 3 {
                ctx.request_exit();
            }
        }

        fn on_device_events(&mut self, _: &Context, _: &mut (), _: &DeviceEvent) {}

        fn on_window_events(&mut self, _: &Context, _: &mut (), _: &WindowEvent) {}

        fn on_render<'pass>(&self) -> Render<'_, 'pass> {
            Render::None
        }
    }

    let constructor: SceneConstructor<()> = Box::new(|_| {
        Box::pin(async move { Box::new(Empty { frames: 0 }) as Box<dyn Scene<()>> })
    });

    if let Err(e) = run(vec![constructor]) {
        panic!("{e}");
    }
}
