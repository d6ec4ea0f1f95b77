#[cfg(feature = "integration-tests")]
mod common;

/// The full scene with a clip name the asset does not contain: the birds load, stay in
/// their bind pose and the frame loop keeps going. The asset is the hand-built GLB from
/// `common::phoenix_glb`, so the test needs nothing but a GPU.
#[test]
#[cfg(feature = "integration-tests")]
fn scene_keeps_rendering_without_its_clip() {
    use phoenix_vale::{
        config::{BirdConfig, SceneConfig},
        context::Context,
        flow::{FlowConsturctor, GraphicsFlow, ImageTestResult, Out},
        render::Render,
        scene::{PhoenixScene, SceneEvent, SceneState},
    };

    use crate::common::{
        phoenix_glb,
        test_utils::{Frame, to_pixel},
    };

    const FRAMES: u32 = 30;
    const BIRD_ASSET: &str = "test-fixtures/missing_clip/phoenix.glb";

    struct SceneProbe {
        scene: PhoenixScene,
        frames: u32,
    }

    impl GraphicsFlow<(), SceneEvent> for SceneProbe {
        fn on_init(&mut self, ctx: &mut Context, state: &mut ()) -> Out<(), SceneEvent> {
            self.scene.on_init(ctx, state)
        }

        fn on_update(
            &mut self,
            ctx: &Context,
            state: &mut (),
            dt: instant::Duration,
        ) -> Out<(), SceneEvent> {
            self.frames += 1;
            self.scene.on_update(ctx, state, dt)
        }

        fn on_device_events(
            &mut self,
            ctx: &Context,
            state: &mut (),
            event: &phoenix_vale::DeviceEvent,
        ) -> Out<(), SceneEvent> {
            self.scene.on_device_events(ctx, state, event)
        }

        fn on_window_events(
            &mut self,
            ctx: &Context,
            state: &mut (),
            event: &phoenix_vale::WindowEvent,
        ) -> Out<(), SceneEvent> {
            self.scene.on_window_events(ctx, state, event)
        }

        fn on_custom_events(
            &mut self,
            ctx: &Context,
            state: &mut (),
            event: SceneEvent,
        ) -> Option<SceneEvent> {
            self.scene.on_custom_events(ctx, state, event)
        }

        fn on_render(&self) -> Render<'_> {
            self.scene.on_render()
        }

        fn render_to_texture(
            &self,
            ctx: &Context,
            _: &mut (),
            texture: &mut Frame,
        ) -> Result<ImageTestResult, anyhow::Error> {
            if self.frames < FRAMES {
                return Ok(ImageTestResult::Waiting);
            }
            let SceneState::Ready(flock) = self.scene.state() else {
                anyhow::bail!("the bird asset never loaded");
            };
            assert_eq!(flock.birds().len(), 3);
            for bird in flock.birds() {
                assert!(bird.mixer.actions().is_empty());
            }
            let clear = to_pixel(ctx.clear_colour);
            assert!(texture.pixels().any(|pixel| *pixel != clear));
            Ok(ImageTestResult::Passed)
        }
    }

    phoenix_glb::install(BIRD_ASSET).expect("cannot write the bird asset");
    let config = SceneConfig {
        birds: BirdConfig {
            model: BIRD_ASSET,
            clip: "Take 404".to_string(),
            ..Default::default()
        },
        ..Default::default()
    };
    let constructor: FlowConsturctor<(), SceneEvent> = Box::new(move |init| {
        Box::pin(async move {
            let probe: Box<dyn GraphicsFlow<(), SceneEvent>> = Box::new(SceneProbe {
                scene: PhoenixScene::new(init, config).await,
                frames: 0,
            });
            probe
        })
    });

    phoenix_vale::flow::run(vec![constructor]).expect("Failed to run flow for integration test.");
}
