#![cfg(feature = "integration-tests")]

use phoenix_vale::{
    context::Context,
    flow::{GraphicsFlow, ImageTestResult, Out},
    render::Render,
};

pub(crate) type Frame = image::ImageBuffer<image::Rgba<u8>, wgpu::BufferView>;

#[derive(Default)]
pub(crate) struct FrameCounter(pub(crate) u32);

impl FrameCounter {
    pub(crate) fn frame(&self) -> u32 {
        self.0
    }

    pub(crate) fn progress(&mut self) {
        self.0 += 1;
    }
}

type Setup = Box<dyn Fn(&mut Context)>;
type Validate =
    Box<dyn Fn(&Context, &mut FrameCounter, &mut Frame) -> Result<ImageTestResult, anyhow::Error>>;

/// A flow that draws nothing itself; it configures the context and checks the frames.
pub(crate) struct TestRender {
    setup: Setup,
    validate: Validate,
}

impl TestRender {
    pub(crate) fn new(
        setup: impl Fn(&mut Context) + 'static,
        validate: impl Fn(&Context, &mut FrameCounter, &mut Frame) -> Result<ImageTestResult, anyhow::Error>
        + 'static,
    ) -> Self {
        Self {
            setup: Box::new(setup),
            validate: Box::new(validate),
        }
    }
}

impl GraphicsFlow<FrameCounter, ()> for TestRender {
    fn on_init(&mut self, ctx: &mut Context, _: &mut FrameCounter) -> Out<FrameCounter, ()> {
        (self.setup)(ctx);
        Out::Empty
    }

    fn on_update(
        &mut self,
        _: &Context,
        state: &mut FrameCounter,
        _: instant::Duration,
    ) -> Out<FrameCounter, ()> {
        state.progress();
        Out::Empty
    }

    fn on_device_events(
        &mut self,
        _: &Context,
        _: &mut FrameCounter,
        _: &phoenix_vale::DeviceEvent,
    ) -> Out<FrameCounter, ()> {
        Out::Empty
    }

    fn on_window_events(
        &mut self,
        _: &Context,
        _: &mut FrameCounter,
        _: &phoenix_vale::WindowEvent,
    ) -> Out<FrameCounter, ()> {
        Out::Empty
    }

    fn on_custom_events(&mut self, _: &Context, _: &mut FrameCounter, event: ()) -> Option<()> {
        Some(event)
    }

    fn on_render(&self) -> Render<'_> {
        Render::None
    }

    fn render_to_texture(
        &self,
        ctx: &Context,
        state: &mut FrameCounter,
        texture: &mut Frame,
    ) -> Result<ImageTestResult, anyhow::Error> {
        (self.validate)(ctx, state, texture)
    }
}

pub(crate) fn to_pixel(colour: wgpu::Color) -> image::Rgba<u8> {
    let f_to_u8 = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    image::Rgba([
        f_to_u8(colour.r),
        f_to_u8(colour.g),
        f_to_u8(colour.b),
        f_to_u8(colour.a),
    ])
}

#[macro_export]
macro_rules! golden_image_test {
    ($graphics_elem:expr) => {{
        use phoenix_vale::flow::{FlowConsturctor, GraphicsFlow};
        use $crate::common::test_utils::FrameCounter;
        let constructor = $graphics_elem;
        let model_constructor: FlowConsturctor<FrameCounter, ()> = Box::new(move |init| {
            Box::pin(async move {
                let g_flow: Box<dyn GraphicsFlow<FrameCounter, ()>> =
                    Box::new(constructor(init).await);
                g_flow
            })
        });

        phoenix_vale::flow::run(vec![model_constructor])
            .expect("Failed to run flow for integration test.");
    }};
}
