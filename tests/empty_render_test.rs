#[cfg(feature = "integration-tests")]
#[macro_use]
mod common;

#[test]
#[cfg(feature = "integration-tests")]
fn should_render_clear_colour() {
    use phoenix_vale::{
        context::{Context, InitContext},
        flow::ImageTestResult,
    };
    use wgpu::Color;

    use crate::common::test_utils::{FrameCounter, TestRender, to_pixel};

    golden_image_test!(async move |_: InitContext| {
        TestRender::new(
            |ctx: &mut Context| {
                ctx.clear_colour = Color::WHITE;
                ctx.camera.rig.camera.position = [0.0, 5.0, 2.0].into();
            },
            |_, state: &mut FrameCounter, texture| {
                if state.frame() > 0 {
                    let desired_pixel = to_pixel(Color::WHITE);
                    for pixel in texture.pixels() {
                        assert_eq!(*pixel, desired_pixel);
                    }
                    Ok(ImageTestResult::Passed)
                } else {
                    Ok(ImageTestResult::Waiting)
                }
            },
        )
    });
}
