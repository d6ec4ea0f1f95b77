//! GPU and window context shared by every flow.

use std::sync::Arc;

use anyhow::Context as _;
use cgmath::Point3;
use winit::window::Window;

use crate::{
    camera::{CameraResources, Projection, Viewport, rig::CameraRig},
    config::{CameraConfig, FloorConfig},
    data_structures::texture,
    pipelines::{
        Layouts, Pipelines,
        light::{LightResources, SceneLights},
    },
};

#[derive(Debug)]
pub struct Context {
    pub(crate) window: Arc<Window>,
    pub(crate) depth_texture: texture::Texture,
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub viewport: Viewport,
    pub camera: CameraResources,
    pub projection: Projection,
    pub light: LightResources,
    pub layouts: Layouts,
    pub pipelines: Pipelines,
    pub clear_colour: wgpu::Color,
}

impl Context {
    pub async fn new(window: Arc<Window>) -> anyhow::Result<Self> {
        let size = window.inner_size();

        log::info!("WGPU setup");
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            #[cfg(not(target_arch = "wasm32"))]
            backends: wgpu::Backends::PRIMARY,
            #[cfg(target_arch = "wasm32")]
            backends: wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("cannot create a surface for the window")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("no compatible graphics adapter")?;
        log::info!("adapter: {:?}", adapter.get_info());

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                required_features: wgpu::Features::empty(),
                // WebGL doesn't support all of wgpu's features, so if
                // we're building for the web we'll have to disable some.
                required_limits: if cfg!(target_arch = "wasm32") {
                    wgpu::Limits::downlevel_webgl2_defaults()
                } else {
                    wgpu::Limits::default()
                },
                memory_hints: Default::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .context("cannot open the graphics device")?;

        let surface_caps = surface.get_capabilities(&adapter);
        // Shaders write linear colour and rely on an sRGB surface for the conversion.
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .context("the surface supports no formats")?;
        let viewport = Viewport::from_physical(size.width, size.height, window.scale_factor());
        let (width, height) = viewport.render_size(device.limits().max_texture_dimension_2d);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode: surface_caps.present_modes[0],
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        log::info!("surface: {surface_format:?} {width}x{height}");

        let layouts = Layouts::new(&device);
        let pipelines = Pipelines::new(&device, config.format, &layouts);

        let camera_config = CameraConfig::default();
        let floor = FloorConfig::default().position;
        let projection = CameraRig::projection(&camera_config, width, height);
        let rig = CameraRig::new(&camera_config, Point3::new(floor.x, floor.y, floor.z));
        let camera = CameraResources::new(&device, &layouts.camera, rig, &projection);

        let light = LightResources::new(&device, &layouts, SceneLights::default());

        let depth_texture =
            texture::Texture::create_depth_texture(&device, [width, height], "depth_texture");

        Ok(Self {
            surface,
            device,
            queue,
            config,
            viewport,
            camera,
            projection,
            light,
            layouts,
            pipelines,
            window,
            depth_texture,
            clear_colour: wgpu::Color::BLACK,
        })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }
}

/// What a flow constructor gets to create its GPU resources before the first frame.
///
/// Cloning is cheap: device, queue and layouts are reference counted.
#[derive(Debug, Clone)]
pub struct InitContext {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub layouts: Layouts,
}

impl From<&Context> for InitContext {
    fn from(ctx: &Context) -> Self {
        Self {
            device: ctx.device.clone(),
            queue: ctx.queue.clone(),
            layouts: ctx.layouts.clone(),
        }
    }
}
