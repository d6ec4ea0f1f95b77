//! The phoenix scene: a flow that owns the floor, the debug panel and, once their asset has
//! arrived, the three birds.
//!
//! Floor textures are loaded while the flow is constructed. The bird asset is requested
//! from `on_init` as an [`Out::FutEvent`] and comes back as [`SceneEvent::Birds`]; until
//! then the scene stays [`SceneState::Loading`] and renders the floor alone.

pub mod birds;
pub mod floor;
pub mod panel;
#[cfg(target_arch = "wasm32")]
pub mod panel_web;

use cgmath::Point3;
use instant::Duration;
use winit::event::{DeviceEvent, ElementState, WindowEvent};

use crate::{
    camera::rig::CameraRig,
    config::SceneConfig,
    context::{Context, InitContext},
    flow::{FlowConsturctor, GraphicsFlow, Out},
    pipelines::light::SceneLights,
    render::Render,
    resources::{LoadedModel, load_model_gltf},
};

use birds::Flock;
use floor::Floor;
use panel::{ControlId, DebugPanel, PanelEvent, SceneParams};

pub enum SceneEvent {
    Birds(anyhow::Result<LoadedModel>),
}

/// `Ready` is terminal. A failed load leaves the scene `Loading`.
#[derive(Debug)]
pub enum SceneState {
    Loading,
    Ready(Flock),
}

#[derive(Debug)]
pub struct PhoenixScene {
    config: SceneConfig,
    init: InitContext,
    floor: Floor,
    panel: DebugPanel,
    #[cfg(target_arch = "wasm32")]
    web_panel: Option<panel_web::WebPanel>,
    shift: bool,
    state: SceneState,
}

impl PhoenixScene {
    pub async fn new(init: InitContext, config: SceneConfig) -> Self {
        let floor = Floor::new(&init, &config.floor).await;
        let params = SceneParams::from_config(&config);

        #[cfg(target_arch = "wasm32")]
        let web_panel = match panel_web::WebPanel::new(&params) {
            Ok(panel) => Some(panel),
            Err(e) => {
                log::warn!("no debug panel: {e:#}");
                None
            }
        };

        Self {
            config,
            init,
            floor,
            panel: DebugPanel::new(params),
            #[cfg(target_arch = "wasm32")]
            web_panel,
            shift: false,
            state: SceneState::Loading,
        }
    }

    pub fn constructor(config: SceneConfig) -> FlowConsturctor<(), SceneEvent> {
        Box::new(move |init| {
            Box::pin(async move {
                let scene = PhoenixScene::new(init, config).await;
                Box::new(scene) as Box<dyn GraphicsFlow<(), SceneEvent>>
            })
        })
    }

    pub fn state(&self) -> &SceneState {
        &self.state
    }

    pub fn params(&self) -> &SceneParams {
        &self.panel.params
    }

    /// Apply panel edits. Floor changes are written right away, light changes go through
    /// the returned `Out::Configure`.
    fn apply_panel(
        &mut self,
        queue: &wgpu::Queue,
        events: impl IntoIterator<Item = PanelEvent>,
    ) -> Out<(), SceneEvent> {
        let edits: Vec<ControlId> = events
            .into_iter()
            .filter_map(|event| self.panel.apply(event))
            .collect();
        for id in &edits {
            match id {
                ControlId::DisplacementScale => self
                    .floor
                    .set_displacement_scale(queue, self.panel.params.displacement_scale),
                ControlId::Color => self.floor.set_tint(queue, self.panel.params.color),
                _ => (),
            }
        }

        #[cfg(target_arch = "wasm32")]
        if let (false, Some(web_panel)) = (edits.is_empty(), &self.web_panel) {
            web_panel.sync(&self.panel.params);
        }

        let light_changed = edits.iter().any(|id| id.affects_light());
        if !light_changed {
            return Out::Empty;
        }
        let position: Point3<f32> = self.panel.params.light_position;
        let intensity = self.panel.params.light_intensity;
        Out::Configure(Box::new(move |ctx: &mut Context| {
            ctx.light.lights.position = position;
            ctx.light.lights.intensity = intensity;
        }))
    }

    fn load_birds(&self) -> Out<(), SceneEvent> {
        let init = self.init.clone();
        let model = self.config.birds.model;
        let load: Box<dyn Future<Output = SceneEvent>> = Box::new(async move {
            SceneEvent::Birds(
                load_model_gltf(model, &init.device, &init.queue, &init.layouts.material).await,
            )
        });
        Out::FutEvent(vec![load])
    }
}

impl GraphicsFlow<(), SceneEvent> for PhoenixScene {
    fn on_init(&mut self, ctx: &mut Context, _: &mut ()) -> Out<(), SceneEvent> {
        let floor = self.config.floor.position;
        ctx.camera.rig =
            CameraRig::new(&self.config.camera, Point3::new(floor.x, floor.y, floor.z));
        ctx.projection =
            CameraRig::projection(&self.config.camera, ctx.config.width, ctx.config.height);
        ctx.projection.set_aspect(ctx.viewport.aspect());
        ctx.camera.write(&ctx.queue, &ctx.projection);
        ctx.light.lights = SceneLights::from_config(&self.config.lighting);
        ctx.clear_colour = wgpu::Color::BLACK;
        self.load_birds()
    }

    fn on_update(&mut self, ctx: &Context, _: &mut (), dt: Duration) -> Out<(), SceneEvent> {
        if let SceneState::Ready(flock) = &mut self.state {
            flock.update(&ctx.queue, dt.as_secs_f32());
        }

        #[cfg(target_arch = "wasm32")]
        if let Some(events) = self.web_panel.as_ref().map(|panel| panel.drain()) {
            return self.apply_panel(&ctx.queue, events);
        }
        Out::Empty
    }

    fn on_device_events(
        &mut self,
        _: &Context,
        _: &mut (),
        _: &DeviceEvent,
    ) -> Out<(), SceneEvent> {
        Out::Empty
    }

    fn on_window_events(
        &mut self,
        ctx: &Context,
        _: &mut (),
        event: &WindowEvent,
    ) -> Out<(), SceneEvent> {
        match event {
            WindowEvent::ModifiersChanged(modifiers) => {
                self.shift = modifiers.state().shift_key();
                Out::Empty
            }
            WindowEvent::KeyboardInput { event, .. } if event.state == ElementState::Pressed => {
                match self.panel.handle_key(&event.logical_key, self.shift) {
                    Some(edit) => self.apply_panel(&ctx.queue, [edit]),
                    None => Out::Empty,
                }
            }
            _ => Out::Empty,
        }
    }

    fn on_custom_events(
        &mut self,
        ctx: &Context,
        _: &mut (),
        event: SceneEvent,
    ) -> Option<SceneEvent> {
        match event {
            SceneEvent::Birds(Ok(loaded)) => {
                if matches!(self.state, SceneState::Ready(_)) {
                    log::warn!("birds are already loaded, ignoring a second load");
                    return None;
                }
                let flock = Flock::new(
                    &ctx.device,
                    &ctx.queue,
                    &ctx.layouts.skin,
                    loaded,
                    &self.config.birds,
                );
                log::info!("scene ready with {} birds", flock.birds().len());
                self.state = SceneState::Ready(flock);
            }
            SceneEvent::Birds(Err(e)) => {
                log::error!("cannot load {}: {e:#}", self.config.birds.model);
            }
        }
        None
    }

    fn on_render(&self) -> Render<'_> {
        match &self.state {
            SceneState::Loading => self.floor.render(),
            SceneState::Ready(flock) => {
                Render::Composed(vec![self.floor.render(), flock.render()])
            }
        }
    }

    #[cfg(feature = "integration-tests")]
    fn render_to_texture(
        &self,
        _: &Context,
        _: &mut (),
        _: &mut image::ImageBuffer<image::Rgba<u8>, wgpu::BufferView>,
    ) -> Result<crate::flow::ImageTestResult, anyhow::Error> {
        Ok(match self.state {
            SceneState::Loading => crate::flow::ImageTestResult::Waiting,
            SceneState::Ready(_) => crate::flow::ImageTestResult::Passed,
        })
    }
}
