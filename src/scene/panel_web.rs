//! DOM frontend of the debug panel: range and colour inputs in the `#debug-panel` overlay.

use std::{cell::RefCell, collections::VecDeque, rc::Rc};

use anyhow::Context as _;
use wasm_bindgen::{JsCast, closure::Closure};
use web_sys::{Document, Element, HtmlInputElement};

use crate::scene::panel::{
    CONTROLS, Control, ControlKind, PanelEvent, SceneParams, parse_hex_color, to_hex_color,
};

const PANEL_ID: &str = "debug-panel";

fn js_err(e: wasm_bindgen::JsValue) -> anyhow::Error {
    anyhow::anyhow!("{e:?}")
}

/// Widgets push their edits into a queue the scene drains once per frame.
pub struct WebPanel {
    events: Rc<RefCell<VecDeque<PanelEvent>>>,
    inputs: Vec<(Control, HtmlInputElement)>,
}

impl std::fmt::Debug for WebPanel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebPanel")
            .field("inputs", &self.inputs.len())
            .finish()
    }
}

impl WebPanel {
    pub fn new(params: &SceneParams) -> anyhow::Result<Self> {
        let document = web_sys::window()
            .and_then(|window| window.document())
            .context("no document")?;
        let root = match document.get_element_by_id(PANEL_ID) {
            Some(root) => root,
            None => {
                let root = document.create_element("div").map_err(js_err)?;
                root.set_id(PANEL_ID);
                document
                    .body()
                    .context("no body")?
                    .append_child(&root)
                    .map_err(js_err)?;
                root
            }
        };

        let events = Rc::new(RefCell::new(VecDeque::new()));
        let inputs = CONTROLS
            .iter()
            .map(|control| {
                let input = add_control(&document, &root, control, params, events.clone())?;
                Ok((*control, input))
            })
            .collect::<anyhow::Result<_>>()?;
        log::info!("debug panel attached to #{PANEL_ID}");
        Ok(Self { events, inputs })
    }

    pub fn drain(&self) -> Vec<PanelEvent> {
        self.events.borrow_mut().drain(..).collect()
    }

    /// Show the values as the panel holds them after clamping.
    pub fn sync(&self, params: &SceneParams) {
        for (control, input) in &self.inputs {
            match control.kind {
                ControlKind::Slider { .. } => {
                    if let Some(value) = params.value(control.id) {
                        input.set_value(&value.to_string());
                    }
                }
                ControlKind::Color => input.set_value(&to_hex_color(params.color)),
            }
        }
    }
}

fn add_control(
    document: &Document,
    root: &Element,
    control: &Control,
    params: &SceneParams,
    events: Rc<RefCell<VecDeque<PanelEvent>>>,
) -> anyhow::Result<HtmlInputElement> {
    let label = document.create_element("label").map_err(js_err)?;
    label.set_text_content(Some(control.label));
    let input: HtmlInputElement = document
        .create_element("input")
        .map_err(js_err)?
        .dyn_into()
        .map_err(|_| anyhow::anyhow!("<input> is not an HtmlInputElement"))?;

    let id = control.id;
    let on_input: Closure<dyn FnMut(web_sys::Event)> = match control.kind {
        ControlKind::Slider { min, max, step } => {
            input.set_type("range");
            input.set_min(&min.to_string());
            input.set_max(&max.to_string());
            input.set_step(&step.to_string());
            if let Some(value) = params.value(id) {
                input.set_value(&value.to_string());
            }
            Closure::new(move |event: web_sys::Event| {
                let Some(input) = event
                    .target()
                    .and_then(|target| target.dyn_into::<HtmlInputElement>().ok())
                else {
                    return;
                };
                match input.value().parse::<f32>() {
                    Ok(value) => events
                        .borrow_mut()
                        .push_back(PanelEvent::Slider { id, value }),
                    Err(e) => log::warn!("{:?}: {e}", input.value()),
                }
            })
        }
        ControlKind::Color => {
            input.set_type("color");
            input.set_value(&to_hex_color(params.color));
            Closure::new(move |event: web_sys::Event| {
                let Some(input) = event
                    .target()
                    .and_then(|target| target.dyn_into::<HtmlInputElement>().ok())
                else {
                    return;
                };
                match parse_hex_color(&input.value()) {
                    Ok(rgb) => events.borrow_mut().push_back(PanelEvent::Color(rgb)),
                    Err(e) => log::warn!("{e}"),
                }
            })
        }
    };
    input
        .add_event_listener_with_callback("input", on_input.as_ref().unchecked_ref())
        .map_err(js_err)?;
    // The widget lives as long as the page.
    on_input.forget();

    label.append_child(&input).map_err(js_err)?;
    root.append_child(&label).map_err(js_err)?;
    Ok(input)
}
