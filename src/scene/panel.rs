//! Debug panel: six live controls over lighting and floor parameters.
//!
//! [`DebugPanel`] owns the parameter values and the edit rules (range clamping and step
//! snapping). Input reaches it as [`PanelEvent`]s, either from the keyboard or, in the
//! browser, from the DOM widgets built by `panel_web`.

use cgmath::Point3;
use winit::keyboard::{Key, NamedKey};

use crate::config::SceneConfig;

/// Values the panel edits. Written into the scene whenever they change.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneParams {
    pub displacement_scale: f32,
    pub light_position: Point3<f32>,
    pub light_intensity: f32,
    pub color: [u8; 3],
}

impl SceneParams {
    pub fn from_config(config: &SceneConfig) -> Self {
        let p = config.lighting.directional_position;
        Self {
            displacement_scale: config.floor.displacement_scale,
            light_position: Point3::new(p.x, p.y, p.z),
            light_intensity: config.lighting.directional_intensity,
            color: [0xff, 0x00, 0x00],
        }
    }

    /// Current value of a numeric control. `None` for the colour picker.
    pub fn value(&self, id: ControlId) -> Option<f32> {
        match id {
            ControlId::DisplacementScale => Some(self.displacement_scale),
            ControlId::LightX => Some(self.light_position.x),
            ControlId::LightIntensity => Some(self.light_intensity),
            ControlId::LightY => Some(self.light_position.y),
            ControlId::LightZ => Some(self.light_position.z),
            ControlId::Color => None,
        }
    }

    fn set(&mut self, id: ControlId, value: f32) {
        match id {
            ControlId::DisplacementScale => self.displacement_scale = value,
            ControlId::LightX => self.light_position.x = value,
            ControlId::LightIntensity => self.light_intensity = value,
            ControlId::LightY => self.light_position.y = value,
            ControlId::LightZ => self.light_position.z = value,
            ControlId::Color => (),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ControlId {
    DisplacementScale,
    LightX,
    LightIntensity,
    LightY,
    LightZ,
    Color,
}

impl ControlId {
    pub fn affects_light(self) -> bool {
        matches!(
            self,
            Self::LightX | Self::LightIntensity | Self::LightY | Self::LightZ
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ControlKind {
    Slider { min: f32, max: f32, step: f32 },
    Color,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Control {
    pub id: ControlId,
    pub label: &'static str,
    pub kind: ControlKind,
}

const POSITION: ControlKind = ControlKind::Slider {
    min: 0.5,
    max: 10.0,
    step: 0.001,
};

/// Controls in panel order.
pub static CONTROLS: [Control; 6] = [
    Control {
        id: ControlId::DisplacementScale,
        label: "displacementScale",
        kind: ControlKind::Slider {
            min: 5.0,
            max: 20.0,
            step: 0.001,
        },
    },
    Control {
        id: ControlId::LightX,
        label: "x",
        kind: POSITION,
    },
    Control {
        id: ControlId::LightIntensity,
        label: "intensity",
        kind: ControlKind::Slider {
            min: 0.5,
            max: 2.0,
            step: 0.001,
        },
    },
    Control {
        id: ControlId::LightY,
        label: "y",
        kind: POSITION,
    },
    Control {
        id: ControlId::LightZ,
        label: "z",
        kind: POSITION,
    },
    Control {
        id: ControlId::Color,
        label: "color",
        kind: ControlKind::Color,
    },
];

pub fn control(id: ControlId) -> &'static Control {
    CONTROLS
        .iter()
        .find(|control| control.id == id)
        .unwrap_or(&CONTROLS[0])
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PanelEvent {
    Slider { id: ControlId, value: f32 },
    Color([u8; 3]),
}

/// Clamp to `[min, max]` and round to the nearest multiple of `step`.
pub fn snap(value: f32, min: f32, max: f32, step: f32) -> f32 {
    let clamped = value.clamp(min, max);
    if step <= 0.0 {
        return clamped;
    }
    ((clamped / step).round() * step).clamp(min, max)
}

/// `#rrggbb` or `rrggbb`.
pub fn parse_hex_color(text: &str) -> anyhow::Result<[u8; 3]> {
    let hex = text.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        anyhow::bail!("{text:?} is not a #rrggbb colour");
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16);
    Ok([channel(0)?, channel(2)?, channel(4)?])
}

pub fn to_hex_color(rgb: [u8; 3]) -> String {
    format!("#{:02x}{:02x}{:02x}", rgb[0], rgb[1], rgb[2])
}

/// Colours the keyboard frontend cycles through with `C`.
const PALETTE: [[u8; 3]; 4] = [
    [0xff, 0x00, 0x00],
    [0xff, 0xff, 0xff],
    [0xff, 0xa0, 0x40],
    [0x60, 0x80, 0xff],
];

/// Keyboard nudges move a slider by this many steps, or ten times as many with shift.
const NUDGE_STEPS: f32 = 100.0;

#[derive(Debug)]
pub struct DebugPanel {
    pub params: SceneParams,
    selected: usize,
    palette_index: usize,
}

impl DebugPanel {
    pub fn new(params: SceneParams) -> Self {
        Self {
            params,
            selected: 0,
            palette_index: 0,
        }
    }

    pub fn selected(&self) -> &'static Control {
        &CONTROLS[self.selected]
    }

    /// Apply an edit. Returns the control that changed, if any.
    pub fn apply(&mut self, event: PanelEvent) -> Option<ControlId> {
        match event {
            PanelEvent::Slider { id, value } => {
                let ControlKind::Slider { min, max, step } = control(id).kind else {
                    return None;
                };
                if !value.is_finite() {
                    log::warn!("ignoring {value} for {id:?}");
                    return None;
                }
                let value = snap(value, min, max, step);
                if self.params.value(id) == Some(value) {
                    return None;
                }
                self.params.set(id, value);
                log::info!("{} = {value}", control(id).label);
                Some(id)
            }
            PanelEvent::Color(rgb) => {
                if self.params.color == rgb {
                    return None;
                }
                self.params.color = rgb;
                log::info!("color = {}", to_hex_color(rgb));
                Some(ControlId::Color)
            }
        }
    }

    /// Translate a key press into an edit. `Tab` only changes the selection.
    pub fn handle_key(&mut self, key: &Key, shift: bool) -> Option<PanelEvent> {
        match key {
            Key::Named(NamedKey::Tab) => {
                self.selected = (self.selected + 1) % CONTROLS.len();
                log::info!("panel: {} selected", self.selected().label);
                None
            }
            Key::Named(direction @ (NamedKey::ArrowLeft | NamedKey::ArrowRight)) => {
                let control = self.selected();
                let ControlKind::Slider { step, .. } = control.kind else {
                    return None;
                };
                let steps = if shift { NUDGE_STEPS * 10.0 } else { NUDGE_STEPS };
                let sign = if *direction == NamedKey::ArrowLeft { -1.0 } else { 1.0 };
                let value = self.params.value(control.id)? + sign * steps * step;
                Some(PanelEvent::Slider {
                    id: control.id,
                    value,
                })
            }
            Key::Character(c) if c.eq_ignore_ascii_case("c") => {
                self.palette_index = (self.palette_index + 1) % PALETTE.len();
                Some(PanelEvent::Color(PALETTE[self.palette_index]))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn panel() -> DebugPanel {
        DebugPanel::new(SceneParams::from_config(&SceneConfig::default()))
    }

    #[test]
    fn starts_from_the_scene_values() {
        let panel = panel();
        assert_eq!(panel.params.displacement_scale, 20.0);
        assert_eq!(panel.params.light_position, Point3::new(20.0, 20.0, -25.0));
        assert_eq!(panel.params.light_intensity, 0.6);
        assert_eq!(to_hex_color(panel.params.color), "#ff0000");
    }

    #[test]
    fn edits_are_clamped_and_snapped() {
        let mut panel = panel();
        let changed = panel.apply(PanelEvent::Slider {
            id: ControlId::LightX,
            value: 42.0,
        });
        assert_eq!(changed, Some(ControlId::LightX));
        assert_eq!(panel.params.light_position.x, 10.0);

        panel.apply(PanelEvent::Slider {
            id: ControlId::DisplacementScale,
            value: 7.12345,
        });
        assert!((panel.params.displacement_scale - 7.123).abs() < 1e-4);

        panel.apply(PanelEvent::Slider {
            id: ControlId::LightIntensity,
            value: 0.0,
        });
        assert_eq!(panel.params.light_intensity, 0.5);
        // untouched values stay outside their range
        assert_eq!(panel.params.light_position.z, -25.0);
    }

    #[test]
    fn unchanged_values_report_nothing() {
        let mut panel = panel();
        assert_eq!(panel.apply(PanelEvent::Color([0xff, 0, 0])), None);
        assert_eq!(
            panel.apply(PanelEvent::Slider {
                id: ControlId::DisplacementScale,
                value: 20.0
            }),
            None
        );
        assert_eq!(
            panel.apply(PanelEvent::Slider {
                id: ControlId::Color,
                value: 1.0
            }),
            None
        );
    }

    #[test]
    fn keyboard_selects_and_nudges() {
        let mut panel = panel();
        assert_eq!(panel.handle_key(&Key::Named(NamedKey::Tab), false), None);
        assert_eq!(panel.selected().id, ControlId::LightX);

        let event = panel
            .handle_key(&Key::Named(NamedKey::ArrowLeft), false)
            .unwrap();
        assert_eq!(panel.apply(event), Some(ControlId::LightX));
        // 20 - 0.1 is still clamped to the slider's maximum
        assert_eq!(panel.params.light_position.x, 10.0);

        let event = panel
            .handle_key(&Key::Named(NamedKey::ArrowLeft), true)
            .unwrap();
        panel.apply(event);
        assert!((panel.params.light_position.x - 9.0).abs() < 1e-4);
    }

    #[test]
    fn colour_key_cycles_the_palette() {
        let mut panel = panel();
        let event = panel.handle_key(&Key::Character("c".into()), false);
        assert_eq!(event, Some(PanelEvent::Color([0xff, 0xff, 0xff])));
        assert_eq!(panel.apply(event.unwrap()), Some(ControlId::Color));
        for _ in 0..3 {
            panel.handle_key(&Key::Character("C".into()), false);
        }
        assert_eq!(panel.handle_key(&Key::Named(NamedKey::Escape), false), None);
    }

    #[test]
    fn hex_colours() {
        assert_eq!(parse_hex_color("#ff8000").unwrap(), [0xff, 0x80, 0x00]);
        assert_eq!(parse_hex_color("00ff7f").unwrap(), [0x00, 0xff, 0x7f]);
        assert!(parse_hex_color("#fff").is_err());
        assert!(parse_hex_color("#gg0000").is_err());
        assert_eq!(to_hex_color([1, 2, 255]), "#0102ff");
    }
}
