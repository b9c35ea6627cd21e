//! The UI protocol: custom events from the host, per-frame events back, the
//! click-versus-drag tracker and the info-panel payload.

use glam::Vec2;
use serde::Serialize;
use orrery_engine::GameEvent;

use crate::bodies::{body_from_wire, body_name, BodyIndex};
use crate::camera_rig::CameraMode;
use crate::facts::{FactRegistry, FactSheet};

// ── Custom event kinds from the host ─────────────────────────────────

pub const CUSTOM_SET_TIME_SCALE: u32 = 1;
pub const CUSTOM_TOGGLE_PAUSE: u32 = 2;
pub const CUSTOM_RESET_VIEW: u32 = 3;
pub const CUSTOM_SHOW_ORBITS: u32 = 4;
pub const CUSTOM_REALISTIC_SCALE: u32 = 5;
pub const CUSTOM_CAMERA_MODE: u32 = 6;
pub const CUSTOM_FOCUS: u32 = 7;
pub const CUSTOM_UNLOCK: u32 = 8;
pub const CUSTOM_ZOOM: u32 = 9;
/// Viewport resize (sent by the worker as kind=99).
pub const CUSTOM_RESIZE: u32 = 99;

// ── Game event kinds to the host ─────────────────────────────────────

pub const EVENT_TIME: f32 = 1.0;
pub const EVENT_SELECTION: f32 = 2.0;
pub const EVENT_DISPLAY: f32 = 3.0;
pub const EVENT_LABEL: f32 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UiCommand {
    SetTimeScale(f32),
    TogglePause,
    ResetView,
    ShowOrbits(bool),
    RealisticScale(bool),
    CameraMode(CameraMode),
    Focus(BodyIndex),
    Unlock,
    Zoom(f32),
    Resize { width: f32, height: f32 },
}

impl UiCommand {
    /// Decode a custom event. Unknown kinds and bad payloads are logged and dropped.
    pub fn from_custom(kind: u32, a: f32, b: f32) -> Option<Self> {
        let command = match kind {
            CUSTOM_SET_TIME_SCALE if a.is_finite() => Self::SetTimeScale(a),
            CUSTOM_TOGGLE_PAUSE => Self::TogglePause,
            CUSTOM_RESET_VIEW => Self::ResetView,
            CUSTOM_SHOW_ORBITS => Self::ShowOrbits(a > 0.5),
            CUSTOM_REALISTIC_SCALE => Self::RealisticScale(a > 0.5),
            CUSTOM_CAMERA_MODE => match CameraMode::from_wire(a) {
                Some(mode) => Self::CameraMode(mode),
                None => {
                    log::warn!("ui: unknown camera mode {}", a);
                    return None;
                }
            },
            CUSTOM_FOCUS => match body_from_wire(a) {
                Some(body) => Self::Focus(body),
                None => {
                    log::warn!("ui: no body with index {}", a);
                    return None;
                }
            },
            CUSTOM_UNLOCK => Self::Unlock,
            CUSTOM_ZOOM if a.is_finite() => Self::Zoom(a),
            CUSTOM_RESIZE => Self::Resize { width: a, height: b },
            _ => {
                log::warn!("ui: ignoring custom event {} ({}, {})", kind, a, b);
                return None;
            }
        };
        Some(command)
    }
}

/// Display toggles and the current selection.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct UiState {
    pub selected: Option<BodyIndex>,
    pub show_orbits: bool,
    pub realistic_scale: bool,
}

fn flag(on: bool) -> f32 {
    if on { 1.0 } else { 0.0 }
}

fn index_or_none(index: Option<BodyIndex>) -> f32 {
    index.map_or(-1.0, |i| i as f32)
}

pub fn time_event(time_scale: f32, paused: bool, mode: CameraMode) -> GameEvent {
    GameEvent::new(EVENT_TIME, time_scale, flag(paused), mode.as_wire())
}

pub fn selection_event(selected: Option<BodyIndex>, focus: Option<BodyIndex>) -> GameEvent {
    GameEvent::new(
        EVENT_SELECTION,
        index_or_none(selected),
        flag(focus.is_some()),
        index_or_none(focus),
    )
}

pub fn display_event(state: &UiState) -> GameEvent {
    GameEvent::new(EVENT_DISPLAY, flag(state.show_orbits), flag(state.realistic_scale), 0.0)
}

pub fn label_event(body: BodyIndex, screen: Vec2) -> GameEvent {
    GameEvent::new(EVENT_LABEL, body as f32, screen.x, screen.y)
}

// ── Pointer ──────────────────────────────────────────────────────────

/// Presses that travel less than this before release count as clicks.
pub const CLICK_THRESHOLD_PX: f32 = 5.0;

/// Splits a pointer press into either a click or a drag.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ClickTracker {
    pressed_at: Option<Vec2>,
    last: Vec2,
    dragging: bool,
}

impl ClickTracker {
    pub fn down(&mut self, pos: Vec2) {
        self.pressed_at = Some(pos);
        self.last = pos;
        self.dragging = false;
    }

    /// Drag delta since the last move, once the press has become a drag.
    pub fn moved(&mut self, pos: Vec2) -> Option<Vec2> {
        let start = self.pressed_at?;
        if !self.dragging {
            if pos.distance(start) < CLICK_THRESHOLD_PX {
                return None;
            }
            self.dragging = true;
        }
        let delta = pos - self.last;
        self.last = pos;
        Some(delta)
    }

    /// Click position, if this release ends a press that never became a drag.
    pub fn up(&mut self, pos: Vec2) -> Option<Vec2> {
        let start = self.pressed_at.take()?;
        let was_drag = std::mem::take(&mut self.dragging);
        (!was_drag && pos.distance(start) < CLICK_THRESHOLD_PX).then_some(pos)
    }
}

// ── Info panel ───────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct InfoPanel<'a> {
    index: BodyIndex,
    name: &'static str,
    #[serde(flatten)]
    facts: &'a FactSheet,
    /// The camera is locked on this body ("Stop Following").
    focused: bool,
}

/// Info-panel JSON for a body, or `None` when it has no fact sheet.
pub fn info_panel_json(body: BodyIndex, facts: &FactRegistry, focused: bool) -> Option<String> {
    let name = body_name(body)?;
    let sheet = facts.get(name)?;
    let panel = InfoPanel { index: body, name, facts: sheet, focused };
    match serde_json::to_string(&panel) {
        Ok(json) => Some(json),
        Err(e) => {
            log::warn!("ui: could not serialize info panel for {}: {}", name, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_commands() {
        assert_eq!(UiCommand::from_custom(1, 2.5, 0.0), Some(UiCommand::SetTimeScale(2.5)));
        assert_eq!(UiCommand::from_custom(4, 0.0, 0.0), Some(UiCommand::ShowOrbits(false)));
        assert_eq!(UiCommand::from_custom(5, 1.0, 0.0), Some(UiCommand::RealisticScale(true)));
        assert_eq!(
            UiCommand::from_custom(6, 2.0, 0.0),
            Some(UiCommand::CameraMode(CameraMode::Cinematic))
        );
        assert_eq!(UiCommand::from_custom(7, 6.0, 0.0), Some(UiCommand::Focus(6)));
        assert_eq!(UiCommand::from_custom(9, -2.0, 0.0), Some(UiCommand::Zoom(-2.0)));
        assert_eq!(
            UiCommand::from_custom(99, 1920.0, 1080.0),
            Some(UiCommand::Resize { width: 1920.0, height: 1080.0 })
        );
    }

    #[test]
    fn rejects_bad_payloads() {
        assert_eq!(UiCommand::from_custom(6, 7.0, 0.0), None);
        assert_eq!(UiCommand::from_custom(7, 12.0, 0.0), None);
        assert_eq!(UiCommand::from_custom(7, -1.0, 0.0), None);
        assert_eq!(UiCommand::from_custom(1, f32::NAN, 0.0), None);
        assert_eq!(UiCommand::from_custom(42, 0.0, 0.0), None);
    }

    #[test]
    fn outbound_events() {
        let e = time_event(1.5, true, CameraMode::Top);
        assert_eq!((e.kind, e.a, e.b, e.c), (1.0, 1.5, 1.0, 1.0));

        let e = selection_event(None, None);
        assert_eq!((e.kind, e.a, e.b, e.c), (2.0, -1.0, 0.0, -1.0));
        let e = selection_event(Some(3), Some(3));
        assert_eq!((e.a, e.b, e.c), (3.0, 1.0, 3.0));

        let state = UiState { selected: None, show_orbits: true, realistic_scale: false };
        let e = display_event(&state);
        assert_eq!((e.kind, e.a, e.b), (3.0, 1.0, 0.0));

        let e = label_event(9, Vec2::new(10.0, 20.0));
        assert_eq!((e.kind, e.a, e.b, e.c), (4.0, 9.0, 10.0, 20.0));
    }

    #[test]
    fn short_press_is_a_click() {
        let mut pointer = ClickTracker::default();
        pointer.down(Vec2::new(100.0, 100.0));
        assert_eq!(pointer.moved(Vec2::new(102.0, 101.0)), None);
        assert_eq!(pointer.up(Vec2::new(103.0, 101.0)), Some(Vec2::new(103.0, 101.0)));
        // A release without a press is nothing.
        assert_eq!(pointer.up(Vec2::new(103.0, 101.0)), None);
    }

    #[test]
    fn long_move_is_a_drag() {
        let mut pointer = ClickTracker::default();
        pointer.down(Vec2::new(100.0, 100.0));
        assert_eq!(pointer.moved(Vec2::new(110.0, 100.0)), Some(Vec2::new(10.0, 0.0)));
        assert_eq!(pointer.moved(Vec2::new(112.0, 97.0)), Some(Vec2::new(2.0, -3.0)));
        // Returning near the start does not turn it back into a click.
        assert_eq!(pointer.up(Vec2::new(101.0, 100.0)), None);
        // The next press starts fresh.
        pointer.down(Vec2::new(50.0, 50.0));
        assert_eq!(pointer.up(Vec2::new(51.0, 50.0)), Some(Vec2::new(51.0, 50.0)));
        // Moves without a press do nothing.
        assert_eq!(pointer.moved(Vec2::new(300.0, 300.0)), None);
    }

    #[test]
    fn info_panel_flattens_facts() {
        let facts = FactRegistry::load().unwrap();
        let json = info_panel_json(3, &facts, true).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["name"], "Earth");
        assert_eq!(value["index"], 3);
        assert_eq!(value["dayLength"], "24 hours");
        assert_eq!(value["moons"], 1);
        assert_eq!(value["focused"], true);

        assert!(info_panel_json(12, &facts, false).is_none());
        assert!(info_panel_json(0, &FactRegistry::default(), false).is_none());
    }
}
