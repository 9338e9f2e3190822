//! Event pump: raw platform events to per-frame input snapshots
//!
//! Window events (quit, resize) are split off; everything else is grouped
//! by kind, and compound events are synthesized from the held-key and
//! held-button state carried across frames:
//! - key press: key down then key up of a held key
//! - mouse click: button down then button up of a held button
//! - mouse drag: one per held button for every motion event

use std::collections::{BTreeMap, BTreeSet};

use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};

/// Key codes in the platform's key space
pub mod keycode {
    pub const ESCAPE: u32 = 27;
    pub const UP: u32 = 273;
    pub const DOWN: u32 = 274;
    pub const RIGHT: u32 = 275;
    pub const LEFT: u32 = 276;
}

/// A keyboard key
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    Escape,
    Other(u32),
}

impl Key {
    pub fn from_code(code: u32) -> Self {
        match code {
            keycode::UP => Key::Up,
            keycode::DOWN => Key::Down,
            keycode::RIGHT => Key::Right,
            keycode::LEFT => Key::Left,
            keycode::ESCAPE => Key::Escape,
            other => Key::Other(other),
        }
    }

    pub fn code(self) -> u32 {
        match self {
            Key::Up => keycode::UP,
            Key::Down => keycode::DOWN,
            Key::Right => keycode::RIGHT,
            Key::Left => keycode::LEFT,
            Key::Escape => keycode::ESCAPE,
            Key::Other(code) => code,
        }
    }

    /// World-space unit direction for arrow keys
    pub fn direction(self) -> Option<Vec2> {
        match self {
            Key::Up => Some(Vec2::Y),
            Key::Down => Some(Vec2::NEG_Y),
            Key::Right => Some(Vec2::X),
            Key::Left => Some(Vec2::NEG_X),
            _ => None,
        }
    }
}

/// Modifier flags as reported by the platform
pub type Modifiers = u16;

/// Mouse button index (1 = left)
pub type MouseButton = u8;

/// Events straight from the platform
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum RawEvent {
    KeyDown { key: Key, mods: Modifiers },
    KeyUp { key: Key, mods: Modifiers },
    MouseDown { button: MouseButton, pos: IVec2 },
    MouseUp { button: MouseButton, pos: IVec2 },
    MouseMotion { pos: IVec2, rel: IVec2 },
    Resize { width: u32, height: u32 },
    Quit,
}

/// Game-facing event category
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EventKind {
    KeyDown,
    KeyUp,
    MouseDown,
    MouseUp,
    MouseMotion,
    KeyPress,
    MouseClick,
    MouseDrag,
}

/// Game-facing event, raw or compound
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    KeyDown { key: Key, mods: Modifiers },
    KeyUp { key: Key, mods: Modifiers },
    MouseDown { button: MouseButton, pos: IVec2 },
    MouseUp { button: MouseButton, pos: IVec2 },
    MouseMotion { pos: IVec2, rel: IVec2 },
    KeyPress { key: Key, mods: Modifiers },
    MouseClick { button: MouseButton, pos: IVec2 },
    MouseDrag {
        button: MouseButton,
        pos: IVec2,
        rel: IVec2,
    },
}

impl InputEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            InputEvent::KeyDown { .. } => EventKind::KeyDown,
            InputEvent::KeyUp { .. } => EventKind::KeyUp,
            InputEvent::MouseDown { .. } => EventKind::MouseDown,
            InputEvent::MouseUp { .. } => EventKind::MouseUp,
            InputEvent::MouseMotion { .. } => EventKind::MouseMotion,
            InputEvent::KeyPress { .. } => EventKind::KeyPress,
            InputEvent::MouseClick { .. } => EventKind::MouseClick,
            InputEvent::MouseDrag { .. } => EventKind::MouseDrag,
        }
    }
}

/// Immutable input snapshot for one frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameInput {
    events: BTreeMap<EventKind, Vec<InputEvent>>,
    keys_held: BTreeSet<Key>,
    buttons_held: BTreeSet<MouseButton>,
    /// Last resize requested this frame
    pub resize: Option<(u32, u32)>,
    /// Quit or escape release seen this frame
    pub quit: bool,
}

impl FrameInput {
    /// Snapshot with only held keys (no events)
    pub fn with_keys_held(keys: impl IntoIterator<Item = Key>) -> Self {
        Self {
            keys_held: keys.into_iter().collect(),
            ..Default::default()
        }
    }

    /// Events of one kind in arrival order
    pub fn events(&self, kind: EventKind) -> &[InputEvent] {
        self.events.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn keys_held(&self) -> &BTreeSet<Key> {
        &self.keys_held
    }

    pub fn buttons_held(&self) -> &BTreeSet<MouseButton> {
        &self.buttons_held
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.keys_held.contains(&key)
    }

    /// Normalized movement direction from the held arrow keys
    pub fn direction(&self) -> Vec2 {
        self.keys_held
            .iter()
            .filter_map(|k| k.direction())
            .sum::<Vec2>()
            .normalize_or_zero()
    }

    fn push(&mut self, event: InputEvent) {
        self.events.entry(event.kind()).or_default().push(event);
    }
}

/// Stateful translator from raw events to [`FrameInput`]
#[derive(Debug, Clone, Default)]
pub struct EventPump {
    keys_down: BTreeSet<Key>,
    buttons_down: BTreeSet<MouseButton>,
}

impl EventPump {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process one frame's batch of raw events
    pub fn process(&mut self, raw: impl IntoIterator<Item = RawEvent>) -> FrameInput {
        let mut input = FrameInput::default();

        for event in raw {
            match event {
                RawEvent::Quit => input.quit = true,
                RawEvent::Resize { width, height } => input.resize = Some((width, height)),
                RawEvent::KeyDown { key, mods } => {
                    self.keys_down.insert(key);
                    input.push(InputEvent::KeyDown { key, mods });
                }
                RawEvent::KeyUp { key, mods } => {
                    input.push(InputEvent::KeyUp { key, mods });
                    if self.keys_down.remove(&key) {
                        if key == Key::Escape {
                            input.quit = true;
                        }
                        input.push(InputEvent::KeyPress { key, mods });
                    }
                }
                RawEvent::MouseDown { button, pos } => {
                    self.buttons_down.insert(button);
                    input.push(InputEvent::MouseDown { button, pos });
                }
                RawEvent::MouseUp { button, pos } => {
                    input.push(InputEvent::MouseUp { button, pos });
                    if self.buttons_down.remove(&button) {
                        input.push(InputEvent::MouseClick { button, pos });
                    }
                }
                RawEvent::MouseMotion { pos, rel } => {
                    input.push(InputEvent::MouseMotion { pos, rel });
                    for &button in &self.buttons_down {
                        input.push(InputEvent::MouseDrag { button, pos, rel });
                    }
                }
            }
        }

        input.keys_held = self.keys_down.clone();
        input.buttons_held = self.buttons_down.clone();
        input
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_codes() {
        assert_eq!(Key::from_code(273), Key::Up);
        assert_eq!(Key::from_code(274), Key::Down);
        assert_eq!(Key::from_code(275), Key::Right);
        assert_eq!(Key::from_code(276), Key::Left);
        assert_eq!(Key::from_code(27), Key::Escape);
        assert_eq!(Key::from_code(32), Key::Other(32));
        assert_eq!(Key::Other(32).code(), 32);
    }

    fn key_down(key: Key) -> RawEvent {
        RawEvent::KeyDown { key, mods: 0 }
    }

    fn key_up(key: Key, mods: Modifiers) -> RawEvent {
        RawEvent::KeyUp { key, mods }
    }

    #[test]
    fn test_keypress_spans_frames() {
        let mut pump = EventPump::new();
        let down = pump.process([key_down(Key::Up)]);
        assert!(down.is_held(Key::Up));
        assert!(down.events(EventKind::KeyPress).is_empty());

        let up = pump.process([key_up(Key::Up, 1)]);
        assert!(!up.is_held(Key::Up));
        assert_eq!(
            up.events(EventKind::KeyPress),
            &[InputEvent::KeyPress {
                key: Key::Up,
                mods: 1,
            }]
        );
    }

    #[test]
    fn test_keyup_without_keydown_is_not_a_press() {
        let mut pump = EventPump::new();
        let input = pump.process([key_up(Key::Left, 0)]);
        assert_eq!(input.events(EventKind::KeyUp).len(), 1);
        assert!(input.events(EventKind::KeyPress).is_empty());
    }

    #[test]
    fn test_escape_release_quits() {
        let mut pump = EventPump::new();
        let input = pump.process([key_down(Key::Escape), key_up(Key::Escape, 0)]);
        assert!(input.quit);
    }

    #[test]
    fn test_window_events_are_split_off() {
        let mut pump = EventPump::new();
        let input = pump.process([
            RawEvent::Resize {
                width: 640,
                height: 480,
            },
            RawEvent::Resize {
                width: 1024,
                height: 768,
            },
            RawEvent::Quit,
        ]);
        assert_eq!(input.resize, Some((1024, 768)));
        assert!(input.quit);
        assert!(input.events(EventKind::KeyDown).is_empty());
    }

    #[test]
    fn test_click_and_drag() {
        let mut pump = EventPump::new();
        let at = IVec2::new(12, 11);
        let input = pump.process([
            RawEvent::MouseDown {
                button: 1,
                pos: IVec2::new(10, 10),
            },
            RawEvent::MouseMotion {
                pos: at,
                rel: IVec2::new(2, 1),
            },
            RawEvent::MouseUp { button: 1, pos: at },
            RawEvent::MouseMotion {
                pos: IVec2::new(13, 11),
                rel: IVec2::X,
            },
        ]);
        assert_eq!(
            input.events(EventKind::MouseDrag),
            &[InputEvent::MouseDrag {
                button: 1,
                pos: at,
                rel: IVec2::new(2, 1),
            }]
        );
        assert_eq!(
            input.events(EventKind::MouseClick),
            &[InputEvent::MouseClick { button: 1, pos: at }]
        );
        assert_eq!(input.events(EventKind::MouseMotion).len(), 2);
        assert!(input.buttons_held().is_empty());
    }

    #[test]
    fn test_direction_is_normalized() {
        let input = FrameInput::with_keys_held([Key::Up, Key::Left]);
        let dir = input.direction();
        assert!((dir.length() - 1.0).abs() < 1e-6);
        assert!(dir.x < 0.0 && dir.y > 0.0);

        let opposed = FrameInput::with_keys_held([Key::Up, Key::Down]);
        assert_eq!(opposed.direction(), Vec2::ZERO);
    }
}
