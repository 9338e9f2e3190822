//! Event sources
//!
//! The windowing backend is a collaborator behind [`EventSource`]; the
//! scripted source replays canned frames for headless runs and tests.

use std::collections::{BTreeSet, VecDeque};

use serde::{Deserialize, Serialize};

use super::input::{Key, RawEvent};

/// Delivers one batch of raw events per frame
pub trait EventSource {
    fn poll(&mut self) -> Vec<RawEvent>;
}

/// One segment of a scripted session: hold `keys` for `frames` frames
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptStep {
    pub frames: u32,
    #[serde(default)]
    pub keys: Vec<Key>,
}

/// Replays per-frame batches, then reports quit forever
#[derive(Debug, Clone, Default)]
pub struct ScriptedSource {
    frames: VecDeque<Vec<RawEvent>>,
}

impl ScriptedSource {
    pub fn new(frames: impl IntoIterator<Item = Vec<RawEvent>>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
        }
    }

    /// Build key down/up transitions from held-key steps
    pub fn from_steps(steps: &[ScriptStep]) -> Self {
        let mut frames = Vec::new();
        let mut held: BTreeSet<Key> = BTreeSet::new();

        for step in steps.iter().filter(|s| s.frames > 0) {
            let wanted: BTreeSet<Key> = step.keys.iter().copied().collect();
            let mut first = Vec::new();
            for &key in held.difference(&wanted) {
                first.push(RawEvent::KeyUp { key, mods: 0 });
            }
            for &key in wanted.difference(&held) {
                first.push(RawEvent::KeyDown { key, mods: 0 });
            }
            frames.push(first);
            frames.extend((1..step.frames).map(|_| Vec::new()));
            held = wanted;
        }

        Self::new(frames)
    }

    /// Frames left before the source starts reporting quit
    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl EventSource for ScriptedSource {
    fn poll(&mut self) -> Vec<RawEvent> {
        self.frames.pop_front().unwrap_or_else(|| vec![RawEvent::Quit])
    }
}
