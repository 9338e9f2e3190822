//! Platform abstraction layer
//!
//! Handles the collaborators around the simulation:
//! - Input events (raw batches to per-frame snapshots)
//! - Event sources
//! - Frame timing

pub mod clock;
pub mod input;
pub mod source;

pub use clock::FrameClock;
pub use input::{EventKind, EventPump, FrameInput, InputEvent, Key, MouseButton, RawEvent};
pub use source::{EventSource, ScriptStep, ScriptedSource};
