//! Echoloc - a 2D echolocation simulation
//!
//! The player emits expanding pulses; hidden objects stay invisible except
//! where a pulse's leading edge sweeps across them.
//!
//! Core modules:
//! - `sim`: Geometry, coordinate transform, entities, frame driver
//! - `renderer`: Software raster and presentation canvas
//! - `platform`: Input events, event sources, frame timing
//! - `settings`: JSON configuration
//! - `resources`: Named asset lookup

pub mod app;
pub mod platform;
pub mod renderer;
pub mod resources;
pub mod settings;
pub mod sim;

pub use app::{App, SessionSummary};
pub use settings::Settings;

/// Frame loop constants
pub mod consts {
    /// Longest frame delta fed to the simulation (ms)
    pub const MAX_FRAME_MS: f32 = 100.0;
}
