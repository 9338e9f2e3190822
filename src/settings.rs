//! Simulation settings
//!
//! Loaded from `echoloc.json` in the working directory when present. Every
//! field has a default, so partial files are fine.

use std::path::{Path, PathBuf};

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::platform::{Key, ScriptStep};
use crate::renderer::Rgba;
use crate::sim::EchoStyle;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid settings in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Display and presentation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    pub width: u32,
    pub height: u32,
    pub background: Rgba,
    /// Image resource scaled to fill the display (overrides `background`)
    pub background_image: Option<String>,
    /// Draw invisible entities and hidden-object silhouettes
    pub debug: bool,
    pub target_fps: u32,
    /// Write the final frame here as a PNG
    pub snapshot: Option<PathBuf>,
    /// Root of the `images/` and `sounds/` asset directories
    pub assets_dir: PathBuf,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            background: Rgba::rgb(64, 64, 64),
            background_image: None,
            debug: false,
            target_fps: 60,
            snapshot: None,
            assets_dir: PathBuf::from("assets"),
        }
    }
}

/// The pulse emitter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerSettings {
    pub start: Vec2,
    pub radius: f32,
    /// World units per second
    pub speed: f32,
    /// Pulses per second
    pub pulse_frequency: f32,
    /// Pulse growth in world units per second
    pub pulse_speed: f32,
    pub colour: Rgba,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            start: Vec2::ZERO,
            radius: 0.02,
            speed: 0.5,
            pulse_frequency: 1.0,
            pulse_speed: 0.4,
            colour: Rgba::rgb(90, 160, 255),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PulseSettings {
    /// Radius at which a pulse is spent and removed
    pub max_radius: f32,
    pub colour: Rgba,
}

impl Default for PulseSettings {
    fn default() -> Self {
        Self {
            max_radius: 3.0,
            colour: Rgba::WHITE,
        }
    }
}

/// One hidden object placed by hand
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectSpec {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    #[serde(default = "default_object_colour")]
    pub colour: Rgba,
}

fn default_object_colour() -> Rgba {
    Rgba::rgb(255, 64, 64)
}

/// Deterministic random placement of extra hidden objects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScatterSettings {
    pub count: u32,
    pub seed: u64,
    pub min_radius: f32,
    pub max_radius: f32,
}

impl Default for ScatterSettings {
    fn default() -> Self {
        Self {
            count: 0,
            seed: 1,
            min_radius: 0.03,
            max_radius: 0.12,
        }
    }
}

impl ScatterSettings {
    /// Object specs inside the view for the given aspect ratio; the same
    /// seed always yields the same layout
    pub fn generate(&self, aspect_ratio: f32) -> Vec<ObjectSpec> {
        let mut rng = Pcg32::seed_from_u64(self.seed);
        let half_height = 1.0 / aspect_ratio.max(f32::EPSILON);
        let (lo, hi) = if self.min_radius <= self.max_radius {
            (self.min_radius, self.max_radius)
        } else {
            (self.max_radius, self.min_radius)
        };

        (0..self.count)
            .map(|_| {
                let radius = if hi > lo { rng.random_range(lo..hi) } else { lo };
                let x_span = (1.0 - radius).max(0.0);
                let y_span = (half_height - radius).max(0.0);
                let x = if x_span > 0.0 { rng.random_range(-x_span..x_span) } else { 0.0 };
                let y = if y_span > 0.0 { rng.random_range(-y_span..y_span) } else { 0.0 };
                let colour = Rgba::rgb(
                    rng.random_range(128..=255),
                    rng.random_range(64..=255),
                    rng.random_range(64..=255),
                );
                ObjectSpec {
                    x,
                    y,
                    radius,
                    colour,
                }
            })
            .collect()
    }
}

/// Headless session script
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoSettings {
    pub script: Vec<ScriptStep>,
}

impl Default for DemoSettings {
    fn default() -> Self {
        Self {
            script: vec![
                ScriptStep {
                    frames: 90,
                    keys: vec![],
                },
                ScriptStep {
                    frames: 60,
                    keys: vec![Key::Right],
                },
                ScriptStep {
                    frames: 60,
                    keys: vec![Key::Up, Key::Left],
                },
                ScriptStep {
                    frames: 90,
                    keys: vec![],
                },
            ],
        }
    }
}

/// All settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub display: DisplaySettings,
    pub player: PlayerSettings,
    pub pulse: PulseSettings,
    pub echo: EchoStyle,
    pub objects: Vec<ObjectSpec>,
    pub scatter: ScatterSettings,
    pub demo: DemoSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            display: DisplaySettings::default(),
            player: PlayerSettings::default(),
            pulse: PulseSettings::default(),
            echo: EchoStyle::default(),
            objects: vec![
                ObjectSpec {
                    x: 0.45,
                    y: 0.2,
                    radius: 0.1,
                    colour: Rgba::rgb(255, 64, 64),
                },
                ObjectSpec {
                    x: -0.5,
                    y: -0.3,
                    radius: 0.15,
                    colour: Rgba::rgb(64, 255, 128),
                },
                ObjectSpec {
                    x: 0.1,
                    y: -0.45,
                    radius: 0.06,
                    colour: Rgba::rgb(255, 220, 64),
                },
            ],
            scatter: ScatterSettings::default(),
            demo: DemoSettings::default(),
        }
    }
}

impl Settings {
    /// Default settings file name
    const FILE_NAME: &'static str = "echoloc.json";

    /// Load `echoloc.json` from the working directory, falling back to defaults
    pub fn load() -> Self {
        let path = Path::new(Self::FILE_NAME);
        if !path.exists() {
            log::info!("Using default settings");
            return Self::default();
        }
        match Self::load_from(path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::warn!("{e}; using default settings");
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&json).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save_to(&self, path: &Path) -> Result<(), SettingsError> {
        let io_err = |source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        };
        let json = serde_json::to_string_pretty(self).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        std::fs::write(path, json).map_err(io_err)
    }

    /// Hand-placed objects followed by scattered ones
    pub fn object_specs(&self) -> Vec<ObjectSpec> {
        let aspect = self.display.width.max(1) as f32 / self.display.height.max(1) as f32;
        let mut specs = self.objects.clone();
        specs.extend(self.scatter.generate(aspect));
        specs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{"display": {"width": 1024, "debug": true}, "objects": []}"#)
                .unwrap();
        assert_eq!(settings.display.width, 1024);
        assert_eq!(settings.display.height, 600);
        assert!(settings.display.debug);
        assert!(settings.objects.is_empty());
        assert_eq!(settings.pulse, PulseSettings::default());
        assert_eq!(settings.echo, EchoStyle::default());
    }

    #[test]
    fn test_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("echoloc.json");
        let mut settings = Settings::default();
        settings.player.pulse_frequency = 2.5;
        settings.save_to(&path).unwrap();
        assert_eq!(Settings::load_from(&path).unwrap(), settings);
    }

    #[test]
    fn test_load_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        assert!(matches!(Settings::load_from(&missing), Err(SettingsError::Io { .. })));

        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, "{ not json").unwrap();
        assert!(matches!(Settings::load_from(&bad), Err(SettingsError::Parse { .. })));
    }

    #[test]
    fn test_scatter_is_deterministic_and_in_view() {
        let scatter = ScatterSettings {
            count: 25,
            seed: 42,
            ..Default::default()
        };
        let a = scatter.generate(4.0 / 3.0);
        let b = scatter.generate(4.0 / 3.0);
        assert_eq!(a, b);
        assert_eq!(a.len(), 25);
        for spec in &a {
            assert!(spec.radius >= scatter.min_radius && spec.radius < scatter.max_radius);
            assert!(spec.x.abs() + spec.radius <= 1.0);
            assert!(spec.y.abs() + spec.radius <= 0.75 + 1e-6);
        }

        let other = ScatterSettings {
            seed: 43,
            ..scatter
        };
        assert_ne!(other.generate(4.0 / 3.0), a);
    }

    #[test]
    fn test_object_specs_append_scatter() {
        let mut settings = Settings::default();
        settings.scatter.count = 4;
        assert_eq!(settings.object_specs().len(), settings.objects.len() + 4);
    }
}
