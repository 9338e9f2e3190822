//! Application loop
//!
//! Wires the collaborators around the world: event source → event pump →
//! world frame → canvas, paced by the frame clock.

use std::path::Path;

use crate::consts::MAX_FRAME_MS;
use crate::platform::{EventPump, EventSource, FrameClock};
use crate::renderer::{Background, Canvas, Stat, codec};
use crate::resources::{ResourceKind, ResourceLoader};
use crate::settings::Settings;
use crate::sim::World;

/// Totals for a finished session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub frames: u64,
    pub pulses_emitted: u64,
    pub echo_points: u64,
    pub entities: usize,
}

pub struct App<S: EventSource> {
    world: World,
    canvas: Canvas,
    pump: EventPump,
    source: S,
    clock: FrameClock,
    /// Overrides the measured frame delta (ms) for reproducible runs
    fixed_delta_ms: Option<f32>,
    frames: u64,
    quit: bool,
}

impl<S: EventSource> App<S> {
    pub fn new(settings: &Settings, source: S) -> Self {
        let display = &settings.display;
        let mut canvas = Canvas::new(display.width, display.height, load_background(settings));
        canvas.set_debug(display.debug);

        Self {
            world: World::from_settings(settings),
            canvas,
            pump: EventPump::new(),
            source,
            clock: FrameClock::new(display.target_fps),
            fixed_delta_ms: None,
            frames: 0,
            quit: false,
        }
    }

    /// Step with a constant delta instead of wall-clock time
    pub fn with_fixed_delta(mut self, delta_ms: f32) -> Self {
        self.fixed_delta_ms = Some(delta_ms);
        self
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn is_quit(&self) -> bool {
        self.quit
    }

    /// Run one frame; returns false once quit was requested
    pub fn run_frame(&mut self) -> bool {
        if self.quit {
            return false;
        }

        let measured_ms = self.clock.tick();
        let delta_ms = self.fixed_delta_ms.unwrap_or(measured_ms);

        let input = self.pump.process(self.source.poll());
        if input.quit {
            log::info!("quit requested after {} frames", self.frames);
            self.quit = true;
            return false;
        }
        if let Some((width, height)) = input.resize {
            self.canvas.resize(width, height);
        }

        let dt = delta_ms.clamp(0.0, MAX_FRAME_MS) / 1000.0;
        let stats = [
            Stat::new("FPS", self.clock.fps()),
            Stat::new("Frame time", format!("{} ms", delta_ms.round() as i64)),
        ];
        let report = self.world.frame(dt, &input, &mut self.canvas, &stats);
        log::trace!("frame {}: {:?}", self.frames, report);

        self.frames += 1;
        true
    }

    /// Run until the source asks to quit
    pub fn run(&mut self) -> SessionSummary {
        while self.run_frame() {}
        self.summary()
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            frames: self.frames,
            pulses_emitted: self.world.player().map_or(0, |p| p.pulses_emitted()),
            echo_points: self.world.echo_points(),
            entities: self.world.len(),
        }
    }

    /// Write the last presented frame as a PNG
    pub fn write_snapshot(&self, path: &Path) -> image::ImageResult<()> {
        codec::save_png(self.canvas.frame(), path)
    }
}

/// Background image from the assets directory, or the solid colour
fn load_background(settings: &Settings) -> Background {
    let display = &settings.display;
    let Some(name) = &display.background_image else {
        return Background::Solid(display.background);
    };

    let loader = ResourceLoader::new(&display.assets_dir);
    let image = loader
        .load(ResourceKind::Image, name)
        .map_err(|e| e.to_string())
        .and_then(|resource| codec::decode(&resource.bytes).map_err(|e| e.to_string()));

    match image {
        Ok(source) => Background::Image {
            source,
            scaled: None,
        },
        Err(e) => {
            log::warn!("background image '{name}' unavailable ({e}); using solid colour");
            Background::Solid(display.background)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{Key, RawEvent, ScriptStep, ScriptedSource};
    use crate::renderer::{Raster, Rgba};

    fn quiet_settings() -> Settings {
        let mut settings = Settings::default();
        settings.display.target_fps = 0;
        settings
    }

    #[test]
    fn test_runs_script_then_quits() {
        let source = ScriptedSource::from_steps(&[ScriptStep {
            frames: 100,
            keys: vec![],
        }]);
        let mut app = App::new(&quiet_settings(), source).with_fixed_delta(1000.0 / 60.0);
        let summary = app.run();

        assert!(app.is_quit());
        assert_eq!(summary.frames, 100);
        // 1 Hz emission over 1.67 seconds
        assert_eq!(summary.pulses_emitted, 1);
        assert_eq!(summary.entities, 5);
        assert_eq!(app.canvas().frames_presented(), 100);
        assert_eq!(app.canvas().overlay_lines().len(), 2);
        assert!(!app.run_frame());
    }

    #[test]
    fn test_pulses_reveal_objects_over_time() {
        let source = ScriptedSource::from_steps(&[ScriptStep {
            frames: 240,
            keys: vec![],
        }]);
        let mut app = App::new(&quiet_settings(), source).with_fixed_delta(1000.0 / 60.0);
        let summary = app.run();
        assert!(summary.pulses_emitted >= 3);
        assert!(summary.echo_points > 0);
    }

    #[test]
    fn test_player_follows_arrows() {
        let source = ScriptedSource::from_steps(&[ScriptStep {
            frames: 30,
            keys: vec![Key::Right],
        }]);
        let mut app = App::new(&quiet_settings(), source).with_fixed_delta(1000.0 / 60.0);
        app.run();
        let x = app.world().player().unwrap().position().x;
        // 0.5 units/s for half a second
        assert!((x - 0.25).abs() < 1e-3);
    }

    #[test]
    fn test_resize_event_reconfigures_canvas() {
        let source = ScriptedSource::new([vec![RawEvent::Resize {
            width: 640,
            height: 360,
        }]]);
        let mut app = App::new(&quiet_settings(), source).with_fixed_delta(16.0);
        app.run();
        assert_eq!((app.canvas().width(), app.canvas().height()), (640, 360));
    }

    #[test]
    fn test_background_image_and_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("images")).unwrap();
        let bg = Raster::filled(2, 2, Rgba::rgb(10, 20, 30));
        codec::save_png(&bg, &dir.path().join("images/bg.png")).unwrap();

        let mut settings = quiet_settings();
        settings.display.width = 40;
        settings.display.height = 30;
        settings.display.background_image = Some("bg".into());
        settings.display.assets_dir = dir.path().to_path_buf();
        settings.objects.clear();

        let mut app = App::new(&settings, ScriptedSource::new([vec![]])).with_fixed_delta(16.0);
        app.run();

        let snapshot = dir.path().join("frame.png");
        app.write_snapshot(&snapshot).unwrap();
        let frame = codec::decode(&std::fs::read(&snapshot).unwrap()).unwrap();
        assert_eq!((frame.width(), frame.height()), (40, 30));
        // Resampling may round a channel by one
        let corner = frame.get(0, 0).unwrap();
        let close = |got: u8, want: u8| got.abs_diff(want) <= 1;
        assert!(close(corner.r, 10) && close(corner.g, 20) && close(corner.b, 30), "{corner:?}");
    }

    #[test]
    fn test_undecodable_background_falls_back_to_solid() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("images")).unwrap();
        std::fs::write(dir.path().join("images/bg.png"), b"\x89PNG truncated").unwrap();

        let mut settings = quiet_settings();
        settings.display.background_image = Some("bg".into());
        settings.display.assets_dir = dir.path().to_path_buf();
        assert!(matches!(load_background(&settings), Background::Solid(_)));
    }

    #[test]
    fn test_missing_background_falls_back_to_solid() {
        let mut settings = quiet_settings();
        settings.display.background_image = Some("missing".into());
        settings.display.assets_dir = std::env::temp_dir().join("echoloc-no-such-dir");
        assert!(matches!(load_background(&settings), Background::Solid(_)));
    }
}
