//! Echoloc entry point
//!
//! Runs a headless scripted session from the settings' demo script and
//! optionally writes the final frame as a PNG snapshot.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use echoloc::platform::ScriptedSource;
    use echoloc::{App, Settings};

    env_logger::init();
    log::info!("Echoloc (native) starting...");

    let settings = Settings::load();
    let source = ScriptedSource::from_steps(&settings.demo.script);
    log::info!("Replaying {} scripted frames", source.remaining());

    let mut app = App::new(&settings, source);
    let summary = app.run();
    log::info!(
        "Session finished: {} frames, {} pulses, {} echo points, {} live entities",
        summary.frames,
        summary.pulses_emitted,
        summary.echo_points,
        summary.entities
    );

    if let Some(path) = &settings.display.snapshot {
        match app.write_snapshot(path) {
            Ok(()) => log::info!("Wrote snapshot to {}", path.display()),
            Err(e) => log::error!("Failed to write snapshot {}: {e}", path.display()),
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // No browser front end; the library is usable on its own
}
