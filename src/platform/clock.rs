//! Frame pacing and FPS tracking

use std::time::{Duration, Instant};

/// Frames averaged for the FPS readout
const FPS_WINDOW: usize = 60;

/// Paces the loop to a target rate and measures frame deltas
#[derive(Debug, Clone)]
pub struct FrameClock {
    /// 0 disables pacing
    target_fps: u32,
    start: Instant,
    last: Option<Instant>,
    /// Timestamps (ms since start) of the last `FPS_WINDOW` frames
    frame_times: [Option<f64>; FPS_WINDOW],
    frame_index: usize,
    fps: f32,
}

impl FrameClock {
    pub fn new(target_fps: u32) -> Self {
        Self {
            target_fps,
            start: Instant::now(),
            last: None,
            frame_times: [None; FPS_WINDOW],
            frame_index: 0,
            fps: 0.0,
        }
    }

    /// Wait out the rest of the frame; returns milliseconds since last tick
    pub fn tick(&mut self) -> f32 {
        if let (Some(last), Some(budget)) = (self.last, self.frame_budget()) {
            let elapsed = last.elapsed();
            if elapsed < budget {
                std::thread::sleep(budget - elapsed);
            }
        }

        let now = Instant::now();
        let delta_ms = self
            .last
            .map(|last| now.duration_since(last).as_secs_f32() * 1000.0)
            .unwrap_or(0.0);
        self.last = Some(now);
        self.record(now.duration_since(self.start).as_secs_f64() * 1000.0);
        delta_ms
    }

    fn frame_budget(&self) -> Option<Duration> {
        (self.target_fps > 0).then(|| Duration::from_secs_f64(1.0 / self.target_fps as f64))
    }

    /// Record a frame timestamp (ms) and refresh the FPS estimate
    pub fn record(&mut self, time_ms: f64) {
        self.frame_times[self.frame_index] = Some(time_ms);
        self.frame_index = (self.frame_index + 1) % FPS_WINDOW;

        // Slot after the newest is the oldest once the window is full
        let oldest = self.frame_times[self.frame_index]
            .or_else(|| self.frame_times[0])
            .unwrap_or(time_ms);
        let frames = self.frame_times.iter().flatten().count().saturating_sub(1);
        let elapsed = time_ms - oldest;
        if frames > 0 && elapsed > 0.0 {
            self.fps = (frames as f64 * 1000.0 / elapsed) as f32;
        }
    }

    /// Average frames per second over the recent window
    pub fn fps(&self) -> f32 {
        self.fps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fps_from_steady_frames() {
        let mut clock = FrameClock::new(0);
        for i in 0..120 {
            clock.record(i as f64 * 20.0);
        }
        assert!((clock.fps() - 50.0).abs() < 0.01);
    }

    #[test]
    fn test_fps_before_window_fills() {
        let mut clock = FrameClock::new(0);
        clock.record(0.0);
        assert_eq!(clock.fps(), 0.0);
        clock.record(10.0);
        clock.record(20.0);
        assert!((clock.fps() - 100.0).abs() < 0.01);
    }

    #[test]
    fn test_unpaced_tick_returns_delta() {
        let mut clock = FrameClock::new(0);
        assert_eq!(clock.tick(), 0.0);
        std::thread::sleep(Duration::from_millis(2));
        assert!(clock.tick() >= 2.0);
    }
}
