//! The player: a moving pulse emitter
//!
//! Moves with the held arrow keys and emits a pulse every emission period.
//! The emission timer carries its overflow into the next period instead of
//! resetting, so emission stays on schedule under uneven frame times.

use glam::Vec2;

use super::entity::{
    Collidable, ColliderShape, Contact, DrawContext, GameEvent, Updateable, Visible, VisualState,
};
use super::pulse::Pulse;
use crate::platform::FrameInput;
use crate::renderer::{Raster, Rgba};
use crate::settings::{PlayerSettings, PulseSettings};

#[derive(Debug, Clone)]
pub struct Player {
    visual: VisualState,
    radius: f32,
    /// Movement speed (world units per second)
    speed: f32,
    /// Milliseconds between pulses
    period_ms: f32,
    /// Milliseconds since the last emission, always in `[0, period_ms)`
    pulse_timer: f32,
    pulse_speed: f32,
    pulse_max_radius: f32,
    pulse_colour: Rgba,
    colour: Rgba,
    pulses_emitted: u64,
}

impl Player {
    pub fn new(player: &PlayerSettings, pulse: &PulseSettings) -> Self {
        let position = player.start;
        Self {
            visual: VisualState::new(position, Vec2::splat(player.radius * 2.0)),
            radius: player.radius,
            speed: player.speed,
            period_ms: emission_period_ms(player.pulse_frequency),
            pulse_timer: 0.0,
            pulse_speed: player.pulse_speed,
            pulse_max_radius: pulse.max_radius,
            pulse_colour: pulse.colour,
            colour: player.colour,
            pulses_emitted: 0,
        }
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        self.visual.position
    }

    #[inline]
    pub fn period_ms(&self) -> f32 {
        self.period_ms
    }

    #[inline]
    pub fn pulse_timer(&self) -> f32 {
        self.pulse_timer
    }

    pub fn pulses_emitted(&self) -> u64 {
        self.pulses_emitted
    }

    fn emit_pulse(&mut self, events: &mut Vec<GameEvent>) {
        let pulse = Pulse::new(self.position(), self.pulse_speed, self.pulse_max_radius)
            .with_colour(self.pulse_colour);
        events.push(GameEvent::PulseRequested(pulse));
        self.pulses_emitted += 1;
    }
}

/// Shortest emission period (caps the frequency at 100 Hz)
pub const MIN_EMISSION_PERIOD_MS: f32 = 10.0;

/// Most pulses a single update may emit; the remainder is dropped
pub const MAX_PULSES_PER_UPDATE: u32 = 16;

/// Emission period for a frequency in Hz; non-positive or NaN means never
pub fn emission_period_ms(frequency: f32) -> f32 {
    if frequency > 0.0 {
        (1000.0 / frequency).max(MIN_EMISSION_PERIOD_MS)
    } else {
        f32::INFINITY
    }
}

impl Updateable for Player {
    fn update(&mut self, dt: f32, input: &FrameInput, events: &mut Vec<GameEvent>) {
        let direction = input.direction();
        if direction != Vec2::ZERO {
            let position = self.position() + direction * self.speed * dt;
            self.visual.set_position(position);
        }

        self.pulse_timer += dt * 1000.0;
        if self.pulse_timer >= self.period_ms {
            let due = (self.pulse_timer / self.period_ms).floor() as u32;
            self.pulse_timer %= self.period_ms;
            if due > MAX_PULSES_PER_UPDATE {
                log::warn!("{due} pulses due in one update, emitting {MAX_PULSES_PER_UPDATE}");
            }
            for _ in 0..due.min(MAX_PULSES_PER_UPDATE) {
                self.emit_pulse(events);
            }
        }
    }
}

impl Collidable for Player {
    fn shape(&self) -> ColliderShape {
        ColliderShape::Player {
            center: self.position(),
            radius: self.radius,
        }
    }

    /// Reserved: the player currently ignores contacts
    fn collide(&mut self, _other: &Contact) {}
}

impl Visible for Player {
    fn visual(&self) -> &VisualState {
        &self.visual
    }

    fn visual_mut(&mut self) -> &mut VisualState {
        &mut self.visual
    }

    fn draw(&mut self, ctx: &DrawContext, raster: &mut Raster) {
        let radius = ctx.transform.length_to_device(self.radius);
        raster.fill_disk(ctx.local_center(), radius, self.colour);
    }
}
