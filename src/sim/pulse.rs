//! Expanding sonar pulse
//!
//! Grows from radius 0 at a constant speed and is spent once it reaches
//! `max_radius`. Pulses are invisible outside debug mode; their effect is
//! seen through the echoes they leave on hidden objects.

use glam::Vec2;

use super::entity::{
    Collidable, ColliderShape, Contact, DrawContext, GameEvent, Updateable, Visible, VisualState,
};
use crate::platform::FrameInput;
use crate::renderer::{Raster, Rgba};

#[derive(Debug, Clone)]
pub struct Pulse {
    visual: VisualState,
    /// Current ring radius (world units), never decreases
    radius: f32,
    /// Growth rate (world units per second)
    speed: f32,
    /// Radius at which the pulse is spent
    max_radius: f32,
    dead: bool,
    colour: Rgba,
}

impl Pulse {
    pub fn new(origin: Vec2, speed: f32, max_radius: f32) -> Self {
        let mut visual = VisualState::new(origin, Vec2::ZERO);
        visual.visible = false;
        Self {
            visual,
            radius: 0.0,
            speed,
            max_radius,
            dead: false,
            colour: Rgba::WHITE,
        }
    }

    pub fn with_colour(mut self, colour: Rgba) -> Self {
        self.colour = colour;
        self
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.visual.position
    }

    #[inline]
    pub fn radius(&self) -> f32 {
        self.radius
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.speed
    }

    #[inline]
    pub fn max_radius(&self) -> f32 {
        self.max_radius
    }

    #[inline]
    pub fn is_dead(&self) -> bool {
        self.dead
    }

    /// True once all four view corners are enclosed by the ring
    pub fn is_outside_view(&self) -> bool {
        let Some(transform) = self.visual.transform() else {
            return false;
        };
        let r_sq = self.radius * self.radius;
        transform
            .view_corners()
            .iter()
            .all(|corner| corner.distance_squared(self.center()) <= r_sq)
    }
}

impl Updateable for Pulse {
    fn update(&mut self, dt: f32, _input: &FrameInput, _events: &mut Vec<GameEvent>) {
        if self.dead {
            return;
        }
        self.radius += self.speed * dt;
        self.visual.set_size(Vec2::splat(self.radius * 2.0));
        self.visual.dirty = true;

        if self.radius >= self.max_radius {
            self.dead = true;
            log::debug!("pulse at {} spent (r={:.3})", self.center(), self.radius);
        }
    }
}

impl Collidable for Pulse {
    fn shape(&self) -> ColliderShape {
        ColliderShape::Pulse {
            center: self.center(),
            radius: self.radius,
            dead: self.dead,
        }
    }

    /// Pulses pass through everything
    fn collide(&mut self, _other: &Contact) {}
}

impl Visible for Pulse {
    fn visual(&self) -> &VisualState {
        &self.visual
    }

    fn visual_mut(&mut self) -> &mut VisualState {
        &mut self.visual
    }

    fn should_render(&self) -> bool {
        !self.dead && !self.is_outside_view()
    }

    fn draw(&mut self, ctx: &DrawContext, raster: &mut Raster) {
        let center = ctx.local_center();
        let display_radius = ctx.transform.length_to_device(self.radius);
        if display_radius > 1.0 {
            raster.stroke_ring(center, display_radius, 1.0, self.colour);
        } else {
            raster.fill_disk(center, display_radius, self.colour);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::Raster;
    use crate::sim::RenderOutcome;

    fn step(pulse: &mut Pulse, dt: f32) {
        pulse.update(dt, &FrameInput::default(), &mut Vec::new());
    }

    #[test]
    fn test_radius_grows_linearly() {
        let mut pulse = Pulse::new(Vec2::ZERO, 0.2, 10.0);
        let dt = 1.0 / 60.0;
        for _ in 0..90 {
            step(&mut pulse, dt);
        }
        assert!((pulse.radius() - 90.0 * 0.2 * dt).abs() < 1e-4);
        assert!(!pulse.is_dead());
    }

    #[test]
    fn test_dies_once_max_radius_reached() {
        let mut pulse = Pulse::new(Vec2::ZERO, 1.0, 0.5);
        for _ in 0..3 {
            step(&mut pulse, 0.125);
        }
        assert!(!pulse.is_dead());
        step(&mut pulse, 0.125);
        assert!(pulse.is_dead());
        let spent_radius = pulse.radius();
        // Dead pulses are frozen
        step(&mut pulse, 0.125);
        assert_eq!(pulse.radius(), spent_radius);
    }

    #[test]
    fn test_outside_view_requires_all_corners() {
        let mut pulse = Pulse::new(Vec2::new(0.5, 0.0), 1.0, 100.0);
        pulse.visual.sync_transform(800, 600);
        // Far corners are (-1, ±0.75): about 1.677 from (0.5, 0)
        pulse.radius = 1.6;
        assert!(!pulse.is_outside_view());
        pulse.radius = 1.7;
        assert!(pulse.is_outside_view());
    }

    #[test]
    fn test_small_pulse_draws_filled() {
        let mut pulse = Pulse::new(Vec2::ZERO, 1.0, 10.0);
        step(&mut pulse, 0.002);
        let mut surface = Raster::new(800, 600);
        pulse.pre_render(800, 600);
        assert_eq!(pulse.render(&mut surface, true), RenderOutcome::Redrawn);
        assert!(surface.count_opaque() > 0);
    }

    #[test]
    fn test_ring_is_hollow_in_debug_render() {
        let mut pulse = Pulse::new(Vec2::ZERO, 1.0, 10.0);
        step(&mut pulse, 0.1);
        let mut surface = Raster::new(800, 600);
        pulse.pre_render(800, 600);
        assert_eq!(pulse.render(&mut surface, false), RenderOutcome::Hidden);
        assert_eq!(pulse.render(&mut surface, true), RenderOutcome::Redrawn);
        // 0.1 world units = 40px ring around the screen center
        assert_eq!(surface.get(400, 300), Some(Rgba::TRANSPARENT));
        assert_eq!(surface.get(400, 260), Some(Rgba::WHITE));
    }
}
