//! Hidden objects revealed by echoes
//!
//! A hidden object is a static disk. During the collision pass it collects
//! the pulses overlapping it; when rendered it plots where each pulse's
//! leading edge crosses its boundary, as a band of dots fading away behind
//! the edge. Echo marks live for one frame only.

use std::collections::BTreeMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::{
    Collidable, ColliderShape, Contact, DrawContext, EntityId, RenderOutcome, Visible,
    VisualState, render_cached,
};
use super::geometry::{CircleIntersection, circles_overlap, intersect_circles};
use crate::renderer::{Raster, Rgba};

/// Tuning for echo rendering
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EchoStyle {
    /// Number of trailing bands drawn behind the leading edge
    pub bands: u32,
    /// Radius step between bands, in device pixels
    pub band_step_px: f32,
    /// Brightness of band `i` is `1 / (1 + i)^falloff_exponent`
    pub falloff_exponent: f32,
    /// Body colour shown in debug mode
    pub silhouette: Rgba,
}

impl Default for EchoStyle {
    fn default() -> Self {
        Self {
            bands: 20,
            band_step_px: 0.5,
            falloff_exponent: 1.0 / 3.0,
            silhouette: Rgba::rgb(32, 32, 32),
        }
    }
}

impl EchoStyle {
    /// Brightness factor for a band `i` steps behind the leading edge
    #[inline]
    pub fn brightness(&self, band: u32) -> f32 {
        1.0 / (1.0 + band as f32).powf(self.falloff_exponent)
    }
}

/// Pulse geometry captured during the collision pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IncidentPulse {
    pub center: Vec2,
    pub radius: f32,
}

#[derive(Debug, Clone)]
pub struct HiddenObject {
    visual: VisualState,
    radius: f32,
    colour: Rgba,
    style: EchoStyle,
    /// Live pulses overlapping this object, cleared by every draw
    incident: BTreeMap<EntityId, IncidentPulse>,
    /// Last bitmap carries echo marks that must be wiped
    echoing: bool,
    echo_points: u64,
}

impl HiddenObject {
    pub fn new(center: Vec2, radius: f32, colour: Rgba) -> Self {
        Self {
            visual: VisualState::new(center, Vec2::splat(radius * 2.0)),
            radius,
            colour,
            style: EchoStyle::default(),
            incident: BTreeMap::new(),
            echoing: false,
            echo_points: 0,
        }
    }

    pub fn with_style(mut self, style: EchoStyle) -> Self {
        self.style = style;
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

    pub fn colour(&self) -> Rgba {
        self.colour
    }

    pub fn incident_pulses(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.incident.keys().copied()
    }

    pub fn incident_count(&self) -> usize {
        self.incident.len()
    }

    /// Total echo dots plotted over this object's lifetime
    pub fn echo_points(&self) -> u64 {
        self.echo_points
    }

    fn draw_echo(&self, pulse: &IncidentPulse, ctx: &DrawContext, raster: &mut Raster) -> u64 {
        let step = self.style.band_step_px / ctx.unit();
        let mut plotted = 0;

        for band in 0..self.style.bands {
            let radius = pulse.radius - band as f32 * step;
            if radius <= 0.0 {
                break;
            }
            let CircleIntersection::Crossing(points) =
                intersect_circles(pulse.center, radius, self.center(), self.radius)
            else {
                continue;
            };

            let colour = self.colour.scaled(self.style.brightness(band));
            for p in points {
                let local = ctx.world_to_local(p);
                raster.put(local.x.floor() as i32, local.y.floor() as i32, colour);
                plotted += 1;
            }
        }
        plotted
    }
}

impl Collidable for HiddenObject {
    fn shape(&self) -> ColliderShape {
        ColliderShape::Hidden {
            center: self.center(),
            radius: self.radius,
        }
    }

    fn collide(&mut self, other: &Contact) {
        let ColliderShape::Pulse {
            center,
            radius,
            dead,
        } = other.shape
        else {
            return;
        };
        if dead || !circles_overlap(center, radius, self.center(), self.radius) {
            return;
        }
        log::trace!("pulse {:?} incident on hidden object at {}", other.id, self.center());
        self.incident.insert(other.id, IncidentPulse { center, radius });
        self.visual.dirty = true;
    }
}

impl Visible for HiddenObject {
    fn visual(&self) -> &VisualState {
        &self.visual
    }

    fn visual_mut(&mut self) -> &mut VisualState {
        &mut self.visual
    }

    fn pre_render(&mut self, width: u32, height: u32) {
        if self.echoing {
            self.visual.dirty = true;
        }
        self.visual.sync_transform(width, height);
    }

    /// Incident pulses are consumed by every render, drawn or not
    fn render(&mut self, surface: &mut Raster, debug: bool) -> RenderOutcome {
        let outcome = render_cached(self, surface, debug);
        self.incident.clear();
        outcome
    }

    fn draw(&mut self, ctx: &DrawContext, raster: &mut Raster) {
        if ctx.debug {
            let radius = ctx.transform.length_to_device(self.radius);
            raster.fill_disk(ctx.local_center(), radius, self.style.silhouette);
        }

        let mut plotted = 0;
        for pulse in self.incident.values() {
            plotted += self.draw_echo(pulse, ctx, raster);
        }
        self.echo_points += plotted;
        self.echoing = !self.incident.is_empty();
        self.incident.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pulse_contact(id: u32, center: Vec2, radius: f32, dead: bool) -> Contact {
        Contact {
            id: EntityId(id),
            shape: ColliderShape::Pulse {
                center,
                radius,
                dead,
            },
        }
    }

    fn render(obj: &mut HiddenObject, surface: &mut Raster) -> RenderOutcome {
        obj.pre_render(surface.width(), surface.height());
        obj.render(surface, false)
    }

    #[test]
    fn test_records_overlapping_pulse() {
        let mut obj = HiddenObject::new(Vec2::ZERO, 0.1, Rgba::WHITE);
        obj.collide(&pulse_contact(1, Vec2::new(0.3, 0.0), 0.25, false));
        assert_eq!(obj.incident_pulses().collect::<Vec<_>>(), vec![EntityId(1)]);
    }

    #[test]
    fn test_ignores_distant_and_dead_pulses() {
        let mut obj = HiddenObject::new(Vec2::ZERO, 0.1, Rgba::WHITE);
        obj.collide(&pulse_contact(1, Vec2::new(0.5, 0.0), 0.3, false));
        obj.collide(&pulse_contact(2, Vec2::new(0.1, 0.0), 0.3, true));
        assert_eq!(obj.incident_count(), 0);
    }

    #[test]
    fn test_ignores_non_pulse_contacts() {
        let mut obj = HiddenObject::new(Vec2::ZERO, 0.1, Rgba::WHITE);
        obj.collide(&Contact {
            id: EntityId(7),
            shape: ColliderShape::Player {
                center: Vec2::ZERO,
                radius: 0.5,
            },
        });
        obj.collide(&Contact {
            id: EntityId(8),
            shape: ColliderShape::Hidden {
                center: Vec2::ZERO,
                radius: 0.5,
            },
        });
        assert_eq!(obj.incident_count(), 0);
    }

    #[test]
    fn test_echo_dots_lie_on_object_boundary() {
        let mut obj = HiddenObject::new(Vec2::ZERO, 0.1, Rgba::rgb(0, 200, 0));
        let mut surface = Raster::new(800, 600);
        obj.collide(&pulse_contact(1, Vec2::new(0.2, 0.0), 0.15, false));

        assert_eq!(render(&mut obj, &mut surface), RenderOutcome::Redrawn);
        assert_eq!(obj.incident_count(), 0);
        assert!(obj.echo_points() > 0);
        assert!(obj.echo_points() <= 2 * EchoStyle::default().bands as u64);

        let lit: Vec<_> = (0..600)
            .flat_map(|y| (0..800).map(move |x| (x, y)))
            .filter(|&(x, y)| surface.get(x, y).is_some_and(|p| p.a > 0))
            .collect();
        assert!(!lit.is_empty());
        for (x, y) in lit {
            // Object boundary is a 40px circle around the screen center
            let d = Vec2::new(x as f32 + 0.5 - 400.0, y as f32 + 0.5 - 300.0).length();
            assert!((d - 40.0).abs() < 1.5, "dot at ({x}, {y}) is {d}px from center");
        }
    }

    #[test]
    fn test_leading_band_is_brightest() {
        let style = EchoStyle::default();
        assert_eq!(style.brightness(0), 1.0);
        assert!(style.brightness(1) < style.brightness(0));
        assert!(style.brightness(19) < style.brightness(10));
        assert!(style.brightness(19) > 0.0);
    }

    #[test]
    fn test_echo_marks_are_transient() {
        let mut obj = HiddenObject::new(Vec2::ZERO, 0.1, Rgba::WHITE);
        let mut surface = Raster::new(800, 600);
        obj.collide(&pulse_contact(1, Vec2::new(0.2, 0.0), 0.15, false));
        render(&mut obj, &mut surface);
        assert!(obj.visual().cached_raster().unwrap().count_opaque() > 0);

        // No pulse this frame: the bitmap is redrawn blank
        surface.fill(Rgba::TRANSPARENT);
        assert_eq!(render(&mut obj, &mut surface), RenderOutcome::Redrawn);
        assert_eq!(surface.count_opaque(), 0);

        // And from then on it stays cached
        assert_eq!(render(&mut obj, &mut surface), RenderOutcome::Cached);
    }

    #[test]
    fn test_offscreen_render_still_clears_incident_pulses() {
        let mut obj = HiddenObject::new(Vec2::new(3.0, 0.0), 0.1, Rgba::WHITE);
        let mut surface = Raster::new(800, 600);
        for id in 0..50 {
            obj.collide(&pulse_contact(id, Vec2::new(2.8, 0.0), 0.25, false));
            assert_eq!(obj.incident_count(), 1);
            assert_eq!(render(&mut obj, &mut surface), RenderOutcome::Culled);
            assert_eq!(obj.incident_count(), 0);
        }
        assert_eq!(obj.echo_points(), 0);
        assert_eq!(surface.count_opaque(), 0);
    }

    #[test]
    fn test_invisible_render_clears_incident_pulses() {
        let mut obj = HiddenObject::new(Vec2::ZERO, 0.1, Rgba::WHITE);
        obj.visual_mut().visible = false;
        obj.collide(&pulse_contact(1, Vec2::new(0.2, 0.0), 0.15, false));
        let mut surface = Raster::new(800, 600);
        assert_eq!(render(&mut obj, &mut surface), RenderOutcome::Hidden);
        assert_eq!(obj.incident_count(), 0);
    }

    #[test]
    fn test_silhouette_only_in_debug() {
        let mut obj = HiddenObject::new(Vec2::ZERO, 0.1, Rgba::WHITE);
        let mut surface = Raster::new(800, 600);
        obj.pre_render(800, 600);
        obj.render(&mut surface, false);
        assert_eq!(surface.count_opaque(), 0);

        obj.visual_mut().dirty = true;
        obj.render(&mut surface, true);
        assert_eq!(surface.get(400, 300), Some(EchoStyle::default().silhouette));
    }
}
