//! Capability model for game objects
//!
//! An entity may independently be updated, collided and rendered. Each
//! capability is its own trait; concrete kinds implement only what they
//! support and the world indexes entities by capability.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::pulse::Pulse;
use super::transform::{DeviceRect, ViewTransform};
use crate::platform::FrameInput;
use crate::renderer::Raster;

/// Stable handle into the world's entity arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

/// Requests raised during the update phase, applied at the phase boundary
#[derive(Debug, Clone)]
pub enum GameEvent {
    /// A freshly emitted pulse to insert into every capability view
    PulseRequested(Pulse),
}

/// Entities advanced every frame
pub trait Updateable {
    /// Advance by `dt` seconds. New entities go through `events`.
    fn update(&mut self, dt: f32, input: &FrameInput, events: &mut Vec<GameEvent>);
}

/// Collision-relevant snapshot of an entity
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColliderShape {
    Pulse {
        center: Vec2,
        radius: f32,
        dead: bool,
    },
    Hidden {
        center: Vec2,
        radius: f32,
    },
    Player {
        center: Vec2,
        radius: f32,
    },
}

/// The other side of a collision pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub id: EntityId,
    pub shape: ColliderShape,
}

/// Entities taking part in the pairwise collision pass
pub trait Collidable {
    fn shape(&self) -> ColliderShape;

    /// Notified once per frame for every other collidable entity
    fn collide(&mut self, other: &Contact);
}

/// What happened when an entity was asked to render
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    /// Not visible and not in debug mode
    Hidden,
    /// Entirely off-screen
    Culled,
    /// Blitted the cached bitmap unchanged
    Cached,
    /// Redrew the bitmap, then blitted it
    Redrawn,
}

/// Placement info handed to [`Visible::draw`]
#[derive(Debug, Clone, Copy)]
pub struct DrawContext {
    pub transform: ViewTransform,
    /// Where the bitmap lands on the display
    pub rect: DeviceRect,
    pub debug: bool,
}

impl DrawContext {
    /// Device pixels per world unit for this entity
    #[inline]
    pub fn unit(&self) -> f32 {
        self.transform.scale()
    }

    /// Map a world point into this entity's bitmap coordinates
    #[inline]
    pub fn world_to_local(&self, world: Vec2) -> Vec2 {
        self.transform.world_to_device(world) - self.rect.top_left().as_vec2()
    }

    /// Center of the bitmap in local coordinates
    #[inline]
    pub fn local_center(&self) -> Vec2 {
        Vec2::new(self.rect.width as f32, self.rect.height as f32) * 0.5
    }
}

/// Placement, flags and render cache shared by every visible entity
///
/// `transform`, `rect` and `raster` are caches only; dropping them never
/// changes what ends up on screen.
#[derive(Debug, Clone)]
pub struct VisualState {
    /// World-space center
    pub position: Vec2,
    /// World-space bounding size
    pub size: Vec2,
    /// Visual state changed since the last render
    pub dirty: bool,
    /// Drawn outside debug mode
    pub visible: bool,
    transform: Option<ViewTransform>,
    rect: Option<DeviceRect>,
    raster: Option<Raster>,
}

impl VisualState {
    pub fn new(position: Vec2, size: Vec2) -> Self {
        Self {
            position,
            size,
            dirty: true,
            visible: true,
            transform: None,
            rect: None,
            raster: None,
        }
    }

    /// Move the entity, invalidating the cache
    pub fn set_position(&mut self, position: Vec2) {
        if self.position != position {
            self.position = position;
            self.dirty = true;
        }
    }

    /// Resize the bounding box, invalidating the cache
    pub fn set_size(&mut self, size: Vec2) {
        if self.size != size {
            self.size = size;
            self.dirty = true;
        }
    }

    /// Rebuild the transform if the display size changed
    pub fn sync_transform(&mut self, width: u32, height: u32) {
        let stale = self.transform.is_none_or(|t| !t.matches(width, height));
        if stale {
            self.transform = Some(ViewTransform::new(width, height));
            self.dirty = true;
        }
        if self.dirty {
            self.rect = None;
        }
    }

    /// Drop every cached artifact
    pub fn invalidate(&mut self) {
        self.dirty = true;
        self.transform = None;
        self.rect = None;
        self.raster = None;
    }

    pub fn transform(&self) -> Option<ViewTransform> {
        self.transform
    }

    pub fn cached_raster(&self) -> Option<&Raster> {
        self.raster.as_ref()
    }

    /// Transform and bounding rect, computing whichever is missing
    fn layout(&mut self, width: u32, height: u32) -> (ViewTransform, DeviceRect) {
        let transform = match self.transform {
            Some(t) => t,
            None => {
                let t = ViewTransform::new(width, height);
                self.transform = Some(t);
                t
            }
        };
        let rect = match self.rect {
            Some(r) => r,
            None => {
                let r = transform.bounding_rect(self.position, self.size);
                self.rect = Some(r);
                r
            }
        };
        (transform, rect)
    }
}

/// Entities drawn every frame through a cached bitmap
pub trait Visible {
    fn visual(&self) -> &VisualState;

    fn visual_mut(&mut self) -> &mut VisualState;

    /// Paint into a fresh transparent bitmap sized to `ctx.rect`
    fn draw(&mut self, ctx: &DrawContext, raster: &mut Raster);

    /// Per-kind render veto (e.g. a ring entirely outside the view)
    fn should_render(&self) -> bool {
        true
    }

    /// Called by the surface before [`Visible::render`] each frame
    fn pre_render(&mut self, width: u32, height: u32) {
        self.visual_mut().sync_transform(width, height);
    }

    /// Redraw the bitmap if dirty, then blit it onto `surface`
    fn render(&mut self, surface: &mut Raster, debug: bool) -> RenderOutcome {
        render_cached(self, surface, debug)
    }
}

/// The shared cached render: skip, cull, redraw when dirty, blit
///
/// Kinds that override [`Visible::render`] delegate here.
pub fn render_cached<V: Visible + ?Sized>(
    entity: &mut V,
    surface: &mut Raster,
    debug: bool,
) -> RenderOutcome {
    if !entity.visual().visible && !debug {
        return RenderOutcome::Hidden;
    }
    if !entity.should_render() {
        return RenderOutcome::Culled;
    }

    let (transform, rect) = entity.visual_mut().layout(surface.width(), surface.height());
    let bounds = DeviceRect::new(0, 0, surface.width() as i32, surface.height() as i32);
    if !rect.intersects(&bounds) {
        return RenderOutcome::Culled;
    }

    let mut outcome = RenderOutcome::Cached;
    let visual = entity.visual();
    if visual.dirty || visual.raster.is_none() {
        let ctx = DrawContext {
            transform,
            rect,
            debug,
        };
        let mut raster = Raster::new(rect.width as u32, rect.height as u32);
        entity.draw(&ctx, &mut raster);
        let visual = entity.visual_mut();
        visual.raster = Some(raster);
        visual.dirty = false;
        outcome = RenderOutcome::Redrawn;
    }

    if let Some(raster) = &entity.visual().raster {
        surface.blit(raster, rect.top_left());
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::Rgba;

    /// Solid square that counts its draws
    struct Marker {
        visual: VisualState,
        draws: u32,
    }

    impl Marker {
        fn new(position: Vec2) -> Self {
            Self {
                visual: VisualState::new(position, Vec2::splat(0.1)),
                draws: 0,
            }
        }
    }

    impl Visible for Marker {
        fn visual(&self) -> &VisualState {
            &self.visual
        }

        fn visual_mut(&mut self) -> &mut VisualState {
            &mut self.visual
        }

        fn draw(&mut self, _ctx: &DrawContext, raster: &mut Raster) {
            self.draws += 1;
            raster.fill(Rgba::WHITE);
        }
    }

    fn render(marker: &mut Marker, surface: &mut Raster) -> RenderOutcome {
        marker.pre_render(surface.width(), surface.height());
        marker.render(surface, false)
    }

    #[test]
    fn test_clean_render_reuses_bitmap() {
        let mut surface = Raster::new(200, 100);
        let mut marker = Marker::new(Vec2::ZERO);

        assert_eq!(render(&mut marker, &mut surface), RenderOutcome::Redrawn);
        let first = surface.clone();
        surface.fill(Rgba::TRANSPARENT);
        assert_eq!(render(&mut marker, &mut surface), RenderOutcome::Cached);

        assert_eq!(marker.draws, 1);
        assert_eq!(surface, first);
        // 0.1 world units at 100 px/unit
        assert_eq!(surface.count_opaque(), 100);
    }

    #[test]
    fn test_forced_dirty_matches_cached_output() {
        let mut cached = Raster::new(200, 100);
        let mut forced = Raster::new(200, 100);
        let mut a = Marker::new(Vec2::new(0.3, -0.2));
        let mut b = Marker::new(Vec2::new(0.3, -0.2));

        for _ in 0..3 {
            render(&mut a, &mut cached);
            b.visual.dirty = true;
            render(&mut b, &mut forced);
        }
        assert_eq!(cached, forced);
        assert_eq!((a.draws, b.draws), (1, 3));
    }

    #[test]
    fn test_resize_forces_redraw() {
        let mut marker = Marker::new(Vec2::ZERO);
        let mut small = Raster::new(200, 100);
        let mut large = Raster::new(400, 200);
        render(&mut marker, &mut small);
        assert_eq!(render(&mut marker, &mut large), RenderOutcome::Redrawn);
        assert_eq!(large.count_opaque(), 400);
    }

    #[test]
    fn test_offscreen_is_culled() {
        let mut surface = Raster::new(200, 100);
        let mut marker = Marker::new(Vec2::new(3.0, 0.0));
        assert_eq!(render(&mut marker, &mut surface), RenderOutcome::Culled);
        assert_eq!(marker.draws, 0);
    }

    #[test]
    fn test_invisible_only_in_debug() {
        let mut surface = Raster::new(200, 100);
        let mut marker = Marker::new(Vec2::ZERO);
        marker.visual.visible = false;
        marker.pre_render(200, 100);
        assert_eq!(marker.render(&mut surface, false), RenderOutcome::Hidden);
        assert_eq!(marker.render(&mut surface, true), RenderOutcome::Redrawn);
    }
}
