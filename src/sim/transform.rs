//! World-to-device coordinate transform
//!
//! World space is normalized: x spans [-1, 1] across the display width and
//! +Y points up. Device space is pixels with +Y pointing down. The scale is
//! always derived from the width, so the visible vertical half-extent is
//! `H / W` world units.

use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in device pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl DeviceRect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[inline]
    pub fn top_left(&self) -> IVec2 {
        IVec2::new(self.x, self.y)
    }

    #[inline]
    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    /// Overlap test with half-open edges; empty rects never intersect
    pub fn intersects(&self, other: &DeviceRect) -> bool {
        if self.width <= 0 || self.height <= 0 || other.width <= 0 || other.height <= 0 {
            return false;
        }
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}

/// Display-size dependent mapping between world and device space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewTransform {
    width: u32,
    height: u32,
}

impl ViewTransform {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
        }
    }

    #[inline]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// True if this transform was built for the given display size
    #[inline]
    pub fn matches(&self, width: u32, height: u32) -> bool {
        self.width == width.max(1) && self.height == height.max(1)
    }

    /// Device pixels per world unit
    #[inline]
    pub fn scale(&self) -> f32 {
        self.width as f32 * 0.5
    }

    /// Display aspect ratio `W / H`
    #[inline]
    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    /// Half of the visible world height
    #[inline]
    pub fn visible_half_height(&self) -> f32 {
        1.0 / self.aspect_ratio()
    }

    /// The four world-space corners of the visible view
    pub fn view_corners(&self) -> [Vec2; 4] {
        let h = self.visible_half_height();
        [
            Vec2::new(-1.0, h),
            Vec2::new(-1.0, -h),
            Vec2::new(1.0, -h),
            Vec2::new(1.0, h),
        ]
    }

    /// Map a world position to (sub)pixel device coordinates
    #[inline]
    pub fn world_to_device(&self, world: Vec2) -> Vec2 {
        let scale = self.scale();
        Vec2::new(
            self.width as f32 * 0.5 + world.x * scale,
            self.height as f32 * 0.5 - world.y * scale,
        )
    }

    /// Inverse of [`Self::world_to_device`]
    #[inline]
    pub fn device_to_world(&self, device: Vec2) -> Vec2 {
        let scale = self.scale();
        Vec2::new(
            (device.x - self.width as f32 * 0.5) / scale,
            (self.height as f32 * 0.5 - device.y) / scale,
        )
    }

    /// Map a world-space length to device pixels
    #[inline]
    pub fn length_to_device(&self, length: f32) -> f32 {
        length * self.scale()
    }

    /// Map a world-space size to device pixels (no flip)
    #[inline]
    pub fn size_to_device(&self, size: Vec2) -> Vec2 {
        size * self.scale()
    }

    /// Device bounding rect of a box centered at `center` with world `size`
    ///
    /// The top-left is floored and the extent rounded up, never below 1px.
    pub fn bounding_rect(&self, center: Vec2, size: Vec2) -> DeviceRect {
        let dims = self.size_to_device(size);
        let top_left = self.world_to_device(center) - dims * 0.5;
        DeviceRect::new(
            top_left.x.floor() as i32,
            top_left.y.floor() as i32,
            (dims.x.ceil() as i32).max(1),
            (dims.y.ceil() as i32).max(1),
        )
    }

    /// The whole display as a rect
    pub fn display_rect(&self) -> DeviceRect {
        DeviceRect::new(0, 0, self.width as i32, self.height as i32)
    }
}
