//! Simulation module
//!
//! The geometric/object engine. Time only enters through the `dt` passed to
//! each frame; nothing here touches a window or a clock.

pub mod entity;
pub mod geometry;
pub mod hidden;
pub mod player;
pub mod pulse;
pub mod transform;
pub mod world;

pub use entity::{
    Collidable, ColliderShape, Contact, DrawContext, EntityId, GameEvent, RenderOutcome,
    Updateable, Visible, VisualState,
};
pub use geometry::{CircleIntersection, circles_overlap, intersect_circles};
pub use hidden::{EchoStyle, HiddenObject};
pub use player::Player;
pub use pulse::Pulse;
pub use transform::{DeviceRect, ViewTransform};
pub use world::{Entity, FrameReport, World};
