//! Software rendering
//!
//! Entities paint into their own cached rasters; the canvas composites them.

pub mod canvas;
pub mod codec;
pub mod raster;

pub use canvas::{Background, Canvas, RenderTally, Stat, StatValue};
pub use raster::{Raster, Rgba};
