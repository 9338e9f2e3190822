//! Image files in and out of [`Raster`]s
//!
//! Backgrounds decode through the `image` crate; snapshots are written as PNG.

use std::io::Cursor;
use std::path::Path;

use image::{ImageFormat, ImageResult};

use super::raster::Raster;

/// Decode an encoded image (format guessed from its header)
pub fn decode(bytes: &[u8]) -> ImageResult<Raster> {
    let image = image::load_from_memory(bytes)?;
    Ok(Raster::from_image(&image.to_rgba8()))
}

/// Encode a raster as PNG, alpha included
pub fn encode_png(raster: &Raster) -> ImageResult<Vec<u8>> {
    let mut out = Cursor::new(Vec::new());
    raster.to_image().write_to(&mut out, ImageFormat::Png)?;
    Ok(out.into_inner())
}

pub fn save_png(raster: &Raster, path: &Path) -> ImageResult<()> {
    raster.to_image().save_with_format(path, ImageFormat::Png)
}
