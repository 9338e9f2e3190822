//! RGBA8 software raster
//!
//! Per-entity cached bitmaps and the canvas frame are both `Raster`s.

use bytemuck::{Pod, Zeroable};
use glam::{IVec2, Vec2};
use image::RgbaImage;
use image::imageops::{self, FilterType};
use serde::{Deserialize, Serialize};

/// A straight-alpha RGBA8 pixel
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Pod, Zeroable, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0);
    pub const BLACK: Rgba = Rgba::rgb(0, 0, 0);
    pub const WHITE: Rgba = Rgba::rgb(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Scale the colour channels by `factor` (alpha untouched)
    pub fn scaled(self, factor: f32) -> Self {
        let f = factor.clamp(0.0, 1.0);
        let ch = |c: u8| (c as f32 * f) as u8;
        Self::new(ch(self.r), ch(self.g), ch(self.b), self.a)
    }

    /// Source-over composite of `self` onto `dst`
    pub fn over(self, dst: Rgba) -> Rgba {
        match self.a {
            0 => dst,
            255 => self,
            a => {
                let sa = a as u32;
                let da = dst.a as u32 * (255 - sa) / 255;
                let out_a = sa + da;
                let mix = |s: u8, d: u8| ((s as u32 * sa + d as u32 * da) / out_a.max(1)) as u8;
                Rgba::new(mix(self.r, dst.r), mix(self.g, dst.g), mix(self.b, dst.b), out_a as u8)
            }
        }
    }
}

/// A width × height pixel buffer, row-major from the top-left
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    width: u32,
    height: u32,
    pixels: Vec<Rgba>,
}

impl Raster {
    /// Fully transparent raster
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, Rgba::TRANSPARENT)
    }

    pub fn filled(width: u32, height: u32, colour: Rgba) -> Self {
        Self {
            width,
            height,
            pixels: vec![colour; width as usize * height as usize],
        }
    }

    /// Wrap existing pixels; `None` if the length doesn't match
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<Rgba>) -> Option<Self> {
        (pixels.len() == width as usize * height as usize).then_some(Self {
            width,
            height,
            pixels,
        })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[Rgba] {
        &self.pixels
    }

    /// Raw RGBA bytes
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    pub fn get(&self, x: i32, y: i32) -> Option<Rgba> {
        self.index(x, y).map(|i| self.pixels[i])
    }

    /// Overwrite a pixel; out-of-bounds writes are dropped
    pub fn put(&mut self, x: i32, y: i32, colour: Rgba) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i] = colour;
        }
    }

    pub fn fill(&mut self, colour: Rgba) {
        self.pixels.fill(colour);
    }

    /// Fill a clipped rectangle
    pub fn fill_rect(&mut self, x: i32, y: i32, width: u32, height: u32, colour: Rgba) {
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = (x + width as i32).min(self.width as i32);
        let y1 = (y + height as i32).min(self.height as i32);
        for py in y0..y1 {
            for px in x0..x1 {
                self.put(px, py, colour);
            }
        }
    }

    /// Number of pixels with non-zero alpha
    pub fn count_opaque(&self) -> usize {
        self.pixels.iter().filter(|p| p.a > 0).count()
    }

    /// Filled disk; a pixel is inside when its center is within `radius`
    pub fn fill_disk(&mut self, center: Vec2, radius: f32, colour: Rgba) {
        self.shade_annulus(center, 0.0, radius.max(0.5), colour);
    }

    /// Ring outline of `thickness` pixels whose outer edge is at `radius`
    pub fn stroke_ring(&mut self, center: Vec2, radius: f32, thickness: f32, colour: Rgba) {
        self.shade_annulus(center, (radius - thickness).max(0.0), radius, colour);
    }

    fn shade_annulus(&mut self, center: Vec2, inner: f32, outer: f32, colour: Rgba) {
        let x0 = ((center.x - outer).floor() as i32).max(0);
        let y0 = ((center.y - outer).floor() as i32).max(0);
        let x1 = ((center.x + outer).ceil() as i32).min(self.width as i32 - 1);
        let y1 = ((center.y + outer).ceil() as i32).min(self.height as i32 - 1);
        let inner_sq = inner * inner;
        let outer_sq = outer * outer;

        for y in y0..=y1 {
            for x in x0..=x1 {
                let d_sq = (Vec2::new(x as f32 + 0.5, y as f32 + 0.5) - center).length_squared();
                if d_sq <= outer_sq && (inner <= 0.0 || d_sq >= inner_sq) {
                    self.put(x, y, colour);
                }
            }
        }
    }

    /// Composite `src` onto this raster with its top-left at `at`, clipped
    pub fn blit(&mut self, src: &Raster, at: IVec2) {
        for sy in 0..src.height as i32 {
            let dy = at.y + sy;
            if dy < 0 || dy >= self.height as i32 {
                continue;
            }
            for sx in 0..src.width as i32 {
                let dx = at.x + sx;
                let (Some(si), Some(di)) = (src.index(sx, sy), self.index(dx, dy)) else {
                    continue;
                };
                self.pixels[di] = src.pixels[si].over(self.pixels[di]);
            }
        }
    }

    /// Smooth (bilinear) resample to a new size
    pub fn scaled(&self, width: u32, height: u32) -> Raster {
        if (width, height) == (self.width, self.height) {
            return self.clone();
        }
        if self.width == 0 || self.height == 0 || width == 0 || height == 0 {
            return Raster::new(width, height);
        }
        let resized = imageops::resize(&self.to_image(), width, height, FilterType::Triangle);
        Raster::from_image(&resized)
    }

    pub fn from_image(image: &RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        let pixels = image
            .pixels()
            .map(|p| {
                let [r, g, b, a] = p.0;
                Rgba::new(r, g, b, a)
            })
            .collect();
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn to_image(&self) -> RgbaImage {
        RgbaImage::from_fn(self.width, self.height, |x, y| {
            let p = self.pixels[y as usize * self.width as usize + x as usize];
            image::Rgba([p.r, p.g, p.b, p.a])
        })
    }
}
