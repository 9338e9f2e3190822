//! Presentation surface
//!
//! Owns the off-screen frame, fills the background, lets every visible
//! entity blit its cached bitmap, then lays out the stats overlay. Overlay
//! text is left to the front end.

use std::fmt;

use super::raster::{Raster, Rgba};
use crate::sim::transform::DeviceRect;
use crate::sim::{RenderOutcome, Visible};

/// Overlay font metrics (glyphs are rasterised by the platform)
const FONT_LINE_HEIGHT: u32 = 14;
const FONT_CHAR_WIDTH: u32 = 7;
const STATS_MIN_WIDTH: u32 = 100;
const STATS_MIN_HEIGHT: u32 = 22;
/// Padding inside the panel and margin from the display corner
const STATS_PADDING: u32 = 4;
const STATS_LINE_GAP: u32 = 2;
const STATS_BACKGROUND: Rgba = Rgba::BLACK;

/// A value shown in the stats overlay
#[derive(Debug, Clone, PartialEq)]
pub enum StatValue {
    Float(f32),
    Text(String),
}

impl fmt::Display for StatValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatValue::Float(v) => write!(f, "{v:.2}"),
            StatValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<f32> for StatValue {
    fn from(v: f32) -> Self {
        StatValue::Float(v)
    }
}

impl From<String> for StatValue {
    fn from(s: String) -> Self {
        StatValue::Text(s)
    }
}

/// A labelled overlay entry
#[derive(Debug, Clone, PartialEq)]
pub struct Stat {
    pub label: &'static str,
    pub value: StatValue,
}

impl Stat {
    pub fn new(label: &'static str, value: impl Into<StatValue>) -> Self {
        Self {
            label,
            value: value.into(),
        }
    }
}

/// Canvas background
#[derive(Debug, Clone)]
pub enum Background {
    Solid(Rgba),
    /// Source image plus its copy scaled to the current display size
    Image {
        source: Raster,
        scaled: Option<Raster>,
    },
}

/// Per-frame render tally
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderTally {
    /// Entities whose bitmap was blitted
    pub blitted: u32,
    /// Of those, how many had to redraw their bitmap
    pub redrawn: u32,
    /// Entities skipped (invisible or culled)
    pub skipped: u32,
}

pub struct Canvas {
    width: u32,
    height: u32,
    frame: Raster,
    background: Background,
    debug: bool,
    overlay: Vec<String>,
    overlay_rect: Option<DeviceRect>,
    frames_presented: u64,
}

impl Canvas {
    pub fn new(width: u32, height: u32, background: Background) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        let mut canvas = Self {
            width,
            height,
            frame: Raster::new(width, height),
            background,
            debug: false,
            overlay: Vec::new(),
            overlay_rect: None,
            frames_presented: 0,
        };
        canvas.scale_background();
        canvas
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn frame(&self) -> &Raster {
        &self.frame
    }

    /// Render invisible entities too
    pub fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    /// Formatted overlay lines from the last render
    pub fn overlay_lines(&self) -> &[String] {
        &self.overlay
    }

    /// Where the overlay panel was placed on the last render
    pub fn overlay_rect(&self) -> Option<DeviceRect> {
        self.overlay_rect
    }

    /// Render one frame: background, objects, stats, present
    ///
    /// The stats overlay is layout only. The panel is filled in the frame,
    /// but glyphs are not rasterised here; a platform front end draws
    /// [`Canvas::overlay_lines`] inside [`Canvas::overlay_rect`].
    pub fn render<'a, I>(&mut self, objects: I, stats: &[Stat]) -> RenderTally
    where
        I: IntoIterator<Item = &'a mut dyn Visible>,
    {
        self.render_background();

        let mut tally = RenderTally::default();
        for obj in objects {
            obj.pre_render(self.width, self.height);
            match obj.render(&mut self.frame, self.debug) {
                RenderOutcome::Redrawn => {
                    tally.blitted += 1;
                    tally.redrawn += 1;
                }
                RenderOutcome::Cached => tally.blitted += 1,
                RenderOutcome::Hidden | RenderOutcome::Culled => tally.skipped += 1,
            }
        }

        if stats.is_empty() {
            self.overlay.clear();
            self.overlay_rect = None;
        } else {
            self.render_stats(stats);
        }

        self.present();
        tally
    }

    fn render_background(&mut self) {
        match &self.background {
            Background::Solid(colour) => self.frame.fill(*colour),
            Background::Image {
                scaled: Some(image), ..
            } => self.frame.blit(image, glam::IVec2::ZERO),
            Background::Image { scaled: None, .. } => self.frame.fill(Rgba::BLACK),
        }
    }

    fn render_stats(&mut self, stats: &[Stat]) {
        self.overlay = stats
            .iter()
            .map(|s| format!("{}: {}", s.label, s.value))
            .collect();

        let lines = self.overlay.len() as u32;
        let widest = self
            .overlay
            .iter()
            .map(|l| l.chars().count() as u32 * FONT_CHAR_WIDTH)
            .max()
            .unwrap_or(0);

        let content_height =
            lines * FONT_LINE_HEIGHT + 2 * STATS_PADDING + STATS_LINE_GAP * lines.saturating_sub(1);
        let panel_height = content_height.max(STATS_MIN_HEIGHT);
        let panel_width = (widest + 2 * STATS_PADDING).max(STATS_MIN_WIDTH);

        // Bottom-right corner
        let rect = DeviceRect::new(
            self.width as i32 - panel_width as i32 - STATS_PADDING as i32,
            self.height as i32 - panel_height as i32 - STATS_PADDING as i32,
            panel_width as i32,
            panel_height as i32,
        );
        self.frame
            .fill_rect(rect.x, rect.y, panel_width, panel_height, STATS_BACKGROUND);
        self.overlay_rect = Some(rect);
    }

    fn present(&mut self) {
        self.frames_presented += 1;
        log::trace!("presented frame {}", self.frames_presented);
    }

    /// Reconfigure for a new display size
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width.max(1);
        self.height = height.max(1);
        self.frame = Raster::new(self.width, self.height);
        self.scale_background();
        log::info!("canvas resized to {}x{}", self.width, self.height);
    }

    fn scale_background(&mut self) {
        if let Background::Image { source, scaled } = &mut self.background {
            *scaled = Some(source.scaled(self.width, self.height));
        }
    }
}
