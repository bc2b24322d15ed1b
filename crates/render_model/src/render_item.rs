//! Render item types
//!
//! Render coordinates are PostScript points with the origin at the top-left
//! corner of the page and y growing downwards.

use invoice_model::LogoImage;
use serde::{Deserialize, Serialize};

/// Points per millimetre
pub const MM_TO_PT: f64 = 72.0 / 25.4;

/// A rectangle in render coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Convert a layout rectangle (millimetres) to points
    pub fn from_mm(r: layout_engine::Rect) -> Self {
        Self {
            x: mm_to_pt(r.x),
            y: mm_to_pt(r.y),
            width: mm_to_pt(r.width),
            height: mm_to_pt(r.height),
        }
    }
}

pub fn mm_to_pt(mm: f32) -> f64 {
    mm as f64 * MM_TO_PT
}

/// Color representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    /// `#rrggbb`
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

/// A glyph run for rendering text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlyphRun {
    /// The text to render
    pub text: String,
    /// Font family
    pub font_family: String,
    /// Font size in points
    pub font_size: f64,
    pub bold: bool,
    /// Text color
    pub color: Color,
    /// Position (baseline start)
    pub x: f64,
    pub y: f64,
    /// Advance width of the run
    pub width: f64,
    /// Link target, e.g. `mailto:` for an email address
    pub link: Option<String>,
}

/// Image render information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRenderInfo {
    /// Bounds where the image should be rendered
    pub bounds: Rect,
    pub logo: LogoImage,
}

/// Render item types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RenderItem {
    /// A glyph run (text)
    GlyphRun(GlyphRun),
    /// A filled rectangle
    Rectangle {
        bounds: Rect,
        fill: Option<Color>,
        stroke: Option<Color>,
        stroke_width: f64,
    },
    /// A line
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        color: Color,
        width: f64,
    },
    /// An image
    Image(ImageRenderInfo),
}

/// A rendered page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageRender {
    pub page_index: u32,
    pub width: f64,
    pub height: f64,
    pub items: Vec<RenderItem>,
}

impl PageRender {
    /// Text of every glyph run on the page, in paint order
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.items.iter().filter_map(|item| match item {
            RenderItem::GlyphRun(run) => Some(run.text.as_str()),
            _ => None,
        })
    }
}

/// The complete render model
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderModel {
    pub pages: Vec<PageRender>,
}

impl RenderModel {
    pub fn new() -> Self {
        Self { pages: Vec::new() }
    }

    pub fn add_page(&mut self, page: PageRender) {
        self.pages.push(page);
    }
}
