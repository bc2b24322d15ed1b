//! Layout tree structure
//!
//! The output of pagination: pages holding positioned, immutable content
//! blocks. Coordinates are millimetres from the page's top-left corner.

use invoice_model::{ItemId, LogoImage};
use serde::{Deserialize, Serialize};

/// A rectangle in layout coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }
}

/// Semantic role of a content block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BlockRole {
    Header,
    BillTo,
    TableHeader,
    TableRow,
    Totals,
    PaymentInstructions,
    Footer,
}

/// Colour role of a text span; renderers map tones to concrete colours
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    #[default]
    Ink,
    Muted,
    Link,
    Brand,
}

/// Horizontal anchoring of a text line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    /// Text starts at the anchor
    #[default]
    Left,
    /// Text ends at the anchor
    Right,
}

/// A run of text with uniform weight and tone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextSpan {
    pub text: String,
    pub bold: bool,
    pub tone: Tone,
}

impl TextSpan {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: false,
            tone: Tone::Ink,
        }
    }

    pub fn bold(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: true,
            tone: Tone::Ink,
        }
    }

    pub fn with_tone(mut self, tone: Tone) -> Self {
        self.tone = tone;
        self
    }
}

/// A single line of text. Spans flow left to right from the anchor (or
/// end at it, for right-aligned lines).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextLine {
    /// Anchor x
    pub x: f32,
    pub baseline: f32,
    pub align: Align,
    /// Font size in points
    pub font_size: f32,
    pub spans: Vec<TextSpan>,
}

impl TextLine {
    pub fn new(x: f32, baseline: f32, font_size: f32, spans: Vec<TextSpan>) -> Self {
        Self {
            x,
            baseline,
            align: Align::Left,
            font_size,
            spans,
        }
    }

    pub fn right_aligned(mut self) -> Self {
        self.align = Align::Right;
        self
    }

    /// Concatenated text of all spans
    pub fn text(&self) -> String {
        self.spans.iter().map(|span| span.text.as_str()).collect()
    }
}

/// Weight of a horizontal rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleWeight {
    Strong,
    Light,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HorizontalRule {
    pub x1: f32,
    pub x2: f32,
    pub y: f32,
    pub weight: RuleWeight,
}

/// A logo placed on the page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImagePlacement {
    pub bounds: Rect,
    pub logo: LogoImage,
}

/// A positioned, measured unit of content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentBlock {
    pub role: BlockRole,
    pub bounds: Rect,
    pub lines: Vec<TextLine>,
    pub rules: Vec<HorizontalRule>,
    /// Shaded background rectangles
    pub fills: Vec<Rect>,
    pub image: Option<ImagePlacement>,
    /// The line item a table row belongs to
    pub item_id: Option<ItemId>,
    /// Set on the second and later fragments of a row split across pages
    pub continuation: bool,
}

impl ContentBlock {
    pub fn new(role: BlockRole, bounds: Rect) -> Self {
        Self {
            role,
            bounds,
            lines: Vec::new(),
            rules: Vec::new(),
            fills: Vec::new(),
            image: None,
            item_id: None,
            continuation: false,
        }
    }

    pub fn push_line(&mut self, line: TextLine) {
        self.lines.push(line);
    }

    pub fn push_rule(&mut self, x1: f32, x2: f32, y: f32, weight: RuleWeight) {
        self.rules.push(HorizontalRule { x1, x2, y, weight });
    }
}

/// A fixed-size page in the layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// Page index (0-based)
    pub index: usize,
    pub width: f32,
    pub height: f32,
    pub margin: f32,
    pub blocks: Vec<ContentBlock>,
}

impl Page {
    pub fn new(index: usize, width: f32, height: f32, margin: f32) -> Self {
        Self {
            index,
            width,
            height,
            margin,
            blocks: Vec::new(),
        }
    }

    /// Full page bounds
    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }

    /// Blocks with the given role, in placement order
    pub fn blocks_with_role(&self, role: BlockRole) -> impl Iterator<Item = &ContentBlock> {
        self.blocks.iter().filter(move |block| block.role == role)
    }

    pub fn has_role(&self, role: BlockRole) -> bool {
        self.blocks.iter().any(|block| block.role == role)
    }
}
