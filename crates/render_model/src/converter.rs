//! Convert laid-out pages to a render model
//!
//! Resolves tones to colours, millimetres to points, and right-aligned or
//! multi-span lines to absolutely positioned glyph runs.

use crate::{
    mm_to_pt, text_width, win_ansi_text, Color, GlyphRun, ImageRenderInfo, PageRender, Rect, RenderError,
    RenderItem, RenderModel, Result,
};
use layout_engine::{Align, ContentBlock, Page, RuleWeight, TextLine, Tone};
use serde::{Deserialize, Serialize};

/// Colours used for each tone and decoration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Palette {
    pub ink: Color,
    pub muted: Color,
    pub link: Color,
    pub brand: Color,
    pub strong_rule: Color,
    pub light_rule: Color,
    pub shade: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            ink: Color::BLACK,
            muted: Color::rgb(100, 100, 100),
            link: Color::rgb(5, 99, 193),
            brand: Color::rgb(26, 115, 232),
            strong_rule: Color::rgb(126, 126, 126),
            light_rule: Color::rgb(200, 200, 200),
            shade: Color::rgb(245, 245, 245),
        }
    }
}

impl Palette {
    pub fn tone(&self, tone: Tone) -> Color {
        match tone {
            Tone::Ink => self.ink,
            Tone::Muted => self.muted,
            Tone::Link => self.link,
            Tone::Brand => self.brand,
        }
    }
}

/// Configuration for render conversion
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Background color for pages
    pub page_background: Color,
    pub palette: Palette,
    /// Font family
    pub font_family: String,
    /// Stroke widths in points
    pub strong_rule_width: f64,
    pub light_rule_width: f64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            page_background: Color::WHITE,
            palette: Palette::default(),
            font_family: "Helvetica".to_string(),
            strong_rule_width: 0.6,
            light_rule_width: 0.3,
        }
    }
}

/// Converts layout pages to a render model
#[derive(Debug, Clone, Default)]
pub struct RenderConverter {
    config: RenderConfig,
}

impl RenderConverter {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Convert laid-out pages to a render model
    pub fn convert(&self, pages: &[Page]) -> Result<RenderModel> {
        if pages.is_empty() {
            return Err(RenderError::InvalidLayout("no pages to render".to_string()));
        }

        let mut model = RenderModel::new();
        for page in pages {
            model.add_page(self.convert_page(page)?);
        }
        Ok(model)
    }

    fn convert_page(&self, page: &Page) -> Result<PageRender> {
        if !(page.width.is_finite() && page.height.is_finite() && page.width > 0.0 && page.height > 0.0) {
            return Err(RenderError::InvalidLayout(format!(
                "page {} has invalid size {}x{}",
                page.index, page.width, page.height
            )));
        }

        let bounds = Rect::from_mm(page.bounds());
        let mut page_render = PageRender {
            page_index: page.index as u32,
            width: bounds.width,
            height: bounds.height,
            items: Vec::new(),
        };

        page_render.items.push(RenderItem::Rectangle {
            bounds,
            fill: Some(self.config.page_background),
            stroke: None,
            stroke_width: 0.0,
        });

        for block in &page.blocks {
            self.convert_block(block, &mut page_render.items);
        }

        Ok(page_render)
    }

    fn convert_block(&self, block: &ContentBlock, items: &mut Vec<RenderItem>) {
        let palette = &self.config.palette;

        for fill in &block.fills {
            items.push(RenderItem::Rectangle {
                bounds: Rect::from_mm(*fill),
                fill: Some(palette.shade),
                stroke: None,
                stroke_width: 0.0,
            });
        }

        for rule in &block.rules {
            let (color, width) = match rule.weight {
                RuleWeight::Strong => (palette.strong_rule, self.config.strong_rule_width),
                RuleWeight::Light => (palette.light_rule, self.config.light_rule_width),
            };
            items.push(RenderItem::Line {
                x1: mm_to_pt(rule.x1),
                y1: mm_to_pt(rule.y),
                x2: mm_to_pt(rule.x2),
                y2: mm_to_pt(rule.y),
                color,
                width,
            });
        }

        if let Some(image) = &block.image {
            items.push(RenderItem::Image(ImageRenderInfo {
                bounds: Rect::from_mm(image.bounds),
                logo: image.logo.clone(),
            }));
        }

        for line in &block.lines {
            self.convert_line(line, items);
        }
    }

    /// Position each span of a line, flowing left to right
    fn convert_line(&self, line: &TextLine, items: &mut Vec<RenderItem>) {
        let size = line.font_size as f64;
        let texts: Vec<_> = line.spans.iter().map(|span| win_ansi_text(&span.text)).collect();
        let widths: Vec<f64> = line
            .spans
            .iter()
            .zip(&texts)
            .map(|(span, text)| text_width(text, span.bold, size))
            .collect();
        let total: f64 = widths.iter().sum();

        let anchor = mm_to_pt(line.x);
        let mut x = match line.align {
            Align::Left => anchor,
            Align::Right => anchor - total,
        };
        let y = mm_to_pt(line.baseline);

        for ((span, text), width) in line.spans.iter().zip(texts).zip(widths) {
            if !text.is_empty() {
                let link = (span.tone == Tone::Link && span.text.contains('@'))
                    .then(|| format!("mailto:{}", span.text));
                items.push(RenderItem::GlyphRun(GlyphRun {
                    text: text.into_owned(),
                    font_family: self.config.font_family.clone(),
                    font_size: size,
                    bold: span.bold,
                    color: self.config.palette.tone(span.tone),
                    x,
                    y,
                    width,
                    link,
                }));
            }
            x += width;
        }
    }
}
