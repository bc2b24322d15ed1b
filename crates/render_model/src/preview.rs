//! HTML preview renderer
//!
//! Renders the same render model the document export uses as absolutely
//! positioned HTML, one `<section>` per page, so the preview matches the
//! exported file line for line.

use crate::{DocumentRenderer, GlyphRun, PageRender, Rect, RenderConverter, RenderError, RenderItem};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use layout_engine::Page;
use std::fmt::Write;

/// Renders pages to an HTML fragment
#[derive(Debug, Clone, Default)]
pub struct HtmlPreviewRenderer {
    converter: RenderConverter,
}

impl HtmlPreviewRenderer {
    pub fn new(converter: RenderConverter) -> Self {
        Self { converter }
    }

    fn write_page(&self, out: &mut String, page: &PageRender) {
        let _ = write!(
            out,
            "<section class=\"invoice-page\" data-page=\"{}\" style=\"position:relative;overflow:hidden;width:{}pt;height:{}pt\">",
            page.page_index + 1,
            num(page.width),
            num(page.height)
        );

        for item in &page.items {
            match item {
                RenderItem::Rectangle { bounds, fill, stroke, stroke_width } => {
                    let _ = write!(out, "<div style=\"{}", position(bounds));
                    if let Some(fill) = fill {
                        let _ = write!(out, "background:{};", fill.to_hex());
                    }
                    if let Some(stroke) = stroke {
                        let _ = write!(out, "border:{}pt solid {};box-sizing:border-box;", num(*stroke_width), stroke.to_hex());
                    }
                    out.push_str("\"></div>");
                }
                RenderItem::Line { x1, y1, x2, y2, color, width } => {
                    let bounds = Rect::new(x1.min(*x2), y1.min(*y2) - width / 2.0, (x2 - x1).abs(), 0.0);
                    let _ = write!(
                        out,
                        "<div style=\"{}border-top:{}pt solid {}\"></div>",
                        position(&bounds),
                        num(*width),
                        color.to_hex()
                    );
                }
                RenderItem::Image(image) => {
                    let _ = write!(
                        out,
                        "<img alt=\"Logo\" src=\"data:{};base64,{}\" style=\"{}\">",
                        image.logo.format.mime_type(),
                        STANDARD.encode(image.logo.bytes()),
                        position(&image.bounds)
                    );
                }
                RenderItem::GlyphRun(run) => write_glyph_run(out, run),
            }
        }

        out.push_str("</section>");
    }
}

impl DocumentRenderer for HtmlPreviewRenderer {
    type Output = String;
    type Error = RenderError;

    fn render(&mut self, pages: &[Page]) -> Result<String, RenderError> {
        let model = self.converter.convert(pages)?;
        let mut out = String::from("<div class=\"invoice-preview\">");
        for page in &model.pages {
            self.write_page(&mut out, page);
        }
        out.push_str("</div>");
        tracing::debug!(pages = model.pages.len(), bytes = out.len(), "preview rendered");
        Ok(out)
    }
}

fn write_glyph_run(out: &mut String, run: &GlyphRun) {
    // Place the box so its baseline lands on the run's baseline
    let top = run.y - run.font_size * 0.8;
    let tag = if run.link.is_some() { "a" } else { "span" };
    let _ = write!(out, "<{}", tag);
    if let Some(link) = &run.link {
        let _ = write!(out, " href=\"{}\"", escape_html(link));
    }
    let _ = write!(
        out,
        " style=\"position:absolute;left:{}pt;top:{}pt;font-family:{},Arial,sans-serif;font-size:{}pt;line-height:1;font-weight:{};color:{};white-space:pre\">{}</{}>",
        num(run.x),
        num(top),
        escape_html(&run.font_family),
        num(run.font_size),
        if run.bold { "bold" } else { "normal" },
        run.color.to_hex(),
        escape_html(&run.text),
        tag
    );
}

fn position(bounds: &Rect) -> String {
    format!(
        "position:absolute;left:{}pt;top:{}pt;width:{}pt;height:{}pt;",
        num(bounds.x),
        num(bounds.y),
        num(bounds.width),
        num(bounds.height)
    )
}

/// Two decimals, trailing zeros dropped
fn num(value: f64) -> String {
    let s = format!("{:.2}", value);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

/// Escape text for use in HTML content and attribute values
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use layout_engine::{BlockRole, ContentBlock, TextLine, TextSpan};
    use proptest::prelude::*;

    fn page_with_text(text: &str) -> Page {
        let mut page = Page::new(0, 210.0, 297.0, 15.0);
        let mut block = ContentBlock::new(BlockRole::BillTo, layout_engine::Rect::new(15.0, 20.0, 180.0, 30.0));
        block.push_line(TextLine::new(15.0, 25.0, 12.0, vec![TextSpan::bold(text)]));
        page.blocks.push(block);
        page
    }

    #[test]
    fn test_num_formatting() {
        assert_eq!(num(595.2756), "595.28");
        assert_eq!(num(12.0), "12");
        assert_eq!(num(0.5), "0.5");
        assert_eq!(num(-0.001), "0");
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<b>&\"'"), "&lt;b&gt;&amp;&quot;&#39;");
        assert_eq!(escape_html("£25.00"), "£25.00");
    }

    #[test]
    fn test_render_one_section_per_page() {
        let mut renderer = HtmlPreviewRenderer::default();
        let pages = vec![page_with_text("Acme"), Page::new(1, 210.0, 297.0, 15.0)];
        let html = renderer.render(&pages).unwrap();
        assert_eq!(html.matches("<section").count(), 2);
        assert!(html.contains("data-page=\"2\""));
        assert!(html.contains(">Acme</span>"));
        assert!(html.contains("font-weight:bold"));
        assert!(html.starts_with("<div class=\"invoice-preview\">"));
    }

    #[test]
    fn test_client_text_is_escaped() {
        let mut renderer = HtmlPreviewRenderer::default();
        let html = renderer.render(&[page_with_text("<script>alert(1)</script>")]).unwrap();
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_render_rejects_empty_layout() {
        let mut renderer = HtmlPreviewRenderer::default();
        assert!(renderer.render(&[]).is_err());
    }

    proptest! {
        #[test]
        fn prop_escaped_text_has_no_markup(text in ".{0,80}") {
            let escaped = escape_html(&text);
            prop_assert!(!escaped.contains('<'));
            prop_assert!(!escaped.contains('>'));
            prop_assert!(!escaped.contains('"'));
        }
    }
}
