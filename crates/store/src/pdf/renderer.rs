//! Render model to PDF conversion
//!
//! Render items are positioned in points from the top-left corner; PDF user
//! space starts at the bottom-left, so every y coordinate is flipped against
//! the page height here.

use super::content::ContentStream;
use super::fonts::{encode_win_ansi, FontManager, StandardFont};
use super::images::ImageManager;
use super::objects::{PdfDictionary, PdfObject};
use super::writer::Result;
use render_model::{Color, GlyphRun, ImageRenderInfo, PageRender, Rect, RenderItem};

/// Share of the font size below the baseline covered by a link
const LINK_DESCENT: f64 = 0.2;
/// Share of the font size above the baseline covered by a link
const LINK_ASCENT: f64 = 0.8;

/// A clickable area on a page
#[derive(Debug, Clone, PartialEq)]
pub struct LinkAnnotation {
    /// Lower-left and upper-right corners in PDF user space
    pub rect: [f64; 4],
    pub uri: String,
}

impl LinkAnnotation {
    pub fn to_dictionary(&self) -> PdfDictionary {
        let [x1, y1, x2, y2] = self.rect;
        let mut action = PdfDictionary::new();
        action.insert("S", PdfObject::name("URI"));
        action.insert("URI", PdfObject::text(&self.uri));

        let mut dict = PdfDictionary::new().with_type("Annot");
        dict.insert("Subtype", PdfObject::name("Link"));
        dict.insert("Rect", PdfObject::rect(x1, y1, x2, y2));
        dict.insert(
            "Border",
            PdfObject::Array(vec![PdfObject::Integer(0), PdfObject::Integer(0), PdfObject::Integer(0)]),
        );
        dict.insert("A", action);
        dict
    }
}

/// One page ready to be written
#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub width: f64,
    pub height: f64,
    pub content: ContentStream,
    pub links: Vec<LinkAnnotation>,
}

/// Converts render pages to content streams, collecting the fonts and
/// images they use
pub struct PdfRenderer {
    fonts: FontManager,
    images: ImageManager,
    include_links: bool,
}

impl PdfRenderer {
    pub fn new(include_links: bool) -> Self {
        Self {
            fonts: FontManager::new(),
            images: ImageManager::new(),
            include_links,
        }
    }

    pub fn font_manager(&self) -> &FontManager {
        &self.fonts
    }

    pub fn image_manager(&self) -> &ImageManager {
        &self.images
    }

    pub fn render_page(&mut self, page: &PageRender) -> Result<RenderedPage> {
        let mut content = ContentStream::new();
        let height = page.height;
        let mut texts = Vec::new();

        // Shapes and images first, then all text in one text object
        for item in &page.items {
            match item {
                RenderItem::Rectangle { bounds, fill, stroke, stroke_width } => {
                    render_rectangle(&mut content, bounds, *fill, *stroke, *stroke_width, height);
                }
                RenderItem::Line { x1, y1, x2, y2, color, width } => {
                    content.save_state();
                    set_stroke(&mut content, *color);
                    content
                        .set_line_width(*width)
                        .move_to(*x1, height - y1)
                        .line_to(*x2, height - y2)
                        .stroke()
                        .restore_state();
                }
                RenderItem::Image(image) => self.render_image(&mut content, image, height)?,
                RenderItem::GlyphRun(run) => texts.push(run),
            }
        }

        let mut links = Vec::new();
        if !texts.is_empty() {
            content.begin_text();
            let mut current_font: Option<(StandardFont, f64)> = None;
            let mut current_color: Option<Color> = None;

            for run in texts {
                let font = StandardFont::for_weight(run.bold);
                if current_font != Some((font, run.font_size)) {
                    let name = self.fonts.resource_name(font).to_string();
                    content.set_font(&name, run.font_size);
                    current_font = Some((font, run.font_size));
                }
                if current_color != Some(run.color) {
                    let (r, g, b) = components(run.color);
                    content.set_fill_rgb(r, g, b);
                    current_color = Some(run.color);
                }

                let baseline = height - run.y;
                content
                    .set_text_matrix(1.0, 0.0, 0.0, 1.0, run.x, baseline)
                    .show_text(&encode_win_ansi(&run.text));

                if self.include_links {
                    if let Some(link) = link_for(run, baseline) {
                        links.push(link);
                    }
                }
            }
            content.end_text();
        }

        Ok(RenderedPage {
            width: page.width,
            height,
            content,
            links,
        })
    }

    fn render_image(&mut self, content: &mut ContentStream, image: &ImageRenderInfo, page_height: f64) -> Result<()> {
        let name = self.images.register(&image.logo)?;
        let bounds = image.bounds;
        content
            .save_state()
            .transform(
                bounds.width,
                0.0,
                0.0,
                bounds.height,
                bounds.x,
                page_height - bounds.y - bounds.height,
            )
            .draw_xobject(&name)
            .restore_state();
        Ok(())
    }
}

fn render_rectangle(
    content: &mut ContentStream,
    bounds: &Rect,
    fill: Option<Color>,
    stroke: Option<Color>,
    stroke_width: f64,
    page_height: f64,
) {
    content.save_state();
    if let Some(fill) = fill {
        let (r, g, b) = components(fill);
        content.set_fill_rgb(r, g, b);
    }
    if let Some(stroke) = stroke {
        set_stroke(content, stroke);
        content.set_line_width(stroke_width);
    }
    content.rect(bounds.x, page_height - bounds.y - bounds.height, bounds.width, bounds.height);
    match (fill.is_some(), stroke.is_some()) {
        (true, true) => content.fill_and_stroke(),
        (true, false) => content.fill(),
        (false, true) => content.stroke(),
        (false, false) => content.end_path(),
    };
    content.restore_state();
}

fn set_stroke(content: &mut ContentStream, color: Color) {
    let (r, g, b) = components(color);
    content.set_stroke_rgb(r, g, b);
}

fn components(color: Color) -> (f64, f64, f64) {
    (
        color.r as f64 / 255.0,
        color.g as f64 / 255.0,
        color.b as f64 / 255.0,
    )
}

fn link_for(run: &GlyphRun, baseline: f64) -> Option<LinkAnnotation> {
    let uri = run.link.as_ref()?;
    Some(LinkAnnotation {
        rect: [
            run.x,
            baseline - run.font_size * LINK_DESCENT,
            run.x + run.width,
            baseline + run.font_size * LINK_ASCENT,
        ],
        uri: uri.clone(),
    })
}
