//! Integration tests for layout-to-render conversion and the HTML preview
//! Tests that the preview carries the same content the layout produced

use chrono::NaiveDate;
use invoice_model::{DocumentMetadata, LineItem, Unit};
use layout_engine::LayoutEngine;
use render_model::{DocumentRenderer, HtmlPreviewRenderer, RenderConverter, RenderItem, MM_TO_PT};

fn metadata() -> DocumentMetadata {
    let mut metadata = DocumentMetadata::new("INV20261007", NaiveDate::from_ymd_opt(2026, 10, 7).unwrap());
    metadata.business.name = "Jane Doe".to_string();
    metadata.business.email = "jane@example.com".to_string();
    metadata.client.name = "Smith & Sons".to_string();
    metadata
}

#[test]
fn test_preview_matches_layout_content() {
    let items = vec![
        LineItem::new("Logo design\nTwo revisions", 40.0, 3.0, Unit::Hours),
        LineItem::new("Print run", 0.5, 200.0, Unit::Units),
    ];
    let pages = LayoutEngine::a4().layout(&items, &metadata()).unwrap();
    let html = HtmlPreviewRenderer::default().render(&pages).unwrap();

    assert_eq!(html.matches("<section").count(), pages.len());
    for expected in [
        "INV20261007",
        "7 OCT 2026",
        "Smith &amp; Sons",
        "Logo design",
        "Two revisions",
        "200items",
        "£220.00",
        "GBP £220.00",
        "PAYMENT INSTRUCTIONS:",
        "href=\"mailto:jane@example.com\"",
    ] {
        assert!(html.contains(expected), "preview is missing {}", expected);
    }
}

#[test]
fn test_render_model_keeps_text_inside_page() {
    let items: Vec<LineItem> = (0..50)
        .map(|i| LineItem::new(format!("Task {}", i), 12.5, 1.0, Unit::Days))
        .collect();
    let pages = LayoutEngine::a4().layout(&items, &metadata()).unwrap();
    let model = RenderConverter::default().convert(&pages).unwrap();

    assert_eq!(model.pages.len(), pages.len());
    let bottom_limit = (297.0 - 15.0) * MM_TO_PT;
    for page in &model.pages {
        for item in &page.items {
            if let RenderItem::GlyphRun(run) = item {
                assert!(run.x >= 0.0 && run.x + run.width <= page.width);
                assert!(run.y <= bottom_limit + 1e-6);
            }
        }
    }
}
