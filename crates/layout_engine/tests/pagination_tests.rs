//! Integration tests for invoice pagination
//! Tests page bounds, text preservation and determinism of the layout
//!
//! Every property here is checked over the whole page sequence: no block
//! may cross its page's bottom limit, no description text may be lost or
//! duplicated, and identical inputs must give identical pages.

use chrono::NaiveDate;
use invoice_model::{DocumentMetadata, LineItem, Unit};
use layout_engine::{
    grapheme_len, BlockRole, ContentBlock, LayoutConfig, LayoutEngine, Page, BULLET, NO_DESCRIPTION,
};
use proptest::prelude::*;

fn metadata() -> DocumentMetadata {
    let mut metadata = DocumentMetadata::new("INV20261042", NaiveDate::from_ymd_opt(2026, 10, 18).unwrap());
    metadata.business.name = "Jane Doe".to_string();
    metadata.business.email = "jane@example.com".to_string();
    metadata.client.name = "Acme Ltd".to_string();
    metadata.bank.account_name = "Jane Doe".to_string();
    metadata.bank.sort_code = "00-00-00".to_string();
    metadata.bank.account_number = "12345678".to_string();
    metadata
}

fn rows(pages: &[Page]) -> Vec<&ContentBlock> {
    pages
        .iter()
        .flat_map(|page| page.blocks_with_role(BlockRole::TableRow))
        .collect()
}

/// Description text lines of a row, without bullets or the money columns
fn description_texts(block: &ContentBlock, config: &LayoutConfig) -> Vec<String> {
    let description_x = config.margin + 5.0;
    block
        .lines
        .iter()
        .filter(|line| (line.x - description_x).abs() < 1e-4)
        .map(|line| line.text())
        .collect()
}

fn assert_within_bounds(pages: &[Page], config: &LayoutConfig) {
    for page in pages {
        for block in &page.blocks {
            let limit = if block.role == BlockRole::TableRow {
                config.row_limit()
            } else {
                config.block_limit()
            };
            assert!(
                block.bounds.bottom() <= limit + 1e-3,
                "{:?} block on page {} ends at {} past {}",
                block.role,
                page.index,
                block.bounds.bottom(),
                limit
            );
            assert!(block.bounds.y >= config.margin - 1e-3);
            for rule in &block.rules {
                assert!(rule.y >= block.bounds.y - 1e-3 && rule.y <= block.bounds.bottom() + 1e-3);
            }
            for line in &block.lines {
                assert!(line.baseline > block.bounds.y && line.baseline < block.bounds.bottom() + 1e-3);
            }
        }
    }
}

fn assert_blocks_do_not_overlap(pages: &[Page]) {
    for page in pages {
        let mut previous_bottom = f32::MIN;
        for block in &page.blocks {
            assert!(block.bounds.y >= previous_bottom - 1e-3, "blocks overlap on page {}", page.index);
            previous_bottom = block.bounds.bottom();
        }
    }
}

#[test]
fn test_forty_line_description_spills_without_loss() {
    let description: Vec<String> = (1..=40).map(|i| format!("Deliverable number {}", i)).collect();
    let item = LineItem::new(description.join("\n"), 25.0, 1.0, Unit::Hours);
    let engine = LayoutEngine::a4();
    let pages = engine.layout(&[item], &metadata()).unwrap();

    assert!(pages.len() >= 2);
    assert_eq!(pages.iter().filter(|p| p.has_role(BlockRole::Header)).count(), 1);
    assert_eq!(pages.iter().filter(|p| p.has_role(BlockRole::TableHeader)).count(), 1);
    assert!(pages[0].has_role(BlockRole::Header));

    let emitted: Vec<String> = rows(&pages)
        .iter()
        .flat_map(|row| description_texts(row, engine.config()))
        .collect();
    assert_eq!(emitted, description);

    assert_within_bounds(&pages, engine.config());
    assert_blocks_do_not_overlap(&pages);
}

#[test]
fn test_single_item_total_on_one_page() {
    let pages = LayoutEngine::a4()
        .layout(&[LineItem::new("Consulting", 25.0, 1.0, Unit::Hours)], &metadata())
        .unwrap();
    assert_eq!(pages.len(), 1);

    let header = &pages[0].blocks[0];
    assert!(header.lines.iter().any(|l| l.text() == "GBP £25.00"));
    assert!(header.lines.iter().any(|l| l.text() == "18 OCT 2026"));
    assert!(header.lines.iter().any(|l| l.text() == "INV20261042"));
}

#[test]
fn test_tail_blocks_move_to_a_new_page_together_with_order() {
    // Enough rows to push the tail blocks off page one
    let items: Vec<LineItem> = (0..13)
        .map(|i| LineItem::new(format!("Task {}", i), 10.0, 1.0, Unit::Days))
        .collect();
    let engine = LayoutEngine::a4();
    let pages = engine.layout(&items, &metadata()).unwrap();

    let order: Vec<BlockRole> = pages
        .iter()
        .flat_map(|p| p.blocks.iter().map(|b| b.role))
        .filter(|role| matches!(role, BlockRole::Totals | BlockRole::PaymentInstructions | BlockRole::Footer))
        .collect();
    assert_eq!(
        order,
        vec![BlockRole::Totals, BlockRole::PaymentInstructions, BlockRole::Footer]
    );
    assert_within_bounds(&pages, engine.config());
}

#[test]
fn test_letter_page_layout() {
    let items: Vec<LineItem> = (0..60)
        .map(|i| LineItem::new(format!("Item {}\nsecond line", i), 5.0, 2.0, Unit::Pages))
        .collect();
    let engine = LayoutEngine::letter();
    let pages = engine.layout(&items, &metadata()).unwrap();
    assert!(pages.len() > 2);
    assert!(pages.iter().all(|p| (p.height - 279.4).abs() < 1e-3));
    assert_eq!(rows(&pages).len(), 60);
    assert_within_bounds(&pages, engine.config());
}

#[test]
fn test_placeholder_and_bullets() {
    let items = vec![LineItem::new("   ", 25.0, 2.0, Unit::Hours)];
    let pages = LayoutEngine::a4().layout(&items, &metadata()).unwrap();
    let row = rows(&pages)[0];
    assert_eq!(row.lines[0].text(), BULLET);
    assert_eq!(row.lines[1].text(), NO_DESCRIPTION);
}

#[test]
fn test_whitespace_description_with_zero_quantity_keeps_its_row() {
    let items = vec![
        LineItem::new("   ", 25.0, 0.0, Unit::Hours),
        LineItem::new("", 25.0, 0.0, Unit::Hours),
    ];
    let pages = LayoutEngine::a4().layout(&items, &metadata()).unwrap();
    let rows = rows(&pages);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].lines[1].text(), NO_DESCRIPTION);
}

fn arb_item() -> impl Strategy<Value = LineItem> {
    (
        "[a-zA-Z0-9 ,.\n]{0,260}",
        0.0f64..500.0,
        prop_oneof![Just(0.0f64), 0.0f64..40.0],
        prop::sample::select(Unit::ALL.to_vec()),
    )
        .prop_map(|(description, rate, qty, unit)| LineItem::new(description, rate, qty, unit))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_layout_is_idempotent(items in prop::collection::vec(arb_item(), 0..30)) {
        let engine = LayoutEngine::a4();
        let first = engine.layout(&items, &metadata()).unwrap();
        let second = engine.layout(&items, &metadata()).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_pages_respect_bounds_and_width(items in prop::collection::vec(arb_item(), 0..30)) {
        let engine = LayoutEngine::a4();
        let config = engine.config().clone();
        let pages = engine.layout(&items, &metadata()).unwrap();

        assert_within_bounds(&pages, &config);
        for row in rows(&pages) {
            for text in description_texts(row, &config) {
                prop_assert!(grapheme_len(&text) <= config.wrap_width);
            }
        }
        for (i, page) in pages.iter().enumerate() {
            prop_assert_eq!(page.index, i);
        }
    }

    #[test]
    fn prop_every_billable_item_appears_once_in_order(items in prop::collection::vec(arb_item(), 0..30)) {
        let pages = LayoutEngine::a4().layout(&items, &metadata()).unwrap();
        let mut seen = Vec::new();
        for row in rows(&pages) {
            if !row.continuation {
                seen.push(row.item_id.unwrap());
            }
        }
        let expected: Vec<_> = items.iter().filter(|i| i.is_billable()).map(|i| i.id).collect();
        prop_assert_eq!(seen, expected);
    }
}
