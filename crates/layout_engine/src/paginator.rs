//! Pagination
//!
//! Flows an invoice onto fixed-size pages. Page one carries the header,
//! bill-to and table-header regions; table rows follow in input order and
//! overflow onto continuation pages (the table header is not repeated);
//! the totals, payment-instructions and footer blocks close the document.
//!
//! A block never crosses the bottom limit of its page. Only a row whose
//! description is taller than a whole page is split, at wrapped-line
//! boundaries.

use crate::{
    wrap_description, BlockRole, ContentBlock, LayoutConfig, LayoutError, Page, Rect, Result,
    RuleWeight, TextLine, TextSpan, Tone, WrappedLine,
};
use invoice_model::{format_money, format_number, DocumentMetadata, LineItem, Totals, TotalsCalculator};

const EPSILON: f32 = 1e-3;

const TITLE_SIZE: f32 = 12.0;
const BODY_SIZE: f32 = 10.0;
const ROW_SIZE: f32 = 9.0;
const SMALL_SIZE: f32 = 9.0;
const NAME_SIZE: f32 = 14.0;
const INITIALS_SIZE: f32 = 28.0;

/// Marker line shown for a row without description text
pub const NO_DESCRIPTION: &str = "No description";
pub const BULLET: &str = "\u{2022}";

/// Tracks the page being filled and the vertical cursor on it
struct PageFlow<'a> {
    config: &'a LayoutConfig,
    pages: Vec<Page>,
    current: Page,
    cursor: f32,
}

impl<'a> PageFlow<'a> {
    fn new(config: &'a LayoutConfig) -> Self {
        Self {
            config,
            pages: Vec::new(),
            current: Page::new(0, config.page_width, config.page_height, config.margin),
            cursor: config.margin,
        }
    }

    fn new_page(&mut self) {
        let index = self.current.index + 1;
        let next = Page::new(index, self.config.page_width, self.config.page_height, self.config.margin);
        self.pages.push(std::mem::replace(&mut self.current, next));
        self.cursor = self.config.margin;
    }

    fn at_page_top(&self) -> bool {
        (self.cursor - self.config.margin).abs() < EPSILON
    }

    fn fits(&self, top: f32, height: f32, limit: f32) -> bool {
        top + height <= limit + EPSILON
    }

    fn push(&mut self, block: ContentBlock) {
        self.current.blocks.push(block);
    }

    /// Place a non-row block below the cursor, moving to a new page first if
    /// it would cross the bottom margin.
    fn place_tail(&mut self, gap: f32, height: f32, build: impl FnOnce(f32) -> ContentBlock) {
        let mut top = self.cursor + gap;
        if !self.fits(top, height, self.config.block_limit()) {
            self.new_page();
            top = self.cursor;
        }
        self.push(build(top));
        self.cursor = top + height;
    }

    fn finish(mut self) -> Vec<Page> {
        self.pages.push(self.current);
        self.pages
    }
}

/// Lays out invoices according to a [`LayoutConfig`]
#[derive(Debug, Clone, Default)]
pub struct LayoutEngine {
    config: LayoutConfig,
}

impl LayoutEngine {
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    pub fn a4() -> Self {
        Self::new(LayoutConfig::a4())
    }

    pub fn letter() -> Self {
        Self::new(LayoutConfig::letter())
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Lay out the invoice into pages.
    ///
    /// Either returns the complete page sequence or fails before producing
    /// anything. The result depends only on the inputs and the config.
    pub fn layout(&self, items: &[LineItem], metadata: &DocumentMetadata) -> Result<Vec<Page>> {
        self.config.validate()?;

        let config = &self.config;
        let totals = TotalsCalculator::summarize(items);
        let mut flow = PageFlow::new(config);

        let header_top = flow.cursor;
        flow.push(self.header_block(header_top, metadata, &totals));
        let bill_to_top = header_top + config.header_height + config.region_gap;
        flow.push(self.bill_to_block(bill_to_top, metadata));
        let table_top = bill_to_top + config.bill_to_height + config.region_gap;
        flow.push(self.table_header_block(table_top));
        flow.cursor = table_top + config.table_header_height + config.table_gap;

        let mut rows = 0;
        for item in items.iter().filter(|item| item.is_billable()) {
            self.place_row(&mut flow, item, metadata)?;
            rows += 1;
        }

        flow.place_tail(config.totals_gap, config.totals_height, |top| {
            self.totals_block(top, metadata, &totals)
        });
        flow.place_tail(config.payment_gap, config.payment_height, |top| {
            self.payment_block(top, metadata)
        });
        flow.place_tail(config.footer_gap, config.footer_height, |top| {
            self.footer_block(top, metadata)
        });

        let pages = flow.finish();
        tracing::debug!(pages = pages.len(), rows, "invoice laid out");
        Ok(pages)
    }

    fn row_height(&self, line_count: usize) -> f32 {
        let config = &self.config;
        (line_count as f32 * config.line_height + config.row_padding).max(config.min_row_height)
    }

    /// How many description lines fit in one row starting at `top`
    fn lines_fitting(&self, top: f32) -> usize {
        let config = &self.config;
        let limit = config.row_limit();
        if top + config.min_row_height > limit + EPSILON {
            return 0;
        }
        let lines = ((limit - top - config.row_padding) / config.line_height + EPSILON).floor();
        (lines.max(1.0)) as usize
    }

    fn place_row(&self, flow: &mut PageFlow<'_>, item: &LineItem, metadata: &DocumentMetadata) -> Result<()> {
        let config = &self.config;
        let mut lines = wrap_description(&item.description, config.wrap_width);
        let placeholder = lines.is_empty();
        if placeholder {
            lines.push(WrappedLine {
                text: NO_DESCRIPTION.to_string(),
                starts_line: true,
            });
        }

        let height = self.row_height(lines.len());
        let limit = config.row_limit();

        if !flow.fits(flow.cursor, height, limit) && flow.fits(config.margin, height, limit) {
            flow.new_page();
        }

        if flow.fits(flow.cursor, height, limit) {
            let block = self.row_block(flow.cursor, item, metadata, &lines, placeholder, false);
            flow.push(block);
            flow.cursor += height + config.row_gap;
            return Ok(());
        }

        // Taller than a fresh page: split at line boundaries
        let mut remaining = &lines[..];
        let mut continuation = false;
        while !remaining.is_empty() {
            let capacity = self.lines_fitting(flow.cursor);
            if capacity == 0 {
                if flow.at_page_top() {
                    return Err(LayoutError::DegeneratePage(
                        "no room for a single table row on a fresh page".to_string(),
                    ));
                }
                flow.new_page();
                continue;
            }

            let take = capacity.min(remaining.len());
            let (fragment, rest) = remaining.split_at(take);
            let block = self.row_block(flow.cursor, item, metadata, fragment, placeholder, continuation);
            flow.cursor += self.row_height(fragment.len()) + config.row_gap;
            flow.push(block);
            remaining = rest;
            continuation = true;

            if !remaining.is_empty() {
                flow.new_page();
            }
        }

        tracing::debug!(id = %item.id, "table row split across pages");
        Ok(())
    }

    fn line_baseline(&self, top: f32, index: usize) -> f32 {
        let config = &self.config;
        top + config.row_padding / 2.0 + index as f32 * config.line_height + config.line_height * 0.7
    }

    fn row_block(
        &self,
        top: f32,
        item: &LineItem,
        metadata: &DocumentMetadata,
        lines: &[WrappedLine],
        placeholder: bool,
        continuation: bool,
    ) -> ContentBlock {
        let config = &self.config;
        let left = config.margin;
        let right = config.content_right();
        let height = self.row_height(lines.len());

        let mut block = ContentBlock::new(BlockRole::TableRow, Rect::new(left, top, config.content_width(), height));
        block.item_id = Some(item.id);
        block.continuation = continuation;

        let tone = if placeholder { Tone::Muted } else { Tone::Ink };
        for (i, line) in lines.iter().enumerate() {
            let baseline = self.line_baseline(top, i);
            if line.starts_line {
                block.push_line(TextLine::new(left + 2.0, baseline, ROW_SIZE, vec![TextSpan::plain(BULLET).with_tone(tone)]));
            }
            block.push_line(TextLine::new(left + 5.0, baseline, ROW_SIZE, vec![TextSpan::plain(line.text.clone()).with_tone(tone)]));
        }

        if !continuation {
            let baseline = self.line_baseline(top, 0);
            let symbol = &metadata.currency_symbol;
            block.push_line(TextLine::new(
                left + config.rate_column,
                baseline,
                ROW_SIZE,
                vec![TextSpan::plain(format!("{}{}", symbol, format_number(item.unit_rate())))],
            ));
            block.push_line(TextLine::new(
                left + config.quantity_column,
                baseline,
                ROW_SIZE,
                vec![TextSpan::plain(format!("{}{}", format_number(item.quantity()), item.unit.suffix()))],
            ));
            block.push_line(
                TextLine::new(right - 2.0, baseline, ROW_SIZE, vec![TextSpan::plain(format_money(symbol, item.amount()))])
                    .right_aligned(),
            );
        }

        block.push_rule(left, right, top + height, RuleWeight::Light);
        block
    }

    fn header_block(&self, top: f32, metadata: &DocumentMetadata, totals: &Totals) -> ContentBlock {
        let config = &self.config;
        let left = config.margin;
        let right = config.content_right();
        let mut block = ContentBlock::new(BlockRole::Header, Rect::new(left, top, config.content_width(), config.header_height));

        // Logo, or the business initials in its place
        let logo_box = config.business_column - 5.0;
        match &metadata.logo {
            Some(logo) => {
                let mut height = 20.0_f32.min(config.header_height);
                let mut width = height / logo.aspect_ratio();
                if width > logo_box {
                    width = logo_box;
                    height = width * logo.aspect_ratio();
                }
                block.image = Some(crate::ImagePlacement {
                    bounds: Rect::new(left, top, width, height),
                    logo: logo.clone(),
                });
            }
            None => {
                let initials = metadata.business.logo_initials();
                if !initials.is_empty() {
                    block.push_line(TextLine::new(
                        left,
                        top + 12.0,
                        INITIALS_SIZE,
                        vec![TextSpan::bold(initials).with_tone(Tone::Brand)],
                    ));
                }
            }
        }

        let business = &metadata.business;
        let column = left + config.business_column;
        block.push_line(TextLine::new(column, top + 5.0, NAME_SIZE, vec![TextSpan::bold(business.name.clone())]));
        let details = [
            &business.title,
            &business.address,
            &business.city,
            &business.postcode,
            &business.phone,
            &business.email,
        ];
        let mut baseline = top + 10.0;
        for field in details.iter().filter(|field| !field.trim().is_empty()) {
            block.push_line(TextLine::new(
                column,
                baseline,
                BODY_SIZE,
                vec![TextSpan::plain(field.trim()).with_tone(Tone::Muted)],
            ));
            baseline += 4.5;
        }

        let balance = format!(
            "{} {}",
            metadata.currency_code,
            format_money(&metadata.currency_symbol, totals.balance_due)
        );
        let summary = [
            (top + 5.0, TITLE_SIZE, TextSpan::bold("INVOICE")),
            (top + 10.0, BODY_SIZE, TextSpan::plain(metadata.display_invoice_number())),
            (top + 16.0, BODY_SIZE, TextSpan::bold("DATE")),
            (top + 21.0, BODY_SIZE, TextSpan::plain(metadata.display_date())),
            (top + 27.0, BODY_SIZE, TextSpan::bold("DUE")),
            (top + 32.0, BODY_SIZE, TextSpan::plain(metadata.due_terms.clone())),
            (top + 38.0, BODY_SIZE, TextSpan::bold("BALANCE DUE")),
            (top + 43.5, TITLE_SIZE, TextSpan::bold(balance)),
        ];
        for (baseline, size, span) in summary {
            block.push_line(TextLine::new(right, baseline, size, vec![span]).right_aligned());
        }

        block.push_rule(left, right, top + config.header_height, RuleWeight::Strong);
        block
    }

    fn bill_to_block(&self, top: f32, metadata: &DocumentMetadata) -> ContentBlock {
        let config = &self.config;
        let left = config.margin;
        let client = &metadata.client;
        let mut block = ContentBlock::new(BlockRole::BillTo, Rect::new(left, top, config.content_width(), config.bill_to_height));

        block.push_line(TextLine::new(left, top + 3.5, SMALL_SIZE, vec![TextSpan::plain("BILL TO").with_tone(Tone::Muted)]));
        block.push_line(TextLine::new(left, top + 9.0, TITLE_SIZE, vec![TextSpan::bold(client.display_name())]));

        let contact = [&client.phone, &client.mobile, &client.email];
        let mut baseline = top + 14.5;
        for field in contact.iter().filter(|field| !field.trim().is_empty()) {
            block.push_line(TextLine::new(left, baseline, BODY_SIZE, vec![TextSpan::plain(field.trim())]));
            baseline += 4.5;
        }

        if client.has_address() {
            let column = left + config.address_column;
            block.push_line(TextLine::new(column, top + 9.0, BODY_SIZE, vec![TextSpan::bold("Address:")]));
            let address = [&client.address, &client.city, &client.postcode];
            let mut baseline = top + 14.5;
            for field in address.iter().filter(|field| !field.trim().is_empty()) {
                block.push_line(TextLine::new(column, baseline, BODY_SIZE, vec![TextSpan::plain(field.trim())]));
                baseline += 4.5;
            }
        }

        block
    }

    fn table_header_block(&self, top: f32) -> ContentBlock {
        let config = &self.config;
        let left = config.margin;
        let right = config.content_right();
        let height = config.table_header_height;
        let bounds = Rect::new(left, top, config.content_width(), height);
        let mut block = ContentBlock::new(BlockRole::TableHeader, bounds);

        block.fills.push(bounds);
        block.push_rule(left, right, top, RuleWeight::Strong);
        block.push_rule(left, right, top + height, RuleWeight::Strong);

        let baseline = top + height * 0.65;
        block.push_line(TextLine::new(left + 2.0, baseline, BODY_SIZE, vec![TextSpan::bold("DESCRIPTION")]));
        block.push_line(TextLine::new(left + config.rate_column, baseline, BODY_SIZE, vec![TextSpan::bold("RATE")]));
        block.push_line(TextLine::new(left + config.quantity_column, baseline, BODY_SIZE, vec![TextSpan::bold("QTY")]));
        block.push_line(TextLine::new(right - 2.0, baseline, BODY_SIZE, vec![TextSpan::bold("AMOUNT")]).right_aligned());
        block
    }

    fn totals_block(&self, top: f32, metadata: &DocumentMetadata, totals: &Totals) -> ContentBlock {
        let config = &self.config;
        let right = config.content_right();
        let left = right - config.totals_width;
        let symbol = &metadata.currency_symbol;
        let mut block = ContentBlock::new(BlockRole::Totals, Rect::new(left, top, config.totals_width, config.totals_height));

        block.push_line(TextLine::new(left, top + 5.0, BODY_SIZE, vec![TextSpan::plain("SUBTOTAL")]));
        block.push_line(
            TextLine::new(right, top + 5.0, BODY_SIZE, vec![TextSpan::plain(format_money(symbol, totals.subtotal))]).right_aligned(),
        );
        block.push_rule(left, right, top + 7.0, RuleWeight::Light);

        block.push_line(TextLine::new(left, top + 12.0, BODY_SIZE, vec![TextSpan::bold("TOTAL")]));
        block.push_line(
            TextLine::new(right, top + 12.0, BODY_SIZE, vec![TextSpan::bold(format_money(symbol, totals.total))]).right_aligned(),
        );
        block.push_rule(left, right, top + 14.0, RuleWeight::Light);

        let balance = format!("{} {}", metadata.currency_code, format_money(symbol, totals.balance_due));
        block.push_line(TextLine::new(left, top + 19.0, 11.0, vec![TextSpan::bold("BALANCE DUE")]));
        block.push_line(TextLine::new(right, top + 19.0, 11.0, vec![TextSpan::bold(balance)]).right_aligned());
        block
    }

    fn payment_block(&self, top: f32, metadata: &DocumentMetadata) -> ContentBlock {
        let config = &self.config;
        let left = config.margin;
        let bank = &metadata.bank;
        let mut block = ContentBlock::new(
            BlockRole::PaymentInstructions,
            Rect::new(left, top, config.content_width(), config.payment_height),
        );

        block.push_rule(left, config.content_right(), top, RuleWeight::Strong);
        block.push_line(TextLine::new(left, top + 7.0, TITLE_SIZE, vec![TextSpan::bold("PAYMENT INSTRUCTIONS:")]));
        block.push_line(TextLine::new(
            left,
            top + 13.0,
            BODY_SIZE,
            vec![TextSpan::plain("Please transfer the payment to the following account:")],
        ));

        let fields = [
            (top + 19.0, "Name: ", &bank.account_name),
            (top + 24.0, "Sort Code: ", &bank.sort_code),
            (top + 29.0, "Account Number: ", &bank.account_number),
        ];
        for (baseline, label, value) in fields {
            block.push_line(TextLine::new(
                left,
                baseline,
                BODY_SIZE,
                vec![TextSpan::bold(label), TextSpan::plain(value.clone())],
            ));
        }
        block
    }

    fn footer_block(&self, top: f32, metadata: &DocumentMetadata) -> ContentBlock {
        let config = &self.config;
        let left = config.margin;
        let mut block = ContentBlock::new(BlockRole::Footer, Rect::new(left, top, config.content_width(), config.footer_height));
        block.push_rule(left, config.content_right(), top, RuleWeight::Strong);

        let email = metadata.business.email.trim();
        let spans = if email.is_empty() {
            vec![TextSpan::plain("Please get in touch if you have any questions regarding this invoice.").with_tone(Tone::Muted)]
        } else {
            vec![
                TextSpan::plain("Please email ").with_tone(Tone::Muted),
                TextSpan::plain(email).with_tone(Tone::Link),
                TextSpan::plain(" if you have any questions regarding this invoice.").with_tone(Tone::Muted),
            ]
        };
        block.push_line(TextLine::new(left, top + 6.0, SMALL_SIZE, spans));
        block
    }
}

/// Lay out `items` on A4-width pages of the given height and margin
pub fn layout(items: &[LineItem], metadata: &DocumentMetadata, page_height: f32, margin: f32) -> Result<Vec<Page>> {
    let config = LayoutConfig::a4().with_page_height(page_height).with_margin(margin);
    LayoutEngine::new(config).layout(items, metadata)
}
