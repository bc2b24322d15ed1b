//! Page and layout configuration
//!
//! All lengths are in millimetres, measured from the top-left corner of the
//! page. Font sizes are in points.

use crate::{LayoutError, Result};
use serde::{Deserialize, Serialize};

/// Standard page sizes
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageSize {
    /// A4 (210mm x 297mm)
    #[default]
    A4,
    /// US Letter (8.5" x 11")
    Letter,
    /// Custom size in millimetres
    Custom { width: f32, height: f32 },
}

impl PageSize {
    /// Width and height in millimetres
    pub fn dimensions(&self) -> (f32, f32) {
        match self {
            PageSize::A4 => (210.0, 297.0),
            PageSize::Letter => (215.9, 279.4),
            PageSize::Custom { width, height } => (*width, *height),
        }
    }
}

/// Layout metrics for the invoice template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    pub page_width: f32,
    pub page_height: f32,
    /// Uniform page margin
    pub margin: f32,
    /// Extra space kept free below the last table row of a page
    pub reserved_footer_margin: f32,

    /// Vertical advance of one description line
    pub line_height: f32,
    /// Padding added to the description lines of a row
    pub row_padding: f32,
    pub min_row_height: f32,
    /// Space between a row's separator and the next row
    pub row_gap: f32,
    /// Maximum characters per emitted description line
    pub wrap_width: usize,

    pub header_height: f32,
    pub bill_to_height: f32,
    pub table_header_height: f32,
    /// Gap between the header, bill-to and table-header regions
    pub region_gap: f32,
    /// Gap between the table header and the first row
    pub table_gap: f32,

    pub totals_height: f32,
    pub totals_gap: f32,
    pub totals_width: f32,
    pub payment_height: f32,
    pub payment_gap: f32,
    pub footer_height: f32,
    pub footer_gap: f32,

    /// Column offsets from the left margin
    pub rate_column: f32,
    pub quantity_column: f32,
    /// Offset of the business column in the header
    pub business_column: f32,
    /// Offset of the client address column in the bill-to block
    pub address_column: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self::a4()
    }
}

impl LayoutConfig {
    /// A4 invoice with a 15mm margin
    pub fn a4() -> Self {
        Self::for_page(PageSize::A4)
    }

    /// US Letter invoice with a 15mm margin
    pub fn letter() -> Self {
        Self::for_page(PageSize::Letter)
    }

    pub fn for_page(size: PageSize) -> Self {
        let (page_width, page_height) = size.dimensions();
        Self {
            page_width,
            page_height,
            margin: 15.0,
            reserved_footer_margin: 12.0,
            line_height: 5.0,
            row_padding: 2.0,
            min_row_height: 8.0,
            row_gap: 3.0,
            wrap_width: 60,
            header_height: 48.0,
            bill_to_height: 30.0,
            table_header_height: 10.0,
            region_gap: 5.0,
            table_gap: 2.0,
            totals_height: 21.0,
            totals_gap: 5.0,
            totals_width: 60.0,
            payment_height: 32.0,
            payment_gap: 10.0,
            footer_height: 8.0,
            footer_gap: 8.0,
            rate_column: 110.0,
            quantity_column: 135.0,
            business_column: 50.0,
            address_column: 60.0,
        }
    }

    pub fn with_margin(mut self, margin: f32) -> Self {
        self.margin = margin;
        self
    }

    pub fn with_page_height(mut self, page_height: f32) -> Self {
        self.page_height = page_height;
        self
    }

    pub fn content_width(&self) -> f32 {
        self.page_width - 2.0 * self.margin
    }

    /// Right edge of the content area
    pub fn content_right(&self) -> f32 {
        self.page_width - self.margin
    }

    /// Lowest y a table row may reach
    pub fn row_limit(&self) -> f32 {
        self.page_height - self.margin - self.reserved_footer_margin
    }

    /// Lowest y any other block may reach
    pub fn block_limit(&self) -> f32 {
        self.page_height - self.margin
    }

    /// Height of the page-one regions above the first table row
    pub fn first_page_fixed_height(&self) -> f32 {
        self.header_height
            + self.region_gap
            + self.bill_to_height
            + self.region_gap
            + self.table_header_height
            + self.table_gap
    }

    /// The least vertical space between the margins that still lets every
    /// block be placed: page one with a single row, and each tail block
    /// alone on a fresh page.
    pub fn minimum_content_height(&self) -> f32 {
        let first_page =
            self.first_page_fixed_height() + self.min_row_height + self.reserved_footer_margin;
        [first_page, self.totals_height, self.payment_height, self.footer_height]
            .into_iter()
            .fold(0.0, f32::max)
    }

    /// Check the metrics describe a usable page
    pub fn validate(&self) -> Result<()> {
        let lengths = [
            ("page width", self.page_width),
            ("page height", self.page_height),
            ("line height", self.line_height),
            ("minimum row height", self.min_row_height),
            ("header height", self.header_height),
            ("bill-to height", self.bill_to_height),
            ("table header height", self.table_header_height),
            ("totals height", self.totals_height),
            ("payment height", self.payment_height),
            ("footer height", self.footer_height),
        ];
        for (name, value) in lengths {
            if !value.is_finite() || value <= 0.0 {
                return Err(LayoutError::InvalidConfig(format!(
                    "{} must be positive, got {}",
                    name, value
                )));
            }
        }

        let spacings = [
            ("margin", self.margin),
            ("reserved footer margin", self.reserved_footer_margin),
            ("row padding", self.row_padding),
            ("row gap", self.row_gap),
            ("region gap", self.region_gap),
            ("table gap", self.table_gap),
            ("totals gap", self.totals_gap),
            ("payment gap", self.payment_gap),
            ("footer gap", self.footer_gap),
        ];
        for (name, value) in spacings {
            if !value.is_finite() || value < 0.0 {
                return Err(LayoutError::InvalidConfig(format!(
                    "{} must not be negative, got {}",
                    name, value
                )));
            }
        }

        if self.wrap_width < 2 {
            return Err(LayoutError::InvalidConfig(format!(
                "wrap width must be at least 2 characters, got {}",
                self.wrap_width
            )));
        }

        if self.min_row_height < self.line_height + self.row_padding {
            return Err(LayoutError::InvalidConfig(format!(
                "minimum row height {} is below one line plus padding ({})",
                self.min_row_height,
                self.line_height + self.row_padding
            )));
        }

        let needed_width = [
            self.quantity_column + 35.0,
            self.rate_column + 20.0,
            self.totals_width,
            self.address_column + 20.0,
            self.business_column + 20.0,
        ]
        .into_iter()
        .fold(0.0, f32::max);
        if self.content_width() < needed_width {
            return Err(LayoutError::DegeneratePage(format!(
                "content width {:.1}mm is narrower than the {:.1}mm table",
                self.content_width(),
                needed_width
            )));
        }

        let needed_height = 2.0 * self.margin + self.minimum_content_height();
        if self.page_height <= needed_height {
            return Err(LayoutError::DegeneratePage(format!(
                "page height {:.1}mm must exceed {:.1}mm (2 x margin + minimum content)",
                self.page_height, needed_height
            )));
        }

        Ok(())
    }
}
