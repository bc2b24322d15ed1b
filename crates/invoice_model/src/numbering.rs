//! Invoice number defaults

use chrono::{Datelike, NaiveDate};
use rand::Rng;

/// Shown when the invoice number field is left empty
pub const FALLBACK_INVOICE_NUMBER: &str = "INV0001";

/// Default invoice number for a new session: `INV<yyyy><mm><nnn>` with a
/// random three-digit suffix in `000..=099`.
pub fn default_invoice_number<R: Rng + ?Sized>(date: NaiveDate, rng: &mut R) -> String {
    let suffix: u32 = rng.gen_range(0..100);
    format!("INV{}{:02}{:03}", date.year(), date.month(), suffix)
}

/// The number as displayed, substituting the fallback for a blank entry
pub fn display_invoice_number(number: &str) -> &str {
    let trimmed = number.trim();
    if trimmed.is_empty() {
        FALLBACK_INVOICE_NUMBER
    } else {
        trimmed
    }
}
