//! Billable line items

use crate::ItemId;
use serde::{Deserialize, Serialize};

/// Billing unit of a line item
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    #[default]
    #[serde(alias = "hrs")]
    Hours,
    Days,
    #[serde(alias = "items")]
    Units,
    Pages,
}

impl Unit {
    /// All units, in the order a picker shows them
    pub const ALL: [Unit; 4] = [Unit::Hours, Unit::Days, Unit::Units, Unit::Pages];

    /// Suffix appended to the quantity column ("1hrs", "3items")
    pub fn suffix(&self) -> &'static str {
        match self {
            Unit::Hours => "hrs",
            Unit::Days => "days",
            Unit::Units => "items",
            Unit::Pages => "pages",
        }
    }

    /// Parse a unit from either its name or its suffix
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hours" | "hrs" => Some(Unit::Hours),
            "days" => Some(Unit::Days),
            "units" | "items" => Some(Unit::Units),
            "pages" => Some(Unit::Pages),
            _ => None,
        }
    }
}

/// A single billable row of the invoice.
///
/// The amount is never stored: [`LineItem::amount`] recomputes it from the
/// rate and quantity on every read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub id: ItemId,
    pub description: String,
    unit_rate: f64,
    quantity: f64,
    pub unit: Unit,
}

impl LineItem {
    /// Create a new line item. Rate and quantity are clamped to finite,
    /// non-negative values.
    pub fn new(description: impl Into<String>, unit_rate: f64, quantity: f64, unit: Unit) -> Self {
        Self {
            id: ItemId::new(),
            description: description.into(),
            unit_rate: sanitize_decimal(unit_rate),
            quantity: sanitize_decimal(quantity),
            unit,
        }
    }

    pub fn unit_rate(&self) -> f64 {
        self.unit_rate
    }

    pub fn quantity(&self) -> f64 {
        self.quantity
    }

    pub fn set_unit_rate(&mut self, rate: f64) {
        self.unit_rate = sanitize_decimal(rate);
    }

    pub fn set_quantity(&mut self, quantity: f64) {
        self.quantity = sanitize_decimal(quantity);
    }

    /// `unit_rate * quantity`
    pub fn amount(&self) -> f64 {
        self.unit_rate * self.quantity
    }

    /// Description split on newlines, trimmed, with blank lines dropped
    pub fn description_lines(&self) -> Vec<&str> {
        self.description
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect()
    }

    /// Whether the item belongs in the invoice table: its description is
    /// non-empty (whitespace counts) or its quantity is positive.
    pub fn is_billable(&self) -> bool {
        !self.description.is_empty() || self.quantity > 0.0
    }
}

/// Clamp a decimal to a finite, non-negative value
pub fn sanitize_decimal(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Lenient numeric parsing for rate and quantity inputs.
///
/// Leading whitespace is skipped and the longest numeric prefix is used
/// ("12.5 hrs" parses as 12.5). Anything without a numeric prefix, and any
/// negative or non-finite result, yields 0.
pub fn parse_decimal(input: &str) -> f64 {
    let trimmed = input.trim_start();
    let prefix_len = numeric_prefix_len(trimmed);
    trimmed[..prefix_len]
        .parse::<f64>()
        .map(sanitize_decimal)
        .unwrap_or(0.0)
}

/// Byte length of the longest prefix shaped like a decimal literal
/// (`[+-]digits[.digits][e[+-]digits]`).
fn numeric_prefix_len(s: &str) -> usize {
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        if digits > 0 {
            end = frac_end;
        }
    }

    if digits == 0 {
        return 0;
    }

    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && (bytes[exp_end] == b'+' || bytes[exp_end] == b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    end
}
