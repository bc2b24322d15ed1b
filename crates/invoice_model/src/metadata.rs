//! Document metadata: parties, payment details and invoice identity

use crate::format::format_date;
use crate::numbering::display_invoice_number;
use crate::LogoImage;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Shown when the client name field is left empty
pub const FALLBACK_CLIENT_NAME: &str = "Client Name";

/// The issuing business
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BusinessProfile {
    pub name: String,
    pub title: String,
    pub address: String,
    pub city: String,
    pub postcode: String,
    pub phone: String,
    pub email: String,
    /// Text drawn in place of a logo image; derived from the name when empty
    pub initials: String,
}

impl BusinessProfile {
    /// Logo placeholder text
    pub fn logo_initials(&self) -> String {
        let explicit = self.initials.trim();
        if !explicit.is_empty() {
            return explicit.to_string();
        }
        self.name
            .split_whitespace()
            .filter_map(|word| word.chars().next())
            .take(2)
            .flat_map(char::to_uppercase)
            .collect()
    }
}

/// The billed client
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClientDetails {
    pub name: String,
    pub phone: String,
    pub mobile: String,
    pub email: String,
    pub address: String,
    pub city: String,
    pub postcode: String,
}

impl ClientDetails {
    pub fn display_name(&self) -> &str {
        let trimmed = self.name.trim();
        if trimmed.is_empty() {
            FALLBACK_CLIENT_NAME
        } else {
            trimmed
        }
    }

    /// Whether any address field is filled in
    pub fn has_address(&self) -> bool {
        [&self.address, &self.city, &self.postcode]
            .iter()
            .any(|field| !field.trim().is_empty())
    }
}

/// Bank transfer details printed in the payment instructions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BankDetails {
    pub account_name: String,
    pub sort_code: String,
    pub account_number: String,
}

/// Everything on the invoice except the line items
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMetadata {
    pub invoice_number: String,
    pub issue_date: NaiveDate,
    pub due_terms: String,
    pub currency_symbol: String,
    pub currency_code: String,
    pub business: BusinessProfile,
    pub client: ClientDetails,
    pub bank: BankDetails,
    #[serde(default)]
    pub logo: Option<LogoImage>,
}

impl DocumentMetadata {
    /// Metadata with GBP currency, "On Receipt" terms and empty parties
    pub fn new(invoice_number: impl Into<String>, issue_date: NaiveDate) -> Self {
        Self {
            invoice_number: invoice_number.into(),
            issue_date,
            due_terms: "On Receipt".to_string(),
            currency_symbol: "£".to_string(),
            currency_code: "GBP".to_string(),
            business: BusinessProfile::default(),
            client: ClientDetails::default(),
            bank: BankDetails::default(),
            logo: None,
        }
    }

    pub fn display_invoice_number(&self) -> &str {
        display_invoice_number(&self.invoice_number)
    }

    pub fn display_date(&self) -> String {
        format_date(self.issue_date)
    }
}
