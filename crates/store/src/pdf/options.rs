//! PDF export options

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Options for PDF export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PdfExportOptions {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    /// Flate-compress content streams
    #[serde(default = "default_true")]
    pub compress: bool,
    /// Add link annotations for email addresses
    #[serde(default = "default_true")]
    pub include_links: bool,
    /// Written as the document creation date; omitted when unset so the
    /// same invoice always produces the same bytes
    #[serde(default)]
    pub creation_date: Option<NaiveDate>,
}

fn default_true() -> bool {
    true
}

impl Default for PdfExportOptions {
    fn default() -> Self {
        Self {
            title: None,
            author: None,
            subject: None,
            compress: true,
            include_links: true,
            creation_date: None,
        }
    }
}

impl PdfExportOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn with_compression(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    pub fn with_links(mut self, include_links: bool) -> Self {
        self.include_links = include_links;
        self
    }

    pub fn with_creation_date(mut self, date: NaiveDate) -> Self {
        self.creation_date = Some(date);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = PdfExportOptions::default();
        assert!(options.compress);
        assert!(options.include_links);
        assert!(options.title.is_none());
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let options: PdfExportOptions = serde_json::from_str(r#"{"title":"Invoice INV1"}"#).unwrap();
        assert_eq!(options.title.as_deref(), Some("Invoice INV1"));
        assert!(options.compress);
        assert!(options.include_links);
    }

    #[test]
    fn test_camel_case_fields() {
        let options = PdfExportOptions::new()
            .with_links(false)
            .with_creation_date(NaiveDate::from_ymd_opt(2026, 10, 18).unwrap());
        let json = serde_json::to_string(&options).unwrap();
        assert!(json.contains("\"includeLinks\":false"));
        assert!(json.contains("\"creationDate\":\"2026-10-18\""));
    }
}
