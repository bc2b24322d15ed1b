//! PDF document structure
//!
//! Catalog, page tree and the document information dictionary.

use super::objects::{PdfDictionary, PdfObject};
use chrono::NaiveDate;

pub const PDF_VERSION: &str = "1.4";

const PRODUCER: &str = "Invoice Generator PDF Export";

/// Document information dictionary contents
#[derive(Debug, Clone, Default)]
pub struct DocumentInfo {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub creation_date: Option<NaiveDate>,
}

impl DocumentInfo {
    pub fn to_dictionary(&self) -> PdfDictionary {
        let mut dict = PdfDictionary::new();
        let fields = [("Title", &self.title), ("Author", &self.author), ("Subject", &self.subject)];
        for (key, value) in fields {
            if let Some(value) = value.as_deref().filter(|v| !v.trim().is_empty()) {
                dict.insert(key, PdfObject::text(value));
            }
        }
        dict.insert("Producer", PdfObject::text(PRODUCER));
        if let Some(date) = self.creation_date {
            dict.insert("CreationDate", PdfObject::text(&pdf_date(date)));
        }
        dict
    }
}

/// `D:YYYYMMDD000000Z`
pub fn pdf_date(date: NaiveDate) -> String {
    format!("D:{}000000Z", date.format("%Y%m%d"))
}

pub fn create_catalog(pages_ref: u32) -> PdfDictionary {
    let mut catalog = PdfDictionary::new().with_type("Catalog");
    catalog.insert("Pages", PdfObject::Reference(pages_ref));
    catalog
}

pub fn create_pages(page_refs: &[u32]) -> PdfDictionary {
    let mut pages = PdfDictionary::new().with_type("Pages");
    pages.insert(
        "Kids",
        PdfObject::Array(page_refs.iter().map(|r| PdfObject::Reference(*r)).collect()),
    );
    pages.insert("Count", PdfObject::Integer(page_refs.len() as i64));
    pages
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_info_skips_blank_fields() {
        let info = DocumentInfo {
            title: Some("Invoice INV20261018".to_string()),
            author: Some("  ".to_string()),
            ..Default::default()
        };
        let dict = info.to_dictionary();
        assert!(dict.get("Title").is_some());
        assert!(dict.get("Author").is_none());
        assert!(dict.get("Producer").is_some());
        assert!(dict.get("CreationDate").is_none());
    }

    #[test]
    fn test_pdf_date() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 9).unwrap();
        assert_eq!(pdf_date(date), "D:20260109000000Z");
    }

    #[test]
    fn test_page_tree() {
        let pages = create_pages(&[4, 7]);
        assert_eq!(pages.get("Count"), Some(&PdfObject::Integer(2)));
        assert_eq!(
            pages.get("Kids"),
            Some(&PdfObject::Array(vec![PdfObject::Reference(4), PdfObject::Reference(7)]))
        );
        assert_eq!(create_catalog(2).get("Pages"), Some(&PdfObject::Reference(2)));
    }
}
