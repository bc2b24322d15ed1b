//! Store - PDF export, settings persistence, and file I/O
//!
//! This crate writes rendered invoices to PDF, persists the application
//! settings that seed new invoices, and provides atomic file output so an
//! interrupted export never leaves a partial file behind.

mod error;
mod file_io;
mod settings;
pub mod pdf;

pub use error::*;
pub use file_io::*;
pub use settings::*;

pub use pdf::{
    export_pdf_bytes, PdfDocumentRenderer, PdfError, PdfExportOptions,
};
