//! PDF export
//!
//! Writes the render model of an invoice as a PDF file.
//!
//! # Architecture
//!
//! - `objects`: PDF object model and serializer
//! - `document`: catalog, page tree and info dictionary
//! - `content`: content stream operators
//! - `fonts`: standard Type1 fonts and WinAnsi text encoding
//! - `images`: logo image XObjects
//! - `renderer`: render pages to content streams
//! - `writer`: file structure, cross-reference table, compression
//! - `api`: public entry points

mod api;
mod content;
mod document;
mod fonts;
mod images;
mod objects;
mod options;
mod renderer;
mod writer;

pub use api::*;
pub use fonts::encode_win_ansi;
pub use options::*;
pub use writer::{validate_model, PdfError};
