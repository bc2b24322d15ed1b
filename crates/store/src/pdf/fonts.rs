//! PDF font handling
//!
//! Invoices use the standard Type1 fonts every viewer provides, so nothing is
//! embedded. Text is encoded with WinAnsiEncoding, which covers Latin-1 plus
//! the few typographic characters an invoice needs (euro sign, bullet,
//! dashes and curly quotes).

use super::objects::{PdfDictionary, PdfObject};
use render_model::{win_ansi_byte, REPLACEMENT_CHAR};

/// Standard Type1 fonts used for invoice text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StandardFont {
    Helvetica,
    HelveticaBold,
}

impl StandardFont {
    /// PostScript name of the font
    pub fn pdf_name(&self) -> &'static str {
        match self {
            StandardFont::Helvetica => "Helvetica",
            StandardFont::HelveticaBold => "Helvetica-Bold",
        }
    }

    /// Text is laid out with Helvetica metrics, so runs of any family
    /// print in Helvetica
    pub fn for_weight(bold: bool) -> Self {
        if bold {
            StandardFont::HelveticaBold
        } else {
            StandardFont::Helvetica
        }
    }
}

/// A font registered with a document
#[derive(Debug, Clone, PartialEq)]
pub struct FontInfo {
    /// Resource name, e.g. `F1`
    pub name: String,
    pub font: StandardFont,
}

/// Assigns resource names to fonts in first-use order
#[derive(Debug, Default)]
pub struct FontManager {
    fonts: Vec<FontInfo>,
}

impl FontManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resource name for `font`, registering it on first use
    pub fn resource_name(&mut self, font: StandardFont) -> &str {
        let index = match self.fonts.iter().position(|info| info.font == font) {
            Some(index) => index,
            None => {
                self.fonts.push(FontInfo {
                    name: format!("F{}", self.fonts.len() + 1),
                    font,
                });
                self.fonts.len() - 1
            }
        };
        &self.fonts[index].name
    }

    pub fn fonts(&self) -> &[FontInfo] {
        &self.fonts
    }
}

/// Font dictionary for a standard font
pub fn create_standard_font_dict(font: StandardFont) -> PdfDictionary {
    let mut dict = PdfDictionary::new().with_type("Font");
    dict.insert("Subtype", PdfObject::name("Type1"));
    dict.insert("BaseFont", PdfObject::name(font.pdf_name()));
    dict.insert("Encoding", PdfObject::name("WinAnsiEncoding"));
    dict
}

/// Encode text as WinAnsi bytes; characters outside the encoding become `?`
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| win_ansi_byte(c).unwrap_or(REPLACEMENT_CHAR as u8))
        .collect()
}
