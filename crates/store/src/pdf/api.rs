//! PDF export public API

use super::options::PdfExportOptions;
use super::writer::{PdfDocumentWriter, PdfError, Result};
use layout_engine::Page;
use render_model::{DocumentRenderer, RenderConverter, RenderModel};

/// Write a render model to PDF bytes in memory
pub fn export_pdf_bytes(model: &RenderModel, options: PdfExportOptions) -> Result<Vec<u8>> {
    PdfDocumentWriter::new(options).write_to_bytes(model)
}

/// Renders laid-out pages to a PDF file's bytes
#[derive(Debug, Clone, Default)]
pub struct PdfDocumentRenderer {
    converter: RenderConverter,
    options: PdfExportOptions,
}

impl PdfDocumentRenderer {
    pub fn new(converter: RenderConverter, options: PdfExportOptions) -> Self {
        Self { converter, options }
    }

    pub fn with_options(options: PdfExportOptions) -> Self {
        Self {
            converter: RenderConverter::default(),
            options,
        }
    }

    pub fn options(&self) -> &PdfExportOptions {
        &self.options
    }
}

impl DocumentRenderer for PdfDocumentRenderer {
    type Output = Vec<u8>;
    type Error = PdfError;

    fn render(&mut self, pages: &[Page]) -> Result<Vec<u8>> {
        let model = self.converter.convert(pages)?;
        let bytes = export_pdf_bytes(&model, self.options.clone())?;
        tracing::debug!(pages = model.pages.len(), bytes = bytes.len(), "PDF rendered");
        Ok(bytes)
    }
}
