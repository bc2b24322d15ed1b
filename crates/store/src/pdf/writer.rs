//! PDF writer
//!
//! Handles the file structure: header, numbered objects, cross-reference
//! table and trailer, with optional Flate compression of content streams.
//! Objects are numbered in a fixed order so identical input produces
//! identical bytes.

use super::document::{create_catalog, create_pages, DocumentInfo, PDF_VERSION};
use super::fonts::create_standard_font_dict;
use super::objects::{PdfDictionary, PdfObject, PdfSerializer, PdfStream};
use super::options::PdfExportOptions;
use super::renderer::PdfRenderer;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use render_model::{RenderError, RenderModel};
use std::io::{self, Write};
use thiserror::Error;

/// Error type for PDF operations
#[derive(Debug, Error)]
pub enum PdfError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    #[error("Image error: {0}")]
    Image(String),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),
}

pub type Result<T> = std::result::Result<T, PdfError>;

/// Low-level PDF file writer
pub struct PdfWriter<W: Write> {
    writer: W,
    position: u64,
    /// (object number, byte offset)
    offsets: Vec<(u32, u64)>,
    next_obj_num: u32,
    compress: bool,
}

impl<W: Write> PdfWriter<W> {
    pub fn new(writer: W, compress: bool) -> Self {
        Self {
            writer,
            position: 0,
            offsets: Vec::new(),
            next_obj_num: 1,
            compress,
        }
    }

    fn write_bytes(&mut self, data: &[u8]) -> Result<()> {
        self.writer.write_all(data)?;
        self.position += data.len() as u64;
        Ok(())
    }

    pub fn allocate_object(&mut self) -> u32 {
        let num = self.next_obj_num;
        self.next_obj_num += 1;
        num
    }

    pub fn write_header(&mut self) -> Result<()> {
        self.write_bytes(format!("%PDF-{}\n", PDF_VERSION).as_bytes())?;
        // Binary marker
        self.write_bytes(&[b'%', 0xE2, 0xE3, 0xCF, 0xD3, b'\n'])
    }

    pub fn write_object(&mut self, obj_num: u32, object: &PdfObject) -> Result<()> {
        self.offsets.push((obj_num, self.position));
        let mut serializer = PdfSerializer::new(Vec::new());
        serializer.write_object(object)?;
        self.write_bytes(format!("{} 0 obj\n", obj_num).as_bytes())?;
        self.write_bytes(&serializer.into_inner())?;
        self.write_bytes(b"\nendobj\n")
    }

    /// Write a stream, compressing it first unless it is already encoded
    pub fn write_stream_object(&mut self, obj_num: u32, stream: PdfStream) -> Result<()> {
        let stream = if self.compress && !stream.encoded {
            compress_stream(stream)?
        } else {
            stream
        };
        self.write_object(obj_num, &PdfObject::Stream(stream))
    }

    pub fn write_xref_and_trailer(&mut self, catalog_ref: u32, info_ref: u32) -> Result<()> {
        let xref_offset = self.position;
        let mut offsets = vec![None; self.next_obj_num as usize];
        for (num, offset) in &self.offsets {
            offsets[*num as usize] = Some(*offset);
        }

        let mut xref = format!("xref\n0 {}\n", self.next_obj_num);
        for entry in &offsets {
            match entry {
                Some(offset) => xref.push_str(&format!("{:010} 00000 n \n", offset)),
                None => xref.push_str("0000000000 65535 f \n"),
            }
        }
        xref.push_str("trailer\n");
        self.write_bytes(xref.as_bytes())?;

        let mut trailer = PdfDictionary::new();
        trailer.insert("Size", PdfObject::Integer(self.next_obj_num as i64));
        trailer.insert("Root", PdfObject::Reference(catalog_ref));
        trailer.insert("Info", PdfObject::Reference(info_ref));
        let mut serializer = PdfSerializer::new(Vec::new());
        serializer.write_object(&trailer.into())?;
        self.write_bytes(&serializer.into_inner())?;

        self.write_bytes(format!("\nstartxref\n{}\n%%EOF\n", xref_offset).as_bytes())
    }

    pub fn finish(mut self) -> Result<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}

fn compress_stream(mut stream: PdfStream) -> Result<PdfStream> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&stream.data)?;
    stream.data = encoder.finish()?;
    stream.encoded = true;
    stream.dict.insert("Filter", PdfObject::name("FlateDecode"));
    Ok(stream)
}

/// Writes a whole render model as a PDF document
pub struct PdfDocumentWriter {
    options: PdfExportOptions,
}

impl PdfDocumentWriter {
    pub fn new(options: PdfExportOptions) -> Self {
        Self { options }
    }

    pub fn write<W: Write>(&self, model: &RenderModel, writer: W) -> Result<W> {
        validate_model(model)?;

        // Render first so every font and image is known before numbering
        let mut renderer = PdfRenderer::new(self.options.include_links);
        let rendered = model
            .pages
            .iter()
            .map(|page| renderer.render_page(page))
            .collect::<Result<Vec<_>>>()?;

        let mut pdf = PdfWriter::new(writer, self.options.compress);
        pdf.write_header()?;

        let catalog_ref = pdf.allocate_object();
        let pages_ref = pdf.allocate_object();
        let info_ref = pdf.allocate_object();
        let font_refs: Vec<_> = renderer
            .font_manager()
            .fonts()
            .iter()
            .map(|font| (font, pdf.allocate_object()))
            .collect();
        let image_refs: Vec<_> = renderer
            .image_manager()
            .images()
            .iter()
            .map(|image| {
                let image_ref = pdf.allocate_object();
                let mask_ref = image.image.soft_mask.as_ref().map(|_| pdf.allocate_object());
                (image, image_ref, mask_ref)
            })
            .collect();
        let page_refs: Vec<(u32, u32, Vec<u32>)> = rendered
            .iter()
            .map(|page| {
                let page_ref = pdf.allocate_object();
                let content_ref = pdf.allocate_object();
                let link_refs = page.links.iter().map(|_| pdf.allocate_object()).collect();
                (page_ref, content_ref, link_refs)
            })
            .collect();

        pdf.write_object(catalog_ref, &create_catalog(pages_ref).into())?;
        let kids: Vec<u32> = page_refs.iter().map(|(page_ref, _, _)| *page_ref).collect();
        pdf.write_object(pages_ref, &create_pages(&kids).into())?;

        let info = DocumentInfo {
            title: self.options.title.clone(),
            author: self.options.author.clone(),
            subject: self.options.subject.clone(),
            creation_date: self.options.creation_date,
        };
        pdf.write_object(info_ref, &info.to_dictionary().into())?;

        for (font, font_ref) in &font_refs {
            pdf.write_object(*font_ref, &create_standard_font_dict(font.font).into())?;
        }
        for (image, image_ref, mask_ref) in &image_refs {
            pdf.write_stream_object(*image_ref, image.image.to_xobject(*mask_ref))?;
            if let (Some(mask_ref), Some(mask)) = (mask_ref, image.image.soft_mask_xobject()) {
                pdf.write_stream_object(*mask_ref, mask)?;
            }
        }

        let mut resources = PdfDictionary::new();
        if !font_refs.is_empty() {
            let mut fonts = PdfDictionary::new();
            for (font, font_ref) in &font_refs {
                fonts.insert(font.name.clone(), PdfObject::Reference(*font_ref));
            }
            resources.insert("Font", fonts);
        }
        if !image_refs.is_empty() {
            let mut xobjects = PdfDictionary::new();
            for (image, image_ref, _) in &image_refs {
                xobjects.insert(image.name.clone(), PdfObject::Reference(*image_ref));
            }
            resources.insert("XObject", xobjects);
        }

        for (page, (page_ref, content_ref, link_refs)) in rendered.into_iter().zip(&page_refs) {
            let mut page_dict = PdfDictionary::new().with_type("Page");
            page_dict.insert("Parent", PdfObject::Reference(pages_ref));
            page_dict.insert("MediaBox", PdfObject::rect(0.0, 0.0, page.width, page.height));
            page_dict.insert("Resources", resources.clone());
            page_dict.insert("Contents", PdfObject::Reference(*content_ref));
            if !link_refs.is_empty() {
                page_dict.insert(
                    "Annots",
                    PdfObject::Array(link_refs.iter().map(|r| PdfObject::Reference(*r)).collect()),
                );
            }
            pdf.write_object(*page_ref, &page_dict.into())?;
            pdf.write_stream_object(*content_ref, PdfStream::new(page.content.into_bytes()))?;
            for (link, link_ref) in page.links.iter().zip(link_refs) {
                pdf.write_object(*link_ref, &link.to_dictionary().into())?;
            }
        }

        pdf.write_xref_and_trailer(catalog_ref, info_ref)?;
        tracing::debug!(
            pages = page_refs.len(),
            fonts = font_refs.len(),
            images = image_refs.len(),
            "PDF document written"
        );
        pdf.finish()
    }

    pub fn write_to_bytes(&self, model: &RenderModel) -> Result<Vec<u8>> {
        self.write(model, Vec::new())
    }
}

/// Check that a render model can be written
pub fn validate_model(model: &RenderModel) -> Result<()> {
    if model.pages.is_empty() {
        return Err(PdfError::InvalidDocument("No pages to export".to_string()));
    }
    for (i, page) in model.pages.iter().enumerate() {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if !valid(page.width) || !valid(page.height) {
            return Err(PdfError::InvalidDocument(format!(
                "Page {} has invalid size {}x{}",
                i, page.width, page.height
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use render_model::{Color, GlyphRun, PageRender, RenderItem};

    fn page(text: &str) -> PageRender {
        PageRender {
            page_index: 0,
            width: 595.0,
            height: 842.0,
            items: vec![RenderItem::GlyphRun(GlyphRun {
                text: text.to_string(),
                font_family: "Helvetica".to_string(),
                font_size: 12.0,
                bold: false,
                color: Color::BLACK,
                x: 42.0,
                y: 60.0,
                width: 80.0,
                link: None,
            })],
        }
    }

    fn model(pages: Vec<PageRender>) -> RenderModel {
        RenderModel { pages }
    }

    #[test]
    fn test_writer_header_and_object() {
        let mut pdf = PdfWriter::new(Vec::new(), false);
        pdf.write_header().unwrap();
        let num = pdf.allocate_object();
        pdf.write_object(num, &PdfObject::Integer(42)).unwrap();
        let out = String::from_utf8_lossy(&pdf.finish().unwrap()).into_owned();
        assert!(out.starts_with("%PDF-1.4\n"));
        assert!(out.contains("1 0 obj\n42\nendobj\n"));
    }

    #[test]
    fn test_xref_offsets_point_at_objects() {
        let options = PdfExportOptions::new().with_compression(false);
        let bytes = PdfDocumentWriter::new(options).write_to_bytes(&model(vec![page("Hi")])).unwrap();
        let text = String::from_utf8_lossy(&bytes).into_owned();

        let xref_at = text.rfind("xref\n").unwrap();
        let entries: Vec<&str> = text[xref_at..].lines().skip(3).take_while(|l| l.ends_with(" n ")).collect();
        assert!(!entries.is_empty());
        for (i, entry) in entries.iter().enumerate() {
            let offset: usize = entry[..10].parse().unwrap();
            let header = format!("{} 0 obj", i + 1);
            assert!(bytes[offset..].starts_with(header.as_bytes()), "bad offset for object {}", i + 1);
        }

        let startxref: usize = text.lines().rev().nth(1).unwrap().parse().unwrap();
        assert_eq!(startxref, xref_at);
    }

    #[test]
    fn test_document_structure() {
        let bytes = PdfDocumentWriter::new(PdfExportOptions::default())
            .write_to_bytes(&model(vec![page("One"), page("Two")]))
            .unwrap();
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.starts_with("%PDF-"));
        assert!(text.contains("/Type /Catalog"));
        assert!(text.contains("/Count 2"));
        assert!(text.contains("/BaseFont /Helvetica"));
        assert!(text.contains("/Filter /FlateDecode"));
        assert!(text.ends_with("%%EOF\n"));
    }

    #[test]
    fn test_uncompressed_content_is_readable() {
        let options = PdfExportOptions::new().with_compression(false).with_title("Invoice INV1");
        let bytes = PdfDocumentWriter::new(options).write_to_bytes(&model(vec![page("Hello")])).unwrap();
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("(Hello) Tj"));
        assert!(text.contains("/Title (Invoice INV1)"));
        assert!(!text.contains("FlateDecode"));
    }

    #[test]
    fn test_output_is_deterministic() {
        let writer = PdfDocumentWriter::new(PdfExportOptions::default());
        let input = model(vec![page("Same")]);
        assert_eq!(writer.write_to_bytes(&input).unwrap(), writer.write_to_bytes(&input).unwrap());
    }

    #[test]
    fn test_invalid_models_are_rejected() {
        let writer = PdfDocumentWriter::new(PdfExportOptions::default());
        assert!(matches!(writer.write_to_bytes(&model(vec![])), Err(PdfError::InvalidDocument(_))));

        let mut bad = page("x");
        bad.height = 0.0;
        assert!(matches!(writer.write_to_bytes(&model(vec![bad])), Err(PdfError::InvalidDocument(_))));
    }
}
