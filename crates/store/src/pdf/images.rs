//! PDF image handling
//!
//! JPEG logos are embedded without re-encoding as DCTDecode images. The zlib
//! stream of an opaque 8-bit PNG becomes a FlateDecode image whose decode
//! parameters undo the PNG row filters. Any other PNG is embedded as decoded
//! samples, with its alpha plane in a separate DeviceGray soft mask.

use super::objects::{PdfDictionary, PdfObject, PdfStream};
use super::writer::{PdfError, Result};
use invoice_model::{LogoColor, LogoFormat, LogoImage};

/// Colour space of an image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpace {
    DeviceGray,
    DeviceRGB,
    DeviceCMYK,
}

impl ColorSpace {
    pub fn pdf_name(&self) -> &'static str {
        match self {
            ColorSpace::DeviceGray => "DeviceGray",
            ColorSpace::DeviceRGB => "DeviceRGB",
            ColorSpace::DeviceCMYK => "DeviceCMYK",
        }
    }

    pub fn components(&self) -> u8 {
        match self {
            ColorSpace::DeviceGray => 1,
            ColorSpace::DeviceRGB => 3,
            ColorSpace::DeviceCMYK => 4,
        }
    }
}

impl From<LogoColor> for ColorSpace {
    fn from(color: LogoColor) -> Self {
        match color {
            LogoColor::Gray => ColorSpace::DeviceGray,
            LogoColor::Rgb => ColorSpace::DeviceRGB,
            LogoColor::Cmyk => ColorSpace::DeviceCMYK,
        }
    }
}

/// Filter the encoded data is stored with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFilter {
    DCTDecode,
    /// Zlib data with PNG predictors
    FlateDecode,
}

impl ImageFilter {
    pub fn pdf_name(&self) -> &'static str {
        match self {
            ImageFilter::DCTDecode => "DCTDecode",
            ImageFilter::FlateDecode => "FlateDecode",
        }
    }
}

/// Image data for embedding
#[derive(Debug, Clone, PartialEq)]
pub struct ImageData {
    pub width: u32,
    pub height: u32,
    pub bits_per_component: u8,
    pub color_space: ColorSpace,
    /// `None` for plain samples, compressed like any other stream
    pub filter: Option<ImageFilter>,
    pub data: Vec<u8>,
    /// 8-bit alpha samples, one per pixel
    pub soft_mask: Option<Vec<u8>>,
}

impl ImageData {
    pub fn from_logo(logo: &LogoImage) -> Result<Self> {
        if !logo.embeds_unchanged() {
            let pixels = logo
                .decode_pixels()
                .map_err(|e| PdfError::Image(e.to_string()))?;
            return Ok(Self {
                width: pixels.width,
                height: pixels.height,
                bits_per_component: 8,
                color_space: pixels.color.into(),
                filter: None,
                data: pixels.samples,
                soft_mask: pixels.alpha,
            });
        }

        let data = logo.encoded_pixels();
        if data.is_empty() {
            return Err(PdfError::Image("logo has no pixel data".to_string()));
        }
        let filter = match logo.format {
            LogoFormat::Jpeg => ImageFilter::DCTDecode,
            LogoFormat::Png => ImageFilter::FlateDecode,
        };
        Ok(Self {
            width: logo.width,
            height: logo.height,
            bits_per_component: 8,
            color_space: logo.color.into(),
            filter: Some(filter),
            data: data.to_vec(),
            soft_mask: None,
        })
    }

    fn image_dictionary(&self, color_space: ColorSpace) -> PdfDictionary {
        let mut dict = PdfDictionary::new().with_type("XObject");
        dict.insert("Subtype", PdfObject::name("Image"));
        dict.insert("Width", PdfObject::Integer(self.width as i64));
        dict.insert("Height", PdfObject::Integer(self.height as i64));
        dict.insert("BitsPerComponent", PdfObject::Integer(self.bits_per_component as i64));
        dict.insert("ColorSpace", PdfObject::name(color_space.pdf_name()));
        dict
    }

    /// Image XObject stream; `soft_mask_ref` is the object written from
    /// [`soft_mask_xobject`](Self::soft_mask_xobject)
    pub fn to_xobject(&self, soft_mask_ref: Option<u32>) -> PdfStream {
        let mut dict = self.image_dictionary(self.color_space);
        if let Some(mask_ref) = soft_mask_ref {
            dict.insert("SMask", PdfObject::Reference(mask_ref));
        }

        match self.filter {
            Some(filter) => {
                if filter == ImageFilter::FlateDecode {
                    let mut parms = PdfDictionary::new();
                    parms.insert("Predictor", PdfObject::Integer(15));
                    parms.insert("Colors", PdfObject::Integer(self.color_space.components() as i64));
                    parms.insert("BitsPerComponent", PdfObject::Integer(self.bits_per_component as i64));
                    parms.insert("Columns", PdfObject::Integer(self.width as i64));
                    dict.insert("DecodeParms", parms);
                }
                PdfStream::encoded(dict, self.data.clone(), filter.pdf_name())
            }
            None => {
                let mut stream = PdfStream::new(self.data.clone());
                stream.dict = dict;
                stream
            }
        }
    }

    /// DeviceGray image of the alpha plane
    pub fn soft_mask_xobject(&self) -> Option<PdfStream> {
        let alpha = self.soft_mask.as_ref()?;
        let mut stream = PdfStream::new(alpha.clone());
        stream.dict = self.image_dictionary(ColorSpace::DeviceGray);
        Some(stream)
    }
}

/// A registered image and its resource name
#[derive(Debug, Clone)]
pub struct ImageRef {
    /// Resource name, e.g. `Im1`
    pub name: String,
    pub image: ImageData,
}

/// Collects the distinct images drawn in a document
#[derive(Debug, Default)]
pub struct ImageManager {
    images: Vec<ImageRef>,
}

impl ImageManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resource name for `logo`; the same logo drawn on several pages is
    /// embedded once
    pub fn register(&mut self, logo: &LogoImage) -> Result<String> {
        let image = ImageData::from_logo(logo)?;
        if let Some(existing) = self.images.iter().find(|r| r.image == image) {
            return Ok(existing.name.clone());
        }
        let name = format!("Im{}", self.images.len() + 1);
        self.images.push(ImageRef {
            name: name.clone(),
            image,
        });
        Ok(name)
    }

    pub fn images(&self) -> &[ImageRef] {
        &self.images
    }
}
