//! Logo image decoding
//!
//! Logos are decoded once, when attached to a session. JPEG files only have
//! their headers parsed and are later embedded as-is. PNG files are fully
//! decoded on attach so corrupt image data is caught early; an opaque 8-bit
//! greyscale or truecolour PNG is still embedded as its original zlib stream.
//!
//! Supported inputs:
//! - baseline/progressive JPEG with 1, 3 or 4 components
//! - PNG of every colour type and bit depth, interlaced or not, with alpha
//!   or `tRNS` transparency

use crate::png::{self, LogoPixels, PngColorType, PngInfo};
use crate::{ModelError, Result};
use serde::{Deserialize, Serialize};

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Container format of a logo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogoFormat {
    Jpeg,
    Png,
}

impl LogoFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            LogoFormat::Jpeg => "image/jpeg",
            LogoFormat::Png => "image/png",
        }
    }
}

/// Colour model of the decoded pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogoColor {
    Gray,
    Rgb,
    Cmyk,
}

impl LogoColor {
    pub fn components(&self) -> u8 {
        match self {
            LogoColor::Gray => 1,
            LogoColor::Rgb => 3,
            LogoColor::Cmyk => 4,
        }
    }
}

/// A validated logo image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogoImage {
    pub format: LogoFormat,
    pub width: u32,
    pub height: u32,
    /// Colour model of the embedded pixels
    pub color: LogoColor,
    /// The original file bytes
    bytes: Vec<u8>,
    /// Concatenated IDAT payload (PNG only)
    #[serde(default)]
    idat: Vec<u8>,
    #[serde(default)]
    png: Option<PngInfo>,
}

impl LogoImage {
    /// Validate a JPEG or PNG file
    pub fn decode(bytes: Vec<u8>) -> Result<Self> {
        if bytes.starts_with(&[0xFF, 0xD8]) {
            let (width, height, components) = parse_jpeg_header(&bytes)?;
            let color = match components {
                1 => LogoColor::Gray,
                3 => LogoColor::Rgb,
                4 => LogoColor::Cmyk,
                n => return Err(invalid(format!("unsupported JPEG component count {}", n))),
            };
            let logo = Self {
                format: LogoFormat::Jpeg,
                width,
                height,
                color,
                bytes,
                idat: Vec::new(),
                png: None,
            };
            return logo.checked();
        }

        if bytes.starts_with(&PNG_SIGNATURE) {
            let header = parse_png(&bytes)?;
            let logo = Self {
                format: LogoFormat::Png,
                width: header.width,
                height: header.height,
                color: header.info.color_type.output_color(),
                bytes,
                idat: header.idat,
                png: Some(header.info),
            }
            .checked()?;
            let pixels = logo.decode_pixels()?;
            tracing::debug!(
                width = logo.width,
                height = logo.height,
                transparent = pixels.alpha.is_some(),
                "decoded PNG logo"
            );
            return Ok(logo);
        }

        Err(invalid("not a JPEG or PNG file"))
    }

    fn checked(self) -> Result<Self> {
        if self.width == 0 || self.height == 0 {
            return Err(invalid("image has zero width or height"));
        }
        Ok(self)
    }

    /// The original file bytes
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Encoded pixel data as stored in the file: the whole file for JPEG,
    /// the zlib stream for PNG.
    pub fn encoded_pixels(&self) -> &[u8] {
        match self.format {
            LogoFormat::Jpeg => &self.bytes,
            LogoFormat::Png => &self.idat,
        }
    }

    /// Chunk-level details of a PNG logo
    pub fn png_info(&self) -> Option<&PngInfo> {
        self.png.as_ref()
    }

    /// Whether [`encoded_pixels`](Self::encoded_pixels) can be embedded
    /// without decoding
    pub fn embeds_unchanged(&self) -> bool {
        match (self.format, &self.png) {
            (LogoFormat::Jpeg, _) => true,
            (LogoFormat::Png, Some(info)) => info.is_passthrough(),
            (LogoFormat::Png, None) => false,
        }
    }

    /// Decode a PNG logo to 8-bit samples and an alpha plane
    pub fn decode_pixels(&self) -> Result<LogoPixels> {
        let info = self
            .png
            .as_ref()
            .ok_or_else(|| invalid("only PNG logos can be decoded to pixels"))?;
        png::decode_pixels(info, self.width, self.height, &self.idat)
    }

    /// Height over width
    pub fn aspect_ratio(&self) -> f32 {
        self.height as f32 / self.width as f32
    }
}

pub(crate) fn invalid(msg: impl Into<String>) -> ModelError {
    ModelError::InvalidLogo(msg.into())
}

/// Returns (width, height, components) from the first SOF segment
fn parse_jpeg_header(data: &[u8]) -> Result<(u32, u32, u8)> {
    let mut pos = 2;
    while pos + 1 < data.len() {
        if data[pos] != 0xFF {
            return Err(invalid("invalid JPEG marker"));
        }

        // Fill bytes before a marker
        while pos + 1 < data.len() && data[pos + 1] == 0xFF {
            pos += 1;
        }
        if pos + 1 >= data.len() {
            break;
        }

        let marker = data[pos + 1];
        pos += 2;

        if marker == 0xD8 || marker == 0x01 || (0xD0..=0xD7).contains(&marker) {
            continue;
        }
        if marker == 0xD9 || marker == 0xDA {
            break;
        }

        if pos + 2 > data.len() {
            break;
        }
        let length = u16::from_be_bytes([data[pos], data[pos + 1]]) as usize;
        if length < 2 {
            return Err(invalid("corrupt JPEG segment length"));
        }

        let is_sof = matches!(marker, 0xC0..=0xC3 | 0xC5..=0xC7 | 0xC9..=0xCB | 0xCD..=0xCF);
        if is_sof {
            if pos + 8 > data.len() {
                break;
            }
            let height = u16::from_be_bytes([data[pos + 3], data[pos + 4]]) as u32;
            let width = u16::from_be_bytes([data[pos + 5], data[pos + 6]]) as u32;
            let components = data[pos + 7];
            return Ok((width, height, components));
        }

        pos += length;
    }

    Err(invalid("could not find image dimensions in JPEG"))
}

struct PngHeader {
    width: u32,
    height: u32,
    info: PngInfo,
    idat: Vec<u8>,
}

fn parse_png(data: &[u8]) -> Result<PngHeader> {
    let mut pos = PNG_SIGNATURE.len();
    let mut header: Option<(u32, u32, PngInfo)> = None;
    let mut idat = Vec::new();

    while pos + 8 <= data.len() {
        let length = u32::from_be_bytes([data[pos], data[pos + 1], data[pos + 2], data[pos + 3]]) as usize;
        let kind = &data[pos + 4..pos + 8];
        let body_start = pos + 8;
        let body_end = body_start
            .checked_add(length)
            .filter(|end| *end + 4 <= data.len())
            .ok_or_else(|| invalid("truncated PNG chunk"))?;
        let body = &data[body_start..body_end];

        match kind {
            b"IHDR" => {
                if body.len() != 13 {
                    return Err(invalid("malformed PNG header"));
                }
                let width = u32::from_be_bytes([body[0], body[1], body[2], body[3]]);
                let height = u32::from_be_bytes([body[4], body[5], body[6], body[7]]);
                let (bit_depth, color_code, interlace) = (body[8], body[9], body[12]);
                let color_type = PngColorType::from_code(color_code)
                    .ok_or_else(|| invalid(format!("unknown PNG colour type {}", color_code)))?;
                if !color_type.allows_bit_depth(bit_depth) {
                    return Err(invalid(format!(
                        "bit depth {} is not valid for PNG colour type {}",
                        bit_depth, color_code
                    )));
                }
                if body[10] != 0 || body[11] != 0 {
                    return Err(invalid("unknown PNG compression or filter method"));
                }
                if interlace > 1 {
                    return Err(invalid(format!("unknown PNG interlace method {}", interlace)));
                }
                let info = PngInfo {
                    color_type,
                    bit_depth,
                    interlaced: interlace == 1,
                    palette: Vec::new(),
                    transparency: Vec::new(),
                };
                header = Some((width, height, info));
            }
            b"PLTE" => {
                let (_, _, info) = header.as_mut().ok_or_else(|| invalid("PNG palette before header"))?;
                if body.is_empty() || body.len() % 3 != 0 || body.len() > 256 * 3 {
                    return Err(invalid("malformed PNG palette"));
                }
                info.palette = body.to_vec();
            }
            b"tRNS" => {
                let (_, _, info) = header.as_mut().ok_or_else(|| invalid("PNG transparency before header"))?;
                let valid = match info.color_type {
                    PngColorType::Gray => body.len() == 2,
                    PngColorType::Rgb => body.len() == 6,
                    PngColorType::Indexed => body.len() <= info.palette.len() / 3,
                    // Alpha channels make tRNS redundant
                    PngColorType::GrayAlpha | PngColorType::RgbAlpha => true,
                };
                if !valid {
                    return Err(invalid("malformed PNG transparency"));
                }
                if !matches!(info.color_type, PngColorType::GrayAlpha | PngColorType::RgbAlpha) {
                    info.transparency = body.to_vec();
                }
            }
            b"IDAT" => idat.extend_from_slice(body),
            b"IEND" => break,
            _ => {}
        }

        pos = body_end + 4;
    }

    let (width, height, info) = header.ok_or_else(|| invalid("PNG has no IHDR chunk"))?;
    if info.color_type == PngColorType::Indexed && info.palette.is_empty() {
        return Err(invalid("indexed PNG has no palette"));
    }
    if idat.is_empty() {
        return Err(invalid("PNG has no image data"));
    }

    Ok(PngHeader {
        width,
        height,
        info,
        idat,
    })
}

#[cfg(test)]
pub(crate) mod test_images {
    use flate2::write::ZlibEncoder;
    use flate2::Compression;
    use std::io::Write;

    /// Minimal JPEG: SOI, APP0 stub, SOF0 with the given geometry, EOI
    pub fn jpeg(width: u16, height: u16, components: u8) -> Vec<u8> {
        let mut data = vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x04, 0x00, 0x00];
        data.extend_from_slice(&[0xFF, 0xC0, 0x00, 0x11, 0x08]);
        data.extend_from_slice(&height.to_be_bytes());
        data.extend_from_slice(&width.to_be_bytes());
        data.push(components);
        data.extend_from_slice(&[0u8; 9]);
        data.extend_from_slice(&[0xFF, 0xD9]);
        data
    }

    pub fn zlib(data: &[u8]) -> Vec<u8> {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    fn chunk(out: &mut Vec<u8>, kind: &[u8; 4], body: &[u8]) {
        out.extend_from_slice(&(body.len() as u32).to_be_bytes());
        out.extend_from_slice(kind);
        out.extend_from_slice(body);
        // CRC is not validated by the decoder
        out.extend_from_slice(&[0, 0, 0, 0]);
    }

    /// PNG container with the given header fields, ancillary chunks and
    /// IDAT payloads
    pub fn png_with(
        width: u32,
        height: u32,
        bit_depth: u8,
        color_type: u8,
        interlace: u8,
        chunks: &[(&[u8; 4], &[u8])],
        idat: &[&[u8]],
    ) -> Vec<u8> {
        let mut data = super::PNG_SIGNATURE.to_vec();
        let mut ihdr = Vec::new();
        ihdr.extend_from_slice(&width.to_be_bytes());
        ihdr.extend_from_slice(&height.to_be_bytes());
        ihdr.extend_from_slice(&[bit_depth, color_type, 0, 0, interlace]);
        chunk(&mut data, b"IHDR", &ihdr);
        for (kind, body) in chunks {
            chunk(&mut data, kind, body);
        }
        for part in idat {
            chunk(&mut data, b"IDAT", part);
        }
        chunk(&mut data, b"IEND", &[]);
        data
    }

    /// Non-interlaced PNG whose IDAT is the compressed `scanlines`
    pub fn png(width: u32, height: u32, bit_depth: u8, color_type: u8, scanlines: &[u8]) -> Vec<u8> {
        png_with(width, height, bit_depth, color_type, 0, &[], &[&zlib(scanlines)])
    }

    /// 2x1 truecolour PNG with an alpha channel: opaque red, transparent blue
    pub fn rgba_png() -> Vec<u8> {
        png(2, 1, 8, 6, &[0, 255, 0, 0, 255, 0, 0, 255, 0])
    }
}

#[cfg(test)]
mod tests {
    use super::test_images::*;
    use super::*;

    #[test]
    fn test_decode_jpeg() {
        let logo = LogoImage::decode(jpeg(120, 40, 3)).unwrap();
        assert_eq!(logo.format, LogoFormat::Jpeg);
        assert_eq!((logo.width, logo.height), (120, 40));
        assert_eq!(logo.color, LogoColor::Rgb);
        assert_eq!(logo.encoded_pixels(), logo.bytes());
        assert!(logo.embeds_unchanged());
        assert!(logo.png_info().is_none());
        assert!(logo.decode_pixels().is_err());
        assert!((logo.aspect_ratio() - 1.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_decode_grayscale_jpeg() {
        let logo = LogoImage::decode(jpeg(10, 10, 1)).unwrap();
        assert_eq!(logo.color, LogoColor::Gray);
    }

    #[test]
    fn test_decode_png_concatenates_idat() {
        // Second row uses the Sub filter
        let stream = zlib(&[0, 255, 0, 0, 0, 0, 255, 1, 10, 20, 30, 5, 5, 5]);
        let (first, second) = stream.split_at(stream.len() / 2);
        let logo = LogoImage::decode(png_with(2, 2, 8, 2, 0, &[], &[first, second])).unwrap();

        assert_eq!(logo.format, LogoFormat::Png);
        assert_eq!((logo.width, logo.height), (2, 2));
        assert_eq!(logo.color, LogoColor::Rgb);
        assert_eq!(logo.encoded_pixels(), &stream[..]);
        assert_eq!(logo.format.mime_type(), "image/png");
        assert!(logo.embeds_unchanged());

        let pixels = logo.decode_pixels().unwrap();
        assert_eq!(pixels.samples, vec![255, 0, 0, 0, 0, 255, 10, 20, 30, 15, 25, 35]);
        assert!(pixels.alpha.is_none());
    }

    #[test]
    fn test_decode_rgba_png() {
        let logo = LogoImage::decode(rgba_png()).unwrap();
        assert_eq!(logo.color, LogoColor::Rgb);
        assert_eq!(logo.png_info().unwrap().color_type, PngColorType::RgbAlpha);
        assert!(!logo.embeds_unchanged());

        let pixels = logo.decode_pixels().unwrap();
        assert_eq!(pixels.color, LogoColor::Rgb);
        assert_eq!(pixels.samples, vec![255, 0, 0, 0, 0, 255]);
        assert_eq!(pixels.alpha, Some(vec![255, 0]));
    }

    #[test]
    fn test_opaque_alpha_channel_is_dropped() {
        let logo = LogoImage::decode(png(1, 1, 8, 6, &[0, 1, 2, 3, 255])).unwrap();
        let pixels = logo.decode_pixels().unwrap();
        assert_eq!(pixels.samples, vec![1, 2, 3]);
        assert!(pixels.alpha.is_none());
    }

    #[test]
    fn test_decode_indexed_png_with_transparency() {
        let palette: &[u8] = &[10, 20, 30, 40, 50, 60, 70, 80, 90];
        let trns: &[u8] = &[0, 128];
        // 2-bit indices 0, 1, 2
        let idat = zlib(&[0, 0b0001_1000]);
        let bytes = png_with(3, 1, 2, 3, 0, &[(b"PLTE", palette), (b"tRNS", trns)], &[idat.as_slice()]);
        let logo = LogoImage::decode(bytes).unwrap();
        assert_eq!(logo.color, LogoColor::Rgb);

        let pixels = logo.decode_pixels().unwrap();
        assert_eq!(pixels.samples, palette.to_vec());
        assert_eq!(pixels.alpha, Some(vec![0, 128, 255]));
    }

    #[test]
    fn test_decode_16_bit_gray_alpha_png() {
        let logo = LogoImage::decode(png(1, 1, 16, 4, &[0, 0x12, 0x34, 0x80, 0x00])).unwrap();
        assert_eq!(logo.color, LogoColor::Gray);
        let pixels = logo.decode_pixels().unwrap();
        assert_eq!(pixels.samples, vec![0x12]);
        assert_eq!(pixels.alpha, Some(vec![0x80]));
    }

    #[test]
    fn test_decode_1_bit_gray_with_color_key() {
        let trns: &[u8] = &[0, 0];
        let idat = zlib(&[0, 0b1000_0000]);
        let logo = LogoImage::decode(png_with(2, 1, 1, 0, 0, &[(b"tRNS", trns)], &[idat.as_slice()])).unwrap();
        assert!(!logo.embeds_unchanged());

        let pixels = logo.decode_pixels().unwrap();
        assert_eq!(pixels.samples, vec![255, 0]);
        assert_eq!(pixels.alpha, Some(vec![255, 0]));
    }

    #[test]
    fn test_decode_interlaced_png() {
        // A 2x2 image only fills Adam7 passes 1, 6 and 7
        let idat = zlib(&[0, 1, 0, 2, 0, 3, 4]);
        let logo = LogoImage::decode(png_with(2, 2, 8, 0, 1, &[], &[idat.as_slice()])).unwrap();
        assert!(logo.png_info().unwrap().interlaced);
        assert!(!logo.embeds_unchanged());
        assert_eq!(logo.decode_pixels().unwrap().samples, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_reject_unsupported_png() {
        let row: &[u8] = &[0, 1, 2, 3];
        // Invalid colour type and bit depth combinations
        assert!(LogoImage::decode(png(1, 1, 8, 5, row)).is_err());
        assert!(LogoImage::decode(png(1, 1, 4, 2, row)).is_err());
        assert!(LogoImage::decode(png(1, 1, 16, 3, row)).is_err());
        // No image data
        assert!(LogoImage::decode(png_with(1, 1, 8, 2, 0, &[], &[])).is_err());
        // Indexed without a palette
        assert!(LogoImage::decode(png(1, 1, 8, 3, &[0, 0])).is_err());
    }

    #[test]
    fn test_reject_corrupt_png_data() {
        // Not a zlib stream
        assert!(LogoImage::decode(png_with(1, 1, 8, 2, 0, &[], &[b"abc"])).is_err());
        // Too few scanline bytes
        assert!(LogoImage::decode(png(2, 2, 8, 2, &[0, 1, 2, 3])).is_err());
        // Unknown filter type
        assert!(LogoImage::decode(png(1, 1, 8, 2, &[9, 1, 2, 3])).is_err());
        // Palette index past the palette
        let palette: &[u8] = &[1, 2, 3];
        let idat = zlib(&[0, 1]);
        let bytes = png_with(1, 1, 8, 3, 0, &[(b"PLTE", palette)], &[idat.as_slice()]);
        assert!(matches!(LogoImage::decode(bytes), Err(ModelError::InvalidLogo(_))));
    }

    #[test]
    fn test_reject_garbage_and_truncated_input() {
        assert!(matches!(
            LogoImage::decode(b"GIF89a".to_vec()),
            Err(ModelError::InvalidLogo(_))
        ));
        assert!(LogoImage::decode(vec![0xFF, 0xD8]).is_err());

        let mut truncated = png(1, 1, 8, 2, &[0, 1, 2, 3]);
        truncated.truncate(20);
        assert!(LogoImage::decode(truncated).is_err());
    }

    #[test]
    fn test_reject_zero_sized_image() {
        assert!(LogoImage::decode(jpeg(0, 10, 3)).is_err());
        assert!(LogoImage::decode(png(0, 1, 8, 2, &[])).is_err());
    }
}
