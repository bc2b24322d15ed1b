//! PNG pixel decoding
//!
//! An 8-bit, opaque, non-interlaced grey or RGB PNG is embedded with its
//! zlib stream untouched. Every other PNG (alpha channel, palette, `tRNS`
//! transparency, other bit depths, Adam7 interlacing) is decoded here into
//! plain 8-bit samples plus an optional alpha plane.

use crate::logo::invalid;
use crate::{LogoColor, Result};
use flate2::read::ZlibDecoder;
use serde::{Deserialize, Serialize};
use std::io::Read;

/// Largest logo accepted, in pixels
pub const MAX_LOGO_PIXELS: u64 = 40_000_000;

/// (x offset, y offset, x step, y step) of the seven Adam7 passes
const ADAM7: [(usize, usize, usize, usize); 7] = [
    (0, 0, 8, 8),
    (4, 0, 8, 8),
    (0, 4, 4, 8),
    (2, 0, 4, 4),
    (0, 2, 2, 4),
    (1, 0, 2, 2),
    (0, 1, 1, 2),
];

/// PNG colour type from the IHDR chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PngColorType {
    Gray,
    Rgb,
    Indexed,
    GrayAlpha,
    RgbAlpha,
}

impl PngColorType {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(PngColorType::Gray),
            2 => Some(PngColorType::Rgb),
            3 => Some(PngColorType::Indexed),
            4 => Some(PngColorType::GrayAlpha),
            6 => Some(PngColorType::RgbAlpha),
            _ => None,
        }
    }

    /// Samples per pixel in the stored scanlines
    pub fn channels(&self) -> usize {
        match self {
            PngColorType::Gray | PngColorType::Indexed => 1,
            PngColorType::GrayAlpha => 2,
            PngColorType::Rgb => 3,
            PngColorType::RgbAlpha => 4,
        }
    }

    /// Bit depths the PNG format allows for this colour type
    pub fn allows_bit_depth(&self, depth: u8) -> bool {
        match self {
            PngColorType::Gray => matches!(depth, 1 | 2 | 4 | 8 | 16),
            PngColorType::Indexed => matches!(depth, 1 | 2 | 4 | 8),
            _ => matches!(depth, 8 | 16),
        }
    }

    /// Colour model of the decoded samples
    pub fn output_color(&self) -> LogoColor {
        match self {
            PngColorType::Gray | PngColorType::GrayAlpha => LogoColor::Gray,
            _ => LogoColor::Rgb,
        }
    }
}

/// Pixel layout of a PNG logo, from its IHDR, PLTE and tRNS chunks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PngInfo {
    pub color_type: PngColorType,
    pub bit_depth: u8,
    pub interlaced: bool,
    /// RGB triples
    #[serde(default)]
    pub palette: Vec<u8>,
    /// Body of the tRNS chunk
    #[serde(default)]
    pub transparency: Vec<u8>,
}

impl PngInfo {
    /// Whether the IDAT stream can be embedded unchanged
    pub fn is_passthrough(&self) -> bool {
        matches!(self.color_type, PngColorType::Gray | PngColorType::Rgb)
            && self.bit_depth == 8
            && !self.interlaced
            && self.transparency.is_empty()
    }

    fn bits_per_pixel(&self) -> usize {
        self.color_type.channels() * self.bit_depth as usize
    }
}

/// 8-bit pixels of a decoded logo
#[derive(Debug, Clone, PartialEq)]
pub struct LogoPixels {
    pub width: u32,
    pub height: u32,
    /// `Gray` or `Rgb`
    pub color: LogoColor,
    /// Interleaved colour samples, rows top to bottom
    pub samples: Vec<u8>,
    /// One alpha sample per pixel; `None` when every pixel is opaque
    pub alpha: Option<Vec<u8>>,
}

/// Inflate and unfilter the IDAT stream of a PNG
pub(crate) fn decode_pixels(info: &PngInfo, width: u32, height: u32, idat: &[u8]) -> Result<LogoPixels> {
    let pixel_count = width as u64 * height as u64;
    if pixel_count > MAX_LOGO_PIXELS {
        return Err(invalid(format!("{}x{} image is too large", width, height)));
    }

    let mut raw = Vec::new();
    ZlibDecoder::new(idat)
        .read_to_end(&mut raw)
        .map_err(|e| invalid(format!("corrupt PNG image data: {}", e)))?;

    let (w, h) = (width as usize, height as usize);
    let color = info.color_type.output_color();
    let mut pixels = PixelBuffer {
        info,
        components: color.components() as usize,
        samples: vec![0; w * h * color.components() as usize],
        alpha: vec![u8::MAX; w * h],
    };

    let bits_per_pixel = info.bits_per_pixel();
    let filter_distance = bits_per_pixel.div_ceil(8);
    let single_pass: [(usize, usize, usize, usize); 1] = [(0, 0, 1, 1)];
    let passes: &[(usize, usize, usize, usize)] = if info.interlaced { &ADAM7 } else { &single_pass };

    let mut pos = 0;
    for &(x0, y0, dx, dy) in passes {
        if x0 >= w || y0 >= h {
            continue;
        }
        let pass_width = (w - x0).div_ceil(dx);
        let pass_height = (h - y0).div_ceil(dy);
        let stride = (pass_width * bits_per_pixel).div_ceil(8);

        let mut previous = vec![0u8; stride];
        for py in 0..pass_height {
            let filter = *raw.get(pos).ok_or_else(|| invalid("truncated PNG image data"))?;
            let mut row = raw
                .get(pos + 1..pos + 1 + stride)
                .ok_or_else(|| invalid("truncated PNG image data"))?
                .to_vec();
            pos += 1 + stride;

            unfilter(filter, &mut row, &previous, filter_distance)?;
            for px in 0..pass_width {
                let index = (y0 + py * dy) * w + x0 + px * dx;
                pixels.store(&row, px, index)?;
            }
            previous = row;
        }
    }

    let has_transparency = pixels.alpha.iter().any(|&a| a != u8::MAX);
    Ok(LogoPixels {
        width,
        height,
        color,
        samples: pixels.samples,
        alpha: has_transparency.then_some(pixels.alpha),
    })
}

struct PixelBuffer<'a> {
    info: &'a PngInfo,
    components: usize,
    samples: Vec<u8>,
    alpha: Vec<u8>,
}

impl PixelBuffer<'_> {
    /// Convert pixel `x` of an unfiltered scanline into output pixel `index`
    fn store(&mut self, row: &[u8], x: usize, index: usize) -> Result<()> {
        let info = self.info;
        let depth = info.bit_depth;
        let base = x * info.color_type.channels();
        let out = index * self.components;

        match info.color_type {
            PngColorType::Gray => {
                let value = sample(row, base, depth);
                self.samples[out] = to_8bit(value, depth);
                if let Some(key) = key_sample(&info.transparency, 0) {
                    if value == key {
                        self.alpha[index] = 0;
                    }
                }
            }
            PngColorType::Rgb => {
                let rgb = [sample(row, base, depth), sample(row, base + 1, depth), sample(row, base + 2, depth)];
                for (i, value) in rgb.iter().enumerate() {
                    self.samples[out + i] = to_8bit(*value, depth);
                }
                let key = (0..3).map(|i| key_sample(&info.transparency, i)).collect::<Option<Vec<_>>>();
                if key.as_deref() == Some(&rgb[..]) {
                    self.alpha[index] = 0;
                }
            }
            PngColorType::Indexed => {
                let entry = sample(row, base, depth) as usize;
                let color = info
                    .palette
                    .get(entry * 3..entry * 3 + 3)
                    .ok_or_else(|| invalid(format!("palette index {} out of range", entry)))?;
                self.samples[out..out + 3].copy_from_slice(color);
                self.alpha[index] = info.transparency.get(entry).copied().unwrap_or(u8::MAX);
            }
            PngColorType::GrayAlpha => {
                self.samples[out] = to_8bit(sample(row, base, depth), depth);
                self.alpha[index] = to_8bit(sample(row, base + 1, depth), depth);
            }
            PngColorType::RgbAlpha => {
                for i in 0..3 {
                    self.samples[out + i] = to_8bit(sample(row, base + i, depth), depth);
                }
                self.alpha[index] = to_8bit(sample(row, base + 3, depth), depth);
            }
        }
        Ok(())
    }
}

/// Sample `index` of a scanline, unscaled
fn sample(row: &[u8], index: usize, depth: u8) -> u16 {
    match depth {
        8 => row[index] as u16,
        16 => u16::from_be_bytes([row[2 * index], row[2 * index + 1]]),
        _ => {
            let bit = index * depth as usize;
            let shift = 8 - depth as usize - bit % 8;
            (row[bit / 8] >> shift) as u16 & ((1u16 << depth) - 1)
        }
    }
}

fn to_8bit(value: u16, depth: u8) -> u8 {
    match depth {
        8 => value as u8,
        16 => (value >> 8) as u8,
        _ => (value * 255 / ((1u16 << depth) - 1)) as u8,
    }
}

/// Colour-key sample `i` of a grey or RGB tRNS chunk
fn key_sample(transparency: &[u8], i: usize) -> Option<u16> {
    let bytes = transparency.get(2 * i..2 * i + 2)?;
    Some(u16::from_be_bytes([bytes[0], bytes[1]]))
}

fn unfilter(filter: u8, row: &mut [u8], previous: &[u8], distance: usize) -> Result<()> {
    match filter {
        0 => {}
        1 => {
            for i in distance..row.len() {
                row[i] = row[i].wrapping_add(row[i - distance]);
            }
        }
        2 => {
            for i in 0..row.len() {
                row[i] = row[i].wrapping_add(previous[i]);
            }
        }
        3 => {
            for i in 0..row.len() {
                let left = if i >= distance { row[i - distance] as u16 } else { 0 };
                row[i] = row[i].wrapping_add(((left + previous[i] as u16) / 2) as u8);
            }
        }
        4 => {
            for i in 0..row.len() {
                let (left, upper_left) = if i >= distance {
                    (row[i - distance], previous[i - distance])
                } else {
                    (0, 0)
                };
                row[i] = row[i].wrapping_add(paeth(left, previous[i], upper_left));
            }
        }
        other => return Err(invalid(format!("unknown PNG filter type {}", other))),
    }
    Ok(())
}

fn paeth(a: u8, b: u8, c: u8) -> u8 {
    let p = a as i16 + b as i16 - c as i16;
    let (pa, pb, pc) = ((p - a as i16).abs(), (p - b as i16).abs(), (p - c as i16).abs());
    if pa <= pb && pa <= pc {
        a
    } else if pb <= pc {
        b
    } else {
        c
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(color_type: PngColorType, bit_depth: u8) -> PngInfo {
        PngInfo {
            color_type,
            bit_depth,
            interlaced: false,
            palette: Vec::new(),
            transparency: Vec::new(),
        }
    }

    #[test]
    fn test_passthrough_rule() {
        assert!(info(PngColorType::Rgb, 8).is_passthrough());
        assert!(info(PngColorType::Gray, 8).is_passthrough());
        assert!(!info(PngColorType::Gray, 4).is_passthrough());
        assert!(!info(PngColorType::RgbAlpha, 8).is_passthrough());
        assert!(!info(PngColorType::Indexed, 8).is_passthrough());

        let mut keyed = info(PngColorType::Rgb, 8);
        keyed.transparency = vec![0, 0, 0, 0, 0, 0];
        assert!(!keyed.is_passthrough());
    }

    #[test]
    fn test_allowed_bit_depths() {
        assert!(PngColorType::Gray.allows_bit_depth(1));
        assert!(PngColorType::Indexed.allows_bit_depth(4));
        assert!(!PngColorType::Indexed.allows_bit_depth(16));
        assert!(PngColorType::RgbAlpha.allows_bit_depth(16));
        assert!(!PngColorType::RgbAlpha.allows_bit_depth(4));
    }

    #[test]
    fn test_sub_byte_samples_scale_to_8_bits() {
        let row = [0b1011_0100];
        assert_eq!(sample(&row, 0, 1), 1);
        assert_eq!(sample(&row, 1, 1), 0);
        assert_eq!(sample(&row, 1, 2), 3);
        assert_eq!(sample(&row, 1, 4), 4);
        assert_eq!(to_8bit(1, 1), 255);
        assert_eq!(to_8bit(3, 2), 255);
        assert_eq!(to_8bit(0x12AB, 16), 0x12);
    }

    #[test]
    fn test_unfilter_each_filter_type() {
        let previous = [10, 20, 30, 40];

        let mut sub = [1, 2, 3, 4];
        unfilter(1, &mut sub, &previous, 2).unwrap();
        assert_eq!(sub, [1, 2, 4, 6]);

        let mut up = [1, 2, 3, 4];
        unfilter(2, &mut up, &previous, 2).unwrap();
        assert_eq!(up, [11, 22, 33, 44]);

        let mut average = [1, 2, 3, 4];
        unfilter(3, &mut average, &previous, 2).unwrap();
        assert_eq!(average, [6, 12, 21, 30]);

        let mut paeth_row = [1, 2, 3, 4];
        unfilter(4, &mut paeth_row, &previous, 2).unwrap();
        assert_eq!(paeth_row, [11, 22, 33, 44]);

        assert!(unfilter(5, &mut [0], &[0], 1).is_err());
    }
}
