//! Content stream generation
//!
//! Builds the operator sequence of one page. Coordinates are PDF user space:
//! points with the origin at the bottom-left corner.

use super::objects::{escape_literal, format_real};
use std::io::Write;

/// Page content stream builder
#[derive(Debug, Default, Clone)]
pub struct ContentStream {
    data: Vec<u8>,
}

impl ContentStream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    // Graphics state

    /// q
    pub fn save_state(&mut self) -> &mut Self {
        self.op("q");
        self
    }

    /// Q
    pub fn restore_state(&mut self) -> &mut Self {
        self.op("Q");
        self
    }

    /// cm
    pub fn transform(&mut self, a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> &mut Self {
        self.operands(&[a, b, c, d, e, f]);
        self.op("cm");
        self
    }

    /// w
    pub fn set_line_width(&mut self, width: f64) -> &mut Self {
        self.operands(&[width]);
        self.op("w");
        self
    }

    // Colour, components in 0..=1

    /// rg
    pub fn set_fill_rgb(&mut self, r: f64, g: f64, b: f64) -> &mut Self {
        self.operands(&[r, g, b]);
        self.op("rg");
        self
    }

    /// RG
    pub fn set_stroke_rgb(&mut self, r: f64, g: f64, b: f64) -> &mut Self {
        self.operands(&[r, g, b]);
        self.op("RG");
        self
    }

    // Paths

    pub fn move_to(&mut self, x: f64, y: f64) -> &mut Self {
        self.operands(&[x, y]);
        self.op("m");
        self
    }

    pub fn line_to(&mut self, x: f64, y: f64) -> &mut Self {
        self.operands(&[x, y]);
        self.op("l");
        self
    }

    pub fn rect(&mut self, x: f64, y: f64, width: f64, height: f64) -> &mut Self {
        self.operands(&[x, y, width, height]);
        self.op("re");
        self
    }

    pub fn stroke(&mut self) -> &mut Self {
        self.op("S");
        self
    }

    pub fn fill(&mut self) -> &mut Self {
        self.op("f");
        self
    }

    pub fn fill_and_stroke(&mut self) -> &mut Self {
        self.op("B");
        self
    }

    pub fn end_path(&mut self) -> &mut Self {
        self.op("n");
        self
    }

    // Text

    pub fn begin_text(&mut self) -> &mut Self {
        self.op("BT");
        self
    }

    pub fn end_text(&mut self) -> &mut Self {
        self.op("ET");
        self
    }

    /// Tf
    pub fn set_font(&mut self, resource: &str, size: f64) -> &mut Self {
        let _ = writeln!(self.data, "/{} {} Tf", resource, format_real(size));
        self
    }

    /// Tm
    pub fn set_text_matrix(&mut self, a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> &mut Self {
        self.operands(&[a, b, c, d, e, f]);
        self.op("Tm");
        self
    }

    /// Tj with text already in the font's encoding
    pub fn show_text(&mut self, encoded: &[u8]) -> &mut Self {
        self.data.extend_from_slice(&escape_literal(encoded));
        self.op(" Tj");
        self
    }

    /// Do
    pub fn draw_xobject(&mut self, resource: &str) -> &mut Self {
        let _ = writeln!(self.data, "/{} Do", resource);
        self
    }

    fn operands(&mut self, values: &[f64]) {
        for value in values {
            self.data.extend_from_slice(format_real(*value).as_bytes());
            self.data.push(b' ');
        }
    }

    fn op(&mut self, operator: &str) {
        self.data.extend_from_slice(operator.as_bytes());
        self.data.push(b'\n');
    }
}
