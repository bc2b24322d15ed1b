//! PDF object model
//!
//! The handful of object types an invoice file needs, and a serializer that
//! writes them in PDF syntax.

use super::fonts::encode_win_ansi;
use std::collections::BTreeMap;
use std::io::{self, Write};

#[derive(Debug, Clone, PartialEq)]
pub enum PdfObject {
    Null,
    Boolean(bool),
    Integer(i64),
    Real(f64),
    String(PdfString),
    Name(String),
    Array(Vec<PdfObject>),
    Dictionary(PdfDictionary),
    Stream(PdfStream),
    /// Indirect reference to an object number (generation is always 0)
    Reference(u32),
}

impl PdfObject {
    pub fn name(name: impl Into<String>) -> Self {
        PdfObject::Name(name.into())
    }

    /// Text string in WinAnsi encoding
    pub fn text(text: &str) -> Self {
        PdfObject::String(PdfString::Literal(encode_win_ansi(text)))
    }

    pub fn rect(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        PdfObject::Array(vec![
            PdfObject::Real(x1),
            PdfObject::Real(y1),
            PdfObject::Real(x2),
            PdfObject::Real(y2),
        ])
    }
}

impl From<PdfDictionary> for PdfObject {
    fn from(dict: PdfDictionary) -> Self {
        PdfObject::Dictionary(dict)
    }
}

impl From<PdfStream> for PdfObject {
    fn from(stream: PdfStream) -> Self {
        PdfObject::Stream(stream)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PdfString {
    /// `(...)` with escapes
    Literal(Vec<u8>),
    /// `<...>`
    Hex(Vec<u8>),
}

/// Dictionary with keys written in sorted order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PdfDictionary {
    entries: BTreeMap<String, PdfObject>,
}

impl PdfDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_type(mut self, type_name: &str) -> Self {
        self.insert("Type", PdfObject::name(type_name));
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<PdfObject>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&PdfObject> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &PdfObject)> {
        self.entries.iter()
    }
}

/// Stream dictionary plus data
#[derive(Debug, Clone, PartialEq)]
pub struct PdfStream {
    pub dict: PdfDictionary,
    pub data: Vec<u8>,
    /// Data already carries its own filter and must not be compressed again
    pub encoded: bool,
}

impl PdfStream {
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            dict: PdfDictionary::new(),
            data,
            encoded: false,
        }
    }

    /// A stream whose data is already encoded with `filter`
    pub fn encoded(dict: PdfDictionary, data: Vec<u8>, filter: &str) -> Self {
        let mut stream = Self { dict, data, encoded: true };
        stream.dict.insert("Filter", PdfObject::name(filter));
        stream
    }
}

/// Writes objects in PDF syntax
pub struct PdfSerializer<W: Write> {
    writer: W,
}

impl<W: Write> PdfSerializer<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn write_object(&mut self, obj: &PdfObject) -> io::Result<()> {
        match obj {
            PdfObject::Null => self.writer.write_all(b"null"),
            PdfObject::Boolean(b) => write!(self.writer, "{}", b),
            PdfObject::Integer(n) => write!(self.writer, "{}", n),
            PdfObject::Real(n) => write!(self.writer, "{}", format_real(*n)),
            PdfObject::String(s) => self.write_string(s),
            PdfObject::Name(name) => self.write_name(name),
            PdfObject::Array(items) => {
                self.writer.write_all(b"[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        self.writer.write_all(b" ")?;
                    }
                    self.write_object(item)?;
                }
                self.writer.write_all(b"]")
            }
            PdfObject::Dictionary(dict) => self.write_dictionary(dict),
            PdfObject::Stream(stream) => {
                let mut dict = stream.dict.clone();
                dict.insert("Length", PdfObject::Integer(stream.data.len() as i64));
                self.write_dictionary(&dict)?;
                self.writer.write_all(b"\nstream\n")?;
                self.writer.write_all(&stream.data)?;
                self.writer.write_all(b"\nendstream")
            }
            PdfObject::Reference(num) => write!(self.writer, "{} 0 R", num),
        }
    }

    fn write_string(&mut self, s: &PdfString) -> io::Result<()> {
        match s {
            PdfString::Literal(bytes) => {
                self.writer.write_all(&escape_literal(bytes))
            }
            PdfString::Hex(bytes) => {
                self.writer.write_all(b"<")?;
                for byte in bytes {
                    write!(self.writer, "{:02X}", byte)?;
                }
                self.writer.write_all(b">")
            }
        }
    }

    fn write_name(&mut self, name: &str) -> io::Result<()> {
        self.writer.write_all(b"/")?;
        for byte in name.bytes() {
            let delimiter = matches!(
                byte,
                b'#' | b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'/' | b'%'
            );
            if (0x21..=0x7E).contains(&byte) && !delimiter {
                self.writer.write_all(&[byte])?;
            } else {
                write!(self.writer, "#{:02X}", byte)?;
            }
        }
        Ok(())
    }

    fn write_dictionary(&mut self, dict: &PdfDictionary) -> io::Result<()> {
        self.writer.write_all(b"<<")?;
        for (key, value) in dict.iter() {
            self.writer.write_all(b" ")?;
            self.write_name(key)?;
            self.writer.write_all(b" ")?;
            self.write_object(value)?;
        }
        self.writer.write_all(b" >>")
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// `(...)` literal for already-encoded bytes; bytes outside printable ASCII
/// are written as octal escapes
pub fn escape_literal(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(bytes.len() + 2);
    out.push(b'(');
    for &byte in bytes {
        match byte {
            b'(' | b')' | b'\\' => {
                out.push(b'\\');
                out.push(byte);
            }
            b'\n' => out.extend_from_slice(b"\\n"),
            b'\r' => out.extend_from_slice(b"\\r"),
            b'\t' => out.extend_from_slice(b"\\t"),
            0x20..=0x7E => out.push(byte),
            _ => out.extend_from_slice(format!("\\{:03o}", byte).as_bytes()),
        }
    }
    out.push(b')');
    out
}

/// Shortest form with at most four decimals
pub fn format_real(n: f64) -> String {
    if !n.is_finite() {
        return "0".to_string();
    }
    let s = format!("{:.4}", n);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    match s {
        "-0" | "" => "0".to_string(),
        s => s.to_string(),
    }
}
