//! Declarative field reader
//!
//! Analyzers describe records as C-like declarations, one per call:
//!
//! ```text
//! uint16_t version;
//! uint32_t compressed_size;
//! ```
//!
//! Each read decodes the field at the cursor and advances it by the field
//! width.

use super::traits::AnalyzeValue;
use crate::codec::{Encoding, Endian};
use crate::editor::ByteWindow;
use crate::error::{Error, Result};

/// Integer types accepted in declarations: (name, width, signed)
const FIELD_TYPES: [(&str, usize, bool); 6] = [
    ("uint8_t", 1, false),
    ("int8_t", 1, true),
    ("uint16_t", 2, false),
    ("int16_t", 2, true),
    ("uint32_t", 4, false),
    ("int32_t", 4, true),
];

/// Split `"type name;"` into its type and name
fn parse_declaration(line: &str) -> Result<(&str, &str)> {
    let malformed = || Error::Validation(format!("Parse error in \"{}\"", line));

    let body = line.trim().strip_suffix(';').ok_or_else(malformed)?;
    let mut parts = body.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(ty), Some(name), None) => Ok((ty, name)),
        _ => Err(malformed()),
    }
}

/// Cursor over a window that decodes declared fields
pub struct FieldReader<'a> {
    window: &'a ByteWindow,
    address: usize,
    endian: Endian,
}

impl<'a> FieldReader<'a> {
    /// Start reading little-endian fields at `address`
    pub fn new(window: &'a ByteWindow, address: usize) -> Self {
        Self {
            window,
            address,
            endian: Endian::Little,
        }
    }

    /// Use a different byte order for subsequent fields
    pub fn with_endian(mut self, endian: Endian) -> Self {
        self.endian = endian;
        self
    }

    /// Current cursor position
    pub fn address(&self) -> usize {
        self.address
    }

    /// Move the cursor forward without decoding
    pub fn skip(&mut self, length: usize) {
        self.address = self.address.saturating_add(length);
    }

    /// Decode one declared integer field
    pub fn read(&mut self, declaration: &str) -> Result<AnalyzeValue> {
        let (ty, name) = parse_declaration(declaration)?;
        let (_, size, signed) = FIELD_TYPES
            .iter()
            .find(|(t, _, _)| *t == ty)
            .copied()
            .ok_or_else(|| Error::Validation(format!("Not supported type : \"{}\" in \"{}\"", ty, declaration)))?;

        let value = self
            .window
            .read_number(self.address, size, self.endian, signed)
            .ok_or_else(|| self.range_error(size))?;

        let field = AnalyzeValue::integer(name, self.address, size, self.endian, signed, value);
        self.address += size;
        Ok(field)
    }

    /// Decode one integer field into `into` and return its value as a length
    pub fn read_value(&mut self, declaration: &str, into: &mut Vec<AnalyzeValue>) -> Result<usize> {
        let field = self.read(declaration)?;
        let value = field.as_integer().unwrap_or_default();
        into.push(field);
        Ok(usize::try_from(value).unwrap_or(usize::MAX))
    }

    /// One `uint8_t` field per byte, named `{prefix}0`, `{prefix}1`, ...
    pub fn read_byte_array(&mut self, prefix: &str, count: usize) -> Result<Vec<AnalyzeValue>> {
        (0..count)
            .map(|i| self.read(&format!("uint8_t {}{};", prefix, i)))
            .collect()
    }

    /// Decode `length` bytes as display text
    pub fn read_text(&mut self, name: &str, length: usize, encoding: Encoding) -> Result<AnalyzeValue> {
        if self.window.get_bytes(self.address, length).len() != length {
            return Err(self.range_error(length));
        }
        let text = self.window.get_chars(self.address, length, encoding)?;
        let field = AnalyzeValue::text(name, self.address, length, encoding, text);
        self.address += length;
        Ok(field)
    }

    /// Record `length` undecoded bytes and step over them
    pub fn read_opaque(&mut self, name: &str, length: usize) -> AnalyzeValue {
        let field = AnalyzeValue::opaque(name, self.address, length);
        self.skip(length);
        field
    }

    fn range_error(&self, length: usize) -> Error {
        Error::Range {
            address: self.address,
            length,
            start: self.window.window_offset(),
            end: self.window.window_end(),
        }
    }
}
