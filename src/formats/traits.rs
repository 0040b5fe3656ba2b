//! Traits and record types for structure analyzers

use serde::Serialize;

use crate::codec::{Encoding, Endian};
use crate::editor::ByteWindow;
use crate::error::Result;

/// Decoded content of one field
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Integer(i128),
    Text(String),
    /// Region that is located but not decoded (compressed data, extra fields)
    Opaque,
}

/// A single field located by an analyzer
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AnalyzeValue {
    /// Field name as declared, e.g. `compressed_size`
    pub name: String,
    /// Absolute address of the first byte
    pub address: usize,
    /// Width in bytes
    pub size: usize,
    /// Byte order of integer fields
    pub endian: Endian,
    /// Whether an integer field is two's complement
    pub signed: bool,
    /// Encoding of text fields
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encoding: Option<Encoding>,
    pub value: FieldValue,
}

impl AnalyzeValue {
    /// Create an integer field
    pub fn integer(name: impl Into<String>, address: usize, size: usize, endian: Endian, signed: bool, value: i128) -> Self {
        Self {
            name: name.into(),
            address,
            size,
            endian,
            signed,
            encoding: None,
            value: FieldValue::Integer(value),
        }
    }

    /// Create a text field
    pub fn text(name: impl Into<String>, address: usize, size: usize, encoding: Encoding, text: String) -> Self {
        Self {
            name: name.into(),
            address,
            size,
            endian: Endian::Little,
            signed: false,
            encoding: Some(encoding),
            value: FieldValue::Text(text),
        }
    }

    /// Create a located-but-undecoded field
    pub fn opaque(name: impl Into<String>, address: usize, size: usize) -> Self {
        Self {
            name: name.into(),
            address,
            size,
            endian: Endian::Little,
            signed: false,
            encoding: None,
            value: FieldValue::Opaque,
        }
    }

    /// Integer content, if this is an integer field
    pub fn as_integer(&self) -> Option<i128> {
        match self.value {
            FieldValue::Integer(v) => Some(v),
            _ => None,
        }
    }
}

/// A named group of fields, e.g. one ZIP record
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AnalyzeResult {
    pub name: String,
    pub values: Vec<AnalyzeValue>,
}

impl AnalyzeResult {
    /// Create an empty record
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: Vec::new(),
        }
    }

    /// Look up a field by name
    pub fn get(&self, name: &str) -> Option<&AnalyzeValue> {
        self.values.iter().find(|v| v.name == name)
    }
}

/// Trait for file structure analyzers
pub trait Analyzer {
    /// Short identifier, e.g. `zip`
    fn name(&self) -> &'static str;

    /// Check if this analyzer recognizes the window contents
    fn detect(&self, window: &ByteWindow) -> bool;

    /// Walk the window and return the records found
    fn parse(&self, window: &ByteWindow) -> Result<Vec<AnalyzeResult>>;
}
