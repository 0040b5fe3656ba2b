//! File structure analyzers
//!
//! Analyzers recognize a container format in a window and describe its
//! records as named fields with absolute addresses. A field can be edited
//! back through [`apply_value`], which re-encodes the new value at the
//! field's width.

mod field;
pub mod traits;
mod zip;

pub use field::FieldReader;
pub use traits::{AnalyzeResult, AnalyzeValue, Analyzer, FieldValue};
pub use zip::ZipAnalyzer;

use crate::codec::{self, EncodeOptions, Encoding};
use crate::editor::ByteWindow;
use crate::error::{Error, Result};

/// All built-in analyzers, in detection order
pub fn analyzers() -> Vec<Box<dyn Analyzer>> {
    vec![Box::new(ZipAnalyzer)]
}

/// Detect the format of a window and return the matching analyzer
pub fn detect(window: &ByteWindow) -> Option<Box<dyn Analyzer>> {
    analyzers().into_iter().find(|analyzer| analyzer.detect(window))
}

/// Parse a window with the first analyzer that recognizes it
///
/// Returns no records when nothing detects the window.
pub fn analyze(window: &ByteWindow) -> Result<Vec<AnalyzeResult>> {
    let Some(analyzer) = detect(window) else {
        log::debug!("no analyzer recognized the window");
        return Ok(Vec::new());
    };

    let records = analyzer.parse(window)?;
    log::debug!("{} analyzer found {} record(s)", analyzer.name(), records.len());
    Ok(records)
}

/// Overwrite a field with a new value
///
/// Integers are written unsigned or signed per the field, at its width and
/// byte order. Text is encoded in the field's encoding, truncated or padded
/// with NULs to the field size. The write is one undo step.
pub fn apply_value(window: &mut ByteWindow, field: &AnalyzeValue, new_value: FieldValue) -> Result<()> {
    let bytes = match (&field.value, new_value) {
        (FieldValue::Integer(_), FieldValue::Integer(value)) => {
            codec::number_to_bytes(value, field.size, field.endian, field.signed)?
        }
        (FieldValue::Text(_), FieldValue::Text(text)) => codec::string_to_bytes(
            &text,
            Some(field.size),
            field.encoding.unwrap_or(Encoding::Utf8),
            &EncodeOptions::default(),
        )?,
        _ => {
            return Err(Error::Validation(format!(
                "field \"{}\" cannot take a value of that kind",
                field.name
            )))
        }
    };

    window.change_bytes(field.address, &bytes)
}
