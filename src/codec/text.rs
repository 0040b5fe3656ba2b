//! Text -> byte sequence encoding with fixed-size field policies

use encoding_rs::SHIFT_JIS;

use super::Encoding;
use crate::error::{Error, Result};

/// How to fit encoded text into a fixed-size field
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Right-pad short output up to the target size
    pub pad: bool,
    /// Byte used for padding
    pub pad_byte: u8,
    /// Cut long output at a unit boundary instead of failing
    pub truncate: bool,
    /// Append a NUL terminator (two bytes for UTF-16) before sizing
    pub null_terminate: bool,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            pad: true,
            pad_byte: 0x00,
            truncate: true,
            null_terminate: false,
        }
    }
}

/// Encode `text` and fit it to `target_size`
///
/// With no target size the encoded bytes are returned unmodified (apart from
/// the optional terminator).
pub fn string_to_bytes(
    text: &str,
    target_size: Option<usize>,
    encoding: Encoding,
    options: &EncodeOptions,
) -> Result<Vec<u8>> {
    let mut encoded = encode(text, encoding)?;

    if options.null_terminate {
        let terminator = if encoding.is_utf16() { 2 } else { 1 };
        encoded.extend(std::iter::repeat(0u8).take(terminator));
    }

    let Some(size) = target_size else {
        return Ok(encoded);
    };

    if encoded.len() > size {
        if !options.truncate {
            return Err(Error::Validation(format!(
                "encoded byte length ({}) exceeds requested size ({})",
                encoded.len(),
                size
            )));
        }
        let cut = unit_boundary(&encoded, size, encoding);
        encoded.truncate(cut);
        return Ok(encoded);
    }

    if encoded.len() < size && options.pad {
        encoded.resize(size, options.pad_byte);
    }

    Ok(encoded)
}

fn encode(text: &str, encoding: Encoding) -> Result<Vec<u8>> {
    let bytes = match encoding {
        Encoding::Utf8 => text.as_bytes().to_vec(),
        Encoding::Ascii => text.encode_utf16().map(|cu| (cu & 0x7F) as u8).collect(),
        Encoding::Latin1 => text.encode_utf16().map(|cu| (cu & 0xFF) as u8).collect(),
        Encoding::Utf16Le => text.encode_utf16().flat_map(u16::to_le_bytes).collect(),
        Encoding::Utf16Be => text.encode_utf16().flat_map(u16::to_be_bytes).collect(),
        Encoding::Cp932 => {
            let (bytes, _, had_errors) = SHIFT_JIS.encode(text);
            if had_errors {
                return Err(Error::Validation(format!(
                    "text {:?} is not representable in {}",
                    text, encoding
                )));
            }
            bytes.into_owned()
        }
    };
    Ok(bytes)
}

/// Largest cut point `<= limit` that does not split a code unit
fn unit_boundary(bytes: &[u8], limit: usize, encoding: Encoding) -> usize {
    match encoding {
        Encoding::Utf16Le | Encoding::Utf16Be => limit - limit % 2,
        Encoding::Cp932 => {
            let mut pos = 0;
            while pos < limit {
                let step = if is_cp932_lead(bytes[pos]) { 2 } else { 1 };
                if pos + step > limit {
                    break;
                }
                pos += step;
            }
            pos
        }
        Encoding::Utf8 => {
            let mut pos = limit;
            // Back off continuation bytes so the cut lands on a sequence start
            while pos > 0 && pos < bytes.len() && (bytes[pos] & 0xC0) == 0x80 {
                pos -= 1;
            }
            pos
        }
        Encoding::Ascii | Encoding::Latin1 => limit,
    }
}

/// CP932 lead byte ranges
pub(crate) fn is_cp932_lead(byte: u8) -> bool {
    matches!(byte, 0x81..=0x9F | 0xE0..=0xFC)
}
