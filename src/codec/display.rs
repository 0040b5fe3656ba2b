//! Safe decoding of arbitrary bytes into a display string
//!
//! Every byte of input is accounted for in the output: a valid printable
//! character is shown as itself, anything else becomes one placeholder per
//! byte it occupied. This keeps character columns aligned with byte columns
//! for single-byte text and makes damaged sequences visible.

use encoding_rs::SHIFT_JIS;

use super::text::is_cp932_lead;
use super::{is_displayable, Encoding, PLACEHOLDER};
use crate::error::{Error, Result};

/// Decode `bytes` for display under `encoding`
///
/// Only UTF-8 and CP932 are supported; other encodings are rejected before
/// any decoding happens.
pub fn bytes_to_display_text(bytes: &[u8], encoding: Encoding) -> Result<String> {
    match encoding {
        Encoding::Utf8 => Ok(decode_utf8(bytes)),
        Encoding::Cp932 => Ok(decode_cp932(bytes)),
        other => Err(Error::UnsupportedEncoding(other.name().to_string())),
    }
}

fn push_placeholders(out: &mut String, count: usize) {
    out.extend(std::iter::repeat(PLACEHOLDER).take(count));
}

fn decode_utf8(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        let lead = bytes[i];

        if lead < 0x80 {
            let c = lead as char;
            out.push(if is_displayable(c) { c } else { PLACEHOLDER });
            i += 1;
            continue;
        }

        let (len, mut code_point) = match lead {
            b if b & 0xE0 == 0xC0 => (2, u32::from(b & 0x1F)),
            b if b & 0xF0 == 0xE0 => (3, u32::from(b & 0x0F)),
            b if b & 0xF8 == 0xF0 => (4, u32::from(b & 0x07)),
            _ => {
                // Stray continuation or invalid lead byte
                out.push(PLACEHOLDER);
                i += 1;
                continue;
            }
        };

        if i + len > bytes.len() {
            // Incomplete sequence: consume only the lead byte
            out.push(PLACEHOLDER);
            i += 1;
            continue;
        }

        let mut valid = true;
        for &cont in &bytes[i + 1..i + len] {
            if cont & 0xC0 != 0x80 {
                valid = false;
                break;
            }
            code_point = (code_point << 6) | u32::from(cont & 0x3F);
        }

        let overlong = match len {
            2 => code_point < 0x80,
            3 => code_point < 0x800,
            _ => code_point < 0x10000,
        };

        let decoded = if valid && !overlong {
            char::from_u32(code_point).filter(|&c| is_displayable(c))
        } else {
            None
        };

        match decoded {
            Some(c) => out.push(c),
            None => push_placeholders(&mut out, len),
        }
        i += len;
    }

    out
}

fn decode_cp932(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        let len = if is_cp932_lead(bytes[i]) && i + 1 < bytes.len() {
            2
        } else {
            1
        };

        let decoded = SHIFT_JIS.decode_without_bom_handling_and_without_replacement(&bytes[i..i + len]);
        let unit = decoded.as_deref().map(|text| {
            let mut chars = text.chars();
            (chars.next(), chars.next())
        });

        match unit {
            Some((Some(c), None)) if is_displayable(c) => {
                out.push(c);
            }
            Some(_) => {
                // Valid but not showable: one placeholder per byte
                push_placeholders(&mut out, len);
            }
            None => {
                // Bad pair: mark the lead byte and retry from the trail byte
                out.push(PLACEHOLDER);
                i += 1;
                continue;
            }
        }
        i += len;
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utf8(bytes: &[u8]) -> String {
        bytes_to_display_text(bytes, Encoding::Utf8).unwrap()
    }

    #[test]
    fn test_ascii_printable() {
        assert_eq!(utf8(b"Hello, world!"), "Hello, world!");
    }

    #[test]
    fn test_control_bytes_become_placeholders() {
        assert_eq!(utf8(&[0x00, 0x1F, 0x7F]), "...");
        assert_eq!(utf8(&[0x41, 0x00, 0x42]), "A.B");
    }

    #[test]
    fn test_multibyte_text() {
        assert_eq!(utf8("こんにちは".as_bytes()), "こんにちは");
        assert_eq!(utf8("AあB".as_bytes()), "AあB");
    }

    #[test]
    fn test_incomplete_sequence() {
        assert_eq!(utf8(&[0xE3, 0x81]), "..");
    }

    #[test]
    fn test_overlong_sequence() {
        assert_eq!(utf8(&[0xC0, 0x81]), "..");
    }

    #[test]
    fn test_invalid_and_c1_sequences() {
        // stray continuation, U+0083 (C1 control), truncated lead
        assert_eq!(utf8(&[0x89, 0xC2, 0x83, 0xE2]), "....");
        assert_eq!(utf8(&[0xC2, 0x92, 0x04, 0x00]), "....");
    }

    #[test]
    fn test_encoded_surrogate_is_rejected() {
        // ED A0 80 would be U+D800
        assert_eq!(utf8(&[0xED, 0xA0, 0x80]), "...");
    }

    #[test]
    fn test_out_of_range_code_point() {
        // F4 90 80 80 would be U+110000
        assert_eq!(utf8(&[0xF4, 0x90, 0x80, 0x80]), "....");
    }

    #[test]
    fn test_cp932_decoding() {
        let text = bytes_to_display_text(&[0x61, 0x82, 0xA0, 0x00], Encoding::Cp932).unwrap();
        assert_eq!(text, "aあ.");
    }

    #[test]
    fn test_cp932_dangling_lead_byte() {
        let text = bytes_to_display_text(&[0x41, 0x82], Encoding::Cp932).unwrap();
        assert_eq!(text, "A.");
    }

    #[test]
    fn test_cp932_half_width_katakana() {
        let text = bytes_to_display_text(&[0xB1], Encoding::Cp932).unwrap();
        assert_eq!(text, "ｱ");
    }

    #[test]
    fn test_separators_are_displayed() {
        assert_eq!(utf8("a\u{00A0}b".as_bytes()), "a\u{00A0}b");
        assert_eq!(utf8("日\u{3000}本".as_bytes()), "日\u{3000}本");
        assert_eq!(utf8("\u{E000}".as_bytes()), "\u{E000}");
    }

    #[test]
    fn test_cp932_user_defined_area() {
        let text = bytes_to_display_text(&[0xF0, 0x40], Encoding::Cp932).unwrap();
        assert_eq!(text, "\u{E000}");
    }

    #[test]
    fn test_cp932_unshowable_single_byte() {
        let text = bytes_to_display_text(&[0x80, 0x41, 0x7F], Encoding::Cp932).unwrap();
        assert_eq!(text, ".A.");
    }

    #[test]
    fn test_cp932_ideographic_space() {
        let text = bytes_to_display_text(&[0x81, 0x40, 0x41], Encoding::Cp932).unwrap();
        assert_eq!(text, "\u{3000}A");
    }

    #[test]
    fn test_unsupported_display_encoding() {
        let result = bytes_to_display_text(b"abc", Encoding::Utf16Le);
        assert!(matches!(result, Err(Error::UnsupportedEncoding(_))));
    }
}
