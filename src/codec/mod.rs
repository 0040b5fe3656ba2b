//! Conversions between integers, text and raw bytes
//!
//! Everything here is a pure function over byte slices. The buffer and the
//! analyzers call into this module; it depends on nothing else in the crate.

mod display;
mod number;
mod text;

pub use display::bytes_to_display_text;
pub use number::{bytes_to_number, number_to_bytes};
pub use text::{string_to_bytes, EncodeOptions};

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use unicode_general_category::{get_general_category, GeneralCategory};

use crate::error::Error;

/// Placeholder emitted for bytes that cannot be displayed
pub const PLACEHOLDER: char = '.';

/// Text encodings understood by the codec
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Encoding {
    #[default]
    #[serde(rename = "utf-8", alias = "utf8")]
    Utf8,
    #[serde(rename = "utf-16le")]
    Utf16Le,
    #[serde(rename = "utf-16be")]
    Utf16Be,
    #[serde(rename = "ascii")]
    Ascii,
    #[serde(rename = "latin1", alias = "latin-1")]
    Latin1,
    /// Windows code page 932 (Shift_JIS with vendor extensions)
    #[serde(rename = "cp932", alias = "shift_jis", alias = "sjis")]
    Cp932,
}

impl Encoding {
    /// Canonical lowercase name
    pub fn name(self) -> &'static str {
        match self {
            Encoding::Utf8 => "utf-8",
            Encoding::Utf16Le => "utf-16le",
            Encoding::Utf16Be => "utf-16be",
            Encoding::Ascii => "ascii",
            Encoding::Latin1 => "latin1",
            Encoding::Cp932 => "cp932",
        }
    }

    /// Whether code units are two bytes wide
    pub fn is_utf16(self) -> bool {
        matches!(self, Encoding::Utf16Le | Encoding::Utf16Be)
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Encoding {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" => Ok(Encoding::Utf8),
            "utf-16le" | "utf16le" => Ok(Encoding::Utf16Le),
            "utf-16be" | "utf16be" => Ok(Encoding::Utf16Be),
            "ascii" | "us-ascii" => Ok(Encoding::Ascii),
            "latin1" | "latin-1" | "iso-8859-1" => Ok(Encoding::Latin1),
            "cp932" | "windows-31j" | "shift_jis" | "shift-jis" | "sjis" => Ok(Encoding::Cp932),
            _ => Err(Error::UnsupportedEncoding(s.to_string())),
        }
    }
}

/// Byte order for multi-byte integers
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Endian {
    #[default]
    Little,
    Big,
}

/// Whether a decoded character may be shown as-is
///
/// Rejects the Unicode "other" categories (control, format, surrogate,
/// private use, unassigned) and the separators, except for U+0020 which is
/// ordinary text in every encoding handled here.
pub fn is_printable(c: char) -> bool {
    if c == ' ' {
        return true;
    }
    if c == char::REPLACEMENT_CHARACTER {
        return false;
    }
    !matches!(
        get_general_category(c),
        GeneralCategory::Control
            | GeneralCategory::Format
            | GeneralCategory::Surrogate
            | GeneralCategory::PrivateUse
            | GeneralCategory::Unassigned
            | GeneralCategory::SpaceSeparator
            | GeneralCategory::LineSeparator
            | GeneralCategory::ParagraphSeparator
    )
}

/// Whether a decoded character may be shown in a byte dump
///
/// Looser than [`is_printable`]: only C0/C1 controls, DEL and U+FFFD are
/// rejected, so separators, format and private-use characters show as-is.
pub fn is_displayable(c: char) -> bool {
    !matches!(c, '\u{0}'..='\u{1F}' | '\u{7F}'..='\u{9F}' | char::REPLACEMENT_CHARACTER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoding_from_str() {
        assert_eq!("UTF-8".parse::<Encoding>().unwrap(), Encoding::Utf8);
        assert_eq!("utf-16le".parse::<Encoding>().unwrap(), Encoding::Utf16Le);
        assert_eq!("Shift_JIS".parse::<Encoding>().unwrap(), Encoding::Cp932);
        assert_eq!("latin-1".parse::<Encoding>().unwrap(), Encoding::Latin1);
    }

    #[test]
    fn test_encoding_unknown_name() {
        let err = "ebcdic".parse::<Encoding>().unwrap_err();
        assert!(matches!(err, Error::UnsupportedEncoding(name) if name == "ebcdic"));
    }

    #[test]
    fn test_encoding_serde_names() {
        let json = serde_json::to_string(&Encoding::Utf16Be).unwrap();
        assert_eq!(json, "\"utf-16be\"");
        let parsed: Encoding = serde_json::from_str("\"sjis\"").unwrap();
        assert_eq!(parsed, Encoding::Cp932);
    }

    #[test]
    fn test_is_printable() {
        assert!(is_printable('A'));
        assert!(is_printable(' '));
        assert!(is_printable('あ'));
        assert!(!is_printable('\n'));
        assert!(!is_printable('\u{0085}'));
        assert!(!is_printable('\u{200B}')); // zero width space (format)
        assert!(!is_printable('\u{3000}')); // ideographic space
        assert!(!is_printable('\u{E000}')); // private use
        assert!(!is_printable('\u{FFFD}'));
    }

    #[test]
    fn test_is_displayable() {
        assert!(is_displayable(' '));
        assert!(is_displayable('\u{00A0}'));
        assert!(is_displayable('\u{3000}'));
        assert!(is_displayable('\u{E000}'));
        assert!(!is_displayable('\t'));
        assert!(!is_displayable('\u{7F}'));
        assert!(!is_displayable('\u{0085}'));
        assert!(!is_displayable('\u{FFFD}'));
    }
}
