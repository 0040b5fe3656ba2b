//! Extraction of human-readable text runs from raw bytes

use std::collections::HashSet;

use serde::Serialize;

use super::buffer::ByteWindow;
use crate::codec::{is_printable, Encoding, PLACEHOLDER};
use crate::error::{Error, Result};

/// A run of printable text found in the window
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ExtractedRun {
    /// Decoded text of the run
    pub text: String,
    /// Absolute address of the run's first byte
    pub offset: usize,
    /// Encoding the run was decoded with
    pub encoding: Encoding,
}

impl ExtractedRun {
    /// Text safe for a one-line listing (tab, CR and LF become placeholders)
    pub fn display_text(&self) -> String {
        self.text
            .chars()
            .map(|c| if matches!(c, '\t' | '\r' | '\n') { PLACEHOLDER } else { c })
            .collect()
    }
}

/// Scan `data` for printable runs of at least `min_length` characters
///
/// `base_address` is added to every reported offset.
pub fn extract_strings(
    data: &[u8],
    base_address: usize,
    encoding: Encoding,
    min_length: usize,
) -> Result<Vec<ExtractedRun>> {
    let runs = match encoding {
        Encoding::Ascii => scan_ascii(data, min_length),
        Encoding::Utf8 => scan_utf8(data, min_length),
        Encoding::Utf16Le | Encoding::Utf16Be => scan_utf16(data, encoding, min_length),
        other => return Err(Error::UnsupportedEncoding(other.name().to_string())),
    };

    Ok(runs
        .into_iter()
        .map(|(offset, text)| ExtractedRun {
            text,
            offset: base_address + offset,
            encoding,
        })
        .collect())
}

fn is_ascii_text(b: u8) -> bool {
    (0x20..=0x7E).contains(&b) || matches!(b, b'\t' | b'\n' | b'\r')
}

fn scan_ascii(data: &[u8], min_length: usize) -> Vec<(usize, String)> {
    let mut runs = Vec::new();
    let mut start = None;

    for (i, &b) in data.iter().chain(std::iter::once(&0u8)).enumerate() {
        match (is_ascii_text(b) && i < data.len(), start) {
            (true, None) => start = Some(i),
            (false, Some(s)) => {
                if i - s >= min_length {
                    let text = data[s..i].iter().map(|&b| b as char).collect();
                    runs.push((s, text));
                }
                start = None;
            }
            _ => {}
        }
    }

    runs
}

/// Split decoded characters into printable runs
///
/// `chars` pairs each character with its byte offset.
fn printable_runs(
    chars: impl IntoIterator<Item = (usize, char)>,
    min_length: usize,
    runs: &mut Vec<(usize, String)>,
) {
    let mut current: Option<(usize, String, usize)> = None;

    for (offset, c) in chars {
        if is_printable(c) {
            let run = current.get_or_insert_with(|| (offset, String::new(), 0));
            run.1.push(c);
            run.2 += 1;
        } else if let Some((start, text, count)) = current.take() {
            if count >= min_length {
                runs.push((start, text));
            }
        }
    }

    if let Some((start, text, count)) = current {
        if count >= min_length {
            runs.push((start, text));
        }
    }
}

fn scan_utf8(data: &[u8], min_length: usize) -> Vec<(usize, String)> {
    let mut runs = Vec::new();
    let mut i = 0;

    while i < data.len() {
        if data[i] & 0xC0 == 0x80 {
            i += 1;
            continue;
        }

        let valid = match std::str::from_utf8(&data[i..]) {
            Ok(text) => text,
            Err(e) => {
                let end = i + e.valid_up_to();
                // valid_up_to always ends on a character boundary
                std::str::from_utf8(&data[i..end]).unwrap_or_default()
            }
        };

        if valid.is_empty() {
            i += 1;
            continue;
        }

        // Non-printable characters are dropped, not treated as run breaks
        let text: String = valid.chars().filter(|&c| is_printable(c)).collect();
        if text.chars().count() >= min_length {
            runs.push((i, text));
        }
        i += valid.len();
    }

    runs
}

fn scan_utf16(data: &[u8], encoding: Encoding, min_length: usize) -> Vec<(usize, String)> {
    let unit_at = |i: usize| -> u16 {
        let pair = [data[i], data[i + 1]];
        if encoding == Encoding::Utf16Le {
            u16::from_le_bytes(pair)
        } else {
            u16::from_be_bytes(pair)
        }
    };

    let mut runs = Vec::new();
    let mut seen = HashSet::new();

    for alignment in 0..2 {
        let mut pass = Vec::new();
        let mut i = alignment;

        while i + 1 < data.len() {
            // Greedily decode code units until the first unpaired surrogate
            let mut chars = Vec::new();
            let mut pos = i;
            while pos + 1 < data.len() {
                let unit = unit_at(pos);
                let decoded = match unit {
                    0xD800..=0xDBFF if pos + 3 < data.len() => {
                        let low = unit_at(pos + 2);
                        char::decode_utf16([unit, low]).next().and_then(|r| r.ok())
                    }
                    _ => char::decode_utf16([unit]).next().and_then(|r| r.ok()),
                };
                let Some(c) = decoded else { break };
                chars.push((pos, c));
                pos += c.len_utf16() * 2;
            }

            if chars.is_empty() {
                i += 2;
                continue;
            }

            printable_runs(chars, min_length, &mut pass);
            i = pos;
        }

        for run in pass {
            if seen.insert(run.clone()) {
                runs.push(run);
            }
        }
    }

    runs
}

impl ByteWindow {
    /// Extract printable runs from the whole window
    pub fn extract_strings(&self, encoding: Encoding, min_length: usize) -> Result<Vec<ExtractedRun>> {
        extract_strings(&self.bytes, self.window_offset, encoding, min_length)
    }
}
