//! Byte pattern search and substitution

use super::buffer::ByteWindow;
use super::history::EditOperation;
use crate::error::{Error, Result};

/// Parse a hex pattern string into bytes
/// Supports formats like "FF D8 FF" or "FFD8FF"
pub fn parse_hex_pattern(pattern: &str) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    let mut chars = pattern.chars().filter(|c| !c.is_whitespace());

    while let Some(c) = chars.next() {
        let high = c
            .to_digit(16)
            .ok_or_else(|| Error::Validation(format!("Invalid character in hex pattern: '{}'", c)))?;

        let low_char = chars
            .next()
            .ok_or_else(|| Error::Validation("Incomplete hex byte: expected second digit".to_string()))?;
        let low = low_char
            .to_digit(16)
            .ok_or_else(|| Error::Validation(format!("Invalid hex digit: '{}'", low_char)))?;

        bytes.push(((high << 4) | low) as u8);
    }

    if bytes.is_empty() {
        return Err(Error::Validation("Empty pattern".to_string()));
    }

    Ok(bytes)
}

/// Find the first occurrence of `pattern` in `data` at or after `from`
///
/// An empty pattern matches at `from` as long as `from` is inside `data`.
pub fn find(data: &[u8], from: usize, pattern: &[u8]) -> Option<usize> {
    if from >= data.len() {
        return None;
    }

    match pattern {
        [] => Some(from),
        [byte] => memchr::memchr(*byte, &data[from..]).map(|i| from + i),
        _ => horspool(&data[from..], pattern).map(|i| from + i),
    }
}

/// Boyer–Moore–Horspool search for patterns of two or more bytes
fn horspool(haystack: &[u8], pattern: &[u8]) -> Option<usize> {
    let m = pattern.len();
    if haystack.len() < m {
        return None;
    }

    // Distance from each byte's last occurrence (excluding the final position) to the end
    let mut skip = [m; 256];
    for (i, &b) in pattern[..m - 1].iter().enumerate() {
        skip[b as usize] = m - 1 - i;
    }

    let last = m - 1;
    let mut pos = 0;
    while pos + m <= haystack.len() {
        let mut j = last;
        while haystack[pos + j] == pattern[j] {
            if j == 0 {
                return Some(pos);
            }
            j -= 1;
        }
        pos += skip[haystack[pos + last] as usize].max(1);
    }

    None
}

impl ByteWindow {
    /// Find `pattern` at or after `start_address`, returning its absolute address
    ///
    /// A start address before the window begins the scan at the window start.
    /// An empty pattern matches only at a start address inside the window.
    pub fn search(&self, start_address: usize, pattern: &[u8]) -> Option<usize> {
        if pattern.is_empty() {
            return self.contains(start_address).then_some(start_address);
        }
        let from = start_address.saturating_sub(self.window_offset);
        find(&self.bytes, from, pattern).map(|i| i + self.window_offset)
    }

    /// Replace every `old` in `[address, address + scan_length)` with `new`
    ///
    /// Replacement splices, so `new` may be longer or shorter than `old`; the
    /// scan region grows or shrinks with it and scanning resumes right after
    /// each replacement. Each replacement is one undo step. Returns the
    /// number of replacements.
    pub fn substitute(&mut self, address: usize, scan_length: usize, old: &[u8], new: &[u8]) -> Result<usize> {
        if address < self.window_offset || address > self.window_end() {
            return Err(Error::Range {
                address,
                length: scan_length,
                start: self.window_offset,
                end: self.window_end(),
            });
        }
        if old.is_empty() {
            return Ok(0);
        }

        let mut pos = address - self.window_offset;
        let mut end = pos.saturating_add(scan_length).min(self.bytes.len());
        let mut count = 0;

        while let Some(found) = find(&self.bytes[..end], pos, old) {
            let op = EditOperation::ChangeRange {
                address: found + self.window_offset,
                old_values: old.to_vec(),
                new_values: new.to_vec(),
            };
            self.apply(&op, false);
            self.history.push(op);

            count += 1;
            pos = found + new.len();
            end = end + new.len() - old.len();
        }

        if count > 0 {
            log::debug!("substituted {} occurrence(s) from {:#x}", count, address);
        }
        Ok(count)
    }
}
