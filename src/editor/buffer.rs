//! Byte window management with edit tracking
//!
//! ## Addressing
//!
//! A [`ByteWindow`] holds a contiguous slice of a file starting at
//! `window_offset`. Every address accepted or returned by its API is an
//! absolute file address; the window translates it by subtracting
//! `window_offset` before indexing its bytes.
//!
//! ## Mutation rules
//!
//! - Mutations validate their address range before touching the bytes, so
//!   a failed call leaves the window and its history untouched.
//! - Each successful mutation pushes exactly one record per undo step onto
//!   the history and clears the redo stack.
//! - The changed-address set records single-position writes exactly.
//!   Operations that shift later bytes clear it first, since the old
//!   addresses no longer name the same bytes.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use super::history::{EditOperation, History};
use crate::codec::{self, Encoding, Endian};
use crate::error::{Error, Result};

/// An editable window of bytes, optionally bound to a region of a file
pub struct ByteWindow {
    /// Window contents; all edits apply here
    pub(super) bytes: Vec<u8>,

    /// Absolute path of the backing file, if any
    pub(super) source_path: Option<PathBuf>,

    /// File offset of `bytes[0]`
    pub(super) window_offset: usize,

    /// Length of `bytes` when last loaded from (or written to) the file
    pub(super) original_length: usize,

    /// Edit history for undo/redo
    pub(super) history: History,

    /// Absolute addresses written since the last load
    pub(super) changed: HashSet<usize>,
}

impl ByteWindow {
    /// Create an empty, unbound window
    pub fn new() -> Self {
        Self::from_bytes_at(Vec::new(), 0)
    }

    /// Create an unbound window over in-memory bytes starting at address 0
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self::from_bytes_at(bytes, 0)
    }

    /// Create an unbound window whose first byte sits at `window_offset`
    pub fn from_bytes_at(bytes: Vec<u8>, window_offset: usize) -> Self {
        Self {
            original_length: bytes.len(),
            bytes,
            source_path: None,
            window_offset,
            history: History::new(),
            changed: HashSet::new(),
        }
    }

    /// Replace the history with one of a different depth (drops current history)
    pub fn with_history_limit(mut self, max_history: usize) -> Self {
        self.history = History::with_limit(max_history);
        self
    }

    // ========== Window Geometry ==========

    /// Number of bytes currently in the window
    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// Check if the window holds no bytes
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Absolute address of the first byte
    pub fn window_offset(&self) -> usize {
        self.window_offset
    }

    /// Absolute address one past the last byte
    pub fn window_end(&self) -> usize {
        self.window_offset + self.bytes.len()
    }

    /// Window length at the last load or write-back
    pub fn original_length(&self) -> usize {
        self.original_length
    }

    /// Backing file, if the window was opened from one
    pub fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }

    /// The whole window
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Check if an absolute address names a byte in the window
    pub fn contains(&self, address: usize) -> bool {
        address >= self.window_offset && address < self.window_end()
    }

    /// Translate an in-window address to an index into `bytes`
    fn index_of(&self, address: usize) -> Option<usize> {
        self.contains(address).then(|| address - self.window_offset)
    }

    /// Validate a write position: any byte in the window or one past the end
    fn insertion_index(&self, address: usize, length: usize) -> Result<usize> {
        if address < self.window_offset || address > self.window_end() {
            return Err(self.range_error(address, length));
        }
        Ok(address - self.window_offset)
    }

    fn range_error(&self, address: usize, length: usize) -> Error {
        Error::Range {
            address,
            length,
            start: self.window_offset,
            end: self.window_end(),
        }
    }

    // ========== Reads ==========

    /// Get the byte at an absolute address
    pub fn get_byte(&self, address: usize) -> Option<u8> {
        self.index_of(address).map(|i| self.bytes[i])
    }

    /// Get up to `length` bytes starting at `address`
    ///
    /// The result is clamped to the window and is empty when the range lies
    /// entirely outside it.
    pub fn get_bytes(&self, address: usize, length: usize) -> &[u8] {
        let Some(start) = self.index_of(address) else {
            return &[];
        };
        let end = start.saturating_add(length).min(self.bytes.len());
        &self.bytes[start..end]
    }

    /// Decode bytes for display, one placeholder per undisplayable byte
    pub fn get_chars(&self, address: usize, length: usize, encoding: Encoding) -> Result<String> {
        codec::bytes_to_display_text(self.get_bytes(address, length), encoding)
    }

    /// Read a `size`-byte integer, or `None` if it does not fit in the window
    pub fn read_number(&self, address: usize, size: usize, endian: Endian, signed: bool) -> Option<i128> {
        let bytes = self.get_bytes(address, size);
        if size == 0 || bytes.len() != size {
            return None;
        }
        Some(codec::bytes_to_number(bytes, endian, signed))
    }

    /// Signed byte at `address`
    pub fn get_int8(&self, address: usize) -> Option<i8> {
        self.get_byte(address).map(|b| b as i8)
    }

    /// Signed 16-bit integer at `address`
    pub fn get_int16(&self, address: usize, endian: Endian) -> Option<i16> {
        self.read_number(address, 2, endian, true).map(|v| v as i16)
    }

    /// Signed 32-bit integer at `address`
    pub fn get_int32(&self, address: usize, endian: Endian) -> Option<i32> {
        self.read_number(address, 4, endian, true).map(|v| v as i32)
    }

    // ========== Change Tracking ==========

    /// Addresses written since the last load
    pub fn changed_addresses(&self) -> &HashSet<usize> {
        &self.changed
    }

    /// Check if an address was written since the last load
    pub fn is_changed(&self, address: usize) -> bool {
        self.changed.contains(&address)
    }

    fn mark_span(&mut self, address: usize, length: usize) {
        self.changed.extend(address..address + length);
    }

    // ========== Mutations ==========

    /// Overwrite one byte
    ///
    /// Writing at one past the end appends the byte.
    pub fn change(&mut self, address: usize, value: u8) -> Result<()> {
        let index = self.insertion_index(address, 1)?;
        let op = EditOperation::Change {
            address,
            old_value: self.bytes.get(index).copied(),
            new_value: value,
        };
        self.apply(&op, false);
        self.history.push(op);
        Ok(())
    }

    /// Overwrite a span, growing the window if the span runs past its end
    pub fn change_bytes(&mut self, address: usize, values: &[u8]) -> Result<()> {
        let index = self.insertion_index(address, values.len())?;
        if values.is_empty() {
            return Ok(());
        }

        let end = (index + values.len()).min(self.bytes.len());
        let op = EditOperation::ChangeRange {
            address,
            old_values: self.bytes[index..end].to_vec(),
            new_values: values.to_vec(),
        };
        self.apply(&op, false);
        self.history.push(op);
        Ok(())
    }

    /// Insert bytes before `address`, shifting later bytes right
    pub fn insert(&mut self, address: usize, values: &[u8]) -> Result<()> {
        self.insertion_index(address, values.len())?;
        if values.is_empty() {
            return Ok(());
        }

        let op = EditOperation::Insert {
            address,
            values: values.to_vec(),
        };
        self.apply(&op, false);
        self.history.push(op);
        Ok(())
    }

    /// Remove `length` bytes starting at `address`, returning them
    ///
    /// The span is validated as a whole, then removed one byte at a time:
    /// each removed byte is its own undo step.
    pub fn remove(&mut self, address: usize, length: usize) -> Result<Vec<u8>> {
        let start = self.insertion_index(address, length)?;
        if start + length > self.bytes.len() {
            return Err(self.range_error(address, length));
        }

        let mut removed = Vec::with_capacity(length);
        for _ in 0..length {
            let op = EditOperation::Remove {
                address,
                value: self.bytes[start],
            };
            removed.push(self.bytes[start]);
            self.apply(&op, false);
            self.history.push(op);
        }
        Ok(removed)
    }

    /// Apply one operation to the bytes and the changed-address set
    ///
    /// `reverting` is set when the operation is the inverse produced by an
    /// undo; reverted single-position writes un-mark their addresses rather
    /// than marking them.
    pub(super) fn apply(&mut self, op: &EditOperation, reverting: bool) {
        let offset = self.window_offset;
        match op {
            EditOperation::Change {
                address,
                old_value,
                new_value,
            } => {
                let index = address - offset;
                let end = index + usize::from(old_value.is_some());
                self.bytes.splice(index..end, [*new_value]);
                if reverting {
                    self.changed.remove(address);
                } else {
                    self.changed.insert(*address);
                }
            }
            EditOperation::ChangeRange {
                address,
                old_values,
                new_values,
            } => {
                let index = address - offset;
                let end = index + old_values.len();
                let shifts = old_values.len() != new_values.len() && end < self.bytes.len();
                self.bytes.splice(index..end, new_values.iter().copied());

                if shifts {
                    self.changed.clear();
                    if !reverting {
                        self.mark_span(*address, new_values.len());
                    }
                } else if reverting {
                    let span = old_values.len().max(new_values.len());
                    for a in *address..*address + span {
                        self.changed.remove(&a);
                    }
                } else {
                    self.mark_span(*address, new_values.len());
                }
            }
            EditOperation::Insert { address, values } => {
                let index = address - offset;
                self.bytes.splice(index..index, values.iter().copied());
                self.changed.clear();
                self.mark_span(*address, values.len());
            }
            EditOperation::Remove { address, .. } => {
                let index = address - offset;
                let is_last = index + 1 == self.bytes.len();
                self.bytes.remove(index);
                // Reverting an append shifts nothing, so only its own mark goes
                if reverting && is_last {
                    self.changed.remove(address);
                } else {
                    self.changed.clear();
                }
            }
        }
    }

    // ========== History ==========

    /// Undo the last operation, returning the remaining undo depth
    pub fn undo(&mut self) -> usize {
        if let Some(inverse) = self.history.undo() {
            log::debug!("undo at {:#x}", inverse.address());
            self.apply(&inverse, true);
        }
        self.history.undo_count()
    }

    /// Redo the last undone operation, returning the remaining redo depth
    pub fn redo(&mut self) -> usize {
        if let Some(op) = self.history.redo() {
            log::debug!("redo at {:#x}", op.address());
            self.apply(&op, false);
        }
        self.history.redo_count()
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Reset contents and binding after a load
    pub(super) fn reset(&mut self, bytes: Vec<u8>, path: Option<PathBuf>, window_offset: usize) {
        self.original_length = bytes.len();
        self.bytes = bytes;
        self.source_path = path;
        self.window_offset = window_offset;
        self.history.clear();
        self.changed.clear();
    }
}

impl Default for ByteWindow {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_window() {
        let window = ByteWindow::new();
        assert_eq!(window.size(), 0);
        assert!(window.is_empty());
        assert!(window.get_bytes(0, 10).is_empty());
        assert_eq!(window.source_path(), None);
    }

    #[test]
    fn test_change_then_undo_scenario() {
        let mut window = ByteWindow::from_bytes(vec![0x10, 0x20, 0x30, 0x40]);

        window.change(1, 0x21).unwrap();
        assert_eq!(window.get_bytes(0, 4), &[0x10, 0x21, 0x30, 0x40]);
        assert!(window.is_changed(1));

        assert_eq!(window.undo(), 0);
        assert_eq!(window.get_bytes(0, 4), &[0x10, 0x20, 0x30, 0x40]);
        assert!(!window.is_changed(1));

        assert_eq!(window.redo(), 0);
        assert_eq!(window.get_byte(1), Some(0x21));
        assert!(window.is_changed(1));
    }

    #[test]
    fn test_absolute_addressing() {
        let mut window = ByteWindow::from_bytes_at(vec![0xAA, 0xBB, 0xCC], 0x100);

        assert_eq!(window.get_byte(0x100), Some(0xAA));
        assert_eq!(window.get_byte(0x0FF), None);
        assert_eq!(window.get_byte(0x103), None);
        assert_eq!(window.get_bytes(0x101, 10), &[0xBB, 0xCC]);

        window.change(0x102, 0x00).unwrap();
        assert_eq!(window.bytes(), &[0xAA, 0xBB, 0x00]);
        assert!(window.is_changed(0x102));
    }

    #[test]
    fn test_get_bytes_outside_window() {
        let window = ByteWindow::from_bytes_at(vec![1, 2, 3], 10);
        assert!(window.get_bytes(0, 5).is_empty());
        assert!(window.get_bytes(13, 5).is_empty());
        assert!(window.get_bytes(usize::MAX, usize::MAX).is_empty());
        assert_eq!(window.get_bytes(12, usize::MAX), &[3]);
    }

    #[test]
    fn test_change_out_of_range() {
        let mut window = ByteWindow::from_bytes_at(vec![1, 2, 3], 10);

        let err = window.change(9, 0xFF).unwrap_err();
        assert!(matches!(err, Error::Range { address: 9, .. }));
        assert!(window.change(14, 0xFF).is_err());
        assert_eq!(window.bytes(), &[1, 2, 3]);
        assert!(!window.can_undo());
    }

    #[test]
    fn test_change_at_end_appends() {
        let mut window = ByteWindow::from_bytes(vec![1, 2]);

        window.change(2, 3).unwrap();
        assert_eq!(window.bytes(), &[1, 2, 3]);

        window.undo();
        assert_eq!(window.bytes(), &[1, 2]);

        window.redo();
        assert_eq!(window.bytes(), &[1, 2, 3]);
    }

    #[test]
    fn test_undo_append_keeps_other_marks() {
        let mut window = ByteWindow::from_bytes(vec![1, 2]);
        window.change(0, 9).unwrap();
        window.change(2, 3).unwrap();

        window.undo();
        assert_eq!(window.bytes(), &[9, 2]);
        assert!(window.is_changed(0));
        assert!(!window.is_changed(2));
    }

    #[test]
    fn test_change_bytes_in_place() {
        let mut window = ByteWindow::from_bytes(vec![0, 1, 2, 3, 4]);

        window.change_bytes(1, &[0xAA, 0xBB]).unwrap();
        assert_eq!(window.bytes(), &[0, 0xAA, 0xBB, 3, 4]);
        assert!(window.is_changed(1) && window.is_changed(2));
        assert!(!window.is_changed(3));

        window.undo();
        assert_eq!(window.bytes(), &[0, 1, 2, 3, 4]);
        assert!(window.changed_addresses().is_empty());
    }

    #[test]
    fn test_change_bytes_grows_window() {
        let mut window = ByteWindow::from_bytes(vec![0, 1, 2]);

        window.change_bytes(2, &[0xAA, 0xBB, 0xCC]).unwrap();
        assert_eq!(window.bytes(), &[0, 1, 0xAA, 0xBB, 0xCC]);
        assert_eq!(window.size(), 5);

        window.undo();
        assert_eq!(window.bytes(), &[0, 1, 2]);

        window.redo();
        assert_eq!(window.bytes(), &[0, 1, 0xAA, 0xBB, 0xCC]);
    }

    #[test]
    fn test_insert_and_undo() {
        let mut window = ByteWindow::from_bytes(vec![0, 1, 2, 3]);
        window.change(3, 0x33).unwrap();

        window.insert(1, &[0xAA, 0xBB]).unwrap();
        assert_eq!(window.bytes(), &[0, 0xAA, 0xBB, 1, 2, 0x33]);
        // Insert forgets earlier addresses and marks only the new span
        assert!(!window.is_changed(3));
        assert!(window.is_changed(1) && window.is_changed(2));

        window.undo();
        assert_eq!(window.bytes(), &[0, 1, 2, 0x33]);

        window.redo();
        assert_eq!(window.bytes(), &[0, 0xAA, 0xBB, 1, 2, 0x33]);
    }

    #[test]
    fn test_insert_at_end_and_out_of_range() {
        let mut window = ByteWindow::from_bytes_at(vec![1, 2], 4);

        window.insert(6, &[3]).unwrap();
        assert_eq!(window.bytes(), &[1, 2, 3]);

        assert!(matches!(window.insert(3, &[0]), Err(Error::Range { .. })));
        assert!(matches!(window.insert(8, &[0]), Err(Error::Range { .. })));
    }

    #[test]
    fn test_insert_into_empty_window() {
        let mut window = ByteWindow::new();
        window.insert(0, &[0xAA]).unwrap();
        assert_eq!(window.bytes(), &[0xAA]);

        window.undo();
        assert!(window.is_empty());
    }

    #[test]
    fn test_insert_then_remove_restores() {
        let original = vec![0x10, 0x20, 0x30];
        let mut window = ByteWindow::from_bytes(original.clone());

        window.insert(1, &[0xAA, 0xBB, 0xCC]).unwrap();
        let removed = window.remove(1, 3).unwrap();

        assert_eq!(removed, vec![0xAA, 0xBB, 0xCC]);
        assert_eq!(window.bytes(), &original[..]);
        assert_eq!(window.size(), original.len());
    }

    #[test]
    fn test_remove_records_single_bytes() {
        let mut window = ByteWindow::from_bytes(vec![0, 1, 2, 3, 4]);

        window.remove(1, 2).unwrap();
        assert_eq!(window.bytes(), &[0, 3, 4]);

        assert_eq!(window.undo(), 1);
        assert_eq!(window.bytes(), &[0, 2, 3, 4]);
        assert_eq!(window.undo(), 0);
        assert_eq!(window.bytes(), &[0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_remove_past_end_fails() {
        let mut window = ByteWindow::from_bytes(vec![0, 1, 2]);

        assert!(matches!(window.remove(2, 2), Err(Error::Range { .. })));
        assert!(matches!(window.remove(3, 1), Err(Error::Range { .. })));
        assert_eq!(window.bytes(), &[0, 1, 2]);
        assert!(!window.can_undo());
    }

    #[test]
    fn test_remove_clears_changed_set() {
        let mut window = ByteWindow::from_bytes(vec![0, 1, 2, 3]);
        window.change(0, 0xFF).unwrap();
        window.remove(2, 1).unwrap();
        assert!(window.changed_addresses().is_empty());
    }

    #[test]
    fn test_new_edit_clears_redo() {
        let mut window = ByteWindow::from_bytes(vec![0, 1, 2]);
        window.change(0, 0xFF).unwrap();
        window.undo();
        assert!(window.can_redo());

        window.change(1, 0xEE).unwrap();
        assert!(!window.can_redo());
        assert_eq!(window.redo(), 0);
        assert_eq!(window.bytes(), &[0, 0xEE, 2]);
    }

    #[test]
    fn test_undo_on_empty_history() {
        let mut window = ByteWindow::from_bytes(vec![1]);
        assert_eq!(window.undo(), 0);
        assert_eq!(window.redo(), 0);
        assert_eq!(window.bytes(), &[1]);
    }

    #[test]
    fn test_undo_depth_counts() {
        let mut window = ByteWindow::from_bytes(vec![0; 4]);
        window.change(0, 1).unwrap();
        window.change(1, 2).unwrap();
        window.change(2, 3).unwrap();

        assert_eq!(window.undo(), 2);
        assert_eq!(window.undo(), 1);
        assert_eq!(window.redo(), 1);
        assert_eq!(window.redo(), 0);
        assert_eq!(window.bytes(), &[1, 2, 3, 0]);
    }

    #[test]
    fn test_history_limit() {
        let mut window = ByteWindow::from_bytes(vec![0; 4]).with_history_limit(2);
        for i in 0..4 {
            window.change(i, 0xFF).unwrap();
        }
        assert_eq!(window.undo(), 1);
        assert_eq!(window.undo(), 0);
        assert_eq!(window.bytes(), &[0xFF, 0xFF, 0, 0]);
    }

    #[test]
    fn test_integer_reads() {
        let window = ByteWindow::from_bytes_at(vec![0xFE, 0xFF, 0x01, 0x00, 0x00, 0x80], 0x10);

        assert_eq!(window.get_int8(0x10), Some(-2));
        assert_eq!(window.get_int16(0x10, Endian::Little), Some(-2));
        assert_eq!(window.get_int16(0x10, Endian::Big), Some(-257));
        assert_eq!(window.get_int32(0x12, Endian::Little), Some(i32::MIN + 1));
        assert_eq!(window.get_int32(0x13, Endian::Little), None);
        assert_eq!(window.get_int8(0x20), None);
        assert_eq!(window.read_number(0x11, 2, Endian::Little, false), Some(0x01FF));
    }

    #[test]
    fn test_get_chars() {
        let window = ByteWindow::from_bytes(b"Hi\x00\xE3\x81\x82".to_vec());
        assert_eq!(window.get_chars(0, 6, Encoding::Utf8).unwrap(), "Hi.あ");
        assert!(matches!(
            window.get_chars(0, 6, Encoding::Ascii),
            Err(Error::UnsupportedEncoding(_))
        ));
    }
}
