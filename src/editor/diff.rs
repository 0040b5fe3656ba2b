//! Byte-level comparison of two buffers

use serde::Serialize;

use super::buffer::ByteWindow;

/// How a position differs between the two sides
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffKind {
    /// Byte present on both sides with different values
    Changed,
    /// Trailing bytes only the second side has
    Added,
    /// Trailing bytes only the first side has
    Removed,
}

/// One difference between two buffers
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DiffEntry {
    pub offset: usize,
    pub kind: DiffKind,
    pub old_value: Option<Vec<u8>>,
    pub new_value: Option<Vec<u8>>,
}

/// Compare `a` against `b`
///
/// Each differing byte in the common prefix is a `Changed` entry. A length
/// mismatch adds one trailing `Removed` (A is longer) or `Added` (B is
/// longer) entry carrying the excess.
pub fn diff(a: &[u8], b: &[u8]) -> Vec<DiffEntry> {
    let common = a.len().min(b.len());

    let mut entries: Vec<DiffEntry> = a[..common]
        .iter()
        .zip(&b[..common])
        .enumerate()
        .filter(|(_, (old, new))| old != new)
        .map(|(offset, (&old, &new))| DiffEntry {
            offset,
            kind: DiffKind::Changed,
            old_value: Some(vec![old]),
            new_value: Some(vec![new]),
        })
        .collect();

    if a.len() > common {
        entries.push(DiffEntry {
            offset: common,
            kind: DiffKind::Removed,
            old_value: Some(a[common..].to_vec()),
            new_value: None,
        });
    } else if b.len() > common {
        entries.push(DiffEntry {
            offset: common,
            kind: DiffKind::Added,
            old_value: None,
            new_value: Some(b[common..].to_vec()),
        });
    }

    entries
}

impl ByteWindow {
    /// Compare this window with the bytes `other` holds from the same start address
    ///
    /// Offsets in the result are absolute addresses. If `other` has no byte
    /// at this window's start, every byte here is reported as removed.
    pub fn diff_against(&self, other: &ByteWindow) -> Vec<DiffEntry> {
        let theirs = other.get_bytes(self.window_offset, usize::MAX);
        let mut entries = diff(&self.bytes, theirs);
        for entry in &mut entries {
            entry.offset += self.window_offset;
        }
        entries
    }
}
