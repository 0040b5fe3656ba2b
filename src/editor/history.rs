//! Undo/redo history management

/// Default number of operations kept in history
pub const MAX_HISTORY_SIZE: usize = 1000;

/// Represents a single edit operation that can be undone/redone
///
/// Addresses are absolute file addresses, the same ones the caller passed
/// to the buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EditOperation {
    /// Single byte write; `old_value` is `None` when the write appended
    /// one byte past the end of the window
    Change {
        address: usize,
        old_value: Option<u8>,
        new_value: u8,
    },
    /// Span overwrite; `old_values` may be shorter than `new_values` when
    /// the write grew the window, and for substitutions the lengths may
    /// differ arbitrarily
    ChangeRange {
        address: usize,
        old_values: Vec<u8>,
        new_values: Vec<u8>,
    },
    /// Bytes spliced in at `address`
    Insert { address: usize, values: Vec<u8> },
    /// Single byte removed from `address`
    Remove { address: usize, value: u8 },
}

impl EditOperation {
    /// First address touched by this operation
    pub fn address(&self) -> usize {
        match self {
            EditOperation::Change { address, .. }
            | EditOperation::ChangeRange { address, .. }
            | EditOperation::Insert { address, .. }
            | EditOperation::Remove { address, .. } => *address,
        }
    }

    /// The operation that undoes this one
    pub fn inverse(&self) -> EditOperation {
        match self {
            EditOperation::Change {
                address,
                old_value: Some(old),
                new_value,
            } => EditOperation::Change {
                address: *address,
                old_value: Some(*new_value),
                new_value: *old,
            },
            // Undoing an append means removing the appended byte
            EditOperation::Change {
                address,
                old_value: None,
                new_value,
            } => EditOperation::Remove {
                address: *address,
                value: *new_value,
            },
            EditOperation::ChangeRange {
                address,
                old_values,
                new_values,
            } => EditOperation::ChangeRange {
                address: *address,
                old_values: new_values.clone(),
                new_values: old_values.clone(),
            },
            EditOperation::Insert { address, values } => {
                // A multi-byte insert inverts to a span replacement with nothing
                if let [value] = values.as_slice() {
                    EditOperation::Remove {
                        address: *address,
                        value: *value,
                    }
                } else {
                    EditOperation::ChangeRange {
                        address: *address,
                        old_values: values.clone(),
                        new_values: Vec::new(),
                    }
                }
            }
            EditOperation::Remove { address, value } => EditOperation::Insert {
                address: *address,
                values: vec![*value],
            },
        }
    }
}

/// Linear undo/redo history
///
/// Each stack holds the operation to apply when it is popped: undo entries
/// are forward edits, redo entries are the inverses produced by undo.
pub struct History {
    /// Stack of operations that can be undone
    undo_stack: Vec<EditOperation>,

    /// Stack of operations that can be redone
    redo_stack: Vec<EditOperation>,

    /// Oldest operations are dropped beyond this depth
    max_size: usize,
}

impl History {
    /// Create a new empty history with the default depth
    pub fn new() -> Self {
        Self::with_limit(MAX_HISTORY_SIZE)
    }

    /// Create a new empty history keeping at most `max_size` operations
    pub fn with_limit(max_size: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_size: max_size.max(1),
        }
    }

    /// Push a new operation onto the history
    ///
    /// This clears the redo stack (branching history not supported)
    /// and enforces the maximum history size.
    pub fn push(&mut self, op: EditOperation) {
        self.redo_stack.clear();
        self.push_undo(op);
    }

    fn push_undo(&mut self, op: EditOperation) {
        self.undo_stack.push(op);

        // Enforce maximum size - drop oldest operations
        if self.undo_stack.len() > self.max_size {
            let excess = self.undo_stack.len() - self.max_size;
            self.undo_stack.drain(..excess);
        }
    }

    /// Pop the last operation and move its inverse to the redo stack
    ///
    /// Returns the inverse, which the caller must apply.
    pub fn undo(&mut self) -> Option<EditOperation> {
        let op = self.undo_stack.pop()?;
        let inverse = op.inverse();
        self.redo_stack.push(inverse.clone());
        Some(inverse)
    }

    /// Pop the last undone operation and move its inverse back to undo
    ///
    /// Returns the operation to re-apply.
    pub fn redo(&mut self) -> Option<EditOperation> {
        let op = self.redo_stack.pop()?;
        self.push_undo(op.inverse());
        Some(op.inverse())
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Get the number of operations in the undo stack
    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    /// Get the number of operations in the redo stack
    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    /// Clear all history
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn change(address: usize) -> EditOperation {
        EditOperation::Change {
            address,
            old_value: Some(0x00),
            new_value: 0xFF,
        }
    }

    #[test]
    fn test_push_and_undo() {
        let mut history = History::new();
        history.push(change(0));

        assert!(history.can_undo());
        assert!(!history.can_redo());

        let op = history.undo();
        assert_eq!(
            op,
            Some(EditOperation::Change {
                address: 0,
                old_value: Some(0xFF),
                new_value: 0x00,
            })
        );
        assert!(!history.can_undo());
        assert!(history.can_redo());
    }

    #[test]
    fn test_redo_returns_forward_operation() {
        let mut history = History::new();
        history.push(change(0));

        history.undo();
        let op = history.redo();
        assert_eq!(op, Some(change(0)));
        assert!(history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn test_new_operation_clears_redo() {
        let mut history = History::new();
        history.push(change(0));
        history.undo();
        assert!(history.can_redo());

        history.push(change(1));
        assert!(!history.can_redo());
    }

    #[test]
    fn test_max_history_size() {
        let mut history = History::new();
        for i in 0..MAX_HISTORY_SIZE + 100 {
            history.push(change(i));
        }
        assert_eq!(history.undo_count(), MAX_HISTORY_SIZE);
    }

    #[test]
    fn test_custom_limit_drops_oldest() {
        let mut history = History::with_limit(2);
        history.push(change(0));
        history.push(change(1));
        history.push(change(2));

        assert_eq!(history.undo_count(), 2);
        assert_eq!(history.undo().map(|op| op.address()), Some(2));
        assert_eq!(history.undo().map(|op| op.address()), Some(1));
        assert!(history.undo().is_none());
    }

    #[test]
    fn test_inverse_pairs() {
        let insert = EditOperation::Insert {
            address: 4,
            values: vec![0xAA],
        };
        assert_eq!(
            insert.inverse(),
            EditOperation::Remove {
                address: 4,
                value: 0xAA
            }
        );
        assert_eq!(insert.inverse().inverse(), insert);

        let append = EditOperation::Change {
            address: 8,
            old_value: None,
            new_value: 0x11,
        };
        assert_eq!(
            append.inverse(),
            EditOperation::Remove {
                address: 8,
                value: 0x11
            }
        );

        let range = EditOperation::ChangeRange {
            address: 0,
            old_values: vec![1],
            new_values: vec![2, 3],
        };
        assert_eq!(range.inverse().inverse(), range);
    }
}
