//! Editor module: the byte window, its history, and operations over it

pub mod buffer;
mod diff;
mod history;
mod persist;
mod search;
mod strings;

pub use buffer::ByteWindow;
pub use diff::{diff, DiffEntry, DiffKind};
pub use history::{EditOperation, History, MAX_HISTORY_SIZE};
pub use search::{find, parse_hex_pattern};
pub use strings::{extract_strings, ExtractedRun};
