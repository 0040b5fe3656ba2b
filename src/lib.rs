//! bytewin: a windowed, file-backed binary editing engine
//!
//! A [`ByteWindow`] loads a byte range of a file, edits it with undo/redo,
//! searches and extracts text from it, and writes it back, shifting the
//! rest of the file when the window grew or shrank.

pub mod codec;
pub mod editor;
pub mod error;
pub mod formats;
pub mod settings;

pub use editor::ByteWindow;
pub use error::{Error, Result};
