//! Loading a window from a file and writing it back
//!
//! Write-back has two paths. When the window kept its loaded length, only
//! the window's byte range is overwritten in place. When inserts or removals
//! changed its length, the unread tail of the file (everything after the
//! originally loaded window) is read, appended to the window, and the file
//! is rewritten from the window offset and truncated to the new length.

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use super::buffer::ByteWindow;
use crate::error::{Error, Result};

/// Check that a path names something on disk (file, directory or symlink)
fn exists(path: &Path) -> bool {
    match fs::symlink_metadata(path) {
        Ok(meta) => {
            let kind = meta.file_type();
            kind.is_file() || kind.is_dir() || kind.is_symlink()
        }
        Err(_) => false,
    }
}

impl ByteWindow {
    /// Open a window over `path` starting at `window_offset`
    ///
    /// A `window_length` of 0 reads to the end of the file; longer requests
    /// are clamped to the bytes available. A missing file is not an error:
    /// the window becomes empty but stays bound to `path`, so callers detect
    /// a failed open by checking [`ByteWindow::size`].
    pub fn open(&mut self, path: impl AsRef<Path>, window_offset: usize, window_length: usize) -> Result<()> {
        let path = path.as_ref();

        if !exists(path) {
            log::warn!("{} does not exist, opening an empty window", path.display());
            let bound = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
            self.reset(Vec::new(), Some(bound), window_offset);
            return Ok(());
        }

        let mut file = File::open(path)?;
        let file_len = usize::try_from(file.metadata()?.len()).unwrap_or(usize::MAX);
        let available = file_len.saturating_sub(window_offset);
        let length = if window_length == 0 {
            available
        } else {
            window_length.min(available)
        };

        let mut bytes = vec![0u8; length];
        if length > 0 {
            file.seek(SeekFrom::Start(window_offset as u64))?;
            file.read_exact(&mut bytes)?;
        }

        let bound = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        log::info!(
            "Opened {} window {:#x}..{:#x} ({} of {} bytes)",
            bound.display(),
            window_offset,
            window_offset + length,
            length,
            file_len
        );
        self.reset(bytes, Some(bound), window_offset);
        Ok(())
    }

    /// Write the window back to `path`, or to the bound file when `None`
    ///
    /// In-memory state is untouched if any step fails.
    pub fn write(&mut self, path: Option<&Path>) -> Result<()> {
        let target: PathBuf = match (path, &self.source_path) {
            (Some(path), _) => path.to_path_buf(),
            (None, Some(source)) => source.clone(),
            (None, None) => return Err(Error::Unbound),
        };

        if self.bytes.len() == self.original_length {
            self.write_in_place(&target)?;
        } else {
            self.write_resized(&target)?;
        }

        let is_source = self.source_path.as_deref().map_or(true, |source| {
            source == target || fs::canonicalize(&target).is_ok_and(|t| t == source)
        });
        if is_source {
            // The file now holds the current window; later writes start from here
            self.original_length = self.bytes.len();
            if self.source_path.is_none() {
                self.source_path = Some(target);
            }
        }
        Ok(())
    }

    fn write_in_place(&self, target: &Path) -> Result<()> {
        let mut file = OpenOptions::new().write(true).create(true).truncate(false).open(target)?;
        file.seek(SeekFrom::Start(self.window_offset as u64))?;
        file.write_all(&self.bytes)?;
        file.flush()?;

        log::info!(
            "Wrote {} bytes in place at {:#x} to {}",
            self.bytes.len(),
            self.window_offset,
            target.display()
        );
        Ok(())
    }

    fn write_resized(&self, target: &Path) -> Result<()> {
        // The tail always comes from the file the window was loaded from
        let source = self.source_path.as_deref().unwrap_or(target);
        let remainder = self.read_remainder(source)?;

        let mut contents = Vec::with_capacity(self.bytes.len() + remainder.len());
        contents.extend_from_slice(&self.bytes);
        contents.extend_from_slice(&remainder);

        let mut file = OpenOptions::new().write(true).create(true).truncate(false).open(target)?;
        file.seek(SeekFrom::Start(self.window_offset as u64))?;
        file.write_all(&contents)?;
        file.set_len((self.window_offset + contents.len()) as u64)?;
        file.flush()?;

        log::info!(
            "Wrote resized window ({} -> {} bytes, {} byte tail) at {:#x} to {}",
            self.original_length,
            self.bytes.len(),
            remainder.len(),
            self.window_offset,
            target.display()
        );
        Ok(())
    }

    /// Bytes of `source` after the originally loaded window
    fn read_remainder(&self, source: &Path) -> Result<Vec<u8>> {
        let mut file = match File::open(source) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let tail_start = (self.window_offset + self.original_length) as u64;
        if tail_start >= file.metadata()?.len() {
            return Ok(Vec::new());
        }

        let mut remainder = Vec::new();
        file.seek(SeekFrom::Start(tail_start))?;
        file.read_to_end(&mut remainder)?;
        Ok(remainder)
    }
}
