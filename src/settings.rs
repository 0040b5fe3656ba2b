//! Engine settings persistence
//!
//! Settings are stored in a JSON file at the platform-appropriate config location:
//! - macOS: ~/Library/Application Support/bytewin/settings.json
//! - Windows: %APPDATA%/bytewin/settings.json
//! - Linux: ~/.config/bytewin/settings.json

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::codec::Encoding;
use crate::editor::{ByteWindow, MAX_HISTORY_SIZE};

/// Maximum number of recent files to track
const MAX_RECENT_FILES: usize = 10;

/// Engine defaults applied when opening windows and extracting strings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Encoding used when none is requested
    pub default_encoding: Encoding,

    /// Shortest run reported by string extraction
    pub min_string_length: usize,

    /// Undo depth for new windows
    pub max_history: usize,

    /// Bytes to load when opening a file (0 reads to the end)
    pub default_window_length: usize,

    /// List of recently opened files (most recent first)
    pub recent_files: Vec<PathBuf>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            default_encoding: Encoding::Utf8,
            min_string_length: 4,
            max_history: MAX_HISTORY_SIZE,
            default_window_length: 0,
            recent_files: Vec::new(),
        }
    }
}

impl EngineSettings {
    /// Get the path to the settings file
    fn settings_path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut path| {
            path.push("bytewin");
            path.push("settings.json");
            path
        })
    }

    /// Load settings from disk, or return defaults if not found
    pub fn load() -> Self {
        let Some(path) = Self::settings_path() else {
            log::warn!("Could not determine config directory, using defaults");
            return Self::default();
        };
        Self::load_from(&path)
    }

    /// Load settings from a specific file, or return defaults
    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    settings
                }
                Err(e) => {
                    log::warn!("Failed to parse settings file: {}, using defaults", e);
                    Self::default()
                }
            },
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    log::warn!("Failed to read settings file: {}", e);
                }
                Self::default()
            }
        }
    }

    /// Save settings to disk
    pub fn save(&self) {
        let Some(path) = Self::settings_path() else {
            log::warn!("Could not determine config directory, settings not saved");
            return;
        };
        self.save_to(&path);
    }

    /// Save settings to a specific file
    pub fn save_to(&self, path: &Path) {
        // Ensure the config directory exists
        if let Some(parent) = path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                log::warn!("Failed to create config directory: {}", e);
                return;
            }
        }

        match serde_json::to_string_pretty(self) {
            Ok(contents) => {
                if let Err(e) = std::fs::write(path, contents) {
                    log::warn!("Failed to write settings file: {}", e);
                } else {
                    log::info!("Saved settings to {}", path.display());
                }
            }
            Err(e) => {
                log::warn!("Failed to serialize settings: {}", e);
            }
        }
    }

    /// Create an empty window using the configured history depth
    pub fn new_window(&self) -> ByteWindow {
        ByteWindow::new().with_history_limit(self.max_history)
    }

    /// Add a file to the recent files list
    pub fn add_recent_file(&mut self, path: PathBuf) {
        // Remove if already in list (to move to front)
        self.recent_files.retain(|p| p != &path);

        self.recent_files.insert(0, path);
        self.recent_files.truncate(MAX_RECENT_FILES);
    }

    /// Get the recent files list
    pub fn recent_files(&self) -> &[PathBuf] {
        &self.recent_files
    }

    /// Clear the recent files list
    pub fn clear_recent_files(&mut self) {
        self.recent_files.clear();
    }
}
