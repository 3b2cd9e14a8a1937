//! The one preference that survives a restart: the last directory opened.
//!
//! Stored as a small UTF-8 INI file so it can be hand-edited alongside the
//! parts files it points at.

use crate::error::{EditorError, Result};
use ini::{EscapePolicy, Ini, ParseOption, WriteOption};
use std::io;
use std::path::{Path, PathBuf};
use tracing::warn;

const SECTION: &str = "LAST_USED";
const DIRECTORY_KEY: &str = "directory";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
/// Preferences read at startup and written on every directory change.
pub struct Settings {
    /// Directory chosen most recently, if any.
    pub last_directory: Option<PathBuf>,
}

impl Settings {
    #[must_use]
    /// Read preferences from `path`.
    ///
    /// A missing file is simply no preference; an unreadable one is logged and
    /// treated the same way.
    pub fn load(path: &Path) -> Self {
        // Windows paths: backslashes are data, not escapes
        let opt = ParseOption {
            enabled_escape: false,
            ..ParseOption::default()
        };
        let ini = match Ini::load_from_file_opt(path, opt) {
            Ok(ini) => ini,
            Err(ini::Error::Io(e)) if e.kind() == io::ErrorKind::NotFound => {
                return Self::default()
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring unreadable settings");
                return Self::default();
            }
        };

        let last_directory = ini
            .get_from(Some(SECTION), DIRECTORY_KEY)
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(PathBuf::from);

        Self { last_directory }
    }

    /// Write preferences to `path`, replacing the file.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::FileAccess`] if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut ini = Ini::new();
        let directory = self
            .last_directory
            .as_deref()
            .map(|d| d.to_string_lossy().into_owned())
            .unwrap_or_default();
        ini.with_section(Some(SECTION)).set(DIRECTORY_KEY, directory);

        let opt = WriteOption {
            escape_policy: EscapePolicy::Nothing,
            ..WriteOption::default()
        };
        ini.write_to_file_opt(path, opt)
            .map_err(|source| EditorError::FileAccess {
                path: path.to_path_buf(),
                source,
            })
    }
}

#[cfg(test)]
#[path = "tests/settings.rs"]
mod tests;
