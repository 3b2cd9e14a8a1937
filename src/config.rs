//! Configuration to acknowledge user preferences as well as set defaults.
//!
//! We look for an acparts.toml in the working directory and, if present, load
//! settings from there: the text encoding, whether unrecognized files may be
//! opened, which extensions to list, and where the preference file lives.

use crate::catalog::{AllowlistPolicy, Catalog};
use crate::document::LoadOptions;
use crate::encoding::{TextEncoding, DEFAULT_ENCODING};
use crate::error::Result;
use facet::Facet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Name of the optional configuration file.
pub const CONFIG_FILE: &str = "acparts.toml";

#[derive(Facet, Clone, Debug)]
/// Tool settings loaded from acparts.toml or falling back to defaults.
pub struct Config {
    #[facet(default = DEFAULT_ENCODING.to_string())]
    /// Encoding label used to read and write parts files.
    pub encoding: String,
    #[facet(default = true)]
    /// Refuse files that are not in the recognized table.
    pub enforce_allowlist: bool,
    #[facet(default = vec!["txt".to_string()])]
    /// File suffixes to match when listing a directory.
    pub file_extensions: Vec<String>,
    #[facet(default = "setting.ini".to_string())]
    /// Where the last-used directory is remembered.
    pub settings_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            encoding: DEFAULT_ENCODING.to_string(),
            enforce_allowlist: true,
            file_extensions: vec!["txt".to_string()],
            settings_file: "setting.ini".to_string(),
        }
    }
}

impl Config {
    #[must_use]
    /// Load configuration from acparts.toml if present.
    pub fn load() -> Self {
        Self::load_from(Path::new(CONFIG_FILE))
    }

    #[must_use]
    /// Load configuration from `path`, using defaults if it is missing or malformed.
    pub fn load_from(path: &Path) -> Self {
        let Ok(contents) = fs::read_to_string(path) else {
            return Self::default();
        };
        if let Ok(config) = facet_toml::from_str::<Self>(&contents) {
            return config;
        }
        warn!(path = %path.display(), "ignoring malformed configuration");
        Self::default()
    }

    #[must_use]
    /// Allowlist policy implied by `enforce_allowlist`.
    pub fn policy(&self) -> AllowlistPolicy {
        if self.enforce_allowlist {
            AllowlistPolicy::Enforce
        } else {
            AllowlistPolicy::Permissive
        }
    }

    /// Encoding and catalog for loading documents.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::EditorError::UnknownEncoding`] if the encoding
    /// label is not recognised.
    pub fn load_options(&self) -> Result<LoadOptions> {
        Ok(LoadOptions {
            encoding: TextEncoding::for_label(&self.encoding)?,
            catalog: Catalog::new(self.policy()),
        })
    }

    #[must_use]
    /// Path of the preference file.
    pub fn settings_path(&self) -> PathBuf {
        PathBuf::from(&self.settings_file)
    }
}

#[cfg(test)]
#[path = "tests/config.rs"]
mod tests;
