//! The recognized parts files and how many sections of each the editor shows.
//!
//! Parts directories also contain scratch and readme text files; only the names
//! below are parts data. Files past the cap are padding slots the game never reads.

use crate::error::{EditorError, Result};
use std::fs;
use std::path::Path;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Static metadata for one known parts file.
pub struct FileDescriptor {
    /// Exact base name, extension included.
    pub name: &'static str,
    /// Number of leading sections the editor keeps.
    pub max_sections: usize,
}

/// Every parts file the editor knows about.
pub const RECOGNIZED_FILES: &[FileDescriptor] = &[
    FileDescriptor { name: "Head.txt", max_sections: 64 },
    FileDescriptor { name: "Core.txt", max_sections: 64 },
    FileDescriptor { name: "Arms.txt", max_sections: 64 },
    FileDescriptor { name: "Legs.txt", max_sections: 96 },
    FileDescriptor { name: "Booster.txt", max_sections: 32 },
    FileDescriptor { name: "FCS.txt", max_sections: 32 },
    FileDescriptor { name: "Generator.txt", max_sections: 32 },
    FileDescriptor { name: "Radiator.txt", max_sections: 32 },
    FileDescriptor { name: "Inside.txt", max_sections: 32 },
    FileDescriptor { name: "Extension.txt", max_sections: 32 },
    FileDescriptor { name: "BackUnit.txt", max_sections: 96 },
    FileDescriptor { name: "ArmUnit.txt", max_sections: 64 },
    FileDescriptor { name: "Option.txt", max_sections: 16 },
];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// What to do with a file that is not in [`RECOGNIZED_FILES`].
pub enum AllowlistPolicy {
    #[default]
    /// Refuse to list or load it.
    Enforce,
    /// Accept it and show every section.
    Permissive,
}

#[derive(Clone, Copy, Debug, Default)]
/// Lookup over the recognized file table under a given policy.
pub struct Catalog {
    /// Treatment of unrecognized files.
    pub policy: AllowlistPolicy,
}

impl Catalog {
    #[must_use]
    /// Build a catalog with the given policy.
    pub fn new(policy: AllowlistPolicy) -> Self {
        Self { policy }
    }

    #[must_use]
    /// Find the descriptor for an exact base name.
    pub fn lookup(&self, name: &str) -> Option<&'static FileDescriptor> {
        RECOGNIZED_FILES.iter().find(|d| d.name == name)
    }

    /// Decide whether `path` may be loaded and how many sections to keep.
    ///
    /// `Ok(None)` means no cap applies.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::UnrecognizedFile`] when the policy is
    /// [`AllowlistPolicy::Enforce`] and the name is not in the table.
    pub fn admit(&self, path: &Path) -> Result<Option<usize>> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        match (self.lookup(&name), self.policy) {
            (Some(descriptor), _) => Ok(Some(descriptor.max_sections)),
            (None, AllowlistPolicy::Permissive) => Ok(None),
            (None, AllowlistPolicy::Enforce) => Err(EditorError::UnrecognizedFile { name }),
        }
    }

    /// List the files in `dir` the user may pick, sorted by name.
    ///
    /// A file qualifies when its extension is one of `extensions` and, under
    /// [`AllowlistPolicy::Enforce`], its name is recognized.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::FileAccess`] if the directory cannot be read.
    pub fn candidate_files(&self, dir: &Path, extensions: &[String]) -> Result<Vec<String>> {
        let access = |source| EditorError::FileAccess {
            path: dir.to_path_buf(),
            source,
        };

        let mut names = Vec::new();
        for entry in fs::read_dir(dir).map_err(access)? {
            let entry = entry.map_err(access)?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            let matches_ext = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| extensions.iter().any(|x| x == e));
            if !matches_ext {
                continue;
            }

            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if self.policy == AllowlistPolicy::Enforce && self.lookup(name).is_none() {
                continue;
            }
            names.push(name.to_string());
        }

        names.sort();
        Ok(names)
    }
}

#[cfg(test)]
#[path = "tests/catalog.rs"]
mod tests;
