//! The session object bridging the parts files and the interactive editor.
//!
//! Everything the shell knows lives here: the directory being browsed, its
//! candidate files, the one open Document, the selection cursors and the last
//! status message. Every operation reports through `message` instead of
//! failing, so a bad file or a bad edit never ends the session.

use crate::config::Config;
use crate::document::{Document, LoadOptions};
use crate::error::{EditorError, Result};
use crate::settings::Settings;
use edtui::{EditorState, Lines};
use std::path::{Path, PathBuf};
use tracing::warn;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
/// Determines which UI screen renders and how input is interpreted.
pub enum View {
    /// Candidate files of the current directory.
    FileList,
    /// Section labels of the open file.
    Sections,
    /// Keys of the selected section.
    Keys,
    /// Vim-like editor for the selected value.
    Value,
    /// Captures command input after ':' keystroke.
    Command,
}

/// Session state owned by the shell and passed to every operation.
pub struct AppState {
    /// Directory whose files are listed.
    pub directory: Option<PathBuf>,
    /// Candidate file names in `directory`.
    pub files: Vec<String>,
    /// Selected file in the file list view.
    pub current_file_index: usize,
    /// The open parts file, replaced on each successful file selection.
    pub document: Option<Document>,
    /// Selected entry in the section label list.
    pub current_section_index: usize,
    /// Selected key in the key list.
    pub current_key_index: usize,
    /// Active UI screen determining input handling.
    pub current_view: View,
    /// Screen to return to when command input ends.
    pub previous_view: View,
    /// Editor buffer content when the value view is active.
    pub editor_state: Option<EditorState>,
    /// Accumulates command input after ':' is pressed.
    pub command_buffer: String,
    /// Status feedback displayed in the help bar.
    pub message: Option<String>,
    /// Encoding and allowlist used for every load.
    pub options: LoadOptions,
    /// File suffixes offered in the file list.
    pub extensions: Vec<String>,
    /// Remembered preferences.
    pub settings: Settings,
    /// Where `settings` is persisted.
    pub settings_path: PathBuf,
}

impl AppState {
    /// Build a session from configuration and remembered preferences.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::UnknownEncoding`] if the configured encoding is unknown.
    pub fn new(cfg: &Config, settings: Settings) -> Result<Self> {
        Ok(Self {
            directory: None,
            files: Vec::new(),
            current_file_index: 0,
            document: None,
            current_section_index: 0,
            current_key_index: 0,
            current_view: View::FileList,
            previous_view: View::FileList,
            editor_state: None,
            command_buffer: String::new(),
            message: None,
            options: cfg.load_options()?,
            extensions: cfg.file_extensions.clone(),
            settings,
            settings_path: cfg.settings_path(),
        })
    }

    /// List `dir`, reset the selection and remember the directory.
    ///
    /// On a listing error the previous directory and files stay in place.
    pub fn change_directory(&mut self, dir: &Path) {
        let files = match self.options.catalog.candidate_files(dir, &self.extensions) {
            Ok(files) => files,
            Err(e) => {
                self.message = Some(e.to_string());
                return;
            }
        };

        self.directory = Some(dir.to_path_buf());
        self.files = files;
        self.current_file_index = 0;
        self.document = None;
        self.current_section_index = 0;
        self.current_key_index = 0;
        self.editor_state = None;
        self.current_view = View::FileList;
        self.message = if self.files.is_empty() {
            Some("No parts files found".to_string())
        } else {
            None
        };

        self.settings.last_directory = Some(dir.to_path_buf());
        if let Err(e) = self.settings.save(&self.settings_path) {
            warn!(error = %e, "could not remember directory");
        }
    }

    /// Restore the directory remembered from a previous run, if any.
    pub fn restore_directory(&mut self) {
        if let Some(dir) = self.settings.last_directory.clone() {
            self.change_directory(&dir);
        }
    }

    #[must_use]
    /// Full path of the highlighted file.
    pub fn selected_file_path(&self) -> Option<PathBuf> {
        let dir = self.directory.as_ref()?;
        let name = self.files.get(self.current_file_index)?;
        Some(dir.join(name))
    }

    /// Load the highlighted file and move to its section list.
    ///
    /// A failed load keeps the previously open Document.
    pub fn open_selected_file(&mut self) {
        let Some(path) = self.selected_file_path() else {
            return;
        };

        match Document::load(&path, &self.options) {
            Ok(doc) => {
                self.document = Some(doc);
                self.current_section_index = 0;
                self.current_key_index = 0;
                self.current_view = View::Sections;
                self.message = None;
            }
            Err(e) => self.message = Some(e.to_string()),
        }
    }

    #[must_use]
    /// Real name of the highlighted section.
    pub fn current_section_ref(&self) -> Option<&str> {
        self.document
            .as_ref()?
            .display_labels()
            .get(self.current_section_index)
            .map(|l| l.section.as_str())
    }

    #[must_use]
    /// Keys of the highlighted section in file order.
    pub fn current_keys(&self) -> Vec<String> {
        let (Some(doc), Some(name)) = (self.document.as_ref(), self.current_section_ref()) else {
            return Vec::new();
        };
        doc.section(name)
            .map(|s| s.keys().map(str::to_string).collect())
            .unwrap_or_default()
    }

    #[must_use]
    /// Highlighted key.
    pub fn current_key(&self) -> Option<String> {
        self.current_keys().get(self.current_key_index).cloned()
    }

    #[must_use]
    /// Value of the highlighted key; empty when the key has none.
    pub fn current_value(&self) -> String {
        let (Some(doc), Some(section), Some(key)) = (
            self.document.as_ref(),
            self.current_section_ref(),
            self.current_key(),
        ) else {
            return String::new();
        };
        doc.value(section, &key)
            .ok()
            .flatten()
            .unwrap_or_default()
            .to_string()
    }

    /// Show the keys of the highlighted section.
    pub fn enter_keys(&mut self) {
        if self.current_section_ref().is_some() {
            self.current_key_index = 0;
            self.current_view = View::Keys;
        }
    }

    /// Number of rows in the list the current view shows.
    #[must_use]
    pub fn list_len(&self) -> usize {
        match self.current_view {
            View::FileList => self.files.len(),
            View::Sections => self
                .document
                .as_ref()
                .map_or(0, |d| d.display_labels().len()),
            View::Keys => self.current_keys().len(),
            View::Value | View::Command => 0,
        }
    }

    fn cursor_mut(&mut self) -> Option<&mut usize> {
        match self.current_view {
            View::FileList => Some(&mut self.current_file_index),
            View::Sections => Some(&mut self.current_section_index),
            View::Keys => Some(&mut self.current_key_index),
            View::Value | View::Command => None,
        }
    }

    /// Move the list cursor up one row.
    pub fn select_prev(&mut self) {
        if let Some(cursor) = self.cursor_mut() {
            *cursor = cursor.saturating_sub(1);
        }
    }

    /// Move the list cursor down one row.
    pub fn select_next(&mut self) {
        let len = self.list_len();
        if let Some(cursor) = self.cursor_mut() {
            if *cursor + 1 < len {
                *cursor += 1;
            }
        }
    }

    /// Go back one level; returns `false` when already at the file list.
    pub fn go_back(&mut self) -> bool {
        self.current_view = match self.current_view {
            View::FileList => return false,
            View::Sections => View::FileList,
            View::Keys => View::Sections,
            View::Value => {
                self.editor_state = None;
                View::Keys
            }
            View::Command => self.previous_view,
        };
        true
    }

    /// Loads the highlighted value into the editor buffer.
    pub fn enter_value_view(&mut self) {
        if self.current_key().is_none() {
            return;
        }
        let value = self.current_value();
        self.editor_state = Some(EditorState::new(Lines::from(value.as_str())));
        self.current_view = View::Value;
        self.message = None;
    }

    /// Returns to the key list, discarding the buffer.
    pub fn exit_value_view(&mut self) {
        self.editor_state = None;
        self.current_view = View::Keys;
    }

    /// Text currently in the editor buffer, rows joined with spaces.
    #[must_use]
    pub fn editor_text(&self) -> Option<String> {
        let editor_state = self.editor_state.as_ref()?;
        let rows: Vec<String> = editor_state
            .lines
            .iter_row()
            .map(|line| line.iter().collect::<String>())
            .collect();
        Some(rows.join(" ").trim().to_string())
    }

    /// Write the editor buffer to the highlighted key and persist the file.
    ///
    /// The outcome is left in `message`; returns whether the value was saved.
    pub fn save_value(&mut self) -> bool {
        let outcome = self.try_save_value();
        let saved = outcome.is_ok();
        self.message = Some(match outcome {
            Ok(value) => format!("Value saved: {value}"),
            Err(e) => e.to_string(),
        });
        saved
    }

    fn try_save_value(&mut self) -> Result<String> {
        let value = self.editor_text().unwrap_or_default();
        let section = self.current_section_ref().unwrap_or_default().to_string();
        let key = self.current_key().unwrap_or_default();
        let doc = self.document.as_mut().ok_or(EditorError::InvalidEdit)?;
        doc.set_value_and_persist(&section, &key, &value)
    }

    /// Enter command input, remembering where to return.
    pub fn enter_command(&mut self) {
        self.previous_view = self.current_view;
        self.current_view = View::Command;
        self.command_buffer.clear();
        self.message = None;
    }

    /// Run the buffered command; returns `true` when the session should end.
    pub fn run_command(&mut self) -> bool {
        let cmd = self.command_buffer.trim().to_string();
        self.command_buffer.clear();
        self.current_view = self.previous_view;

        match cmd.split_once(' ') {
            Some(("cd", dir)) => self.change_directory(Path::new(dir.trim())),
            _ => match cmd.as_str() {
                "w" => {
                    if self.current_view == View::Value {
                        self.save_value();
                    } else {
                        self.message = Some("Nothing to save".to_string());
                    }
                }
                "x" => {
                    if self.current_view == View::Value && self.save_value() {
                        self.exit_value_view();
                    }
                }
                "q" | "q!" => {
                    if !self.go_back() {
                        return true;
                    }
                }
                "qa" | "qa!" => return true,
                _ => self.message = Some(format!("Unknown command: {cmd}")),
            },
        }
        false
    }
}

#[cfg(test)]
#[path = "tests/app_state.rs"]
mod tests;
