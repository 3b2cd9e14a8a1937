//! Loading, normalizing and writing back a parts file.
//!
//! Parsing is delegated to `rust-ini`; this module decides what the editor
//! sees. Repeated headers fold into the first one, keys that differ only in
//! case keep their first occurrence, and recognized files only show their
//! first sections up to the cap. Writes always regenerate the whole file,
//! hidden sections included.

use crate::catalog::Catalog;
use crate::encoding::TextEncoding;
use crate::error::{EditorError, Result};
use crate::section::{fold_key, Entry, Section, SectionLabel};
use ini::{EscapePolicy, Ini, LineSeparator, ParseOption, WriteOption};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::{fs, io};
use tracing::{debug, info};

#[derive(Clone, Copy, Debug, Default)]
/// How files are decoded and which ones may be opened.
pub struct LoadOptions {
    /// Encoding used to read and to write back.
    pub encoding: TextEncoding,
    /// Allowlist and section caps.
    pub catalog: Catalog,
}

#[derive(Clone, Debug)]
/// A parts file held in memory for editing.
pub struct Document {
    path: PathBuf,
    encoding: TextEncoding,
    /// Entries before the first header; written back but never shown.
    general: Vec<Entry>,
    /// Every section in the file, including those past the cap.
    sections: Vec<Section>,
    /// How many leading sections are shown and editable.
    shown: usize,
    labels: Vec<SectionLabel>,
}

impl Document {
    /// Read, decode and normalize the file at `path`.
    ///
    /// # Errors
    ///
    /// - [`EditorError::UnrecognizedFile`] if the catalog refuses the name
    /// - [`EditorError::FileAccess`] if the file cannot be read
    /// - [`EditorError::Encoding`] if the bytes do not decode
    /// - [`EditorError::Malformed`] if the text does not parse
    pub fn load(path: &Path, options: &LoadOptions) -> Result<Self> {
        let cap = options.catalog.admit(path)?;

        let bytes = fs::read(path).map_err(|source| EditorError::FileAccess {
            path: path.to_path_buf(),
            source,
        })?;
        let text = options
            .encoding
            .decode(&bytes)
            .ok_or_else(|| EditorError::Encoding {
                path: path.to_path_buf(),
                encoding: options.encoding.name(),
            })?;

        let doc = Self::parse(path, &text, options.encoding, cap)?;
        info!(
            path = %path.display(),
            sections = doc.sections.len(),
            shown = doc.shown,
            "loaded parts file"
        );
        Ok(doc)
    }

    /// Build a document from already decoded text.
    ///
    /// `cap` limits how many leading sections are shown; the rest are only
    /// carried through to the written file.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::Malformed`] if the text does not parse.
    pub fn parse(
        path: &Path,
        text: &str,
        encoding: TextEncoding,
        cap: Option<usize>,
    ) -> Result<Self> {
        let opt = ParseOption {
            enabled_quote: false,
            enabled_escape: false,
            ..ParseOption::default()
        };
        let ini = Ini::load_from_str_opt(&fill_bare_keys(text), opt).map_err(|e| {
            EditorError::Malformed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }
        })?;

        let mut general = Vec::new();
        let mut sections: Vec<Section> = Vec::new();

        for (name, props) in &ini {
            let pairs = props.iter();
            match name {
                None => push_unique(&mut general, pairs, "<general>"),
                Some(name) => {
                    let index = if let Some(i) = sections.iter().position(|s| s.name == name) {
                        debug!(section = name, "merged repeated section header");
                        i
                    } else {
                        sections.push(Section::new(name));
                        sections.len() - 1
                    };
                    push_unique(&mut sections[index].entries, pairs, name);
                }
            }
        }

        let shown = match cap {
            Some(max) if sections.len() > max => {
                debug!(shown = max, hidden = sections.len() - max, "capped sections");
                max
            }
            _ => sections.len(),
        };

        let mut doc = Self {
            path: path.to_path_buf(),
            encoding,
            general,
            sections,
            shown,
            labels: Vec::new(),
        };
        doc.refresh_labels();
        Ok(doc)
    }

    fn refresh_labels(&mut self) {
        self.labels = self
            .sections()
            .iter()
            .map(|s| SectionLabel {
                label: s.display_label(),
                section: s.name.clone(),
            })
            .collect();
    }

    #[must_use]
    /// File this document was loaded from and is written back to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    /// Encoding used for both reading and writing.
    pub fn encoding(&self) -> TextEncoding {
        self.encoding
    }

    #[must_use]
    /// Shown sections in file order.
    pub fn sections(&self) -> &[Section] {
        &self.sections[..self.shown]
    }

    #[must_use]
    /// Shown section with exactly this name.
    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections().iter().find(|s| s.name == name)
    }

    #[must_use]
    /// Labels for the section picker, in section order.
    pub fn display_labels(&self) -> &[SectionLabel] {
        &self.labels
    }

    /// Turn a section name or a display label into the section it denotes.
    ///
    /// Names win over labels. A label only resolves when exactly one section
    /// carries it.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::UnresolvedSection`] if nothing, or more than
    /// one section, matches.
    pub fn resolve(&self, reference: &str) -> Result<&Section> {
        if let Some(section) = self.section(reference) {
            return Ok(section);
        }

        let mut hits = self.labels.iter().filter(|l| l.label == reference);
        match (hits.next(), hits.next()) {
            (Some(only), None) => self
                .section(&only.section)
                .ok_or_else(|| unresolved(reference)),
            _ => Err(unresolved(reference)),
        }
    }

    /// Current value of `key` in the referenced section; `None` if the key is absent.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::UnresolvedSection`] if the section reference
    /// does not resolve.
    pub fn value(&self, reference: &str, key: &str) -> Result<Option<&str>> {
        Ok(self.resolve(reference)?.get(key))
    }

    /// Change one value in memory only.
    ///
    /// # Errors
    ///
    /// - [`EditorError::InvalidEdit`] if the reference, key or value is blank or unusable
    /// - [`EditorError::UnresolvedSection`] if the section does not resolve
    pub fn set_value(&mut self, reference: &str, key: &str, value: &str) -> Result<()> {
        validate_edit(reference, key, value)?;

        let name = self.resolve(reference)?.name.clone();
        if let Some(section) = self.sections[..self.shown]
            .iter_mut()
            .find(|s| s.name == name)
        {
            section.set(key.trim(), value);
        }
        self.refresh_labels();
        Ok(())
    }

    /// Change one value and rewrite the whole file.
    ///
    /// Returns the value that was written.
    ///
    /// # Errors
    ///
    /// Fails like [`Document::set_value`] without touching memory or disk, or
    /// with [`EditorError::WriteFailure`] after the in-memory change, in which
    /// case the file may not reflect it.
    pub fn set_value_and_persist(
        &mut self,
        reference: &str,
        key: &str,
        value: &str,
    ) -> Result<String> {
        self.set_value(reference, key, value)?;
        self.save()?;
        info!(path = %self.path.display(), section = reference, key, "value saved");
        Ok(value.to_string())
    }

    /// Serialize the document as it would be written, before encoding.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::WriteFailure`] if serialization fails.
    pub fn to_text(&self) -> Result<String> {
        let mut ini = Ini::new();
        for entry in &self.general {
            ini.with_general_section()
                .set(entry.key.as_str(), entry.value.as_str());
        }
        for section in &self.sections {
            let props = ini
                .entry(Some(section.name.clone()))
                .or_insert_with(Default::default);
            for entry in &section.entries {
                props.insert(entry.key.as_str(), entry.value.as_str());
            }
        }

        let opt = WriteOption {
            escape_policy: EscapePolicy::Nothing,
            line_separator: LineSeparator::CRLF,
            kv_separator: "=",
        };
        let mut buf = Vec::new();
        ini.write_to_opt(&mut buf, opt)
            .map_err(|source| self.write_failure(source))?;
        String::from_utf8(buf)
            .map_err(|e| self.write_failure(io::Error::new(io::ErrorKind::InvalidData, e)))
    }

    /// Write the whole document back to its path in its encoding.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::WriteFailure`] if a character cannot be encoded
    /// or the file cannot be written.
    pub fn save(&self) -> Result<()> {
        let text = self.to_text()?;
        let bytes = self.encoding.encode(&text).ok_or_else(|| {
            self.write_failure(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("text cannot be represented in {}", self.encoding.name()),
            ))
        })?;
        fs::write(&self.path, &bytes).map_err(|source| self.write_failure(source))
    }

    fn write_failure(&self, source: io::Error) -> EditorError {
        EditorError::WriteFailure {
            path: self.path.clone(),
            source,
        }
    }
}

fn unresolved(reference: &str) -> EditorError {
    EditorError::UnresolvedSection {
        reference: reference.to_string(),
    }
}

/// Reject edits that would leave a hole or break the line format.
fn validate_edit(reference: &str, key: &str, value: &str) -> Result<()> {
    let breaks_line = |s: &str| s.contains(['\r', '\n']);
    let blank = [reference, key, value].iter().any(|s| s.trim().is_empty());
    let bad_key = breaks_line(key) || key.contains(['=', ':', '[']);

    if blank || bad_key || breaks_line(value) {
        return Err(EditorError::InvalidEdit);
    }
    Ok(())
}

/// Append `pairs` to `entries`, keeping the first of any case-insensitive duplicates.
fn push_unique<'a>(
    entries: &mut Vec<Entry>,
    pairs: impl Iterator<Item = (&'a str, &'a str)>,
    section: &str,
) {
    let mut seen: HashSet<String> = entries.iter().map(|e| fold_key(&e.key)).collect();
    for (key, value) in pairs {
        if seen.insert(fold_key(key)) {
            entries.push(Entry {
                key: key.to_string(),
                value: value.to_string(),
            });
        } else {
            debug!(section, key, "dropped duplicate key");
        }
    }
}

/// Give value-less key lines an empty value and drop trailing text after
/// section headers, so the parser accepts both.
fn fill_bare_keys(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 16);
    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with('[') {
            if let Some(end) = trimmed.rfind(']') {
                out.push_str(&trimmed[..=end]);
                out.push('\n');
                continue;
            }
        }
        out.push_str(line);
        let bare = !trimmed.is_empty()
            && !trimmed.starts_with(['[', ';', '#'])
            && !trimmed.contains(['=', ':']);
        if bare {
            out.push('=');
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
#[path = "tests/document.rs"]
mod tests;
