//! Strict text encoding used for parts files.
//!
//! The game ships its data in Shift_JIS (code page 932). Decoding never
//! substitutes replacement characters and encoding never falls back to numeric
//! character references: either the text round-trips or the caller gets `None`.

use crate::error::{EditorError, Result};
use encoding_rs::Encoding;
use std::borrow::Cow;

/// Label of the encoding parts files are read and written in.
pub const DEFAULT_ENCODING: &str = "shift_jis";

#[derive(Clone, Copy, Debug, PartialEq)]
/// A named text encoding with strict conversion in both directions.
pub struct TextEncoding(&'static Encoding);

impl TextEncoding {
    #[must_use]
    /// Shift_JIS as implemented by browsers, which covers the CP932 extensions.
    pub fn shift_jis() -> Self {
        Self(encoding_rs::SHIFT_JIS)
    }

    /// Resolve a WHATWG encoding label such as `shift_jis`, `sjis` or `windows-31j`.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::UnknownEncoding`] if the label is not recognised.
    pub fn for_label(label: &str) -> Result<Self> {
        Encoding::for_label(label.trim().as_bytes())
            .map(Self)
            .ok_or_else(|| EditorError::UnknownEncoding {
                label: label.to_string(),
            })
    }

    #[must_use]
    /// Canonical name of the encoding.
    pub fn name(self) -> &'static str {
        self.0.name()
    }

    #[must_use]
    /// Decode bytes, or `None` if any sequence is malformed.
    pub fn decode(self, bytes: &[u8]) -> Option<Cow<'_, str>> {
        self.0
            .decode_without_bom_handling_and_without_replacement(bytes)
    }

    #[must_use]
    /// Encode text, or `None` if any character has no mapping.
    pub fn encode(self, text: &str) -> Option<Cow<'_, [u8]>> {
        let (bytes, _, unmappable) = self.0.encode(text);
        if unmappable {
            None
        } else {
            Some(bytes)
        }
    }
}

impl Default for TextEncoding {
    fn default() -> Self {
        Self::shift_jis()
    }
}

#[cfg(test)]
#[path = "tests/encoding.rs"]
mod tests;
