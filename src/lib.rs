//! acparts: a section and value editor for Shift_JIS parts-data files.
//!
//! The core is [`document::Document`]: load a parts file, look values up by
//! section and key, change one value and write the file back. Around it sit the
//! recognized file table ([`catalog`]), the preference file ([`settings`]) and
//! the session object a shell drives ([`app_state`]).

pub mod app_state;
pub mod catalog;
pub mod config;
pub mod document;
pub mod encoding;
pub mod error;
pub mod section;
pub mod settings;
pub mod ui;

pub use document::{Document, LoadOptions};
pub use error::{EditorError, Result};
