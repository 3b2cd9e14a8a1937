//! Error kinds raised by the loader, the writer and the session.
//!
//! None of these are fatal: the shell turns each one into a status message and
//! carries on with whatever Document it already had.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, EditorError>;

#[derive(Error, Debug)]
/// Everything that can go wrong between picking a directory and saving a value.
pub enum EditorError {
    /// The path is missing or could not be read.
    #[error("cannot access {}: {source}", path.display())]
    FileAccess {
        /// File or directory that failed.
        path: PathBuf,
        /// Underlying I/O failure.
        source: io::Error,
    },

    /// The bytes are not valid under the fixed text encoding.
    #[error("{} is not valid {encoding} text", path.display())]
    Encoding {
        /// File that failed to decode.
        path: PathBuf,
        /// Name of the encoding that was tried.
        encoding: &'static str,
    },

    /// The decoded text is not section/key/value structured.
    #[error("{} is malformed: {message}", path.display())]
    Malformed {
        /// File that failed to parse.
        path: PathBuf,
        /// Parser diagnostic.
        message: String,
    },

    /// The file name is not in the recognized parts-file table.
    #[error("{name} is not a recognized parts file")]
    UnrecognizedFile {
        /// Base name of the rejected file.
        name: String,
    },

    /// Section, key or value missing (or unusable) at edit time.
    #[error("Invalid data")]
    InvalidEdit,

    /// The section reference matches no section, or a label shared by several.
    #[error("no section matches {reference:?}")]
    UnresolvedSection {
        /// Reference as supplied by the caller.
        reference: String,
    },

    /// Serializing or writing the document failed.
    #[error("failed to write {}: {source} (the edit may not be durable)", path.display())]
    WriteFailure {
        /// Destination file.
        path: PathBuf,
        /// Encoding or I/O failure.
        source: io::Error,
    },

    /// The configured encoding label is unknown.
    #[error("unknown text encoding {label:?}")]
    UnknownEncoding {
        /// Label as written in the configuration.
        label: String,
    },
}
