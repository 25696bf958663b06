use std::io;

use thiserror::Error;

use crate::transcode::DecodeError;

/// Result type for baking operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while generating or using a baked archive
///
/// Every variant names the logical path (or, at generation time, the input
/// path) it failed on.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Failed to read {path}")]
    ReadFailure {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Malformed hex payload for {path}")]
    MalformedEncoding {
        path: String,
        #[source]
        source: DecodeError,
    },

    #[error("Baked file is missing on disk: {path}")]
    PathMissing {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Baked copy of {path} differs from the file on disk at byte {offset}")]
    ContentMismatch { path: String, offset: usize },

    #[error("Failed to write {path}")]
    WriteFailure {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Duplicate logical path in archive: {0}")]
    DuplicatePath(String),

    #[cfg(feature = "generate")]
    #[error("No input paths given")]
    NoInputs,

    #[cfg(feature = "generate")]
    #[error("{path} is a directory; use the directory or recursive mode to add it")]
    DirectoryNotAllowed { path: String },

    #[cfg(feature = "generate")]
    #[error("Could not find a Cargo.toml with a [package] table above {start}")]
    PackageNotFound { start: String },

    #[cfg(feature = "generate")]
    #[error("Failed to parse manifest {path}")]
    Manifest {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[cfg(feature = "generate")]
    #[error("{path} is outside the package root {root}")]
    OutsidePackage { path: String, root: String },
}

impl Error {
    /// The path the error refers to, if any
    pub fn path(&self) -> Option<&str> {
        match self {
            Error::ReadFailure { path, .. }
            | Error::MalformedEncoding { path, .. }
            | Error::PathMissing { path, .. }
            | Error::ContentMismatch { path, .. }
            | Error::WriteFailure { path, .. }
            | Error::DuplicatePath(path) => Some(path.as_str()),
            #[cfg(feature = "generate")]
            Error::DirectoryNotAllowed { path }
            | Error::Manifest { path, .. }
            | Error::OutsidePackage { path, .. } => Some(path.as_str()),
            #[cfg(feature = "generate")]
            Error::PackageNotFound { start } => Some(start.as_str()),
            #[cfg(feature = "generate")]
            Error::NoInputs => None,
        }
    }
}
