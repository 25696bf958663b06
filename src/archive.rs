//! Archive data structures and runtime operations

use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Error, Result};
use crate::transcode::{self, DecodeError};

/// How an entry's payload is stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
    /// Payload is the original content
    Raw,
    /// Payload is the hex transcoding of the original content
    Hex,
}

/// One baked file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry<'a> {
    path: Cow<'a, str>,
    encoding: Encoding,
    payload: Cow<'a, [u8]>,
}

impl Entry<'static> {
    /// Build an entry from literals; used by generated code
    pub const fn from_static(path: &'static str, encoding: Encoding, payload: &'static [u8]) -> Self {
        Self {
            path: Cow::Borrowed(path),
            encoding,
            payload: Cow::Borrowed(payload),
        }
    }
}

impl<'a> Entry<'a> {
    pub fn new(
        path: impl Into<Cow<'a, str>>,
        encoding: Encoding,
        payload: impl Into<Cow<'a, [u8]>>,
    ) -> Self {
        Self {
            path: path.into(),
            encoding,
            payload: payload.into(),
        }
    }

    /// Logical path the content is recreated at
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Payload as stored, before decoding
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// The original file content
    ///
    /// Raw payloads are borrowed as-is; hex payloads are decoded into a
    /// fresh buffer on every call.
    pub fn contents(&self) -> std::result::Result<Cow<'_, [u8]>, DecodeError> {
        match self.encoding {
            Encoding::Raw => Ok(Cow::Borrowed(self.payload())),
            Encoding::Hex => transcode::decode(&self.payload).map(Cow::Owned),
        }
    }

    fn decoded(&self) -> Result<Cow<'_, [u8]>> {
        self.contents().map_err(|source| Error::MalformedEncoding {
            path: self.path.to_string(),
            source,
        })
    }

    fn target(&self, root: &Path) -> PathBuf {
        root.join(self.path.as_ref())
    }
}

/// An immutable, path-ordered collection of baked files
///
/// Operations scan the entries in order and stop at the first failure.
/// Nothing is rolled back: entries written before a failure stay written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Archive<'a> {
    entries: Cow<'a, [Entry<'a>]>,
}

impl Archive<'static> {
    /// Wrap entries that are already sorted and unique; used by generated code
    pub const fn from_static(entries: &'static [Entry<'static>]) -> Self {
        Self {
            entries: Cow::Borrowed(entries),
        }
    }
}

impl<'a> Archive<'a> {
    /// Build an archive, sorting entries by logical path
    ///
    /// Returns an error if two entries share a logical path.
    pub fn new(mut entries: Vec<Entry<'a>>) -> Result<Self> {
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        if let Some(pair) = entries.windows(2).find(|pair| pair[0].path == pair[1].path) {
            return Err(Error::DuplicatePath(pair[0].path.to_string()));
        }
        Ok(Self {
            entries: Cow::Owned(entries),
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Entry<'a>> {
        self.entries.iter()
    }

    /// Look up an entry by logical path
    pub fn get(&self, path: &str) -> Option<&Entry<'a>> {
        self.entries
            .binary_search_by(|entry| entry.path().cmp(path))
            .ok()
            .map(|idx| &self.entries[idx])
    }

    /// Write every entry relative to the current directory
    pub fn extract(&self) -> Result<()> {
        self.extract_to("")
    }

    /// Write every entry under `root`, creating parent directories as needed
    ///
    /// Existing files are truncated.
    pub fn extract_to(&self, root: impl AsRef<Path>) -> Result<()> {
        let root = root.as_ref();
        for entry in self.iter() {
            let data = entry.decoded()?;
            let target = entry.target(root);
            let write_failure = |source: std::io::Error| Error::WriteFailure {
                path: entry.path().to_string(),
                source,
            };

            if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).map_err(write_failure)?;
            }
            fs::write(&target, &data).map_err(write_failure)?;

            debug!(path = entry.path(), bytes = data.len(), "extracted baked file");
        }
        Ok(())
    }

    /// Check every entry exists relative to the current directory
    pub fn ensure(&self) -> Result<()> {
        self.ensure_in("")
    }

    /// Check every entry exists under `root`
    ///
    /// Only existence is checked, not content or modification time.
    pub fn ensure_in(&self, root: impl AsRef<Path>) -> Result<()> {
        let root = root.as_ref();
        for entry in self.iter() {
            fs::metadata(entry.target(root)).map_err(|source| Error::PathMissing {
                path: entry.path().to_string(),
                source,
            })?;
        }
        Ok(())
    }

    /// Check every on-disk file, relative to the current directory, matches its baked copy
    pub fn verify_identity(&self) -> Result<()> {
        self.verify_identity_in("")
    }

    /// Check every on-disk file under `root` is byte-identical to its baked copy
    pub fn verify_identity_in(&self, root: impl AsRef<Path>) -> Result<()> {
        let root = root.as_ref();
        for entry in self.iter() {
            let on_disk = fs::read(entry.target(root)).map_err(|source| Error::ReadFailure {
                path: entry.path().to_string(),
                source,
            })?;
            let baked = entry.decoded()?;

            if let Some(offset) = first_difference(&on_disk, &baked) {
                return Err(Error::ContentMismatch {
                    path: entry.path().to_string(),
                    offset,
                });
            }
            debug!(path = entry.path(), "baked file is identical");
        }
        Ok(())
    }
}

impl<'a, 'b> IntoIterator for &'b Archive<'a> {
    type Item = &'b Entry<'a>;
    type IntoIter = std::slice::Iter<'b, Entry<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Offset of the first differing byte, or the shorter length if one is a prefix
pub(crate) fn first_difference(a: &[u8], b: &[u8]) -> Option<usize> {
    match a.iter().zip(b).position(|(x, y)| x != y) {
        Some(offset) => Some(offset),
        None if a.len() != b.len() => Some(a.len().min(b.len())),
        None => None,
    }
}
