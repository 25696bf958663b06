//! Input files and text/binary classification

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

use crate::archive::{Encoding, Entry};
use crate::error::{Error, Result};
use crate::transcode::Transcoder;

/// Text or binary, decided once when a file is read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Embedded verbatim as a string literal
    Text,
    /// Embedded as hex text
    Binary { reason: BinaryReason },
}

/// Reason why data is considered binary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryReason {
    /// Not valid UTF-8
    InvalidUtf8,
    /// UTF-8, but contains a carriage return. rustc rejects a bare CR in
    /// string literals and rewrites CRLF to LF, so the bytes would not
    /// survive a round trip through generated source.
    CarriageReturn,
    /// UTF-8, but contains a bidi control that changes text direction.
    /// rustc denies these in literals by default.
    DirectionControl,
    /// Explicitly marked as binary by the caller
    Explicit,
}

impl Classification {
    /// Classify file data
    pub fn detect(data: &[u8]) -> Self {
        match std::str::from_utf8(data) {
            Err(_) => Classification::Binary {
                reason: BinaryReason::InvalidUtf8,
            },
            Ok(text) if text.contains('\r') => Classification::Binary {
                reason: BinaryReason::CarriageReturn,
            },
            Ok(text) if text.contains(changes_text_direction) => Classification::Binary {
                reason: BinaryReason::DirectionControl,
            },
            Ok(_) => Classification::Text,
        }
    }

    pub fn is_binary(&self) -> bool {
        matches!(self, Classification::Binary { .. })
    }

    /// Entry encoding used for this class
    pub fn encoding(&self) -> Encoding {
        match self {
            Classification::Text => Encoding::Raw,
            Classification::Binary { .. } => Encoding::Hex,
        }
    }
}

/// Code points rejected by rustc's `text_direction_codepoint_in_literal` lint
pub(crate) fn changes_text_direction(c: char) -> bool {
    matches!(c, '\u{202A}'..='\u{202E}' | '\u{2066}'..='\u{2069}')
}

/// A file read from disk, waiting to be baked
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Where the file was read from
    pub disk_path: PathBuf,
    /// Path the content is recreated at, relative to the package root
    pub logical_path: String,
    pub data: Vec<u8>,
    pub classification: Classification,
}

impl SourceFile {
    /// Create a source file, detecting its classification
    pub fn new(disk_path: impl Into<PathBuf>, logical_path: impl Into<String>, data: Vec<u8>) -> Self {
        let classification = Classification::detect(&data);
        Self::with_classification(disk_path, logical_path, data, classification)
    }

    /// Create a source file with an explicit classification
    ///
    /// Forcing [`Classification::Text`] onto data that is not literal-safe
    /// is allowed; the generator then falls back to an escaped byte string.
    pub fn with_classification(
        disk_path: impl Into<PathBuf>,
        logical_path: impl Into<String>,
        data: Vec<u8>,
        classification: Classification,
    ) -> Self {
        Self {
            disk_path: disk_path.into(),
            logical_path: logical_path.into(),
            data,
            classification,
        }
    }

    /// Read a file from disk
    pub fn read(disk_path: impl Into<PathBuf>, logical_path: impl Into<String>) -> Result<Self> {
        let disk_path = disk_path.into();
        let data = std::fs::read(&disk_path).map_err(|source| Error::ReadFailure {
            path: disk_path.display().to_string(),
            source,
        })?;
        Ok(Self::new(disk_path, logical_path, data))
    }

    /// Turn the file into an archive entry, hex-encoding binary content
    pub fn into_entry(self, transcoder: &Transcoder) -> Entry<'static> {
        match self.classification {
            Classification::Text => Entry::new(self.logical_path, Encoding::Raw, self.data),
            Classification::Binary { .. } => {
                let payload = transcoder.encode(&self.data).into_bytes();
                Entry::new(self.logical_path, Encoding::Hex, payload)
            }
        }
    }
}

/// How directory inputs are expanded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DirMode {
    /// Directories are rejected
    #[default]
    FilesOnly,
    /// Files directly inside a directory
    Immediate,
    /// Every file in the directory tree
    Recursive,
}

/// Render a path relative to the package root with `/` separators
///
/// Both paths must already be canonical.
pub fn logical_path(path: &Path, root: &Path) -> Result<String> {
    let relative = path.strip_prefix(root).map_err(|_| Error::OutsidePackage {
        path: path.display().to_string(),
        root: root.display().to_string(),
    })?;

    let parts: Vec<String> = relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    Ok(parts.join("/"))
}

/// Read every input file, expanding directories per `mode`
///
/// Inputs are resolved against `cwd`. Files whose canonical path is in
/// `skip` are left out. The result is sorted by logical path, with each
/// file appearing once even if named more than once.
pub fn collect(
    inputs: &[PathBuf],
    mode: DirMode,
    cwd: &Path,
    root: &Path,
    skip: &[PathBuf],
) -> Result<Vec<SourceFile>> {
    if inputs.is_empty() {
        return Err(Error::NoInputs);
    }

    let mut files = BTreeMap::new();
    for input in inputs {
        let input = cwd.join(input);
        let read_failure = |source: std::io::Error| Error::ReadFailure {
            path: input.display().to_string(),
            source,
        };
        let metadata = std::fs::metadata(&input).map_err(read_failure)?;

        let paths = if metadata.is_dir() {
            let max_depth = match mode {
                DirMode::FilesOnly => {
                    return Err(Error::DirectoryNotAllowed {
                        path: input.display().to_string(),
                    })
                }
                DirMode::Immediate => 1,
                DirMode::Recursive => usize::MAX,
            };
            walk(&input, max_depth)?
        } else {
            vec![input.clone()]
        };

        for path in paths {
            let canonical = canonical_file(&path).map_err(|source| Error::ReadFailure {
                path: path.display().to_string(),
                source,
            })?;
            if skip.contains(&canonical) {
                continue;
            }
            let logical = logical_path(&canonical, root)?;
            if !files.contains_key(&logical) {
                let file = SourceFile::read(path, logical.clone())?;
                files.insert(logical, file);
            }
        }
    }

    Ok(files.into_values().collect())
}

/// Canonicalize the directory part of a file path, keeping the file name
///
/// A symlinked file keeps its own name instead of resolving to its target.
pub(crate) fn canonical_file(path: &Path) -> std::io::Result<PathBuf> {
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) if !parent.as_os_str().is_empty() => {
            Ok(parent.canonicalize()?.join(name))
        }
        _ => path.canonicalize(),
    }
}

fn walk(dir: &Path, max_depth: usize) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in walkdir::WalkDir::new(dir)
        .min_depth(1)
        .max_depth(max_depth)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|err| Error::ReadFailure {
            path: err
                .path()
                .unwrap_or(dir)
                .display()
                .to_string(),
            source: err.into(),
        })?;
        if entry.file_type().is_file() || (entry.path_is_symlink() && entry.path().is_file()) {
            paths.push(entry.into_path());
        }
    }
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_text() {
        assert_eq!(Classification::detect("hello 世界\n".as_bytes()), Classification::Text);
        assert_eq!(Classification::detect(b""), Classification::Text);
    }

    #[test]
    fn test_detect_invalid_utf8() {
        assert_eq!(
            Classification::detect(&[0xFF, 0xD8, 0xFF, 0xE0]),
            Classification::Binary {
                reason: BinaryReason::InvalidUtf8
            }
        );
    }

    #[test]
    fn test_detect_carriage_return() {
        let class = Classification::detect(b"line one\r\nline two\r\n");
        assert_eq!(
            class,
            Classification::Binary {
                reason: BinaryReason::CarriageReturn
            }
        );
        assert_eq!(class.encoding(), Encoding::Hex);
    }

    #[test]
    fn test_detect_direction_control() {
        for text in ["abc \u{202E}def\n", "\u{2066}isolated\u{2069}", "\u{202A}"] {
            assert_eq!(
                Classification::detect(text.as_bytes()),
                Classification::Binary {
                    reason: BinaryReason::DirectionControl
                }
            );
        }
        // Plain right-to-left text needs no control characters
        assert_eq!(Classification::detect("שלום\n".as_bytes()), Classification::Text);
    }

    #[test]
    fn test_direction_control_file_becomes_hex_entry() {
        let data = "abc \u{202E}def\n".as_bytes().to_vec();
        let entry = SourceFile::new("x.txt", "x.txt", data.clone()).into_entry(&Transcoder::new());
        assert_eq!(entry.encoding(), Encoding::Hex);
        assert_eq!(entry.contents().unwrap().as_ref(), data.as_slice());
    }

    #[test]
    fn test_text_file_becomes_raw_entry() {
        let file = SourceFile::new("a.txt", "a.txt", b"plain `text`".to_vec());
        let entry = file.into_entry(&Transcoder::new());
        assert_eq!(entry.encoding(), Encoding::Raw);
        assert_eq!(entry.payload(), b"plain `text`");
    }

    #[test]
    fn test_binary_file_becomes_hex_entry() {
        let file = SourceFile::new("b.bin", "b.bin", vec![0x00, 0xFF, 0x41, 0x42]);
        assert!(file.classification.is_binary());

        let entry = file.into_entry(&Transcoder::new());
        assert_eq!(entry.encoding(), Encoding::Hex);
        assert_eq!(entry.payload(), b"00ff4142");
        assert_eq!(entry.contents().unwrap().as_ref(), &[0x00, 0xFF, 0x41, 0x42]);
    }

    #[test]
    fn test_explicit_binary() {
        let file = SourceFile::with_classification(
            "note.txt",
            "note.txt",
            b"hi".to_vec(),
            Classification::Binary {
                reason: BinaryReason::Explicit,
            },
        );
        let entry = file.into_entry(&Transcoder::new());
        assert_eq!(entry.payload(), b"6869");
    }

    #[test]
    fn test_logical_path() {
        let root = Path::new("/pkg");
        assert_eq!(logical_path(Path::new("/pkg/assets/a.png"), root).unwrap(), "assets/a.png");
        assert!(matches!(
            logical_path(Path::new("/elsewhere/a.png"), root),
            Err(Error::OutsidePackage { .. })
        ));
    }

    #[test]
    fn test_collect_requires_inputs() {
        let dir = tempfile::tempdir().unwrap();
        let err = collect(&[], DirMode::Recursive, dir.path(), dir.path(), &[]).unwrap_err();
        assert!(matches!(err, Error::NoInputs));
    }

    #[test]
    fn test_collect_directory_modes() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        std::fs::create_dir_all(root.join("assets/nested")).unwrap();
        std::fs::write(root.join("assets/b.txt"), "b").unwrap();
        std::fs::write(root.join("assets/a.bin"), [0xFFu8, 0x00]).unwrap();
        std::fs::write(root.join("assets/nested/c.txt"), "c").unwrap();

        let inputs = vec![PathBuf::from("assets")];

        let err = collect(&inputs, DirMode::FilesOnly, &root, &root, &[]).unwrap_err();
        assert!(matches!(err, Error::DirectoryNotAllowed { .. }));

        let files = collect(&inputs, DirMode::Immediate, &root, &root, &[]).unwrap();
        let names: Vec<&str> = files.iter().map(|f| f.logical_path.as_str()).collect();
        assert_eq!(names, vec!["assets/a.bin", "assets/b.txt"]);
        assert!(files[0].classification.is_binary());

        let files = collect(&inputs, DirMode::Recursive, &root, &root, &[]).unwrap();
        let names: Vec<&str> = files.iter().map(|f| f.logical_path.as_str()).collect();
        assert_eq!(names, vec!["assets/a.bin", "assets/b.txt", "assets/nested/c.txt"]);
    }

    #[test]
    fn test_collect_dedups_and_skips() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        std::fs::write(root.join("a.txt"), "a").unwrap();
        std::fs::write(root.join("gen.rs"), "generated").unwrap();

        let inputs = vec![PathBuf::from("a.txt"), PathBuf::from("./a.txt"), PathBuf::from(".")];
        let skip = vec![root.join("gen.rs")];
        let files = collect(&inputs, DirMode::Immediate, &root, &root, &skip).unwrap();

        let names: Vec<&str> = files.iter().map(|f| f.logical_path.as_str()).collect();
        assert_eq!(names, vec!["a.txt"]);
    }

    #[test]
    fn test_collect_unreadable_path() {
        let dir = tempfile::tempdir().unwrap();
        let err = collect(
            &[PathBuf::from("missing.txt")],
            DirMode::FilesOnly,
            dir.path(),
            dir.path(),
            &[],
        )
        .unwrap_err();
        assert!(matches!(err, Error::ReadFailure { .. }));
    }
}
