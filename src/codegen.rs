//! Generated source rendering
//!
//! The generator writes two files into the package's source tree:
//!
//! - `<module>.rs` holds every baked entry as a literal and a `baked()`
//!   function returning the [`Archive`].
//! - `<module>_test.rs` holds a test that fails when the baked copies have
//!   drifted from the files on disk.
//!
//! Both are meant to be declared next to each other:
//!
//! ```text
//! mod gen_bake;
//! #[cfg(test)]
//! mod gen_bake_test;
//! ```

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info};

use crate::archive::{first_difference, Archive, Encoding};
use crate::error::{Error, Result};
use crate::source::{self, DirMode};
use crate::transcode::{Transcoder, CHUNK_SIZE};

pub const DEFAULT_MODULE: &str = "gen_bake";
pub const DEFAULT_CRATE_PATH: &str = "emx_bake";

const HEADER: &str = "// Code generated by emx-bake. DO NOT EDIT.";

/// Options that shape the rendered source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Name of the generated module; the test file refers to it
    pub module: String,
    /// Path the generated code imports the runtime types from
    pub crate_path: String,
    /// Package the files were baked for, recorded in the header
    pub package: Option<String>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            module: DEFAULT_MODULE.to_string(),
            crate_path: DEFAULT_CRATE_PATH.to_string(),
            package: None,
        }
    }
}

/// Render the module holding the archive
pub fn render_module(archive: &Archive<'_>, options: &RenderOptions) -> String {
    let mut out = String::new();
    out.push_str(HEADER);
    out.push('\n');
    if let Some(package) = &options.package {
        let _ = writeln!(out, "// Package: {package}");
    }
    out.push('\n');
    let _ = writeln!(out, "use {}::{{Archive, Encoding, Entry}};", options.crate_path);
    out.push('\n');

    let _ = writeln!(out, "static ENTRIES: [Entry<'static>; {}] = [", archive.len());
    for entry in archive {
        let variant = match entry.encoding() {
            Encoding::Raw => "Raw",
            Encoding::Hex => "Hex",
        };
        out.push_str("    Entry::from_static(\n");
        let _ = writeln!(out, "        {:?},", entry.path());
        let _ = writeln!(out, "        Encoding::{variant},");
        let _ = writeln!(out, "        {},", payload_literal(entry.encoding(), entry.payload()));
        out.push_str("    ),\n");
    }
    out.push_str("];\n\n");

    out.push_str("/// Files baked into this crate when the module was generated\n");
    out.push_str("pub fn baked() -> Archive<'static> {\n");
    out.push_str("    Archive::from_static(&ENTRIES)\n");
    out.push_str("}\n");
    out
}

/// Render the test checking the baked copies against the files on disk
pub fn render_test(options: &RenderOptions) -> String {
    let mut out = String::new();
    out.push_str(HEADER);
    out.push_str("\n\n");
    out.push_str("#[test]\n");
    out.push_str("fn baked_files_match_disk() {\n");
    let _ = writeln!(
        out,
        "    if let Err(err) = super::{}::baked().verify_identity() {{",
        options.module
    );
    out.push_str("        panic!(\"{err}\");\n");
    out.push_str("    }\n");
    out.push_str("}\n");
    out
}

fn payload_literal(encoding: Encoding, payload: &[u8]) -> String {
    match encoding {
        // Hex text is plain ASCII digits and newlines
        Encoding::Hex => format!("b\"{}\"", String::from_utf8_lossy(payload)),
        Encoding::Raw => match std::str::from_utf8(payload) {
            Ok(text) if !text.contains('\r') && !text.contains(source::changes_text_direction) => {
                format!("{}.as_bytes()", raw_str_literal(text))
            }
            _ => byte_str_literal(payload),
        },
    }
}

/// Wrap text in a raw string literal with as few `#` as the text allows
pub fn raw_str_literal(text: &str) -> String {
    let mut hashes = String::new();
    while text.contains(&format!("\"{hashes}")) {
        hashes.push('#');
    }
    format!("r{hashes}\"{text}\"{hashes}")
}

fn byte_str_literal(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len() + 3);
    out.push_str("b\"");
    for &byte in data {
        out.extend(std::ascii::escape_default(byte).map(char::from));
    }
    out.push('"');
    out
}

#[derive(Debug, Deserialize)]
struct Manifest {
    package: Option<ManifestPackage>,
}

#[derive(Debug, Deserialize)]
struct ManifestPackage {
    name: String,
}

/// A package located by [`find_package`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    pub name: String,
    /// Canonical directory holding the package's `Cargo.toml`
    pub root: PathBuf,
}

/// Find the nearest enclosing package, starting at `start`
///
/// Manifests without a `[package]` table (virtual workspaces) are passed
/// over.
pub fn find_package(start: &Path) -> Result<Package> {
    find_package_within(start, None)
}

/// Like [`find_package`], but never looks above `ceiling`
pub fn find_package_within(start: &Path, ceiling: Option<&Path>) -> Result<Package> {
    let ceiling = match ceiling {
        Some(dir) => Some(dir.canonicalize().map_err(|source| Error::ReadFailure {
            path: dir.display().to_string(),
            source,
        })?),
        None => None,
    };
    let start = start.canonicalize().map_err(|source| Error::ReadFailure {
        path: start.display().to_string(),
        source,
    })?;

    for dir in start.ancestors() {
        let manifest_path = dir.join("Cargo.toml");
        if manifest_path.is_file() {
            let text = fs::read_to_string(&manifest_path).map_err(|source| Error::ReadFailure {
                path: manifest_path.display().to_string(),
                source,
            })?;
            let manifest: Manifest = toml::from_str(&text).map_err(|source| Error::Manifest {
                path: manifest_path.display().to_string(),
                source,
            })?;
            if let Some(package) = manifest.package {
                debug!(package = %package.name, root = %dir.display(), "found package");
                return Ok(Package {
                    name: package.name,
                    root: dir.to_path_buf(),
                });
            }
        }
        if ceiling.as_deref() == Some(dir) {
            break;
        }
    }

    Err(Error::PackageNotFound {
        start: start.display().to_string(),
    })
}

/// Generation settings
///
/// # Example
/// ```no_run
/// use emx_bake::{Config, DirMode};
///
/// let generated = Config::new(["assets"])
///     .dir_mode(DirMode::Recursive)
///     .generate()?;
/// println!("baked {} files", generated.entries);
/// # Ok::<(), emx_bake::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    inputs: Vec<PathBuf>,
    dir_mode: DirMode,
    working_dir: Option<PathBuf>,
    ceiling_dir: Option<PathBuf>,
    out_dir: Option<PathBuf>,
    module: String,
    crate_path: String,
    chunk_size: usize,
}

/// Summary of a generation run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generated {
    pub package: Package,
    pub module_path: PathBuf,
    pub test_path: PathBuf,
    /// Logical paths baked, in archive order
    pub paths: Vec<String>,
    pub entries: usize,
    pub hex_entries: usize,
}

impl Config {
    pub fn new<I, P>(inputs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            inputs: inputs.into_iter().map(Into::into).collect(),
            dir_mode: DirMode::default(),
            working_dir: None,
            ceiling_dir: None,
            out_dir: None,
            module: DEFAULT_MODULE.to_string(),
            crate_path: DEFAULT_CRATE_PATH.to_string(),
            chunk_size: CHUNK_SIZE,
        }
    }

    pub fn dir_mode(mut self, mode: DirMode) -> Self {
        self.dir_mode = mode;
        self
    }

    /// Directory inputs are resolved against and package discovery starts
    /// from (default: the current directory)
    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Highest directory package discovery may look in
    pub fn ceiling_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.ceiling_dir = Some(dir.into());
        self
    }

    /// Where the generated files go (default: `<package root>/src`)
    pub fn out_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.out_dir = Some(dir.into());
        self
    }

    pub fn module(mut self, module: impl Into<String>) -> Self {
        self.module = module.into();
        self
    }

    pub fn crate_path(mut self, crate_path: impl Into<String>) -> Self {
        self.crate_path = crate_path.into();
        self
    }

    /// Input bytes per hex line
    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Collect, bake, self-check and write the generated files
    pub fn generate(self) -> Result<Generated> {
        if self.inputs.is_empty() {
            return Err(Error::NoInputs);
        }

        let cwd = match &self.working_dir {
            Some(dir) => dir.clone(),
            None => std::env::current_dir().map_err(|source| Error::ReadFailure {
                path: ".".to_string(),
                source,
            })?,
        };
        let package = find_package_within(&cwd, self.ceiling_dir.as_deref())?;

        let out_dir = match &self.out_dir {
            Some(dir) => cwd.join(dir),
            None => package.root.join("src"),
        };
        let module_path = out_dir.join(format!("{}.rs", self.module));
        let test_path = out_dir.join(format!("{}_test.rs", self.module));
        let skip: Vec<PathBuf> = [&module_path, &test_path]
            .into_iter()
            .filter_map(|path| source::canonical_file(path).ok().filter(|p| p.exists()))
            .collect();

        let files = source::collect(&self.inputs, self.dir_mode, &cwd, &package.root, &skip)?;
        let transcoder = Transcoder::new().with_chunk_size(self.chunk_size);

        let originals: Vec<(String, Vec<u8>)> = files
            .iter()
            .map(|file| (file.logical_path.clone(), file.data.clone()))
            .collect();
        let archive = Archive::new(
            files
                .into_iter()
                .map(|file| file.into_entry(&transcoder))
                .collect(),
        )?;
        self_check(&archive, &originals)?;

        let options = RenderOptions {
            module: self.module.clone(),
            crate_path: self.crate_path.clone(),
            package: Some(package.name.clone()),
        };
        write_output(&out_dir, &module_path, &render_module(&archive, &options))?;
        write_output(&out_dir, &test_path, &render_test(&options))?;

        let hex_entries = archive
            .iter()
            .filter(|entry| entry.encoding() == Encoding::Hex)
            .count();
        info!(
            package = %package.name,
            entries = archive.len(),
            hex_entries,
            module = %module_path.display(),
            "generated baked module"
        );

        Ok(Generated {
            package,
            module_path,
            test_path,
            paths: archive.iter().map(|entry| entry.path().to_string()).collect(),
            entries: archive.len(),
            hex_entries,
        })
    }
}

/// Every entry must decode back to the bytes it was built from
fn self_check(archive: &Archive<'_>, originals: &[(String, Vec<u8>)]) -> Result<()> {
    for (path, data) in originals {
        let Some(entry) = archive.get(path) else {
            continue;
        };
        let contents = entry.contents().map_err(|source| Error::MalformedEncoding {
            path: path.clone(),
            source,
        })?;
        if let Some(offset) = first_difference(&contents, data) {
            return Err(Error::ContentMismatch {
                path: path.clone(),
                offset,
            });
        }
    }
    Ok(())
}

fn write_output(dir: &Path, path: &Path, contents: &str) -> Result<()> {
    let write_failure = |source: std::io::Error| Error::WriteFailure {
        path: path.display().to_string(),
        source,
    };
    fs::create_dir_all(dir).map_err(write_failure)?;
    fs::write(path, contents).map_err(write_failure)
}
