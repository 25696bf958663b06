//! # emx-bake
//!
//! Bake files into generated Rust source so a program can ship as a single
//! binary and still recreate, check, or verify those files at runtime.
//!
//! ## Encodings
//!
//! Each file becomes an [`Entry`] with one of two encodings:
//!
//! - **Raw**: UTF-8 text is stored verbatim in a raw string literal.
//! - **Hex**: anything else is stored as lowercase hex, 64 bytes per line:
//!
//! ```text
//! 89504e470d0a1a0a0000000d49484452...
//! 0000001008060000001ff3ff61000000...
//! ```
//!
//! ## Binary Detection Rules
//!
//! A file is classified once, when it is read:
//! 1. Data is not valid UTF-8 → Binary (InvalidUtf8)
//! 2. Data contains a carriage return → Binary (CarriageReturn)
//! 3. Data contains a bidirectional override or isolate → Binary (DirectionControl)
//! 4. Otherwise → Text
//!
//! ## Runtime
//!
//! The generated module exposes `baked()`, returning an [`Archive`] with
//! three operations:
//! - [`Archive::extract`] writes every file, creating parent directories
//! - [`Archive::ensure`] checks every file exists
//! - [`Archive::verify_identity`] checks every file on disk matches its
//!   baked copy byte for byte
//!
//! Generated code only needs the runtime layer, so depend on this crate with
//! `default-features = false` from the baking package.

pub mod archive;
pub mod error;
pub mod transcode;

#[cfg(feature = "generate")]
pub mod codegen;
#[cfg(feature = "generate")]
pub mod source;

pub use archive::{Archive, Encoding, Entry};
pub use error::{Error, Result};
pub use transcode::{decode, encode, DecodeError, Transcoder, CHUNK_SIZE};

#[cfg(feature = "generate")]
pub use codegen::{find_package, find_package_within, render_module, render_test, Config, Generated, Package, RenderOptions};
#[cfg(feature = "generate")]
pub use source::{BinaryReason, Classification, DirMode, SourceFile};
