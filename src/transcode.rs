//! Hex transcoder
//!
//! Binary content is stored in generated source as lowercase hex digit
//! pairs, split into lines of at most [`CHUNK_SIZE`] input bytes. Decoding
//! only looks at the newline delimiters, so the line width is free to change
//! without breaking previously generated payloads.

use thiserror::Error;

/// Default number of input bytes per encoded line
pub const CHUNK_SIZE: usize = 64;

const SEGMENT_DELIMITER: u8 = b'\n';

/// A hex segment that could not be decoded
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Malformed hex segment {segment}: {source}")]
pub struct DecodeError {
    /// Zero-based index of the offending newline-delimited segment
    pub segment: usize,
    #[source]
    pub source: hex::FromHexError,
}

/// Converts between raw bytes and line-oriented hex text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transcoder {
    chunk_size: usize,
}

impl Transcoder {
    /// Create a transcoder with the default line width
    pub fn new() -> Self {
        Self { chunk_size: CHUNK_SIZE }
    }

    /// Set the number of input bytes rendered per line (minimum 1)
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Encode bytes as newline-separated lowercase hex lines
    ///
    /// Empty input encodes to the empty string. No trailing newline is
    /// written after the final chunk.
    pub fn encode(&self, data: &[u8]) -> String {
        let lines = data.len().div_ceil(self.chunk_size);
        let mut output = String::with_capacity(data.len() * 2 + lines);

        for (i, chunk) in data.chunks(self.chunk_size).enumerate() {
            if i > 0 {
                output.push(SEGMENT_DELIMITER as char);
            }
            output.push_str(&hex::encode(chunk));
        }

        output
    }

    /// Decode hex text back into bytes
    ///
    /// See [`decode`].
    pub fn decode(&self, text: impl AsRef<[u8]>) -> Result<Vec<u8>, DecodeError> {
        decode(text)
    }
}

impl Default for Transcoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Encode with the default line width
pub fn encode(data: &[u8]) -> String {
    Transcoder::new().encode(data)
}

/// Decode newline-delimited hex text
///
/// Every segment is decoded on its own and the results are concatenated in
/// order. Empty segments (a trailing newline, or empty input) contribute no
/// bytes. The first segment holding a non-hex character or an odd number of
/// digits fails the whole decode; no partial output is returned.
pub fn decode(text: impl AsRef<[u8]>) -> Result<Vec<u8>, DecodeError> {
    let text = text.as_ref();
    let mut output = Vec::with_capacity(text.len() / 2);

    for (segment, line) in text.split(|&b| b == SEGMENT_DELIMITER).enumerate() {
        let bytes = hex::decode(line).map_err(|source| DecodeError { segment, source })?;
        output.extend_from_slice(&bytes);
    }

    Ok(output)
}
