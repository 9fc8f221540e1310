//! Gzip stages.
//!
//! Both stages own their codec state explicitly. The codec lives in an
//! `Option`: `finalize` takes it out, writes the trailer (or verifies it)
//! and leaves `None` behind, so any later call fails loudly instead of
//! emitting a second trailer.

use std::io::{ErrorKind, Write};

use bytes::Bytes;
use flate2::Compression;
use flate2::write::{GzDecoder, GzEncoder};

use crate::chunk::Chunk;
use crate::config::{DEFAULT_COMPRESSION_LEVEL, MAX_COMPRESSION_LEVEL, PipelineConfig};
use crate::error::PipelineError;

use super::Stage;

/// Streaming gzip compressor.
///
/// Input chunks are fed to the encoder; whatever compressed output the
/// encoder has produced so far is returned (often nothing for small
/// chunks). [`Stage::finalize`] flushes the encoder and returns the
/// remaining output including the gzip trailer.
///
/// # Example
///
/// ```
/// use chunkpipe::{Chunk, GzipCompressor, Stage};
///
/// let mut gz = GzipCompressor::new(6)?;
/// let mut out = Vec::new();
/// if let Some(c) = gz.process(Chunk::new(&b"hello"[..]))? {
///     out.extend_from_slice(&c.data);
/// }
/// if let Some(c) = gz.finalize()? {
///     out.extend_from_slice(&c.data);
/// }
/// assert_eq!(&out[..2], &[0x1f, 0x8b]);
/// assert!(gz.process(Chunk::new(&b"late"[..])).is_err());
/// # Ok::<(), chunkpipe::PipelineError>(())
/// ```
pub struct GzipCompressor {
    encoder: Option<GzEncoder<Vec<u8>>>,
    bytes_in: u64,
    bytes_out: u64,
}

impl GzipCompressor {
    /// Creates a compressor at `level` (0-9).
    ///
    /// Fails with [`PipelineError::InvalidConfig`] for levels above 9.
    pub fn new(level: u32) -> Result<Self, PipelineError> {
        if level > MAX_COMPRESSION_LEVEL {
            return Err(PipelineError::InvalidConfig {
                message: "compression_level must be between 0 and 9",
            });
        }
        Ok(Self::with_level(Compression::new(level)))
    }

    /// Creates a compressor using the configured level.
    ///
    /// Fails with [`PipelineError::InvalidConfig`] if `config` is invalid.
    pub fn from_config(config: &PipelineConfig) -> Result<Self, PipelineError> {
        config.validate()?;
        Self::new(config.compression_level())
    }

    fn with_level(level: Compression) -> Self {
        Self {
            encoder: Some(GzEncoder::new(Vec::new(), level)),
            bytes_in: 0,
            bytes_out: 0,
        }
    }

    /// Returns true once the trailer has been emitted.
    pub fn is_finished(&self) -> bool {
        self.encoder.is_none()
    }

    /// Uncompressed bytes accepted so far.
    pub fn bytes_in(&self) -> u64 {
        self.bytes_in
    }

    /// Compressed bytes emitted so far.
    pub fn bytes_out(&self) -> u64 {
        self.bytes_out
    }

    fn emit(&mut self, data: Vec<u8>) -> Option<Chunk> {
        if data.is_empty() {
            return None;
        }
        let offset = self.bytes_out;
        self.bytes_out += data.len() as u64;
        Some(Chunk::with_offset(Bytes::from(data), offset))
    }
}

impl Default for GzipCompressor {
    fn default() -> Self {
        Self::with_level(Compression::new(DEFAULT_COMPRESSION_LEVEL))
    }
}

impl Stage for GzipCompressor {
    fn name(&self) -> &'static str {
        "gzip"
    }

    fn process(&mut self, chunk: Chunk) -> Result<Option<Chunk>, PipelineError> {
        let encoder = self.encoder.as_mut().ok_or_else(|| {
            PipelineError::compression_state("compressor used after the gzip trailer was emitted")
        })?;

        encoder
            .write_all(&chunk.data)
            .map_err(|e| PipelineError::compression("deflate failed", e))?;
        self.bytes_in += chunk.len() as u64;

        let out = std::mem::take(encoder.get_mut());
        Ok(self.emit(out))
    }

    fn finalize(&mut self) -> Result<Option<Chunk>, PipelineError> {
        let encoder = self.encoder.take().ok_or_else(|| {
            PipelineError::compression_state("compressor finalized twice")
        })?;

        let out = encoder
            .finish()
            .map_err(|e| PipelineError::compression("writing gzip trailer failed", e))?;
        Ok(self.emit(out))
    }
}

/// Streaming gzip decompressor.
///
/// Accepts archives made of several concatenated gzip members and emits
/// their contents back to back. [`Stage::finalize`] fails if the stream
/// ended inside a member (before its CRC trailer), and bytes after a
/// member that do not start a new one are rejected as trailing data.
pub struct GzipDecompressor {
    decoder: Option<GzDecoder<Vec<u8>>>,
    // Members fully decoded and verified so far.
    members: u64,
    // Whether the current member has received any input.
    member_started: bool,
    bytes_out: u64,
}

impl GzipDecompressor {
    /// Creates a decompressor.
    pub fn new() -> Self {
        Self {
            decoder: Some(GzDecoder::new(Vec::new())),
            members: 0,
            member_started: false,
            bytes_out: 0,
        }
    }

    /// Returns true once the stream has been finalized.
    pub fn is_finished(&self) -> bool {
        self.decoder.is_none()
    }

    /// Number of complete gzip members decoded so far.
    pub fn members(&self) -> u64 {
        self.members
    }

    /// Feeds `input` to the decoder, starting a new member whenever the
    /// current one is complete.
    fn feed(&mut self, mut input: &[u8]) -> Result<(), PipelineError> {
        while !input.is_empty() {
            let decoder = self.decoder.as_mut().ok_or_else(|| {
                PipelineError::compression_state("decompressor used after it was finalized")
            })?;

            match decoder.write(input) {
                Ok(0) => self.next_member()?,
                Ok(n) => {
                    self.member_started = true;
                    input = &input[n..];
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) if self.members > 0 && decoder.header().is_none() => {
                    return Err(PipelineError::compression(
                        "trailing data after gzip member",
                        e,
                    ));
                }
                Err(e) => return Err(PipelineError::compression("inflate failed", e)),
            }
        }
        Ok(())
    }

    /// Verifies the finished member and starts the next one. Output
    /// not yet emitted carries over into the new decoder's buffer.
    fn next_member(&mut self) -> Result<(), PipelineError> {
        let decoder = self.decoder.take().ok_or_else(|| {
            PipelineError::compression_state("decompressor used after it was finalized")
        })?;

        let pending = decoder
            .finish()
            .map_err(|e| PipelineError::compression("corrupt gzip member", e))?;
        self.decoder = Some(GzDecoder::new(pending));
        self.members += 1;
        self.member_started = false;
        Ok(())
    }

    fn emit(&mut self, data: Vec<u8>) -> Option<Chunk> {
        if data.is_empty() {
            return None;
        }
        let offset = self.bytes_out;
        self.bytes_out += data.len() as u64;
        Some(Chunk::with_offset(Bytes::from(data), offset))
    }
}

impl Default for GzipDecompressor {
    fn default() -> Self {
        Self::new()
    }
}

impl Stage for GzipDecompressor {
    fn name(&self) -> &'static str {
        "gunzip"
    }

    fn process(&mut self, chunk: Chunk) -> Result<Option<Chunk>, PipelineError> {
        if self.decoder.is_none() {
            return Err(PipelineError::compression_state(
                "decompressor used after it was finalized",
            ));
        }
        self.feed(&chunk.data)?;

        let out = match self.decoder.as_mut() {
            Some(decoder) => std::mem::take(decoder.get_mut()),
            None => Vec::new(),
        };
        Ok(self.emit(out))
    }

    fn finalize(&mut self) -> Result<Option<Chunk>, PipelineError> {
        let mut decoder = self.decoder.take().ok_or_else(|| {
            PipelineError::compression_state("decompressor finalized twice")
        })?;

        // Clean end right after a complete member.
        if self.members > 0 && !self.member_started {
            let out = std::mem::take(decoder.get_mut());
            return Ok(self.emit(out));
        }

        if self.members > 0 && decoder.header().is_none() {
            return Err(PipelineError::compression_state(
                "trailing data after gzip member",
            ));
        }

        let out = decoder
            .finish()
            .map_err(|e| PipelineError::compression("truncated or corrupt gzip stream", e))?;
        self.members += 1;
        Ok(self.emit(out))
    }
}
