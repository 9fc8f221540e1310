//! Configuration for pipeline runs.
//!
//! - [`PipelineConfig`] - Chunk size (high-water mark), gzip level, digesting
//! - [`DigestConfig`] - Whether to digest the bytes delivered to the sink
//!
//! # Example
//!
//! ```
//! use chunkpipe::{DigestConfig, PipelineConfig};
//!
//! // 4 KiB chunks, fastest compression
//! let config = PipelineConfig::new(4096)?.with_compression_level(1);
//!
//! // Digest the output
//! let config = PipelineConfig::default()
//!     .with_digest_config(DigestConfig::enabled());
//!
//! # Ok::<(), chunkpipe::PipelineError>(())
//! ```

use crate::error::PipelineError;

/// Default chunk size (64 KiB).
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Largest accepted chunk size (16 MiB).
pub const MAX_CHUNK_SIZE: usize = 16 * 1024 * 1024;

/// Default gzip compression level.
pub const DEFAULT_COMPRESSION_LEVEL: u32 = 6;

/// Highest gzip compression level.
pub const MAX_COMPRESSION_LEVEL: u32 = 9;

/// Configuration for a pipeline run.
///
/// `chunk_size` bounds every chunk a source produces, and so bounds the
/// memory held at each stage boundary. Sizes need not be powers of two; a
/// chunk size of 1 is valid (and slow).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PipelineConfig {
    chunk_size: usize,
    compression_level: u32,
    digest_config: DigestConfig,
}

impl PipelineConfig {
    /// Creates a new configuration with the given chunk size.
    ///
    /// Returns error if the size is zero or above [`MAX_CHUNK_SIZE`].
    pub fn new(chunk_size: usize) -> Result<Self, PipelineError> {
        let config = Self {
            chunk_size,
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Sets the chunk size.
    ///
    /// Note: This does not validate the configuration. Use
    /// [`PipelineConfig::validate`] to check it.
    pub fn with_chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size;
        self
    }

    /// Sets the gzip compression level (0-9).
    pub fn with_compression_level(mut self, level: u32) -> Self {
        self.compression_level = level;
        self
    }

    /// Sets the digest configuration.
    pub fn with_digest_config(mut self, config: DigestConfig) -> Self {
        self.digest_config = config;
        self
    }

    /// Returns the chunk size.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Returns the gzip compression level.
    pub fn compression_level(&self) -> u32 {
        self.compression_level
    }

    /// Returns the digest configuration.
    pub fn digest_config(&self) -> &DigestConfig {
        &self.digest_config
    }

    /// Validates the current configuration.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.chunk_size == 0 {
            return Err(PipelineError::InvalidConfig {
                message: "chunk_size must be non-zero",
            });
        }

        if self.chunk_size > MAX_CHUNK_SIZE {
            return Err(PipelineError::InvalidConfig {
                message: "chunk_size cannot exceed 16 MiB",
            });
        }

        if self.compression_level > MAX_COMPRESSION_LEVEL {
            return Err(PipelineError::InvalidConfig {
                message: "compression_level must be between 0 and 9",
            });
        }

        Ok(())
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            compression_level: DEFAULT_COMPRESSION_LEVEL,
            digest_config: DigestConfig::default(),
        }
    }
}

/// Configuration for the run digest.
///
/// When enabled (and the `digest-blake3` feature is on), the pipeline
/// computes a BLAKE3 digest over every byte handed to the sink and returns it
/// in the [`PipelineReport`](crate::PipelineReport). Disabled by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DigestConfig {
    /// Whether to digest the output.
    pub enabled: bool,
}

impl DigestConfig {
    /// Creates a new digest configuration.
    pub const fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Enables digesting.
    pub const fn enabled() -> Self {
        Self { enabled: true }
    }

    /// Disables digesting.
    pub const fn disabled() -> Self {
        Self { enabled: false }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.chunk_size(), DEFAULT_CHUNK_SIZE);
        assert_eq!(config.compression_level(), DEFAULT_COMPRESSION_LEVEL);
        assert!(!config.digest_config().enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let config = PipelineConfig::default()
            .with_chunk_size(4)
            .with_compression_level(9)
            .with_digest_config(DigestConfig::enabled());

        assert_eq!(config.chunk_size(), 4);
        assert_eq!(config.compression_level(), 9);
        assert!(config.digest_config().enabled);
    }

    #[test]
    fn test_non_power_of_two_is_fine() {
        let config = PipelineConfig::new(1000).unwrap();
        assert_eq!(config.chunk_size(), 1000);
    }

    #[test]
    fn test_invalid_zero_chunk_size() {
        assert!(PipelineConfig::new(0).is_err());
    }

    #[test]
    fn test_invalid_oversized_chunk() {
        assert!(PipelineConfig::new(MAX_CHUNK_SIZE).is_ok());
        assert!(PipelineConfig::new(MAX_CHUNK_SIZE + 1).is_err());
    }

    #[test]
    fn test_invalid_compression_level() {
        let config = PipelineConfig::default().with_compression_level(10);
        assert!(matches!(
            config.validate(),
            Err(PipelineError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_digest_config() {
        assert!(!DigestConfig::default().enabled);
        assert!(DigestConfig::enabled().enabled);
        assert!(!DigestConfig::disabled().enabled);
        assert!(DigestConfig::new(true).enabled);
    }
}
