//! Error types for chunkpipe.

use std::io;
use std::path::{Path, PathBuf};

use crate::pipeline::PipelineState;

/// Errors that can terminate a pipeline run.
///
/// The first error raised by any part of the pipeline aborts the run and is
/// returned once from [`Pipeline::run`](crate::Pipeline::run). Nothing is
/// retried.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Reading from the source failed (missing file, permission denied, ...).
    #[error("read error{}: {source}", at(.path))]
    Read {
        /// Path of the source, if it is a file.
        path: Option<PathBuf>,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Writing to the sink failed (disk full, closed connection, ...).
    #[error("write error{}: {source}", at(.path))]
    Write {
        /// Path of the destination, if it is a file.
        path: Option<PathBuf>,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The gzip codec failed, or a finished compressor was used again.
    #[error("compression error: {message}")]
    Compression {
        /// What went wrong.
        message: String,
        /// Underlying codec error, if any.
        #[source]
        source: Option<io::Error>,
    },

    /// The run was stopped through its [`CancelToken`](crate::CancelToken).
    #[error("pipeline cancelled")]
    Cancelled,

    /// `run` was called on a pipeline that already ran.
    #[error("pipeline already terminated (state: {state})")]
    AlreadyTerminated {
        /// State the pipeline was in.
        state: PipelineState,
    },

    /// Invalid configuration parameter.
    #[error("invalid config: {message}")]
    InvalidConfig {
        /// Description of what was invalid.
        message: &'static str,
    },
}

fn at(path: &Option<PathBuf>) -> String {
    match path {
        Some(p) => format!(" at {}", p.display()),
        None => String::new(),
    }
}

impl PipelineError {
    /// Wraps a read failure on an unnamed source.
    pub fn read(source: io::Error) -> Self {
        PipelineError::Read { path: None, source }
    }

    /// Wraps a read failure on a file.
    pub fn read_at(path: impl AsRef<Path>, source: io::Error) -> Self {
        PipelineError::Read {
            path: Some(path.as_ref().to_path_buf()),
            source,
        }
    }

    /// Wraps a write failure on an unnamed sink.
    pub fn write(source: io::Error) -> Self {
        PipelineError::Write { path: None, source }
    }

    /// Wraps a write failure on a file.
    pub fn write_at(path: impl AsRef<Path>, source: io::Error) -> Self {
        PipelineError::Write {
            path: Some(path.as_ref().to_path_buf()),
            source,
        }
    }

    /// A codec-level failure.
    pub fn compression(message: impl Into<String>, source: io::Error) -> Self {
        PipelineError::Compression {
            message: message.into(),
            source: Some(source),
        }
    }

    /// A compressor misuse with no underlying I/O error.
    pub fn compression_state(message: impl Into<String>) -> Self {
        PipelineError::Compression {
            message: message.into(),
            source: None,
        }
    }

    /// Returns true for [`PipelineError::Read`].
    pub fn is_read(&self) -> bool {
        matches!(self, PipelineError::Read { .. })
    }

    /// Returns true for [`PipelineError::Write`].
    pub fn is_write(&self) -> bool {
        matches!(self, PipelineError::Write { .. })
    }

    /// Returns true for [`PipelineError::Compression`].
    pub fn is_compression(&self) -> bool {
        matches!(self, PipelineError::Compression { .. })
    }

    /// Returns true for [`PipelineError::Cancelled`].
    pub fn is_cancelled(&self) -> bool {
        matches!(self, PipelineError::Cancelled)
    }
}
