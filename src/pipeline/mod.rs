//! Pipeline orchestration.
//!
//! - [`Pipeline`] - Wires a source, stages and a sink; runs once
//! - [`PipelineState`] - `Idle -> Running -> {Completed | Failed}`
//! - [`PipelineReport`] - What a completed run moved
//! - [`CancelToken`] - External stop signal

mod cancel;
mod orchestrator;

pub use cancel::CancelToken;
pub use orchestrator::Pipeline;

#[cfg(feature = "async-io")]
pub(crate) use orchestrator::apply_stages;

use std::fmt;

use crate::digest::ContentDigest;

/// Lifecycle of a [`Pipeline`].
///
/// `Completed` and `Failed` are terminal: a pipeline runs at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineState {
    /// Built, not yet run.
    Idle,
    /// Moving chunks.
    Running,
    /// The source was drained, every stage finalized and the sink closed.
    Completed,
    /// The run stopped on its first error (or was cancelled).
    Failed,
}

impl PipelineState {
    /// Returns true for `Completed` and `Failed`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Completed | PipelineState::Failed)
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PipelineState::Idle => "idle",
            PipelineState::Running => "running",
            PipelineState::Completed => "completed",
            PipelineState::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Summary of a completed run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineReport {
    /// Chunks pulled from the source.
    pub chunks_read: u64,
    /// Bytes pulled from the source.
    pub bytes_read: u64,
    /// Chunks handed to the sink.
    pub chunks_written: u64,
    /// Bytes handed to the sink.
    pub bytes_written: u64,
    /// Digest of the bytes handed to the sink, when enabled.
    pub digest: Option<ContentDigest>,
}

impl fmt::Display for PipelineReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} chunks / {} bytes in, {} chunks / {} bytes out",
            self.chunks_read, self.bytes_read, self.chunks_written, self.bytes_written
        )?;
        if let Some(digest) = self.digest {
            write!(f, ", blake3={}", digest)?;
        }
        Ok(())
    }
}
