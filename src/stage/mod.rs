//! Transform stages.
//!
//! A [`Stage`] sits between the source and the sink. It accepts one chunk at
//! a time and hands back zero or one chunk, so at most one chunk is ever in
//! flight at a stage boundary.
//!
//! - [`Uppercase`] - Stateless ASCII uppercasing
//! - [`GzipCompressor`] - Streaming gzip compression with explicit finalize
//! - [`GzipDecompressor`] - The inverse of [`GzipCompressor`]

mod gzip;
mod uppercase;

pub use gzip::{GzipCompressor, GzipDecompressor};
pub use uppercase::Uppercase;

use crate::chunk::Chunk;
use crate::error::PipelineError;

/// One transform step between a source and a sink.
///
/// The pipeline calls [`Stage::process`] once per upstream chunk and
/// [`Stage::finalize`] exactly once after the upstream sequence ended.
pub trait Stage: Send {
    /// Short name used in log events.
    fn name(&self) -> &'static str;

    /// Transforms one chunk. `Ok(None)` means "nothing to pass on yet".
    fn process(&mut self, chunk: Chunk) -> Result<Option<Chunk>, PipelineError>;

    /// Flushes any state held across chunks.
    fn finalize(&mut self) -> Result<Option<Chunk>, PipelineError> {
        Ok(None)
    }
}

impl<S: Stage + ?Sized> Stage for Box<S> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn process(&mut self, chunk: Chunk) -> Result<Option<Chunk>, PipelineError> {
        (**self).process(chunk)
    }

    fn finalize(&mut self) -> Result<Option<Chunk>, PipelineError> {
        (**self).finalize()
    }
}
