//! Chunk sinks.
//!
//! A [`Sink`] consumes the final chunk sequence. Backpressure is the call
//! itself: [`Sink::write_chunk`] is the request, its return is the
//! acknowledgement, and the pipeline never issues a second request while
//! one is outstanding.
//!
//! - [`WriterSink`] - Any [`std::io::Write`]
//! - [`FileSink`] - A file created (or truncated) by path, synced on close

mod writer;

pub use writer::{FileSink, WriterSink};

use crate::chunk::Chunk;
use crate::error::PipelineError;

/// Consumes the chunks a pipeline delivers.
pub trait Sink {
    /// Accepts one chunk. Returns once the chunk has been fully consumed.
    fn write_chunk(&mut self, chunk: Chunk) -> Result<(), PipelineError>;

    /// Flushes buffered output. Called once, after the last chunk of a
    /// successful run.
    fn close(&mut self) -> Result<(), PipelineError> {
        Ok(())
    }
}

impl<S: Sink + ?Sized> Sink for Box<S> {
    fn write_chunk(&mut self, chunk: Chunk) -> Result<(), PipelineError> {
        (**self).write_chunk(chunk)
    }

    fn close(&mut self) -> Result<(), PipelineError> {
        (**self).close()
    }
}

impl<S: Sink + ?Sized> Sink for &mut S {
    fn write_chunk(&mut self, chunk: Chunk) -> Result<(), PipelineError> {
        (**self).write_chunk(chunk)
    }

    fn close(&mut self) -> Result<(), PipelineError> {
        (**self).close()
    }
}

impl Sink for Vec<Chunk> {
    fn write_chunk(&mut self, chunk: Chunk) -> Result<(), PipelineError> {
        self.push(chunk);
        Ok(())
    }
}
