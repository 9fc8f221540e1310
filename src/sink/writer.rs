//! Writer-backed sinks.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::chunk::Chunk;
use crate::error::PipelineError;

use super::Sink;

/// A sink that writes every chunk to a [`std::io::Write`].
///
/// # Example
///
/// ```
/// use chunkpipe::{Chunk, Sink, WriterSink};
///
/// let mut sink = WriterSink::new(Vec::new());
/// sink.write_chunk(Chunk::new(&b"hello"[..]))?;
/// sink.close()?;
/// assert_eq!(sink.into_inner(), b"hello");
/// # Ok::<(), chunkpipe::PipelineError>(())
/// ```
#[derive(Debug)]
pub struct WriterSink<W> {
    writer: W,
    path: Option<PathBuf>,
    bytes_written: u64,
}

impl<W: Write> WriterSink<W> {
    /// Wraps a writer.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            path: None,
            bytes_written: 0,
        }
    }

    /// Returns the number of bytes written so far.
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Returns a reference to the writer.
    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    /// Consumes the sink and returns the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_error(&self, e: std::io::Error) -> PipelineError {
        match &self.path {
            Some(path) => PipelineError::write_at(path, e),
            None => PipelineError::write(e),
        }
    }
}

impl<W: Write> Sink for WriterSink<W> {
    fn write_chunk(&mut self, chunk: Chunk) -> Result<(), PipelineError> {
        self.writer
            .write_all(&chunk.data)
            .map_err(|e| self.write_error(e))?;
        self.bytes_written += chunk.len() as u64;
        Ok(())
    }

    fn close(&mut self) -> Result<(), PipelineError> {
        self.writer.flush().map_err(|e| self.write_error(e))
    }
}

/// A sink that writes to a file created (or truncated) by path.
///
/// [`Sink::close`] flushes and `sync_all`s the file, so a successful run
/// leaves the output on disk. After a failure the file is only closed.
///
/// # Example
///
/// ```no_run
/// use chunkpipe::{Chunk, FileSink, Sink};
///
/// let mut sink = FileSink::create("out.txt")?;
/// sink.write_chunk(Chunk::new(&b"hello"[..]))?;
/// sink.close()?;
/// # Ok::<(), chunkpipe::PipelineError>(())
/// ```
#[derive(Debug)]
pub struct FileSink {
    inner: WriterSink<File>,
}

impl FileSink {
    /// Creates `path`, truncating it if it exists.
    ///
    /// Fails with [`PipelineError::Write`] if the file cannot be created.
    pub fn create(path: impl AsRef<Path>) -> Result<Self, PipelineError> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| PipelineError::write_at(path, e))?;
        let mut inner = WriterSink::new(file);
        inner.path = Some(path.to_path_buf());
        Ok(Self { inner })
    }

    /// Returns the path this sink writes to.
    pub fn path(&self) -> Option<&Path> {
        self.inner.path.as_deref()
    }

    /// Returns the number of bytes written so far.
    pub fn bytes_written(&self) -> u64 {
        self.inner.bytes_written
    }

    /// Flushes and syncs the file to disk.
    pub fn sync(&mut self) -> Result<(), PipelineError> {
        self.inner.close()?;
        self.inner
            .writer
            .sync_all()
            .map_err(|e| self.inner.write_error(e))
    }
}

impl Sink for FileSink {
    fn write_chunk(&mut self, chunk: Chunk) -> Result<(), PipelineError> {
        self.inner.write_chunk(chunk)
    }

    fn close(&mut self) -> Result<(), PipelineError> {
        self.sync()
    }
}
