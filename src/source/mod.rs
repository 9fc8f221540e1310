//! Chunk sources.
//!
//! A [`Source`] is a lazy, finite, non-restartable sequence of chunks:
//!
//! - [`ReaderSource`] - Bounded chunks from any [`std::io::Read`]
//! - [`FileSource`] - A [`ReaderSource`] over a file opened by path
//! - [`IterSource`] - Adapts any iterator of chunk results

mod reader;

pub use reader::{FileSource, ReaderSource};

use crate::chunk::Chunk;
use crate::error::PipelineError;

/// Produces the chunks a pipeline pulls.
///
/// `Ok(None)` signals the end of the sequence. Once a source has returned
/// `Ok(None)` or an error, every later call returns `Ok(None)`.
pub trait Source {
    /// Pulls the next chunk.
    fn next_chunk(&mut self) -> Result<Option<Chunk>, PipelineError>;
}

impl<S: Source + ?Sized> Source for Box<S> {
    fn next_chunk(&mut self) -> Result<Option<Chunk>, PipelineError> {
        (**self).next_chunk()
    }
}

/// A [`Source`] backed by an iterator of chunk results.
///
/// # Example
///
/// ```
/// use chunkpipe::{Chunk, IterSource, Source};
///
/// let mut source = IterSource::new(vec![Ok(Chunk::new(&b"abc"[..]))]);
/// assert_eq!(source.next_chunk()?.unwrap().len(), 3);
/// assert!(source.next_chunk()?.is_none());
/// # Ok::<(), chunkpipe::PipelineError>(())
/// ```
#[derive(Debug)]
pub struct IterSource<I> {
    iter: I,
    finished: bool,
}

impl<I> IterSource<I>
where
    I: Iterator<Item = Result<Chunk, PipelineError>>,
{
    /// Wraps anything that iterates chunk results.
    pub fn new(iter: impl IntoIterator<IntoIter = I>) -> Self {
        Self {
            iter: iter.into_iter(),
            finished: false,
        }
    }
}

impl<I> Source for IterSource<I>
where
    I: Iterator<Item = Result<Chunk, PipelineError>>,
{
    fn next_chunk(&mut self) -> Result<Option<Chunk>, PipelineError> {
        if self.finished {
            return Ok(None);
        }

        match self.iter.next() {
            Some(Ok(chunk)) => Ok(Some(chunk)),
            Some(Err(e)) => {
                self.finished = true;
                Err(e)
            }
            None => {
                self.finished = true;
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_iter_source_stops_after_error() {
        let items = vec![
            Ok(Chunk::new(&b"one"[..])),
            Err(PipelineError::read(io::Error::other("boom"))),
            Ok(Chunk::new(&b"never"[..])),
        ];
        let mut source = IterSource::new(items);

        assert!(source.next_chunk().unwrap().is_some());
        assert!(source.next_chunk().unwrap_err().is_read());
        assert!(source.next_chunk().unwrap().is_none());
    }

    #[test]
    fn test_boxed_source() {
        let mut source: Box<dyn Source> =
            Box::new(IterSource::new(vec![Ok(Chunk::new(&b"x"[..]))]));
        assert!(source.next_chunk().unwrap().is_some());
        assert!(source.next_chunk().unwrap().is_none());
    }
}
