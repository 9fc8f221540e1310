//! Reader-backed sources.
//!
//! [`ReaderSource`] reads at most `chunk_size` bytes per pull and emits what
//! one read returned. It never accumulates across reads, so a short read
//! yields a short chunk.
//!
//! # Example
//!
//! ```
//! use chunkpipe::{PipelineConfig, ReaderSource};
//! use std::io::Cursor;
//!
//! let config = PipelineConfig::new(4)?;
//! let source = ReaderSource::new(Cursor::new(b"abcdefghij".to_vec()), &config)?;
//!
//! let sizes: Vec<usize> = source.map(|c| c.map(|c| c.len())).collect::<Result<_, _>>()?;
//! assert_eq!(sizes, vec![4, 4, 2]);
//! # Ok::<(), chunkpipe::PipelineError>(())
//! ```

use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};

use bytes::Bytes;

use crate::buffer::ReadBuffer;
use crate::chunk::Chunk;
use crate::config::PipelineConfig;
use crate::error::PipelineError;

use super::Source;

/// A source that reads bounded chunks from a [`std::io::Read`].
#[derive(Debug)]
pub struct ReaderSource<R> {
    reader: R,
    buffer: ReadBuffer,
    path: Option<PathBuf>,
    offset: u64,
    finished: bool,
}

impl<R: Read> ReaderSource<R> {
    /// Creates a source that reads up to `config.chunk_size()` bytes per chunk.
    ///
    /// Fails with [`PipelineError::InvalidConfig`] if `config` does not
    /// validate; a zero-sized read buffer would look like end of input.
    pub fn new(reader: R, config: &PipelineConfig) -> Result<Self, PipelineError> {
        config.validate()?;
        Ok(Self {
            reader,
            buffer: ReadBuffer::take(config.chunk_size()),
            path: None,
            offset: 0,
            finished: false,
        })
    }

    /// Returns the number of bytes read so far.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Consumes the source and returns the reader.
    pub fn into_inner(self) -> R {
        self.reader
    }

    fn read_error(&self, e: std::io::Error) -> PipelineError {
        match &self.path {
            Some(path) => PipelineError::read_at(path, e),
            None => PipelineError::read(e),
        }
    }
}

impl<R: Read> Source for ReaderSource<R> {
    fn next_chunk(&mut self) -> Result<Option<Chunk>, PipelineError> {
        if self.finished {
            return Ok(None);
        }

        loop {
            match self.reader.read(self.buffer.as_mut_slice()) {
                Ok(0) => {
                    self.finished = true;
                    return Ok(None);
                }
                Ok(n) => {
                    let chunk =
                        Chunk::with_offset(Bytes::copy_from_slice(self.buffer.filled(n)), self.offset);
                    self.offset += n as u64;
                    return Ok(Some(chunk));
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.finished = true;
                    return Err(self.read_error(e));
                }
            }
        }
    }
}

impl<R: Read> Iterator for ReaderSource<R> {
    type Item = Result<Chunk, PipelineError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_chunk().transpose()
    }
}

/// A [`ReaderSource`] over a file.
pub type FileSource = ReaderSource<File>;

impl ReaderSource<File> {
    /// Opens `path` for reading.
    ///
    /// Fails with [`PipelineError::InvalidConfig`] before touching the file
    /// if `config` is invalid, and with [`PipelineError::Read`] if the file
    /// cannot be opened.
    pub fn open(path: impl AsRef<Path>, config: &PipelineConfig) -> Result<Self, PipelineError> {
        config.validate()?;
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| PipelineError::read_at(path, e))?;
        let mut source = Self::new(file, config)?;
        source.path = Some(path.to_path_buf());
        Ok(source)
    }

    /// Returns the path this source was opened from.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Cursor};

    /// Yields `good` bytes, then fails.
    struct FailingReader {
        good: usize,
    }

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.good == 0 {
                return Err(io::Error::new(ErrorKind::PermissionDenied, "denied"));
            }
            let n = self.good.min(buf.len());
            buf[..n].fill(b'x');
            self.good -= n;
            Ok(n)
        }
    }

    /// Interrupts every other read.
    struct InterruptingReader {
        inner: Cursor<Vec<u8>>,
        interrupt: bool,
    }

    impl Read for InterruptingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.interrupt = !self.interrupt;
            if self.interrupt {
                return Err(ErrorKind::Interrupted.into());
            }
            self.inner.read(buf)
        }
    }

    #[test]
    fn test_empty_reader() {
        let config = PipelineConfig::default();
        let mut source = ReaderSource::new(Cursor::new(Vec::new()), &config).unwrap();
        assert!(source.next_chunk().unwrap().is_none());
        assert!(source.next_chunk().unwrap().is_none());
    }

    #[test]
    fn test_chunks_are_bounded_and_offset() {
        let data: Vec<u8> = (0..1000).map(|i| (i % 256) as u8).collect();
        let config = PipelineConfig::new(64).unwrap();
        let chunks: Vec<_> = ReaderSource::new(Cursor::new(data.clone()), &config)
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();

        let mut expected_offset = 0u64;
        for chunk in &chunks {
            assert!(chunk.len() <= 64);
            assert_eq!(chunk.offset, Some(expected_offset));
            expected_offset += chunk.len() as u64;
        }
        assert_eq!(expected_offset, data.len() as u64);

        let joined: Vec<u8> = chunks.iter().flat_map(|c| c.data.iter().copied()).collect();
        assert_eq!(joined, data);
    }

    #[test]
    fn test_read_error_terminates_sequence() {
        let config = PipelineConfig::new(8).unwrap();
        let mut source = ReaderSource::new(FailingReader { good: 10 }, &config).unwrap();

        assert_eq!(source.next_chunk().unwrap().unwrap().len(), 8);
        assert_eq!(source.next_chunk().unwrap().unwrap().len(), 2);
        assert!(source.next_chunk().unwrap_err().is_read());
        assert!(source.next_chunk().unwrap().is_none());
    }

    #[test]
    fn test_interrupted_reads_are_retried() {
        let config = PipelineConfig::new(4).unwrap();
        let reader = InterruptingReader {
            inner: Cursor::new(b"abcdef".to_vec()),
            interrupt: false,
        };
        let chunks: Vec<_> = ReaderSource::new(reader, &config)
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        let total: usize = chunks.iter().map(|c| c.len()).sum();
        assert_eq!(total, 6);
    }

    #[test]
    fn test_open_missing_file() {
        let config = PipelineConfig::default();
        let err = FileSource::open("/definitely/not/here.txt", &config).unwrap_err();
        assert!(err.is_read());
        assert!(err.to_string().contains("/definitely/not/here.txt"));
    }

    #[test]
    fn test_zero_chunk_size_is_rejected() {
        let config = PipelineConfig::default().with_chunk_size(0);
        let result = ReaderSource::new(Cursor::new(b"important data".to_vec()), &config);
        assert!(matches!(result, Err(PipelineError::InvalidConfig { .. })));
    }

    #[test]
    fn test_oversized_chunk_size_is_rejected_before_allocating() {
        let config = PipelineConfig::default().with_chunk_size(usize::MAX / 2);
        let result = ReaderSource::new(Cursor::new(Vec::new()), &config);
        assert!(matches!(result, Err(PipelineError::InvalidConfig { .. })));
    }

    #[test]
    fn test_open_validates_config_first() {
        let config = PipelineConfig::default().with_chunk_size(0);
        let err = FileSource::open("/definitely/not/here.txt", &config).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidConfig { .. }));
    }
}
