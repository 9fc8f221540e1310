//! Async chunk stream.
//!
//! # Example
//!
//! ```ignore
//! use futures_util::StreamExt;
//! use chunkpipe::{chunk_async, PipelineConfig};
//! use futures_io::AsyncRead;
//!
//! async fn demo<R: AsyncRead + Unpin>(reader: R) -> Result<(), chunkpipe::PipelineError> {
//!     let mut stream = chunk_async(reader, &PipelineConfig::default())?;
//!
//!     while let Some(chunk) = stream.next().await {
//!         let chunk = chunk?;
//!         println!("Chunk: {} bytes", chunk.len());
//!     }
//!     Ok(())
//! }
//! ```

use std::io::ErrorKind;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures_core::Stream;
use futures_io::AsyncRead;
use pin_project_lite::pin_project;

use crate::chunk::Chunk;
use crate::config::PipelineConfig;
use crate::error::PipelineError;

pin_project! {
    /// A stream of bounded chunks read from an async reader.
    ///
    /// Each poll issues at most one read of up to `chunk_size` bytes and
    /// yields what it returned. Nothing is read ahead: the reader is only
    /// polled when the consumer asks for the next chunk.
    pub struct ChunkStream<R> {
        #[pin]
        reader: R,
        buffer: Vec<u8>,
        offset: u64,
        finished: bool,
    }
}

impl<R> ChunkStream<R> {
    /// Creates a new chunk stream from an async reader.
    ///
    /// Fails with [`PipelineError::InvalidConfig`] if `config` is invalid.
    pub fn new(reader: R, config: &PipelineConfig) -> Result<Self, PipelineError> {
        config.validate()?;
        Ok(Self {
            reader,
            // Owned, not pooled: the stream may be polled from any thread.
            buffer: vec![0u8; config.chunk_size()],
            offset: 0,
            finished: false,
        })
    }

    /// Returns the number of bytes read so far.
    pub fn offset(&self) -> u64 {
        self.offset
    }
}

impl<R: AsyncRead> Stream for ChunkStream<R> {
    type Item = Result<Chunk, PipelineError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        if *this.finished {
            return Poll::Ready(None);
        }

        loop {
            match this.reader.as_mut().poll_read(cx, &mut this.buffer[..]) {
                Poll::Pending => return Poll::Pending,
                Poll::Ready(Err(e)) if e.kind() == ErrorKind::Interrupted => continue,
                Poll::Ready(Err(e)) => {
                    *this.finished = true;
                    return Poll::Ready(Some(Err(PipelineError::read(e))));
                }
                Poll::Ready(Ok(0)) => {
                    *this.finished = true;
                    return Poll::Ready(None);
                }
                Poll::Ready(Ok(n)) => {
                    let chunk =
                        Chunk::with_offset(Bytes::copy_from_slice(&this.buffer[..n]), *this.offset);
                    *this.offset += n as u64;
                    return Poll::Ready(Some(Ok(chunk)));
                }
            }
        }
    }
}

/// Creates a chunk stream from an async reader.
///
/// Uses `futures_io::AsyncRead` for runtime-agnostic async I/O. For tokio
/// readers, convert with `tokio_util::compat`:
///
/// ```ignore
/// use tokio_util::compat::TokioAsyncReadCompatExt;
/// use chunkpipe::{chunk_async, PipelineConfig};
///
/// let file = tokio::fs::File::open("file").await?;
/// let stream = chunk_async(file.compat(), &PipelineConfig::default())?;
/// ```
///
/// # Errors
///
/// [`PipelineError::InvalidConfig`] if `config` is invalid.
pub fn chunk_async<R: AsyncRead>(
    reader: R,
    config: &PipelineConfig,
) -> Result<ChunkStream<R>, PipelineError> {
    ChunkStream::new(reader, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::StreamExt;

    #[tokio::test]
    async fn test_chunk_stream_empty() {
        let reader: &[u8] = &[];
        let stream = chunk_async(reader, &PipelineConfig::default()).unwrap();
        let chunks: Vec<_> = stream.collect().await;
        assert!(chunks.is_empty());
    }

    #[tokio::test]
    async fn test_chunk_stream_bounded() {
        let data: Vec<u8> = (0..1000).map(|i| (i % 256) as u8).collect();
        let reader: &[u8] = &data;
        let stream = chunk_async(reader, &PipelineConfig::new(64).unwrap()).unwrap();

        let chunks: Vec<Chunk> = stream
            .collect::<Vec<_>>()
            .await
            .into_iter()
            .collect::<Result<_, _>>()
            .unwrap();

        assert!(chunks.iter().all(|c| c.len() <= 64));
        let total: usize = chunks.iter().map(Chunk::len).sum();
        assert_eq!(total, data.len());
        assert_eq!(chunks.last().unwrap().end(), data.len() as u64);
    }

    #[test]
    fn test_chunk_stream_offsets_block_on() {
        let data = b"0123456789".to_vec();
        let reader: &[u8] = &data;
        let mut stream = chunk_async(reader, &PipelineConfig::new(3).unwrap()).unwrap();

        let offsets = tokio_test::block_on(async {
            let mut offsets = Vec::new();
            while let Some(chunk) = stream.next().await {
                offsets.push(chunk.unwrap().offset.unwrap());
            }
            offsets
        });

        assert_eq!(offsets, vec![0, 3, 6, 9]);
        assert_eq!(stream.offset(), 10);
    }

    #[test]
    fn test_chunk_stream_rejects_zero_chunk_size() {
        let reader: &[u8] = b"important data";
        let result = chunk_async(reader, &PipelineConfig::default().with_chunk_size(0));
        assert!(matches!(result, Err(PipelineError::InvalidConfig { .. })));
    }
}
