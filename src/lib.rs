//! chunkpipe
//!
//! Backpressure-aware chunked transform pipelines for Rust.
//!
//! `chunkpipe` moves bytes from a source, through zero or more transform
//! stages, into a sink:
//!
//! ```text
//! Source -> [Stage]* -> Sink
//! ```
//!
//! - sources read bounded chunks (files, any `Read`, any `AsyncRead`)
//! - stages transform one chunk at a time (ASCII uppercase, gzip, gunzip)
//! - sinks consume chunks (files, any `Write`, any `AsyncWrite`)
//!
//! The orchestrator pulls one chunk, pushes it through every stage, and waits
//! for the sink to accept it before pulling the next. At most one chunk is in
//! flight per stage boundary, so a slow sink never causes unbounded buffering.
//! The first error from any part ends the run; every handle is released on
//! every exit path.
//!
//! The crate intentionally:
//! - does NOT retry or resume
//! - does NOT remove partially written output after a failure
//! - does NOT spawn threads or tasks
//!
//! # Sync
//!
//! ```no_run
//! use chunkpipe::{FileSink, FileSource, GzipCompressor, Pipeline, PipelineConfig, PipelineError};
//!
//! fn main() -> Result<(), PipelineError> {
//!     let config = PipelineConfig::default();
//!     let source = FileSource::open("data.bin", &config)?;
//!     let sink = FileSink::create("data.bin.gz")?;
//!
//!     let report = Pipeline::new(source, sink)
//!         .with_stage(GzipCompressor::from_config(&config)?)
//!         .run()?;
//!     println!("{report}");
//!     Ok(())
//! }
//! ```
//!
//! # Async (feature = "async-io")
//!
//! ```ignore
//! use chunkpipe::{chunk_async, run_async, CancelToken, PipelineConfig, Stage, Uppercase};
//! use futures_io::{AsyncRead, AsyncWrite};
//!
//! async fn demo<R, W>(body: R, out: &mut W) -> Result<(), chunkpipe::PipelineError>
//! where
//!     R: AsyncRead,
//!     W: AsyncWrite + Unpin,
//! {
//!     let config = PipelineConfig::default();
//!     let stages: Vec<Box<dyn Stage>> = vec![Box::new(Uppercase)];
//!     run_async(chunk_async(body, &config)?, stages, out, &config, &CancelToken::new()).await?;
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod chunk;
mod config;
mod digest;
mod error;
mod ops;
mod pipeline;
mod sink;
mod source;
mod stage;

mod buffer; // internal (thread-local read buffers)

#[cfg(feature = "async-io")]
mod async_pipeline;

//
// Public surface
//

pub use chunk::Chunk;
pub use config::{DigestConfig, PipelineConfig};
pub use digest::ContentDigest;
pub use error::PipelineError;
pub use ops::{copy_file, gunzip_file, gzip_file, uppercase_file};
pub use pipeline::{CancelToken, Pipeline, PipelineReport, PipelineState};
pub use sink::{FileSink, Sink, WriterSink};
pub use source::{FileSource, IterSource, ReaderSource, Source};
pub use stage::{GzipCompressor, GzipDecompressor, Stage, Uppercase};

#[cfg(feature = "async-io")]
pub use async_pipeline::{ChunkStream, chunk_async, run_async};
