//! Async pipelines.
//!
//! Runtime-agnostic counterparts of [`ReaderSource`](crate::ReaderSource)
//! and [`Pipeline::run`](crate::Pipeline::run) over `futures-io`, for byte
//! origins like an inbound request body and destinations like a response
//! body. Works with tokio (through `tokio_util::compat`), async-std, smol.
//!
//! - [`chunk_async`] - Bounded chunks from an `AsyncRead`
//! - [`run_async`] - Drives a chunk stream through stages into an `AsyncWrite`
//!
//! This module requires the `async-io` feature to be enabled.

mod run;
mod stream;

pub use run::run_async;
pub use stream::{ChunkStream, chunk_async};
