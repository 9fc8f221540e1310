//! Chunk type.
//!
//! - [`Chunk`] - Bounded unit of bytes moving through a pipeline

mod data;

pub use data::Chunk;
