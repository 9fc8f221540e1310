//! Internal read-buffer management.
//!
//! Sources read into a thread-local reusable scratch buffer so that pulling
//! a chunk does not allocate a fresh read buffer each time. It is an
//! implementation detail and not part of the public API.

mod pool;

pub(crate) use pool::ReadBuffer;
