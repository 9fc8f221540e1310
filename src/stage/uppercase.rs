//! ASCII uppercasing stage.

use bytes::{Bytes, BytesMut};

use crate::chunk::Chunk;
use crate::error::PipelineError;

use super::Stage;

/// Maps ASCII `a..=z` to `A..=Z` and passes every other byte through.
///
/// Output always has the input's length and offset. Chunks without a
/// lowercase letter are passed on without copying.
///
/// # Example
///
/// ```
/// use chunkpipe::{Chunk, Stage, Uppercase};
///
/// let out = Uppercase.process(Chunk::new(&b"abc123"[..]))?.unwrap();
/// assert_eq!(&out.data[..], b"ABC123");
/// # Ok::<(), chunkpipe::PipelineError>(())
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Uppercase;

impl Uppercase {
    /// Uppercases a byte slice into a new buffer.
    pub fn apply(data: &[u8]) -> Bytes {
        let mut out = BytesMut::from(data);
        out.make_ascii_uppercase();
        out.freeze()
    }
}

impl Stage for Uppercase {
    fn name(&self) -> &'static str {
        "uppercase"
    }

    fn process(&mut self, chunk: Chunk) -> Result<Option<Chunk>, PipelineError> {
        if !chunk.data.iter().any(u8::is_ascii_lowercase) {
            return Ok(Some(chunk));
        }

        Ok(Some(Chunk {
            data: Self::apply(&chunk.data),
            offset: chunk.offset,
        }))
    }
}
