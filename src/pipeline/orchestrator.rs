//! The pipeline orchestrator.
//!
//! One run is a strict pull loop:
//!
//! 1. pull one chunk from the source
//! 2. push it through each stage in order
//! 3. hand the result to the sink and wait for it to return
//!
//! and only then pull again. When the source is drained every stage is
//! finalized in order, each trailing chunk flowing through the stages
//! downstream of it, and the sink is closed.
//!
//! # Example
//!
//! ```
//! use chunkpipe::{IterSource, Pipeline, PipelineState, Uppercase, WriterSink};
//! use chunkpipe::Chunk;
//!
//! let source = IterSource::new(vec![Ok(Chunk::new(&b"abc123"[..]))]);
//! let mut pipeline = Pipeline::new(source, WriterSink::new(Vec::new()))
//!     .with_stage(Uppercase);
//!
//! let report = pipeline.run()?;
//! assert_eq!(pipeline.state(), PipelineState::Completed);
//! assert_eq!(report.bytes_written, 6);
//! # Ok::<(), chunkpipe::PipelineError>(())
//! ```

use tracing::{debug, trace, warn};

use crate::chunk::Chunk;
use crate::config::PipelineConfig;
use crate::digest::OutputDigest;
use crate::error::PipelineError;
use crate::sink::Sink;
use crate::source::Source;
use crate::stage::Stage;

use super::{CancelToken, PipelineReport, PipelineState};

/// Source, stages and sink of a pipeline that has not run yet.
struct Parts<S, K> {
    source: S,
    stages: Vec<Box<dyn Stage>>,
    sink: K,
}

/// A single-use chunked transform pipeline.
///
/// Owns its source, stages and sink. [`Pipeline::run`] consumes them: they
/// are dropped (closing files, discarding codec state) before `run`
/// returns, on success and on failure alike.
pub struct Pipeline<S, K> {
    parts: Option<Parts<S, K>>,
    config: PipelineConfig,
    cancel: CancelToken,
    state: PipelineState,
}

impl<S: Source, K: Sink> Pipeline<S, K> {
    /// Creates a pipeline with no stages.
    pub fn new(source: S, sink: K) -> Self {
        Self {
            parts: Some(Parts {
                source,
                stages: Vec::new(),
                sink,
            }),
            config: PipelineConfig::default(),
            cancel: CancelToken::new(),
            state: PipelineState::Idle,
        }
    }

    /// Appends a stage. Stages run in the order they were added.
    pub fn with_stage(mut self, stage: impl Stage + 'static) -> Self {
        if let Some(parts) = self.parts.as_mut() {
            parts.stages.push(Box::new(stage));
        }
        self
    }

    /// Appends an already boxed stage.
    pub fn with_boxed_stage(mut self, stage: Box<dyn Stage>) -> Self {
        if let Some(parts) = self.parts.as_mut() {
            parts.stages.push(stage);
        }
        self
    }

    /// Sets the run configuration.
    ///
    /// The pipeline only reads the digest setting from it, and validates it
    /// when the run starts. Chunk size and compression level are fixed when
    /// the source and stages are built (see [`ReaderSource::new`] and
    /// [`GzipCompressor::from_config`]), so pass the same config there.
    ///
    /// [`ReaderSource::new`]: crate::ReaderSource::new
    /// [`GzipCompressor::from_config`]: crate::GzipCompressor::from_config
    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    /// Attaches a cancellation token.
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    /// Returns the current state.
    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Returns the number of stages (0 once the pipeline has run).
    pub fn stage_count(&self) -> usize {
        self.parts.as_ref().map_or(0, |p| p.stages.len())
    }

    /// Runs the pipeline to completion or to its first error.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::AlreadyTerminated`] if the pipeline already ran;
    ///   the state is left unchanged
    /// - [`PipelineError::InvalidConfig`] if the configuration is invalid
    /// - the first [`PipelineError::Read`], [`PipelineError::Write`] or
    ///   [`PipelineError::Compression`] raised by the source, a stage or
    ///   the sink
    /// - [`PipelineError::Cancelled`] if the token was cancelled
    ///
    /// Every error except `AlreadyTerminated` leaves the pipeline `Failed`.
    pub fn run(&mut self) -> Result<PipelineReport, PipelineError> {
        let parts = match (self.state, self.parts.take()) {
            (PipelineState::Idle, Some(parts)) => parts,
            (state, _) => return Err(PipelineError::AlreadyTerminated { state }),
        };

        self.state = PipelineState::Running;
        debug!(stages = parts.stages.len(), "pipeline started");

        let result = self
            .config
            .validate()
            .and_then(|()| drive(parts, &self.config, &self.cancel));

        match &result {
            Ok(report) => {
                self.state = PipelineState::Completed;
                debug!(
                    chunks_read = report.chunks_read,
                    bytes_read = report.bytes_read,
                    chunks_written = report.chunks_written,
                    bytes_written = report.bytes_written,
                    "pipeline completed"
                );
            }
            Err(e) => {
                self.state = PipelineState::Failed;
                warn!(error = %e, "pipeline failed");
            }
        }

        result
    }
}

/// Moves every chunk from source to sink. `parts` is dropped on return,
/// whichever way it returns.
fn drive<S: Source, K: Sink>(
    mut parts: Parts<S, K>,
    config: &PipelineConfig,
    cancel: &CancelToken,
) -> Result<PipelineReport, PipelineError> {
    let mut run = Run {
        stages: &mut parts.stages,
        sink: &mut parts.sink,
        digest: OutputDigest::new(config.digest_config()),
        report: PipelineReport::default(),
    };

    loop {
        if cancel.is_cancelled() {
            return Err(PipelineError::Cancelled);
        }

        let Some(chunk) = parts.source.next_chunk()? else {
            break;
        };
        run.report.chunks_read += 1;
        run.report.bytes_read += chunk.len() as u64;
        trace!(len = chunk.len(), offset = ?chunk.offset, "chunk pulled");

        run.push_from(0, chunk)?;
    }

    run.finalize_stages()?;
    run.sink.close()?;

    let mut report = run.report;
    report.digest = run.digest.finish();
    Ok(report)
}

/// Runs `chunk` through `stages[first..]`, stopping early if a stage
/// holds it back.
pub(crate) fn apply_stages(
    stages: &mut [Box<dyn Stage>],
    first: usize,
    chunk: Chunk,
) -> Result<Option<Chunk>, PipelineError> {
    let mut current = Some(chunk);

    for stage in stages[first..].iter_mut() {
        let Some(chunk) = current.take() else {
            return Ok(None);
        };
        current = stage.process(chunk)?;
        trace!(
            stage = stage.name(),
            out = current.as_ref().map_or(0, Chunk::len),
            "stage processed"
        );
    }

    Ok(current)
}

/// Borrowed view of the downstream half of a pipeline during one run.
struct Run<'a, K> {
    stages: &'a mut [Box<dyn Stage>],
    sink: &'a mut K,
    digest: OutputDigest,
    report: PipelineReport,
}

impl<K: Sink> Run<'_, K> {
    /// Pushes `chunk` through `stages[first..]` and into the sink.
    fn push_from(&mut self, first: usize, chunk: Chunk) -> Result<(), PipelineError> {
        match apply_stages(self.stages, first, chunk)? {
            Some(chunk) => self.deliver(chunk),
            None => Ok(()),
        }
    }

    /// Finalizes each stage in order, flushing its tail downstream.
    fn finalize_stages(&mut self) -> Result<(), PipelineError> {
        for i in 0..self.stages.len() {
            if let Some(tail) = self.stages[i].finalize()? {
                trace!(stage = self.stages[i].name(), len = tail.len(), "stage finalized");
                self.push_from(i + 1, tail)?;
            }
        }
        Ok(())
    }

    /// Hands a chunk to the sink. Returns once the sink acknowledged it.
    fn deliver(&mut self, chunk: Chunk) -> Result<(), PipelineError> {
        if chunk.is_empty() {
            return Ok(());
        }

        self.digest.update(&chunk.data);
        self.report.chunks_written += 1;
        self.report.bytes_written += chunk.len() as u64;
        self.sink.write_chunk(chunk)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::IterSource;
    use crate::stage::{GzipCompressor, Uppercase};
    use std::io;

    fn source_of(parts: &[&'static str]) -> IterSource<std::vec::IntoIter<Result<Chunk, PipelineError>>> {
        IterSource::new(
            parts
                .iter()
                .map(|p| Ok(Chunk::new(*p)))
                .collect::<Vec<_>>(),
        )
    }

    #[test]
    fn test_empty_source_completes_with_no_writes() {
        let mut pipeline = Pipeline::new(source_of(&[]), Vec::<Chunk>::new()).with_stage(Uppercase);
        assert_eq!(pipeline.state(), PipelineState::Idle);

        let report = pipeline.run().unwrap();
        assert_eq!(pipeline.state(), PipelineState::Completed);
        assert_eq!(report, PipelineReport::default());
    }

    #[test]
    fn test_stages_apply_in_order() {
        let mut pipeline = Pipeline::new(source_of(&["ab", "c1"]), Vec::<Chunk>::new())
            .with_stage(Uppercase)
            .with_stage(GzipCompressor::new(6).unwrap());
        assert_eq!(pipeline.stage_count(), 2);

        let report = pipeline.run().unwrap();
        assert_eq!(report.chunks_read, 2);
        assert_eq!(report.bytes_read, 4);
        assert!(report.bytes_written > 0);
        assert_eq!(pipeline.stage_count(), 0);
    }

    #[test]
    fn test_second_run_is_rejected() {
        let mut pipeline = Pipeline::new(source_of(&["x"]), Vec::<Chunk>::new());
        pipeline.run().unwrap();

        let err = pipeline.run().unwrap_err();
        assert!(matches!(
            err,
            PipelineError::AlreadyTerminated {
                state: PipelineState::Completed
            }
        ));
        assert_eq!(pipeline.state(), PipelineState::Completed);
    }

    #[test]
    fn test_source_error_fails_pipeline() {
        let items = vec![
            Ok(Chunk::new(&b"ok"[..])),
            Err(PipelineError::read(io::Error::other("gone"))),
        ];
        let mut pipeline = Pipeline::new(IterSource::new(items), Vec::<Chunk>::new());

        assert!(pipeline.run().unwrap_err().is_read());
        assert_eq!(pipeline.state(), PipelineState::Failed);
    }

    #[test]
    fn test_invalid_config_fails_pipeline() {
        let mut pipeline = Pipeline::new(source_of(&["x"]), Vec::<Chunk>::new())
            .with_config(PipelineConfig::default().with_chunk_size(0));

        assert!(matches!(
            pipeline.run(),
            Err(PipelineError::InvalidConfig { .. })
        ));
        assert_eq!(pipeline.state(), PipelineState::Failed);
    }

    #[test]
    fn test_cancelled_before_start() {
        let token = CancelToken::new();
        token.cancel();
        let mut pipeline =
            Pipeline::new(source_of(&["x"]), Vec::<Chunk>::new()).with_cancel(token);

        assert!(pipeline.run().unwrap_err().is_cancelled());
        assert_eq!(pipeline.state(), PipelineState::Failed);
    }

    #[cfg(feature = "digest-blake3")]
    #[test]
    fn test_digest_covers_sink_bytes() {
        use crate::config::DigestConfig;
        use crate::digest::Blake3Digester;

        let config = PipelineConfig::default().with_digest_config(DigestConfig::enabled());
        let mut pipeline = Pipeline::new(source_of(&["hello ", "world"]), Vec::<Chunk>::new())
            .with_stage(Uppercase)
            .with_config(config);

        let report = pipeline.run().unwrap();
        assert_eq!(report.digest, Some(Blake3Digester::digest(b"HELLO WORLD")));
    }

    #[test]
    fn test_digest_disabled_by_default() {
        let mut pipeline = Pipeline::new(source_of(&["x"]), Vec::<Chunk>::new());
        assert!(pipeline.run().unwrap().digest.is_none());
    }
}
