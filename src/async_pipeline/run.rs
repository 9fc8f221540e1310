//! Async orchestration.

use futures_core::Stream;
use futures_io::AsyncWrite;
use futures_util::{AsyncWriteExt, StreamExt, pin_mut};
use tracing::{debug, trace, warn};

use crate::chunk::Chunk;
use crate::config::PipelineConfig;
use crate::digest::OutputDigest;
use crate::error::PipelineError;
use crate::pipeline::{CancelToken, PipelineReport, apply_stages};
use crate::stage::Stage;

/// Drives `stream` through `stages` into `writer`.
///
/// Same contract as [`Pipeline::run`](crate::Pipeline::run): the next chunk
/// is not requested until `write_all` of the previous one completed, the
/// first error ends the run, and stages are finalized in order once the
/// stream ends. The writer is flushed and closed on success.
///
/// # Example
///
/// ```ignore
/// use chunkpipe::{chunk_async, run_async, CancelToken, PipelineConfig, Stage, Uppercase};
///
/// let config = PipelineConfig::default();
/// let stages: Vec<Box<dyn Stage>> = vec![Box::new(Uppercase)];
/// let mut out = Vec::new();
/// let report = run_async(
///     chunk_async(&b"abc"[..], &config)?,
///     stages,
///     &mut out,
///     &config,
///     &CancelToken::new(),
/// )
/// .await?;
/// ```
pub async fn run_async<St, W>(
    stream: St,
    mut stages: Vec<Box<dyn Stage>>,
    writer: &mut W,
    config: &PipelineConfig,
    cancel: &CancelToken,
) -> Result<PipelineReport, PipelineError>
where
    St: Stream<Item = Result<Chunk, PipelineError>>,
    W: AsyncWrite + Unpin + ?Sized,
{
    debug!(stages = stages.len(), "async pipeline started");

    let result = drive(stream, &mut stages, writer, config, cancel).await;
    drop(stages);

    match &result {
        Ok(report) => debug!(
            bytes_read = report.bytes_read,
            bytes_written = report.bytes_written,
            "async pipeline completed"
        ),
        Err(e) => warn!(error = %e, "async pipeline failed"),
    }
    result
}

async fn drive<St, W>(
    stream: St,
    stages: &mut [Box<dyn Stage>],
    writer: &mut W,
    config: &PipelineConfig,
    cancel: &CancelToken,
) -> Result<PipelineReport, PipelineError>
where
    St: Stream<Item = Result<Chunk, PipelineError>>,
    W: AsyncWrite + Unpin + ?Sized,
{
    config.validate()?;
    pin_mut!(stream);

    let mut digest = OutputDigest::new(config.digest_config());
    let mut report = PipelineReport::default();

    loop {
        if cancel.is_cancelled() {
            return Err(PipelineError::Cancelled);
        }

        let Some(chunk) = stream.next().await.transpose()? else {
            break;
        };
        report.chunks_read += 1;
        report.bytes_read += chunk.len() as u64;
        trace!(len = chunk.len(), offset = ?chunk.offset, "chunk pulled");

        if let Some(out) = apply_stages(stages, 0, chunk)? {
            deliver(writer, out, &mut digest, &mut report).await?;
        }
    }

    for i in 0..stages.len() {
        if let Some(tail) = stages[i].finalize()? {
            if let Some(out) = apply_stages(stages, i + 1, tail)? {
                deliver(writer, out, &mut digest, &mut report).await?;
            }
        }
    }

    writer.flush().await.map_err(PipelineError::write)?;
    writer.close().await.map_err(PipelineError::write)?;

    report.digest = digest.finish();
    Ok(report)
}

async fn deliver<W: AsyncWrite + Unpin + ?Sized>(
    writer: &mut W,
    chunk: Chunk,
    digest: &mut OutputDigest,
    report: &mut PipelineReport,
) -> Result<(), PipelineError> {
    if chunk.is_empty() {
        return Ok(());
    }

    digest.update(&chunk.data);
    report.chunks_written += 1;
    report.bytes_written += chunk.len() as u64;
    writer
        .write_all(&chunk.data)
        .await
        .map_err(PipelineError::write)
}
