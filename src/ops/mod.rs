//! File-to-file operations built on [`Pipeline`].
//!
//! Each operation opens the source, creates (or truncates) the destination,
//! runs one pipeline and syncs the destination on success. On failure the
//! destination may be left partially written; it is not removed.

use std::path::Path;

use tracing::info;

use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::pipeline::{Pipeline, PipelineReport};
use crate::sink::FileSink;
use crate::source::FileSource;
use crate::stage::{GzipCompressor, GzipDecompressor, Stage, Uppercase};

/// Copies `src` to `dst`, uppercasing ASCII letters.
///
/// # Example
///
/// ```no_run
/// use chunkpipe::{uppercase_file, PipelineConfig};
///
/// let report = uppercase_file("input.txt", "output.txt", &PipelineConfig::default())?;
/// println!("{report}");
/// # Ok::<(), chunkpipe::PipelineError>(())
/// ```
pub fn uppercase_file(
    src: impl AsRef<Path>,
    dst: impl AsRef<Path>,
    config: &PipelineConfig,
) -> Result<PipelineReport, PipelineError> {
    transfer(src.as_ref(), dst.as_ref(), config, Some(Box::new(Uppercase)))
}

/// Compresses `src` into the gzip archive `dst`.
pub fn gzip_file(
    src: impl AsRef<Path>,
    dst: impl AsRef<Path>,
    config: &PipelineConfig,
) -> Result<PipelineReport, PipelineError> {
    let stage = GzipCompressor::from_config(config)?;
    transfer(src.as_ref(), dst.as_ref(), config, Some(Box::new(stage)))
}

/// Restores the gzip archive `src` into `dst`.
pub fn gunzip_file(
    src: impl AsRef<Path>,
    dst: impl AsRef<Path>,
    config: &PipelineConfig,
) -> Result<PipelineReport, PipelineError> {
    let stage = GzipDecompressor::new();
    transfer(src.as_ref(), dst.as_ref(), config, Some(Box::new(stage)))
}

/// Copies `src` to `dst` unchanged.
pub fn copy_file(
    src: impl AsRef<Path>,
    dst: impl AsRef<Path>,
    config: &PipelineConfig,
) -> Result<PipelineReport, PipelineError> {
    transfer(src.as_ref(), dst.as_ref(), config, None)
}

fn transfer(
    src: &Path,
    dst: &Path,
    config: &PipelineConfig,
    stage: Option<Box<dyn Stage>>,
) -> Result<PipelineReport, PipelineError> {
    config.validate()?;

    let source = FileSource::open(src, config)?;
    let sink = FileSink::create(dst)?;

    let mut pipeline = Pipeline::new(source, sink).with_config(*config);
    if let Some(stage) = stage {
        pipeline = pipeline.with_boxed_stage(stage);
    }

    let report = pipeline.run()?;
    info!(
        src = %src.display(),
        dst = %dst.display(),
        bytes_read = report.bytes_read,
        bytes_written = report.bytes_written,
        "transfer finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_uppercase_file() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("in.txt");
        let dst = dir.path().join("out.txt");
        fs::write(&src, b"hello, world 42\n").unwrap();

        let report = uppercase_file(&src, &dst, &PipelineConfig::new(4).unwrap()).unwrap();

        assert_eq!(fs::read(&dst).unwrap(), b"HELLO, WORLD 42\n");
        assert_eq!(report.bytes_read, 16);
        assert_eq!(report.chunks_read, 4);
    }

    #[test]
    fn test_gzip_then_gunzip() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("data.bin");
        let archive = dir.path().join("data.bin.gz");
        let restored = dir.path().join("restored.bin");
        let data: Vec<u8> = (0..100_000u32).map(|i| (i % 251) as u8).collect();
        fs::write(&src, &data).unwrap();

        let config = PipelineConfig::default();
        gzip_file(&src, &archive, &config).unwrap();
        gunzip_file(&archive, &restored, &config).unwrap();

        assert_eq!(fs::read(&restored).unwrap(), data);
    }

    #[test]
    fn test_copy_file() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("a");
        let dst = dir.path().join("b");
        fs::write(&src, b"same bytes").unwrap();

        copy_file(&src, &dst, &PipelineConfig::default()).unwrap();
        assert_eq!(fs::read(&dst).unwrap(), b"same bytes");
    }

    #[test]
    fn test_missing_source_does_not_create_destination() {
        let dir = tempfile::tempdir().unwrap();
        let dst = dir.path().join("out.txt");

        let err = uppercase_file(dir.path().join("nope.txt"), &dst, &PipelineConfig::default())
            .unwrap_err();
        assert!(err.is_read());
        assert!(!dst.exists());
    }

    #[test]
    fn test_invalid_config_is_rejected_up_front() {
        let dir = tempfile::tempdir().unwrap();
        let config = PipelineConfig::default().with_compression_level(42);
        let err = gzip_file(dir.path().join("a"), dir.path().join("b"), &config).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidConfig { .. }));
    }
}
