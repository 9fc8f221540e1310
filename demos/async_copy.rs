//! Async pipeline example.
//!
//! Several independent pipelines run concurrently on one runtime, each
//! uppercasing and compressing its own in-memory body. They share no state.
//!
//! Run with:
//!     cargo run --example async_copy --features async-io

use chunkpipe::{
    CancelToken, GzipCompressor, PipelineConfig, Stage, Uppercase, chunk_async, run_async,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let bodies: Vec<Vec<u8>> = (0..3)
        .map(|id| format!("body {id}: the quick brown fox\n").repeat(10_000).into_bytes())
        .collect();

    println!("Running {} pipelines concurrently...\n", bodies.len());

    let handles: Vec<_> = bodies
        .into_iter()
        .enumerate()
        .map(|(id, body)| {
            tokio::spawn(async move {
                let config = PipelineConfig::new(16 * 1024)?;
                let stages: Vec<Box<dyn Stage>> = vec![
                    Box::new(Uppercase),
                    Box::new(GzipCompressor::from_config(&config)?),
                ];
                let mut archive = Vec::new();
                let report = run_async(
                    chunk_async(&body[..], &config)?,
                    stages,
                    &mut archive,
                    &config,
                    &CancelToken::new(),
                )
                .await?;
                Ok::<_, chunkpipe::PipelineError>((id, report))
            })
        })
        .collect();

    for handle in handles {
        let (id, report) = handle.await??;
        println!("Pipeline {}: {}", id, report);
    }

    Ok(())
}
