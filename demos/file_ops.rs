//! File operations example.
//!
//! Run with:
//!     cargo run --example file_ops -- upper input.txt output.txt
//!     cargo run --example file_ops -- gzip input.txt input.txt.gz
//!     cargo run --example file_ops -- gunzip input.txt.gz restored.txt
//!
//! Set `RUST_LOG=chunkpipe=trace` to watch every chunk move.

use std::env;

use chunkpipe::{DigestConfig, PipelineConfig, copy_file, gunzip_file, gzip_file, uppercase_file};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let (op, src, dst) = match args.as_slice() {
        [op, src, dst] => (op.as_str(), src.as_str(), dst.as_str()),
        _ => {
            eprintln!("usage: file_ops <upper|gzip|gunzip|copy> <src> <dst>");
            std::process::exit(2);
        }
    };

    let config = PipelineConfig::default().with_digest_config(DigestConfig::enabled());

    let report = match op {
        "upper" => uppercase_file(src, dst, &config)?,
        "gzip" => gzip_file(src, dst, &config)?,
        "gunzip" => gunzip_file(src, dst, &config)?,
        "copy" => copy_file(src, dst, &config)?,
        other => {
            eprintln!("unknown operation: {}", other);
            std::process::exit(2);
        }
    };

    println!("{} -> {}: {}", src, dst, report);
    Ok(())
}
