#![no_main]

use std::io::Read;

use libfuzzer_sys::fuzz_target;
use chunkpipe::{GzipCompressor, GzipDecompressor, Pipeline, PipelineConfig, ReaderSource, WriterSink};

fuzz_target!(|data: Vec<u8>| {
    for (chunk_size, level) in [(1, 0), (4, 6), (4096, 9)] {
        let config = PipelineConfig::new(chunk_size)
            .unwrap()
            .with_compression_level(level);

        let mut archive = Vec::new();
        Pipeline::new(
            ReaderSource::new(std::io::Cursor::new(data.clone()), &config).unwrap(),
            WriterSink::new(&mut archive),
        )
        .with_stage(GzipCompressor::from_config(&config).unwrap())
        .run()
        .unwrap();

        // Verify: a reference decoder accepts the archive
        let mut reference = Vec::new();
        flate2::read::GzDecoder::new(&archive[..])
            .read_to_end(&mut reference)
            .unwrap();
        assert_eq!(reference, data);

        // Verify: our own decompressor restores it too
        let mut restored = Vec::new();
        Pipeline::new(
            ReaderSource::new(std::io::Cursor::new(archive), &config).unwrap(),
            WriterSink::new(&mut restored),
        )
        .with_stage(GzipDecompressor::new())
        .run()
        .unwrap();
        assert_eq!(restored, data);
    }
});
