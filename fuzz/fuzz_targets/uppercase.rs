#![no_main]

use libfuzzer_sys::fuzz_target;
use chunkpipe::{Chunk, IterSource, Pipeline, PipelineConfig, ReaderSource, Uppercase, WriterSink};

fuzz_target!(|data: Vec<u8>| {
    // Chunk size taken from the first byte so boundaries vary
    let chunk_size = data.first().map_or(1, |&b| b as usize + 1);
    let config = PipelineConfig::new(chunk_size).unwrap();

    let source = ReaderSource::new(std::io::Cursor::new(data.clone()), &config).unwrap();
    let mut out = Vec::new();
    Pipeline::new(source, WriterSink::new(&mut out))
        .with_stage(Uppercase)
        .run()
        .unwrap();

    // Verify: same length, only ASCII lowercase letters changed
    assert_eq!(out.len(), data.len());
    assert_eq!(out, data.to_ascii_uppercase());

    // Verify: chunking does not matter
    let mut whole = Vec::new();
    Pipeline::new(IterSource::new(vec![Ok(Chunk::new(data.clone()))]), WriterSink::new(&mut whole))
        .with_stage(Uppercase)
        .run()
        .unwrap();
    assert_eq!(whole, out);
});
