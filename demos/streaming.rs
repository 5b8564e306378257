//! Drives the resumable engine with deliberately tiny input windows and
//! output buffers, printing every suspension.

use flate2::write::DeflateEncoder;
use flate2::Compression;
use reflate::decompress::Decompressor;
use reflate::{Reader, Status, Writer};
use std::io::Write;

fn main() {
    let text: String = "To be, or not to be, that is the question. ".repeat(40);
    let data = text.as_bytes();

    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::new(6));
    encoder.write_all(data).unwrap();
    let compressed = encoder.finish().unwrap();
    println!("{} bytes compressed to {}", data.len(), compressed.len());

    let mut decoder = Decompressor::new();
    let mut output = Vec::new();
    let mut window = [0u8; 32];
    let mut consumed = 0;
    let mut fed = 16.min(compressed.len());
    let mut calls = 0;
    let (mut short_reads, mut short_writes) = (0, 0);

    loop {
        let mut src = Reader::new(&compressed[consumed..fed], fed == compressed.len());
        let mut dst = Writer::new(&mut window);
        let status = decoder.decompress(&mut dst, &mut src).unwrap();
        consumed += src.pos();
        output.extend_from_slice(dst.written());
        calls += 1;
        match status {
            Status::Finished => break,
            Status::ShortRead => {
                short_reads += 1;
                fed = (fed + 16).min(compressed.len());
            }
            Status::ShortWrite => short_writes += 1,
        }
    }

    println!(
        "decoded {} bytes in {} calls ({} short reads, {} short writes)",
        output.len(),
        calls,
        short_reads,
        short_writes
    );
    assert_eq!(output, data);
    println!("output matches the original");
}
