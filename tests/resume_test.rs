//! Suspension/resume equivalence: decoding with arbitrarily truncated
//! input windows and output buffers must produce byte-identical results to
//! a single large-buffer decode.

use flate2::write::DeflateEncoder;
use flate2::Compression;
use reflate::decompress::Decompressor;
use reflate::{Reader, Status, Writer};
use std::cmp::min;
use std::io::Write;

fn compress(data: &[u8]) -> Vec<u8> {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

fn sample_data(len: usize) -> Vec<u8> {
    // Repetitive enough for matches, varied enough for dynamic blocks.
    let phrase = b"the quick brown fox jumps over the lazy dog. ";
    let mut data = Vec::with_capacity(len);
    let mut i = 0usize;
    while data.len() < len {
        data.extend_from_slice(phrase);
        data.push((i % 251) as u8);
        i += 1;
    }
    data.truncate(len);
    data
}

/// Drives the decoder feeding at most `chunk_in` fresh input bytes and
/// draining through a `chunk_out`-sized output buffer per call.
fn decode_chunked(compressed: &[u8], chunk_in: usize, chunk_out: usize) -> Vec<u8> {
    let mut d = Decompressor::new();
    let mut out = Vec::new();
    let mut outbuf = vec![0u8; chunk_out];
    let mut consumed = 0;
    let mut fed = min(chunk_in, compressed.len());
    loop {
        let closed = fed == compressed.len();
        let mut src = Reader::new(&compressed[consumed..fed], closed);
        let mut dst = Writer::new(&mut outbuf);
        let status = d.decompress(&mut dst, &mut src).unwrap();
        consumed += src.pos();
        out.extend_from_slice(dst.written());
        match status {
            Status::Finished => return out,
            Status::ShortRead => {
                assert!(fed < compressed.len(), "decoder starved on complete input");
                fed = min(fed + chunk_in, compressed.len());
            }
            Status::ShortWrite => {}
        }
    }
}

#[test]
fn one_byte_input_matches_whole_input() {
    let data = sample_data(20_000);
    let compressed = compress(&data);
    assert!(compressed.len() > 4000);

    let whole = decode_chunked(&compressed, compressed.len(), data.len() + 64);
    assert_eq!(whole, data);

    let trickled = decode_chunked(&compressed, 1, data.len() + 64);
    assert_eq!(trickled, data);
}

#[test]
fn one_byte_output_matches_whole_output() {
    let data = sample_data(5_000);
    let compressed = compress(&data);

    let dripped = decode_chunked(&compressed, compressed.len(), 1);
    assert_eq!(dripped, data);
}

#[test]
fn tiny_windows_on_both_sides() {
    let data = sample_data(8_000);
    let compressed = compress(&data);

    assert_eq!(decode_chunked(&compressed, 3, 7), data);
    assert_eq!(decode_chunked(&compressed, 1, 1), data);
}

#[test]
fn split_at_every_input_boundary() {
    let data = sample_data(2_000);
    let compressed = compress(&data);

    for split in 0..=compressed.len() {
        let mut d = Decompressor::new();
        let mut out = Vec::new();
        let mut outbuf = vec![0u8; data.len() + 64];
        // First window is everything before the split; the rest arrives only
        // once the decoder reports it needs more. Unconsumed leftovers stay
        // in the buffer across the boundary.
        let mut buffer = compressed[..split].to_vec();
        let mut consumed = 0;
        let mut second_half_fed = false;
        loop {
            let mut src = Reader::new(&buffer[consumed..], second_half_fed);
            let mut dst = Writer::new(&mut outbuf);
            let status = d.decompress(&mut dst, &mut src).unwrap();
            consumed += src.pos();
            out.extend_from_slice(dst.written());
            match status {
                Status::Finished => break,
                Status::ShortRead => {
                    assert!(
                        !second_half_fed,
                        "decoder starved on complete input, split at {}",
                        split
                    );
                    buffer.extend_from_slice(&compressed[split..]);
                    second_half_fed = true;
                }
                Status::ShortWrite => {}
            }
        }
        assert_eq!(out, data, "mismatch when split at {}", split);
    }
}

#[test]
fn stored_blocks_survive_chunked_decode() {
    // Incompressible data forces stored blocks.
    let mut data = Vec::with_capacity(10_000);
    let mut x: u32 = 0x2545F491;
    for _ in 0..10_000 {
        // xorshift keeps the payload incompressible
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        data.push(x as u8);
    }
    let compressed = compress(&data);

    assert_eq!(decode_chunked(&compressed, 5, 11), data);
}

#[test]
fn decoder_instance_is_reusable_after_reset() {
    let data_a = sample_data(3_000);
    let data_b: Vec<u8> = (0..3_000u32).map(|i| (i * 7 % 256) as u8).collect();
    let ca = compress(&data_a);
    let cb = compress(&data_b);

    let mut d = Decompressor::new();
    let mut out = vec![0u8; 4096];

    let mut src = Reader::new(&ca, true);
    let mut dst = Writer::new(&mut out);
    assert_eq!(d.decompress(&mut dst, &mut src).unwrap(), Status::Finished);
    assert_eq!(dst.written(), &data_a[..]);

    d.reset();
    let mut src = Reader::new(&cb, true);
    let mut dst = Writer::new(&mut out);
    assert_eq!(d.decompress(&mut dst, &mut src).unwrap(), Status::Finished);
    assert_eq!(dst.written(), &data_b[..]);
}
