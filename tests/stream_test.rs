use flate2::write::{DeflateEncoder, GzEncoder};
use flate2::Compression;
use reflate::stream::{DeflateDecoder, GzipDecoder};
use std::io::{Cursor, Read, Write};

fn sample_data(len: usize) -> Vec<u8> {
    let mut data = Vec::with_capacity(len);
    for i in 0..len {
        data.push((i % 256) as u8);
    }
    data
}

#[test]
fn test_stream_round_trip() {
    let data = sample_data(10000);

    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::new(6));
    encoder.write_all(&data).unwrap();
    let compressed = encoder.finish().unwrap();

    let mut decoder = DeflateDecoder::new(Cursor::new(compressed));
    let mut decompressed = Vec::new();
    decoder.read_to_end(&mut decompressed).unwrap();

    assert_eq!(data, decompressed);
}

#[test]
fn test_stream_small_chunks() {
    let data = sample_data(10000);

    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::new(6));
    encoder.write_all(&data).unwrap();
    let compressed = encoder.finish().unwrap();

    let mut decoder = DeflateDecoder::new(Cursor::new(compressed));
    let mut decompressed = Vec::new();
    let mut buf = [0u8; 10];
    loop {
        let n = decoder.read(&mut buf).unwrap();
        if n == 0 {
            break;
        }
        decompressed.extend_from_slice(&buf[..n]);
    }

    assert_eq!(data, decompressed);
}

/// Reader that returns a single byte per call, forcing constant refills.
struct OneByteReader<R: Read>(R);

impl<R: Read> Read for OneByteReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        self.0.read(&mut buf[..1])
    }
}

#[test]
fn test_stream_one_byte_source() {
    let data = sample_data(5000);

    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::new(6));
    encoder.write_all(&data).unwrap();
    let compressed = encoder.finish().unwrap();

    let mut decoder = DeflateDecoder::new(OneByteReader(Cursor::new(compressed)));
    let mut decompressed = Vec::new();
    decoder.read_to_end(&mut decompressed).unwrap();

    assert_eq!(data, decompressed);
}

#[test]
fn test_stream_truncated_input_errors() {
    let data = sample_data(5000);

    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::new(6));
    encoder.write_all(&data).unwrap();
    let mut compressed = encoder.finish().unwrap();
    compressed.truncate(compressed.len() / 2);

    let mut decoder = DeflateDecoder::new(Cursor::new(compressed));
    let mut decompressed = Vec::new();
    let err = decoder.read_to_end(&mut decompressed).unwrap_err();
    assert_eq!(err.kind(), std::io::ErrorKind::UnexpectedEof);
}

#[test]
fn test_gzip_stream_round_trip() {
    let data = sample_data(20000);

    let mut encoder = GzEncoder::new(Vec::new(), Compression::new(6));
    encoder.write_all(&data).unwrap();
    let compressed = encoder.finish().unwrap();

    let mut decoder = GzipDecoder::new(Cursor::new(compressed));
    let mut decompressed = Vec::new();
    decoder.read_to_end(&mut decompressed).unwrap();

    assert_eq!(data, decompressed);
}

#[test]
fn test_gzip_stream_corrupt_body_errors() {
    let data = sample_data(5000);

    let mut encoder = GzEncoder::new(Vec::new(), Compression::new(6));
    encoder.write_all(&data).unwrap();
    let mut compressed = encoder.finish().unwrap();
    let mid = compressed.len() / 2;
    compressed[mid] ^= 0xA5;

    let mut decoder = GzipDecoder::new(Cursor::new(compressed));
    let mut decompressed = Vec::new();
    // Corruption may surface as bad data or as a checksum mismatch,
    // depending on where the bit flip lands; either way it must error.
    assert!(decoder.read_to_end(&mut decompressed).is_err());
}
