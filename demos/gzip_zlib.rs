//! One-shot decoding of zlib and gzip containers.

use flate2::write::{GzEncoder, ZlibEncoder};
use flate2::Compression;
use reflate::Decompressor;
use std::io::Write;

fn main() {
    let data = b"A man who carries a cat by the tail learns something he can \
learn in no other way. "
        .repeat(20);

    let mut e = ZlibEncoder::new(Vec::new(), Compression::new(9));
    e.write_all(&data).unwrap();
    let zlib_stream = e.finish().unwrap();

    let mut e = GzEncoder::new(Vec::new(), Compression::new(9));
    e.write_all(&data).unwrap();
    let gzip_stream = e.finish().unwrap();

    let mut d = Decompressor::new();

    let out = d.decompress_zlib(&zlib_stream, data.len()).unwrap();
    println!("zlib: {} -> {} bytes, checksum ok", zlib_stream.len(), out.len());
    assert_eq!(out, data);

    let out = d.decompress_gzip(&gzip_stream, data.len()).unwrap();
    println!("gzip: {} -> {} bytes, checksum ok", gzip_stream.len(), out.len());
    assert_eq!(out, data);
}
