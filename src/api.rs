//! One-shot convenience wrappers over the resumable engine, for callers
//! that have the whole compressed payload and a size bound in hand.

use crate::decompress::Decompressor as InternalDecompressor;
use crate::error::{Error, Status};
use crate::gzip::GzipDecompressor;
use crate::io::{Reader, Writer};
use crate::zlib::ZlibDecompressor;

pub struct Decompressor {
    inner: InternalDecompressor,
}

impl Decompressor {
    pub fn new() -> Self {
        Self {
            inner: InternalDecompressor::new(),
        }
    }

    pub fn decompress_deflate(
        &mut self,
        data: &[u8],
        expected_size: usize,
    ) -> Result<Vec<u8>, Error> {
        let mut output = vec![0u8; expected_size];
        let size = self.decompress_deflate_into(data, &mut output)?;
        output.truncate(size);
        Ok(output)
    }

    pub fn decompress_deflate_into(&mut self, data: &[u8], output: &mut [u8]) -> Result<usize, Error> {
        self.inner.reset();
        let mut src = Reader::new(data, true);
        let mut dst = Writer::new(output);
        finish(self.inner.decompress(&mut dst, &mut src)?, dst.pos())
    }

    pub fn decompress_zlib(&mut self, data: &[u8], expected_size: usize) -> Result<Vec<u8>, Error> {
        let mut output = vec![0u8; expected_size];
        let size = self.decompress_zlib_into(data, &mut output)?;
        output.truncate(size);
        Ok(output)
    }

    pub fn decompress_zlib_into(&mut self, data: &[u8], output: &mut [u8]) -> Result<usize, Error> {
        let mut z = ZlibDecompressor::new();
        let mut src = Reader::new(data, true);
        let mut dst = Writer::new(output);
        finish(z.decompress(&mut dst, &mut src)?, dst.pos())
    }

    pub fn decompress_gzip(&mut self, data: &[u8], expected_size: usize) -> Result<Vec<u8>, Error> {
        let mut output = vec![0u8; expected_size];
        let size = self.decompress_gzip_into(data, &mut output)?;
        output.truncate(size);
        Ok(output)
    }

    pub fn decompress_gzip_into(&mut self, data: &[u8], output: &mut [u8]) -> Result<usize, Error> {
        let mut g = GzipDecompressor::new();
        let mut src = Reader::new(data, true);
        let mut dst = Writer::new(output);
        finish(g.decompress(&mut dst, &mut src)?, dst.pos())
    }
}

impl Default for Decompressor {
    fn default() -> Self {
        Self::new()
    }
}

fn finish(status: Status, size: usize) -> Result<usize, Error> {
    match status {
        Status::Finished => Ok(size),
        Status::ShortRead => Err(Error::TruncatedInput),
        Status::ShortWrite => Err(Error::InsufficientSpace),
    }
}
