//! `std::io::Read` adapters that drive the resumable decoders directly into
//! the caller's buffer: a full buffer is simply a short-write suspension.

use crate::decompress::Decompressor;
use crate::error::{Error, Status};
use crate::gzip::GzipDecompressor;
use crate::io::{Reader, Writer};
use std::io::{self, Read};

const INPUT_BUFFER_SIZE: usize = 32 * 1024;

pub struct DeflateDecoder<R: Read> {
    inner: R,
    decompressor: Decompressor,
    input_buffer: Vec<u8>,
    input_pos: usize,
    input_cap: usize,
    eof: bool,
    finished: bool,
}

impl<R: Read> DeflateDecoder<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            decompressor: Decompressor::new(),
            input_buffer: vec![0; INPUT_BUFFER_SIZE],
            input_pos: 0,
            input_cap: 0,
            eof: false,
            finished: false,
        }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    fn refill(&mut self) -> io::Result<()> {
        if self.input_pos > 0 {
            self.input_buffer.copy_within(self.input_pos..self.input_cap, 0);
            self.input_cap -= self.input_pos;
            self.input_pos = 0;
        }
        let n = self.inner.read(&mut self.input_buffer[self.input_cap..])?;
        self.input_cap += n;
        if n == 0 {
            self.eof = true;
        }
        Ok(())
    }
}

impl<R: Read> Read for DeflateDecoder<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.finished || buf.is_empty() {
            return Ok(0);
        }
        loop {
            let mut src = Reader::new(&self.input_buffer[self.input_pos..self.input_cap], self.eof);
            let mut dst = Writer::new(buf);
            let result = self.decompressor.decompress(&mut dst, &mut src);
            self.input_pos += src.pos();
            let produced = dst.pos();
            match result {
                Ok(Status::Finished) => {
                    self.finished = true;
                    return Ok(produced);
                }
                Ok(Status::ShortWrite) => return Ok(produced),
                Ok(Status::ShortRead) => {
                    if produced > 0 {
                        return Ok(produced);
                    }
                    if self.eof {
                        return Err(io::Error::new(
                            io::ErrorKind::UnexpectedEof,
                            "unexpected EOF in deflate stream",
                        ));
                    }
                    self.refill()?;
                }
                Err(e) => return Err(io::Error::new(io::ErrorKind::InvalidData, e.to_string())),
            }
        }
    }
}

pub struct GzipDecoder<R: Read> {
    inner: R,
    decompressor: GzipDecompressor,
    input_buffer: Vec<u8>,
    input_pos: usize,
    input_cap: usize,
    eof: bool,
    finished: bool,
}

impl<R: Read> GzipDecoder<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            decompressor: GzipDecompressor::new(),
            input_buffer: vec![0; INPUT_BUFFER_SIZE],
            input_pos: 0,
            input_cap: 0,
            eof: false,
            finished: false,
        }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    fn refill(&mut self) -> io::Result<()> {
        if self.input_pos > 0 {
            self.input_buffer.copy_within(self.input_pos..self.input_cap, 0);
            self.input_cap -= self.input_pos;
            self.input_pos = 0;
        }
        let n = self.inner.read(&mut self.input_buffer[self.input_cap..])?;
        self.input_cap += n;
        if n == 0 {
            self.eof = true;
        }
        Ok(())
    }
}

impl<R: Read> Read for GzipDecoder<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.finished || buf.is_empty() {
            return Ok(0);
        }
        loop {
            let mut src = Reader::new(&self.input_buffer[self.input_pos..self.input_cap], self.eof);
            let mut dst = Writer::new(buf);
            let result = self.decompressor.decompress(&mut dst, &mut src);
            self.input_pos += src.pos();
            let produced = dst.pos();
            match result {
                Ok(Status::Finished) => {
                    self.finished = true;
                    return Ok(produced);
                }
                Ok(Status::ShortWrite) => return Ok(produced),
                Ok(Status::ShortRead) => {
                    if produced > 0 {
                        return Ok(produced);
                    }
                    self.refill()?;
                }
                Err(Error::TruncatedInput) => {
                    return Err(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "unexpected EOF in gzip stream",
                    ));
                }
                Err(e) => return Err(io::Error::new(io::ErrorKind::InvalidData, e.to_string())),
            }
        }
    }
}
