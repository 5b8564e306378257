//! Streaming gzip (RFC 1952) decoding: member header with optional fields,
//! DEFLATE body, trailing CRC-32 + ISIZE.

use crate::common::*;
use crate::crc32::crc32;
use crate::decompress::Decompressor;
use crate::error::{Error, Status};
use crate::io::{Reader, Writer};
use std::cmp::min;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum GzipState {
    Header,
    ExtraLen,
    Extra { remaining: usize },
    Name,
    Comment,
    HeaderCrc,
    Body,
    Trailer,
    Done,
}

pub struct GzipDecompressor {
    inner: Decompressor,
    state: GzipState,
    flags: u8,
    crc: u32,
    isize_mod32: u32,
}

impl GzipDecompressor {
    pub fn new() -> Self {
        Self {
            inner: Decompressor::new(),
            state: GzipState::Header,
            flags: 0,
            crc: 0,
            isize_mod32: 0,
        }
    }

    pub fn reset(&mut self) {
        self.inner.reset();
        self.state = GzipState::Header;
        self.flags = 0;
        self.crc = 0;
        self.isize_mod32 = 0;
    }

    /// Resumable decode of one gzip member. A closed, exhausted input
    /// mid-stream is reported as `TruncatedInput` rather than a suspension.
    pub fn decompress(&mut self, dst: &mut Writer, src: &mut Reader) -> Result<Status, Error> {
        loop {
            match self.state {
                GzipState::Header => {
                    if src.available() < GZIP_MIN_HEADER_SIZE {
                        return short_read(src);
                    }
                    let b = src.bytes();
                    if b[0] != GZIP_ID1 || b[1] != GZIP_ID2 || b[2] != GZIP_CM_DEFLATE {
                        return Err(Error::BadGzipHeader);
                    }
                    let flg = b[3];
                    if flg & GZIP_FRESERVED != 0 {
                        return Err(Error::BadGzipHeader);
                    }
                    // MTIME, XFL, and OS carry no decoding information.
                    src.advance(GZIP_MIN_HEADER_SIZE);
                    self.flags = flg;
                    self.state = GzipState::ExtraLen;
                }

                GzipState::ExtraLen => {
                    if self.flags & GZIP_FEXTRA == 0 {
                        self.state = GzipState::Name;
                        continue;
                    }
                    if src.available() < 2 {
                        return short_read(src);
                    }
                    let b = src.bytes();
                    let xlen = u16::from_le_bytes([b[0], b[1]]) as usize;
                    src.advance(2);
                    self.state = GzipState::Extra { remaining: xlen };
                }

                GzipState::Extra { remaining } => {
                    let n = min(remaining, src.available());
                    src.advance(n);
                    if n < remaining {
                        self.state = GzipState::Extra {
                            remaining: remaining - n,
                        };
                        return short_read(src);
                    }
                    self.state = GzipState::Name;
                }

                GzipState::Name => {
                    if self.flags & GZIP_FNAME == 0 {
                        self.state = GzipState::Comment;
                        continue;
                    }
                    if !skip_zero_terminated(src) {
                        return short_read(src);
                    }
                    self.state = GzipState::Comment;
                }

                GzipState::Comment => {
                    if self.flags & GZIP_FCOMMENT == 0 {
                        self.state = GzipState::HeaderCrc;
                        continue;
                    }
                    if !skip_zero_terminated(src) {
                        return short_read(src);
                    }
                    self.state = GzipState::HeaderCrc;
                }

                GzipState::HeaderCrc => {
                    if self.flags & GZIP_FHCRC != 0 {
                        if src.available() < 2 {
                            return short_read(src);
                        }
                        src.advance(2);
                    }
                    self.state = GzipState::Body;
                }

                GzipState::Body => {
                    let mark = dst.pos();
                    let status = self.inner.decompress(dst, src)?;
                    let produced = &dst.written()[mark..];
                    self.crc = crc32(self.crc, produced);
                    self.isize_mod32 = self.isize_mod32.wrapping_add(produced.len() as u32);
                    match status {
                        Status::Finished => self.state = GzipState::Trailer,
                        Status::ShortRead => return short_read(src),
                        other => return Ok(other),
                    }
                }

                GzipState::Trailer => {
                    if src.available() < GZIP_FOOTER_SIZE {
                        return short_read(src);
                    }
                    let b = src.bytes();
                    let expected_crc = u32::from_le_bytes([b[0], b[1], b[2], b[3]]);
                    let expected_isize = u32::from_le_bytes([b[4], b[5], b[6], b[7]]);
                    src.advance(GZIP_FOOTER_SIZE);
                    if expected_crc != self.crc || expected_isize != self.isize_mod32 {
                        return Err(Error::BadChecksum);
                    }
                    self.state = GzipState::Done;
                }

                GzipState::Done => return Ok(Status::Finished),
            }
        }
    }

    pub fn is_finished(&self) -> bool {
        self.state == GzipState::Done
    }
}

impl Default for GzipDecompressor {
    fn default() -> Self {
        Self::new()
    }
}

/// Consumes bytes through the terminating NUL. Returns false if the
/// terminator has not arrived yet (everything available was consumed).
fn skip_zero_terminated(src: &mut Reader) -> bool {
    let b = src.bytes();
    match b.iter().position(|&x| x == 0) {
        Some(i) => {
            src.advance(i + 1);
            true
        }
        None => {
            src.advance(b.len());
            false
        }
    }
}

fn short_read(src: &Reader<'_>) -> Result<Status, Error> {
    if src.is_closed() {
        Err(Error::TruncatedInput)
    } else {
        Ok(Status::ShortRead)
    }
}
