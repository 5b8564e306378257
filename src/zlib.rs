//! Streaming zlib (RFC 1950) decoding: header validation, optional preset
//! dictionary, DEFLATE body, trailing Adler-32.

use crate::adler32::adler32;
use crate::common::*;
use crate::decompress::Decompressor;
use crate::error::{Error, Status};
use crate::io::{Reader, Writer};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ZlibState {
    Header,
    DictId,
    Body,
    Trailer,
    Done,
}

pub struct ZlibDecompressor {
    inner: Decompressor,
    state: ZlibState,
    adler: u32,
    dict_adler: u32,
    have_dictionary: bool,
}

impl ZlibDecompressor {
    pub fn new() -> Self {
        Self {
            inner: Decompressor::new(),
            state: ZlibState::Header,
            adler: 1,
            dict_adler: 0,
            have_dictionary: false,
        }
    }

    pub fn reset(&mut self) {
        self.inner.reset();
        self.state = ZlibState::Header;
        self.adler = 1;
        self.dict_adler = 0;
        self.have_dictionary = false;
    }

    /// Supplies the preset dictionary a stream with FDICT set was compressed
    /// against. Seeds the engine's history window; the header's DICTID is
    /// checked against this dictionary's Adler-32.
    pub fn set_dictionary(&mut self, dict: &[u8]) {
        self.inner.add_history(dict);
        self.dict_adler = adler32(1, dict);
        self.have_dictionary = true;
    }

    /// Resumable decode with the same short-read/short-write discipline as
    /// the raw engine. A closed, exhausted input mid-stream is reported as
    /// `TruncatedInput` rather than a suspension.
    pub fn decompress(&mut self, dst: &mut Writer, src: &mut Reader) -> Result<Status, Error> {
        loop {
            match self.state {
                ZlibState::Header => {
                    if src.available() < ZLIB_MIN_HEADER_SIZE {
                        return short_read(src);
                    }
                    let b = src.bytes();
                    let hdr = u16::from_be_bytes([b[0], b[1]]);
                    if hdr % 31 != 0 {
                        return Err(Error::BadZlibHeader);
                    }
                    if ((hdr >> 8) & 0xF) as u8 != ZLIB_CM_DEFLATE {
                        return Err(Error::BadZlibHeader);
                    }
                    if ((hdr >> 12) & 0xF) as u8 > ZLIB_CINFO_32K_WINDOW {
                        return Err(Error::BadZlibHeader);
                    }
                    let fdict = b[1] & ZLIB_FLG_FDICT != 0;
                    src.advance(2);
                    self.state = if fdict {
                        ZlibState::DictId
                    } else {
                        ZlibState::Body
                    };
                }

                ZlibState::DictId => {
                    if src.available() < 4 {
                        return short_read(src);
                    }
                    let b = src.bytes();
                    let dictid = u32::from_be_bytes([b[0], b[1], b[2], b[3]]);
                    src.advance(4);
                    if !self.have_dictionary {
                        return Err(Error::MissingDictionary);
                    }
                    if dictid != self.dict_adler {
                        return Err(Error::BadChecksum);
                    }
                    self.state = ZlibState::Body;
                }

                ZlibState::Body => {
                    let mark = dst.pos();
                    let status = self.inner.decompress(dst, src)?;
                    self.adler = adler32(self.adler, &dst.written()[mark..]);
                    match status {
                        Status::Finished => self.state = ZlibState::Trailer,
                        Status::ShortRead => return short_read(src),
                        other => return Ok(other),
                    }
                }

                ZlibState::Trailer => {
                    if src.available() < ZLIB_FOOTER_SIZE {
                        return short_read(src);
                    }
                    let b = src.bytes();
                    let expected = u32::from_be_bytes([b[0], b[1], b[2], b[3]]);
                    src.advance(ZLIB_FOOTER_SIZE);
                    if expected != self.adler {
                        return Err(Error::BadChecksum);
                    }
                    self.state = ZlibState::Done;
                }

                ZlibState::Done => return Ok(Status::Finished),
            }
        }
    }

    pub fn is_finished(&self) -> bool {
        self.state == ZlibState::Done
    }
}

impl Default for ZlibDecompressor {
    fn default() -> Self {
        Self::new()
    }
}

fn short_read(src: &Reader<'_>) -> Result<Status, Error> {
    if src.is_closed() {
        Err(Error::TruncatedInput)
    } else {
        Ok(Status::ShortRead)
    }
}
