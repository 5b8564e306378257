//! The resumable DEFLATE decoding engine.
//!
//! The decoder is a bit-oriented state machine over caller-owned cursors.
//! Every routine can suspend when input runs dry or output fills up: it
//! records a resume point plus any live locals in [`DecoderState`], returns
//! [`Status::ShortRead`] or [`Status::ShortWrite`], and continues from the
//! exact logical bit position on the next call. No heap allocation happens
//! during decoding; the bit accumulator, Huffman tables, 32 KiB history
//! window, and all resume state are fixed-size fields of [`Decompressor`].

mod history;
mod huffman;

use self::history::HistoryWindow;
use self::huffman::*;
use crate::common::*;
use crate::error::{Error, Status};
use crate::io::{Reader, Writer};
use std::cmp::min;

pub use self::huffman::{
    LITLEN_ENOUGH, LITLEN_TABLEBITS, OFFSET_ENOUGH, OFFSET_TABLEBITS, PRECODE_ENOUGH,
    PRECODE_TABLEBITS,
};

/// Scratch buffer length required by [`Decompressor::decompress_with_workbuf`].
/// The engine never allocates, so this is a fixed interface constant.
pub const DECOMPRESSOR_WORKBUF_LEN: usize = 1;

macro_rules! refill_bits {
    ($src:expr, $bitbuf:expr, $bitsleft:expr) => {
        if $bitsleft < 32 {
            let buf = $src.bytes();
            if buf.len() >= 8 {
                let word = u64::from_le_bytes(buf[..8].try_into().unwrap());
                $bitbuf |= word << $bitsleft;
                let consumed = ((63 - $bitsleft) >> 3) as usize;
                $src.advance(consumed);
                $bitsleft |= 56;
            } else {
                let mut i = 0;
                while $bitsleft < 32 && i < buf.len() {
                    $bitbuf |= (buf[i] as u64) << $bitsleft;
                    i += 1;
                    $bitsleft += 8;
                }
                $src.advance(i);
            }
        }
    };
}

/// Resume points. A suspended routine stores its live locals in the variant
/// payload; re-entry dispatches straight to the saved point.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecoderState {
    /// About to read a 3-bit block header.
    BlockHeader,
    /// Aligning to a byte boundary and reading a stored block's LEN/NLEN.
    StoredHeader,
    /// Copying a stored block's raw bytes.
    StoredBody { remaining: usize },
    /// Reading HLIT/HDIST/HCLEN of a dynamic block.
    DynamicCounts,
    /// Reading the code-length alphabet's own lengths.
    DynamicPrecodeLens { index: usize },
    /// Decoding the literal/length + distance length arrays.
    DynamicLens { index: usize },
    /// Decoding symbols inside a Huffman block.
    BlockBody,
    /// A length was decoded; awaiting the distance code.
    BlockBodyOffset { length: usize },
    /// Mid back-reference copy, awaiting output space.
    Copy { remaining: usize, distance: usize },
    /// Final block fully decoded.
    Done,
}

pub struct Decompressor {
    precode_table: [u32; PRECODE_ENOUGH],
    litlen_table: [u32; LITLEN_ENOUGH],
    offset_table: [u32; OFFSET_ENOUGH],

    precode_lens: [u8; DEFLATE_NUM_PRECODE_SYMS],
    lens: [u8; DEFLATE_NUM_LITLEN_SYMS + DEFLATE_NUM_OFFSET_SYMS],
    sorted_syms: [u16; DEFLATE_MAX_NUM_SYMS],

    litlen_tablebits: usize,
    static_codes_loaded: bool,

    num_litlen_syms: usize,
    num_offset_syms: usize,
    num_precode_syms: usize,

    bitbuf: u64,
    bitsleft: u32,
    state: DecoderState,
    final_block: bool,

    history: HistoryWindow,
    out_mark: usize,

    disabled: bool,
    active: bool,
}

struct StaticHuffmanData {
    litlen_table: [u32; LITLEN_ENOUGH],
    offset_table: [u32; OFFSET_ENOUGH],
    litlen_tablebits: usize,
}

static STATIC_HUFFMAN_DATA: std::sync::OnceLock<StaticHuffmanData> = std::sync::OnceLock::new();

impl Decompressor {
    pub fn new() -> Self {
        Self {
            precode_table: [0; PRECODE_ENOUGH],
            litlen_table: [0; LITLEN_ENOUGH],
            offset_table: [0; OFFSET_ENOUGH],
            precode_lens: [0; DEFLATE_NUM_PRECODE_SYMS],
            lens: [0; DEFLATE_NUM_LITLEN_SYMS + DEFLATE_NUM_OFFSET_SYMS],
            sorted_syms: [0; DEFLATE_MAX_NUM_SYMS],
            litlen_tablebits: LITLEN_TABLEBITS,
            static_codes_loaded: false,
            num_litlen_syms: 0,
            num_offset_syms: 0,
            num_precode_syms: 0,
            bitbuf: 0,
            bitsleft: 0,
            state: DecoderState::BlockHeader,
            final_block: false,
            history: HistoryWindow::new(),
            out_mark: 0,
            disabled: false,
            active: false,
        }
    }

    /// Restores a fresh instance, clearing any error, resume state, and
    /// history. Cheaper than constructing anew only in intent; reuse is the
    /// point.
    pub fn reset(&mut self) {
        self.litlen_tablebits = LITLEN_TABLEBITS;
        self.static_codes_loaded = false;
        self.bitbuf = 0;
        self.bitsleft = 0;
        self.state = DecoderState::BlockHeader;
        self.final_block = false;
        self.history.reset();
        self.out_mark = 0;
        self.disabled = false;
        self.active = false;
    }

    /// Current resume point, primarily for diagnostics and tests.
    pub fn state(&self) -> DecoderState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state == DecoderState::Done
    }

    /// Minimum and maximum scratch buffer lengths accepted by
    /// [`Self::decompress_with_workbuf`].
    pub const fn workbuf_len() -> (usize, usize) {
        (DECOMPRESSOR_WORKBUF_LEN, DECOMPRESSOR_WORKBUF_LEN)
    }

    /// Seeds the history window, e.g. with a zlib preset dictionary. Must be
    /// called before decoding starts; seeded bytes count as produced output
    /// for distance validation.
    pub fn add_history(&mut self, bytes: &[u8]) {
        self.history.append(bytes);
    }

    /// Decodes as much as the cursors allow. Returns `Finished` once the
    /// final block's end-of-block symbol has been consumed, or a resumable
    /// suspension status. Terminal errors disable the instance.
    pub fn decompress(&mut self, dst: &mut Writer, src: &mut Reader) -> Result<Status, Error> {
        let mut workbuf = [0u8; DECOMPRESSOR_WORKBUF_LEN];
        self.decompress_with_workbuf(dst, src, &mut workbuf)
    }

    /// As [`Self::decompress`], with an explicit scratch buffer of at least
    /// [`DECOMPRESSOR_WORKBUF_LEN`] bytes.
    pub fn decompress_with_workbuf(
        &mut self,
        dst: &mut Writer,
        src: &mut Reader,
        workbuf: &mut [u8],
    ) -> Result<Status, Error> {
        if workbuf.len() < DECOMPRESSOR_WORKBUF_LEN {
            return Err(Error::BadWorkbufLength);
        }
        if self.disabled {
            return Err(Error::Disabled);
        }
        if self.active {
            return Err(Error::InterleavedCalls);
        }
        if self.bitsleft >= 8 {
            // Whole unconsumed bytes are handed back before every return;
            // seeing them here means the saved state is corrupt.
            self.disabled = true;
            return Err(Error::InconsistentBitCount);
        }
        self.active = true;
        self.out_mark = dst.pos();

        let result = self.decode_blocks(dst, src);

        // Hand back whole bytes the accumulator holds beyond the last
        // consumed bit, so byte-aligned readers (and the caller's position
        // accounting) are exact.
        while self.bitsleft >= 8 {
            src.unread(1);
            self.bitsleft -= 8;
        }
        self.bitbuf &= (1u64 << self.bitsleft) - 1;

        // Everything written this call becomes reachable history.
        self.history.append(&dst.written()[self.out_mark..]);

        self.active = false;
        if result.is_err() {
            self.disabled = true;
        }
        result
    }

    fn decode_blocks(&mut self, dst: &mut Writer, src: &mut Reader) -> Result<Status, Error> {
        loop {
            match self.state {
                DecoderState::BlockHeader => {
                    refill_bits!(src, self.bitbuf, self.bitsleft);
                    if self.bitsleft < 3 {
                        return Ok(Status::ShortRead);
                    }
                    self.final_block = (self.bitbuf & 1) != 0;
                    let block_type = ((self.bitbuf >> 1) & 3) as u8;
                    self.bitbuf >>= 3;
                    self.bitsleft -= 3;
                    match block_type {
                        DEFLATE_BLOCKTYPE_UNCOMPRESSED => {
                            self.state = DecoderState::StoredHeader;
                        }
                        DEFLATE_BLOCKTYPE_STATIC_HUFFMAN => {
                            self.load_static_huffman_codes();
                            self.state = DecoderState::BlockBody;
                        }
                        DEFLATE_BLOCKTYPE_DYNAMIC_HUFFMAN => {
                            self.state = DecoderState::DynamicCounts;
                        }
                        _ => return Err(Error::BadBlockType),
                    }
                }

                DecoderState::StoredHeader => {
                    // Discard bits up to the byte boundary, then hand whole
                    // buffered bytes back so LEN/NLEN reads byte-aligned.
                    let skip = self.bitsleft & 7;
                    self.bitbuf >>= skip;
                    self.bitsleft -= skip;
                    while self.bitsleft >= 8 {
                        src.unread(1);
                        self.bitsleft -= 8;
                    }
                    self.bitbuf = 0;
                    if src.available() < 4 {
                        return Ok(Status::ShortRead);
                    }
                    let b = src.bytes();
                    let len = u16::from_le_bytes([b[0], b[1]]) as usize;
                    let nlen = u16::from_le_bytes([b[2], b[3]]) as usize;
                    src.advance(4);
                    if len != (!nlen & 0xFFFF) {
                        return Err(Error::BadStoredBlockLength);
                    }
                    self.state = DecoderState::StoredBody { remaining: len };
                }

                DecoderState::StoredBody { remaining } => {
                    let n = min(remaining, min(src.available(), dst.available()));
                    if n > 0 {
                        {
                            let (buf, pos) = dst.parts_mut();
                            buf[pos..pos + n].copy_from_slice(&src.bytes()[..n]);
                        }
                        dst.advance(n);
                        src.advance(n);
                    }
                    let left = remaining - n;
                    if left > 0 {
                        self.state = DecoderState::StoredBody { remaining: left };
                        return Ok(if dst.available() == 0 {
                            Status::ShortWrite
                        } else {
                            Status::ShortRead
                        });
                    }
                    self.state = if self.final_block {
                        DecoderState::Done
                    } else {
                        DecoderState::BlockHeader
                    };
                }

                DecoderState::DynamicCounts => {
                    refill_bits!(src, self.bitbuf, self.bitsleft);
                    if self.bitsleft < 14 {
                        return Ok(Status::ShortRead);
                    }
                    let num_litlen_syms = 257 + (self.bitbuf & 0x1F) as usize;
                    let num_offset_syms = 1 + ((self.bitbuf >> 5) & 0x1F) as usize;
                    let num_precode_syms = 4 + ((self.bitbuf >> 10) & 0xF) as usize;
                    if num_litlen_syms > 286 || num_offset_syms > 30 {
                        return Err(Error::BadCodeLengthCount);
                    }
                    self.bitbuf >>= 14;
                    self.bitsleft -= 14;
                    self.num_litlen_syms = num_litlen_syms;
                    self.num_offset_syms = num_offset_syms;
                    self.num_precode_syms = num_precode_syms;
                    self.state = DecoderState::DynamicPrecodeLens { index: 0 };
                }

                DecoderState::DynamicPrecodeLens { index } => {
                    let mut index = index;
                    while index < self.num_precode_syms {
                        refill_bits!(src, self.bitbuf, self.bitsleft);
                        if self.bitsleft < 3 {
                            self.state = DecoderState::DynamicPrecodeLens { index };
                            return Ok(Status::ShortRead);
                        }
                        let sym = PRECODE_LENS_PERMUTATION[index] as usize;
                        self.precode_lens[sym] = (self.bitbuf & 7) as u8;
                        self.bitbuf >>= 3;
                        self.bitsleft -= 3;
                        index += 1;
                    }
                    for i in self.num_precode_syms..DEFLATE_NUM_PRECODE_SYMS {
                        self.precode_lens[PRECODE_LENS_PERMUTATION[i] as usize] = 0;
                    }
                    self.build_precode_decode_table()?;
                    self.state = DecoderState::DynamicLens { index: 0 };
                }

                DecoderState::DynamicLens { index } => {
                    self.decode_dynamic_lens(src, index)?;
                    if let DecoderState::DynamicLens { .. } = self.state {
                        return Ok(Status::ShortRead);
                    }
                }

                DecoderState::BlockBody
                | DecoderState::BlockBodyOffset { .. }
                | DecoderState::Copy { .. } => {
                    if let Some(status) = self.decode_huffman(dst, src)? {
                        return Ok(status);
                    }
                    self.state = if self.final_block {
                        DecoderState::Done
                    } else {
                        DecoderState::BlockHeader
                    };
                }

                DecoderState::Done => return Ok(Status::Finished),
            }
        }
    }

    /// Decodes the literal/length and distance code-length arrays via the
    /// code-length alphabet, honoring the run-length escapes. On short input
    /// the state keeps `DynamicLens { index }`; on completion it moves to
    /// `BlockBody` with both decode tables built.
    fn decode_dynamic_lens(&mut self, src: &mut Reader, start: usize) -> Result<(), Error> {
        let total_syms = self.num_litlen_syms + self.num_offset_syms;
        let mut i = start;
        while i < total_syms {
            refill_bits!(src, self.bitbuf, self.bitsleft);
            let entry =
                self.precode_table[(self.bitbuf & ((1 << PRECODE_TABLEBITS) - 1)) as usize];
            let len = entry & 0xFF;
            let presym = (entry >> 16) as usize;
            let extra = match presym {
                16 => 2,
                17 => 3,
                18 => 7,
                _ => 0,
            };
            if self.bitsleft < len + extra {
                self.state = DecoderState::DynamicLens { index: i };
                return Ok(());
            }
            self.bitbuf >>= len;
            self.bitsleft -= len;

            if presym < 16 {
                self.lens[i] = presym as u8;
                i += 1;
                continue;
            }

            let count = match presym {
                16 => {
                    let c = 3 + (self.bitbuf & 3) as usize;
                    self.bitbuf >>= 2;
                    self.bitsleft -= 2;
                    c
                }
                17 => {
                    let c = 3 + (self.bitbuf & 7) as usize;
                    self.bitbuf >>= 3;
                    self.bitsleft -= 3;
                    c
                }
                _ => {
                    let c = 11 + (self.bitbuf & 0x7F) as usize;
                    self.bitbuf >>= 7;
                    self.bitsleft -= 7;
                    c
                }
            };
            if i + count > total_syms {
                return Err(Error::BadCodeLengthRepetition);
            }
            let fill = if presym == 16 {
                if i == 0 {
                    return Err(Error::BadCodeLengthRepetition);
                }
                self.lens[i - 1]
            } else {
                0
            };
            for _ in 0..count {
                self.lens[i] = fill;
                i += 1;
            }
        }

        if self.lens[DEFLATE_END_OF_BLOCK] == 0 {
            return Err(Error::MissingEndOfBlock);
        }
        self.build_offset_decode_table()?;
        self.build_litlen_decode_table()?;
        self.static_codes_loaded = false;
        self.state = DecoderState::BlockBody;
        Ok(())
    }

    /// Symbol decode loop: runs the unchecked fast variant while slack
    /// allows, then single checked symbols. Returns `Ok(None)` when the
    /// block's end-of-block symbol has been consumed.
    fn decode_huffman(
        &mut self,
        dst: &mut Writer,
        src: &mut Reader,
    ) -> Result<Option<Status>, Error> {
        loop {
            match self.state {
                DecoderState::BlockBody => {}
                DecoderState::BlockBodyOffset { length } => {
                    if let Some(status) = self.decode_offset_and_copy(dst, src, length)? {
                        return Ok(Some(status));
                    }
                    continue;
                }
                DecoderState::Copy {
                    remaining,
                    distance,
                } => {
                    if let Some(status) = self.run_copy(dst, remaining, distance)? {
                        return Ok(Some(status));
                    }
                    continue;
                }
                _ => return Err(Error::InconsistentDecoderState),
            }

            self.decode_huffman_fast(dst, src)?;

            let litlen_mask = (1usize << self.litlen_tablebits) - 1;
            refill_bits!(src, self.bitbuf, self.bitsleft);
            let mut entry = self.litlen_table[(self.bitbuf as usize) & litlen_mask];
            let mut pre_bits = 0u32;
            if entry & HUFFDEC_EXCEPTIONAL != 0 && entry & HUFFDEC_SUBTABLE_POINTER != 0 {
                let main_bits = entry & 0xFF;
                let sub_bits = (entry >> 8) & 0xF;
                let sub = self.litlen_table[((entry >> 16) as usize)
                    + (((self.bitbuf >> main_bits) as usize) & ((1usize << sub_bits) - 1))];
                if self.bitsleft < main_bits + (sub & 0xFF) {
                    return Ok(Some(Status::ShortRead));
                }
                pre_bits = main_bits;
                entry = sub;
            }
            let total = entry & 0xFF;
            if self.bitsleft < pre_bits + total {
                return Ok(Some(Status::ShortRead));
            }

            if entry & HUFFDEC_EXCEPTIONAL != 0 {
                if entry & HUFFDEC_END_OF_BLOCK != 0 {
                    self.bitbuf >>= pre_bits + total;
                    self.bitsleft -= pre_bits + total;
                    return Ok(None);
                }
                return Err(Error::BadHuffmanCode);
            }

            if entry & HUFFDEC_LITERAL != 0 {
                if dst.available() == 0 {
                    return Ok(Some(Status::ShortWrite));
                }
                self.bitbuf >>= pre_bits + total;
                self.bitsleft -= pre_bits + total;
                dst.push((entry >> 16) as u8);
                continue;
            }

            // Length code: consume the symbol plus its extra bits together.
            self.bitbuf >>= pre_bits;
            self.bitsleft -= pre_bits;
            let saved_bitbuf = self.bitbuf;
            self.bitbuf >>= total;
            self.bitsleft -= total;
            let len_field = (entry >> 8) & 0xF;
            let mut length = (entry >> 16) as usize;
            let extra = total - len_field;
            if extra > 0 {
                length += ((saved_bitbuf >> len_field) as usize) & ((1usize << extra) - 1);
            }
            self.state = DecoderState::BlockBodyOffset { length };
            if let Some(status) = self.decode_offset_and_copy(dst, src, length)? {
                return Ok(Some(status));
            }
        }
    }

    /// Fast variant: no per-symbol suspension checks. Only runs while the
    /// input has a worst-case token's worth of bytes and the output has a
    /// worst-case match's worth of space, so nothing inside can suspend.
    fn decode_huffman_fast(&mut self, dst: &mut Writer, src: &mut Reader) -> Result<(), Error> {
        let litlen_mask = (1usize << self.litlen_tablebits) - 1;
        let offset_mask = (1usize << OFFSET_TABLEBITS) - 1;

        while src.available() >= 15 && dst.available() >= DEFLATE_MAX_MATCH_LEN + 2 {
            refill_bits!(src, self.bitbuf, self.bitsleft);

            let entry = self.litlen_table[(self.bitbuf as usize) & litlen_mask];
            if entry & HUFFDEC_EXCEPTIONAL != 0 {
                // End-of-block, sub-table, or invalid: the checked loop
                // resolves these.
                return Ok(());
            }

            let saved_bitbuf = self.bitbuf;
            let total = entry & 0xFF;
            self.bitbuf >>= total;
            self.bitsleft -= total;

            if entry & HUFFDEC_LITERAL != 0 {
                dst.push((entry >> 16) as u8);
                continue;
            }

            let len_field = (entry >> 8) & 0xF;
            let mut length = (entry >> 16) as usize;
            let extra = total - len_field;
            if extra > 0 {
                length += ((saved_bitbuf >> len_field) as usize) & ((1usize << extra) - 1);
            }

            refill_bits!(src, self.bitbuf, self.bitsleft);
            let mut off_entry = self.offset_table[(self.bitbuf as usize) & offset_mask];
            if off_entry & HUFFDEC_EXCEPTIONAL != 0 {
                if off_entry & HUFFDEC_SUBTABLE_POINTER != 0 {
                    let main_bits = off_entry & 0xFF;
                    self.bitbuf >>= main_bits;
                    self.bitsleft -= main_bits;
                    let sub_bits = (off_entry >> 8) & 0xF;
                    off_entry = self.offset_table[((off_entry >> 16) as usize)
                        + ((self.bitbuf as usize) & ((1usize << sub_bits) - 1))];
                }
                if off_entry & HUFFDEC_INVALID != 0 {
                    return Err(Error::BadHuffmanCode);
                }
            }

            let saved_bitbuf = self.bitbuf;
            let total_off = off_entry & 0xFF;
            self.bitbuf >>= total_off;
            self.bitsleft -= total_off;
            let len_off = (off_entry >> 8) & 0xF;
            let mut distance = (off_entry >> 16) as usize;
            let extra_off = total_off - len_off;
            if extra_off > 0 {
                distance += ((saved_bitbuf >> len_off) as usize) & ((1usize << extra_off) - 1);
            }

            // Copy from the history window first if the distance reaches
            // past this call's output, then continue within the buffer.
            let in_buf = dst.pos() - self.out_mark;
            if distance > in_buf {
                let hdist = distance - in_buf;
                if hdist as u64 > self.history.total() {
                    return Err(Error::BadDistance);
                }
                let hlen = min(length, hdist);
                {
                    let (buf, pos) = dst.parts_mut();
                    self.history.copy_to(hdist, &mut buf[pos..pos + hlen]);
                }
                dst.advance(hlen);
                length -= hlen;
                if length == 0 {
                    continue;
                }
                if distance > dst.pos() - self.out_mark {
                    return Err(Error::InconsistentDistance);
                }
            }
            {
                let (buf, pos) = dst.parts_mut();
                copy_overlapped(buf, pos, distance, length);
            }
            dst.advance(length);
        }
        Ok(())
    }

    /// Decodes the distance half of a match, then performs (or begins) the
    /// copy. Entered fresh after a length code and re-entered on resume.
    fn decode_offset_and_copy(
        &mut self,
        dst: &mut Writer,
        src: &mut Reader,
        length: usize,
    ) -> Result<Option<Status>, Error> {
        refill_bits!(src, self.bitbuf, self.bitsleft);
        let mut entry = self.offset_table[(self.bitbuf as usize) & ((1 << OFFSET_TABLEBITS) - 1)];
        let mut pre_bits = 0u32;
        if entry & HUFFDEC_EXCEPTIONAL != 0 && entry & HUFFDEC_SUBTABLE_POINTER != 0 {
            let main_bits = entry & 0xFF;
            let sub_bits = (entry >> 8) & 0xF;
            let sub = self.offset_table[((entry >> 16) as usize)
                + (((self.bitbuf >> main_bits) as usize) & ((1usize << sub_bits) - 1))];
            if self.bitsleft < main_bits + (sub & 0xFF) {
                return Ok(Some(Status::ShortRead));
            }
            pre_bits = main_bits;
            entry = sub;
        }
        let total = entry & 0xFF;
        if self.bitsleft < pre_bits + total {
            return Ok(Some(Status::ShortRead));
        }
        if entry & HUFFDEC_INVALID != 0 {
            return Err(Error::BadHuffmanCode);
        }

        self.bitbuf >>= pre_bits;
        self.bitsleft -= pre_bits;
        let saved_bitbuf = self.bitbuf;
        self.bitbuf >>= total;
        self.bitsleft -= total;
        let len_field = (entry >> 8) & 0xF;
        let mut distance = (entry >> 16) as usize;
        let extra = total - len_field;
        if extra > 0 {
            distance += ((saved_bitbuf >> len_field) as usize) & ((1usize << extra) - 1);
        }

        self.state = DecoderState::Copy {
            remaining: length,
            distance,
        };
        self.run_copy(dst, length, distance)
    }

    /// Executes a back-reference copy, possibly partially. The source spans
    /// the history window and/or this call's own output; a copy interrupted
    /// by a full output buffer resumes cleanly because the written part has
    /// been absorbed into history by then.
    fn run_copy(
        &mut self,
        dst: &mut Writer,
        remaining: usize,
        distance: usize,
    ) -> Result<Option<Status>, Error> {
        let mut remaining = remaining;
        let in_buf = dst.pos() - self.out_mark;

        if distance > in_buf {
            let hdist = distance - in_buf;
            if hdist as u64 > self.history.total() {
                return Err(Error::BadDistance);
            }
            let hlen = min(remaining, hdist);
            let n = min(hlen, dst.available());
            if n > 0 {
                let (buf, pos) = dst.parts_mut();
                self.history.copy_to(hdist, &mut buf[pos..pos + n]);
                dst.advance(n);
                remaining -= n;
            }
            if n < hlen {
                self.state = DecoderState::Copy {
                    remaining,
                    distance,
                };
                return Ok(Some(Status::ShortWrite));
            }
            if remaining == 0 {
                self.state = DecoderState::BlockBody;
                return Ok(None);
            }
            if distance > dst.pos() - self.out_mark {
                return Err(Error::InconsistentDistance);
            }
        }

        let n = min(remaining, dst.available());
        if n > 0 {
            let (buf, pos) = dst.parts_mut();
            copy_overlapped(buf, pos, distance, n);
            dst.advance(n);
            remaining -= n;
        }
        if remaining > 0 {
            self.state = DecoderState::Copy {
                remaining,
                distance,
            };
            return Ok(Some(Status::ShortWrite));
        }
        self.state = DecoderState::BlockBody;
        Ok(None)
    }

    fn load_static_huffman_codes(&mut self) {
        if self.static_codes_loaded {
            return;
        }

        let data = STATIC_HUFFMAN_DATA.get_or_init(|| {
            let mut d = Decompressor::new();
            let mut i = 0;
            while i < 144 {
                d.lens[i] = 8;
                i += 1;
            }
            while i < 256 {
                d.lens[i] = 9;
                i += 1;
            }
            while i < 280 {
                d.lens[i] = 7;
                i += 1;
            }
            while i < 288 {
                d.lens[i] = 8;
                i += 1;
            }
            while i < 288 + 32 {
                d.lens[i] = 5;
                i += 1;
            }
            d.num_litlen_syms = DEFLATE_NUM_LITLEN_SYMS;
            d.num_offset_syms = DEFLATE_NUM_OFFSET_SYMS;
            d.build_offset_decode_table()
                .expect("fixed distance code lengths are well-formed");
            d.build_litlen_decode_table()
                .expect("fixed literal/length code lengths are well-formed");

            StaticHuffmanData {
                litlen_table: d.litlen_table,
                offset_table: d.offset_table,
                litlen_tablebits: d.litlen_tablebits,
            }
        });

        self.litlen_table.copy_from_slice(&data.litlen_table);
        self.offset_table.copy_from_slice(&data.offset_table);
        self.litlen_tablebits = data.litlen_tablebits;
        self.static_codes_loaded = true;
    }

    fn build_precode_decode_table(&mut self) -> Result<(), Error> {
        build_decode_table(
            &mut self.precode_table,
            &self.precode_lens,
            DEFLATE_NUM_PRECODE_SYMS,
            &PRECODE_DECODE_RESULTS,
            PRECODE_TABLEBITS,
            DEFLATE_MAX_PRE_CODEWORD_LEN,
            &mut self.sorted_syms,
            None,
            false,
        )
    }

    fn build_litlen_decode_table(&mut self) -> Result<(), Error> {
        build_decode_table(
            &mut self.litlen_table,
            &self.lens[..self.num_litlen_syms],
            self.num_litlen_syms,
            &LITLEN_DECODE_RESULTS,
            LITLEN_TABLEBITS,
            DEFLATE_MAX_LITLEN_CODEWORD_LEN,
            &mut self.sorted_syms,
            Some(&mut self.litlen_tablebits),
            false,
        )
    }

    fn build_offset_decode_table(&mut self) -> Result<(), Error> {
        build_decode_table(
            &mut self.offset_table,
            &self.lens[self.num_litlen_syms..self.num_litlen_syms + self.num_offset_syms],
            self.num_offset_syms,
            &OFFSET_DECODE_RESULTS,
            OFFSET_TABLEBITS,
            DEFLATE_MAX_OFFSET_CODEWORD_LEN,
            &mut self.sorted_syms,
            None,
            true,
        )
    }
}

impl Default for Decompressor {
    fn default() -> Self {
        Self::new()
    }
}

/// Copies `length` bytes ending at `dest_pos + length` from `distance` bytes
/// back, replicating the pattern when the ranges overlap (distance <
/// length), which is how runs are encoded.
fn copy_overlapped(buf: &mut [u8], dest_pos: usize, distance: usize, length: usize) {
    debug_assert!(distance >= 1 && distance <= dest_pos);
    let src = dest_pos - distance;
    if distance == 1 {
        let b = buf[src];
        buf[dest_pos..dest_pos + length].fill(b);
    } else if distance >= length {
        buf.copy_within(src..src + length, dest_pos);
    } else {
        let mut copied = 0;
        while copied < length {
            let n = min(distance, length - copied);
            buf.copy_within(src + copied..src + copied + n, dest_pos + copied);
            copied += n;
        }
    }
}
