use crate::common::*;
use crate::error::Error;
use std::cmp::min;

// Decode table sizing. The fast path resolves any codeword of at most
// TABLEBITS bits in a single dense lookup; longer codewords consume the
// TABLEBITS-bit prefix and redirect into a sub-table stored in the same
// array. 1024 entries per alphabet bound the dense table plus every
// sub-table a valid code can require.
pub const PRECODE_TABLEBITS: usize = 7;
pub const PRECODE_ENOUGH: usize = 128;
pub const LITLEN_TABLEBITS: usize = 9;
pub const LITLEN_ENOUGH: usize = 1024;
pub const OFFSET_TABLEBITS: usize = 9;
pub const OFFSET_ENOUGH: usize = 1024;

// Decode table entry layout:
//
//   bits  0..8   total bits consumed by this entry (codeword + extra bits),
//                or, for a sub-table pointer, the primary table bits
//   bits  8..12  codeword length past the prefix, or sub-table bits
//   bit  12      end-of-block
//   bit  13      invalid codeword (reserved symbol or absent code)
//   bit  14      sub-table pointer
//   bit  15      exceptional (set on all of the above three)
//   bits 16..31  payload: literal byte, length base, distance base, or
//                sub-table start index
//   bit  31      literal
pub const HUFFDEC_END_OF_BLOCK: u32 = 0x1000;
pub const HUFFDEC_INVALID: u32 = 0x2000;
pub const HUFFDEC_SUBTABLE_POINTER: u32 = 0x4000;
pub const HUFFDEC_EXCEPTIONAL: u32 = 0x8000;
pub const HUFFDEC_LITERAL: u32 = 0x8000_0000;

/// Code-length alphabet symbols appear in the stream in this fixed order.
pub const PRECODE_LENS_PERMUTATION: [u8; DEFLATE_NUM_PRECODE_SYMS] = [
    16, 17, 18, 0, 8, 7, 9, 6, 10, 5, 11, 4, 12, 3, 13, 2, 14, 1, 15,
];

const LENGTH_BASE: [u16; 29] = [
    3, 4, 5, 6, 7, 8, 9, 10, 11, 13, 15, 17, 19, 23, 27, 31, 35, 43, 51, 59, 67, 83, 99, 115, 131,
    163, 195, 227, 258,
];

const LENGTH_EXTRA: [u8; 29] = [
    0, 0, 0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 2, 2, 2, 2, 3, 3, 3, 3, 4, 4, 4, 4, 5, 5, 5, 5, 0,
];

const OFFSET_BASE: [u16; 30] = [
    1, 2, 3, 4, 5, 7, 9, 13, 17, 25, 33, 49, 65, 97, 129, 193, 257, 385, 513, 769, 1025, 1537,
    2049, 3073, 4097, 6145, 8193, 12289, 16385, 24577,
];

const OFFSET_EXTRA: [u8; 30] = [
    0, 0, 0, 0, 1, 1, 2, 2, 3, 3, 4, 4, 5, 5, 6, 6, 7, 7, 8, 8, 9, 9, 10, 10, 11, 11, 12, 12, 13,
    13,
];

const fn build_precode_decode_results() -> [u32; DEFLATE_NUM_PRECODE_SYMS] {
    let mut t = [0u32; DEFLATE_NUM_PRECODE_SYMS];
    let mut sym = 0;
    while sym < DEFLATE_NUM_PRECODE_SYMS {
        t[sym] = (sym as u32) << 16;
        sym += 1;
    }
    t
}

const fn build_litlen_decode_results() -> [u32; DEFLATE_NUM_LITLEN_SYMS] {
    let mut t = [0u32; DEFLATE_NUM_LITLEN_SYMS];
    let mut sym = 0;
    while sym < DEFLATE_NUM_LITLEN_SYMS {
        t[sym] = if sym < DEFLATE_NUM_LITERALS {
            ((sym as u32) << 16) | HUFFDEC_LITERAL
        } else if sym == DEFLATE_END_OF_BLOCK {
            HUFFDEC_EXCEPTIONAL | HUFFDEC_END_OF_BLOCK
        } else if sym <= 285 {
            let i = sym - DEFLATE_FIRST_LEN_SYM;
            ((LENGTH_BASE[i] as u32) << 16) | (LENGTH_EXTRA[i] as u32)
        } else {
            // Symbols 286 and 287 can be assigned codes but never occur.
            HUFFDEC_EXCEPTIONAL | HUFFDEC_INVALID
        };
        sym += 1;
    }
    t
}

const fn build_offset_decode_results() -> [u32; DEFLATE_NUM_OFFSET_SYMS] {
    let mut t = [0u32; DEFLATE_NUM_OFFSET_SYMS];
    let mut sym = 0;
    while sym < DEFLATE_NUM_OFFSET_SYMS {
        t[sym] = if sym < 30 {
            ((OFFSET_BASE[sym] as u32) << 16) | (OFFSET_EXTRA[sym] as u32)
        } else {
            HUFFDEC_EXCEPTIONAL | HUFFDEC_INVALID
        };
        sym += 1;
    }
    t
}

pub const PRECODE_DECODE_RESULTS: [u32; DEFLATE_NUM_PRECODE_SYMS] = build_precode_decode_results();
pub const LITLEN_DECODE_RESULTS: [u32; DEFLATE_NUM_LITLEN_SYMS] = build_litlen_decode_results();
pub const OFFSET_DECODE_RESULTS: [u32; DEFLATE_NUM_OFFSET_SYMS] = build_offset_decode_results();

#[inline(always)]
fn make_decode_table_entry(decode_results: &[u32], sym: usize, len: u32) -> u32 {
    decode_results[sym] + (len << 8) + len
}

#[inline(always)]
fn bsr32(v: u32) -> u32 {
    31 - v.leading_zeros()
}

/// Builds a dense-plus-subtable decode table from per-symbol codeword
/// lengths, assigning canonical codes length-first and bit-reversed.
///
/// Verifies Kraft's equality: excess codes fail with `OverSubscribedCode`,
/// deficient codes with `UnderSubscribedCode`. When `allow_incomplete` is
/// set (distance alphabets), two historical exceptions apply: an alphabet
/// with no codes at all builds a table of invalid-codeword sentinels, and
/// an alphabet with exactly one length-1 code builds a degenerate table
/// mapping every bit pattern to that symbol.
#[allow(clippy::too_many_arguments)]
pub(crate) fn build_decode_table(
    decode_table: &mut [u32],
    lens: &[u8],
    num_syms: usize,
    decode_results: &[u32],
    mut table_bits: usize,
    max_codeword_len: usize,
    sorted_syms: &mut [u16],
    table_bits_ret: Option<&mut usize>,
    allow_incomplete: bool,
) -> Result<(), Error> {
    let mut len_counts = [0u32; DEFLATE_MAX_CODEWORD_LEN + 1];
    let mut offsets = [0u32; DEFLATE_MAX_CODEWORD_LEN + 2];

    for &len in lens.iter().take(num_syms) {
        if len as usize > max_codeword_len {
            return Err(Error::BadCodeLengthCount);
        }
        len_counts[len as usize] += 1;
    }

    let mut actual_max_len = max_codeword_len;
    while actual_max_len > 1 && len_counts[actual_max_len] == 0 {
        actual_max_len -= 1;
    }
    if let Some(tb_ret) = table_bits_ret {
        table_bits = min(table_bits, actual_max_len);
        *tb_ret = table_bits;
    }

    offsets[0] = 0;
    offsets[1] = len_counts[0];
    let mut codespace_used = 0u32;
    for len in 1..actual_max_len {
        offsets[len + 1] = offsets[len] + len_counts[len];
        codespace_used = (codespace_used << 1) + len_counts[len];
    }
    codespace_used = (codespace_used << 1) + len_counts[actual_max_len];

    for (sym, &len) in lens.iter().enumerate().take(num_syms) {
        sorted_syms[offsets[len as usize] as usize] = sym as u16;
        offsets[len as usize] += 1;
    }

    if codespace_used > (1u32 << actual_max_len) {
        return Err(Error::OverSubscribedCode);
    }

    if codespace_used < (1u32 << actual_max_len) {
        if !allow_incomplete {
            return Err(Error::UnderSubscribedCode);
        }
        if codespace_used == 0 {
            // No codes at all: every lookup is a bad codeword.
            let entry = HUFFDEC_EXCEPTIONAL | HUFFDEC_INVALID | (1 << 8) | 1;
            for e in decode_table.iter_mut().take(1 << table_bits) {
                *e = entry;
            }
            return Ok(());
        }
        if codespace_used != (1u32 << (actual_max_len - 1)) || len_counts[1] != 1 {
            return Err(Error::UnderSubscribedCode);
        }
        // Exactly one length-1 code: real encoders emit this for distance
        // alphabets, so it decodes via a degenerate one-symbol table.
        let sym = sorted_syms[offsets[0] as usize] as usize;
        let entry = make_decode_table_entry(decode_results, sym, 1);
        for e in decode_table.iter_mut().take(1 << table_bits) {
            *e = entry;
        }
        return Ok(());
    }

    // Complete code from here on.
    let mut len = 1;
    while len_counts[len] == 0 {
        len += 1;
    }
    if len > table_bits {
        return Err(Error::BadMinimumCodeLength);
    }

    let mut sym_ptr = offsets[0] as usize;
    let mut codeword = 0u32;
    let mut cur_table_end: usize = 1 << len;

    // Fill the dense table: each codeword of length <= table_bits owns every
    // slot whose low bits match it.
    while len <= table_bits {
        let mut count = len_counts[len];
        while count > 0 {
            decode_table[codeword as usize] =
                make_decode_table_entry(decode_results, sorted_syms[sym_ptr] as usize, len as u32);
            sym_ptr += 1;

            if codeword == (cur_table_end as u32) - 1 {
                // Last codeword of this length; replicate what we have up to
                // the full table size.
                for _ in len..table_bits {
                    let size = cur_table_end;
                    decode_table.copy_within(0..size, size);
                    cur_table_end <<= 1;
                }
                return Ok(());
            }

            // Advance to the next codeword: increment the bit-reversed value.
            let bit = 1 << bsr32(codeword ^ ((cur_table_end as u32) - 1));
            codeword &= bit - 1;
            codeword |= bit;
            count -= 1;
        }

        // Advance to the next used length; a complete code guarantees one
        // exists whenever codewords remain.
        loop {
            len += 1;
            if len <= table_bits {
                let size = cur_table_end;
                decode_table.copy_within(0..size, size);
                cur_table_end <<= 1;
            }
            if len > DEFLATE_MAX_CODEWORD_LEN {
                return Err(Error::InconsistentDecoderState);
            }
            if len_counts[len] != 0 {
                break;
            }
        }
    }

    // Remaining codewords are longer than table_bits: route them through
    // sub-tables reached by pointer entries in the dense table.
    cur_table_end = 1 << table_bits;
    let mut subtable_prefix = !0u32;
    let mut subtable_start: usize = 0;
    loop {
        if (codeword & ((1 << table_bits) - 1)) != subtable_prefix {
            subtable_prefix = codeword & ((1 << table_bits) - 1);
            subtable_start = cur_table_end;
            // Size the sub-table to cover every remaining length sharing
            // this prefix.
            let mut subtable_bits = len - table_bits;
            let mut sub_codespace = len_counts[len];
            while sub_codespace < (1 << subtable_bits) {
                subtable_bits += 1;
                sub_codespace = (sub_codespace << 1)
                    + if table_bits + subtable_bits <= DEFLATE_MAX_CODEWORD_LEN {
                        len_counts[table_bits + subtable_bits]
                    } else {
                        0
                    };
            }
            cur_table_end = subtable_start + (1 << subtable_bits);
            decode_table[subtable_prefix as usize] = ((subtable_start as u32) << 16)
                | HUFFDEC_EXCEPTIONAL
                | HUFFDEC_SUBTABLE_POINTER
                | ((subtable_bits as u32) << 8)
                | (table_bits as u32);
        }

        let entry = make_decode_table_entry(
            decode_results,
            sorted_syms[sym_ptr] as usize,
            (len - table_bits) as u32,
        );
        sym_ptr += 1;
        let mut i = subtable_start + (codeword >> table_bits) as usize;
        let stride = 1 << (len - table_bits);
        while i < cur_table_end {
            decode_table[i] = entry;
            i += stride;
        }

        if codeword == (1 << len) - 1 {
            return Ok(());
        }
        let bit = 1 << bsr32(codeword ^ ((1 << len) - 1));
        codeword &= bit - 1;
        codeword |= bit;
        len_counts[len] -= 1;
        while len_counts[len] == 0 {
            len += 1;
            if len > DEFLATE_MAX_CODEWORD_LEN {
                return Err(Error::InconsistentDecoderState);
            }
        }
    }
}
