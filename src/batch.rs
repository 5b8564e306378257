//! Parallel decode of independent buffers. Each rayon worker keeps its own
//! decoder instance; nothing is shared between members.

use crate::api::Decompressor;
use rayon::prelude::*;

pub struct BatchDecompressor;

impl BatchDecompressor {
    pub fn new() -> Self {
        Self
    }

    pub fn decompress_batch(
        &self,
        inputs: &[&[u8]],
        max_out_sizes: &[usize],
    ) -> Vec<Option<Vec<u8>>> {
        inputs
            .par_iter()
            .zip(max_out_sizes.par_iter())
            .map_init(Decompressor::new, |decompressor, (&input, &max_size)| {
                decompressor.decompress_deflate(input, max_size).ok()
            })
            .collect()
    }

    pub fn decompress_gzip_batch(
        &self,
        inputs: &[&[u8]],
        max_out_sizes: &[usize],
    ) -> Vec<Option<Vec<u8>>> {
        inputs
            .par_iter()
            .zip(max_out_sizes.par_iter())
            .map_init(Decompressor::new, |decompressor, (&input, &max_size)| {
                decompressor.decompress_gzip(input, max_size).ok()
            })
            .collect()
    }
}

impl Default for BatchDecompressor {
    fn default() -> Self {
        Self::new()
    }
}
