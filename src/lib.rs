//! Resumable DEFLATE/zlib/gzip decompression with fixed, preallocated
//! memory.
//!
//! The core is a suspendable bit-level state machine ([`decompress::Decompressor`])
//! that decodes RFC 1951 streams through caller-owned cursors, never
//! allocating and never needing the whole payload in memory. Container
//! wrappers ([`zlib::ZlibDecompressor`], [`gzip::GzipDecompressor`]) add
//! framing and checksums, [`stream`] adapts the engine to `std::io::Read`,
//! and [`api::Decompressor`] offers one-shot helpers.

pub mod adler32;
pub mod api;
pub mod batch;
pub mod common;
pub mod crc32;
pub mod crc32_tables;
pub mod decompress;
pub mod error;
pub mod gzip;
pub mod io;
pub mod stream;
pub mod zlib;

pub use adler32::adler32;
pub use api::Decompressor;
pub use crc32::crc32;
pub use error::{Error, Status};
pub use io::{Reader, Writer};
