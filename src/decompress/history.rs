use crate::common::DEFLATE_WINDOW_SIZE;

/// Ring buffer of the most recent decompressed bytes.
///
/// Back-references may reach up to 32 KiB behind the current write position,
/// across block and call boundaries, so the window persists for the lifetime
/// of the decoder. `index` is the logical number of bytes ever appended
/// (including externally seeded dictionary bytes); the ring holds the last
/// `DEFLATE_WINDOW_SIZE` of them.
pub(crate) struct HistoryWindow {
    buf: [u8; DEFLATE_WINDOW_SIZE],
    index: u64,
}

impl HistoryWindow {
    pub fn new() -> Self {
        Self {
            buf: [0; DEFLATE_WINDOW_SIZE],
            index: 0,
        }
    }

    pub fn reset(&mut self) {
        self.index = 0;
    }

    /// Total bytes ever appended. Distances reaching past this are invalid.
    pub fn total(&self) -> u64 {
        self.index
    }

    pub fn append(&mut self, data: &[u8]) {
        let w = DEFLATE_WINDOW_SIZE;
        // Only the last window-full of a long append can survive anyway.
        let skip = data.len().saturating_sub(w);
        let tail = &data[skip..];

        let pos = (self.index as usize).wrapping_add(skip) & (w - 1);
        let first = (w - pos).min(tail.len());
        self.buf[pos..pos + first].copy_from_slice(&tail[..first]);
        if first < tail.len() {
            let rest = tail.len() - first;
            self.buf[..rest].copy_from_slice(&tail[first..]);
        }
        self.index += data.len() as u64;
    }

    /// Copies `out.len()` bytes starting `back` bytes behind the append
    /// position. Caller guarantees `back <= DEFLATE_WINDOW_SIZE`,
    /// `back as u64 <= total()`, and `out.len() <= back`.
    pub fn copy_to(&self, back: usize, out: &mut [u8]) {
        let w = DEFLATE_WINDOW_SIZE;
        debug_assert!(back <= w && out.len() <= back);
        let mut pos = (self.index as usize).wrapping_sub(back) & (w - 1);
        let mut copied = 0;
        while copied < out.len() {
            let n = (w - pos).min(out.len() - copied);
            out[copied..copied + n].copy_from_slice(&self.buf[pos..pos + n]);
            copied += n;
            pos = (pos + n) & (w - 1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_and_read_back() {
        let mut h = HistoryWindow::new();
        h.append(b"abcdef");
        assert_eq!(h.total(), 6);
        let mut out = [0u8; 4];
        h.copy_to(6, &mut out);
        assert_eq!(&out, b"abcd");
        h.copy_to(4, &mut out);
        assert_eq!(&out, b"cdef");
    }

    #[test]
    fn append_wraps_around() {
        let mut h = HistoryWindow::new();
        let chunk = vec![0xAB; DEFLATE_WINDOW_SIZE - 3];
        h.append(&chunk);
        h.append(b"xyzw");
        assert_eq!(h.total(), (DEFLATE_WINDOW_SIZE + 1) as u64);
        let mut out = [0u8; 4];
        h.copy_to(4, &mut out);
        assert_eq!(&out, b"xyzw");
    }

    #[test]
    fn oversized_append_keeps_tail() {
        let mut h = HistoryWindow::new();
        let mut data = vec![0u8; DEFLATE_WINDOW_SIZE + 100];
        for (i, b) in data.iter_mut().enumerate() {
            *b = (i % 251) as u8;
        }
        h.append(&data);
        assert_eq!(h.total(), data.len() as u64);
        let mut out = [0u8; 8];
        h.copy_to(8, &mut out);
        assert_eq!(&out[..], &data[data.len() - 8..]);
        let mut far = [0u8; 8];
        h.copy_to(DEFLATE_WINDOW_SIZE, &mut far);
        assert_eq!(&far[..], &data[data.len() - DEFLATE_WINDOW_SIZE..][..8]);
    }
}
