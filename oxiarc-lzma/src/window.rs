//! LZ sliding-window dictionary shared by the standalone LZMA decoder and
//! each LZMA2 chunk decoder, so distance lookups and reset semantics live
//! in exactly one place.

/// Circular byte buffer addressed by match distance.
///
/// `byte_at(0)` returns the most recently written byte; `byte_at(d)` returns
/// the byte written `d + 1` positions ago. [`Window::len`] reports how many
/// bytes are currently addressable, capped at the buffer's capacity once it
/// has wrapped around at least once.
#[derive(Debug)]
pub struct Window {
    buf: Vec<u8>,
    pos: usize,
    full: bool,
}

impl Window {
    /// Create a window with the given capacity (distances may never exceed it).
    pub fn new(capacity: usize) -> Self {
        Self {
            buf: vec![0u8; capacity.max(1)],
            pos: 0,
            full: false,
        }
    }

    /// Drop all history without reallocating (LZMA2 dictionary-reset chunks).
    pub fn reset(&mut self) {
        self.pos = 0;
        self.full = false;
    }

    /// Number of bytes currently addressable by a distance.
    pub fn len(&self) -> usize {
        if self.full { self.buf.len() } else { self.pos }
    }

    /// Whether any bytes have been written since the last reset.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Byte at zero-based distance `dist` (0 = most recently written byte).
    pub fn byte_at(&self, dist: usize) -> u8 {
        let cap = self.buf.len();
        let idx = if dist < self.pos {
            self.pos - dist - 1
        } else {
            cap - (dist - self.pos) - 1
        };
        self.buf[idx]
    }

    /// Write a byte, advancing the cursor and wrapping as needed.
    pub fn put(&mut self, byte: u8) {
        let cap = self.buf.len();
        self.buf[self.pos] = byte;
        self.pos += 1;
        if self.pos == cap {
            self.pos = 0;
            self.full = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_around_capacity() {
        let mut w = Window::new(4);
        for b in [1u8, 2, 3, 4, 5] {
            w.put(b);
        }
        assert_eq!(w.len(), 4);
        assert_eq!(w.byte_at(0), 5);
        assert_eq!(w.byte_at(1), 4);
        assert_eq!(w.byte_at(3), 2);
    }

    #[test]
    fn reset_clears_history() {
        let mut w = Window::new(4);
        w.put(1);
        w.put(2);
        w.reset();
        assert!(w.is_empty());
        w.put(9);
        assert_eq!(w.byte_at(0), 9);
    }
}
