//! Byte cursors for the token stream.
//!
//! `InCursor` scans the compressed bytes during decoding. `OutCursor` writes
//! them during encoding and, since every back-reference in this format
//! points into bytes the encoder has already written, also doubles as the
//! dictionary the match searcher reads candidates back out of.

use byteorder::{ByteOrder, LE};

pub(crate) struct InCursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> InCursor<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        InCursor { buf, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn read_u8(&mut self) -> Option<u8> {
        let b = *self.buf.get(self.pos)?;
        self.pos += 1;
        Some(b)
    }

    pub fn peek_u8(&self) -> Option<u8> {
        self.buf.get(self.pos).copied()
    }

    pub fn read_u16_le(&mut self) -> Option<u16> {
        let bytes = self.read_exact(2)?;
        Some(LE::read_u16(bytes))
    }

    pub fn read_u32_le(&mut self) -> Option<u32> {
        let bytes = self.read_exact(4)?;
        Some(LE::read_u32(bytes))
    }

    /// Reads the low 3 bytes of a little-endian `u32`.
    pub fn read_u24_le(&mut self) -> Option<u32> {
        let bytes = self.read_exact(3)?;
        Some(u32::from(bytes[0]) | u32::from(bytes[1]) << 8 | u32::from(bytes[2]) << 16)
    }

    pub fn read_exact(&mut self, n: usize) -> Option<&'a [u8]> {
        if self.remaining() < n {
            return None;
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Some(slice)
    }

    /// Bytes already consumed, available as a read-back dictionary.
    pub fn produced_so_far(&self) -> &'a [u8] {
        &self.buf[..self.pos]
    }
}

pub(crate) struct OutCursor<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> OutCursor<'a> {
    pub fn new(buf: &'a mut [u8]) -> Self {
        OutCursor { buf, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Bytes written so far, readable as a dictionary for back-references.
    pub fn written(&self) -> &[u8] {
        &self.buf[..self.pos]
    }

    #[must_use]
    pub fn put_u8(&mut self, v: u8) -> bool {
        if self.remaining() < 1 {
            return false;
        }
        self.buf[self.pos] = v;
        self.pos += 1;
        true
    }

    #[must_use]
    pub fn put_u16_le(&mut self, v: u16) -> bool {
        if self.remaining() < 2 {
            return false;
        }
        LE::write_u16(&mut self.buf[self.pos..self.pos + 2], v);
        self.pos += 2;
        true
    }

    #[must_use]
    pub fn put_u32_le(&mut self, v: u32) -> bool {
        if self.remaining() < 4 {
            return false;
        }
        LE::write_u32(&mut self.buf[self.pos..self.pos + 4], v);
        self.pos += 4;
        true
    }

    /// Writes the low 3 bytes of `v` in little-endian order.
    #[must_use]
    pub fn put_u24_le(&mut self, v: u32) -> bool {
        if self.remaining() < 3 {
            return false;
        }
        self.buf[self.pos] = v as u8;
        self.buf[self.pos + 1] = (v >> 8) as u8;
        self.buf[self.pos + 2] = (v >> 16) as u8;
        self.pos += 3;
        true
    }

    #[must_use]
    pub fn put_bytes(&mut self, bytes: &[u8]) -> bool {
        if self.remaining() < bytes.len() {
            return false;
        }
        self.buf[self.pos..self.pos + bytes.len()].copy_from_slice(bytes);
        self.pos += bytes.len();
        true
    }
}
