//! Bounds-checked sequential reads over an in-memory ".shp" buffer.
//!
//! The format mixes byte orders inside a single structure, so every read
//! names its endianness explicitly.

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use super::shp::ShpError;

#[derive(Debug, Clone)]
pub struct ShpCursor<'a> {
    buf: &'a [u8],
    pos: usize,
    /// Absolute offset of `buf[0]` within the file, for error messages.
    base: usize,
}

impl<'a> ShpCursor<'a> {
    pub fn new(buf: &'a [u8]) -> ShpCursor<'a> {
        ShpCursor { buf: buf, pos: 0, base: 0 }
    }

    /// Total number of bytes this cursor covers, read or not.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    /// Absolute file offset of the next byte to be read.
    pub fn offset(&self) -> usize {
        self.base + self.pos
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Fails unless at least `n` more bytes can be read.
    pub fn require(&self, n: usize) -> Result<(), ShpError> {
        if n > self.remaining() {
            Err(ShpError::TruncatedData {
                offset: self.offset(),
                needed: n,
                remaining: self.remaining(),
            })
        } else {
            Ok(())
        }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], ShpError> {
        self.require(n)?;
        let bytes = &self.buf[self.pos .. self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    pub fn read_i32_be(&mut self) -> Result<i32, ShpError> {
        self.take(4).map(BigEndian::read_i32)
    }

    pub fn read_i32_le(&mut self) -> Result<i32, ShpError> {
        self.take(4).map(LittleEndian::read_i32)
    }

    pub fn read_f64_le(&mut self) -> Result<f64, ShpError> {
        self.take(8).map(LittleEndian::read_f64)
    }

    pub fn skip(&mut self, n: usize) -> Result<(), ShpError> {
        self.take(n).map(|_| ())
    }

    /// Returns a cursor over exactly the next `n` bytes and advances past
    /// them. Reads on the sub-cursor can never run into the bytes after it.
    pub fn slice(&mut self, n: usize) -> Result<ShpCursor<'a>, ShpError> {
        let base = self.offset();
        self.take(n).map(|bytes| ShpCursor { buf: bytes, pos: 0, base: base })
    }
}
