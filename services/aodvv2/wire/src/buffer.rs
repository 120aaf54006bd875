//! Fixed-capacity encode buffers.
//!
//! The writer never grows its buffers past the capacity it was configured
//! with. Every write checks the remaining room first and fails with
//! [`WireError::Capacity`] instead of reallocating or truncating.

use crate::error::{BufferKind, Result, WireError};
use bytes::{BufMut, BytesMut};

/// Byte buffer with a hard capacity limit
#[derive(Debug)]
pub struct FixedBuf {
    buf: BytesMut,
    capacity: usize,
    kind: BufferKind,
}

impl FixedBuf {
    /// Allocate a buffer of `capacity` bytes up front
    pub fn new(kind: BufferKind, capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
            capacity,
            kind,
        }
    }

    /// Configured capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Bytes written so far
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether nothing has been written
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Bytes still available
    pub fn remaining(&self) -> usize {
        self.capacity - self.buf.len()
    }

    /// Fail unless `needed` more bytes fit
    pub fn ensure(&self, needed: usize) -> Result<()> {
        if needed > self.remaining() {
            return Err(WireError::Capacity {
                buffer: self.kind,
                needed,
                available: self.remaining(),
            });
        }
        Ok(())
    }

    /// Append one byte
    pub fn put_u8(&mut self, value: u8) -> Result<()> {
        self.ensure(1)?;
        self.buf.put_u8(value);
        Ok(())
    }

    /// Append a big-endian u16
    pub fn put_u16(&mut self, value: u16) -> Result<()> {
        self.ensure(2)?;
        self.buf.put_u16(value);
        Ok(())
    }

    /// Append a slice
    pub fn put_slice(&mut self, data: &[u8]) -> Result<()> {
        self.ensure(data.len())?;
        self.buf.put_slice(data);
        Ok(())
    }

    /// Overwrite a big-endian u16 already written at `offset`
    pub fn patch_u16(&mut self, offset: usize, value: u16) {
        self.buf[offset..offset + 2].copy_from_slice(&value.to_be_bytes());
    }

    /// Written bytes
    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    /// Drop the contents, keeping the allocation
    pub fn clear(&mut self) {
        self.buf.clear();
    }
}
