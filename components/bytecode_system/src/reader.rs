//! Bounds-checked little-endian reader.

use crate::error::{FormatError, FormatResult};

/// Cursor over a byte slice. Every read fails with
/// [`FormatError::Truncated`] instead of panicking.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> ByteReader<'a> {
    /// Starts reading at offset 0.
    pub fn new(bytes: &'a [u8]) -> Self {
        ByteReader { bytes, offset: 0 }
    }

    /// Current offset.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Moves to an absolute offset.
    pub fn seek(&mut self, offset: usize) -> FormatResult<()> {
        if offset > self.bytes.len() {
            return Err(FormatError::Truncated {
                offset,
                needed: 0,
                available: 0,
            });
        }
        self.offset = offset;
        Ok(())
    }

    /// Reads `n` raw bytes.
    pub fn bytes(&mut self, n: usize) -> FormatResult<&'a [u8]> {
        let available = self.bytes.len().saturating_sub(self.offset);
        if n > available {
            return Err(FormatError::Truncated {
                offset: self.offset,
                needed: n,
                available,
            });
        }
        let slice = &self.bytes[self.offset..self.offset + n];
        self.offset += n;
        Ok(slice)
    }

    fn array<const N: usize>(&mut self) -> FormatResult<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.bytes(N)?);
        Ok(out)
    }

    /// Reads a byte.
    pub fn u8(&mut self) -> FormatResult<u8> {
        Ok(self.array::<1>()?[0])
    }

    /// Reads a little-endian u16.
    pub fn u16(&mut self) -> FormatResult<u16> {
        Ok(u16::from_le_bytes(self.array()?))
    }

    /// Reads a little-endian u32.
    pub fn u32(&mut self) -> FormatResult<u32> {
        Ok(u32::from_le_bytes(self.array()?))
    }

    /// Reads a little-endian i32.
    pub fn i32(&mut self) -> FormatResult<i32> {
        Ok(i32::from_le_bytes(self.array()?))
    }

    /// Reads a little-endian u64.
    pub fn u64(&mut self) -> FormatResult<u64> {
        Ok(u64::from_le_bytes(self.array()?))
    }

    /// Reads a little-endian f64.
    pub fn f64(&mut self) -> FormatResult<f64> {
        Ok(f64::from_le_bytes(self.array()?))
    }

    /// Reads four magic bytes.
    pub fn magic(&mut self) -> FormatResult<[u8; 4]> {
        self.array()
    }
}
