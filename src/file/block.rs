//! Immutable, bounds-checked windows over image bytes.
//!
//! A [`MemoryBlock`] is a borrowed slice plus the absolute file offset it starts at. Sub-windows
//! are carved with [`MemoryBlock::slice`], typed values are read at a block-relative offset, and
//! [`MemoryBlock::reader`] hands out a sequential [`crate::file::parser::Parser`] over the same
//! bytes. Every accessor validates `offset + size <= len` before touching memory.
//!
//! # Examples
//!
//! ```rust
//! use ironscope::MemoryBlock;
//!
//! let data = [0x4D, 0x5A, 0x90, 0x00, 0x03, 0x00, 0x00, 0x00];
//! let block = MemoryBlock::new(&data);
//!
//! assert_eq!(block.read_u16(0)?, 0x5A4D);
//! let tail = block.slice(4, 4)?;
//! assert_eq!(tail.base(), 4);
//! assert_eq!(tail.read_u32(0)?, 3);
//! assert!(tail.read_u32(1).is_err());
//! # Ok::<(), ironscope::Error>(())
//! ```

use crate::{
    file::{
        io::{read_le_at, CilIO},
        parser::Parser,
    },
    Error::OutOfBounds,
    Result,
};

/// A zero-copy view over a contiguous byte range of an image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MemoryBlock<'a> {
    data: &'a [u8],
    base: usize,
}

impl<'a> MemoryBlock<'a> {
    /// Wrap a whole buffer, starting at absolute offset 0.
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        MemoryBlock { data, base: 0 }
    }

    /// Wrap a buffer that begins at absolute offset `base` of some larger image.
    #[must_use]
    pub fn with_base(data: &'a [u8], base: usize) -> Self {
        MemoryBlock { data, base }
    }

    /// Number of bytes in the block.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the block covers no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Absolute offset of the first byte.
    #[must_use]
    pub fn base(&self) -> usize {
        self.base
    }

    /// The underlying bytes.
    #[must_use]
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Carve a sub-window of `len` bytes starting at block-relative `offset`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the range does not fit.
    pub fn slice(&self, offset: usize, len: usize) -> Result<MemoryBlock<'a>> {
        let end = offset.checked_add(len).ok_or(OutOfBounds)?;
        let data = self.data.get(offset..end).ok_or(OutOfBounds)?;

        Ok(MemoryBlock {
            data,
            base: self.base + offset,
        })
    }

    /// Raw bytes of the range `offset..offset + len`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the range does not fit.
    pub fn bytes(&self, offset: usize, len: usize) -> Result<&'a [u8]> {
        Ok(self.slice(offset, len)?.data)
    }

    /// Read a little-endian `T` at block-relative `offset`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if `offset + size_of::<T>()` exceeds the block.
    pub fn read_le<T: CilIO>(&self, offset: usize) -> Result<T> {
        let mut cursor = offset;
        read_le_at::<T>(self.data, &mut cursor)
    }

    /// Read a `u8` at `offset`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] past the end of the block.
    pub fn read_u8(&self, offset: usize) -> Result<u8> {
        self.read_le::<u8>(offset)
    }

    /// Read a little-endian `u16` at `offset`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] past the end of the block.
    pub fn read_u16(&self, offset: usize) -> Result<u16> {
        self.read_le::<u16>(offset)
    }

    /// Read a little-endian `u32` at `offset`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] past the end of the block.
    pub fn read_u32(&self, offset: usize) -> Result<u32> {
        self.read_le::<u32>(offset)
    }

    /// Read a little-endian `u64` at `offset`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] past the end of the block.
    pub fn read_u64(&self, offset: usize) -> Result<u64> {
        self.read_le::<u64>(offset)
    }

    /// Bytes from `offset` up to (not including) the next NUL.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if `offset` is outside the block or no terminator
    /// follows it.
    pub fn read_cstr(&self, offset: usize) -> Result<&'a [u8]> {
        let tail = self.data.get(offset..).ok_or(OutOfBounds)?;
        let len = tail.iter().position(|&b| b == 0).ok_or(OutOfBounds)?;

        Ok(&tail[..len])
    }

    /// A sequential reader positioned at the start of the block.
    #[must_use]
    pub fn reader(&self) -> Parser<'a> {
        Parser::new(self.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[rustfmt::skip]
    const DATA: [u8; 12] = [
        0x01, 0x02, 0x03, 0x04,
        b'a', b'b', 0x00, b'c',
        0x05, 0x06, 0x07, 0x08,
    ];

    #[test]
    fn reads() {
        let block = MemoryBlock::new(&DATA);
        assert_eq!(block.read_u8(0).unwrap(), 0x01);
        assert_eq!(block.read_u16(0).unwrap(), 0x0201);
        assert_eq!(block.read_u32(8).unwrap(), 0x0807_0605);
        assert_eq!(block.read_u64(4).unwrap(), 0x0807_0605_6300_6261);
        assert_eq!(block.read_cstr(4).unwrap(), b"ab");
        assert_eq!(block.read_cstr(6).unwrap(), b"");
    }

    #[test]
    fn four_bytes_near_end_fail_everywhere() {
        let block = MemoryBlock::new(&DATA);
        let len = block.len();

        for offset in len - 3..=len {
            assert!(matches!(block.read_u32(offset), Err(Error::OutOfBounds)));
            assert!(matches!(block.read_le::<i32>(offset), Err(Error::OutOfBounds)));
            assert!(matches!(block.bytes(offset, 4), Err(Error::OutOfBounds)));
            assert!(matches!(block.slice(offset, 4), Err(Error::OutOfBounds)));

            let mut reader = block.reader();
            reader.seek(offset).unwrap();
            assert!(matches!(reader.read_le::<u32>(), Err(Error::OutOfBounds)));
        }

        assert!(block.read_u64(5).is_err());
        assert!(block.read_u8(len).is_err());
        // no terminator after offset 7
        assert!(block.read_cstr(7).is_err());
    }

    #[test]
    fn nested_slices_track_base() {
        let block = MemoryBlock::with_base(&DATA, 0x200);
        let inner = block.slice(4, 8).unwrap();
        assert_eq!(inner.base(), 0x204);

        let innermost = inner.slice(4, 4).unwrap();
        assert_eq!(innermost.base(), 0x208);
        assert_eq!(innermost.read_u32(0).unwrap(), 0x0807_0605);
        assert!(inner.slice(5, 4).is_err());
        assert!(inner.slice(usize::MAX, 2).is_err());
    }
}
