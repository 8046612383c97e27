//! The `#Blob` heap (ECMA-335 II.24.2.4).
//!
//! Signatures, constant values, public keys and custom attribute values are stored as
//! length-prefixed byte sequences. The prefix uses the compressed unsigned integer encoding
//! (1, 2 or 4 bytes), and index 0 is always the empty blob.

use crate::{file::parser::Parser, Error::OutOfBounds, Result};

/// A zero-copy view over the `#Blob` heap.
#[derive(Clone, Copy, Debug)]
pub struct Blob<'a> {
    data: &'a [u8],
}

impl<'a> Blob<'a> {
    /// Wrap and validate the heap bytes.
    ///
    /// # Errors
    /// Returns [`crate::Error::BadImageFormat`] if the heap is empty or does not start with the
    /// empty blob.
    pub fn from(data: &'a [u8]) -> Result<Blob<'a>> {
        if data.first() != Some(&0) {
            return Err(malformed_error!("Invalid memory for #Blob heap"));
        }

        Ok(Blob { data })
    }

    /// The blob at byte offset `index`, without its length prefix.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the prefix or the content runs past the heap,
    /// or [`crate::Error::BadImageFormat`] for an invalid prefix.
    pub fn get(&self, index: usize) -> Result<&'a [u8]> {
        let (start, len) = self.entry(index)?;
        Ok(&self.data[start..start + len])
    }

    fn entry(&self, index: usize) -> Result<(usize, usize)> {
        let Some(tail) = self.data.get(index..) else {
            return Err(OutOfBounds);
        };

        let mut parser = Parser::new(tail);
        let len = parser.read_compressed_uint()? as usize;
        let start = index + parser.pos();

        match start.checked_add(len) {
            Some(end) if end <= self.data.len() => Ok((start, len)),
            _ => Err(OutOfBounds),
        }
    }

    /// Size of the heap in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the heap only holds the mandatory empty blob.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.len() <= 1
    }

    /// Iterate over `(offset, blob)` pairs, starting after the empty blob at index 0.
    ///
    /// Iteration stops at the first entry whose prefix or content is invalid, after yielding
    /// that error.
    #[must_use]
    pub fn iter(&self) -> BlobIterator<'a> {
        BlobIterator {
            blob: *self,
            position: 1,
            failed: false,
        }
    }
}

/// Iterator over the entries of a [`Blob`] heap.
pub struct BlobIterator<'a> {
    blob: Blob<'a>,
    position: usize,
    failed: bool,
}

impl<'a> Iterator for BlobIterator<'a> {
    type Item = Result<(usize, &'a [u8])>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.position >= self.blob.data.len() {
            return None;
        }

        let index = self.position;
        match self.blob.entry(index) {
            Ok((start, len)) => {
                self.position = start + len;
                Some(Ok((index, &self.blob.data[start..start + len])))
            }
            Err(error) => {
                self.failed = true;
                Some(Err(error))
            }
        }
    }
}
