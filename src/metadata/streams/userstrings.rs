//! The `#US` heap (ECMA-335 II.24.2.4).
//!
//! String literals used by IL code (`ldstr`) are stored as length-prefixed UTF-16LE with one
//! trailing byte flagging whether the string contains characters that need special handling.
//! The heap layout is that of `#Blob`.

use widestring::U16String;

use crate::{file::parser::Parser, Error::OutOfBounds, Result};

/// A view over the `#US` heap.
#[derive(Clone, Copy, Debug)]
pub struct UserStrings<'a> {
    data: &'a [u8],
}

impl<'a> UserStrings<'a> {
    /// Wrap and validate the heap bytes.
    ///
    /// # Errors
    /// Returns [`crate::Error::BadImageFormat`] if the heap is empty or does not start with a
    /// zero byte.
    pub fn from(data: &'a [u8]) -> Result<UserStrings<'a>> {
        if data.first() != Some(&0) {
            return Err(malformed_error!("Invalid memory for #US heap"));
        }

        Ok(UserStrings { data })
    }

    /// Decode the string at byte offset `index`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the entry runs past the heap and
    /// [`crate::Error::BadImageFormat`] for an even-length entry (missing terminal byte) or
    /// invalid UTF-16.
    pub fn get(&self, index: usize) -> Result<String> {
        let Some(tail) = self.data.get(index..) else {
            return Err(OutOfBounds);
        };

        let mut parser = Parser::new(tail);
        let len = parser.read_compressed_uint()? as usize;
        if len == 0 {
            return Ok(String::new());
        }

        if len % 2 != 1 {
            return Err(malformed_error!(
                "User string at index {} has even length {}",
                index,
                len
            ));
        }

        let bytes = parser.read_bytes(len)?;
        let units: Vec<u16> = bytes[..len - 1]
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();

        U16String::from_vec(units)
            .to_string()
            .map_err(|_| malformed_error!("Invalid UTF-16 user string at index - {}", index))
    }

    /// Size of the heap in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the heap only holds the mandatory empty entry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.len() <= 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crafted() {
        #[rustfmt::skip]
        let data: [u8; 32] = [
            0x00,
            0x1b, 0x48, 0x00, 0x65, 0x00, 0x6c, 0x00, 0x6c, 0x00, 0x6f, 0x00, 0x2c, 0x00, 0x20, 0x00,
            0x57, 0x00, 0x6f, 0x00, 0x72, 0x00, 0x6c, 0x00, 0x64, 0x00, 0x21, 0x00, 0x00,
            0x03, 0x41, 0x00,
        ];

        let us = UserStrings::from(&data).unwrap();

        assert_eq!(us.get(0).unwrap(), "");
        assert_eq!(us.get(1).unwrap(), "Hello, World!");
        // entry at 29 claims 3 bytes, only 2 remain
        assert!(us.get(29).is_err());
        assert!(us.get(40).is_err());
    }

    #[test]
    fn invalid() {
        assert!(UserStrings::from(&[]).is_err());
        assert!(UserStrings::from(&[0x01]).is_err());

        let us = UserStrings::from(&[0x00, 0x02, 0x41, 0x00]).unwrap();
        assert!(us.get(1).is_err());

        // lone surrogate
        let us = UserStrings::from(&[0x00, 0x03, 0x00, 0xD8, 0x00]).unwrap();
        assert!(us.get(1).is_err());
    }
}
