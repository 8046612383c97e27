//! The `#Strings` heap (ECMA-335 II.24.2.3).
//!
//! Identifier strings (type, member, namespace and parameter names) are stored as
//! NUL-terminated UTF-8 and addressed by byte offset. Index 0 is always the empty string.
//! Because the heap's first and last byte are checked to be zero when it is classified, a read
//! starting at any valid index is guaranteed to find a terminator.

use std::{ffi::CStr, str};

use crate::{Error::OutOfBounds, Result};

/// A zero-copy view over the `#Strings` heap.
///
/// # Examples
///
/// ```rust
/// use ironscope::metadata::streams::Strings;
///
/// let data = [0x00, b'M', b'a', b'i', b'n', 0x00];
/// let strings = Strings::from(&data)?;
/// assert_eq!(strings.get(0)?, "");
/// assert_eq!(strings.get(1)?, "Main");
/// assert_eq!(strings.get(3)?, "in");
/// # Ok::<(), ironscope::Error>(())
/// ```
#[derive(Clone, Copy, Debug)]
pub struct Strings<'a> {
    data: &'a [u8],
}

impl<'a> Strings<'a> {
    /// Wrap and validate the heap bytes.
    ///
    /// # Errors
    /// Returns [`crate::Error::BadImageFormat`] if the heap is empty or its first or last byte
    /// is not zero.
    pub fn from(data: &'a [u8]) -> Result<Strings<'a>> {
        match (data.first(), data.last()) {
            (Some(0), Some(0)) => Ok(Strings { data }),
            (None, _) => Err(malformed_error!("Provided #Strings heap is empty")),
            _ => Err(malformed_error!(
                "#Strings heap must start and end with a zero byte"
            )),
        }
    }

    /// The string at byte offset `index`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if `index` is past the heap and
    /// [`crate::Error::BadImageFormat`] if the bytes are not valid UTF-8.
    pub fn get(&self, index: usize) -> Result<&'a str> {
        let Some(tail) = self.data.get(index..) else {
            return Err(OutOfBounds);
        };

        let Ok(cstr) = CStr::from_bytes_until_nul(tail) else {
            return Err(OutOfBounds);
        };

        cstr.to_str()
            .map_err(|_| malformed_error!("Invalid UTF-8 string at index - {}", index))
    }

    /// Size of the heap in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the heap only holds the mandatory empty string.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.len() <= 1
    }

    /// Iterate over `(offset, string)` pairs of every string in the heap, skipping the empty
    /// string at index 0. Invalid UTF-8 entries are skipped.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &'a str)> + 'a {
        let data = self.data;
        let mut offset = 1;

        std::iter::from_fn(move || {
            while offset < data.len() {
                let start = offset;
                let len = data[start..].iter().position(|&b| b == 0)?;
                offset = start + len + 1;

                if let Ok(s) = str::from_utf8(&data[start..start + len]) {
                    return Some((start, s));
                }
            }
            None
        })
    }
}
