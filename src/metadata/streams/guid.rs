//! The `#GUID` heap (ECMA-335 II.24.2.5).
//!
//! A flat array of 16-byte GUIDs addressed by a 1-based index. Index 0 denotes "no GUID".

use crate::{Error::OutOfBounds, Result};

const GUID_SIZE: usize = 16;

/// A zero-copy view over the `#GUID` heap.
#[derive(Clone, Copy, Debug)]
pub struct Guid<'a> {
    data: &'a [u8],
}

impl<'a> Guid<'a> {
    /// Wrap and validate the heap bytes.
    ///
    /// # Errors
    /// Returns [`crate::Error::BadImageFormat`] if the heap size is not a multiple of 16.
    pub fn from(data: &'a [u8]) -> Result<Guid<'a>> {
        if data.len() % GUID_SIZE != 0 {
            return Err(malformed_error!(
                "#GUID heap size {} is not a multiple of 16",
                data.len()
            ));
        }

        Ok(Guid { data })
    }

    /// The GUID at 1-based `index`; index 0 yields the all-zero GUID.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if `index` exceeds the number of entries.
    pub fn get(&self, index: usize) -> Result<uguid::Guid> {
        if index == 0 {
            return Ok(uguid::Guid::ZERO);
        }

        let start = (index - 1).checked_mul(GUID_SIZE).ok_or(OutOfBounds)?;
        let Some(bytes) = self.data.get(start..start + GUID_SIZE) else {
            return Err(OutOfBounds);
        };

        let mut buffer = [0_u8; GUID_SIZE];
        buffer.copy_from_slice(bytes);

        Ok(uguid::Guid::from_bytes(buffer))
    }

    /// Number of GUIDs in the heap.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len() / GUID_SIZE
    }

    /// Returns `true` if the heap holds no GUIDs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
