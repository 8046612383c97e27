//! Bounds-checked little-endian primitive reads.
//!
//! Every typed read in this crate funnels through [`read_le_at`], which validates
//! `offset + size_of::<T>() <= data.len()` once, centrally, and returns [`crate::Error::OutOfBounds`]
//! otherwise. Higher level readers ([`crate::file::parser::Parser`],
//! [`crate::file::MemoryBlock`], the table column readers) never index raw slices on their own.
//!
//! # Key Components
//!
//! - [`CilIO`] - Trait describing how a primitive is decoded from its byte representation
//! - [`read_le_at`] - Little-endian read that advances an offset
//!
//! # Examples
//!
//! ```rust,ignore
//! use ironscope::file::io::read_le_at;
//!
//! let data = [0x01, 0x00, 0x02, 0x00, 0x00, 0x00];
//! let mut offset = 0;
//! let first: u16 = read_le_at(&data, &mut offset)?;
//! let second: u32 = read_le_at(&data, &mut offset)?;
//! assert_eq!((first, second, offset), (1, 2, 6));
//! # Ok::<(), ironscope::Error>(())
//! ```

use crate::{Error::OutOfBounds, Result};

/// Trait for primitives that can be decoded from a fixed-size byte array.
///
/// Implemented for all fixed-width integers. The associated `Bytes` type is the exact array
/// size of the primitive, so a successful `try_into()` from a slice guarantees the length.
pub trait CilIO: Sized {
    /// The byte array representation of this type
    type Bytes: Sized + for<'a> TryFrom<&'a [u8]>;

    /// Decode a value from its little-endian byte representation
    fn from_le_bytes(bytes: Self::Bytes) -> Self;
}

macro_rules! impl_cil_io {
    ($($ty:ty),* $(,)?) => {
        $(
            impl CilIO for $ty {
                type Bytes = [u8; std::mem::size_of::<$ty>()];

                fn from_le_bytes(bytes: Self::Bytes) -> Self {
                    <$ty>::from_le_bytes(bytes)
                }
            }
        )*
    };
}

impl_cil_io!(u8, i8, u16, i16, u32, i32, u64, i64);

/// Read a little-endian value at `offset` and advance `offset` past it.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if the read would exceed `data`. The offset is left
/// untouched in that case.
pub fn read_le_at<T: CilIO>(data: &[u8], offset: &mut usize) -> Result<T> {
    let bytes = take::<T>(data, *offset)?;
    *offset += std::mem::size_of::<T>();

    Ok(T::from_le_bytes(bytes))
}

fn take<T: CilIO>(data: &[u8], offset: usize) -> Result<T::Bytes> {
    let type_len = std::mem::size_of::<T>();
    let Some(end) = offset.checked_add(type_len) else {
        return Err(OutOfBounds);
    };

    if end > data.len() {
        return Err(OutOfBounds);
    }

    data[offset..end].try_into().map_err(|_| OutOfBounds)
}
