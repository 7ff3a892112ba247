//! Little-endian primitive reads with bounds checking.
//!
//! All metadata structures in an ECMA-335 image are little-endian. The helpers here are the
//! lowest layer every other reader in this crate is built on: they never panic and report
//! [`crate::Error::OutOfBounds`] when a read would leave the provided slice.
//!
//! # Examples
//!
//! ```rust
//! use cilmeta::file::io::{read_le, read_le_at, read_le_at_dyn};
//!
//! let data = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06];
//! assert_eq!(read_le::<u16>(&data)?, 0x0201);
//!
//! let mut offset = 2;
//! assert_eq!(read_le_at::<u16>(&data, &mut offset)?, 0x0403);
//! assert_eq!(offset, 4);
//!
//! // Heap and table indexes are either 2 or 4 bytes wide
//! let mut offset = 0;
//! assert_eq!(read_le_at_dyn(&data, &mut offset, true)?, 0x0403_0201);
//! # Ok::<(), cilmeta::Error>(())
//! ```

use crate::{Error::OutOfBounds, Result};

/// Trait for the primitive integer types that can be read from metadata.
pub trait CilIO: Sized {
    /// The fixed-size byte array representation of this type
    type Bytes: Sized + for<'a> TryFrom<&'a [u8]>;

    /// Converts little-endian bytes into a value
    fn from_le_bytes(bytes: Self::Bytes) -> Self;
}

macro_rules! impl_cil_io {
    ($($ty:ty),+) => {
        $(
            impl CilIO for $ty {
                type Bytes = [u8; std::mem::size_of::<$ty>()];

                fn from_le_bytes(bytes: Self::Bytes) -> Self {
                    <$ty>::from_le_bytes(bytes)
                }
            }
        )+
    };
}

impl_cil_io!(u8, i8, u16, i16, u32, i32, u64, i64);

/// Reads a value of type `T` from the start of `data`.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if `data` is too short.
pub fn read_le<T: CilIO>(data: &[u8]) -> Result<T> {
    let mut offset = 0_usize;
    read_le_at(data, &mut offset)
}

/// Reads a value of type `T` at `offset` and advances `offset` past it.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if the read would leave `data`.
pub fn read_le_at<T: CilIO>(data: &[u8], offset: &mut usize) -> Result<T> {
    let type_len = std::mem::size_of::<T>();
    let Some(end) = offset.checked_add(type_len) else {
        return Err(OutOfBounds);
    };
    if end > data.len() {
        return Err(OutOfBounds);
    }

    let Ok(read) = data[*offset..end].try_into() else {
        return Err(OutOfBounds);
    };

    *offset = end;
    Ok(T::from_le_bytes(read))
}

/// Reads either a `u16` or a `u32` at `offset`, widened to `u32`.
///
/// # Arguments
/// * `data`     - The buffer to read from
/// * `offset`   - Position to read at, advanced past the value
/// * `is_large` - `true` for a 4-byte value, `false` for a 2-byte value
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if the read would leave `data`.
pub fn read_le_at_dyn(data: &[u8], offset: &mut usize, is_large: bool) -> Result<u32> {
    let res = if is_large {
        read_le_at::<u32>(data, offset)?
    } else {
        u32::from(read_le_at::<u16>(data, offset)?)
    };

    Ok(res)
}
