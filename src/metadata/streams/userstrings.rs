//! The `#US` heap.
//!
//! String literals used by IL code (`ldstr`). Each entry is a compressed byte length followed
//! by UTF-16LE code units and one trailing flag byte that is set when any character needs
//! special handling beyond plain ASCII.
//!
//! # Reference
//! - [ECMA-335 II.24.2.4](https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf)

use widestring::U16String;

use crate::{file::parser::Parser, Error::OutOfBounds, Result};

/// View over a `#US` heap.
///
/// # Examples
///
/// ```rust
/// use cilmeta::metadata::streams::UserStrings;
///
/// let data = [0x00, 0x05, b'H', 0x00, b'i', 0x00, 0x00];
/// let us = UserStrings::from(&data)?;
/// assert_eq!(us.get(1)?.to_string_lossy(), "Hi");
/// # Ok::<(), cilmeta::Error>(())
/// ```
#[derive(Clone, Copy, Debug)]
pub struct UserStrings<'a> {
    data: &'a [u8],
}

impl<'a> UserStrings<'a> {
    /// Create a `UserStrings` heap view
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the heap is empty or does not start with 0.
    pub fn from(data: &'a [u8]) -> Result<UserStrings<'a>> {
        if data.is_empty() || data[0] != 0 {
            return Err(OutOfBounds);
        }

        Ok(UserStrings { data })
    }

    /// The string at `index`
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the entry leaves the heap and
    /// [`crate::Error::Malformed`] if its length is not `2 * n + 1`.
    pub fn get(&self, index: usize) -> Result<U16String> {
        let (payload, _) = self.entry(index)?;

        let units: Vec<u16> = payload
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();

        Ok(U16String::from_vec(units))
    }

    /// The trailing flag byte of the entry at `index`
    ///
    /// # Errors
    /// Like [`UserStrings::get`].
    pub fn has_special_chars(&self, index: usize) -> Result<bool> {
        let (_, flag) = self.entry(index)?;
        Ok(flag != 0)
    }

    fn entry(&self, index: usize) -> Result<(&'a [u8], u8)> {
        if index >= self.data.len() {
            return Err(OutOfBounds);
        }

        let mut parser = Parser::new(&self.data[index..]);
        let len = parser.read_compressed_uint()? as usize;
        if len == 0 {
            return Ok((&[], 0));
        }

        if len % 2 != 1 {
            return Err(malformed_error!(
                "Invalid user string length {} at index - {}",
                len,
                index
            ));
        }

        let Some(start) = index.checked_add(parser.pos()) else {
            return Err(OutOfBounds);
        };
        let Some(end) = start.checked_add(len) else {
            return Err(OutOfBounds);
        };
        if end > self.data.len() {
            return Err(OutOfBounds);
        }

        Ok((&self.data[start..end - 1], self.data[end - 1]))
    }
}
