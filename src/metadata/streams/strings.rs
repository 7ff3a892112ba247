//! The `#Strings` heap.
//!
//! Identifier strings referenced by the tables, stored as NUL-terminated UTF-8. Offset 0 is
//! always the empty string.
//!
//! # Reference
//! - [ECMA-335 II.24.2.3](https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf)

use std::str;

use crate::{Error::OutOfBounds, Result};

/// View over a `#Strings` heap.
///
/// # Examples
///
/// ```rust
/// use cilmeta::metadata::streams::Strings;
///
/// let data = b"\0<Module>\0System\0";
/// let strings = Strings::from(data)?;
/// assert_eq!(strings.get(1)?, "<Module>");
/// assert_eq!(strings.get_bytes(10)?, b"System");
/// # Ok::<(), cilmeta::Error>(())
/// ```
#[derive(Clone, Copy, Debug)]
pub struct Strings<'a> {
    data: &'a [u8],
}

impl<'a> Strings<'a> {
    /// Create a `Strings` heap view
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the heap is empty or does not start with NUL.
    pub fn from(data: &'a [u8]) -> Result<Strings<'a>> {
        if data.is_empty() || data[0] != 0 {
            return Err(malformed_error!("Provided #Strings heap is empty"));
        }

        Ok(Strings { data })
    }

    /// The raw bytes of the string at `index`, without its terminator
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if `index` is outside the heap and
    /// [`crate::Error::Malformed`] if the string is not terminated.
    pub fn get_bytes(&self, index: usize) -> Result<&'a [u8]> {
        if index >= self.data.len() {
            return Err(OutOfBounds);
        }

        let tail = &self.data[index..];
        match tail.iter().position(|byte| *byte == 0) {
            Some(len) => Ok(&tail[..len]),
            None => Err(malformed_error!("Unterminated string at index - {}", index)),
        }
    }

    /// The string at `index`
    ///
    /// # Errors
    /// Like [`Strings::get_bytes`], and [`crate::Error::Malformed`] if the bytes are not valid
    /// UTF-8.
    pub fn get(&self, index: usize) -> Result<&'a str> {
        let bytes = self.get_bytes(index)?;
        str::from_utf8(bytes).map_err(|_| malformed_error!("Invalid string at index - {}", index))
    }

    /// Size of the heap in bytes
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// `true` if the heap holds no bytes
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crafted() {
        #[rustfmt::skip]
        let data : [u8; 47] = [
            0x00,
            0x3c, 0x4d, 0x61, 0x69, 0x6e, 0x3e, 0x24, 0x00,
            0x43, 0x5f, 0x53, 0x68, 0x61, 0x72, 0x70, 0x5f, 0x50, 0x4f, 0x43, 0x5f, 0x31, 0x00,
            0x3c, 0x4d, 0x6f, 0x64, 0x75, 0x6c, 0x65, 0x3e, 0x00,
            0x53, 0x79, 0x73, 0x74, 0x65, 0x6d, 0x2e, 0x43, 0x6f, 0x6e, 0x73, 0x6f, 0x6c, 0x65, 0x00,
        ];

        let str_view = Strings::from(&data).unwrap();

        assert_eq!(str_view.get(0).unwrap(), "");
        assert_eq!(str_view.get(1).unwrap(), "<Main>$");
        assert_eq!(str_view.get(9).unwrap(), "C_Sharp_POC_1");
        assert_eq!(str_view.get(23).unwrap(), "<Module>");
        assert_eq!(str_view.get(32).unwrap(), "System.Console");
        // Offsets may point into the middle of a string
        assert_eq!(str_view.get(39).unwrap(), "Console");
    }

    #[test]
    fn invalid() {
        assert!(Strings::from(&[]).is_err());
        assert!(Strings::from(b"A\0").is_err());

        let strings = Strings::from(b"\0\xC1\x81\0abc").unwrap();
        assert_eq!(strings.get_bytes(1).unwrap(), b"\xC1\x81");
        assert!(strings.get(1).is_err());
        assert!(strings.get(4).is_err());
        assert!(matches!(strings.get(7), Err(OutOfBounds)));
    }
}
