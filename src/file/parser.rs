//! Cursor-based byte parser for blob-heap and signature data.
//!
//! [`Parser`] keeps a position within a borrowed slice and offers bounds-checked reads of
//! little-endian primitives and of the ECMA-335 compressed integer encodings (II.23.2) used
//! throughout signatures and heap length prefixes.
//!
//! # Examples
//!
//! ```rust
//! use cilmeta::file::parser::Parser;
//!
//! let data = [0x03, 0x80, 0x80, 0x08];
//! let mut parser = Parser::new(&data);
//!
//! assert_eq!(parser.read_compressed_uint()?, 3);
//! assert_eq!(parser.read_compressed_uint()?, 0x80);
//! assert_eq!(parser.read_le::<u8>()?, 0x08);
//! assert!(!parser.has_more_data());
//! # Ok::<(), cilmeta::Error>(())
//! ```

use crate::{
    file::io::{read_le_at, CilIO},
    metadata::token::{Token, MAX_RID},
    Error::OutOfBounds,
    Result,
};

/// A cursor over a byte slice.
///
/// Cloning a `Parser` is cheap and yields an independent cursor over the same bytes.
#[derive(Clone, Debug)]
pub struct Parser<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> Parser<'a> {
    /// Create a new `Parser` positioned at the start of `data`
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Parser { data, position: 0 }
    }

    /// Total length of the underlying data
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// `true` if the underlying data is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// `true` while the cursor has not reached the end of the data
    #[must_use]
    pub fn has_more_data(&self) -> bool {
        self.position < self.data.len()
    }

    /// Move the cursor to an absolute position
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if `pos` is past the end of the data.
    pub fn seek(&mut self, pos: usize) -> Result<()> {
        if pos > self.data.len() {
            return Err(OutOfBounds);
        }

        self.position = pos;
        Ok(())
    }

    /// Move the cursor forward by one byte
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] at the end of the data.
    pub fn advance(&mut self) -> Result<()> {
        self.advance_by(1)
    }

    /// Move the cursor forward by `step` bytes
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the new position would be past the end.
    pub fn advance_by(&mut self, step: usize) -> Result<()> {
        match self.position.checked_add(step) {
            Some(new_pos) if new_pos <= self.data.len() => {
                self.position = new_pos;
                Ok(())
            }
            _ => Err(OutOfBounds),
        }
    }

    /// Current cursor position
    #[must_use]
    pub fn pos(&self) -> usize {
        self.position
    }

    /// The complete underlying data
    #[must_use]
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Read the byte at the cursor without advancing
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] at the end of the data.
    pub fn peek_byte(&self) -> Result<u8> {
        match self.data.get(self.position) {
            Some(byte) => Ok(*byte),
            None => Err(OutOfBounds),
        }
    }

    /// Read a little-endian value and advance past it
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if not enough data remains.
    pub fn read_le<T: CilIO>(&mut self) -> Result<T> {
        read_le_at::<T>(self.data, &mut self.position)
    }

    /// Read a compressed unsigned integer (ECMA-335 II.23.2)
    ///
    /// | Prefix       | Length  | Range                  |
    /// |--------------|---------|------------------------|
    /// | `0xxxxxxx`   | 1 byte  | `0x00..=0x7F`          |
    /// | `10xxxxxx`   | 2 bytes | `0x80..=0x3FFF`        |
    /// | `110xxxxx`   | 4 bytes | `0x4000..=0x1FFF_FFFF` |
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] on truncated input and
    /// [`crate::Error::Malformed`] for the invalid `111xxxxx` prefix.
    pub fn read_compressed_uint(&mut self) -> Result<u32> {
        let first_byte = self.read_le::<u8>()?;

        // 1-byte encoding: 0xxxxxxx
        if (first_byte & 0x80) == 0 {
            return Ok(u32::from(first_byte));
        }

        // 2-byte encoding: 10xxxxxx xxxxxxxx
        if (first_byte & 0xC0) == 0x80 {
            let second_byte = self.read_le::<u8>()?;
            let value = ((u32::from(first_byte) & 0x3F) << 8) | u32::from(second_byte);
            return Ok(value);
        }

        // 4-byte encoding: 110xxxxx xxxxxxxx xxxxxxxx xxxxxxxx
        if (first_byte & 0xE0) == 0xC0 {
            let b1 = u32::from(self.read_le::<u8>()?);
            let b2 = u32::from(self.read_le::<u8>()?);
            let b3 = u32::from(self.read_le::<u8>()?);
            let value = ((u32::from(first_byte) & 0x1F) << 24) | (b1 << 16) | (b2 << 8) | b3;
            return Ok(value);
        }

        Err(malformed_error!("Invalid compressed uint - {}", first_byte))
    }

    /// Read a compressed signed integer (ECMA-335 II.23.2, rotated sign bit)
    ///
    /// # Errors
    /// Propagates the errors of [`Parser::read_compressed_uint`].
    pub fn read_compressed_int(&mut self) -> Result<i32> {
        let first_byte = self.peek_byte()?;
        let unsigned = self.read_compressed_uint()?;

        let (bits, value) = if (first_byte & 0x80) == 0 {
            (7, unsigned)
        } else if (first_byte & 0xC0) == 0x80 {
            (14, unsigned)
        } else {
            (29, unsigned)
        };

        let magnitude = value >> 1;
        #[allow(clippy::cast_possible_wrap)]
        let signed = if (value & 1) == 0 {
            magnitude as i32
        } else {
            // Negative values carry the sign in the lowest bit and are sign-extended from
            // the width of the encoding
            (magnitude as i32) - (1_i32 << (bits - 1))
        };

        Ok(signed)
    }

    /// Read a `TypeDefOrRefOrSpecEncoded` token (ECMA-335 II.23.2.8)
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the tag bits select no table or the row id does
    /// not fit into a token.
    pub fn read_compressed_token(&mut self) -> Result<Token> {
        let compressed_token = self.read_compressed_uint()?;

        let table: u32 = match compressed_token & 0x3 {
            0x0 => 0x0200_0000, // TypeDef
            0x1 => 0x0100_0000, // TypeRef
            0x2 => 0x1B00_0000, // TypeSpec
            _ => {
                return Err(malformed_error!(
                    "Invalid compressed token - {}",
                    compressed_token
                ))
            }
        };

        let rid = compressed_token >> 2;
        if rid > MAX_RID {
            return Err(malformed_error!(
                "Compressed token row id out of range - 0x{:x}",
                rid
            ));
        }

        Ok(Token::new(table | rid))
    }
}
