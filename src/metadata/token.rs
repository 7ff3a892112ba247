//! Metadata tokens.
//!
//! A token is the universal identity of a metadata entity: the upper byte selects the table
//! and the lower 24 bits hold the 1-based row id (RID) within that table. A RID of zero never
//! addresses a row and marks the token as null.
//!
//! # Examples
//!
//! ```rust
//! use cilmeta::metadata::{tables::TableId, token::Token};
//!
//! let token = Token::from_parts(TableId::MethodDef, 1);
//! assert_eq!(token.value(), 0x0600_0001);
//! assert_eq!(token.table_id(), Some(TableId::MethodDef));
//! assert_eq!(token.rid(), 1);
//! assert!(!token.is_null());
//! ```

use std::fmt;

use crate::metadata::tables::TableId;

/// Largest row id a token can carry
pub const MAX_RID: u32 = 0x00FF_FFFF;

/// A metadata token; equality, hashing and ordering are those of the raw 32-bit value.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Token(pub u32);

impl Token {
    /// Create a token from its raw value
    #[must_use]
    pub fn new(value: u32) -> Self {
        Token(value)
    }

    /// Create a token from a table and a row id
    ///
    /// `rid` must fit into 24 bits; larger values are a programming error.
    #[must_use]
    pub fn from_parts(table: TableId, rid: u32) -> Self {
        debug_assert!(rid <= MAX_RID, "rid 0x{rid:x} does not fit into a token");
        Token(((table as u32) << 24) | (rid & MAX_RID))
    }

    /// The raw 32-bit value
    #[must_use]
    pub fn value(&self) -> u32 {
        self.0
    }

    /// The table byte of this token
    #[must_use]
    pub fn table(&self) -> u8 {
        (self.0 >> 24) as u8
    }

    /// The table of this token, if the table byte names a known table
    #[must_use]
    pub fn table_id(&self) -> Option<TableId> {
        TableId::from_u8(self.table())
    }

    /// The 1-based row id within the table
    #[must_use]
    pub fn rid(&self) -> u32 {
        self.0 & MAX_RID
    }

    /// A token with a zero row id addresses nothing
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.rid() == 0
    }
}

impl From<u32> for Token {
    fn from(value: u32) -> Self {
        Token(value)
    }
}

impl From<Token> for u32 {
    fn from(token: Token) -> Self {
        token.0
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Token(0x{:08x}, table: 0x{:02x}, rid: {})",
            self.0,
            self.table(),
            self.rid()
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use strum::IntoEnumIterator;

    #[test]
    fn parts() {
        for table in TableId::iter() {
            for rid in [0, 1, 0xFFFF, 0x10000, MAX_RID] {
                let token = Token::from_parts(table, rid);
                assert_eq!(token.table_id(), Some(table));
                assert_eq!(token.rid(), rid);
                assert_eq!(token.is_null(), rid == 0);
            }
        }
    }

    #[test]
    fn null() {
        assert!(Token::new(0).is_null());
        assert!(Token::from_parts(TableId::Module, 0).is_null());
        assert!(Token::new(0x0200_0000).is_null());
        assert!(!Token::new(0x0200_0001).is_null());
    }

    #[test]
    fn table() {
        let token = Token(0x06000001);
        assert_eq!(token.table(), 0x06);
        assert_eq!(token.rid(), 1);

        let token = Token(0x06FFFFFF);
        assert_eq!(token.rid(), 0x00FFFFFF);

        assert_eq!(Token(0x7000_0001).table_id(), None);
    }

    #[test]
    fn conversion() {
        let value = 0x06000001u32;
        let token: Token = value.into();
        assert_eq!(token.value(), value);

        let back_to_u32: u32 = token.into();
        assert_eq!(back_to_u32, value);
    }

    #[test]
    fn formatting() {
        let token = Token(0x06000001);
        assert_eq!(format!("{}", token), "0x06000001");

        let debug_str = format!("{:?}", token);
        assert!(debug_str.contains("Token(0x06000001"));
        assert!(debug_str.contains("table: 0x06"));
        assert!(debug_str.contains("rid: 1"));
    }

    #[test]
    fn ordering() {
        let token1 = Token(0x06000001);
        let token2 = Token(0x06000002);
        let token3 = Token(0x07000001);

        assert!(token1 < token2);
        assert!(token2 < token3);

        let mut map = HashMap::new();
        map.insert(token1, "Method1");
        map.insert(token2, "Method2");
        assert_eq!(map.get(&Token(0x06000002)), Some(&"Method2"));
    }
}
