//! Byte-exact metadata strings.
//!
//! The runtime compares `#Strings` heap entries byte by byte, so two names that decode to the
//! same text but are encoded differently (an overlong UTF-8 sequence, for instance) name
//! different things. [`UTF8String`] keeps the raw bytes and bases equality, ordering and hashing
//! on them; the decoded text is produced lazily, and only for display.

use std::{
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
    sync::OnceLock,
};

/// A string from metadata, compared by its raw bytes.
///
/// # Examples
///
/// ```rust
/// use cilmeta::metadata::utf8string::UTF8String;
///
/// let name = UTF8String::from("Object");
/// assert_eq!(name, "Object");
/// assert_eq!(name.as_bytes(), b"Object");
///
/// // Different encodings that both decode to replacement characters are still different
/// let a = UTF8String::new(b"\xC1\x81".to_vec());
/// let b = UTF8String::new(b"\xFF\xFE".to_vec());
/// assert_eq!(a.to_string(), b.to_string());
/// assert_ne!(a, b);
/// ```
#[derive(Clone, Default)]
pub struct UTF8String {
    data: Vec<u8>,
    decoded: OnceLock<String>,
}

impl UTF8String {
    /// Wrap raw bytes
    #[must_use]
    pub fn new(data: Vec<u8>) -> Self {
        UTF8String {
            data,
            decoded: OnceLock::new(),
        }
    }

    /// The raw bytes
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Decoded text; invalid sequences become U+FFFD
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.decoded
            .get_or_init(|| String::from_utf8_lossy(&self.data).into_owned())
    }

    /// Length in bytes
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// `true` for the empty string
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// `true` if the bytes are valid UTF-8
    #[must_use]
    pub fn is_valid_utf8(&self) -> bool {
        std::str::from_utf8(&self.data).is_ok()
    }
}

impl PartialEq for UTF8String {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data
    }
}

impl Eq for UTF8String {}

impl PartialEq<str> for UTF8String {
    fn eq(&self, other: &str) -> bool {
        self.data == other.as_bytes()
    }
}

impl PartialEq<&str> for UTF8String {
    fn eq(&self, other: &&str) -> bool {
        self.data == other.as_bytes()
    }
}

impl PartialOrd for UTF8String {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for UTF8String {
    fn cmp(&self, other: &Self) -> Ordering {
        self.data.cmp(&other.data)
    }
}

impl Hash for UTF8String {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.data.hash(state);
    }
}

impl From<&str> for UTF8String {
    fn from(value: &str) -> Self {
        UTF8String::new(value.as_bytes().to_vec())
    }
}

impl From<String> for UTF8String {
    fn from(value: String) -> Self {
        UTF8String::new(value.into_bytes())
    }
}

impl From<&[u8]> for UTF8String {
    fn from(value: &[u8]) -> Self {
        UTF8String::new(value.to_vec())
    }
}

impl fmt::Display for UTF8String {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for UTF8String {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.as_str())
    }
}
