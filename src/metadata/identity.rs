//! Strong-name identity of assemblies.
//!
//! An assembly carries either its full public key or the 8-byte public key token derived from
//! it. The token is the tail of a hash of the key: the last 8 bytes of the digest, in reverse
//! order. The hash algorithm is the one declared by the assembly; algorithms this crate does
//! not implement fall back to SHA-1, which is also what the runtime uses for display names.
//!
//! # Examples
//!
//! ```rust
//! use cilmeta::metadata::identity::{public_key_token, HashAlgorithm};
//!
//! // The ECMA standard key
//! let key = [0u8, 0, 0, 0, 0, 0, 0, 0, 4, 0, 0, 0, 0, 0, 0, 0];
//! let token = public_key_token(&key, HashAlgorithm::Sha1);
//! assert_eq!(token.to_string(), "b77a5c561934e089");
//! ```

use std::fmt::{self, Write};

use md5::{Digest, Md5};
use sha1::Sha1;

use crate::{Error::OutOfBounds, Result};

/// Assembly flag: the `PublicKey` column holds a full key, not a token
pub const ASSEMBLY_FLAG_PUBLIC_KEY: u32 = 0x0001;

/// Hash algorithm identifiers of `Assembly.HashAlgId`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum HashAlgorithm {
    /// No algorithm declared
    #[default]
    None,
    /// `CALG_MD5`
    Md5,
    /// `CALG_SHA1`
    Sha1,
    /// `CALG_SHA_256`
    Sha256,
    /// `CALG_SHA_384`
    Sha384,
    /// `CALG_SHA_512`
    Sha512,
}

impl HashAlgorithm {
    /// Map a `HashAlgId` value; unknown identifiers map to [`HashAlgorithm::None`]
    #[must_use]
    pub fn from_id(id: u32) -> Self {
        match id {
            0x8003 => HashAlgorithm::Md5,
            0x8004 => HashAlgorithm::Sha1,
            0x800C => HashAlgorithm::Sha256,
            0x800D => HashAlgorithm::Sha384,
            0x800E => HashAlgorithm::Sha512,
            _ => HashAlgorithm::None,
        }
    }

    /// The `HashAlgId` value
    #[must_use]
    pub fn id(&self) -> u32 {
        match self {
            HashAlgorithm::None => 0,
            HashAlgorithm::Md5 => 0x8003,
            HashAlgorithm::Sha1 => 0x8004,
            HashAlgorithm::Sha256 => 0x800C,
            HashAlgorithm::Sha384 => 0x800D,
            HashAlgorithm::Sha512 => 0x800E,
        }
    }

    /// Hash `data`; anything but MD5 is hashed with SHA-1
    #[must_use]
    pub fn hash(&self, data: &[u8]) -> Vec<u8> {
        match self {
            HashAlgorithm::Md5 => {
                let mut hasher = Md5::new();
                hasher.update(data);
                hasher.finalize().to_vec()
            }
            _ => {
                let mut hasher = Sha1::new();
                hasher.update(data);
                hasher.finalize().to_vec()
            }
        }
    }
}

/// An 8-byte public key token, in display order
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct PublicKeyToken(pub [u8; 8]);

impl PublicKeyToken {
    /// Read a token stored as 8 raw bytes
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] unless `data` is exactly 8 bytes long.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let bytes: [u8; 8] = data.try_into().map_err(|_| OutOfBounds)?;
        Ok(PublicKeyToken(bytes))
    }

    /// The token bytes
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 8] {
        &self.0
    }
}

impl fmt::Display for PublicKeyToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for PublicKeyToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKeyToken({self})")
    }
}

/// Derive the public key token of `key`
///
/// The token is the last 8 bytes of the hash, reversed.
#[must_use]
pub fn public_key_token(key: &[u8], algorithm: HashAlgorithm) -> PublicKeyToken {
    let digest = algorithm.hash(key);

    let mut token = [0u8; 8];
    for (dst, src) in token.iter_mut().zip(digest.iter().rev()) {
        *dst = *src;
    }

    PublicKeyToken(token)
}

/// The strong-name part of an assembly identity
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum PublicKeyOrToken {
    /// Full public key blob
    Key(Vec<u8>),
    /// Public key token
    Token(PublicKeyToken),
    /// Not strong-named
    #[default]
    None,
}

impl PublicKeyOrToken {
    /// Interpret a `PublicKey`/`PublicKeyOrToken` blob
    ///
    /// An empty blob means no strong name. Otherwise the `PublicKey` flag decides between a key
    /// and a token; a token blob that is not 8 bytes long is kept as a key.
    #[must_use]
    pub fn from_blob(data: &[u8], flags: u32) -> Self {
        if data.is_empty() {
            return PublicKeyOrToken::None;
        }

        if flags & ASSEMBLY_FLAG_PUBLIC_KEY != 0 {
            return PublicKeyOrToken::Key(data.to_vec());
        }

        match PublicKeyToken::from_bytes(data) {
            Ok(token) => PublicKeyOrToken::Token(token),
            Err(_) => PublicKeyOrToken::Key(data.to_vec()),
        }
    }

    /// The token, derived with `algorithm` if this is a full key
    #[must_use]
    pub fn token(&self, algorithm: HashAlgorithm) -> Option<PublicKeyToken> {
        match self {
            PublicKeyOrToken::Key(key) => Some(public_key_token(key, algorithm)),
            PublicKeyOrToken::Token(token) => Some(*token),
            PublicKeyOrToken::None => None,
        }
    }

    /// `true` if neither key nor token is present
    #[must_use]
    pub fn is_none(&self) -> bool {
        matches!(self, PublicKeyOrToken::None)
    }
}

/// A four-part assembly version
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct AssemblyVersion {
    /// Major version
    pub major: u16,
    /// Minor version
    pub minor: u16,
    /// Build number
    pub build: u16,
    /// Revision number
    pub revision: u16,
}

impl AssemblyVersion {
    /// Create a version
    #[must_use]
    pub fn new(major: u16, minor: u16, build: u16, revision: u16) -> Self {
        AssemblyVersion {
            major,
            minor,
            build,
            revision,
        }
    }
}

impl fmt::Display for AssemblyVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.major, self.minor, self.build, self.revision
        )
    }
}

/// Format an assembly display name
///
/// `Name, Version=M.m.b.r, Culture=<culture|neutral>, PublicKeyToken=<hex|null>`. With
/// `with_key` set and a full key present, the key itself is written as `PublicKey=<hex>`.
#[must_use]
pub fn display_name(
    name: &str,
    version: AssemblyVersion,
    culture: Option<&str>,
    strong_name: &PublicKeyOrToken,
    algorithm: HashAlgorithm,
    with_key: bool,
) -> String {
    let mut result = String::with_capacity(name.len() + 80);

    result.push_str(name);
    let _ = write!(result, ", Version={version}");

    let culture = culture.filter(|c| !c.is_empty()).unwrap_or("neutral");
    let _ = write!(result, ", Culture={culture}");

    match strong_name {
        PublicKeyOrToken::Key(key) if with_key => {
            result.push_str(", PublicKey=");
            for byte in key {
                let _ = write!(result, "{byte:02x}");
            }
        }
        other => match other.token(algorithm) {
            Some(token) => {
                let _ = write!(result, ", PublicKeyToken={token}");
            }
            None => result.push_str(", PublicKeyToken=null"),
        },
    }

    result
}
