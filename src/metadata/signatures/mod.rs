//! Signature decoding and encoding.
//!
//! Signatures are the `#Blob` heap entries that describe the types of fields, methods,
//! properties, locals and generic instantiations. They start with a calling convention byte
//! followed by a compact, recursive encoding of types.
//!
//! Reading goes through a [`SignatureContext`], which supplies the shared core library types
//! and resolves the `TypeDefOrRef` tokens embedded in the blob. [`crate::metadata::module::ModuleDef`]
//! is such a context; most callers never use [`SignatureReader`] directly but get signatures
//! from the entity getters.
//!
//! Decoding never fails loudly: a blob that is malformed, uses a type that this reader does not
//! support, or references a type that does not exist yields `None`, so a single bad signature
//! cannot abort reading the rest of a module.
//!
//! # Examples
//!
//! ```rust,no_run
//! use cilmeta::metadata::{module::ModuleDef, signatures::CallingConventionSig};
//! use std::path::Path;
//!
//! let module = ModuleDef::from_file(Path::new("tests/samples/WindowsBase.dll"))?;
//! for method in module.types().iter().flat_map(|t| t.methods()) {
//!     if let Some(CallingConventionSig::Method(sig)) = method.signature() {
//!         println!("{:?} takes {} parameters", method.name(), sig.param_count());
//!     }
//! }
//! # Ok::<(), cilmeta::Error>(())
//! ```
//!
//! # Reference
//! - [ECMA-335 II.23.2](https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf)

mod corlib;
mod reader;
mod types;
mod writer;

pub use corlib::*;
pub use reader::*;
pub use types::*;
pub use writer::*;

use std::fmt;

#[allow(non_snake_case)]
/// All `ELEMENT_TYPE`s of signatures, II.23.1.16
pub mod ELEMENT_TYPE {
    /// Marks end of a list
    pub const END: u8 = 0x00;
    /// void
    pub const VOID: u8 = 0x01;
    /// bool
    pub const BOOLEAN: u8 = 0x02;
    /// char
    pub const CHAR: u8 = 0x03;
    /// int8
    pub const I1: u8 = 0x04;
    /// unsigned int8
    pub const U1: u8 = 0x05;
    /// int16
    pub const I2: u8 = 0x06;
    /// unsigned int16
    pub const U2: u8 = 0x07;
    /// int32
    pub const I4: u8 = 0x08;
    /// unsigned int32
    pub const U4: u8 = 0x09;
    /// int64
    pub const I8: u8 = 0x0a;
    /// unsigned int64
    pub const U8: u8 = 0x0b;
    /// float32
    pub const R4: u8 = 0x0c;
    /// float64
    pub const R8: u8 = 0x0d;
    /// System.String
    pub const STRING: u8 = 0x0e;
    /// Followed by type
    pub const PTR: u8 = 0x0f;
    /// Followed by type
    pub const BYREF: u8 = 0x10;
    /// Followed by `TypeDef` or `TypeRef` token
    pub const VALUETYPE: u8 = 0x11;
    /// Followed by `TypeDef` or `TypeRef` token
    pub const CLASS: u8 = 0x12;
    /// Generic parameter in a generic type definition, represented as number
    pub const VAR: u8 = 0x13;
    /// type rank boundsCount bound1 … loCount lo1 …
    pub const ARRAY: u8 = 0x14;
    /// Generic type instantiation. Followed by type type-arg-count type-1 ... type-n
    pub const GENERICINST: u8 = 0x15;
    /// System.TypedReference
    pub const TYPEDBYREF: u8 = 0x16;
    /// Fixed-size value array, followed by type and size
    pub const VALUEARRAY: u8 = 0x17;
    /// System.IntPtr
    pub const I: u8 = 0x18;
    /// System.UIntPtr
    pub const U: u8 = 0x19;
    /// Native real
    pub const R: u8 = 0x1a;
    /// Followed by full method signature
    pub const FNPTR: u8 = 0x1b;
    /// System.Object
    pub const OBJECT: u8 = 0x1c;
    /// Single-dim array with 0 lower bound
    pub const SZARRAY: u8 = 0x1d;
    /// Generic parameter in a generic method definition, represented as number
    pub const MVAR: u8 = 0x1e;
    /// Required modifier : followed by a `TypeDef` or `TypeRef` token
    pub const CMOD_REQD: u8 = 0x1f;
    /// Optional modifier : followed by a `TypeDef` or `TypeRef` token
    pub const CMOD_OPT: u8 = 0x20;
    /// Implemented within the CLI
    pub const INTERNAL: u8 = 0x21;
    /// Type of another module, followed by a module index and type
    pub const MODULE: u8 = 0x3f;
    /// Or'd with following element types
    pub const MODIFIER: u8 = 0x40;
    /// Sentinel for vararg method signature
    pub const SENTINEL: u8 = 0x41;
    /// Denotes a local variable that points at a pinned object
    pub const PINNED: u8 = 0x45;
}

/// The calling convention byte that starts every signature, II.23.2.3
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CallingConvention(pub u8);

impl CallingConvention {
    /// Managed default
    pub const DEFAULT: u8 = 0x00;
    /// Unmanaged cdecl
    pub const C: u8 = 0x01;
    /// Unmanaged stdcall
    pub const STDCALL: u8 = 0x02;
    /// Unmanaged thiscall
    pub const THISCALL: u8 = 0x03;
    /// Unmanaged fastcall
    pub const FASTCALL: u8 = 0x04;
    /// Managed vararg
    pub const VARARG: u8 = 0x05;
    /// Field signature
    pub const FIELD: u8 = 0x06;
    /// Local variable signature
    pub const LOCAL_SIG: u8 = 0x07;
    /// Property signature
    pub const PROPERTY: u8 = 0x08;
    /// Unmanaged, calling convention in modifiers
    pub const UNMANAGED: u8 = 0x09;
    /// Generic method instantiation
    pub const GENERIC_INST: u8 = 0x0a;
    /// Native vararg
    pub const NATIVE_VARARG: u8 = 0x0b;
    /// Mask of the kind bits
    pub const MASK: u8 = 0x0f;
    /// Generic method with a generic parameter count
    pub const GENERIC: u8 = 0x10;
    /// Instance method
    pub const HAS_THIS: u8 = 0x20;
    /// `this` is passed explicitly as first parameter
    pub const EXPLICIT_THIS: u8 = 0x40;

    /// The kind bits
    #[must_use]
    pub fn kind(&self) -> u8 {
        self.0 & Self::MASK
    }

    /// `true` if this starts a method signature
    #[must_use]
    pub fn is_method(&self) -> bool {
        matches!(
            self.kind(),
            Self::DEFAULT | Self::C | Self::STDCALL | Self::THISCALL | Self::FASTCALL | Self::VARARG
        )
    }

    /// `true` if the `GENERIC` bit is set
    #[must_use]
    pub fn is_generic(&self) -> bool {
        self.0 & Self::GENERIC != 0
    }

    /// `true` if the `HAS_THIS` bit is set
    #[must_use]
    pub fn has_this(&self) -> bool {
        self.0 & Self::HAS_THIS != 0
    }

    /// `true` if the `EXPLICIT_THIS` bit is set
    #[must_use]
    pub fn explicit_this(&self) -> bool {
        self.0 & Self::EXPLICIT_THIS != 0
    }
}

impl fmt::Debug for CallingConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CallingConvention(0x{:02x})", self.0)
    }
}

impl From<u8> for CallingConvention {
    fn from(value: u8) -> Self {
        CallingConvention(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calling_convention_bits() {
        let cc = CallingConvention(0x30);
        assert!(cc.has_this());
        assert!(cc.is_generic());
        assert!(!cc.explicit_this());
        assert!(cc.is_method());
        assert_eq!(cc.kind(), CallingConvention::DEFAULT);

        assert!(!CallingConvention(CallingConvention::FIELD).is_method());
        assert!(CallingConvention(CallingConvention::VARARG).is_method());
        assert!(!CallingConvention(CallingConvention::UNMANAGED).is_method());
        assert_eq!(CallingConvention(0x28).kind(), CallingConvention::PROPERTY);
    }
}
