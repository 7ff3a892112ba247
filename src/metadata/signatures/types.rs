use std::sync::Arc;

use crate::metadata::{
    entities::{TypeDefOrRef, TypeRef},
    signatures::{CallingConvention, ELEMENT_TYPE},
    utf8string::UTF8String,
};

/// A primitive type of the core library, shared by every signature of a module
#[derive(Debug)]
pub struct CorLibTypeSig {
    /// The `ELEMENT_TYPE` of this primitive
    pub element_type: u8,
    /// The `System.*` type this primitive stands for
    pub type_ref: Arc<TypeRef>,
}

impl CorLibTypeSig {
    /// The type name, e.g. `Int32`
    #[must_use]
    pub fn name(&self) -> UTF8String {
        self.type_ref.name().unwrap_or_default()
    }
}

/// A type within a signature.
///
/// Primitive types point to the shared [`CorLibTypeSig`] instances of their module, named types
/// hold a reference to the `TypeDef`, `TypeRef` or `TypeSpec` they name, and all other
/// variants wrap the types they are built from.
#[derive(Debug, Clone)]
pub enum TypeSig {
    /// A core library primitive (`void`, `int32`, `string`, `object`, ...)
    CorLib(Arc<CorLibTypeSig>),
    /// `valuetype T`
    ValueType(TypeDefOrRef),
    /// `class T`
    Class(TypeDefOrRef),
    /// `T*`
    Ptr(Box<TypeSig>),
    /// `T&`
    ByRef(Box<TypeSig>),
    /// `T[]`
    SzArray(Box<TypeSig>),
    /// `T pinned`
    Pinned(Box<TypeSig>),
    /// A vararg sentinel marker followed by a type, where it appears outside a parameter list
    Sentinel(Box<TypeSig>),
    /// `modreq(M) T`
    CModReqd {
        /// The modifier type
        modifier: TypeDefOrRef,
        /// The modified type
        next: Box<TypeSig>,
    },
    /// `modopt(M) T`
    CModOpt {
        /// The modifier type
        modifier: TypeDefOrRef,
        /// The modified type
        next: Box<TypeSig>,
    },
    /// `!n`, a generic parameter of the declaring type
    Var(u32),
    /// `!!n`, a generic parameter of the method
    MVar(u32),
    /// A fixed-size value array
    ValueArray {
        /// The element type
        next: Box<TypeSig>,
        /// The element count
        size: u32,
    },
    /// A type of another module
    Module {
        /// Module index
        index: u32,
        /// The type
        next: Box<TypeSig>,
    },
}

impl TypeSig {
    /// The `ELEMENT_TYPE` tag this type is written with
    #[must_use]
    pub fn element_type(&self) -> u8 {
        match self {
            TypeSig::CorLib(corlib) => corlib.element_type,
            TypeSig::ValueType(_) => ELEMENT_TYPE::VALUETYPE,
            TypeSig::Class(_) => ELEMENT_TYPE::CLASS,
            TypeSig::Ptr(_) => ELEMENT_TYPE::PTR,
            TypeSig::ByRef(_) => ELEMENT_TYPE::BYREF,
            TypeSig::SzArray(_) => ELEMENT_TYPE::SZARRAY,
            TypeSig::Pinned(_) => ELEMENT_TYPE::PINNED,
            TypeSig::Sentinel(_) => ELEMENT_TYPE::SENTINEL,
            TypeSig::CModReqd { .. } => ELEMENT_TYPE::CMOD_REQD,
            TypeSig::CModOpt { .. } => ELEMENT_TYPE::CMOD_OPT,
            TypeSig::Var(_) => ELEMENT_TYPE::VAR,
            TypeSig::MVar(_) => ELEMENT_TYPE::MVAR,
            TypeSig::ValueArray { .. } => ELEMENT_TYPE::VALUEARRAY,
            TypeSig::Module { .. } => ELEMENT_TYPE::MODULE,
        }
    }

    /// The wrapped type of a wrapper variant
    #[must_use]
    pub fn next(&self) -> Option<&TypeSig> {
        match self {
            TypeSig::Ptr(next)
            | TypeSig::ByRef(next)
            | TypeSig::SzArray(next)
            | TypeSig::Pinned(next)
            | TypeSig::Sentinel(next)
            | TypeSig::CModReqd { next, .. }
            | TypeSig::CModOpt { next, .. }
            | TypeSig::ValueArray { next, .. }
            | TypeSig::Module { next, .. } => Some(next),
            _ => None,
        }
    }

    /// The type after stripping all custom modifiers and `pinned`
    #[must_use]
    pub fn remove_modifiers(&self) -> &TypeSig {
        match self {
            TypeSig::CModReqd { next, .. } | TypeSig::CModOpt { next, .. } | TypeSig::Pinned(next) => {
                next.remove_modifiers()
            }
            _ => self,
        }
    }

    /// `true` for `void`
    #[must_use]
    pub fn is_void(&self) -> bool {
        matches!(self, TypeSig::CorLib(corlib) if corlib.element_type == ELEMENT_TYPE::VOID)
    }
}

impl PartialEq for TypeSig {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (TypeSig::CorLib(a), TypeSig::CorLib(b)) => a.element_type == b.element_type,
            (TypeSig::ValueType(a), TypeSig::ValueType(b))
            | (TypeSig::Class(a), TypeSig::Class(b)) => a == b,
            (TypeSig::Ptr(a), TypeSig::Ptr(b))
            | (TypeSig::ByRef(a), TypeSig::ByRef(b))
            | (TypeSig::SzArray(a), TypeSig::SzArray(b))
            | (TypeSig::Pinned(a), TypeSig::Pinned(b))
            | (TypeSig::Sentinel(a), TypeSig::Sentinel(b)) => a == b,
            (
                TypeSig::CModReqd { modifier: ma, next: na },
                TypeSig::CModReqd { modifier: mb, next: nb },
            )
            | (
                TypeSig::CModOpt { modifier: ma, next: na },
                TypeSig::CModOpt { modifier: mb, next: nb },
            ) => ma == mb && na == nb,
            (TypeSig::Var(a), TypeSig::Var(b)) | (TypeSig::MVar(a), TypeSig::MVar(b)) => a == b,
            (
                TypeSig::ValueArray { next: na, size: sa },
                TypeSig::ValueArray { next: nb, size: sb },
            ) => sa == sb && na == nb,
            (
                TypeSig::Module { index: ia, next: na },
                TypeSig::Module { index: ib, next: nb },
            ) => ia == ib && na == nb,
            _ => false,
        }
    }
}

/// Method and property signatures (II.23.2.1, II.23.2.5)
#[derive(Debug, Clone, PartialEq)]
pub struct MethodBaseSig {
    /// Calling convention byte
    pub calling_convention: CallingConvention,
    /// Number of generic parameters, 0 unless the `GENERIC` bit is set
    pub generic_param_count: u32,
    /// Return type (methods) or property type
    pub ret_type: TypeSig,
    /// Parameters before the sentinel
    pub params: Vec<TypeSig>,
    /// Parameters after the vararg sentinel, `None` if the signature has no sentinel
    pub params_after_sentinel: Option<Vec<TypeSig>>,
}

impl MethodBaseSig {
    /// A method signature without sentinel
    #[must_use]
    pub fn new(calling_convention: CallingConvention, ret_type: TypeSig, params: Vec<TypeSig>) -> Self {
        MethodBaseSig {
            calling_convention,
            generic_param_count: 0,
            ret_type,
            params,
            params_after_sentinel: None,
        }
    }

    /// Total parameter count, sentinel tail included
    #[must_use]
    pub fn param_count(&self) -> usize {
        self.params.len() + self.params_after_sentinel.as_ref().map_or(0, Vec::len)
    }
}

/// A field signature (II.23.2.4)
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSig {
    /// Calling convention byte, always `FIELD`
    pub calling_convention: CallingConvention,
    /// The field type
    pub field_type: TypeSig,
}

/// A local variable signature (II.23.2.6)
#[derive(Debug, Clone, PartialEq)]
pub struct LocalSig {
    /// Calling convention byte, always `LOCAL_SIG`
    pub calling_convention: CallingConvention,
    /// The local variable types
    pub locals: Vec<TypeSig>,
}

/// A generic method instantiation (II.23.2.15)
#[derive(Debug, Clone, PartialEq)]
pub struct GenericInstMethodSig {
    /// Calling convention byte, always `GENERIC_INST`
    pub calling_convention: CallingConvention,
    /// The generic arguments
    pub generic_args: Vec<TypeSig>,
}

/// Any signature stored in the `#Blob` heap that starts with a calling convention
#[derive(Debug, Clone, PartialEq)]
pub enum CallingConventionSig {
    /// `MethodDefSig`, `MethodRefSig` or `StandAloneMethodSig`
    Method(MethodBaseSig),
    /// `PropertySig`
    Property(MethodBaseSig),
    /// `FieldSig`
    Field(FieldSig),
    /// `LocalVarSig`
    LocalSig(LocalSig),
    /// `MethodSpec` instantiation
    GenericInstMethod(GenericInstMethodSig),
}

impl CallingConventionSig {
    /// The calling convention byte
    #[must_use]
    pub fn calling_convention(&self) -> CallingConvention {
        match self {
            CallingConventionSig::Method(sig) | CallingConventionSig::Property(sig) => {
                sig.calling_convention
            }
            CallingConventionSig::Field(sig) => sig.calling_convention,
            CallingConventionSig::LocalSig(sig) => sig.calling_convention,
            CallingConventionSig::GenericInstMethod(sig) => sig.calling_convention,
        }
    }

    /// The method signature, if this is one
    #[must_use]
    pub fn as_method(&self) -> Option<&MethodBaseSig> {
        match self {
            CallingConventionSig::Method(sig) => Some(sig),
            _ => None,
        }
    }

    /// The property signature, if this is one
    #[must_use]
    pub fn as_property(&self) -> Option<&MethodBaseSig> {
        match self {
            CallingConventionSig::Property(sig) => Some(sig),
            _ => None,
        }
    }

    /// The field signature, if this is one
    #[must_use]
    pub fn as_field(&self) -> Option<&FieldSig> {
        match self {
            CallingConventionSig::Field(sig) => Some(sig),
            _ => None,
        }
    }

    /// The local variable signature, if this is one
    #[must_use]
    pub fn as_locals(&self) -> Option<&LocalSig> {
        match self {
            CallingConventionSig::LocalSig(sig) => Some(sig),
            _ => None,
        }
    }

    /// The generic instantiation, if this is one
    #[must_use]
    pub fn as_generic_inst(&self) -> Option<&GenericInstMethodSig> {
        match self {
            CallingConventionSig::GenericInstMethod(sig) => Some(sig),
            _ => None,
        }
    }
}
