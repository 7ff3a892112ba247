//! # cilmeta Prelude
//!
//! The types most programs need to load a module and walk its entities.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

pub use crate::{Error, Result};

// ================================================================================================
// Loading
// ================================================================================================

pub use crate::{
    file::{parser::Parser, File},
    metadata::{config::LoadOptions, module::ModuleDef, view::MetadataView},
};

// ================================================================================================
// Entities
// ================================================================================================

pub use crate::metadata::entities::{
    AssemblyDef, AssemblyRef, Constant, CustomAttribute, DeclSecurity, Entity, EntityRef,
    EventDef, ExportedType, FieldDef, FileDef, GenericParam, GenericParamConstraint,
    InterfaceImpl, ManifestResource, MdEntity, MemberRef, MethodDef, MethodSpec, ModuleRef,
    ParamDef, PropertyDef, StandAloneSig, TypeDef, TypeDefOrRef, TypeRef, TypeSpec,
};

// ================================================================================================
// Signatures and Identity
// ================================================================================================

pub use crate::metadata::{
    identity::{AssemblyVersion, HashAlgorithm, PublicKeyOrToken, PublicKeyToken},
    signatures::{
        CallingConvention, CallingConventionSig, CorLibTypes, FieldSig, LocalSig, MethodBaseSig,
        SignatureReader, SignatureWriter, TypeSig, ELEMENT_TYPE,
    },
};

// ================================================================================================
// Tables
// ================================================================================================

pub use crate::metadata::{
    lazy::UserValue,
    tables::{CodedIndexType, MetadataTable, TableId},
    token::Token,
    utf8string::UTF8String,
};
