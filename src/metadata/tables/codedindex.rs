//! Coded tokens: polymorphic references into one of several tables.
//!
//! A coded index packs a table selector into its lowest `bits` bits and the row id into the
//! remaining ones. The selector is the position of the target table within a fixed, ordered
//! list that ECMA-335 II.24.2.6 defines per kind. `CustomAttributeType` starts with two reserved
//! slots; a value selecting a reserved or missing slot does not reference anything and fails to
//! decode, as does a row id wider than a token can hold.
//!
//! # Examples
//!
//! ```rust
//! use cilmeta::metadata::tables::{CodedIndexType, TableId};
//!
//! let kind = CodedIndexType::TypeDefOrRef;
//! let value = kind.encode(TableId::TypeRef, 5)?;
//! assert_eq!(value, (5 << 2) | 1);
//! assert_eq!(kind.decode(value), Some((TableId::TypeRef, 5)));
//!
//! // MemberRef is not a TypeDefOrRef target
//! assert!(kind.encode(TableId::MemberRef, 1).is_err());
//! # Ok::<(), cilmeta::Error>(())
//! ```

use strum::{EnumCount, EnumIter};

use crate::{
    metadata::{
        tables::TableId,
        token::{Token, MAX_RID},
    },
    Error, Result,
};

/// All coded index kinds of ECMA-335 II.24.2.6.
#[derive(Debug, Hash, Eq, PartialEq, Clone, Copy, EnumIter, EnumCount)]
pub enum CodedIndexType {
    /// `TypeDef`, `TypeRef` or `TypeSpec`
    TypeDefOrRef,
    /// `Field`, `Param` or `Property`
    HasConstant,
    /// Almost every table that can carry a custom attribute
    HasCustomAttribute,
    /// `Field` or `Param`
    HasFieldMarshal,
    /// `TypeDef`, `MethodDef` or `Assembly`
    HasDeclSecurity,
    /// `TypeDef`, `TypeRef`, `ModuleRef`, `MethodDef` or `TypeSpec`
    MemberRefParent,
    /// `Event` or `Property`
    HasSemantics,
    /// `MethodDef` or `MemberRef`
    MethodDefOrRef,
    /// `Field` or `MethodDef`
    MemberForwarded,
    /// `File`, `AssemblyRef` or `ExportedType`
    Implementation,
    /// `MethodDef` or `MemberRef`, surrounded by reserved slots
    CustomAttributeType,
    /// `Module`, `ModuleRef`, `AssemblyRef` or `TypeRef`
    ResolutionScope,
    /// `TypeDef` or `MethodDef`
    TypeOrMethodDef,
}

impl CodedIndexType {
    /// Number of low bits holding the table selector
    #[must_use]
    pub fn bits(&self) -> u8 {
        match self {
            CodedIndexType::HasFieldMarshal
            | CodedIndexType::HasSemantics
            | CodedIndexType::MethodDefOrRef
            | CodedIndexType::MemberForwarded
            | CodedIndexType::TypeOrMethodDef => 1,
            CodedIndexType::TypeDefOrRef
            | CodedIndexType::HasConstant
            | CodedIndexType::HasDeclSecurity
            | CodedIndexType::Implementation
            | CodedIndexType::ResolutionScope => 2,
            CodedIndexType::MemberRefParent | CodedIndexType::CustomAttributeType => 3,
            CodedIndexType::HasCustomAttribute => 5,
        }
    }

    /// The ordered selector slots; `None` marks a reserved slot
    #[must_use]
    pub fn slots(&self) -> &'static [Option<TableId>] {
        match self {
            CodedIndexType::TypeDefOrRef => &[
                Some(TableId::TypeDef),
                Some(TableId::TypeRef),
                Some(TableId::TypeSpec),
            ],
            CodedIndexType::HasConstant => &[
                Some(TableId::Field),
                Some(TableId::Param),
                Some(TableId::Property),
            ],
            CodedIndexType::HasCustomAttribute => &[
                Some(TableId::MethodDef),
                Some(TableId::Field),
                Some(TableId::TypeRef),
                Some(TableId::TypeDef),
                Some(TableId::Param),
                Some(TableId::InterfaceImpl),
                Some(TableId::MemberRef),
                Some(TableId::Module),
                // Labeled 'Permission' in the standard, which is the DeclSecurity table
                Some(TableId::DeclSecurity),
                Some(TableId::Property),
                Some(TableId::Event),
                Some(TableId::StandAloneSig),
                Some(TableId::ModuleRef),
                Some(TableId::TypeSpec),
                Some(TableId::Assembly),
                Some(TableId::AssemblyRef),
                Some(TableId::File),
                Some(TableId::ExportedType),
                Some(TableId::ManifestResource),
                Some(TableId::GenericParam),
                Some(TableId::GenericParamConstraint),
                Some(TableId::MethodSpec),
            ],
            CodedIndexType::HasFieldMarshal => &[Some(TableId::Field), Some(TableId::Param)],
            CodedIndexType::HasDeclSecurity => &[
                Some(TableId::TypeDef),
                Some(TableId::MethodDef),
                Some(TableId::Assembly),
            ],
            CodedIndexType::MemberRefParent => &[
                Some(TableId::TypeDef),
                Some(TableId::TypeRef),
                Some(TableId::ModuleRef),
                Some(TableId::MethodDef),
                Some(TableId::TypeSpec),
            ],
            CodedIndexType::HasSemantics => &[Some(TableId::Event), Some(TableId::Property)],
            CodedIndexType::MethodDefOrRef => {
                &[Some(TableId::MethodDef), Some(TableId::MemberRef)]
            }
            CodedIndexType::MemberForwarded => &[Some(TableId::Field), Some(TableId::MethodDef)],
            CodedIndexType::Implementation => &[
                Some(TableId::File),
                Some(TableId::AssemblyRef),
                Some(TableId::ExportedType),
            ],
            CodedIndexType::CustomAttributeType => &[
                None,
                None,
                Some(TableId::MethodDef),
                Some(TableId::MemberRef),
            ],
            CodedIndexType::ResolutionScope => &[
                Some(TableId::Module),
                Some(TableId::ModuleRef),
                Some(TableId::AssemblyRef),
                Some(TableId::TypeRef),
            ],
            CodedIndexType::TypeOrMethodDef => &[Some(TableId::TypeDef), Some(TableId::MethodDef)],
        }
    }

    /// The tables this kind can reference, reserved slots omitted
    pub fn tables(&self) -> impl Iterator<Item = TableId> {
        self.slots().iter().filter_map(|slot| *slot)
    }

    /// Split a coded value into its target table and row id
    ///
    /// Returns `None` if the selector is out of range or names a reserved slot, or if the row
    /// id exceeds [`MAX_RID`].
    #[must_use]
    pub fn decode(&self, value: u32) -> Option<(TableId, u32)> {
        let bits = self.bits();
        let tag = value & ((1 << bits) - 1);
        let rid = value >> bits;
        if rid > MAX_RID {
            return None;
        }

        match self.slots().get(tag as usize) {
            Some(Some(table)) => Some((*table, rid)),
            _ => None,
        }
    }

    /// Decode a coded value into a token
    #[must_use]
    pub fn decode_token(&self, value: u32) -> Option<Token> {
        self.decode(value)
            .map(|(table, rid)| Token::from_parts(table, rid))
    }

    /// Build the coded value addressing `rid` in `table`
    ///
    /// # Errors
    /// Returns [`crate::Error::CodedIndex`] if `table` is not a target of this kind.
    pub fn encode(&self, table: TableId, rid: u32) -> Result<u32> {
        let Some(tag) = coded_tag(table, *self) else {
            return Err(Error::CodedIndex { table, kind: *self });
        };

        Ok((rid << self.bits()) | tag)
    }
}

/// The selector value `table` has within the coded index `kind`, if it is a target
///
/// This replaces per-entity tag constants: e.g. `TypeDef` has the `HasCustomAttribute` tag
/// 3 because it is the fourth entry of that list.
#[must_use]
pub fn coded_tag(table: TableId, kind: CodedIndexType) -> Option<u32> {
    kind.slots()
        .iter()
        .position(|slot| *slot == Some(table))
        .and_then(|position| u32::try_from(position).ok())
}
