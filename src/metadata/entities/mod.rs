//! The typed entity model.
//!
//! Every metadata table with a meaning beyond bookkeeping has an entity type here, e.g.
//! [`TypeDef`], [`MethodDef`] or [`AssemblyRef`]. Entities come in two forms that share one
//! type:
//!
//! - **user** entities are created with `new` and hold every field from the start
//! - **metadata** entities are created by [`ModuleDef`] and resolve each field from their raw
//!   row the first time it is read
//!
//! Fields live in [`UserValue`] cells, so a metadata entity reads its raw row once, decodes each
//! field at most once, and a `set_*` call overrides a field for good. Looking up another entity
//! (a base type, a resolution scope, a custom attribute constructor) only establishes its
//! identity; none of its fields are resolved until they are read.
//!
//! References that may point into several tables are [`TypeDefOrRef`] for type positions and
//! the closed [`EntityRef`] union for everything else.

#[macro_use]
mod macros;

mod assembly;
mod attributes;
mod members;
mod types;

pub use assembly::*;
pub use attributes::*;
pub use members::*;
pub use types::*;

use crossbeam_skiplist::SkipMap;
use std::{
    fmt,
    sync::{Arc, OnceLock, Weak},
};

use crate::metadata::{
    module::ModuleDef,
    tables::{coded_tag, CodedIndexType, RowReadable, TableId},
    token::Token,
    utf8string::UTF8String,
};

/// Behaviour shared by all entities
pub trait Entity {
    /// The table this entity lives in
    const TABLE: TableId;

    /// The metadata token; user entities carry row id 0 until one is assigned
    fn token(&self) -> Token;

    /// The selector of this entity's table within the coded index `kind`
    ///
    /// `None` if entities of this table cannot be referenced through `kind`.
    fn coded_tag(&self, kind: CodedIndexType) -> Option<u32> {
        coded_tag(Self::TABLE, kind)
    }
}

/// An entity that a [`ModuleDef`] can create from a table row
pub trait MdEntity: Entity + Sized + Send + Sync + 'static {
    /// The raw row this entity is backed by
    type Row: RowReadable;

    /// A metadata entity for row `rid`, with every field unresolved
    fn from_md(module: Weak<ModuleDef>, rid: u32) -> Self;

    /// The identity map holding the instances of this entity type
    fn cache(caches: &EntityCaches) -> &SkipMap<Token, Arc<Self>>;

    /// Resolve every field
    fn preload(&self);
}

/// Where the fields of an entity come from
pub(crate) enum Origin<R> {
    User,
    Metadata {
        module: Weak<ModuleDef>,
        rid: u32,
        row: OnceLock<Option<R>>,
    },
}

impl<R: RowReadable> Origin<R> {
    pub(crate) fn metadata(module: Weak<ModuleDef>, rid: u32) -> Self {
        Origin::Metadata {
            module,
            rid,
            row: OnceLock::new(),
        }
    }

    /// Run `resolve` on the owning module and the cached raw row
    ///
    /// `None` for user entities, when the module is gone or when the row cannot be read.
    pub(crate) fn with_row<T, F>(&self, resolve: F) -> Option<T>
    where
        F: FnOnce(&ModuleDef, &R) -> T,
    {
        let Origin::Metadata { module, rid, row } = self else {
            return None;
        };

        let module = module.upgrade()?;
        let row = row
            .get_or_init(|| module.view().tables().get::<R>(*rid))
            .as_ref()?;

        Some(resolve(&module, row))
    }

    /// The owning module of a metadata entity, if it is still alive
    pub(crate) fn module(&self) -> Option<Arc<ModuleDef>> {
        match self {
            Origin::Metadata { module, .. } => module.upgrade(),
            Origin::User => None,
        }
    }
}

impl<R> fmt::Debug for Origin<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::User => f.write_str("User"),
            Origin::Metadata { rid, .. } => write!(f, "Metadata({rid})"),
        }
    }
}

/// The identity maps of a module, one per entity type
#[derive(Default)]
pub struct EntityCaches {
    pub(crate) type_refs: SkipMap<Token, Arc<TypeRef>>,
    pub(crate) type_defs: SkipMap<Token, Arc<TypeDef>>,
    pub(crate) fields: SkipMap<Token, Arc<FieldDef>>,
    pub(crate) methods: SkipMap<Token, Arc<MethodDef>>,
    pub(crate) params: SkipMap<Token, Arc<ParamDef>>,
    pub(crate) interface_impls: SkipMap<Token, Arc<InterfaceImpl>>,
    pub(crate) member_refs: SkipMap<Token, Arc<MemberRef>>,
    pub(crate) constants: SkipMap<Token, Arc<Constant>>,
    pub(crate) custom_attributes: SkipMap<Token, Arc<CustomAttribute>>,
    pub(crate) decl_securities: SkipMap<Token, Arc<DeclSecurity>>,
    pub(crate) standalone_sigs: SkipMap<Token, Arc<StandAloneSig>>,
    pub(crate) events: SkipMap<Token, Arc<EventDef>>,
    pub(crate) properties: SkipMap<Token, Arc<PropertyDef>>,
    pub(crate) module_refs: SkipMap<Token, Arc<ModuleRef>>,
    pub(crate) type_specs: SkipMap<Token, Arc<TypeSpec>>,
    pub(crate) assemblies: SkipMap<Token, Arc<AssemblyDef>>,
    pub(crate) assembly_refs: SkipMap<Token, Arc<AssemblyRef>>,
    pub(crate) files: SkipMap<Token, Arc<FileDef>>,
    pub(crate) exported_types: SkipMap<Token, Arc<ExportedType>>,
    pub(crate) resources: SkipMap<Token, Arc<ManifestResource>>,
    pub(crate) generic_params: SkipMap<Token, Arc<GenericParam>>,
    pub(crate) method_specs: SkipMap<Token, Arc<MethodSpec>>,
    pub(crate) generic_param_constraints: SkipMap<Token, Arc<GenericParamConstraint>>,
}

impl EntityCaches {
    /// Number of entities created so far
    #[must_use]
    pub fn len(&self) -> usize {
        self.type_refs.len()
            + self.type_defs.len()
            + self.fields.len()
            + self.methods.len()
            + self.params.len()
            + self.interface_impls.len()
            + self.member_refs.len()
            + self.constants.len()
            + self.custom_attributes.len()
            + self.decl_securities.len()
            + self.standalone_sigs.len()
            + self.events.len()
            + self.properties.len()
            + self.module_refs.len()
            + self.type_specs.len()
            + self.assemblies.len()
            + self.assembly_refs.len()
            + self.files.len()
            + self.exported_types.len()
            + self.resources.len()
            + self.generic_params.len()
            + self.method_specs.len()
            + self.generic_param_constraints.len()
    }

    /// `true` if no entity was created yet
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A reference to a type: a `TypeDefOrRef` coded index resolved to its entity
#[derive(Clone)]
pub enum TypeDefOrRef {
    /// A type defined in this module
    TypeDef(Arc<TypeDef>),
    /// A type defined elsewhere
    TypeRef(Arc<TypeRef>),
    /// A constructed type
    TypeSpec(Arc<TypeSpec>),
}

impl TypeDefOrRef {
    /// The token of the referenced entity
    #[must_use]
    pub fn token(&self) -> Token {
        match self {
            TypeDefOrRef::TypeDef(t) => t.token(),
            TypeDefOrRef::TypeRef(t) => t.token(),
            TypeDefOrRef::TypeSpec(t) => t.token(),
        }
    }

    /// The type name; `None` for type specifications
    #[must_use]
    pub fn name(&self) -> Option<UTF8String> {
        match self {
            TypeDefOrRef::TypeDef(t) => t.name(),
            TypeDefOrRef::TypeRef(t) => t.name(),
            TypeDefOrRef::TypeSpec(_) => None,
        }
    }

    /// The namespace; `None` for type specifications
    #[must_use]
    pub fn namespace(&self) -> Option<UTF8String> {
        match self {
            TypeDefOrRef::TypeDef(t) => t.namespace(),
            TypeDefOrRef::TypeRef(t) => t.namespace(),
            TypeDefOrRef::TypeSpec(_) => None,
        }
    }

    /// `Namespace.Name`, with nested types separated by `/`
    #[must_use]
    pub fn full_name(&self) -> String {
        match self {
            TypeDefOrRef::TypeDef(t) => t.full_name(),
            TypeDefOrRef::TypeRef(t) => t.full_name(),
            TypeDefOrRef::TypeSpec(t) => format!("TypeSpec({})", t.token()),
        }
    }

    fn ptr_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (TypeDefOrRef::TypeDef(a), TypeDefOrRef::TypeDef(b)) => Arc::ptr_eq(a, b),
            (TypeDefOrRef::TypeRef(a), TypeDefOrRef::TypeRef(b)) => Arc::ptr_eq(a, b),
            (TypeDefOrRef::TypeSpec(a), TypeDefOrRef::TypeSpec(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl PartialEq for TypeDefOrRef {
    /// Same token, or the same instance for entities without a row id
    fn eq(&self, other: &Self) -> bool {
        let (a, b) = (self.token(), other.token());
        if a.is_null() || b.is_null() {
            return self.ptr_eq(other);
        }

        a == b
    }
}

impl fmt::Debug for TypeDefOrRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.full_name(), self.token())
    }
}

impl From<TypeDefOrRef> for EntityRef {
    fn from(value: TypeDefOrRef) -> Self {
        match value {
            TypeDefOrRef::TypeDef(t) => EntityRef::TypeDef(t),
            TypeDefOrRef::TypeRef(t) => EntityRef::TypeRef(t),
            TypeDefOrRef::TypeSpec(t) => EntityRef::TypeSpec(t),
        }
    }
}

/// A reference to any entity, as found in coded and simple index columns
#[derive(Clone, Debug)]
pub enum EntityRef {
    /// The module itself, by token
    Module(Token),
    /// A `TypeRef`
    TypeRef(Arc<TypeRef>),
    /// A `TypeDef`
    TypeDef(Arc<TypeDef>),
    /// A `Field`
    Field(Arc<FieldDef>),
    /// A `MethodDef`
    Method(Arc<MethodDef>),
    /// A `Param`
    Param(Arc<ParamDef>),
    /// An `InterfaceImpl`
    InterfaceImpl(Arc<InterfaceImpl>),
    /// A `MemberRef`
    MemberRef(Arc<MemberRef>),
    /// A `Constant`
    Constant(Arc<Constant>),
    /// A `CustomAttribute`
    CustomAttribute(Arc<CustomAttribute>),
    /// A `DeclSecurity`
    DeclSecurity(Arc<DeclSecurity>),
    /// A `StandAloneSig`
    StandAloneSig(Arc<StandAloneSig>),
    /// An `Event`
    Event(Arc<EventDef>),
    /// A `Property`
    Property(Arc<PropertyDef>),
    /// A `ModuleRef`
    ModuleRef(Arc<ModuleRef>),
    /// A `TypeSpec`
    TypeSpec(Arc<TypeSpec>),
    /// The `Assembly`
    Assembly(Arc<AssemblyDef>),
    /// An `AssemblyRef`
    AssemblyRef(Arc<AssemblyRef>),
    /// A `File`
    File(Arc<FileDef>),
    /// An `ExportedType`
    ExportedType(Arc<ExportedType>),
    /// A `ManifestResource`
    ManifestResource(Arc<ManifestResource>),
    /// A `GenericParam`
    GenericParam(Arc<GenericParam>),
    /// A `MethodSpec`
    MethodSpec(Arc<MethodSpec>),
    /// A `GenericParamConstraint`
    GenericParamConstraint(Arc<GenericParamConstraint>),
}

impl EntityRef {
    /// The token of the referenced entity
    #[must_use]
    pub fn token(&self) -> Token {
        match self {
            EntityRef::Module(token) => *token,
            EntityRef::TypeRef(e) => e.token(),
            EntityRef::TypeDef(e) => e.token(),
            EntityRef::Field(e) => e.token(),
            EntityRef::Method(e) => e.token(),
            EntityRef::Param(e) => e.token(),
            EntityRef::InterfaceImpl(e) => e.token(),
            EntityRef::MemberRef(e) => e.token(),
            EntityRef::Constant(e) => e.token(),
            EntityRef::CustomAttribute(e) => e.token(),
            EntityRef::DeclSecurity(e) => e.token(),
            EntityRef::StandAloneSig(e) => e.token(),
            EntityRef::Event(e) => e.token(),
            EntityRef::Property(e) => e.token(),
            EntityRef::ModuleRef(e) => e.token(),
            EntityRef::TypeSpec(e) => e.token(),
            EntityRef::Assembly(e) => e.token(),
            EntityRef::AssemblyRef(e) => e.token(),
            EntityRef::File(e) => e.token(),
            EntityRef::ExportedType(e) => e.token(),
            EntityRef::ManifestResource(e) => e.token(),
            EntityRef::GenericParam(e) => e.token(),
            EntityRef::MethodSpec(e) => e.token(),
            EntityRef::GenericParamConstraint(e) => e.token(),
        }
    }

    /// The table of the referenced entity
    #[must_use]
    pub fn table(&self) -> Option<TableId> {
        self.token().table_id()
    }

    /// The reference as a type reference, if it names a type
    #[must_use]
    pub fn as_type_def_or_ref(&self) -> Option<TypeDefOrRef> {
        match self {
            EntityRef::TypeDef(t) => Some(TypeDefOrRef::TypeDef(t.clone())),
            EntityRef::TypeRef(t) => Some(TypeDefOrRef::TypeRef(t.clone())),
            EntityRef::TypeSpec(t) => Some(TypeDefOrRef::TypeSpec(t.clone())),
            _ => None,
        }
    }

    /// The name of the referenced entity, for entities that have one
    #[must_use]
    pub fn name(&self) -> Option<UTF8String> {
        match self {
            EntityRef::TypeRef(e) => e.name(),
            EntityRef::TypeDef(e) => e.name(),
            EntityRef::Field(e) => e.name(),
            EntityRef::Method(e) => e.name(),
            EntityRef::Param(e) => e.name(),
            EntityRef::MemberRef(e) => e.name(),
            EntityRef::Event(e) => e.name(),
            EntityRef::Property(e) => e.name(),
            EntityRef::ModuleRef(e) => e.name(),
            EntityRef::Assembly(e) => e.name(),
            EntityRef::AssemblyRef(e) => e.name(),
            EntityRef::File(e) => e.name(),
            EntityRef::ExportedType(e) => e.name(),
            EntityRef::ManifestResource(e) => e.name(),
            EntityRef::GenericParam(e) => e.name(),
            _ => None,
        }
    }

    /// The selector of the referenced table within `kind`
    #[must_use]
    pub fn coded_tag(&self, kind: CodedIndexType) -> Option<u32> {
        coded_tag(self.table()?, kind)
    }
}

impl PartialEq for EntityRef {
    fn eq(&self, other: &Self) -> bool {
        self.token() == other.token()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coded_tags() {
        let type_def = TypeDef::new(0, "Ns", "Type", None);
        assert_eq!(type_def.coded_tag(CodedIndexType::HasCustomAttribute), Some(3));
        assert_eq!(type_def.coded_tag(CodedIndexType::TypeDefOrRef), Some(0));
        assert_eq!(type_def.coded_tag(CodedIndexType::HasDeclSecurity), Some(0));
        assert_eq!(type_def.coded_tag(CodedIndexType::MemberRefParent), Some(0));
        assert_eq!(type_def.coded_tag(CodedIndexType::TypeOrMethodDef), Some(0));
        assert_eq!(type_def.coded_tag(CodedIndexType::HasConstant), None);

        let method = MethodDef::new(0, 0, "Run", None);
        assert_eq!(method.coded_tag(CodedIndexType::HasCustomAttribute), Some(0));
        assert_eq!(method.coded_tag(CodedIndexType::CustomAttributeType), Some(2));
        assert_eq!(method.coded_tag(CodedIndexType::MethodDefOrRef), Some(0));

        let reference = EntityRef::AssemblyRef(Arc::new(AssemblyRef::new(
            "mscorlib",
            Default::default(),
        )));
        assert_eq!(reference.coded_tag(CodedIndexType::ResolutionScope), Some(2));
        assert_eq!(reference.coded_tag(CodedIndexType::Implementation), Some(1));
    }

    #[test]
    fn type_def_or_ref_equality() {
        let a = Arc::new(TypeRef::new(None, "System", "Object"));
        let b = Arc::new(TypeRef::new(None, "System", "Object"));

        assert_eq!(TypeDefOrRef::TypeRef(a.clone()), TypeDefOrRef::TypeRef(a.clone()));
        // Without row ids only identity counts
        assert_ne!(TypeDefOrRef::TypeRef(a), TypeDefOrRef::TypeRef(b.clone()));

        let c = Arc::new(TypeRef::new(None, "System", "Object").with_rid(4));
        let d = Arc::new(TypeRef::new(None, "System", "String").with_rid(4));
        assert_eq!(TypeDefOrRef::TypeRef(c), TypeDefOrRef::TypeRef(d));
    }

    #[test]
    fn entity_ref() {
        let type_ref = Arc::new(TypeRef::new(None, "System", "Object").with_rid(2));
        let reference = EntityRef::from(TypeDefOrRef::TypeRef(type_ref));

        assert_eq!(reference.token(), Token::new(0x0100_0002));
        assert_eq!(reference.table(), Some(TableId::TypeRef));
        assert_eq!(reference.name().unwrap(), "Object");
        assert!(reference.as_type_def_or_ref().is_some());
        assert!(EntityRef::Module(Token::new(0x0000_0001))
            .as_type_def_or_ref()
            .is_none());
    }
}
