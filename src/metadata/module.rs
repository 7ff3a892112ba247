//! The module: entry point of the entity model.
//!
//! A [`ModuleDef`] owns a [`MetadataView`] and hands out entities on demand. Entities are
//! created the first time their token is resolved and cached per token, so every later lookup
//! of the same token returns the same [`Arc`]. Creating an entity reads nothing; its fields are
//! resolved one by one when they are first accessed.
//!
//! # Examples
//!
//! ```rust,no_run
//! use cilmeta::metadata::module::ModuleDef;
//! use std::path::Path;
//!
//! let module = ModuleDef::from_file(Path::new("tests/samples/WindowsBase.dll"))?;
//! if let Some(assembly) = module.assembly() {
//!     println!("{}", assembly.display_name());
//! }
//! for type_def in module.types() {
//!     println!("{} ({} methods)", type_def.full_name(), type_def.methods().len());
//! }
//! # Ok::<(), cilmeta::Error>(())
//! ```

use rayon::prelude::*;
use std::{
    collections::HashMap,
    path::Path,
    sync::{Arc, OnceLock, Weak},
};
use tracing::{debug, warn};
use widestring::U16String;

use crate::{
    metadata::{
        config::LoadOptions,
        entities::{
            AssemblyDef, AssemblyRef, Constant, CustomAttribute, DeclSecurity, EntityCaches,
            EntityRef, EventDef, ExportedType, FieldDef, FileDef, GenericParam,
            GenericParamConstraint, InterfaceImpl, ManifestResource, MdEntity, MemberRef,
            MethodDef, MethodSpec, ModuleRef, ParamDef, PropertyDef, StandAloneSig, TypeDef,
            TypeDefOrRef, TypeRef, TypeSpec,
        },
        identity::{AssemblyVersion, PublicKeyOrToken, PublicKeyToken},
        lazy::UserValue,
        signatures::{
            CallingConventionSig, CorLibTypes, SignatureContext, SignatureReader, TypeSig,
            CORLIB_NAMES,
        },
        tables::{CodedIndexType, GenericParamRaw, ModuleRaw, NestedClassRaw, TableId},
        token::Token,
        utf8string::UTF8String,
        view::MetadataView,
    },
    Result,
};

/// Token table byte of `#US` references
const USER_STRING_TABLE: u8 = 0x70;

/// A loaded module and the root of its entity graph
pub struct ModuleDef {
    view: MetadataView,
    self_ref: Weak<ModuleDef>,
    caches: EntityCaches,
    corlib: OnceLock<CorLibTypes>,
    enclosing: OnceLock<HashMap<u32, u32>>,
    generation: UserValue<u32>,
    name: UserValue<Option<UTF8String>>,
    mvid: UserValue<Option<uguid::Guid>>,
    enc_id: UserValue<Option<uguid::Guid>>,
    enc_base_id: UserValue<Option<uguid::Guid>>,
}

impl ModuleDef {
    /// Load the module of a managed PE image on disk
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or its metadata is malformed.
    pub fn from_file(path: &Path) -> Result<Arc<ModuleDef>> {
        Self::from_file_with(path, LoadOptions::default())
    }

    /// [`ModuleDef::from_file`] with explicit options
    ///
    /// # Errors
    /// See [`ModuleDef::from_file`].
    pub fn from_file_with(path: &Path, options: LoadOptions) -> Result<Arc<ModuleDef>> {
        Ok(Self::load(MetadataView::from_file_with(path, options)?))
    }

    /// Load the module of a managed PE image in memory
    ///
    /// # Errors
    /// See [`ModuleDef::from_file`].
    pub fn from_mem(data: Vec<u8>) -> Result<Arc<ModuleDef>> {
        Self::from_mem_with(data, LoadOptions::default())
    }

    /// [`ModuleDef::from_mem`] with explicit options
    ///
    /// # Errors
    /// See [`ModuleDef::from_file`].
    pub fn from_mem_with(data: Vec<u8>, options: LoadOptions) -> Result<Arc<ModuleDef>> {
        Ok(Self::load(MetadataView::from_mem_with(data, options)?))
    }

    /// Load a module from bare metadata starting with the `BSJB` root
    ///
    /// # Errors
    /// Returns an error if the metadata is malformed.
    pub fn from_metadata(data: Vec<u8>) -> Result<Arc<ModuleDef>> {
        Self::from_metadata_with(data, LoadOptions::default())
    }

    /// [`ModuleDef::from_metadata`] with explicit options
    ///
    /// # Errors
    /// See [`ModuleDef::from_metadata`].
    pub fn from_metadata_with(data: Vec<u8>, options: LoadOptions) -> Result<Arc<ModuleDef>> {
        Ok(Self::load(MetadataView::from_metadata_with(data, options)?))
    }

    fn load(view: MetadataView) -> Arc<ModuleDef> {
        let preload = view.options().preload;
        let module = Arc::new_cyclic(|self_ref| ModuleDef {
            view,
            self_ref: self_ref.clone(),
            caches: EntityCaches::default(),
            corlib: OnceLock::new(),
            enclosing: OnceLock::new(),
            generation: UserValue::new(),
            name: UserValue::new(),
            mvid: UserValue::new(),
            enc_id: UserValue::new(),
            enc_base_id: UserValue::new(),
        });

        if preload {
            module.preload();
        }

        module
    }

    /// The metadata this module is built on
    #[must_use]
    pub fn view(&self) -> &MetadataView {
        &self.view
    }

    /// The options the module was loaded with
    #[must_use]
    pub fn options(&self) -> &LoadOptions {
        self.view.options()
    }

    /// The identity maps of the entities created so far
    #[must_use]
    pub fn caches(&self) -> &EntityCaches {
        &self.caches
    }

    /// Token of the module row
    #[must_use]
    pub fn token(&self) -> Token {
        Token::from_parts(TableId::Module, 1)
    }

    /// Reserved generation number
    #[must_use]
    pub fn generation(&self) -> u32 {
        self.generation
            .get_or_resolve(|| self.module_row(|row| row.generation))
    }

    /// Override [`ModuleDef::generation`]
    pub fn set_generation(&self, value: u32) {
        self.generation.set(value);
    }

    /// The module name, usually the file name
    #[must_use]
    pub fn name(&self) -> Option<UTF8String> {
        self.name
            .get_or_resolve(|| self.module_row(|row| self.string(row.name)))
    }

    /// Override [`ModuleDef::name`]
    pub fn set_name(&self, value: Option<UTF8String>) {
        self.name.set(value);
    }

    /// The module version id
    #[must_use]
    pub fn mvid(&self) -> Option<uguid::Guid> {
        self.mvid
            .get_or_resolve(|| self.module_row(|row| self.guid(row.mvid)))
    }

    /// Override [`ModuleDef::mvid`]
    pub fn set_mvid(&self, value: Option<uguid::Guid>) {
        self.mvid.set(value);
    }

    /// Reserved edit-and-continue id
    #[must_use]
    pub fn enc_id(&self) -> Option<uguid::Guid> {
        self.enc_id
            .get_or_resolve(|| self.module_row(|row| self.guid(row.enc_id)))
    }

    /// Override [`ModuleDef::enc_id`]
    pub fn set_enc_id(&self, value: Option<uguid::Guid>) {
        self.enc_id.set(value);
    }

    /// Reserved edit-and-continue base id
    #[must_use]
    pub fn enc_base_id(&self) -> Option<uguid::Guid> {
        self.enc_base_id
            .get_or_resolve(|| self.module_row(|row| self.guid(row.enc_base_id)))
    }

    /// Override [`ModuleDef::enc_base_id`]
    pub fn set_enc_base_id(&self, value: Option<uguid::Guid>) {
        self.enc_base_id.set(value);
    }

    fn module_row<T: Default>(&self, f: impl FnOnce(&ModuleRaw) -> T) -> T {
        self.view
            .tables()
            .get::<ModuleRaw>(1)
            .map(|row| f(&row))
            .unwrap_or_default()
    }

    /// The entity of type `T` at row `rid`
    ///
    /// Returns the cached instance if the row was resolved before. `None` if `rid` is 0 or past
    /// the end of the table.
    #[must_use]
    pub fn resolve<T: MdEntity>(&self, rid: u32) -> Option<Arc<T>> {
        if rid == 0 || rid > self.view.tables().row_count(T::TABLE) {
            return None;
        }

        let token = Token::from_parts(T::TABLE, rid);
        let cache = T::cache(&self.caches);
        if let Some(entry) = cache.get(&token) {
            return Some(entry.value().clone());
        }

        let entry = cache.get_or_insert(token, Arc::new(T::from_md(self.self_ref.clone(), rid)));
        Some(entry.value().clone())
    }

    /// The entity a token refers to
    ///
    /// Tables without an entity type (pointer, map and layout tables) resolve to `None`.
    #[must_use]
    pub fn resolve_token(&self, token: Token) -> Option<EntityRef> {
        self.entity_ref(token.table_id()?, token.rid())
    }

    fn entity_ref(&self, table: TableId, rid: u32) -> Option<EntityRef> {
        Some(match table {
            TableId::Module => {
                if rid == 0 || rid > self.view.tables().row_count(TableId::Module) {
                    return None;
                }
                EntityRef::Module(Token::from_parts(TableId::Module, rid))
            }
            TableId::TypeRef => EntityRef::TypeRef(self.resolve(rid)?),
            TableId::TypeDef => EntityRef::TypeDef(self.resolve(rid)?),
            TableId::Field => EntityRef::Field(self.resolve(rid)?),
            TableId::MethodDef => EntityRef::Method(self.resolve(rid)?),
            TableId::Param => EntityRef::Param(self.resolve(rid)?),
            TableId::InterfaceImpl => EntityRef::InterfaceImpl(self.resolve(rid)?),
            TableId::MemberRef => EntityRef::MemberRef(self.resolve(rid)?),
            TableId::Constant => EntityRef::Constant(self.resolve(rid)?),
            TableId::CustomAttribute => EntityRef::CustomAttribute(self.resolve(rid)?),
            TableId::DeclSecurity => EntityRef::DeclSecurity(self.resolve(rid)?),
            TableId::StandAloneSig => EntityRef::StandAloneSig(self.resolve(rid)?),
            TableId::Event => EntityRef::Event(self.resolve(rid)?),
            TableId::Property => EntityRef::Property(self.resolve(rid)?),
            TableId::ModuleRef => EntityRef::ModuleRef(self.resolve(rid)?),
            TableId::TypeSpec => EntityRef::TypeSpec(self.resolve(rid)?),
            TableId::Assembly => EntityRef::Assembly(self.resolve(rid)?),
            TableId::AssemblyRef => EntityRef::AssemblyRef(self.resolve(rid)?),
            TableId::File => EntityRef::File(self.resolve(rid)?),
            TableId::ExportedType => EntityRef::ExportedType(self.resolve(rid)?),
            TableId::ManifestResource => EntityRef::ManifestResource(self.resolve(rid)?),
            TableId::GenericParam => EntityRef::GenericParam(self.resolve(rid)?),
            TableId::MethodSpec => EntityRef::MethodSpec(self.resolve(rid)?),
            TableId::GenericParamConstraint => {
                EntityRef::GenericParamConstraint(self.resolve(rid)?)
            }
            _ => return None,
        })
    }

    /// All rows of the table of `T`, in table order
    #[must_use]
    pub fn entities<T: MdEntity>(&self) -> Vec<Arc<T>> {
        (1..=self.view.tables().row_count(T::TABLE))
            .filter_map(|rid| self.resolve::<T>(rid))
            .collect()
    }

    /// The assembly manifest, if this module has one
    #[must_use]
    pub fn assembly(&self) -> Option<Arc<AssemblyDef>> {
        self.resolve(1)
    }

    /// All types defined in this module, including the `<Module>` type
    #[must_use]
    pub fn types(&self) -> Vec<Arc<TypeDef>> {
        self.entities()
    }

    /// The type `namespace.name`, not considering nested types
    #[must_use]
    pub fn find_type(&self, namespace: &str, name: &str) -> Option<Arc<TypeDef>> {
        self.types().into_iter().find(|t| {
            !t.is_nested()
                && t.namespace().unwrap_or_default() == namespace
                && t.name().unwrap_or_default() == name
        })
    }

    /// All type references
    #[must_use]
    pub fn type_refs(&self) -> Vec<Arc<TypeRef>> {
        self.entities()
    }

    /// All assembly references
    #[must_use]
    pub fn assembly_refs(&self) -> Vec<Arc<AssemblyRef>> {
        self.entities()
    }

    /// All module references
    #[must_use]
    pub fn module_refs(&self) -> Vec<Arc<ModuleRef>> {
        self.entities()
    }

    /// All member references
    #[must_use]
    pub fn member_refs(&self) -> Vec<Arc<MemberRef>> {
        self.entities()
    }

    /// All exported and forwarded types
    #[must_use]
    pub fn exported_types(&self) -> Vec<Arc<ExportedType>> {
        self.entities()
    }

    /// All manifest resources
    #[must_use]
    pub fn resources(&self) -> Vec<Arc<ManifestResource>> {
        self.entities()
    }

    /// The custom attributes applied to the entity `parent`
    #[must_use]
    pub fn custom_attributes(&self, parent: Token) -> Vec<Arc<CustomAttribute>> {
        self.entities::<CustomAttribute>()
            .into_iter()
            .filter(|ca| ca.parent().is_some_and(|p| p.token() == parent))
            .collect()
    }

    /// The `#US` string a `ldstr` token refers to
    #[must_use]
    pub fn user_string(&self, token: Token) -> Option<U16String> {
        if token.table() != USER_STRING_TABLE {
            return None;
        }

        match self.view.userstrings()?.get(token.rid() as usize) {
            Ok(value) => Some(value),
            Err(error) => {
                warn!(token = %token, %error, "unresolved user string");
                None
            }
        }
    }

    /// The primitive type signatures of this module
    ///
    /// Their scope is the first reference to a known core library. A module that defines
    /// `System.Object` itself is its own core library; without either, a reference to
    /// `mscorlib` is made up.
    pub fn corlib_types(&self) -> &CorLibTypes {
        self.corlib
            .get_or_init(|| CorLibTypes::new(Some(self.corlib_scope())))
    }

    fn corlib_scope(&self) -> EntityRef {
        let known = self.assembly_refs().into_iter().find(|r| {
            r.name()
                .is_some_and(|name| CORLIB_NAMES.iter().any(|corlib| name == *corlib))
        });
        if let Some(reference) = known {
            return EntityRef::AssemblyRef(reference);
        }

        if self.find_type("System", "Object").is_some() {
            return EntityRef::Module(self.token());
        }

        let mscorlib = AssemblyRef::new("mscorlib", AssemblyVersion::new(4, 0, 0, 0));
        mscorlib.set_public_key_or_token(PublicKeyOrToken::Token(PublicKeyToken([
            0xb7, 0x7a, 0x5c, 0x56, 0x19, 0x34, 0xe0, 0x89,
        ])));
        EntityRef::AssemblyRef(Arc::new(mscorlib))
    }

    /// Decode the signature at `#Blob` offset `blob`
    ///
    /// `None` for offset 0, an unknown offset or a signature that cannot be decoded.
    #[must_use]
    pub fn read_signature(&self, blob: u32) -> Option<CallingConventionSig> {
        let data = self.blob_bytes(blob)?;
        SignatureReader::read(self, data, self.options().max_signature_depth)
    }

    /// Decode the `TypeSpec` signature at `#Blob` offset `blob`
    #[must_use]
    pub fn read_type_signature(&self, blob: u32) -> Option<TypeSig> {
        let data = self.blob_bytes(blob)?;
        SignatureReader::read_type_spec(self, data, self.options().max_signature_depth)
    }

    /// Resolve every field of every entity
    ///
    /// Afterwards no entity reads the tables again, so the whole graph may be shared between
    /// threads without contention on first access.
    pub fn preload(&self) {
        let _ = self.generation();
        let _ = self.name();
        let _ = self.mvid();
        let _ = self.enc_id();
        let _ = self.enc_base_id();
        let _ = self.corlib_types();

        self.preload_table::<TypeRef>();
        self.preload_table::<TypeDef>();
        self.preload_table::<FieldDef>();
        self.preload_table::<MethodDef>();
        self.preload_table::<ParamDef>();
        self.preload_table::<InterfaceImpl>();
        self.preload_table::<MemberRef>();
        self.preload_table::<Constant>();
        self.preload_table::<CustomAttribute>();
        self.preload_table::<DeclSecurity>();
        self.preload_table::<StandAloneSig>();
        self.preload_table::<EventDef>();
        self.preload_table::<PropertyDef>();
        self.preload_table::<ModuleRef>();
        self.preload_table::<TypeSpec>();
        self.preload_table::<AssemblyDef>();
        self.preload_table::<AssemblyRef>();
        self.preload_table::<FileDef>();
        self.preload_table::<ExportedType>();
        self.preload_table::<ManifestResource>();
        self.preload_table::<GenericParam>();
        self.preload_table::<MethodSpec>();
        self.preload_table::<GenericParamConstraint>();

        debug!(entities = self.caches.len(), "preloaded module");
    }

    fn preload_table<T: MdEntity>(&self) {
        (1..=self.view.tables().row_count(T::TABLE))
            .into_par_iter()
            .for_each(|rid| {
                if let Some(entity) = self.resolve::<T>(rid) {
                    entity.preload();
                }
            });
    }

    /// `#Strings` lookup; offset 0 is the empty string
    pub(crate) fn string(&self, index: u32) -> Option<UTF8String> {
        if index == 0 {
            return Some(UTF8String::default());
        }

        match self.view.strings()?.get_bytes(index as usize) {
            Ok(bytes) => Some(UTF8String::from(bytes)),
            Err(error) => {
                warn!(index, %error, "unresolved #Strings offset");
                None
            }
        }
    }

    /// `#Blob` lookup; offset 0 is the empty blob
    pub(crate) fn blob(&self, index: u32) -> Option<Vec<u8>> {
        if index == 0 {
            return Some(Vec::new());
        }

        self.blob_bytes(index).map(<[u8]>::to_vec)
    }

    fn blob_bytes(&self, index: u32) -> Option<&[u8]> {
        if index == 0 {
            return None;
        }

        match self.view.blobs()?.get(index as usize) {
            Ok(data) => Some(data),
            Err(error) => {
                warn!(index, %error, "unresolved #Blob offset");
                None
            }
        }
    }

    /// `#GUID` lookup; index 0 is the null reference
    pub(crate) fn guid(&self, index: u32) -> Option<uguid::Guid> {
        if index == 0 {
            return None;
        }

        match self.view.guids()?.get(index as usize) {
            Ok(guid) => Some(guid),
            Err(error) => {
                warn!(index, %error, "unresolved #GUID index");
                None
            }
        }
    }

    /// Resolve a coded index column
    ///
    /// A null row id is an absent reference. A reserved tag or a row past the end of its table
    /// is logged and reported as absent too.
    pub(crate) fn coded(&self, kind: CodedIndexType, value: u32) -> Option<EntityRef> {
        let Some((table, rid)) = kind.decode(value) else {
            warn!(?kind, value, "invalid coded index");
            return None;
        };
        if rid == 0 {
            return None;
        }

        let entity = self.entity_ref(table, rid);
        if entity.is_none() {
            warn!(?kind, ?table, rid, "unresolved coded index");
        }
        entity
    }

    pub(crate) fn type_def_or_ref(&self, value: u32) -> Option<TypeDefOrRef> {
        self.coded(CodedIndexType::TypeDefOrRef, value)?
            .as_type_def_or_ref()
    }

    /// The run of `T` rows owned by row `rid` of `owner`
    ///
    /// Column `column` of `owner` holds the first row of the run, which ends where the next
    /// owner's run starts. When the `ptr` table has rows, run positions index into it instead
    /// of the target table.
    pub(crate) fn member_list<T: MdEntity>(
        &self,
        owner: TableId,
        rid: u32,
        column: usize,
        ptr: TableId,
    ) -> Vec<Arc<T>> {
        let tables = self.view.tables();
        let Some(table) = tables.table(owner) else {
            return Vec::new();
        };
        let Some(start) = table.column(rid, column) else {
            return Vec::new();
        };

        let ptr_table = tables.table(ptr).filter(|t| !t.is_empty());
        let last = match ptr_table {
            Some(ptr_table) => ptr_table.row_count(),
            None => tables.row_count(T::TABLE),
        };
        let end = if rid < table.row_count() {
            table.column(rid + 1, column).unwrap_or(last + 1)
        } else {
            last + 1
        };
        let end = end.min(last + 1);
        if start == 0 || start >= end {
            return Vec::new();
        }

        (start..end)
            .filter_map(|position| {
                let target = match ptr_table {
                    Some(ptr_table) => ptr_table.column(position, 0)?,
                    None => position,
                };
                self.resolve::<T>(target)
            })
            .collect()
    }

    /// The run of `T` rows a `EventMap`/`PropertyMap` table assigns to type `type_rid`
    pub(crate) fn mapped_list<T: MdEntity>(
        &self,
        map: TableId,
        type_rid: u32,
        ptr: TableId,
    ) -> Vec<Arc<T>> {
        let Some(table) = self.view.tables().table(map) else {
            return Vec::new();
        };

        match (1..=table.row_count()).find(|&map_rid| table.column(map_rid, 0) == Some(type_rid)) {
            Some(map_rid) => self.member_list(map, map_rid, 1, ptr),
            None => Vec::new(),
        }
    }

    /// The `TypeDef` whose field or method run contains `member`
    pub(crate) fn declaring_type_of(&self, member: Token) -> Option<Arc<TypeDef>> {
        let (column, ptr) = match member.table_id()? {
            TableId::Field => (4, TableId::FieldPtr),
            TableId::MethodDef => (5, TableId::MethodPtr),
            _ => return None,
        };

        let tables = self.view.tables();
        let position = match tables.table(ptr).filter(|t| !t.is_empty()) {
            Some(ptr_table) => (1..=ptr_table.row_count())
                .find(|&index| ptr_table.column(index, 0) == Some(member.rid()))?,
            None => member.rid(),
        };

        let type_defs = tables.table(TableId::TypeDef)?;
        let mut owner = None;
        for rid in 1..=type_defs.row_count() {
            let start = type_defs.column(rid, column)?;
            if start > position {
                break;
            }
            if start != 0 {
                owner = Some(rid);
            }
        }

        self.resolve(owner?)
    }

    fn nesting(&self) -> &HashMap<u32, u32> {
        self.enclosing.get_or_init(|| {
            self.view
                .tables()
                .table(TableId::NestedClass)
                .map(|table| {
                    table
                        .iter::<NestedClassRaw>()
                        .map(|row| (row.nested_class, row.enclosing_class))
                        .collect()
                })
                .unwrap_or_default()
        })
    }

    pub(crate) fn enclosing_type(&self, rid: u32) -> Option<Arc<TypeDef>> {
        self.resolve(*self.nesting().get(&rid)?)
    }

    pub(crate) fn nested_types(&self, rid: u32) -> Vec<Arc<TypeDef>> {
        let mut nested: Vec<u32> = self
            .nesting()
            .iter()
            .filter(|(_, enclosing)| **enclosing == rid)
            .map(|(nested, _)| *nested)
            .collect();
        nested.sort_unstable();

        nested
            .into_iter()
            .filter_map(|rid| self.resolve(rid))
            .collect()
    }

    /// The generic parameters owned by `owner`, ordered by number
    pub(crate) fn generic_params_of(&self, owner: Token) -> Vec<Arc<GenericParam>> {
        let Some(table) = self.view.tables().table(TableId::GenericParam) else {
            return Vec::new();
        };

        let mut params: Vec<(u32, Arc<GenericParam>)> = table
            .iter::<GenericParamRaw>()
            .filter(|row| CodedIndexType::TypeOrMethodDef.decode_token(row.owner) == Some(owner))
            .filter_map(|row| Some((row.number, self.resolve(row.rid)?)))
            .collect();
        params.sort_by_key(|(number, _)| *number);

        params.into_iter().map(|(_, param)| param).collect()
    }
}

impl SignatureContext for ModuleDef {
    fn corlib_types(&self) -> &CorLibTypes {
        ModuleDef::corlib_types(self)
    }

    fn resolve_type_def_or_ref(&self, token: Token) -> Option<TypeDefOrRef> {
        match token.table_id()? {
            TableId::TypeDef => Some(TypeDefOrRef::TypeDef(self.resolve(token.rid())?)),
            TableId::TypeRef => Some(TypeDefOrRef::TypeRef(self.resolve(token.rid())?)),
            TableId::TypeSpec => Some(TypeDefOrRef::TypeSpec(self.resolve(token.rid())?)),
            _ => None,
        }
    }
}

impl std::fmt::Debug for ModuleDef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleDef")
            .field("name", &self.name())
            .field("version", &self.view.root().version)
            .field("entities", &self.caches.len())
            .finish_non_exhaustive()
    }
}
