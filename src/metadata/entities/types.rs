use std::sync::Arc;

use tracing::warn;

use crate::metadata::{
    entities::{Entity, EntityRef, EventDef, FieldDef, MethodDef, PropertyDef, TypeDefOrRef},
    signatures::TypeSig,
    tables::{CodedIndexType, TableId},
    utf8string::UTF8String,
};

entity! {
    /// A reference to a type defined in another module or assembly, II.22.38
    TypeRef => TypeRefRaw, type_refs {
        /// The module, assembly or enclosing type the type is found in
        resolution_scope, set_resolution_scope: Option<EntityRef> =>
            |module, row| module.coded(CodedIndexType::ResolutionScope, row.resolution_scope);
        /// The type name
        name, set_name: Option<UTF8String> => |module, row| module.string(row.type_name);
        /// The namespace, empty for nested types
        namespace, set_namespace: Option<UTF8String> =>
            |module, row| module.string(row.type_namespace);
    }
}

impl TypeRef {
    /// A user-created type reference
    #[must_use]
    pub fn new(
        resolution_scope: Option<EntityRef>,
        namespace: impl Into<UTF8String>,
        name: impl Into<UTF8String>,
    ) -> Self {
        let type_ref = Self::user();
        type_ref.set_resolution_scope(resolution_scope);
        type_ref.set_namespace(Some(namespace.into()));
        type_ref.set_name(Some(name.into()));
        type_ref
    }

    /// `Namespace.Name`, prefixed with the enclosing type for nested references
    #[must_use]
    pub fn full_name(&self) -> String {
        nested_name(self)
    }
}

impl Nested for TypeRef {
    fn simple_name(&self) -> String {
        qualified_name(self.namespace(), self.name())
    }

    fn enclosing(&self) -> Option<Arc<Self>> {
        match self.resolution_scope() {
            Some(EntityRef::TypeRef(outer)) => Some(outer),
            _ => None,
        }
    }
}

entity! {
    /// A type defined in this module, II.22.37
    TypeDef => TypeDefRaw, type_defs {
        /// `TypeAttributes`
        flags, set_flags: u32 => |_, row| row.flags;
        /// The type name
        name, set_name: Option<UTF8String> => |module, row| module.string(row.type_name);
        /// The namespace, empty for nested types
        namespace, set_namespace: Option<UTF8String> =>
            |module, row| module.string(row.type_namespace);
        /// The base type; `None` for interfaces and `System.Object`
        extends, set_extends: Option<TypeDefOrRef> =>
            |module, row| module.type_def_or_ref(row.extends);
        /// The fields, in table order
        fields, set_fields: Vec<Arc<FieldDef>> => |module, row| {
            module.member_list(TableId::TypeDef, row.rid, 4, TableId::FieldPtr)
        };
        /// The methods, in table order
        methods, set_methods: Vec<Arc<MethodDef>> => |module, row| {
            module.member_list(TableId::TypeDef, row.rid, 5, TableId::MethodPtr)
        };
        /// The enclosing type of a nested type
        declaring_type, set_declaring_type: Option<Arc<TypeDef>> =>
            |module, row| module.enclosing_type(row.rid);
    }
}

impl TypeDef {
    /// A user-created type definition
    #[must_use]
    pub fn new(
        flags: u32,
        namespace: impl Into<UTF8String>,
        name: impl Into<UTF8String>,
        extends: Option<TypeDefOrRef>,
    ) -> Self {
        let type_def = Self::user();
        type_def.set_flags(flags);
        type_def.set_namespace(Some(namespace.into()));
        type_def.set_name(Some(name.into()));
        type_def.set_extends(extends);
        type_def.set_fields(Vec::new());
        type_def.set_methods(Vec::new());
        type_def.set_declaring_type(None);
        type_def
    }

    /// `Namespace.Name`, prefixed with the enclosing types for nested types
    #[must_use]
    pub fn full_name(&self) -> String {
        nested_name(self)
    }

    /// The types nested directly inside this one
    #[must_use]
    pub fn nested_types(&self) -> Vec<Arc<TypeDef>> {
        match self.origin.module() {
            Some(module) => module.nested_types(self.token.rid()),
            None => Vec::new(),
        }
    }

    /// The interfaces this type implements
    #[must_use]
    pub fn interfaces(&self) -> Vec<Arc<InterfaceImpl>> {
        let Some(module) = self.origin.module() else {
            return Vec::new();
        };

        module
            .entities::<InterfaceImpl>()
            .into_iter()
            .filter(|i| i.class().is_some_and(|class| class.token == self.token))
            .collect()
    }

    /// The generic parameters of this type, ordered by number
    #[must_use]
    pub fn generic_params(&self) -> Vec<Arc<GenericParam>> {
        match self.origin.module() {
            Some(module) => module.generic_params_of(self.token),
            None => Vec::new(),
        }
    }

    /// The events declared by this type, through `EventMap`
    #[must_use]
    pub fn events(&self) -> Vec<Arc<EventDef>> {
        match self.origin.module() {
            Some(module) => {
                module.mapped_list(TableId::EventMap, self.token.rid(), TableId::EventPtr)
            }
            None => Vec::new(),
        }
    }

    /// The properties declared by this type, through `PropertyMap`
    #[must_use]
    pub fn properties(&self) -> Vec<Arc<PropertyDef>> {
        match self.origin.module() {
            Some(module) => {
                module.mapped_list(TableId::PropertyMap, self.token.rid(), TableId::PropertyPtr)
            }
            None => Vec::new(),
        }
    }

    /// `true` if the `Interface` flag is set
    #[must_use]
    pub fn is_interface(&self) -> bool {
        self.flags() & 0x0000_0020 != 0
    }

    /// `true` if the type is nested in another type
    #[must_use]
    pub fn is_nested(&self) -> bool {
        self.declaring_type().is_some()
    }
}

entity! {
    /// A constructed type such as a generic instantiation or an array, II.22.39
    TypeSpec => TypeSpecRaw, type_specs {
        /// The type signature
        signature, set_signature: Option<TypeSig> =>
            |module, row| module.read_type_signature(row.signature);
    }
}

impl TypeSpec {
    /// A user-created type specification
    #[must_use]
    pub fn new(signature: TypeSig) -> Self {
        let type_spec = Self::user();
        type_spec.set_signature(Some(signature));
        type_spec
    }
}

entity! {
    /// An interface implemented by a type, II.22.23
    InterfaceImpl => InterfaceImplRaw, interface_impls {
        /// The implementing type
        class, set_class: Option<Arc<TypeDef>> => |module, row| module.resolve(row.class);
        /// The implemented interface
        interface, set_interface: Option<TypeDefOrRef> =>
            |module, row| module.type_def_or_ref(row.interface);
    }
}

impl InterfaceImpl {
    /// A user-created interface implementation
    #[must_use]
    pub fn new(class: Option<Arc<TypeDef>>, interface: Option<TypeDefOrRef>) -> Self {
        let interface_impl = Self::user();
        interface_impl.set_class(class);
        interface_impl.set_interface(interface);
        interface_impl
    }
}

entity! {
    /// A generic parameter of a type or method, II.22.20
    GenericParam => GenericParamRaw, generic_params {
        /// The 0-based position within the owner's parameter list
        number, set_number: u32 => |_, row| row.number;
        /// `GenericParamAttributes`
        flags, set_flags: u32 => |_, row| row.flags;
        /// The generic `TypeDef` or `MethodDef`
        owner, set_owner: Option<EntityRef> =>
            |module, row| module.coded(CodedIndexType::TypeOrMethodDef, row.owner);
        /// The parameter name
        name, set_name: Option<UTF8String> => |module, row| module.string(row.name);
        /// The kind column of version 1.1 metadata
        kind, set_kind: Option<TypeDefOrRef> => |module, row| module.type_def_or_ref(row.kind);
    }
}

impl GenericParam {
    /// A user-created generic parameter
    #[must_use]
    pub fn new(number: u32, flags: u32, name: impl Into<UTF8String>) -> Self {
        let param = Self::user();
        param.set_number(number);
        param.set_flags(flags);
        param.set_owner(None);
        param.set_name(Some(name.into()));
        param.set_kind(None);
        param
    }

    /// The constraints on this parameter
    #[must_use]
    pub fn constraints(&self) -> Vec<Arc<GenericParamConstraint>> {
        let Some(module) = self.origin.module() else {
            return Vec::new();
        };

        module
            .entities::<GenericParamConstraint>()
            .into_iter()
            .filter(|c| c.owner().is_some_and(|owner| owner.token == self.token))
            .collect()
    }
}

entity! {
    /// A constraint on a generic parameter, II.22.21
    GenericParamConstraint => GenericParamConstraintRaw, generic_param_constraints {
        /// The constrained parameter
        owner, set_owner: Option<Arc<GenericParam>> => |module, row| module.resolve(row.owner);
        /// The type the parameter is constrained to
        constraint, set_constraint: Option<TypeDefOrRef> =>
            |module, row| module.type_def_or_ref(row.constraint);
    }
}

impl GenericParamConstraint {
    /// A user-created constraint
    #[must_use]
    pub fn new(owner: Option<Arc<GenericParam>>, constraint: Option<TypeDefOrRef>) -> Self {
        let entity = Self::user();
        entity.set_owner(owner);
        entity.set_constraint(constraint);
        entity
    }
}

/// `Namespace.Name`, or just `Name` for an empty namespace
pub(crate) fn qualified_name(namespace: Option<UTF8String>, name: Option<UTF8String>) -> String {
    let name = name.unwrap_or_default();
    match namespace.filter(|ns| !ns.is_empty()) {
        Some(namespace) => format!("{namespace}.{name}"),
        None => name.to_string(),
    }
}

impl Nested for TypeDef {
    fn simple_name(&self) -> String {
        qualified_name(self.namespace(), self.name())
    }

    fn enclosing(&self) -> Option<Arc<Self>> {
        self.declaring_type()
    }
}

/// An entity that can be nested inside another one of its kind
pub(crate) trait Nested: Entity + Sized {
    /// `Namespace.Name` without the enclosing types
    fn simple_name(&self) -> String;

    /// The directly enclosing entity
    fn enclosing(&self) -> Option<Arc<Self>>;
}

/// The `Outer/Inner` name of `entity`.
///
/// Entities are shared per token, so a chain that reaches an entity twice is a cycle in the
/// nesting rows; the walk stops there.
pub(crate) fn nested_name<T: Nested>(entity: &T) -> String {
    let mut name = entity.simple_name();
    let mut seen = vec![std::ptr::from_ref(entity)];
    let mut outer = entity.enclosing();

    while let Some(current) = outer {
        if seen.contains(&Arc::as_ptr(&current)) {
            warn!(token = %entity.token(), "nesting chain is cyclic");
            break;
        }

        name = format!("{}/{}", current.simple_name(), name);
        seen.push(Arc::as_ptr(&current));
        outer = current.enclosing();
    }

    name
}

#[cfg(test)]
mod tests {
    use std::sync::Weak;

    use super::*;
    use crate::metadata::entities::MdEntity;

    #[test]
    fn user_type_ref() {
        let type_ref = TypeRef::new(None, "System.Collections", "ArrayList");
        assert!(!type_ref.is_metadata());
        assert!(type_ref.token().is_null());
        assert_eq!(type_ref.token().table_id(), Some(TableId::TypeRef));
        assert_eq!(type_ref.full_name(), "System.Collections.ArrayList");

        type_ref.set_name(Some("Hashtable".into()));
        assert_eq!(type_ref.name().unwrap(), "Hashtable");

        let type_ref = type_ref.with_rid(7);
        assert_eq!(type_ref.token().value(), 0x0100_0007);
    }

    #[test]
    fn nested_type_ref() {
        let outer = Arc::new(TypeRef::new(None, "Ns", "Outer"));
        let inner = TypeRef::new(Some(EntityRef::TypeRef(outer)), "", "Inner");
        assert_eq!(inner.full_name(), "Ns.Outer/Inner");
    }

    #[test]
    fn user_type_def() {
        let base = TypeDefOrRef::TypeRef(Arc::new(TypeRef::new(None, "System", "Object")));
        let type_def = TypeDef::new(0x0010_0001, "App", "Program", Some(base.clone()));

        assert_eq!(type_def.full_name(), "App.Program");
        assert_eq!(type_def.extends(), Some(base));
        assert!(type_def.fields().is_empty());
        assert!(type_def.methods().is_empty());
        assert!(!type_def.is_interface());
        assert!(!type_def.is_nested());
        assert!(type_def.nested_types().is_empty());
        assert!(type_def.interfaces().is_empty());

        let outer = Arc::new(TypeDef::new(0, "App", "Outer", None));
        type_def.set_declaring_type(Some(outer));
        assert_eq!(type_def.full_name(), "App.Outer/App.Program");
    }

    #[test]
    fn module_gone() {
        let type_def = TypeDef::from_md(Weak::new(), 2);
        assert!(type_def.is_metadata());

        // Nothing is cached while no row can be read
        assert!(type_def.name().is_none());
        assert_eq!(type_def.flags(), 0);
        assert!(!type_def.name.is_resolved());
        assert!(!type_def.flags.is_resolved());

        type_def.set_name(Some("Kept".into()));
        assert_eq!(type_def.name().unwrap(), "Kept");
    }

    #[test]
    fn generic_param() {
        let param = GenericParam::new(1, 0, "TValue");
        assert_eq!(param.number(), 1);
        assert_eq!(param.name().unwrap(), "TValue");
        assert!(param.owner().is_none());
        assert!(param.constraints().is_empty());
    }
}
