use crate::metadata::{entities::EntityRef, tables::CodedIndexType};

entity! {
    /// A compile-time constant of a field, parameter or property, II.22.9
    Constant => ConstantRaw, constants {
        /// The `ELEMENT_TYPE` of the value
        element_type, set_element_type: u8 => |_, row| row.constant_type as u8;
        /// The field, parameter or property the value belongs to
        parent, set_parent: Option<EntityRef> =>
            |module, row| module.coded(CodedIndexType::HasConstant, row.parent);
        /// The little-endian value bytes
        value, set_value: Option<Vec<u8>> => |module, row| module.blob(row.value);
    }
}

impl Constant {
    /// A user-created constant
    #[must_use]
    pub fn new(element_type: u8, parent: Option<EntityRef>, value: Vec<u8>) -> Self {
        let constant = Self::user();
        constant.set_element_type(element_type);
        constant.set_parent(parent);
        constant.set_value(Some(value));
        constant
    }
}

entity! {
    /// A custom attribute applied to an entity, II.22.10
    CustomAttribute => CustomAttributeRaw, custom_attributes {
        /// The entity the attribute is applied to
        parent, set_parent: Option<EntityRef> =>
            |module, row| module.coded(CodedIndexType::HasCustomAttribute, row.parent);
        /// The attribute constructor, a `MethodDef` or `MemberRef`
        constructor, set_constructor: Option<EntityRef> =>
            |module, row| module.coded(CodedIndexType::CustomAttributeType, row.constructor);
        /// The encoded constructor arguments
        value, set_value: Option<Vec<u8>> => |module, row| module.blob(row.value);
    }
}

impl CustomAttribute {
    /// A user-created custom attribute
    #[must_use]
    pub fn new(parent: Option<EntityRef>, constructor: Option<EntityRef>, value: Vec<u8>) -> Self {
        let attribute = Self::user();
        attribute.set_parent(parent);
        attribute.set_constructor(constructor);
        attribute.set_value(Some(value));
        attribute
    }

    /// The full name of the attribute type, taken from the constructor's declaring type
    #[must_use]
    pub fn type_name(&self) -> Option<String> {
        match self.constructor()? {
            EntityRef::MemberRef(ctor) => match ctor.class()? {
                EntityRef::TypeRef(t) => Some(t.full_name()),
                EntityRef::TypeDef(t) => Some(t.full_name()),
                _ => None,
            },
            EntityRef::Method(ctor) => ctor.declaring_type().map(|t| t.full_name()),
            _ => None,
        }
    }
}

entity! {
    /// A declarative security permission set, II.22.11
    DeclSecurity => DeclSecurityRaw, decl_securities {
        /// The `SecurityAction`
        action, set_action: u16 => |_, row| row.action as u16;
        /// The type, method or assembly the permissions apply to
        parent, set_parent: Option<EntityRef> =>
            |module, row| module.coded(CodedIndexType::HasDeclSecurity, row.parent);
        /// The encoded permission set
        permission_set, set_permission_set: Option<Vec<u8>> =>
            |module, row| module.blob(row.permission_set);
    }
}

impl DeclSecurity {
    /// A user-created permission set
    #[must_use]
    pub fn new(action: u16, parent: Option<EntityRef>, permission_set: Vec<u8>) -> Self {
        let security = Self::user();
        security.set_action(action);
        security.set_parent(parent);
        security.set_permission_set(Some(permission_set));
        security
    }

    /// `true` if the blob uses the .NET 2.0 binary format rather than XML
    #[must_use]
    pub fn is_binary(&self) -> bool {
        self.permission_set()
            .is_some_and(|data| data.first() == Some(&b'.'))
    }
}
