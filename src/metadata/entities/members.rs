use std::sync::Arc;

use crate::metadata::{
    entities::{EntityRef, GenericParam, TypeDef, TypeDefOrRef},
    signatures::{CallingConventionSig, FieldSig, MethodBaseSig},
    tables::{CodedIndexType, TableId},
    utf8string::UTF8String,
};

entity! {
    /// A field of a type, II.22.15
    FieldDef => FieldRaw, fields {
        /// `FieldAttributes`
        flags, set_flags: u32 => |_, row| row.flags;
        /// The field name
        name, set_name: Option<UTF8String> => |module, row| module.string(row.name);
        /// The field signature
        signature, set_signature: Option<CallingConventionSig> =>
            |module, row| module.read_signature(row.signature);
    }
}

impl FieldDef {
    /// A user-created field
    #[must_use]
    pub fn new(flags: u32, name: impl Into<UTF8String>, signature: Option<FieldSig>) -> Self {
        let field = Self::user();
        field.set_flags(flags);
        field.set_name(Some(name.into()));
        field.set_signature(signature.map(CallingConventionSig::Field));
        field
    }

    /// The signature, if it is a field signature
    #[must_use]
    pub fn field_sig(&self) -> Option<FieldSig> {
        match self.signature() {
            Some(CallingConventionSig::Field(sig)) => Some(sig),
            _ => None,
        }
    }

    /// `true` if the `Static` flag is set
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.flags() & 0x0010 != 0
    }

    /// The type that owns this field, found through the `FieldList` ranges
    #[must_use]
    pub fn declaring_type(&self) -> Option<Arc<TypeDef>> {
        self.origin.module()?.declaring_type_of(self.token)
    }
}

entity! {
    /// A method of a type, II.22.26
    MethodDef => MethodDefRaw, methods {
        /// RVA of the method body, 0 if there is none
        rva, set_rva: u32 => |_, row| row.rva;
        /// `MethodImplAttributes`
        impl_flags, set_impl_flags: u32 => |_, row| row.impl_flags;
        /// `MethodAttributes`
        flags, set_flags: u32 => |_, row| row.flags;
        /// The method name
        name, set_name: Option<UTF8String> => |module, row| module.string(row.name);
        /// The method signature
        signature, set_signature: Option<CallingConventionSig> =>
            |module, row| module.read_signature(row.signature);
        /// The parameter rows, in table order
        params, set_params: Vec<Arc<ParamDef>> => |module, row| {
            module.member_list(TableId::MethodDef, row.rid, 5, TableId::ParamPtr)
        };
    }
}

impl MethodDef {
    /// A user-created method
    #[must_use]
    pub fn new(
        flags: u32,
        impl_flags: u32,
        name: impl Into<UTF8String>,
        signature: Option<MethodBaseSig>,
    ) -> Self {
        let method = Self::user();
        method.set_rva(0);
        method.set_impl_flags(impl_flags);
        method.set_flags(flags);
        method.set_name(Some(name.into()));
        method.set_signature(signature.map(CallingConventionSig::Method));
        method.set_params(Vec::new());
        method
    }

    /// The signature, if it is a method signature
    #[must_use]
    pub fn method_sig(&self) -> Option<MethodBaseSig> {
        match self.signature() {
            Some(CallingConventionSig::Method(sig)) => Some(sig),
            _ => None,
        }
    }

    /// The type that owns this method, found through the `MethodList` ranges
    #[must_use]
    pub fn declaring_type(&self) -> Option<Arc<TypeDef>> {
        self.origin.module()?.declaring_type_of(self.token)
    }

    /// The generic parameters of this method, ordered by number
    #[must_use]
    pub fn generic_params(&self) -> Vec<Arc<GenericParam>> {
        match self.origin.module() {
            Some(module) => module.generic_params_of(self.token),
            None => Vec::new(),
        }
    }

    /// `true` if the `Static` flag is set
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.flags() & 0x0010 != 0
    }

    /// `true` if this is an instance or static constructor
    #[must_use]
    pub fn is_constructor(&self) -> bool {
        self.flags() & 0x0800 != 0
            && self
                .name()
                .is_some_and(|name| name == ".ctor" || name == ".cctor")
    }
}

entity! {
    /// A parameter of a method, II.22.33
    ParamDef => ParamRaw, params {
        /// `ParamAttributes`
        flags, set_flags: u32 => |_, row| row.flags;
        /// The position; 0 is the return value
        sequence, set_sequence: u32 => |_, row| row.sequence;
        /// The parameter name
        name, set_name: Option<UTF8String> => |module, row| module.string(row.name);
    }
}

impl ParamDef {
    /// A user-created parameter
    #[must_use]
    pub fn new(flags: u32, sequence: u32, name: impl Into<UTF8String>) -> Self {
        let param = Self::user();
        param.set_flags(flags);
        param.set_sequence(sequence);
        param.set_name(Some(name.into()));
        param
    }
}

entity! {
    /// A reference to a field or method, II.22.25
    MemberRef => MemberRefRaw, member_refs {
        /// The type, module or method the member belongs to
        class, set_class: Option<EntityRef> =>
            |module, row| module.coded(CodedIndexType::MemberRefParent, row.class);
        /// The member name
        name, set_name: Option<UTF8String> => |module, row| module.string(row.name);
        /// The field or method signature
        signature, set_signature: Option<CallingConventionSig> =>
            |module, row| module.read_signature(row.signature);
    }
}

impl MemberRef {
    /// A user-created member reference
    #[must_use]
    pub fn new(
        class: Option<EntityRef>,
        name: impl Into<UTF8String>,
        signature: Option<CallingConventionSig>,
    ) -> Self {
        let member = Self::user();
        member.set_class(class);
        member.set_name(Some(name.into()));
        member.set_signature(signature);
        member
    }

    /// `true` if the signature is a field signature
    #[must_use]
    pub fn is_field(&self) -> bool {
        matches!(self.signature(), Some(CallingConventionSig::Field(_)))
    }

    /// `true` if the signature is a method signature
    #[must_use]
    pub fn is_method(&self) -> bool {
        matches!(self.signature(), Some(CallingConventionSig::Method(_)))
    }
}

entity! {
    /// An event of a type, II.22.13
    EventDef => EventRaw, events {
        /// `EventAttributes`
        flags, set_flags: u32 => |_, row| row.flags;
        /// The event name
        name, set_name: Option<UTF8String> => |module, row| module.string(row.name);
        /// The delegate type of the event
        event_type, set_event_type: Option<TypeDefOrRef> =>
            |module, row| module.type_def_or_ref(row.event_type);
    }
}

impl EventDef {
    /// A user-created event
    #[must_use]
    pub fn new(flags: u32, name: impl Into<UTF8String>, event_type: Option<TypeDefOrRef>) -> Self {
        let event = Self::user();
        event.set_flags(flags);
        event.set_name(Some(name.into()));
        event.set_event_type(event_type);
        event
    }
}

entity! {
    /// A property of a type, II.22.34
    PropertyDef => PropertyRaw, properties {
        /// `PropertyAttributes`
        flags, set_flags: u32 => |_, row| row.flags;
        /// The property name
        name, set_name: Option<UTF8String> => |module, row| module.string(row.name);
        /// The property signature
        signature, set_signature: Option<CallingConventionSig> =>
            |module, row| module.read_signature(row.signature);
    }
}

impl PropertyDef {
    /// A user-created property
    #[must_use]
    pub fn new(flags: u32, name: impl Into<UTF8String>, signature: Option<MethodBaseSig>) -> Self {
        let property = Self::user();
        property.set_flags(flags);
        property.set_name(Some(name.into()));
        property.set_signature(signature.map(CallingConventionSig::Property));
        property
    }
}

entity! {
    /// An instantiation of a generic method, II.22.29
    MethodSpec => MethodSpecRaw, method_specs {
        /// The generic `MethodDef` or `MemberRef`
        method, set_method: Option<EntityRef> =>
            |module, row| module.coded(CodedIndexType::MethodDefOrRef, row.method);
        /// The generic arguments
        instantiation, set_instantiation: Option<CallingConventionSig> =>
            |module, row| module.read_signature(row.instantiation);
    }
}

impl MethodSpec {
    /// A user-created method instantiation
    #[must_use]
    pub fn new(method: Option<EntityRef>, instantiation: Option<CallingConventionSig>) -> Self {
        let spec = Self::user();
        spec.set_method(method);
        spec.set_instantiation(instantiation);
        spec
    }
}

entity! {
    /// A stand-alone signature, usually the locals of a method body, II.22.36
    StandAloneSig => StandAloneSigRaw, standalone_sigs {
        /// The signature
        signature, set_signature: Option<CallingConventionSig> =>
            |module, row| module.read_signature(row.signature);
    }
}

impl StandAloneSig {
    /// A user-created stand-alone signature
    #[must_use]
    pub fn new(signature: Option<CallingConventionSig>) -> Self {
        let sig = Self::user();
        sig.set_signature(signature);
        sig
    }
}
