//! Raw row structs, one per table.
//!
//! A raw row is a plain tuple of widened column values in schema order. Heap offsets, table
//! indexes and coded indexes are kept exactly as stored; the entity layer interprets them.

use crate::metadata::{
    tables::{RowReadable, TableId},
    token::Token,
};

macro_rules! raw_row {
    ($(#[$meta:meta])* $name:ident => $table:ident {
        $($(#[$field_meta:meta])* $field:ident),+ $(,)?
    }) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq)]
        pub struct $name {
            /// Row id within the table, 1-based
            pub rid: u32,
            /// Token of this row
            pub token: Token,
            /// Byte offset of the row within the table data
            pub offset: usize,
            $(
                $(#[$field_meta])*
                pub $field: u32,
            )+
        }

        impl RowReadable for $name {
            const TABLE: TableId = TableId::$table;

            fn from_columns(rid: u32, offset: usize, columns: &[u32]) -> Self {
                let mut columns = columns.iter().copied();
                $name {
                    rid,
                    token: Token::from_parts(TableId::$table, rid),
                    offset,
                    $($field: columns.next().unwrap_or(0),)+
                }
            }
        }
    };
}

raw_row!(
    /// The `Module` table, II.22.30
    ModuleRaw => Module {
        /// Reserved, shall be zero
        generation,
        /// `#Strings` offset of the module name
        name,
        /// `#GUID` index of the module version id
        mvid,
        /// `#GUID` index, reserved
        enc_id,
        /// `#GUID` index, reserved
        enc_base_id,
    }
);

raw_row!(
    /// The `TypeRef` table, II.22.38
    TypeRefRaw => TypeRef {
        /// `ResolutionScope` coded index
        resolution_scope,
        /// `#Strings` offset of the type name
        type_name,
        /// `#Strings` offset of the namespace
        type_namespace,
    }
);

raw_row!(
    /// The `TypeDef` table, II.22.37
    TypeDefRaw => TypeDef {
        /// `TypeAttributes`
        flags,
        /// `#Strings` offset of the type name
        type_name,
        /// `#Strings` offset of the namespace
        type_namespace,
        /// `TypeDefOrRef` coded index of the base type
        extends,
        /// First row of the `Field` (or `FieldPtr`) run owned by this type
        field_list,
        /// First row of the `MethodDef` (or `MethodPtr`) run owned by this type
        method_list,
    }
);

raw_row!(
    /// The `FieldPtr` table
    FieldPtrRaw => FieldPtr {
        /// `Field` row
        field,
    }
);

raw_row!(
    /// The `Field` table, II.22.15
    FieldRaw => Field {
        /// `FieldAttributes`
        flags,
        /// `#Strings` offset of the name
        name,
        /// `#Blob` offset of the field signature
        signature,
    }
);

raw_row!(
    /// The `MethodPtr` table
    MethodPtrRaw => MethodPtr {
        /// `MethodDef` row
        method,
    }
);

raw_row!(
    /// The `MethodDef` table, II.22.26
    MethodDefRaw => MethodDef {
        /// RVA of the method body
        rva,
        /// `MethodImplAttributes`
        impl_flags,
        /// `MethodAttributes`
        flags,
        /// `#Strings` offset of the name
        name,
        /// `#Blob` offset of the method signature
        signature,
        /// First row of the `Param` (or `ParamPtr`) run owned by this method
        param_list,
    }
);

raw_row!(
    /// The `ParamPtr` table
    ParamPtrRaw => ParamPtr {
        /// `Param` row
        param,
    }
);

raw_row!(
    /// The `Param` table, II.22.33
    ParamRaw => Param {
        /// `ParamAttributes`
        flags,
        /// Position, 0 is the return value
        sequence,
        /// `#Strings` offset of the name
        name,
    }
);

raw_row!(
    /// The `InterfaceImpl` table, II.22.23
    InterfaceImplRaw => InterfaceImpl {
        /// `TypeDef` row of the implementing type
        class,
        /// `TypeDefOrRef` coded index of the interface
        interface,
    }
);

raw_row!(
    /// The `MemberRef` table, II.22.25
    MemberRefRaw => MemberRef {
        /// `MemberRefParent` coded index
        class,
        /// `#Strings` offset of the name
        name,
        /// `#Blob` offset of the signature
        signature,
    }
);

raw_row!(
    /// The `Constant` table, II.22.9
    ConstantRaw => Constant {
        /// Element type of the value
        constant_type,
        /// `HasConstant` coded index
        parent,
        /// `#Blob` offset of the value
        value,
    }
);

raw_row!(
    /// The `CustomAttribute` table, II.22.10
    CustomAttributeRaw => CustomAttribute {
        /// `HasCustomAttribute` coded index
        parent,
        /// `CustomAttributeType` coded index of the constructor
        constructor,
        /// `#Blob` offset of the value
        value,
    }
);

raw_row!(
    /// The `FieldMarshal` table, II.22.17
    FieldMarshalRaw => FieldMarshal {
        /// `HasFieldMarshal` coded index
        parent,
        /// `#Blob` offset of the native type
        native_type,
    }
);

raw_row!(
    /// The `DeclSecurity` table, II.22.11
    DeclSecurityRaw => DeclSecurity {
        /// Security action
        action,
        /// `HasDeclSecurity` coded index
        parent,
        /// `#Blob` offset of the permission set
        permission_set,
    }
);

raw_row!(
    /// The `ClassLayout` table, II.22.8
    ClassLayoutRaw => ClassLayout {
        /// Field alignment
        packing_size,
        /// Size of the class
        class_size,
        /// `TypeDef` row
        parent,
    }
);

raw_row!(
    /// The `FieldLayout` table, II.22.16
    FieldLayoutRaw => FieldLayout {
        /// Field offset
        field_offset,
        /// `Field` row
        field,
    }
);

raw_row!(
    /// The `StandAloneSig` table, II.22.36
    StandAloneSigRaw => StandAloneSig {
        /// `#Blob` offset of the signature
        signature,
    }
);

raw_row!(
    /// The `EventMap` table, II.22.12
    EventMapRaw => EventMap {
        /// `TypeDef` row
        parent,
        /// First row of the `Event` run
        event_list,
    }
);

raw_row!(
    /// The `EventPtr` table
    EventPtrRaw => EventPtr {
        /// `Event` row
        event,
    }
);

raw_row!(
    /// The `Event` table, II.22.13
    EventRaw => Event {
        /// `EventAttributes`
        flags,
        /// `#Strings` offset of the name
        name,
        /// `TypeDefOrRef` coded index of the delegate type
        event_type,
    }
);

raw_row!(
    /// The `PropertyMap` table, II.22.35
    PropertyMapRaw => PropertyMap {
        /// `TypeDef` row
        parent,
        /// First row of the `Property` run
        property_list,
    }
);

raw_row!(
    /// The `PropertyPtr` table
    PropertyPtrRaw => PropertyPtr {
        /// `Property` row
        property,
    }
);

raw_row!(
    /// The `Property` table, II.22.34
    PropertyRaw => Property {
        /// `PropertyAttributes`
        flags,
        /// `#Strings` offset of the name
        name,
        /// `#Blob` offset of the property signature
        signature,
    }
);

raw_row!(
    /// The `MethodSemantics` table, II.22.28
    MethodSemanticsRaw => MethodSemantics {
        /// `MethodSemanticsAttributes`
        semantics,
        /// `MethodDef` row
        method,
        /// `HasSemantics` coded index
        association,
    }
);

raw_row!(
    /// The `MethodImpl` table, II.22.27
    MethodImplRaw => MethodImpl {
        /// `TypeDef` row
        class,
        /// `MethodDefOrRef` coded index of the body
        method_body,
        /// `MethodDefOrRef` coded index of the declaration
        method_declaration,
    }
);

raw_row!(
    /// The `ModuleRef` table, II.22.31
    ModuleRefRaw => ModuleRef {
        /// `#Strings` offset of the name
        name,
    }
);

raw_row!(
    /// The `TypeSpec` table, II.22.39
    TypeSpecRaw => TypeSpec {
        /// `#Blob` offset of the type signature
        signature,
    }
);

raw_row!(
    /// The `ImplMap` table, II.22.22
    ImplMapRaw => ImplMap {
        /// `PInvokeAttributes`
        mapping_flags,
        /// `MemberForwarded` coded index
        member_forwarded,
        /// `#Strings` offset of the import name
        import_name,
        /// `ModuleRef` row
        import_scope,
    }
);

raw_row!(
    /// The `FieldRVA` table, II.22.18
    FieldRvaRaw => FieldRVA {
        /// RVA of the initial value
        rva,
        /// `Field` row
        field,
    }
);

raw_row!(
    /// The `EncLog` table
    EncLogRaw => EncLog {
        /// Token of the edited entity
        token_value,
        /// Edit operation
        func_code,
    }
);

raw_row!(
    /// The `EncMap` table
    EncMapRaw => EncMap {
        /// Token of the mapped entity
        token_value,
    }
);

raw_row!(
    /// The `Assembly` table, II.22.2
    AssemblyRaw => Assembly {
        /// `AssemblyHashAlgorithm`
        hash_alg_id,
        /// Major version
        major_version,
        /// Minor version
        minor_version,
        /// Build number
        build_number,
        /// Revision number
        revision_number,
        /// `AssemblyFlags`
        flags,
        /// `#Blob` offset of the public key
        public_key,
        /// `#Strings` offset of the name
        name,
        /// `#Strings` offset of the culture
        culture,
    }
);

raw_row!(
    /// The `AssemblyProcessor` table
    AssemblyProcessorRaw => AssemblyProcessor {
        /// Processor id
        processor,
    }
);

raw_row!(
    /// The `AssemblyOS` table
    AssemblyOsRaw => AssemblyOS {
        /// Platform id
        os_platform_id,
        /// Major version
        os_major_version,
        /// Minor version
        os_minor_version,
    }
);

raw_row!(
    /// The `AssemblyRef` table, II.22.5
    AssemblyRefRaw => AssemblyRef {
        /// Major version
        major_version,
        /// Minor version
        minor_version,
        /// Build number
        build_number,
        /// Revision number
        revision_number,
        /// `AssemblyFlags`
        flags,
        /// `#Blob` offset of the public key or token
        public_key_or_token,
        /// `#Strings` offset of the name
        name,
        /// `#Strings` offset of the culture
        culture,
        /// `#Blob` offset of the hash
        hash_value,
    }
);

raw_row!(
    /// The `AssemblyRefProcessor` table
    AssemblyRefProcessorRaw => AssemblyRefProcessor {
        /// Processor id
        processor,
        /// `AssemblyRef` row
        assembly_ref,
    }
);

raw_row!(
    /// The `AssemblyRefOS` table
    AssemblyRefOsRaw => AssemblyRefOS {
        /// Platform id
        os_platform_id,
        /// Major version
        os_major_version,
        /// Minor version
        os_minor_version,
        /// `AssemblyRef` row
        assembly_ref,
    }
);

raw_row!(
    /// The `File` table, II.22.19
    FileRaw => File {
        /// `FileAttributes`
        flags,
        /// `#Strings` offset of the name
        name,
        /// `#Blob` offset of the hash
        hash_value,
    }
);

raw_row!(
    /// The `ExportedType` table, II.22.14
    ExportedTypeRaw => ExportedType {
        /// `TypeAttributes`
        flags,
        /// Hint: `TypeDef` token value in the defining module
        type_def_id,
        /// `#Strings` offset of the type name
        type_name,
        /// `#Strings` offset of the namespace
        type_namespace,
        /// `Implementation` coded index
        implementation,
    }
);

raw_row!(
    /// The `ManifestResource` table, II.22.24
    ManifestResourceRaw => ManifestResource {
        /// Offset of the resource data
        offset_field,
        /// `ManifestResourceAttributes`
        flags,
        /// `#Strings` offset of the name
        name,
        /// `Implementation` coded index, 0 for embedded resources
        implementation,
    }
);

raw_row!(
    /// The `NestedClass` table, II.22.32
    NestedClassRaw => NestedClass {
        /// `TypeDef` row of the nested type
        nested_class,
        /// `TypeDef` row of the enclosing type
        enclosing_class,
    }
);

raw_row!(
    /// The `GenericParam` table, II.22.20
    GenericParamRaw => GenericParam {
        /// Position in the owner's parameter list
        number,
        /// `GenericParamAttributes`
        flags,
        /// `TypeOrMethodDef` coded index
        owner,
        /// `#Strings` offset of the name
        name,
        /// `TypeDefOrRef` coded index, only present in 1.1 tables streams
        kind,
    }
);

raw_row!(
    /// The `MethodSpec` table, II.22.29
    MethodSpecRaw => MethodSpec {
        /// `MethodDefOrRef` coded index
        method,
        /// `#Blob` offset of the instantiation signature
        instantiation,
    }
);

raw_row!(
    /// The `GenericParamConstraint` table, II.22.21
    GenericParamConstraintRaw => GenericParamConstraint {
        /// `GenericParam` row
        owner,
        /// `TypeDefOrRef` coded index
        constraint,
    }
);
