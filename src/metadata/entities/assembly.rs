use std::sync::Arc;

use crate::metadata::{
    entities::{
        types::{nested_name, qualified_name, Nested},
        EntityRef,
    },
    identity::{
        display_name, AssemblyVersion, ASSEMBLY_FLAG_PUBLIC_KEY, HashAlgorithm, PublicKeyOrToken,
    },
    tables::CodedIndexType,
    utf8string::UTF8String,
};

entity! {
    /// The assembly manifest of this module, II.22.2
    AssemblyDef => AssemblyRaw, assemblies {
        /// The algorithm used to hash the files of the assembly
        hash_algorithm, set_hash_algorithm: HashAlgorithm =>
            |_, row| HashAlgorithm::from_id(row.hash_alg_id);
        /// The assembly version
        version, set_version: AssemblyVersion => |_, row| version_of(
            row.major_version,
            row.minor_version,
            row.build_number,
            row.revision_number,
        );
        /// `AssemblyFlags`
        flags, set_flags: u32 => |_, row| row.flags;
        /// The public key of a strong-named assembly
        public_key, set_public_key: PublicKeyOrToken => |module, row| {
            PublicKeyOrToken::from_blob(
                &module.blob(row.public_key).unwrap_or_default(),
                ASSEMBLY_FLAG_PUBLIC_KEY,
            )
        };
        /// The simple assembly name
        name, set_name: Option<UTF8String> => |module, row| module.string(row.name);
        /// The culture, empty for neutral assemblies
        culture, set_culture: Option<UTF8String> => |module, row| module.string(row.culture);
    }
}

impl AssemblyDef {
    /// A user-created assembly
    #[must_use]
    pub fn new(name: impl Into<UTF8String>, version: AssemblyVersion) -> Self {
        let assembly = Self::user();
        assembly.set_hash_algorithm(HashAlgorithm::Sha1);
        assembly.set_version(version);
        assembly.set_flags(0);
        assembly.set_public_key(PublicKeyOrToken::None);
        assembly.set_name(Some(name.into()));
        assembly.set_culture(None);
        assembly
    }

    /// `Name, Version=.., Culture=.., PublicKeyToken=..`
    #[must_use]
    pub fn display_name(&self) -> String {
        self.format_name(false)
    }

    /// Like [`AssemblyDef::display_name`], but with the full `PublicKey` when there is one
    #[must_use]
    pub fn full_name_with_key(&self) -> String {
        self.format_name(true)
    }

    fn format_name(&self, with_key: bool) -> String {
        let name = self.name().unwrap_or_default();
        let culture = self.culture();
        display_name(
            name.as_str(),
            self.version(),
            culture.as_ref().map(UTF8String::as_str),
            &self.public_key(),
            self.hash_algorithm(),
            with_key,
        )
    }
}

entity! {
    /// A reference to another assembly, II.22.5
    AssemblyRef => AssemblyRefRaw, assembly_refs {
        /// The referenced version
        version, set_version: AssemblyVersion => |_, row| version_of(
            row.major_version,
            row.minor_version,
            row.build_number,
            row.revision_number,
        );
        /// `AssemblyFlags`
        flags, set_flags: u32 => |_, row| row.flags;
        /// The public key or its token
        public_key_or_token, set_public_key_or_token: PublicKeyOrToken => |module, row| {
            PublicKeyOrToken::from_blob(
                &module.blob(row.public_key_or_token).unwrap_or_default(),
                row.flags,
            )
        };
        /// The simple assembly name
        name, set_name: Option<UTF8String> => |module, row| module.string(row.name);
        /// The culture, empty for neutral assemblies
        culture, set_culture: Option<UTF8String> => |module, row| module.string(row.culture);
        /// Hash of the referenced assembly
        hash_value, set_hash_value: Option<Vec<u8>> =>
            |module, row| module.blob(row.hash_value).filter(|b| !b.is_empty());
    }
}

impl AssemblyRef {
    /// A user-created assembly reference
    #[must_use]
    pub fn new(name: impl Into<UTF8String>, version: AssemblyVersion) -> Self {
        let reference = Self::user();
        reference.set_version(version);
        reference.set_flags(0);
        reference.set_public_key_or_token(PublicKeyOrToken::None);
        reference.set_name(Some(name.into()));
        reference.set_culture(None);
        reference.set_hash_value(None);
        reference
    }

    /// `Name, Version=.., Culture=.., PublicKeyToken=..`
    ///
    /// A full key is reduced to its token with SHA-1.
    #[must_use]
    pub fn display_name(&self) -> String {
        let name = self.name().unwrap_or_default();
        let culture = self.culture();
        display_name(
            name.as_str(),
            self.version(),
            culture.as_ref().map(UTF8String::as_str),
            &self.public_key_or_token(),
            HashAlgorithm::Sha1,
            false,
        )
    }
}

entity! {
    /// A reference to another module of the same assembly, II.22.31
    ModuleRef => ModuleRefRaw, module_refs {
        /// The module file name
        name, set_name: Option<UTF8String> => |module, row| module.string(row.name);
    }
}

impl ModuleRef {
    /// A user-created module reference
    #[must_use]
    pub fn new(name: impl Into<UTF8String>) -> Self {
        let reference = Self::user();
        reference.set_name(Some(name.into()));
        reference
    }
}

entity! {
    /// A file of a multi-file assembly, II.22.19
    FileDef => FileRaw, files {
        /// `FileAttributes`; 1 means the file holds no metadata
        flags, set_flags: u32 => |_, row| row.flags;
        /// The file name
        name, set_name: Option<UTF8String> => |module, row| module.string(row.name);
        /// Hash of the file contents
        hash_value, set_hash_value: Option<Vec<u8>> => |module, row| module.blob(row.hash_value);
    }
}

impl FileDef {
    /// A user-created file entry
    #[must_use]
    pub fn new(flags: u32, name: impl Into<UTF8String>, hash_value: Option<Vec<u8>>) -> Self {
        let file = Self::user();
        file.set_flags(flags);
        file.set_name(Some(name.into()));
        file.set_hash_value(hash_value);
        file
    }

    /// `true` unless the file is marked as holding no metadata
    #[must_use]
    pub fn contains_metadata(&self) -> bool {
        self.flags() & 0x0001 == 0
    }
}

entity! {
    /// A type exported from another module or forwarded to another assembly, II.22.14
    ExportedType => ExportedTypeRaw, exported_types {
        /// `TypeAttributes`
        flags, set_flags: u32 => |_, row| row.flags;
        /// A hint for the `TypeDef` row in the target module
        type_def_id, set_type_def_id: u32 => |_, row| row.type_def_id;
        /// The type name
        name, set_name: Option<UTF8String> => |module, row| module.string(row.type_name);
        /// The namespace
        namespace, set_namespace: Option<UTF8String> =>
            |module, row| module.string(row.type_namespace);
        /// The `File`, `AssemblyRef` or enclosing `ExportedType`
        implementation, set_implementation: Option<EntityRef> =>
            |module, row| module.coded(CodedIndexType::Implementation, row.implementation);
    }
}

impl ExportedType {
    /// A user-created exported type
    #[must_use]
    pub fn new(
        namespace: impl Into<UTF8String>,
        name: impl Into<UTF8String>,
        implementation: Option<EntityRef>,
    ) -> Self {
        let exported = Self::user();
        exported.set_flags(0);
        exported.set_type_def_id(0);
        exported.set_namespace(Some(namespace.into()));
        exported.set_name(Some(name.into()));
        exported.set_implementation(implementation);
        exported
    }

    /// `Namespace.Name`, prefixed with the enclosing exported type
    #[must_use]
    pub fn full_name(&self) -> String {
        nested_name(self)
    }

    /// `true` if the type is forwarded to another assembly
    #[must_use]
    pub fn is_forwarder(&self) -> bool {
        matches!(self.implementation(), Some(EntityRef::AssemblyRef(_)))
    }
}

impl Nested for ExportedType {
    fn simple_name(&self) -> String {
        qualified_name(self.namespace(), self.name())
    }

    fn enclosing(&self) -> Option<Arc<Self>> {
        match self.implementation() {
            Some(EntityRef::ExportedType(outer)) => Some(outer),
            _ => None,
        }
    }
}

entity! {
    /// A resource of the assembly, II.22.24
    ManifestResource => ManifestResourceRaw, resources {
        /// Offset of the resource within the resources directory, for embedded resources
        offset, set_offset: u32 => |_, row| row.offset_field;
        /// `ManifestResourceAttributes`
        flags, set_flags: u32 => |_, row| row.flags;
        /// The resource name
        name, set_name: Option<UTF8String> => |module, row| module.string(row.name);
        /// The `File` or `AssemblyRef` holding the resource; `None` when embedded
        implementation, set_implementation: Option<EntityRef> =>
            |module, row| module.coded(CodedIndexType::Implementation, row.implementation);
    }
}

impl ManifestResource {
    /// A user-created resource entry
    #[must_use]
    pub fn new(flags: u32, name: impl Into<UTF8String>, implementation: Option<EntityRef>) -> Self {
        let resource = Self::user();
        resource.set_offset(0);
        resource.set_flags(flags);
        resource.set_name(Some(name.into()));
        resource.set_implementation(implementation);
        resource
    }

    /// `true` if the resource is embedded in this module
    #[must_use]
    pub fn is_embedded(&self) -> bool {
        self.implementation().is_none()
    }

    /// `true` if the `Public` visibility flag is set
    #[must_use]
    pub fn is_public(&self) -> bool {
        self.flags() & 0x0007 == 0x0001
    }
}

fn version_of(major: u32, minor: u32, build: u32, revision: u32) -> AssemblyVersion {
    // Columns are two bytes wide
    AssemblyVersion::new(major as u16, minor as u16, build as u16, revision as u16)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::metadata::identity::PublicKeyToken;

    #[test]
    fn assembly_display_name() {
        let assembly = AssemblyDef::new("App", AssemblyVersion::new(1, 2, 3, 4));
        assert_eq!(
            assembly.display_name(),
            "App, Version=1.2.3.4, Culture=neutral, PublicKeyToken=null"
        );

        #[rustfmt::skip]
        let key = vec![
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x04, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        ];
        assembly.set_public_key(PublicKeyOrToken::Key(key));
        assembly.set_culture(Some("de-DE".into()));

        assert_eq!(
            assembly.display_name(),
            "App, Version=1.2.3.4, Culture=de-DE, PublicKeyToken=b77a5c561934e089"
        );
        assert_eq!(
            assembly.full_name_with_key(),
            "App, Version=1.2.3.4, Culture=de-DE, PublicKey=00000000000000000400000000000000"
        );
    }

    #[test]
    fn assembly_ref_display_name() {
        let reference = AssemblyRef::new("mscorlib", AssemblyVersion::new(4, 0, 0, 0));
        reference.set_public_key_or_token(PublicKeyOrToken::Token(PublicKeyToken([
            0xb7, 0x7a, 0x5c, 0x56, 0x19, 0x34, 0xe0, 0x89,
        ])));
        reference.set_culture(Some("".into()));

        assert_eq!(
            reference.display_name(),
            "mscorlib, Version=4.0.0.0, Culture=neutral, PublicKeyToken=b77a5c561934e089"
        );
    }

    #[test]
    fn exported_types() {
        let mscorlib = Arc::new(AssemblyRef::new("mscorlib", AssemblyVersion::default()));
        let outer = Arc::new(ExportedType::new(
            "System",
            "Outer",
            Some(EntityRef::AssemblyRef(mscorlib)),
        ));
        let inner = ExportedType::new("", "Inner", Some(EntityRef::ExportedType(outer.clone())));

        assert!(outer.is_forwarder());
        assert!(!inner.is_forwarder());
        assert_eq!(inner.full_name(), "System.Outer/Inner");
    }

    #[test]
    fn resources_and_files() {
        let resource = ManifestResource::new(0x0001, "App.Resources.resources", None);
        assert!(resource.is_embedded());
        assert!(resource.is_public());

        let file = FileDef::new(0x0001, "native.dll", None);
        assert!(!file.contains_metadata());
    }
}
