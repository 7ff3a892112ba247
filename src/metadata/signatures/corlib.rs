use std::sync::Arc;

use crate::metadata::{
    entities::{EntityRef, TypeRef},
    signatures::{CorLibTypeSig, TypeSig, ELEMENT_TYPE},
};

/// Names of assemblies that can act as the core library, most specific first
pub const CORLIB_NAMES: [&str; 4] = [
    "mscorlib",
    "System.Private.CoreLib",
    "System.Runtime",
    "netstandard",
];

const PRIMITIVES: [(u8, &str); 18] = [
    (ELEMENT_TYPE::VOID, "Void"),
    (ELEMENT_TYPE::BOOLEAN, "Boolean"),
    (ELEMENT_TYPE::CHAR, "Char"),
    (ELEMENT_TYPE::I1, "SByte"),
    (ELEMENT_TYPE::U1, "Byte"),
    (ELEMENT_TYPE::I2, "Int16"),
    (ELEMENT_TYPE::U2, "UInt16"),
    (ELEMENT_TYPE::I4, "Int32"),
    (ELEMENT_TYPE::U4, "UInt32"),
    (ELEMENT_TYPE::I8, "Int64"),
    (ELEMENT_TYPE::U8, "UInt64"),
    (ELEMENT_TYPE::R4, "Single"),
    (ELEMENT_TYPE::R8, "Double"),
    (ELEMENT_TYPE::STRING, "String"),
    (ELEMENT_TYPE::TYPEDBYREF, "TypedReference"),
    (ELEMENT_TYPE::I, "IntPtr"),
    (ELEMENT_TYPE::U, "UIntPtr"),
    (ELEMENT_TYPE::OBJECT, "Object"),
];

/// The primitive types of a module.
///
/// Every primitive is created once per module; signatures share these instances instead of
/// allocating a new node for every `int32` they contain.
#[derive(Debug)]
pub struct CorLibTypes {
    scope: Option<EntityRef>,
    types: Vec<Arc<CorLibTypeSig>>,
}

impl CorLibTypes {
    /// Create the primitives, with their `TypeRef`s scoped to `scope`
    ///
    /// `scope` is the core library `AssemblyRef`, or the module itself when it is the core
    /// library.
    #[must_use]
    pub fn new(scope: Option<EntityRef>) -> Self {
        let types = PRIMITIVES
            .iter()
            .map(|(element_type, name)| {
                Arc::new(CorLibTypeSig {
                    element_type: *element_type,
                    type_ref: Arc::new(TypeRef::new(scope.clone(), "System", *name)),
                })
            })
            .collect();

        CorLibTypes { scope, types }
    }

    /// The primitive for `element_type`
    #[must_use]
    pub fn get(&self, element_type: u8) -> Option<&Arc<CorLibTypeSig>> {
        self.types.iter().find(|t| t.element_type == element_type)
    }

    /// The primitive named `System.<name>`
    #[must_use]
    pub fn by_name(&self, name: &str) -> Option<&Arc<CorLibTypeSig>> {
        PRIMITIVES
            .iter()
            .position(|(_, primitive)| *primitive == name)
            .and_then(|index| self.types.get(index))
    }

    /// The primitive for `element_type` as a signature
    #[must_use]
    pub fn sig(&self, element_type: u8) -> Option<TypeSig> {
        self.get(element_type).cloned().map(TypeSig::CorLib)
    }

    /// The resolution scope of the primitive `TypeRef`s
    #[must_use]
    pub fn scope(&self) -> Option<&EntityRef> {
        self.scope.as_ref()
    }

    /// `void`
    #[must_use]
    pub fn void(&self) -> TypeSig {
        self.primitive(0)
    }

    /// `bool`
    #[must_use]
    pub fn boolean(&self) -> TypeSig {
        self.primitive(1)
    }

    /// `int32`
    #[must_use]
    pub fn int32(&self) -> TypeSig {
        self.primitive(7)
    }

    /// `int64`
    #[must_use]
    pub fn int64(&self) -> TypeSig {
        self.primitive(9)
    }

    /// `string`
    #[must_use]
    pub fn string(&self) -> TypeSig {
        self.primitive(13)
    }

    /// `object`
    #[must_use]
    pub fn object(&self) -> TypeSig {
        self.primitive(17)
    }

    fn primitive(&self, index: usize) -> TypeSig {
        TypeSig::CorLib(self.types[index].clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitives() {
        let corlib = CorLibTypes::new(None);

        for (element_type, name) in PRIMITIVES {
            let primitive = corlib.get(element_type).unwrap();
            assert_eq!(primitive.name(), name);
            assert_eq!(primitive.type_ref.namespace().unwrap(), "System");
            assert!(Arc::ptr_eq(primitive, corlib.by_name(name).unwrap()));
        }

        assert!(corlib.get(ELEMENT_TYPE::CLASS).is_none());
        assert!(corlib.void().is_void());
        assert_eq!(corlib.int32().element_type(), ELEMENT_TYPE::I4);
        assert_eq!(corlib.object().element_type(), ELEMENT_TYPE::OBJECT);
    }

    #[test]
    fn shared_instances() {
        let corlib = CorLibTypes::new(None);
        let (TypeSig::CorLib(a), TypeSig::CorLib(b)) = (corlib.string(), corlib.string()) else {
            panic!("expected core library types");
        };
        assert!(Arc::ptr_eq(&a, &b));
    }
}
