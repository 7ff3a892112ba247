mod common;

use std::sync::Arc;

use cilmeta::prelude::*;
use common::{resolution_scope, MetadataBuilder};

/// `System.Object` and `System.Collections.Generic.List`1` references plus a few blobs
fn module_with_signatures() -> (Arc<ModuleDef>, Vec<u32>) {
    let mut b = MetadataBuilder::new();
    let name = b.string("Sigs.dll");
    b.row(TableId::Module, &[0, name, 0, 0, 0]);

    let runtime = b.string("System.Runtime");
    b.row(TableId::AssemblyRef, &[8, 0, 0, 0, 0, 0, runtime, 0, 0]);

    let scope = resolution_scope(TableId::AssemblyRef, 1);
    let system = b.string("System");
    let object = b.string("Object");
    let generic = b.string("System.Collections.Generic");
    let list = b.string("List`1");
    b.row(TableId::TypeRef, &[scope, object, system]);
    b.row(TableId::TypeRef, &[scope, list, generic]);

    let blobs = vec![
        // class [System.Runtime]System.Object[]
        b.blob(&[0x1D, 0x12, 0x05]),
        // locals: int32, pinned byref uint8, object
        b.blob(&[0x07, 0x03, 0x08, 0x45, 0x10, 0x05, 0x1C]),
        // vararg void (int32, ..., string, object)
        b.blob(&[0x05, 0x03, 0x01, 0x08, 0x41, 0x0E, 0x1C]),
        // generic instantiation <!!0, class List`1>
        b.blob(&[0x0A, 0x02, 0x1E, 0x00, 0x12, 0x09]),
        // GENERICINST is not decoded
        b.blob(&[0x15, 0x12, 0x09, 0x01, 0x08]),
    ];

    b.row(TableId::TypeSpec, &[blobs[0]]);
    b.row(TableId::TypeSpec, &[blobs[4]]);
    b.row(TableId::StandAloneSig, &[blobs[1]]);

    (ModuleDef::from_metadata(b.build()).unwrap(), blobs)
}

#[test]
fn type_specs() {
    let (module, _) = module_with_signatures();

    let array = module.resolve::<TypeSpec>(1).unwrap();
    let Some(TypeSig::SzArray(element)) = array.signature() else {
        panic!("expected an SZARRAY");
    };
    let TypeSig::Class(class) = *element else {
        panic!("expected a class element type");
    };
    assert_eq!(class.full_name(), "System.Object");

    let generic = module.resolve::<TypeSpec>(2).unwrap();
    assert!(generic.signature().is_none());
}

#[test]
fn locals() {
    let (module, _) = module_with_signatures();

    let sig = module.resolve::<StandAloneSig>(1).unwrap();
    let locals = sig.signature().unwrap();
    let locals = locals.as_locals().unwrap();

    assert_eq!(locals.locals.len(), 3);
    assert_eq!(locals.locals[0].element_type(), ELEMENT_TYPE::I4);
    assert_eq!(locals.locals[1].element_type(), ELEMENT_TYPE::PINNED);
    assert_eq!(
        locals.locals[1].next().and_then(TypeSig::next).map(TypeSig::element_type),
        Some(ELEMENT_TYPE::U1)
    );
    assert_eq!(locals.locals[2].element_type(), ELEMENT_TYPE::OBJECT);
}

#[test]
fn vararg_sentinel() {
    let (module, blobs) = module_with_signatures();

    let sig = module.read_signature(blobs[2]).unwrap();
    let method = sig.as_method().unwrap();
    assert_eq!(method.calling_convention.kind(), CallingConvention::VARARG);
    assert_eq!(method.params.len(), 1);
    let tail = method.params_after_sentinel.as_ref().unwrap();
    assert_eq!(tail.len(), 2);
    assert_eq!(tail[0].element_type(), ELEMENT_TYPE::STRING);
    // The sentinel is not a parameter
    assert_eq!(method.param_count(), 3);
}

#[test]
fn generic_instantiation() {
    let (module, blobs) = module_with_signatures();

    let sig = module.read_signature(blobs[3]).unwrap();
    let inst = sig.as_generic_inst().unwrap();
    assert_eq!(inst.generic_args.len(), 2);
    assert_eq!(inst.generic_args[0], TypeSig::MVar(0));
    let TypeSig::Class(list) = &inst.generic_args[1] else {
        panic!("expected a class argument");
    };
    assert_eq!(list.full_name(), "System.Collections.Generic.List`1");
}

#[test]
fn module_round_trip() {
    let (module, blobs) = module_with_signatures();
    for blob in &blobs[1..4] {
        let sig = module.read_signature(*blob).unwrap();
        let bytes = SignatureWriter::write(&sig).unwrap();

        let decoded = SignatureReader::read(&*module, &bytes, 50).unwrap();
        assert_eq!(decoded, sig);
    }

    let array = module.read_type_signature(blobs[0]).unwrap();
    assert_eq!(SignatureWriter::write_type_spec(&array).unwrap(), [0x1D, 0x12, 0x05]);
}

#[test]
fn corlib_reference() {
    let (module, _) = module_with_signatures();

    let corlib = module.corlib_types();
    assert_eq!(corlib.scope().unwrap().name().unwrap(), "System.Runtime");
    assert_eq!(corlib.object().element_type(), ELEMENT_TYPE::OBJECT);
}

#[test]
fn depth_limit() {
    let mut b = MetadataBuilder::new();
    let name = b.string("Deep.dll");
    b.row(TableId::Module, &[0, name, 0, 0, 0]);

    // A field of type int32 behind 8 pointers
    let mut sig = vec![0x06];
    sig.extend([0x0F; 8]);
    sig.push(0x08);
    let blob = b.blob(&sig);
    let data = b.build();

    let shallow = LoadOptions {
        max_signature_depth: 4,
        ..LoadOptions::default()
    };
    let module = ModuleDef::from_metadata_with(data.clone(), shallow).unwrap();
    assert!(module.read_signature(blob).is_none());

    let module = ModuleDef::from_metadata(data).unwrap();
    let field = module.read_signature(blob).unwrap();
    assert_eq!(
        field.as_field().unwrap().field_type.element_type(),
        ELEMENT_TYPE::PTR
    );
}
