mod common;

use std::{sync::Arc, thread};

use cilmeta::prelude::*;
use common::{resolution_scope, sample_module, type_def_or_ref, MetadataBuilder};

fn load() -> Arc<ModuleDef> {
    ModuleDef::from_metadata(sample_module().build()).unwrap()
}

#[test]
fn module_row() {
    let module = load();

    assert_eq!(module.name().unwrap(), "App.dll");
    assert_eq!(module.generation(), 0);
    assert!(module.mvid().is_some());
    assert!(module.enc_id().is_none());
    assert_eq!(module.view().root().version, "v4.0.30319");
    assert!(module.view().cor20header().is_none());

    module.set_name(Some("Renamed.dll".into()));
    assert_eq!(module.name().unwrap(), "Renamed.dll");
}

#[test]
fn assembly_identity() {
    let module = load();

    let assembly = module.assembly().unwrap();
    assert_eq!(assembly.hash_algorithm(), HashAlgorithm::Sha1);
    assert_eq!(
        assembly.display_name(),
        "App, Version=1.2.3.4, Culture=neutral, PublicKeyToken=null"
    );

    let refs = module.assembly_refs();
    assert_eq!(refs.len(), 1);
    assert_eq!(
        refs[0].display_name(),
        "mscorlib, Version=4.0.0.0, Culture=neutral, PublicKeyToken=b77a5c561934e089"
    );
    assert!(refs[0].hash_value().is_none());
}

#[test]
fn identity_is_stable() {
    let module = load();
    assert!(module.caches().is_empty());

    let first = module.resolve::<TypeDef>(2).unwrap();
    let second = module.resolve::<TypeDef>(2).unwrap();
    assert!(Arc::ptr_eq(&first, &second));

    // Creating an entity resolves none of its references
    assert_eq!(module.caches().len(), 1);

    let base = first.extends().unwrap();
    assert_eq!(module.caches().len(), 2);
    assert_eq!(base.full_name(), "System.Object");

    let TypeDefOrRef::TypeRef(object) = base else {
        panic!("base type should be a TypeRef");
    };
    assert!(Arc::ptr_eq(&object, &module.resolve::<TypeRef>(1).unwrap()));
}

#[test]
fn out_of_range_rows() {
    let module = load();

    assert!(module.resolve::<TypeDef>(0).is_none());
    assert!(module.resolve::<TypeDef>(5).is_none());
    assert!(module.resolve::<EventDef>(1).is_none());
    assert!(module.resolve_token(Token::new(0x0200_0063)).is_none());
    assert!(module.resolve_token(Token::new(0x0300_0001)).is_none());
}

#[test]
fn type_graph() {
    let module = load();

    let types = module.types();
    assert_eq!(types.len(), 4);
    assert_eq!(types[0].name().unwrap(), "<Module>");

    let program = module.find_type("App", "Program").unwrap();
    assert_eq!(program.full_name(), "App.Program");
    assert!(!program.is_interface());

    let fields: Vec<String> = program
        .fields()
        .iter()
        .map(|f| f.name().unwrap().to_string())
        .collect();
    assert_eq!(fields, ["count", "label"]);

    let methods: Vec<String> = program
        .methods()
        .iter()
        .map(|m| m.name().unwrap().to_string())
        .collect();
    assert_eq!(methods, ["Add", ".ctor"]);

    let nested = program.nested_types();
    assert_eq!(nested.len(), 1);
    assert_eq!(nested[0].full_name(), "App.Program/Inner");
    assert!(nested[0].is_nested());
    assert!(Arc::ptr_eq(&nested[0].declaring_type().unwrap(), &program));

    let interfaces = program.interfaces();
    assert_eq!(interfaces.len(), 1);
    let runner = interfaces[0].interface().unwrap();
    assert_eq!(runner.full_name(), "App.IRunner");
    let TypeDefOrRef::TypeDef(runner) = runner else {
        panic!("interface should be a TypeDef");
    };
    assert!(runner.is_interface());
    assert!(runner.methods().is_empty());
    assert!(runner.fields().is_empty());
}

#[test]
fn members() {
    let module = load();
    let program = module.resolve::<TypeDef>(2).unwrap();

    let add = &program.methods()[0];
    assert!(add.is_static());
    assert_eq!(add.rva(), 0x2050);
    let params: Vec<(u32, String)> = add
        .params()
        .iter()
        .map(|p| (p.sequence(), p.name().unwrap().to_string()))
        .collect();
    assert_eq!(params, [(1, "a".to_string()), (2, "b".to_string())]);
    assert!(Arc::ptr_eq(&add.declaring_type().unwrap(), &program));

    let ctor = &program.methods()[1];
    assert!(ctor.is_constructor());
    assert!(ctor.params().is_empty());

    let inner = module.resolve::<TypeDef>(3).unwrap();
    let run = &inner.methods()[0];
    assert_eq!(run.name().unwrap(), "Run");
    assert!(run.params().is_empty());
    assert_eq!(run.declaring_type().unwrap().full_name(), "App.Program/Inner");

    let label = &program.fields()[1];
    assert!(label.is_static());
    assert_eq!(label.declaring_type().unwrap().token(), program.token());
}

#[test]
fn method_signatures() {
    let module = load();
    let program = module.resolve::<TypeDef>(2).unwrap();

    let add = program.methods()[0].method_sig().unwrap();
    assert_eq!(add.param_count(), 2);
    assert!(!add.calling_convention.has_this());
    assert_eq!(add.ret_type.element_type(), ELEMENT_TYPE::I4);
    assert!(add.params.iter().all(|p| p.element_type() == ELEMENT_TYPE::I4));
    assert!(add.params_after_sentinel.is_none());

    let ctor = program.methods()[1].method_sig().unwrap();
    assert!(ctor.calling_convention.has_this());
    assert!(ctor.ret_type.is_void());

    let run = module.resolve::<MethodDef>(3).unwrap().method_sig().unwrap();
    assert!(run.calling_convention.is_generic());
    assert_eq!(run.generic_param_count, 1);
    assert_eq!(run.params, vec![TypeSig::MVar(0)]);

    let count = program.fields()[0].field_sig().unwrap();
    assert_eq!(count.field_type.element_type(), ELEMENT_TYPE::I4);
    let label = program.fields()[1].field_sig().unwrap();
    assert_eq!(label.field_type.element_type(), ELEMENT_TYPE::STRING);
}

#[test]
fn corlib_scope() {
    let module = load();
    let corlib = module.corlib_types();

    let scope = corlib.scope().unwrap();
    assert_eq!(scope.token(), Token::new(0x2300_0001));
    assert_eq!(scope.name().unwrap(), "mscorlib");

    // Primitive signatures are shared
    let program = module.resolve::<TypeDef>(2).unwrap();
    let add = program.methods()[0].method_sig().unwrap();
    let (TypeSig::CorLib(a), TypeSig::CorLib(b)) = (&add.params[0], &add.params[1]) else {
        panic!("int32 should be a core library type");
    };
    assert!(Arc::ptr_eq(a, b));
    assert_eq!(a.name(), "Int32");
}

#[test]
fn custom_attributes() {
    let module = load();
    let program = module.resolve::<TypeDef>(2).unwrap();

    let attributes = module.custom_attributes(program.token());
    assert_eq!(attributes.len(), 1);
    assert_eq!(
        attributes[0].type_name().as_deref(),
        Some("System.ObsoleteAttribute")
    );
    assert_eq!(attributes[0].value(), Some(vec![0x01, 0x00, 0x00, 0x00]));
    assert_eq!(attributes[0].parent().unwrap().token(), program.token());

    let Some(EntityRef::MemberRef(ctor)) = attributes[0].constructor() else {
        panic!("constructor should be a MemberRef");
    };
    assert!(ctor.is_method());

    assert!(module.custom_attributes(Token::new(0x0200_0003)).is_empty());
}

#[test]
fn generic_params() {
    let module = load();
    let inner = module.resolve::<TypeDef>(3).unwrap();

    let params = inner.generic_params();
    assert_eq!(params.len(), 1);
    assert_eq!(params[0].name().unwrap(), "T");
    assert_eq!(params[0].number(), 0);
    assert_eq!(params[0].owner().unwrap().token(), inner.token());
    assert!(params[0].constraints().is_empty());

    assert!(module
        .resolve::<TypeDef>(2)
        .unwrap()
        .generic_params()
        .is_empty());
}

#[test]
fn resolve_tokens() {
    let module = load();

    let Some(EntityRef::Method(add)) = module.resolve_token(Token::new(0x0600_0001)) else {
        panic!("0x06000001 should be a method");
    };
    assert_eq!(add.name().unwrap(), "Add");

    let Some(EntityRef::Module(token)) = module.resolve_token(Token::new(0x0000_0001)) else {
        panic!("0x00000001 should be the module");
    };
    assert_eq!(token, module.token());

    let attribute = module.resolve_token(Token::new(0x0C00_0001)).unwrap();
    assert_eq!(attribute.table(), Some(TableId::CustomAttribute));
    assert!(attribute.name().is_none());
}

#[test]
fn overrides_win() {
    let module = load();
    let program = module.resolve::<TypeDef>(2).unwrap();

    // Never read, so the row is never consulted for it
    program.set_name(Some("Renamed".into()));
    assert_eq!(program.full_name(), "App.Renamed");

    program.set_extends(None);
    assert!(program.extends().is_none());

    // Other fields still resolve from the row
    assert_eq!(program.namespace().unwrap(), "App");
    assert!(module.resolve::<TypeDef>(2).unwrap().extends().is_none());
}

#[test]
fn user_strings() {
    let mut builder = sample_module();
    let hello = builder.user_string("Hello, World!");
    let module = ModuleDef::from_metadata(builder.build()).unwrap();

    let value = module.user_string(Token::new(0x7000_0000 | hello)).unwrap();
    assert_eq!(value.to_string_lossy(), "Hello, World!");

    assert!(module.user_string(Token::new(0x0100_0001)).is_none());
    assert!(module.user_string(Token::new(0x7000_FFFF)).is_none());
}

#[test]
fn eager_preload() {
    let module = ModuleDef::from_metadata_with(sample_module().build(), LoadOptions::eager())
        .unwrap();

    // Module(1) is not cached; every other row is
    let rows: u32 = [
        TableId::AssemblyRef,
        TableId::TypeRef,
        TableId::TypeDef,
        TableId::Field,
        TableId::MethodDef,
        TableId::Param,
        TableId::InterfaceImpl,
        TableId::MemberRef,
        TableId::CustomAttribute,
        TableId::Assembly,
        TableId::GenericParam,
    ]
    .iter()
    .map(|table| module.view().tables().row_count(*table))
    .sum();
    assert_eq!(module.caches().len(), rows as usize);
}

#[test]
fn concurrent_first_access() {
    let module = load();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let module = module.clone();
            thread::spawn(move || {
                let program = module.resolve::<TypeDef>(2).unwrap();
                let _ = program.methods();
                program
            })
        })
        .collect();

    let programs: Vec<Arc<TypeDef>> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    for program in &programs[1..] {
        assert!(Arc::ptr_eq(program, &programs[0]));
    }
    assert_eq!(programs[0].methods().len(), 2);
}

#[test]
fn unresolved_references() {
    let mut b = MetadataBuilder::new();
    let name = b.string("Broken");
    b.row(TableId::Module, &[0, name, 0, 0, 0]);
    // Base type TypeRef 9 does not exist, signature blob offset is past the heap
    b.row(
        TableId::TypeDef,
        &[0, name, 0, type_def_or_ref(TableId::TypeRef, 9), 1, 1],
    );
    b.row(TableId::Field, &[0, name, 0x7F]);

    let module = ModuleDef::from_metadata(b.build()).unwrap();
    let broken = module.resolve::<TypeDef>(1).unwrap();

    assert!(broken.extends().is_none());
    assert_eq!(broken.fields().len(), 1);
    assert!(broken.fields()[0].signature().is_none());
    assert!(module.mvid().is_none());
}

#[test]
fn cyclic_nesting() {
    let mut b = MetadataBuilder::new();
    let name = b.string("Cycles.dll");
    b.row(TableId::Module, &[0, name, 0, 0, 0]);

    let ns = b.string("Loop");
    let first = b.string("First");
    let second = b.string("Second");
    let itself = b.string("Itself");

    // A type reference scoped to itself
    b.row(
        TableId::TypeRef,
        &[resolution_scope(TableId::TypeRef, 1), itself, ns],
    );

    // Type 1 nested in itself, types 2 and 3 nested in each other
    b.row(TableId::TypeDef, &[0, itself, ns, 0, 1, 1]);
    b.row(TableId::TypeDef, &[0, first, ns, 0, 1, 1]);
    b.row(TableId::TypeDef, &[0, second, ns, 0, 1, 1]);
    b.row(TableId::NestedClass, &[1, 1]);
    b.row(TableId::NestedClass, &[2, 3]);
    b.row(TableId::NestedClass, &[3, 2]);

    // An exported type implemented by itself
    b.row(TableId::ExportedType, &[0, 0, itself, ns, (1 << 2) | 2]);

    let module = ModuleDef::from_metadata(b.build()).unwrap();

    let type_ref = module.resolve::<TypeRef>(1).unwrap();
    assert_eq!(type_ref.full_name(), "Loop.Itself");
    let debug = format!("{:?}", TypeDefOrRef::TypeRef(type_ref));
    assert!(debug.contains("Loop.Itself"));

    let itself = module.resolve::<TypeDef>(1).unwrap();
    assert_eq!(itself.full_name(), "Loop.Itself");
    assert!(Arc::ptr_eq(&itself.declaring_type().unwrap(), &itself));

    let first = module.resolve::<TypeDef>(2).unwrap();
    assert_eq!(first.full_name(), "Loop.Second/Loop.First");
    let second = module.resolve::<TypeDef>(3).unwrap();
    assert_eq!(second.full_name(), "Loop.First/Loop.Second");

    let exported = module.exported_types();
    assert_eq!(exported.len(), 1);
    assert_eq!(exported[0].full_name(), "Loop.Itself");
}

#[test]
fn pointer_tables() {
    let mut b = MetadataBuilder::new();
    let name = b.string("Ptr");
    b.row(TableId::Module, &[0, name, 0, 0, 0]);

    let first = b.string("First");
    let second = b.string("Second");
    let third = b.string("Third");
    let sig = b.blob(&[0x00, 0x00, 0x01]);
    b.row(TableId::MethodDef, &[0, 0, 0, first, sig, 1]);
    b.row(TableId::MethodDef, &[0, 0, 0, second, sig, 1]);
    b.row(TableId::MethodDef, &[0, 0, 0, third, sig, 1]);

    // The method list indexes MethodPtr, which maps to methods in reverse
    b.row(TableId::MethodPtr, &[3]);
    b.row(TableId::MethodPtr, &[2]);
    b.row(TableId::MethodPtr, &[1]);

    let a = b.string("A");
    let c = b.string("B");
    b.row(TableId::TypeDef, &[0, a, 0, 0, 1, 1]);
    b.row(TableId::TypeDef, &[0, c, 0, 0, 1, 2]);

    let module = ModuleDef::from_metadata(b.build()).unwrap();
    let types = module.types();

    let names = |t: &TypeDef| -> Vec<String> {
        t.methods()
            .iter()
            .map(|m| m.name().unwrap().to_string())
            .collect()
    };
    assert_eq!(names(&types[0]), ["Third"]);
    assert_eq!(names(&types[1]), ["Second", "First"]);

    let first = module.resolve::<MethodDef>(1).unwrap();
    assert_eq!(first.declaring_type().unwrap().name().unwrap(), "B");
}

#[test]
fn stream_names() {
    let mut builder = sample_module();
    builder.raw_stream("#Custom", vec![0; 4]);
    let data = builder.build();

    assert!(matches!(
        ModuleDef::from_metadata(data.clone()),
        Err(Error::Malformed { .. })
    ));

    let module = ModuleDef::from_metadata_with(data, LoadOptions::lenient()).unwrap();
    assert_eq!(module.types().len(), 4);
    assert!(module.view().root().stream("#Custom").is_none());
}

#[test]
fn duplicate_tables_stream() {
    let mut builder = sample_module();
    let tables = builder.tables_stream();
    builder.raw_stream("#-", tables);

    assert!(matches!(
        ModuleDef::from_metadata(builder.build()),
        Err(Error::Malformed { .. })
    ));
}

#[test]
fn schema_version_1_0() {
    let mut b = MetadataBuilder::new().version(1, 0);
    let name = b.string("Old");
    b.row(TableId::Module, &[0, name, 0, 0, 0]);
    b.row(TableId::TypeDef, &[0, name, 0, 0, 1, 1]);

    let module = ModuleDef::from_metadata(b.build()).unwrap();
    assert_eq!(module.view().tables().tables().len(), 0x2A);
    assert!(module.view().tables().table(TableId::GenericParam).is_none());
    assert_eq!(module.types().len(), 1);
    assert!(module.types()[0].generic_params().is_empty());
}
