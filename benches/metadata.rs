//! Benchmarks for metadata loading.
//!
//! Measures the stages a consumer pays for:
//! - Tables stream header parsing and layout derivation
//! - Raw row iteration, sequential and parallel
//! - Module loading with and without eager entity resolution
//! - Signature decoding through a loaded module

extern crate cilmeta;

#[path = "../tests/common/mod.rs"]
mod common;

use cilmeta::prelude::*;
use cilmeta::metadata::{streams::TablesStream, tables::MethodDefRaw};
use common::{resolution_scope, type_def_or_ref, MetadataBuilder};
use criterion::{criterion_group, criterion_main, Criterion};
use rayon::iter::ParallelIterator;
use std::hint::black_box;

const TYPE_COUNT: u32 = 500;
const METHODS_PER_TYPE: u32 = 20;

/// A module with `TYPE_COUNT` types of `METHODS_PER_TYPE` methods each, plus the blob offsets of
/// a few signatures
fn large_module() -> (MetadataBuilder, Vec<u32>) {
    let mut b = MetadataBuilder::new();
    let name = b.string("Bench.dll");
    b.row(TableId::Module, &[0, name, 0, 0, 0]);

    let mscorlib = b.string("mscorlib");
    b.row(TableId::AssemblyRef, &[4, 0, 0, 0, 0, 0, mscorlib, 0, 0]);
    let system = b.string("System");
    let object = b.string("Object");
    b.row(
        TableId::TypeRef,
        &[resolution_scope(TableId::AssemblyRef, 1), object, system],
    );

    let sigs = vec![
        // int32 (int32, string, bool)
        b.blob(&[0x00, 0x03, 0x08, 0x08, 0x0E, 0x02]),
        // instance !!0 <T>(class Object[], !!0&)
        b.blob(&[0x30, 0x01, 0x02, 0x1E, 0x00, 0x1D, 0x12, 0x05, 0x10, 0x1E, 0x00]),
        // locals: int32, pinned uint8&, object[], string
        b.blob(&[0x07, 0x04, 0x08, 0x45, 0x10, 0x05, 0x1D, 0x1C, 0x0E]),
    ];

    let namespace = b.string("Bench");
    let method_name = b.string("Method");
    let object_ref = type_def_or_ref(TableId::TypeRef, 1);
    for index in 0..TYPE_COUNT {
        let type_name = b.string(&format!("Type{index}"));
        let first_method = index * METHODS_PER_TYPE + 1;
        b.row(
            TableId::TypeDef,
            &[0x0010_0001, type_name, namespace, object_ref, 1, first_method],
        );
        for method in 0..METHODS_PER_TYPE {
            b.row(
                TableId::MethodDef,
                &[0x2050 + method, 0, 0x0086, method_name, sigs[0], 1],
            );
        }
    }

    (b, sigs)
}

fn bench_tables_stream(c: &mut Criterion) {
    let (builder, _) = large_module();
    let data = builder.tables_stream();

    c.bench_function("tables_stream_parse", |b| {
        b.iter(|| {
            let tables = TablesStream::from(black_box(&data)).unwrap();
            black_box(tables.row_count(TableId::MethodDef))
        });
    });

    let tables = TablesStream::from(&data).unwrap();
    let methods = tables.table(TableId::MethodDef).unwrap();

    c.bench_function("tables_iter_methods", |b| {
        b.iter(|| {
            let rva_sum: u64 = methods.iter::<MethodDefRaw>().map(|row| u64::from(row.rva)).sum();
            black_box(rva_sum)
        });
    });

    c.bench_function("tables_par_iter_methods", |b| {
        b.iter(|| {
            let rva_sum: u64 = methods
                .par_iter::<MethodDefRaw>()
                .map(|row| u64::from(row.rva))
                .sum();
            black_box(rva_sum)
        });
    });
}

fn bench_module_load(c: &mut Criterion) {
    let (builder, _) = large_module();
    let data = builder.build();

    c.bench_function("module_load_lazy", |b| {
        b.iter(|| {
            let module = ModuleDef::from_metadata(black_box(data.clone())).unwrap();
            black_box(module.types().len())
        });
    });

    let eager = LoadOptions {
        preload: true,
        ..LoadOptions::default()
    };
    c.bench_function("module_load_preload", |b| {
        b.iter(|| {
            let module = ModuleDef::from_metadata_with(black_box(data.clone()), eager).unwrap();
            black_box(module.caches().len())
        });
    });
}

fn bench_signatures(c: &mut Criterion) {
    let (builder, sigs) = large_module();
    let module = ModuleDef::from_metadata(builder.build()).unwrap();

    c.bench_function("sig_method_primitives", |b| {
        b.iter(|| black_box(module.read_signature(black_box(sigs[0])).unwrap()));
    });

    c.bench_function("sig_method_generic_class", |b| {
        b.iter(|| black_box(module.read_signature(black_box(sigs[1])).unwrap()));
    });

    c.bench_function("sig_locals", |b| {
        b.iter(|| black_box(module.read_signature(black_box(sigs[2])).unwrap()));
    });

    let generic = module.read_signature(sigs[1]).unwrap();
    c.bench_function("sig_write_method", |b| {
        b.iter(|| black_box(SignatureWriter::write(black_box(&generic)).unwrap()));
    });
}

criterion_group!(
    benches,
    bench_tables_stream,
    bench_module_load,
    bench_signatures
);
criterion_main!(benches);
