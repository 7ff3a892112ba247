//! A small metadata image writer for integration tests.
//!
//! Rows are given as plain column values in schema order; the writer derives the column widths
//! from the crate's own schema so the produced bytes match what the reader expects.

#![allow(dead_code)]

use std::collections::BTreeMap;

use cilmeta::metadata::tables::{schema, TableId, TableSizes};

pub struct MetadataBuilder {
    major: u8,
    minor: u8,
    strings: Vec<u8>,
    user_strings: Vec<u8>,
    blobs: Vec<u8>,
    guids: Vec<u8>,
    rows: BTreeMap<TableId, Vec<Vec<u32>>>,
    extra_streams: Vec<(String, Vec<u8>)>,
}

impl Default for MetadataBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MetadataBuilder {
    pub fn new() -> Self {
        MetadataBuilder {
            major: 2,
            minor: 0,
            strings: vec![0],
            user_strings: vec![0],
            blobs: vec![0],
            guids: Vec::new(),
            rows: BTreeMap::new(),
            extra_streams: Vec::new(),
        }
    }

    /// Use a tables stream of another schema version
    pub fn version(mut self, major: u8, minor: u8) -> Self {
        self.major = major;
        self.minor = minor;
        self
    }

    pub fn string(&mut self, value: &str) -> u32 {
        let offset = self.strings.len() as u32;
        self.strings.extend_from_slice(value.as_bytes());
        self.strings.push(0);
        offset
    }

    pub fn user_string(&mut self, value: &str) -> u32 {
        let offset = self.user_strings.len() as u32;
        let units: Vec<u16> = value.encode_utf16().collect();
        compressed_uint(units.len() as u32 * 2 + 1, &mut self.user_strings);
        for unit in units {
            self.user_strings.extend_from_slice(&unit.to_le_bytes());
        }
        self.user_strings.push(0);
        offset
    }

    pub fn blob(&mut self, data: &[u8]) -> u32 {
        let offset = self.blobs.len() as u32;
        compressed_uint(data.len() as u32, &mut self.blobs);
        self.blobs.extend_from_slice(data);
        offset
    }

    /// Append a GUID and return its 1-based index
    pub fn guid(&mut self, value: [u8; 16]) -> u32 {
        self.guids.extend_from_slice(&value);
        (self.guids.len() / 16) as u32
    }

    /// Append a row and return its row id
    pub fn row(&mut self, table: TableId, columns: &[u32]) -> u32 {
        let rows = self.rows.entry(table).or_default();
        rows.push(columns.to_vec());
        rows.len() as u32
    }

    /// Add a stream with an arbitrary name after the regular ones
    pub fn raw_stream(&mut self, name: &str, data: Vec<u8>) {
        self.extra_streams.push((name.to_string(), data));
    }

    pub fn tables_stream(&self) -> Vec<u8> {
        let counts: Vec<(TableId, u32)> = self
            .rows
            .iter()
            .map(|(table, rows)| (*table, rows.len() as u32))
            .collect();
        let sizes = TableSizes::new(&counts, false, false, false);

        let mut valid = 0_u64;
        for (table, _) in &counts {
            valid |= 1 << (*table as u64);
        }

        let mut data = Vec::new();
        data.extend_from_slice(&0_u32.to_le_bytes());
        data.push(self.major);
        data.push(self.minor);
        data.push(0);
        data.push(1);
        data.extend_from_slice(&valid.to_le_bytes());
        data.extend_from_slice(&0_u64.to_le_bytes());
        for (_, count) in &counts {
            data.extend_from_slice(&count.to_le_bytes());
        }

        for mut info in schema(self.major, self.minor) {
            info.layout(&sizes).expect("layout");
            let Some(rows) = self.rows.get(&info.id) else {
                continue;
            };

            for row in rows {
                assert_eq!(row.len(), info.columns.len(), "column count of {}", info.name);

                let mut bytes = vec![0_u8; info.row_size];
                for (column, value) in info.columns.iter().zip(row) {
                    let le = value.to_le_bytes();
                    bytes[column.offset..column.offset + column.size]
                        .copy_from_slice(&le[..column.size]);
                }
                data.extend_from_slice(&bytes);
            }
        }

        data
    }

    /// The complete metadata, starting with the `BSJB` root
    pub fn build(&self) -> Vec<u8> {
        let mut streams: Vec<(String, Vec<u8>)> = vec![
            ("#~".to_string(), self.tables_stream()),
            ("#Strings".to_string(), self.strings.clone()),
            ("#US".to_string(), self.user_strings.clone()),
            ("#Blob".to_string(), self.blobs.clone()),
        ];
        if !self.guids.is_empty() {
            streams.push(("#GUID".to_string(), self.guids.clone()));
        }
        streams.extend(self.extra_streams.iter().cloned());

        for (_, data) in &mut streams {
            while data.len() % 4 != 0 {
                data.push(0);
            }
        }

        let version = b"v4.0.30319\0\0";
        let headers_len: usize = streams
            .iter()
            .map(|(name, _)| 8 + ((name.len() + 1 + 3) & !3))
            .sum();
        let mut offset = (16 + version.len() + 4 + headers_len) as u32;

        let mut root = Vec::new();
        root.extend_from_slice(&0x424A_5342_u32.to_le_bytes());
        root.extend_from_slice(&1_u16.to_le_bytes());
        root.extend_from_slice(&1_u16.to_le_bytes());
        root.extend_from_slice(&0_u32.to_le_bytes());
        root.extend_from_slice(&(version.len() as u32).to_le_bytes());
        root.extend_from_slice(version);
        root.extend_from_slice(&0_u16.to_le_bytes());
        root.extend_from_slice(&(streams.len() as u16).to_le_bytes());

        for (name, data) in &streams {
            root.extend_from_slice(&offset.to_le_bytes());
            root.extend_from_slice(&(data.len() as u32).to_le_bytes());
            root.extend_from_slice(name.as_bytes());
            root.push(0);
            while root.len() % 4 != 0 {
                root.push(0);
            }
            offset += data.len() as u32;
        }

        for (_, data) in &streams {
            root.extend_from_slice(data);
        }

        root
    }
}

pub fn compressed_uint(value: u32, out: &mut Vec<u8>) {
    if value < 0x80 {
        out.push(value as u8);
    } else if value < 0x4000 {
        out.extend_from_slice(&(0x8000 | value as u16).to_be_bytes());
    } else {
        out.extend_from_slice(&(0xC000_0000 | value).to_be_bytes());
    }
}

/// `TypeDefOrRef` coded index value
pub fn type_def_or_ref(table: TableId, rid: u32) -> u32 {
    let tag = match table {
        TableId::TypeDef => 0,
        TableId::TypeRef => 1,
        TableId::TypeSpec => 2,
        _ => panic!("not a TypeDefOrRef table"),
    };
    rid << 2 | tag
}

/// `ResolutionScope` coded index value
pub fn resolution_scope(table: TableId, rid: u32) -> u32 {
    let tag = match table {
        TableId::Module => 0,
        TableId::ModuleRef => 1,
        TableId::AssemblyRef => 2,
        TableId::TypeRef => 3,
        _ => panic!("not a ResolutionScope table"),
    };
    rid << 2 | tag
}

/// A module with a small but complete type graph:
///
/// * `AssemblyRef` 1 `mscorlib` 4.0.0.0 with the ECMA token
/// * `TypeRef` 1 `System.Object`, 2 `System.Int32`, 3 `System.ObsoleteAttribute`
/// * `TypeDef` 1 `<Module>`, 2 `App.Program` (2 fields, 2 methods), 3 `App.Program/Inner`
///   (1 method), 4 `App.IRunner` (interface)
/// * `Param` rows for `Program.Add(int, int)`
/// * a custom attribute on `Program`, an `InterfaceImpl`, a generic parameter on `Inner`
/// * an `Assembly` row named `App` 1.2.3.4
pub fn sample_module() -> MetadataBuilder {
    let mut b = MetadataBuilder::new();

    let mvid = b.guid([
        0x6b, 0x2a, 0x4b, 0x86, 0x1d, 0x6f, 0x4f, 0x4a, 0x9e, 0x3d, 0x8a, 0x6e, 0x35, 0x8c, 0x1f,
        0x02,
    ]);
    let module_name = b.string("App.dll");
    b.row(TableId::Module, &[0, module_name, mvid, 0, 0]);

    let mscorlib = b.string("mscorlib");
    let ecma_token = b.blob(&[0xb7, 0x7a, 0x5c, 0x56, 0x19, 0x34, 0xe0, 0x89]);
    b.row(TableId::AssemblyRef, &[4, 0, 0, 0, 0, ecma_token, mscorlib, 0, 0]);

    let system = b.string("System");
    let object = b.string("Object");
    let int32 = b.string("Int32");
    let obsolete = b.string("ObsoleteAttribute");
    let scope = resolution_scope(TableId::AssemblyRef, 1);
    b.row(TableId::TypeRef, &[scope, object, system]);
    b.row(TableId::TypeRef, &[scope, int32, system]);
    b.row(TableId::TypeRef, &[scope, obsolete, system]);

    let app = b.string("App");
    let module_type = b.string("<Module>");
    let program = b.string("Program");
    let inner = b.string("Inner");
    let runner = b.string("IRunner");
    let object_ref = type_def_or_ref(TableId::TypeRef, 1);
    b.row(TableId::TypeDef, &[0, module_type, 0, 0, 1, 1]);
    b.row(TableId::TypeDef, &[0x0010_0001, program, app, object_ref, 1, 1]);
    b.row(TableId::TypeDef, &[0x0010_0002, inner, 0, object_ref, 3, 3]);
    b.row(TableId::TypeDef, &[0x0000_00A1, runner, app, 0, 3, 4]);

    // int32 field, string field
    let count = b.string("count");
    let label = b.string("label");
    let int_field = b.blob(&[0x06, 0x08]);
    let string_field = b.blob(&[0x06, 0x0E]);
    b.row(TableId::Field, &[0x0001, count, int_field]);
    b.row(TableId::Field, &[0x0011, label, string_field]);

    // static int32 Add(int32, int32); instance void .ctor(); void Run<T>(!!0)
    let add = b.string("Add");
    let ctor = b.string(".ctor");
    let run = b.string("Run");
    let add_sig = b.blob(&[0x00, 0x02, 0x08, 0x08, 0x08]);
    let ctor_sig = b.blob(&[0x20, 0x00, 0x01]);
    let run_sig = b.blob(&[0x10, 0x01, 0x01, 0x01, 0x1E, 0x00]);
    b.row(TableId::MethodDef, &[0x2050, 0, 0x0016, add, add_sig, 1]);
    b.row(TableId::MethodDef, &[0x2060, 0, 0x1886, ctor, ctor_sig, 3]);
    b.row(TableId::MethodDef, &[0x2070, 0, 0x0086, run, run_sig, 3]);

    let a = b.string("a");
    let bb = b.string("b");
    b.row(TableId::Param, &[0, 1, a]);
    b.row(TableId::Param, &[0, 2, bb]);

    // Program : IRunner
    b.row(TableId::InterfaceImpl, &[2, type_def_or_ref(TableId::TypeDef, 4)]);

    // instance void ObsoleteAttribute::.ctor()
    let member_parent = 3 << 3 | 1;
    b.row(TableId::MemberRef, &[member_parent, ctor, ctor_sig]);

    // [Obsolete] on Program: HasCustomAttribute TypeDef tag 3, CustomAttributeType MemberRef tag 3
    let attribute_value = b.blob(&[0x01, 0x00, 0x00, 0x00]);
    b.row(TableId::CustomAttribute, &[2 << 5 | 3, 1 << 3 | 3, attribute_value]);

    b.row(TableId::NestedClass, &[3, 2]);

    let version = b.string("App");
    b.row(TableId::Assembly, &[0x8004, 1, 2, 3, 4, 0, 0, version, 0]);

    let t = b.string("T");
    // TypeOrMethodDef TypeDef tag 0
    b.row(TableId::GenericParam, &[0, 0, 3 << 1, t]);

    b
}
