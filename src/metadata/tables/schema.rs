//! Static table layouts and column width resolution.
//!
//! The column lists of every table are fixed by ECMA-335 II.22, but the byte width of most
//! columns is not: heap indexes grow to 4 bytes when the stream header flags a big heap, and
//! table indexes and coded indexes grow to 4 bytes when the tables they may point into have
//! too many rows. Layouts are therefore built in two steps:
//!
//! 1. [`schema`] returns the logical column lists for a given tables-stream version
//! 2. [`TableInfo::layout`] resolves widths and offsets once all row counts are known
//!    ([`TableSizes`])
//!
//! # Examples
//!
//! ```rust
//! use cilmeta::metadata::tables::{schema, TableId, TableSizes};
//!
//! let mut tables = schema(2, 0);
//! let sizes = TableSizes::new(&[(TableId::TypeDef, 10)], false, false, false);
//!
//! let typedef = &mut tables[TableId::TypeDef as usize];
//! typedef.layout(&sizes)?;
//! // Flags(4) + Name(2) + Namespace(2) + Extends(2) + FieldList(2) + MethodList(2)
//! assert_eq!(typedef.row_size, 14);
//! # Ok::<(), cilmeta::Error>(())
//! ```

use strum::IntoEnumIterator;

use crate::{
    metadata::{
        streams::MDStreamFlags,
        tables::{CodedIndexType, TableId},
    },
    Result,
};

/// Logical size class of a column.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnSize {
    /// One byte
    Byte,
    /// Two-byte signed value
    Int16,
    /// Two-byte unsigned value
    UInt16,
    /// Four-byte signed value
    Int32,
    /// Four-byte unsigned value
    UInt32,
    /// Index into the `#Strings` heap
    Strings,
    /// Index into the `#GUID` heap
    Guid,
    /// Index into the `#Blob` heap
    Blob,
    /// Row index into a single table
    Table(TableId),
    /// Coded index into one of several tables
    Coded(CodedIndexType),
}

/// One column of a table layout.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnInfo {
    /// Column name, for diagnostics only
    pub name: &'static str,
    /// Logical size class
    pub column_size: ColumnSize,
    /// Byte offset within a row, valid after [`TableInfo::layout`]
    pub offset: usize,
    /// Byte width (1, 2 or 4), valid after [`TableInfo::layout`]
    pub size: usize,
}

impl ColumnInfo {
    fn new(name: &'static str, column_size: ColumnSize) -> Self {
        ColumnInfo {
            name,
            column_size,
            offset: 0,
            size: 0,
        }
    }
}

/// Layout of one metadata table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableInfo {
    /// The table described
    pub id: TableId,
    /// Table name, for diagnostics only
    pub name: &'static str,
    /// Columns in on-disk order
    pub columns: Vec<ColumnInfo>,
    /// Total byte size of one row, valid after [`TableInfo::layout`]
    pub row_size: usize,
}

impl TableInfo {
    fn new(id: TableId, name: &'static str, columns: Vec<ColumnInfo>) -> Self {
        TableInfo {
            id,
            name,
            columns,
            row_size: 0,
        }
    }

    /// Resolve every column's width and offset, and the row size.
    ///
    /// Columns are placed left to right; every column starts on an even offset, so a
    /// one-byte column is followed by one byte of padding.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the row size overflows.
    pub fn layout(&mut self, sizes: &TableSizes) -> Result<()> {
        let mut col_offset = 0_usize;
        for column in &mut self.columns {
            let col_size = sizes.column_width(column.column_size);

            column.offset = col_offset;
            column.size = col_size;

            let Some(next) = col_offset.checked_add(col_size + (col_size & 1)) else {
                return Err(malformed_error!("Row size of {} overflows", self.name));
            };
            col_offset = next;
        }

        self.row_size = col_offset;
        Ok(())
    }

    /// Position of a column by name
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column.name == name)
    }
}

/// Row counts of all 64 table slots plus the heap size flags of a tables stream.
///
/// This is everything needed to decide the byte width of any column.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableSizes {
    rows: [u32; 64],
    large_str: bool,
    large_guid: bool,
    large_blob: bool,
}

impl TableSizes {
    /// Build sizes from a list of `(table, row count)` pairs and explicit heap flags
    #[must_use]
    pub fn new(
        row_counts: &[(TableId, u32)],
        large_str: bool,
        large_guid: bool,
        large_blob: bool,
    ) -> Self {
        let mut rows = [0_u32; 64];
        for (table, count) in row_counts {
            rows[*table as usize] = *count;
        }

        TableSizes {
            rows,
            large_str,
            large_guid,
            large_blob,
        }
    }

    /// Build sizes from the raw per-slot row counts and the stream header flags
    #[must_use]
    pub fn from_header(rows: [u32; 64], flags: MDStreamFlags) -> Self {
        TableSizes {
            rows,
            large_str: flags.contains(MDStreamFlags::BIG_STRINGS),
            large_guid: flags.contains(MDStreamFlags::BIG_GUID),
            large_blob: flags.contains(MDStreamFlags::BIG_BLOB),
        }
    }

    /// Row count of a table
    #[must_use]
    pub fn rows(&self, table: TableId) -> u32 {
        self.rows[table as usize]
    }

    /// Byte width of a column of the given size class
    #[must_use]
    pub fn column_width(&self, column_size: ColumnSize) -> usize {
        match column_size {
            ColumnSize::Byte => 1,
            ColumnSize::Int16 | ColumnSize::UInt16 => 2,
            ColumnSize::Int32 | ColumnSize::UInt32 => 4,
            ColumnSize::Strings => Self::index_width(self.large_str),
            ColumnSize::Guid => Self::index_width(self.large_guid),
            ColumnSize::Blob => Self::index_width(self.large_blob),
            ColumnSize::Table(table) => Self::index_width(self.rows(table) > 0xFFFF),
            ColumnSize::Coded(kind) => {
                let max_rows = kind
                    .tables()
                    .map(|table| self.rows(table))
                    .max()
                    .unwrap_or(0);

                Self::index_width((u64::from(max_rows) << kind.bits()) > 0xFFFF)
            }
        }
    }

    fn index_width(is_large: bool) -> usize {
        if is_large {
            4
        } else {
            2
        }
    }
}

/// Number of tables a tables stream of version `major.minor` exposes.
#[must_use]
pub fn table_count(major: u8, minor: u8) -> usize {
    match (major, minor) {
        (0, _) | (1, 0) => TableId::NestedClass as usize + 1,
        (1, 1) => TableId::GenericParam as usize + 1,
        _ => TableId::GenericParamConstraint as usize + 1,
    }
}

/// The logical table layouts of a tables stream of version `major.minor`.
///
/// The returned vector is indexed by table number and holds fresh, unresolved layouts;
/// callers run [`TableInfo::layout`] once all row counts are known.
///
/// * before 1.1 only `Module` up to `NestedClass` exist
/// * 1.1 adds `GenericParam` in its early shape with a trailing `Kind` column
/// * 2.0 and later use the final `GenericParam` shape and add `MethodSpec` and
///   `GenericParamConstraint`
#[must_use]
pub fn schema(major: u8, minor: u8) -> Vec<TableInfo> {
    use ColumnSize::{Blob, Byte, Coded, Guid, Int16, Strings, Table, UInt16, UInt32};
    use CodedIndexType as C;

    let count = table_count(major, minor);
    let generic_param_v11 = (major, minor) == (1, 1);

    let col = ColumnInfo::new;
    TableId::iter()
        .take(count)
        .map(|id| {
            let (name, columns) = match id {
                TableId::Module => ("Module", vec![
                    col("Generation", UInt16),
                    col("Name", Strings),
                    col("Mvid", Guid),
                    col("EncId", Guid),
                    col("EncBaseId", Guid),
                ]),
                TableId::TypeRef => ("TypeRef", vec![
                    col("ResolutionScope", Coded(C::ResolutionScope)),
                    col("Name", Strings),
                    col("Namespace", Strings),
                ]),
                TableId::TypeDef => ("TypeDef", vec![
                    col("Flags", UInt32),
                    col("Name", Strings),
                    col("Namespace", Strings),
                    col("Extends", Coded(C::TypeDefOrRef)),
                    col("FieldList", Table(TableId::Field)),
                    col("MethodList", Table(TableId::MethodDef)),
                ]),
                TableId::FieldPtr => ("FieldPtr", vec![col("Field", Table(TableId::Field))]),
                TableId::Field => ("Field", vec![
                    col("Flags", UInt16),
                    col("Name", Strings),
                    col("Signature", Blob),
                ]),
                TableId::MethodPtr => ("MethodPtr", vec![
                    col("Method", Table(TableId::MethodDef)),
                ]),
                TableId::MethodDef => ("Method", vec![
                    col("RVA", UInt32),
                    col("ImplFlags", UInt16),
                    col("Flags", UInt16),
                    col("Name", Strings),
                    col("Signature", Blob),
                    col("ParamList", Table(TableId::Param)),
                ]),
                TableId::ParamPtr => ("ParamPtr", vec![col("Param", Table(TableId::Param))]),
                TableId::Param => ("Param", vec![
                    col("Flags", UInt16),
                    col("Sequence", UInt16),
                    col("Name", Strings),
                ]),
                TableId::InterfaceImpl => ("InterfaceImpl", vec![
                    col("Class", Table(TableId::TypeDef)),
                    col("Interface", Coded(C::TypeDefOrRef)),
                ]),
                TableId::MemberRef => ("MemberRef", vec![
                    col("Class", Coded(C::MemberRefParent)),
                    col("Name", Strings),
                    col("Signature", Blob),
                ]),
                TableId::Constant => ("Constant", vec![
                    col("Type", Byte),
                    col("Parent", Coded(C::HasConstant)),
                    col("Value", Blob),
                ]),
                TableId::CustomAttribute => ("CustomAttribute", vec![
                    col("Parent", Coded(C::HasCustomAttribute)),
                    col("Type", Coded(C::CustomAttributeType)),
                    col("Value", Blob),
                ]),
                TableId::FieldMarshal => ("FieldMarshal", vec![
                    col("Parent", Coded(C::HasFieldMarshal)),
                    col("NativeType", Blob),
                ]),
                TableId::DeclSecurity => ("DeclSecurity", vec![
                    col("Action", Int16),
                    col("Parent", Coded(C::HasDeclSecurity)),
                    col("PermissionSet", Blob),
                ]),
                TableId::ClassLayout => ("ClassLayout", vec![
                    col("PackingSize", UInt16),
                    col("ClassSize", UInt32),
                    col("Parent", Table(TableId::TypeDef)),
                ]),
                TableId::FieldLayout => ("FieldLayout", vec![
                    col("OffSet", UInt32),
                    col("Field", Table(TableId::Field)),
                ]),
                TableId::StandAloneSig => ("StandAloneSig", vec![col("Signature", Blob)]),
                TableId::EventMap => ("EventMap", vec![
                    col("Parent", Table(TableId::TypeDef)),
                    col("EventList", Table(TableId::Event)),
                ]),
                TableId::EventPtr => ("EventPtr", vec![col("Event", Table(TableId::Event))]),
                TableId::Event => ("Event", vec![
                    col("EventFlags", UInt16),
                    col("Name", Strings),
                    col("EventType", Coded(C::TypeDefOrRef)),
                ]),
                TableId::PropertyMap => ("PropertyMap", vec![
                    col("Parent", Table(TableId::TypeDef)),
                    col("PropertyList", Table(TableId::Property)),
                ]),
                TableId::PropertyPtr => ("PropertyPtr", vec![
                    col("Property", Table(TableId::Property)),
                ]),
                TableId::Property => ("Property", vec![
                    col("PropFlags", UInt16),
                    col("Name", Strings),
                    col("Type", Blob),
                ]),
                TableId::MethodSemantics => ("MethodSemantics", vec![
                    col("Semantic", UInt16),
                    col("Method", Table(TableId::MethodDef)),
                    col("Association", Coded(C::HasSemantics)),
                ]),
                TableId::MethodImpl => ("MethodImpl", vec![
                    col("Class", Table(TableId::TypeDef)),
                    col("MethodBody", Coded(C::MethodDefOrRef)),
                    col("MethodDeclaration", Coded(C::MethodDefOrRef)),
                ]),
                TableId::ModuleRef => ("ModuleRef", vec![col("Name", Strings)]),
                TableId::TypeSpec => ("TypeSpec", vec![col("Signature", Blob)]),
                TableId::ImplMap => ("ImplMap", vec![
                    col("MappingFlags", UInt16),
                    col("MemberForwarded", Coded(C::MemberForwarded)),
                    col("ImportName", Strings),
                    col("ImportScope", Table(TableId::ModuleRef)),
                ]),
                TableId::FieldRVA => ("FieldRVA", vec![
                    col("RVA", UInt32),
                    col("Field", Table(TableId::Field)),
                ]),
                TableId::EncLog => ("ENCLog", vec![
                    col("Token", UInt32),
                    col("FuncCode", UInt32),
                ]),
                TableId::EncMap => ("ENCMap", vec![col("Token", UInt32)]),
                TableId::Assembly => ("Assembly", vec![
                    col("HashAlgId", UInt32),
                    col("MajorVersion", UInt16),
                    col("MinorVersion", UInt16),
                    col("BuildNumber", UInt16),
                    col("RevisionNumber", UInt16),
                    col("Flags", UInt32),
                    col("PublicKey", Blob),
                    col("Name", Strings),
                    col("Locale", Strings),
                ]),
                TableId::AssemblyProcessor => ("AssemblyProcessor", vec![
                    col("Processor", UInt32),
                ]),
                TableId::AssemblyOS => ("AssemblyOS", vec![
                    col("OSPlatformId", UInt32),
                    col("OSMajorVersion", UInt32),
                    col("OSMinorVersion", UInt32),
                ]),
                TableId::AssemblyRef => ("AssemblyRef", vec![
                    col("MajorVersion", UInt16),
                    col("MinorVersion", UInt16),
                    col("BuildNumber", UInt16),
                    col("RevisionNumber", UInt16),
                    col("Flags", UInt32),
                    col("PublicKeyOrToken", Blob),
                    col("Name", Strings),
                    col("Locale", Strings),
                    col("HashValue", Blob),
                ]),
                TableId::AssemblyRefProcessor => ("AssemblyRefProcessor", vec![
                    col("Processor", UInt32),
                    col("AssemblyRef", Table(TableId::AssemblyRef)),
                ]),
                TableId::AssemblyRefOS => ("AssemblyRefOS", vec![
                    col("OSPlatformId", UInt32),
                    col("OSMajorVersion", UInt32),
                    col("OSMinorVersion", UInt32),
                    col("AssemblyRef", Table(TableId::AssemblyRef)),
                ]),
                TableId::File => ("File", vec![
                    col("Flags", UInt32),
                    col("Name", Strings),
                    col("HashValue", Blob),
                ]),
                TableId::ExportedType => ("ExportedType", vec![
                    col("Flags", UInt32),
                    col("TypeDefId", UInt32),
                    col("TypeName", Strings),
                    col("TypeNamespace", Strings),
                    col("Implementation", Coded(C::Implementation)),
                ]),
                TableId::ManifestResource => ("ManifestResource", vec![
                    col("Offset", UInt32),
                    col("Flags", UInt32),
                    col("Name", Strings),
                    col("Implementation", Coded(C::Implementation)),
                ]),
                TableId::NestedClass => ("NestedClass", vec![
                    col("NestedClass", Table(TableId::TypeDef)),
                    col("EnclosingClass", Table(TableId::TypeDef)),
                ]),
                TableId::GenericParam if generic_param_v11 => ("GenericParam", vec![
                    col("Number", UInt16),
                    col("Flags", UInt16),
                    col("Owner", Coded(C::TypeOrMethodDef)),
                    col("Name", Strings),
                    col("Kind", Coded(C::TypeDefOrRef)),
                ]),
                TableId::GenericParam => ("GenericParam", vec![
                    col("Number", UInt16),
                    col("Flags", UInt16),
                    col("Owner", Coded(C::TypeOrMethodDef)),
                    col("Name", Strings),
                ]),
                TableId::MethodSpec => ("MethodSpec", vec![
                    col("Method", Coded(C::MethodDefOrRef)),
                    col("Instantiation", Blob),
                ]),
                TableId::GenericParamConstraint => ("GenericParamConstraint", vec![
                    col("Owner", Table(TableId::GenericParam)),
                    col("Constraint", Coded(C::TypeDefOrRef)),
                ]),
            };

            TableInfo::new(id, name, columns)
        })
        .collect()
}
