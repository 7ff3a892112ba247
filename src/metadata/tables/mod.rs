//! Metadata tables: identifiers, coded indexes, layouts and raw rows.
//!
//! This module holds everything needed to turn the bytes of a tables stream into rows:
//!
//! - [`TableId`] names every table of ECMA-335 II.22
//! - [`CodedIndexType`] describes the polymorphic references between tables
//! - [`schema`] and [`TableSizes`] derive the byte layout of every table for a given
//!   tables stream version and set of row counts
//! - [`MetadataTable`] gives typed, bounds-checked access to the rows of one table, decoded
//!   into the `*Raw` structs on demand
//!
//! # Examples
//!
//! ```rust,no_run
//! use cilmeta::metadata::{
//!     tables::{TableId, TypeDefRaw},
//!     view::MetadataView,
//! };
//! use std::path::Path;
//!
//! let view = MetadataView::from_file(Path::new("tests/samples/WindowsBase.dll"))?;
//! if let Some(typedefs) = view.tables().table(TableId::TypeDef) {
//!     for row in typedefs.iter::<TypeDefRaw>() {
//!         println!("{} extends 0x{:x}", row.token, row.extends);
//!     }
//! }
//! # Ok::<(), cilmeta::Error>(())
//! ```

mod codedindex;
mod rows;
mod schema;
mod table;
mod tableid;

pub use codedindex::{coded_tag, CodedIndexType};
pub use rows::*;
pub use schema::{schema, table_count, ColumnInfo, ColumnSize, TableInfo, TableSizes};
pub use table::{MetadataTable, RowReadable, TableIterator};
pub use tableid::TableId;
