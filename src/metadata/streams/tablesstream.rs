//! The `#~` / `#-` tables stream.
//!
//! The stream starts with a small header describing which tables are present, followed by one
//! row count per present table and then by the rows of every table back to back, in table id
//! order. Loading happens in three steps:
//!
//! 1. read the header and all row counts
//! 2. derive the layout of every table of the stream's schema version from those counts and the
//!    heap size flags
//! 3. slice the rows of each table out of the stream, with checked arithmetic throughout
//!
//! # Reference
//! - [ECMA-335 II.24.2.6](https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf)

use bitflags::bitflags;
use tracing::debug;

use crate::{
    file::parser::Parser,
    metadata::tables::{schema, table_count, MetadataTable, RowReadable, TableId, TableSizes},
    Error::OutOfBounds,
    Result,
};

bitflags! {
    /// The `HeapSizes` byte of the tables stream header
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct MDStreamFlags: u8 {
        /// `#Strings` indexes are 4 bytes wide
        const BIG_STRINGS = 0x01;
        /// `#GUID` indexes are 4 bytes wide
        const BIG_GUID = 0x02;
        /// `#Blob` indexes are 4 bytes wide
        const BIG_BLOB = 0x04;
        /// Tables may contain padding
        const PADDING = 0x08;
        /// The stream only holds an edit-and-continue delta
        const DELTA_ONLY = 0x20;
        /// One extra `u32` follows the row counts
        const EXTRA_DATA = 0x40;
        /// Rows may be marked as deleted
        const HAS_DELETE = 0x80;
    }
}

/// A parsed tables stream with one [`MetadataTable`] per table of its schema version.
///
/// # Examples
///
/// ```rust,no_run
/// use cilmeta::metadata::{streams::TablesStream, tables::{TableId, TypeRefRaw}};
///
/// # fn example(stream_data: &[u8]) -> cilmeta::Result<()> {
/// let tables = TablesStream::from(stream_data)?;
/// println!("Tables stream v{}.{}", tables.major_version, tables.minor_version);
///
/// if let Some(type_ref) = tables.get::<TypeRefRaw>(1) {
///     println!("First TypeRef: name at 0x{:x}", type_ref.type_name);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct TablesStream<'a> {
    /// Reserved, shall be zero
    pub reserved: u32,
    /// Major version of the table schema
    pub major_version: u8,
    /// Minor version of the table schema
    pub minor_version: u8,
    /// Heap size and stream flags
    pub flags: MDStreamFlags,
    /// Log2 of the largest rid, informational only
    pub log2_rid: u8,
    /// Bit vector of present tables
    pub valid: u64,
    /// Bit vector of sorted tables
    pub sorted: u64,
    /// The extra `u32` present when [`MDStreamFlags::EXTRA_DATA`] is set
    pub extra_data: Option<u32>,
    sizes: TableSizes,
    tables: Vec<MetadataTable<'a>>,
}

impl<'a> TablesStream<'a> {
    /// Parse a tables stream
    ///
    /// ## Arguments
    /// * 'data' - All bytes of the `#~` or `#-` stream
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the header is truncated and
    /// [`crate::Error::Malformed`] if the rows of a table leave the stream or the layout
    /// arithmetic overflows.
    pub fn from(data: &'a [u8]) -> Result<TablesStream<'a>> {
        if data.len() < 24 {
            return Err(OutOfBounds);
        }

        let mut parser = Parser::new(data);
        let reserved = parser.read_le::<u32>()?;
        let major_version = parser.read_le::<u8>()?;
        let minor_version = parser.read_le::<u8>()?;
        let flags = MDStreamFlags::from_bits_retain(parser.read_le::<u8>()?);
        let log2_rid = parser.read_le::<u8>()?;
        let valid = parser.read_le::<u64>()?;
        let sorted = parser.read_le::<u64>()?;

        let mut rows = [0_u32; 64];
        for (index, row_count) in rows.iter_mut().enumerate() {
            if valid & (1 << index) != 0 {
                *row_count = parser.read_le::<u32>()?;
            }
        }

        let extra_data = if flags.contains(MDStreamFlags::EXTRA_DATA) {
            Some(parser.read_le::<u32>()?)
        } else {
            None
        };

        let sizes = TableSizes::from_header(rows, flags);

        let mut tables = Vec::with_capacity(table_count(major_version, minor_version));
        let mut table_offset = parser.pos();
        for mut info in schema(major_version, minor_version) {
            info.layout(&sizes)?;

            let row_count = sizes.rows(info.id);
            let Some(table_len) = info.row_size.checked_mul(row_count as usize) else {
                return Err(malformed_error!("Size of table {} overflows", info.name));
            };
            let Some(table_end) = table_offset.checked_add(table_len) else {
                return Err(malformed_error!("Offset of table {} overflows", info.name));
            };
            let Some(table_data) = data.get(table_offset..table_end) else {
                return Err(malformed_error!(
                    "Table {} ends at 0x{:x}, past the end of the tables stream (0x{:x})",
                    info.name,
                    table_end,
                    data.len()
                ));
            };

            if row_count > 0 {
                debug!(
                    table = info.name,
                    rows = row_count,
                    row_size = info.row_size,
                    offset = table_offset,
                    "table"
                );
            }

            tables.push(MetadataTable::new(info, row_count, table_data)?);
            table_offset = table_end;
        }

        let ignored = valid >> tables.len();
        if ignored != 0 {
            debug!(
                mask = format_args!("0x{:x}", ignored << tables.len()),
                "tables beyond schema v{}.{} are not materialized", major_version, minor_version
            );
        }

        Ok(TablesStream {
            reserved,
            major_version,
            minor_version,
            flags,
            log2_rid,
            valid,
            sorted,
            extra_data,
            sizes,
            tables,
        })
    }

    /// The table `id`, if the schema version of this stream has it
    #[must_use]
    pub fn table(&self, id: TableId) -> Option<&MetadataTable<'a>> {
        self.tables.get(id as usize)
    }

    /// All tables of this stream's schema version, indexed by table id
    #[must_use]
    pub fn tables(&self) -> &[MetadataTable<'a>] {
        &self.tables
    }

    /// Row count of the table `id`; 0 for absent tables
    #[must_use]
    pub fn row_count(&self, id: TableId) -> u32 {
        self.table(id).map_or(0, MetadataTable::row_count)
    }

    /// Read one raw row
    #[must_use]
    pub fn get<T: RowReadable>(&self, rid: u32) -> Option<T> {
        self.table(T::TABLE)?.get(rid)
    }

    /// Row counts and heap flags the layouts were derived from
    #[must_use]
    pub fn sizes(&self) -> &TableSizes {
        &self.sizes
    }

    /// Number of tables marked present in the header
    #[must_use]
    pub fn table_count(&self) -> u32 {
        self.valid.count_ones()
    }

    /// `true` if the header marks the table `id` as present
    #[must_use]
    pub fn has_table(&self, id: TableId) -> bool {
        self.valid & (1 << id as u64) != 0
    }

    /// `true` if the header marks the table `id` as sorted
    #[must_use]
    pub fn is_sorted(&self, id: TableId) -> bool {
        self.sorted & (1 << id as u64) != 0
    }
}
