//! Typed access to the rows of one metadata table.
//!
//! A [`MetadataTable`] owns the resolved [`TableInfo`] layout of a table and borrows the
//! `row_size * row_count` bytes of the tables stream that hold its rows. Nothing is decoded up
//! front; rows are widened into their raw structs on every access, either by rid or through the
//! sequential and parallel iterators.

use rayon::iter::{IntoParallelIterator, ParallelIterator};

use crate::{
    file::io::read_le_at,
    metadata::tables::{TableId, TableInfo},
    Error::OutOfBounds,
    Result,
};

/// A raw row struct that can be built from the widened column values of its table.
pub trait RowReadable: Sized + Send {
    /// The table rows of this type live in
    const TABLE: TableId;

    /// Build a row from its rid, its byte offset within the table and its column values
    ///
    /// `columns` holds one value per column of the active schema; columns the schema
    /// version does not have are absent and read as 0.
    fn from_columns(rid: u32, offset: usize, columns: &[u32]) -> Self;
}

/// One table of a tables stream.
#[derive(Clone, Debug)]
pub struct MetadataTable<'a> {
    info: TableInfo,
    row_count: u32,
    data: &'a [u8],
}

impl<'a> MetadataTable<'a> {
    /// Wrap the rows of a table
    ///
    /// ## Arguments
    /// * 'info'      - The resolved layout of this table
    /// * 'row_count' - Number of rows
    /// * 'data'      - Exactly the bytes of all rows
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if `data` does not hold exactly `row_count` rows.
    pub fn new(info: TableInfo, row_count: u32, data: &'a [u8]) -> Result<Self> {
        let expected = (row_count as usize).checked_mul(info.row_size);
        if expected != Some(data.len()) {
            return Err(malformed_error!(
                "Table {} holds {} bytes, {} rows of {} bytes expected",
                info.name,
                data.len(),
                row_count,
                info.row_size
            ));
        }

        Ok(MetadataTable {
            info,
            row_count,
            data,
        })
    }

    /// The table this is
    #[must_use]
    pub fn id(&self) -> TableId {
        self.info.id
    }

    /// The resolved layout
    #[must_use]
    pub fn info(&self) -> &TableInfo {
        &self.info
    }

    /// Number of rows
    #[must_use]
    pub fn row_count(&self) -> u32 {
        self.row_count
    }

    /// `true` if the table has no rows
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }

    /// Byte size of one row
    #[must_use]
    pub fn row_size(&self) -> usize {
        self.info.row_size
    }

    /// The raw bytes of all rows
    #[must_use]
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Read a single column of a row
    ///
    /// Returns `None` if `rid` is not a row of this table or `index` is not a column.
    #[must_use]
    pub fn column(&self, rid: u32, index: usize) -> Option<u32> {
        let row_offset = self.row_offset(rid)?;
        let column = self.info.columns.get(index)?;

        read_column(self.data, row_offset + column.offset, column.size).ok()
    }

    /// Read a single column of a row by the column's name
    #[must_use]
    pub fn column_by_name(&self, rid: u32, name: &str) -> Option<u32> {
        self.column(rid, self.info.column_index(name)?)
    }

    /// Read a row as its raw struct
    ///
    /// Returns `None` if `rid` is 0 or past the last row, or `T` belongs to another table.
    #[must_use]
    pub fn get<T: RowReadable>(&self, rid: u32) -> Option<T> {
        self.row(rid).ok()
    }

    /// Read a row as its raw struct, reporting why that failed
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] for a rid that is not a row of this table and
    /// [`crate::Error::Malformed`] if `T` is the row type of a different table.
    pub fn row<T: RowReadable>(&self, rid: u32) -> Result<T> {
        if T::TABLE != self.info.id {
            return Err(malformed_error!(
                "Rows of {:?} can not be read from table {}",
                T::TABLE,
                self.info.name
            ));
        }

        let Some(row_offset) = self.row_offset(rid) else {
            return Err(OutOfBounds);
        };

        let mut columns = [0_u32; 9];
        for (slot, column) in columns.iter_mut().zip(&self.info.columns) {
            *slot = read_column(self.data, row_offset + column.offset, column.size)?;
        }

        Ok(T::from_columns(rid, row_offset, &columns[..self.info.columns.len()]))
    }

    /// Sequential iterator over all rows
    #[must_use]
    pub fn iter<T: RowReadable>(&self) -> TableIterator<'_, 'a, T> {
        TableIterator {
            table: self,
            next_rid: 1,
            _row: std::marker::PhantomData,
        }
    }

    /// Parallel iterator over all rows
    pub fn par_iter<T: RowReadable>(&'a self) -> impl ParallelIterator<Item = T> + 'a {
        (1..=self.row_count)
            .into_par_iter()
            .filter_map(move |rid| self.get::<T>(rid))
    }

    fn row_offset(&self, rid: u32) -> Option<usize> {
        if rid == 0 || rid > self.row_count {
            return None;
        }

        (rid as usize - 1).checked_mul(self.info.row_size)
    }
}

/// Sequential iterator over the rows of a [`MetadataTable`].
pub struct TableIterator<'t, 'a, T> {
    table: &'t MetadataTable<'a>,
    next_rid: u32,
    _row: std::marker::PhantomData<T>,
}

impl<T: RowReadable> Iterator for TableIterator<'_, '_, T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next_rid > self.table.row_count {
            return None;
        }

        let row = self.table.get::<T>(self.next_rid)?;
        self.next_rid += 1;
        Some(row)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.table.row_count + 1).saturating_sub(self.next_rid) as usize;
        (0, Some(remaining))
    }
}

fn read_column(data: &[u8], offset: usize, size: usize) -> Result<u32> {
    let mut offset = offset;
    match size {
        1 => Ok(u32::from(read_le_at::<u8>(data, &mut offset)?)),
        2 => Ok(u32::from(read_le_at::<u16>(data, &mut offset)?)),
        4 => read_le_at::<u32>(data, &mut offset),
        _ => Err(malformed_error!("Invalid column width - {}", size)),
    }
}
