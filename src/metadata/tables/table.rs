use rayon::prelude::*;

use crate::{
    file::MemoryBlock,
    metadata::{
        tables::{Column, ColumnLayout, TableId, TableLayout},
        token::Token,
    },
    Error::OutOfBounds,
    Result,
};

/// One table window of the table stream together with its row layout.
///
/// Rows are addressed by their 1-based row id. Column values are returned raw, as the `u32`
/// stored in the row; resolving heap offsets and indexes is left to
/// [`crate::metadata::MetadataTables`] and the record views built on top of it.
///
/// # Examples
///
/// ```rust,no_run
/// use ironscope::{metadata::tables::TableId, ModuleView};
/// use rayon::prelude::*;
///
/// let view = ModuleView::from_file("module.dll".as_ref())?;
/// let typedefs = view.tables().table(TableId::TypeDef);
///
/// let abstract_types = typedefs
///     .par_iter()
///     .filter(|row| row.column(0).is_ok_and(|flags| flags & 0x80 != 0))
///     .count();
/// println!("{} abstract types", abstract_types);
/// # Ok::<(), ironscope::Error>(())
/// ```
#[derive(Clone, Debug)]
pub struct MetadataTable<'a> {
    layout: TableLayout,
    block: MemoryBlock<'a>,
    sorted: bool,
}

impl<'a> MetadataTable<'a> {
    /// Wrap a table window.
    ///
    /// # Errors
    /// Returns [`crate::Error::BadImageFormat`] if the window does not hold exactly
    /// `rows * row_size` bytes.
    pub fn new(layout: TableLayout, block: MemoryBlock<'a>, sorted: bool) -> Result<Self> {
        if layout.size() != Some(block.len()) {
            return Err(malformed_error!(
                "Table {:?} window holds {} bytes, layout needs {:?}",
                layout.id,
                block.len(),
                layout.size()
            ));
        }

        Ok(MetadataTable {
            layout,
            block,
            sorted,
        })
    }

    /// The table this window belongs to.
    #[must_use]
    pub fn id(&self) -> TableId {
        self.layout.id
    }

    /// Number of rows.
    #[must_use]
    pub fn row_count(&self) -> u32 {
        self.layout.rows
    }

    /// Size of one row in bytes.
    #[must_use]
    pub fn row_size(&self) -> usize {
        self.layout.row_size
    }

    /// Returns `true` if the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layout.rows == 0
    }

    /// Whether the sorted bit of this table is set.
    #[must_use]
    pub fn is_sorted(&self) -> bool {
        self.sorted
    }

    /// The computed row layout.
    #[must_use]
    pub fn layout(&self) -> &TableLayout {
        &self.layout
    }

    /// The column schema.
    #[must_use]
    pub fn schema(&self) -> &'static [Column] {
        self.layout.schema()
    }

    /// The raw table window; its base is the offset inside the table stream.
    #[must_use]
    pub fn block(&self) -> MemoryBlock<'a> {
        self.block
    }

    /// Returns `true` if `rid` addresses a row of this table.
    #[must_use]
    pub fn contains(&self, rid: u32) -> bool {
        rid >= 1 && rid <= self.layout.rows
    }

    /// The bytes of row `rid`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if `rid` is 0 or greater than the row count.
    pub fn row(&self, rid: u32) -> Result<MemoryBlock<'a>> {
        if !self.contains(rid) {
            return Err(OutOfBounds);
        }

        let size = self.layout.row_size;
        self.block.slice((rid as usize - 1) * size, size)
    }

    /// The raw value of column `index` in row `rid`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] for an invalid row id or column index.
    pub fn column(&self, rid: u32, index: usize) -> Result<u32> {
        let column = self.layout.columns.get(index).ok_or(OutOfBounds)?;
        read_column(&self.row(rid)?, *column)
    }

    /// The raw value of the column called `name` in row `rid`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] for an invalid row id or unknown column name.
    pub fn column_by_name(&self, rid: u32, name: &str) -> Result<u32> {
        let index = self.layout.column_index(name).ok_or(OutOfBounds)?;
        self.column(rid, index)
    }

    /// Index of the column called `name`.
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.layout.column_index(name)
    }

    /// The token of row `rid`.
    #[must_use]
    pub fn token(&self, rid: u32) -> Token {
        Token::from_parts(self.layout.id, rid)
    }

    /// Iterate over all rows in order.
    #[must_use]
    pub fn iter(&self) -> TableIterator<'_> {
        TableIterator {
            table: self,
            next: 1,
        }
    }

    /// Iterate over all rows in parallel.
    pub fn par_iter(&self) -> impl IndexedParallelIterator<Item = TableRow<'_>> + '_ {
        (1..self.layout.rows + 1)
            .into_par_iter()
            .map(move |rid| self.row_at(rid))
    }

    /// Row view for a row id known to be in range.
    fn row_at(&self, rid: u32) -> TableRow<'_> {
        let size = self.layout.row_size;
        let start = (rid as usize - 1) * size;

        TableRow {
            layout: &self.layout,
            rid,
            data: MemoryBlock::with_base(
                &self.block.data()[start..start + size],
                self.block.base() + start,
            ),
        }
    }
}

impl<'t> IntoIterator for &'t MetadataTable<'_> {
    type Item = TableRow<'t>;
    type IntoIter = TableIterator<'t>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// A row handed out by the table iterators.
#[derive(Clone, Copy, Debug)]
pub struct TableRow<'t> {
    layout: &'t TableLayout,
    /// The 1-based row id
    pub rid: u32,
    /// The row bytes
    pub data: MemoryBlock<'t>,
}

impl TableRow<'_> {
    /// The raw value of column `index`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] for an invalid column index.
    pub fn column(&self, index: usize) -> Result<u32> {
        let column = self.layout.columns.get(index).ok_or(OutOfBounds)?;
        read_column(&self.data, *column)
    }

    /// The token of this row.
    #[must_use]
    pub fn token(&self) -> Token {
        Token::from_parts(self.layout.id, self.rid)
    }
}

/// Sequential iterator over the rows of a [`MetadataTable`].
pub struct TableIterator<'t> {
    table: &'t MetadataTable<'t>,
    next: u32,
}

impl<'t> Iterator for TableIterator<'t> {
    type Item = TableRow<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next > self.table.row_count() {
            return None;
        }

        let row = self.table.row_at(self.next);
        self.next += 1;
        Some(row)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = (self.table.row_count() + 1).saturating_sub(self.next) as usize;
        (left, Some(left))
    }
}

impl ExactSizeIterator for TableIterator<'_> {}

fn read_column(row: &MemoryBlock<'_>, column: ColumnLayout) -> Result<u32> {
    match column.width {
        1 => Ok(u32::from(row.read_u8(column.offset)?)),
        2 => Ok(u32::from(row.read_u16(column.offset)?)),
        _ => row.read_u32(column.offset),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::tables::TableInfo;
    use strum::EnumCount;

    fn typeref_layout(rows: u32) -> TableLayout {
        let mut counts = [0; TableId::COUNT];
        counts[TableId::TypeRef as usize] = rows;
        TableLayout::new(TableId::TypeRef, &TableInfo::new(counts, 0))
    }

    #[test]
    fn rows_and_columns() {
        #[rustfmt::skip]
        let data = [
            0x06, 0x00, 0x10, 0x00, 0x20, 0x00,
            0x0A, 0x00, 0x30, 0x00, 0x40, 0x00,
        ];

        let table = MetadataTable::new(typeref_layout(2), MemoryBlock::new(&data), false).unwrap();
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.row_size(), 6);

        assert_eq!(table.column(1, 0).unwrap(), 0x06);
        assert_eq!(table.column(2, 2).unwrap(), 0x40);
        assert_eq!(table.column_by_name(2, "TypeName").unwrap(), 0x30);
        assert_eq!(table.token(2), Token(0x0100_0002));

        assert!(table.column(0, 0).is_err());
        assert!(table.column(3, 0).is_err());
        assert!(table.column(1, 3).is_err());
        assert!(table.column_by_name(1, "Name").is_err());
        assert_eq!(table.row(2).unwrap().base(), 6);
    }

    #[test]
    fn iteration() {
        let data: Vec<u8> = (0..30).collect();
        let table = MetadataTable::new(typeref_layout(5), MemoryBlock::new(&data), true).unwrap();

        let rids: Vec<u32> = table.iter().map(|row| row.rid).collect();
        assert_eq!(rids, vec![1, 2, 3, 4, 5]);
        assert_eq!(table.iter().len(), 5);

        let sequential: Vec<u32> = table.iter().map(|row| row.column(1).unwrap()).collect();
        let parallel: Vec<u32> = table
            .par_iter()
            .map(|row| row.column(1).unwrap())
            .collect();
        assert_eq!(sequential, parallel);
        assert_eq!(sequential[0], u32::from(u16::from_le_bytes([2, 3])));
    }

    #[test]
    fn size_mismatch() {
        let data = [0_u8; 11];
        assert!(MetadataTable::new(typeref_layout(2), MemoryBlock::new(&data), false).is_err());
    }
}
