//! Row layouts and table slicing.
//!
//! Given a [`TableInfo`], every table's columns are laid out in schema order with their byte
//! offset and width, and the table stream is cut into one window per table. Tables follow each
//! other in ascending [`TableId`] order without padding, so the cut is a single forward pass.

use strum::IntoEnumIterator;

use crate::{
    file::MemoryBlock,
    metadata::tables::{schema::schema, Column, TableId, TableInfo},
    Result,
};

/// Position and width of one column inside a row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColumnLayout {
    /// Byte offset from the start of the row
    pub offset: usize,
    /// Width in bytes: 1, 2 or 4
    pub width: u8,
}

/// The computed row layout of one table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableLayout {
    /// The table described
    pub id: TableId,
    /// Number of rows
    pub rows: u32,
    /// Size of a single row in bytes
    pub row_size: usize,
    /// One entry per schema column
    pub columns: Vec<ColumnLayout>,
}

impl TableLayout {
    /// Lay out the columns of `id`.
    #[must_use]
    pub fn new(id: TableId, info: &TableInfo) -> TableLayout {
        let mut offset = 0;
        let columns = schema(id)
            .iter()
            .map(|column| {
                let width = info.column_size(column.kind);
                let layout = ColumnLayout { offset, width };
                offset += usize::from(width);
                layout
            })
            .collect();

        TableLayout {
            id,
            rows: info.rows(id),
            row_size: offset,
            columns,
        }
    }

    /// The schema this layout was computed from.
    #[must_use]
    pub fn schema(&self) -> &'static [Column] {
        schema(self.id)
    }

    /// Total size of the table in bytes, `None` on overflow.
    #[must_use]
    pub fn size(&self) -> Option<usize> {
        (self.rows as usize).checked_mul(self.row_size)
    }

    /// Index of the column called `name`.
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.schema().iter().position(|column| column.name == name)
    }
}

/// Compute the layouts of all tables, indexed by [`TableId`].
#[must_use]
pub fn build_layouts(info: &TableInfo) -> Vec<TableLayout> {
    TableId::iter()
        .map(|id| TableLayout::new(id, info))
        .collect()
}

/// Cut `stream` into one window per layout, starting at `start`.
///
/// # Errors
/// Returns [`crate::Error::BadImageFormat`] if a table does not fit into the remaining stream.
pub fn slice_tables<'a>(
    layouts: &[TableLayout],
    stream: MemoryBlock<'a>,
    start: usize,
) -> Result<Vec<MemoryBlock<'a>>> {
    let mut cursor = start;
    let mut blocks = Vec::with_capacity(layouts.len());

    for layout in layouts {
        let Some(size) = layout.size() else {
            return Err(malformed_error!("Table {:?} size overflows", layout.id));
        };

        let fits = cursor
            .checked_add(size)
            .is_some_and(|end| end <= stream.len());
        if !fits {
            return Err(malformed_error!(
                "Table {:?} with {} rows of {} bytes at offset {} exceeds the table stream of {} bytes",
                layout.id,
                layout.rows,
                layout.row_size,
                cursor,
                stream.len()
            ));
        }

        blocks.push(stream.slice(cursor, size)?);
        cursor += size;
    }

    Ok(blocks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::tables::{HEAP_LARGE_BLOB, HEAP_LARGE_STRINGS};
    use strum::EnumCount;

    fn info(counts: &[(TableId, u32)], heap_sizes: u8) -> TableInfo {
        let mut rows = [0; TableId::COUNT];
        for (id, count) in counts {
            rows[*id as usize] = *count;
        }
        TableInfo::new(rows, heap_sizes)
    }

    #[test]
    fn typedef_small() {
        let layout = TableLayout::new(TableId::TypeDef, &info(&[(TableId::TypeDef, 3)], 0));

        assert_eq!(layout.rows, 3);
        assert_eq!(layout.row_size, 4 + 2 + 2 + 2 + 2 + 2);
        assert_eq!(
            layout.columns.iter().map(|c| c.offset).collect::<Vec<_>>(),
            vec![0, 4, 6, 8, 10, 12]
        );
        assert_eq!(layout.column_index("MethodList"), Some(5));
        assert_eq!(layout.column_index("Nope"), None);
    }

    #[test]
    fn typedef_large() {
        let layout = TableLayout::new(
            TableId::TypeDef,
            &info(
                &[(TableId::TypeRef, 0x4000), (TableId::Field, 0x1_0000)],
                HEAP_LARGE_STRINGS,
            ),
        );

        // flags, 2x string, extends (coded 4), field list 4, method list 2
        assert_eq!(layout.row_size, 4 + 4 + 4 + 4 + 4 + 2);
        assert_eq!(layout.columns[5].offset, 20);
    }

    #[test]
    fn fixed_only() {
        let layout = TableLayout::new(TableId::Assembly, &info(&[], HEAP_LARGE_BLOB));
        assert_eq!(layout.row_size, 4 + 2 * 4 + 4 + 4 + 2 + 2);
        assert_eq!(layout.size(), Some(0));
    }

    #[test]
    fn slicing_is_consecutive() {
        let info = info(
            &[
                (TableId::Module, 1),
                (TableId::TypeRef, 2),
                (TableId::TypeDef, 1),
            ],
            0,
        );
        let layouts = build_layouts(&info);
        assert_eq!(layouts.len(), TableId::COUNT);

        // module 10, typeref 2x6, typedef 14
        let data = vec![0_u8; 4 + 10 + 12 + 14];
        let blocks = slice_tables(&layouts, MemoryBlock::new(&data), 4).unwrap();

        assert_eq!(blocks[TableId::Module as usize].base(), 4);
        assert_eq!(blocks[TableId::TypeRef as usize].base(), 14);
        assert_eq!(blocks[TableId::TypeRef as usize].len(), 12);
        assert_eq!(blocks[TableId::TypeDef as usize].base(), 26);
        assert!(blocks[TableId::Field as usize].is_empty());

        assert!(slice_tables(&layouts, MemoryBlock::new(&data[..39]), 4).is_err());
    }
}
