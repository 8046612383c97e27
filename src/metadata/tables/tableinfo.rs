use strum::{EnumCount, IntoEnumIterator};

use crate::{
    file::parser::Parser,
    metadata::tables::{schema::HeapKind, CodedIndexType, ColumnKind, TableId},
    Error::{NotSupported, OutOfBounds},
    Result,
};

/// Largest row count a table can declare; row ids must fit into the 24 bits of a token.
pub const MAX_ROWS: u32 = 0x00FF_FFFF;

/// Heap-size flag: `#Strings` indexes are 4 bytes wide
pub const HEAP_LARGE_STRINGS: u8 = 0x01;
/// Heap-size flag: `#GUID` indexes are 4 bytes wide
pub const HEAP_LARGE_GUID: u8 = 0x02;
/// Heap-size flag: `#Blob` indexes are 4 bytes wide
pub const HEAP_LARGE_BLOB: u8 = 0x04;
/// Heap-size flag: one extra u32 follows the row counts
pub const HEAP_EXTRA_DATA: u8 = 0x40;

/// The fixed part of the table stream header before the row counts.
const FIXED_HEADER_SIZE: usize = 24;

/// The header of the `#~` / `#-` table stream (ECMA-335 II.24.2.6).
///
/// Holds the heap-size flags, the valid and sorted bit vectors and one row count per present
/// table. Tables whose valid bit is clear have a row count of zero.
#[derive(Clone, Debug, PartialEq)]
pub struct TablesHeader {
    /// Reserved, always 0
    pub reserved: u32,
    /// Major version of the table schema
    pub major_version: u8,
    /// Minor version of the table schema
    pub minor_version: u8,
    /// Bit vector of heap-size flags
    pub heap_sizes: u8,
    /// Reserved, always 1
    pub reserved2: u8,
    /// Bit vector of present tables
    pub valid: u64,
    /// Bit vector of sorted tables
    pub sorted: u64,
    /// Row count per table, indexed by [`TableId`]
    pub rows: [u32; TableId::COUNT],
    /// Size of the header in bytes; the first table starts here
    pub size: usize,
}

impl TablesHeader {
    /// Parse the table stream header.
    ///
    /// # Errors
    /// * [`crate::Error::OutOfBounds`] if the stream is too short for the declared row counts
    /// * [`crate::Error::NotSupported`] if tables beyond `GenericParamConstraint` are present
    /// * [`crate::Error::BadImageFormat`] if a row count exceeds 2^24 - 1, more than one
    ///   `Assembly` row is declared, or the `Module` table does not hold exactly one row
    pub fn read(data: &[u8]) -> Result<TablesHeader> {
        if data.len() < FIXED_HEADER_SIZE {
            return Err(OutOfBounds);
        }

        let mut parser = Parser::new(data);
        let reserved = parser.read_le::<u32>()?;
        let major_version = parser.read_le::<u8>()?;
        let minor_version = parser.read_le::<u8>()?;
        let heap_sizes = parser.read_le::<u8>()?;
        let reserved2 = parser.read_le::<u8>()?;
        let valid = parser.read_le::<u64>()?;
        let sorted = parser.read_le::<u64>()?;

        if valid >> (u32::from(TableId::MAX) + 1) != 0 {
            return Err(NotSupported);
        }

        let mut rows = [0_u32; TableId::COUNT];
        for id in TableId::iter() {
            if valid & (1 << id as u64) == 0 {
                continue;
            }

            let count = parser.read_le::<u32>()?;
            if count > MAX_ROWS {
                return Err(malformed_error!(
                    "Table {:?} declares {} rows, more than a token can address",
                    id,
                    count
                ));
            }

            rows[id as usize] = count;
        }

        if heap_sizes & HEAP_EXTRA_DATA != 0 {
            parser.advance_by(4)?;
        }

        if rows[TableId::Assembly as usize] > 1 {
            return Err(malformed_error!(
                "Multiple Assembly rows - {}",
                rows[TableId::Assembly as usize]
            ));
        }

        if valid & 1 != 0 && rows[TableId::Module as usize] != 1 {
            return Err(malformed_error!(
                "Module table must hold exactly one row, found {}",
                rows[TableId::Module as usize]
            ));
        }

        Ok(TablesHeader {
            reserved,
            major_version,
            minor_version,
            heap_sizes,
            reserved2,
            valid,
            sorted,
            rows,
            size: parser.pos(),
        })
    }

    /// Returns `true` if the valid bit of `id` is set.
    #[must_use]
    pub fn is_present(&self, id: TableId) -> bool {
        self.valid & (1 << id as u64) != 0
    }

    /// Returns `true` if the sorted bit of `id` is set.
    #[must_use]
    pub fn is_sorted(&self, id: TableId) -> bool {
        self.sorted & (1 << id as u64) != 0
    }

    /// Row count of `id`.
    #[must_use]
    pub fn row_count(&self, id: TableId) -> u32 {
        self.rows[id as usize]
    }

    /// Number of tables whose valid bit is set.
    #[must_use]
    pub fn table_count(&self) -> u32 {
        self.valid.count_ones()
    }
}

/// Index widths of one image.
///
/// Built from the complete set of row counts; nothing here is consulted before every count is
/// known, since coded index widths depend on several tables at once.
#[derive(Clone, Debug, PartialEq)]
pub struct TableInfo {
    rows: [u32; TableId::COUNT],
    coded: [u8; CodedIndexType::COUNT],
    heap_sizes: u8,
}

impl TableInfo {
    /// Compute all index widths from the row counts and heap-size flags.
    #[must_use]
    pub fn new(rows: [u32; TableId::COUNT], heap_sizes: u8) -> TableInfo {
        let mut coded = [2_u8; CodedIndexType::COUNT];
        for kind in CodedIndexType::iter() {
            let limit = 1_u32 << (16 - kind.tag_bits());
            if kind.tables().any(|table| rows[table as usize] >= limit) {
                coded[kind as usize] = 4;
            }
        }

        TableInfo {
            rows,
            coded,
            heap_sizes,
        }
    }

    /// Shorthand for [`TableInfo::new`] with the counts of a parsed header.
    #[must_use]
    pub fn from_header(header: &TablesHeader) -> TableInfo {
        TableInfo::new(header.rows, header.heap_sizes)
    }

    /// Row count of `id`.
    #[must_use]
    pub fn rows(&self, id: TableId) -> u32 {
        self.rows[id as usize]
    }

    /// The heap-size flags the widths were built from.
    #[must_use]
    pub fn heap_sizes(&self) -> u8 {
        self.heap_sizes
    }

    /// Width of a row reference into `id`.
    ///
    /// References into tables that can be indirected through a pointer table are as wide as
    /// the wider of the two, so a logical row id never gets truncated.
    #[must_use]
    pub fn table_index_size(&self, id: TableId) -> u8 {
        let own = Self::simple_size(self.rows(id));
        match id.pointer_table() {
            Some(pointer) => own.max(Self::simple_size(self.rows(pointer))),
            None => own,
        }
    }

    /// Width of a coded index of `kind`.
    #[must_use]
    pub fn coded_index_size(&self, kind: CodedIndexType) -> u8 {
        self.coded[kind as usize]
    }

    /// Width of an index into `heap`.
    #[must_use]
    pub fn heap_index_size(&self, heap: HeapKind) -> u8 {
        let flag = match heap {
            HeapKind::Strings => HEAP_LARGE_STRINGS,
            HeapKind::Guid => HEAP_LARGE_GUID,
            HeapKind::Blob => HEAP_LARGE_BLOB,
        };

        if self.heap_sizes & flag != 0 {
            4
        } else {
            2
        }
    }

    /// Width of a column of `kind`.
    #[must_use]
    pub fn column_size(&self, kind: ColumnKind) -> u8 {
        match kind {
            ColumnKind::Fixed(width) => width,
            ColumnKind::Heap(heap) => self.heap_index_size(heap),
            ColumnKind::Table(id) => self.table_index_size(id),
            ColumnKind::Coded(coded) => self.coded_index_size(coded),
        }
    }

    fn simple_size(rows: u32) -> u8 {
        if rows < 0x1_0000 {
            2
        } else {
            4
        }
    }
}
