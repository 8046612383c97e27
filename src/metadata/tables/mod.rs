//! Metadata table layout and access (ECMA-335 II.22, II.24.2.6).
//!
//! The table stream stores up to 45 tables back to back. Nothing about the position of a row or
//! a column is fixed: a reference into another table is 2 or 4 bytes wide depending on that
//! table's row count, a heap offset depends on the heap-size flags, and a coded index depends on
//! the row counts of every table it may point to. This module computes all of it once per image:
//!
//! 1. [`TablesHeader`] reads the heap-size flags, the valid and sorted masks and all row counts
//! 2. [`TableInfo`] derives every index width from the complete set of counts
//! 3. [`TableLayout`] lays out each table's columns in schema order
//! 4. [`slice_tables`] cuts the stream into one [`MetadataTable`] window per table
//!
//! # Key Components
//!
//! - [`TableId`] - The 45 table kinds
//! - [`CodedIndexType`] / [`CodedIndex`] - Tagged multi-table references
//! - [`Column`] / [`ColumnKind`] - Static table schemas
//! - [`MetadataTable`] - A table window with raw column access and row iteration

mod codedindex;
mod layout;
pub(crate) mod schema;
mod table;
mod tableid;
mod tableinfo;

pub use codedindex::{CodedIndex, CodedIndexType};
pub use layout::{build_layouts, slice_tables, ColumnLayout, TableLayout};
pub use schema::{key_column, schema, Column, ColumnKind, HeapKind};
pub use table::{MetadataTable, TableIterator, TableRow};
pub use tableid::TableId;
pub use tableinfo::{
    TableInfo, TablesHeader, HEAP_EXTRA_DATA, HEAP_LARGE_BLOB, HEAP_LARGE_GUID,
    HEAP_LARGE_STRINGS, MAX_ROWS,
};
