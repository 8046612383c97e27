//! Lazily resolved row views.
//!
//! A [`Record`] is nothing more than a table id, a row id and a reference to the
//! [`MetadataTables`] it came from. Column values are read from the table window and heap
//! references are resolved on every call, so records are `Copy`, cheap to create and can be
//! dropped at will.
//!
//! On top of [`Record`], every table the reader exposes has a strongly typed view
//! ([`TypeDef`], [`MethodDef`], [`Field`], ...) with named column accessors and the
//! cross-table navigation that belongs to that table.
//!
//! # Examples
//!
//! ```rust,no_run
//! use ironscope::ModuleView;
//!
//! let view = ModuleView::from_file("module.dll".as_ref())?;
//! let tables = view.tables();
//!
//! for typedef in tables.type_defs() {
//!     println!("{}.{}", typedef.namespace()?, typedef.name()?);
//!     for method in typedef.methods()? {
//!         println!("    {}", method.name()?);
//!     }
//! }
//! # Ok::<(), ironscope::Error>(())
//! ```

/// Declare a typed view over one table.
macro_rules! record_view {
    ($(#[$meta:meta])* $name:ident => $table:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq)]
        pub struct $name<'t>(crate::metadata::records::Record<'t>);

        impl<'t> crate::metadata::records::RecordView<'t> for $name<'t> {
            const TABLE: crate::metadata::tables::TableId =
                crate::metadata::tables::TableId::$table;

            fn wrap(record: crate::metadata::records::Record<'t>) -> Self {
                $name(record)
            }

            fn record(&self) -> crate::metadata::records::Record<'t> {
                self.0
            }
        }

        impl<'t> TryFrom<crate::metadata::records::Record<'t>> for $name<'t> {
            type Error = crate::Error;

            fn try_from(record: crate::metadata::records::Record<'t>) -> crate::Result<Self> {
                if record.table() != crate::metadata::tables::TableId::$table {
                    return Err(malformed_error!(
                        "Expected a {:?} row, got {:?}",
                        crate::metadata::tables::TableId::$table,
                        record.table()
                    ));
                }
                Ok($name(record))
            }
        }
    };
}

mod assembly;
mod member;
mod types;

pub use assembly::{
    Assembly, AssemblyRef, CustomAttribute, DeclSecurity, ExportedType, FileDef,
    ManifestResource, ModuleDef, ModuleRef, Version,
};
pub use member::{
    Constant, Event, Field, FieldLayout, FieldMarshal, FieldRva, ImplMap, MemberRef, MethodDef,
    MethodImpl, MethodSemantics, MethodSpec, Param, Property, StandAloneSig,
};
pub use types::{
    ClassLayout, EventMap, GenericParam, GenericParamConstraint, InterfaceImpl, NestedClass,
    PropertyMap, TypeDef, TypeRef, TypeSpec,
};

use std::fmt;

use crate::{
    metadata::{
        tables::{CodedIndex, ColumnKind, HeapKind, TableId},
        token::Token,
        MetadataTables,
    },
    Result,
};

/// An untyped row of any table.
#[derive(Clone, Copy)]
pub struct Record<'t> {
    tables: &'t MetadataTables<'t>,
    table: TableId,
    rid: u32,
}

impl<'t> Record<'t> {
    /// Create a record without checking the row id; [`MetadataTables::record`] is the checked
    /// entry point.
    pub(crate) fn new(tables: &'t MetadataTables<'t>, table: TableId, rid: u32) -> Self {
        Record { tables, table, rid }
    }

    /// The table this row belongs to.
    #[must_use]
    pub fn table(&self) -> TableId {
        self.table
    }

    /// The 1-based row id.
    #[must_use]
    pub fn rid(&self) -> u32 {
        self.rid
    }

    /// The token of this row.
    #[must_use]
    pub fn token(&self) -> Token {
        Token::from_parts(self.table, self.rid)
    }

    /// The tables this row was read from.
    #[must_use]
    pub fn tables(&self) -> &'t MetadataTables<'t> {
        self.tables
    }

    /// Raw value of column `index`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] for an invalid column index.
    pub fn column_at(&self, index: usize) -> Result<u32> {
        self.tables.table(self.table).column(self.rid, index)
    }

    /// Raw value of the column called `name`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] for an unknown column name.
    pub fn column(&self, name: &str) -> Result<u32> {
        self.tables.table(self.table).column_by_name(self.rid, name)
    }

    /// Resolve column `index` through the `#Strings` heap.
    ///
    /// # Errors
    /// Returns an error if the column is not a string column or the heap entry is invalid.
    pub fn string(&self, index: usize) -> Result<&'t str> {
        self.expect_heap(index, HeapKind::Strings)?;
        self.tables.string_at(self.column_at(index)?)
    }

    /// Resolve column `index` through the `#Blob` heap.
    ///
    /// # Errors
    /// Returns an error if the column is not a blob column or the heap entry is invalid.
    pub fn blob(&self, index: usize) -> Result<&'t [u8]> {
        self.expect_heap(index, HeapKind::Blob)?;
        self.tables.blob_at(self.column_at(index)?)
    }

    /// Resolve column `index` through the `#GUID` heap.
    ///
    /// # Errors
    /// Returns an error if the column is not a GUID column or the index is out of range.
    pub fn guid(&self, index: usize) -> Result<uguid::Guid> {
        self.expect_heap(index, HeapKind::Guid)?;
        self.tables.guid_at(self.column_at(index)?)
    }

    /// Decode coded index column `index`.
    ///
    /// # Errors
    /// Returns [`crate::Error::BadImageFormat`] if the column is not a coded index or its tag
    /// is invalid.
    pub fn coded(&self, index: usize) -> Result<CodedIndex> {
        match self.kind(index)? {
            ColumnKind::Coded(kind) => kind.decode(self.column_at(index)?),
            other => Err(malformed_error!(
                "Column {} of {:?} is {:?}, not a coded index",
                index,
                self.table,
                other
            )),
        }
    }

    /// The token a single-table reference column `index` points at.
    ///
    /// # Errors
    /// Returns [`crate::Error::BadImageFormat`] if the column is not a table reference.
    pub fn reference(&self, index: usize) -> Result<Token> {
        match self.kind(index)? {
            ColumnKind::Table(target) => Ok(Token::from_parts(target, self.column_at(index)?)),
            other => Err(malformed_error!(
                "Column {} of {:?} is {:?}, not a table reference",
                index,
                self.table,
                other
            )),
        }
    }

    fn kind(&self, index: usize) -> Result<ColumnKind> {
        match self.tables.table(self.table).schema().get(index) {
            Some(column) => Ok(column.kind),
            None => Err(crate::Error::OutOfBounds),
        }
    }

    fn expect_heap(&self, index: usize, heap: HeapKind) -> Result<()> {
        match self.kind(index)? {
            ColumnKind::Heap(kind) if kind == heap => Ok(()),
            other => Err(malformed_error!(
                "Column {} of {:?} is {:?}, not a {:?} index",
                index,
                self.table,
                other,
                heap
            )),
        }
    }
}

impl fmt::Debug for Record<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Record")
            .field("table", &self.table)
            .field("rid", &self.rid)
            .finish()
    }
}

impl PartialEq for Record<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tables, other.tables) && self.table == other.table && self.rid == other.rid
    }
}

impl Eq for Record<'_> {}

/// A strongly typed view over the rows of one table.
pub trait RecordView<'t>: Copy {
    /// The table this view reads
    const TABLE: TableId;

    /// Wrap a record of [`RecordView::TABLE`].
    fn wrap(record: Record<'t>) -> Self;

    /// The underlying untyped record.
    fn record(&self) -> Record<'t>;

    /// The 1-based row id.
    fn rid(&self) -> u32 {
        self.record().rid()
    }

    /// The token of this row.
    fn token(&self) -> Token {
        self.record().token()
    }
}
