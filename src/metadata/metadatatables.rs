//! The token-addressed facade over heaps and tables.
//!
//! [`MetadataTables`] is built once per image and never mutated afterwards. Every query below
//! reads the table windows directly, so the facade can be shared between threads freely.
//!
//! # Navigation
//!
//! - **Owning ranges**: `TypeDef.FieldList`, `TypeDef.MethodList`, `MethodDef.ParamList`,
//!   `EventMap.EventList` and `PropertyMap.PropertyList` store the first child row of each owner.
//!   An owner's run ends where the next owner's run starts, or after the last child row. When
//!   the matching pointer table (`FieldPtr`, ...) is present the runs index the pointer table,
//!   and every entry is dereferenced to the physical row.
//! - **Reverse lookups**: the owner of a child row, via [`crate::metadata::search::owner_of`].
//! - **Keyed lookups**: rows of a sorted table attached to a given token, via
//!   [`crate::metadata::search::equal_range`]. Tables whose sorted bit is clear are scanned.

use std::ops::Range;

use log::{debug, warn};
use strum::IntoEnumIterator;

use crate::{
    file::MemoryBlock,
    metadata::{
        options::LoadOptions,
        records::{
            Assembly, AssemblyRef, ClassLayout, Constant, CustomAttribute, DeclSecurity, Event,
            ExportedType, Field, FieldLayout, FieldMarshal, FieldRva, FileDef, GenericParam,
            GenericParamConstraint, ImplMap, InterfaceImpl, ManifestResource, MemberRef,
            MethodDef, MethodImpl, MethodSemantics, MethodSpec, ModuleDef, ModuleRef,
            NestedClass, Param, Property, Record, RecordView, StandAloneSig, TypeDef, TypeRef,
            TypeSpec,
        },
        root::Root,
        search,
        streams::{Blob, Guid, StreamHeader, Streams, Strings, UserStrings},
        tables::{
            build_layouts, key_column, schema, slice_tables, ColumnKind, MetadataTable, TableId,
            TableInfo, TablesHeader,
        },
        token::Token,
    },
    Error::OutOfBounds,
    Result,
};

/// Heaps and tables of one module.
///
/// # Examples
///
/// ```rust,no_run
/// use ironscope::{metadata::tables::TableId, ModuleView};
///
/// let view = ModuleView::from_file("module.dll".as_ref())?;
/// let tables = view.tables();
///
/// println!("{} types", tables.row_count(TableId::TypeDef));
/// for reference in tables.assembly_refs() {
///     println!("references {}", reference.name()?);
/// }
/// # Ok::<(), ironscope::Error>(())
/// ```
pub struct MetadataTables<'a> {
    header: TablesHeader,
    info: TableInfo,
    tables: Vec<MetadataTable<'a>>,
    strings: Strings<'a>,
    blob: Option<Blob<'a>>,
    guid: Guid<'a>,
    user_strings: Option<UserStrings<'a>>,
    uncompressed: bool,
}

impl<'a> MetadataTables<'a> {
    /// Classify the streams of `root`, validate the heaps and lay out every table.
    ///
    /// `metadata` is the complete metadata directory the root was read from.
    ///
    /// # Errors
    /// Returns [`crate::Error::BadImageFormat`] for any invalid stream, heap or table layout,
    /// and when `options` require sorted tables that are not marked sorted.
    pub fn new(metadata: &'a [u8], root: &Root, options: &LoadOptions) -> Result<Self> {
        let streams = Streams::classify(&root.stream_headers)?;

        let strings = Strings::from(stream_data(metadata, &streams.strings)?)?;
        let guid = Guid::from(stream_data(metadata, &streams.guid)?)?;
        let blob = match &streams.blob {
            Some(header) => Some(Blob::from(stream_data(metadata, header)?)?),
            None => None,
        };
        let user_strings = match &streams.user_strings {
            Some(header) => Some(UserStrings::from(stream_data(metadata, header)?)?),
            None => None,
        };

        let table_data = stream_data(metadata, &streams.tables)?;
        let header = TablesHeader::read(table_data)?;
        let info = TableInfo::from_header(&header);
        let layouts = build_layouts(&info);
        let blocks = slice_tables(
            &layouts,
            MemoryBlock::with_base(table_data, streams.tables.offset as usize),
            header.size,
        )?;

        let mut tables = Vec::with_capacity(layouts.len());
        for (layout, block) in layouts.into_iter().zip(blocks) {
            let id = layout.id;
            let sorted = header.is_sorted(id);

            if id.requires_sorting() && layout.rows > 0 && !sorted {
                if options.require_sorted_tables {
                    return Err(malformed_error!(
                        "Table {:?} must be sorted but its sorted bit is clear",
                        id
                    ));
                }
                warn!(
                    "Table {:?} is not marked sorted, lookups fall back to linear scans",
                    id
                );
            }

            tables.push(MetadataTable::new(layout, block, sorted)?);
        }

        debug!(
            "Loaded {} tables from '{}' ({} rows total), streams: {}",
            header.table_count(),
            streams.tables.name,
            header.rows.iter().map(|&rows| u64::from(rows)).sum::<u64>(),
            root.stream_headers
                .iter()
                .map(|stream| stream.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );

        Ok(MetadataTables {
            header,
            info,
            tables,
            strings,
            blob,
            guid,
            user_strings,
            uncompressed: streams.uncompressed,
        })
    }

    /// The parsed table stream header.
    #[must_use]
    pub fn header(&self) -> &TablesHeader {
        &self.header
    }

    /// The index widths of this image.
    #[must_use]
    pub fn info(&self) -> &TableInfo {
        &self.info
    }

    /// `true` if the tables came from an uncompressed `#-` stream.
    #[must_use]
    pub fn is_uncompressed(&self) -> bool {
        self.uncompressed
    }

    /// The window of table `id`. Absent tables are empty.
    #[must_use]
    pub fn table(&self, id: TableId) -> &MetadataTable<'a> {
        &self.tables[id as usize]
    }

    /// Row count of table `id`.
    #[must_use]
    pub fn row_count(&self, id: TableId) -> u32 {
        self.table(id).row_count()
    }

    /// Whether the sorted bit of table `id` is set.
    #[must_use]
    pub fn is_sorted(&self, id: TableId) -> bool {
        self.table(id).is_sorted()
    }

    /// The `#Strings` heap.
    #[must_use]
    pub fn strings(&self) -> &Strings<'a> {
        &self.strings
    }

    /// The `#Blob` heap, if present.
    #[must_use]
    pub fn blob(&self) -> Option<&Blob<'a>> {
        self.blob.as_ref()
    }

    /// The `#GUID` heap.
    #[must_use]
    pub fn guid(&self) -> &Guid<'a> {
        &self.guid
    }

    /// The `#US` heap, if present.
    #[must_use]
    pub fn user_strings(&self) -> Option<&UserStrings<'a>> {
        self.user_strings.as_ref()
    }

    /// The string at `index` of the `#Strings` heap.
    ///
    /// # Errors
    /// Returns an error if the index is outside the heap or the entry is not valid UTF-8.
    pub fn string_at(&self, index: u32) -> Result<&'a str> {
        self.strings.get(index as usize)
    }

    /// The blob at `index` of the `#Blob` heap. Index 0 is the empty blob, even without a heap.
    ///
    /// # Errors
    /// Returns an error for an invalid entry, or a non-zero index without a `#Blob` heap.
    pub fn blob_at(&self, index: u32) -> Result<&'a [u8]> {
        match &self.blob {
            Some(blob) => blob.get(index as usize),
            None if index == 0 => Ok(&[]),
            None => Err(malformed_error!(
                "Blob index {} without a '#Blob' stream",
                index
            )),
        }
    }

    /// The GUID at 1-based `index` of the `#GUID` heap; 0 is the null GUID.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the index exceeds the heap.
    pub fn guid_at(&self, index: u32) -> Result<uguid::Guid> {
        self.guid.get(index as usize)
    }

    /// The string literal at `index` of the `#US` heap.
    ///
    /// # Errors
    /// Returns an error for an invalid entry or a missing `#US` heap.
    pub fn user_string_at(&self, index: u32) -> Result<String> {
        match &self.user_strings {
            Some(heap) => heap.get(index as usize),
            None => Err(malformed_error!(
                "User string index {} without a '#US' stream",
                index
            )),
        }
    }

    /// The row `token` points at.
    ///
    /// # Errors
    /// Returns [`crate::Error::BadImageFormat`] for a token of an unknown table and
    /// [`crate::Error::OutOfBounds`] for a row id of 0 or beyond the table.
    pub fn record(&self, token: Token) -> Result<Record<'_>> {
        let Some(table) = token.table_id() else {
            return Err(malformed_error!(
                "Token {} does not reference a known table",
                token
            ));
        };

        if !self.table(table).contains(token.row()) {
            return Err(OutOfBounds);
        }

        Ok(Record::new(self, table, token.row()))
    }

    /// Like [`MetadataTables::record`], but a null token (row id 0) yields `None`.
    ///
    /// # Errors
    /// See [`MetadataTables::record`].
    pub fn try_record(&self, token: Token) -> Result<Option<Record<'_>>> {
        if token.is_null() {
            return Ok(None);
        }

        self.record(token).map(Some)
    }

    /// The typed row `rid` of `T::TABLE`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if `rid` is not a row of the table.
    pub fn get<'t, T: RecordView<'t>>(&'t self, rid: u32) -> Result<T> {
        if !self.table(T::TABLE).contains(rid) {
            return Err(OutOfBounds);
        }

        Ok(T::wrap(Record::new(self, T::TABLE, rid)))
    }

    /// Like [`MetadataTables::get`], but a row id of 0 yields `None`.
    ///
    /// # Errors
    /// See [`MetadataTables::get`].
    pub fn try_get<'t, T: RecordView<'t>>(&'t self, rid: u32) -> Result<Option<T>> {
        if rid == 0 {
            return Ok(None);
        }

        self.get(rid).map(Some)
    }

    /// All rows of `T::TABLE` in order.
    pub fn rows<'t, T: RecordView<'t>>(&'t self) -> impl ExactSizeIterator<Item = T> + 't {
        (1..self.row_count(T::TABLE) + 1).map(move |rid| T::wrap(Record::new(self, T::TABLE, rid)))
    }

    /// The single `Module` row, if the table is present.
    #[must_use]
    pub fn module(&self) -> Option<ModuleDef<'_>> {
        self.try_get(1).ok().flatten()
    }

    /// The `Assembly` row, present for manifest modules only.
    #[must_use]
    pub fn assembly(&self) -> Option<Assembly<'_>> {
        self.try_get(1).ok().flatten()
    }

    /// All `TypeRef` rows.
    pub fn type_refs(&self) -> impl ExactSizeIterator<Item = TypeRef<'_>> + '_ {
        self.rows()
    }

    /// All `TypeDef` rows.
    pub fn type_defs(&self) -> impl ExactSizeIterator<Item = TypeDef<'_>> + '_ {
        self.rows()
    }

    /// All `Field` rows in physical order.
    pub fn fields(&self) -> impl ExactSizeIterator<Item = Field<'_>> + '_ {
        self.rows()
    }

    /// All `MethodDef` rows in physical order.
    pub fn method_defs(&self) -> impl ExactSizeIterator<Item = MethodDef<'_>> + '_ {
        self.rows()
    }

    /// All `Param` rows in physical order.
    pub fn params(&self) -> impl ExactSizeIterator<Item = Param<'_>> + '_ {
        self.rows()
    }

    /// All `MemberRef` rows.
    pub fn member_refs(&self) -> impl ExactSizeIterator<Item = MemberRef<'_>> + '_ {
        self.rows()
    }

    /// All `Event` rows in physical order.
    pub fn events(&self) -> impl ExactSizeIterator<Item = Event<'_>> + '_ {
        self.rows()
    }

    /// All `Property` rows in physical order.
    pub fn properties(&self) -> impl ExactSizeIterator<Item = Property<'_>> + '_ {
        self.rows()
    }

    /// All `StandAloneSig` rows.
    pub fn stand_alone_sigs(&self) -> impl ExactSizeIterator<Item = StandAloneSig<'_>> + '_ {
        self.rows()
    }

    /// All `ModuleRef` rows.
    pub fn module_refs(&self) -> impl ExactSizeIterator<Item = ModuleRef<'_>> + '_ {
        self.rows()
    }

    /// All `TypeSpec` rows.
    pub fn type_specs(&self) -> impl ExactSizeIterator<Item = TypeSpec<'_>> + '_ {
        self.rows()
    }

    /// All `AssemblyRef` rows.
    pub fn assembly_refs(&self) -> impl ExactSizeIterator<Item = AssemblyRef<'_>> + '_ {
        self.rows()
    }

    /// All `File` rows.
    pub fn files(&self) -> impl ExactSizeIterator<Item = FileDef<'_>> + '_ {
        self.rows()
    }

    /// All `ExportedType` rows.
    pub fn exported_types(&self) -> impl ExactSizeIterator<Item = ExportedType<'_>> + '_ {
        self.rows()
    }

    /// All `ManifestResource` rows.
    pub fn manifest_resources(&self) -> impl ExactSizeIterator<Item = ManifestResource<'_>> + '_ {
        self.rows()
    }

    /// All `MethodSpec` rows.
    pub fn method_specs(&self) -> impl ExactSizeIterator<Item = MethodSpec<'_>> + '_ {
        self.rows()
    }

    /// All `CustomAttribute` rows.
    pub fn all_custom_attributes(
        &self,
    ) -> impl ExactSizeIterator<Item = CustomAttribute<'_>> + '_ {
        self.rows()
    }

    /// Number of entries addressable by a list column into `target`: the pointer table's rows
    /// when it is present, otherwise the target's own.
    fn list_len(&self, target: TableId) -> u32 {
        match target.pointer_table() {
            Some(pointer) if self.row_count(pointer) > 0 => self.row_count(pointer),
            _ => self.row_count(target),
        }
    }

    /// The logical run of list `column` owned by row `rid` of `owner`.
    ///
    /// The run ends where the next owner's run starts, or after the last entry for the last
    /// owner. Both ends are clamped to the list, so a damaged start never yields rows outside
    /// the table.
    ///
    /// # Errors
    /// Returns an error if `column` is not a list column or `rid` is not a row of `owner`.
    pub fn owned_range(&self, owner: TableId, rid: u32, column: usize) -> Result<Range<u32>> {
        let target = list_target(owner, column)?;
        let table = self.table(owner);
        let limit = self.list_len(target) + 1;

        let start = table.column(rid, column)?.clamp(1, limit);
        let end = if rid < table.row_count() {
            table.column(rid + 1, column)?
        } else {
            limit
        };

        Ok(start..end.clamp(start, limit))
    }

    /// Map logical entry `logical` of a list into `target` to its physical row.
    ///
    /// # Errors
    /// Returns an error if the pointer table entry cannot be read.
    pub fn resolve_list_entry(&self, target: TableId, logical: u32) -> Result<u32> {
        match target.pointer_table() {
            Some(pointer) if self.row_count(pointer) > 0 => self.table(pointer).column(logical, 0),
            _ => Ok(logical),
        }
    }

    /// Map physical row `physical` of `target` to its position in the owners' lists.
    ///
    /// Without a pointer table both are the same. With one, the pointer table is scanned for
    /// the entry naming `physical`.
    ///
    /// # Errors
    /// Returns an error if the pointer table cannot be read.
    pub fn logical_list_entry(&self, target: TableId, physical: u32) -> Result<Option<u32>> {
        match target.pointer_table() {
            Some(pointer) if self.row_count(pointer) > 0 => {
                let matches = search::linear_matches(self.table(pointer), 0, physical)?;
                Ok(matches.first().copied())
            }
            _ => Ok(Some(physical)),
        }
    }

    /// The typed children owned by row `rid` of `owner` through list `column`.
    ///
    /// # Errors
    /// See [`MetadataTables::owned_range`].
    pub fn owned<'t, T: RecordView<'t>>(
        &'t self,
        owner: TableId,
        rid: u32,
        column: usize,
    ) -> Result<Vec<T>> {
        let range = self.owned_range(owner, rid, column)?;

        let mut children = Vec::with_capacity(range.len());
        for logical in range {
            let physical = self.resolve_list_entry(T::TABLE, logical)?;
            children.push(self.get::<T>(physical)?);
        }

        Ok(children)
    }

    /// The row of `owner` whose list `column` run contains physical row `physical`.
    ///
    /// # Errors
    /// Returns an error if `column` is not a list column or a row cannot be read.
    pub fn owner_of(&self, owner: TableId, column: usize, physical: u32) -> Result<Option<u32>> {
        let target = list_target(owner, column)?;

        let Some(logical) = self.logical_list_entry(target, physical)? else {
            return Ok(None);
        };
        if logical == 0 || logical > self.list_len(target) {
            return Ok(None);
        }

        search::owner_of(self.table(owner), column, logical)
    }

    /// Rows of `T::TABLE` whose sorted key column references `token`.
    ///
    /// # Errors
    /// Returns an error if a row cannot be read.
    pub fn find_by_key<'t, T: RecordView<'t>>(&'t self, token: Token) -> Result<Vec<T>> {
        let Some(column) = key_column(T::TABLE) else {
            return Err(malformed_error!("Table {:?} has no key column", T::TABLE));
        };

        self.find_by_column(token, column)
    }

    /// Rows of `T::TABLE` whose `column` references `token`.
    ///
    /// Uses a binary search when `column` is the sorted key of a table marked sorted, and a
    /// linear scan otherwise. A token of a table the column cannot reference matches nothing.
    ///
    /// # Errors
    /// Returns an error if a row cannot be read.
    pub fn find_by_column<'t, T: RecordView<'t>>(
        &'t self,
        token: Token,
        column: usize,
    ) -> Result<Vec<T>> {
        let Some(value) = column_value(T::TABLE, column, token) else {
            return Ok(Vec::new());
        };

        let table = self.table(T::TABLE);
        let rids: Vec<u32> = if key_column(T::TABLE) == Some(column) && table.is_sorted() {
            search::equal_range(table, column, value)?.collect()
        } else {
            if key_column(T::TABLE) == Some(column) {
                debug!(
                    "Linear scan of unsorted {:?} for {}",
                    T::TABLE,
                    token
                );
            }
            search::linear_matches(table, column, value)?
        };

        Ok(rids
            .into_iter()
            .map(|rid| T::wrap(Record::new(self, T::TABLE, rid)))
            .collect())
    }

    fn find_one<'t, T: RecordView<'t>>(&'t self, token: Token) -> Result<Option<T>> {
        Ok(self.find_by_key::<T>(token)?.into_iter().next())
    }

    /// Custom attributes attached to `token`.
    ///
    /// # Errors
    /// Returns an error if the table cannot be read.
    pub fn custom_attributes(&self, token: Token) -> Result<Vec<CustomAttribute<'_>>> {
        self.find_by_key(token)
    }

    /// The default value of a field, parameter or property.
    ///
    /// # Errors
    /// Returns an error if the table cannot be read.
    pub fn constant(&self, token: Token) -> Result<Option<Constant<'_>>> {
        self.find_one(token)
    }

    /// The marshalling descriptor of a field or parameter.
    ///
    /// # Errors
    /// Returns an error if the table cannot be read.
    pub fn field_marshal(&self, token: Token) -> Result<Option<FieldMarshal<'_>>> {
        self.find_one(token)
    }

    /// Security declarations of a type, method or assembly.
    ///
    /// # Errors
    /// Returns an error if the table cannot be read.
    pub fn decl_security(&self, token: Token) -> Result<Vec<DeclSecurity<'_>>> {
        self.find_by_key(token)
    }

    /// Accessor methods of an event or property.
    ///
    /// # Errors
    /// Returns an error if the table cannot be read.
    pub fn method_semantics(&self, token: Token) -> Result<Vec<MethodSemantics<'_>>> {
        self.find_by_key(token)
    }

    /// Generic parameters of a type or method, ordered by number.
    ///
    /// # Errors
    /// Returns an error if the table cannot be read.
    pub fn generic_params(&self, token: Token) -> Result<Vec<GenericParam<'_>>> {
        self.find_by_key(token)
    }

    /// The P/Invoke mapping of a field or method.
    ///
    /// # Errors
    /// Returns an error if the table cannot be read.
    pub fn impl_map(&self, token: Token) -> Result<Option<ImplMap<'_>>> {
        self.find_one(token)
    }

    /// The explicit layout of a type.
    ///
    /// # Errors
    /// Returns an error if the table cannot be read.
    pub fn class_layout(&self, token: Token) -> Result<Option<ClassLayout<'_>>> {
        self.find_one(token)
    }

    /// The explicit offset of a field.
    ///
    /// # Errors
    /// Returns an error if the table cannot be read.
    pub fn field_layout(&self, token: Token) -> Result<Option<FieldLayout<'_>>> {
        self.find_one(token)
    }

    /// The initial data RVA of a field.
    ///
    /// # Errors
    /// Returns an error if the table cannot be read.
    pub fn field_rva(&self, token: Token) -> Result<Option<FieldRva<'_>>> {
        self.find_one(token)
    }

    /// Types nested directly inside `token`.
    ///
    /// `NestedClass` is sorted by the nested type, so this is a linear scan.
    ///
    /// # Errors
    /// Returns an error if the table cannot be read.
    pub fn nested_classes(&self, token: Token) -> Result<Vec<NestedClass<'_>>> {
        self.find_by_column(token, 1)
    }

    /// The type `token` is nested in.
    ///
    /// # Errors
    /// Returns an error if the tables cannot be read.
    pub fn enclosing_class(&self, token: Token) -> Result<Option<TypeDef<'_>>> {
        match self.find_one::<NestedClass>(token)? {
            Some(nesting) => nesting.enclosing_class().map(Some),
            None => Ok(None),
        }
    }

    /// Interfaces implemented by a type.
    ///
    /// # Errors
    /// Returns an error if the table cannot be read.
    pub fn interface_impls(&self, token: Token) -> Result<Vec<InterfaceImpl<'_>>> {
        self.find_by_key(token)
    }

    /// Method overrides declared by a type.
    ///
    /// # Errors
    /// Returns an error if the table cannot be read.
    pub fn method_impls(&self, token: Token) -> Result<Vec<MethodImpl<'_>>> {
        self.find_by_key(token)
    }

    /// Constraints of a generic parameter.
    ///
    /// # Errors
    /// Returns an error if the table cannot be read.
    pub fn generic_param_constraints(
        &self,
        token: Token,
    ) -> Result<Vec<GenericParamConstraint<'_>>> {
        self.find_by_key(token)
    }

    /// Iterate over the ids of all tables that hold rows.
    pub fn present_tables(&self) -> impl Iterator<Item = TableId> + '_ {
        TableId::iter().filter(|&id| self.row_count(id) > 0)
    }
}

/// The table a list column points into.
fn list_target(owner: TableId, column: usize) -> Result<TableId> {
    match column_kind(owner, column) {
        Some(ColumnKind::Table(
            target @ (TableId::Field
            | TableId::MethodDef
            | TableId::Param
            | TableId::Event
            | TableId::Property),
        )) => Ok(target),
        _ => Err(malformed_error!(
            "Column {} of {:?} is not a list column",
            column,
            owner
        )),
    }
}

/// The raw value `column` of `table` stores for a reference to `token`, if it can hold one.
fn column_value(table: TableId, column: usize, token: Token) -> Option<u32> {
    let target = token.table_id()?;
    match column_kind(table, column)? {
        ColumnKind::Coded(kind) => kind.encode(target, token.row()).ok(),
        ColumnKind::Table(expected) if expected == target => Some(token.row()),
        _ => None,
    }
}

fn column_kind(table: TableId, column: usize) -> Option<ColumnKind> {
    schema(table).get(column).map(|column| column.kind)
}

fn stream_data<'a>(metadata: &'a [u8], header: &StreamHeader) -> Result<&'a [u8]> {
    let start = header.offset as usize;
    let end = start
        .checked_add(header.size as usize)
        .ok_or(OutOfBounds)?;

    metadata.get(start..end).ok_or_else(|| {
        malformed_error!(
            "Stream '{}' ({} bytes at {}) exceeds the metadata directory",
            header.name,
            header.size,
            header.offset
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        metadata::tables::{CodedIndexType, TableId},
        test::{ImageBuilder, TestTables},
        ModuleView,
    };

    #[test]
    fn facade_basics() {
        let view = ModuleView::from_mem(ImageBuilder::new().build()).unwrap();
        let tables = view.tables();

        assert!(!tables.is_uncompressed());
        assert_eq!(tables.row_count(TableId::Module), 1);
        assert_eq!(tables.row_count(TableId::TypeDef), 4);
        assert!(tables.present_tables().any(|id| id == TableId::MethodDef));
        assert_eq!(tables.module().unwrap().name().unwrap(), "Sample.dll");
        assert_eq!(tables.assembly().unwrap().name().unwrap(), "Sample");
        assert_eq!(tables.type_defs().len(), 4);

        assert!(tables.record(Token(0x0200_0000)).is_err());
        assert!(tables.record(Token(0x0200_0005)).is_err());
        assert!(tables.record(Token(0x7F00_0001)).is_err());
        assert!(tables.try_record(Token(0x0200_0000)).unwrap().is_none());
        assert!(tables.try_record(Token(0x0200_0001)).unwrap().is_some());
        assert!(tables.get::<TypeDef>(0).is_err());
        assert!(tables.try_get::<TypeDef>(0).unwrap().is_none());
    }

    #[test]
    fn owning_ranges() {
        let view = ModuleView::from_mem(ImageBuilder::new().build()).unwrap();
        let tables = view.tables();

        // FieldList starts 1, 1, 3, 3 over 3 fields: owner 1 is empty, owner 4 has field 3
        assert!(tables.owned_range(TableId::TypeDef, 1, 4).unwrap().is_empty());
        assert_eq!(tables.owned_range(TableId::TypeDef, 2, 4).unwrap(), 1..3);
        assert!(tables.owned_range(TableId::TypeDef, 3, 4).unwrap().is_empty());
        assert_eq!(tables.owned_range(TableId::TypeDef, 4, 4).unwrap(), 3..4);

        assert!(tables.owned_range(TableId::TypeDef, 1, 1).is_err());
        assert!(tables.owned_range(TableId::TypeDef, 9, 4).is_err());

        assert_eq!(tables.owner_of(TableId::TypeDef, 4, 1).unwrap(), Some(2));
        assert_eq!(tables.owner_of(TableId::TypeDef, 4, 2).unwrap(), Some(2));
        assert_eq!(tables.owner_of(TableId::TypeDef, 4, 3).unwrap(), Some(4));
        assert_eq!(tables.owner_of(TableId::TypeDef, 4, 4).unwrap(), None);
    }

    #[test]
    fn pointer_tables_are_followed() {
        let image = ImageBuilder::new()
            .tables(TestTables::sample().with_field_ptr(&[3, 1, 2]))
            .build();
        let view = ModuleView::from_mem(image).unwrap();
        let tables = view.tables();

        let owned: Vec<u32> = tables
            .owned::<Field>(TableId::TypeDef, 2, 4)
            .unwrap()
            .iter()
            .map(|field| field.rid())
            .collect();
        assert_eq!(owned, vec![3, 1]);

        // physical 2 sits at logical 3, owned by the last type
        assert_eq!(tables.owner_of(TableId::TypeDef, 4, 2).unwrap(), Some(4));
        assert_eq!(tables.owner_of(TableId::TypeDef, 4, 3).unwrap(), Some(2));
    }

    #[test]
    fn keyed_lookups() {
        let view = ModuleView::from_mem(ImageBuilder::new().build()).unwrap();
        let tables = view.tables();

        let program = Token(0x0200_0002);
        let attributes = tables.custom_attributes(program).unwrap();
        assert_eq!(attributes.len(), 2);
        assert!(attributes.iter().all(|ca| ca.parent().unwrap().token == program));

        let assembly = Token(0x2000_0001);
        assert_eq!(tables.custom_attributes(assembly).unwrap().len(), 1);
        assert!(tables.custom_attributes(Token(0x0200_0003)).unwrap().is_empty());

        // Module cannot carry a constant
        assert!(tables.constant(Token(0x0000_0001)).unwrap().is_none());

        let nested = tables.nested_classes(program).unwrap();
        assert_eq!(nested.len(), 1);
        assert_eq!(nested[0].nested_class().unwrap().rid(), 3);
        assert_eq!(
            tables
                .enclosing_class(Token(0x0200_0003))
                .unwrap()
                .unwrap()
                .rid(),
            2
        );
        assert!(tables.enclosing_class(program).unwrap().is_none());

        let encoded = CodedIndexType::HasCustomAttribute
            .encode(TableId::TypeDef, 2)
            .unwrap();
        assert_eq!(
            column_value(TableId::CustomAttribute, 0, program),
            Some(encoded)
        );
        assert_eq!(column_value(TableId::NestedClass, 1, Token(0x0100_0001)), None);
    }

    #[test]
    fn unsorted_tables() {
        let image = ImageBuilder::new()
            .tables(TestTables::sample().unsorted(TableId::CustomAttribute))
            .build();

        let view = ModuleView::from_mem(image.clone()).unwrap();
        let tables = view.tables();
        assert!(!tables.is_sorted(TableId::CustomAttribute));
        assert_eq!(tables.custom_attributes(Token(0x0200_0002)).unwrap().len(), 2);

        assert!(ModuleView::from_mem_with(image, LoadOptions::strict()).is_err());
    }

    #[test]
    fn heaps() {
        let view = ModuleView::from_mem(ImageBuilder::new().build()).unwrap();
        let tables = view.tables();

        assert_eq!(tables.string_at(0).unwrap(), "");
        assert!(tables.blob_at(0).unwrap().is_empty());
        assert_eq!(tables.guid_at(0).unwrap(), uguid::Guid::ZERO);
        assert!(tables.guid_at(2).is_err());
        assert_eq!(tables.user_string_at(1).unwrap(), "Hello");
    }
}
