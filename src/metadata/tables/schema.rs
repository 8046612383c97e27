//! Static column schemas of the metadata tables (ECMA-335 II.22).
//!
//! Every table is described by its columns in on-disk order. A column is either a fixed-size
//! constant or one of three index kinds whose width depends on the image: a heap offset, a row
//! reference into a single table, or a coded index. [`crate::metadata::tables::TableInfo`] turns
//! the kinds into byte widths once all row counts are known.

use crate::metadata::tables::{CodedIndexType, TableId};

/// The heaps a column can point into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HeapKind {
    /// `#Strings`
    Strings,
    /// `#GUID`
    Guid,
    /// `#Blob`
    Blob,
}

/// What a column stores, and therefore how wide it is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ColumnKind {
    /// A constant of 1, 2 or 4 bytes
    Fixed(u8),
    /// An offset into a heap
    Heap(HeapKind),
    /// A row id of a single table
    Table(TableId),
    /// A coded index
    Coded(CodedIndexType),
}

/// A named column of a table schema.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Column {
    /// ECMA-335 column name
    pub name: &'static str,
    /// The kind of data stored
    pub kind: ColumnKind,
}

const fn fixed(name: &'static str, width: u8) -> Column {
    Column {
        name,
        kind: ColumnKind::Fixed(width),
    }
}

const fn string(name: &'static str) -> Column {
    Column {
        name,
        kind: ColumnKind::Heap(HeapKind::Strings),
    }
}

const fn guid(name: &'static str) -> Column {
    Column {
        name,
        kind: ColumnKind::Heap(HeapKind::Guid),
    }
}

const fn blob(name: &'static str) -> Column {
    Column {
        name,
        kind: ColumnKind::Heap(HeapKind::Blob),
    }
}

const fn table(name: &'static str, target: TableId) -> Column {
    Column {
        name,
        kind: ColumnKind::Table(target),
    }
}

const fn coded(name: &'static str, kind: CodedIndexType) -> Column {
    Column {
        name,
        kind: ColumnKind::Coded(kind),
    }
}

const MODULE: &[Column] = &[
    fixed("Generation", 2),
    string("Name"),
    guid("Mvid"),
    guid("EncId"),
    guid("EncBaseId"),
];

const TYPE_REF: &[Column] = &[
    coded("ResolutionScope", CodedIndexType::ResolutionScope),
    string("TypeName"),
    string("TypeNamespace"),
];

const TYPE_DEF: &[Column] = &[
    fixed("Flags", 4),
    string("TypeName"),
    string("TypeNamespace"),
    coded("Extends", CodedIndexType::TypeDefOrRef),
    table("FieldList", TableId::Field),
    table("MethodList", TableId::MethodDef),
];

const FIELD_PTR: &[Column] = &[table("Field", TableId::Field)];

const FIELD: &[Column] = &[fixed("Flags", 2), string("Name"), blob("Signature")];

const METHOD_PTR: &[Column] = &[table("Method", TableId::MethodDef)];

const METHOD_DEF: &[Column] = &[
    fixed("RVA", 4),
    fixed("ImplFlags", 2),
    fixed("Flags", 2),
    string("Name"),
    blob("Signature"),
    table("ParamList", TableId::Param),
];

const PARAM_PTR: &[Column] = &[table("Param", TableId::Param)];

const PARAM: &[Column] = &[fixed("Flags", 2), fixed("Sequence", 2), string("Name")];

const INTERFACE_IMPL: &[Column] = &[
    table("Class", TableId::TypeDef),
    coded("Interface", CodedIndexType::TypeDefOrRef),
];

const MEMBER_REF: &[Column] = &[
    coded("Class", CodedIndexType::MemberRefParent),
    string("Name"),
    blob("Signature"),
];

const CONSTANT: &[Column] = &[
    fixed("Type", 1),
    fixed("Padding", 1),
    coded("Parent", CodedIndexType::HasConstant),
    blob("Value"),
];

const CUSTOM_ATTRIBUTE: &[Column] = &[
    coded("Parent", CodedIndexType::HasCustomAttribute),
    coded("Type", CodedIndexType::CustomAttributeType),
    blob("Value"),
];

const FIELD_MARSHAL: &[Column] = &[
    coded("Parent", CodedIndexType::HasFieldMarshal),
    blob("NativeType"),
];

const DECL_SECURITY: &[Column] = &[
    fixed("Action", 2),
    coded("Parent", CodedIndexType::HasDeclSecurity),
    blob("PermissionSet"),
];

const CLASS_LAYOUT: &[Column] = &[
    fixed("PackingSize", 2),
    fixed("ClassSize", 4),
    table("Parent", TableId::TypeDef),
];

const FIELD_LAYOUT: &[Column] = &[fixed("Offset", 4), table("Field", TableId::Field)];

const STAND_ALONE_SIG: &[Column] = &[blob("Signature")];

const EVENT_MAP: &[Column] = &[
    table("Parent", TableId::TypeDef),
    table("EventList", TableId::Event),
];

const EVENT_PTR: &[Column] = &[table("Event", TableId::Event)];

const EVENT: &[Column] = &[
    fixed("EventFlags", 2),
    string("Name"),
    coded("EventType", CodedIndexType::TypeDefOrRef),
];

const PROPERTY_MAP: &[Column] = &[
    table("Parent", TableId::TypeDef),
    table("PropertyList", TableId::Property),
];

const PROPERTY_PTR: &[Column] = &[table("Property", TableId::Property)];

const PROPERTY: &[Column] = &[fixed("Flags", 2), string("Name"), blob("Type")];

const METHOD_SEMANTICS: &[Column] = &[
    fixed("Semantics", 2),
    table("Method", TableId::MethodDef),
    coded("Association", CodedIndexType::HasSemantics),
];

const METHOD_IMPL: &[Column] = &[
    table("Class", TableId::TypeDef),
    coded("MethodBody", CodedIndexType::MethodDefOrRef),
    coded("MethodDeclaration", CodedIndexType::MethodDefOrRef),
];

const MODULE_REF: &[Column] = &[string("Name")];

const TYPE_SPEC: &[Column] = &[blob("Signature")];

const IMPL_MAP: &[Column] = &[
    fixed("MappingFlags", 2),
    coded("MemberForwarded", CodedIndexType::MemberForwarded),
    string("ImportName"),
    table("ImportScope", TableId::ModuleRef),
];

const FIELD_RVA: &[Column] = &[fixed("RVA", 4), table("Field", TableId::Field)];

const ENC_LOG: &[Column] = &[fixed("Token", 4), fixed("FuncCode", 4)];

const ENC_MAP: &[Column] = &[fixed("Token", 4)];

const ASSEMBLY: &[Column] = &[
    fixed("HashAlgId", 4),
    fixed("MajorVersion", 2),
    fixed("MinorVersion", 2),
    fixed("BuildNumber", 2),
    fixed("RevisionNumber", 2),
    fixed("Flags", 4),
    blob("PublicKey"),
    string("Name"),
    string("Culture"),
];

const ASSEMBLY_PROCESSOR: &[Column] = &[fixed("Processor", 4)];

const ASSEMBLY_OS: &[Column] = &[
    fixed("OSPlatformID", 4),
    fixed("OSMajorVersion", 4),
    fixed("OSMinorVersion", 4),
];

const ASSEMBLY_REF: &[Column] = &[
    fixed("MajorVersion", 2),
    fixed("MinorVersion", 2),
    fixed("BuildNumber", 2),
    fixed("RevisionNumber", 2),
    fixed("Flags", 4),
    blob("PublicKeyOrToken"),
    string("Name"),
    string("Culture"),
    blob("HashValue"),
];

const ASSEMBLY_REF_PROCESSOR: &[Column] = &[
    fixed("Processor", 4),
    table("AssemblyRef", TableId::AssemblyRef),
];

const ASSEMBLY_REF_OS: &[Column] = &[
    fixed("OSPlatformID", 4),
    fixed("OSMajorVersion", 4),
    fixed("OSMinorVersion", 4),
    table("AssemblyRef", TableId::AssemblyRef),
];

const FILE: &[Column] = &[fixed("Flags", 4), string("Name"), blob("HashValue")];

const EXPORTED_TYPE: &[Column] = &[
    fixed("Flags", 4),
    fixed("TypeDefId", 4),
    string("TypeName"),
    string("TypeNamespace"),
    coded("Implementation", CodedIndexType::Implementation),
];

const MANIFEST_RESOURCE: &[Column] = &[
    fixed("Offset", 4),
    fixed("Flags", 4),
    string("Name"),
    coded("Implementation", CodedIndexType::Implementation),
];

const NESTED_CLASS: &[Column] = &[
    table("NestedClass", TableId::TypeDef),
    table("EnclosingClass", TableId::TypeDef),
];

const GENERIC_PARAM: &[Column] = &[
    fixed("Number", 2),
    fixed("Flags", 2),
    coded("Owner", CodedIndexType::TypeOrMethodDef),
    string("Name"),
];

const METHOD_SPEC: &[Column] = &[
    coded("Method", CodedIndexType::MethodDefOrRef),
    blob("Instantiation"),
];

const GENERIC_PARAM_CONSTRAINT: &[Column] = &[
    table("Owner", TableId::GenericParam),
    coded("Constraint", CodedIndexType::TypeDefOrRef),
];

/// The column schema of `table` in ECMA-335 order.
#[must_use]
pub fn schema(table: TableId) -> &'static [Column] {
    match table {
        TableId::Module => MODULE,
        TableId::TypeRef => TYPE_REF,
        TableId::TypeDef => TYPE_DEF,
        TableId::FieldPtr => FIELD_PTR,
        TableId::Field => FIELD,
        TableId::MethodPtr => METHOD_PTR,
        TableId::MethodDef => METHOD_DEF,
        TableId::ParamPtr => PARAM_PTR,
        TableId::Param => PARAM,
        TableId::InterfaceImpl => INTERFACE_IMPL,
        TableId::MemberRef => MEMBER_REF,
        TableId::Constant => CONSTANT,
        TableId::CustomAttribute => CUSTOM_ATTRIBUTE,
        TableId::FieldMarshal => FIELD_MARSHAL,
        TableId::DeclSecurity => DECL_SECURITY,
        TableId::ClassLayout => CLASS_LAYOUT,
        TableId::FieldLayout => FIELD_LAYOUT,
        TableId::StandAloneSig => STAND_ALONE_SIG,
        TableId::EventMap => EVENT_MAP,
        TableId::EventPtr => EVENT_PTR,
        TableId::Event => EVENT,
        TableId::PropertyMap => PROPERTY_MAP,
        TableId::PropertyPtr => PROPERTY_PTR,
        TableId::Property => PROPERTY,
        TableId::MethodSemantics => METHOD_SEMANTICS,
        TableId::MethodImpl => METHOD_IMPL,
        TableId::ModuleRef => MODULE_REF,
        TableId::TypeSpec => TYPE_SPEC,
        TableId::ImplMap => IMPL_MAP,
        TableId::FieldRVA => FIELD_RVA,
        TableId::EncLog => ENC_LOG,
        TableId::EncMap => ENC_MAP,
        TableId::Assembly => ASSEMBLY,
        TableId::AssemblyProcessor => ASSEMBLY_PROCESSOR,
        TableId::AssemblyOS => ASSEMBLY_OS,
        TableId::AssemblyRef => ASSEMBLY_REF,
        TableId::AssemblyRefProcessor => ASSEMBLY_REF_PROCESSOR,
        TableId::AssemblyRefOS => ASSEMBLY_REF_OS,
        TableId::File => FILE,
        TableId::ExportedType => EXPORTED_TYPE,
        TableId::ManifestResource => MANIFEST_RESOURCE,
        TableId::NestedClass => NESTED_CLASS,
        TableId::GenericParam => GENERIC_PARAM,
        TableId::MethodSpec => METHOD_SPEC,
        TableId::GenericParamConstraint => GENERIC_PARAM_CONSTRAINT,
    }
}

/// The column sorted tables are keyed on (ECMA-335 II.22 "sorted" remarks).
#[must_use]
pub fn key_column(table: TableId) -> Option<usize> {
    match table {
        TableId::Constant
        | TableId::ClassLayout
        | TableId::MethodSemantics
        | TableId::GenericParam => Some(2),
        TableId::FieldMarshal
        | TableId::CustomAttribute
        | TableId::InterfaceImpl
        | TableId::MethodImpl
        | TableId::NestedClass
        | TableId::GenericParamConstraint => Some(0),
        TableId::DeclSecurity
        | TableId::ImplMap
        | TableId::FieldLayout
        | TableId::FieldRVA => Some(1),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn every_table_has_columns() {
        for id in TableId::iter() {
            let columns = schema(id);
            assert!(!columns.is_empty(), "{:?}", id);

            for column in columns {
                if let ColumnKind::Fixed(width) = column.kind {
                    assert!(matches!(width, 1 | 2 | 4), "{:?}.{}", id, column.name);
                }
            }
        }
    }

    #[test]
    fn sorted_tables_have_key() {
        for id in TableId::iter() {
            assert_eq!(id.requires_sorting(), key_column(id).is_some(), "{:?}", id);
            if let Some(key) = key_column(id) {
                assert!(key < schema(id).len());
                assert!(!matches!(schema(id)[key].kind, ColumnKind::Fixed(_)));
            }
        }
    }

    #[test]
    fn spot_check() {
        assert_eq!(schema(TableId::TypeDef)[4].name, "FieldList");
        assert_eq!(
            schema(TableId::CustomAttribute)[1].kind,
            ColumnKind::Coded(CodedIndexType::CustomAttributeType)
        );
        assert_eq!(schema(TableId::Assembly).len(), 9);
        assert_eq!(schema(TableId::AssemblyRef).len(), 9);
    }
}
