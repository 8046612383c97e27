use strum::{EnumCount, EnumIter, IntoEnumIterator};

/// Identifiers of the metadata tables defined by ECMA-335 Partition II, Section 22.
///
/// The discriminant is the table number used in the valid/sorted bit masks of the table stream
/// header and in the high byte of a [`crate::metadata::token::Token`]. All 45 kinds of a
/// module's table stream are covered, including the pointer tables (`FieldPtr`, `MethodPtr`,
/// `ParamPtr`, `EventPtr`, `PropertyPtr`) written by edit-and-continue compilers and the
/// `EncLog`/`EncMap` tables.
///
/// ## Reference
/// * ECMA-335 Partition II, Section 22 - Metadata Tables
#[derive(Clone, Copy, PartialEq, Debug, EnumIter, EnumCount, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
#[allow(missing_docs)]
pub enum TableId {
    Module = 0x00,
    TypeRef = 0x01,
    TypeDef = 0x02,
    FieldPtr = 0x03,
    Field = 0x04,
    MethodPtr = 0x05,
    MethodDef = 0x06,
    ParamPtr = 0x07,
    Param = 0x08,
    InterfaceImpl = 0x09,
    MemberRef = 0x0A,
    Constant = 0x0B,
    CustomAttribute = 0x0C,
    FieldMarshal = 0x0D,
    DeclSecurity = 0x0E,
    ClassLayout = 0x0F,
    FieldLayout = 0x10,
    StandAloneSig = 0x11,
    EventMap = 0x12,
    EventPtr = 0x13,
    Event = 0x14,
    PropertyMap = 0x15,
    PropertyPtr = 0x16,
    Property = 0x17,
    MethodSemantics = 0x18,
    MethodImpl = 0x19,
    ModuleRef = 0x1A,
    TypeSpec = 0x1B,
    ImplMap = 0x1C,
    FieldRVA = 0x1D,
    EncLog = 0x1E,
    EncMap = 0x1F,
    Assembly = 0x20,
    AssemblyProcessor = 0x21,
    AssemblyOS = 0x22,
    AssemblyRef = 0x23,
    AssemblyRefProcessor = 0x24,
    AssemblyRefOS = 0x25,
    File = 0x26,
    ExportedType = 0x27,
    ManifestResource = 0x28,
    NestedClass = 0x29,
    GenericParam = 0x2A,
    MethodSpec = 0x2B,
    GenericParamConstraint = 0x2C,
}

/// Tables ECMA-335 requires to be sorted by their key column (II.22, "sorted" remarks).
const SORTED_TABLES: [TableId; 14] = [
    TableId::InterfaceImpl,
    TableId::Constant,
    TableId::CustomAttribute,
    TableId::FieldMarshal,
    TableId::DeclSecurity,
    TableId::ClassLayout,
    TableId::FieldLayout,
    TableId::MethodSemantics,
    TableId::MethodImpl,
    TableId::ImplMap,
    TableId::FieldRVA,
    TableId::NestedClass,
    TableId::GenericParam,
    TableId::GenericParamConstraint,
];

impl TableId {
    /// Highest table number of a module's table stream.
    pub const MAX: u8 = TableId::GenericParamConstraint as u8;

    /// Look a table up by its number.
    #[must_use]
    pub fn from_u8(value: u8) -> Option<TableId> {
        if value > Self::MAX {
            return None;
        }

        TableId::iter().nth(usize::from(value))
    }

    /// The token value of row 0 of this table.
    #[must_use]
    pub fn token_base(self) -> u32 {
        u32::from(self as u8) << 24
    }

    /// Returns `true` if ECMA-335 requires this table to be sorted by its key column.
    #[must_use]
    pub fn requires_sorting(self) -> bool {
        SORTED_TABLES.contains(&self)
    }

    /// The pointer table that may indirect rows of this table.
    #[must_use]
    pub fn pointer_table(self) -> Option<TableId> {
        match self {
            TableId::Field => Some(TableId::FieldPtr),
            TableId::MethodDef => Some(TableId::MethodPtr),
            TableId::Param => Some(TableId::ParamPtr),
            TableId::Event => Some(TableId::EventPtr),
            TableId::Property => Some(TableId::PropertyPtr),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbering_is_dense() {
        assert_eq!(TableId::COUNT, 45);

        for (index, table) in TableId::iter().enumerate() {
            assert_eq!(table as usize, index);
            assert_eq!(TableId::from_u8(index as u8), Some(table));
        }

        assert_eq!(TableId::from_u8(0x2D), None);
        assert_eq!(TableId::from_u8(0xFF), None);
    }

    #[test]
    fn token_base() {
        assert_eq!(TableId::Module.token_base(), 0);
        assert_eq!(TableId::MethodDef.token_base(), 0x0600_0000);
        assert_eq!(TableId::GenericParamConstraint.token_base(), 0x2C00_0000);
    }

    #[test]
    fn pointers_and_sorting() {
        assert_eq!(TableId::Param.pointer_table(), Some(TableId::ParamPtr));
        assert_eq!(TableId::TypeDef.pointer_table(), None);
        assert!(TableId::CustomAttribute.requires_sorting());
        assert!(!TableId::TypeDef.requires_sorting());
    }
}
