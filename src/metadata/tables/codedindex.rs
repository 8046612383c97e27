//! Coded indexes (ECMA-335 II.24.2.6).
//!
//! A coded index is a column that may reference rows of several tables. The low `tag_bits()`
//! bits select the target table through a fixed per-kind tag table, the remaining bits hold the
//! 1-based row id:
//!
//! ```text
//! value = (row << tag_bits) | tag
//! ```
//!
//! The tag tables are wire-format constants. `CustomAttributeType` reserves tags 0, 1 and 4,
//! which decode to an error rather than to a guessed table.

use strum::{EnumCount, EnumIter};

use crate::{
    metadata::{tables::TableId, token::Token},
    Error, Result,
};

/// The kinds of coded index defined by ECMA-335.
#[derive(Debug, Hash, Eq, PartialEq, Clone, Copy, EnumIter, EnumCount)]
#[repr(usize)]
pub enum CodedIndexType {
    /// `TypeDef`, `TypeRef` or `TypeSpec`
    TypeDefOrRef,
    /// `Field`, `Param` or `Property`
    HasConstant,
    /// Anything a custom attribute can be attached to
    HasCustomAttribute,
    /// `Field` or `Param`
    HasFieldMarshal,
    /// `TypeDef`, `MethodDef` or `Assembly`
    HasDeclSecurity,
    /// Parent of a `MemberRef`
    MemberRefParent,
    /// `Event` or `Property`
    HasSemantics,
    /// `MethodDef` or `MemberRef`
    MethodDefOrRef,
    /// `Field` or `MethodDef`
    MemberForwarded,
    /// `File`, `AssemblyRef` or `ExportedType`
    Implementation,
    /// Constructor of a custom attribute
    CustomAttributeType,
    /// Scope a `TypeRef` is resolved in
    ResolutionScope,
    /// `TypeDef` or `MethodDef`
    TypeOrMethodDef,
}

impl CodedIndexType {
    /// Target table per tag value. `None` marks a reserved tag.
    #[must_use]
    pub fn tag_tables(&self) -> &'static [Option<TableId>] {
        match self {
            CodedIndexType::TypeDefOrRef => &[
                Some(TableId::TypeDef),
                Some(TableId::TypeRef),
                Some(TableId::TypeSpec),
            ],
            CodedIndexType::HasConstant => &[
                Some(TableId::Field),
                Some(TableId::Param),
                Some(TableId::Property),
            ],
            CodedIndexType::HasCustomAttribute => &[
                Some(TableId::MethodDef),
                Some(TableId::Field),
                Some(TableId::TypeRef),
                Some(TableId::TypeDef),
                Some(TableId::Param),
                Some(TableId::InterfaceImpl),
                Some(TableId::MemberRef),
                Some(TableId::Module),
                // labelled 'Permission' in the standard; no such table exists
                Some(TableId::DeclSecurity),
                Some(TableId::Property),
                Some(TableId::Event),
                Some(TableId::StandAloneSig),
                Some(TableId::ModuleRef),
                Some(TableId::TypeSpec),
                Some(TableId::Assembly),
                Some(TableId::AssemblyRef),
                Some(TableId::File),
                Some(TableId::ExportedType),
                Some(TableId::ManifestResource),
                Some(TableId::GenericParam),
                Some(TableId::GenericParamConstraint),
                Some(TableId::MethodSpec),
            ],
            CodedIndexType::HasFieldMarshal => &[Some(TableId::Field), Some(TableId::Param)],
            CodedIndexType::HasDeclSecurity => &[
                Some(TableId::TypeDef),
                Some(TableId::MethodDef),
                Some(TableId::Assembly),
            ],
            CodedIndexType::MemberRefParent => &[
                Some(TableId::TypeDef),
                Some(TableId::TypeRef),
                Some(TableId::ModuleRef),
                Some(TableId::MethodDef),
                Some(TableId::TypeSpec),
            ],
            CodedIndexType::HasSemantics => &[Some(TableId::Event), Some(TableId::Property)],
            CodedIndexType::MethodDefOrRef => {
                &[Some(TableId::MethodDef), Some(TableId::MemberRef)]
            }
            CodedIndexType::MemberForwarded => &[Some(TableId::Field), Some(TableId::MethodDef)],
            CodedIndexType::Implementation => &[
                Some(TableId::File),
                Some(TableId::AssemblyRef),
                Some(TableId::ExportedType),
            ],
            CodedIndexType::CustomAttributeType => &[
                None,
                None,
                Some(TableId::MethodDef),
                Some(TableId::MemberRef),
                None,
            ],
            CodedIndexType::ResolutionScope => &[
                Some(TableId::Module),
                Some(TableId::ModuleRef),
                Some(TableId::AssemblyRef),
                Some(TableId::TypeRef),
            ],
            CodedIndexType::TypeOrMethodDef => &[Some(TableId::TypeDef), Some(TableId::MethodDef)],
        }
    }

    /// Number of low bits holding the tag.
    #[must_use]
    pub fn tag_bits(&self) -> u8 {
        match self {
            CodedIndexType::HasFieldMarshal
            | CodedIndexType::HasSemantics
            | CodedIndexType::MethodDefOrRef
            | CodedIndexType::MemberForwarded
            | CodedIndexType::TypeOrMethodDef => 1,
            CodedIndexType::TypeDefOrRef
            | CodedIndexType::HasConstant
            | CodedIndexType::HasDeclSecurity
            | CodedIndexType::Implementation
            | CodedIndexType::ResolutionScope => 2,
            CodedIndexType::MemberRefParent | CodedIndexType::CustomAttributeType => 3,
            CodedIndexType::HasCustomAttribute => 5,
        }
    }

    /// The tables this coded index can reference, reserved tags skipped.
    pub fn tables(&self) -> impl Iterator<Item = TableId> {
        self.tag_tables().iter().filter_map(|table| *table)
    }

    /// Encode a reference to `row` of `table`.
    ///
    /// # Errors
    /// Returns [`crate::Error::BadImageFormat`] if `table` is not a target of this kind or `row`
    /// does not fit beside the tag in 32 bits.
    pub fn encode(&self, table: TableId, row: u32) -> Result<u32> {
        let Some(tag) = self
            .tag_tables()
            .iter()
            .position(|candidate| *candidate == Some(table))
        else {
            return Err(malformed_error!(
                "{:?} cannot reference table {:?}",
                self,
                table
            ));
        };

        let bits = self.tag_bits();
        if row > (u32::MAX >> bits) {
            return Err(malformed_error!(
                "Row {} does not fit into a {:?} coded index",
                row,
                self
            ));
        }

        #[allow(clippy::cast_possible_truncation)]
        Ok((row << bits) | tag as u32)
    }

    /// Decode a raw column value.
    ///
    /// # Errors
    /// Returns [`crate::Error::BadImageFormat`] if the tag is reserved or out of range.
    pub fn decode(&self, value: u32) -> Result<CodedIndex> {
        let bits = self.tag_bits();
        let tag = (value & ((1 << bits) - 1)) as usize;
        let row = value >> bits;

        match self.tag_tables().get(tag) {
            Some(Some(table)) => Ok(CodedIndex::new(*table, row)),
            _ => Err(malformed_error!(
                "Invalid tag {} in {:?} coded index 0x{:08X}",
                tag,
                self,
                value
            )),
        }
    }
}

/// A decoded coded index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CodedIndex {
    /// The referenced table
    pub tag: TableId,
    /// The 1-based row, 0 for a null reference
    pub row: u32,
    /// The equivalent metadata token
    pub token: Token,
}

impl CodedIndex {
    /// Create a coded index pointing at `row` of `tag`.
    #[must_use]
    pub fn new(tag: TableId, row: u32) -> CodedIndex {
        CodedIndex {
            tag,
            row,
            token: Token::from_parts(tag, row),
        }
    }

    /// Returns `true` for a null reference.
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.row == 0
    }
}

impl TryFrom<Token> for CodedIndex {
    type Error = Error;

    fn try_from(token: Token) -> Result<Self> {
        match token.table_id() {
            Some(table) => Ok(CodedIndex::new(table, token.row())),
            None => Err(malformed_error!(
                "Token {} does not reference a known table",
                token
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn tag_bits_cover_tag_tables() {
        for kind in CodedIndexType::iter() {
            let tags = kind.tag_tables().len();
            assert!(tags <= 1 << kind.tag_bits(), "{:?}", kind);
            assert!(tags > 1 << (kind.tag_bits() - 1), "{:?}", kind);
        }
    }

    #[test]
    fn round_trip_every_target() {
        for kind in CodedIndexType::iter() {
            for table in kind.tables() {
                for row in [0, 1, 2, 0x7F, 0xFFFF, 0x00FF_FFFF] {
                    let encoded = kind.encode(table, row).unwrap();
                    let decoded = kind.decode(encoded).unwrap();
                    assert_eq!((decoded.tag, decoded.row), (table, row));
                }
            }
        }
    }

    #[test]
    fn known_values() {
        // TypeRef row 1 as TypeDefOrRef
        assert_eq!(
            CodedIndexType::TypeDefOrRef
                .encode(TableId::TypeRef, 1)
                .unwrap(),
            0b101
        );
        // MemberRef row 3 as CustomAttributeType
        assert_eq!(
            CodedIndexType::CustomAttributeType
                .encode(TableId::MemberRef, 3)
                .unwrap(),
            (3 << 3) | 3
        );

        let decoded = CodedIndexType::HasCustomAttribute.decode((5 << 5) | 14).unwrap();
        assert_eq!(decoded.tag, TableId::Assembly);
        assert_eq!(decoded.row, 5);
        assert_eq!(decoded.token, Token(0x2000_0005));
    }

    #[test]
    fn reserved_and_foreign() {
        assert!(CodedIndexType::CustomAttributeType.decode(0x10).is_err());
        assert!(CodedIndexType::CustomAttributeType.decode(0x11).is_err());
        assert!(CodedIndexType::CustomAttributeType.decode(0x14).is_err());
        assert!(CodedIndexType::TypeDefOrRef.decode(0x13).is_err());
        assert!(CodedIndexType::HasSemantics
            .encode(TableId::TypeDef, 1)
            .is_err());
        assert!(CodedIndexType::HasCustomAttribute
            .encode(TableId::MethodDef, u32::MAX)
            .is_err());
    }

    #[test]
    fn from_token() {
        let index = CodedIndex::try_from(Token(0x0200_0007)).unwrap();
        assert_eq!(index.tag, TableId::TypeDef);
        assert_eq!(index.row, 7);
        assert!(CodedIndex::try_from(Token(0x7F00_0001)).is_err());
        assert!(CodedIndex::new(TableId::Field, 0).is_null());
    }
}
