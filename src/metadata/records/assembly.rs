//! Views over module, assembly and manifest tables.

use std::fmt;

use crate::{
    metadata::{
        records::{Record, RecordView},
        tables::CodedIndex,
    },
    Result,
};

/// A four-part assembly version.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    /// Major version
    pub major: u16,
    /// Minor version
    pub minor: u16,
    /// Build number
    pub build: u16,
    /// Revision number
    pub revision: u16,
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.major, self.minor, self.build, self.revision
        )
    }
}

/// Read four consecutive 2-byte version columns starting at `first`.
#[allow(clippy::cast_possible_truncation)]
fn version(record: &Record<'_>, first: usize) -> Result<Version> {
    Ok(Version {
        major: record.column_at(first)? as u16,
        minor: record.column_at(first + 1)? as u16,
        build: record.column_at(first + 2)? as u16,
        revision: record.column_at(first + 3)? as u16,
    })
}

record_view! {
    /// The module itself (`0x00`), always exactly one row.
    ModuleDef => Module
}

impl<'t> ModuleDef<'t> {
    /// # Errors
    /// Returns an error if the row cannot be read.
    #[allow(clippy::cast_possible_truncation)]
    pub fn generation(&self) -> Result<u16> {
        Ok(self.0.column_at(0)? as u16)
    }

    /// # Errors
    /// Returns an error if the name cannot be resolved.
    pub fn name(&self) -> Result<&'t str> {
        self.0.string(1)
    }

    /// The module version id, unique per build.
    ///
    /// # Errors
    /// Returns an error if the GUID index is out of range.
    pub fn mvid(&self) -> Result<uguid::Guid> {
        self.0.guid(2)
    }

    /// # Errors
    /// Returns an error if the GUID index is out of range.
    pub fn enc_id(&self) -> Result<uguid::Guid> {
        self.0.guid(3)
    }

    /// # Errors
    /// Returns an error if the GUID index is out of range.
    pub fn enc_base_id(&self) -> Result<uguid::Guid> {
        self.0.guid(4)
    }
}

record_view! {
    /// A reference to another module of the same assembly or a native library (`0x1A`).
    ModuleRef => ModuleRef
}

impl<'t> ModuleRef<'t> {
    /// # Errors
    /// Returns an error if the name cannot be resolved.
    pub fn name(&self) -> Result<&'t str> {
        self.0.string(0)
    }
}

record_view! {
    /// The assembly manifest (`0x20`).
    Assembly => Assembly
}

impl<'t> Assembly<'t> {
    /// # Errors
    /// Returns an error if the row cannot be read.
    pub fn hash_algorithm(&self) -> Result<u32> {
        self.0.column_at(0)
    }

    /// # Errors
    /// Returns an error if the row cannot be read.
    pub fn version(&self) -> Result<Version> {
        version(&self.0, 1)
    }

    /// `AssemblyFlags` bits.
    ///
    /// # Errors
    /// Returns an error if the row cannot be read.
    pub fn flags(&self) -> Result<u32> {
        self.0.column_at(5)
    }

    /// # Errors
    /// Returns an error if the blob cannot be resolved.
    pub fn public_key(&self) -> Result<&'t [u8]> {
        self.0.blob(6)
    }

    /// # Errors
    /// Returns an error if the name cannot be resolved.
    pub fn name(&self) -> Result<&'t str> {
        self.0.string(7)
    }

    /// # Errors
    /// Returns an error if the culture cannot be resolved.
    pub fn culture(&self) -> Result<&'t str> {
        self.0.string(8)
    }

    /// # Errors
    /// Returns an error if `CustomAttribute` cannot be read.
    pub fn custom_attributes(&self) -> Result<Vec<CustomAttribute<'t>>> {
        self.0.tables().custom_attributes(self.token())
    }
}

record_view! {
    /// A referenced assembly (`0x23`).
    AssemblyRef => AssemblyRef
}

impl<'t> AssemblyRef<'t> {
    /// # Errors
    /// Returns an error if the row cannot be read.
    pub fn version(&self) -> Result<Version> {
        version(&self.0, 0)
    }

    /// `AssemblyFlags` bits; bit 0 tells whether the key below is a full public key.
    ///
    /// # Errors
    /// Returns an error if the row cannot be read.
    pub fn flags(&self) -> Result<u32> {
        self.0.column_at(4)
    }

    /// # Errors
    /// Returns an error if the blob cannot be resolved.
    pub fn public_key_or_token(&self) -> Result<&'t [u8]> {
        self.0.blob(5)
    }

    /// # Errors
    /// Returns an error if the name cannot be resolved.
    pub fn name(&self) -> Result<&'t str> {
        self.0.string(6)
    }

    /// # Errors
    /// Returns an error if the culture cannot be resolved.
    pub fn culture(&self) -> Result<&'t str> {
        self.0.string(7)
    }

    /// # Errors
    /// Returns an error if the blob cannot be resolved.
    pub fn hash_value(&self) -> Result<&'t [u8]> {
        self.0.blob(8)
    }
}

record_view! {
    /// A file of a multi-file assembly (`0x26`).
    FileDef => File
}

impl<'t> FileDef<'t> {
    /// # Errors
    /// Returns an error if the row cannot be read.
    pub fn flags(&self) -> Result<u32> {
        self.0.column_at(0)
    }

    /// # Errors
    /// Returns an error if the name cannot be resolved.
    pub fn name(&self) -> Result<&'t str> {
        self.0.string(1)
    }

    /// # Errors
    /// Returns an error if the blob cannot be resolved.
    pub fn hash_value(&self) -> Result<&'t [u8]> {
        self.0.blob(2)
    }
}

record_view! {
    /// A type exported or forwarded by this assembly (`0x27`).
    ExportedType => ExportedType
}

impl<'t> ExportedType<'t> {
    /// # Errors
    /// Returns an error if the row cannot be read.
    pub fn flags(&self) -> Result<u32> {
        self.0.column_at(0)
    }

    /// A hint for the `TypeDef` row in the target module.
    ///
    /// # Errors
    /// Returns an error if the row cannot be read.
    pub fn type_def_id(&self) -> Result<u32> {
        self.0.column_at(1)
    }

    /// # Errors
    /// Returns an error if the name cannot be resolved.
    pub fn name(&self) -> Result<&'t str> {
        self.0.string(2)
    }

    /// # Errors
    /// Returns an error if the namespace cannot be resolved.
    pub fn namespace(&self) -> Result<&'t str> {
        self.0.string(3)
    }

    /// The `File`, `AssemblyRef` or enclosing `ExportedType`.
    ///
    /// # Errors
    /// Returns an error if the coded index is invalid.
    pub fn implementation(&self) -> Result<CodedIndex> {
        self.0.coded(4)
    }
}

record_view! {
    /// A managed resource (`0x28`).
    ManifestResource => ManifestResource
}

impl<'t> ManifestResource<'t> {
    /// Offset into the resource directory, or into the file named by
    /// [`ManifestResource::implementation`].
    ///
    /// # Errors
    /// Returns an error if the row cannot be read.
    pub fn offset(&self) -> Result<u32> {
        self.0.column_at(0)
    }

    /// # Errors
    /// Returns an error if the row cannot be read.
    pub fn flags(&self) -> Result<u32> {
        self.0.column_at(1)
    }

    /// # Errors
    /// Returns an error if the name cannot be resolved.
    pub fn name(&self) -> Result<&'t str> {
        self.0.string(2)
    }

    /// Null for resources embedded in this module.
    ///
    /// # Errors
    /// Returns an error if the coded index is invalid.
    pub fn implementation(&self) -> Result<CodedIndex> {
        self.0.coded(3)
    }
}

record_view! {
    /// An attribute instance attached to a metadata row (`0x0C`).
    CustomAttribute => CustomAttribute
}

impl<'t> CustomAttribute<'t> {
    /// # Errors
    /// Returns an error if the coded index is invalid.
    pub fn parent(&self) -> Result<CodedIndex> {
        self.0.coded(0)
    }

    /// The attribute constructor, a `MethodDef` or `MemberRef`.
    ///
    /// # Errors
    /// Returns an error if the coded index is invalid.
    pub fn constructor(&self) -> Result<CodedIndex> {
        self.0.coded(1)
    }

    /// The serialized constructor arguments.
    ///
    /// # Errors
    /// Returns an error if the blob cannot be resolved.
    pub fn value(&self) -> Result<&'t [u8]> {
        self.0.blob(2)
    }
}

record_view! {
    /// A declarative security permission set (`0x0E`).
    DeclSecurity => DeclSecurity
}

impl<'t> DeclSecurity<'t> {
    /// # Errors
    /// Returns an error if the row cannot be read.
    #[allow(clippy::cast_possible_truncation)]
    pub fn action(&self) -> Result<u16> {
        Ok(self.0.column_at(0)? as u16)
    }

    /// # Errors
    /// Returns an error if the coded index is invalid.
    pub fn parent(&self) -> Result<CodedIndex> {
        self.0.coded(1)
    }

    /// # Errors
    /// Returns an error if the blob cannot be resolved.
    pub fn permission_set(&self) -> Result<&'t [u8]> {
        self.0.blob(2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        metadata::{records::MemberRef, tables::TableId},
        test::ImageBuilder,
        ModuleView,
    };

    #[test]
    fn manifest() {
        let view = ModuleView::from_mem(ImageBuilder::new().build()).unwrap();
        let tables = view.tables();

        let module = tables.module().unwrap();
        assert_eq!(module.generation().unwrap(), 0);
        assert_ne!(module.mvid().unwrap(), uguid::Guid::ZERO);
        assert_eq!(module.enc_id().unwrap(), uguid::Guid::ZERO);

        let assembly = tables.assembly().unwrap();
        assert_eq!(assembly.version().unwrap().to_string(), "1.2.3.4");
        assert!(assembly.public_key().unwrap().is_empty());
        assert_eq!(assembly.culture().unwrap(), "");
        assert_eq!(assembly.custom_attributes().unwrap().len(), 1);

        let runtime = tables.assembly_refs().next().unwrap();
        assert_eq!(runtime.name().unwrap(), "System.Runtime");
        assert_eq!(
            runtime.version().unwrap(),
            Version {
                major: 8,
                minor: 0,
                build: 0,
                revision: 0
            }
        );
        assert_eq!(runtime.public_key_or_token().unwrap().len(), 8);
    }

    #[test]
    fn attribute_constructors() {
        let view = ModuleView::from_mem(ImageBuilder::new().build()).unwrap();
        let tables = view.tables();

        for attribute in tables.all_custom_attributes() {
            let ctor = attribute.constructor().unwrap();
            assert_eq!(ctor.tag, TableId::MemberRef);
            let member: MemberRef = tables.get(ctor.row).unwrap();
            assert_eq!(member.name().unwrap(), ".ctor");
        }
    }
}
