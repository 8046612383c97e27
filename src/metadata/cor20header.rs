//! The CLI header (`IMAGE_COR20_HEADER`).
//!
//! The 72-byte CLI header is the entry point into the managed part of an image. It is located
//! through data directory entry 14 of the optional header and points at the metadata root,
//! managed resources, the strong name signature and VTable fixups.
//!
//! # Reference
//! - ECMA-335 6th Edition, Partition II.25.3.3

use crate::{file::parser::Parser, metadata::options::LoadOptions, Error::OutOfBounds, Result};

/// Size of the CLI header in bytes.
pub const COR20_HEADER_SIZE: u32 = 72;

/// The CLI header of a module image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cor20Header {
    /// Size of the header in bytes, always 72
    pub cb: u32,
    /// Minimum major runtime version required
    pub major_runtime_version: u16,
    /// Minor portion of the required runtime version
    pub minor_runtime_version: u16,
    /// RVA of the metadata root
    pub meta_data_rva: u32,
    /// Size of the metadata in bytes
    pub meta_data_size: u32,
    /// Runtime flags (`COMIMAGE_FLAGS_*`)
    pub flags: u32,
    /// Token of the entry point method, or RVA of a native entry point
    pub entry_point_token: u32,
    /// RVA of managed resources
    pub resource_rva: u32,
    /// Size of managed resources
    pub resource_size: u32,
    /// RVA of the strong name signature hash
    pub strong_name_signature_rva: u32,
    /// Size of the strong name signature hash
    pub strong_name_signature_size: u32,
    /// Reserved, zero
    pub code_manager_table_rva: u32,
    /// Reserved, zero
    pub code_manager_table_size: u32,
    /// RVA of the VTable fixup array
    pub vtable_fixups_rva: u32,
    /// Size of the VTable fixup array
    pub vtable_fixups_size: u32,
    /// Reserved, zero
    pub export_address_table_jmp_rva: u32,
    /// Reserved, zero
    pub export_address_table_jmp_size: u32,
    /// Reserved, zero for non-precompiled images
    pub managed_native_header_rva: u32,
    /// Reserved, zero for non-precompiled images
    pub managed_native_header_size: u32,
}

impl Cor20Header {
    /// Read and validate a CLI header with [`LoadOptions::default`].
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if `data` is shorter than 72 bytes, or
    /// [`crate::Error::BadImageFormat`] if a field is invalid.
    pub fn read(data: &[u8]) -> Result<Cor20Header> {
        Self::read_with(data, &LoadOptions::default())
    }

    /// Read and validate a CLI header.
    ///
    /// The size field and the metadata directory are always checked. Flags, reserved fields
    /// and RVA/size pairing are checked only if `options.validate_cor20_header` is set.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if `data` is shorter than 72 bytes, or
    /// [`crate::Error::BadImageFormat`] if a field is invalid.
    pub fn read_with(data: &[u8], options: &LoadOptions) -> Result<Cor20Header> {
        const VALID_FLAGS: u32 = 0x0001_001F;

        if data.len() < COR20_HEADER_SIZE as usize {
            return Err(OutOfBounds);
        }

        let mut parser = Parser::new(data);

        let cb = parser.read_le::<u32>()?;
        if cb != COR20_HEADER_SIZE {
            return Err(malformed_error!(
                "Invalid CLI header size: expected 72, got {}",
                cb
            ));
        }

        let header = Cor20Header {
            cb,
            major_runtime_version: parser.read_le::<u16>()?,
            minor_runtime_version: parser.read_le::<u16>()?,
            meta_data_rva: parser.read_le::<u32>()?,
            meta_data_size: parser.read_le::<u32>()?,
            flags: parser.read_le::<u32>()?,
            entry_point_token: parser.read_le::<u32>()?,
            resource_rva: parser.read_le::<u32>()?,
            resource_size: parser.read_le::<u32>()?,
            strong_name_signature_rva: parser.read_le::<u32>()?,
            strong_name_signature_size: parser.read_le::<u32>()?,
            code_manager_table_rva: parser.read_le::<u32>()?,
            code_manager_table_size: parser.read_le::<u32>()?,
            vtable_fixups_rva: parser.read_le::<u32>()?,
            vtable_fixups_size: parser.read_le::<u32>()?,
            export_address_table_jmp_rva: parser.read_le::<u32>()?,
            export_address_table_jmp_size: parser.read_le::<u32>()?,
            managed_native_header_rva: parser.read_le::<u32>()?,
            managed_native_header_size: parser.read_le::<u32>()?,
        };

        if header.meta_data_rva == 0 || header.meta_data_size == 0 {
            return Err(malformed_error!(
                "Metadata directory is empty - rva 0x{:08X}, size {}",
                header.meta_data_rva,
                header.meta_data_size
            ));
        }

        if !options.validate_cor20_header {
            return Ok(header);
        }

        if header.flags & !VALID_FLAGS != 0 {
            return Err(malformed_error!(
                "Invalid CLI flags: 0x{:08X} contains undefined bits",
                header.flags
            ));
        }

        let pairs = [
            ("Resource", header.resource_rva, header.resource_size),
            (
                "Strong name",
                header.strong_name_signature_rva,
                header.strong_name_signature_size,
            ),
            (
                "VTable fixup",
                header.vtable_fixups_rva,
                header.vtable_fixups_size,
            ),
        ];
        for (name, rva, size) in pairs {
            if (rva == 0) != (size == 0) {
                return Err(malformed_error!(
                    "{} directory is inconsistent - rva 0x{:08X}, size {}",
                    name,
                    rva,
                    size
                ));
            }
        }

        if header.code_manager_table_rva != 0 || header.code_manager_table_size != 0 {
            return Err(malformed_error!(
                "Code Manager Table fields must be zero (reserved)"
            ));
        }

        if header.export_address_table_jmp_rva != 0 || header.export_address_table_jmp_size != 0
        {
            return Err(malformed_error!(
                "Export Address Table Jump fields must be zero (reserved)"
            ));
        }

        Ok(header)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[rustfmt::skip]
    const HEADER: [u8; 72] = [
        0x48, 0x00, 0x00, 0x00, // cb = 72
        0x02, 0x00,             // major_runtime_version = 2
        0x05, 0x00,             // minor_runtime_version = 5
        0x00, 0x20, 0x00, 0x00, // meta_data_rva = 0x2000
        0x00, 0x04, 0x00, 0x00, // meta_data_size = 0x400
        0x01, 0x00, 0x00, 0x00, // flags = ILONLY
        0x01, 0x00, 0x00, 0x06, // entry_point_token = 0x06000001
        0x00, 0x00, 0x00, 0x00, // resource_rva
        0x00, 0x00, 0x00, 0x00, // resource_size
        0x00, 0x00, 0x00, 0x00, // strong_name_signature_rva
        0x00, 0x00, 0x00, 0x00, // strong_name_signature_size
        0x00, 0x00, 0x00, 0x00, // code_manager_table_rva
        0x00, 0x00, 0x00, 0x00, // code_manager_table_size
        0x00, 0x00, 0x00, 0x00, // vtable_fixups_rva
        0x00, 0x00, 0x00, 0x00, // vtable_fixups_size
        0x00, 0x00, 0x00, 0x00, // export_address_table_jmp_rva
        0x00, 0x00, 0x00, 0x00, // export_address_table_jmp_size
        0x00, 0x00, 0x00, 0x00, // managed_native_header_rva
        0x00, 0x00, 0x00, 0x00, // managed_native_header_size
    ];

    #[test]
    fn crafted() {
        let header = Cor20Header::read(&HEADER).unwrap();

        assert_eq!(header.cb, 72);
        assert_eq!(header.major_runtime_version, 2);
        assert_eq!(header.minor_runtime_version, 5);
        assert_eq!(header.meta_data_rva, 0x2000);
        assert_eq!(header.meta_data_size, 0x400);
        assert_eq!(header.flags, 1);
        assert_eq!(header.entry_point_token, 0x0600_0001);
        assert_eq!(header.managed_native_header_size, 0);
    }

    #[test]
    fn invalid_size_and_metadata() {
        let mut data = HEADER;
        data[0] = 0x40;
        assert!(matches!(
            Cor20Header::read(&data),
            Err(Error::BadImageFormat { .. })
        ));

        let mut data = HEADER;
        data[12..16].fill(0);
        assert!(Cor20Header::read_with(&data, &LoadOptions::lenient()).is_err());

        assert!(matches!(
            Cor20Header::read(&HEADER[..71]),
            Err(Error::OutOfBounds)
        ));
    }

    #[test]
    fn reserved_fields_follow_options() {
        let mut data = HEADER;
        // code_manager_table_rva
        data[40] = 0x10;
        assert!(Cor20Header::read(&data).is_err());
        assert!(Cor20Header::read_with(&data, &LoadOptions::lenient()).is_ok());

        let mut data = HEADER;
        // undefined flag bit
        data[19] = 0x80;
        assert!(Cor20Header::read_with(&data, &LoadOptions::strict()).is_err());
        assert!(Cor20Header::read_with(&data, &LoadOptions::lenient()).is_ok());

        let mut data = HEADER;
        // resource rva without size
        data[24] = 0x10;
        assert!(Cor20Header::read(&data).is_err());
    }
}
