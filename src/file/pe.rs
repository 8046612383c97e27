//! PE/COFF header reader.
//!
//! Walks the fixed headers of a Portable Executable image in the order the loader does and
//! records only what metadata reading needs: the COFF header, the PE32/PE32+ optional header
//! with its data directory, and the section table used for RVA translation. Every structural
//! inconsistency is reported as [`crate::Error::BadImageFormat`]; there is no tolerant mode.
//!
//! # Validation order
//!
//! 1. DOS signature `MZ` (`0x5A4D`) at offset 0, `e_lfanew` at `0x3C`
//! 2. PE signature `PE\0\0` (`0x00004550`) at `e_lfanew`
//! 3. COFF header, section count in `1..=96`
//! 4. Optional header magic `0x10B` (PE32) or `0x20B` (PE32+)
//! 5. Data directories: resource table (index 2) and CLI header (index 14, must be present)
//! 6. Section headers, 40 bytes each
//!
//! # Reference
//! - Microsoft PE/COFF Specification
//! - ECMA-335 6th Edition, Partition II.25

use strum::{EnumCount, EnumIter};

use crate::{
    file::{io::read_le_at, parser::Parser},
    Result,
};

/// `MZ`
pub const DOS_SIGNATURE: u16 = 0x5A4D;
/// `PE\0\0`
pub const PE_SIGNATURE: u32 = 0x0000_4550;
/// Optional header magic of 32-bit images
pub const PE32_MAGIC: u16 = 0x10B;
/// Optional header magic of 64-bit images
pub const PE32_PLUS_MAGIC: u16 = 0x20B;

const E_LFANEW_OFFSET: usize = 0x3C;
const COFF_HEADER_SIZE: usize = 20;
const SECTION_HEADER_SIZE: usize = 40;
const MAX_SECTIONS: u16 = 96;

/// Index of each entry in the optional header's data directory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, EnumCount)]
#[repr(u8)]
pub enum DataDirectoryType {
    /// Export table
    ExportTable = 0,
    /// Import table
    ImportTable = 1,
    /// Resource table
    ResourceTable = 2,
    /// Exception table
    ExceptionTable = 3,
    /// Attribute certificate table
    CertificateTable = 4,
    /// Base relocation table
    BaseRelocationTable = 5,
    /// Debug directory
    Debug = 6,
    /// Reserved, must be zero
    Architecture = 7,
    /// Global pointer register value
    GlobalPtr = 8,
    /// Thread local storage table
    TlsTable = 9,
    /// Load configuration table
    LoadConfigTable = 10,
    /// Bound import table
    BoundImport = 11,
    /// Import address table
    ImportAddressTable = 12,
    /// Delay import descriptor
    DelayImportDescriptor = 13,
    /// CLI header
    ClrRuntimeHeader = 14,
    /// Reserved, must be zero
    Reserved = 15,
}

/// One RVA/size pair of the data directory.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DataDirectory {
    /// RVA of the table
    pub virtual_address: u32,
    /// Size in bytes
    pub size: u32,
}

impl DataDirectory {
    /// Returns `true` if the entry is not populated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.virtual_address == 0 || self.size == 0
    }
}

/// The COFF file header following the PE signature.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct CoffHeader {
    pub machine: u16,
    pub number_of_sections: u16,
    pub time_date_stamp: u32,
    pub pointer_to_symbol_table: u32,
    pub number_of_symbols: u32,
    pub size_of_optional_header: u16,
    pub characteristics: u16,
}

/// The parts of the optional header that are needed to navigate the image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OptionalHeader {
    /// `0x10B` or `0x20B`
    pub magic: u16,
    /// RVA of the native entry point
    pub address_of_entry_point: u32,
    /// Preferred load address, widened to `u64` for PE32
    pub image_base: u64,
    /// Section alignment in memory
    pub section_alignment: u32,
    /// Section alignment on disk
    pub file_alignment: u32,
    /// All data directory entries declared by the header
    pub data_directories: Vec<DataDirectory>,
}

impl OptionalHeader {
    /// Returns `true` for PE32+ (64-bit) images.
    #[must_use]
    pub fn is_pe32_plus(&self) -> bool {
        self.magic == PE32_PLUS_MAGIC
    }

    /// The directory entry at `dir`, if the header declares it.
    #[must_use]
    pub fn directory(&self, dir: DataDirectoryType) -> Option<DataDirectory> {
        self.data_directories.get(dir as usize).copied()
    }
}

/// A 40-byte section table entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SectionHeader {
    /// NUL-padded section name
    pub name: [u8; 8],
    /// Size of the section once loaded
    pub virtual_size: u32,
    /// RVA of the first byte
    pub virtual_address: u32,
    /// Size of the initialized data on disk
    pub size_of_raw_data: u32,
    /// File offset of the initialized data
    pub pointer_to_raw_data: u32,
    /// Section flags
    pub characteristics: u32,
}

impl SectionHeader {
    fn read(parser: &mut Parser) -> Result<Self> {
        let mut name = [0_u8; 8];
        name.copy_from_slice(parser.read_bytes(8)?);

        let virtual_size = parser.read_le::<u32>()?;
        let virtual_address = parser.read_le::<u32>()?;
        let size_of_raw_data = parser.read_le::<u32>()?;
        let pointer_to_raw_data = parser.read_le::<u32>()?;
        // relocations, line numbers and their counts
        parser.advance_by(12)?;
        let characteristics = parser.read_le::<u32>()?;

        Ok(SectionHeader {
            name,
            virtual_size,
            virtual_address,
            size_of_raw_data,
            pointer_to_raw_data,
            characteristics,
        })
    }

    /// The section name with NUL padding stripped, lossily decoded.
    #[must_use]
    pub fn name(&self) -> String {
        let len = self.name.iter().position(|&b| b == 0).unwrap_or(8);
        String::from_utf8_lossy(&self.name[..len]).into_owned()
    }

    /// Number of addressable bytes: the virtual size, or the raw size if the former is zero.
    #[must_use]
    pub fn extent(&self) -> u32 {
        if self.virtual_size == 0 {
            self.size_of_raw_data
        } else {
            self.virtual_size
        }
    }

    /// Returns `true` if `rva` lies inside this section.
    #[must_use]
    pub fn contains_rva(&self, rva: u32) -> bool {
        let span = self.virtual_size.max(self.size_of_raw_data);
        rva >= self.virtual_address && u64::from(rva) < u64::from(self.virtual_address) + u64::from(span)
    }
}

/// The validated PE headers of an image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PeHeaders {
    /// Offset of the PE signature, read from `e_lfanew`
    pub pe_offset: u32,
    /// The COFF header
    pub coff: CoffHeader,
    /// The optional header
    pub optional: OptionalHeader,
    /// The section table
    pub sections: Vec<SectionHeader>,
}

impl PeHeaders {
    /// Parse and validate the headers of the image in `data`.
    ///
    /// # Errors
    /// Returns [`crate::Error::BadImageFormat`] for any signature, size or directory violation,
    /// or [`crate::Error::OutOfBounds`] if the headers are truncated.
    pub fn parse(data: &[u8]) -> Result<PeHeaders> {
        let mut parser = Parser::new(data);

        let dos_signature = parser.read_le::<u16>().map_err(|_| malformed_error!("Image too small for a DOS header"))?;
        if dos_signature != DOS_SIGNATURE {
            return Err(malformed_error!("Invalid DOS signature - 0x{:04X}", dos_signature));
        }

        parser.seek(E_LFANEW_OFFSET).map_err(|_| malformed_error!("Image too small for a DOS header"))?;
        let pe_offset = parser.read_le::<u32>().map_err(|_| malformed_error!("Image too small for a DOS header"))?;

        parser
            .seek(pe_offset as usize)
            .map_err(|_| malformed_error!("e_lfanew points outside of the image - {}", pe_offset))?;
        let pe_signature = parser.read_le::<u32>().map_err(|_| malformed_error!("Missing PE signature"))?;
        if pe_signature != PE_SIGNATURE {
            return Err(malformed_error!("Invalid PE signature - 0x{:08X}", pe_signature));
        }

        let coff = Self::read_coff(&mut parser)?;
        let optional_start = parser.pos();
        let optional = Self::read_optional(&mut parser, coff.size_of_optional_header)?;

        let sections_start = optional_start + usize::from(coff.size_of_optional_header);
        let table_len = usize::from(coff.number_of_sections) * SECTION_HEADER_SIZE;
        if sections_start + table_len > data.len() {
            return Err(malformed_error!(
                "Section table of {} entries exceeds the image",
                coff.number_of_sections
            ));
        }

        parser.seek(sections_start)?;
        let mut sections = Vec::with_capacity(usize::from(coff.number_of_sections));
        for _ in 0..coff.number_of_sections {
            sections.push(SectionHeader::read(&mut parser)?);
        }

        Ok(PeHeaders {
            pe_offset,
            coff,
            optional,
            sections,
        })
    }

    fn read_coff(parser: &mut Parser) -> Result<CoffHeader> {
        if parser.remaining() < COFF_HEADER_SIZE {
            return Err(malformed_error!("Truncated COFF header"));
        }

        let coff = CoffHeader {
            machine: parser.read_le::<u16>()?,
            number_of_sections: parser.read_le::<u16>()?,
            time_date_stamp: parser.read_le::<u32>()?,
            pointer_to_symbol_table: parser.read_le::<u32>()?,
            number_of_symbols: parser.read_le::<u32>()?,
            size_of_optional_header: parser.read_le::<u16>()?,
            characteristics: parser.read_le::<u16>()?,
        };

        if coff.number_of_sections == 0 || coff.number_of_sections > MAX_SECTIONS {
            return Err(malformed_error!(
                "Invalid number of sections - {}",
                coff.number_of_sections
            ));
        }

        Ok(coff)
    }

    fn read_optional(parser: &mut Parser, declared_size: u16) -> Result<OptionalHeader> {
        let start = parser.pos();
        let magic = parser.read_le::<u16>().map_err(|_| malformed_error!("Truncated optional header"))?;

        let (fixed_size, is_plus) = match magic {
            PE32_MAGIC => (96_usize, false),
            PE32_PLUS_MAGIC => (112_usize, true),
            _ => return Err(malformed_error!("Invalid optional header magic - 0x{:04X}", magic)),
        };

        if usize::from(declared_size) < fixed_size || parser.len() < start + fixed_size {
            return Err(malformed_error!("Truncated optional header - {} bytes", declared_size));
        }

        let header = parser.data();
        let mut offset = start + 16;
        let address_of_entry_point = read_le_at::<u32>(header, &mut offset)?;

        let image_base = if is_plus {
            offset = start + 24;
            read_le_at::<u64>(header, &mut offset)?
        } else {
            offset = start + 28;
            u64::from(read_le_at::<u32>(header, &mut offset)?)
        };

        let section_alignment = read_le_at::<u32>(header, &mut offset)?;
        let file_alignment = read_le_at::<u32>(header, &mut offset)?;

        offset = start + fixed_size - 4;
        let number_of_rva_and_sizes = read_le_at::<u32>(header, &mut offset)?;
        if (number_of_rva_and_sizes as usize) <= DataDirectoryType::ClrRuntimeHeader as usize {
            return Err(malformed_error!(
                "Data directory too small to hold a CLI header - {} entries",
                number_of_rva_and_sizes
            ));
        }

        let count = (number_of_rva_and_sizes as usize).min(DataDirectoryType::COUNT);
        if usize::from(declared_size) < fixed_size + count * 8 {
            return Err(malformed_error!(
                "Optional header of {} bytes cannot hold {} directories",
                declared_size,
                count
            ));
        }

        parser.seek(start + fixed_size)?;
        let mut data_directories = Vec::with_capacity(count);
        for _ in 0..count {
            data_directories.push(DataDirectory {
                virtual_address: parser.read_le::<u32>()?,
                size: parser.read_le::<u32>()?,
            });
        }

        if data_directories[DataDirectoryType::ClrRuntimeHeader as usize].is_empty() {
            return Err(malformed_error!("Image does not have a CLI header directory"));
        }

        Ok(OptionalHeader {
            magic,
            address_of_entry_point,
            image_base,
            section_alignment,
            file_alignment,
            data_directories,
        })
    }

    /// The section containing `rva`, found by linear scan.
    #[must_use]
    pub fn section_for_rva(&self, rva: u32) -> Option<&SectionHeader> {
        self.sections.iter().find(|section| section.contains_rva(rva))
    }

    /// Translate `rva` to a file offset.
    ///
    /// # Errors
    /// Returns [`crate::Error::BadImageFormat`] if no section contains `rva` or the translated
    /// offset lies outside the section's raw data.
    pub fn rva_to_offset(&self, rva: u32) -> Result<usize> {
        let Some(section) = self.section_for_rva(rva) else {
            return Err(malformed_error!("RVA 0x{:08X} is not inside any section", rva));
        };

        let delta = rva - section.virtual_address;
        if delta >= section.size_of_raw_data {
            return Err(malformed_error!(
                "RVA 0x{:08X} lies in the uninitialized tail of section {}",
                rva,
                section.name()
            ));
        }

        Ok(section.pointer_to_raw_data as usize + delta as usize)
    }

    /// Translate the range `rva..rva + size` to a file offset, validating that the whole range
    /// fits inside one section's virtual size and raw data.
    ///
    /// # Errors
    /// Returns [`crate::Error::BadImageFormat`] if the range leaves its section.
    pub fn rva_range_to_offset(&self, rva: u32, size: u32) -> Result<usize> {
        let Some(section) = self.section_for_rva(rva) else {
            return Err(malformed_error!("RVA 0x{:08X} is not inside any section", rva));
        };

        let delta = u64::from(rva - section.virtual_address);
        let end = delta + u64::from(size);
        if end > u64::from(section.extent()) || end > u64::from(section.size_of_raw_data) {
            return Err(malformed_error!(
                "Range 0x{:08X}+{} exceeds section {}",
                rva,
                size,
                section.name()
            ));
        }

        Ok(section.pointer_to_raw_data as usize + delta as usize)
    }

    /// Translate a file offset back to an RVA.
    ///
    /// # Errors
    /// Returns [`crate::Error::BadImageFormat`] if the offset is not inside any section's raw data.
    pub fn offset_to_rva(&self, offset: usize) -> Result<u32> {
        for section in &self.sections {
            let start = section.pointer_to_raw_data as usize;
            let end = start + section.size_of_raw_data as usize;
            if offset >= start && offset < end {
                #[allow(clippy::cast_possible_truncation)]
                return Ok(section.virtual_address + (offset - start) as u32);
            }
        }

        Err(malformed_error!("Offset 0x{:X} is not inside any section", offset))
    }
}
