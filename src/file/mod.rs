//! Image access and PE header parsing.
//!
//! This module supplies the bottom of the metadata pipeline: a flat, bounds-checked byte
//! buffer (from disk or memory), the validated PE headers of that buffer, and the RVA
//! translation the CLI header and metadata root are located with.
//!
//! # Key Components
//!
//! - [`crate::file::File`] - A loaded image together with its validated PE headers
//! - [`crate::file::Backend`] - Trait for data sources (memory-mapped files, owned buffers)
//! - [`crate::file::MemoryBlock`] - Immutable window with typed, bounds-checked reads
//! - [`crate::file::parser::Parser`] - Sequential reader used for all header walks
//! - [`crate::file::io`] - The central little/big-endian read primitives
//! - [`crate::file::pe`] - DOS, PE, COFF, optional and section header reader
//!
//! # Examples
//!
//! ```rust,no_run
//! use ironscope::File;
//! use std::path::Path;
//!
//! let file = File::from_file(Path::new("module.dll"))?;
//! println!("Image base: 0x{:x}", file.imagebase());
//!
//! let (clr_rva, clr_size) = file.clr();
//! let clr_header = file.rva_slice(clr_rva, clr_size)?;
//! assert_eq!(clr_header.len(), clr_size as usize);
//! # Ok::<(), ironscope::Error>(())
//! ```
//!
//! # Thread Safety
//!
//! [`File`] is immutable after loading and is `Send + Sync`.

pub mod io;
pub mod parser;
pub mod pe;

mod block;
mod memory;
mod physical;

use std::path::Path;

pub use block::MemoryBlock;
pub use memory::Memory;
pub use physical::Physical;

use crate::{
    file::pe::{DataDirectoryType, PeHeaders, SectionHeader},
    Error::Empty,
    Result,
};

/// Backend trait for image data sources.
///
/// All implementations must be thread-safe and must hand out bounds-checked slices only.
pub trait Backend: Send + Sync {
    /// Returns a slice of the data at the given offset and length.
    ///
    /// # Arguments
    ///
    /// * `offset` - The starting offset within the data.
    /// * `len` - The length of the slice in bytes.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::OutOfBounds`] if the requested range is out of bounds.
    fn data_slice(&self, offset: usize, len: usize) -> Result<&[u8]>;

    /// Returns the entire data buffer.
    fn data(&self) -> &[u8];

    /// Returns the total length of the data buffer.
    fn len(&self) -> usize;
}

/// A loaded image with validated PE headers.
///
/// The backing buffer is owned by the `File`; every slice handed out borrows from it. The
/// metadata layer keeps the `File` alive through an `Arc` for as long as any view exists.
///
/// # Examples
///
/// ```rust,no_run
/// use ironscope::File;
///
/// let data = std::fs::read("module.dll")?;
/// let file = File::from_mem(data)?;
///
/// for section in file.sections() {
///     println!("{} at RVA 0x{:x}", section.name(), section.virtual_address);
/// }
/// # Ok::<(), ironscope::Error>(())
/// ```
pub struct File {
    /// The underlying data source (memory or file).
    data: Box<dyn Backend>,
    /// The validated headers of `data`.
    headers: PeHeaders,
}

impl File {
    /// Loads and validates an image from the given path.
    ///
    /// The file is memory-mapped read-only.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::FileError`] if the file cannot be opened or mapped,
    /// [`crate::Error::Empty`] for a zero-length file and
    /// [`crate::Error::BadImageFormat`] if the PE headers are invalid or the image has no
    /// CLI header.
    pub fn from_file(file: &Path) -> Result<File> {
        let input = Physical::new(file)?;

        Self::load(input)
    }

    /// Loads and validates an image from a memory buffer.
    ///
    /// # Errors
    ///
    /// Same as [`File::from_file`], minus the I/O failures.
    pub fn from_mem(data: Vec<u8>) -> Result<File> {
        let input = Memory::new(data);

        Self::load(input)
    }

    fn load<T: Backend + 'static>(data: T) -> Result<File> {
        if data.len() == 0 {
            return Err(Empty);
        }

        let headers = PeHeaders::parse(data.data())?;

        Ok(File {
            data: Box::new(data),
            headers,
        })
    }

    /// Returns the total size of the loaded image in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the image has a length of zero.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.len() == 0
    }

    /// The validated PE headers.
    #[must_use]
    pub fn headers(&self) -> &PeHeaders {
        &self.headers
    }

    /// Preferred load address of the image.
    #[must_use]
    pub fn imagebase(&self) -> u64 {
        self.headers.optional.image_base
    }

    /// Returns `true` for PE32+ images.
    #[must_use]
    pub fn is_pe32_plus(&self) -> bool {
        self.headers.optional.is_pe32_plus()
    }

    /// The section table.
    pub fn sections(&self) -> impl Iterator<Item = &SectionHeader> {
        self.headers.sections.iter()
    }

    /// RVA and size of the CLI header directory. Presence is validated at load time.
    #[must_use]
    pub fn clr(&self) -> (u32, u32) {
        self.directory(DataDirectoryType::ClrRuntimeHeader)
            .unwrap_or((0, 0))
    }

    /// RVA and size of the resource directory, `(0, 0)` if absent.
    #[must_use]
    pub fn resources(&self) -> (u32, u32) {
        self.directory(DataDirectoryType::ResourceTable)
            .unwrap_or((0, 0))
    }

    /// RVA and size of a populated data directory entry.
    #[must_use]
    pub fn directory(&self, dir_type: DataDirectoryType) -> Option<(u32, u32)> {
        self.headers
            .optional
            .directory(dir_type)
            .filter(|dir| !dir.is_empty())
            .map(|dir| (dir.virtual_address, dir.size))
    }

    /// The complete image data.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        self.data.data()
    }

    /// A bounds-checked slice of the image at a file offset.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the range does not fit.
    pub fn data_slice(&self, offset: usize, len: usize) -> Result<&[u8]> {
        self.data.data_slice(offset, len)
    }

    /// Translate an RVA to a file offset.
    ///
    /// # Errors
    /// Returns [`crate::Error::BadImageFormat`] if no section maps `rva`.
    pub fn rva_to_offset(&self, rva: u32) -> Result<usize> {
        self.headers.rva_to_offset(rva)
    }

    /// Translate a file offset to an RVA.
    ///
    /// # Errors
    /// Returns [`crate::Error::BadImageFormat`] if no section maps `offset`.
    pub fn offset_to_rva(&self, offset: usize) -> Result<u32> {
        self.headers.offset_to_rva(offset)
    }

    /// The bytes of `rva..rva + size`, which must lie within one section and within the file.
    ///
    /// # Errors
    /// Returns [`crate::Error::BadImageFormat`] if the range leaves its section or the file.
    pub fn rva_slice(&self, rva: u32, size: u32) -> Result<&[u8]> {
        let offset = self.headers.rva_range_to_offset(rva, size)?;

        self.data
            .data_slice(offset, size as usize)
            .map_err(|_| malformed_error!("Range 0x{:08X}+{} exceeds the file", rva, size))
    }

    /// Same as [`File::rva_slice`], wrapped as a [`MemoryBlock`] carrying its file offset.
    ///
    /// # Errors
    /// Same as [`File::rva_slice`].
    pub fn rva_block(&self, rva: u32, size: u32) -> Result<MemoryBlock<'_>> {
        let offset = self.headers.rva_range_to_offset(rva, size)?;
        let data = self.rva_slice(rva, size)?;

        Ok(MemoryBlock::with_base(data, offset))
    }
}
