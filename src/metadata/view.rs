//! A loaded module image and its metadata.
//!
//! [`ModuleView`] owns the image bytes (memory-mapped or in memory) and the parsed metadata
//! that borrows from them. Opening an image runs the whole pipeline once:
//!
//! 1. PE headers, sections and data directories ([`crate::File`])
//! 2. The CLI header located by data directory 14
//! 3. The metadata root and its stream headers
//! 4. Heaps, the table stream header and the layout of every table
//!
//! Nothing past that point is decoded eagerly. Rows are read from the image on access.
//!
//! # Examples
//!
//! ```rust,no_run
//! use ironscope::ModuleView;
//!
//! let view = ModuleView::from_file("module.dll".as_ref())?;
//! println!("runtime {}", view.metadata_root().version);
//!
//! for typedef in view.tables().type_defs() {
//!     println!("{}", typedef.name()?);
//! }
//! # Ok::<(), ironscope::Error>(())
//! ```

use std::{path::Path, sync::Arc};

use log::debug;
use ouroboros::self_referencing;

use crate::{
    file::File,
    metadata::{
        cor20header::Cor20Header, metadatatables::MetadataTables, options::LoadOptions,
        root::Root,
    },
    Result,
};

/// Everything parsed out of the image, borrowing from it.
pub struct ModuleViewData<'a> {
    /// The CLI header
    pub cor20header: Cor20Header,
    /// The metadata root with its stream headers
    pub metadata_root: Root,
    /// Heaps and tables
    pub tables: MetadataTables<'a>,
}

impl<'a> ModuleViewData<'a> {
    fn parse(file: &'a File, options: &LoadOptions) -> Result<Self> {
        let (clr_rva, clr_size) = file.clr();
        if clr_rva == 0 || clr_size == 0 {
            return Err(malformed_error!("Image has no CLI header"));
        }

        let cor20header = Cor20Header::read_with(file.rva_slice(clr_rva, clr_size)?, options)?;
        let metadata = file.rva_slice(cor20header.meta_data_rva, cor20header.meta_data_size)?;
        let metadata_root = Root::read(metadata)?;
        let tables = MetadataTables::new(metadata, &metadata_root, options)?;

        debug!(
            "Opened module: runtime '{}', metadata {} bytes at RVA {:#x}",
            metadata_root.version, cor20header.meta_data_size, cor20header.meta_data_rva
        );

        Ok(ModuleViewData {
            cor20header,
            metadata_root,
            tables,
        })
    }
}

#[self_referencing]
/// A module image together with its parsed metadata.
///
/// The view is immutable after construction and can be shared across threads. Every record it
/// hands out borrows from it.
pub struct ModuleView {
    file: Arc<File>,
    #[borrows(file)]
    #[covariant]
    data: ModuleViewData<'this>,
}

impl ModuleView {
    /// Memory-map and open the image at `path` with default options.
    ///
    /// # Errors
    /// Returns [`crate::Error::FileError`] if the file cannot be read, and
    /// [`crate::Error::BadImageFormat`] if it is not a valid module image.
    pub fn from_file(path: &Path) -> Result<Self> {
        Self::from_file_with(path, LoadOptions::default())
    }

    /// Memory-map and open the image at `path`.
    ///
    /// # Errors
    /// See [`ModuleView::from_file`].
    pub fn from_file_with(path: &Path, options: LoadOptions) -> Result<Self> {
        Self::load(Arc::new(File::from_file(path)?), &options)
    }

    /// Open an image held in memory with default options.
    ///
    /// # Errors
    /// Returns [`crate::Error::BadImageFormat`] if `data` is not a valid module image.
    pub fn from_mem(data: Vec<u8>) -> Result<Self> {
        Self::from_mem_with(data, LoadOptions::default())
    }

    /// Open an image held in memory.
    ///
    /// # Errors
    /// See [`ModuleView::from_mem`].
    pub fn from_mem_with(data: Vec<u8>, options: LoadOptions) -> Result<Self> {
        Self::load(Arc::new(File::from_mem(data)?), &options)
    }

    fn load(file: Arc<File>, options: &LoadOptions) -> Result<Self> {
        ModuleView::try_new(file, |file| ModuleViewData::parse(file, options))
    }

    /// The underlying image.
    #[must_use]
    pub fn file(&self) -> &Arc<File> {
        self.borrow_file()
    }

    /// The CLI header.
    #[must_use]
    pub fn cor20header(&self) -> &Cor20Header {
        &self.borrow_data().cor20header
    }

    /// The metadata root.
    #[must_use]
    pub fn metadata_root(&self) -> &Root {
        &self.borrow_data().metadata_root
    }

    /// Heaps and tables.
    #[must_use]
    pub fn tables(&self) -> &MetadataTables<'_> {
        &self.borrow_data().tables
    }

    /// Run `f` with the tables.
    pub fn with_tables<R>(&self, f: impl FnOnce(&MetadataTables<'_>) -> R) -> R {
        self.with_data(|data| f(&data.tables))
    }
}
