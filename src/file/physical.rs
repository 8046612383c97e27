//! Memory-mapped file backend.
//!
//! [`Physical`] maps an image read-only into the address space through `memmap2` and exposes
//! it as one flat byte buffer. Every access goes through the bounds-checked
//! [`crate::file::Backend::data_slice`]; nothing here relies on page-fault handling, so a file
//! truncated underneath the mapping is outside what this crate protects against.
//!
//! # Usage Examples
//!
//! ```rust,ignore
//! use ironscope::file::{Physical, Backend};
//! use std::path::Path;
//!
//! let physical = Physical::new(Path::new("module.dll"))?;
//! let dos_signature = physical.data_slice(0, 2)?;
//! assert_eq!(dos_signature, b"MZ");
//! # Ok::<(), ironscope::Error>(())
//! ```

use super::Backend;
use crate::{
    Error::{FileError, OutOfBounds},
    Result,
};

use memmap2::Mmap;
use std::{fs, path::Path};

/// A read-only, memory-mapped image on disk.
#[derive(Debug)]
pub struct Physical {
    /// Memory-mapped file data
    data: Mmap,
}

impl Physical {
    /// Create a new physical backend by memory-mapping the file at `path`.
    ///
    /// # Arguments
    /// * `path` - Path to the image on disk
    ///
    /// # Errors
    /// Returns [`crate::Error::FileError`] if the file cannot be opened or mapped.
    pub fn new(path: impl AsRef<Path>) -> Result<Physical> {
        let file = fs::File::open(path).map_err(FileError)?;

        // SAFETY: the mapping is read-only and only ever accessed through bounds-checked slices.
        let mmap = unsafe { Mmap::map(&file) }.map_err(FileError)?;

        Ok(Physical { data: mmap })
    }
}

impl Backend for Physical {
    fn data_slice(&self, offset: usize, len: usize) -> Result<&[u8]> {
        let Some(offset_end) = offset.checked_add(len) else {
            return Err(OutOfBounds);
        };

        self.data.get(offset..offset_end).ok_or(OutOfBounds)
    }

    fn data(&self) -> &[u8] {
        self.data.as_ref()
    }

    fn len(&self) -> usize {
        self.data.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    fn temp_file(name: &str, content: &[u8]) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!(
            "ironscope_physical_{}_{}",
            std::process::id(),
            name
        ));
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn physical() {
        let mut content = vec![0u8; 4096];
        content[0] = b'M';
        content[1] = b'Z';
        content[4095] = 0xAA;
        let path = temp_file("basic.bin", &content);

        let physical = Physical::new(&path).unwrap();
        assert_eq!(physical.len(), 4096);
        assert_eq!(physical.data_slice(0, 2).unwrap(), b"MZ");
        assert_eq!(physical.data_slice(4095, 1).unwrap(), &[0xAA]);
        assert!(physical.data_slice(4094, 3).is_err());
        assert!(matches!(
            physical.data_slice(usize::MAX, 2),
            Err(Error::OutOfBounds)
        ));

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn invalid_file_path() {
        let result = Physical::new("/nonexistent/path/to/file.dll");
        match result {
            Err(Error::FileError(io_error)) => {
                assert_eq!(io_error.kind(), std::io::ErrorKind::NotFound);
            }
            _ => panic!("Expected FileError"),
        }
    }
}
