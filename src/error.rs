use thiserror::Error;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::BadImageFormat {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::BadImageFormat {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Only the metadata reader produces errors. The tokenizer never fails and reports its
/// problems as [`crate::tokenizer::Diagnostic`] entries and [`crate::tokenizer::TokenKind::Error`]
/// tokens instead.
///
/// # Error Categories
///
/// ## Image Parsing Errors
/// - [`Error::BadImageFormat`] - Corrupted or invalid image structure, always fatal for the open call
/// - [`Error::OutOfBounds`] - Attempted to read beyond the end of a memory view
/// - [`Error::NotSupported`] - Recognized but unsupported content
/// - [`Error::Empty`] - Empty input provided
///
/// ## I/O Errors
/// - [`Error::FileError`] - Filesystem I/O errors
///
/// # Examples
///
/// ```rust,no_run
/// use ironscope::{Error, ModuleView};
/// use std::path::Path;
///
/// match ModuleView::from_file(Path::new("module.dll")) {
///     Ok(_view) => println!("Successfully loaded module"),
///     Err(Error::BadImageFormat { message, file, line }) => {
///         eprintln!("Bad image: {} ({}:{})", message, file, line);
///     }
///     Err(Error::FileError(io_err)) => eprintln!("I/O error: {}", io_err),
///     Err(e) => eprintln!("Other error: {}", e),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The image is damaged and could not be parsed.
    ///
    /// Raised for every structural violation in the PE headers, the CLI header, the metadata
    /// root, the heaps or the table stream. The error includes the source location where the
    /// violation was detected for debugging purposes.
    ///
    /// # Fields
    ///
    /// * `message` - Detailed description of what was malformed
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("BadImageFormat - {file}:{line}: {message}")]
    BadImageFormat {
        /// The message to be printed for the BadImageFormat error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// An out of bound access was attempted.
    ///
    /// Every typed read validates `offset + size <= len` before touching memory; this is the
    /// error returned when that check fails.
    #[error("Out of Bound read would have occurred!")]
    OutOfBounds,

    /// This input is not supported.
    ///
    /// Used for well-formed content this crate does not handle, such as portable PDB tables
    /// inside a module's table stream.
    #[error("This file type is not supported")]
    NotSupported,

    /// Provided input was empty.
    #[error("Provided input was empty")]
    Empty,

    /// File I/O error.
    ///
    /// Wraps standard I/O errors that can occur while opening or mapping an image from disk.
    #[error("{0}")]
    FileError(#[from] std::io::Error),
}

impl Error {
    /// Returns `true` for errors classified as a bad image format.
    ///
    /// Bounds violations found while walking image structures are reported as
    /// [`Error::OutOfBounds`] by the low-level readers but belong to the same class.
    #[must_use]
    pub fn is_bad_image(&self) -> bool {
        matches!(self, Error::BadImageFormat { .. } | Error::OutOfBounds)
    }
}
