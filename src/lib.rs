// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0


#![doc(html_no_source)]
#![deny(missing_docs)]
#![allow(clippy::too_many_arguments)]
// - 'file/physical.rs' uses mmap to map a file into memory

//! # ironscope
//!
//! Two front ends for reading program text and program images, in pure Rust:
//!
//! - A restartable tokenizer for indentation-structured, Python-like source. It tracks block
//!   structure through `Indent`/`Dedent` tokens, continues triple-quoted strings across input
//!   chunks, and reports malformed input as diagnostics instead of failing.
//! - A zero-copy reader for CLI module images (PE files carrying ECMA-335 metadata). It parses
//!   the PE and CLI headers, the metadata root, heaps and the compressed table stream, and
//!   offers token-addressed, typed access to every row with cross-table navigation.
//!
//! ## Features
//!
//! - **Tolerant tokenization** - Error tokens and diagnostics, never a hard failure
//! - **Snapshot and resume** - [`tokenizer::TokenizerState`] makes the tokenizer restartable
//! - **Memory-mapped images** - Rows are decoded from the mapped file on access
//! - **Fail-fast metadata** - A structurally damaged image is rejected as a whole
//! - **Thread-safe reads** - Opened images are immutable and `Send + Sync`
//!
//! ## Quick Start
//!
//! ### Using the Prelude
//!
//! ```rust,no_run
//! use ironscope::prelude::*;
//!
//! let view = ModuleView::from_file("tests/samples/module.dll".as_ref())?;
//! for typedef in view.tables().type_defs() {
//!     println!("{}.{}", typedef.namespace()?, typedef.name()?);
//! }
//! # Ok::<(), ironscope::Error>(())
//! ```
//!
//! ### Tokenizing
//!
//! ```rust
//! use ironscope::tokenizer::{TokenKind, Tokenizer, TokenizerConfig};
//!
//! let tokens: Vec<_> = Tokenizer::new("def f(x):\n    return x\n", TokenizerConfig::default())
//!     .map(|token| token.kind)
//!     .collect();
//! assert!(tokens.contains(&TokenKind::Indent));
//! assert_eq!(tokens.last(), Some(&TokenKind::EndOfFile));
//! ```
//!
//! ### Navigating Metadata
//!
//! ```rust,no_run
//! use ironscope::ModuleView;
//!
//! let view = ModuleView::from_file("tests/samples/module.dll".as_ref())?;
//! let tables = view.tables();
//!
//! for typedef in tables.type_defs() {
//!     for method in typedef.methods()? {
//!         println!("{}::{}", typedef.name()?, method.name()?);
//!     }
//! }
//!
//! for reference in tables.assembly_refs() {
//!     println!("{} {}", reference.name()?, reference.version()?);
//! }
//! # Ok::<(), ironscope::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`tokenizer`] - Source buffer, tokenizer state, scanner and literal conversion
//! - [`file`] - Bounds-checked memory access and the PE header reader
//! - [`metadata`] - CLI header, metadata root, heaps, table layout and typed records
//! - [`prelude`] - Convenient re-exports of commonly used types
//! - [`Error`] and [`Result`] - Error handling for the metadata reader
//!
//! ## Error Handling
//!
//! Opening an image either succeeds completely or fails with one [`Error`]:
//!
//! ```rust,no_run
//! use ironscope::{Error, ModuleView};
//!
//! match ModuleView::from_file("tests/samples/damaged.dll".as_ref()) {
//!     Ok(_) => println!("loaded"),
//!     Err(Error::BadImageFormat { message, .. }) => println!("bad image: {}", message),
//!     Err(e) => println!("error: {}", e),
//! }
//! ```
//!
//! The tokenizer never returns errors. See [`tokenizer::Diagnostics`].
//!
//! ## Standards Compliance
//!
//! The metadata reader follows **ECMA-335** (6th edition) Partition II for the file format,
//! the metadata root, the heaps and the tables, including the optional pointer tables and the
//! uncompressed `#-` table stream.
//!
//! ## Development and Testing
//!
//! ```bash
//! cargo test
//! cargo bench
//! cargo +nightly fuzz run tokenizer --release
//! cargo +nightly fuzz run moduleview --release
//! ```
#[macro_use]
pub(crate) mod error;

/// Shared functionality which is used in unit tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types.
///
/// # Example
///
/// ```rust,no_run
/// use ironscope::prelude::*;
///
/// let view = ModuleView::from_file("tests/samples/module.dll".as_ref())?;
/// let program: Option<TypeDef> = view.tables().type_defs().find(|t| t.name().ok() == Some("Program"));
/// # Ok::<(), ironscope::Error>(())
/// ```
pub mod prelude;

/// Bounds-checked access to image bytes and the PE header reader
///
/// Every read checks `offset + size <= len` before touching memory and fails with
/// [`Error::OutOfBounds`] otherwise.
///
/// # Key Types
///
/// - [`File`] - An opened PE image, memory-mapped or in memory
/// - [`file::MemoryBlock`] - An immutable window with offset-based reads
/// - [`Parser`] - A cursor with little-endian and compressed-integer reads
pub mod file;

/// Reading ECMA-335 metadata out of a CLI module image
///
/// # Key Components
///
/// - [`ModuleView`] - Main entry point, an opened image and its metadata
/// - [`metadata::MetadataTables`] - Token lookup, owning ranges and keyed queries
/// - [`metadata::records`] - Typed views such as `TypeDef` and `MethodDef`
/// - [`metadata::tables`] - Table ids, coded indices and layouts
/// - [`metadata::streams`] - The `#Strings`, `#Blob`, `#GUID` and `#US` heaps
///
/// # Examples
///
/// ```rust,no_run
/// use ironscope::{metadata::token::Token, ModuleView};
///
/// let view = ModuleView::from_file("tests/samples/module.dll".as_ref())?;
/// let record = view.tables().record(Token(0x0600_0001))?;
/// println!("{} in {:?}", record.token(), record.table());
/// # Ok::<(), ironscope::Error>(())
/// ```
pub mod metadata;

/// Tokenizing indentation-structured source
///
/// See [`tokenizer::Tokenizer`] for the scanner and [`tokenizer::TokenizerState`] for
/// snapshot and resume.
pub mod tokenizer;

/// `ironscope` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// `ironscope` Error type
///
/// Returned by the image and metadata reader.
pub use error::Error;

/// An opened module image and its parsed metadata.
///
/// See [`metadata::ModuleView`].
pub use metadata::{LoadOptions, MetadataTables, ModuleView};

/// Raw access to image bytes.
pub use file::{parser::Parser, File, MemoryBlock};

/// The most used tokenizer types.
pub use tokenizer::{Token, TokenKind, Tokenizer, TokenizerConfig, TokenizerState};
