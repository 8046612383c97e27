//! Metadata reading for ECMA-335 module images.
//!
//! The reader is zero-copy: heaps and tables are windows into the image, and records decode
//! their columns on access.
//!
//! # Key Components
//!
//! - [`ModuleView`] - An opened image and its parsed metadata
//! - [`MetadataTables`] - Token lookup, owning ranges and keyed queries
//! - [`records`] - Typed row views with cross-table navigation
//! - [`tables`] - Table ids, schemas, coded indices and layout computation
//! - [`streams`] - The heaps and stream classification
//! - [`token`] - Metadata tokens
//!
//! # Examples
//!
//! ```rust,no_run
//! use ironscope::{metadata::token::Token, ModuleView};
//!
//! let view = ModuleView::from_file("module.dll".as_ref())?;
//! let tables = view.tables();
//!
//! let record = tables.record(Token(0x0200_0002))?;
//! for attribute in tables.custom_attributes(record.token())? {
//!     println!("{:?}", attribute.constructor()?);
//! }
//! # Ok::<(), ironscope::Error>(())
//! ```

/// The CLI header
pub mod cor20header;
/// Load-time validation switches
pub mod options;
/// Typed row views
pub mod records;
/// The metadata root
pub mod root;
/// Binary and linear searches over table columns
pub mod search;
/// Heaps and stream classification
pub mod streams;
/// Table ids, schemas and layouts
pub mod tables;
/// Metadata tokens
pub mod token;

mod metadatatables;
mod view;

pub use metadatatables::MetadataTables;
pub use options::LoadOptions;
pub use view::{ModuleView, ModuleViewData};
