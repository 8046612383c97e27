//! # ironscope Prelude
//!
//! The most commonly used types of both front ends in one import.
//!
//! ```rust
//! use ironscope::prelude::*;
//!
//! let count = Tokenizer::new("x = 1\n", TokenizerConfig::default())
//!     .filter(|token| matches!(token.kind, TokenKind::Name(_)))
//!     .count();
//! assert_eq!(count, 1);
//! ```

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The error type of the image and metadata reader
pub use crate::Error;

/// The result type of the image and metadata reader
pub use crate::Result;

// ================================================================================================
// Tokenizer
// ================================================================================================

/// Scanner, its configuration and its restartable state
pub use crate::tokenizer::{
    Tokenizer, TokenizerConfig, TokenizerOptions, TokenizerState,
};

/// Tokens and what they carry
pub use crate::tokenizer::{Keyword, Literal, Operator, Span, Token, TokenKind};

/// Problems found while scanning
pub use crate::tokenizer::{Diagnostic, DiagnosticCode, DiagnosticSeverity, Diagnostics};

/// Positions in source text
pub use crate::tokenizer::{SourceBuffer, SourceLocation};

// ================================================================================================
// Image Access
// ================================================================================================

/// Opened images and bounds-checked reads
pub use crate::{File, MemoryBlock, Parser};

// ================================================================================================
// Metadata
// ================================================================================================

/// Main entry point for reading module metadata
pub use crate::metadata::{LoadOptions, MetadataTables, ModuleView};

/// Metadata tokens, table ids and coded indices
pub use crate::metadata::{
    tables::{CodedIndex, CodedIndexType, TableId},
    token::Token as MetadataToken,
};

/// Typed records
pub use crate::metadata::records::{
    Assembly, AssemblyRef, CustomAttribute, Event, Field, MemberRef, MethodDef, ModuleDef, Param,
    Property, Record, RecordView, TypeDef, TypeRef, TypeSpec, Version,
};

/// Metadata heaps
pub use crate::metadata::streams::{Blob, Guid, Strings, UserStrings};
