//! Load-time options for metadata reading.
//!
//! The layout math, signatures, bounds, heap invariants and stream classification are checked
//! unconditionally. [`LoadOptions`] only decides how two softer classes of irregularity are
//! treated: reserved fields and undefined flag bits of the CLI header, and tables that ECMA-335
//! requires to be sorted but whose sorted bit is clear in the table stream header.

/// Options for opening a module image.
///
/// # Examples
///
/// ```rust,no_run
/// use ironscope::{LoadOptions, ModuleView};
/// use std::path::Path;
///
/// let view = ModuleView::from_file_with(Path::new("module.dll"), LoadOptions::strict())?;
/// # Ok::<(), ironscope::Error>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    /// Enforce the reserved fields, defined flag bits and RVA/size pairing of the CLI header.
    pub validate_cor20_header: bool,

    /// Reject images where a table with rows lacks its sorted bit even though ECMA-335 requires
    /// it sorted. When `false`, lookups on such tables fall back to a linear scan.
    pub require_sorted_tables: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            validate_cor20_header: true,
            require_sorted_tables: false,
        }
    }
}

impl LoadOptions {
    /// Every check enabled.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            validate_cor20_header: true,
            require_sorted_tables: true,
        }
    }

    /// Only the checks random-access reading depends on. Useful for obfuscated images that
    /// put garbage into reserved fields.
    #[must_use]
    pub fn lenient() -> Self {
        Self {
            validate_cor20_header: false,
            require_sorted_tables: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets() {
        let default = LoadOptions::default();
        assert!(default.validate_cor20_header);
        assert!(!default.require_sorted_tables);

        let strict = LoadOptions::strict();
        assert!(strict.validate_cor20_header);
        assert!(strict.require_sorted_tables);

        let lenient = LoadOptions::lenient();
        assert!(!lenient.validate_cor20_header);
        assert!(!lenient.require_sorted_tables);
    }
}
