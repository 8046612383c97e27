//! Metadata streams (ECMA-335 II.24.2.2 - II.24.2.6).
//!
//! The metadata root lists its streams by name. Five kinds exist:
//!
//! - **`#Strings`** - UTF-8 identifiers, zero terminated, addressed by byte offset
//! - **`#US`** - UTF-16 string literals with a compressed length prefix
//! - **`#Blob`** - length-prefixed binary data such as signatures
//! - **`#GUID`** - an array of 16-byte GUIDs, addressed by 1-based index
//! - **`#~`** / **`#-`** - the compressed or uncompressed table stream
//!
//! [`Streams::classify`] maps the stream headers of a [`crate::metadata::root::Root`] onto these
//! kinds. Any name outside the list, a repeated name or a missing mandatory stream rejects the
//! image, since every table row depends on the heaps resolving correctly.

mod blob;
mod guid;
mod streamheader;
mod strings;
mod userstrings;

pub use blob::{Blob, BlobIterator};
pub use guid::Guid;
pub use streamheader::{StreamHeader, MAX_STREAM_NAME};
pub use strings::Strings;
pub use userstrings::UserStrings;

use crate::Result;

/// The stream headers of one image, sorted by kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Streams {
    /// `#Strings`
    pub strings: StreamHeader,
    /// `#Blob`, absent when no row references blob data
    pub blob: Option<StreamHeader>,
    /// `#GUID`
    pub guid: StreamHeader,
    /// `#US`, absent when the module has no string literals
    pub user_strings: Option<StreamHeader>,
    /// `#~` or `#-`
    pub tables: StreamHeader,
    /// `true` if the table stream is the uncompressed `#-`
    pub uncompressed: bool,
}

impl Streams {
    /// Classify stream headers by their exact names.
    ///
    /// # Errors
    /// Returns [`crate::Error::BadImageFormat`] for unknown or duplicate names, for `#~` and
    /// `#-` appearing together, and when `#Strings`, `#GUID` or the table stream is missing.
    pub fn classify(headers: &[StreamHeader]) -> Result<Streams> {
        let mut strings = None;
        let mut blob = None;
        let mut guid = None;
        let mut user_strings = None;
        let mut compressed = None;
        let mut uncompressed = None;

        for header in headers {
            let slot = match header.name.as_str() {
                "#Strings" => &mut strings,
                "#Blob" => &mut blob,
                "#GUID" => &mut guid,
                "#US" => &mut user_strings,
                "#~" => &mut compressed,
                "#-" => &mut uncompressed,
                _ => {
                    return Err(malformed_error!("Unknown stream - '{}'", header.name));
                }
            };

            if slot.is_some() {
                return Err(malformed_error!("Duplicate stream - '{}'", header.name));
            }
            *slot = Some(header.clone());
        }

        let (tables, is_uncompressed) = match (compressed, uncompressed) {
            (Some(tables), None) => (tables, false),
            (None, Some(tables)) => (tables, true),
            (Some(_), Some(_)) => {
                return Err(malformed_error!(
                    "Both '#~' and '#-' table streams are present"
                ))
            }
            (None, None) => return Err(malformed_error!("No table stream present")),
        };

        let Some(strings) = strings else {
            return Err(malformed_error!("Mandatory '#Strings' stream is missing"));
        };
        let Some(guid) = guid else {
            return Err(malformed_error!("Mandatory '#GUID' stream is missing"));
        };

        Ok(Streams {
            strings,
            blob,
            guid,
            user_strings,
            tables,
            uncompressed: is_uncompressed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(name: &str) -> StreamHeader {
        StreamHeader {
            offset: 0x6C,
            size: 4,
            name: name.to_string(),
        }
    }

    fn headers(names: &[&str]) -> Vec<StreamHeader> {
        names.iter().map(|name| header(name)).collect()
    }

    #[test]
    fn complete() {
        let streams =
            Streams::classify(&headers(&["#~", "#Strings", "#US", "#GUID", "#Blob"])).unwrap();

        assert_eq!(streams.tables.name, "#~");
        assert!(!streams.uncompressed);
        assert!(streams.blob.is_some());
        assert!(streams.user_strings.is_some());
    }

    #[test]
    fn minimal_uncompressed() {
        let streams = Streams::classify(&headers(&["#-", "#Strings", "#GUID"])).unwrap();

        assert!(streams.uncompressed);
        assert!(streams.blob.is_none());
        assert!(streams.user_strings.is_none());
    }

    #[test]
    fn rejected() {
        for names in [
            &["#~", "#Strings", "#GUID", "#Strings"][..],
            &["#~", "#-", "#Strings", "#GUID"],
            &["#~", "#Strings", "#GUID", "#Pdb"],
            &["#~", "#strings", "#GUID"],
            &["#~", "#GUID"],
            &["#~", "#Strings"],
            &["#Strings", "#GUID", "#Blob"],
            &[],
        ] {
            assert!(Streams::classify(&headers(names)).is_err(), "{:?}", names);
        }
    }
}
