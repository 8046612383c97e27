//! The metadata root (ECMA-335 II.24.2.1).
//!
//! The root starts with the `BSJB` signature, carries the runtime version string the module
//! was built against and lists the stream headers. Stream offsets are relative to the start of
//! the root, and every stream must lie entirely inside the metadata directory.
//!
//! ```text
//! +0   Signature       u32  0x424A5342
//! +4   MajorVersion    u16
//! +6   MinorVersion    u16
//! +8   Reserved        u32
//! +12  Length          u32  version buffer size, multiple of 4
//! +16  Version         [u8; Length]
//! +..  Flags           u16
//! +..  Streams         u16
//! +..  StreamHeaders   [StreamHeader; Streams]
//! ```

use crate::{
    file::parser::Parser,
    metadata::streams::StreamHeader,
    Error::OutOfBounds,
    Result,
};

/// `BSJB`
pub const CIL_HEADER_MAGIC: u32 = 0x424A_5342;

/// Longest version buffer ECMA-335 allows.
const MAX_VERSION_LENGTH: u32 = 255;

/// The parsed metadata root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Root {
    /// Magic signature, `0x424A5342`
    pub signature: u32,
    /// Major version, 1
    pub major_version: u16,
    /// Minor version, 1
    pub minor_version: u16,
    /// Reserved, 0
    pub reserved: u32,
    /// Size of the version buffer including padding
    pub length: u32,
    /// Runtime version string, e.g. `v4.0.30319`
    pub version: String,
    /// Reserved, 0
    pub flags: u16,
    /// Number of stream headers
    pub stream_number: u16,
    /// The stream headers in declaration order
    pub stream_headers: Vec<StreamHeader>,
}

impl Root {
    /// Parse the metadata root from the bytes of the metadata directory.
    ///
    /// # Errors
    /// Returns [`crate::Error::BadImageFormat`] for a wrong signature, an invalid version
    /// length, a zero stream count or a stream outside the directory, and
    /// [`crate::Error::OutOfBounds`] for truncated data.
    pub fn read(data: &[u8]) -> Result<Root> {
        if data.len() < 20 {
            return Err(OutOfBounds);
        }

        let mut parser = Parser::new(data);

        let signature = parser.read_le::<u32>()?;
        if signature != CIL_HEADER_MAGIC {
            return Err(malformed_error!(
                "CIL_HEADER_MAGIC does not match - 0x{:08X}",
                signature
            ));
        }

        let major_version = parser.read_le::<u16>()?;
        let minor_version = parser.read_le::<u16>()?;
        let reserved = parser.read_le::<u32>()?;

        let length = parser.read_le::<u32>()?;
        if length % 4 != 0 || length > MAX_VERSION_LENGTH + 1 {
            return Err(malformed_error!("Invalid version string length - {}", length));
        }

        let version_buffer = parser.read_bytes(length as usize)?;
        let version_len = version_buffer
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(version_buffer.len());
        let version = String::from_utf8_lossy(&version_buffer[..version_len]).into_owned();

        let flags = parser.read_le::<u16>()?;
        let stream_number = parser.read_le::<u16>()?;
        if stream_number == 0 {
            return Err(malformed_error!("Metadata root declares no streams"));
        }

        let mut stream_headers = Vec::with_capacity(usize::from(stream_number));
        for _ in 0..stream_number {
            let header = StreamHeader::read(&mut parser)?;

            let Some(end) = header.offset.checked_add(header.size) else {
                return Err(malformed_error!(
                    "Stream offset and size cause integer overflow - {} + {}",
                    header.offset,
                    header.size
                ));
            };

            if end as usize > data.len() {
                return Err(malformed_error!(
                    "Stream {} ({}+{}) exceeds the metadata directory of {} bytes",
                    header.name,
                    header.offset,
                    header.size,
                    data.len()
                ));
            }

            stream_headers.push(header);
        }

        Ok(Root {
            signature,
            major_version,
            minor_version,
            reserved,
            length,
            version,
            flags,
            stream_number,
            stream_headers,
        })
    }
}
