use crate::{file::parser::Parser, Result};

/// Longest stream name ECMA-335 allows, excluding the terminator.
pub const MAX_STREAM_NAME: usize = 32;

/// A stream header of the metadata root (ECMA-335 II.24.2.2).
///
/// Names which stream lives where inside the metadata. Headers are consumed once while the
/// streams are classified and are kept on [`crate::metadata::root::Root`] for inspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamHeader {
    /// Offset of the stream, relative to the start of the metadata root
    pub offset: u32,
    /// Size of the stream in bytes
    pub size: u32,
    /// Stream name, e.g. `#Strings`
    pub name: String,
}

impl StreamHeader {
    /// Read one stream header at the parser position and advance past its 4-byte aligned name.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] for truncated data, or
    /// [`crate::Error::BadImageFormat`] if the name is unterminated, longer than 32 characters
    /// or not ASCII.
    pub fn read(parser: &mut Parser) -> Result<StreamHeader> {
        let offset = parser.read_le::<u32>()?;
        let size = parser.read_le::<u32>()?;

        let name_start = parser.pos();
        let window = &parser.data()[name_start..];
        let Some(name_len) = window
            .iter()
            .take(MAX_STREAM_NAME + 1)
            .position(|&b| b == 0)
        else {
            return Err(malformed_error!(
                "Stream name at offset {} is unterminated or longer than {} characters",
                name_start,
                MAX_STREAM_NAME
            ));
        };

        let raw = &window[..name_len];
        if !raw.is_ascii() {
            return Err(malformed_error!(
                "Stream name at offset {} is not ASCII",
                name_start
            ));
        }
        let name = String::from_utf8_lossy(raw).into_owned();

        // terminator included, padded to the next 4-byte boundary
        let padded = (name_len + 1 + 3) & !3;
        parser.advance_by(padded)?;

        Ok(StreamHeader { offset, size, name })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crafted() {
        #[rustfmt::skip]
        let header_bytes = [
            0x6C, 0x00, 0x00, 0x00,
            0xA4, 0x45, 0x00, 0x00,
            b'#', b'~', 0x00, 0x00,
            0xFF,
        ];

        let mut parser = Parser::new(&header_bytes);
        let header = StreamHeader::read(&mut parser).unwrap();

        assert_eq!(header.offset, 0x6C);
        assert_eq!(header.size, 0x45A4);
        assert_eq!(header.name, "#~");
        assert_eq!(parser.pos(), 12);
    }

    #[test]
    fn padding_of_four_char_names() {
        #[rustfmt::skip]
        let header_bytes = [
            0x00, 0x00, 0x00, 0x00,
            0x10, 0x00, 0x00, 0x00,
            b'#', b'U', b'S', 0x00,
            0x6C, 0x00, 0x00, 0x00,
            0x10, 0x00, 0x00, 0x00,
            b'#', b'G', b'U', b'I', b'D', 0x00, 0x00, 0x00,
        ];

        let mut parser = Parser::new(&header_bytes);
        assert_eq!(StreamHeader::read(&mut parser).unwrap().name, "#US");
        assert_eq!(parser.pos(), 12);
        assert_eq!(StreamHeader::read(&mut parser).unwrap().name, "#GUID");
        assert_eq!(parser.pos(), 28);
    }

    #[test]
    fn unterminated_name() {
        let mut header_bytes = vec![0_u8; 8];
        header_bytes.extend(std::iter::repeat(b'A').take(40));

        let mut parser = Parser::new(&header_bytes);
        assert!(StreamHeader::read(&mut parser).is_err());

        let mut parser = Parser::new(&[0x00, 0x00, 0x00, 0x00, 0x01]);
        assert!(StreamHeader::read(&mut parser).is_err());
    }
}
