//! Stream headers of the metadata root.
//!
//! # Reference
//! - [ECMA-335 II.24.2.2](https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf)

use crate::{file::io::read_le, Error::OutOfBounds, Result};

/// Every stream name a metadata root may carry.
pub const STREAM_NAMES: [&str; 9] = [
    "#~", "#-", "#Strings", "#US", "#Blob", "#GUID", "#Pdb", "#JTD", "#Schema",
];

/// A stream header provides the name, and the position and length of a particular table or
/// heap. The header is not of fixed size: its NUL-terminated name is padded to the next
/// 4-byte boundary.
///
/// # Examples
///
/// ```rust
/// use cilmeta::metadata::streams::StreamHeader;
///
/// let data = [0x6C, 0x00, 0x00, 0x00, 0xA4, 0x45, 0x00, 0x00, 0x23, 0x7E, 0x00, 0x00];
/// let header = StreamHeader::from(&data)?;
/// assert_eq!(header.name, "#~");
/// assert_eq!(header.header_size, 12);
/// # Ok::<(), cilmeta::Error>(())
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StreamHeader {
    /// Offset of the stream, relative to the metadata root
    pub offset: u32,
    /// Size of this stream in bytes, shall be a multiple of 4
    pub size: u32,
    /// Name of the stream, at most 32 characters
    pub name: String,
    /// Bytes this header occupies, including name padding
    pub header_size: usize,
}

impl StreamHeader {
    /// Create a `StreamHeader` object from a sequence of bytes
    ///
    /// # Arguments
    /// * 'data' - The byte slice from which this object shall be created
    ///
    /// # Errors
    /// Returns an error if the data is too short or the name is not NUL-terminated within 32
    /// bytes.
    pub fn from(data: &[u8]) -> Result<StreamHeader> {
        if data.len() < 9 {
            return Err(OutOfBounds);
        }

        let name_area = &data[8..data.len().min(8 + 32)];
        let Some(name_len) = name_area.iter().position(|byte| *byte == 0) else {
            return Err(malformed_error!("Stream header name is not terminated"));
        };

        let name: String = name_area[..name_len].iter().map(|c| char::from(*c)).collect();

        // NUL terminator, then padding to 4 bytes
        let header_size = 8 + ((name_len + 1 + 3) & !3);

        Ok(StreamHeader {
            offset: read_le::<u32>(data)?,
            size: read_le::<u32>(&data[4..])?,
            name,
            header_size,
        })
    }

    /// `true` if the name is one a metadata root may carry
    #[must_use]
    pub fn is_known(&self) -> bool {
        STREAM_NAMES.contains(&self.name.as_str())
    }

    /// `true` for the compressed `#~` or uncompressed `#-` tables stream
    #[must_use]
    pub fn is_tables(&self) -> bool {
        self.name == "#~" || self.name == "#-"
    }
}
