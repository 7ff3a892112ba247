//! The metadata root.
//!
//! The metadata root is the entry point into the metadata of a managed image: a small header
//! starting with the `BSJB` signature, a runtime version string, and the headers of all streams.
//! Locating the streams is where most structural validation happens:
//!
//! - every stream must lie inside the metadata and its offset arithmetic must not overflow
//! - every stream name must be one of the known names (unless loading leniently)
//! - exactly one tables stream (`#~` or `#-`) must be present
//!
//! Heaps that appear more than once are resolved to their first occurrence.
//!
//! # Reference
//! - [ECMA-335 II.24.2.1](https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf)

use tracing::{debug, warn};

use crate::{
    file::io::{read_le, read_le_at},
    metadata::{config::LoadOptions, streams::StreamHeader},
    Error::OutOfBounds,
    Result,
};

/// The magic signature of the metadata root, `BSJB`
pub const CIL_HEADER_MAGIC: u32 = 0x424A_5342;

/// The metadata root header with all stream headers.
///
/// # Examples
///
/// ```rust,no_run
/// use cilmeta::metadata::root::Root;
///
/// # fn example(metadata: &[u8]) -> cilmeta::Result<()> {
/// let root = Root::read(metadata)?;
/// println!("Runtime: {}", root.version);
/// let tables = root.tables_stream()?;
/// println!("{} at +0x{:x}, {} bytes", tables.name, tables.offset, tables.size);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Root {
    /// Magic signature, `0x424A5342`
    pub signature: u32,
    /// Major version, 1
    pub major_version: u16,
    /// Minor version, 1
    pub minor_version: u16,
    /// Reserved, always 0
    pub reserved: u32,
    /// Length of the padded version string area
    pub length: u32,
    /// Runtime version string, e.g. `v4.0.30319`
    pub version: String,
    /// Reserved, always 0
    pub flags: u16,
    /// Number of stream headers in the image
    pub stream_number: u16,
    /// The accepted stream headers, in image order
    pub stream_headers: Vec<StreamHeader>,
}

impl Root {
    /// Read the metadata root with default options
    ///
    /// # Errors
    /// See [`Root::read_with`].
    pub fn read(data: &[u8]) -> Result<Root> {
        Self::read_with(data, &LoadOptions::default())
    }

    /// Read the metadata root
    ///
    /// ## Arguments
    /// * 'data'    - All bytes of the metadata, starting with the root
    /// * 'options' - Controls whether unknown stream names are fatal
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] for a bad signature, a stream outside of `data`,
    /// an invalid stream name, or a missing or duplicated tables stream.
    pub fn read_with(data: &[u8], options: &LoadOptions) -> Result<Root> {
        if data.len() < 20 {
            return Err(OutOfBounds);
        }

        let signature = read_le::<u32>(data)?;
        if signature != CIL_HEADER_MAGIC {
            return Err(malformed_error!(
                "CIL_HEADER_MAGIC does not match - 0x{:08x}",
                signature
            ));
        }

        let length = read_le::<u32>(&data[12..])?;
        let Some(version_end) = (length as usize).checked_add(16) else {
            return Err(malformed_error!("Version string length overflows - {}", length));
        };
        let Some(version_bytes) = data.get(16..version_end) else {
            return Err(OutOfBounds);
        };

        let version: String = version_bytes
            .iter()
            .take_while(|byte| **byte != 0)
            .map(|byte| char::from(*byte))
            .collect();

        let mut offset = version_end;
        let flags = read_le_at::<u16>(data, &mut offset)?;
        let stream_number = read_le_at::<u16>(data, &mut offset)?;

        let mut stream_headers = Vec::with_capacity(usize::from(stream_number));
        for _ in 0..stream_number {
            let Some(header_data) = data.get(offset..) else {
                return Err(OutOfBounds);
            };

            let header = StreamHeader::from(header_data)?;
            offset += header.header_size;

            let Some(stream_end) = header.offset.checked_add(header.size) else {
                return Err(malformed_error!(
                    "Stream offset and size cause integer overflow - {} + {}",
                    header.offset,
                    header.size
                ));
            };
            if stream_end as usize > data.len() {
                return Err(malformed_error!(
                    "Stream {} ends at 0x{:x}, past the end of the metadata (0x{:x})",
                    header.name,
                    stream_end,
                    data.len()
                ));
            }

            if !header.is_known() {
                if options.strict_stream_names {
                    return Err(malformed_error!("Invalid stream header name - {}", header.name));
                }

                warn!(name = %header.name, "skipping unknown stream");
                continue;
            }

            stream_headers.push(header);
        }

        let tables_streams = stream_headers.iter().filter(|s| s.is_tables()).count();
        match tables_streams {
            0 => return Err(malformed_error!("Missing tables stream")),
            1 => {}
            _ => return Err(malformed_error!("More than one tables stream")),
        }

        for (index, header) in stream_headers.iter().enumerate() {
            if stream_headers[..index].iter().any(|s| s.name == header.name) {
                debug!(name = %header.name, offset = header.offset, "ignoring duplicate stream");
            }
        }

        Ok(Root {
            signature,
            major_version: read_le::<u16>(&data[4..])?,
            minor_version: read_le::<u16>(&data[6..])?,
            reserved: read_le::<u32>(&data[8..])?,
            length,
            version,
            flags,
            stream_number,
            stream_headers,
        })
    }

    /// The header of the single tables stream
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if there is none; [`Root::read`] already rejects
    /// such images.
    pub fn tables_stream(&self) -> Result<&StreamHeader> {
        self.stream_headers
            .iter()
            .find(|s| s.is_tables())
            .ok_or_else(|| malformed_error!("Missing tables stream"))
    }

    /// The first stream header named `name`
    #[must_use]
    pub fn stream(&self, name: &str) -> Option<&StreamHeader> {
        self.stream_headers.iter().find(|s| s.name == name)
    }
}
