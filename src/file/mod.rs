//! Access to the bytes of a managed image.
//!
//! The metadata reader only needs two things from the image it is given: a contiguous view of
//! all bytes, and a way to turn RVAs found in the CLI header into file offsets. This module
//! provides both on top of `goblin` for PE parsing. The bytes are either a mapping of a file on
//! disk or a buffer that was already loaded (see [`Storage`]); [`File`] owns them together with
//! the parsed PE structure that borrows from them.
//!
//! # Examples
//!
//! ```rust,no_run
//! use cilmeta::file::File;
//! use std::path::Path;
//!
//! let file = File::from_file(Path::new("tests/samples/WindowsBase.dll"))?;
//! let (clr_rva, clr_size) = file.clr()?;
//! let clr_offset = file.rva_to_offset(clr_rva)?;
//! println!("CLI header: {} bytes at file offset 0x{:x}", clr_size, clr_offset);
//! # Ok::<(), cilmeta::Error>(())
//! ```

pub mod io;
pub mod parser;

mod storage;

use std::path::Path;

use crate::{
    Error::{Empty, GoblinErr, OutOfBounds},
    Result,
};
use goblin::pe::PE;
use ouroboros::self_referencing;

pub use storage::Storage;

/// A parsed PE image that owns its backing storage.
#[self_referencing]
pub struct File {
    data: Storage,
    #[borrows(data)]
    #[not_covariant]
    pe: PE<'this>,
}

impl File {
    /// Memory-map and parse the PE image at `file`
    ///
    /// # Errors
    /// Returns an error if the file cannot be mapped or is not a managed PE image.
    pub fn from_file(file: &Path) -> Result<File> {
        Self::load(Storage::map(file)?)
    }

    /// Parse a PE image from an owned buffer
    ///
    /// # Errors
    /// Returns an error if `data` is empty or not a managed PE image.
    pub fn from_mem(data: Vec<u8>) -> Result<File> {
        Self::load(Storage::Owned(data))
    }

    fn load(data: Storage) -> Result<File> {
        if data.bytes().is_empty() {
            return Err(Empty);
        }

        File::try_new(data, |data| match PE::parse(data.bytes()) {
            Ok(pe) => match pe.header.optional_header {
                Some(optional_header) => {
                    if optional_header
                        .data_directories
                        .get_clr_runtime_header()
                        .is_none()
                    {
                        Err(malformed_error!(
                            "File does not have a CLR runtime header directory"
                        ))
                    } else {
                        Ok(pe)
                    }
                }
                None => Err(malformed_error!("File does not have an OptionalHeader")),
            },
            Err(error) => Err(GoblinErr(error)),
        })
    }

    /// Length of the image in bytes
    #[must_use]
    pub fn len(&self) -> usize {
        self.data().len()
    }

    /// `true` if the image holds no bytes
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All bytes of the image
    #[must_use]
    pub fn data(&self) -> &[u8] {
        self.with_data(Storage::bytes)
    }

    /// A bounds-checked slice of the image
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the range leaves the image.
    pub fn data_slice(&self, offset: usize, len: usize) -> Result<&[u8]> {
        self.with_data(|data| data.range(offset, len))
    }

    /// RVA and size of the CLI header data directory
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the directory is missing.
    pub fn clr(&self) -> Result<(usize, usize)> {
        self.with_pe(|pe| {
            let Some(clr_dir) = pe
                .header
                .optional_header
                .as_ref()
                .and_then(|header| header.data_directories.get_clr_runtime_header().copied())
            else {
                return Err(malformed_error!("File does not have a CLR runtime header"));
            };

            Ok((clr_dir.virtual_address as usize, clr_dir.size as usize))
        })
    }

    /// Translate a relative virtual address into a file offset
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if no section maps `rva`, or a section header
    /// overflows.
    pub fn rva_to_offset(&self, rva: usize) -> Result<usize> {
        let Ok(rva_u32) = u32::try_from(rva) else {
            return Err(OutOfBounds);
        };

        self.with_pe(|pe| {
            for section in &pe.sections {
                let mapped_size = section.virtual_size.max(section.size_of_raw_data);
                let Some(section_max) = section.virtual_address.checked_add(mapped_size) else {
                    return Err(malformed_error!(
                        "Section malformed, causing integer overflow - {} + {}",
                        section.virtual_address,
                        mapped_size
                    ));
                };

                if section.virtual_address <= rva_u32 && section_max > rva_u32 {
                    return Ok((rva - section.virtual_address as usize)
                        + section.pointer_to_raw_data as usize);
                }
            }

            Err(malformed_error!(
                "RVA could not be converted to offset - {}",
                rva
            ))
        })
    }
}
