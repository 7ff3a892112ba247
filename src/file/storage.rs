//! Where the bytes of an image live.
//!
//! Images on disk are mapped with `memmap2`; row lookups jump between tables and heaps, and the
//! mapping lets the operating system page in only what is touched. Images that were already
//! read are kept in their buffer.

use std::{fs, path::Path};

use memmap2::Mmap;

use crate::{
    Error::{Error, FileError, OutOfBounds},
    Result,
};

/// The backing bytes of a [`crate::file::File`]
#[derive(Debug)]
pub enum Storage {
    /// A read-only mapping of a file
    Mapped(Mmap),
    /// An owned buffer
    Owned(Vec<u8>),
}

impl Storage {
    /// Map the file at `path`
    ///
    /// # Errors
    /// Returns [`crate::Error::FileError`] if the file cannot be opened, or
    /// [`crate::Error::Error`] if mapping it fails.
    pub fn map(path: impl AsRef<Path>) -> Result<Storage> {
        let file = fs::File::open(path).map_err(FileError)?;

        // The mapping is read-only; the file must not be truncated while it is alive
        let mmap = unsafe { Mmap::map(&file) }.map_err(|error| Error(error.to_string()))?;
        Ok(Storage::Mapped(mmap))
    }

    /// All bytes
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        match self {
            Storage::Mapped(mmap) => &mmap[..],
            Storage::Owned(data) => data.as_slice(),
        }
    }

    /// `len` bytes starting at `offset`
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the range leaves the data.
    pub fn range(&self, offset: usize, len: usize) -> Result<&[u8]> {
        let end = offset.checked_add(len).ok_or(OutOfBounds)?;
        self.bytes().get(offset..end).ok_or(OutOfBounds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn owned() {
        let mut data = vec![0xCC_u8; 64];
        data[10..15].copy_from_slice(&[0xBB; 5]);
        let storage = Storage::Owned(data);

        assert_eq!(storage.bytes().len(), 64);
        assert_eq!(storage.range(10, 5).unwrap(), &[0xBB; 5]);
        assert!(storage.range(60, 5).is_err());
        assert!(storage.range(usize::MAX, 1).is_err());
        assert_eq!(storage.range(64, 0).unwrap(), &[] as &[u8]);
    }

    #[test]
    fn mapped() {
        let path = std::env::temp_dir().join(format!("cilmeta_storage_{}", std::process::id()));
        {
            let mut file = fs::File::create(&path).unwrap();
            file.write_all(&[0x4D, 0x5A, 0x90, 0x00, 0x03, 0x00]).unwrap();
        }

        let storage = Storage::map(&path).unwrap();
        assert!(matches!(storage, Storage::Mapped(_)));
        assert_eq!(storage.range(0, 2).unwrap(), b"MZ");
        assert!(storage.range(4, 4).is_err());

        drop(storage);
        fs::remove_file(&path).unwrap();

        assert!(matches!(
            Storage::map("this_file_does_not_exist.dll"),
            Err(FileError(_))
        ));
    }
}
