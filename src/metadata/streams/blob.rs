//! The `#Blob` heap.
//!
//! Binary data referenced by the tables: signatures, public keys, custom attribute values,
//! constant values and marshalling descriptors. Every entry starts with a compressed length.
//!
//! # Reference
//! - [ECMA-335 II.24.2.4](https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf)

use crate::{file::parser::Parser, Error::OutOfBounds, Result};

/// View over a `#Blob` heap.
///
/// # Examples
///
/// ```rust
/// use cilmeta::metadata::streams::Blob;
///
/// let data = [0x00, 0x03, 0x20, 0x00, 0x01];
/// let blob = Blob::from(&data)?;
/// assert_eq!(blob.get(1)?, &[0x20, 0x00, 0x01]);
/// # Ok::<(), cilmeta::Error>(())
/// ```
#[derive(Clone, Copy, Debug)]
pub struct Blob<'a> {
    data: &'a [u8],
}

impl<'a> Blob<'a> {
    /// Create a `Blob` heap view
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the heap is empty or does not start with 0.
    pub fn from(data: &'a [u8]) -> Result<Blob<'a>> {
        if data.is_empty() || data[0] != 0 {
            return Err(malformed_error!("Invalid memory for #Blob heap"));
        }

        Ok(Blob { data })
    }

    /// The payload of the entry at `index`
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the entry leaves the heap.
    pub fn get(&self, index: usize) -> Result<&'a [u8]> {
        if index >= self.data.len() {
            return Err(OutOfBounds);
        }

        let mut parser = Parser::new(&self.data[index..]);
        let len = parser.read_compressed_uint()? as usize;
        let skip = parser.pos();

        let Some(data_start) = index.checked_add(skip) else {
            return Err(OutOfBounds);
        };

        let Some(data_end) = data_start.checked_add(len) else {
            return Err(OutOfBounds);
        };

        if data_end > self.data.len() {
            return Err(OutOfBounds);
        }

        Ok(&self.data[data_start..data_end])
    }

    /// Size of the heap in bytes
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// `true` if the heap holds no bytes
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Iterate over all entries as `(offset, payload)` pairs
    #[must_use]
    pub fn iter(&self) -> BlobIterator<'a> {
        BlobIterator {
            blob: *self,
            position: 1,
        }
    }
}

impl<'a> IntoIterator for &Blob<'a> {
    type Item = Result<(usize, &'a [u8])>;
    type IntoIter = BlobIterator<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the entries of a [`Blob`] heap, starting after the leading empty entry.
///
/// Iteration stops after the first malformed entry has been reported.
pub struct BlobIterator<'a> {
    blob: Blob<'a>,
    position: usize,
}

impl<'a> Iterator for BlobIterator<'a> {
    type Item = Result<(usize, &'a [u8])>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.position >= self.blob.data.len() {
            return None;
        }

        let start_position = self.position;
        let mut parser = Parser::new(&self.blob.data[start_position..]);
        let header = parser.read_compressed_uint().map(|_| parser.pos());

        match (header, self.blob.get(start_position)) {
            (Ok(length_bytes), Ok(blob_data)) => {
                self.position += length_bytes + blob_data.len();
                Some(Ok((start_position, blob_data)))
            }
            (Err(error), _) | (_, Err(error)) => {
                self.position = self.blob.data.len();
                Some(Err(error))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crafted() {
        #[rustfmt::skip]
        let data = {
            let mut data = vec![0xCC; 300];
            /* i - 0    - should always be 0    */ data[0]          = 0b_00000000_u8;

            /* i - 1    - len 10                */ data[1]          = 0b_00001010_u8;
            /* i - 1    - len 10                */ data[2..12]      .copy_from_slice(&[0x0A; 10]);

            /* i - 12   - len 5                 */ data[12]         = 0b_00000101_u8;
            /* i - 12   - len 5                 */ data[13..18]     .copy_from_slice(&[0xAB; 5]);

            /* i - 18   - len 257               */ data[18]         = 0b_10000001_u8;
            /* i - 18   - len 257               */ data[19]         = 0b_00000001_u8;
            /* i - 18   - len 257               */ data[20..277]    .copy_from_slice(&[0xBA; 257]);
            data.truncate(277);
            data
        };

        let blob = Blob::from(&data).unwrap();

        assert_eq!(blob.get(0).unwrap().len(), 0);
        assert_eq!(blob.get(1).unwrap(), &[0x0A; 10]);
        assert_eq!(blob.get(12).unwrap(), &[0xAB; 5]);
        assert_eq!(blob.get(18).unwrap(), &[0xBA; 257][..]);

        let offsets: Vec<usize> = blob.iter().map(|entry| entry.unwrap().0).collect();
        assert_eq!(offsets, [1, 12, 18]);
    }

    #[test]
    fn invalid() {
        assert!(Blob::from(&[]).is_err());
        assert!(Blob::from(&[0x01, 0x00]).is_err());

        let blob = Blob::from(&[0x00, 0x05, 0x01, 0x02]).unwrap();
        assert!(matches!(blob.get(1), Err(OutOfBounds)));
        assert!(matches!(blob.get(4), Err(OutOfBounds)));

        let mut iter = blob.iter();
        assert!(iter.next().unwrap().is_err());
        assert!(iter.next().is_none());
    }
}
