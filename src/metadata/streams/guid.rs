//! The `#GUID` heap.
//!
//! A plain array of 16-byte GUIDs addressed by a 1-based index; index 0 is the null reference.
//!
//! # Reference
//! - [ECMA-335 II.24.2.5](https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf)

use crate::{Error::OutOfBounds, Result};

/// View over a `#GUID` heap.
#[derive(Clone, Copy, Debug)]
pub struct Guid<'a> {
    data: &'a [u8],
}

impl<'a> Guid<'a> {
    /// Create a `Guid` heap view
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the heap can not hold a single GUID.
    pub fn from(data: &'a [u8]) -> Result<Guid<'a>> {
        if data.len() < 16 {
            return Err(malformed_error!("Data for #GUID heap is too small"));
        }

        Ok(Guid { data })
    }

    /// The GUID at the 1-based `index`
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] for index 0 or an index past the end of the heap.
    pub fn get(&self, index: usize) -> Result<uguid::Guid> {
        if index == 0 {
            return Err(OutOfBounds);
        }

        let Some(start) = (index - 1).checked_mul(16) else {
            return Err(OutOfBounds);
        };
        let Some(end) = start.checked_add(16) else {
            return Err(OutOfBounds);
        };
        let Some(entry) = self.data.get(start..end) else {
            return Err(OutOfBounds);
        };

        let mut buffer = [0u8; 16];
        buffer.copy_from_slice(entry);

        Ok(uguid::Guid::from_bytes(buffer))
    }

    /// Number of GUIDs in the heap
    #[must_use]
    pub fn count(&self) -> usize {
        self.data.len() / 16
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crafted() {
        #[rustfmt::skip]
        let data : [u8; 48] = [
            0x8e, 0x90, 0x37, 0xd4, 0xe6, 0x65, 0x7c, 0x48, 0x97, 0x35, 0x7b, 0xdf, 0xf6, 0x99, 0xbe, 0xa5,
            0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA,
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        ];

        let guids = Guid::from(&data).unwrap();

        assert_eq!(guids.count(), 3);
        assert_eq!(
            guids.get(1).unwrap(),
            uguid::guid!("d437908e-65e6-487c-9735-7bdff699bea5")
        );
        assert_eq!(
            guids.get(2).unwrap(),
            uguid::guid!("AAAAAAAA-AAAA-AAAA-AAAA-AAAAAAAAAAAA")
        );
        assert_eq!(
            guids.get(3).unwrap(),
            uguid::guid!("00000000-0000-0000-0000-000000000000")
        );
    }

    #[test]
    fn invalid() {
        assert!(Guid::from(&[0u8; 15]).is_err());

        let guids = Guid::from(&[0u8; 20]).unwrap();
        assert!(matches!(guids.get(0), Err(OutOfBounds)));
        assert!(guids.get(1).is_ok());
        assert!(matches!(guids.get(2), Err(OutOfBounds)));
        assert!(matches!(guids.get(usize::MAX), Err(OutOfBounds)));
    }
}
