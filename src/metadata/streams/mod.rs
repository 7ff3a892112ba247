//! Metadata streams: the four heaps and the tables stream.
//!
//! - [`Strings`] (`#Strings`): NUL-terminated UTF-8 identifiers
//! - [`UserStrings`] (`#US`): length-prefixed UTF-16 string literals
//! - [`Blob`] (`#Blob`): length-prefixed binary data such as signatures
//! - [`Guid`] (`#GUID`): 16-byte GUIDs addressed by a 1-based index
//! - [`TablesStream`] (`#~` or `#-`): the metadata tables
//!
//! All heaps are borrowed views; nothing is copied out of the image.
//!
//! # Reference
//! - [ECMA-335 II.24.2](https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf)

mod blob;
mod guid;
mod streamheader;
mod strings;
mod tablesstream;
mod userstrings;

pub use blob::{Blob, BlobIterator};
pub use guid::Guid;
pub use streamheader::{StreamHeader, STREAM_NAMES};
pub use strings::Strings;
pub use tablesstream::{MDStreamFlags, TablesStream};
pub use userstrings::UserStrings;
