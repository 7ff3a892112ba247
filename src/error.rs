use thiserror::Error;

use crate::metadata::tables::{CodedIndexType, TableId};

/// Builds a [`crate::Error::Malformed`] that records where the malformation was detected.
///
/// ```rust, ignore
/// return Err(malformed_error!("Invalid stream header name - {}", name));
/// ```
macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Structural problems of an image (bad magic values, overlapping or out-of-range streams,
/// a missing or duplicated tables stream, arithmetic overflow while laying out tables) are
/// always reported through this type and abort loading. References that fail to resolve and
/// signatures that cannot be decoded are *not* errors: the entity model and the signature
/// reader report them as `None` so that one bad row does not take down a whole module.
///
/// # Examples
///
/// ```rust,no_run
/// use cilmeta::{Error, metadata::module::ModuleDef};
/// use std::path::Path;
///
/// match ModuleDef::from_file(Path::new("assembly.dll")) {
///     Ok(module) => println!("Loaded {:?}", module.name()),
///     Err(Error::Malformed { message, file, line }) => {
///         eprintln!("Malformed image: {} ({}:{})", message, file, line);
///     }
///     Err(e) => eprintln!("Other error: {}", e),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The image violates a structural rule of the metadata format.
    ///
    /// Carries the source location of the check that failed.
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// An out of bound access was attempted while parsing the file.
    #[error("Out of Bound read would have occurred!")]
    OutOfBounds,

    /// The input uses a format feature this crate does not read.
    #[error("Not supported")]
    NotSupported,

    /// Provided input was empty.
    #[error("Provided input was empty")]
    Empty,

    /// File I/O error.
    #[error("{0}")]
    FileError(#[from] std::io::Error),

    /// Error from the goblin crate during PE parsing.
    #[error("{0}")]
    GoblinErr(#[from] goblin::error::Error),

    /// A table can not be encoded with a coded index kind that does not list it.
    #[error("Table {table:?} is not a member of coded index {kind:?}")]
    CodedIndex {
        /// The table that was requested
        table: TableId,
        /// The coded index kind the encoding was attempted with
        kind: CodedIndexType,
    },

    /// A signature nests types deeper than [`crate::metadata::config::LoadOptions`] allows.
    #[error("Signature nesting exceeds the limit of {0}")]
    RecursionLimit(usize),

    /// Generic error for miscellaneous failures.
    #[error("{0}")]
    Error(String),
}
