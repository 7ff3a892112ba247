//! Options controlling how a module is loaded.
//!
//! # Examples
//!
//! ```rust,no_run
//! use cilmeta::metadata::{config::LoadOptions, module::ModuleDef};
//! use std::path::Path;
//!
//! // Accept images with unknown streams and resolve everything up front
//! let options = LoadOptions {
//!     strict_stream_names: false,
//!     ..LoadOptions::eager()
//! };
//! let module = ModuleDef::from_file_with(Path::new("obfuscated.dll"), options)?;
//! # Ok::<(), cilmeta::Error>(())
//! ```

/// Default recursion limit of the signature type decoder
pub const MAX_SIGNATURE_DEPTH: usize = 50;

/// Loading behaviour of a module.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadOptions {
    /// Reject stream names outside the known set as malformed; when `false` such streams are
    /// skipped with a warning
    pub strict_stream_names: bool,
    /// Nesting depth at which a type signature is considered invalid
    pub max_signature_depth: usize,
    /// Resolve every entity of the module in parallel right after loading
    pub preload: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        LoadOptions {
            strict_stream_names: true,
            max_signature_depth: MAX_SIGNATURE_DEPTH,
            preload: false,
        }
    }
}

impl LoadOptions {
    /// Skip unknown streams instead of failing
    #[must_use]
    pub fn lenient() -> Self {
        LoadOptions {
            strict_stream_names: false,
            ..Self::default()
        }
    }

    /// Resolve every entity up front
    #[must_use]
    pub fn eager() -> Self {
        LoadOptions {
            preload: true,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets() {
        let default = LoadOptions::default();
        assert!(default.strict_stream_names);
        assert!(!default.preload);
        assert_eq!(default.max_signature_depth, 50);

        assert!(!LoadOptions::lenient().strict_stream_names);
        assert!(LoadOptions::eager().preload);
        assert!(LoadOptions::eager().strict_stream_names);
    }
}
