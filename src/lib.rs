// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![allow(clippy::too_many_arguments)]

//! # cilmeta
//!
//! A reader for the ECMA-335 metadata embedded in .NET PE images.
//!
//! `cilmeta` parses the compressed (`#~`) and uncompressed (`#-`) tables stream, derives the
//! row layout of every table from the row counts and heap sizes of the image, and projects the
//! raw rows into a typed entity model. Entities are addressed by metadata token, created on
//! first lookup, and resolve each of their fields lazily the first time it is read. Signatures
//! stored in the `#Blob` heap are decoded into typed trees and can be encoded back to bytes.
//!
//! ## Features
//!
//! - **Zero-copy access** - images are memory-mapped; heaps and tables borrow from the mapping
//! - **Lazy entities** - nothing beyond the tables header is parsed until it is asked for
//! - **Stable identity** - resolving a token twice yields the same `Arc`
//! - **Thread-safe** - fields resolve at most once even under concurrent first access
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cilmeta::prelude::*;
//!
//! let module = ModuleDef::from_file("tests/samples/WindowsBase.dll".as_ref())?;
//! if let Some(assembly) = module.assembly() {
//!     println!("{}", assembly.display_name());
//! }
//!
//! for type_def in module.types() {
//!     for method in type_def.methods() {
//!         let params = method.method_sig().map_or(0, |sig| sig.param_count());
//!         println!("{}::{} ({params} parameters)", type_def.full_name(), method.name().unwrap_or_default());
//!     }
//! }
//! # Ok::<(), cilmeta::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`file`] - PE images, memory-mapped or in memory, and the little-endian byte parser
//! - [`metadata`] - root, heaps, tables, entities, signatures and assembly identity
//! - [`prelude`] - re-exports of the commonly used types
//! - [`Error`] and [`Result`] - error handling

#[macro_use]
pub(crate) mod macros;

#[macro_use]
pub(crate) mod error;

/// PE image access and byte parsing
pub mod file;

/// Metadata parsing and the entity model
pub mod metadata;

/// Convenient re-exports of the most commonly used types.
///
/// ```rust,no_run
/// use cilmeta::prelude::*;
///
/// let module = ModuleDef::from_file("tests/samples/WindowsBase.dll".as_ref())?;
/// println!("{} type references", module.type_refs().len());
/// # Ok::<(), cilmeta::Error>(())
/// ```
pub mod prelude;

/// `cilmeta` Result type
pub type Result<T> = std::result::Result<T, Error>;

/// `cilmeta` Error type
///
/// # Examples
///
/// ```rust,no_run
/// use cilmeta::{metadata::module::ModuleDef, Error};
///
/// match ModuleDef::from_file(std::path::Path::new("tests/samples/crafted_2.exe")) {
///     Ok(module) => println!("Loaded {:?}", module.name()),
///     Err(Error::NotSupported) => println!("Not a managed image"),
///     Err(Error::Malformed { message, .. }) => println!("Malformed: {}", message),
///     Err(e) => println!("Error: {}", e),
/// }
/// ```
pub use error::Error;
