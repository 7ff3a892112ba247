//! ECMA-335 metadata: streams, tables, entities and signatures.
//!
//! The layers build on each other, leaves first:
//!
//! - [`root`] and [`streams`] locate the `BSJB` root, the heaps and the tables stream
//! - [`tables`] derives the row layouts of the tables stream and reads raw rows
//! - [`lazy`] provides the resolve-once field cell every entity is made of
//! - [`entities`] projects raw rows into typed, token-addressed entities
//! - [`signatures`] decodes and encodes `#Blob` signatures
//! - [`module`] ties it together; [`module::ModuleDef`] is the usual entry point
//!
//! # Examples
//!
//! ```rust,no_run
//! use cilmeta::metadata::{module::ModuleDef, token::Token};
//! use std::path::Path;
//!
//! let module = ModuleDef::from_file(Path::new("tests/samples/WindowsBase.dll"))?;
//! println!("Module: {}", module.name().unwrap_or_default());
//!
//! if let Some(entity) = module.resolve_token(Token::new(0x0200_0002)) {
//!     println!("{:?} is named {:?}", entity.token(), entity.name());
//! }
//! # Ok::<(), cilmeta::Error>(())
//! ```

/// Options controlling how metadata is loaded
pub mod config;
/// The CLI header of a managed image
pub mod cor20header;
/// The typed entity model
pub mod entities;
/// Public key tokens, versions and assembly display names
pub mod identity;
/// The lazily resolved field cell
pub mod lazy;
/// The module and its entity graph
pub mod module;
/// The metadata root and stream directory
pub mod root;
/// Method, field, property, local and type signatures
pub mod signatures;
/// The metadata heaps and the tables stream
pub mod streams;
/// Table schema, coded indexes and raw rows
pub mod tables;
/// Metadata tokens
pub mod token;
/// Byte-exact heap strings
pub mod utf8string;
/// Owner of the metadata bytes and the structures parsed from them
pub mod view;
