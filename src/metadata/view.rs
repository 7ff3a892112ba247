//! Raw access to the metadata of a module.
//!
//! [`MetadataView`] owns the bytes of an image (memory-mapped or in memory) or of a bare
//! metadata blob and keeps the parsed root, heaps and tables stream borrowing from them. It does
//! no resolution at all; [`crate::metadata::module::ModuleDef`] builds the entity model on top
//! of it.
//!
//! # Examples
//!
//! ```rust,no_run
//! use cilmeta::metadata::{tables::TableId, view::MetadataView};
//! use std::path::Path;
//!
//! let view = MetadataView::from_file(Path::new("tests/samples/WindowsBase.dll"))?;
//! println!("Runtime {}", view.root().version);
//! println!("{} types", view.tables().row_count(TableId::TypeDef));
//! if let Some(strings) = view.strings() {
//!     println!("#Strings holds {} bytes", strings.len());
//! }
//! # Ok::<(), cilmeta::Error>(())
//! ```

use ouroboros::self_referencing;
use std::path::Path;
use tracing::debug;

use crate::{
    file::File,
    metadata::{
        config::LoadOptions,
        cor20header::Cor20Header,
        root::Root,
        streams::{Blob, Guid, StreamHeader, Strings, TablesStream, UserStrings},
    },
    Error::OutOfBounds,
    Result,
};

/// Where the metadata bytes come from
pub enum Source {
    /// A managed PE image
    Image(File),
    /// Bare metadata, starting with the `BSJB` root
    Metadata(Vec<u8>),
}

impl Source {
    fn data(&self) -> &[u8] {
        match self {
            Source::Image(file) => file.data(),
            Source::Metadata(data) => data,
        }
    }
}

/// The parsed structures, borrowing from the source
pub struct ViewData<'a> {
    /// All metadata bytes, starting with the root
    pub data: &'a [u8],
    /// The CLI header; absent when loaded from bare metadata
    pub cor20header: Option<Cor20Header>,
    /// The metadata root
    pub root: Root,
    /// The `#~` or `#-` stream
    pub tables: TablesStream<'a>,
    /// The `#Strings` heap
    pub strings: Option<Strings<'a>>,
    /// The `#US` heap
    pub userstrings: Option<UserStrings<'a>>,
    /// The `#GUID` heap
    pub guids: Option<Guid<'a>>,
    /// The `#Blob` heap
    pub blobs: Option<Blob<'a>>,
}

impl<'a> ViewData<'a> {
    fn from_source(source: &'a Source, options: &LoadOptions) -> Result<Self> {
        let (data, cor20header) = match source {
            Source::Image(file) => {
                let (clr_rva, clr_size) = file.clr()?;
                let clr_offset = file.rva_to_offset(clr_rva)?;
                let cor20header = Cor20Header::read(file.data_slice(clr_offset, clr_size)?)?;

                let metadata_offset = file.rva_to_offset(cor20header.meta_data_rva as usize)?;
                let data =
                    file.data_slice(metadata_offset, cor20header.meta_data_size as usize)?;

                (data, Some(cor20header))
            }
            Source::Metadata(_) => (source.data(), None),
        };

        Self::from_metadata(data, cor20header, options)
    }

    fn from_metadata(
        data: &'a [u8],
        cor20header: Option<Cor20Header>,
        options: &LoadOptions,
    ) -> Result<Self> {
        let root = Root::read_with(data, options)?;

        let stream_data = |header: &StreamHeader| -> Result<&'a [u8]> {
            let start = header.offset as usize;
            data.get(start..start + header.size as usize)
                .ok_or(OutOfBounds)
        };

        let tables = TablesStream::from(stream_data(root.tables_stream()?)?)?;

        // Only the first stream of each name counts
        let strings = match root.stream("#Strings") {
            Some(header) => Some(Strings::from(stream_data(header)?)?),
            None => None,
        };
        let userstrings = match root.stream("#US") {
            Some(header) => Some(UserStrings::from(stream_data(header)?)?),
            None => None,
        };
        let guids = match root.stream("#GUID") {
            Some(header) => Some(Guid::from(stream_data(header)?)?),
            None => None,
        };
        let blobs = match root.stream("#Blob") {
            Some(header) => Some(Blob::from(stream_data(header)?)?),
            None => None,
        };

        debug!(
            version = %root.version,
            streams = root.stream_headers.len(),
            tables = tables.tables().len(),
            "loaded metadata root"
        );

        Ok(ViewData {
            data,
            cor20header,
            root,
            tables,
            strings,
            userstrings,
            guids,
            blobs,
        })
    }
}

#[self_referencing]
/// Owner of the metadata bytes and of every structure parsed from them.
///
/// Heaps and tables borrow from the owned bytes, so nothing is copied; dropping the view
/// releases all of them together.
pub struct MetadataView {
    source: Source,
    options: LoadOptions,
    #[borrows(source)]
    #[not_covariant]
    data: ViewData<'this>,
}

impl MetadataView {
    /// Memory-map and load a managed PE image
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, is not a managed image, or its metadata is
    /// malformed.
    pub fn from_file(path: &Path) -> Result<Self> {
        Self::from_file_with(path, LoadOptions::default())
    }

    /// [`MetadataView::from_file`] with explicit options
    ///
    /// # Errors
    /// See [`MetadataView::from_file`].
    pub fn from_file_with(path: &Path, options: LoadOptions) -> Result<Self> {
        Self::load(Source::Image(File::from_file(path)?), options)
    }

    /// Load a managed PE image from memory
    ///
    /// # Errors
    /// See [`MetadataView::from_file`].
    pub fn from_mem(data: Vec<u8>) -> Result<Self> {
        Self::from_mem_with(data, LoadOptions::default())
    }

    /// [`MetadataView::from_mem`] with explicit options
    ///
    /// # Errors
    /// See [`MetadataView::from_file`].
    pub fn from_mem_with(data: Vec<u8>, options: LoadOptions) -> Result<Self> {
        Self::load(Source::Image(File::from_mem(data)?), options)
    }

    /// Load bare metadata that starts with the `BSJB` root
    ///
    /// # Errors
    /// Returns an error if the metadata is malformed.
    pub fn from_metadata(data: Vec<u8>) -> Result<Self> {
        Self::from_metadata_with(data, LoadOptions::default())
    }

    /// [`MetadataView::from_metadata`] with explicit options
    ///
    /// # Errors
    /// See [`MetadataView::from_metadata`].
    pub fn from_metadata_with(data: Vec<u8>, options: LoadOptions) -> Result<Self> {
        Self::load(Source::Metadata(data), options)
    }

    fn load(source: Source, options: LoadOptions) -> Result<Self> {
        MetadataView::try_new(source, options, |source| {
            ViewData::from_source(source, &options)
        })
    }

    /// The options this view was loaded with
    #[must_use]
    pub fn options(&self) -> &LoadOptions {
        self.borrow_options()
    }

    /// The PE image, unless loaded from bare metadata
    #[must_use]
    pub fn file(&self) -> Option<&File> {
        match self.borrow_source() {
            Source::Image(file) => Some(file),
            Source::Metadata(_) => None,
        }
    }

    /// The metadata bytes, starting with the root
    #[must_use]
    pub fn data(&self) -> &[u8] {
        self.with_data(|data| data.data)
    }

    /// The CLI header, unless loaded from bare metadata
    #[must_use]
    pub fn cor20header(&self) -> Option<&Cor20Header> {
        self.with_data(|data| data.cor20header.as_ref())
    }

    /// The metadata root
    #[must_use]
    pub fn root(&self) -> &Root {
        self.with_data(|data| &data.root)
    }

    /// The headers of all accepted streams
    #[must_use]
    pub fn streams(&self) -> &[StreamHeader] {
        self.with_data(|data| &data.root.stream_headers)
    }

    /// The tables stream
    #[must_use]
    pub fn tables(&self) -> &TablesStream {
        self.with_data(|data| &data.tables)
    }

    /// The `#Strings` heap
    #[must_use]
    pub fn strings(&self) -> Option<&Strings> {
        self.with_data(|data| data.strings.as_ref())
    }

    /// The `#US` heap
    #[must_use]
    pub fn userstrings(&self) -> Option<&UserStrings> {
        self.with_data(|data| data.userstrings.as_ref())
    }

    /// The `#GUID` heap
    #[must_use]
    pub fn guids(&self) -> Option<&Guid> {
        self.with_data(|data| data.guids.as_ref())
    }

    /// The `#Blob` heap
    #[must_use]
    pub fn blobs(&self) -> Option<&Blob> {
        self.with_data(|data| data.blobs.as_ref())
    }
}
