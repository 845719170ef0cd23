//! # rootdata
//!
//! Native reader for CERN ROOT files.
//!
//! Reads TH1D/TH1F histograms and flat TTree/TNtuple leaves from `.root`
//! files without the ROOT libraries. Payloads may be stored raw or in zlib
//! or LZ4 blocks; class layouts come from the file's own streamer info,
//! with built-in layouts for files that lack them.
//!
//! ## Example
//!
//! ```no_run
//! use rootdata::{Column, ObjectSelection, RootFile, RowRange};
//!
//! let f = RootFile::open("data.root")?;
//! print!("{}", f.file_info());
//! for name in f.list_histograms() {
//!     println!("histogram {}", name);
//! }
//! for bin in f.read_histogram("signal", 1) {
//!     println!("{} {} +- {}", bin.lowedge, bin.content, bin.error());
//! }
//!
//! // TTree access
//! let pt: Vec<f64> = f.list_entries("events", "pt", "pt", 0, 1000);
//!
//! // Tabular extraction
//! let sel: ObjectSelection = "Tree:events".parse()?;
//! let columns: Vec<Column> =
//!     f.list_leaves("events").iter().flat_map(|l| l.columns()).map(Column::Leaf).collect();
//! let table = f.read_selection(&sel, &columns, RowRange::default())?;
//! println!("{} rows, {} values of pt", table.rows(), pt.len());
//! # Ok::<(), rootdata::RootError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod class_ref;
pub mod datasource;
pub mod decompress;
pub mod directory;
pub mod error;
pub mod file;
pub mod histogram;
pub mod key;
pub mod navigator;
pub mod objects;
pub mod rbuffer;
pub mod selection;
pub mod stream;
pub mod streamer;
pub mod tree;

pub use decompress::Compression;
pub use directory::{DirectoryNode, Folder, KeyDirectory};
pub use error::{Result, RootError};
pub use file::{FileInfo, ReaderConfig, RootFile};
pub use histogram::BinPars;
pub use key::{KeyBuffer, ObjectKind};
pub use selection::{Column, HistogramColumn, LeafColumn, ObjectSelection, RowRange, Table};
pub use streamer::{SchemaField, SchemaRegistry};
pub use tree::{ContentType, LeafInfo, LeafValue};
