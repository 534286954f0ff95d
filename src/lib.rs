//! # piecewright
//!
//! A library for building private BitTorrent v1 metainfo files.
//!
//! Input files are read in order as one continuous byte stream, cut into
//! fixed-size pieces (a piece may span several files), hashed with SHA-1 in
//! parallel and written out as a canonical bencoded dictionary.
//!
//! ## Example
//!
//! ```
//! use piecewright::{MemorySource, TorrentBuilder, TorrentOptions};
//!
//! let source = MemorySource::new()
//!     .with_file(["album", "a.bin"], vec![1u8, 2, 3])
//!     .with_file(["album", "b.bin"], vec![4u8, 5]);
//! let options = TorrentOptions {
//!     announce: "https://tracker.example/announce".to_string(),
//!     piece_length: Some(4),
//!     ..TorrentOptions::default()
//! };
//! let torrent = TorrentBuilder::new(source, options).build().unwrap();
//! assert_eq!(torrent.name(), "album");
//! assert_eq!(torrent.metainfo.info.pieces.len(), 2);
//! ```

pub mod bencode;
pub mod builder;
pub mod cli;
pub mod config;
pub mod error;
pub mod hashing;
pub mod inspect;
pub mod models;
pub mod piece;
pub mod scanner;
pub mod settings;
pub mod source;

// Re-export main types for convenience
pub use builder::{BuildPlan, BuiltTorrent, TorrentBuilder, TorrentOptions};
pub use error::BuildError;
pub use hashing::CancelToken;
pub use models::{Info, Layout, Metainfo};
pub use scanner::FsSource;
pub use source::{ByteSource, MemorySource, SourceEntry};
