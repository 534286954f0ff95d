mod file;
mod torrent;

pub use file::{FileEntry, FileRecord, Piece, PieceDigest};
pub use torrent::{Info, Layout, Metainfo, magnet_link};
