use serde::{Deserialize, Serialize};

use crate::bencode::Value;
use crate::config::DIGEST_LEN;

/// SHA-1 digest of one piece
pub type PieceDigest = [u8; DIGEST_LEN];

/// A file taking part in the build, in traversal order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// Path segments below the common root folder
    pub path: Vec<String>,
    /// File size in bytes
    pub length: u64,
}

impl FileRecord {
    /// Record for a source entry whose first segment names the root folder
    pub fn from_segments(segments: &[String], length: u64) -> Self {
        Self {
            path: segments.iter().skip(1).cloned().collect(),
            length,
        }
    }
}

/// A contiguous slice of the concatenated file stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Piece {
    pub index: usize,
    pub data: Vec<u8>,
}

/// File entry in multi-file mode
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    pub length: u64,
    pub path: Vec<String>,
}

impl FileEntry {
    pub fn to_value(&self) -> Value {
        Value::dict([
            ("length", Value::uint(self.length)),
            (
                "path",
                Value::List(self.path.iter().map(|s| Value::string(s)).collect()),
            ),
        ])
    }
}

impl From<&FileRecord> for FileEntry {
    fn from(record: &FileRecord) -> Self {
        Self {
            length: record.length,
            path: record.path.clone(),
        }
    }
}
