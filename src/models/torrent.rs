use sha1::{Digest, Sha1};

use super::file::{FileEntry, PieceDigest};
use crate::bencode::{self, Value};

/// Whether the info dictionary carries `length` or `files`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Layout {
    Single { length: u64 },
    Multi { files: Vec<FileEntry> },
}

/// Info dictionary for the torrent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Info {
    /// Random value that makes otherwise identical torrents hash differently
    pub entropy: i64,
    pub layout: Layout,
    pub name: String,
    pub piece_length: u64,
    /// One digest per piece, in piece order
    pub pieces: Vec<PieceDigest>,
    pub private: i64,
    pub source: String,
}

impl Info {
    pub fn total_size(&self) -> u64 {
        match &self.layout {
            Layout::Single { length } => *length,
            Layout::Multi { files } => files.iter().map(|f| f.length).sum(),
        }
    }

    /// Concatenation of all piece digests
    pub fn pieces_bytes(&self) -> Vec<u8> {
        self.pieces.concat()
    }

    pub fn to_value(&self) -> Value {
        let layout = match &self.layout {
            Layout::Single { length } => ("length", Value::uint(*length)),
            Layout::Multi { files } => (
                "files",
                Value::List(files.iter().map(FileEntry::to_value).collect()),
            ),
        };

        Value::dict([
            ("entropy", Value::Integer(self.entropy)),
            layout,
            ("name", Value::string(&self.name)),
            ("piece length", Value::uint(self.piece_length)),
            ("pieces", Value::bytes(self.pieces_bytes())),
            ("private", Value::Integer(self.private)),
            ("source", Value::string(&self.source)),
        ])
    }
}

/// Torrent metainfo structure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metainfo {
    pub announce: String,
    pub created_by: String,
    /// Unix seconds
    pub creation_date: i64,
    pub info: Info,
}

impl Metainfo {
    pub fn to_value(&self) -> Value {
        Value::dict([
            ("announce", Value::string(&self.announce)),
            ("created by", Value::string(&self.created_by)),
            ("creation date", Value::Integer(self.creation_date)),
            ("info", self.info.to_value()),
        ])
    }

    /// Bencoded `.torrent` contents
    pub fn to_bytes(&self) -> Vec<u8> {
        bencode::encode(&self.to_value())
    }

    /// SHA-1 of the bencoded info dictionary
    pub fn info_hash(&self) -> [u8; 20] {
        let encoded = bencode::encode(&self.info.to_value());
        let mut hash = [0u8; 20];
        hash.copy_from_slice(&Sha1::digest(&encoded));
        hash
    }

    pub fn info_hash_hex(&self) -> String {
        hex::encode(self.info_hash())
    }

    /// Suggested output file name
    pub fn file_name(&self) -> String {
        format!("{}.torrent", self.info.name)
    }

    pub fn magnet_link(&self) -> String {
        magnet_link(&self.info_hash_hex(), &self.info.name, &self.announce)
    }
}

/// Magnet URI for a v1 info hash; an empty tracker is left out
pub fn magnet_link(info_hash_hex: &str, name: &str, announce: &str) -> String {
    let mut link = format!(
        "magnet:?xt=urn:btih:{}&dn={}",
        info_hash_hex,
        urlencoding::encode(name)
    );
    if !announce.is_empty() {
        link.push_str("&tr=");
        link.push_str(&urlencoding::encode(announce));
    }
    link
}
