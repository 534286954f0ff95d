use indicatif::ProgressBar;
use rand::Rng;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info};

use crate::config::{ENTROPY_MAX, ENTROPY_MIN, PRIVATE_FLAG};
use crate::error::{BuildError, Result};
use crate::hashing::{CancelToken, PieceHasher};
use crate::models::{FileEntry, FileRecord, Info, Layout, Metainfo};
use crate::piece::{PieceAggregator, calculate_num_pieces, derive_piece_length};
use crate::source::{ByteSource, SourceEntry};

/// Configuration options for building a torrent
#[derive(Debug, Clone, Default)]
pub struct TorrentOptions {
    /// Tracker URL, stored verbatim
    pub announce: String,
    /// Source tag embedded in the info dictionary; may be empty
    pub source: String,
    /// Piece length in bytes; derived from the total size when unset
    pub piece_length: Option<u64>,
    /// Fixed creation date (unix seconds) instead of the current time
    pub creation_date: Option<i64>,
    /// Fixed entropy value instead of a random one
    pub entropy: Option<i64>,
}

/// Sizing of a build, known before any byte is read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildPlan {
    pub file_count: usize,
    pub total_size: u64,
    pub piece_length: u64,
    pub num_pieces: u64,
}

/// Result of a successful build
#[derive(Debug, Clone)]
pub struct BuiltTorrent {
    pub metainfo: Metainfo,
    /// Bencoded `.torrent` contents
    pub bytes: Vec<u8>,
}

impl BuiltTorrent {
    pub fn name(&self) -> &str {
        &self.metainfo.info.name
    }
}

/// Builder for creating torrent files
pub struct TorrentBuilder<S: ByteSource> {
    source: S,
    options: TorrentOptions,
    num_threads: usize,
    progress: Option<ProgressBar>,
    cancel: CancelToken,
}

impl<S: ByteSource> TorrentBuilder<S> {
    pub fn new(source: S, options: TorrentOptions) -> Self {
        Self {
            source,
            options,
            num_threads: num_cpus::get(),
            progress: None,
            cancel: CancelToken::new(),
        }
    }

    /// Set the number of threads for hashing
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.num_threads = threads;
        self
    }

    /// Advance a progress bar by hashed bytes
    pub fn with_progress(mut self, pb: ProgressBar) -> Self {
        self.progress = Some(pb);
        self
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Validate the input and work out piece sizing without reading data
    pub fn plan(&self) -> Result<BuildPlan> {
        let entries = self.source.entries();
        if entries.is_empty() {
            return Err(BuildError::EmptyInput);
        }
        let total_size = self.source.total_size();

        let piece_length = match self.options.piece_length {
            Some(0) => return Err(BuildError::InvalidPieceLength(0)),
            Some(len) => len,
            None => derive_piece_length(total_size)?,
        };

        if total_size == 0 {
            return Err(BuildError::EmptyInput);
        }

        Ok(BuildPlan {
            file_count: entries.len(),
            total_size,
            piece_length,
            num_pieces: calculate_num_pieces(total_size, piece_length),
        })
    }

    /// Read and hash every piece and assemble the metainfo
    pub fn build(mut self) -> Result<BuiltTorrent> {
        let plan = self.plan()?;
        let (name, layout) = resolve_layout(self.source.entries())?;
        info!(
            name = %name,
            files = plan.file_count,
            total_size = plan.total_size,
            piece_length = plan.piece_length,
            pieces = plan.num_pieces,
            "building torrent"
        );

        let expected = usize::try_from(plan.num_pieces)
            .map_err(|_| BuildError::InvalidPieceLength(plan.piece_length))?;

        let mut hasher = PieceHasher::new(self.num_threads)?.with_cancel(self.cancel.clone());
        if let Some(pb) = self.progress.clone() {
            hasher = hasher.with_progress(pb);
        }
        let pieces = PieceAggregator::new(&mut self.source, plan.piece_length)?;
        let digests = hasher.hash_all(pieces, expected)?;
        debug!(digests = digests.len(), "hashing complete");

        let entropy = self
            .options
            .entropy
            .unwrap_or_else(|| rand::rng().random_range(ENTROPY_MIN..ENTROPY_MAX));

        let creation_date = self.options.creation_date.unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs() as i64)
                .unwrap_or_default()
        });

        let metainfo = Metainfo {
            announce: self.options.announce.clone(),
            created_by: format!("piecewright {}", env!("CARGO_PKG_VERSION")),
            creation_date,
            info: Info {
                entropy,
                layout,
                name,
                piece_length: plan.piece_length,
                pieces: digests,
                private: PRIVATE_FLAG,
                source: self.options.source.clone(),
            },
        };
        let bytes = metainfo.to_bytes();
        info!(info_hash = %metainfo.info_hash_hex(), bytes = bytes.len(), "torrent built");

        Ok(BuiltTorrent { metainfo, bytes })
    }
}

/// Pick the torrent name and single- or multi-file layout.
///
/// One entry gives single-file mode named after the file. Several entries give
/// multi-file mode named after the root folder of the first entry, with the
/// root stripped from every listed path.
fn resolve_layout(entries: &[SourceEntry]) -> Result<(String, Layout)> {
    match entries {
        [] => Err(BuildError::EmptyInput),
        [only] => {
            let name = only
                .segments
                .last()
                .cloned()
                .ok_or(BuildError::InvalidPath { index: 0 })?;
            Ok((name, Layout::Single { length: only.size }))
        }
        [first, ..] => {
            let name = first
                .segments
                .first()
                .cloned()
                .ok_or(BuildError::InvalidPath { index: 0 })?;
            let files = entries
                .iter()
                .enumerate()
                .map(|(index, entry)| {
                    let record = FileRecord::from_segments(&entry.segments, entry.size);
                    if record.path.is_empty() {
                        return Err(BuildError::InvalidPath { index });
                    }
                    Ok(FileEntry::from(&record))
                })
                .collect::<Result<Vec<_>>>()?;
            Ok((name, Layout::Multi { files }))
        }
    }
}
