use indicatif::ProgressBar;
use rayon::prelude::*;
use sha1::{Digest, Sha1};
use tracing::debug;

use super::cancel::CancelToken;
use crate::config::PIECES_PER_WORKER;
use crate::error::{BuildError, Result};
use crate::models::{Piece, PieceDigest};

/// SHA-1 of a single piece
pub fn hash_piece(data: &[u8]) -> PieceDigest {
    let mut hasher = Sha1::new();
    hasher.update(data);
    let mut digest = [0u8; 20];
    digest.copy_from_slice(&hasher.finalize());
    digest
}

fn batch_size(threads: usize) -> usize {
    threads.saturating_mul(PIECES_PER_WORKER).max(1)
}

/// Hashes pieces on a dedicated thread pool.
///
/// Pieces are pulled from a sequential source in batches and hashed in
/// parallel. Each digest is stored in the slot of its piece index, so the
/// result is in piece order whatever order the workers finish in.
pub struct PieceHasher {
    pool: rayon::ThreadPool,
    threads: usize,
    progress: Option<ProgressBar>,
    cancel: CancelToken,
}

impl PieceHasher {
    pub fn new(threads: usize) -> Result<Self> {
        let threads = threads.max(1);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("piece-hasher-{}", i))
            .build()
            .map_err(|e| BuildError::HashComputation(e.to_string()))?;

        Ok(Self {
            pool,
            threads,
            progress: None,
            cancel: CancelToken::new(),
        })
    }

    /// Advance `pb` by the number of bytes hashed
    pub fn with_progress(mut self, pb: ProgressBar) -> Self {
        self.progress = Some(pb);
        self
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Hash every piece and return `expected` digests in piece order.
    ///
    /// The first error from `pieces` aborts hashing. A piece index outside
    /// `0..expected`, or a slot left empty, is a [`BuildError::HashComputation`].
    pub fn hash_all<I>(&self, pieces: I, expected: usize) -> Result<Vec<PieceDigest>>
    where
        I: IntoIterator<Item = Result<Piece>>,
    {
        let mut slots: Vec<Option<PieceDigest>> = vec![None; expected];
        let batch_size = batch_size(self.threads);
        let mut batch: Vec<Piece> = Vec::with_capacity(batch_size.min(expected));
        let mut pieces = pieces.into_iter();

        loop {
            batch.clear();
            while batch.len() < batch_size {
                if self.cancel.is_cancelled() {
                    debug!("hashing cancelled");
                    return Err(BuildError::Cancelled);
                }
                match pieces.next() {
                    Some(piece) => batch.push(piece?),
                    None => break,
                }
            }
            if batch.is_empty() {
                break;
            }

            let digests: Vec<(usize, PieceDigest)> = self.pool.install(|| {
                batch
                    .par_iter()
                    .map(|piece| (piece.index, hash_piece(&piece.data)))
                    .collect()
            });

            for (index, digest) in digests {
                let slot = slots.get_mut(index).ok_or_else(|| {
                    BuildError::HashComputation(format!(
                        "piece index {} out of range ({} pieces expected)",
                        index, expected
                    ))
                })?;
                *slot = Some(digest);
            }

            let bytes: u64 = batch.iter().map(|p| p.data.len() as u64).sum();
            if let Some(pb) = &self.progress {
                pb.inc(bytes);
            }
            debug!(pieces = batch.len(), bytes, "hashed batch");
        }

        slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| {
                slot.ok_or_else(|| {
                    BuildError::HashComputation(format!("no digest for piece {}", index))
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    fn pieces(count: usize, len: usize) -> Vec<Piece> {
        (0..count)
            .map(|index| Piece {
                index,
                data: (0..len).map(|b| (b * 31 + index * 7) as u8).collect(),
            })
            .collect()
    }

    #[test]
    fn test_hash_piece_known_vector() {
        assert_eq!(
            hex::encode(hash_piece(b"abc")),
            "a9993e364706816aba3e25717850c26c9cd0d89d"
        );
    }

    #[test]
    fn test_digests_follow_piece_order() {
        let input = pieces(37, 64);
        let expected: Vec<PieceDigest> = input.iter().map(|p| hash_piece(&p.data)).collect();

        for threads in [1, 3, 8] {
            let hasher = PieceHasher::new(threads).unwrap();
            let digests = hasher
                .hash_all(input.iter().cloned().map(Ok), input.len())
                .unwrap();
            assert_eq!(digests, expected);
        }
    }

    #[test]
    fn test_slots_are_addressed_by_index() {
        let mut input = pieces(5, 8);
        input.reverse();
        let hasher = PieceHasher::new(2).unwrap();
        let digests = hasher.hash_all(input.iter().cloned().map(Ok), 5).unwrap();
        for piece in &input {
            assert_eq!(digests[piece.index], hash_piece(&piece.data));
        }
    }

    #[test]
    fn test_batch_size_saturates() {
        assert_eq!(batch_size(2), 2 * PIECES_PER_WORKER);
        assert_eq!(batch_size(usize::MAX), usize::MAX);
    }

    #[test]
    fn test_no_pieces_no_digests() {
        let hasher = PieceHasher::new(2).unwrap();
        let digests = hasher.hash_all(Vec::<Result<Piece>>::new(), 0).unwrap();
        assert!(digests.is_empty());
    }

    #[test]
    fn test_missing_piece_is_an_error() {
        let hasher = PieceHasher::new(2).unwrap();
        let err = hasher.hash_all(pieces(2, 4).into_iter().map(Ok), 3).unwrap_err();
        assert!(matches!(err, BuildError::HashComputation(_)));
    }

    #[test]
    fn test_out_of_range_index_is_an_error() {
        let hasher = PieceHasher::new(1).unwrap();
        let err = hasher.hash_all(pieces(3, 4).into_iter().map(Ok), 2).unwrap_err();
        assert!(matches!(err, BuildError::HashComputation(_)));
    }

    #[test]
    fn test_source_error_aborts() {
        let hasher = PieceHasher::new(2).unwrap();
        let input = vec![
            Ok(Piece { index: 0, data: vec![1] }),
            Err(BuildError::Io {
                path: "x".to_string(),
                offset: 1,
                source: io::Error::other("gone"),
            }),
        ];
        let err = hasher.hash_all(input, 2).unwrap_err();
        assert!(matches!(err, BuildError::Io { offset: 1, .. }));
    }

    #[test]
    fn test_cancelled_before_start() {
        let cancel = CancelToken::new();
        cancel.cancel();
        let hasher = PieceHasher::new(2).unwrap().with_cancel(cancel);
        let err = hasher.hash_all(pieces(4, 4).into_iter().map(Ok), 4).unwrap_err();
        assert!(matches!(err, BuildError::Cancelled));
    }

    #[test]
    fn test_cancel_between_pieces() {
        let cancel = CancelToken::new();
        let hasher = PieceHasher::new(1).unwrap().with_cancel(cancel.clone());
        let trigger = cancel.clone();
        let input = pieces(50, 4).into_iter().map(move |p| {
            if p.index == 10 {
                trigger.cancel();
            }
            Ok(p)
        });
        let err = hasher.hash_all(input, 50).unwrap_err();
        assert!(matches!(err, BuildError::Cancelled));
    }

    #[test]
    fn test_progress_counts_bytes() {
        let pb = ProgressBar::hidden();
        let hasher = PieceHasher::new(2).unwrap().with_progress(pb.clone());
        hasher.hash_all(pieces(6, 10).into_iter().map(Ok), 6).unwrap();
        assert_eq!(pb.position(), 60);
    }
}
