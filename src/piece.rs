//! Splitting the concatenated file stream into fixed-size pieces.

use crate::config::PIECE_LENGTH_DIVISOR;
use crate::error::{BuildError, Result};
use crate::models::Piece;
use crate::source::ByteSource;

/// Derive a piece length from the total content size.
///
/// Yields `2^floor(log2(total_size / 1000))`. Below 1000 bytes that is less
/// than one byte, which is reported as an invalid piece length.
pub fn derive_piece_length(total_size: u64) -> Result<u64> {
    let scaled = total_size / PIECE_LENGTH_DIVISOR;
    if scaled == 0 {
        return Err(BuildError::InvalidPieceLength(0));
    }
    Ok(1u64 << (u64::BITS - 1 - scaled.leading_zeros()))
}

/// Calculate the number of pieces for a given total size and piece length
pub fn calculate_num_pieces(total_size: u64, piece_length: u64) -> u64 {
    total_size.div_ceil(piece_length)
}

/// A byte range the cursor needs before it can make progress
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadRequest {
    pub file_index: usize,
    pub offset: u64,
    pub len: usize,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Step {
    /// Read these bytes and hand them over with [`PieceCursor::fill`]
    Read(ReadRequest),
    /// A finished piece
    Piece(Piece),
    /// Every file is exhausted and nothing is buffered
    Done,
}

/// Position in the file stream plus the piece being accumulated.
///
/// The cursor never touches files itself. [`PieceCursor::step`] says what to
/// do next given the file lengths; the caller performs reads and feeds them
/// back through [`PieceCursor::fill`]. A piece left partially filled at the end
/// of a file keeps filling from the next file.
#[derive(Debug, Clone)]
pub struct PieceCursor {
    piece_length: usize,
    file_index: usize,
    offset_in_file: u64,
    next_index: usize,
    accumulator: Vec<u8>,
}

impl PieceCursor {
    pub fn new(piece_length: usize) -> Self {
        Self {
            piece_length,
            file_index: 0,
            offset_in_file: 0,
            next_index: 0,
            accumulator: Vec::new(),
        }
    }

    /// Current `(file_index, offset_in_file)`
    pub fn position(&self) -> (usize, u64) {
        (self.file_index, self.offset_in_file)
    }

    /// Bytes buffered for the piece in progress
    pub fn filled(&self) -> usize {
        self.accumulator.len()
    }

    pub fn step(&mut self, lengths: &[u64]) -> Step {
        loop {
            if self.accumulator.len() == self.piece_length {
                return Step::Piece(self.take_piece());
            }

            let Some(&file_len) = lengths.get(self.file_index) else {
                if self.accumulator.is_empty() {
                    return Step::Done;
                }
                return Step::Piece(self.take_piece());
            };

            let remaining = file_len.saturating_sub(self.offset_in_file);
            if remaining == 0 {
                self.file_index += 1;
                self.offset_in_file = 0;
                continue;
            }

            let room = self.piece_length - self.accumulator.len();
            let len = usize::try_from(remaining).map_or(room, |r| r.min(room));
            return Step::Read(ReadRequest {
                file_index: self.file_index,
                offset: self.offset_in_file,
                len,
            });
        }
    }

    /// Complete `request` by letting `read` fill the reserved buffer space.
    ///
    /// On error the cursor is left as it was before the call.
    pub fn fill<E>(
        &mut self,
        request: &ReadRequest,
        read: impl FnOnce(&mut [u8]) -> std::result::Result<(), E>,
    ) -> std::result::Result<(), E> {
        let start = self.accumulator.len();
        self.accumulator.resize(start + request.len, 0);
        if let Err(e) = read(&mut self.accumulator[start..]) {
            self.accumulator.truncate(start);
            return Err(e);
        }
        self.offset_in_file += request.len as u64;
        Ok(())
    }

    fn take_piece(&mut self) -> Piece {
        let index = self.next_index;
        self.next_index += 1;
        Piece {
            index,
            data: std::mem::take(&mut self.accumulator),
        }
    }
}

/// Streams pieces out of a [`ByteSource`], reading each file sequentially.
///
/// Only the piece in progress is buffered. The first read failure is yielded
/// as an error and ends the iteration.
pub struct PieceAggregator<'a, S: ByteSource + ?Sized> {
    source: &'a mut S,
    lengths: Vec<u64>,
    cursor: PieceCursor,
    failed: bool,
}

impl<'a, S: ByteSource + ?Sized> PieceAggregator<'a, S> {
    pub fn new(source: &'a mut S, piece_length: u64) -> Result<Self> {
        let piece_length = usize::try_from(piece_length)
            .ok()
            .filter(|&len| len > 0)
            .ok_or(BuildError::InvalidPieceLength(piece_length))?;
        let lengths = source.entries().iter().map(|e| e.size).collect();
        Ok(Self {
            source,
            lengths,
            cursor: PieceCursor::new(piece_length),
            failed: false,
        })
    }
}

impl<S: ByteSource + ?Sized> Iterator for PieceAggregator<'_, S> {
    type Item = Result<Piece>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        loop {
            match self.cursor.step(&self.lengths) {
                Step::Done => return None,
                Step::Piece(piece) => return Some(Ok(piece)),
                Step::Read(request) => {
                    let source = &mut *self.source;
                    let read = self.cursor.fill(&request, |buf| {
                        source.read_at(request.file_index, request.offset, buf)
                    });
                    if let Err(err) = read {
                        self.failed = true;
                        let path = self.source.entries()[request.file_index].display_path();
                        return Some(Err(BuildError::Io {
                            path,
                            offset: request.offset,
                            source: err,
                        }));
                    }
                }
            }
        }
    }
}
