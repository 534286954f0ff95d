mod cancel;
mod pieces;

pub use cancel::CancelToken;
pub use pieces::{PieceHasher, hash_piece};
