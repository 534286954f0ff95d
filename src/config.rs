/// Length of a SHA-1 piece digest in bytes
pub const DIGEST_LEN: usize = 20;

/// Divisor used when deriving a piece length from the total content size.
/// The derived piece length is `2^floor(log2(total / PIECE_LENGTH_DIVISOR))`.
pub const PIECE_LENGTH_DIVISOR: u64 = 1000;

/// Largest piece length exponent accepted on the command line (2^40 = 1 TiB)
pub const MAX_PIECE_LENGTH_EXP: u32 = 40;

/// Value of the `private` flag. Every torrent built here is private.
pub const PRIVATE_FLAG: i64 = 1;

/// Bounds for the random `entropy` field (lower inclusive, upper exclusive)
pub const ENTROPY_MIN: i64 = -2_000_000_000;
pub const ENTROPY_MAX: i64 = 2_000_000_000;

/// Number of pieces queued per hashing thread before a batch is dispatched.
/// Peak memory is roughly `threads * PIECES_PER_WORKER * piece_length`.
pub const PIECES_PER_WORKER: usize = 4;

/// Name of the settings file inside the config directory
pub const SETTINGS_FILE: &str = "config.toml";
