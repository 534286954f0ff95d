use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::MAX_PIECE_LENGTH_EXP;

#[derive(Parser, Debug)]
#[command(
    name = "piecewright",
    version,
    about = "Build private BitTorrent metainfo files",
    author = "piecewright contributors"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a .torrent from a file or directory
    Create(CreateArgs),
    /// Print the contents of a .torrent file
    Inspect(InspectArgs),
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// The file or directory to create a torrent from
    #[arg(value_name = "TARGET")]
    pub target: PathBuf,

    /// Announce URL
    #[arg(short = 'a', long = "announce", value_name = "URL")]
    pub announce: Option<String>,

    /// Source tag embedded in the info dictionary
    #[arg(short = 's', long = "source", value_name = "SOURCE")]
    pub source: Option<String>,

    /// Set the piece length to 2^N bytes (derived from the total size if omitted)
    #[arg(
        short = 'l',
        long = "piece-length",
        value_name = "N",
        value_parser = clap::value_parser!(u32).range(0..=MAX_PIECE_LENGTH_EXP as i64)
    )]
    pub piece_length: Option<u32>,

    /// Exclude files matching pattern (glob) - can be comma-separated
    #[arg(short = 'e', long = "exclude", value_name = "PATTERN", value_delimiter = ',')]
    pub exclude: Vec<String>,

    /// Set the output file path (defaults to <name>.torrent)
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Overwrite output file if it exists
    #[arg(short = 'f', long = "force")]
    pub force: bool,

    /// Number of threads for hashing (defaults to number of CPU cores)
    #[arg(short = 't', long = "threads", value_name = "N")]
    pub threads: Option<usize>,

    /// Scan and size the torrent without hashing or writing it
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Print the result as JSON
    #[arg(long = "json")]
    pub json: bool,

    /// Hide the progress bar
    #[arg(short = 'q', long = "quiet")]
    pub quiet: bool,

    /// Verbose diagnostics on stderr
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// Settings file to use instead of the default location
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// The .torrent file to read
    #[arg(value_name = "TORRENT")]
    pub torrent: PathBuf,

    /// Print the result as JSON
    #[arg(long = "json")]
    pub json: bool,
}
