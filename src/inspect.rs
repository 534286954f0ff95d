use anyhow::{Context, Result, bail};
use console::{Emoji, style};
use indicatif::HumanBytes;
use serde::{Deserialize, Serialize};
use serde_bytes::ByteBuf;
use sha1::{Digest, Sha1};
use std::fs;

use crate::cli::InspectArgs;
use crate::config::DIGEST_LEN;
use crate::models::{FileEntry, Layout, Metainfo, magnet_link};

static INFO: Emoji<'_, '_> = Emoji("ℹ️ ", "i ");
static FILES: Emoji<'_, '_> = Emoji("📁 ", "f ");

/// Typed view of a decoded `.torrent` file
#[derive(Debug, Deserialize)]
pub struct TorrentView {
    pub announce: Option<String>,
    #[serde(rename = "created by")]
    pub created_by: Option<String>,
    #[serde(rename = "creation date")]
    pub creation_date: Option<i64>,
    pub info: InfoView,
}

/// Info dictionary as read back from disk.
///
/// Keys not listed here are dropped, so the info hash is only exact for
/// torrents that carry no other info keys.
#[derive(Debug, Serialize, Deserialize)]
pub struct InfoView {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entropy: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<FileEntry>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length: Option<u64>,
    pub name: String,
    #[serde(rename = "piece length")]
    pub piece_length: u64,
    pub pieces: ByteBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// What `create` and `inspect` report about a torrent
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TorrentSummary {
    pub name: String,
    pub info_hash: String,
    pub magnet: String,
    pub announce: Option<String>,
    pub source: Option<String>,
    pub created_by: Option<String>,
    pub creation_date: Option<i64>,
    pub private: bool,
    pub total_size: u64,
    pub piece_length: u64,
    pub piece_count: usize,
    pub files: Vec<FileEntry>,
}

impl From<&Metainfo> for TorrentSummary {
    fn from(metainfo: &Metainfo) -> Self {
        let info = &metainfo.info;
        let files = match &info.layout {
            Layout::Single { length } => vec![FileEntry {
                length: *length,
                path: vec![info.name.clone()],
            }],
            Layout::Multi { files } => files.clone(),
        };
        Self {
            name: info.name.clone(),
            info_hash: metainfo.info_hash_hex(),
            magnet: metainfo.magnet_link(),
            announce: non_empty(&metainfo.announce),
            source: non_empty(&info.source),
            created_by: Some(metainfo.created_by.clone()),
            creation_date: Some(metainfo.creation_date),
            private: info.private == 1,
            total_size: info.total_size(),
            piece_length: info.piece_length,
            piece_count: info.pieces.len(),
            files,
        }
    }
}

fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}

/// Decode `.torrent` bytes and summarize them
pub fn describe(content: &[u8]) -> Result<TorrentSummary> {
    let torrent: TorrentView = serde_bencode::from_bytes(content)
        .context("Failed to parse torrent file. Is it a valid bencoded file?")?;
    let info = &torrent.info;

    if info.pieces.len() % DIGEST_LEN != 0 {
        bail!(
            "Invalid pieces field: {} bytes is not a multiple of {}",
            info.pieces.len(),
            DIGEST_LEN
        );
    }

    let encoded_info =
        serde_bencode::to_bytes(info).context("Failed to re-encode info dictionary")?;
    let info_hash = hex::encode(Sha1::digest(&encoded_info));

    let files = match (&info.files, info.length) {
        (Some(files), _) => files.clone(),
        (None, Some(length)) => vec![FileEntry {
            length,
            path: vec![info.name.clone()],
        }],
        (None, None) => bail!("Info dictionary has neither 'files' nor 'length'"),
    };

    let announce = torrent.announce.clone().filter(|a| !a.is_empty());
    Ok(TorrentSummary {
        name: info.name.clone(),
        magnet: magnet_link(&info_hash, &info.name, announce.as_deref().unwrap_or("")),
        info_hash,
        announce,
        source: info.source.clone().filter(|s| !s.is_empty()),
        created_by: torrent.created_by.clone(),
        creation_date: torrent.creation_date,
        private: info.private == Some(1),
        total_size: files.iter().map(|f| f.length).sum(),
        piece_length: info.piece_length,
        piece_count: info.pieces.len() / DIGEST_LEN,
        files,
    })
}

pub fn print_summary(summary: &TorrentSummary) {
    println!("{} {}", INFO, style("Torrent Metadata:").bold());
    println!("{:<15} {}", style("Name:").bold(), style(&summary.name).cyan());

    if let Some(created_by) = &summary.created_by {
        println!("{:<15} {}", style("Created By:").bold(), created_by);
    }

    if let Some(date) = summary.creation_date {
        let datetime = chrono::DateTime::from_timestamp(date, 0)
            .map(|dt| dt.to_string())
            .unwrap_or_else(|| date.to_string());
        println!("{:<15} {}", style("Date:").bold(), datetime);
    }

    println!("{:<15} {}", style("Total Size:").bold(), style(HumanBytes(summary.total_size)).green());
    println!("{:<15} {}", style("Piece Size:").bold(), style(HumanBytes(summary.piece_length)).yellow());
    println!("{:<15} {}", style("Piece Count:").bold(), summary.piece_count);
    println!(
        "{:<15} {}",
        style("Private:").bold(),
        if summary.private { style("yes").red() } else { style("no").dim() }
    );
    if let Some(source) = &summary.source {
        println!("{:<15} {}", style("Source:").bold(), source);
    }
    if let Some(announce) = &summary.announce {
        println!("{:<15} {}", style("Tracker:").bold(), style(announce).underlined());
    }
    println!("{:<15} {}", style("Info Hash:").bold(), summary.info_hash);
    println!("{:<15} {}", style("Magnet:").bold(), summary.magnet);

    println!("\n{} {}", FILES, style("Files:").bold());
    for (i, file) in summary.files.iter().enumerate() {
        if i >= 20 {
            println!("  ... and {} more files", style(summary.files.len() - 20).dim());
            break;
        }
        println!("  - {:<40} {}", file.path.join("/"), style(HumanBytes(file.length)).dim());
    }
}

pub fn inspect_torrent(args: &InspectArgs) -> Result<()> {
    let path = &args.torrent;
    let content = fs::read(path)
        .with_context(|| format!("Failed to read torrent file: {}", path.display()))?;
    let summary = describe(&content)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }
    Ok(())
}
