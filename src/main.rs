use anyhow::{Context, Result};
use clap::Parser;
use console::{Emoji, style};
use indicatif::{HumanBytes, ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use piecewright::cli::{Cli, Command, CreateArgs};
use piecewright::inspect::{TorrentSummary, inspect_torrent, print_summary};
use piecewright::settings::Settings;
use piecewright::{FsSource, TorrentBuilder, TorrentOptions};

static DRY_RUN: Emoji<'_, '_> = Emoji("🏃 ", "DRY-RUN ");

fn main() -> Result<()> {
    let cli = Cli::parse();

    let verbose = matches!(&cli.command, Command::Create(args) if args.verbose);
    init_tracing(verbose);

    match cli.command {
        Command::Create(args) => create_torrent(args),
        Command::Inspect(args) => inspect_torrent(&args),
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "piecewright=debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn create_torrent(args: CreateArgs) -> Result<()> {
    let settings = Settings::load(args.config.as_deref())?;
    let output_dir = settings.output_dir();

    let options = TorrentOptions {
        announce: args.announce.or(settings.announce).unwrap_or_default(),
        source: args.source.or(settings.source).unwrap_or_default(),
        piece_length: args.piece_length.or(settings.piece_length).map(|exp| 1u64 << exp),
        creation_date: None,
        entropy: None,
    };
    let threads = args.threads.or(settings.threads).unwrap_or_else(num_cpus::get);

    let source = FsSource::scan(&args.target, args.output.as_deref(), &args.exclude)?;
    let mut builder = TorrentBuilder::new(source, options).with_threads(threads);

    if args.dry_run {
        let plan = builder.plan()?;
        eprintln!("{} {}", DRY_RUN, style("Dry Run Results:").bold().underlined());
        eprintln!("{:<15} {}", style("Total Size:").bold(), style(HumanBytes(plan.total_size)).green());
        eprintln!("{:<15} {}", style("File Count:").bold(), plan.file_count);
        eprintln!("{:<15} {}", style("Piece Length:").bold(), style(HumanBytes(plan.piece_length)).yellow());
        eprintln!("{:<15} {}", style("Piece Count:").bold(), plan.num_pieces);
        return Ok(());
    }

    let pb = if args.quiet || args.json {
        None
    } else {
        let plan = builder.plan()?;
        let pb = ProgressBar::new(plan.total_size);
        pb.set_draw_target(ProgressDrawTarget::stderr_with_hz(10));
        pb.set_style(
            ProgressStyle::with_template(
                "{spinner:.green} [{elapsed_precise}] {bar:40.202/94} {bytes}/{total_bytes} ({eta}) {msg}",
            )?
            .progress_chars("█▓▒░"),
        );
        pb.set_message("Hashing...");
        builder = builder.with_progress(pb.clone());
        Some(pb)
    };

    let torrent = builder.build()?;
    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    // Determine output file path
    let output_path = args.output.clone().unwrap_or_else(|| {
        let file_name = torrent.metainfo.file_name();
        match output_dir {
            Some(dir) => dir.join(file_name),
            None => PathBuf::from(file_name),
        }
    });

    write_output(&output_path, &torrent.bytes, args.force)?;

    let summary = TorrentSummary::from(&torrent.metainfo);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else if args.verbose {
        print_summary(&summary);
    }
    eprintln!("Created: {}", output_path.display());

    Ok(())
}

fn write_output(output_path: &Path, data: &[u8], force: bool) -> Result<()> {
    let mut output_file = if force {
        File::create(output_path).context("Failed to create output file")?
    } else {
        File::options()
            .write(true)
            .create_new(true)
            .open(output_path)
            .with_context(|| {
                format!(
                    "Failed to create output file (use -f to overwrite): {}",
                    output_path.display()
                )
            })?
    };

    output_file
        .write_all(data)
        .context("Failed to write torrent file")
}
