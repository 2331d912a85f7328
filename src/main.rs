//! id3spot - tag audio files with metadata from Spotify.
//!
//! Derives a search term per file, finds the best catalog match and writes
//! title, artists, album, disc, dates, genre, label, cover art and
//! optionally tempo/key into the file's tags.

pub mod cli;
pub mod config;
pub mod enrichment;
pub mod error;
pub mod metadata;
pub mod organizer;
pub mod report;
#[cfg(test)]
pub mod test_utils;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    // RUST_LOG wins; otherwise warnings only unless verbose
    let default_level = if args.is_verbose() { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("id3spot={}", default_level)));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();

    cli::run(&args)
}
