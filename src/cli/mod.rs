//! Command-line interface for id3spot.
//!
//! One invocation tags every file given on the command line, one after
//! another. Per-file problems are logged and the batch continues; only a
//! broken configuration stops the run before it starts.

mod prompt;

use std::path::{Path, PathBuf};

use clap::Parser;
use tokio::runtime::Builder;

use crate::config;
use crate::enrichment::{
    CoverArtClient, Outcome, SpotifyClient, TagOptions, TaggingService,
    traits::{CatalogApi, CoverArtApi},
};
use crate::metadata::{LoftyStore, TagStore};
use crate::organizer::MAGIC_TEMPLATE;
use crate::report;

pub use prompt::StdinConfirm;

/// Tag audio files with metadata from Spotify
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Audio files to tag
    #[arg(required = true, value_parser = existing_file)]
    pub files: Vec<PathBuf>,

    /// Search for this instead of the term derived from tags or file name
    #[arg(short, long)]
    pub query: Option<String>,

    /// Discard existing tags before writing
    #[arg(short, long)]
    pub replace: bool,

    /// Rename files from a template after tagging, e.g. "$artist - $title"
    #[arg(short = 'R', long, value_name = "TEMPLATE")]
    pub rename: Option<String>,

    /// Also fetch and write tempo and key
    #[arg(short, long)]
    pub analyze: bool,

    /// Look everything up but write nothing (implies --verbose)
    #[arg(short, long)]
    pub dry_run: bool,

    /// Shorthand for --replace --analyze --prompt --rename "$artist - $title"
    #[arg(short = 'x', long)]
    pub magic: bool,

    /// Ask before using a match that differs from the search term
    #[arg(short, long)]
    pub prompt: bool,

    /// Show a diff of each file's tags
    #[arg(short, long)]
    pub verbose: bool,

    /// Directory holding settings.toml
    #[arg(long, env = "ID3SPOT_CONFIG_DIR", value_name = "DIR")]
    pub config_dir: Option<PathBuf>,
}

impl Cli {
    /// Whether diffs (and info-level logs) are shown
    pub fn is_verbose(&self) -> bool {
        self.verbose || self.dry_run
    }

    /// Per-file options with `--magic` and `--dry-run` expanded
    pub fn options(&self) -> TagOptions {
        let rename = match (&self.rename, self.magic) {
            (Some(template), _) => Some(template.clone()),
            (None, true) => Some(MAGIC_TEMPLATE.to_string()),
            (None, false) => None,
        };

        TagOptions {
            query: self.query.clone(),
            replace: self.replace || self.magic,
            rename,
            analyze: self.analyze || self.magic,
            dry_run: self.dry_run,
            prompt: self.prompt || self.magic,
            verbose: self.is_verbose(),
        }
    }
}

fn existing_file(arg: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(arg);
    if path.is_file() {
        Ok(path)
    } else if path.exists() {
        Err(format!("{} is not a regular file", arg))
    } else {
        Err(format!("{} does not exist", arg))
    }
}

/// Load settings, build the clients and tag every file.
pub fn run(cli: &Cli) -> anyhow::Result<()> {
    let settings = config::load(cli.config_dir.as_deref())?;

    let rt = Builder::new_current_thread().enable_all().build()?;

    let catalog = SpotifyClient::new(settings.spotify)?;
    let covers = CoverArtClient::new()?;
    let service = TaggingService::new(catalog, covers, LoftyStore);

    let options = cli.options();
    let mut confirm = StdinConfirm;

    rt.block_on(tag_files(&service, &cli.files, &options, &mut confirm));
    Ok(())
}

/// Process files strictly in order; a failed file never stops the batch.
async fn tag_files<C, A, S>(
    service: &TaggingService<C, A, S>,
    files: &[PathBuf],
    options: &TagOptions,
    confirm: &mut StdinConfirm,
) where
    C: CatalogApi,
    A: CoverArtApi,
    S: TagStore,
{
    for path in files {
        match service.process(path, options, confirm).await {
            Ok(file_report) => {
                if let Some(diff) = &file_report.diff {
                    if report::has_changes(diff) {
                        print_diff(diff);
                    } else {
                        tracing::info!("No tag changes for {}", path.display());
                    }
                }
                log_outcome(&file_report.path, &file_report.outcome);
            }
            Err(e) => tracing::error!("Failed to tag {}: {}", path.display(), e),
        }
    }
}

fn print_diff(lines: &[String]) {
    for line in lines {
        println!("{}", report::colorize(line));
    }
    println!();
}

fn log_outcome(path: &Path, outcome: &Outcome) {
    match outcome {
        Outcome::Tagged { path: dest } if dest != path => {
            tracing::info!("{} -> {}", path.display(), dest.display())
        }
        Outcome::Tagged { .. } => tracing::info!("Tagged {}", path.display()),
        Outcome::Previewed => tracing::info!("Dry run, {} left unchanged", path.display()),
        Outcome::NoMatch { term } => {
            tracing::debug!("Gave up on {} after searching {:?}", path.display(), term)
        }
        Outcome::Declined => tracing::info!("Skipped {}", path.display()),
    }
}
