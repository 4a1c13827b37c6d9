// src/main.rs
//
// sitevisit: organize a site visit submission tree, or diff two listings.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use sitevisit::application::commands::{diff_listings, organize};
use sitevisit::application::dto::{DiffRequest, OrganizeRequest};
use sitevisit::application::state::AppState;
use sitevisit::config::load_config;
use sitevisit::events::{create_event_bus, ConversionFailed, SubmissionConverted};
use sitevisit::infrastructure::default_input_root;

#[derive(Parser)]
#[command(name = "sitevisit")]
#[command(about = "Resolve, convert and QR-stamp site visit papers and posters")]
#[command(version)]
struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve the latest revisions and produce the output tree
    Organize {
        /// Submission root; defaults to ~/Downloads/<year> Annual Site Visit
        root: Option<PathBuf>,

        /// TOML configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// QR link prefix for posters
        #[arg(long)]
        base_url: Option<String>,

        /// Concurrent conversions
        #[arg(long)]
        jobs: Option<usize>,

        /// Office renderer binary
        #[arg(long)]
        soffice: Option<PathBuf>,

        /// Run root; defaults to a timestamped sibling of the submission root
        #[arg(long)]
        output: Option<PathBuf>,

        /// Report what would be produced without writing anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Compare two listing CSVs, or the two CSVs in one directory
    Diff {
        old: PathBuf,
        new: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    match cli.command {
        Command::Organize {
            root,
            config,
            base_url,
            jobs,
            soffice,
            output,
            dry_run,
        } => {
            let mut app_config = match config {
                Some(path) => load_config(&path)
                    .with_context(|| format!("Failed to load config from {}", path.display()))?,
                None => Default::default(),
            };
            if let Some(base_url) = base_url {
                app_config.stamping.base_url = base_url;
            }
            if let Some(jobs) = jobs {
                app_config.jobs = Some(jobs);
            }
            if let Some(program) = soffice {
                app_config.renderer.program = program;
            }

            let input_root = root.unwrap_or_else(default_input_root);
            let event_bus = Arc::new(create_event_bus());
            event_bus.subscribe::<SubmissionConverted, _>(|event| {
                eprintln!("  done    {}", event.destination.display());
            });
            event_bus.subscribe::<ConversionFailed, _>(|event| {
                eprintln!("  FAILED  {} ({})", event.destination.display(), event.stage);
            });
            let state = AppState::new(app_config, event_bus);

            let report = organize(
                &state,
                OrganizeRequest {
                    input_root: input_root.clone(),
                    output_root: output,
                    dry_run,
                },
            )
            .await
            .with_context(|| format!("Failed to organize {}", input_root.display()))?;

            print!("{}", report.render_text());
        }

        Command::Diff { old, new } => {
            let outcome = diff_listings(DiffRequest {
                old: old.clone(),
                new,
            })
            .with_context(|| format!("Failed to diff listings from {}", old.display()))?;

            print!("{}", outcome.render_text());
        }
    }

    Ok(())
}
