//! Soheili - headless host for the Soheili Wood interaction core
//!
//! Stands in for the browser when exercising the page logic:
//! - `check` validates a page description
//! - `replay` feeds a scripted event session through the page and prints a
//!   render snapshot after every event

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use soheili_core::PageConfig;

mod replay;

/// Soheili Wood page interaction host
#[derive(Parser)]
#[command(name = "soheili")]
#[command(about = "Validate page descriptions and replay interaction sessions", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Load and validate a page description
    Check {
        /// Page description (TOML)
        config: PathBuf,
    },

    /// Replay an event script against a page
    Replay {
        /// Page description (TOML)
        config: PathBuf,

        /// Event script (JSON array of timed events)
        script: PathBuf,

        /// Pretty-print snapshots
        #[arg(long)]
        pretty: bool,
    },
}

fn init_logging(level: &str) {
    // Logs go to stderr so stdout stays clean for snapshots
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    match cli.command {
        Commands::Check { config } => {
            let page = PageConfig::load(&config)
                .with_context(|| format!("invalid page description {}", config.display()))?;
            println!("Page description OK: {}", config.display());
            println!("  sections:      {}", page.sections.len());
            for section in &page.sections {
                println!(
                    "    #{:<16} top {:>7.0}px  height {:>7.0}px",
                    section.id, section.top, section.height
                );
            }
            println!("  gallery items: {}", page.gallery.len());
            println!("  animated:      {}", page.animated.len());
            println!("  lazy images:   {}", page.lazy_images.len());
            println!("  tooltips:      {}", page.tooltips.len());
            println!(
                "  form fields:   {}",
                page.form
                    .fields
                    .iter()
                    .map(|f| if f.required {
                        format!("{}*", f.name)
                    } else {
                        f.name.clone()
                    })
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }
        Commands::Replay {
            config,
            script,
            pretty,
        } => {
            let page = PageConfig::load(&config)
                .with_context(|| format!("invalid page description {}", config.display()))?;
            let steps = replay::load_script(&script)?;
            let stdout = std::io::stdout();
            replay::run(page, steps, &mut stdout.lock(), pretty).await?;
        }
    }

    Ok(())
}
