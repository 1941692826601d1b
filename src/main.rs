//! `livecount` CLI - scrape, watch and serve YouTube live viewer counts

mod cmd;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use livecount::{Config, ScrapeMode};

#[derive(Parser)]
#[command(name = "livecount")]
#[command(about = "Best-effort YouTube live viewer counter")]
#[command(version)]
struct Cli {
    /// Config file (default: ~/.config/livecount/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary
    #[default]
    Full,
    /// The result object as JSON
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape a video or channel once
    Scrape {
        /// Video or channel URL
        url: String,

        /// Force video or channel mode (default: inferred from the URL)
        #[arg(short, long, value_enum)]
        mode: Option<ScrapeMode>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Full)]
        format: OutputFormat,
    },

    /// Poll a video or channel and print one line per sample
    Watch {
        /// Video or channel URL
        url: String,

        #[arg(short, long, value_enum)]
        mode: Option<ScrapeMode>,

        /// Seconds between samples
        #[arg(short, long, default_value = "30")]
        interval: u64,

        /// Stop after this many samples (default: until Ctrl-C)
        #[arg(short = 'n', long)]
        count: Option<usize>,

        /// `json` prints one compact result object per line
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Full)]
        format: OutputFormat,
    },

    /// Run the HTTP scrape endpoint
    Serve {
        /// Listen address (default: from config, 127.0.0.1:3000)
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Print sample browser header profiles
    Fingerprint {
        /// Number of profiles to generate
        #[arg(short, long, default_value = "3")]
        count: usize,
    },
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Scrape { url, mode, format } => {
            let config = Config::load(cli.config.as_deref())?;
            cmd::cmd_scrape(&config, &url, mode, format).await?;
        }
        Commands::Watch {
            url,
            mode,
            interval,
            count,
            format,
        } => {
            let config = Config::load(cli.config.as_deref())?;
            cmd::cmd_watch(&config, &url, mode, interval, count, format).await?;
        }
        Commands::Serve { bind } => {
            let config = Config::load(cli.config.as_deref())?;
            cmd::cmd_serve(&config, bind.as_deref()).await?;
        }
        Commands::Fingerprint { count } => {
            cmd::cmd_fingerprint(count);
        }
    }

    Ok(())
}
