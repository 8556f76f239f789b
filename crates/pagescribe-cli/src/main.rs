//! Pagescribe command-line host: entry point.

use std::path::{Path, PathBuf};

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use pagescribe::Extractor;
use pagescribe_cli::commands::{apply, extract, watch};
use pagescribe_cli::{load_config, Status};

#[derive(Parser)]
#[command(
    name = "pagescribe",
    about = "Snapshot rendered pages into structured records and replay them into forms",
    version
)]
struct Cli {
    /// Path to a JSON config file. Also reads PAGESCRIBE_CONFIG.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract one record from an HTML page and print it.
    Extract {
        /// HTML file to read.
        html: PathBuf,

        /// URL to stamp on the record instead of the file path.
        #[arg(long)]
        url: Option<String>,

        /// Also copy the record into this file.
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Print single-line JSON.
        #[arg(long)]
        compact: bool,
    },

    /// Re-extract each time the page file settles after changes.
    Watch {
        /// HTML file to watch.
        html: PathBuf,

        /// URL to stamp on each record.
        #[arg(long)]
        url: Option<String>,

        /// Quiet period in milliseconds before a refresh.
        #[arg(long)]
        quiet_ms: Option<u64>,

        /// Print single-line JSON.
        #[arg(long)]
        compact: bool,
    },

    /// Apply a record to the form controls of an HTML page.
    Apply {
        /// HTML file holding the form.
        html: PathBuf,

        /// Record JSON file, or `-` for stdin.
        record: PathBuf,

        /// URL of the page.
        #[arg(long)]
        url: Option<String>,
    },

    /// Generate shell completion scripts.
    ///
    /// Examples:
    ///   pagescribe completions bash > ~/.local/share/bash-completion/completions/pagescribe
    ///   pagescribe completions zsh > ~/.zfunc/_pagescribe
    Completions {
        /// Shell type (bash, zsh, fish, powershell, elvish).
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let status = match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "pagescribe", &mut std::io::stdout());
            return Ok(());
        }
        command => run(command, cli.config.as_deref()).await?,
    };

    eprintln!("{status}");
    if status.is_failure() {
        std::process::exit(1);
    }
    Ok(())
}

async fn run(command: Commands, config_path: Option<&Path>) -> anyhow::Result<Status> {
    let config = load_config(config_path)?;
    let extractor = Extractor::new(config.extract.clone())?;

    let status = match command {
        Commands::Extract {
            html,
            url,
            out,
            compact,
        } => extract::run(
            &extract::ExtractArgs {
                html,
                url,
                out,
                compact,
            },
            &extractor,
        )?,

        Commands::Watch {
            html,
            url,
            quiet_ms,
            compact,
        } => {
            let args = watch::WatchArgs {
                html,
                url,
                quiet_ms,
                compact,
            };
            watch::run(&args, &config, &extractor).await?
        }

        Commands::Apply { html, record, url } => {
            apply::run(&apply::ApplyArgs { html, record, url }, &config)?
        }

        Commands::Completions { .. } => Status::Refreshed,
    };
    Ok(status)
}
