use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};

use feedly_rules::channels::feedly::{DEFAULT_FEEDLY_API_BASE, default_token_dir};
use feedly_rules::config::Config;
use feedly_rules::pipeline::run;
use feedly_rules::processors::ProcessorContext;

#[derive(Parser)]
#[command(name = "feedly-rules", version, about = "Route saved Feedly entries through rules")]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch saved entries and apply the configured rules.
    Process {
        /// Path to the rules YAML file.
        #[arg(long)]
        config_file: PathBuf,

        /// Directory holding the Feedly `access.token` (default: ~/.config/feedly).
        #[arg(long)]
        token_dir: Option<PathBuf>,

        /// Feedly API base URL.
        #[arg(long, env = "FEEDLY_API_BASE", default_value = DEFAULT_FEEDLY_API_BASE)]
        feedly_api_base: String,
    },
    /// Print the JSON Schema of the rules file.
    ShowConfigSchema,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so schema output on stdout stays machine-readable
    let fallback = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(fallback)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    match cli.command {
        Command::Process {
            config_file,
            token_dir,
            feedly_api_base,
        } => process(&config_file, token_dir, &feedly_api_base).await,
        Command::ShowConfigSchema => {
            println!("{}", serde_json::to_string_pretty(&Config::schema())?);
            Ok(())
        }
    }
}

async fn process(
    config_file: &Path,
    token_dir: Option<PathBuf>,
    feedly_api_base: &str,
) -> anyhow::Result<()> {
    let token_dir = match token_dir {
        Some(dir) => dir,
        None => default_token_dir().context("cannot determine home directory for token dir")?,
    };
    let summary = run(
        config_file,
        &token_dir,
        feedly_api_base,
        &ProcessorContext::from_env(),
    )
    .await?;

    // Per-rule failures are logged inside the loop and never change the exit code
    if summary.failed > 0 {
        tracing::warn!(
            failed = summary.failed,
            entries = summary.entries,
            "Some rules failed; see errors above"
        );
    }
    Ok(())
}
