use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use checkout_harness::{config::HarnessConfig, runner};

/// UI acceptance run against the hosted payment checkout.
#[derive(Debug, Parser)]
#[command(name = "checkout-harness", version, about)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Run the browser with a visible window.
    #[arg(long)]
    headful: bool,

    /// Directory for flow screenshots.
    #[arg(long)]
    screenshots_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = HarnessConfig::load(cli.config.as_deref())?;
    if cli.headful {
        config.browser.headless = false;
    }
    if let Some(dir) = cli.screenshots_dir {
        config.screenshots_dir = dir;
    }

    let summary = runner::run_checkout(&config).await?;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
