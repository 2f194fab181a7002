use anyhow::Result;
use clap::Parser;
use museatlas::config::AtlasConfig;
use museatlas::pipeline;
use std::path::PathBuf;
use tracing::error;
use tracing_subscriber::EnvFilter;

/// Build the walking-accessibility atlas of Paris museums.
#[derive(Parser, Debug)]
#[command(name = "museatlas", version, about)]
struct Cli {
    /// Path to the configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log at debug level regardless of the configured level
    #[arg(long, short)]
    verbose: bool,
}

// The whole pipeline is one museum at a time, one request at a time; a
// current-thread runtime makes that explicit.
#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    let config = match AtlasConfig::load_from_path(cli.config.clone()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e:#}");
            std::process::exit(1);
        }
    };

    init_tracing(&config, cli.verbose);

    if let Err(e) = run(config).await {
        error!("{e:#}");
        eprintln!("{}", user_message(&e));
        std::process::exit(1);
    }
}

async fn run(config: AtlasConfig) -> Result<()> {
    let summary = pipeline::run(config).await?;
    println!(
        "Done: {} museums ({} linked, {} summarized), {} stations, {} reports.",
        summary.museums, summary.linked, summary.summarized, summary.stations, summary.reports
    );
    Ok(())
}

fn init_tracing(config: &AtlasConfig, verbose: bool) {
    let level = if verbose {
        "debug"
    } else {
        config.logging.level.as_str()
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if config.logging.format == "json" {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

fn user_message(error: &anyhow::Error) -> String {
    match error.downcast_ref::<museatlas::AtlasError>() {
        Some(atlas_error) => atlas_error.user_message(),
        None => format!("{error:#}"),
    }
}
