// src/main.rs — specloop entry point

use clap::Parser;

use specloop::cli::run::RunOptions;
use specloop::cli::{Cli, Commands};
use specloop::infra::config::Config;
use specloop::infra::{logger, paths};
use specloop::memory;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load config (falls back to defaults if no config.toml)
    let config = if let Some(ref path) = cli.config {
        Config::load_from(std::path::Path::new(path))?
    } else {
        Config::load()?
    };

    // Respects RUST_LOG over the configured level
    logger::init_logging(&config.logging.level);

    if !matches!(cli.command, Commands::Evaluate { .. }) {
        paths::ensure_dirs().await?;
    }

    match cli.command {
        Commands::Run {
            prompt,
            iterations,
            binary,
            patience,
            generative,
            json,
        } => {
            let opts = RunOptions {
                prompt: prompt.join(" "),
                iterations,
                binary,
                patience,
                generative,
                json,
                quiet: cli.quiet,
            };
            specloop::cli::run::run_session(opts, &config).await
        }
        Commands::Evaluate { paths, json } => specloop::cli::evaluate::run_evaluate(&paths, json),
        Commands::History { session_id, json } => {
            let store = memory::open_store(&config.storage);
            specloop::cli::history::run_history(store.as_ref(), session_id.as_deref(), json)
        }
    }
}
