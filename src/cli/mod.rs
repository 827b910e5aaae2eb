// src/cli/mod.rs — CLI definition (clap derive)

pub mod evaluate;
pub mod history;
pub mod progress;
pub mod run;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "specloop",
    about = "Iterative design-spec refinement: generate, score, refine",
    version
)]
pub struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Suppress progress output (only emit final result)
    #[arg(long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a refinement session for a prompt
    Run {
        /// Natural-language design prompt
        #[arg(required = true, trailing_var_arg = true)]
        prompt: Vec<String>,

        /// Refinement rounds (values below 2 are raised to 2)
        #[arg(short = 'n', long)]
        iterations: Option<u32>,

        /// Use binary (+1/-1) rewards instead of continuous
        #[arg(long)]
        binary: bool,

        /// Stop after this many consecutive rounds without improvement
        #[arg(long)]
        patience: Option<u32>,

        /// Ask the configured model for suggestions before falling back to heuristics
        #[arg(long)]
        generative: bool,

        /// Print the full session as JSON
        #[arg(long)]
        json: bool,
    },
    /// Score one or more spec files (JSON)
    Evaluate {
        #[arg(required = true)]
        paths: Vec<String>,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show stored sessions, or the records of one session
    History {
        session_id: Option<String>,

        /// Print records as JSON
        #[arg(long)]
        json: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run() {
        let cli = Cli::parse_from([
            "specloop", "run", "-n", "4", "--binary", "a", "green", "office",
        ]);
        match cli.command {
            Commands::Run {
                prompt,
                iterations,
                binary,
                patience,
                ..
            } => {
                assert_eq!(prompt.join(" "), "a green office");
                assert_eq!(iterations, Some(4));
                assert!(binary);
                assert!(patience.is_none());
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["specloop", "history", "--quiet", "--config", "x.toml"]);
        assert!(cli.quiet);
        assert_eq!(cli.config.as_deref(), Some("x.toml"));
        assert!(matches!(cli.command, Commands::History { session_id: None, .. }));
    }

    #[test]
    fn test_run_requires_prompt() {
        assert!(Cli::try_parse_from(["specloop", "run"]).is_err());
    }
}
