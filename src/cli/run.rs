// src/cli/run.rs — `specloop run`: one refinement session

use tokio_util::sync::CancellationToken;

use super::progress::terminal_progress;
use crate::core::orchestrator::IterationOrchestrator;
use crate::core::session::Session;
use crate::core::types::{IterationEngineConfig, RewardMode};
use crate::feedback::FeedbackSynthesizer;
use crate::infra::config::Config;
use crate::memory;

/// Flags of the `run` subcommand.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub prompt: String,
    pub iterations: Option<u32>,
    pub binary: bool,
    pub patience: Option<u32>,
    pub generative: bool,
    pub json: bool,
    pub quiet: bool,
}

/// Command-line flags layered over the config file.
pub fn engine_config(opts: &RunOptions, config: &Config) -> IterationEngineConfig {
    let mut engine = IterationEngineConfig::from(&config.iteration);
    if let Some(n) = opts.iterations {
        engine.max_iterations = n;
    }
    if opts.binary {
        engine.reward_mode = RewardMode::Binary;
    }
    if opts.patience.is_some() {
        engine.convergence_patience = opts.patience;
    }
    engine
}

pub async fn run_session(opts: RunOptions, config: &Config) -> anyhow::Result<()> {
    let engine = engine_config(&opts, config);
    let max = engine.max_iterations;

    let mut feedback_cfg = config.feedback.clone();
    feedback_cfg.generative |= opts.generative;

    let generator = crate::generator::from_config(&config.generator);
    let mut orchestrator = IterationOrchestrator::new(generator, engine)
        .with_feedback(FeedbackSynthesizer::from_config(&feedback_cfg))
        .with_store(memory::open_store(&config.storage));
    if !opts.quiet {
        orchestrator = orchestrator.with_progress(terminal_progress());
    }
    tracing::debug!(store = orchestrator.store().name(), "store ready");

    // Ctrl-C stops the session before the next round; completed rounds are kept.
    let cancel = CancellationToken::new();
    let watcher = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        })
    };

    let result = orchestrator
        .run_with_cancel(&opts.prompt, max, &cancel)
        .await;
    watcher.abort();
    let session = result?;

    if opts.json {
        println!("{}", serde_json::to_string_pretty(&session)?);
    } else {
        print!("{}", render_session(&session));
    }
    Ok(())
}

/// Human-readable summary for stdout.
pub fn render_session(session: &Session) -> String {
    let insights = session.learning_insights();
    let mut out = String::new();
    out.push_str(&format!("Session {}\n", session.id()));
    out.push_str(&format!(
        "  baseline score: {:.2}\n",
        session.baseline_evaluation().score
    ));
    for r in session.iterations() {
        out.push_str(&format!(
            "  iteration {}: {:.2} -> {:.2} (reward {:.2})\n",
            r.iteration_number,
            r.score_before(),
            r.score_after(),
            r.reward
        ));
    }
    out.push_str(&format!(
        "  final score: {:.2} ({:+.2}), state: {}\n",
        session.final_score(),
        insights.improvement,
        session.state()
    ));
    if let Some(reason) = session.abort_reason() {
        out.push_str(&format!("  aborted: {reason}\n"));
    }
    let usage = session.usage();
    if usage.total() > 0 {
        out.push_str(&format!("  tokens: {}\n", usage.total()));
    }
    out.push_str(&format!(
        "\n{}\n",
        serde_json::to_string_pretty(session.final_spec()).unwrap_or_default()
    ));
    out
}
