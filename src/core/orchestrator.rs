// src/core/orchestrator.rs — Iteration controller

use std::sync::Arc;

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::cost::UsageLedger;
use super::outcome::{bounded, Outcome};
use super::reward::RewardCalculator;
use super::session::{Session, SessionRun};
use super::types::*;
use crate::evaluator::EvaluationEngine;
use crate::feedback::FeedbackSynthesizer;
use crate::generator::{Generator, RuleGenerator};
use crate::infra::errors::SpecloopError;
use crate::memory::{IterationStore, VolatileStore};

/// Drives the generate → (feedback → mutate → evaluate → reward → record)
/// loop for one prompt at a time.
///
/// Holds no per-session state: one instance behind an `Arc` can run many
/// sessions concurrently. Each session is strictly sequential.
pub struct IterationOrchestrator {
    generator: Arc<dyn Generator>,
    /// Deterministic stand-in when a mutation call times out.
    refiner: RuleGenerator,
    evaluator: EvaluationEngine,
    feedback: FeedbackSynthesizer,
    store: Arc<dyn IterationStore>,
    ledger: Arc<UsageLedger>,
    config: IterationEngineConfig,
    /// Optional callback for real-time progress events.
    on_progress: Option<Box<dyn Fn(ProgressEvent) + Send + Sync>>,
}

impl IterationOrchestrator {
    /// Heuristic feedback and an in-memory store; swap either with the
    /// `with_*` builders.
    pub fn new(generator: Arc<dyn Generator>, config: IterationEngineConfig) -> Self {
        Self {
            generator,
            refiner: RuleGenerator::new(),
            evaluator: EvaluationEngine::new(),
            feedback: FeedbackSynthesizer::new(),
            store: Arc::new(VolatileStore::new()),
            ledger: Arc::new(UsageLedger::new()),
            config,
            on_progress: None,
        }
    }

    pub fn with_feedback(mut self, feedback: FeedbackSynthesizer) -> Self {
        self.feedback = feedback;
        self
    }

    pub fn with_store(mut self, store: Arc<dyn IterationStore>) -> Self {
        self.store = store;
        self
    }

    pub fn with_ledger(mut self, ledger: Arc<UsageLedger>) -> Self {
        self.ledger = ledger;
        self
    }

    /// Set a callback for real-time progress events.
    pub fn with_progress(mut self, cb: impl Fn(ProgressEvent) + Send + Sync + 'static) -> Self {
        self.on_progress = Some(Box::new(cb));
        self
    }

    pub fn config(&self) -> &IterationEngineConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn IterationStore> {
        &self.store
    }

    pub fn ledger(&self) -> &Arc<UsageLedger> {
        &self.ledger
    }

    fn emit(&self, event: ProgressEvent) {
        if let Some(ref cb) = self.on_progress {
            cb(event);
        }
    }

    /// Run a full session. `max_iterations` below 2 is raised to 2.
    ///
    /// Only a failed baseline is an error. Anything that goes wrong later
    /// comes back as an aborted `Session` holding the completed rounds.
    pub async fn run(&self, prompt: &str, max_iterations: u32) -> Result<Session, SpecloopError> {
        self.run_with_cancel(prompt, max_iterations, &CancellationToken::new())
            .await
    }

    /// Like [`run`](Self::run), checking `cancel` before each round.
    pub async fn run_with_cancel(
        &self,
        prompt: &str,
        max_iterations: u32,
        cancel: &CancellationToken,
    ) -> Result<Session, SpecloopError> {
        let max = IterationEngineConfig::effective_iterations(max_iterations);
        let session_id = uuid::Uuid::new_v4().to_string();
        let started_at = Utc::now();
        let timeout = self.config.generator_timeout;

        info!(
            session_id = %session_id,
            generator = self.generator.name(),
            max_iterations = max,
            reward_mode = %self.config.reward_mode,
            "session started"
        );

        // 1. Baseline
        let baseline = match bounded(timeout, self.generator.generate(prompt, None)).await {
            Outcome::Ready(generated) => {
                self.ledger.record(&session_id, 0, "generate", generated.usage);
                generated.spec
            }
            other => {
                warn!(session_id = %session_id, reason = %other.reason(), "baseline failed");
                return Err(SpecloopError::Baseline(other.reason()));
            }
        };
        let baseline_eval = self.evaluator.evaluate(&baseline);
        self.emit(ProgressEvent::BaselineReady {
            session_id: session_id.clone(),
            score: baseline_eval.score,
        });

        let mut run = SessionRun::new(
            session_id.clone(),
            prompt,
            self.config.reward_mode,
            baseline,
            baseline_eval,
            started_at,
        );
        run.begin();

        let reward = RewardCalculator::new(self.config.reward_mode);
        let mut final_state = SessionState::Exhausted;
        let mut stale_rounds = 0u32;

        // 2. Refinement rounds
        for n in 1..=max {
            if cancel.is_cancelled() {
                info!(session_id = %run.id(), completed = run.completed(), "session cancelled");
                run.abort("cancelled");
                self.emit(ProgressEvent::Aborted {
                    completed: run.completed(),
                    reason: "cancelled".into(),
                });
                break;
            }

            self.emit(ProgressEvent::IterationStart {
                iteration: n,
                max_iterations: max,
            });

            let (prev_spec, prev_eval) = {
                let (s, e) = run.previous();
                (s.clone(), e.clone())
            };

            let feedback = self.feedback.synthesize(&prev_spec, prompt, &prev_eval).await;
            self.ledger
                .record(&session_id, n, "feedback", feedback.usage);
            if let Err(e) = self.store.log_feedback(&session_id, n, &feedback) {
                debug!(session_id = %session_id, iteration = n, "feedback audit dropped: {e}");
            }

            let mutated = bounded(
                timeout,
                self.generator
                    .mutate(&prev_spec, &feedback.suggestions, prompt),
            )
            .await;
            let next_spec = match mutated {
                Outcome::Ready(generated) => {
                    self.ledger.record(&session_id, n, "mutate", generated.usage);
                    generated.spec
                }
                Outcome::TimedOut { after } => {
                    warn!(
                        session_id = %session_id,
                        iteration = n,
                        after_ms = after.as_millis() as u64,
                        "mutate timed out, applying heuristic refinement"
                    );
                    self.emit(ProgressEvent::FallbackUsed {
                        iteration: n,
                        stage: "mutate".into(),
                        reason: mutated_reason(after),
                    });
                    self.refiner.refine(&prev_spec, &feedback.suggestions)
                }
                other => {
                    let reason = format!("iteration {n}: generator failed: {}", other.reason());
                    warn!(session_id = %session_id, "{reason}");
                    run.abort(reason.clone());
                    self.emit(ProgressEvent::Aborted {
                        completed: run.completed(),
                        reason,
                    });
                    break;
                }
            };

            let next_eval = self.evaluator.evaluate(&next_spec);
            let r = reward.calculate(prev_eval.score, next_eval.score);
            let record = IterationRecord::new(
                &session_id,
                n,
                prompt,
                prev_spec,
                next_spec,
                prev_eval,
                next_eval,
                feedback,
                r,
            );

            if let Err(e) = self.store.append(&session_id, &record) {
                warn!(
                    session_id = %session_id,
                    iteration = n,
                    store = self.store.name(),
                    "record not persisted: {e}"
                );
            }

            self.emit(ProgressEvent::IterationEnd {
                iteration: n,
                score_before: record.score_before(),
                score_after: record.score_after(),
                reward: r,
            });
            debug!(
                session_id = %session_id,
                iteration = n,
                before = record.score_before(),
                after = record.score_after(),
                reward = r,
                "iteration complete"
            );

            let improved = record.improvement > 0.0;
            run.push(record);

            // Opt-in plateau stop, never below the minimum round count.
            if let Some(patience) = self.config.convergence_patience.filter(|p| *p > 0) {
                stale_rounds = if improved { 0 } else { stale_rounds + 1 };
                if stale_rounds >= patience && n >= MIN_ITERATIONS && n < max {
                    info!(
                        session_id = %session_id,
                        iteration = n,
                        patience,
                        "converged, stopping early"
                    );
                    final_state = SessionState::Converged;
                    break;
                }
            }
        }

        run.finish(final_state);
        let session = run.seal(self.ledger.take(&session_id));

        info!(
            session_id = %session_id,
            iterations = session.iterations().len(),
            final_score = session.final_score(),
            state = %session.state(),
            "session finished"
        );
        self.emit(ProgressEvent::Complete {
            iterations: session.iterations().len(),
            final_score: session.final_score(),
            improvement: session.learning_insights().improvement,
            state: session.state(),
        });

        Ok(session)
    }
}

fn mutated_reason(after: std::time::Duration) -> String {
    format!("generator timed out after {}ms", after.as_millis())
}
