// src/core/session.rs — Session result and its in-progress builder

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::types::{
    DesignSpec, EvaluationResult, IterationRecord, LearningInsights, RewardMode, SessionState,
};
use crate::provider::TokenUsage;

/// One end-to-end run for a single prompt. Read-only once returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    id: String,
    prompt: String,
    reward_mode: RewardMode,
    state: SessionState,
    baseline_spec: DesignSpec,
    baseline_evaluation: EvaluationResult,
    iterations: Vec<IterationRecord>,
    final_spec: DesignSpec,
    learning_insights: LearningInsights,
    aborted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    abort_reason: Option<String>,
    #[serde(default)]
    usage: TokenUsage,
    started_at: DateTime<Utc>,
    finished_at: DateTime<Utc>,
}

impl Session {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn reward_mode(&self) -> RewardMode {
        self.reward_mode
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn baseline_spec(&self) -> &DesignSpec {
        &self.baseline_spec
    }

    pub fn baseline_evaluation(&self) -> &EvaluationResult {
        &self.baseline_evaluation
    }

    pub fn iterations(&self) -> &[IterationRecord] {
        &self.iterations
    }

    /// Last post-iteration spec, or the baseline when no round completed.
    pub fn final_spec(&self) -> &DesignSpec {
        &self.final_spec
    }

    /// Last post-iteration score, or the baseline score when no round completed.
    pub fn final_score(&self) -> f64 {
        self.learning_insights.final_score
    }

    pub fn learning_insights(&self) -> &LearningInsights {
        &self.learning_insights
    }

    pub fn aborted(&self) -> bool {
        self.aborted
    }

    pub fn abort_reason(&self) -> Option<&str> {
        self.abort_reason.as_deref()
    }

    pub fn usage(&self) -> TokenUsage {
        self.usage
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn finished_at(&self) -> DateTime<Utc> {
        self.finished_at
    }

    pub fn duration_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }
}

/// Mutable state owned by the orchestrator while a session runs.
pub(crate) struct SessionRun {
    id: String,
    prompt: String,
    reward_mode: RewardMode,
    state: SessionState,
    baseline_spec: DesignSpec,
    baseline_evaluation: EvaluationResult,
    iterations: Vec<IterationRecord>,
    abort_reason: Option<String>,
    started_at: DateTime<Utc>,
}

impl SessionRun {
    pub(crate) fn new(
        id: String,
        prompt: &str,
        reward_mode: RewardMode,
        baseline_spec: DesignSpec,
        baseline_evaluation: EvaluationResult,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            prompt: prompt.to_string(),
            reward_mode,
            state: SessionState::Init,
            baseline_spec,
            baseline_evaluation,
            iterations: Vec::new(),
            abort_reason: None,
            started_at,
        }
    }

    pub(crate) fn id(&self) -> &str {
        &self.id
    }

    pub(crate) fn begin(&mut self) {
        self.state = SessionState::Iterating;
    }

    pub(crate) fn push(&mut self, record: IterationRecord) {
        self.iterations.push(record);
    }

    pub(crate) fn completed(&self) -> usize {
        self.iterations.len()
    }

    /// The spec and evaluation the next round starts from.
    pub(crate) fn previous(&self) -> (&DesignSpec, &EvaluationResult) {
        match self.iterations.last() {
            Some(r) => (&r.spec_after, &r.evaluation_after),
            None => (&self.baseline_spec, &self.baseline_evaluation),
        }
    }

    pub(crate) fn abort(&mut self, reason: impl Into<String>) {
        self.state = SessionState::Aborted;
        self.abort_reason = Some(reason.into());
    }

    pub(crate) fn finish(&mut self, state: SessionState) {
        debug_assert!(state.is_terminal());
        if self.state != SessionState::Aborted {
            self.state = state;
        }
    }

    pub(crate) fn seal(self, usage: TokenUsage) -> Session {
        let final_spec = self
            .iterations
            .last()
            .map(|r| r.spec_after.clone())
            .unwrap_or_else(|| self.baseline_spec.clone());
        let learning_insights =
            LearningInsights::from_records(self.baseline_evaluation.score, &self.iterations);
        Session {
            aborted: self.state == SessionState::Aborted,
            id: self.id,
            prompt: self.prompt,
            reward_mode: self.reward_mode,
            state: self.state,
            baseline_spec: self.baseline_spec,
            baseline_evaluation: self.baseline_evaluation,
            iterations: self.iterations,
            final_spec,
            learning_insights,
            abort_reason: self.abort_reason,
            usage,
            started_at: self.started_at,
            finished_at: Utc::now(),
        }
    }
}
