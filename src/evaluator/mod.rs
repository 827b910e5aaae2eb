// src/evaluator/mod.rs — Evaluation engine

pub mod completeness;
pub mod feasibility;
pub mod format;
pub mod report;
pub mod rules;
pub mod utils;

use tracing::debug;

use crate::core::types::{DesignSpec, EvaluationResult};
use utils::{composite_score, merge_suggestions, round2};

/// Scores a spec. Stateless: one instance can serve any number of
/// concurrent sessions.
#[derive(Debug, Clone, Copy, Default)]
pub struct EvaluationEngine;

impl EvaluationEngine {
    pub fn new() -> Self {
        Self
    }

    /// Deterministic and total: any spec, however incomplete, gets a score in
    /// [0, 100] and at least one suggestion.
    pub fn evaluate(&self, spec: &DesignSpec) -> EvaluationResult {
        let completeness = completeness::score(spec);
        let format = format::score(spec);
        let feasibility = feasibility::score(spec);

        let score = composite_score(completeness.score, format.score, feasibility.score);

        let suggestions = merge_suggestions([
            completeness.suggestions.as_slice(),
            format.suggestions.as_slice(),
            feasibility.suggestions.as_slice(),
        ]);

        let feedback = completeness
            .lines
            .into_iter()
            .chain(format.lines)
            .chain(feasibility.lines)
            .collect();

        debug!(
            design_type = %spec.design_type,
            score,
            completeness = completeness.score,
            format = format.score,
            feasibility = feasibility.score,
            "evaluated spec"
        );

        EvaluationResult {
            score,
            completeness: round2(completeness.score),
            format_validity: round2(format.score),
            feasibility: round2(feasibility.score),
            suggestions,
            feedback,
        }
    }

    /// Lenient entry point for raw JSON input.
    pub fn evaluate_value(&self, value: &serde_json::Value) -> EvaluationResult {
        self.evaluate(&DesignSpec::from_value(value))
    }
}
