// src/evaluator/report.rs — Summary over a batch of evaluations

use serde::Serialize;

use super::utils::round2;
use crate::core::types::EvaluationResult;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationSummary {
    pub count: usize,
    pub average: f64,
    pub highest: f64,
    pub lowest: f64,
}

impl EvaluationSummary {
    /// `None` for an empty batch.
    pub fn from_results(results: &[EvaluationResult]) -> Option<Self> {
        if results.is_empty() {
            return None;
        }
        let scores = results.iter().map(|r| r.score);
        let total: f64 = scores.clone().sum();
        Some(Self {
            count: results.len(),
            average: round2(total / results.len() as f64),
            highest: scores.clone().fold(f64::MIN, f64::max),
            lowest: scores.fold(f64::MAX, f64::min),
        })
    }

    pub fn render(&self) -> String {
        format!(
            "{} evaluations: avg {:.2}, best {:.2}, worst {:.2}",
            self.count, self.average, self.highest, self.lowest
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(score: f64) -> EvaluationResult {
        EvaluationResult {
            score,
            completeness: 0.0,
            format_validity: 0.0,
            feasibility: 0.0,
            suggestions: vec![],
            feedback: vec![],
        }
    }

    #[test]
    fn test_summary() {
        let s = EvaluationSummary::from_results(&[result(40.0), result(70.0), result(55.0)])
            .unwrap();
        assert_eq!(s.count, 3);
        assert_eq!(s.average, 55.0);
        assert_eq!(s.highest, 70.0);
        assert_eq!(s.lowest, 40.0);
        assert!(s.render().starts_with("3 evaluations"));
    }

    #[test]
    fn test_empty_batch() {
        assert!(EvaluationSummary::from_results(&[]).is_none());
    }
}
