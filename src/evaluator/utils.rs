// src/evaluator/utils.rs — Helper functions for evaluation

pub const COMPLETENESS_WEIGHT: f64 = 0.4;
pub const FORMAT_WEIGHT: f64 = 0.3;
pub const FEASIBILITY_WEIGHT: f64 = 0.3;

/// Fallback suggestion when nothing needs fixing.
pub const LOOKS_GOOD: &str = "Specification looks good!";

/// One sub-score with the lines and suggestions that explain it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubScore {
    pub score: f64,
    pub lines: Vec<String>,
    pub suggestions: Vec<String>,
}

impl SubScore {
    pub fn line(&mut self, text: impl Into<String>) {
        self.lines.push(text.into());
    }

    pub fn suggest(&mut self, text: impl Into<String>) {
        self.suggestions.push(text.into());
    }
}

/// Weighted composite over the three sub-scores, rounded to 2 decimals.
pub fn composite_score(completeness: f64, format_validity: f64, feasibility: f64) -> f64 {
    let raw = COMPLETENESS_WEIGHT * completeness
        + FORMAT_WEIGHT * format_validity
        + FEASIBILITY_WEIGHT * feasibility;
    round2(clamp_score(raw))
}

pub fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        return 0.0;
    }
    score.clamp(0.0, 100.0)
}

pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Keep first occurrences in order. Never returns an empty list.
pub fn merge_suggestions<'a>(groups: impl IntoIterator<Item = &'a [String]>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for s in groups.into_iter().flatten() {
        if !out.iter().any(|o| o.eq_ignore_ascii_case(s)) {
            out.push(s.clone());
        }
    }
    if out.is_empty() {
        out.push(LOOKS_GOOD.into());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_composite_weighted() {
        assert_eq!(composite_score(100.0, 100.0, 100.0), 100.0);
        assert_eq!(composite_score(50.0, 100.0, 0.0), 50.0);
        assert_eq!(composite_score(35.0, 50.0, 70.0), 50.0);
    }

    #[test]
    fn test_composite_rounds() {
        assert_eq!(composite_score(33.333, 0.0, 0.0), 13.33);
    }

    #[test]
    fn test_clamp_nan() {
        assert_eq!(clamp_score(f64::NAN), 0.0);
        assert_eq!(clamp_score(140.0), 100.0);
        assert_eq!(clamp_score(-3.0), 0.0);
    }

    #[test]
    fn test_merge_dedup_keeps_order() {
        let a = vec!["Add materials".to_string(), "Add features".to_string()];
        let b = vec!["add materials".to_string(), "Consolidate".to_string()];
        let merged = merge_suggestions([a.as_slice(), b.as_slice()]);
        assert_eq!(merged, vec!["Add materials", "Add features", "Consolidate"]);
    }

    #[test]
    fn test_merge_never_empty() {
        let merged = merge_suggestions(std::iter::empty::<&[String]>());
        assert_eq!(merged, vec![LOOKS_GOOD.to_string()]);
    }
}
