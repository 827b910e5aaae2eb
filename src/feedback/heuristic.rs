// src/feedback/heuristic.rs — Rule-based improvement suggestions

use crate::core::types::{DesignSpec, EvaluationResult};
use crate::evaluator::utils::LOOKS_GOOD;

const SUSTAINABILITY_KEYWORDS: &[&str] = &["sustainable", "green", "eco"];
const ECO_MATERIALS: &[&str] = &["bamboo", "recycled", "timber", "hempcrete", "cork"];

/// Ordered, de-duplicated suggestions. Evaluation suggestions come first, then
/// spec and prompt rules, then a score-band note. Never empty.
pub fn suggestions(spec: &DesignSpec, prompt: &str, evaluation: &EvaluationResult) -> Vec<String> {
    let mut out: Vec<String> = evaluation
        .suggestions
        .iter()
        .filter(|s| s.as_str() != LOOKS_GOOD)
        .cloned()
        .collect();

    if spec.materials.is_empty() {
        out.push("Add material specifications for structural integrity".into());
    }
    if spec.features.len() < 2 {
        out.push(format!(
            "Include more functional features based on {} type",
            spec.design_type
        ));
    }

    if spec.design_type.is_building() {
        if matches!(spec.dimensions.positive_area(), Some(a) if a < 100.0) {
            out.push("Consider increasing building area for practical use".into());
        }
        let category = spec.category.trim().to_lowercase();
        if category == "office" && !has_feature(spec, "elevator") {
            out.push("Add elevator for multi-story office building".into());
        }
        if category == "residential" && !has_feature(spec, "parking") {
            out.push("Include parking facilities for residential building".into());
        }
    }

    let prompt = prompt.to_lowercase();
    if SUSTAINABILITY_KEYWORDS.iter().any(|k| prompt.contains(k)) {
        let has_eco = spec
            .materials
            .iter()
            .any(|m| ECO_MATERIALS.iter().any(|e| m.normalized().contains(e)));
        if !has_eco {
            out.push("Use eco-friendly materials such as bamboo or recycled steel".into());
        }
        if !has_feature(spec, "solar") {
            out.push("Add solar panels for renewable energy".into());
        }
    }

    if evaluation.score < 70.0 {
        out.push("Overall specification needs significant improvement".into());
    } else if evaluation.score < 85.0 {
        out.push("Good specification with room for enhancement".into());
    }

    let mut seen: Vec<String> = Vec::with_capacity(out.len());
    out.retain(|s| {
        let key = s.to_lowercase();
        if seen.contains(&key) {
            false
        } else {
            seen.push(key);
            true
        }
    });

    if out.is_empty() {
        out.push(LOOKS_GOOD.to_string());
    }
    out
}

fn has_feature(spec: &DesignSpec, needle: &str) -> bool {
    spec.features
        .iter()
        .any(|f| f.to_lowercase().contains(needle))
}
