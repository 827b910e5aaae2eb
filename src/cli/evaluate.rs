// src/cli/evaluate.rs — `specloop evaluate`: score spec files without iterating

use std::path::Path;

use anyhow::Context;

use crate::core::types::EvaluationResult;
use crate::evaluator::report::EvaluationSummary;
use crate::evaluator::EvaluationEngine;

/// Score one JSON file. Any JSON value is accepted; malformed specs
/// just score low.
pub fn evaluate_file(path: &Path) -> anyhow::Result<EvaluationResult> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&text)
        .with_context(|| format!("{} is not JSON", path.display()))?;
    Ok(EvaluationEngine::new().evaluate_value(&value))
}

pub fn run_evaluate(paths: &[String], json: bool) -> anyhow::Result<()> {
    let mut results = Vec::with_capacity(paths.len());
    for p in paths {
        results.push((p.as_str(), evaluate_file(Path::new(p))?));
    }

    if json {
        let out: Vec<_> = results
            .iter()
            .map(|(p, r)| serde_json::json!({ "path": p, "evaluation": r }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    for (p, r) in &results {
        println!("{p}");
        println!(
            "  score {:.2}  (completeness {:.2}, format {:.2}, feasibility {:.2})",
            r.score, r.completeness, r.format_validity, r.feasibility
        );
        for s in &r.suggestions {
            println!("  - {s}");
        }
    }
    if results.len() > 1 {
        let evals: Vec<EvaluationResult> = results.into_iter().map(|(_, r)| r).collect();
        if let Some(summary) = EvaluationSummary::from_results(&evals) {
            println!("\n{}", summary.render());
        }
    }
    Ok(())
}
