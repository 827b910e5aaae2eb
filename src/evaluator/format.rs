// src/evaluator/format.rs — Format validity checks

use super::rules::{is_known_category, MAX_STORIES};
use super::utils::SubScore;
use crate::core::types::DesignSpec;

const CHECK: f64 = 25.0;

pub fn score(spec: &DesignSpec) -> SubScore {
    let mut out = SubScore::default();
    let mut earned = 0.0;

    if is_known_category(&spec.category) {
        earned += CHECK;
    } else {
        out.line(format!("Unrecognized category '{}'", spec.category.trim()));
        out.suggest("Use a recognized design category");
    }

    // Story count only exists on buildings; anything else gets half credit.
    match spec.design_type.stories() {
        Some(s) if (1..=MAX_STORIES).contains(&s) => earned += CHECK,
        Some(s) => {
            out.line(format!("Story count {s} is out of range"));
            out.suggest("Specify a realistic number of stories (1-100)");
        }
        None => {
            earned += CHECK / 2.0;
            out.line("Story count not applicable or missing, half credit");
        }
    }

    let present = spec.dimensions.present();
    let bad: Vec<&str> = present
        .iter()
        .filter(|(_, v)| !(v.is_finite() && *v > 0.0))
        .map(|(name, _)| *name)
        .collect();
    if present.is_empty() {
        out.line("No dimensions given");
        out.suggest("Specify dimensions including total area");
    } else if !bad.is_empty() {
        out.line(format!("Non-positive dimensions: {}", bad.join(", ")));
        out.suggest("Use positive values for all dimensions");
    } else {
        earned += CHECK;
    }

    if spec.materials.is_empty() {
        out.line("Materials list is empty");
        out.suggest("Add material specifications");
    } else if spec.materials.iter().any(|m| m.kind.trim().is_empty()) {
        out.line("Some materials have no type");
        out.suggest("Give every material a type");
    } else {
        earned += CHECK;
    }

    out.score = earned;
    out
}
