// src/evaluator/completeness.rs — Structural completeness checks

use super::rules::{rules_for, SizeCheck};
use super::utils::SubScore;
use crate::core::types::DesignSpec;

const MATERIALS: f64 = 25.0;
const FEATURES: f64 = 25.0;
const OVERALL_SIZE: f64 = 15.0;
const TYPE_DIMENSION: f64 = 15.0;
const CATEGORY: f64 = 10.0;
const REQUIREMENTS: f64 = 10.0;

pub fn score(spec: &DesignSpec) -> SubScore {
    let mut out = SubScore::default();
    let mut earned = 0.0;

    if !spec.materials.is_empty() {
        earned += MATERIALS;
    } else {
        out.line("No materials specified");
        out.suggest("Add material specifications");
    }

    if !spec.features.is_empty() {
        earned += FEATURES;
    } else {
        out.line("No design features specified");
        out.suggest("Add design features");
    }

    let dims = &spec.dimensions;
    let has_size = if spec.design_type.is_building() {
        dims.positive_area().is_some()
    } else {
        dims.positive_area().is_some()
            || [dims.volume, dims.weight]
                .iter()
                .any(|v| matches!(v, Some(x) if *x > 0.0))
    };
    if has_size {
        earned += OVERALL_SIZE;
    } else {
        out.line("Overall size (area) missing");
        out.suggest("Specify dimensions including total area");
    }

    match rules_for(&spec.design_type).size_check {
        SizeCheck::Stories => {
            if matches!(spec.design_type.stories(), Some(s) if s > 0) {
                earned += TYPE_DIMENSION;
            } else {
                out.line("Number of stories missing");
                out.suggest("Specify number of stories");
            }
        }
        SizeCheck::Linear => {
            if dims.has_linear() {
                earned += TYPE_DIMENSION;
            } else {
                out.line("No length, width, height or diameter given");
                out.suggest("Specify dimensions (length, width, height)");
            }
        }
    }

    let category = spec.category.trim();
    if !category.is_empty() && !category.eq_ignore_ascii_case("general") {
        earned += CATEGORY;
    } else {
        out.line("Design category is missing or generic");
        out.suggest("Specify a more specific design category");
    }

    if !spec.requirements.is_empty() {
        earned += REQUIREMENTS;
    } else {
        out.line("No requirements listed");
        out.suggest("Add design requirements");
    }

    out.score = earned;
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{DesignType, Dimensions, Material};

    fn full_building() -> DesignSpec {
        DesignSpec {
            design_type: DesignType::Building { stories: Some(4) },
            category: "office".into(),
            materials: vec![Material::new("steel")],
            dimensions: Dimensions {
                area: Some(2000.0),
                ..Default::default()
            },
            features: vec!["elevator".into()],
            requirements: vec!["fire exits".into()],
            ..Default::default()
        }
    }

    #[test]
    fn test_full_spec_scores_100() {
        let s = score(&full_building());
        assert_eq!(s.score, 100.0);
        assert!(s.suggestions.is_empty());
    }

    #[test]
    fn test_empty_spec_scores_zero() {
        let s = score(&DesignSpec::default());
        assert_eq!(s.score, 0.0);
        assert_eq!(s.suggestions.len(), 6);
    }

    #[test]
    fn test_building_without_stories() {
        let mut spec = full_building();
        spec.design_type = DesignType::Building { stories: None };
        let s = score(&spec);
        assert_eq!(s.score, 85.0);
        assert!(s
            .suggestions
            .contains(&"Specify number of stories".to_string()));
    }

    #[test]
    fn test_vehicle_uses_linear_dimension() {
        let spec = DesignSpec {
            design_type: DesignType::Vehicle,
            category: "car".into(),
            materials: vec![Material::new("aluminum")],
            dimensions: Dimensions {
                length: Some(4.5),
                weight: Some(1400.0),
                ..Default::default()
            },
            features: vec!["airbags".into()],
            requirements: vec!["crash rating".into()],
            ..Default::default()
        };
        assert_eq!(score(&spec).score, 100.0);
    }

    #[test]
    fn test_general_category_not_counted() {
        let mut spec = full_building();
        spec.category = "General".into();
        assert_eq!(score(&spec).score, 90.0);
    }
}
