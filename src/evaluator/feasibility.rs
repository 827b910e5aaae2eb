// src/evaluator/feasibility.rs — Design-type feasibility rules
//
// Starts from a neutral base and applies each rule at most once. Every rule
// that fires leaves an explanatory line.

use std::collections::BTreeSet;

use super::rules::{rules_for, story_ceiling, MAX_AREA, MAX_DISTINCT_MATERIALS, MIN_AREA};
use super::utils::{clamp_score, SubScore};
use crate::core::types::DesignSpec;

const BASE: f64 = 70.0;

pub fn score(spec: &DesignSpec) -> SubScore {
    let mut out = SubScore::default();
    let mut total = BASE;

    match spec.dimensions.positive_area() {
        Some(area) if (MIN_AREA..=MAX_AREA).contains(&area) => {
            total += 10.0;
            out.line(format!("Area {area} is within a practical range"));
        }
        Some(area) => {
            total -= 25.0;
            out.line(format!(
                "Area {area} is outside the practical range [{MIN_AREA}, {MAX_AREA}]"
            ));
            if area > MAX_AREA {
                out.suggest("Consider reducing size for feasibility");
            } else {
                out.suggest("Increase the area to a practical size");
            }
        }
        None => out.line("Area not given, size feasibility unchecked"),
    }

    let stories = spec.design_type.stories().filter(|s| *s > 0);
    if spec.design_type.is_building() {
        match (stories, story_ceiling(&spec.category)) {
            (Some(s), Some(ceiling)) if s <= ceiling => {
                total += 10.0;
                out.line(format!(
                    "{s} stories is feasible for {} buildings",
                    spec.category
                ));
            }
            (Some(s), Some(ceiling)) => {
                total -= 30.0;
                out.line(format!(
                    "{s} stories exceeds the {ceiling}-story ceiling for {} buildings",
                    spec.category
                ));
                out.suggest("Consider reducing number of stories");
            }
            (Some(_), None) => {
                total += 5.0;
                out.line("No story ceiling for this category, partial credit");
            }
            (None, _) => out.line("Story count not given"),
        }
    } else {
        total += 5.0;
        out.line(format!(
            "Story limits do not apply to {} designs, partial credit",
            spec.design_type
        ));
    }

    let materials: Vec<String> = spec.materials.iter().map(|m| m.normalized()).collect();
    let rules = rules_for(&spec.design_type);

    if let Some(rule) = &rules.unsuitable {
        let applies = match rule.above_stories {
            Some(limit) => matches!(stories, Some(s) if s > limit),
            None => true,
        };
        if applies && rule.matches(&materials) {
            total += rule.delta;
            out.line(rule.line);
            if let Some(s) = rule.suggestion {
                out.suggest(s);
            }
        }
    }

    if let Some(rule) = &rules.favorable {
        if rule.matches(&materials) {
            total += rule.delta;
            out.line(rule.line);
        }
    }

    let distinct: BTreeSet<&str> = materials
        .iter()
        .map(String::as_str)
        .filter(|m| !m.is_empty())
        .collect();
    if distinct.len() > MAX_DISTINCT_MATERIALS {
        total -= 10.0;
        out.line(format!("{} distinct materials adds complexity", distinct.len()));
        out.suggest("Consolidate materials");
    }

    out.score = clamp_score(total);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{DesignType, Dimensions, Material};

    fn building(stories: i32, category: &str, area: f64, materials: &[&str]) -> DesignSpec {
        DesignSpec {
            design_type: DesignType::Building {
                stories: Some(stories),
            },
            category: category.into(),
            materials: materials.iter().map(|m| Material::new(*m)).collect(),
            dimensions: Dimensions {
                area: Some(area),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_good_office() {
        let s = score(&building(10, "office", 5000.0, &["steel", "glass"]));
        assert_eq!(s.score, 100.0);
        assert!(s.suggestions.is_empty());
    }

    #[test]
    fn test_oversized_area() {
        let s = score(&building(2, "office", 250_000.0, &["concrete"]));
        assert_eq!(s.score, 65.0);
        assert_eq!(s.suggestions, vec!["Consider reducing size for feasibility"]);
    }

    #[test]
    fn test_warehouse_story_ceiling() {
        let s = score(&building(12, "warehouse", 800.0, &["concrete"]));
        assert_eq!(s.score, 60.0);
        assert!(s
            .suggestions
            .contains(&"Consider reducing number of stories".to_string()));
    }

    #[test]
    fn test_wood_tall_building_penalized() {
        let s = score(&building(8, "residential", 900.0, &["Wood"]));
        assert_eq!(s.score, 65.0);
        assert_eq!(
            s.suggestions,
            vec!["Replace wood with steel or concrete for taller buildings"]
        );
    }

    #[test]
    fn test_wood_low_building_ok() {
        let s = score(&building(2, "residential", 200.0, &["wood"]));
        assert_eq!(s.score, 90.0);
    }

    #[test]
    fn test_vehicle_materials() {
        let wood = DesignSpec {
            design_type: DesignType::Vehicle,
            materials: vec![Material::new("wood")],
            ..Default::default()
        };
        assert_eq!(score(&wood).score, 55.0);

        let carbon = DesignSpec {
            design_type: DesignType::Vehicle,
            materials: vec![Material::new("Carbon-Fiber")],
            ..Default::default()
        };
        assert_eq!(score(&carbon).score, 85.0);
    }

    #[test]
    fn test_appliance_stainless() {
        let spec = DesignSpec {
            design_type: DesignType::Appliance,
            materials: vec![Material::new("stainless steel")],
            ..Default::default()
        };
        assert_eq!(score(&spec).score, 85.0);
    }

    #[test]
    fn test_too_many_materials() {
        let s = score(&building(
            3,
            "commercial",
            1000.0,
            &["steel", "glass", "brick", "stone", "copper", "vinyl"],
        ));
        assert_eq!(s.score, 90.0);
        assert!(s.suggestions.contains(&"Consolidate materials".to_string()));
    }

    #[test]
    fn test_clamped_at_zero() {
        let s = score(&building(300, "warehouse", 1.0, &["wood"]));
        assert!(s.score >= 0.0);
    }
}
