// src/evaluator/rules.rs — Per-design-type rule table

use crate::core::types::DesignType;

/// Categories accepted by the format check.
pub const KNOWN_CATEGORIES: &[&str] = &[
    "residential",
    "commercial",
    "office",
    "warehouse",
    "industrial",
    "hospital",
    "general",
    "building",
    "vehicle",
    "electronics",
    "appliance",
    "furniture",
    "drone",
    "car",
    "truck",
    "bicycle",
    "boat",
    "aircraft",
    "phone",
    "laptop",
    "computer",
    "kitchen",
    "medical",
    "table",
    "chair",
    "desk",
    "cabinet",
    "sofa",
];

pub const MIN_AREA: f64 = 10.0;
pub const MAX_AREA: f64 = 100_000.0;
pub const MAX_STORIES: i32 = 100;
pub const MAX_DISTINCT_MATERIALS: usize = 5;

/// Which dimension the completeness check looks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeCheck {
    /// Story count on the building variant.
    Stories,
    /// Any of height/width/length/diameter.
    Linear,
}

/// A material preference that moves the feasibility score.
#[derive(Debug)]
pub struct MaterialRule {
    pub keywords: &'static [&'static str],
    pub delta: f64,
    pub line: &'static str,
    pub suggestion: Option<&'static str>,
    /// Only applies when the building has more stories than this.
    pub above_stories: Option<i32>,
}

#[derive(Debug)]
pub struct TypeRules {
    pub size_check: SizeCheck,
    pub favorable: Option<MaterialRule>,
    pub unsuitable: Option<MaterialRule>,
}

static BUILDING: TypeRules = TypeRules {
    size_check: SizeCheck::Stories,
    favorable: Some(MaterialRule {
        keywords: &["steel", "concrete"],
        delta: 10.0,
        line: "Steel or concrete suits building structures",
        suggestion: None,
        above_stories: None,
    }),
    unsuitable: Some(MaterialRule {
        keywords: &["wood", "timber"],
        delta: -25.0,
        line: "Wood is not feasible above 5 stories",
        suggestion: Some("Replace wood with steel or concrete for taller buildings"),
        above_stories: Some(5),
    }),
};

static VEHICLE: TypeRules = TypeRules {
    size_check: SizeCheck::Linear,
    favorable: Some(MaterialRule {
        keywords: &["carbon fiber", "carbon fibre", "aluminum", "aluminium"],
        delta: 10.0,
        line: "Lightweight structural materials suit vehicles",
        suggestion: None,
        above_stories: None,
    }),
    unsuitable: Some(MaterialRule {
        keywords: &["wood", "timber"],
        delta: -20.0,
        line: "Wood is not a feasible vehicle structure",
        suggestion: Some("Use aluminum or carbon fiber for vehicle structure"),
        above_stories: None,
    }),
};

static APPLIANCE: TypeRules = TypeRules {
    size_check: SizeCheck::Linear,
    favorable: Some(MaterialRule {
        keywords: &["stainless steel"],
        delta: 10.0,
        line: "Stainless steel suits appliances",
        suggestion: None,
        above_stories: None,
    }),
    unsuitable: None,
};

static FURNITURE: TypeRules = TypeRules {
    size_check: SizeCheck::Linear,
    favorable: Some(MaterialRule {
        keywords: &["wood", "timber", "oak", "walnut"],
        delta: 10.0,
        line: "Wood is a proven furniture material",
        suggestion: None,
        above_stories: None,
    }),
    unsuitable: None,
};

static PLAIN: TypeRules = TypeRules {
    size_check: SizeCheck::Linear,
    favorable: None,
    unsuitable: None,
};

pub fn rules_for(design_type: &DesignType) -> &'static TypeRules {
    match design_type {
        DesignType::Building { .. } => &BUILDING,
        DesignType::Vehicle => &VEHICLE,
        DesignType::Appliance => &APPLIANCE,
        DesignType::Furniture => &FURNITURE,
        DesignType::Electronics | DesignType::General => &PLAIN,
    }
}

/// Highest sensible story count for a building category. `None` means the
/// category has no ceiling and only earns partial credit.
pub fn story_ceiling(category: &str) -> Option<i32> {
    match category.trim().to_lowercase().as_str() {
        "residential" => Some(50),
        "commercial" | "office" => Some(200),
        "warehouse" | "industrial" => Some(10),
        _ => None,
    }
}

pub fn is_known_category(category: &str) -> bool {
    let c = category.trim().to_lowercase();
    KNOWN_CATEGORIES.contains(&c.as_str())
}

impl MaterialRule {
    /// True if any normalized material name contains one of the keywords.
    pub fn matches(&self, materials: &[String]) -> bool {
        materials
            .iter()
            .any(|m| self.keywords.iter().any(|k| m.contains(k)))
    }
}
