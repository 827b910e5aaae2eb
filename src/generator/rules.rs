// src/generator/rules.rs — Offline keyword generator and deterministic refiner

use async_trait::async_trait;
use tracing::debug;

use super::{Generated, Generator};
use crate::core::types::{DesignSpec, DesignType, Dimensions, Material};
use crate::evaluator::rules::{is_known_category, story_ceiling, MAX_DISTINCT_MATERIALS, MAX_STORIES};
use crate::infra::errors::SpecloopError;

// Checked in order; the first family with a hit wins.
const FAMILY_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "vehicle",
        &["vehicle", "car", "truck", "bicycle", "bike", "drone", "boat", "aircraft", "scooter"],
    ),
    (
        "electronics",
        &["phone", "laptop", "computer", "tablet", "electronic", "gadget", "sensor", "device"],
    ),
    (
        "appliance",
        &["appliance", "fridge", "refrigerator", "oven", "microwave", "washer", "dishwasher", "kettle"],
    ),
    (
        "furniture",
        &["furniture", "chair", "table", "desk", "sofa", "cabinet", "bed", "shelf"],
    ),
    (
        "building",
        &[
            "building", "house", "office", "warehouse", "hospital", "residential", "apartment",
            "tower", "school", "factory", "commercial", "industrial",
        ],
    ),
];

// (family, keyword, category); first hit within the family wins.
const CATEGORY_KEYWORDS: &[(&str, &str, &str)] = &[
    ("building", "office", "office"),
    ("building", "house", "residential"),
    ("building", "apartment", "residential"),
    ("building", "residential", "residential"),
    ("building", "warehouse", "warehouse"),
    ("building", "factory", "industrial"),
    ("building", "industrial", "industrial"),
    ("building", "hospital", "hospital"),
    ("building", "commercial", "commercial"),
    ("vehicle", "truck", "truck"),
    ("vehicle", "drone", "drone"),
    ("vehicle", "bicycle", "bicycle"),
    ("vehicle", "bike", "bicycle"),
    ("vehicle", "boat", "boat"),
    ("vehicle", "aircraft", "aircraft"),
    ("vehicle", "car", "car"),
    ("electronics", "phone", "phone"),
    ("electronics", "laptop", "laptop"),
    ("electronics", "computer", "computer"),
    ("appliance", "kitchen", "kitchen"),
    ("furniture", "table", "table"),
    ("furniture", "chair", "chair"),
    ("furniture", "desk", "desk"),
    ("furniture", "cabinet", "cabinet"),
    ("furniture", "sofa", "sofa"),
];

// "stainless steel" must be tried before "steel".
const MATERIAL_KEYWORDS: &[&str] = &[
    "stainless steel",
    "carbon fiber",
    "steel",
    "concrete",
    "glass",
    "wood",
    "timber",
    "brick",
    "aluminum",
    "plastic",
    "bamboo",
];

const FEATURE_KEYWORDS: &[&str] = &[
    "elevator", "parking", "garden", "balcony", "solar", "security", "gps", "bluetooth",
    "touchscreen", "wireless", "camera", "storage",
];

/// Keyword-driven generator that needs no model. Also provides the
/// deterministic `refine` step used when a mutation call times out.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleGenerator;

impl RuleGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Baseline spec from the prompt alone.
    pub fn draft(&self, prompt: &str, context: Option<&str>) -> Result<DesignSpec, SpecloopError> {
        let text = prompt.trim();
        if text.is_empty() {
            return Err(SpecloopError::Generator("prompt is empty".into()));
        }
        let lower = text.to_lowercase();
        let words = words(&lower);

        let family = FAMILY_KEYWORDS
            .iter()
            .find(|(_, keys)| keys.iter().any(|k| words.iter().any(|w| w == k)))
            .map(|(family, _)| *family)
            .unwrap_or("general");
        let design_type = DesignType::from_name(family, parse_stories(&words));

        let category = CATEGORY_KEYWORDS
            .iter()
            .filter(|(f, _, _)| *f == family)
            .find(|(_, k, _)| words.iter().any(|w| w == k))
            .map(|(_, _, c)| c.to_string())
            .unwrap_or_else(|| family.to_string());

        let mut materials: Vec<Material> = Vec::new();
        for key in MATERIAL_KEYWORDS {
            if lower.contains(key) && !materials.iter().any(|m| m.kind.contains(key)) {
                materials.push(Material::new(*key));
            }
        }

        let features: Vec<String> = FEATURE_KEYWORDS
            .iter()
            .filter(|k| lower.contains(*k))
            .map(|k| k.to_string())
            .collect();

        let mut spec = DesignSpec {
            design_type,
            category,
            materials,
            features,
            requirements: vec![text.to_string()],
            ..Default::default()
        };
        if let Some(ctx) = context.map(str::trim).filter(|c| !c.is_empty()) {
            spec.constraints.push(ctx.to_string());
        }
        Ok(spec)
    }

    /// Apply suggestions to a copy of `spec`. Unknown suggestions are ignored.
    pub fn refine(&self, spec: &DesignSpec, suggestions: &[String]) -> DesignSpec {
        let mut next = spec.clone();
        let mut applied = 0usize;
        for suggestion in suggestions {
            if apply(&mut next, &suggestion.to_lowercase()) {
                applied += 1;
            }
        }
        debug!(applied, total = suggestions.len(), "refined spec");
        next
    }
}

#[async_trait]
impl Generator for RuleGenerator {
    fn name(&self) -> &str {
        "rules"
    }

    async fn generate(&self, prompt: &str, context: Option<&str>) -> Result<Generated, SpecloopError> {
        self.draft(prompt, context).map(Generated::offline)
    }

    async fn mutate(
        &self,
        spec: &DesignSpec,
        suggestions: &[String],
        _prompt: &str,
    ) -> Result<Generated, SpecloopError> {
        Ok(Generated::offline(self.refine(spec, suggestions)))
    }
}

fn words(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(String::from)
        .collect()
}

/// "12 story", "3-floor", "5 levels".
fn parse_stories(words: &[String]) -> Option<i32> {
    words.windows(2).find_map(|pair| {
        let n: i32 = pair[0].parse().ok()?;
        let unit = &pair[1];
        (unit.starts_with("stor") || unit.starts_with("floor") || unit.starts_with("level"))
            .then_some(n)
    })
}

fn default_materials(design_type: &DesignType) -> &'static [&'static str] {
    match design_type {
        DesignType::Building { .. } => &["steel", "concrete"],
        DesignType::Vehicle => &["aluminum"],
        DesignType::Electronics => &["aluminum", "glass"],
        DesignType::Appliance => &["stainless steel"],
        DesignType::Furniture => &["wood"],
        DesignType::General => &["steel"],
    }
}

fn default_features(spec: &DesignSpec) -> &'static [&'static str] {
    match &spec.design_type {
        DesignType::Building { .. } => match spec.category.to_lowercase().as_str() {
            "office" => &["elevator", "parking", "conference_room"],
            "residential" => &["balcony", "parking", "garden"],
            _ => &["parking", "security"],
        },
        DesignType::Vehicle => &["gps", "bluetooth", "safety_features"],
        DesignType::Electronics => &["touchscreen", "wireless", "fast_charging"],
        DesignType::Appliance => &["energy_saving", "timer", "child_lock"],
        DesignType::Furniture => &["ergonomic", "modular", "storage"],
        DesignType::General => &["smart", "efficient", "durable"],
    }
}

/// Typical size for the family. Non-buildings get a weight instead of an
/// area so small objects are not judged by floor area.
fn default_dimensions(design_type: &DesignType) -> Dimensions {
    let (length, width, height, area, weight) = match design_type {
        DesignType::Building { stories } => {
            let h = stories.filter(|s| *s > 0).unwrap_or(1) as f64 * 3.5;
            (25.0, 20.0, h, Some(500.0), None)
        }
        DesignType::Vehicle => (4.5, 1.8, 1.5, None, Some(1400.0)),
        DesignType::Electronics => (0.15, 0.07, 0.01, None, Some(0.2)),
        DesignType::Appliance => (0.9, 0.7, 1.8, None, Some(80.0)),
        DesignType::Furniture => (1.2, 0.6, 0.75, None, Some(25.0)),
        DesignType::General => (1.0, 1.0, 1.0, None, Some(10.0)),
    };
    Dimensions {
        length: Some(length),
        width: Some(width),
        height: Some(height),
        area,
        weight,
        ..Default::default()
    }
}

fn default_category(design_type: &DesignType) -> &'static str {
    match design_type {
        DesignType::Building { .. } => "commercial",
        other => other.name(),
    }
}

fn add_feature(spec: &mut DesignSpec, feature: &str) -> bool {
    if spec.features.iter().any(|f| f.eq_ignore_ascii_case(feature)) {
        return false;
    }
    spec.features.push(feature.to_string());
    true
}

fn add_material(spec: &mut DesignSpec, kind: &str) -> bool {
    if spec.materials.iter().any(|m| m.normalized() == kind) {
        return false;
    }
    spec.materials.push(Material::new(kind));
    true
}

fn replace_wood(spec: &mut DesignSpec, with: &str) -> bool {
    let before = spec.materials.len();
    spec.materials
        .retain(|m| !matches!(m.normalized().as_str(), "wood" | "timber"));
    let removed = spec.materials.len() != before;
    if removed {
        add_material(spec, with);
    }
    removed
}

fn set_stories(spec: &mut DesignSpec, stories: i32) -> bool {
    if let DesignType::Building { stories: s } = &mut spec.design_type {
        if *s != Some(stories) {
            *s = Some(stories);
            return true;
        }
    }
    false
}

fn fill_dimensions(spec: &mut DesignSpec) -> bool {
    let defaults = default_dimensions(&spec.design_type);
    let d = &mut spec.dimensions;
    let mut changed = false;
    for (slot, default) in [
        (&mut d.length, defaults.length),
        (&mut d.width, defaults.width),
        (&mut d.height, defaults.height),
        (&mut d.area, defaults.area),
        (&mut d.weight, defaults.weight),
    ] {
        let usable = matches!(*slot, Some(v) if v.is_finite() && v > 0.0);
        if !usable && default.is_some() {
            *slot = default;
            changed = true;
        }
    }
    // Drop leftovers that would still fail the positivity check.
    for slot in [&mut d.depth, &mut d.diameter, &mut d.volume, &mut d.area, &mut d.weight] {
        if matches!(*slot, Some(v) if !(v.is_finite() && v > 0.0)) {
            *slot = None;
            changed = true;
        }
    }
    changed
}

fn apply(spec: &mut DesignSpec, s: &str) -> bool {
    if s.contains("replace wood") {
        return replace_wood(spec, "steel");
    }
    if s.contains("aluminum or carbon fiber") {
        return replace_wood(spec, "aluminum");
    }
    if s.contains("consolidate") {
        let mut seen: Vec<String> = Vec::new();
        spec.materials.retain(|m| {
            let key = m.normalized();
            if seen.contains(&key) {
                false
            } else {
                seen.push(key);
                true
            }
        });
        spec.materials.truncate(MAX_DISTINCT_MATERIALS);
        return true;
    }
    if s.contains("eco-friendly") {
        return add_material(spec, "bamboo");
    }
    if s.contains("solar") {
        return add_feature(spec, "solar_panels");
    }
    if s.contains("elevator") {
        return add_feature(spec, "elevator");
    }
    if s.contains("parking") {
        return add_feature(spec, "parking");
    }
    if s.contains("material") {
        let mut changed = false;
        for m in spec.materials.iter_mut().filter(|m| m.kind.trim().is_empty()) {
            m.kind = default_materials(&DesignType::General)[0].to_string();
            changed = true;
        }
        if spec.materials.is_empty() {
            for kind in default_materials(&spec.design_type) {
                changed |= add_material(spec, kind);
            }
        }
        return changed;
    }
    if s.contains("stories") {
        let current = spec.design_type.stories();
        let target = if s.contains("reduc") {
            let ceiling = story_ceiling(&spec.category).unwrap_or(MAX_STORIES);
            current.map(|c| c.min(ceiling)).unwrap_or(3)
        } else {
            current.filter(|c| (1..=MAX_STORIES).contains(c)).unwrap_or(3)
        };
        return set_stories(spec, target);
    }
    if s.contains("reducing size") {
        spec.dimensions.area = Some(50_000.0);
        return true;
    }
    if s.contains("increas") && s.contains("area") {
        let area = spec.dimensions.area.unwrap_or(0.0).max(500.0);
        spec.dimensions.area = Some(area);
        return true;
    }
    if s.contains("dimension") || s.contains("area") || s.contains("size") {
        return fill_dimensions(spec);
    }
    if s.contains("feature") {
        if spec.features.len() >= 3 {
            return false;
        }
        let mut changed = false;
        for f in default_features(spec) {
            changed |= add_feature(spec, f);
        }
        return changed;
    }
    if s.contains("requirement") {
        spec.requirements
            .push("Comply with applicable safety and building codes".into());
        return true;
    }
    if s.contains("category") {
        let cat = spec.category.trim().to_lowercase();
        if cat.is_empty() || cat == "general" || !is_known_category(&cat) {
            spec.category = default_category(&spec.design_type).to_string();
            return true;
        }
    }
    false
}
