// src/core/types.rs — Core domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

use crate::provider::TokenUsage;

/// Lower bound on refinement rounds, whatever the caller asks for.
pub const MIN_ITERATIONS: u32 = 2;

/// Design family. Fields that only make sense for one family live on its variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DesignType {
    Building {
        #[serde(default)]
        stories: Option<i32>,
    },
    Vehicle,
    Electronics,
    Appliance,
    Furniture,
    General,
}

impl Default for DesignType {
    fn default() -> Self {
        Self::General
    }
}

impl DesignType {
    /// Map a free-form type name onto a variant. Unknown names become `General`.
    pub fn from_name(name: &str, stories: Option<i32>) -> Self {
        match name.trim().to_lowercase().as_str() {
            "building" | "architecture" => Self::Building { stories },
            "vehicle" | "automotive" => Self::Vehicle,
            "electronics" | "electronic" => Self::Electronics,
            "appliance" | "appliances" => Self::Appliance,
            "furniture" => Self::Furniture,
            _ => Self::General,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Building { .. } => "building",
            Self::Vehicle => "vehicle",
            Self::Electronics => "electronics",
            Self::Appliance => "appliance",
            Self::Furniture => "furniture",
            Self::General => "general",
        }
    }

    pub fn stories(&self) -> Option<i32> {
        match self {
            Self::Building { stories } => *stories,
            _ => None,
        }
    }

    pub fn is_building(&self) -> bool {
        matches!(self, Self::Building { .. })
    }
}

impl std::fmt::Display for DesignType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Material {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub grade: Option<String>,
    #[serde(default)]
    pub properties: BTreeMap<String, serde_json::Value>,
}

impl Material {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            grade: None,
            properties: BTreeMap::new(),
        }
    }

    /// Lowercased type with separators collapsed, e.g. "Carbon-Fiber" -> "carbon fiber".
    pub fn normalized(&self) -> String {
        self.kind
            .to_lowercase()
            .replace(['-', '_'], " ")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    #[serde(default)]
    pub length: Option<f64>,
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default)]
    pub depth: Option<f64>,
    #[serde(default)]
    pub diameter: Option<f64>,
    #[serde(default)]
    pub area: Option<f64>,
    #[serde(default)]
    pub volume: Option<f64>,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default = "default_units")]
    pub units: String,
}

fn default_units() -> String {
    "metric".into()
}

impl Default for Dimensions {
    fn default() -> Self {
        Self {
            length: None,
            width: None,
            height: None,
            depth: None,
            diameter: None,
            area: None,
            volume: None,
            weight: None,
            units: default_units(),
        }
    }
}

impl Dimensions {
    /// Every populated numeric field, in a fixed order.
    pub fn present(&self) -> Vec<(&'static str, f64)> {
        [
            ("length", self.length),
            ("width", self.width),
            ("height", self.height),
            ("depth", self.depth),
            ("diameter", self.diameter),
            ("area", self.area),
            ("volume", self.volume),
            ("weight", self.weight),
        ]
        .into_iter()
        .filter_map(|(name, v)| v.map(|v| (name, v)))
        .collect()
    }

    /// True if any of the linear measurements is a positive number.
    pub fn has_linear(&self) -> bool {
        [self.height, self.width, self.length, self.diameter]
            .iter()
            .any(|v| matches!(v, Some(x) if *x > 0.0))
    }

    pub fn positive_area(&self) -> Option<f64> {
        self.area.filter(|a| *a > 0.0)
    }
}

/// A structured design specification produced by a generator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DesignSpec {
    #[serde(default)]
    pub design_type: DesignType,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub materials: Vec<Material>,
    #[serde(default)]
    pub dimensions: Dimensions,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub requirements: Vec<String>,
    #[serde(default)]
    pub components: Vec<String>,
    #[serde(default)]
    pub constraints: Vec<String>,
}

impl DesignSpec {
    pub fn new(design_type: DesignType, category: impl Into<String>) -> Self {
        Self {
            design_type,
            category: category.into(),
            ..Default::default()
        }
    }

    /// Build a spec from arbitrary JSON, salvaging every field that parses and
    /// defaulting the rest. Also accepts the flat legacy shape
    /// (`building_type` + top-level `stories`, `design_type` as a plain string).
    pub fn from_value(value: &serde_json::Value) -> Self {
        let mut spec = DesignSpec::default();
        let Some(obj) = value.as_object() else {
            return spec;
        };

        let legacy = obj.contains_key("building_type")
            || obj.contains_key("stories")
            || matches!(obj.get("design_type"), Some(serde_json::Value::String(_)));
        if !legacy {
            if let Ok(parsed) = serde_json::from_value::<DesignSpec>(value.clone()) {
                return parsed;
            }
        }

        let flat_stories = obj
            .get("stories")
            .and_then(|v| v.as_i64())
            .and_then(|s| i32::try_from(s).ok());

        spec.design_type = match obj.get("design_type") {
            Some(serde_json::Value::String(name)) => DesignType::from_name(name, flat_stories),
            Some(v) => serde_json::from_value(v.clone()).unwrap_or_default(),
            None if obj.contains_key("building_type") || flat_stories.is_some() => {
                DesignType::Building {
                    stories: flat_stories,
                }
            }
            None => DesignType::General,
        };

        spec.category = obj
            .get("category")
            .or_else(|| obj.get("building_type"))
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();

        spec.materials = obj
            .get("materials")
            .and_then(|v| v.as_array())
            .map(|items| items.iter().filter_map(salvage_material).collect())
            .unwrap_or_default();

        spec.dimensions = obj
            .get("dimensions")
            .map(salvage_dimensions)
            .unwrap_or_default();

        spec.features = string_list(obj.get("features"));
        spec.requirements = string_list(obj.get("requirements"));
        spec.components = string_list(obj.get("components"));
        spec.constraints = string_list(obj.get("constraints"));
        spec
    }
}

fn salvage_material(value: &serde_json::Value) -> Option<Material> {
    match value {
        serde_json::Value::String(s) => Some(Material::new(s.clone())),
        serde_json::Value::Object(_) => {
            serde_json::from_value::<Material>(value.clone())
                .ok()
                .or_else(|| {
                    let kind = value.get("type").and_then(|v| v.as_str()).unwrap_or("");
                    Some(Material::new(kind))
                })
        }
        _ => None,
    }
}

fn salvage_dimensions(value: &serde_json::Value) -> Dimensions {
    let num = |key: &str| value.get(key).and_then(|v| v.as_f64());
    Dimensions {
        length: num("length"),
        width: num("width"),
        height: num("height"),
        depth: num("depth"),
        diameter: num("diameter"),
        area: num("area"),
        volume: num("volume"),
        weight: num("weight"),
        units: value
            .get("units")
            .and_then(|v| v.as_str())
            .map(String::from)
            .unwrap_or_else(default_units),
    }
}

fn string_list(value: Option<&serde_json::Value>) -> Vec<String> {
    value
        .and_then(|v| v.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|i| i.as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default()
}

/// Result of scoring one spec.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub score: f64,
    pub completeness: f64,
    pub format_validity: f64,
    pub feasibility: f64,
    pub suggestions: Vec<String>,
    #[serde(default)]
    pub feedback: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RewardMode {
    #[default]
    Continuous,
    Binary,
}

impl std::fmt::Display for RewardMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RewardMode::Continuous => write!(f, "continuous"),
            RewardMode::Binary => write!(f, "binary"),
        }
    }
}

impl std::str::FromStr for RewardMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "continuous" => Ok(RewardMode::Continuous),
            "binary" => Ok(RewardMode::Binary),
            other => Err(format!("unknown reward mode '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackSource {
    #[default]
    Heuristic,
    Generative,
}

impl std::fmt::Display for FeedbackSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeedbackSource::Heuristic => write!(f, "heuristic"),
            FeedbackSource::Generative => write!(f, "generative"),
        }
    }
}

/// Ranked improvement suggestions handed to the generator for one round.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedbackReport {
    pub suggestions: Vec<String>,
    pub confidence: f64,
    pub source: FeedbackSource,
    #[serde(default)]
    pub usage: TokenUsage,
}

/// Before/after snapshot of one refinement round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IterationRecord {
    pub session_id: String,
    pub iteration_number: u32,
    pub prompt: String,
    pub spec_before: DesignSpec,
    pub spec_after: DesignSpec,
    pub evaluation_before: EvaluationResult,
    pub evaluation_after: EvaluationResult,
    #[serde(default)]
    pub feedback: FeedbackReport,
    pub reward: f64,
    pub improvement: f64,
    pub timestamp: DateTime<Utc>,
}

impl IterationRecord {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        session_id: &str,
        iteration_number: u32,
        prompt: &str,
        spec_before: DesignSpec,
        spec_after: DesignSpec,
        evaluation_before: EvaluationResult,
        evaluation_after: EvaluationResult,
        feedback: FeedbackReport,
        reward: f64,
    ) -> Self {
        let improvement = evaluation_after.score - evaluation_before.score;
        Self {
            session_id: session_id.to_string(),
            iteration_number,
            prompt: prompt.to_string(),
            spec_before,
            spec_after,
            evaluation_before,
            evaluation_after,
            feedback,
            reward,
            improvement,
            timestamp: Utc::now(),
        }
    }

    pub fn score_before(&self) -> f64 {
        self.evaluation_before.score
    }

    pub fn score_after(&self) -> f64 {
        self.evaluation_after.score
    }
}

/// Aggregates reported with every session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LearningInsights {
    pub total_iterations: usize,
    pub average_score: f64,
    pub final_score: f64,
    pub improvement: f64,
}

impl LearningInsights {
    /// With no completed rounds the session stands at its baseline.
    pub fn from_records(baseline_score: f64, records: &[IterationRecord]) -> Self {
        let (Some(first), Some(last)) = (records.first(), records.last()) else {
            return Self {
                total_iterations: 0,
                average_score: baseline_score,
                final_score: baseline_score,
                improvement: 0.0,
            };
        };
        let total: f64 = records.iter().map(|r| r.score_after()).sum();
        Self {
            total_iterations: records.len(),
            average_score: total / records.len() as f64,
            final_score: last.score_after(),
            improvement: last.score_after() - first.score_before(),
        }
    }
}

/// Lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Init,
    Iterating,
    Exhausted,
    Converged,
    Aborted,
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Exhausted | Self::Converged | Self::Aborted)
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SessionState::Init => "init",
            SessionState::Iterating => "iterating",
            SessionState::Exhausted => "exhausted",
            SessionState::Converged => "converged",
            SessionState::Aborted => "aborted",
        };
        write!(f, "{s}")
    }
}

/// Lifecycle events emitted by the orchestrator.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    BaselineReady {
        session_id: String,
        score: f64,
    },
    IterationStart {
        iteration: u32,
        max_iterations: u32,
    },
    FallbackUsed {
        iteration: u32,
        stage: String,
        reason: String,
    },
    IterationEnd {
        iteration: u32,
        score_before: f64,
        score_after: f64,
        reward: f64,
    },
    Aborted {
        completed: usize,
        reason: String,
    },
    Complete {
        iterations: usize,
        final_score: f64,
        improvement: f64,
        state: SessionState,
    },
}

/// Configuration for the iteration engine.
#[derive(Debug, Clone)]
pub struct IterationEngineConfig {
    pub max_iterations: u32,
    pub reward_mode: RewardMode,
    /// Stop after this many consecutive non-improving rounds. Off when `None`.
    pub convergence_patience: Option<u32>,
    pub generator_timeout: Duration,
}

impl IterationEngineConfig {
    /// Rounds actually run for a requested count.
    pub fn effective_iterations(requested: u32) -> u32 {
        requested.max(MIN_ITERATIONS)
    }
}

impl Default for IterationEngineConfig {
    fn default() -> Self {
        Self {
            max_iterations: 3,
            reward_mode: RewardMode::Continuous,
            convergence_patience: None,
            generator_timeout: Duration::from_secs(30),
        }
    }
}

impl From<&crate::infra::config::IterationConfig> for IterationEngineConfig {
    fn from(cfg: &crate::infra::config::IterationConfig) -> Self {
        Self {
            max_iterations: cfg.max_iterations,
            reward_mode: cfg.reward_mode,
            convergence_patience: cfg.convergence_patience,
            generator_timeout: Duration::from_secs(cfg.generator_timeout_seconds),
        }
    }
}
