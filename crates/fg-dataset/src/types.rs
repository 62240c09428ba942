use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Join key
// ---------------------------------------------------------------------------

/// The atomic evaluation unit: one (query, font) pair.
///
/// Unique per evaluation set; the join key across every input artifact
/// (human labels, judge outputs, curated manifests). `Ord` so keyed maps and
/// report lists are stably ordered.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PairKey {
    pub query_id: String,
    pub font_name: String,
}

impl PairKey {
    pub fn new(query_id: impl Into<String>, font_name: impl Into<String>) -> Self {
        PairKey {
            query_id: query_id.into(),
            font_name: font_name.into(),
        }
    }
}

impl std::fmt::Display for PairKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.query_id, self.font_name)
    }
}

// ---------------------------------------------------------------------------
// Human decisions input
// ---------------------------------------------------------------------------

/// One adjudicated human decision, raw 3-valued label included.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HumanDecision {
    pub query_id: String,
    pub font_name: String,
    /// Raw label in {0, 1, 2}; remapped to binary at alignment.
    pub casey_label: u8,
}

/// The human-decisions export: `{"decisions": [...]}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HumanDecisionsFile {
    pub decisions: Vec<HumanDecision>,
}

// ---------------------------------------------------------------------------
// Judge results input
// ---------------------------------------------------------------------------

/// One judge verdict for a pair. Immutable once recorded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JudgeDetail {
    pub query_id: String,
    pub font_name: String,
    /// Binary judge verdict.
    pub ai_match: u8,
    /// Judge confidence in [0, 1]. Ungated judge runs omit it; alignment
    /// substitutes 1.0 so the verdict survives any threshold <= 1.0.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    /// Free-text evidence from the judge, when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidence: Option<String>,
}

/// A judge-results artifact: `{"details": [...]}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JudgeResultsFile {
    pub details: Vec<JudgeDetail>,
}

// ---------------------------------------------------------------------------
// Query metadata
// ---------------------------------------------------------------------------

/// Static per-query metadata; loaded once, read-only during evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryMeta {
    pub id: String,
    pub text: String,
    /// Coarse semantic category, e.g. "visual_shape" or "semantic_mood".
    #[serde(default)]
    pub class: String,
}

/// Calibration group for a query.
///
/// Technical (objective, shape-based) queries and subjective (mood-based)
/// queries calibrate to materially different confidence thresholds, so the
/// engine fits them independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum QueryClass {
    Technical,
    Subjective,
}

impl QueryClass {
    /// Map a raw query-class string through the configured technical list.
    pub fn from_class_str(class: &str, technical_classes: &[String]) -> Self {
        if technical_classes.iter().any(|c| c == class) {
            QueryClass::Technical
        } else {
            QueryClass::Subjective
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QueryClass::Technical => "Technical",
            QueryClass::Subjective => "Subjective",
        }
    }
}

// ---------------------------------------------------------------------------
// Curated manifest (directional / slice trials)
// ---------------------------------------------------------------------------

/// The curated pair list a directional trial is gated on: `{"pairs": [...]}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CuratedManifest {
    pub pairs: Vec<PairKey>,
}
