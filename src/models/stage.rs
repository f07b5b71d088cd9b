use serde::{Deserialize, Serialize};

/// Canonical start stage: every new candidate lands here, and candidates
/// orphaned by a stage removal are migrated back here.
pub const APPLIED_KEY: &str = "applied";
/// Terminal stage for successful candidates.
pub const HIRED_KEY: &str = "hired";
/// Terminal stage for rejected candidates.
pub const REJECTED_KEY: &str = "rejected";

/// The three reserved stage keys. Fixed stages can never be removed;
/// `applied` is always first, `hired` and `rejected` always last, in that
/// order.
pub const FIXED_STAGE_KEYS: &[&str] = &[APPLIED_KEY, HIRED_KEY, REJECTED_KEY];

/// Trailing fixed stages, in their required relative order.
pub const END_STAGE_KEYS: &[&str] = &[HIRED_KEY, REJECTED_KEY];

/// Fixed color palette for stage headers. New stages take the first token not
/// already in use; when every token is in use the first token is reused.
/// Names match the ANSI color names understood by the output module.
pub const STAGE_COLOR_PALETTE: &[&str] = &[
    "blue",
    "cyan",
    "magenta",
    "yellow",
    "green",
    "bright_blue",
    "bright_cyan",
    "bright_magenta",
];

/// One entry in the pipeline stage configuration.
///
/// `key` is assigned once at creation (derived from the label at that moment)
/// and is never recomputed, so relabeling a stage does not move the candidates
/// referencing it. Code must never assume `key == derive_key(label)` for an
/// existing stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageDefinition {
    pub key: String,
    pub label: String,
    pub color: String,
}

impl StageDefinition {
    pub fn new(key: impl Into<String>, label: impl Into<String>, color: impl Into<String>) -> Self {
        StageDefinition {
            key: key.into(),
            label: label.into(),
            color: color.into(),
        }
    }

    /// Whether this is one of the three reserved stages.
    pub fn is_fixed(&self) -> bool {
        FIXED_STAGE_KEYS.contains(&self.key.as_str())
    }
}

/// Derive a stage key from a display label: lowercase, whitespace to hyphens,
/// strip anything outside `[a-z0-9-]`. Pure; used only at stage creation.
pub fn derive_key(label: &str) -> String {
    label
        .trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-')
        .collect()
}

/// First palette color not used by any of `existing`; first palette color when
/// the palette is exhausted (a collision is accepted, not an error).
pub fn next_available_color(existing: &[StageDefinition]) -> &'static str {
    STAGE_COLOR_PALETTE
        .iter()
        .find(|color| !existing.iter().any(|s| s.color == **color))
        .copied()
        .unwrap_or(STAGE_COLOR_PALETTE[0])
}

/// The canonical default stage sequence, used whenever no valid stored
/// configuration exists.
pub fn default_stages() -> Vec<StageDefinition> {
    vec![
        StageDefinition::new(APPLIED_KEY, "Applied", "blue"),
        StageDefinition::new("screening", "Screening", "cyan"),
        StageDefinition::new("phone-interview", "Phone Interview", "magenta"),
        StageDefinition::new("interview", "Interview", "yellow"),
        StageDefinition::new("assessment", "Assessment", "bright_blue"),
        StageDefinition::new("offer", "Offer", "bright_magenta"),
        StageDefinition::new(HIRED_KEY, "Hired", "green"),
        StageDefinition::new(REJECTED_KEY, "Rejected", "red"),
    ]
}

/// Static reference stage list used by the `status` dashboard.
///
/// This is intentionally a separate data source from the editable registry:
/// the dashboard buckets use the historical fixed naming (note "selected",
/// which the editable defaults call "screening"). The two sets feed different
/// views and are not unified.
pub const REFERENCE_STAGES: &[(&str, &str)] = &[
    ("applied", "Applied"),
    ("under-review", "Under Review"),
    ("contacted", "Contacted"),
    ("selected", "Selected"),
    ("interview", "Interview"),
    ("offer", "Offer"),
    ("hired", "Hired"),
    ("rejected", "Rejected"),
];
