use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::stage::APPLIED_KEY;

/// Candidate model
///
/// `stage` holds a stage key from the active pipeline configuration. The
/// board never mutates a candidate except through its `stage` field; profile
/// data belongs to whoever sourced the application.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    pub id: Option<i64>,
    pub uuid: String,
    pub name: String,
    pub email: Option<String>,
    pub stage: String,
    /// Screening score, 0-100. Only the "applied" column sorts by it.
    pub score: i64,
    pub notes: Option<String>,
    pub applied_ts: i64,
    pub modified_ts: i64,
}

impl Candidate {
    /// Create a new candidate in the start stage.
    pub fn new(name: String) -> Self {
        let now = chrono::Utc::now().timestamp();
        Candidate {
            id: None,
            uuid: Uuid::new_v4().to_string(),
            name,
            email: None,
            stage: APPLIED_KEY.to_string(),
            score: 0,
            notes: None,
            applied_ts: now,
            modified_ts: now,
        }
    }
}
