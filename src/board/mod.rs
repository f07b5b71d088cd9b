// Pipeline board: groups candidates into stage columns and executes stage
// transitions. Grouping and next/previous resolution are pure functions over
// the active stage list; the only mutation point is move_candidate.

pub mod notify;

pub use notify::{ConsoleNotifier, NotificationSink};

use anyhow::Result;
use rusqlite::Connection;

use crate::models::{Candidate, StageDefinition, APPLIED_KEY, REJECTED_KEY};
use crate::repo::CandidateRepo;

/// Candidates currently in `stage_key`.
///
/// The "applied" column is sorted by descending score so the strongest new
/// applicants surface first for triage; ties keep source order. Every other
/// column preserves source order as-is.
pub fn candidates_in_stage<'a>(stage_key: &str, candidates: &'a [Candidate]) -> Vec<&'a Candidate> {
    let mut matched: Vec<&Candidate> = candidates
        .iter()
        .filter(|c| c.stage == stage_key)
        .collect();
    if stage_key == APPLIED_KEY {
        matched.sort_by(|a, b| b.score.cmp(&a.score));
    }
    matched
}

/// The stage a candidate in `current` would advance to, or None.
///
/// Advancing is legal only while at least two stages remain after the target,
/// so the trailing terminal stages ("hired", "rejected") are never reached by
/// a generic advance, only by an explicit terminal action.
pub fn next_stage<'a>(current: &str, stages: &'a [StageDefinition]) -> Option<&'a StageDefinition> {
    let pos = stages.iter().position(|s| s.key == current)?;
    let target = pos + 1;
    if target + 2 < stages.len() {
        Some(&stages[target])
    } else {
        None
    }
}

/// The stage immediately before `current`, or None at the front of the
/// pipeline (and for unknown keys).
pub fn previous_stage<'a>(
    current: &str,
    stages: &'a [StageDefinition],
) -> Option<&'a StageDefinition> {
    let pos = stages.iter().position(|s| s.key == current)?;
    if pos == 0 {
        None
    } else {
        Some(&stages[pos - 1])
    }
}

/// Board service wiring the candidate ledger to a notification sink.
pub struct PipelineBoard<'a, N: NotificationSink> {
    conn: &'a Connection,
    sink: &'a mut N,
}

impl<'a, N: NotificationSink> PipelineBoard<'a, N> {
    pub fn new(conn: &'a Connection, sink: &'a mut N) -> Self {
        PipelineBoard { conn, sink }
    }

    /// Move a candidate to `target` and fire exactly one notification.
    ///
    /// Moving into the rejected stage is framed as an automatic rejection
    /// (an outbound email in the full system); any other move is a neutral
    /// stage-change notice naming the destination label. Moving a candidate
    /// to its current stage is legal and simply re-fires the notification.
    pub fn move_candidate(
        &mut self,
        stages: &[StageDefinition],
        id: i64,
        target: &str,
    ) -> Result<Candidate> {
        let candidate = CandidateRepo::get_by_id(self.conn, id)?
            .ok_or_else(|| anyhow::anyhow!("No candidate found with id={}", id))?;

        CandidateRepo::set_stage(self.conn, id, target)?;

        if target == REJECTED_KEY {
            self.sink.notify(
                "Candidate rejected",
                Some(&format!(
                    "An automatic rejection email was sent to {}.",
                    candidate.name
                )),
            );
        } else {
            let label = stages
                .iter()
                .find(|s| s.key == target)
                .map(|s| s.label.as_str())
                .unwrap_or(target);
            self.sink.notify(
                "Stage updated",
                Some(&format!("{} moved to {}.", candidate.name, label)),
            );
        }

        CandidateRepo::get_by_id(self.conn, id)?
            .ok_or_else(|| anyhow::anyhow!("No candidate found with id={}", id))
    }

    /// Terminal rejection action. Callers gate this behind an explicit user
    /// confirmation; the move itself is just a rejected-stage move.
    pub fn reject_candidate(&mut self, stages: &[StageDefinition], id: i64) -> Result<Candidate> {
        self.move_candidate(stages, id, REJECTED_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::notify::testing::RecordingNotifier;
    use super::*;
    use crate::db::DbConnection;
    use crate::models::{default_stages, HIRED_KEY};

    fn candidate(name: &str, stage: &str, score: i64) -> Candidate {
        let mut c = Candidate::new(name.to_string());
        c.stage = stage.to_string();
        c.score = score;
        c
    }

    #[test]
    fn test_applied_column_sorts_by_score_desc() {
        let candidates = vec![
            candidate("Low", APPLIED_KEY, 60),
            candidate("High", APPLIED_KEY, 95),
            candidate("Mid", APPLIED_KEY, 78),
            candidate("Other", "screening", 99),
        ];
        let column = candidates_in_stage(APPLIED_KEY, &candidates);
        let scores: Vec<i64> = column.iter().map(|c| c.score).collect();
        assert_eq!(scores, vec![95, 78, 60]);
    }

    #[test]
    fn test_applied_sort_is_stable_on_ties() {
        let candidates = vec![
            candidate("First", APPLIED_KEY, 80),
            candidate("Second", APPLIED_KEY, 80),
        ];
        let column = candidates_in_stage(APPLIED_KEY, &candidates);
        let names: Vec<&str> = column.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["First", "Second"]);
    }

    #[test]
    fn test_other_columns_preserve_source_order() {
        let candidates = vec![
            candidate("A", "screening", 10),
            candidate("B", "screening", 99),
            candidate("C", "screening", 50),
        ];
        let column = candidates_in_stage("screening", &candidates);
        let names: Vec<&str> = column.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_next_stage_stops_before_terminals() {
        let stages = default_stages();
        // applied -> screening ... assessment -> offer
        assert_eq!(next_stage(APPLIED_KEY, &stages).unwrap().key, "screening");
        assert_eq!(next_stage("assessment", &stages).unwrap().key, "offer");
        // offer is the last stage reachable by advancing
        assert!(next_stage("offer", &stages).is_none());
        assert!(next_stage(HIRED_KEY, &stages).is_none());
        assert!(next_stage(REJECTED_KEY, &stages).is_none());
        assert!(next_stage("unknown", &stages).is_none());
    }

    #[test]
    fn test_previous_stage() {
        let stages = default_stages();
        assert!(previous_stage(APPLIED_KEY, &stages).is_none());
        assert_eq!(previous_stage("screening", &stages).unwrap().key, APPLIED_KEY);
        assert_eq!(previous_stage(REJECTED_KEY, &stages).unwrap().key, HIRED_KEY);
        assert!(previous_stage("unknown", &stages).is_none());
    }

    #[test]
    fn test_move_candidate_updates_stage_and_notifies() {
        let conn = DbConnection::connect_in_memory().unwrap();
        let stages = default_stages();
        let c = CandidateRepo::create(&conn, "Grace", None, 90, None).unwrap();
        let id = c.id.unwrap();

        let mut sink = RecordingNotifier::default();
        let mut board = PipelineBoard::new(&conn, &mut sink);
        let moved = board.move_candidate(&stages, id, "screening").unwrap();

        assert_eq!(moved.stage, "screening");
        assert_eq!(sink.sent.len(), 1);
        assert_eq!(sink.sent[0].0, "Stage updated");
        assert!(sink.sent[0].1.as_deref().unwrap().contains("Screening"));
    }

    #[test]
    fn test_reject_fires_single_rejection_notification() {
        let conn = DbConnection::connect_in_memory().unwrap();
        let stages = default_stages();
        let c = CandidateRepo::create(&conn, "Grace", None, 90, None).unwrap();
        let id = c.id.unwrap();

        let mut sink = RecordingNotifier::default();
        let mut board = PipelineBoard::new(&conn, &mut sink);
        let rejected = board.reject_candidate(&stages, id).unwrap();

        assert_eq!(rejected.stage, REJECTED_KEY);
        assert_eq!(sink.sent.len(), 1);
        assert_eq!(sink.sent[0].0, "Candidate rejected");
        assert!(sink.sent[0].1.as_deref().unwrap().contains("rejection email"));
    }

    #[test]
    fn test_move_to_current_stage_refires_notification() {
        let conn = DbConnection::connect_in_memory().unwrap();
        let stages = default_stages();
        let c = CandidateRepo::create(&conn, "Grace", None, 90, None).unwrap();
        let id = c.id.unwrap();

        let mut sink = RecordingNotifier::default();
        let mut board = PipelineBoard::new(&conn, &mut sink);
        board.move_candidate(&stages, id, APPLIED_KEY).unwrap();
        board.move_candidate(&stages, id, APPLIED_KEY).unwrap();
        assert_eq!(sink.sent.len(), 2);
    }

    #[test]
    fn test_move_unknown_candidate_fails() {
        let conn = DbConnection::connect_in_memory().unwrap();
        let stages = default_stages();
        let mut sink = RecordingNotifier::default();
        let mut board = PipelineBoard::new(&conn, &mut sink);
        assert!(board.move_candidate(&stages, 42, "screening").is_err());
        assert!(sink.sent.is_empty());
    }

    #[test]
    fn test_move_to_unknown_stage_uses_key_in_notice() {
        // A dangling target is not actively repaired; the notice falls back
        // to the raw key.
        let conn = DbConnection::connect_in_memory().unwrap();
        let stages = default_stages();
        let c = CandidateRepo::create(&conn, "Grace", None, 90, None).unwrap();

        let mut sink = RecordingNotifier::default();
        let mut board = PipelineBoard::new(&conn, &mut sink);
        board
            .move_candidate(&stages, c.id.unwrap(), "ghost-stage")
            .unwrap();
        assert!(sink.sent[0].1.as_deref().unwrap().contains("ghost-stage"));
    }
}
