use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension};
use std::collections::HashMap;

use crate::models::Candidate;

/// Candidate repository for database operations
pub struct CandidateRepo;

impl CandidateRepo {
    /// Create a new candidate
    pub fn create(
        conn: &Connection,
        name: &str,
        email: Option<&str>,
        score: i64,
        notes: Option<&str>,
    ) -> Result<Candidate> {
        let mut candidate = Candidate::new(name.to_string());
        candidate.email = email.map(|e| e.to_string());
        candidate.score = score;
        candidate.notes = notes.map(|n| n.to_string());

        conn.execute(
            "INSERT INTO candidates (uuid, name, email, stage, score, notes, applied_ts, modified_ts)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            rusqlite::params![
                candidate.uuid,
                candidate.name,
                candidate.email,
                candidate.stage,
                candidate.score,
                candidate.notes,
                candidate.applied_ts,
                candidate.modified_ts,
            ],
        )
        .with_context(|| format!("Failed to create candidate: {}", name))?;

        Ok(Candidate {
            id: Some(conn.last_insert_rowid()),
            ..candidate
        })
    }

    /// Get candidate by ID
    pub fn get_by_id(conn: &Connection, id: i64) -> Result<Option<Candidate>> {
        let mut stmt = conn.prepare(
            "SELECT id, uuid, name, email, stage, score, notes, applied_ts, modified_ts
             FROM candidates WHERE id = ?1",
        )?;

        let candidate = stmt
            .query_row([id], row_to_candidate)
            .optional()
            .with_context(|| format!("Failed to load candidate {}", id))?;

        Ok(candidate)
    }

    /// List all candidates in insertion order
    pub fn list_all(conn: &Connection) -> Result<Vec<Candidate>> {
        let mut stmt = conn.prepare(
            "SELECT id, uuid, name, email, stage, score, notes, applied_ts, modified_ts
             FROM candidates ORDER BY id",
        )?;

        let rows = stmt.query_map([], row_to_candidate)?;

        let mut candidates = Vec::new();
        for row in rows {
            candidates.push(row?);
        }
        Ok(candidates)
    }

    /// Update a candidate's pipeline stage. This is the only mutation path
    /// for pipeline state.
    pub fn set_stage(conn: &Connection, id: i64, stage: &str) -> Result<()> {
        let now = chrono::Utc::now().timestamp();
        let updated = conn
            .execute(
                "UPDATE candidates SET stage = ?1, modified_ts = ?2 WHERE id = ?3",
                rusqlite::params![stage, now, id],
            )
            .with_context(|| format!("Failed to update stage for candidate {}", id))?;

        if updated == 0 {
            anyhow::bail!("No candidate found with id={}", id);
        }
        Ok(())
    }

    /// Candidate counts keyed by stage. Stages with no candidates are absent.
    pub fn counts_by_stage(conn: &Connection) -> Result<HashMap<String, i64>> {
        let mut stmt =
            conn.prepare("SELECT stage, COUNT(*) FROM candidates GROUP BY stage")?;

        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;

        let mut counts = HashMap::new();
        for row in rows {
            let (stage, count) = row?;
            counts.insert(stage, count);
        }
        Ok(counts)
    }

    /// Migrate every candidate sitting in one of `removed` stages to
    /// `fallback`. Returns the number of candidates moved. Called after a
    /// destructive stage-configuration save commits.
    pub fn reassign_stages(conn: &Connection, removed: &[String], fallback: &str) -> Result<usize> {
        let now = chrono::Utc::now().timestamp();
        let mut moved = 0;
        for stage in removed {
            moved += conn
                .execute(
                    "UPDATE candidates SET stage = ?1, modified_ts = ?2 WHERE stage = ?3",
                    rusqlite::params![fallback, now, stage],
                )
                .with_context(|| format!("Failed to reassign candidates out of '{}'", stage))?;
        }
        Ok(moved)
    }
}

fn row_to_candidate(row: &rusqlite::Row) -> rusqlite::Result<Candidate> {
    Ok(Candidate {
        id: Some(row.get(0)?),
        uuid: row.get(1)?,
        name: row.get(2)?,
        email: row.get(3)?,
        stage: row.get(4)?,
        score: row.get(5)?,
        notes: row.get(6)?,
        applied_ts: row.get(7)?,
        modified_ts: row.get(8)?,
    })
}
