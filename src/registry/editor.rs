// Stage configuration editor: a draft copy of the registry snapshot plus the
// validation and reconciliation rules that keep committed configurations
// structurally sound.
//
// Edit session flow: open a draft, mutate it (add/remove/move), then save.
// A save that would orphan candidates (removes a stage that still has
// candidates in it) is held back until the caller confirms it; everything
// else commits immediately. Discarding the editor at any point leaves the
// registry untouched.

use std::collections::HashMap;

use thiserror::Error;

use crate::models::{derive_key, next_available_color, StageDefinition, END_STAGE_KEYS};
use crate::registry::{ConfigStore, StageRegistry};

/// Rejected draft edits. The draft is never mutated when one of these is
/// returned; the CLI decides which of them deserve user-visible feedback.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StageEditError {
    #[error("Stage label cannot be empty")]
    EmptyLabel,
    #[error("A stage named '{0}' already exists")]
    DuplicateName(String),
    #[error("Stage '{0}' is fixed and cannot be removed or reordered")]
    FixedStage(String),
    #[error("No stage with key '{0}'")]
    UnknownStage(String),
    #[error("Move would place the stage outside the editable range")]
    OutOfRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    Up,
    Down,
}

/// Result of a save request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The draft was committed to the registry. `removed` lists stage keys
    /// dropped by this save; the caller must migrate any candidates still
    /// referencing them to the start stage.
    Committed { removed: Vec<String> },
    /// The draft removes stages that still hold candidates. Nothing was
    /// committed; call `confirm_save` to proceed or `cancel_confirmation`
    /// to keep editing.
    NeedsConfirmation { removed: Vec<String>, affected: i64 },
}

struct PendingSave {
    stages: Vec<StageDefinition>,
    removed: Vec<String>,
}

/// One edit session over the stage registry.
pub struct StageEditor {
    draft: Vec<StageDefinition>,
    pending: Option<PendingSave>,
}

impl StageEditor {
    /// Open an editor whose draft is a copy of the current snapshot.
    pub fn open<S: ConfigStore>(registry: &StageRegistry<S>) -> Self {
        StageEditor {
            draft: registry.stages().to_vec(),
            pending: None,
        }
    }

    /// Open an editor over an explicit draft (used by `stages reset`).
    pub fn with_draft(draft: Vec<StageDefinition>) -> Self {
        StageEditor {
            draft,
            pending: None,
        }
    }

    pub fn draft(&self) -> &[StageDefinition] {
        &self.draft
    }

    /// Add a new stage. The key is derived from the label once, here; the
    /// color is the first palette entry not in use by the draft. New stages
    /// are inserted immediately before the first fixed end stage, so they
    /// always land between the last custom stage and "hired".
    pub fn add_stage(&mut self, label: &str) -> Result<(), StageEditError> {
        let label = label.trim();
        if label.is_empty() {
            return Err(StageEditError::EmptyLabel);
        }

        let key = derive_key(label);
        if self.draft.iter().any(|s| s.key == key) {
            return Err(StageEditError::DuplicateName(label.to_string()));
        }

        let color = next_available_color(&self.draft);
        let stage = StageDefinition::new(key, label, color);

        let insert_at = self
            .draft
            .iter()
            .position(|s| END_STAGE_KEYS.contains(&s.key.as_str()))
            .unwrap_or(self.draft.len());
        self.draft.insert(insert_at, stage);
        Ok(())
    }

    /// Remove a stage from the draft. Fixed stages are refused here even
    /// though callers are expected to guard them too.
    pub fn remove_stage(&mut self, key: &str) -> Result<(), StageEditError> {
        let index = self
            .draft
            .iter()
            .position(|s| s.key == key)
            .ok_or_else(|| StageEditError::UnknownStage(key.to_string()))?;

        if self.draft[index].is_fixed() {
            return Err(StageEditError::FixedStage(key.to_string()));
        }

        self.draft.remove(index);
        Ok(())
    }

    /// Swap the stage at `index` with its neighbor. Both ends of the swap
    /// must stay strictly between the leading fixed stage and the two
    /// trailing fixed stages.
    pub fn move_stage(&mut self, index: usize, direction: MoveDirection) -> Result<(), StageEditError> {
        if index >= self.draft.len() {
            return Err(StageEditError::OutOfRange);
        }
        if self.draft[index].is_fixed() {
            return Err(StageEditError::FixedStage(self.draft[index].key.clone()));
        }

        let target = match direction {
            MoveDirection::Up => index.checked_sub(1).ok_or(StageEditError::OutOfRange)?,
            MoveDirection::Down => index + 1,
        };

        // Editable band: after "applied", before "hired"/"rejected"
        let upper = self.draft.len().saturating_sub(3);
        if index < 1 || index > upper || target < 1 || target > upper {
            return Err(StageEditError::OutOfRange);
        }

        self.draft.swap(index, target);
        Ok(())
    }

    /// Request a commit of the draft. Destructive saves (removed stages with
    /// candidates still in them) are withheld pending confirmation.
    pub fn save<S: ConfigStore>(
        &mut self,
        registry: &mut StageRegistry<S>,
        counts_by_stage: &HashMap<String, i64>,
    ) -> SaveOutcome {
        let removed = removal_set(registry.stages(), &self.draft);
        let affected = affected_count(&removed, counts_by_stage);

        if affected == 0 {
            registry.set_stages(self.draft.clone());
            SaveOutcome::Committed { removed }
        } else {
            self.pending = Some(PendingSave {
                stages: self.draft.clone(),
                removed: removed.clone(),
            });
            SaveOutcome::NeedsConfirmation { removed, affected }
        }
    }

    /// Commit a save previously held back by `save`. Returns the removal set
    /// the caller must migrate, or None when no save is pending.
    pub fn confirm_save<S: ConfigStore>(
        &mut self,
        registry: &mut StageRegistry<S>,
    ) -> Option<Vec<String>> {
        let pending = self.pending.take()?;
        registry.set_stages(pending.stages);
        Some(pending.removed)
    }

    /// Drop a pending destructive save and return to editing. The draft is
    /// preserved; the registry was never touched.
    pub fn cancel_confirmation(&mut self) {
        self.pending = None;
    }
}

/// Keys present in `current` but absent from `draft`. Pure and
/// order-independent; the result follows `current` order for stable display.
pub fn removal_set(current: &[StageDefinition], draft: &[StageDefinition]) -> Vec<String> {
    current
        .iter()
        .filter(|s| !draft.iter().any(|d| d.key == s.key))
        .map(|s| s.key.clone())
        .collect()
}

/// Total candidates sitting in any of the removed stages. Stages without an
/// entry in `counts` contribute 0.
pub fn affected_count(removed: &[String], counts: &HashMap<String, i64>) -> i64 {
    removed
        .iter()
        .map(|key| counts.get(key).copied().unwrap_or(0))
        .sum()
}
