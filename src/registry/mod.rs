// Pipeline stage registry: the single source of truth for the ordered stage
// list, with best-effort persistence and synchronous change notification.
//
// The registry is a dumb store by design: it performs no validation on
// set_stages. Structural rules (fixed stages, unique keys, movable range)
// live in the editor, which is the only writer in practice.

pub mod editor;
pub mod store;

pub use editor::{MoveDirection, SaveOutcome, StageEditError, StageEditor};
pub use store::{ConfigStore, SqliteConfigStore, STAGE_CONFIG_KEY};

use crate::models::{default_stages, StageDefinition};

/// Handle returned by `subscribe`, used to remove the listener again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerId(u64);

/// Owned service instance holding the active stage configuration.
///
/// Hosts construct one per process (or per test) and pass it down; there is
/// no global registry.
pub struct StageRegistry<S: ConfigStore> {
    stages: Vec<StageDefinition>,
    store: S,
    listeners: Vec<(ListenerId, Box<dyn FnMut()>)>,
    next_listener: u64,
}

impl<S: ConfigStore> StageRegistry<S> {
    /// Load the registry from the store. Never fails: a missing, unparseable,
    /// non-array, or empty stored value falls back to the canonical defaults.
    pub fn load(store: S) -> Self {
        let stages = match store.get(STAGE_CONFIG_KEY) {
            Ok(Some(raw)) => parse_snapshot(&raw).unwrap_or_else(|| {
                log::warn!("Stored stage config is invalid, using defaults");
                default_stages()
            }),
            Ok(None) => default_stages(),
            Err(e) => {
                log::warn!("Failed to read stage config ({}), using defaults", e);
                default_stages()
            }
        };

        StageRegistry {
            stages,
            store,
            listeners: Vec::new(),
            next_listener: 0,
        }
    }

    /// The current snapshot, in pipeline order.
    pub fn stages(&self) -> &[StageDefinition] {
        &self.stages
    }

    /// Display label for a stage key, if the key is part of the current
    /// snapshot.
    pub fn label_for(&self, key: &str) -> Option<&str> {
        self.stages
            .iter()
            .find(|s| s.key == key)
            .map(|s| s.label.as_str())
    }

    /// Replace the snapshot atomically, persist it best-effort, and notify
    /// subscribers synchronously in registration order.
    ///
    /// A failed write leaves the in-memory snapshot updated; the fault is
    /// logged and otherwise swallowed.
    pub fn set_stages(&mut self, stages: Vec<StageDefinition>) {
        self.stages = stages;
        self.persist_best_effort();
        for (_, listener) in self.listeners.iter_mut() {
            listener();
        }
    }

    /// Register a change listener. Listeners fire on every `set_stages`, in
    /// registration order, after the snapshot has been replaced.
    pub fn subscribe(&mut self, listener: impl FnMut() + 'static) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Unknown ids are a no-op.
    pub fn unsubscribe(&mut self, id: ListenerId) {
        self.listeners.retain(|(lid, _)| *lid != id);
    }

    fn persist_best_effort(&mut self) {
        let serialized = match serde_json::to_string(&self.stages) {
            Ok(s) => s,
            Err(e) => {
                log::warn!("Failed to serialize stage config: {}", e);
                return;
            }
        };
        if let Err(e) = self.store.set(STAGE_CONFIG_KEY, &serialized) {
            log::warn!("Failed to persist stage config: {}", e);
        }
    }
}

/// Parse a stored snapshot. Returns None for anything other than a non-empty
/// JSON array of stage definitions.
fn parse_snapshot(raw: &str) -> Option<Vec<StageDefinition>> {
    match serde_json::from_str::<Vec<StageDefinition>>(raw) {
        Ok(stages) if !stages.is_empty() => Some(stages),
        _ => None,
    }
}
