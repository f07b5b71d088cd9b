use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension};

/// Fixed key the stage configuration blob is stored under.
pub const STAGE_CONFIG_KEY: &str = "pipeline.stages";

/// Durable key-value storage for configuration blobs.
///
/// The registry treats this as best-effort: read failures fall back to
/// defaults and write failures are logged and swallowed, so implementations
/// may freely return errors.
pub trait ConfigStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// Config store backed by the `config` table of the ledger database.
pub struct SqliteConfigStore<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteConfigStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        SqliteConfigStore { conn }
    }
}

impl ConfigStore for SqliteConfigStore<'_> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.conn
            .query_row("SELECT value FROM config WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()
            .with_context(|| format!("Failed to read config key '{}'", key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO config (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                rusqlite::params![key, value],
            )
            .with_context(|| format!("Failed to write config key '{}'", key))?;
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::HashMap;

    /// In-memory store for unit tests.
    #[derive(Default)]
    pub struct MemoryStore {
        pub values: HashMap<String, String>,
    }

    impl MemoryStore {
        pub fn with_value(key: &str, value: &str) -> Self {
            let mut store = MemoryStore::default();
            store.values.insert(key.to_string(), value.to_string());
            store
        }
    }

    impl ConfigStore for MemoryStore {
        fn get(&self, key: &str) -> Result<Option<String>> {
            Ok(self.values.get(key).cloned())
        }

        fn set(&mut self, key: &str, value: &str) -> Result<()> {
            self.values.insert(key.to_string(), value.to_string());
            Ok(())
        }
    }

    /// Store whose reads and writes always fail, for exercising the
    /// best-effort fallback paths.
    pub struct FailingStore;

    impl ConfigStore for FailingStore {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            anyhow::bail!("storage unavailable")
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<()> {
            anyhow::bail!("storage unavailable")
        }
    }
}
