pub mod normalize;
pub mod schema;
pub mod validators;

use std::collections::HashMap;

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use uuid::Uuid;

pub use schema::{ConfigSchema, FieldDescriptor, FieldType, OptionError, Storage};

/// Key/value persistence for project-scoped options.
///
/// Writes are last-write-wins and there is no atomicity across keys.
#[async_trait]
pub trait OptionStore: Send + Sync {
    async fn get(&self, project_id: Uuid, key: &str) -> Result<Option<Value>, sqlx::Error>;

    async fn set(&self, project_id: Uuid, key: &str, value: &Value) -> Result<(), sqlx::Error>;

    async fn unset(&self, project_id: Uuid, key: &str) -> Result<(), sqlx::Error>;

    async fn get_all(&self, project_id: Uuid) -> Result<HashMap<String, Value>, sqlx::Error>;

    /// Like `get`, but falls back to `default` when the key is unset.
    async fn get_value(
        &self,
        project_id: Uuid,
        key: &str,
        default: Value,
    ) -> Result<Value, sqlx::Error> {
        Ok(self.get(project_id, key).await?.unwrap_or(default))
    }
}

/// Process-local option store, used by tests and tooling that run without a database.
#[derive(Default)]
pub struct MemoryOptionStore {
    entries: DashMap<(Uuid, String), Value>,
}

impl MemoryOptionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OptionStore for MemoryOptionStore {
    async fn get(&self, project_id: Uuid, key: &str) -> Result<Option<Value>, sqlx::Error> {
        Ok(self
            .entries
            .get(&(project_id, key.to_string()))
            .map(|v| v.value().clone()))
    }

    async fn set(&self, project_id: Uuid, key: &str, value: &Value) -> Result<(), sqlx::Error> {
        self.entries
            .insert((project_id, key.to_string()), value.clone());
        Ok(())
    }

    async fn unset(&self, project_id: Uuid, key: &str) -> Result<(), sqlx::Error> {
        self.entries.remove(&(project_id, key.to_string()));
        Ok(())
    }

    async fn get_all(&self, project_id: Uuid) -> Result<HashMap<String, Value>, sqlx::Error> {
        Ok(self
            .entries
            .iter()
            .filter(|entry| entry.key().0 == project_id)
            .map(|entry| (entry.key().1.clone(), entry.value().clone()))
            .collect())
    }
}
