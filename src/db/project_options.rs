use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::options::OptionStore;

pub async fn get<'e>(
    executor: impl PgExecutor<'e>,
    project_id: Uuid,
    key: &str,
) -> Result<Option<Value>, sqlx::Error> {
    sqlx::query_scalar::<_, Value>(
        "SELECT value FROM project_options WHERE project_id = $1 AND key = $2",
    )
    .bind(project_id)
    .bind(key)
    .fetch_optional(executor)
    .await
}

pub async fn set<'e>(
    executor: impl PgExecutor<'e>,
    project_id: Uuid,
    key: &str,
    value: &Value,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO project_options (project_id, key, value) VALUES ($1, $2, $3)
         ON CONFLICT (project_id, key) DO UPDATE SET value = EXCLUDED.value",
    )
    .bind(project_id)
    .bind(key)
    .bind(value)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn unset<'e>(
    executor: impl PgExecutor<'e>,
    project_id: Uuid,
    key: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM project_options WHERE project_id = $1 AND key = $2")
        .bind(project_id)
        .bind(key)
        .execute(executor)
        .await?;
    Ok(())
}

pub async fn list<'e>(
    executor: impl PgExecutor<'e>,
    project_id: Uuid,
) -> Result<Vec<(String, Value)>, sqlx::Error> {
    sqlx::query_as::<_, (String, Value)>(
        "SELECT key, value FROM project_options WHERE project_id = $1",
    )
    .bind(project_id)
    .fetch_all(executor)
    .await
}

pub async fn delete_for_project<'e>(
    executor: impl PgExecutor<'e>,
    project_id: Uuid,
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM project_options WHERE project_id = $1")
        .bind(project_id)
        .execute(executor)
        .await?;
    Ok(())
}

/// `OptionStore` backed by the `project_options` table.
pub struct PgOptionStore {
    pool: PgPool,
}

impl PgOptionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OptionStore for PgOptionStore {
    async fn get(&self, project_id: Uuid, key: &str) -> Result<Option<Value>, sqlx::Error> {
        get(&self.pool, project_id, key).await
    }

    async fn set(&self, project_id: Uuid, key: &str, value: &Value) -> Result<(), sqlx::Error> {
        set(&self.pool, project_id, key, value).await
    }

    async fn unset(&self, project_id: Uuid, key: &str) -> Result<(), sqlx::Error> {
        unset(&self.pool, project_id, key).await
    }

    async fn get_all(&self, project_id: Uuid) -> Result<HashMap<String, Value>, sqlx::Error> {
        Ok(list(&self.pool, project_id).await?.into_iter().collect())
    }
}
