use serde_json::Value;
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

pub const MAIL_ALERT: &str = "mail:alert";

pub async fn get_value(
    pool: &PgPool,
    user_id: Uuid,
    project_id: Uuid,
    key: &str,
) -> Result<Option<Value>, sqlx::Error> {
    sqlx::query_scalar::<_, Value>(
        "SELECT value FROM user_options WHERE user_id = $1 AND project_id = $2 AND key = $3",
    )
    .bind(user_id)
    .bind(project_id)
    .bind(key)
    .fetch_optional(pool)
    .await
}

pub async fn set_value(
    pool: &PgPool,
    user_id: Uuid,
    project_id: Uuid,
    key: &str,
    value: &Value,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO user_options (user_id, project_id, key, value) VALUES ($1, $2, $3, $4)
         ON CONFLICT (user_id, project_id, key) DO UPDATE SET value = EXCLUDED.value",
    )
    .bind(user_id)
    .bind(project_id)
    .bind(key)
    .bind(value)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn delete_for_project<'e>(
    executor: impl PgExecutor<'e>,
    project_id: Uuid,
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM user_options WHERE project_id = $1")
        .bind(project_id)
        .execute(executor)
        .await?;
    Ok(())
}
