use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

/// Bookmark a project for a user. A bookmark that already exists is left alone,
/// including when a concurrent request inserted it first.
pub async fn create(pool: &PgPool, project_id: Uuid, user_id: Uuid) -> Result<(), sqlx::Error> {
    let result = sqlx::query("INSERT INTO project_bookmarks (project_id, user_id) VALUES ($1, $2)")
        .bind(project_id)
        .bind(user_id)
        .execute(pool)
        .await;

    match result {
        Ok(_) => Ok(()),
        Err(sqlx::Error::Database(ref db_err)) if db_err.is_unique_violation() => Ok(()),
        Err(e) => Err(e),
    }
}

pub async fn delete(pool: &PgPool, project_id: Uuid, user_id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM project_bookmarks WHERE project_id = $1 AND user_id = $2")
        .bind(project_id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn exists(pool: &PgPool, project_id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS (SELECT 1 FROM project_bookmarks WHERE project_id = $1 AND user_id = $2)",
    )
    .bind(project_id)
    .bind(user_id)
    .fetch_one(pool)
    .await
}

pub async fn delete_for_project<'e>(
    executor: impl PgExecutor<'e>,
    project_id: Uuid,
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM project_bookmarks WHERE project_id = $1")
        .bind(project_id)
        .execute(executor)
        .await?;
    Ok(())
}
