use sqlx::PgPool;

use crate::models::User;

pub async fn create(pool: &PgPool, email: &str, name: &str) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>("INSERT INTO users (email, name) VALUES ($1, $2) RETURNING *")
        .bind(email)
        .bind(name)
        .fetch_one(pool)
        .await
}
