use std::time::Duration;

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::locks::{LockBackend, LockError};

/// Lease table in PostgreSQL; every instance of the service shares it.
pub struct PgLockBackend {
    pool: PgPool,
}

impl PgLockBackend {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LockBackend for PgLockBackend {
    async fn try_acquire(
        &self,
        key: &str,
        owner: Uuid,
        lease: Duration,
    ) -> Result<bool, LockError> {
        // The upsert only overwrites an expired lease; a live one yields no row.
        let acquired = sqlx::query_scalar::<_, Uuid>(
            "INSERT INTO locks (key, owner, expires_at)
             VALUES ($1, $2, now() + make_interval(secs => $3::double precision))
             ON CONFLICT (key) DO UPDATE
                 SET owner = EXCLUDED.owner, expires_at = EXCLUDED.expires_at
                 WHERE locks.expires_at <= now()
             RETURNING owner",
        )
        .bind(key)
        .bind(owner)
        .bind(lease.as_secs_f64())
        .fetch_optional(&self.pool)
        .await?;

        Ok(acquired == Some(owner))
    }

    async fn release(&self, key: &str, owner: Uuid) -> Result<(), LockError> {
        sqlx::query("DELETE FROM locks WHERE key = $1 AND owner = $2")
            .bind(key)
            .bind(owner)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
