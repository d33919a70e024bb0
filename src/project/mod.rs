//! Behaviour of the project entity that needs collaborators: the option
//! store for its settings and the lock manager for one-time generation.

pub mod deletion;
pub mod slug;

use std::time::Duration;

use serde_json::Value;

use crate::error::AppError;
use crate::locks::{LockManager, TimedRetryPolicy};
use crate::models::Project;
use crate::options::OptionStore;

pub const SECURITY_TOKEN_KEY: &str = "sentry:token";
pub const DIGESTS_MIN_DELAY_KEY: &str = "digests:mail:minimum_delay";
pub const DIGESTS_MAX_DELAY_KEY: &str = "digests:mail:maximum_delay";

/// Lease used for slug and token generation.
pub const GENERATION_LEASE: Duration = Duration::from_secs(5);

/// How long a first read waits for another request to finish generating.
pub const TOKEN_LOCK_TIMEOUT: Duration = Duration::from_secs(2);

impl Project {
    pub async fn get_option(
        &self,
        store: &dyn OptionStore,
        key: &str,
    ) -> Result<Option<Value>, AppError> {
        Ok(store.get(self.id, key).await?)
    }

    pub async fn get_option_or(
        &self,
        store: &dyn OptionStore,
        key: &str,
        default: Value,
    ) -> Result<Value, AppError> {
        Ok(store.get_value(self.id, key, default).await?)
    }

    pub async fn update_option(
        &self,
        store: &dyn OptionStore,
        key: &str,
        value: &Value,
    ) -> Result<(), AppError> {
        Ok(store.set(self.id, key, value).await?)
    }

    pub async fn delete_option(&self, store: &dyn OptionStore, key: &str) -> Result<(), AppError> {
        Ok(store.unset(self.id, key).await?)
    }

    /// Return the project's security token, generating it on first use.
    ///
    /// Generation happens under a short lease and re-checks the store after
    /// acquiring it, so concurrent first reads agree on one token. A lock
    /// still busy after `TOKEN_LOCK_TIMEOUT` is reported as
    /// `AppError::Unavailable`.
    pub async fn get_security_token(
        &self,
        store: &dyn OptionStore,
        locks: &LockManager,
    ) -> Result<String, AppError> {
        if let Some(token) = stored_token(store, self).await? {
            return Ok(token);
        }

        let guard = locks
            .get(format!("{SECURITY_TOKEN_KEY}:{}", self.id), GENERATION_LEASE)
            .acquire_with_retry(TimedRetryPolicy::new(TOKEN_LOCK_TIMEOUT))
            .await?;

        let result = async {
            if let Some(token) = stored_token(store, self).await? {
                return Ok(token);
            }
            let token = generate_security_token();
            self.update_option(store, SECURITY_TOKEN_KEY, &Value::String(token.clone()))
                .await?;
            tracing::debug!("Generated security token for project {}", self.id);
            Ok::<_, AppError>(token)
        }
        .await;

        guard.release().await;
        result
    }
}

async fn stored_token(
    store: &dyn OptionStore,
    project: &Project,
) -> Result<Option<String>, AppError> {
    Ok(project
        .get_option(store, SECURITY_TOKEN_KEY)
        .await?
        .and_then(|v| v.as_str().map(|s| s.to_string()))
        .filter(|s| !s.is_empty()))
}

/// 32 lowercase hex characters.
pub fn generate_security_token() -> String {
    hex::encode(rand::random::<[u8; 16]>())
}
