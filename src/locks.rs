//! Lease-based mutual exclusion shared by every process of the service.
//!
//! A lease expires on its own, so a holder that dies never blocks others for
//! longer than the lease duration.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use uuid::Uuid;

#[derive(Debug)]
pub enum LockError {
    /// The lease is held by someone else.
    Unavailable(String),
    Backend(String),
}

impl std::fmt::Display for LockError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LockError::Unavailable(key) => write!(f, "Lock {key} is held by another owner"),
            LockError::Backend(msg) => write!(f, "Lock backend error: {msg}"),
        }
    }
}

impl std::error::Error for LockError {}

impl From<sqlx::Error> for LockError {
    fn from(err: sqlx::Error) -> Self {
        LockError::Backend(err.to_string())
    }
}

#[async_trait]
pub trait LockBackend: Send + Sync {
    /// Take the lease if it is free or expired. Returns false when held.
    async fn try_acquire(&self, key: &str, owner: Uuid, lease: Duration) -> Result<bool, LockError>;

    async fn release(&self, key: &str, owner: Uuid) -> Result<(), LockError>;
}

/// Retry acquisition until `timeout` elapses, sleeping with a growing delay.
#[derive(Debug, Clone, Copy)]
pub struct TimedRetryPolicy {
    pub timeout: Duration,
    pub delay: Duration,
    pub max_delay: Duration,
}

impl TimedRetryPolicy {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            delay: Duration::from_millis(50),
            max_delay: Duration::from_secs(1),
        }
    }
}

#[derive(Clone)]
pub struct LockManager {
    backend: Arc<dyn LockBackend>,
}

impl LockManager {
    pub fn new(backend: Arc<dyn LockBackend>) -> Self {
        Self { backend }
    }

    pub fn get(&self, key: impl Into<String>, lease: Duration) -> Lock {
        Lock {
            backend: self.backend.clone(),
            key: key.into(),
            lease,
        }
    }
}

pub struct Lock {
    backend: Arc<dyn LockBackend>,
    key: String,
    lease: Duration,
}

impl Lock {
    /// Single acquisition attempt.
    pub async fn acquire(&self) -> Result<LockGuard, LockError> {
        let owner = Uuid::now_v7();
        if self.backend.try_acquire(&self.key, owner, self.lease).await? {
            Ok(LockGuard {
                backend: self.backend.clone(),
                key: self.key.clone(),
                owner,
            })
        } else {
            Err(LockError::Unavailable(self.key.clone()))
        }
    }

    pub async fn acquire_with_retry(
        &self,
        policy: TimedRetryPolicy,
    ) -> Result<LockGuard, LockError> {
        let started = Instant::now();
        let mut delay = policy.delay;
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            match self.acquire().await {
                Ok(guard) => return Ok(guard),
                Err(LockError::Unavailable(key)) => {
                    if started.elapsed() + delay > policy.timeout {
                        tracing::warn!("Giving up on lock {key} after {attempt} attempts");
                        return Err(LockError::Unavailable(key));
                    }
                    tracing::debug!("Lock {key} busy (attempt {attempt}), retrying in {delay:?}");
                    tokio::time::sleep(delay).await;
                    delay = (delay * 2).min(policy.max_delay);
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Held lease. Release explicitly; an unreleased lease lapses when it expires.
pub struct LockGuard {
    backend: Arc<dyn LockBackend>,
    key: String,
    owner: Uuid,
}

impl LockGuard {
    pub async fn release(self) {
        if let Err(e) = self.backend.release(&self.key, self.owner).await {
            tracing::error!("Failed to release lock {}: {e}", self.key);
        }
    }
}

/// In-process lease table for tests and single-node tooling.
#[derive(Default)]
pub struct MemoryLockBackend {
    leases: DashMap<String, (Uuid, Instant)>,
}

impl MemoryLockBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LockBackend for MemoryLockBackend {
    async fn try_acquire(
        &self,
        key: &str,
        owner: Uuid,
        lease: Duration,
    ) -> Result<bool, LockError> {
        let now = Instant::now();
        let mut entry = self
            .leases
            .entry(key.to_string())
            .or_insert((owner, now + lease));
        let (holder, expires_at) = entry.value_mut();

        if *holder == owner {
            return Ok(true);
        }
        if *expires_at <= now {
            *holder = owner;
            *expires_at = now + lease;
            return Ok(true);
        }
        Ok(false)
    }

    async fn release(&self, key: &str, owner: Uuid) -> Result<(), LockError> {
        self.leases.remove_if(key, |_, (holder, _)| *holder == owner);
        Ok(())
    }
}
