//! Redis-backed counter store.
//!
//! The production implementation of the `CounterStore` port: a single
//! Redis instance (or cluster endpoint) shared by every service instance,
//! so a caller's quota is enforced fleet-wide. `INCR` supplies the atomic
//! per-key increment the gate depends on; `EXPIRE` arms the quota window.
//!
//! Connections go through `redis::aio::ConnectionManager`, which
//! multiplexes one TCP connection and reconnects with backoff after
//! failures. Cloning the manager is cheap and is how concurrent callers
//! issue commands without serializing on a lock.
//!
//! Errors are not absorbed here: every Redis failure is logged with
//! context and surfaced as `CounterStoreError::Unavailable`, leaving the
//! admit-or-reject-on-outage policy to the surrounding system.

use crate::application::ports::{CounterStore, CounterStoreError};
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client, RedisError};
use std::fmt;
use std::time::Duration;

/// Shared counter store backed by Redis.
#[derive(Clone)]
pub struct RedisCounterStore {
    connection: ConnectionManager,
}

impl fmt::Debug for RedisCounterStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisCounterStore").finish_non_exhaustive()
    }
}

impl RedisCounterStore {
    /// Connect to Redis at `url` (e.g. `"redis://127.0.0.1/"`).
    ///
    /// # Errors
    /// Returns the underlying [`RedisError`] if the initial connection
    /// cannot be established.
    pub async fn connect(url: &str) -> Result<Self, RedisError> {
        let client = Client::open(url)?;
        let connection = ConnectionManager::new(client).await?;
        Ok(Self { connection })
    }

    /// Wrap an existing connection manager.
    ///
    /// For hosts that already maintain a Redis connection and want the
    /// counter store to share it.
    pub fn from_manager(connection: ConnectionManager) -> Self {
        Self { connection }
    }

    fn unavailable(op: &str, key: &str, err: &RedisError) -> CounterStoreError {
        tracing::warn!(error = %err, key, op, "redis counter operation failed");
        CounterStoreError::Unavailable(err.to_string())
    }
}

#[async_trait]
impl CounterStore for RedisCounterStore {
    async fn incr(&self, key: &str) -> Result<u64, CounterStoreError> {
        let mut conn = self.connection.clone();
        conn.incr(key, 1)
            .await
            .map_err(|e| Self::unavailable("INCR", key, &e))
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<(), CounterStoreError> {
        let mut conn = self.connection.clone();
        conn.expire::<_, ()>(key, ttl.as_secs() as i64)
            .await
            .map_err(|e| Self::unavailable("EXPIRE", key, &e))
    }
}
