//! Process-scoped key-value cache with per-entry TTL.
//!
//! Entries are stored as serialized JSON so that a cached value is always a
//! detached snapshot of the source document.

use std::sync::Arc;
use std::time::{Duration, Instant};

use moka::future::Cache;
use moka::Expiry;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

pub const SESSION_TTL: Duration = Duration::from_secs(24 * 60 * 60);
pub const PROFILE_TTL: Duration = Duration::from_secs(60 * 60);
pub const RANDOM_USERS_TTL: Duration = Duration::from_secs(10);
pub const RECENT_USERS_TTL: Duration = Duration::from_secs(6);

pub const RANDOM_USERS_KEY: &str = "random_users";

pub fn session_key(user_id: &str) -> String {
    format!("login_info:{}", user_id)
}

pub fn my_profile_key(user_id: &str) -> String {
    format!("my_profile:{}", user_id)
}

pub fn user_info_key(user_id: &str) -> String {
    format!("user_info:{}", user_id)
}

pub fn recent_users_key(caller_id: &str) -> String {
    format!("recently_joined_users:{}", caller_id)
}

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache payload could not be (de)serialized: {0}")]
    Payload(#[from] serde_json::Error),
}

#[derive(Clone)]
struct Entry {
    payload: Arc<str>,
    ttl: Duration,
}

struct EntryExpiry;

impl Expiry<String, Entry> for EntryExpiry {
    fn expire_after_create(&self, _key: &String, value: &Entry, _created_at: Instant) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &Entry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// Shared handle to the cache. Cloning is cheap and all clones see the same
/// entries.
#[derive(Clone)]
pub struct CacheClient {
    inner: Cache<String, Entry>,
}

impl CacheClient {
    pub fn new(max_entries: u64) -> Self {
        let inner = Cache::builder()
            .max_capacity(max_entries)
            .expire_after(EntryExpiry)
            .build();
        CacheClient { inner }
    }

    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CacheError> {
        match self.inner.get(key).await {
            Some(entry) => Ok(Some(serde_json::from_str(&entry.payload)?)),
            None => Ok(None),
        }
    }

    pub async fn set<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        let payload = serde_json::to_string(value)?;
        self.inner
            .insert(
                key.to_string(),
                Entry {
                    payload: payload.into(),
                    ttl,
                },
            )
            .await;
        Ok(())
    }

    pub async fn delete(&self, keys: &[String]) {
        for key in keys {
            self.inner.invalidate(key).await;
        }
    }

    pub async fn exists(&self, key: &str) -> bool {
        self.inner.get(key).await.is_some()
    }
}
