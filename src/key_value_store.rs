//! The keyspace: typed items per key, plus TTL bookkeeping and eviction.
//!
//! Every item carries an optional absolute expiration (unix milliseconds). Keys
//! with an expiration own exactly one pending eviction task in the eviction
//! arena; rescheduling always aborts the previous task first. Reads also treat
//! an overdue key as absent, so a late timer never leaks stale data.

use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Weak},
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use bytes::Bytes;
use tokio::{
    sync::Mutex,
    task::AbortHandle,
    time::Instant,
};
use tracing::{debug, trace, warn};

use crate::{commands::CommandError, pattern::Pattern};

/// The value stored under a key. Exactly one variant is active per key.
#[derive(Debug, Clone, PartialEq)]
pub enum DataType {
    /// Binary-safe string value.
    String(Bytes),
    Set(HashSet<String>),
    Json(serde_json::Value),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub data: DataType,
    /// Absolute expiration time in unix milliseconds.
    pub expiration: Option<i64>,
}

impl Item {
    pub fn new(data: DataType) -> Self {
        Self {
            data,
            expiration: None,
        }
    }

    pub fn with_expiration(data: DataType, expiration: Option<i64>) -> Self {
        Self { data, expiration }
    }
}

/// Conditions accepted by the EXPIRE family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExpiryMode {
    #[default]
    Always,
    /// Only when the key has no expiration.
    Nx,
    /// Only when the key already has an expiration.
    Xx,
    /// Only when the new expiration is later than the current one.
    Gt,
    /// Only when the new expiration is earlier than the current one.
    Lt,
}

impl ExpiryMode {
    pub fn parse(argument: &str) -> Result<Self, CommandError> {
        match argument.to_uppercase().as_str() {
            "NX" => Ok(ExpiryMode::Nx),
            "XX" => Ok(ExpiryMode::Xx),
            "GT" => Ok(ExpiryMode::Gt),
            "LT" => Ok(ExpiryMode::Lt),
            _ => Err(CommandError::SyntaxError),
        }
    }

    pub fn as_argument(&self) -> Option<&'static str> {
        match self {
            ExpiryMode::Always => None,
            ExpiryMode::Nx => Some("NX"),
            ExpiryMode::Xx => Some("XX"),
            ExpiryMode::Gt => Some("GT"),
            ExpiryMode::Lt => Some("LT"),
        }
    }

    fn allows(&self, current: Option<i64>, requested: i64) -> bool {
        match self {
            ExpiryMode::Always => true,
            ExpiryMode::Nx => current.is_none(),
            ExpiryMode::Xx => current.is_some(),
            // A key without expiration counts as living forever.
            ExpiryMode::Gt => current.is_some_and(|current| requested > current),
            ExpiryMode::Lt => current.map_or(true, |current| requested < current),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeToLive {
    Missing,
    Persistent,
    /// Milliseconds until the key expires.
    Remaining(i64),
}

impl TimeToLive {
    /// TTL reply shape: seconds rounded to nearest, -1 persistent, -2 missing.
    pub fn as_seconds(&self) -> i64 {
        match self {
            TimeToLive::Missing => -2,
            TimeToLive::Persistent => -1,
            TimeToLive::Remaining(ms) => (ms + 500) / 1000,
        }
    }

    pub fn as_millis(&self) -> i64 {
        match self {
            TimeToLive::Missing => -2,
            TimeToLive::Persistent => -1,
            TimeToLive::Remaining(ms) => *ms,
        }
    }
}

/// Wall-clock milliseconds that advance with the tokio clock.
///
/// Anchoring unix time to a tokio `Instant` keeps EXPIREAT-style absolute
/// deadlines and the eviction timers on the same time base, including when the
/// tokio clock is paused in tests.
#[derive(Debug, Clone, Copy)]
pub struct Clock {
    origin_unix_ms: i64,
    origin: Instant,
}

impl Clock {
    pub fn new() -> Self {
        let origin_unix_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis() as i64)
            .unwrap_or_default();

        Self {
            origin_unix_ms,
            origin: Instant::now(),
        }
    }

    pub fn now_ms(&self) -> i64 {
        self.origin_unix_ms + self.origin.elapsed().as_millis() as i64
    }

    pub fn instant_at(&self, unix_ms: i64) -> Instant {
        let offset = unix_ms.saturating_sub(self.origin_unix_ms).max(0) as u64;
        self.origin + Duration::from_millis(offset)
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

pub type SharedStore = Arc<Mutex<KeyValueStore>>;

#[derive(Debug)]
pub struct KeyValueStore {
    entries: HashMap<String, Item>,
    /// One pending eviction task per key with an expiration.
    evictions: HashMap<String, AbortHandle>,
    clock: Clock,
    this: Weak<Mutex<KeyValueStore>>,
}

impl KeyValueStore {
    /// Creates an empty keyspace behind the mutex its eviction tasks lock.
    pub fn shared() -> SharedStore {
        Arc::new_cyclic(|this| {
            Mutex::new(KeyValueStore {
                entries: HashMap::new(),
                evictions: HashMap::new(),
                clock: Clock::new(),
                this: this.clone(),
            })
        })
    }

    pub fn now_ms(&self) -> i64 {
        self.clock.now_ms()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&mut self, key: &str) -> Option<&Item> {
        self.purge_if_expired(key);
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Item> {
        self.purge_if_expired(key);
        self.entries.get_mut(key)
    }

    pub fn contains(&mut self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Stores `item` wholesale, replacing whatever lived under `key`.
    ///
    /// The previous eviction task is always cancelled; a new one is scheduled
    /// when the item carries an expiration.
    pub fn set(&mut self, key: String, item: Item) {
        self.cancel_eviction(&key);
        let expiration = item.expiration;
        self.entries.insert(key.clone(), item);

        if let Some(expiration) = expiration {
            self.schedule_eviction(key, expiration);
        }
    }

    pub fn delete(&mut self, key: &str) -> bool {
        self.purge_if_expired(key);
        self.cancel_eviction(key);
        self.entries.remove(key).is_some()
    }

    pub fn keys(&mut self, pattern: &Pattern) -> Vec<String> {
        let now = self.now_ms();
        let expired: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, item)| item.expiration.is_some_and(|at| at <= now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in expired {
            self.delete(&key);
        }

        self.entries
            .keys()
            .filter(|key| pattern.is_match(key))
            .cloned()
            .collect()
    }

    /// Applies an absolute expiration to `key` if `mode` allows it.
    ///
    /// A deadline that is not in the future deletes the key immediately and
    /// still reports success.
    pub fn set_expiry(&mut self, key: &str, expiration: i64, mode: ExpiryMode) -> bool {
        let now = self.now_ms();

        let Some(item) = self.get_mut(key) else {
            return false;
        };

        if !mode.allows(item.expiration, expiration) {
            return false;
        }

        if expiration <= now {
            debug!(key, "expiration already passed, deleting key");
            self.delete(key);
            return true;
        }

        item.expiration = Some(expiration);
        self.schedule_eviction(key.to_string(), expiration);

        true
    }

    pub fn time_to_live(&mut self, key: &str) -> TimeToLive {
        let now = self.now_ms();

        match self.get(key) {
            None => TimeToLive::Missing,
            Some(Item {
                expiration: None, ..
            }) => TimeToLive::Persistent,
            Some(Item {
                expiration: Some(at),
                ..
            }) => TimeToLive::Remaining((*at - now).max(0)),
        }
    }

    /// Clears the keyspace, aborting every pending eviction first.
    pub fn flush(&mut self) {
        for (_, handle) in self.evictions.drain() {
            handle.abort();
        }

        debug!(keys = self.entries.len(), "flushing keyspace");
        self.entries.clear();
    }

    fn purge_if_expired(&mut self, key: &str) {
        let now = self.now_ms();
        let expired = self
            .entries
            .get(key)
            .and_then(|item| item.expiration)
            .is_some_and(|at| at <= now);

        if expired {
            trace!(key, "lazily expiring key");
            self.cancel_eviction(key);
            self.entries.remove(key);
        }
    }

    fn cancel_eviction(&mut self, key: &str) {
        if let Some(handle) = self.evictions.remove(key) {
            handle.abort();
        }
    }

    fn schedule_eviction(&mut self, key: String, expiration: i64) {
        self.cancel_eviction(&key);

        if expiration <= self.now_ms() {
            self.entries.remove(&key);
            return;
        }

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!(key, "no tokio runtime, key will only expire lazily");
            return;
        };

        let store = self.this.clone();
        let deadline = self.clock.instant_at(expiration);
        let task_key = key.clone();

        let task = runtime.spawn(async move {
            tokio::time::sleep_until(deadline).await;

            if let Some(store) = store.upgrade() {
                store.lock().await.evict(&task_key, expiration);
            }
        });

        trace!(key, expiration, "scheduled eviction");
        self.evictions.insert(key, task.abort_handle());
    }

    /// Timer callback: removes `key` only if it still holds `expiration`.
    fn evict(&mut self, key: &str, expiration: i64) {
        let still_current = self
            .entries
            .get(key)
            .is_some_and(|item| item.expiration == Some(expiration));

        if still_current {
            debug!(key, "evicting expired key");
            self.entries.remove(key);
            self.evictions.remove(key);
        }
    }
}
