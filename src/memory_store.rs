use crate::clock::{Clock, SystemClock};
use crate::session::{SessionId, SessionRecord};
use crate::session_store::SessionStoreConnector;
use async_lock::RwLock;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::convert::Infallible;
use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

/// # in-memory session store
/// Because there is no external
/// persistence, this session store is ephemeral and will be cleared
/// on server restart.
///
/// # ***READ THIS BEFORE USING IN A PRODUCTION DEPLOYMENT***
///
/// Storing sessions only in memory brings the following problems:
///
/// 1. All sessions must fit in available memory (important for high load services)
/// 2. Expired sessions are only evicted when they are read or when [MemoryStore::cleanup] runs.
///    If cleanup is not scheduled it might result in OOM
/// 3. All sessions will be lost on shutdown
/// 4. If the service is clustered particular session will be stored only on a single instance.
///    This might be solved by using load balancers with sticky sessions.
///
/// Clones share the same map.
#[derive(Debug)]
pub struct MemoryStore<Profile> {
    session_map: Arc<RwLock<HashMap<EntryKey, Arc<Entry<Profile>>>>>,
    clock: Arc<dyn Clock>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct EntryKey {
    segment: Arc<str>,
    id: SessionId,
}

#[derive(Debug)]
struct Entry<Profile> {
    record: SessionRecord<Profile>,
    expires_at: DateTime<Utc>,
}

impl<Profile> Entry<Profile> {
    /// An entry is expired from the instant its ttl has fully elapsed.
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

#[async_trait]
impl<Profile: Debug + Clone + Send + Sync + 'static> SessionStoreConnector<Profile>
    for MemoryStore<Profile>
{
    type Error = Infallible;

    async fn put(
        &self,
        segment: &str,
        id: &SessionId,
        record: SessionRecord<Profile>,
        ttl: Duration,
    ) -> Result<(), Self::Error> {
        let now = self.clock.now();
        let expires_at = chrono::Duration::from_std(ttl)
            .ok()
            .and_then(|ttl| now.checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        let entry = Arc::new(Entry { record, expires_at });
        let key = EntryKey::new(segment, id);

        // The entry is fully built before the lock is taken, so readers never observe a partial write.
        self.session_map.write().await.insert(key, entry);
        Ok(())
    }

    async fn get(
        &self,
        segment: &str,
        id: &SessionId,
    ) -> Result<Option<SessionRecord<Profile>>, Self::Error> {
        let key = EntryKey::new(segment, id);
        let now = self.clock.now();

        let entry = self.session_map.read().await.get(&key).cloned();
        match entry {
            Some(entry) if !entry.is_expired(now) => Ok(Some(entry.record.clone())),
            Some(_) => {
                self.evict_if_expired(&key, now).await;
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn remove(
        &self,
        segment: &str,
        id: &SessionId,
    ) -> Result<Option<SessionRecord<Profile>>, Self::Error> {
        let key = EntryKey::new(segment, id);
        let now = self.clock.now();

        let removed = self.session_map.write().await.remove(&key);
        Ok(removed
            .filter(|entry| !entry.is_expired(now))
            .map(|entry| entry.record.clone()))
    }

    async fn clear(&self, segment: &str) -> Result<(), Self::Error> {
        self.session_map
            .write()
            .await
            .retain(|key, _| &*key.segment != segment);
        Ok(())
    }
}

impl<Profile> MemoryStore<Profile> {
    /// Create a new empty memory store that expires sessions according to the wall clock.
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }

    /// Create a new empty memory store that expires sessions according to the given clock.
    pub fn with_clock(clock: impl Clock + 'static) -> Self {
        Self {
            session_map: Default::default(),
            clock: Arc::new(clock),
        }
    }

    /// Returns the number of entries in the memory store, including expired ones that were not evicted yet.
    pub async fn len(&self) -> usize {
        self.session_map.read().await.len()
    }

    /// Returns true if the memory store holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.session_map.read().await.is_empty()
    }

    /// Performs session cleanup. This should be run on an
    /// intermittent basis if this store is run for long enough that
    /// memory accumulation is a concern.
    ///
    /// Returns the number of evicted sessions.
    pub async fn cleanup(&self) -> usize {
        log::trace!("Cleaning up memory store...");
        let now = self.clock.now();
        let mut session_map = self.session_map.write().await;
        let initial_len = session_map.len();
        session_map.retain(|_, entry| !entry.is_expired(now));
        let evicted = initial_len - session_map.len();
        log::trace!("Deleted {evicted} expired sessions");
        evicted
    }

    async fn evict_if_expired(&self, key: &EntryKey, now: DateTime<Utc>) {
        let mut session_map = self.session_map.write().await;
        // A concurrent put may have replaced the entry since it was read.
        if session_map
            .get(key)
            .is_some_and(|entry| entry.is_expired(now))
        {
            session_map.remove(key);
            log::trace!("Evicted expired session {:?}", key.id);
        }
    }
}

impl EntryKey {
    fn new(segment: &str, id: &SessionId) -> Self {
        Self {
            segment: segment.into(),
            id: id.clone(),
        }
    }
}

impl<Profile> Clone for MemoryStore<Profile> {
    fn clone(&self) -> Self {
        Self {
            session_map: self.session_map.clone(),
            clock: self.clock.clone(),
        }
    }
}

impl<Profile> Default for MemoryStore<Profile> {
    fn default() -> Self {
        Self::new()
    }
}
