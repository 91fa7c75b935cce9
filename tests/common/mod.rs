#![allow(dead_code)]

use async_lock::{RwLock, RwLockWriteGuard};
use async_trait::async_trait;
use federated_session::{
    MemoryStore, MockClock, SessionId, SessionRecord, SessionStore, SessionStoreConnector,
};
use serde_json::Value;
use std::convert::Infallible;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub const TTL: Duration = Duration::from_millis(1000);

#[derive(Debug, thiserror::Error)]
#[error("cache unavailable")]
pub struct CacheUnavailable;

/// A memory store that can be switched off to simulate a cache outage.
#[derive(Debug, Clone, Default)]
pub struct FlakyStore {
    inner: MemoryStore<Value>,
    down: Arc<AtomicBool>,
}

impl FlakyStore {
    pub fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), CacheUnavailable> {
        if self.down.load(Ordering::SeqCst) {
            Err(CacheUnavailable)
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl SessionStoreConnector<Value> for FlakyStore {
    type Error = CacheUnavailable;

    async fn put(
        &self,
        segment: &str,
        id: &SessionId,
        record: SessionRecord<Value>,
        ttl: Duration,
    ) -> Result<(), Self::Error> {
        self.check()?;
        Ok(infallible(self.inner.put(segment, id, record, ttl).await))
    }

    async fn get(
        &self,
        segment: &str,
        id: &SessionId,
    ) -> Result<Option<SessionRecord<Value>>, Self::Error> {
        self.check()?;
        Ok(infallible(self.inner.get(segment, id).await))
    }

    async fn remove(
        &self,
        segment: &str,
        id: &SessionId,
    ) -> Result<Option<SessionRecord<Value>>, Self::Error> {
        self.check()?;
        Ok(infallible(self.inner.remove(segment, id).await))
    }

    async fn clear(&self, segment: &str) -> Result<(), Self::Error> {
        self.check()?;
        Ok(infallible(self.inner.clear(segment).await))
    }
}

/// A memory store whose writes wait while the test holds the gate closed.
#[derive(Debug, Clone, Default)]
pub struct ParkedStore {
    inner: MemoryStore<Value>,
    gate: Arc<RwLock<()>>,
}

impl ParkedStore {
    pub fn inner(&self) -> &MemoryStore<Value> {
        &self.inner
    }

    /// Puts park until the returned guard is dropped.
    pub async fn close(&self) -> RwLockWriteGuard<'_, ()> {
        self.gate.write().await
    }
}

#[async_trait]
impl SessionStoreConnector<Value> for ParkedStore {
    type Error = Infallible;

    async fn put(
        &self,
        segment: &str,
        id: &SessionId,
        record: SessionRecord<Value>,
        ttl: Duration,
    ) -> Result<(), Self::Error> {
        let _open = self.gate.read().await;
        self.inner.put(segment, id, record, ttl).await
    }

    async fn get(
        &self,
        segment: &str,
        id: &SessionId,
    ) -> Result<Option<SessionRecord<Value>>, Self::Error> {
        self.inner.get(segment, id).await
    }

    async fn remove(
        &self,
        segment: &str,
        id: &SessionId,
    ) -> Result<Option<SessionRecord<Value>>, Self::Error> {
        self.inner.remove(segment, id).await
    }

    async fn clear(&self, segment: &str) -> Result<(), Self::Error> {
        self.inner.clear(segment).await
    }
}

pub fn infallible<T>(result: Result<T, Infallible>) -> T {
    match result {
        Ok(value) => value,
        Err(never) => match never {},
    }
}

/// A memory store driven by a mock clock, with a one second default ttl.
pub fn mock_clock_store(clock: &MockClock) -> SessionStore<Value, MemoryStore<Value>> {
    SessionStore::new(MemoryStore::with_clock(clock.clone()))
        .with_clock(clock.clone())
        .with_default_ttl(TTL)
}
