pub(crate) mod token_generator;

use crate::clock::{Clock, SystemClock};
use crate::session::{SessionId, SessionRecord};
use crate::Error;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt::{Debug, Display};
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

/// The default segment, i.e. the logical namespace of session entries.
pub const DEFAULT_SEGMENT: &str = "sessions";

/// The default session ttl of three days.
pub const DEFAULT_TTL: Duration = Duration::from_secs(3 * 24 * 60 * 60);

/// A handle to a session store.
///
/// This is the user-facing interface of the session store.
/// It namespaces all entries under a segment, resolves the default ttl,
/// and forwards to a [`SessionStoreConnector`] that owns the actual storage.
///
/// Cloning is cheap and all clones share the same backend, so one store is constructed at
/// startup and a clone is handed to the [`SessionIssuer`](crate::SessionIssuer) and the
/// [`SessionValidator`](crate::SessionValidator).
#[derive(Debug)]
pub struct SessionStore<Profile, Connector> {
    connector: Arc<Connector>,
    segment: Arc<str>,
    default_ttl: Duration,
    clock: Arc<dyn Clock>,
    profile: PhantomData<fn() -> Profile>,
}

impl<Profile, Connector> Clone for SessionStore<Profile, Connector> {
    fn clone(&self) -> Self {
        Self {
            connector: self.connector.clone(),
            segment: self.segment.clone(),
            default_ttl: self.default_ttl,
            clock: self.clock.clone(),
            profile: PhantomData,
        }
    }
}

impl<Profile: Send + 'static, Connector: SessionStoreConnector<Profile>>
    SessionStore<Profile, Connector>
{
    /// Create a new session store with the given connector, using [`DEFAULT_SEGMENT`] and [`DEFAULT_TTL`].
    pub fn new(connector: Connector) -> Self {
        Self {
            connector: Arc::new(connector),
            segment: DEFAULT_SEGMENT.into(),
            default_ttl: DEFAULT_TTL,
            clock: Arc::new(SystemClock),
            profile: PhantomData,
        }
    }

    /// Use the given segment to namespace session entries.
    pub fn with_segment(mut self, segment: impl Into<Arc<str>>) -> Self {
        self.segment = segment.into();
        self
    }

    /// Use the given ttl whenever [`put`](Self::put) is called with a zero ttl.
    pub fn with_default_ttl(mut self, default_ttl: Duration) -> Self {
        self.default_ttl = default_ttl;
        self
    }

    /// Use the given clock to timestamp new sessions.
    /// The connector keeps its own notion of time for expiry.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// The segment this store writes to.
    pub fn segment(&self) -> &str {
        &self.segment
    }

    /// The ttl applied when none is given.
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// The current time according to this store's clock.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Returns a reference to the connector.
    pub fn connector(&self) -> &Connector {
        &self.connector
    }

    /// Insert or overwrite the session stored under `id`.
    ///
    /// The entry expires `ttl` after this call. A `ttl` of zero means the store's default ttl.
    /// Overwriting an entry resets its expiry clock.
    pub async fn put(
        &self,
        id: &SessionId,
        record: SessionRecord<Profile>,
        ttl: Duration,
    ) -> Result<(), Error<Connector::Error>> {
        let ttl = if ttl.is_zero() { self.default_ttl } else { ttl };
        if chrono::Duration::from_std(ttl).is_err() {
            return Err(Error::TtlOutOfRange { ttl });
        }

        self.connector.put(&self.segment, id, record, ttl).await?;
        Ok(())
    }

    /// Get the session stored under `id`.
    ///
    /// The return value is `Ok(Some(_))` if there is a session with the given id that is not expired,
    /// or `Ok(None)` if there is no such session that is not expired.
    pub async fn get(
        &self,
        id: &SessionId,
    ) -> Result<Option<SessionRecord<Profile>>, Error<Connector::Error>> {
        Ok(self.connector.get(&self.segment, id).await?)
    }

    /// Remove the session stored under `id`, returning it if it was live.
    pub async fn remove(
        &self,
        id: &SessionId,
    ) -> Result<Option<SessionRecord<Profile>>, Error<Connector::Error>> {
        Ok(self.connector.remove(&self.segment, id).await?)
    }

    /// Empties the segment, deleting all of its sessions.
    pub async fn clear(&self) -> Result<(), Error<Connector::Error>> {
        self.connector.clear(&self.segment).await?;
        Ok(())
    }
}

/// This is the backend-facing interface of the session store.
/// It defines simple key-value methods with per-entry expiry.
///
/// Entries are keyed by `(segment, id)`. Implementations must be safe to call concurrently:
///
///  * operations on distinct keys must not interfere,
///  * concurrent `put`s to the same key resolve last-write-wins,
///  * a reader sees either a complete record or none, never a partially written one,
///  * a `put` that completed is visible to every `get` issued after it (read-your-writes),
///  * a `put` future dropped before completion must not leave a partial record behind.
#[async_trait]
pub trait SessionStoreConnector<Profile: Send + 'static>: Debug + Send + Sync {
    /// The error signalling a backend fault.
    type Error: Debug + Display + Send + Sync;

    /// Insert or overwrite the entry under `(segment, id)`, expiring `ttl` from now.
    /// `ttl` is always positive.
    async fn put(
        &self,
        segment: &str,
        id: &SessionId,
        record: SessionRecord<Profile>,
        ttl: Duration,
    ) -> Result<(), Self::Error>;

    /// Read the entry under `(segment, id)` if it exists and is not expired.
    async fn get(
        &self,
        segment: &str,
        id: &SessionId,
    ) -> Result<Option<SessionRecord<Profile>>, Self::Error>;

    /// Delete the entry under `(segment, id)`, returning it if it was not expired.
    async fn remove(
        &self,
        segment: &str,
        id: &SessionId,
    ) -> Result<Option<SessionRecord<Profile>>, Self::Error>;

    /// Delete all entries of the segment.
    async fn clear(&self, segment: &str) -> Result<(), Self::Error>;
}
