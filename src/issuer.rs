use crate::session::{SessionRecord, SessionToken};
use crate::session_store::{SessionStore, SessionStoreConnector};
use crate::{DefaultSessionTokenGenerator, Error, SessionTokenGenerator};
use std::sync::Arc;
use std::time::Duration;

/// Mints new sessions for authenticated identities.
///
/// The issuer writes the session record first and only then hands out the token.
/// If the store write fails, no token exists, so no cookie can ever point to a missing session.
#[derive(Debug)]
pub struct SessionIssuer<Profile, Connector, Generator = DefaultSessionTokenGenerator> {
    store: SessionStore<Profile, Connector>,
    generator: Arc<Generator>,
    ttl: Duration,
}

impl<Profile, Connector, Generator> Clone for SessionIssuer<Profile, Connector, Generator> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            generator: self.generator.clone(),
            ttl: self.ttl,
        }
    }
}

impl<Profile, Connector> SessionIssuer<Profile, Connector>
where
    Profile: Send + 'static,
    Connector: SessionStoreConnector<Profile>,
{
    /// Create an issuer writing to the given store, generating tokens with the [`DefaultSessionTokenGenerator`].
    pub fn new(store: SessionStore<Profile, Connector>) -> Self {
        Self::with_generator(store, DefaultSessionTokenGenerator)
    }
}

impl<Profile, Connector, Generator> SessionIssuer<Profile, Connector, Generator>
where
    Profile: Send + 'static,
    Connector: SessionStoreConnector<Profile>,
    Generator: SessionTokenGenerator,
{
    /// Create an issuer writing to the given store, generating tokens with the given generator.
    pub fn with_generator(store: SessionStore<Profile, Connector>, generator: Generator) -> Self {
        Self {
            store,
            generator: Arc::new(generator),
            // Zero lets the store apply its default ttl.
            ttl: Duration::ZERO,
        }
    }

    /// Issue sessions with the given ttl instead of the store's default ttl.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Returns the store this issuer writes to.
    pub fn store(&self) -> &SessionStore<Profile, Connector> {
        &self.store
    }

    /// Create a new session for `profile`.
    ///
    /// On success, the returned token identifies a session that is already readable from the store,
    /// and should be handed to the cookie transport.
    /// On failure, nothing was stored and no cookie must be set.
    pub async fn issue(&self, profile: Profile) -> Result<SessionToken, Error<Connector::Error>> {
        let token = self.generator.generate_token();
        let id = token.session_id();
        let record = SessionRecord::new(id.clone(), profile, self.store.now());

        match self.store.put(&id, record, self.ttl).await {
            Ok(()) => {
                log::info!("Issued session {id:?}");
                Ok(token)
            }
            Err(error) => {
                log::warn!("Could not issue session: {error}");
                Err(error)
            }
        }
    }
}
