use crate::session::SessionToken;
use crate::session_store::{SessionStore, SessionStoreConnector};
use crate::Error;

/// The outcome of validating a session token.
///
/// A missing or expired session is [`Invalid`](Self::Invalid), which is an expected outcome.
/// A failing backend is [`Error`](Self::Error), which callers must not confuse with "not authenticated".
#[derive(Debug)]
#[must_use]
pub enum AuthenticationDecision<Profile, SessionStoreConnectorError> {
    /// The session is live and belongs to this identity.
    Valid(Profile),
    /// No cookie, a malformed token, or a session that is expired, evicted or was never issued.
    /// These cases are deliberately indistinguishable to the client.
    Invalid,
    /// The session store failed, so the validity of the session is unknown.
    Error(Error<SessionStoreConnectorError>),
}

impl<Profile, SessionStoreConnectorError> AuthenticationDecision<Profile, SessionStoreConnectorError> {
    /// Returns true if the decision is [`Valid`](Self::Valid).
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }

    /// Returns true if the decision is [`Invalid`](Self::Invalid).
    pub fn is_invalid(&self) -> bool {
        matches!(self, Self::Invalid)
    }

    /// Returns true if the decision is [`Error`](Self::Error).
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// Returns the identity if the decision is [`Valid`](Self::Valid).
    pub fn into_profile(self) -> Option<Profile> {
        match self {
            Self::Valid(profile) => Some(profile),
            Self::Invalid | Self::Error(_) => None,
        }
    }

    /// Converts the decision into a result, where an invalid session is `Ok(None)`.
    pub fn into_result(self) -> Result<Option<Profile>, Error<SessionStoreConnectorError>> {
        match self {
            Self::Valid(profile) => Ok(Some(profile)),
            Self::Invalid => Ok(None),
            Self::Error(error) => Err(error),
        }
    }
}

/// Resolves session tokens presented by clients to identities.
///
/// Validation is a pure lookup: it never creates, extends or deletes sessions,
/// apart from the store evicting entries it finds expired.
#[derive(Debug)]
pub struct SessionValidator<Profile, Connector> {
    store: SessionStore<Profile, Connector>,
}

impl<Profile, Connector> Clone for SessionValidator<Profile, Connector> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<Profile, Connector> SessionValidator<Profile, Connector>
where
    Profile: Send + 'static,
    Connector: SessionStoreConnector<Profile>,
{
    /// Create a validator reading from the given store.
    pub fn new(store: SessionStore<Profile, Connector>) -> Self {
        Self { store }
    }

    /// Returns the store this validator reads from.
    pub fn store(&self) -> &SessionStore<Profile, Connector> {
        &self.store
    }

    /// Validate the raw session identifier taken from a cookie.
    ///
    /// An empty value or one that does not have the shape of an issued token is
    /// [`Invalid`](AuthenticationDecision::Invalid) without a store round-trip.
    pub async fn validate(
        &self,
        session_identifier: &str,
    ) -> AuthenticationDecision<Profile, Connector::Error> {
        if session_identifier.is_empty() {
            log::debug!("No session identifier presented");
            return AuthenticationDecision::Invalid;
        }

        match SessionToken::parse(session_identifier) {
            Some(token) => self.validate_token(&token).await,
            None => {
                log::debug!("Rejected malformed session identifier");
                AuthenticationDecision::Invalid
            }
        }
    }

    /// Validate a parsed session token.
    pub async fn validate_token(
        &self,
        token: &SessionToken,
    ) -> AuthenticationDecision<Profile, Connector::Error> {
        let id = token.session_id();
        match self.store.get(&id).await {
            Ok(Some(record)) => AuthenticationDecision::Valid(record.into_profile()),
            Ok(None) => {
                log::debug!("No live session {id:?}");
                AuthenticationDecision::Invalid
            }
            Err(error) => {
                log::warn!("Could not validate session {id:?}: {error}");
                AuthenticationDecision::Error(error)
            }
        }
    }
}
