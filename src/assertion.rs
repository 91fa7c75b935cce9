use crate::issuer::SessionIssuer;
use crate::session::SessionToken;
use crate::session_store::SessionStoreConnector;
use crate::{Error, SessionTokenGenerator};
use std::fmt::{Debug, Formatter};

/// The result of a successful third-party login, as reported by the OAuth collaborator.
///
/// The provider credentials (access tokens, secrets) are only carried through the login callback.
/// They are dropped when the assertion is received and are never written to the session store.
pub struct VerifiedIdentity<Profile, Credentials> {
    /// The identity profile reported by the identity provider.
    pub profile: Profile,
    /// The raw provider credentials.
    pub credentials: Credentials,
}

impl<Profile: Debug, Credentials> Debug for VerifiedIdentity<Profile, Credentials> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerifiedIdentity")
            .field("profile", &self.profile)
            .field("credentials", &"<redacted>")
            .finish()
    }
}

impl<Profile, Credentials> VerifiedIdentity<Profile, Credentials> {
    /// Bundle a verified profile with the provider credentials it was obtained with.
    pub fn new(profile: Profile, credentials: Credentials) -> Self {
        Self {
            profile,
            credentials,
        }
    }
}

/// Receives verified identities from the OAuth collaborator and turns them into sessions.
#[derive(Debug)]
pub struct IdentityAssertionReceiver<Profile, Connector, Generator> {
    issuer: SessionIssuer<Profile, Connector, Generator>,
}

impl<Profile, Connector, Generator> Clone
    for IdentityAssertionReceiver<Profile, Connector, Generator>
{
    fn clone(&self) -> Self {
        Self {
            issuer: self.issuer.clone(),
        }
    }
}

impl<Profile, Connector, Generator> IdentityAssertionReceiver<Profile, Connector, Generator>
where
    Profile: Send + 'static,
    Connector: SessionStoreConnector<Profile>,
    Generator: SessionTokenGenerator,
{
    /// Create a receiver forwarding to the given issuer.
    pub fn new(issuer: SessionIssuer<Profile, Connector, Generator>) -> Self {
        Self { issuer }
    }

    /// Returns the issuer sessions are created with.
    pub fn issuer(&self) -> &SessionIssuer<Profile, Connector, Generator> {
        &self.issuer
    }

    /// Issue a session for the asserted identity.
    /// Only the profile is forwarded; the credentials are dropped.
    pub async fn receive<Credentials>(
        &self,
        identity: VerifiedIdentity<Profile, Credentials>,
    ) -> Result<SessionToken, Error<Connector::Error>> {
        let VerifiedIdentity {
            profile,
            credentials,
        } = identity;
        drop(credentials);

        self.issuer.issue(profile).await
    }
}
