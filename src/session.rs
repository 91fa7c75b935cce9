use chrono::{DateTime, Utc};
use std::fmt::{Debug, Formatter};

/// The length of a session token, in characters.
///
/// Tokens are drawn from the 62 ASCII alphanumerics, which gives `64 * log_2(62) ≥ 381` bits
/// of entropy per token.
pub const SESSION_TOKEN_LENGTH: usize = 64;

/// The opaque, unguessable value carried by the session cookie.
///
/// The token is sensitive: whoever holds it is authenticated as the owner of the session.
/// Its `Debug` output is therefore redacted, and the session store never sees it.
/// The store is keyed by the token's hash, the [`SessionId`].
#[derive(Clone, Eq, PartialEq, Hash)]
pub struct SessionToken(String);

/// The type of a session id.
pub type SessionIdType = [u8; blake3::OUT_LEN];

/// The key under which a session is stored.
/// It is the blake3 hash of the [`SessionToken`] presented by the client.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct SessionId(Box<SessionIdType>);

/// A server-side session, as owned by the session store.
///
/// The cookie only ever carries the [`SessionToken`]. The identity profile stays on the server.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionRecord<Profile> {
    /// The id this record is stored under.
    pub id: SessionId,
    /// The identity profile reported by the identity provider.
    pub profile: Profile,
    /// When the session was issued.
    pub created_at: DateTime<Utc>,
}

impl SessionToken {
    /// Parse a token presented by a client.
    ///
    /// Returns `None` if the value cannot have been issued by this crate, i.e. if it is not
    /// exactly [`SESSION_TOKEN_LENGTH`] ASCII alphanumeric characters.
    pub fn parse(value: &str) -> Option<Self> {
        if value.len() == SESSION_TOKEN_LENGTH && value.bytes().all(|b| b.is_ascii_alphanumeric())
        {
            Some(Self(value.to_owned()))
        } else {
            None
        }
    }

    /// Wrap a freshly generated value.
    /// Only token generators should call this.
    pub(crate) fn from_generated(value: String) -> Self {
        debug_assert_eq!(value.len(), SESSION_TOKEN_LENGTH);
        Self(value)
    }

    /// The token as it is written into the cookie.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The id under which the session of this token is stored.
    pub fn session_id(&self) -> SessionId {
        SessionId::from_token(self)
    }
}

impl Debug for SessionToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "SessionToken(<redacted>)")
    }
}

impl SessionId {
    /// Applies a cryptographic hash function on a session token to obtain the session id for that token.
    ///
    /// Stores only ever see ids, so a leaked store does not leak usable cookies.
    pub fn from_token(token: &SessionToken) -> Self {
        let hash = blake3::hash(token.as_str().as_bytes());
        Self(Box::new(hash.into()))
    }

    /// The raw hash bytes.
    pub fn as_bytes(&self) -> &SessionIdType {
        &self.0
    }
}

impl From<SessionId> for SessionIdType {
    fn from(id: SessionId) -> Self {
        *id.0
    }
}

impl Debug for SessionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "SessionId(")?;
        for byte in self.0.iter() {
            write!(f, "{byte:02x}")?;
        }
        write!(f, ")")
    }
}

impl<Profile> SessionRecord<Profile> {
    /// Create a record for a session issued at `created_at`.
    pub fn new(id: SessionId, profile: Profile, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            profile,
            created_at,
        }
    }

    /// Consume the record, returning the identity profile.
    pub fn into_profile(self) -> Profile {
        self.profile
    }
}
