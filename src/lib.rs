//! Cookie-backed server-side sessions for federated logins.
//!
//! This crate sits behind a third-party login flow (OAuth, OpenID Connect).
//! Once the identity provider has verified a user, a session is minted:
//! an unguessable token is generated, a record holding the identity profile is written into a
//! session store under the token's hash, and the token is handed to the client in an encrypted cookie.
//! Subsequent requests are authenticated by looking the token up in the store.
//! The cookie alone is never proof of a valid session.
//!
//! # Authentication decisions
//!
//! Validation has three outcomes, see [`AuthenticationDecision`]:
//! a live session yields the identity, a missing, expired or forged session is `Invalid`,
//! and a failing store is an `Error`. The latter must never be treated as "not authenticated".
//!
//! # Security
//!
//! Tokens are 64 alphanumeric characters drawn from a cryptographically secure generator.
//! The store only ever sees their blake3 hash, so a leaked store does not leak usable cookies.
//! The cookie is encrypted and authenticated with a key derived from a server-held secret.
//!
//! # Example
//!
//! ```
//! use federated_session::{AuthenticationDecision, MemoryStore, SessionIssuer, SessionStore, SessionValidator};
//!
//! # fn main() -> Result<(), federated_session::Error<std::convert::Infallible>> {
//! # async_std::task::block_on(async {
//! // Init a new session store. Issuer and validator share it.
//! let store: SessionStore<String, MemoryStore<String>> = SessionStore::new(MemoryStore::new());
//! let issuer = SessionIssuer::new(store.clone());
//! let validator = SessionValidator::new(store);
//!
//! // After the identity provider verified the user, issue a session.
//! // The token is what the cookie carries.
//! let token = issuer.issue("alice".to_owned()).await?;
//!
//! // Later requests present the token again.
//! let AuthenticationDecision::Valid(profile) = validator.validate(token.as_str()).await else {
//!     unreachable!("Freshly issued sessions are valid")
//! };
//! assert_eq!(profile, "alice");
//! assert!(validator.validate("not-a-real-sid").await.is_invalid());
//! #
//! # Ok(()) }) }
//! ```

#![forbid(unsafe_code)]
#![deny(
    future_incompatible,
    missing_debug_implementations,
    nonstandard_style,
    missing_docs,
    unreachable_pub,
    missing_copy_implementations,
    unused_qualifications
)]

mod assertion;
mod clock;
mod config;
mod cookie_transport;
mod error;
mod gate;
mod issuer;
mod memory_store;
mod session;
mod session_store;
mod validator;

pub use assertion::{IdentityAssertionReceiver, VerifiedIdentity};
pub use clock::{Clock, MockClock, SystemClock};
pub use config::{CacheConfig, CookieConfig, SameSitePolicy, SessionConfig};
pub use cookie_transport::{
    CookieRead, CookieTransport, PrivateCookieTransport, MINIMUM_COOKIE_SECRET_LENGTH,
};
pub use error::{ConfigError, Error};
pub use gate::{error_response, LoginOutcome, RouteDecision, SessionGate};
pub use issuer::SessionIssuer;
pub use memory_store::MemoryStore;
pub use session::{SessionId, SessionIdType, SessionRecord, SessionToken, SESSION_TOKEN_LENGTH};
pub use session_store::token_generator::{
    DebugSessionTokenGenerator, DefaultSessionTokenGenerator, SessionTokenGenerator,
};
pub use session_store::{SessionStore, SessionStoreConnector, DEFAULT_SEGMENT, DEFAULT_TTL};
pub use validator::{AuthenticationDecision, SessionValidator};

/// The cookie crate, re-exported for access to [`Cookie`](cookie::Cookie).
pub use cookie;
