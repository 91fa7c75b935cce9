use std::time::Duration;

/// Errors raised while issuing, validating or removing sessions.
///
/// A session that does not exist (expired, evicted, forged) is *not* an error.
/// It surfaces as [`AuthenticationDecision::Invalid`](crate::AuthenticationDecision::Invalid).
#[derive(Debug, thiserror::Error)]
pub enum Error<SessionStoreConnectorError> {
    /// The session store backend is unreachable or failed.
    /// Callers must treat this as a transient server fault, never as "not authenticated".
    #[error("session store unavailable: {0}")]
    StoreUnavailable(SessionStoreConnectorError),

    /// The requested time-to-live cannot be represented as an expiry timestamp.
    #[error("a ttl of {ttl:?} is too large to compute an expiry timestamp")]
    TtlOutOfRange {
        /// The ttl that was requested.
        ttl: Duration,
    },

    /// The cookie transport produced no session cookie that can be sent as a `Set-Cookie` header.
    /// The session that was stored for it has been discarded.
    #[error("the session cookie cannot be sent as a header value")]
    CookieNotEncodable,
}

impl<SessionStoreConnectorError> From<SessionStoreConnectorError>
    for Error<SessionStoreConnectorError>
{
    fn from(error: SessionStoreConnectorError) -> Self {
        Self::StoreUnavailable(error)
    }
}

impl<SessionStoreConnectorError> Error<SessionStoreConnectorError> {
    /// Returns true if the error was caused by the session store backend.
    pub fn is_store_unavailable(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_))
    }
}

/// Errors found while validating a [`SessionConfig`](crate::SessionConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration is not valid JSON or misses required fields.
    #[error("could not parse session configuration: {0}")]
    Parse(#[from] serde_json::Error),

    /// Sessions must live for a positive amount of time.
    #[error("the default session ttl (`expiresIn`) must be greater than zero")]
    ZeroTtl,

    /// The cookie encryption secret is too short to derive a key from.
    #[error("the cookie password has length {actual}, but must have at least {minimum} bytes")]
    CookieSecretTooShort {
        /// The minimum number of bytes.
        minimum: usize,
        /// The actual number of bytes.
        actual: usize,
    },

    /// The cookie would outlive the session it points to.
    #[error("the cookie max-age of {max_age_ms}ms exceeds the session ttl of {ttl_ms}ms")]
    CookieOutlivesSession {
        /// The configured cookie max-age in milliseconds.
        max_age_ms: u64,
        /// The configured session ttl in milliseconds.
        ttl_ms: u64,
    },

    /// A redirect target cannot be sent as a `Location` header.
    #[error("`{field}` is not a valid header value: {value:?}")]
    InvalidRedirect {
        /// The name of the configuration field.
        field: &'static str,
        /// The rejected value.
        value: String,
    },

    /// The cookie name or path would break the `Set-Cookie` header, or inject attributes into it.
    #[error("`cookie.{field}` cannot be used in a cookie: {value:?}")]
    InvalidCookieAttribute {
        /// The name of the configuration field.
        field: &'static str,
        /// The rejected value.
        value: String,
    },
}

mod expect_impl_error {
    trait ExpectImplError: std::error::Error {}

    impl<SessionStoreConnectorError: std::error::Error> ExpectImplError
        for super::Error<SessionStoreConnectorError>
    {
    }

    impl ExpectImplError for super::ConfigError {}
}
