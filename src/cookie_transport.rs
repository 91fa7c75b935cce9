use crate::config::{CookieConfig, SameSitePolicy};
use crate::error::ConfigError;
use crate::session::SessionToken;
use cookie::{Cookie, CookieJar, Key, SameSite};
use http::header::COOKIE;
use http::HeaderMap;
use serde::Deserialize;
use std::fmt::{Debug, Formatter};
use std::time::Duration;

/// The minimum length of the secret the cookie encryption key is derived from.
pub const MINIMUM_COOKIE_SECRET_LENGTH: usize = 32;

/// What a request's cookies say about its session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CookieRead {
    /// The request carries no session cookie.
    Absent,
    /// A session cookie is present, but it fails the integrity check or does not hold a session token.
    Malformed,
    /// The session cookie carries this token.
    Present(SessionToken),
}

/// Reads and writes the tamper-evident cookie carrying the session token.
pub trait CookieTransport: Debug + Send + Sync {
    /// Extract the session token from the request headers.
    fn read(&self, headers: &HeaderMap) -> CookieRead;

    /// Build the cookie that hands `token` to the client.
    /// Returns `None` if no cookie can be built for the token.
    fn issue(&self, token: &SessionToken) -> Option<Cookie<'static>>;

    /// Build a cookie that deletes the session cookie on the client.
    fn removal(&self) -> Cookie<'static>;
}

#[derive(Deserialize)]
struct CookiePayload {
    sid: String,
}

/// A cookie transport that encrypts and authenticates the payload `{"sid": <token>}`
/// with a key derived from a server-held secret.
#[derive(Clone)]
pub struct PrivateCookieTransport {
    name: String,
    key: Key,
    secure: bool,
    same_site: SameSite,
    path: String,
    max_age: Duration,
}

impl PrivateCookieTransport {
    /// Create a transport for the cookie `name`, deriving the encryption key from `secret`.
    ///
    /// The cookie defaults to `HttpOnly; Secure; SameSite=Lax; Path=/` and has the given max-age,
    /// which should not exceed the session ttl.
    pub fn new(name: impl Into<String>, secret: &[u8], max_age: Duration) -> Result<Self, ConfigError> {
        let name = name.into();
        check_cookie_name(&name)?;
        if secret.len() < MINIMUM_COOKIE_SECRET_LENGTH {
            return Err(ConfigError::CookieSecretTooShort {
                minimum: MINIMUM_COOKIE_SECRET_LENGTH,
                actual: secret.len(),
            });
        }

        Ok(Self {
            name,
            key: Key::derive_from(secret),
            secure: true,
            same_site: SameSite::Lax,
            path: "/".to_owned(),
            max_age,
        })
    }

    /// Create a transport from the cookie section of the configuration.
    /// `session_ttl` is used as max-age unless the configuration sets one.
    pub fn from_config(config: &CookieConfig, session_ttl: Duration) -> Result<Self, ConfigError> {
        let max_age = config.max_age().unwrap_or(session_ttl);
        Self::new(config.name.clone(), config.password.as_bytes(), max_age)?
            .secure(config.is_secure)
            .same_site(config.same_site)
            .path(config.path.clone())
    }

    /// Set whether the cookie is only sent over https.
    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Set the `SameSite` attribute of the cookie.
    pub fn same_site(mut self, same_site: SameSitePolicy) -> Self {
        self.same_site = same_site.into();
        self
    }

    /// Set the `Path` attribute of the cookie.
    pub fn path(mut self, path: impl Into<String>) -> Result<Self, ConfigError> {
        let path = path.into();
        check_cookie_path(&path)?;
        self.path = path;
        Ok(self)
    }

    /// The name of the session cookie.
    pub fn name(&self) -> &str {
        &self.name
    }

    fn base_cookie(&self, value: String) -> Cookie<'static> {
        Cookie::build((self.name.clone(), value))
            .http_only(true)
            .secure(self.secure)
            .same_site(self.same_site)
            .path(self.path.clone())
            .max_age(max_age(self.max_age))
            .build()
    }
}

fn max_age(duration: Duration) -> cookie::time::Duration {
    cookie::time::Duration::try_from(duration).unwrap_or(cookie::time::Duration::MAX)
}

/// Cookie names are RFC 6265 tokens: visible ascii without separators.
pub(crate) fn check_cookie_name(name: &str) -> Result<(), ConfigError> {
    const SEPARATORS: &[u8] = b"()<>@,;:\\\"/[]?={}";
    if !name.is_empty()
        && name
            .bytes()
            .all(|byte| byte.is_ascii_graphic() && !SEPARATORS.contains(&byte))
    {
        Ok(())
    } else {
        Err(ConfigError::InvalidCookieAttribute {
            field: "name",
            value: name.to_owned(),
        })
    }
}

/// Paths may not end the attribute early, so no `;`, whitespace or control characters.
pub(crate) fn check_cookie_path(path: &str) -> Result<(), ConfigError> {
    if !path.is_empty() && path.bytes().all(|byte| byte.is_ascii_graphic() && byte != b';') {
        Ok(())
    } else {
        Err(ConfigError::InvalidCookieAttribute {
            field: "path",
            value: path.to_owned(),
        })
    }
}

fn payload_token(value: &str) -> Option<SessionToken> {
    serde_json::from_str::<CookiePayload>(value)
        .ok()
        .and_then(|payload| SessionToken::parse(&payload.sid))
}

impl CookieTransport for PrivateCookieTransport {
    fn read(&self, headers: &HeaderMap) -> CookieRead {
        let jar = CookieJar::new();
        let private = jar.private(&self.key);
        let mut candidates = 0usize;

        // Duplicates under the session name are tried in the order the client sent them.
        for header in headers.get_all(COOKIE) {
            let Ok(header) = header.to_str() else {
                continue;
            };
            for cookie in Cookie::split_parse(header).flatten() {
                if cookie.name() != self.name {
                    continue;
                }
                candidates += 1;
                if let Some(token) = private
                    .decrypt(cookie.into_owned())
                    .and_then(|cookie| payload_token(cookie.value()))
                {
                    return CookieRead::Present(token);
                }
            }
        }

        if candidates == 0 {
            CookieRead::Absent
        } else {
            log::debug!("None of {candidates} session cookies carries an authentic session token");
            CookieRead::Malformed
        }
    }

    fn issue(&self, token: &SessionToken) -> Option<Cookie<'static>> {
        let payload = serde_json::json!({ "sid": token.as_str() }).to_string();
        let mut jar = CookieJar::new();
        jar.private_mut(&self.key).add(self.base_cookie(payload));
        jar.get(&self.name).cloned()
    }

    fn removal(&self) -> Cookie<'static> {
        let mut cookie = self.base_cookie(String::new());
        cookie.make_removal();
        cookie
    }
}

impl Debug for PrivateCookieTransport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrivateCookieTransport")
            .field("name", &self.name)
            .field("key", &"<redacted>")
            .field("secure", &self.secure)
            .field("same_site", &self.same_site)
            .field("path", &self.path)
            .field("max_age", &self.max_age)
            .finish()
    }
}
