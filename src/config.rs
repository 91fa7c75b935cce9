use crate::cookie_transport::{check_cookie_name, check_cookie_path, MINIMUM_COOKIE_SECRET_LENGTH};
use crate::error::ConfigError;
use crate::session_store::{DEFAULT_SEGMENT, DEFAULT_TTL};
use cookie::SameSite;
use http::HeaderValue;
use serde::Deserialize;
use std::time::Duration;

/// Configuration of the session layer.
///
/// Keys are camelCase, e.g.
///
/// ```json
/// {
///   "cache": { "segment": "sessions", "expiresIn": 259200000 },
///   "cookie": { "name": "sid", "password": "a-secret-of-at-least-32-bytes....", "isSecure": false },
///   "redirectTo": "/user/login/twitter",
///   "landingPage": "/"
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionConfig {
    /// The session store settings.
    #[serde(default)]
    pub cache: CacheConfig,
    /// The session cookie settings.
    pub cookie: CookieConfig,
    /// Where clients without a valid session are redirected to.
    #[serde(default = "default_redirect_to")]
    pub redirect_to: String,
    /// Where clients are redirected to after logging in.
    #[serde(default = "default_landing_page")]
    pub landing_page: String,
}

/// Configuration of the session store.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CacheConfig {
    /// The logical namespace of session entries.
    pub segment: String,
    /// The default session ttl, in milliseconds.
    pub expires_in: u64,
}

/// Configuration of the session cookie.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CookieConfig {
    /// The cookie name.
    #[serde(default = "default_cookie_name")]
    pub name: String,
    /// The secret the cookie encryption key is derived from.
    pub password: String,
    /// Whether the cookie is only sent over https.
    #[serde(default = "default_true")]
    pub is_secure: bool,
    /// The `SameSite` attribute of the cookie.
    #[serde(default)]
    pub same_site: SameSitePolicy,
    /// The `Path` attribute of the cookie.
    #[serde(default = "default_path")]
    pub path: String,
    /// The cookie max-age in milliseconds. Defaults to the session ttl.
    #[serde(default)]
    pub max_age: Option<u64>,
}

/// The `SameSite` cookie attribute.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum SameSitePolicy {
    /// Only sent with same-site requests.
    Strict,
    /// Also sent with top-level cross-site navigations.
    /// Required for the redirect back from the identity provider to carry the cookie.
    #[default]
    Lax,
    /// Sent with all requests. Browsers require the cookie to be `Secure`.
    None,
}

impl SessionConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration for values that would break the session layer at runtime.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache.expires_in == 0 {
            return Err(ConfigError::ZeroTtl);
        }
        if self.cookie.password.len() < MINIMUM_COOKIE_SECRET_LENGTH {
            return Err(ConfigError::CookieSecretTooShort {
                minimum: MINIMUM_COOKIE_SECRET_LENGTH,
                actual: self.cookie.password.len(),
            });
        }
        check_cookie_name(&self.cookie.name)?;
        check_cookie_path(&self.cookie.path)?;
        if let Some(max_age_ms) = self.cookie.max_age {
            if max_age_ms > self.cache.expires_in {
                return Err(ConfigError::CookieOutlivesSession {
                    max_age_ms,
                    ttl_ms: self.cache.expires_in,
                });
            }
        }
        redirect_header("redirectTo", &self.redirect_to)?;
        redirect_header("landingPage", &self.landing_page)?;
        Ok(())
    }

    /// The default session ttl.
    pub fn ttl(&self) -> Duration {
        self.cache.ttl()
    }
}

impl CacheConfig {
    /// The default session ttl.
    pub fn ttl(&self) -> Duration {
        Duration::from_millis(self.expires_in)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            segment: DEFAULT_SEGMENT.to_owned(),
            expires_in: u64::try_from(DEFAULT_TTL.as_millis()).unwrap_or(u64::MAX),
        }
    }
}

impl CookieConfig {
    /// The cookie max-age, if configured.
    pub fn max_age(&self) -> Option<Duration> {
        self.max_age.map(Duration::from_millis)
    }
}

impl std::fmt::Debug for CookieConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CookieConfig")
            .field("name", &self.name)
            .field("password", &"<redacted>")
            .field("is_secure", &self.is_secure)
            .field("same_site", &self.same_site)
            .field("path", &self.path)
            .field("max_age", &self.max_age)
            .finish()
    }
}

impl From<SameSitePolicy> for SameSite {
    fn from(policy: SameSitePolicy) -> Self {
        match policy {
            SameSitePolicy::Strict => SameSite::Strict,
            SameSitePolicy::Lax => SameSite::Lax,
            SameSitePolicy::None => SameSite::None,
        }
    }
}

pub(crate) fn redirect_header(field: &'static str, value: &str) -> Result<HeaderValue, ConfigError> {
    HeaderValue::from_str(value).map_err(|_| ConfigError::InvalidRedirect {
        field,
        value: value.to_owned(),
    })
}

fn default_redirect_to() -> String {
    "/user/login".to_owned()
}

fn default_landing_page() -> String {
    "/".to_owned()
}

fn default_cookie_name() -> String {
    "sid".to_owned()
}

fn default_path() -> String {
    "/".to_owned()
}

fn default_true() -> bool {
    true
}
