use crate::assertion::{IdentityAssertionReceiver, VerifiedIdentity};
use crate::config::{redirect_header, SessionConfig};
use crate::cookie_transport::{CookieRead, CookieTransport, PrivateCookieTransport};
use crate::error::ConfigError;
use crate::issuer::SessionIssuer;
use crate::session_store::{SessionStore, SessionStoreConnector};
use crate::validator::{AuthenticationDecision, SessionValidator};
use crate::{DefaultSessionTokenGenerator, Error, SessionTokenGenerator};
use cookie::Cookie;
use http::header::{LOCATION, SET_COOKIE};
use http::{HeaderMap, HeaderValue, Response, StatusCode};

/// The decision for a request to a protected route.
#[derive(Debug)]
#[must_use]
pub enum RouteDecision<Profile, SessionStoreConnectorError> {
    /// The request carries a live session. The identity is handed to the route handler.
    Authorized(Profile),
    /// The request carries no live session and is sent to the login url.
    RedirectToLogin(HeaderValue),
    /// The session store failed. The request must fail with a server error.
    ErrorResponse(Error<SessionStoreConnectorError>),
}

impl<Profile, SessionStoreConnectorError> RouteDecision<Profile, SessionStoreConnectorError> {
    /// Returns the identity for authorized requests,
    /// and the response to send for all others.
    pub fn into_result(self) -> Result<Profile, Response<()>> {
        match self {
            Self::Authorized(profile) => Ok(profile),
            Self::RedirectToLogin(location) => Err(redirect(location, None)),
            Self::ErrorResponse(_) => Err(error_response()),
        }
    }
}

/// The outcome of a login callback.
#[derive(Debug)]
#[must_use]
pub enum LoginOutcome<SessionStoreConnectorError> {
    /// A session was stored. The client receives the cookie and is sent to the landing page.
    Established {
        /// The session cookie to set.
        cookie: Cookie<'static>,
        /// The landing page.
        location: HeaderValue,
    },
    /// No session could be stored. No cookie is set.
    Failed(Error<SessionStoreConnectorError>),
}

impl<SessionStoreConnectorError> LoginOutcome<SessionStoreConnectorError> {
    /// The response to send to the client.
    pub fn into_response(self) -> Response<()> {
        match self {
            Self::Established { cookie, location } => redirect(location, Some(&cookie)),
            Self::Failed(_) => error_response(),
        }
    }
}

/// Ties issuance, validation and the cookie transport together into the
/// login-callback and protected-route contracts.
#[derive(Debug)]
pub struct SessionGate<
    Profile,
    Connector,
    Transport = PrivateCookieTransport,
    Generator = DefaultSessionTokenGenerator,
> {
    receiver: IdentityAssertionReceiver<Profile, Connector, Generator>,
    validator: SessionValidator<Profile, Connector>,
    transport: Transport,
    login_location: HeaderValue,
    landing_location: HeaderValue,
}

impl<Profile, Connector> SessionGate<Profile, Connector>
where
    Profile: Send + 'static,
    Connector: SessionStoreConnector<Profile>,
{
    /// Build the session layer described by `config` on top of `connector`.
    pub fn from_config(connector: Connector, config: &SessionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let store = SessionStore::new(connector)
            .with_segment(config.cache.segment.as_str())
            .with_default_ttl(config.ttl());
        let transport = PrivateCookieTransport::from_config(&config.cookie, config.ttl())?;

        Self::new(
            SessionIssuer::new(store.clone()),
            SessionValidator::new(store),
            transport,
            &config.redirect_to,
            &config.landing_page,
        )
    }
}

impl<Profile, Connector, Transport, Generator> SessionGate<Profile, Connector, Transport, Generator>
where
    Profile: Send + 'static,
    Connector: SessionStoreConnector<Profile>,
    Transport: CookieTransport,
    Generator: SessionTokenGenerator,
{
    /// Create a gate from its parts.
    /// `login_url` and `landing_page` must be valid `Location` header values.
    pub fn new(
        issuer: SessionIssuer<Profile, Connector, Generator>,
        validator: SessionValidator<Profile, Connector>,
        transport: Transport,
        login_url: &str,
        landing_page: &str,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            receiver: IdentityAssertionReceiver::new(issuer),
            validator,
            transport,
            login_location: redirect_header("redirectTo", login_url)?,
            landing_location: redirect_header("landingPage", landing_page)?,
        })
    }

    /// Returns the session validator.
    pub fn validator(&self) -> &SessionValidator<Profile, Connector> {
        &self.validator
    }

    /// Returns the cookie transport.
    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    /// Decide whether a request to a protected route may proceed.
    pub async fn authorize(
        &self,
        headers: &HeaderMap,
    ) -> RouteDecision<Profile, Connector::Error> {
        let token = match self.transport.read(headers) {
            CookieRead::Present(token) => token,
            CookieRead::Absent | CookieRead::Malformed => {
                return RouteDecision::RedirectToLogin(self.login_location.clone());
            }
        };

        match self.validator.validate_token(&token).await {
            AuthenticationDecision::Valid(profile) => RouteDecision::Authorized(profile),
            AuthenticationDecision::Invalid => {
                RouteDecision::RedirectToLogin(self.login_location.clone())
            }
            AuthenticationDecision::Error(error) => RouteDecision::ErrorResponse(error),
        }
    }

    /// Handle a successful third-party login.
    ///
    /// The cookie is only produced once the session is stored,
    /// and the session is discarded again if no sendable cookie can be produced for it.
    pub async fn complete_login<Credentials>(
        &self,
        identity: VerifiedIdentity<Profile, Credentials>,
    ) -> LoginOutcome<Connector::Error> {
        let token = match self.receiver.receive(identity).await {
            Ok(token) => token,
            Err(error) => return LoginOutcome::Failed(error),
        };

        match self
            .transport
            .issue(&token)
            .filter(|cookie| set_cookie_header(cookie).is_some())
        {
            Some(cookie) => LoginOutcome::Established {
                cookie,
                location: self.landing_location.clone(),
            },
            None => {
                let id = token.session_id();
                log::warn!("No session cookie can be sent for session {id:?}, discarding it");
                match self.receiver.issuer().store().remove(&id).await {
                    Ok(_) => LoginOutcome::Failed(Error::CookieNotEncodable),
                    Err(error) => LoginOutcome::Failed(error),
                }
            }
        }
    }

    /// Invalidate the session of the request, if any, and clear the cookie.
    ///
    /// Returns a redirect to the landing page that deletes the session cookie.
    pub async fn logout(&self, headers: &HeaderMap) -> Result<Response<()>, Error<Connector::Error>> {
        if let CookieRead::Present(token) = self.transport.read(headers) {
            let id = token.session_id();
            if self.validator.store().remove(&id).await?.is_some() {
                log::info!("Removed session {id:?}");
            }
        }

        Ok(redirect(
            self.landing_location.clone(),
            Some(&self.transport.removal()),
        ))
    }
}

fn redirect(location: HeaderValue, set_cookie: Option<&Cookie<'_>>) -> Response<()> {
    let mut response = Response::new(());
    *response.status_mut() = StatusCode::FOUND;
    response.headers_mut().insert(LOCATION, location);

    if let Some(cookie) = set_cookie {
        match set_cookie_header(cookie) {
            Some(value) => {
                response.headers_mut().append(SET_COOKIE, value);
            }
            None => {
                log::warn!("Session cookie is not a valid header value");
                return error_response();
            }
        }
    }
    response
}

fn set_cookie_header(cookie: &Cookie<'_>) -> Option<HeaderValue> {
    HeaderValue::from_str(&cookie.to_string()).ok()
}

/// An empty `500 Internal Server Error` response.
pub fn error_response() -> Response<()> {
    let mut response = Response::new(());
    *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    response
}
