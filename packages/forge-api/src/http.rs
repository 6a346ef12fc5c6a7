//! Authenticated HTTP session for the hosting API.

use std::fmt;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Client, Method, RequestBuilder};
use serde::Deserialize;

use crate::error::{ForgeError, Result};

/// User agent string identifying this client.
const USER_AGENT: &str = concat!("forgeflow/", env!("CARGO_PKG_VERSION"));

/// Media type requesting the v3 JSON representation.
pub const ACCEPT_V3_JSON: &str = "application/vnd.github.v3+json";

/// HTTP timeout in seconds.
pub const HTTP_TIMEOUT_SECS: u64 = 30;

/// User name and personal access token.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    user: String,
    token: String,
}

impl Credentials {
    pub fn new(user: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            token: token.into(),
        }
    }

    pub fn user(&self) -> &str {
        &self.user
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// How the credential is presented on each request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthScheme {
    /// `Authorization: Basic base64(user:token)`.
    #[default]
    Basic,
    /// `Authorization: token <token>`.
    Token,
}

/// Persistent client that attaches credentials to every request.
///
/// Default headers are fixed once the session is built, so anything extra
/// has to go through [`SessionBuilder::default_header`].
pub struct Session {
    client: Client,
    credentials: Credentials,
    scheme: AuthScheme,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("credentials", &self.credentials)
            .field("scheme", &self.scheme)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Create a session with basic auth and the default headers.
    pub fn new(credentials: Credentials) -> Result<Self> {
        Self::builder(credentials).build()
    }

    pub fn builder(credentials: Credentials) -> SessionBuilder {
        SessionBuilder::new(credentials)
    }

    pub fn user(&self) -> &str {
        self.credentials.user()
    }

    pub fn scheme(&self) -> AuthScheme {
        self.scheme
    }

    /// Start a request to `url` carrying the session credential.
    pub fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match self.scheme {
            AuthScheme::Basic => {
                builder.basic_auth(&self.credentials.user, Some(&self.credentials.token))
            }
            AuthScheme::Token => builder.header(
                AUTHORIZATION,
                format!("token {}", self.credentials.token),
            ),
        }
    }

    pub fn get(&self, url: &str) -> RequestBuilder {
        self.request(Method::GET, url)
    }

    pub fn post(&self, url: &str) -> RequestBuilder {
        self.request(Method::POST, url)
    }

    pub fn put(&self, url: &str) -> RequestBuilder {
        self.request(Method::PUT, url)
    }

    pub fn delete(&self, url: &str) -> RequestBuilder {
        self.request(Method::DELETE, url)
    }
}

/// Builder for [`Session`].
pub struct SessionBuilder {
    credentials: Credentials,
    scheme: AuthScheme,
    headers: HeaderMap,
    timeout: Duration,
}

impl SessionBuilder {
    fn new(credentials: Credentials) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_V3_JSON));
        Self {
            credentials,
            scheme: AuthScheme::default(),
            headers,
            timeout: Duration::from_secs(HTTP_TIMEOUT_SECS),
        }
    }

    pub fn auth_scheme(mut self, scheme: AuthScheme) -> Self {
        self.scheme = scheme;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Merge a header into the defaults sent with every request.
    ///
    /// A header with the same name replaces the earlier value.
    pub fn default_header(mut self, name: &str, value: &str) -> Result<Self> {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| ForgeError::InvalidHeader(name.to_string()))?;
        let header_value =
            HeaderValue::from_str(value).map_err(|_| ForgeError::InvalidHeader(name.to_string()))?;
        self.headers.insert(header_name, header_value);
        Ok(self)
    }

    pub fn build(self) -> Result<Session> {
        let client = Client::builder()
            .timeout(self.timeout)
            .user_agent(USER_AGENT)
            .default_headers(self.headers)
            .build()?;
        Ok(Session {
            client,
            credentials: self.credentials,
            scheme: self.scheme,
        })
    }
}
