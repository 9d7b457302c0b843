//! Authenticated Pastebin session

use crate::endpoints::Endpoints;
use crate::error::{PastebinError, Result};
use crate::parser::{self, Reply, ResponseParser};
use crate::transport::{HttpRequest, ReqwestTransport, Transport};
use crate::types::{CreatePasteRequest, Paste, Visibility};
use reqwest::{IntoUrl, Url};
use std::fmt;
use std::sync::{PoisonError, RwLock};
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

/// Largest `api_results_limit` the list call accepts
pub const MAX_LIST_RESULTS: u32 = 100;

/// A Pastebin API session
///
/// Built with a username, the client logs in immediately and keeps the returned
/// session token (`api_user_key`). When Pastebin later rejects that token, the
/// client logs in again and retries the rejected call once.
///
/// Built without a username, the client is a guest: it can only create public or
/// unlisted pastes, and every other operation fails with
/// [`PastebinError::Unauthenticated`] without touching the network.
///
/// The client is `Sync` when its transport is. Calls racing on a stale token may
/// each log in again; the last token written wins.
///
/// # Example
///
/// ```no_run
/// use pastebin_client::{CreatePasteRequest, Expiration, PastebinClient, Visibility};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let client = PastebinClient::new("username", "password", "developer-key")?;
///
/// let key = client.create_paste(
///     &CreatePasteRequest::new("notes", "hello")
///         .expiration(Expiration::OneWeek)
///         .visibility(Visibility::Private),
/// )?;
///
/// for paste in client.list_pastes()? {
///     println!("{} {}", paste.key(), paste.title());
/// }
///
/// client.delete_paste(&key)?;
/// # Ok(())
/// # }
/// ```
pub struct PastebinClient<T = ReqwestTransport> {
    transport: T,
    endpoints: Endpoints,
    parser: ResponseParser,
    username: String,
    password: Zeroizing<String>,
    developer_key: Zeroizing<String>,
    session_key: RwLock<Zeroizing<String>>,
}

impl PastebinClient<ReqwestTransport> {
    /// Create a client on a default [`ReqwestTransport`] against pastebin.com
    ///
    /// Logs in when `username` is non-empty.
    ///
    /// # Errors
    ///
    /// Returns the login failure, or `PastebinError::ClientInit` if the HTTP client
    /// cannot be initialized.
    pub fn new(username: &str, password: &str, developer_key: &str) -> Result<Self> {
        Self::builder(ReqwestTransport::new()?)
            .developer_key(developer_key)
            .credentials(username, password)
            .build()
    }
}

impl<T: Transport> PastebinClient<T> {
    /// Create a builder around an existing transport
    pub fn builder(transport: T) -> PastebinClientBuilder<T> {
        PastebinClientBuilder::new(transport)
    }

    /// The configured username, empty for guests
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Whether the client currently holds a session token
    pub fn is_authenticated(&self) -> bool {
        !self.current_session_key().is_empty()
    }

    /// The hosts this client talks to
    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// The transport, for reuse with the functions in [`crate::public`]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Create a paste and return its key
    ///
    /// Guests create guest pastes. The key is the returned paste URL without
    /// `https://pastebin.com/`.
    ///
    /// # Errors
    ///
    /// `PastebinError::Unauthenticated` for a private paste without a session.
    pub fn create_paste(&self, request: &CreatePasteRequest) -> Result<String> {
        let authenticated = self.is_authenticated();
        let code = request.visibility.code();
        // Compare wire codes so `Unknown(2)` counts as private too.
        if code == Visibility::Private.code() && !authenticated {
            return Err(PastebinError::Unauthenticated);
        }

        let private = code.to_string();
        let fields = [
            ("api_option", "paste"),
            ("api_paste_name", request.title.as_str()),
            ("api_paste_code", request.code.as_str()),
            ("api_paste_format", request.syntax.as_str()),
            ("api_paste_expire_date", request.expiration_or_default().as_str()),
            ("api_paste_private", private.as_str()),
        ];

        // A guest has no credentials to log in again with.
        let url = self.call(self.endpoints.post(), &fields, authenticated)?;
        Ok(parser::paste_key_from_url(&url).to_string())
    }

    /// Delete a paste owned by the session's user
    pub fn delete_paste(&self, paste_key: &str) -> Result<()> {
        self.require_session()?;
        self.call(
            self.endpoints.raw_api(),
            &[("api_option", "delete"), ("api_paste_key", paste_key)],
            true,
        )?;
        Ok(())
    }

    /// List up to [`MAX_LIST_RESULTS`] pastes owned by the session's user
    pub fn list_pastes(&self) -> Result<Vec<Paste>> {
        self.list_pastes_limited(MAX_LIST_RESULTS)
    }

    /// List the user's pastes, asking for `limit` results (clamped to 1..=100)
    pub fn list_pastes_limited(&self, limit: u32) -> Result<Vec<Paste>> {
        self.require_session()?;

        let limit = limit.clamp(1, MAX_LIST_RESULTS).to_string();
        let body = self.call(
            self.endpoints.post(),
            &[("api_option", "list"), ("api_results_limit", limit.as_str())],
            true,
        )?;

        let pastes = self.parser.parse_paste_list(&body, &self.username);
        debug!(count = pastes.len(), "decoded paste list");
        Ok(pastes)
    }

    /// Fetch the content of a paste owned by the session's user
    ///
    /// Unlike [`crate::public::get_paste_content`] this also works for private
    /// pastes, but only for the user's own.
    pub fn get_user_paste_content(&self, paste_key: &str) -> Result<String> {
        self.require_session()?;
        self.call(
            self.endpoints.raw_api(),
            &[("api_option", "show_paste"), ("api_paste_key", paste_key)],
            true,
        )
    }

    fn require_session(&self) -> Result<()> {
        if self.is_authenticated() {
            Ok(())
        } else {
            Err(PastebinError::Unauthenticated)
        }
    }

    fn current_session_key(&self) -> Zeroizing<String> {
        self.session_key
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Exchange the credentials for a new session token
    fn login(&self) -> Result<()> {
        let fields = [
            ("api_user_name", self.username.as_str()),
            ("api_user_password", self.password.as_str()),
            ("api_dev_key", self.developer_key.as_str()),
        ];

        debug!(url = %self.endpoints.login().path(), "logging in");
        let request = HttpRequest::post(self.endpoints.login()).form(&fields);
        let token = parser::payload(self.transport.send(request)?)?;

        *self
            .session_key
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Zeroizing::new(token);

        info!(username = %self.username, "logged in to Pastebin");
        Ok(())
    }

    /// POST `fields` plus the developer key and session token to `url`
    ///
    /// With `retry_stale_session`, a rejected session token triggers one login and
    /// one resend of the same fields with the new token. The resend never retries.
    fn call(&self, url: Url, fields: &[(&str, &str)], retry_stale_session: bool) -> Result<String> {
        let session_key = self.current_session_key();

        let mut form = Vec::with_capacity(fields.len() + 2);
        form.extend_from_slice(fields);
        form.push(("api_user_key", session_key.as_str()));
        form.push(("api_dev_key", self.developer_key.as_str()));

        let option = fields
            .iter()
            .find(|(name, _)| *name == "api_option")
            .map_or("", |(_, value)| *value);
        debug!(url = %url.path(), option, "sending API request");

        let response = self
            .transport
            .send(HttpRequest::post(url.clone()).form(&form))?;

        if !retry_stale_session {
            return parser::payload(response);
        }

        match parser::classify(response)? {
            Reply::Payload(body) => Ok(body),
            Reply::StaleSession => {
                warn!(username = %self.username, option, "session token rejected, logging in again");
                self.login()
                    .map_err(|e| PastebinError::Reauthentication(Box::new(e)))?;
                self.call(url, fields, false)
            }
        }
    }
}

impl<T> fmt::Debug for PastebinClient<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let authenticated = !self
            .session_key
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty();

        f.debug_struct("PastebinClient")
            .field("username", &self.username)
            .field("endpoints", &self.endpoints)
            .field("authenticated", &authenticated)
            .finish_non_exhaustive()
    }
}

/// Builder for [`PastebinClient`]
///
/// # Example
///
/// ```no_run
/// use pastebin_client::{PastebinClient, ReqwestTransport};
/// use std::time::Duration;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let transport = ReqwestTransport::builder()
///     .timeout(Duration::from_secs(30))
///     .build()?;
///
/// let client = PastebinClient::builder(transport)
///     .developer_key("developer-key")
///     .credentials("username", "password")
///     .api_base("http://localhost:1234")?
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct PastebinClientBuilder<T> {
    transport: T,
    endpoints: Endpoints,
    username: String,
    password: Zeroizing<String>,
    developer_key: Zeroizing<String>,
}

impl<T: Transport> PastebinClientBuilder<T> {
    /// Create a guest builder with default endpoints
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            endpoints: Endpoints::new(),
            username: String::new(),
            password: Zeroizing::new(String::new()),
            developer_key: Zeroizing::new(String::new()),
        }
    }

    /// The developer API key sent with every call
    pub fn developer_key(mut self, key: impl Into<String>) -> Self {
        self.developer_key = Zeroizing::new(key.into());
        self
    }

    /// Log in as `username`; an empty username keeps the client a guest
    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = username.into();
        self.password = Zeroizing::new(password.into());
        self
    }

    /// Replace both the API and scraping hosts at once
    pub fn endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Override the API host, see [`Endpoints::with_api_base`]
    pub fn api_base(mut self, url: impl IntoUrl) -> Result<Self> {
        self.endpoints = self.endpoints.with_api_base(url)?;
        Ok(self)
    }

    /// Override the scraping host, see [`Endpoints::with_scrape_base`]
    pub fn scrape_base(mut self, url: impl IntoUrl) -> Result<Self> {
        self.endpoints = self.endpoints.with_scrape_base(url)?;
        Ok(self)
    }

    /// Build the client, logging in first when a username is set
    ///
    /// # Errors
    ///
    /// Any login failure is returned as is and no client is created.
    pub fn build(self) -> Result<PastebinClient<T>> {
        let client = PastebinClient {
            transport: self.transport,
            endpoints: self.endpoints,
            parser: ResponseParser::new(),
            username: self.username,
            password: self.password,
            developer_key: self.developer_key,
            session_key: RwLock::new(Zeroizing::new(String::new())),
        };

        if !client.username.is_empty() {
            client.login()?;
        }

        Ok(client)
    }
}
