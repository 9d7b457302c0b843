//! Pastebin HTTP Client Library
//!
//! This library provides a blocking client for the Pastebin API, including
//! session login, paste creation and deletion, listing a user's pastes, and
//! fetching paste content through the raw endpoint or the scraping API.
//!
//! # Features
//!
//! - Session login with transparent re-login when Pastebin rejects a stale token
//! - Guest paste creation without credentials
//! - Scraping API access for recent pastes and paste metadata
//! - Pluggable [`Transport`], with a pooled rustls-backed [`ReqwestTransport`]
//! - Credentials and session tokens are zeroized on drop and never logged
//! - Well-typed errors using thiserror, `tracing` events for diagnostics
//!
//! # Example
//!
//! ```no_run
//! use pastebin_client::{CreatePasteRequest, Endpoints, PastebinClient, Visibility, public};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Log in; an empty username creates a guest client instead
//! let client = PastebinClient::new("username", "password", "developer-key")?;
//!
//! // Create a paste
//! let key = client.create_paste(
//!     &CreatePasteRequest::new("example", "fn main() {}")
//!         .visibility(Visibility::Unlisted)
//!         .syntax("rust"),
//! )?;
//!
//! // Read it back without a session
//! let content = public::get_paste_content(client.transport(), &Endpoints::new(), &key)?;
//! assert_eq!(content, "fn main() {}");
//! # Ok(())
//! # }
//! ```

mod client;
mod endpoints;
mod error;
mod parser;
pub mod public;
mod transport;
mod types;

#[cfg(test)]
mod testing;

pub use client::{MAX_LIST_RESULTS, PastebinClient, PastebinClientBuilder};
pub use endpoints::{DEFAULT_API_BASE, DEFAULT_SCRAPE_BASE, Endpoints, PASTE_URL_PREFIX};
pub use error::{PastebinError, Result, TransportError};
pub use transport::{
    DEFAULT_POOL_MAX_IDLE_PER_HOST, DEFAULT_TIMEOUT, HttpRequest, HttpResponse, ReqwestTransport,
    Transport, TransportBuilder,
};
pub use types::{CreatePasteRequest, Expiration, Paste, Visibility};
