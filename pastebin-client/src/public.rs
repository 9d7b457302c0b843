//! Calls that need no session
//!
//! The raw endpoint serves any public or unlisted paste. The scraping API serves
//! the same pastes plus their metadata, but only to source IPs linked to a PRO
//! account (<https://pastebin.com/doc_scraping_api>); other callers receive an
//! error body, which surfaces as [`PastebinError::Api`](crate::PastebinError::Api).

use crate::endpoints::Endpoints;
use crate::error::Result;
use crate::parser;
use crate::transport::{HttpRequest, Transport};
use crate::types::Paste;
use reqwest::header::{CONTENT_TYPE, HeaderValue};
use tracing::debug;

/// Fetch the content of a public or unlisted paste from `/raw/{key}`
///
/// Using this heavily can get the calling IP blocked; prefer
/// [`get_scraped_paste_content`] when the scraping API is available.
///
/// # Example
///
/// ```no_run
/// use pastebin_client::{Endpoints, ReqwestTransport, public};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let transport = ReqwestTransport::new()?;
/// let content = public::get_paste_content(&transport, &Endpoints::new(), "abcdefgh")?;
/// println!("{}", content);
/// # Ok(())
/// # }
/// ```
pub fn get_paste_content<T>(transport: &T, endpoints: &Endpoints, paste_key: &str) -> Result<String>
where
    T: Transport + ?Sized,
{
    fetch(transport, HttpRequest::get(endpoints.raw(paste_key)))
}

/// Fetch the content of a paste through the scraping API
pub fn get_scraped_paste_content<T>(
    transport: &T,
    endpoints: &Endpoints,
    paste_key: &str,
) -> Result<String>
where
    T: Transport + ?Sized,
{
    fetch(transport, HttpRequest::get(endpoints.scrape_item(paste_key)))
}

/// Fetch the metadata of a paste through the scraping API
pub fn get_scraped_paste<T>(transport: &T, endpoints: &Endpoints, paste_key: &str) -> Result<Paste>
where
    T: Transport + ?Sized,
{
    let body = fetch(transport, HttpRequest::get(endpoints.scrape_item_meta(paste_key)))?;
    parser::parse_scraped_paste(&body)
}

/// List the most recent public pastes through the scraping API
///
/// An empty `syntax` returns pastes of every syntax. Pastebin caps `limit` at 250;
/// larger values are passed through and handled by the server.
pub fn get_recent_scraped_pastes<T>(
    transport: &T,
    endpoints: &Endpoints,
    syntax: &str,
    limit: u32,
) -> Result<Vec<Paste>>
where
    T: Transport + ?Sized,
{
    let request = HttpRequest::post(endpoints.scraping(syntax, limit))
        .header(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    let body = fetch(transport, request)?;

    let pastes = parser::parse_scraped_pastes(&body)?;
    debug!(count = pastes.len(), syntax, "decoded recent pastes");
    Ok(pastes)
}

fn fetch<T>(transport: &T, request: HttpRequest) -> Result<String>
where
    T: Transport + ?Sized,
{
    debug!(method = %request.method, url = %request.url, "sending public request");
    parser::payload(transport.send(request)?)
}
