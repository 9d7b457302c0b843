//! Endpoint configuration
//!
//! Pastebin serves its API from two hosts: the main site and the IP-allow-listed
//! scraping host. Both bases are configurable so tests can point the client at a
//! local mock server; the paths below them are fixed upstream.

use crate::error::PastebinError;
use reqwest::{IntoUrl, Url};

/// Default base URL of the paste API
pub const DEFAULT_API_BASE: &str = "https://pastebin.com";

/// Default base URL of the scraping API
pub const DEFAULT_SCRAPE_BASE: &str = "https://scrape.pastebin.com";

/// Prefix of every canonical paste URL; what remains after it is the paste key
pub const PASTE_URL_PREFIX: &str = "https://pastebin.com/";

const LOGIN_PATH: [&str; 2] = ["api", "api_login.php"];
const POST_PATH: [&str; 2] = ["api", "api_post.php"];
const RAW_API_PATH: [&str; 2] = ["api", "api_raw.php"];
const RAW_PREFIX: &str = "raw";
const SCRAPING_PATH: &str = "api_scraping.php";
const SCRAPE_ITEM_PATH: &str = "api_scrape_item.php";
const SCRAPE_ITEM_META_PATH: &str = "api_scrape_item_meta.php";

/// Base URLs of the two Pastebin API hosts
///
/// # Example
///
/// ```
/// use pastebin_client::Endpoints;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let endpoints = Endpoints::new()
///     .with_api_base("http://localhost:1234")?
///     .with_scrape_base("http://localhost:1235")?;
/// assert_eq!(endpoints.api_base().as_str(), "http://localhost:1234/");
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoints {
    api_base: Url,
    scrape_base: Url,
}

impl Endpoints {
    /// Endpoints of the public pastebin.com service
    pub fn new() -> Self {
        Self {
            api_base: Url::parse(DEFAULT_API_BASE).expect("Default API URL should always be valid"),
            scrape_base: Url::parse(DEFAULT_SCRAPE_BASE)
                .expect("Default scrape URL should always be valid"),
        }
    }

    /// Replace the API host (login, post, raw endpoints)
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be parsed or cannot carry a path.
    pub fn with_api_base(mut self, url: impl IntoUrl) -> Result<Self, PastebinError> {
        self.api_base = parse_base(url)?;
        Ok(self)
    }

    /// Replace the scraping API host
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be parsed or cannot carry a path.
    pub fn with_scrape_base(mut self, url: impl IntoUrl) -> Result<Self, PastebinError> {
        self.scrape_base = parse_base(url)?;
        Ok(self)
    }

    /// Base URL of the paste API
    pub fn api_base(&self) -> &Url {
        &self.api_base
    }

    /// Base URL of the scraping API
    pub fn scrape_base(&self) -> &Url {
        &self.scrape_base
    }

    pub(crate) fn login(&self) -> Url {
        join(&self.api_base, &LOGIN_PATH)
    }

    pub(crate) fn post(&self) -> Url {
        join(&self.api_base, &POST_PATH)
    }

    pub(crate) fn raw_api(&self) -> Url {
        join(&self.api_base, &RAW_API_PATH)
    }

    pub(crate) fn raw(&self, paste_key: &str) -> Url {
        join(&self.api_base, &[RAW_PREFIX, paste_key])
    }

    pub(crate) fn scraping(&self, syntax: &str, limit: u32) -> Url {
        let mut url = join(&self.scrape_base, &[SCRAPING_PATH]);
        url.query_pairs_mut()
            .append_pair("lang", syntax)
            .append_pair("limit", &limit.to_string());
        url
    }

    pub(crate) fn scrape_item(&self, paste_key: &str) -> Url {
        let mut url = join(&self.scrape_base, &[SCRAPE_ITEM_PATH]);
        url.query_pairs_mut().append_pair("i", paste_key);
        url
    }

    pub(crate) fn scrape_item_meta(&self, paste_key: &str) -> Url {
        let mut url = join(&self.scrape_base, &[SCRAPE_ITEM_META_PATH]);
        url.query_pairs_mut().append_pair("i", paste_key);
        url
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_base(url: impl IntoUrl) -> Result<Url, PastebinError> {
    let url = url
        .into_url()
        .map_err(|e| PastebinError::InvalidUrl(e.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(PastebinError::InvalidUrl(url.to_string()));
    }
    Ok(url)
}

// Bases are checked by `parse_base`, so the path is always writable.
fn join(base: &Url, segments: &[&str]) -> Url {
    let mut url = base.clone();
    if let Ok(mut path) = url.path_segments_mut() {
        path.clear().extend(segments);
    }
    url.set_query(None);
    url
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_default_endpoints_match_upstream_paths() {
        let endpoints = Endpoints::new();

        assert_eq!(endpoints.login().as_str(), "https://pastebin.com/api/api_login.php");
        assert_eq!(endpoints.post().as_str(), "https://pastebin.com/api/api_post.php");
        assert_eq!(endpoints.raw_api().as_str(), "https://pastebin.com/api/api_raw.php");
        assert_eq!(endpoints.raw("abcdefgh").as_str(), "https://pastebin.com/raw/abcdefgh");
        assert_eq!(
            endpoints.scrape_item("abcdefgh").as_str(),
            "https://scrape.pastebin.com/api_scrape_item.php?i=abcdefgh"
        );
        assert_eq!(
            endpoints.scrape_item_meta("abcdefgh").as_str(),
            "https://scrape.pastebin.com/api_scrape_item_meta.php?i=abcdefgh"
        );
        assert_eq!(
            endpoints.scraping("go", 50).as_str(),
            "https://scrape.pastebin.com/api_scraping.php?lang=go&limit=50"
        );
    }

    #[test]
    fn test_empty_syntax_is_still_sent() {
        let url = Endpoints::new().scraping("", 250);
        assert_eq!(url.query(), Some("lang=&limit=250"));
    }

    #[test]
    fn test_custom_base_replaces_path_and_query() {
        let endpoints = Endpoints::new()
            .with_api_base("http://127.0.0.1:8080/ignored/path?x=1")
            .unwrap();

        assert_eq!(endpoints.post().as_str(), "http://127.0.0.1:8080/api/api_post.php");
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            Endpoints::new().with_api_base("not a valid url"),
            Err(PastebinError::InvalidUrl(_))
        ));
        assert!(matches!(
            Endpoints::new().with_scrape_base("mailto:someone@example.com"),
            Err(PastebinError::InvalidUrl(_))
        ));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(10))]

        #[test]
        fn prop_raw_key_is_a_single_path_segment(key in "[a-zA-Z0-9/ ?#]{1,16}") {
            let url = Endpoints::new().raw(&key);
            let segments: Vec<_> = url.path_segments().unwrap().collect();

            prop_assert_eq!(segments.len(), 2);
            prop_assert_eq!(segments[0], "raw");
            prop_assert!(url.query().is_none());
            prop_assert!(url.fragment().is_none());
        }
    }
}
