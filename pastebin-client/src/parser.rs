//! Response classification and decoding
//!
//! Pastebin has no structured error codes: failures arrive as `200 OK` with a
//! plain-text body such as `Bad API request, invalid api_dev_key`. All string
//! matching on bodies lives in [`classify`].

use crate::endpoints::PASTE_URL_PREFIX;
use crate::error::PastebinError;
use crate::transport::HttpResponse;
use crate::types::{Paste, Visibility};
use chrono::{DateTime, Utc};
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Deserializer};
use std::borrow::Cow;
use std::sync::OnceLock;

/// Body returned when the session token is no longer accepted
pub(crate) const INVALID_USER_KEY: &str = "Bad API request, invalid api_user_key";

const ERROR_PREFIXES: [&str; 2] = ["Bad API request", "Error"];

/// Outcome of an authenticated call that did not fail outright
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Reply {
    /// The body is the operation's result
    Payload(String),
    /// The session token went stale; log in again and retry
    StaleSession,
}

/// Classify a response of a call that may be retried after logging in again
///
/// Only a 2xx body equal to [`INVALID_USER_KEY`] is reported as
/// [`Reply::StaleSession`]; everything else is handled by [`payload`].
pub(crate) fn classify(response: HttpResponse) -> Result<Reply, PastebinError> {
    if response.status.is_success() && response.body == INVALID_USER_KEY {
        return Ok(Reply::StaleSession);
    }
    payload(response).map(Reply::Payload)
}

/// Extract the result body of a response
///
/// Non-2xx statuses become `InvalidStatus`; 2xx bodies starting with one of
/// Pastebin's error prefixes (case-sensitive) become `Api` with the body verbatim.
pub(crate) fn payload(response: HttpResponse) -> Result<String, PastebinError> {
    let HttpResponse { status, body } = response;

    if !status.is_success() {
        return Err(PastebinError::InvalidStatus { status, body });
    }

    if is_api_error(&body) {
        return Err(PastebinError::Api(body));
    }

    Ok(body)
}

fn is_api_error(body: &str) -> bool {
    ERROR_PREFIXES.iter().any(|prefix| body.starts_with(prefix))
}

/// Strip [`PASTE_URL_PREFIX`]; other strings are returned unchanged
pub(crate) fn paste_key_from_url(url: &str) -> &str {
    url.strip_prefix(PASTE_URL_PREFIX).unwrap_or(url)
}

fn timestamp(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap_or_default()
}

fn lenient_int<T: std::str::FromStr + Default>(value: &str) -> T {
    value.trim().parse().unwrap_or_default()
}

/// Fields of one `<paste>` element of an `api_option=list` response
#[derive(Debug, Default)]
struct ListedPaste {
    key: String,
    date: String,
    title: String,
    size: String,
    expire_date: String,
    private: String,
    format_short: String,
    url: String,
    hits: String,
}

impl ListedPaste {
    // The list response never names the owner; it is always the session's user.
    fn into_paste(self, username: &str) -> Paste {
        Paste {
            key: self.key,
            title: self.title,
            user: username.to_string(),
            url: self.url,
            hits: lenient_int(&self.hits),
            size: lenient_int(&self.size),
            date: timestamp(lenient_int(&self.date)),
            expire_date: timestamp(lenient_int(&self.expire_date)),
            visibility: Visibility::from_code(lenient_int(&self.private)),
            syntax: self.format_short,
        }
    }
}

/// One paste object of the scraping API
///
/// Every field is a string upstream, numbers included. `scrape_url` and `key`
/// are ignored: the key is taken from `full_url`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ScrapedPaste {
    #[serde(deserialize_with = "lenient_string")]
    full_url: String,
    #[serde(deserialize_with = "lenient_string")]
    date: String,
    #[serde(deserialize_with = "lenient_string")]
    size: String,
    #[serde(deserialize_with = "lenient_string")]
    expire: String,
    #[serde(deserialize_with = "lenient_string")]
    title: String,
    #[serde(deserialize_with = "lenient_string")]
    syntax: String,
    #[serde(deserialize_with = "lenient_string")]
    user: String,
    #[serde(deserialize_with = "lenient_string")]
    hits: String,
}

impl ScrapedPaste {
    // The scraping API only serves public pastes and reports no visibility.
    fn into_paste(self) -> Paste {
        Paste {
            key: paste_key_from_url(&self.full_url).to_string(),
            title: self.title,
            user: self.user,
            hits: lenient_int(&self.hits),
            size: lenient_int(&self.size),
            date: timestamp(lenient_int(&self.date)),
            expire_date: timestamp(lenient_int(&self.expire)),
            visibility: Visibility::Public,
            syntax: self.syntax,
            url: self.full_url,
        }
    }
}

/// Accept strings, numbers and null where a string is documented
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(value) => value,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    })
}

/// Decode a single scraping API paste object
pub(crate) fn parse_scraped_paste(json: &str) -> Result<Paste, PastebinError> {
    let paste: ScrapedPaste = serde_json::from_str(json)?;
    Ok(paste.into_paste())
}

/// Decode a scraping API array of paste objects
pub(crate) fn parse_scraped_pastes(json: &str) -> Result<Vec<Paste>, PastebinError> {
    let pastes: Vec<ScrapedPaste> = serde_json::from_str(json)?;
    Ok(pastes.into_iter().map(ScrapedPaste::into_paste).collect())
}

/// Parser for `api_option=list` XML with a cached element selector
#[derive(Clone, Debug)]
pub(crate) struct ResponseParser {
    paste_selector: OnceLock<Selector>,
}

impl ResponseParser {
    /// Create a new parser with an uninitialized cache
    pub fn new() -> Self {
        Self {
            paste_selector: OnceLock::new(),
        }
    }

    /// Get or compile the `<paste>` element selector
    fn paste_selector(&self) -> &Selector {
        self.paste_selector
            .get_or_init(|| Selector::parse("paste").unwrap())
    }

    /// Decode the sibling `<paste>` elements of a list response
    ///
    /// The fragment has no root element of its own, so one is wrapped around it
    /// before parsing. Missing or malformed fields decode as empty or zero.
    pub fn parse_paste_list(&self, xml: &str, username: &str) -> Vec<Paste> {
        let document = Html::parse_fragment(&format!("<pastes>{}</pastes>", unwrap_cdata(xml)));

        document
            .select(self.paste_selector())
            .map(|element| Self::listed_paste(element).into_paste(username))
            .collect()
    }

    // Fields are matched among all descendants, so a self-closed `<paste_title/>`
    // swallowing its following siblings still yields every field.
    fn listed_paste(element: ElementRef<'_>) -> ListedPaste {
        let mut paste = ListedPaste::default();

        for field in element.descendants().filter_map(ElementRef::wrap) {
            let slot = match field.value().name() {
                "paste_key" => &mut paste.key,
                "paste_date" => &mut paste.date,
                "paste_title" => &mut paste.title,
                "paste_size" => &mut paste.size,
                "paste_expire_date" => &mut paste.expire_date,
                "paste_private" => &mut paste.private,
                "paste_format_short" => &mut paste.format_short,
                "paste_url" => &mut paste.url,
                "paste_hits" => &mut paste.hits,
                _ => continue,
            };
            *slot = own_text(field);
        }

        paste
    }
}

impl Default for ResponseParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Replace `<![CDATA[...]]>` sections with their escaped content
///
/// An HTML parser reads CDATA as a comment that ends at the first `>`, which
/// would drop the field text.
fn unwrap_cdata(xml: &str) -> Cow<'_, str> {
    const OPEN: &str = "<![CDATA[";
    const CLOSE: &str = "]]>";

    if !xml.contains(OPEN) {
        return Cow::Borrowed(xml);
    }

    let mut out = String::with_capacity(xml.len());
    let mut rest = xml;
    while let Some(start) = rest.find(OPEN) {
        out.push_str(&rest[..start]);
        let section = &rest[start + OPEN.len()..];
        let (content, tail) = match section.find(CLOSE) {
            Some(end) => (&section[..end], &section[end + CLOSE.len()..]),
            None => (section, ""),
        };
        for c in content.chars() {
            match c {
                '&' => out.push_str("&amp;"),
                '<' => out.push_str("&lt;"),
                '>' => out.push_str("&gt;"),
                c => out.push(c),
            }
        }
        rest = tail;
    }
    out.push_str(rest);

    Cow::Owned(out)
}

/// Text nodes directly under `element`
fn own_text(element: ElementRef<'_>) -> String {
    element
        .children()
        .filter_map(|node| node.value().as_text())
        .map(|text| &**text)
        .collect()
}
