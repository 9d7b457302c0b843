//! Paste records and request parameters

use chrono::{DateTime, Utc};
use std::fmt;

/// Who can see a paste
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Visibility {
    /// Listed and readable by anyone
    #[default]
    Public,
    /// Readable by anyone with the link, not listed
    Unlisted,
    /// Readable only by its owner
    Private,
    /// A code Pastebin returned that this crate does not know
    Unknown(i64),
}

impl Visibility {
    /// The integer Pastebin uses for this visibility (`api_paste_private`)
    pub fn code(self) -> i64 {
        match self {
            Visibility::Public => 0,
            Visibility::Unlisted => 1,
            Visibility::Private => 2,
            Visibility::Unknown(code) => code,
        }
    }

    /// Map a Pastebin visibility integer, keeping unrecognised codes
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => Visibility::Public,
            1 => Visibility::Unlisted,
            2 => Visibility::Private,
            other => Visibility::Unknown(other),
        }
    }

    /// Canonical lowercase name; `"unknown"` for unrecognised codes
    pub fn as_str(self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Unlisted => "unlisted",
            Visibility::Private => "private",
            Visibility::Unknown(_) => "unknown",
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How long a new paste lives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Expiration {
    TenMinutes,
    OneHour,
    OneDay,
    OneWeek,
    TwoWeeks,
    OneMonth,
    SixMonths,
    OneYear,
    #[default]
    Never,
}

impl Expiration {
    /// The token sent as `api_paste_expire_date`
    pub fn as_str(self) -> &'static str {
        match self {
            Expiration::TenMinutes => "10M",
            Expiration::OneHour => "1H",
            Expiration::OneDay => "1D",
            Expiration::OneWeek => "1W",
            Expiration::TwoWeeks => "2W",
            Expiration::OneMonth => "1M",
            Expiration::SixMonths => "6M",
            Expiration::OneYear => "1Y",
            Expiration::Never => "N",
        }
    }
}

impl fmt::Display for Expiration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A paste and its metadata as reported by Pastebin
///
/// Values are only produced by the response decoders and cannot be modified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paste {
    pub(crate) key: String,
    pub(crate) title: String,
    pub(crate) user: String,
    pub(crate) url: String,
    pub(crate) hits: u64,
    pub(crate) size: u64,
    pub(crate) date: DateTime<Utc>,
    pub(crate) expire_date: DateTime<Utc>,
    pub(crate) visibility: Visibility,
    pub(crate) syntax: String,
}

impl Paste {
    /// Short key identifying the paste (`https://pastebin.com/{key}`)
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Owner's username, empty for guest pastes
    pub fn user(&self) -> &str {
        &self.user
    }

    /// Full canonical URL
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    /// Size of the content in bytes
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Creation time
    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    /// Expiration time; the Unix epoch when the paste never expires
    pub fn expire_date(&self) -> DateTime<Utc> {
        self.expire_date
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    /// Syntax highlighting tag (`go`, `rust`, `text`, ...)
    pub fn syntax(&self) -> &str {
        &self.syntax
    }
}

/// Parameters for creating a paste
///
/// # Example
///
/// ```
/// use pastebin_client::{CreatePasteRequest, Expiration, Visibility};
///
/// let request = CreatePasteRequest::new("hello", "fn main() {}")
///     .expiration(Expiration::OneDay)
///     .visibility(Visibility::Unlisted)
///     .syntax("rust");
/// assert_eq!(request.expiration_or_default(), Expiration::OneDay);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreatePasteRequest {
    pub title: String,
    pub code: String,
    /// Defaults to [`Expiration::Never`] when unset
    pub expiration: Option<Expiration>,
    /// A client without a session token cannot create private pastes
    pub visibility: Visibility,
    /// See <https://pastebin.com/doc_api#5> for supported values; empty means plain text
    pub syntax: String,
}

impl CreatePasteRequest {
    /// A public, never-expiring paste with no syntax tag
    pub fn new(title: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            code: code.into(),
            ..Self::default()
        }
    }

    pub fn expiration(mut self, expiration: Expiration) -> Self {
        self.expiration = Some(expiration);
        self
    }

    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn syntax(mut self, syntax: impl Into<String>) -> Self {
        self.syntax = syntax.into();
        self
    }

    /// The expiration that will actually be sent
    pub fn expiration_or_default(&self) -> Expiration {
        self.expiration.unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_visibility_names() {
        assert_eq!(Visibility::Public.to_string(), "public");
        assert_eq!(Visibility::Unlisted.to_string(), "unlisted");
        assert_eq!(Visibility::Private.to_string(), "private");
        assert_eq!(Visibility::from_code(5355).to_string(), "unknown");
    }

    #[test]
    fn test_expiration_tokens() {
        let tokens: Vec<_> = [
            Expiration::TenMinutes,
            Expiration::OneHour,
            Expiration::OneDay,
            Expiration::OneWeek,
            Expiration::TwoWeeks,
            Expiration::OneMonth,
            Expiration::SixMonths,
            Expiration::OneYear,
            Expiration::Never,
        ]
        .iter()
        .map(|e| e.as_str())
        .collect();

        assert_eq!(tokens, ["10M", "1H", "1D", "1W", "2W", "1M", "6M", "1Y", "N"]);
    }

    #[test]
    fn test_unset_expiration_means_never() {
        let request = CreatePasteRequest::new("title", "code");

        assert_eq!(request.expiration, None);
        assert_eq!(request.expiration_or_default(), Expiration::Never);
        assert_eq!(request.visibility, Visibility::Public);
        assert!(request.syntax.is_empty());
    }

    proptest! {
        #[test]
        fn prop_visibility_code_round_trips(code in any::<i64>()) {
            let visibility = Visibility::from_code(code);
            prop_assert_eq!(visibility.code(), code);
            prop_assert_eq!(visibility.as_str() == "unknown", !(0..=2).contains(&code));
        }
    }
}
