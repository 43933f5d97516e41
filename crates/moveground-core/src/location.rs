//! Page addressable state: share ids and code fragments.

use crate::error::{MovegroundError, Result};
use percent_encoding::percent_decode_str;
use reqwest::Url;
use serde::{Deserialize, Serialize};

/// Query parameter carrying a share id.
pub const SHARE_ID_PARAM: &str = "share_id";

/// The parts of a page URL read once at mount.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLocation {
    /// Value of the `share_id` query parameter
    pub share_id: Option<String>,
    /// Percent-decoded hash fragment, without the leading `#`
    pub fragment: Option<String>,
}

impl PageLocation {
    /// Parses a full page URL.
    pub fn parse(url: &str) -> Result<Self> {
        let url = Url::parse(url)
            .map_err(|e| MovegroundError::config(format!("Invalid page URL '{}': {}", url, e)))?;

        let share_id = url
            .query_pairs()
            .find(|(key, _)| key == SHARE_ID_PARAM)
            .map(|(_, value)| value.into_owned());

        Ok(Self {
            share_id,
            fragment: url.fragment().map(decode_fragment),
        })
    }

    /// Builds a location from already-split parts. `fragment` is raw
    /// (still percent-encoded) and may include the leading `#`.
    pub fn from_parts(share_id: Option<&str>, fragment: Option<&str>) -> Self {
        Self {
            share_id: share_id.map(str::to_string),
            fragment: fragment.map(|raw| decode_fragment(raw.strip_prefix('#').unwrap_or(raw))),
        }
    }

    /// The single import this location asks for.
    ///
    /// A non-empty code fragment takes precedence over a share id.
    pub fn import_reference(&self) -> Option<ImportReference> {
        if let Some(code) = self.fragment.as_deref().filter(|code| !code.is_empty()) {
            return Some(ImportReference::Fragment(code.to_string()));
        }
        self.share_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .map(|id| ImportReference::ShareId(id.to_string()))
    }
}

fn decode_fragment(raw: &str) -> String {
    percent_decode_str(raw).decode_utf8_lossy().into_owned()
}

/// An external reference to importable source, fixed for the page's lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImportReference {
    /// Literal code carried in the hash fragment, applied without a fetch
    Fragment(String),
    /// Gist id to fetch from the remote content store
    ShareId(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_share_id() {
        let location = PageLocation::parse("https://playmove.dev/?share_id=abc").unwrap();
        assert_eq!(location.share_id.as_deref(), Some("abc"));
        assert_eq!(location.fragment, None);
        assert_eq!(
            location.import_reference(),
            Some(ImportReference::ShareId("abc".into()))
        );
    }

    #[test]
    fn test_parse_fragment_is_decoded() {
        let location =
            PageLocation::parse("https://playmove.dev/#module%20temp%3A%3Atemp%3B").unwrap();
        assert_eq!(location.fragment.as_deref(), Some("module temp::temp;"));
        assert_eq!(
            location.import_reference(),
            Some(ImportReference::Fragment("module temp::temp;".into()))
        );
    }

    #[test]
    fn test_fragment_takes_precedence() {
        let location =
            PageLocation::parse("https://playmove.dev/?share_id=abc#module%20a%3A%3Ab%3B").unwrap();
        assert_eq!(
            location.import_reference(),
            Some(ImportReference::Fragment("module a::b;".into()))
        );
    }

    #[test]
    fn test_empty_values_are_ignored() {
        let location = PageLocation::parse("https://playmove.dev/?share_id=#").unwrap();
        assert_eq!(location.import_reference(), None);
        assert_eq!(PageLocation::default().import_reference(), None);
    }

    #[test]
    fn test_from_parts_strips_hash() {
        let location = PageLocation::from_parts(None, Some("#fun%20main()"));
        assert_eq!(location.fragment.as_deref(), Some("fun main()"));
    }

    #[test]
    fn test_invalid_url_is_config_error() {
        let err = PageLocation::parse("not a url").unwrap_err();
        assert!(matches!(err, MovegroundError::Config(_)));
    }
}
