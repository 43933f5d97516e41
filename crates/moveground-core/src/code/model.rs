//! Request and response models for the build/format/share service.

use super::module_name::module_name;
use crate::error::Result;
use crate::location::SHARE_ID_PARAM;
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Build variant sent with a `/build` request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuildType {
    /// Compile and run `#[test]` functions
    Test,
    /// Compile only
    Build,
}

impl BuildType {
    pub fn from_test_flag(is_test: bool) -> Self {
        if is_test { Self::Test } else { Self::Build }
    }
}

/// The remote operations a session can dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Build,
    Format,
    Share,
}

impl OperationKind {
    /// Lowercase name, also the endpoint path segment.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Build => "build",
            Self::Format => "format",
            Self::Share => "share",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload shared by `/build`, `/format` and `/share`.
///
/// `sources` and `tests` are ordered maps so that serialization is canonical:
/// two payloads with the same content always produce the same JSON.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CodeRequest {
    pub name: String,
    pub sources: BTreeMap<String, String>,
    pub tests: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_type: Option<BuildType>,
}

impl CodeRequest {
    /// Builds a single-source request from an editor buffer.
    ///
    /// The module name is derived from the buffer and the trimmed buffer is
    /// placed under that name.
    pub fn from_buffer(buffer: &str) -> Self {
        let name = module_name(buffer);
        let mut sources = BTreeMap::new();
        sources.insert(name.clone(), buffer.trim().to_string());
        Self {
            name,
            sources,
            tests: BTreeMap::new(),
            build_type: None,
        }
    }

    pub fn with_build_type(mut self, build_type: BuildType) -> Self {
        self.build_type = Some(build_type);
        self
    }

    /// Canonical JSON encoding used for request keys.
    pub fn canonical_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Cache/deduplication key: `"{kind}::{canonical_json}"`.
    pub fn request_key(&self, kind: OperationKind) -> Result<String> {
        Ok(format!("{}::{}", kind, self.canonical_json()?))
    }
}

/// Response body of `/build`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildOutput {
    #[serde(default)]
    pub stdout: String,
    #[serde(default)]
    pub stderr: String,
}

impl BuildOutput {
    /// Standard output then standard error, newline separated, even when
    /// either side is empty.
    pub fn combined(&self) -> String {
        format!("{}\n{}", self.stdout, self.stderr)
    }
}

/// Response body of `/format`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatOutput {
    #[serde(default)]
    pub sources: BTreeMap<String, String>,
}

impl FormatOutput {
    /// Formatted text for `module`; a missing entry reads as empty.
    pub fn source_for(&self, module: &str) -> String {
        self.sources.get(module).cloned().unwrap_or_default()
    }
}

/// Response body of `/share`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareLink {
    /// Internal reference id (the gist id)
    pub id: String,
    /// External viewable URL
    pub url: String,
}

/// Copyable links derived from a [`ShareLink`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareLinks {
    /// Reference id assigned by the share service
    pub id: String,
    /// Link that reopens the code in the playground via `?share_id=`
    pub playground_url: String,
    /// Link to the hosted gist
    pub gist_url: String,
}

impl ShareLinks {
    /// Builds the links for `share`. The id is escaped into the
    /// `share_id` query of `origin`.
    pub fn from_share(origin: &str, share: &ShareLink) -> Self {
        let playground_url = match Url::parse(origin) {
            Ok(mut url) => {
                if let Ok(mut segments) = url.path_segments_mut() {
                    segments.pop_if_empty().push("");
                }
                url.query_pairs_mut()
                    .clear()
                    .append_pair(SHARE_ID_PARAM, &share.id);
                url.to_string()
            }
            Err(_) => format!(
                "{}/?{}={}",
                origin.trim_end_matches('/'),
                SHARE_ID_PARAM,
                utf8_percent_encode(&share.id, NON_ALPHANUMERIC)
            ),
        };
        Self {
            id: share.id.clone(),
            playground_url,
            gist_url: share.url.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_buffer_trims_and_names() {
        let request = CodeRequest::from_buffer("\n  module temp::temp; public fun foo(): bool { true }\n\n");
        assert_eq!(request.name, "temp");
        assert_eq!(
            request.sources.get("temp").map(String::as_str),
            Some("module temp::temp; public fun foo(): bool { true }")
        );
        assert!(request.tests.is_empty());
        assert_eq!(request.build_type, None);
    }

    #[test]
    fn test_build_type_serializes_as_variant_name() {
        let request = CodeRequest::from_buffer("module a::b;").with_build_type(BuildType::Test);
        let json = request.canonical_json().unwrap();
        assert!(json.contains(r#""build_type":"Test""#));

        let without = CodeRequest::from_buffer("module a::b;");
        assert!(!without.canonical_json().unwrap().contains("build_type"));
    }

    #[test]
    fn test_request_key_is_independent_of_insertion_order() {
        let mut first = CodeRequest::from_buffer("module a::b;");
        first.sources.insert("z".into(), "1".into());
        first.sources.insert("m".into(), "2".into());

        let mut second = CodeRequest::from_buffer("module a::b;");
        second.sources.insert("m".into(), "2".into());
        second.sources.insert("z".into(), "1".into());

        assert_eq!(
            first.request_key(OperationKind::Build).unwrap(),
            second.request_key(OperationKind::Build).unwrap()
        );
    }

    #[test]
    fn test_request_key_distinguishes_kind() {
        let request = CodeRequest::from_buffer("module a::b;");
        let build = request.request_key(OperationKind::Build).unwrap();
        let format = request.request_key(OperationKind::Format).unwrap();
        assert!(build.starts_with("build::{"));
        assert!(format.starts_with("format::{"));
        assert_ne!(build, format);
    }

    #[test]
    fn test_combined_output_keeps_separator() {
        let output = BuildOutput {
            stdout: "ok".into(),
            stderr: String::new(),
        };
        assert_eq!(output.combined(), "ok\n");

        let only_err = BuildOutput {
            stdout: String::new(),
            stderr: "error[E01001]".into(),
        };
        assert_eq!(only_err.combined(), "\nerror[E01001]");
    }

    #[test]
    fn test_format_output_missing_module_is_empty() {
        let output: FormatOutput = serde_json::from_str(r#"{"sources":{"other":"x"}}"#).unwrap();
        assert_eq!(output.source_for("temp"), "");

        let missing: FormatOutput = serde_json::from_str("{}").unwrap();
        assert_eq!(missing.source_for("temp"), "");
    }

    #[test]
    fn test_share_links() {
        let share = ShareLink {
            id: "abc123".into(),
            url: "https://gist.github.com/abc123".into(),
        };
        let links = ShareLinks::from_share("https://playmove.dev/", &share);
        assert_eq!(links.id, "abc123");
        assert_eq!(links.playground_url, "https://playmove.dev/?share_id=abc123");
        assert_eq!(links.gist_url, "https://gist.github.com/abc123");

        let bare = ShareLinks::from_share("https://playmove.dev", &share);
        assert_eq!(bare.playground_url, "https://playmove.dev/?share_id=abc123");
    }

    #[test]
    fn test_share_links_escape_id() {
        let share = ShareLink {
            id: "a&b=c/../d".into(),
            url: "https://gist.github.com/x".into(),
        };
        let links = ShareLinks::from_share("https://playmove.dev", &share);
        assert_eq!(links.id, "a&b=c/../d");

        let url = Url::parse(&links.playground_url).unwrap();
        let pairs: Vec<_> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs, vec![("share_id".to_string(), "a&b=c/../d".to_string())]);
        assert_eq!(url.path(), "/");
    }
}
