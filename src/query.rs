//! Search query representation and normalization.

use serde::{Deserialize, Serialize};

/// Separator placed between query terms in the request URL.
pub const TERM_SEPARATOR: char = '+';

/// Normalizes raw query text into a URL-safe term sequence.
///
/// Runs of whitespace collapse into a single separator, leading and trailing
/// whitespace is dropped and every term is percent-encoded. An empty or
/// whitespace-only input yields an empty string.
pub fn normalize(raw: &str) -> String {
    raw.split_whitespace()
        .map(|term| urlencoding::encode(term).into_owned())
        .collect::<Vec<_>>()
        .join(&TERM_SEPARATOR.to_string())
}

/// A submitted query, kept in both raw and normalized form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// The text exactly as submitted.
    pub raw: String,
    /// The normalized, URL-safe terms.
    pub terms: String,
}

impl SearchQuery {
    /// Creates a query from raw text.
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let terms = normalize(&raw);
        Self { raw, terms }
    }

    /// Returns true if there is nothing to search for.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_collapses_whitespace() {
        assert_eq!(normalize("  hello   world  "), "hello+world");
    }

    #[test]
    fn test_normalize_mixed_whitespace() {
        assert_eq!(normalize("rust\t\tasync\n\nstreams"), "rust+async+streams");
    }

    #[test]
    fn test_normalize_single_term() {
        assert_eq!(normalize("yacy"), "yacy");
    }

    #[test]
    fn test_normalize_empty() {
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn test_normalize_whitespace_only() {
        assert_eq!(normalize(" \t\n "), "");
    }

    #[test]
    fn test_normalize_encodes_reserved_characters() {
        assert_eq!(normalize("a&b c/d"), "a%26b+c%2Fd");
    }

    #[test]
    fn test_normalize_encodes_literal_plus() {
        assert_eq!(normalize("c++ book"), "c%2B%2B+book");
    }

    #[test]
    fn test_normalize_unicode() {
        assert_eq!(normalize("größe  maß"), "gr%C3%B6%C3%9Fe+ma%C3%9F");
    }

    #[test]
    fn test_normalize_never_repeats_or_edges_separator() {
        let inputs = [
            "  a  ",
            "a \u{3000} b",
            "\u{a0}x\u{2003}y ",
            " + + ",
            "one\r\ntwo\tthree   four",
            "++",
        ];
        for input in inputs {
            let out = normalize(input);
            assert!(!out.contains("++"), "{input:?} -> {out:?}");
            assert!(!out.starts_with('+'), "{input:?} -> {out:?}");
            assert!(!out.ends_with('+'), "{input:?} -> {out:?}");
            assert!(!out.contains(char::is_whitespace), "{input:?} -> {out:?}");
        }
    }

    #[test]
    fn test_search_query_new() {
        let query = SearchQuery::new(" open   source ");
        assert_eq!(query.raw, " open   source ");
        assert_eq!(query.terms, "open+source");
        assert!(!query.is_empty());
    }

    #[test]
    fn test_search_query_empty() {
        assert!(SearchQuery::new("   ").is_empty());
    }

    #[test]
    fn test_search_query_serialization() {
        let query = SearchQuery::new("hello world");
        let json = serde_json::to_string(&query).unwrap();
        assert!(json.contains("\"terms\":\"hello+world\""));
    }
}
