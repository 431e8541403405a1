//! Request-side types for the paginated listings.

use std::fmt;

use uuid::Uuid;

/// A case-insensitive substring filter that is guaranteed non-empty.
///
/// Blank input never produces a `SearchTerm`, so "no filter" has exactly one
/// representation (`None`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct SearchTerm(String);

impl SearchTerm {
    pub fn parse(raw: Option<&str>) -> Option<Self> {
        let trimmed = raw?.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// Parse a raw query-string value, discarding values that still carry
    /// query syntax (`?` or `=`) from a malformed client URL.
    pub fn from_query_param(raw: Option<&str>) -> Option<Self> {
        match raw {
            Some(value) if value.contains('?') || value.contains('=') => None,
            other => Self::parse(other),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `ILIKE` pattern matching the term as a literal substring.
    ///
    /// `%`, `_` and `\` are escaped with the default LIKE escape character.
    pub fn like_pattern(&self) -> String {
        let mut pattern = String::with_capacity(self.0.len() + 2);
        pattern.push('%');
        for ch in self.0.chars() {
            if matches!(ch, '%' | '_' | '\\') {
                pattern.push('\\');
            }
            pattern.push(ch);
        }
        pattern.push('%');
        pattern
    }

    /// Case-insensitive substring test with the same semantics as the
    /// `ILIKE` pattern above.
    pub fn matches(&self, haystack: &str) -> bool {
        haystack.to_lowercase().contains(&self.0.to_lowercase())
    }
}

impl fmt::Display for SearchTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Pagination mode of a single request. Exactly one is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pagination<K> {
    /// Jump to an arbitrary position in `(sort key, id)` order.
    Offset { skip: u32 },
    /// Continue in ascending id order strictly after a previously seen id.
    After { cursor: K },
}

impl<K> Pagination<K> {
    /// Resolve the pagination mode from raw selectors. A cursor takes
    /// precedence over `skip` when both are present.
    pub fn from_parts(skip: Option<u32>, cursor: Option<K>) -> Self {
        match cursor {
            Some(cursor) => Pagination::After { cursor },
            None => Pagination::Offset {
                skip: skip.unwrap_or(0),
            },
        }
    }
}

/// Parsed, validated parameters of one listing call.
///
/// Constructed per call by the transport layer; `limit` is always positive.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ListingRequest<K> {
    pub search: Option<SearchTerm>,
    pub limit: u32,
    pub pagination: Pagination<K>,
}

impl<K> ListingRequest<K> {
    pub fn offset(search: Option<SearchTerm>, limit: u32, skip: u32) -> Self {
        Self {
            search,
            limit,
            pagination: Pagination::Offset { skip },
        }
    }

    pub fn after(search: Option<SearchTerm>, limit: u32, cursor: K) -> Self {
        Self {
            search,
            limit,
            pagination: Pagination::After { cursor },
        }
    }

    /// First-page requests (no cursor, zero offset) are the only ones that
    /// carry a total count.
    pub fn is_first_page(&self) -> bool {
        matches!(self.pagination, Pagination::Offset { skip: 0 })
    }

    pub fn is_filtered(&self) -> bool {
        self.search.is_some()
    }
}

/// Ordering key of a narrowing candidate: the parent's sort field with the
/// primary key as a total-order tiebreaker.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CandidateKey {
    pub sort_key: String,
    pub id: Uuid,
}

impl CandidateKey {
    pub fn new(sort_key: impl Into<String>, id: Uuid) -> Self {
        Self {
            sort_key: sort_key.into(),
            id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_search_is_no_filter() {
        assert_eq!(SearchTerm::parse(None), None);
        assert_eq!(SearchTerm::parse(Some("")), None);
        assert_eq!(SearchTerm::parse(Some("   ")), None);
        assert_eq!(
            SearchTerm::parse(Some("  shirt ")).map(|t| t.to_string()),
            Some("shirt".to_string())
        );
    }

    #[test]
    fn query_syntax_in_search_is_dropped() {
        assert_eq!(SearchTerm::from_query_param(Some("a?limit=3")), None);
        assert_eq!(SearchTerm::from_query_param(Some("x=1")), None);
        assert!(SearchTerm::from_query_param(Some("blue")).is_some());
    }

    #[test]
    fn like_pattern_escapes_metacharacters() {
        let term = SearchTerm::parse(Some("50%_off\\")).unwrap();
        assert_eq!(term.like_pattern(), "%50\\%\\_off\\\\%");
    }

    #[test]
    fn matches_is_case_insensitive() {
        let term = SearchTerm::parse(Some("ShIrT")).unwrap();
        assert!(term.matches("Blue shirt"));
        assert!(!term.matches("Trousers"));
    }

    #[test]
    fn cursor_takes_precedence_over_skip() {
        let pagination = Pagination::from_parts(Some(24), Some(7u32));
        assert_eq!(pagination, Pagination::After { cursor: 7 });
        assert_eq!(
            Pagination::<u32>::from_parts(None, None),
            Pagination::Offset { skip: 0 }
        );
    }

    #[test]
    fn first_page_only_for_zero_offset() {
        assert!(ListingRequest::<u32>::offset(None, 12, 0).is_first_page());
        assert!(!ListingRequest::<u32>::offset(None, 12, 12).is_first_page());
        assert!(!ListingRequest::after(None, 12, 3u32).is_first_page());
    }

    #[test]
    fn candidate_keys_tie_break_on_id() {
        let a = CandidateKey::new("Shirt", Uuid::from_u128(2));
        let b = CandidateKey::new("Shirt", Uuid::from_u128(1));
        let c = CandidateKey::new("Apron", Uuid::from_u128(9));
        let mut keys = vec![a.clone(), b.clone(), c.clone()];
        keys.sort();
        assert_eq!(keys, vec![c, b, a]);
    }
}
