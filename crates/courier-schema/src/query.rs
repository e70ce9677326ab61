//! Paged and batched request shapes for the reflection protocols.
//!
//! Both shapes are plain serde types: a remote client sends them as
//! ordinary request bodies and receives the matching response shape. Paged
//! queries guarantee exhaustiveness — following `next_page_token` from an
//! absent token yields every matching item exactly once — because the
//! underlying schema set is immutable after server start. Batched queries
//! guarantee partial success: unresolvable keys are simply absent from the
//! result, never an error.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::url::DeclarationUrl;

/// Error produced when a page token cannot be interpreted.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid page token: {token}")]
pub struct PageTokenError {
    /// The token that failed to parse.
    pub token: String,
}

/// Opaque continuation token for paged queries.
///
/// Internally a decimal offset into the deterministic enumeration order;
/// clients must treat it as opaque and pass it back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageToken(String);

impl PageToken {
    /// Builds a token pointing at the given offset.
    #[must_use]
    pub fn from_offset(offset: usize) -> Self {
        Self(offset.to_string())
    }

    /// Interprets the token as an offset.
    ///
    /// # Errors
    ///
    /// Returns [`PageTokenError`] when the token is not one this server
    /// issued.
    pub fn offset(&self) -> Result<usize, PageTokenError> {
        self.0.parse().map_err(|_| PageTokenError {
            token: self.0.clone(),
        })
    }
}

impl fmt::Display for PageToken {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

/// A paged listing request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagedRequest {
    /// Continuation token from the previous page; absent for the first page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_token: Option<PageToken>,
    /// Requested page size; `0` asks for the server default.
    #[serde(default)]
    pub page_size: u32,
}

impl PagedRequest {
    /// Creates a first-page request with the given size hint.
    #[must_use]
    pub const fn first(page_size: u32) -> Self {
        Self {
            page_token: None,
            page_size,
        }
    }

    /// Creates a follow-up request continuing from a returned token.
    #[must_use]
    pub const fn next(token: PageToken, page_size: u32) -> Self {
        Self {
            page_token: Some(token),
            page_size,
        }
    }
}

/// One page of a paged listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: DeserializeOwned"))]
pub struct PagedResponse<T> {
    /// The items of this page, in enumeration order.
    pub items: Vec<T>,
    /// Token for the next page; absent when the listing is exhausted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<PageToken>,
}

impl<T: Clone> PagedResponse<T> {
    /// Cuts one page out of a fully-materialised item sequence.
    ///
    /// `default_size` substitutes a zero `page_size`; the effective size is
    /// always at least one, so every call makes progress.
    ///
    /// # Errors
    ///
    /// Returns [`PageTokenError`] when the request carries a token this
    /// server did not issue.
    pub fn paginate(
        items: &[T],
        request: &PagedRequest,
        default_size: u32,
    ) -> Result<Self, PageTokenError> {
        let offset = match &request.page_token {
            Some(token) => token.offset()?,
            None => 0,
        };
        let hint = match request.page_size {
            0 => default_size.max(1),
            requested => requested,
        };
        let size = usize::try_from(hint).unwrap_or(usize::MAX);

        let page: Vec<T> = items.iter().skip(offset).take(size).cloned().collect();
        let consumed = offset.saturating_add(page.len());
        let next_page_token =
            (consumed < items.len()).then(|| PageToken::from_offset(consumed));

        Ok(Self {
            items: page,
            next_page_token,
        })
    }
}

/// A batched key-lookup request over a deduplicated URL set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchedRequest {
    /// The declaration URLs to resolve.
    #[serde(default)]
    pub urls: BTreeSet<DeclarationUrl>,
}

impl BatchedRequest {
    /// Creates a request for the given URLs, deduplicating them.
    #[must_use]
    pub fn new(urls: impl IntoIterator<Item = DeclarationUrl>) -> Self {
        Self {
            urls: urls.into_iter().collect(),
        }
    }
}

/// The result of a batched lookup.
///
/// Every requested URL that resolved appears exactly once; URLs with no
/// match are omitted rather than failing the call, so one bad key never
/// blocks retrieval of the others.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: DeserializeOwned"))]
pub struct BatchedResponse<T> {
    /// Mapping from each resolved URL to its declaration.
    #[serde(default = "BTreeMap::new")]
    pub found: BTreeMap<DeclarationUrl, T>,
}

impl<T> BatchedResponse<T> {
    /// Resolves each requested URL through the supplied lookup, omitting
    /// misses.
    #[must_use]
    pub fn resolve_with(
        request: &BatchedRequest,
        mut lookup: impl FnMut(&DeclarationUrl) -> Option<T>,
    ) -> Self {
        let found = request
            .urls
            .iter()
            .filter_map(|target| lookup(target).map(|entity| (target.clone(), entity)))
            .collect();
        Self { found }
    }
}

impl<T> Default for BatchedResponse<T> {
    fn default() -> Self {
        Self {
            found: BTreeMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    #![expect(clippy::expect_used, reason = "tests use expect for clarity")]

    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::single(1)]
    #[case::pair(2)]
    #[case::exact_fit(5)]
    #[case::oversized(16)]
    fn paging_is_exhaustive_for_any_size(#[case] page_size: u32) {
        let items: Vec<u32> = (0..5).collect();
        let mut collected = Vec::new();
        let mut request = PagedRequest::first(page_size);

        loop {
            let page = PagedResponse::paginate(&items, &request, 50).expect("valid token");
            collected.extend(page.items);
            match page.next_page_token {
                Some(token) => request = PagedRequest::next(token, page_size),
                None => break,
            }
        }

        assert_eq!(collected, items);
    }

    #[test]
    fn zero_page_size_uses_server_default() {
        let items: Vec<u32> = (0..10).collect();
        let page =
            PagedResponse::paginate(&items, &PagedRequest::first(0), 4).expect("valid token");
        assert_eq!(page.items, [0, 1, 2, 3]);
        assert_eq!(
            page.next_page_token,
            Some(PageToken::from_offset(4))
        );
    }

    #[test]
    fn empty_listing_yields_one_empty_terminal_page() {
        let items: Vec<u32> = Vec::new();
        let page =
            PagedResponse::paginate(&items, &PagedRequest::first(3), 50).expect("valid token");
        assert!(page.items.is_empty());
        assert!(page.next_page_token.is_none());
    }

    #[test]
    fn foreign_tokens_are_rejected() {
        let items: Vec<u32> = (0..3).collect();
        let request = PagedRequest::next(PageToken("not-a-number".to_owned()), 2);
        let error = PagedResponse::paginate(&items, &request, 50).expect_err("bad token");
        assert_eq!(error.token, "not-a-number");
    }

    #[test]
    fn batched_lookup_omits_misses() {
        let request = BatchedRequest::new([
            DeclarationUrl::new("a.One"),
            DeclarationUrl::new("a.Missing"),
            DeclarationUrl::new("a.Two"),
        ]);

        let response = BatchedResponse::resolve_with(&request, |target| {
            (target.as_str() != "a.Missing").then(|| target.simple_name().to_owned())
        });

        assert_eq!(response.found.len(), 2);
        assert_eq!(
            response.found.get(&DeclarationUrl::new("a.One")),
            Some(&"One".to_owned())
        );
        assert!(!response.found.contains_key(&DeclarationUrl::new("a.Missing")));
    }

    #[test]
    fn empty_batched_request_yields_empty_mapping() {
        let response =
            BatchedResponse::<String>::resolve_with(&BatchedRequest::default(), |_| None);
        assert!(response.found.is_empty());
    }
}
