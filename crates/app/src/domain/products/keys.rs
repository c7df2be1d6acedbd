//! Cache keys for catalog reads.

use crate::domain::{paging::Page, products::data::ProductQuery};

pub(crate) const PRODUCTS_NAMESPACE: &str = "products";

/// Matches every cached product listing.
pub(crate) const LIST_PATTERN: &str = "list:*";

/// Matches every cached product looked up by slug.
pub(crate) const SLUG_PATTERN: &str = "slug:*";

const ALL_TERM: &str = "all";

/// Unfiltered listings use `q=all`, so a search for the literal term `all` gets no key.
pub(crate) fn list_key(query: &ProductQuery, page: Page) -> Option<String> {
    let term = match query.search_term() {
        None => ALL_TERM,
        Some(ALL_TERM) => return None,
        Some(term) => term,
    };

    Some(format!(
        "list:q={term}:skip={}:limit={}",
        page.skip, page.limit
    ))
}

pub(crate) fn slug_key(slug: &str) -> String {
    format!("slug:{slug}")
}
