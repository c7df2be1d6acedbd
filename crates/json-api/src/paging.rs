//! Paging query parameters.

use salvo::prelude::StatusError;

use bazaar_app::domain::paging::Page;

use crate::extensions::*;

fn parse_offset(value: Option<String>, brief: &str) -> Result<Option<u32>, StatusError> {
    value
        .map(|value| value.trim().parse::<u32>().or_400(brief))
        .transpose()
}

/// Build a page from raw `skip` and `limit` query values, rejecting anything that is not a
/// non-negative integer.
pub(crate) fn page_from_query(
    skip: Option<String>,
    limit: Option<String>,
    default_limit: u32,
    max_limit: u32,
) -> Result<Page, StatusError> {
    let skip = parse_offset(skip, "skip must be a non-negative integer")?;
    let limit = parse_offset(limit, "limit must be a non-negative integer")?;

    Ok(Page::clamped(skip, limit, default_limit, max_limit))
}

#[cfg(test)]
mod tests {
    use salvo::http::StatusCode;

    use super::*;

    #[test]
    fn missing_values_use_defaults() {
        assert_eq!(
            page_from_query(None, None, 20, 100).ok(),
            Some(Page::new(0, 20))
        );
    }

    #[test]
    fn values_are_parsed_and_clamped() {
        assert_eq!(
            page_from_query(Some("40".to_string()), Some("1000".to_string()), 20, 100).ok(),
            Some(Page::new(40, 100))
        );
    }

    #[test]
    fn negative_skip_is_rejected() {
        let error = page_from_query(Some("-1".to_string()), None, 20, 100).err();

        assert_eq!(
            error.map(|error| (error.code, error.brief)),
            Some((
                StatusCode::BAD_REQUEST,
                "skip must be a non-negative integer".to_string()
            ))
        );
    }

    #[test]
    fn non_numeric_limit_is_rejected() {
        let error = page_from_query(None, Some("ten".to_string()), 20, 100).err();

        assert_eq!(
            error.map(|error| error.code),
            Some(StatusCode::BAD_REQUEST)
        );
    }
}
