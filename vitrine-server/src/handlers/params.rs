//! Query-string parsing shared by the listing handlers.
//!
//! Numbers arrive as strings so malformed values produce the JSON error
//! body instead of the extractor's plain-text rejection.

use std::str::FromStr;

use thiserror::Error;
use vitrine_model::{ListingRequest, ModelError, Pagination, SearchTerm};

#[derive(Debug, Error)]
pub enum ParamError {
    #[error("{name} must be a non-negative integer, got {value:?}")]
    NotANumber { name: &'static str, value: String },

    #[error("limit must be greater than 0")]
    ZeroLimit,

    #[error("limit must not exceed {max}")]
    LimitTooLarge { max: u32 },

    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Raw pagination parameters as they appear in the query string.
#[derive(Debug, Clone, Copy, Default)]
pub struct PageParams<'a> {
    pub limit: Option<&'a str>,
    pub skip: Option<&'a str>,
    pub cursor: Option<&'a str>,
    pub search: Option<&'a str>,
}

/// Page-size bounds of one listing endpoint.
#[derive(Debug, Clone, Copy)]
pub struct LimitBounds {
    pub default: u32,
    pub max: u32,
}

pub fn listing_request<K>(
    params: PageParams<'_>,
    bounds: LimitBounds,
) -> Result<ListingRequest<K>, ParamError>
where
    K: FromStr<Err = ModelError>,
{
    let limit = match present(params.limit) {
        None => bounds.default.min(bounds.max),
        Some(raw) => {
            let limit = parse_u32("limit", raw)?;
            if limit == 0 {
                return Err(ParamError::ZeroLimit);
            }
            if limit > bounds.max {
                return Err(ParamError::LimitTooLarge { max: bounds.max });
            }
            limit
        }
    };

    let skip = present(params.skip)
        .map(|raw| parse_u32("skip", raw))
        .transpose()?;
    let cursor = present(params.cursor)
        .map(|raw| {
            K::from_str(raw)
                .map_err(|_| ModelError::InvalidCursor(raw.to_string()))
        })
        .transpose()?;

    Ok(ListingRequest {
        search: SearchTerm::from_query_param(params.search),
        limit,
        pagination: Pagination::from_parts(skip, cursor),
    })
}

fn present(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|value| !value.is_empty())
}

fn parse_u32(name: &'static str, raw: &str) -> Result<u32, ParamError> {
    raw.parse().map_err(|_| ParamError::NotANumber {
        name,
        value: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use vitrine_model::OrderID;

    const BOUNDS: LimitBounds = LimitBounds {
        default: 10,
        max: 100,
    };

    fn parse(
        params: PageParams<'_>,
    ) -> Result<ListingRequest<OrderID>, ParamError> {
        listing_request(params, BOUNDS)
    }

    #[test]
    fn defaults_to_first_offset_page() {
        let request = parse(PageParams::default()).unwrap();
        assert_eq!(request.limit, 10);
        assert!(request.is_first_page());
        assert!(request.search.is_none());
    }

    #[test]
    fn rejects_zero_negative_and_oversized_limits() {
        for raw in ["0", "-1", "ten", "101"] {
            let err = parse(PageParams {
                limit: Some(raw),
                ..PageParams::default()
            });
            assert!(err.is_err(), "limit {raw} should be rejected");
        }
    }

    #[test]
    fn malformed_cursor_is_rejected() {
        let err = parse(PageParams {
            cursor: Some("not-a-uuid"),
            ..PageParams::default()
        })
        .unwrap_err();
        assert!(matches!(err, ParamError::Model(ModelError::InvalidCursor(_))));
    }

    #[test]
    fn cursor_overrides_skip() {
        let id = OrderID::new();
        let cursor = id.to_string();
        let request = parse(PageParams {
            skip: Some("20"),
            cursor: Some(&cursor),
            ..PageParams::default()
        })
        .unwrap();
        assert_eq!(request.pagination, Pagination::After { cursor: id });
    }

    #[test]
    fn blank_cursor_and_search_are_absent() {
        let request = parse(PageParams {
            skip: Some("30"),
            cursor: Some(""),
            search: Some("   "),
            ..PageParams::default()
        })
        .unwrap();
        assert_eq!(request.pagination, Pagination::Offset { skip: 30 });
        assert!(request.search.is_none());
    }
}
