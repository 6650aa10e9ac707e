//! Pagination types for person listing

use serde::{Deserialize, Serialize};

/// Maximum items per page
const MAX_LIMIT: u32 = 100;

/// Default items per page
const DEFAULT_LIMIT: u32 = 10;

/// Pagination parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Page number (1-indexed)
    pub page: u32,
    /// Items per page (max 100)
    pub limit: u32,
}

impl Pagination {
    /// Create pagination with validation.
    ///
    /// - Page is clamped to minimum of 1
    /// - Limit is clamped to 1..=100
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit: limit.clamp(1, MAX_LIMIT),
        }
    }

    /// Calculate SQL OFFSET value.
    pub fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.limit as u64
    }

    /// Get LIMIT value.
    pub fn limit(&self) -> u32 {
        self.limit
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_LIMIT,
        }
    }
}

/// Paginated response envelope: `{page, limit, total, data}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
    /// Current page number
    pub page: u32,
    /// Items per page
    pub limit: u32,
    /// Total count across all pages
    pub total: i64,
    /// Items for current page
    pub data: Vec<T>,
}

impl<T> Paginated<T> {
    /// Convert every item, keeping the envelope.
    pub fn map<U, F>(self, f: F) -> Paginated<U>
    where
        F: FnMut(T) -> U,
    {
        Paginated {
            page: self.page,
            limit: self.limit,
            total: self.total,
            data: self.data.into_iter().map(f).collect(),
        }
    }
}

/// Query parameters for pagination.
///
/// Kept as raw strings so that non-numeric values fall back to the defaults
/// instead of rejecting the request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaginationParams {
    pub page: Option<String>,
    pub limit: Option<String>,
}

fn parse_positive(raw: Option<&str>) -> Option<u32> {
    raw.and_then(|s| s.trim().parse::<u32>().ok())
        .filter(|n| *n > 0)
}

impl From<PaginationParams> for Pagination {
    fn from(params: PaginationParams) -> Self {
        Self::new(
            parse_positive(params.page.as_deref()).unwrap_or(1),
            parse_positive(params.limit.as_deref()).unwrap_or(DEFAULT_LIMIT),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(page: Option<&str>, limit: Option<&str>) -> PaginationParams {
        PaginationParams {
            page: page.map(str::to_owned),
            limit: limit.map(str::to_owned),
        }
    }

    #[test]
    fn offset_calculation() {
        let p = Pagination::new(1, 10);
        assert_eq!(p.offset(), 0);

        let p = Pagination::new(2, 10);
        assert_eq!(p.offset(), 10);

        let p = Pagination::new(3, 25);
        assert_eq!(p.offset(), 50);
    }

    #[test]
    fn clamps_page_and_limit() {
        assert_eq!(Pagination::new(0, 10).page, 1);
        assert_eq!(Pagination::new(1, 0).limit, 1);
        assert_eq!(Pagination::new(1, 999).limit, 100);
    }

    #[test]
    fn defaults_when_absent() {
        let p = Pagination::from(params(None, None));
        assert_eq!(p, Pagination { page: 1, limit: 10 });
    }

    #[test]
    fn defaults_when_non_numeric() {
        let p = Pagination::from(params(Some("abc"), Some("ten")));
        assert_eq!(p, Pagination { page: 1, limit: 10 });

        let p = Pagination::from(params(Some("-2"), Some("0")));
        assert_eq!(p, Pagination { page: 1, limit: 10 });
    }

    #[test]
    fn parses_numeric_values() {
        let p = Pagination::from(params(Some("2"), Some("25")));
        assert_eq!(p, Pagination { page: 2, limit: 25 });
    }

    #[test]
    fn map_keeps_envelope() {
        let paginated = Paginated {
            page: 2,
            limit: 10,
            total: 15,
            data: vec![1, 2, 3],
        };
        let mapped = paginated.map(|n| n * 2);
        assert_eq!(mapped.data, vec![2, 4, 6]);
        assert_eq!((mapped.page, mapped.limit, mapped.total), (2, 10, 15));
    }
}
