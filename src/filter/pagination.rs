use serde::{Deserialize, Serialize};

pub const DEFAULT_LIMIT: u64 = 10;

/// A clamped page window. `page` is 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub limit: u64,
}

impl PageRequest {
    /// Clamp raw values: `page < 1` becomes 1, `limit < 1` becomes
    /// [`DEFAULT_LIMIT`], and `limit` never exceeds `max_limit` when one is set.
    pub fn new(page: i64, limit: i64, max_limit: Option<u64>) -> Self {
        let page = if page < 1 { 1 } else { page as u64 };
        let mut limit = if limit < 1 { DEFAULT_LIMIT } else { limit as u64 };
        if let Some(max) = max_limit.filter(|m| *m > 0) {
            if limit > max {
                tracing::debug!("Limit {} exceeds max {}, capping to max", limit, max);
                limit = max;
            }
        }
        Self { page, limit }
    }

    /// Build from raw query strings. Unparsable values behave like 0.
    pub fn from_query(page: Option<&str>, limit: Option<&str>, max_limit: Option<u64>) -> Self {
        let parse = |v: Option<&str>, default: i64| match v {
            Some(s) => s.trim().parse::<i64>().unwrap_or(0),
            None => default,
        };
        Self::new(parse(page, 1), parse(limit, DEFAULT_LIMIT as i64), max_limit)
    }

    pub fn skip(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    pub fn total_pages(&self, total_count: u64) -> u64 {
        total_count.div_ceil(self.limit)
    }

    /// True when the requested page lies past the last page of a non-empty result.
    pub fn is_beyond(&self, total_count: u64) -> bool {
        let total_pages = self.total_pages(total_count);
        total_pages > 0 && self.page > total_pages
    }

    pub fn paginate(&self, total_count: u64) -> Pagination {
        let total_pages = self.total_pages(total_count);
        Pagination {
            page: self.page,
            limit: self.limit,
            total_count,
            total_pages,
            has_next: self.page < total_pages,
            has_prev: self.page > 1,
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { page: 1, limit: DEFAULT_LIMIT }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u64,
    pub limit: u64,
    pub total_count: u64,
    pub total_pages: u64,
    pub has_next: bool,
    pub has_prev: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_page_and_limit() {
        assert_eq!(PageRequest::new(0, 0, None), PageRequest { page: 1, limit: 10 });
        assert_eq!(PageRequest::new(-3, -1, None), PageRequest { page: 1, limit: 10 });
        assert_eq!(PageRequest::new(2, 500, Some(200)), PageRequest { page: 2, limit: 200 });
        assert_eq!(PageRequest::new(2, 500, None), PageRequest { page: 2, limit: 500 });
    }

    #[test]
    fn parses_query_strings() {
        assert_eq!(PageRequest::from_query(None, None, None), PageRequest::default());
        assert_eq!(PageRequest::from_query(Some("abc"), Some("x"), None), PageRequest::default());
        assert_eq!(PageRequest::from_query(Some("3"), Some("25"), Some(200)), PageRequest { page: 3, limit: 25 });
    }

    #[test]
    fn computes_skip_and_pages() {
        let req = PageRequest::new(3, 10, None);
        assert_eq!(req.skip(), 20);
        assert_eq!(req.total_pages(21), 3);
        assert_eq!(req.total_pages(20), 2);
        assert_eq!(req.total_pages(0), 0);
    }

    #[test]
    fn metadata_reflects_position() {
        let first = PageRequest::new(1, 10, None).paginate(25);
        assert_eq!(first.total_pages, 3);
        assert!(first.has_next);
        assert!(!first.has_prev);

        let last = PageRequest::new(3, 10, None).paginate(25);
        assert!(!last.has_next);
        assert!(last.has_prev);
    }

    #[test]
    fn page_past_the_end_is_beyond_without_error() {
        let req = PageRequest::new(5, 10, None);
        assert!(req.is_beyond(25));
        let meta = req.paginate(25);
        assert!(!meta.has_next);
        assert_eq!(meta.total_pages, 3);

        // An empty collection never counts as out of range.
        assert!(!req.is_beyond(0));
    }
}
