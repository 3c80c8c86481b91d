pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 10;

/// Largest row count Postgres accepts for `LIMIT`/`OFFSET` (a signed bigint).
const MAX_ROWS: u64 = i64::MAX as u64;

/// A page request against the task list. Both values are always at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page: u64,
    limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl Pagination {
    /// Creates a pagination, replacing zero values with the defaults.
    ///
    /// Values above `i64::MAX` are capped there.
    pub fn new(page: u64, limit: u64) -> Self {
        Self {
            page: if page < 1 { DEFAULT_PAGE } else { page.min(MAX_ROWS) },
            limit: if limit < 1 { DEFAULT_LIMIT } else { limit.min(MAX_ROWS) },
        }
    }

    /// Builds a pagination from raw query-string values.
    ///
    /// Absent, unparseable, zero or negative values fall back to the defaults.
    pub fn from_query(page: Option<&str>, limit: Option<&str>) -> Self {
        Self::new(parse_positive(page), parse_positive(limit))
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    /// Number of rows to skip before this page starts, capped at `i64::MAX`.
    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit).min(MAX_ROWS)
    }
}

fn parse_positive(value: Option<&str>) -> u64 {
    value
        .and_then(|raw| raw.trim().parse::<i64>().ok())
        .filter(|parsed| *parsed > 0)
        .map_or(0, |parsed| parsed as u64)
}
