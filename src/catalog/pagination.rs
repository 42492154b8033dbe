use crate::error::{CoreError, CoreResult};

/// One page of a skip/limit listing.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub current_page: i64,
    pub page_total: i64,
}

/// Reject window parameters that cannot describe a page.
pub fn check_window(skip: i64, limit: i64) -> CoreResult<()> {
    if skip < 0 {
        return Err(CoreError::invalid(format!("skip must be >= 0, got {}", skip)));
    }
    if limit <= 0 {
        return Err(CoreError::invalid(format!("limit must be > 0, got {}", limit)));
    }
    Ok(())
}

/// 1-based page that starts at `skip`.
pub fn current_page(skip: i64, limit: i64) -> i64 {
    (skip / limit).saturating_add(1)
}

/// Number of pages needed to show `count` items, zero for an empty listing.
pub fn page_total(count: i64, limit: i64) -> i64 {
    if count <= 0 {
        0
    } else {
        (count - 1) / limit + 1
    }
}
