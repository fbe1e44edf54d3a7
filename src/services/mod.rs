//! Business logic behind the HTTP handlers.
//!
//! Each service owns a handle to the connection pool; multi-statement writes
//! run inside one transaction and pass that transaction down explicitly.

pub mod catalog;
pub mod categories;
pub mod discount_cards;
pub mod pricing;
pub mod products;
pub mod purchases;
pub mod registers;
pub mod transport_companies;

use sea_orm::{ConnectionTrait, DbErr, EntityTrait, FromQueryResult, PaginatorTrait, Select};
use serde::Serialize;
use utoipa::ToSchema;

/// 1-based page request; both numbers are clamped to at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub per_page: u64,
}

impl PageRequest {
    pub fn new(page: u64, per_page: u64) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.max(1),
        }
    }
}

/// One page of results plus the numbers needed to render a pager
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u64,
    pub per_page: u64,
    pub total: u64,
    pub total_pages: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, request: PageRequest, total: u64) -> Self {
        Self {
            items,
            page: request.page,
            per_page: request.per_page,
            total,
            total_pages: total.div_ceil(request.per_page),
        }
    }

    /// True when the requested page lies after the last one. The first page
    /// of an empty result is still a valid page.
    pub fn is_past_end(&self) -> bool {
        self.page > 1 && self.page > self.total_pages
    }

    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            per_page: self.per_page,
            total: self.total,
            total_pages: self.total_pages,
        }
    }
}

/// Runs `select` as a paginated query.
pub async fn fetch_page<E, C>(
    select: Select<E>,
    conn: &C,
    request: PageRequest,
) -> Result<Page<E::Model>, DbErr>
where
    E: EntityTrait,
    E::Model: FromQueryResult + Send + Sync,
    C: ConnectionTrait,
{
    let paginator = select.paginate(conn, request.per_page);
    let total = paginator.num_items().await?;
    let items = paginator.fetch_page(request.page - 1).await?;
    Ok(Page::new(items, request, total))
}

/// Trimmed search term, `None` when blank.
pub(crate) fn search_term(search: Option<&str>) -> Option<String> {
    search
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Rejects a decimal amount below `min`.
pub(crate) fn ensure_min_decimal(
    field: &'static str,
    value: rust_decimal::Decimal,
    min: rust_decimal::Decimal,
) -> Result<(), validator::ValidationError> {
    if value < min {
        let mut err = validator::ValidationError::new("range");
        err.message = Some(format!("{} must be at least {}", field, min).into());
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_counts_round_up() {
        let page: Page<u8> = Page::new(vec![], PageRequest::new(1, 20), 41);
        assert_eq!(page.total_pages, 3);
        assert!(!page.is_past_end());
    }

    #[test]
    fn first_page_of_empty_result_is_valid() {
        let page: Page<u8> = Page::new(vec![], PageRequest::new(1, 20), 0);
        assert_eq!(page.total_pages, 0);
        assert!(!page.is_past_end());
    }

    #[test]
    fn page_after_last_is_past_end() {
        let page: Page<u8> = Page::new(vec![], PageRequest::new(3, 20), 40);
        assert!(page.is_past_end());
    }

    #[test]
    fn page_request_clamps_to_one() {
        assert_eq!(PageRequest::new(0, 0), PageRequest { page: 1, per_page: 1 });
    }

    #[test]
    fn blank_search_terms_are_ignored() {
        assert_eq!(search_term(Some("   ")), None);
        assert_eq!(search_term(Some(" milk ")), Some("milk".to_string()));
        assert_eq!(search_term(None), None);
    }
}
