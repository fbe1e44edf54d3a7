//! Read-only public catalog.

use super::{pricing, Page, PageRequest};
use crate::{
    entities::{category, price, product, transport_company, ActiveFlag},
    errors::ServiceError,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, FromQueryResult, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Select,
};
use serde::Serialize;
use std::{collections::HashMap, sync::Arc};
use tracing::{debug, instrument};
use utoipa::ToSchema;

/// Products and categories shown per catalog page
pub const CATALOG_PAGE_SIZE: u64 = 20;

/// Which page of a listing the visitor asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSelector {
    Number(u64),
    Last,
}

impl PageSelector {
    /// Missing or blank means the first page; anything that is neither a
    /// positive number nor `last` does not name a page.
    pub fn parse(raw: Option<&str>) -> Result<Self, ServiceError> {
        let raw = raw.map(str::trim).unwrap_or_default();
        if raw.is_empty() {
            return Ok(Self::Number(1));
        }
        if raw == "last" {
            return Ok(Self::Last);
        }
        match raw.parse::<u64>() {
            Ok(n) if n >= 1 => Ok(Self::Number(n)),
            _ => Err(ServiceError::NotFound(format!("Invalid page '{}'", raw))),
        }
    }
}

/// Parses an id taken from a public URL; anything unparseable is a miss.
pub fn parse_path_id(raw: &str, kind: &str) -> Result<i32, ServiceError> {
    raw.trim()
        .parse::<i32>()
        .map_err(|_| ServiceError::NotFound(format!("{} '{}' not found", kind, raw)))
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CategorySummary {
    pub id: i32,
    pub name: String,
    pub description: String,
}

impl From<category::Model> for CategorySummary {
    fn from(model: category::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProductSummary {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub category: Option<CategorySummary>,
    /// `null` when no price has started yet
    #[schema(value_type = Option<String>, example = "99.90")]
    pub current_price: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PriceEntry {
    #[schema(value_type = String, example = "99.90")]
    pub value: Decimal,
    pub start_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProductDetail {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub category: CategorySummary,
    pub transport_companies: Vec<String>,
    #[schema(value_type = Option<String>, example = "99.90")]
    pub current_price: Option<Decimal>,
    /// Prices that have taken effect, newest first
    pub price_history: Vec<PriceEntry>,
}

/// Product listing page, optionally narrowed to one category
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProductListing {
    /// Every category, for the filter menu
    pub categories: Vec<CategorySummary>,
    /// The category the list is narrowed to
    pub category: Option<CategorySummary>,
    pub products: Page<ProductSummary>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CategoryListing {
    pub categories: Page<CategorySummary>,
}

#[derive(Clone)]
pub struct CatalogService {
    db: Arc<DatabaseConnection>,
    per_page: u64,
}

impl CatalogService {
    pub fn new(db: Arc<DatabaseConnection>, per_page: u64) -> Self {
        Self {
            db,
            per_page: per_page.max(1),
        }
    }

    /// Active products by name. A `category` that is not a number is ignored.
    #[instrument(skip(self))]
    pub async fn list_products(
        &self,
        category: Option<&str>,
        page: PageSelector,
    ) -> Result<ProductListing, ServiceError> {
        let db = &*self.db;
        let category_id = category
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .and_then(|c| c.parse::<i32>().ok());

        let mut query = product::Entity::find_active();
        let mut selected = None;
        if let Some(category_id) = category_id {
            query = query.filter(product::Column::CategoryId.eq(category_id));
            selected = category::Entity::find_by_id(category_id)
                .one(db)
                .await?
                .map(CategorySummary::from);
        } else if category.is_some_and(|c| !c.trim().is_empty()) {
            debug!(?category, "Ignoring unparseable category filter");
        }

        let products = self.product_page(query, page).await?;
        Ok(ProductListing {
            categories: all_categories(db).await?,
            category: selected,
            products,
        })
    }

    /// Active product with its current price and the prices that have taken
    /// effect. Inactive products are not found.
    #[instrument(skip(self))]
    pub async fn product_detail(&self, raw_id: &str) -> Result<ProductDetail, ServiceError> {
        let db = &*self.db;
        let id = parse_path_id(raw_id, "Product")?;
        let found = product::Entity::find_active()
            .filter(product::Column::Id.eq(id))
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Product {} not found", id)))?;

        let category = found
            .find_related(category::Entity)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::InternalError(format!("Product {} has no category", id)))?;
        let transport_companies = found
            .find_related(transport_company::Entity)
            .order_by_asc(transport_company::Column::Name)
            .all(db)
            .await?
            .into_iter()
            .map(|c| c.name)
            .collect();
        let history = found.find_related(price::Entity).all(db).await?;

        let now = Utc::now();
        let price_history = pricing::effective_history(&history, now)
            .into_iter()
            .map(|p| PriceEntry {
                value: p.value,
                start_date: p.start_date,
            })
            .collect();

        Ok(ProductDetail {
            id: found.id,
            name: found.name,
            description: found.description,
            category: category.into(),
            transport_companies,
            current_price: pricing::current_price(&history, now),
            price_history,
        })
    }

    #[instrument(skip(self))]
    pub async fn list_categories(&self, page: PageSelector) -> Result<CategoryListing, ServiceError> {
        let query = category::Entity::find()
            .order_by_asc(category::Column::Name)
            .order_by_asc(category::Column::Id);
        let categories = strict_page(query, &*self.db, page, self.per_page).await?;
        Ok(CategoryListing {
            categories: categories.map(CategorySummary::from),
        })
    }

    /// Active products of one category; an unknown category is not found.
    #[instrument(skip(self))]
    pub async fn category_products(
        &self,
        raw_category_id: &str,
        page: PageSelector,
    ) -> Result<ProductListing, ServiceError> {
        let db = &*self.db;
        let category_id = parse_path_id(raw_category_id, "Category")?;
        let selected = category::Entity::find_by_id(category_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Category {} not found", category_id)))?;

        let query = product::Entity::find_active()
            .filter(product::Column::CategoryId.eq(category_id));
        let products = self.product_page(query, page).await?;

        Ok(ProductListing {
            categories: all_categories(db).await?,
            category: Some(selected.into()),
            products,
        })
    }

    async fn product_page(
        &self,
        query: Select<product::Entity>,
        page: PageSelector,
    ) -> Result<Page<ProductSummary>, ServiceError> {
        let db = &*self.db;
        let query = query
            .order_by_asc(product::Column::Name)
            .order_by_asc(product::Column::Id);
        let products = strict_page(query, db, page, self.per_page).await?;

        let ids: Vec<i32> = products.items.iter().map(|p| p.id).collect();
        let prices = pricing::resolve_current_prices(db, &ids, Utc::now()).await?;
        let categories: HashMap<i32, category::Model> = category::Entity::find()
            .filter(category::Column::Id.is_in(products.items.iter().map(|p| p.category_id)))
            .all(db)
            .await?
            .into_iter()
            .map(|c| (c.id, c))
            .collect();

        Ok(products.map(|p| ProductSummary {
            current_price: prices.get(&p.id).copied(),
            category: categories.get(&p.category_id).cloned().map(Into::into),
            id: p.id,
            name: p.name,
            description: p.description,
        }))
    }
}

async fn all_categories<C: ConnectionTrait>(conn: &C) -> Result<Vec<CategorySummary>, ServiceError> {
    Ok(category::Entity::find()
        .order_by_asc(category::Column::Name)
        .all(conn)
        .await?
        .into_iter()
        .map(Into::into)
        .collect())
}

/// Paginates like the catalog pager: pages past the end are not found,
/// `last` resolves to the final page.
async fn strict_page<E, C>(
    select: Select<E>,
    conn: &C,
    selector: PageSelector,
    per_page: u64,
) -> Result<Page<E::Model>, ServiceError>
where
    E: EntityTrait,
    E::Model: FromQueryResult + Send + Sync,
    C: ConnectionTrait,
{
    let paginator = select.paginate(conn, per_page);
    let total = paginator.num_items().await?;
    let number = match selector {
        PageSelector::Number(n) => n,
        PageSelector::Last => total.div_ceil(per_page).max(1),
    };
    let request = PageRequest::new(number, per_page);

    if Page::<()>::new(Vec::new(), request, total).is_past_end() {
        return Err(ServiceError::NotFound(format!("Page {} does not exist", number)));
    }

    let items = paginator.fetch_page(number - 1).await?;
    Ok(Page::new(items, request, total))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rstest::rstest;

    #[rstest]
    #[case(None, PageSelector::Number(1))]
    #[case(Some(""), PageSelector::Number(1))]
    #[case(Some("3"), PageSelector::Number(3))]
    #[case(Some("last"), PageSelector::Last)]
    fn parses_page_selectors(#[case] raw: Option<&str>, #[case] expected: PageSelector) {
        assert_eq!(PageSelector::parse(raw).unwrap(), expected);
    }

    #[rstest]
    #[case("0")]
    #[case("-2")]
    #[case("abc")]
    fn rejects_invalid_pages(#[case] raw: &str) {
        assert_matches!(PageSelector::parse(Some(raw)), Err(ServiceError::NotFound(_)));
    }

    #[test]
    fn malformed_path_ids_are_not_found() {
        assert_eq!(parse_path_id("42", "Product").unwrap(), 42);
        assert_matches!(parse_path_id("abc", "Product"), Err(ServiceError::NotFound(_)));
        assert_matches!(parse_path_id("", "Product"), Err(ServiceError::NotFound(_)));
    }
}
