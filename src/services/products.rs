//! Products, their price history and transport-company links.

use super::{ensure_min_decimal, fetch_page, pricing, search_term, Page, PageRequest};
use crate::{
    entities::{category, price, product, product_transport_company, purchase_item, transport_company},
    errors::ServiceError,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    ModelTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, sync::Arc};
use tracing::{info, instrument};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

const MAX_PRICE: Decimal = dec!(99999999.99);

fn default_true() -> bool {
    true
}

/// Price values: at least 0.01, two decimal places, ten digits.
pub(crate) fn validate_price_value(value: &Decimal) -> Result<(), ValidationError> {
    ensure_min_decimal("price", *value, dec!(0.01))?;
    if *value > MAX_PRICE || value.normalize().scale() > pricing::MONEY_SCALE {
        let mut err = ValidationError::new("price_format");
        err.message = Some("price must have at most 8 integer digits and 2 decimals".into());
        return Err(err);
    }
    Ok(())
}

/// Create or replace a product
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ProductInput {
    #[validate(length(min = 1, max = 200, message = "Product name must be 1-200 characters"))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category_id: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// Replaces the full set of linked companies
    #[serde(default)]
    pub transport_company_ids: Vec<i32>,
}

/// Admin list filters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductFilter {
    pub search: Option<String>,
    pub category_id: Option<i32>,
    pub is_active: Option<bool>,
    pub transport_company_id: Option<i32>,
}

/// Product list row
#[derive(Debug, Clone, Serialize)]
pub struct ProductRow {
    #[serde(flatten)]
    pub product: product::Model,
    pub category_name: Option<String>,
    pub current_price: Option<Decimal>,
}

/// Product with everything the edit form shows
#[derive(Debug, Clone, Serialize)]
pub struct ProductView {
    #[serde(flatten)]
    pub product: product::Model,
    pub category: category::Model,
    pub transport_companies: Vec<transport_company::Model>,
    pub current_price: Option<Decimal>,
    /// Full history including future prices, newest first
    pub prices: Vec<price::Model>,
}

/// Price appended to one product's history
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct PriceInput {
    #[validate(custom = "validate_price_value")]
    pub value: Decimal,
    /// Defaults to now
    pub start_date: Option<DateTime<Utc>>,
}

/// Price record edited on its own
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct PriceRecordInput {
    pub product_id: i32,
    #[validate(custom = "validate_price_value")]
    pub value: Decimal,
    pub start_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PriceFilter {
    /// Matches the product name
    pub search: Option<String>,
    pub product_id: Option<i32>,
    pub category_id: Option<i32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PriceRow {
    #[serde(flatten)]
    pub price: price::Model,
    pub product_name: String,
}

#[derive(Clone)]
pub struct ProductService {
    db: Arc<DatabaseConnection>,
}

impl ProductService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Products ordered by name with their category and current price
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        filter: ProductFilter,
        page: PageRequest,
    ) -> Result<Page<ProductRow>, ServiceError> {
        let db = &*self.db;
        let mut query = product::Entity::find();

        if let Some(term) = search_term(filter.search.as_deref()) {
            query = query.filter(
                Condition::any()
                    .add(product::Column::Name.contains(term.as_str()))
                    .add(product::Column::Description.contains(term.as_str())),
            );
        }
        if let Some(category_id) = filter.category_id {
            query = query.filter(product::Column::CategoryId.eq(category_id));
        }
        if let Some(is_active) = filter.is_active {
            query = query.filter(product::Column::IsActive.eq(is_active));
        }
        if let Some(company_id) = filter.transport_company_id {
            let product_ids: Vec<i32> = product_transport_company::Entity::find()
                .filter(product_transport_company::Column::TransportCompanyId.eq(company_id))
                .all(db)
                .await?
                .into_iter()
                .map(|link| link.product_id)
                .collect();
            query = query.filter(product::Column::Id.is_in(product_ids));
        }

        let query = query
            .order_by_asc(product::Column::Name)
            .order_by_asc(product::Column::Id);
        let page = fetch_page(query, db, page).await?;

        let ids: Vec<i32> = page.items.iter().map(|p| p.id).collect();
        let category_ids: Vec<i32> = page.items.iter().map(|p| p.category_id).collect();
        let prices = pricing::resolve_current_prices(db, &ids, Utc::now()).await?;
        let categories = category_names(db, &category_ids).await?;

        Ok(page.map(|product| ProductRow {
            category_name: categories.get(&product.category_id).cloned(),
            current_price: prices.get(&product.id).copied(),
            product,
        }))
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: i32) -> Result<ProductView, ServiceError> {
        let db = &*self.db;
        let found = find_product(db, id).await?;

        let category = found
            .find_related(category::Entity)
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::InternalError(format!("Product {} has no category", id))
            })?;
        let transport_companies = found
            .find_related(transport_company::Entity)
            .order_by_asc(transport_company::Column::Name)
            .all(db)
            .await?;
        let prices = found
            .find_related(price::Entity)
            .order_by_desc(price::Column::StartDate)
            .order_by_desc(price::Column::Id)
            .all(db)
            .await?;

        Ok(ProductView {
            current_price: pricing::current_price(&prices, Utc::now()),
            product: found,
            category,
            transport_companies,
            prices,
        })
    }

    #[instrument(skip(self))]
    pub async fn create(&self, input: ProductInput) -> Result<ProductView, ServiceError> {
        input.validate()?;
        let txn = self.db.begin().await?;

        ensure_category_exists(&txn, input.category_id).await?;
        let company_ids = ensure_companies_exist(&txn, &input.transport_company_ids).await?;

        let created = product::ActiveModel {
            name: Set(input.name.trim().to_string()),
            description: Set(input.description),
            category_id: Set(input.category_id),
            is_active: Set(input.is_active),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        replace_company_links(&txn, created.id, &company_ids).await?;
        txn.commit().await?;

        info!(product_id = created.id, "Created product");
        self.get(created.id).await
    }

    #[instrument(skip(self))]
    pub async fn update(&self, id: i32, input: ProductInput) -> Result<ProductView, ServiceError> {
        input.validate()?;
        let txn = self.db.begin().await?;

        let existing = find_product(&txn, id).await?;
        ensure_category_exists(&txn, input.category_id).await?;
        let company_ids = ensure_companies_exist(&txn, &input.transport_company_ids).await?;

        let mut active: product::ActiveModel = existing.into();
        active.name = Set(input.name.trim().to_string());
        active.description = Set(input.description);
        active.category_id = Set(input.category_id);
        active.is_active = Set(input.is_active);
        active.update(&txn).await?;

        replace_company_links(&txn, id, &company_ids).await?;
        txn.commit().await?;

        info!(product_id = id, "Updated product");
        self.get(id).await
    }

    /// Refused while any purchase line references the product; prices and
    /// company links go with it.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i32) -> Result<(), ServiceError> {
        let db = &*self.db;
        let existing = find_product(db, id).await?;

        let referencing = purchase_item::Entity::find()
            .filter(purchase_item::Column::ProductId.eq(id))
            .count(db)
            .await?;
        if referencing > 0 {
            return Err(ServiceError::IntegrityError(format!(
                "Product {} is referenced by {} purchase items",
                id, referencing
            )));
        }

        existing.delete(db).await?;
        info!(product_id = id, "Deleted product");
        Ok(())
    }

    /// Whole history of one product, newest first
    #[instrument(skip(self))]
    pub async fn list_prices(&self, product_id: i32) -> Result<Vec<price::Model>, ServiceError> {
        let db = &*self.db;
        find_product(db, product_id).await?;
        Ok(price::Entity::find()
            .filter(price::Column::ProductId.eq(product_id))
            .order_by_desc(price::Column::StartDate)
            .order_by_desc(price::Column::Id)
            .all(db)
            .await?)
    }

    #[instrument(skip(self))]
    pub async fn add_price(
        &self,
        product_id: i32,
        input: PriceInput,
    ) -> Result<price::Model, ServiceError> {
        input.validate()?;
        let db = &*self.db;
        find_product(db, product_id).await?;
        insert_price(db, product_id, input.value, input.start_date).await
    }

    /// Prices across all products, newest first
    #[instrument(skip(self))]
    pub async fn list_all_prices(
        &self,
        filter: PriceFilter,
        page: PageRequest,
    ) -> Result<Page<PriceRow>, ServiceError> {
        let db = &*self.db;
        let mut query = price::Entity::find();

        if let Some(product_id) = filter.product_id {
            query = query.filter(price::Column::ProductId.eq(product_id));
        }

        let search = search_term(filter.search.as_deref());
        if search.is_some() || filter.category_id.is_some() {
            let mut products = product::Entity::find().select_only().column(product::Column::Id);
            if let Some(term) = search {
                products = products.filter(product::Column::Name.contains(term));
            }
            if let Some(category_id) = filter.category_id {
                products = products.filter(product::Column::CategoryId.eq(category_id));
            }
            let ids: Vec<i32> = products.into_tuple().all(db).await?;
            query = query.filter(price::Column::ProductId.is_in(ids));
        }

        let query = query
            .order_by_desc(price::Column::StartDate)
            .order_by_desc(price::Column::Id);
        let page = fetch_page(query, db, page).await?;

        let product_ids: Vec<i32> = page.items.iter().map(|p| p.product_id).collect();
        let names: HashMap<i32, String> = product::Entity::find()
            .filter(product::Column::Id.is_in(product_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|p| (p.id, p.name))
            .collect();

        Ok(page.map(|price| PriceRow {
            product_name: names.get(&price.product_id).cloned().unwrap_or_default(),
            price,
        }))
    }

    #[instrument(skip(self))]
    pub async fn get_price(&self, id: i32) -> Result<price::Model, ServiceError> {
        find_price(&*self.db, id).await
    }

    #[instrument(skip(self))]
    pub async fn create_price(&self, input: PriceRecordInput) -> Result<price::Model, ServiceError> {
        input.validate()?;
        let db = &*self.db;
        find_product(db, input.product_id)
            .await
            .map_err(|_| missing_reference("Product", input.product_id))?;
        insert_price(db, input.product_id, input.value, input.start_date).await
    }

    /// Prices are meant to be appended, but corrections are allowed
    #[instrument(skip(self))]
    pub async fn update_price(
        &self,
        id: i32,
        input: PriceRecordInput,
    ) -> Result<price::Model, ServiceError> {
        input.validate()?;
        let db = &*self.db;
        let existing = find_price(db, id).await?;
        find_product(db, input.product_id)
            .await
            .map_err(|_| missing_reference("Product", input.product_id))?;

        let mut active: price::ActiveModel = existing.into();
        active.product_id = Set(input.product_id);
        active.value = Set(input.value);
        if let Some(start_date) = input.start_date {
            active.start_date = Set(start_date);
        }
        Ok(active.update(db).await?)
    }

    #[instrument(skip(self))]
    pub async fn delete_price(&self, id: i32) -> Result<(), ServiceError> {
        let db = &*self.db;
        find_price(db, id).await?.delete(db).await?;
        info!(price_id = id, "Deleted price");
        Ok(())
    }
}

fn missing_reference(kind: &str, id: i32) -> ServiceError {
    ServiceError::InvalidInput(format!("{} {} does not exist", kind, id))
}

pub(crate) async fn find_product<C: ConnectionTrait>(
    conn: &C,
    id: i32,
) -> Result<product::Model, ServiceError> {
    product::Entity::find_by_id(id)
        .one(conn)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Product {} not found", id)))
}

async fn find_price<C: ConnectionTrait>(conn: &C, id: i32) -> Result<price::Model, ServiceError> {
    price::Entity::find_by_id(id)
        .one(conn)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Price {} not found", id)))
}

async fn insert_price<C: ConnectionTrait>(
    conn: &C,
    product_id: i32,
    value: Decimal,
    start_date: Option<DateTime<Utc>>,
) -> Result<price::Model, ServiceError> {
    let mut active = price::ActiveModel {
        product_id: Set(product_id),
        value: Set(value),
        ..Default::default()
    };
    if let Some(start_date) = start_date {
        active.start_date = Set(start_date);
    }
    let created = active.insert(conn).await?;
    info!(product_id, price_id = created.id, value = %created.value, "Added price");
    Ok(created)
}

async fn ensure_category_exists<C: ConnectionTrait>(conn: &C, id: i32) -> Result<(), ServiceError> {
    category::Entity::find_by_id(id)
        .one(conn)
        .await?
        .map(|_| ())
        .ok_or_else(|| missing_reference("Category", id))
}

/// Deduplicated ids, all of which must exist.
async fn ensure_companies_exist<C: ConnectionTrait>(
    conn: &C,
    ids: &[i32],
) -> Result<Vec<i32>, ServiceError> {
    let mut ids = ids.to_vec();
    ids.sort_unstable();
    ids.dedup();
    if ids.is_empty() {
        return Ok(ids);
    }

    let found = transport_company::Entity::find()
        .filter(transport_company::Column::Id.is_in(ids.clone()))
        .count(conn)
        .await?;
    if found != ids.len() as u64 {
        return Err(ServiceError::InvalidInput(
            "Unknown transport company in transport_company_ids".to_string(),
        ));
    }
    Ok(ids)
}

async fn replace_company_links<C: ConnectionTrait>(
    conn: &C,
    product_id: i32,
    company_ids: &[i32],
) -> Result<(), ServiceError> {
    product_transport_company::Entity::delete_many()
        .filter(product_transport_company::Column::ProductId.eq(product_id))
        .exec(conn)
        .await?;

    if company_ids.is_empty() {
        return Ok(());
    }

    let links = company_ids
        .iter()
        .map(|&company_id| product_transport_company::ActiveModel {
            product_id: Set(product_id),
            transport_company_id: Set(company_id),
        });
    product_transport_company::Entity::insert_many(links)
        .exec_without_returning(conn)
        .await?;
    Ok(())
}

async fn category_names<C: ConnectionTrait>(
    conn: &C,
    ids: &[i32],
) -> Result<HashMap<i32, String>, ServiceError> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    Ok(category::Entity::find()
        .filter(category::Column::Id.is_in(ids.iter().copied()))
        .all(conn)
        .await?
        .into_iter()
        .map(|c| (c.id, c.name))
        .collect())
}
