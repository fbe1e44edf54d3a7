use super::{ensure_min_decimal, fetch_page, registers::ActiveFilter, search_term, Page, PageRequest};
use crate::{entities::discount_card, errors::ServiceError};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

fn default_true() -> bool {
    true
}

/// 0..=100 with at most two decimals
fn validate_discount_percent(value: &Decimal) -> Result<(), ValidationError> {
    ensure_min_decimal("discount_percent", *value, Decimal::ZERO)?;
    if *value > Decimal::ONE_HUNDRED || value.normalize().scale() > 2 {
        let mut err = ValidationError::new("range");
        err.message = Some("discount_percent must be between 0 and 100 with 2 decimals".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct DiscountCardInput {
    #[validate(length(min = 1, max = 20, message = "Card number must be 1-20 characters"))]
    pub card_number: String,
    #[validate(custom = "validate_discount_percent")]
    pub discount_percent: Decimal,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Clone)]
pub struct DiscountCardService {
    db: Arc<DatabaseConnection>,
}

impl DiscountCardService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        filter: ActiveFilter,
        page: PageRequest,
    ) -> Result<Page<discount_card::Model>, ServiceError> {
        let mut query = discount_card::Entity::find();
        if let Some(term) = search_term(filter.search.as_deref()) {
            query = query.filter(discount_card::Column::CardNumber.contains(term));
        }
        if let Some(is_active) = filter.is_active {
            query = query.filter(discount_card::Column::IsActive.eq(is_active));
        }
        let query = query.order_by_asc(discount_card::Column::CardNumber);
        Ok(fetch_page(query, &*self.db, page).await?)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: i32) -> Result<discount_card::Model, ServiceError> {
        discount_card::Entity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Discount card {} not found", id)))
    }

    #[instrument(skip(self))]
    pub async fn create(
        &self,
        input: DiscountCardInput,
    ) -> Result<discount_card::Model, ServiceError> {
        input.validate()?;
        let card_number = input.card_number.trim().to_string();
        self.ensure_unique_number(&card_number, None).await?;

        let created = discount_card::ActiveModel {
            card_number: Set(card_number),
            discount_percent: Set(input.discount_percent),
            is_active: Set(input.is_active),
            ..Default::default()
        }
        .insert(&*self.db)
        .await?;
        info!(discount_card_id = created.id, "Created discount card");
        Ok(created)
    }

    /// Existing receipts keep the totals they were computed with.
    #[instrument(skip(self))]
    pub async fn update(
        &self,
        id: i32,
        input: DiscountCardInput,
    ) -> Result<discount_card::Model, ServiceError> {
        input.validate()?;
        let card_number = input.card_number.trim().to_string();
        let existing = self.get(id).await?;
        self.ensure_unique_number(&card_number, Some(id)).await?;

        let mut active: discount_card::ActiveModel = existing.into();
        active.card_number = Set(card_number);
        active.discount_percent = Set(input.discount_percent);
        active.is_active = Set(input.is_active);
        Ok(active.update(&*self.db).await?)
    }

    /// Purchases that used the card keep existing without it.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i32) -> Result<(), ServiceError> {
        let existing = self.get(id).await?;
        existing.delete(&*self.db).await?;
        info!(discount_card_id = id, "Deleted discount card");
        Ok(())
    }

    async fn ensure_unique_number(
        &self,
        card_number: &str,
        exclude: Option<i32>,
    ) -> Result<(), ServiceError> {
        let mut query = discount_card::Entity::find()
            .filter(discount_card::Column::CardNumber.eq(card_number));
        if let Some(id) = exclude {
            query = query.filter(discount_card::Column::Id.ne(id));
        }
        if query.count(&*self.db).await? > 0 {
            return Err(ServiceError::IntegrityError(format!(
                "Discount card '{}' already exists",
                card_number
            )));
        }
        Ok(())
    }
}
