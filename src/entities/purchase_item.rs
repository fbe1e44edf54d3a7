use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue::Set, ConnectionTrait};
use serde::{Deserialize, Serialize};

use super::known_value;
use crate::services::pricing;

/// Line of a purchase receipt.
///
/// `line_total` is recomputed on every save, and every save or delete
/// recomputes the parent purchase's totals on the same connection. Deletes
/// must go through [`ActiveModelTrait::delete`] so the hook runs.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "purchase_items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub purchase_id: i32,
    pub product_id: i32,
    pub quantity: i32,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub price_at_purchase: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub line_total: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::purchase::Entity",
        from = "Column::PurchaseId",
        to = "super::purchase::Column::Id",
        on_delete = "Cascade"
    )]
    Purchase,
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id",
        on_delete = "Restrict"
    )]
    Product,
}

impl Related<super::purchase::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Purchase.def()
    }
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut active_model = self;
        let now = Utc::now();

        if insert {
            if known_value(&active_model.quantity).is_none() {
                active_model.quantity = Set(1);
            }
            active_model.created_at = Set(now);
        }

        let quantity = known_value(&active_model.quantity);
        let price = known_value(&active_model.price_at_purchase);
        match (quantity, price) {
            (Some(quantity), Some(price)) => {
                active_model.line_total = Set(pricing::line_total(quantity, price));
            }
            _ => {
                return Err(DbErr::Custom(
                    "purchase item needs quantity and price_at_purchase to compute line_total"
                        .to_string(),
                ))
            }
        }

        active_model.updated_at = Set(now);
        Ok(active_model)
    }

    async fn after_save<C>(model: Model, db: &C, _insert: bool) -> Result<Model, DbErr>
    where
        C: ConnectionTrait,
    {
        pricing::recalculate_purchase_totals(db, model.purchase_id).await?;
        Ok(model)
    }

    async fn after_delete<C>(self, db: &C) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let purchase_id = known_value(&self.purchase_id).ok_or_else(|| {
            DbErr::Custom("deleted purchase item carried no purchase_id".to_string())
        })?;
        pricing::recalculate_purchase_totals(db, purchase_id).await?;
        Ok(self)
    }
}
