use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, ActiveValue::Set, ConnectionTrait};
use serde::{Deserialize, Serialize};

/// Purchase receipt. `subtotal`, `discount_amount` and `final_amount` are
/// derived from the items and the discount card and are only written by
/// [`crate::services::pricing::recalculate_purchase_totals`].
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "purchases")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub cash_register_id: i32,
    #[sea_orm(nullable)]
    pub cashier_id: Option<i32>,
    #[sea_orm(nullable)]
    pub discount_card_id: Option<i32>,
    pub purchase_time: DateTime<Utc>,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub subtotal: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub discount_amount: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub final_amount: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub amount_paid_cash: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub amount_paid_card: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::cash_register::Entity",
        from = "Column::CashRegisterId",
        to = "super::cash_register::Column::Id",
        on_delete = "Restrict"
    )]
    CashRegister,
    #[sea_orm(
        belongs_to = "super::cashier::Entity",
        from = "Column::CashierId",
        to = "super::cashier::Column::Id",
        on_delete = "SetNull"
    )]
    Cashier,
    #[sea_orm(
        belongs_to = "super::discount_card::Entity",
        from = "Column::DiscountCardId",
        to = "super::discount_card::Column::Id",
        on_delete = "SetNull"
    )]
    DiscountCard,
    #[sea_orm(has_many = "super::purchase_item::Entity")]
    Items,
}

impl Related<super::cash_register::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CashRegister.def()
    }
}

impl Related<super::cashier::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Cashier.def()
    }
}

impl Related<super::discount_card::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DiscountCard.def()
    }
}

impl Related<super::purchase_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

impl Related<super::payment_method::Entity> for Entity {
    fn to() -> RelationDef {
        super::purchase_payment_method::Relation::PaymentMethod.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::purchase_payment_method::Relation::Purchase.def().rev())
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
            if let ActiveValue::NotSet = active_model.purchase_time {
                active_model.purchase_time = Set(now);
            }
            for amount in [
                &mut active_model.subtotal,
                &mut active_model.discount_amount,
                &mut active_model.final_amount,
                &mut active_model.amount_paid_cash,
                &mut active_model.amount_paid_card,
            ] {
                if let ActiveValue::NotSet = amount {
                    *amount = Set(Decimal::ZERO);
                }
            }
            active_model.created_at = Set(now);
        }

        active_model.updated_at = Set(now);
        Ok(active_model)
    }
}
