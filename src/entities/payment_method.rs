use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

pub const CASH: &str = "cash";
pub const CARD: &str = "card";

/// Accepted payment method codes
pub const CODES: [&str; 2] = [CASH, CARD];

/// Payment method; `code` is one of [`CODES`]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payment_methods")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub name: String,
    #[sea_orm(unique)]
    pub code: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl Related<super::cash_register::Entity> for Entity {
    fn to() -> RelationDef {
        super::cash_register_payment_method::Relation::CashRegister.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::cash_register_payment_method::Relation::PaymentMethod.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
