use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Payment methods a register accepts
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "cash_register_payment_methods")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub cash_register_id: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub payment_method_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::cash_register::Entity",
        from = "Column::CashRegisterId",
        to = "super::cash_register::Column::Id",
        on_delete = "Cascade"
    )]
    CashRegister,
    #[sea_orm(
        belongs_to = "super::payment_method::Entity",
        from = "Column::PaymentMethodId",
        to = "super::payment_method::Column::Id",
        on_delete = "Cascade"
    )]
    PaymentMethod,
}

impl ActiveModelBehavior for ActiveModel {}
