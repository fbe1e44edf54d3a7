use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Link between a product and the companies that deliver it
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "product_transport_companies")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub product_id: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub transport_company_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id",
        on_delete = "Cascade"
    )]
    Product,
    #[sea_orm(
        belongs_to = "super::transport_company::Entity",
        from = "Column::TransportCompanyId",
        to = "super::transport_company::Column::Id",
        on_delete = "Cascade"
    )]
    TransportCompany,
}

impl ActiveModelBehavior for ActiveModel {}
