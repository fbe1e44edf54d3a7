//! Database entities.
//!
//! Every table with an `is_active` column implements [`ActiveFlag`]; tables
//! with `created_at`/`updated_at` stamp them in `before_save`.

use sea_orm::{ActiveValue, ColumnTrait, EntityTrait, QueryFilter, Select};

pub mod cash_register;
pub mod cash_register_payment_method;
pub mod cashier;
pub mod category;
pub mod discount_card;
pub mod payment_method;
pub mod price;
pub mod product;
pub mod product_transport_company;
pub mod purchase;
pub mod purchase_item;
pub mod purchase_payment_method;
pub mod transport_company;

/// Entities that can be switched off without being deleted.
pub trait ActiveFlag: EntityTrait {
    fn is_active_column() -> Self::Column;

    /// Rows whose `is_active` flag is set.
    fn find_active() -> Select<Self> {
        Self::find().filter(Self::is_active_column().eq(true))
    }
}

/// Reads a value that is either freshly set or loaded from the database.
pub(crate) fn known_value<V>(value: &ActiveValue<V>) -> Option<V>
where
    V: Into<sea_orm::Value> + Clone,
{
    match value {
        ActiveValue::Set(v) | ActiveValue::Unchanged(v) => Some(v.clone()),
        ActiveValue::NotSet => None,
    }
}
