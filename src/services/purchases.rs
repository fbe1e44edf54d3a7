//! Purchase receipts, their line items and payment details.

use super::{
    fetch_page, pricing, products::validate_price_value, registers, search_term, Page,
    PageRequest,
};
use crate::{
    entities::{
        cashier, discount_card, payment_method, product, purchase, purchase_item,
        purchase_payment_method,
    },
    errors::ServiceError,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    ModelTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, sync::Arc};
use tracing::{info, instrument};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

fn default_quantity() -> i32 {
    1
}

fn validate_paid_amount(value: &Decimal) -> Result<(), ValidationError> {
    super::ensure_min_decimal("paid amount", *value, Decimal::ZERO)?;
    if value.normalize().scale() > pricing::MONEY_SCALE {
        let mut err = ValidationError::new("scale");
        err.message = Some("paid amounts carry at most 2 decimals".into());
        return Err(err);
    }
    Ok(())
}

/// Line item added to a purchase. Without `price_at_purchase` the
/// product's current price is captured.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct NewItemInput {
    pub product_id: i32,
    #[serde(default = "default_quantity")]
    #[validate(range(min = 1, message = "Quantity must be positive"))]
    pub quantity: i32,
    #[validate(custom = "validate_price_value")]
    pub price_at_purchase: Option<Decimal>,
}

/// Edit of an existing line; omitted fields keep their value
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ItemUpdateInput {
    pub product_id: Option<i32>,
    #[validate(range(min = 1, message = "Quantity must be positive"))]
    pub quantity: Option<i32>,
    #[validate(custom = "validate_price_value")]
    pub price_at_purchase: Option<Decimal>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreatePurchaseInput {
    pub cash_register_id: i32,
    pub cashier_id: Option<i32>,
    pub discount_card_id: Option<i32>,
    /// Defaults to now
    pub purchase_time: Option<DateTime<Utc>>,
    #[serde(default)]
    #[validate(custom = "validate_paid_amount")]
    pub amount_paid_cash: Decimal,
    #[serde(default)]
    #[validate(custom = "validate_paid_amount")]
    pub amount_paid_card: Decimal,
    #[serde(default)]
    pub payment_method_ids: Vec<i32>,
    #[serde(default)]
    #[validate]
    pub items: Vec<NewItemInput>,
}

/// Fields of a receipt that stay editable after it is rung up
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdatePurchaseInput {
    pub cash_register_id: i32,
    pub cashier_id: Option<i32>,
    pub discount_card_id: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PurchaseFilter {
    /// Receipt id, cashier name or card number
    pub search: Option<String>,
    pub cash_register_id: Option<i32>,
    pub cashier_id: Option<i32>,
    pub discount_card_id: Option<i32>,
    pub purchased_from: Option<DateTime<Utc>>,
    pub purchased_to: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PurchaseItemView {
    #[serde(flatten)]
    pub item: purchase_item::Model,
    pub product_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PurchaseView {
    #[serde(flatten)]
    pub purchase: purchase::Model,
    pub items: Vec<PurchaseItemView>,
    pub payment_methods_used: Vec<payment_method::Model>,
    pub payment_summary: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PurchaseRow {
    #[serde(flatten)]
    pub purchase: purchase::Model,
    pub cash_register_number: Option<i32>,
    pub cashier_name: Option<String>,
    pub discount_card_number: Option<String>,
    pub payment_summary: String,
}

/// "Cash: X / Card: Y", or "Unpaid" when nothing was paid.
pub fn payment_summary(receipt: &purchase::Model) -> String {
    let mut parts = Vec::new();
    if receipt.amount_paid_cash > Decimal::ZERO {
        parts.push(format!("Cash: {:.2}", receipt.amount_paid_cash));
    }
    if receipt.amount_paid_card > Decimal::ZERO {
        parts.push(format!("Card: {:.2}", receipt.amount_paid_card));
    }
    if parts.is_empty() {
        "Unpaid".to_string()
    } else {
        parts.join(" / ")
    }
}

#[derive(Clone)]
pub struct PurchaseService {
    db: Arc<DatabaseConnection>,
}

impl PurchaseService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Receipts, newest first
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        filter: PurchaseFilter,
        page: PageRequest,
    ) -> Result<Page<PurchaseRow>, ServiceError> {
        let db = &*self.db;
        let mut query = purchase::Entity::find();

        if let Some(register_id) = filter.cash_register_id {
            query = query.filter(purchase::Column::CashRegisterId.eq(register_id));
        }
        if let Some(cashier_id) = filter.cashier_id {
            query = query.filter(purchase::Column::CashierId.eq(cashier_id));
        }
        if let Some(card_id) = filter.discount_card_id {
            query = query.filter(purchase::Column::DiscountCardId.eq(card_id));
        }
        if let Some(from) = filter.purchased_from {
            query = query.filter(purchase::Column::PurchaseTime.gte(from));
        }
        if let Some(to) = filter.purchased_to {
            query = query.filter(purchase::Column::PurchaseTime.lte(to));
        }
        if let Some(term) = search_term(filter.search.as_deref()) {
            query = query.filter(search_condition(db, &term).await?);
        }

        let query = query
            .order_by_desc(purchase::Column::PurchaseTime)
            .order_by_desc(purchase::Column::Id);
        let page = fetch_page(query, db, page).await?;

        let register_numbers: HashMap<i32, i32> = crate::entities::cash_register::Entity::find()
            .filter(
                crate::entities::cash_register::Column::Id
                    .is_in(page.items.iter().map(|p| p.cash_register_id)),
            )
            .all(db)
            .await?
            .into_iter()
            .map(|r| (r.id, r.number))
            .collect();
        let cashier_names: HashMap<i32, String> = cashier::Entity::find()
            .filter(cashier::Column::Id.is_in(page.items.iter().filter_map(|p| p.cashier_id)))
            .all(db)
            .await?
            .into_iter()
            .map(|c| (c.id, c.name))
            .collect();
        let card_numbers: HashMap<i32, String> = discount_card::Entity::find()
            .filter(
                discount_card::Column::Id.is_in(page.items.iter().filter_map(|p| p.discount_card_id)),
            )
            .all(db)
            .await?
            .into_iter()
            .map(|c| (c.id, c.card_number))
            .collect();

        Ok(page.map(|receipt| PurchaseRow {
            cash_register_number: register_numbers.get(&receipt.cash_register_id).copied(),
            cashier_name: receipt.cashier_id.and_then(|id| cashier_names.get(&id).cloned()),
            discount_card_number: receipt
                .discount_card_id
                .and_then(|id| card_numbers.get(&id).cloned()),
            payment_summary: payment_summary(&receipt),
            purchase: receipt,
        }))
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: i32) -> Result<PurchaseView, ServiceError> {
        load_view(&*self.db, id).await
    }

    /// Creates the receipt, its payment links and items in one transaction.
    #[instrument(skip(self))]
    pub async fn create(&self, input: CreatePurchaseInput) -> Result<PurchaseView, ServiceError> {
        input.validate()?;
        let txn = self.db.begin().await?;

        check_references(
            &txn,
            input.cash_register_id,
            input.cashier_id,
            input.discount_card_id,
        )
        .await?;
        check_payment_support(
            &txn,
            input.cash_register_id,
            input.amount_paid_cash,
            input.amount_paid_card,
        )
        .await?;
        let method_ids =
            registers::ensure_payment_methods_exist(&txn, &input.payment_method_ids).await?;

        let mut active = purchase::ActiveModel {
            cash_register_id: Set(input.cash_register_id),
            cashier_id: Set(input.cashier_id),
            discount_card_id: Set(input.discount_card_id),
            amount_paid_cash: Set(input.amount_paid_cash),
            amount_paid_card: Set(input.amount_paid_card),
            ..Default::default()
        };
        if let Some(purchase_time) = input.purchase_time {
            active.purchase_time = Set(purchase_time);
        }
        let created = active.insert(&txn).await?;

        if !method_ids.is_empty() {
            let links = method_ids
                .iter()
                .map(|&method_id| purchase_payment_method::ActiveModel {
                    purchase_id: Set(created.id),
                    payment_method_id: Set(method_id),
                });
            purchase_payment_method::Entity::insert_many(links)
                .exec_without_returning(&txn)
                .await?;
        }

        for item in input.items {
            insert_item(&txn, created.id, item).await?;
        }

        let view = load_view(&txn, created.id).await?;
        txn.commit().await?;

        info!(
            purchase_id = created.id,
            items = view.items.len(),
            final_amount = %view.purchase.final_amount,
            "Created purchase"
        );
        Ok(view)
    }

    /// Changing the discount card recomputes the totals.
    #[instrument(skip(self))]
    pub async fn update(
        &self,
        id: i32,
        input: UpdatePurchaseInput,
    ) -> Result<PurchaseView, ServiceError> {
        input.validate()?;
        let txn = self.db.begin().await?;

        let existing = find_purchase(&txn, id).await?;
        check_references(
            &txn,
            input.cash_register_id,
            input.cashier_id,
            input.discount_card_id,
        )
        .await?;
        check_payment_support(
            &txn,
            input.cash_register_id,
            existing.amount_paid_cash,
            existing.amount_paid_card,
        )
        .await?;

        let card_changed = existing.discount_card_id != input.discount_card_id;
        let mut active: purchase::ActiveModel = existing.into();
        active.cash_register_id = Set(input.cash_register_id);
        active.cashier_id = Set(input.cashier_id);
        active.discount_card_id = Set(input.discount_card_id);
        active.update(&txn).await?;

        if card_changed {
            pricing::recalculate_purchase_totals(&txn, id).await?;
        }

        let view = load_view(&txn, id).await?;
        txn.commit().await?;
        info!(purchase_id = id, card_changed, "Updated purchase");
        Ok(view)
    }

    /// Items and payment links go with the receipt.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i32) -> Result<(), ServiceError> {
        let db = &*self.db;
        find_purchase(db, id).await?.delete(db).await?;
        info!(purchase_id = id, "Deleted purchase");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn list_items(&self, purchase_id: i32) -> Result<Vec<PurchaseItemView>, ServiceError> {
        let db = &*self.db;
        find_purchase(db, purchase_id).await?;
        load_items(db, purchase_id).await
    }

    #[instrument(skip(self))]
    pub async fn add_item(
        &self,
        purchase_id: i32,
        input: NewItemInput,
    ) -> Result<PurchaseView, ServiceError> {
        input.validate()?;
        let txn = self.db.begin().await?;

        find_purchase(&txn, purchase_id).await?;
        insert_item(&txn, purchase_id, input).await?;

        let view = load_view(&txn, purchase_id).await?;
        txn.commit().await?;
        Ok(view)
    }

    #[instrument(skip(self))]
    pub async fn update_item(
        &self,
        purchase_id: i32,
        item_id: i32,
        input: ItemUpdateInput,
    ) -> Result<PurchaseView, ServiceError> {
        input.validate()?;
        let txn = self.db.begin().await?;

        let item = find_item(&txn, purchase_id, item_id).await?;
        let mut active: purchase_item::ActiveModel = item.clone().into();

        if let Some(product_id) = input.product_id.filter(|&p| p != item.product_id) {
            ensure_product_exists(&txn, product_id).await?;
            ensure_not_on_receipt(&txn, purchase_id, product_id).await?;
            active.product_id = Set(product_id);
        }
        if let Some(quantity) = input.quantity {
            active.quantity = Set(quantity);
        }
        if let Some(price) = input.price_at_purchase {
            active.price_at_purchase = Set(price);
        }
        active.update(&txn).await?;

        let view = load_view(&txn, purchase_id).await?;
        txn.commit().await?;
        info!(purchase_id, item_id, "Updated purchase item");
        Ok(view)
    }

    #[instrument(skip(self))]
    pub async fn delete_item(
        &self,
        purchase_id: i32,
        item_id: i32,
    ) -> Result<PurchaseView, ServiceError> {
        let txn = self.db.begin().await?;

        // Deleting through the model runs the hook that refreshes the totals
        find_item(&txn, purchase_id, item_id).await?.delete(&txn).await?;

        let view = load_view(&txn, purchase_id).await?;
        txn.commit().await?;
        info!(purchase_id, item_id, "Deleted purchase item");
        Ok(view)
    }
}

async fn find_purchase<C: ConnectionTrait>(
    conn: &C,
    id: i32,
) -> Result<purchase::Model, ServiceError> {
    purchase::Entity::find_by_id(id)
        .one(conn)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Purchase {} not found", id)))
}

async fn find_item<C: ConnectionTrait>(
    conn: &C,
    purchase_id: i32,
    item_id: i32,
) -> Result<purchase_item::Model, ServiceError> {
    purchase_item::Entity::find_by_id(item_id)
        .filter(purchase_item::Column::PurchaseId.eq(purchase_id))
        .one(conn)
        .await?
        .ok_or_else(|| {
            ServiceError::NotFound(format!(
                "Item {} not found on purchase {}",
                item_id, purchase_id
            ))
        })
}

async fn ensure_product_exists<C: ConnectionTrait>(
    conn: &C,
    product_id: i32,
) -> Result<(), ServiceError> {
    product::Entity::find_by_id(product_id)
        .one(conn)
        .await?
        .map(|_| ())
        .ok_or_else(|| ServiceError::InvalidInput(format!("Product {} does not exist", product_id)))
}

async fn ensure_not_on_receipt<C: ConnectionTrait>(
    conn: &C,
    purchase_id: i32,
    product_id: i32,
) -> Result<(), ServiceError> {
    let existing = purchase_item::Entity::find()
        .filter(purchase_item::Column::PurchaseId.eq(purchase_id))
        .filter(purchase_item::Column::ProductId.eq(product_id))
        .count(conn)
        .await?;
    if existing > 0 {
        return Err(ServiceError::IntegrityError(format!(
            "Product {} is already on purchase {}",
            product_id, purchase_id
        )));
    }
    Ok(())
}

/// Inserts one line; the entity hooks fill `line_total` and refresh the totals.
async fn insert_item<C: ConnectionTrait>(
    conn: &C,
    purchase_id: i32,
    input: NewItemInput,
) -> Result<purchase_item::Model, ServiceError> {
    ensure_product_exists(conn, input.product_id).await?;
    ensure_not_on_receipt(conn, purchase_id, input.product_id).await?;

    let price = match input.price_at_purchase {
        Some(price) => price,
        None => pricing::resolve_current_price(conn, input.product_id, Utc::now())
            .await?
            .ok_or_else(|| {
                ServiceError::InvalidInput(format!(
                    "Product {} has no current price; supply price_at_purchase",
                    input.product_id
                ))
            })?,
    };

    let created = purchase_item::ActiveModel {
        purchase_id: Set(purchase_id),
        product_id: Set(input.product_id),
        quantity: Set(input.quantity),
        price_at_purchase: Set(price),
        ..Default::default()
    }
    .insert(conn)
    .await?;

    info!(
        purchase_id,
        item_id = created.id,
        product_id = created.product_id,
        line_total = %created.line_total,
        "Added purchase item"
    );
    Ok(created)
}

async fn check_references<C: ConnectionTrait>(
    conn: &C,
    register_id: i32,
    cashier_id: Option<i32>,
    card_id: Option<i32>,
) -> Result<(), ServiceError> {
    registers::find_register(conn, register_id)
        .await
        .map_err(|_| ServiceError::InvalidInput(format!("Cash register {} does not exist", register_id)))?;

    if let Some(cashier_id) = cashier_id {
        if cashier::Entity::find_by_id(cashier_id).one(conn).await?.is_none() {
            return Err(ServiceError::InvalidInput(format!(
                "Cashier {} does not exist",
                cashier_id
            )));
        }
    }
    if let Some(card_id) = card_id {
        if discount_card::Entity::find_by_id(card_id).one(conn).await?.is_none() {
            return Err(ServiceError::InvalidInput(format!(
                "Discount card {} does not exist",
                card_id
            )));
        }
    }
    Ok(())
}

/// Money can only be taken by a method the register accepts.
async fn check_payment_support<C: ConnectionTrait>(
    conn: &C,
    register_id: i32,
    paid_cash: Decimal,
    paid_card: Decimal,
) -> Result<(), ServiceError> {
    if paid_cash > Decimal::ZERO && !registers::supports_cash(conn, register_id).await? {
        return Err(ServiceError::InvalidInput(format!(
            "Cash register {} does not accept cash",
            register_id
        )));
    }
    if paid_card > Decimal::ZERO && !registers::supports_card(conn, register_id).await? {
        return Err(ServiceError::InvalidInput(format!(
            "Cash register {} does not accept cards",
            register_id
        )));
    }
    Ok(())
}

async fn search_condition<C: ConnectionTrait>(
    conn: &C,
    term: &str,
) -> Result<Condition, ServiceError> {
    let mut condition = Condition::any();

    if let Ok(id) = term.parse::<i32>() {
        condition = condition.add(purchase::Column::Id.eq(id));
    }

    let cashier_ids: Vec<i32> = cashier::Entity::find()
        .select_only()
        .column(cashier::Column::Id)
        .filter(cashier::Column::Name.contains(term))
        .into_tuple()
        .all(conn)
        .await?;
    let card_ids: Vec<i32> = discount_card::Entity::find()
        .select_only()
        .column(discount_card::Column::Id)
        .filter(discount_card::Column::CardNumber.contains(term))
        .into_tuple()
        .all(conn)
        .await?;

    Ok(condition
        .add(purchase::Column::CashierId.is_in(cashier_ids))
        .add(purchase::Column::DiscountCardId.is_in(card_ids)))
}

async fn load_items<C: ConnectionTrait>(
    conn: &C,
    purchase_id: i32,
) -> Result<Vec<PurchaseItemView>, ServiceError> {
    let rows = purchase_item::Entity::find()
        .filter(purchase_item::Column::PurchaseId.eq(purchase_id))
        .order_by_asc(purchase_item::Column::Id)
        .find_also_related(product::Entity)
        .all(conn)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(item, product)| PurchaseItemView {
            item,
            product_name: product.map(|p| p.name).unwrap_or_default(),
        })
        .collect())
}

async fn load_view<C: ConnectionTrait>(conn: &C, id: i32) -> Result<PurchaseView, ServiceError> {
    let receipt = find_purchase(conn, id).await?;
    let items = load_items(conn, id).await?;
    let payment_methods_used = receipt
        .find_related(payment_method::Entity)
        .order_by_asc(payment_method::Column::Id)
        .all(conn)
        .await?;

    Ok(PurchaseView {
        payment_summary: payment_summary(&receipt),
        purchase: receipt,
        items,
        payment_methods_used,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn receipt(cash: Decimal, card: Decimal) -> purchase::Model {
        let now = Utc::now();
        purchase::Model {
            id: 1,
            cash_register_id: 1,
            cashier_id: None,
            discount_card_id: None,
            purchase_time: now,
            subtotal: Decimal::ZERO,
            discount_amount: Decimal::ZERO,
            final_amount: Decimal::ZERO,
            amount_paid_cash: cash,
            amount_paid_card: card,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn payment_summary_lists_used_methods() {
        assert_eq!(payment_summary(&receipt(dec!(0), dec!(0))), "Unpaid");
        assert_eq!(payment_summary(&receipt(dec!(50), dec!(0))), "Cash: 50.00");
        assert_eq!(
            payment_summary(&receipt(dec!(50), dec!(30.50))),
            "Cash: 50.00 / Card: 30.50"
        );
    }

    #[test]
    fn new_item_defaults_to_single_unit() {
        let input: NewItemInput = serde_json::from_str(r#"{"product_id": 4}"#).unwrap();
        assert_eq!(input.quantity, 1);
        assert!(input.price_at_purchase.is_none());
        assert!(input.validate().is_ok());
    }

    #[test]
    fn item_quantity_and_price_are_validated() {
        let input = NewItemInput {
            product_id: 1,
            quantity: 0,
            price_at_purchase: None,
        };
        assert!(input.validate().is_err());

        let input = NewItemInput {
            product_id: 1,
            quantity: 2,
            price_at_purchase: Some(dec!(0)),
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn negative_payments_are_rejected() {
        let input: CreatePurchaseInput = serde_json::from_str(
            r#"{"cash_register_id": 1, "amount_paid_cash": "-1"}"#,
        )
        .unwrap();
        assert!(input.validate().is_err());
    }
}
