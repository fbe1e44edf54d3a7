//! Payment methods, cashiers and cash registers.

use super::{fetch_page, search_term, Page, PageRequest};
use crate::{
    entities::{cash_register, cash_register_payment_method, cashier, payment_method, purchase},
    errors::ServiceError,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

fn default_true() -> bool {
    true
}

fn validate_payment_code(code: &str) -> Result<(), ValidationError> {
    if payment_method::CODES.contains(&code) {
        Ok(())
    } else {
        let mut err = ValidationError::new("payment_code");
        err.message = Some(format!("code must be one of {:?}", payment_method::CODES).into());
        Err(err)
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct PaymentMethodInput {
    #[validate(length(min = 1, max = 50, message = "Payment method name must be 1-50 characters"))]
    pub name: String,
    #[validate(custom = "validate_payment_code")]
    pub code: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CashierInput {
    #[validate(length(min = 1, max = 150, message = "Cashier name must be 1-150 characters"))]
    pub name: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CashRegisterInput {
    #[validate(range(min = 1, message = "Register number must be positive"))]
    pub number: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// Replaces the full set of supported methods
    #[serde(default)]
    pub supported_payment_method_ids: Vec<i32>,
}

/// Shared list filter for entities with an active flag
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActiveFilter {
    pub search: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CashRegisterView {
    #[serde(flatten)]
    pub register: cash_register::Model,
    pub supported_payment_methods: Vec<payment_method::Model>,
    pub supports_cash: bool,
    pub supports_card: bool,
}

impl CashRegisterView {
    fn new(register: cash_register::Model, methods: Vec<payment_method::Model>) -> Self {
        let supports = |code: &str| methods.iter().any(|m| m.code == code);
        let supports_cash = supports(payment_method::CASH);
        let supports_card = supports(payment_method::CARD);
        Self {
            register,
            supported_payment_methods: methods,
            supports_cash,
            supports_card,
        }
    }
}

/// Whether `register_id` accepts the payment method with `code`.
pub async fn register_supports<C: ConnectionTrait>(
    conn: &C,
    register_id: i32,
    code: &str,
) -> Result<bool, ServiceError> {
    let method = payment_method::Entity::find()
        .filter(payment_method::Column::Code.eq(code))
        .one(conn)
        .await?;
    let Some(method) = method else {
        return Ok(false);
    };

    let links = cash_register_payment_method::Entity::find()
        .filter(cash_register_payment_method::Column::CashRegisterId.eq(register_id))
        .filter(cash_register_payment_method::Column::PaymentMethodId.eq(method.id))
        .count(conn)
        .await?;
    Ok(links > 0)
}

pub async fn supports_cash<C: ConnectionTrait>(
    conn: &C,
    register_id: i32,
) -> Result<bool, ServiceError> {
    register_supports(conn, register_id, payment_method::CASH).await
}

pub async fn supports_card<C: ConnectionTrait>(
    conn: &C,
    register_id: i32,
) -> Result<bool, ServiceError> {
    register_supports(conn, register_id, payment_method::CARD).await
}

/// Deduplicated payment method ids, all of which must exist.
pub(crate) async fn ensure_payment_methods_exist<C: ConnectionTrait>(
    conn: &C,
    ids: &[i32],
) -> Result<Vec<i32>, ServiceError> {
    let mut ids = ids.to_vec();
    ids.sort_unstable();
    ids.dedup();
    if ids.is_empty() {
        return Ok(ids);
    }

    let found = payment_method::Entity::find()
        .filter(payment_method::Column::Id.is_in(ids.clone()))
        .count(conn)
        .await?;
    if found != ids.len() as u64 {
        return Err(ServiceError::InvalidInput(
            "Unknown payment method id".to_string(),
        ));
    }
    Ok(ids)
}

#[derive(Clone)]
pub struct PaymentMethodService {
    db: Arc<DatabaseConnection>,
}

impl PaymentMethodService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        search: Option<&str>,
        page: PageRequest,
    ) -> Result<Page<payment_method::Model>, ServiceError> {
        let mut query = payment_method::Entity::find();
        if let Some(term) = search_term(search) {
            query = query.filter(payment_method::Column::Name.contains(term));
        }
        let query = query.order_by_asc(payment_method::Column::Id);
        Ok(fetch_page(query, &*self.db, page).await?)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: i32) -> Result<payment_method::Model, ServiceError> {
        payment_method::Entity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Payment method {} not found", id)))
    }

    #[instrument(skip(self))]
    pub async fn create(
        &self,
        input: PaymentMethodInput,
    ) -> Result<payment_method::Model, ServiceError> {
        input.validate()?;
        self.ensure_unique(&input, None).await?;
        let created = payment_method::ActiveModel {
            name: Set(input.name.trim().to_string()),
            code: Set(input.code),
            ..Default::default()
        }
        .insert(&*self.db)
        .await?;
        info!(payment_method_id = created.id, "Created payment method");
        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn update(
        &self,
        id: i32,
        input: PaymentMethodInput,
    ) -> Result<payment_method::Model, ServiceError> {
        input.validate()?;
        let existing = self.get(id).await?;
        self.ensure_unique(&input, Some(id)).await?;

        let mut active: payment_method::ActiveModel = existing.into();
        active.name = Set(input.name.trim().to_string());
        active.code = Set(input.code);
        Ok(active.update(&*self.db).await?)
    }

    /// Register and purchase links to the method are removed with it.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i32) -> Result<(), ServiceError> {
        let existing = self.get(id).await?;
        existing.delete(&*self.db).await?;
        info!(payment_method_id = id, "Deleted payment method");
        Ok(())
    }

    async fn ensure_unique(
        &self,
        input: &PaymentMethodInput,
        exclude: Option<i32>,
    ) -> Result<(), ServiceError> {
        let mut query = payment_method::Entity::find().filter(
            sea_orm::Condition::any()
                .add(payment_method::Column::Name.eq(input.name.trim()))
                .add(payment_method::Column::Code.eq(input.code.as_str())),
        );
        if let Some(id) = exclude {
            query = query.filter(payment_method::Column::Id.ne(id));
        }
        if query.count(&*self.db).await? > 0 {
            return Err(ServiceError::IntegrityError(format!(
                "Payment method with name '{}' or code '{}' already exists",
                input.name.trim(),
                input.code
            )));
        }
        Ok(())
    }
}

#[derive(Clone)]
pub struct CashierService {
    db: Arc<DatabaseConnection>,
}

impl CashierService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        filter: ActiveFilter,
        page: PageRequest,
    ) -> Result<Page<cashier::Model>, ServiceError> {
        let mut query = cashier::Entity::find();
        if let Some(term) = search_term(filter.search.as_deref()) {
            query = query.filter(cashier::Column::Name.contains(term));
        }
        if let Some(is_active) = filter.is_active {
            query = query.filter(cashier::Column::IsActive.eq(is_active));
        }
        let query = query
            .order_by_asc(cashier::Column::Name)
            .order_by_asc(cashier::Column::Id);
        Ok(fetch_page(query, &*self.db, page).await?)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: i32) -> Result<cashier::Model, ServiceError> {
        cashier::Entity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Cashier {} not found", id)))
    }

    #[instrument(skip(self))]
    pub async fn create(&self, input: CashierInput) -> Result<cashier::Model, ServiceError> {
        input.validate()?;
        let created = cashier::ActiveModel {
            name: Set(input.name.trim().to_string()),
            is_active: Set(input.is_active),
            ..Default::default()
        }
        .insert(&*self.db)
        .await?;
        info!(cashier_id = created.id, "Created cashier");
        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn update(&self, id: i32, input: CashierInput) -> Result<cashier::Model, ServiceError> {
        input.validate()?;
        let mut active: cashier::ActiveModel = self.get(id).await?.into();
        active.name = Set(input.name.trim().to_string());
        active.is_active = Set(input.is_active);
        Ok(active.update(&*self.db).await?)
    }

    /// Purchases rung up by the cashier keep existing with no cashier.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i32) -> Result<(), ServiceError> {
        let existing = self.get(id).await?;
        existing.delete(&*self.db).await?;
        info!(cashier_id = id, "Deleted cashier");
        Ok(())
    }
}

#[derive(Clone)]
pub struct CashRegisterService {
    db: Arc<DatabaseConnection>,
}

impl CashRegisterService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Registers ordered by number. A numeric search matches the number.
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        filter: ActiveFilter,
        page: PageRequest,
    ) -> Result<Page<CashRegisterView>, ServiceError> {
        let db = &*self.db;
        let mut query = cash_register::Entity::find();
        if let Some(term) = search_term(filter.search.as_deref()) {
            match term.parse::<i32>() {
                Ok(number) => query = query.filter(cash_register::Column::Number.eq(number)),
                Err(_) => return Ok(Page::new(Vec::new(), page, 0)),
            }
        }
        if let Some(is_active) = filter.is_active {
            query = query.filter(cash_register::Column::IsActive.eq(is_active));
        }
        let query = query.order_by_asc(cash_register::Column::Number);
        let registers = fetch_page(query, db, page).await?;

        let mut items = Vec::with_capacity(registers.items.len());
        for register in &registers.items {
            let methods = register
                .find_related(payment_method::Entity)
                .order_by_asc(payment_method::Column::Id)
                .all(db)
                .await?;
            items.push(CashRegisterView::new(register.clone(), methods));
        }
        Ok(Page::new(
            items,
            PageRequest::new(registers.page, registers.per_page),
            registers.total,
        ))
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: i32) -> Result<CashRegisterView, ServiceError> {
        load_register_view(&*self.db, id).await
    }

    #[instrument(skip(self))]
    pub async fn create(&self, input: CashRegisterInput) -> Result<CashRegisterView, ServiceError> {
        input.validate()?;
        let txn = self.db.begin().await?;

        ensure_unique_number(&txn, input.number, None).await?;
        let method_ids = ensure_payment_methods_exist(&txn, &input.supported_payment_method_ids).await?;

        let created = cash_register::ActiveModel {
            number: Set(input.number),
            is_active: Set(input.is_active),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        replace_supported_methods(&txn, created.id, &method_ids).await?;

        let view = load_register_view(&txn, created.id).await?;
        txn.commit().await?;

        info!(cash_register_id = created.id, number = created.number, "Created cash register");
        Ok(view)
    }

    #[instrument(skip(self))]
    pub async fn update(
        &self,
        id: i32,
        input: CashRegisterInput,
    ) -> Result<CashRegisterView, ServiceError> {
        input.validate()?;
        let txn = self.db.begin().await?;

        let existing = find_register(&txn, id).await?;
        ensure_unique_number(&txn, input.number, Some(id)).await?;
        let method_ids = ensure_payment_methods_exist(&txn, &input.supported_payment_method_ids).await?;

        let mut active: cash_register::ActiveModel = existing.into();
        active.number = Set(input.number);
        active.is_active = Set(input.is_active);
        active.update(&txn).await?;
        replace_supported_methods(&txn, id, &method_ids).await?;

        let view = load_register_view(&txn, id).await?;
        txn.commit().await?;
        Ok(view)
    }

    /// Refused while purchases reference the register.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i32) -> Result<(), ServiceError> {
        let db = &*self.db;
        let existing = find_register(db, id).await?;

        let referencing = purchase::Entity::find()
            .filter(purchase::Column::CashRegisterId.eq(id))
            .count(db)
            .await?;
        if referencing > 0 {
            return Err(ServiceError::IntegrityError(format!(
                "Cash register {} is referenced by {} purchases",
                id, referencing
            )));
        }

        existing.delete(db).await?;
        info!(cash_register_id = id, "Deleted cash register");
        Ok(())
    }
}

pub(crate) async fn find_register<C: ConnectionTrait>(
    conn: &C,
    id: i32,
) -> Result<cash_register::Model, ServiceError> {
    cash_register::Entity::find_by_id(id)
        .one(conn)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Cash register {} not found", id)))
}

async fn load_register_view<C: ConnectionTrait>(
    conn: &C,
    id: i32,
) -> Result<CashRegisterView, ServiceError> {
    let register = find_register(conn, id).await?;
    let methods = register
        .find_related(payment_method::Entity)
        .order_by_asc(payment_method::Column::Id)
        .all(conn)
        .await?;
    Ok(CashRegisterView::new(register, methods))
}

async fn ensure_unique_number<C: ConnectionTrait>(
    conn: &C,
    number: i32,
    exclude: Option<i32>,
) -> Result<(), ServiceError> {
    let mut query = cash_register::Entity::find().filter(cash_register::Column::Number.eq(number));
    if let Some(id) = exclude {
        query = query.filter(cash_register::Column::Id.ne(id));
    }
    if query.count(conn).await? > 0 {
        return Err(ServiceError::IntegrityError(format!(
            "Cash register number {} is already in use",
            number
        )));
    }
    Ok(())
}

async fn replace_supported_methods<C: ConnectionTrait>(
    conn: &C,
    register_id: i32,
    method_ids: &[i32],
) -> Result<(), ServiceError> {
    cash_register_payment_method::Entity::delete_many()
        .filter(cash_register_payment_method::Column::CashRegisterId.eq(register_id))
        .exec(conn)
        .await?;

    if method_ids.is_empty() {
        return Ok(());
    }

    let links = method_ids
        .iter()
        .map(|&method_id| cash_register_payment_method::ActiveModel {
            cash_register_id: Set(register_id),
            payment_method_id: Set(method_id),
        });
    cash_register_payment_method::Entity::insert_many(links)
        .exec_without_returning(conn)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn method(id: i32, code: &str) -> payment_method::Model {
        payment_method::Model {
            id,
            name: code.to_uppercase(),
            code: code.to_string(),
        }
    }

    fn register() -> cash_register::Model {
        cash_register::Model {
            id: 1,
            number: 3,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn view_reports_supported_methods() {
        let view = CashRegisterView::new(register(), vec![method(1, "cash")]);
        assert!(view.supports_cash);
        assert!(!view.supports_card);

        let view = CashRegisterView::new(register(), vec![]);
        assert!(!view.supports_cash);
        assert!(!view.supports_card);
    }

    #[test]
    fn payment_codes_are_restricted() {
        assert!(validate_payment_code("cash").is_ok());
        assert!(validate_payment_code("card").is_ok());
        assert!(validate_payment_code("crypto").is_err());
    }

    #[test]
    fn register_number_must_be_positive() {
        let input = CashRegisterInput {
            number: 0,
            is_active: true,
            supported_payment_method_ids: vec![],
        };
        assert!(input.validate().is_err());
    }
}
