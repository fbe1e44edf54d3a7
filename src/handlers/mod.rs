pub mod admin;
pub mod catalog;
pub mod common;

use crate::{db::DbPool, services};
use std::sync::Arc;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub catalog: Arc<services::catalog::CatalogService>,
    pub categories: Arc<services::categories::CategoryService>,
    pub transport_companies: Arc<services::transport_companies::TransportCompanyService>,
    pub products: Arc<services::products::ProductService>,
    pub payment_methods: Arc<services::registers::PaymentMethodService>,
    pub cashiers: Arc<services::registers::CashierService>,
    pub cash_registers: Arc<services::registers::CashRegisterService>,
    pub discount_cards: Arc<services::discount_cards::DiscountCardService>,
    pub purchases: Arc<services::purchases::PurchaseService>,
}

impl AppServices {
    pub fn new(db_pool: Arc<DbPool>, catalog_page_size: u64) -> Self {
        Self {
            catalog: Arc::new(services::catalog::CatalogService::new(
                db_pool.clone(),
                catalog_page_size,
            )),
            categories: Arc::new(services::categories::CategoryService::new(db_pool.clone())),
            transport_companies: Arc::new(
                services::transport_companies::TransportCompanyService::new(db_pool.clone()),
            ),
            products: Arc::new(services::products::ProductService::new(db_pool.clone())),
            payment_methods: Arc::new(services::registers::PaymentMethodService::new(
                db_pool.clone(),
            )),
            cashiers: Arc::new(services::registers::CashierService::new(db_pool.clone())),
            cash_registers: Arc::new(services::registers::CashRegisterService::new(
                db_pool.clone(),
            )),
            discount_cards: Arc::new(services::discount_cards::DiscountCardService::new(
                db_pool.clone(),
            )),
            purchases: Arc::new(services::purchases::PurchaseService::new(db_pool)),
        }
    }
}
