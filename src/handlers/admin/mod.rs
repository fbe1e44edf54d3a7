//! JSON back-office: CRUD for every entity plus inline price history and
//! purchase lines.

mod catalog;
mod purchases;
mod registers;

use crate::{
    errors::ApiError,
    handlers::common::PaginationParams,
    middleware_helpers::{AdminRouterExt, AdminToken},
    services::PageRequest,
    AppState,
};
use axum::{
    routing::{get, put},
    Router,
};

/// Admin routes, guarded by the bearer token when one is configured
pub fn admin_routes(token: AdminToken) -> Router<AppState> {
    Router::new()
        .route(
            "/categories",
            get(catalog::list_categories).post(catalog::create_category),
        )
        .route(
            "/categories/:id",
            get(catalog::get_category)
                .put(catalog::update_category)
                .delete(catalog::delete_category),
        )
        .route(
            "/transport-companies",
            get(catalog::list_transport_companies).post(catalog::create_transport_company),
        )
        .route(
            "/transport-companies/:id",
            get(catalog::get_transport_company)
                .put(catalog::update_transport_company)
                .delete(catalog::delete_transport_company),
        )
        .route(
            "/products",
            get(catalog::list_products).post(catalog::create_product),
        )
        .route(
            "/products/:id",
            get(catalog::get_product)
                .put(catalog::update_product)
                .delete(catalog::delete_product),
        )
        .route(
            "/products/:id/prices",
            get(catalog::list_product_prices).post(catalog::add_product_price),
        )
        .route(
            "/prices",
            get(catalog::list_prices).post(catalog::create_price),
        )
        .route(
            "/prices/:id",
            get(catalog::get_price)
                .put(catalog::update_price)
                .delete(catalog::delete_price),
        )
        .route(
            "/payment-methods",
            get(registers::list_payment_methods).post(registers::create_payment_method),
        )
        .route(
            "/payment-methods/:id",
            get(registers::get_payment_method)
                .put(registers::update_payment_method)
                .delete(registers::delete_payment_method),
        )
        .route(
            "/cashiers",
            get(registers::list_cashiers).post(registers::create_cashier),
        )
        .route(
            "/cashiers/:id",
            get(registers::get_cashier)
                .put(registers::update_cashier)
                .delete(registers::delete_cashier),
        )
        .route(
            "/cash-registers",
            get(registers::list_cash_registers).post(registers::create_cash_register),
        )
        .route(
            "/cash-registers/:id",
            get(registers::get_cash_register)
                .put(registers::update_cash_register)
                .delete(registers::delete_cash_register),
        )
        .route(
            "/discount-cards",
            get(registers::list_discount_cards).post(registers::create_discount_card),
        )
        .route(
            "/discount-cards/:id",
            get(registers::get_discount_card)
                .put(registers::update_discount_card)
                .delete(registers::delete_discount_card),
        )
        .route(
            "/purchases",
            get(purchases::list_purchases).post(purchases::create_purchase),
        )
        .route(
            "/purchases/:id",
            get(purchases::get_purchase)
                .put(purchases::update_purchase)
                .delete(purchases::delete_purchase),
        )
        .route(
            "/purchases/:id/items",
            get(purchases::list_items).post(purchases::add_item),
        )
        .route(
            "/purchases/:id/items/:item_id",
            put(purchases::update_item).delete(purchases::delete_item),
        )
        .with_admin_token(token)
}

fn page_request(state: &AppState, params: &PaginationParams) -> Result<PageRequest, ApiError> {
    params.page_request(state.config.default_page_size, state.config.max_page_size)
}
