use super::page_request;
use crate::{
    errors::ApiError,
    handlers::common::{
        created_response, map_service_error, no_content_response, success_response,
        PaginationParams, SearchParams,
    },
    services::{
        discount_cards::DiscountCardInput,
        registers::{ActiveFilter, CashRegisterInput, CashierInput, PaymentMethodInput},
    },
    AppState,
};
use axum::{
    extract::{Json, Path, Query, State},
    response::IntoResponse,
};

pub(super) async fn list_payment_methods(
    State(state): State<AppState>,
    Query(pagination): Query<PaginationParams>,
    Query(search): Query<SearchParams>,
) -> Result<impl IntoResponse, ApiError> {
    let page = page_request(&state, &pagination)?;
    let methods = state
        .services
        .payment_methods
        .list(search.search.as_deref(), page)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(methods))
}

pub(super) async fn get_payment_method(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let method = state
        .services
        .payment_methods
        .get(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(method))
}

pub(super) async fn create_payment_method(
    State(state): State<AppState>,
    Json(payload): Json<PaymentMethodInput>,
) -> Result<impl IntoResponse, ApiError> {
    let method = state
        .services
        .payment_methods
        .create(payload)
        .await
        .map_err(map_service_error)?;
    Ok(created_response(method))
}

pub(super) async fn update_payment_method(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<PaymentMethodInput>,
) -> Result<impl IntoResponse, ApiError> {
    let method = state
        .services
        .payment_methods
        .update(id, payload)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(method))
}

pub(super) async fn delete_payment_method(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .payment_methods
        .delete(id)
        .await
        .map_err(map_service_error)?;
    Ok(no_content_response())
}

pub(super) async fn list_cashiers(
    State(state): State<AppState>,
    Query(pagination): Query<PaginationParams>,
    Query(filter): Query<ActiveFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let page = page_request(&state, &pagination)?;
    let cashiers = state
        .services
        .cashiers
        .list(filter, page)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(cashiers))
}

pub(super) async fn get_cashier(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let cashier = state
        .services
        .cashiers
        .get(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(cashier))
}

pub(super) async fn create_cashier(
    State(state): State<AppState>,
    Json(payload): Json<CashierInput>,
) -> Result<impl IntoResponse, ApiError> {
    let cashier = state
        .services
        .cashiers
        .create(payload)
        .await
        .map_err(map_service_error)?;
    Ok(created_response(cashier))
}

pub(super) async fn update_cashier(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<CashierInput>,
) -> Result<impl IntoResponse, ApiError> {
    let cashier = state
        .services
        .cashiers
        .update(id, payload)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(cashier))
}

pub(super) async fn delete_cashier(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .cashiers
        .delete(id)
        .await
        .map_err(map_service_error)?;
    Ok(no_content_response())
}

pub(super) async fn list_cash_registers(
    State(state): State<AppState>,
    Query(pagination): Query<PaginationParams>,
    Query(filter): Query<ActiveFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let page = page_request(&state, &pagination)?;
    let registers = state
        .services
        .cash_registers
        .list(filter, page)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(registers))
}

pub(super) async fn get_cash_register(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let register = state
        .services
        .cash_registers
        .get(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(register))
}

pub(super) async fn create_cash_register(
    State(state): State<AppState>,
    Json(payload): Json<CashRegisterInput>,
) -> Result<impl IntoResponse, ApiError> {
    let register = state
        .services
        .cash_registers
        .create(payload)
        .await
        .map_err(map_service_error)?;
    Ok(created_response(register))
}

pub(super) async fn update_cash_register(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<CashRegisterInput>,
) -> Result<impl IntoResponse, ApiError> {
    let register = state
        .services
        .cash_registers
        .update(id, payload)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(register))
}

pub(super) async fn delete_cash_register(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .cash_registers
        .delete(id)
        .await
        .map_err(map_service_error)?;
    Ok(no_content_response())
}

pub(super) async fn list_discount_cards(
    State(state): State<AppState>,
    Query(pagination): Query<PaginationParams>,
    Query(filter): Query<ActiveFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let page = page_request(&state, &pagination)?;
    let cards = state
        .services
        .discount_cards
        .list(filter, page)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(cards))
}

pub(super) async fn get_discount_card(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let card = state
        .services
        .discount_cards
        .get(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(card))
}

pub(super) async fn create_discount_card(
    State(state): State<AppState>,
    Json(payload): Json<DiscountCardInput>,
) -> Result<impl IntoResponse, ApiError> {
    let card = state
        .services
        .discount_cards
        .create(payload)
        .await
        .map_err(map_service_error)?;
    Ok(created_response(card))
}

pub(super) async fn update_discount_card(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<DiscountCardInput>,
) -> Result<impl IntoResponse, ApiError> {
    let card = state
        .services
        .discount_cards
        .update(id, payload)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(card))
}

pub(super) async fn delete_discount_card(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .discount_cards
        .delete(id)
        .await
        .map_err(map_service_error)?;
    Ok(no_content_response())
}
