//! Receipts and their lines. Every line write answers with the whole
//! receipt so the refreshed totals are visible immediately.

use super::page_request;
use crate::{
    errors::ApiError,
    handlers::common::{
        created_response, map_service_error, no_content_response, success_response,
        PaginationParams,
    },
    services::purchases::{
        CreatePurchaseInput, ItemUpdateInput, NewItemInput, PurchaseFilter, UpdatePurchaseInput,
    },
    AppState,
};
use axum::{
    extract::{Json, Path, Query, State},
    response::IntoResponse,
};

pub(super) async fn list_purchases(
    State(state): State<AppState>,
    Query(pagination): Query<PaginationParams>,
    Query(filter): Query<PurchaseFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let page = page_request(&state, &pagination)?;
    let purchases = state
        .services
        .purchases
        .list(filter, page)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(purchases))
}

pub(super) async fn get_purchase(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let purchase = state
        .services
        .purchases
        .get(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(purchase))
}

pub(super) async fn create_purchase(
    State(state): State<AppState>,
    Json(payload): Json<CreatePurchaseInput>,
) -> Result<impl IntoResponse, ApiError> {
    let purchase = state
        .services
        .purchases
        .create(payload)
        .await
        .map_err(map_service_error)?;
    Ok(created_response(purchase))
}

pub(super) async fn update_purchase(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdatePurchaseInput>,
) -> Result<impl IntoResponse, ApiError> {
    let purchase = state
        .services
        .purchases
        .update(id, payload)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(purchase))
}

pub(super) async fn delete_purchase(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .purchases
        .delete(id)
        .await
        .map_err(map_service_error)?;
    Ok(no_content_response())
}

pub(super) async fn list_items(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let items = state
        .services
        .purchases
        .list_items(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(items))
}

pub(super) async fn add_item(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<NewItemInput>,
) -> Result<impl IntoResponse, ApiError> {
    let purchase = state
        .services
        .purchases
        .add_item(id, payload)
        .await
        .map_err(map_service_error)?;
    Ok(created_response(purchase))
}

pub(super) async fn update_item(
    State(state): State<AppState>,
    Path((id, item_id)): Path<(i32, i32)>,
    Json(payload): Json<ItemUpdateInput>,
) -> Result<impl IntoResponse, ApiError> {
    let purchase = state
        .services
        .purchases
        .update_item(id, item_id, payload)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(purchase))
}

pub(super) async fn delete_item(
    State(state): State<AppState>,
    Path((id, item_id)): Path<(i32, i32)>,
) -> Result<impl IntoResponse, ApiError> {
    let purchase = state
        .services
        .purchases
        .delete_item(id, item_id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(purchase))
}
