use super::page_request;
use crate::{
    errors::ApiError,
    handlers::common::{
        created_response, map_service_error, no_content_response, success_response,
        PaginationParams, SearchParams,
    },
    services::{
        categories::CategoryInput,
        products::{PriceFilter, PriceInput, PriceRecordInput, ProductFilter, ProductInput},
        transport_companies::TransportCompanyInput,
    },
    AppState,
};
use axum::{
    extract::{Json, Path, Query, State},
    response::IntoResponse,
};

pub(super) async fn list_categories(
    State(state): State<AppState>,
    Query(pagination): Query<PaginationParams>,
    Query(search): Query<SearchParams>,
) -> Result<impl IntoResponse, ApiError> {
    let page = page_request(&state, &pagination)?;
    let categories = state
        .services
        .categories
        .list(search.search.as_deref(), page)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(categories))
}

pub(super) async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let category = state
        .services
        .categories
        .get(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(category))
}

pub(super) async fn create_category(
    State(state): State<AppState>,
    Json(payload): Json<CategoryInput>,
) -> Result<impl IntoResponse, ApiError> {
    let category = state
        .services
        .categories
        .create(payload)
        .await
        .map_err(map_service_error)?;
    Ok(created_response(category))
}

pub(super) async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<CategoryInput>,
) -> Result<impl IntoResponse, ApiError> {
    let category = state
        .services
        .categories
        .update(id, payload)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(category))
}

pub(super) async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .categories
        .delete(id)
        .await
        .map_err(map_service_error)?;
    Ok(no_content_response())
}

pub(super) async fn list_transport_companies(
    State(state): State<AppState>,
    Query(pagination): Query<PaginationParams>,
    Query(search): Query<SearchParams>,
) -> Result<impl IntoResponse, ApiError> {
    let page = page_request(&state, &pagination)?;
    let companies = state
        .services
        .transport_companies
        .list(search.search.as_deref(), page)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(companies))
}

pub(super) async fn get_transport_company(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let company = state
        .services
        .transport_companies
        .get(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(company))
}

pub(super) async fn create_transport_company(
    State(state): State<AppState>,
    Json(payload): Json<TransportCompanyInput>,
) -> Result<impl IntoResponse, ApiError> {
    let company = state
        .services
        .transport_companies
        .create(payload)
        .await
        .map_err(map_service_error)?;
    Ok(created_response(company))
}

pub(super) async fn update_transport_company(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<TransportCompanyInput>,
) -> Result<impl IntoResponse, ApiError> {
    let company = state
        .services
        .transport_companies
        .update(id, payload)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(company))
}

pub(super) async fn delete_transport_company(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .transport_companies
        .delete(id)
        .await
        .map_err(map_service_error)?;
    Ok(no_content_response())
}

pub(super) async fn list_products(
    State(state): State<AppState>,
    Query(pagination): Query<PaginationParams>,
    Query(filter): Query<ProductFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let page = page_request(&state, &pagination)?;
    let products = state
        .services
        .products
        .list(filter, page)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(products))
}

pub(super) async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let product = state
        .services
        .products
        .get(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(product))
}

pub(super) async fn create_product(
    State(state): State<AppState>,
    Json(payload): Json<ProductInput>,
) -> Result<impl IntoResponse, ApiError> {
    let product = state
        .services
        .products
        .create(payload)
        .await
        .map_err(map_service_error)?;
    Ok(created_response(product))
}

pub(super) async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<ProductInput>,
) -> Result<impl IntoResponse, ApiError> {
    let product = state
        .services
        .products
        .update(id, payload)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(product))
}

pub(super) async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .products
        .delete(id)
        .await
        .map_err(map_service_error)?;
    Ok(no_content_response())
}

pub(super) async fn list_product_prices(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let prices = state
        .services
        .products
        .list_prices(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(prices))
}

pub(super) async fn add_product_price(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<PriceInput>,
) -> Result<impl IntoResponse, ApiError> {
    let price = state
        .services
        .products
        .add_price(id, payload)
        .await
        .map_err(map_service_error)?;
    Ok(created_response(price))
}

pub(super) async fn list_prices(
    State(state): State<AppState>,
    Query(pagination): Query<PaginationParams>,
    Query(filter): Query<PriceFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let page = page_request(&state, &pagination)?;
    let prices = state
        .services
        .products
        .list_all_prices(filter, page)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(prices))
}

pub(super) async fn get_price(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let price = state
        .services
        .products
        .get_price(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(price))
}

pub(super) async fn create_price(
    State(state): State<AppState>,
    Json(payload): Json<PriceRecordInput>,
) -> Result<impl IntoResponse, ApiError> {
    let price = state
        .services
        .products
        .create_price(payload)
        .await
        .map_err(map_service_error)?;
    Ok(created_response(price))
}

pub(super) async fn update_price(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<PriceRecordInput>,
) -> Result<impl IntoResponse, ApiError> {
    let price = state
        .services
        .products
        .update_price(id, payload)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(price))
}

pub(super) async fn delete_price(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .products
        .delete_price(id)
        .await
        .map_err(map_service_error)?;
    Ok(no_content_response())
}
