//! Public, read-only catalog pages.

use crate::{
    errors::{ApiError, ErrorResponse},
    handlers::common::{map_service_error, success_response},
    services::catalog::{CategoryListing, PageSelector, ProductDetail, ProductListing},
    AppState,
};
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect},
    routing::get,
    Router,
};
use serde::Deserialize;
use utoipa::IntoParams;

pub const PRODUCT_LIST_PATH: &str = "/supermarket/products/";

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ProductListQuery {
    /// Category id; anything that is not a number is ignored
    pub category: Option<String>,
    /// Page number or `last`
    pub page: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct PageQuery {
    /// Page number or `last`
    pub page: Option<String>,
}

/// Catalog routes; every path also answers without its trailing slash
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/supermarket/products/", get(list_products))
        .route("/supermarket/products", get(list_products))
        .route("/supermarket/products/:id/", get(get_product))
        .route("/supermarket/products/:id", get(get_product))
        .route("/supermarket/categories/", get(list_categories))
        .route("/supermarket/categories", get(list_categories))
        .route(
            "/supermarket/categories/:category_id/products/",
            get(list_category_products),
        )
        .route(
            "/supermarket/categories/:category_id/products",
            get(list_category_products),
        )
}

async fn index() -> Redirect {
    Redirect::temporary(PRODUCT_LIST_PATH)
}

/// List active products
#[utoipa::path(
    get,
    path = "/supermarket/products/",
    params(ProductListQuery),
    responses(
        (status = 200, description = "Active products, 20 per page", body = ProductListing),
        (status = 404, description = "Page does not exist", body = ErrorResponse)
    ),
    tag = "Catalog"
)]
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = PageSelector::parse(query.page.as_deref()).map_err(map_service_error)?;
    let listing = state
        .services
        .catalog
        .list_products(query.category.as_deref(), page)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(listing))
}

/// Show one active product with its price history
#[utoipa::path(
    get,
    path = "/supermarket/products/{id}/",
    params(("id" = String, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product found", body = ProductDetail),
        (status = 404, description = "Missing, inactive or malformed id", body = ErrorResponse)
    ),
    tag = "Catalog"
)]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let detail = state
        .services
        .catalog
        .product_detail(&id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(detail))
}

/// List categories
#[utoipa::path(
    get,
    path = "/supermarket/categories/",
    params(PageQuery),
    responses(
        (status = 200, description = "Categories by name", body = CategoryListing),
        (status = 404, description = "Page does not exist", body = ErrorResponse)
    ),
    tag = "Catalog"
)]
pub async fn list_categories(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = PageSelector::parse(query.page.as_deref()).map_err(map_service_error)?;
    let listing = state
        .services
        .catalog
        .list_categories(page)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(listing))
}

/// List the active products of one category
#[utoipa::path(
    get,
    path = "/supermarket/categories/{category_id}/products/",
    params(
        ("category_id" = String, Path, description = "Category id"),
        PageQuery
    ),
    responses(
        (status = 200, description = "Products of the category", body = ProductListing),
        (status = 404, description = "Unknown category or page", body = ErrorResponse)
    ),
    tag = "Catalog"
)]
pub async fn list_category_products(
    State(state): State<AppState>,
    Path(category_id): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = PageSelector::parse(query.page.as_deref()).map_err(map_service_error)?;
    let listing = state
        .services
        .catalog
        .category_products(&category_id, page)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(listing))
}
