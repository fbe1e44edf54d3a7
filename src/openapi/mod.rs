use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub const OPENAPI_JSON_PATH: &str = "/api-docs/openapi.json";

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Supermarket API",
        version = "0.1.0",
        description = r#"
# Supermarket API

Public product catalog and back-office for a supermarket: categories,
products with dated price history, cash registers, cashiers, discount cards
and purchase receipts.

## Catalog

Read-only pages under `/supermarket/`. Only active products are listed, 20
per page. `page` accepts a number or `last`; a page that does not exist
answers 404.

## Admin

JSON CRUD under `/admin/`. When an admin token is configured every request
must carry it:

```
Authorization: Bearer <admin-token>
```

Receipt totals are recomputed whenever a line is added, changed or removed.

## Errors

```json
{
  "error": "Not Found",
  "message": "Not found: Product 42 not found",
  "timestamp": "2024-01-01T00:00:00Z"
}
```
        "#,
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    tags(
        (name = "Catalog", description = "Public catalog pages"),
        (name = "Health", description = "Health check endpoints")
    ),
    paths(
        crate::handlers::catalog::list_products,
        crate::handlers::catalog::get_product,
        crate::handlers::catalog::list_categories,
        crate::handlers::catalog::list_category_products,
        crate::health::health_check,
    ),
    components(
        schemas(
            crate::services::catalog::CategorySummary,
            crate::services::catalog::ProductSummary,
            crate::services::catalog::PriceEntry,
            crate::services::catalog::ProductDetail,
            crate::services::catalog::ProductListing,
            crate::services::catalog::CategoryListing,

            // Admin payloads
            crate::services::categories::CategoryInput,
            crate::services::transport_companies::TransportCompanyInput,
            crate::services::products::ProductInput,
            crate::services::products::PriceInput,
            crate::services::products::PriceRecordInput,
            crate::services::registers::PaymentMethodInput,
            crate::services::registers::CashierInput,
            crate::services::registers::CashRegisterInput,
            crate::services::discount_cards::DiscountCardInput,
            crate::services::purchases::CreatePurchaseInput,
            crate::services::purchases::UpdatePurchaseInput,
            crate::services::purchases::NewItemInput,
            crate::services::purchases::ItemUpdateInput,

            crate::health::HealthInfo,
            crate::health::HealthStatus,
            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDoc;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url(OPENAPI_JSON_PATH, ApiDoc::openapi())
        .config(utoipa_swagger_ui::Config::from(OPENAPI_JSON_PATH).try_it_out_enabled(true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_catalog_paths() {
        let json = serde_json::to_string(&ApiDoc::openapi()).unwrap();
        assert!(json.contains("Supermarket API"));
        assert!(json.contains("/supermarket/products/"));
        assert!(json.contains("/supermarket/categories/{category_id}/products/"));
        assert!(json.contains("CreatePurchaseInput"));
    }
}
