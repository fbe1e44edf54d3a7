#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{self, Body},
    http::{Method, Request, StatusCode},
    response::Response,
    Router,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde_json::Value;
use supermarket_api::{
    build_router,
    config::AppConfig,
    db::{self, DbConfig},
    entities::{cashier, category, discount_card, payment_method, price, product},
    services::{
        categories::CategoryInput,
        discount_cards::DiscountCardInput,
        products::{PriceInput, ProductInput},
        registers::{CashRegisterInput, CashRegisterView, CashierInput},
    },
    AppState,
};
use tower::ServiceExt;

/// Helper harness for spinning up the full router backed by an in-memory SQLite database.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    admin_token: Option<String>,
}

impl TestApp {
    /// Open admin API, fresh database.
    pub async fn new() -> Self {
        Self::build(None).await
    }

    /// Admin API guarded by `token`.
    pub async fn with_admin_token(token: &str) -> Self {
        Self::build(Some(token.to_string())).await
    }

    async fn build(admin_token: Option<String>) -> Self {
        let mut cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        cfg.cors_allow_any_origin = true;
        cfg.admin_token = admin_token.clone();

        let pool = db::establish_connection_with_config(&DbConfig::single_connection(
            cfg.database_url.clone(),
        ))
        .await
        .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let state = AppState::new(Arc::new(pool), cfg);
        let router = build_router(state.clone()).expect("router builds");

        Self {
            router,
            state,
            admin_token,
        }
    }

    /// Send a request without credentials.
    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> Response {
        self.request_with_headers(method, uri, body, &[]).await
    }

    /// Send a request to the admin API carrying the configured token, if any.
    pub async fn admin_request(&self, method: Method, uri: &str, body: Option<Value>) -> Response {
        match self.admin_token.clone() {
            Some(token) => {
                let bearer = format!("Bearer {token}");
                self.request_with_headers(method, uri, body, &[("authorization", bearer.as_str())])
                    .await
            }
            None => self.request(method, uri, body).await,
        }
    }

    pub async fn request_with_headers(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        headers: &[(&str, &str)],
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// GET returning status and parsed body.
    pub async fn get_json(&self, uri: &str) -> (StatusCode, Value) {
        let response = self.request(Method::GET, uri, None).await;
        split(response).await
    }

    /// Admin call returning status and parsed body (`Value::Null` for empty bodies).
    pub async fn admin_json(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let response = self.admin_request(method, uri, body).await;
        split(response).await
    }

    pub async fn seed_category(&self, name: &str) -> category::Model {
        self.state
            .services
            .categories
            .create(CategoryInput {
                name: name.to_string(),
                description: format!("{name} aisle"),
            })
            .await
            .expect("seed category")
    }

    pub async fn seed_product(&self, name: &str, category_id: i32, is_active: bool) -> product::Model {
        self.state
            .services
            .products
            .create(ProductInput {
                name: name.to_string(),
                description: String::new(),
                category_id,
                is_active,
                transport_company_ids: Vec::new(),
            })
            .await
            .expect("seed product")
            .product
    }

    pub async fn seed_price(
        &self,
        product_id: i32,
        value: Decimal,
        start_date: DateTime<Utc>,
    ) -> price::Model {
        self.state
            .services
            .products
            .add_price(
                product_id,
                PriceInput {
                    value,
                    start_date: Some(start_date),
                },
            )
            .await
            .expect("seed price")
    }

    /// Register number `number` supporting the given method codes.
    pub async fn seed_register(&self, number: i32, codes: &[&str]) -> CashRegisterView {
        let methods = self
            .state
            .services
            .payment_methods
            .list(None, supermarket_api::services::PageRequest::new(1, 100))
            .await
            .expect("list payment methods");
        let ids: Vec<i32> = methods
            .items
            .iter()
            .filter(|m: &&payment_method::Model| codes.contains(&m.code.as_str()))
            .map(|m| m.id)
            .collect();

        self.state
            .services
            .cash_registers
            .create(CashRegisterInput {
                number,
                is_active: true,
                supported_payment_method_ids: ids,
            })
            .await
            .expect("seed register")
    }

    pub async fn seed_cashier(&self, name: &str) -> cashier::Model {
        self.state
            .services
            .cashiers
            .create(CashierInput {
                name: name.to_string(),
                is_active: true,
            })
            .await
            .expect("seed cashier")
    }

    pub async fn seed_card(
        &self,
        card_number: &str,
        discount_percent: Decimal,
        is_active: bool,
    ) -> discount_card::Model {
        self.state
            .services
            .discount_cards
            .create(DiscountCardInput {
                card_number: card_number.to_string(),
                discount_percent,
                is_active,
            })
            .await
            .expect("seed discount card")
    }
}

pub async fn split(response: Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body bytes");
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json response")
    };
    (status, json)
}

/// Reads a JSON decimal (serialized as a string) back into a `Decimal`.
pub fn decimal(value: &Value) -> Decimal {
    match value {
        Value::String(s) => s.parse().expect("decimal string"),
        Value::Number(n) => n.to_string().parse().expect("decimal number"),
        other => panic!("not a decimal: {other}"),
    }
}
