mod common;

use axum::http::{Method, StatusCode};
use chrono::{Duration, Utc};
use rust_decimal_macros::dec;
use serde_json::{json, Value};

use common::{decimal, TestApp};

struct Shop {
    app: TestApp,
    register_id: i32,
    bread_id: i32,
    butter_id: i32,
    jam_id: i32,
}

/// Register 1 (cash and card), bread priced at 100.00, butter and jam unpriced.
async fn shop() -> Shop {
    let app = TestApp::new().await;
    let register = app.seed_register(1, &["cash", "card"]).await;
    let grocery = app.seed_category("Grocery").await;
    let bread = app.seed_product("Bread", grocery.id, true).await;
    let butter = app.seed_product("Butter", grocery.id, true).await;
    let jam = app.seed_product("Jam", grocery.id, true).await;
    app.seed_price(bread.id, dec!(100.00), Utc::now() - Duration::days(1))
        .await;

    Shop {
        register_id: register.register.id,
        bread_id: bread.id,
        butter_id: butter.id,
        jam_id: jam.id,
        app,
    }
}

fn item_for(receipt: &Value, product_id: i32) -> Value {
    receipt["items"]
        .as_array()
        .unwrap()
        .iter()
        .find(|item| item["product_id"] == product_id)
        .cloned()
        .unwrap_or_else(|| panic!("product {product_id} not on receipt"))
}

fn assert_totals(receipt: &Value, subtotal: rust_decimal::Decimal, discount: rust_decimal::Decimal, final_amount: rust_decimal::Decimal) {
    assert_eq!(decimal(&receipt["subtotal"]), subtotal, "subtotal");
    assert_eq!(decimal(&receipt["discount_amount"]), discount, "discount");
    assert_eq!(decimal(&receipt["final_amount"]), final_amount, "final");
}

#[tokio::test]
async fn totals_follow_every_item_change() {
    let shop = shop().await;
    let card = shop.app.seed_card("CARD-10", dec!(10), true).await;

    let (status, receipt) = shop
        .app
        .admin_json(
            Method::POST,
            "/admin/purchases",
            Some(json!({
                "cash_register_id": shop.register_id,
                "discount_card_id": card.id,
                "items": [
                    { "product_id": shop.bread_id, "quantity": 2 },
                    { "product_id": shop.butter_id, "price_at_purchase": "55.55" }
                ]
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{receipt}");
    let purchase_id = receipt["id"].as_i64().unwrap();

    // Missing price captured from the current one
    let bread = item_for(&receipt, shop.bread_id);
    assert_eq!(decimal(&bread["price_at_purchase"]), dec!(100.00));
    assert_eq!(decimal(&bread["line_total"]), dec!(200.00));
    assert_eq!(bread["product_name"], "Bread");
    // 25.555 rounds half to even
    assert_totals(&receipt, dec!(255.55), dec!(25.56), dec!(229.99));

    let (status, receipt) = shop
        .app
        .admin_json(
            Method::POST,
            &format!("/admin/purchases/{purchase_id}/items"),
            Some(json!({ "product_id": shop.jam_id, "quantity": 3, "price_at_purchase": "10.00" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{receipt}");
    assert_totals(&receipt, dec!(285.55), dec!(28.56), dec!(256.99));

    let bread_item_id = item_for(&receipt, shop.bread_id)["id"].as_i64().unwrap();
    let (status, receipt) = shop
        .app
        .admin_json(
            Method::PUT,
            &format!("/admin/purchases/{purchase_id}/items/{bread_item_id}"),
            Some(json!({ "quantity": 1 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{receipt}");
    assert_eq!(decimal(&item_for(&receipt, shop.bread_id)["line_total"]), dec!(100.00));
    assert_totals(&receipt, dec!(185.55), dec!(18.56), dec!(166.99));

    let jam_item_id = item_for(&receipt, shop.jam_id)["id"].as_i64().unwrap();
    let (status, receipt) = shop
        .app
        .admin_json(
            Method::DELETE,
            &format!("/admin/purchases/{purchase_id}/items/{jam_item_id}"),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{receipt}");
    assert_eq!(receipt["items"].as_array().unwrap().len(), 2);
    assert_totals(&receipt, dec!(155.55), dec!(15.56), dec!(139.99));

    // Stored values match what the write returned
    let (status, stored) = shop
        .app
        .admin_json(Method::GET, &format!("/admin/purchases/{purchase_id}"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_totals(&stored, dec!(155.55), dec!(15.56), dec!(139.99));
}

#[tokio::test]
async fn inactive_card_gives_no_discount() {
    let shop = shop().await;
    let card = shop.app.seed_card("CARD-OFF", dec!(50), false).await;

    let (status, receipt) = shop
        .app
        .admin_json(
            Method::POST,
            "/admin/purchases",
            Some(json!({
                "cash_register_id": shop.register_id,
                "discount_card_id": card.id,
                "items": [{ "product_id": shop.bread_id }]
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{receipt}");
    assert_totals(&receipt, dec!(100.00), dec!(0), dec!(100.00));
}

#[tokio::test]
async fn changing_the_card_recomputes_totals() {
    let shop = shop().await;
    let card = shop.app.seed_card("CARD-20", dec!(20), true).await;

    let (_, receipt) = shop
        .app
        .admin_json(
            Method::POST,
            "/admin/purchases",
            Some(json!({
                "cash_register_id": shop.register_id,
                "items": [{ "product_id": shop.bread_id }]
            })),
        )
        .await;
    let purchase_id = receipt["id"].as_i64().unwrap();
    assert_totals(&receipt, dec!(100.00), dec!(0), dec!(100.00));

    let (status, receipt) = shop
        .app
        .admin_json(
            Method::PUT,
            &format!("/admin/purchases/{purchase_id}"),
            Some(json!({ "cash_register_id": shop.register_id, "discount_card_id": card.id })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{receipt}");
    assert_totals(&receipt, dec!(100.00), dec!(20.00), dec!(80.00));
}

#[tokio::test]
async fn captured_price_survives_later_price_changes() {
    let shop = shop().await;

    let (_, receipt) = shop
        .app
        .admin_json(
            Method::POST,
            "/admin/purchases",
            Some(json!({
                "cash_register_id": shop.register_id,
                "items": [{ "product_id": shop.bread_id, "quantity": 2 }]
            })),
        )
        .await;
    let purchase_id = receipt["id"].as_i64().unwrap();

    let (status, _) = shop
        .app
        .admin_json(
            Method::POST,
            &format!("/admin/products/{}/prices", shop.bread_id),
            Some(json!({ "value": "150.00" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, stored) = shop
        .app
        .admin_json(Method::GET, &format!("/admin/purchases/{purchase_id}"), None)
        .await;
    assert_eq!(
        decimal(&item_for(&stored, shop.bread_id)["price_at_purchase"]),
        dec!(100.00)
    );
    assert_totals(&stored, dec!(200.00), dec!(0), dec!(200.00));
}

#[tokio::test]
async fn unpriced_product_without_explicit_price_is_rejected() {
    let shop = shop().await;

    let (status, body) = shop
        .app
        .admin_json(
            Method::POST,
            "/admin/purchases",
            Some(json!({
                "cash_register_id": shop.register_id,
                "items": [{ "product_id": shop.jam_id }]
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("no current price"));

    // Nothing was written
    let (_, list) = shop.app.admin_json(Method::GET, "/admin/purchases", None).await;
    assert_eq!(list["total"], 0);
}

#[tokio::test]
async fn same_product_twice_on_a_receipt_conflicts() {
    let shop = shop().await;

    let (_, receipt) = shop
        .app
        .admin_json(
            Method::POST,
            "/admin/purchases",
            Some(json!({
                "cash_register_id": shop.register_id,
                "items": [{ "product_id": shop.bread_id }]
            })),
        )
        .await;
    let purchase_id = receipt["id"].as_i64().unwrap();

    let (status, _) = shop
        .app
        .admin_json(
            Method::POST,
            &format!("/admin/purchases/{purchase_id}/items"),
            Some(json!({ "product_id": shop.bread_id })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn invalid_quantity_is_rejected() {
    let shop = shop().await;

    let (status, _) = shop
        .app
        .admin_json(
            Method::POST,
            "/admin/purchases",
            Some(json!({
                "cash_register_id": shop.register_id,
                "items": [{ "product_id": shop.bread_id, "quantity": 0 }]
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn register_must_accept_the_payment_method() {
    let app = TestApp::new().await;
    let cash_only = app.seed_register(7, &["cash"]).await;

    let (status, body) = app
        .admin_json(
            Method::POST,
            "/admin/purchases",
            Some(json!({
                "cash_register_id": cash_only.register.id,
                "amount_paid_card": "10.00"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("card"));

    let (status, receipt) = app
        .admin_json(
            Method::POST,
            "/admin/purchases",
            Some(json!({
                "cash_register_id": cash_only.register.id,
                "amount_paid_cash": "10.00"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(receipt["payment_summary"], "Cash: 10.00");
}

#[tokio::test]
async fn referenced_records_cannot_be_deleted() {
    let shop = shop().await;

    let (status, receipt) = shop
        .app
        .admin_json(
            Method::POST,
            "/admin/purchases",
            Some(json!({
                "cash_register_id": shop.register_id,
                "items": [{ "product_id": shop.bread_id }]
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let purchase_id = receipt["id"].as_i64().unwrap();

    let (status, _) = shop
        .app
        .admin_json(Method::DELETE, &format!("/admin/products/{}", shop.bread_id), None)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = shop
        .app
        .admin_json(
            Method::DELETE,
            &format!("/admin/cash-registers/{}", shop.register_id),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, product) = shop
        .app
        .admin_json(Method::GET, &format!("/admin/products/{}", shop.bread_id), None)
        .await;
    let category_id = product["category_id"].as_i64().unwrap();
    let (status, _) = shop
        .app
        .admin_json(Method::DELETE, &format!("/admin/categories/{category_id}"), None)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Once the receipt is gone its items go too and the product is free
    let (status, _) = shop
        .app
        .admin_json(Method::DELETE, &format!("/admin/purchases/{purchase_id}"), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = shop
        .app
        .admin_json(Method::DELETE, &format!("/admin/products/{}", shop.bread_id), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}
