mod common;

use axum::http::{Method, StatusCode};
use chrono::{Duration, Utc};
use rust_decimal_macros::dec;

use common::{decimal, TestApp};

#[tokio::test]
async fn root_redirects_to_product_list() {
    let app = TestApp::new().await;

    let response = app.request(Method::GET, "/", None).await;
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        response.headers().get("location").unwrap(),
        "/supermarket/products/"
    );
}

#[tokio::test]
async fn product_list_shows_only_active_products_with_current_price() {
    let app = TestApp::new().await;
    let dairy = app.seed_category("Dairy").await;
    let milk = app.seed_product("Milk", dairy.id, true).await;
    let hidden = app.seed_product("Old cheese", dairy.id, false).await;

    let now = Utc::now();
    app.seed_price(milk.id, dec!(79.90), now - Duration::days(10)).await;
    app.seed_price(milk.id, dec!(89.90), now - Duration::days(1)).await;
    app.seed_price(milk.id, dec!(99.90), now + Duration::days(5)).await;
    app.seed_price(hidden.id, dec!(10.00), now - Duration::days(1)).await;

    let (status, body) = app.get_json("/supermarket/products/").await;
    assert_eq!(status, StatusCode::OK);

    let products = body["products"]["items"].as_array().unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0]["name"], "Milk");
    assert_eq!(products[0]["category"]["name"], "Dairy");
    assert_eq!(decimal(&products[0]["current_price"]), dec!(89.90));
    assert_eq!(body["products"]["total"], 1);
    assert_eq!(body["categories"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn product_without_started_price_has_no_current_price() {
    let app = TestApp::new().await;
    let bakery = app.seed_category("Bakery").await;
    let bread = app.seed_product("Bread", bakery.id, true).await;
    app.seed_price(bread.id, dec!(45.00), Utc::now() + Duration::days(2)).await;

    let (status, body) = app
        .get_json(&format!("/supermarket/products/{}/", bread.id))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["current_price"].is_null());
    assert!(body["price_history"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn product_detail_lists_history_newest_first() {
    let app = TestApp::new().await;
    let drinks = app.seed_category("Drinks").await;
    let juice = app.seed_product("Juice", drinks.id, true).await;
    let now = Utc::now();
    app.seed_price(juice.id, dec!(100.00), now - Duration::days(30)).await;
    app.seed_price(juice.id, dec!(120.00), now - Duration::days(3)).await;

    let (status, body) = app
        .get_json(&format!("/supermarket/products/{}", juice.id))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Juice");
    assert_eq!(body["category"]["name"], "Drinks");
    assert_eq!(decimal(&body["current_price"]), dec!(120.00));

    let history = body["price_history"].as_array().unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(decimal(&history[0]["value"]), dec!(120.00));
    assert_eq!(decimal(&history[1]["value"]), dec!(100.00));
}

#[tokio::test]
async fn inactive_missing_or_malformed_product_is_not_found() {
    let app = TestApp::new().await;
    let frozen = app.seed_category("Frozen").await;
    let hidden = app.seed_product("Ice cream", frozen.id, false).await;

    for uri in [
        format!("/supermarket/products/{}/", hidden.id),
        "/supermarket/products/9999/".to_string(),
        "/supermarket/products/abc/".to_string(),
    ] {
        let (status, body) = app.get_json(&uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
        assert_eq!(body["error"], "Not Found");
    }
}

#[tokio::test]
async fn category_filter_narrows_products() {
    let app = TestApp::new().await;
    let fruit = app.seed_category("Fruit").await;
    let meat = app.seed_category("Meat").await;
    app.seed_product("Apple", fruit.id, true).await;
    app.seed_product("Beef", meat.id, true).await;

    let (status, body) = app
        .get_json(&format!("/supermarket/products/?category={}", fruit.id))
        .await;
    assert_eq!(status, StatusCode::OK);
    let items = body["products"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["name"], "Apple");
    assert_eq!(body["category"]["name"], "Fruit");

    // Not a number: ignored
    let (status, body) = app.get_json("/supermarket/products/?category=fruit").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["products"]["total"], 2);
    assert!(body["category"].is_null());

    // Unknown id: empty list
    let (status, body) = app.get_json("/supermarket/products/?category=4242").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["products"]["total"], 0);
}

#[tokio::test]
async fn pagination_serves_twenty_per_page_and_rejects_bad_pages() {
    let app = TestApp::new().await;
    let pantry = app.seed_category("Pantry").await;
    for i in 0..25 {
        app.seed_product(&format!("Item {i:02}"), pantry.id, true).await;
    }

    let (status, body) = app.get_json("/supermarket/products/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["products"]["items"].as_array().unwrap().len(), 20);
    assert_eq!(body["products"]["total_pages"], 2);

    let (status, body) = app.get_json("/supermarket/products/?page=2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["products"]["items"].as_array().unwrap().len(), 5);

    let (status, body) = app.get_json("/supermarket/products/?page=last").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["products"]["page"], 2);

    for page in ["3", "0", "abc"] {
        let (status, _) = app
            .get_json(&format!("/supermarket/products/?page={page}"))
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND, "page={page}");
    }
}

#[tokio::test]
async fn empty_catalog_first_page_is_valid() {
    let app = TestApp::new().await;

    let (status, body) = app.get_json("/supermarket/products/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["products"]["items"].as_array().unwrap().is_empty());

    let (status, _) = app.get_json("/supermarket/categories/").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn categories_are_listed_by_name() {
    let app = TestApp::new().await;
    app.seed_category("Vegetables").await;
    app.seed_category("Bakery").await;

    let (status, body) = app.get_json("/supermarket/categories").await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body["categories"]["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Bakery", "Vegetables"]);
}

#[tokio::test]
async fn category_products_page_requires_existing_category() {
    let app = TestApp::new().await;
    let snacks = app.seed_category("Snacks").await;
    app.seed_product("Chips", snacks.id, true).await;
    app.seed_product("Stale crackers", snacks.id, false).await;

    let (status, body) = app
        .get_json(&format!("/supermarket/categories/{}/products/", snacks.id))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["category"]["name"], "Snacks");
    assert_eq!(body["products"]["total"], 1);

    let (status, _) = app.get_json("/supermarket/categories/777/products/").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app.get_json("/supermarket/categories/x/products/").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn responses_carry_request_id() {
    let app = TestApp::new().await;

    let response = app
        .request_with_headers(
            Method::GET,
            "/supermarket/categories/",
            None,
            &[("x-request-id", "catalog-req-1")],
        )
        .await;
    assert_eq!(response.headers().get("x-request-id").unwrap(), "catalog-req-1");
}

#[tokio::test]
async fn health_reports_database_up() {
    let app = TestApp::new().await;

    let (status, body) = app.get_json("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "up");
    assert_eq!(body["database"], "up");

    let (status, body) = app.get_json("/status").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "up");
}
