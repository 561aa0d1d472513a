//! Search endpoint behavior: keyword matching, range filters, the
//! exclusive date-range end, sort resolution quirks and the permissive
//! treatment of unknown parameters.

use axum::http::StatusCode;
use chrono::{TimeZone, Utc};
use sea_orm::ActiveModelTrait;
use sea_orm::ActiveValue::{NotSet, Set};
use serde_json::{Value, json};

use storefront::entities::order;
use storefront::store::Store;

mod common;
use common::{get, post_json, setup_app};

async fn seed_order(store: &Store, number: &str, customer: &str, amount: f64, date: (i32, u32, u32)) {
    let order_date = Utc
        .with_ymd_and_hms(date.0, date.1, date.2, 12, 0, 0)
        .unwrap();
    let active = order::ActiveModel {
        id: NotSet,
        order_number: Set(number.to_string()),
        customer_name: Set(customer.to_string()),
        email: Set(format!("{number}@example.com")),
        phone: Set(None),
        total_amount: Set(amount),
        status: Set("pending".to_string()),
        order_date: Set(order_date),
        created_at: Set(order_date),
    };
    active.insert(store.connection()).await.expect("seed order");
}

fn data_field<'a>(body: &'a Value, key: &str) -> Vec<&'a Value> {
    body["data"]
        .as_array()
        .expect("data array")
        .iter()
        .map(|row| &row[key])
        .collect()
}

#[tokio::test]
async fn keyword_search_is_case_insensitive_substring() {
    let (app, _store) = setup_app().await;

    post_json(
        &app,
        "/members",
        json!({"firstName": "John", "lastName": "Smith", "email": "john@example.com"}),
    )
    .await;
    post_json(
        &app,
        "/members",
        json!({"firstName": "Jane", "lastName": "Doe", "email": "jane@example.com"}),
    )
    .await;

    let (status, body) = get(&app, "/members/search?keyword=smith").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["data"][0]["lastName"], "Smith");
}

#[tokio::test]
async fn keyword_matches_any_configured_field() {
    let (app, store) = setup_app().await;

    seed_order(&store, "ORD100", "Charles Babbage", 10.0, (2024, 1, 5)).await;
    seed_order(&store, "ORD200", "Ada Lovelace", 20.0, (2024, 1, 6)).await;

    // Matches the order number of one row and the customer name of none.
    let (status, body) = get(&app, "/orders/search?keyword=ord1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["data"][0]["orderNumber"], "ORD100");

    // Matches a customer name case-insensitively.
    let (_, body) = get(&app, "/orders/search?keyword=LOVELACE").await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["data"][0]["customerName"], "Ada Lovelace");
}

#[tokio::test]
async fn blank_keyword_is_ignored() {
    let (app, store) = setup_app().await;
    seed_order(&store, "ORD300", "X", 5.0, (2024, 2, 1)).await;

    let (status, body) = get(&app, "/orders/search?keyword=%20%20").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1, "whitespace keyword must not filter");
}

#[tokio::test]
async fn unknown_parameters_never_error() {
    let (app, _store) = setup_app().await;

    post_json(&app, "/products", json!({"name": "Cable", "price": 3.5})).await;

    let (status, body) = get(&app, "/products/search?bogus=1&page=zzz").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
}

#[tokio::test]
async fn price_range_filters_inclusively() {
    let (app, _store) = setup_app().await;

    for (name, price) in [("Cheap", 5.0), ("Mid", 15.0), ("Dear", 25.0)] {
        post_json(&app, "/products", json!({"name": name, "price": price})).await;
    }

    let (status, body) = get(&app, "/products/search?minPrice=5&maxPrice=15").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);
    let names = data_field(&body, "name");
    assert!(names.contains(&&json!("Cheap")));
    assert!(names.contains(&&json!("Mid")));
}

#[tokio::test]
async fn non_numeric_range_value_is_rejected_with_parameter_name() {
    let (app, _store) = setup_app().await;

    let (status, body) = get(&app, "/products/search?minPrice=cheap").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
    assert_eq!(body["message"], "Invalid value for parameter 'minPrice'");

    let (status, body) = get(&app, "/orders/search?maxAmount=lots").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid value for parameter 'maxAmount'");
}

#[tokio::test]
async fn end_date_includes_the_whole_end_day() {
    let (app, store) = setup_app().await;

    seed_order(&store, "ORD009", "Before", 1.0, (2024, 1, 9)).await;
    seed_order(&store, "ORD010", "Boundary", 2.0, (2024, 1, 10)).await;
    seed_order(&store, "ORD011", "After", 3.0, (2024, 1, 11)).await;

    let (status, body) = get(&app, "/orders/search?endDate=2024-01-10").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);
    let numbers = data_field(&body, "orderNumber");
    assert!(numbers.contains(&&json!("ORD009")));
    assert!(numbers.contains(&&json!("ORD010")));

    let (_, body) = get(&app, "/orders/search?startDate=2024-01-10&endDate=2024-01-10").await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["data"][0]["orderNumber"], "ORD010");
}

#[tokio::test]
async fn status_filter_is_exact() {
    let (app, store) = setup_app().await;

    seed_order(&store, "ORD400", "P", 1.0, (2024, 3, 1)).await;
    let (_, created) = post_json(
        &app,
        "/orders",
        json!({"customerName": "Q", "email": "q@example.com", "totalAmount": 2.0}),
    )
    .await;
    let id = created["data"]["id"].as_i64().unwrap();
    common::put_json(
        &app,
        &format!("/orders/{id}"),
        json!({"customerName": "Q", "email": "q@example.com", "totalAmount": 2.0, "status": "completed"}),
    )
    .await;

    let (_, body) = get(&app, "/orders/search?status=completed").await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["data"][0]["customerName"], "Q");

    // Case differs: no match, because status is an exact comparison.
    let (_, body) = get(&app, "/orders/search?status=Completed").await;
    assert_eq!(body["total"], 0);
}

#[tokio::test]
async fn in_stock_flag_filters_tri_state() {
    let (app, _store) = setup_app().await;

    post_json(
        &app,
        "/products",
        json!({"name": "Stocked", "price": 1.0, "stock": 4}),
    )
    .await;
    post_json(&app, "/products", json!({"name": "Empty", "price": 1.0})).await;

    let (_, body) = get(&app, "/products/search?inStock=true").await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["data"][0]["name"], "Stocked");

    let (_, body) = get(&app, "/products/search?inStock=false").await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["data"][0]["name"], "Empty");

    // Any other value leaves the filter out entirely.
    let (_, body) = get(&app, "/products/search?inStock=maybe").await;
    assert_eq!(body["total"], 2);
}

#[tokio::test]
async fn inactive_products_are_hidden_from_list_and_search() {
    let (app, _store) = setup_app().await;

    let (_, created) = post_json(
        &app,
        "/products",
        json!({"name": "Ghost", "price": 9.0}),
    )
    .await;
    let id = created["data"]["id"].as_i64().unwrap();
    post_json(&app, "/products", json!({"name": "Visible", "price": 9.0})).await;

    common::put_json(
        &app,
        &format!("/products/{id}"),
        json!({"name": "Ghost", "price": 9.0, "isActive": false}),
    )
    .await;

    let (_, list) = get(&app, "/products").await;
    assert_eq!(list["total"], 1);
    assert_eq!(list["data"][0]["name"], "Visible");

    let (_, searched) = get(&app, "/products/search?keyword=ghost").await;
    assert_eq!(searched["total"], 0);

    // Direct fetch by id still works; only listing hides inactive rows.
    let (status, _) = get(&app, &format!("/products/{id}")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn sort_descends_only_on_exact_lowercase_desc() {
    let (app, _store) = setup_app().await;

    for (name, price) in [("A", 5.0), ("B", 15.0), ("C", 25.0)] {
        post_json(&app, "/products", json!({"name": name, "price": price})).await;
    }

    let (_, body) = get(&app, "/products/search?sort=price&order=desc").await;
    assert_eq!(body["data"][0]["price"].as_f64(), Some(25.0));
    assert_eq!(body["sort"], json!({"field": "price", "direction": "desc"}));

    // The uppercase spelling is not recognized and resolves ascending.
    let (_, body) = get(&app, "/products/search?sort=price&order=DESC").await;
    assert_eq!(body["data"][0]["price"].as_f64(), Some(5.0));
    assert_eq!(body["sort"]["direction"], "asc");
}

#[tokio::test]
async fn unlisted_sort_field_falls_back_to_default() {
    let (app, store) = setup_app().await;

    seed_order(&store, "ORD501", "Late", 1.0, (2024, 5, 2)).await;
    seed_order(&store, "ORD500", "Early", 1.0, (2024, 5, 1)).await;

    // "phone" is not sortable; the resolver falls back to the order date,
    // ascending because no direction was given.
    let (_, body) = get(&app, "/orders/search?sort=phone").await;
    assert_eq!(body["sort"], json!({"field": "orderDate", "direction": "asc"}));
    assert_eq!(body["data"][0]["orderNumber"], "ORD500");
}

#[tokio::test]
async fn search_echoes_the_constructed_filter() {
    let (app, _store) = setup_app().await;

    let (_, body) = get(&app, "/orders/search?status=pending&minAmount=10").await;
    let filter = body["filter"].as_array().expect("filter echo");
    assert!(filter.contains(&json!({
        "field": "status",
        "operator": "equals",
        "value": "pending"
    })));
    assert!(filter.contains(&json!({
        "field": "totalAmount",
        "operator": "greaterOrEqual",
        "value": 10.0
    })));
}
