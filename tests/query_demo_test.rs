//! The single-concept demo endpoints: each one applies exactly its own
//! parameters and echoes the descriptor it constructed alongside the data.

use axum::http::StatusCode;
use serde_json::json;

mod common;
use common::{get, post_json, setup_app};

#[tokio::test]
async fn projection_returns_only_the_declared_columns() {
    let (app, _store) = setup_app().await;

    post_json(
        &app,
        "/products",
        json!({"name": "Lamp", "price": 12.5, "stock": 3, "category": "home"}),
    )
    .await;

    let (status, body) = get(&app, "/products/q/projection").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["concept"], "projection (select)");
    assert_eq!(body["projection"], json!(["id", "name", "price", "stock"]));

    let row = body["data"][0].as_object().expect("projected row");
    let mut keys: Vec<&str> = row.keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(keys, vec!["id", "name", "price", "stock"]);
    assert_eq!(row["name"], "Lamp");
}

#[tokio::test]
async fn member_projection_uses_member_columns() {
    let (app, _store) = setup_app().await;

    post_json(
        &app,
        "/members",
        json!({"firstName": "Ada", "lastName": "Lovelace", "email": "ada@example.com"}),
    )
    .await;

    let (_, body) = get(&app, "/members/q/projection").await;
    assert_eq!(
        body["projection"],
        json!(["id", "firstName", "lastName", "email"])
    );
    let row = body["data"][0].as_object().expect("projected row");
    assert!(row.contains_key("firstName"));
    assert!(!row.contains_key("phone"));
}

#[tokio::test]
async fn status_demo_echoes_its_filter() {
    let (app, _store) = setup_app().await;

    post_json(
        &app,
        "/orders",
        json!({"customerName": "A", "email": "a@example.com", "totalAmount": 1.0}),
    )
    .await;

    let (status, body) = get(&app, "/orders/q/status?status=pending").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["filter"],
        json!([{"field": "status", "operator": "equals", "value": "pending"}])
    );
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    // Without the parameter the filter is empty and everything matches.
    let (_, body) = get(&app, "/orders/q/status").await;
    assert_eq!(body["filter"], json!([]));
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn amount_range_demo_uses_short_parameter_names() {
    let (app, _store) = setup_app().await;

    for amount in [50.0, 150.0, 250.0] {
        post_json(
            &app,
            "/orders",
            json!({
                "customerName": "C",
                "email": format!("c{amount}@example.com"),
                "totalAmount": amount
            }),
        )
        .await;
    }

    let (_, body) = get(&app, "/orders/q/amount-range?min=100&max=200").await;
    assert_eq!(body["concept"], "where + number operators (gte, lte)");
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["totalAmount"].as_f64(), Some(150.0));

    let filter = body["filter"].as_array().unwrap();
    assert_eq!(filter.len(), 2);
}

#[tokio::test]
async fn demo_endpoints_ignore_unrelated_parameters() {
    let (app, _store) = setup_app().await;

    post_json(
        &app,
        "/orders",
        json!({"customerName": "A", "email": "a@example.com", "totalAmount": 1.0}),
    )
    .await;

    // minAmount is not part of the status demo; even an unparseable value
    // is ignored rather than rejected.
    let (status, body) = get(&app, "/orders/q/status?minAmount=junk").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn sort_demo_echoes_the_resolved_spec() {
    let (app, _store) = setup_app().await;

    for (name, price) in [("A", 1.0), ("B", 2.0)] {
        post_json(&app, "/products", json!({"name": name, "price": price})).await;
    }

    let (_, body) = get(&app, "/products/q/sort?by=price&dir=desc").await;
    assert_eq!(body["sort"], json!({"field": "price", "direction": "desc"}));
    assert_eq!(body["data"][0]["name"], "B");

    // An unlisted field falls back to the default, and a mistyped
    // direction resolves ascending.
    let (_, body) = get(&app, "/products/q/sort?by=imageUrl&dir=DESC").await;
    assert_eq!(body["sort"]["field"], "createdAt");
    assert_eq!(body["sort"]["direction"], "asc");
}

#[tokio::test]
async fn prefix_demo_matches_last_name_prefixes() {
    let (app, _store) = setup_app().await;

    post_json(
        &app,
        "/members",
        json!({"firstName": "John", "lastName": "Smith", "email": "j@example.com"}),
    )
    .await;
    post_json(
        &app,
        "/members",
        json!({"firstName": "Sam", "lastName": "Jones", "email": "s@example.com"}),
    )
    .await;

    let (_, body) = get(&app, "/members/q/prefix?prefix=sm").await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["lastName"], "Smith");
    assert_eq!(
        body["filter"],
        json!([{"field": "lastName", "operator": "startsWith", "value": "sm"}])
    );
}

#[tokio::test]
async fn date_range_demo_includes_the_end_day() {
    let (app, _store) = setup_app().await;

    let (status, body) = get(&app, "/orders/q/date-range?endDate=2024-01-10").await;
    assert_eq!(status, StatusCode::OK);
    let filter = body["filter"].as_array().unwrap();
    assert_eq!(filter.len(), 1);
    assert_eq!(filter[0]["operator"], "lessThan");
    assert_eq!(filter[0]["field"], "orderDate");
    // Midnight of the day after the supplied end date.
    let value = filter[0]["value"].as_str().expect("timestamp echo");
    assert!(value.starts_with("2024-01-11T00:00:00"), "got {value}");
}

#[tokio::test]
async fn root_banner_lists_the_entity_endpoints() {
    let (app, _store) = setup_app().await;

    let (status, body) = get(&app, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["endpoints"]["members"], "/members");
    assert_eq!(body["endpoints"]["orders"], "/orders");
    assert_eq!(body["endpoints"]["products"], "/products");
}
