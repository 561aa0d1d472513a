//! Router composition: entity routers, service banner, JSON 404 fallback
//! and the interactive API docs.

use axum::{Json, Router, http::StatusCode, routing::get};
use serde_json::{Value, json};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use crate::entities::{member, order, product};
use crate::store::Store;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Storefront API",
        description = "Filterable CRUD endpoints over members, orders and products"
    ),
    components(schemas(
        member::Model,
        member::MemberPayload,
        order::Model,
        order::OrderPayload,
        product::Model,
        product::ProductPayload,
    ))
)]
struct ApiDoc;

async fn root() -> Json<Value> {
    Json(json!({
        "message": "Storefront API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "members": "/members",
            "orders": "/orders",
            "products": "/products",
            "docs": "/docs"
        }
    }))
}

async fn not_found() -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "status": "error",
            "message": "The requested route does not exist"
        })),
    )
}

/// Builds the full application router around an injected store handle.
#[must_use]
pub fn router(store: Store) -> Router {
    Router::new()
        .route("/", get(root))
        .nest("/members", member::router(store.clone()))
        .nest("/orders", order::router(store.clone()))
        .nest("/products", product::router(store))
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()))
        .fallback(not_found)
}
