//! Order records: model, schema, service rules and HTTP surface.
//!
//! Order numbers are synthesized server-side; `status` is an open string
//! that is stored and filtered verbatim, never validated against an enum.

use async_trait::async_trait;
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use chrono::{DateTime, Utc};
use rand::Rng;
use sea_orm::{
    ActiveValue::{NotSet, Set},
    Condition, JsonValue, entity::prelude::*,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::LazyLock;
use utoipa::ToSchema;

use crate::errors::ApiError;
use crate::query::{
    FilterExpression, ProjectionSpec, SortSpec, resolve_sort, translate, translate_only,
};
use crate::response::{ApiResponse, DemoResponse, SearchResponse};
use crate::schema::{
    Binding, EntitySchema, FieldDescriptor, FieldKind, Operator, ParamSpec, SortDirection,
};
use crate::store::{Store, StoreEntity};
use crate::validation::{RequiredFields, none_if_empty, parse_id};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "orders")]
#[serde(rename_all = "camelCase")]
#[schema(as = Order)]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub order_number: String,
    pub customer_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub total_amount: f64,
    pub status: String,
    pub order_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

pub static SCHEMA: EntitySchema = EntitySchema {
    entity: "order",
    fields: &[
        FieldDescriptor {
            name: "id",
            column: "id",
            kind: FieldKind::Number,
            operators: &[Operator::Equals],
        },
        FieldDescriptor {
            name: "orderNumber",
            column: "order_number",
            kind: FieldKind::Text,
            operators: &[Operator::Equals, Operator::ContainsIgnoreCase],
        },
        FieldDescriptor {
            name: "customerName",
            column: "customer_name",
            kind: FieldKind::Text,
            operators: &[
                Operator::Equals,
                Operator::ContainsIgnoreCase,
                Operator::StartsWith,
            ],
        },
        FieldDescriptor {
            name: "email",
            column: "email",
            kind: FieldKind::Text,
            operators: &[Operator::Equals, Operator::ContainsIgnoreCase],
        },
        FieldDescriptor {
            name: "phone",
            column: "phone",
            kind: FieldKind::Text,
            operators: &[Operator::Equals],
        },
        FieldDescriptor {
            name: "totalAmount",
            column: "total_amount",
            kind: FieldKind::Number,
            operators: &[Operator::GreaterOrEqual, Operator::LessOrEqual],
        },
        FieldDescriptor {
            name: "status",
            column: "status",
            kind: FieldKind::Text,
            operators: &[Operator::Equals],
        },
        FieldDescriptor {
            name: "orderDate",
            column: "order_date",
            kind: FieldKind::Date,
            operators: &[Operator::GreaterOrEqual, Operator::LessThan],
        },
        FieldDescriptor {
            name: "createdAt",
            column: "created_at",
            kind: FieldKind::Date,
            operators: &[Operator::GreaterOrEqual, Operator::LessThan],
        },
    ],
    default_sort_field: "orderDate",
    default_sort_direction: SortDirection::Descending,
    keyword_fields: &["customerName", "orderNumber"],
    sortable: &[
        "id",
        "orderNumber",
        "customerName",
        "totalAmount",
        "orderDate",
        "createdAt",
    ],
    params: &[
        ParamSpec {
            name: "status",
            field: "status",
            binding: Binding::Equals,
        },
        ParamSpec {
            name: "minAmount",
            field: "totalAmount",
            binding: Binding::NumberMin,
        },
        ParamSpec {
            name: "maxAmount",
            field: "totalAmount",
            binding: Binding::NumberMax,
        },
        // Short aliases used by the range demo endpoint.
        ParamSpec {
            name: "min",
            field: "totalAmount",
            binding: Binding::NumberMin,
        },
        ParamSpec {
            name: "max",
            field: "totalAmount",
            binding: Binding::NumberMax,
        },
        ParamSpec {
            name: "startDate",
            field: "orderDate",
            binding: Binding::DateStart,
        },
        ParamSpec {
            name: "endDate",
            field: "orderDate",
            binding: Binding::DateEnd,
        },
    ],
};

static PROJECTION: LazyLock<ProjectionSpec> = LazyLock::new(|| {
    ProjectionSpec::resolve(
        &["id", "orderNumber", "customerName", "totalAmount", "status"],
        &SCHEMA,
    )
    .expect("order projection fields are registered")
});

#[async_trait]
impl StoreEntity for Model {
    type Entity = Entity;
    type Column = Column;
    type ActiveModel = ActiveModel;

    const RESOURCE_NAME: &'static str = "Order";
    const ID_COLUMN: Column = Column::Id;

    fn columns() -> &'static [(&'static str, Column)] {
        &[
            ("id", Column::Id),
            ("orderNumber", Column::OrderNumber),
            ("customerName", Column::CustomerName),
            ("email", Column::Email),
            ("phone", Column::Phone),
            ("totalAmount", Column::TotalAmount),
            ("status", Column::Status),
            ("orderDate", Column::OrderDate),
            ("createdAt", Column::CreatedAt),
        ]
    }
}

#[derive(Clone, Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderPayload {
    pub customer_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub total_amount: Option<f64>,
    pub status: Option<String>,
}

#[derive(Debug)]
struct MandatoryFields {
    customer_name: String,
    email: String,
    total_amount: f64,
}

impl OrderPayload {
    fn mandatory(&self) -> Result<MandatoryFields, ApiError> {
        let mut required = RequiredFields::new();
        let customer_name = required.text("customerName", self.customer_name.as_deref());
        let email = required.text("email", self.email.as_deref());
        let total_amount = required.number("totalAmount", self.total_amount);
        required.check()?;
        Ok(MandatoryFields {
            customer_name,
            email,
            total_amount,
        })
    }
}

/// `"ORD"` + millisecond timestamp + zero-padded 3-digit random suffix.
/// Collisions are not checked; the space is treated as large enough.
fn generate_order_number() -> String {
    let timestamp = Utc::now().timestamp_millis();
    let suffix: u16 = rand::rng().random_range(0..1000);
    format!("ORD{timestamp}{suffix:03}")
}

async fn ensure_unique_email(
    store: &Store,
    email: &str,
    exclude_id: Option<i32>,
    message: &'static str,
) -> Result<(), ApiError> {
    let existing = Model::find_first(store, Condition::all().add(Column::Email.eq(email)))
        .await
        .map_err(|e| e.into_api(Model::RESOURCE_NAME))?;
    if let Some(existing) = existing
        && exclude_id != Some(existing.id)
    {
        return Err(ApiError::duplicate_key(message));
    }
    Ok(())
}

async fn list_orders(State(store): State<Store>) -> Result<Json<ApiResponse<Vec<Model>>>, ApiError> {
    let filter = FilterExpression::default();
    let sort = SortSpec::default_for(&SCHEMA);
    let orders = Model::find(&store, &filter, &sort)
        .await
        .map_err(|e| e.into_api(Model::RESOURCE_NAME))?;
    Ok(Json(ApiResponse::list("Fetched orders successfully", orders)))
}

async fn get_order(
    State(store): State<Store>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Model>>, ApiError> {
    let id = parse_id(&id)?;
    let order = Model::find_one(&store, id)
        .await
        .map_err(|e| e.into_api(Model::RESOURCE_NAME))?
        .ok_or_else(|| ApiError::not_found(Model::RESOURCE_NAME))?;
    Ok(Json(ApiResponse::success("Fetched order successfully", order)))
}

async fn create_order(
    State(store): State<Store>,
    Json(payload): Json<OrderPayload>,
) -> Result<(StatusCode, Json<ApiResponse<Model>>), ApiError> {
    let mandatory = payload.mandatory()?;
    ensure_unique_email(&store, &mandatory.email, None, "This email is already in use").await?;

    let now = Utc::now();
    let active = ActiveModel {
        id: NotSet,
        order_number: Set(generate_order_number()),
        customer_name: Set(mandatory.customer_name),
        email: Set(mandatory.email),
        phone: Set(none_if_empty(payload.phone)),
        total_amount: Set(mandatory.total_amount),
        // New orders always start out pending; a client-supplied status is
        // ignored on create.
        status: Set("pending".to_string()),
        order_date: Set(now),
        created_at: Set(now),
    };
    let order = Model::insert(&store, active)
        .await
        .map_err(|e| e.into_api(Model::RESOURCE_NAME))?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("Order created successfully", order)),
    ))
}

async fn update_order(
    State(store): State<Store>,
    Path(id): Path<String>,
    Json(payload): Json<OrderPayload>,
) -> Result<Json<ApiResponse<Model>>, ApiError> {
    let id = parse_id(&id)?;
    let mandatory = payload.mandatory()?;
    ensure_unique_email(
        &store,
        &mandatory.email,
        Some(id),
        "This email is already in use by another order",
    )
    .await?;

    // An absent or empty status leaves the stored value untouched.
    let status = match payload.status.filter(|s| !s.is_empty()) {
        Some(status) => Set(status),
        None => NotSet,
    };
    let active = ActiveModel {
        id: Set(id),
        order_number: NotSet,
        customer_name: Set(mandatory.customer_name),
        email: Set(mandatory.email),
        phone: Set(payload.phone),
        total_amount: Set(mandatory.total_amount),
        status,
        order_date: NotSet,
        created_at: NotSet,
    };
    let order = Model::update(&store, active)
        .await
        .map_err(|e| e.into_api(Model::RESOURCE_NAME))?;
    Ok(Json(ApiResponse::success("Order updated successfully", order)))
}

async fn delete_order(
    State(store): State<Store>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Model>>, ApiError> {
    let id = parse_id(&id)?;
    let order = Model::delete_by_id(&store, id)
        .await
        .map_err(|e| e.into_api(Model::RESOURCE_NAME))?;
    Ok(Json(ApiResponse::success("Order deleted successfully", order)))
}

async fn search_orders(
    State(store): State<Store>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<SearchResponse<Model>>, ApiError> {
    let filter = translate(&params, &SCHEMA)?;
    let sort = resolve_sort(
        params.get("sort").map(String::as_str),
        params.get("order").map(String::as_str),
        &SCHEMA,
    );
    let orders = Model::find(&store, &filter, &sort)
        .await
        .map_err(|e| e.into_api(Model::RESOURCE_NAME))?;
    Ok(Json(SearchResponse::new(
        "Order search completed successfully",
        filter,
        sort,
        orders,
    )))
}

async fn q_projection(
    State(store): State<Store>,
) -> Result<Json<DemoResponse<JsonValue>>, ApiError> {
    let filter = FilterExpression::default();
    let sort = resolve_sort(Some("id"), None, &SCHEMA);
    let rows = Model::find_projected(&store, &filter, &sort, &PROJECTION)
        .await
        .map_err(|e| e.into_api(Model::RESOURCE_NAME))?;
    Ok(Json(
        DemoResponse::new(
            "projection (select)",
            "Returns only the named columns for each order",
            rows,
        )
        .with_projection(PROJECTION.clone()),
    ))
}

async fn q_status(
    State(store): State<Store>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<DemoResponse<Model>>, ApiError> {
    let filter = translate_only(&params, &SCHEMA, &["status"])?;
    let sort = resolve_sort(Some("id"), None, &SCHEMA);
    let orders = Model::find(&store, &filter, &sort)
        .await
        .map_err(|e| e.into_api(Model::RESOURCE_NAME))?;
    Ok(Json(
        DemoResponse::new(
            "where + exact match",
            "Orders whose status equals the given value",
            orders,
        )
        .with_filter(filter),
    ))
}

async fn q_amount_range(
    State(store): State<Store>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<DemoResponse<Model>>, ApiError> {
    let filter = translate_only(&params, &SCHEMA, &["min", "max"])?;
    let sort = resolve_sort(Some("id"), None, &SCHEMA);
    let orders = Model::find(&store, &filter, &sort)
        .await
        .map_err(|e| e.into_api(Model::RESOURCE_NAME))?;
    Ok(Json(
        DemoResponse::new(
            "where + number operators (gte, lte)",
            "Orders with a total amount inside the inclusive min/max range",
            orders,
        )
        .with_filter(filter),
    ))
}

async fn q_date_range(
    State(store): State<Store>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<DemoResponse<Model>>, ApiError> {
    let filter = translate_only(&params, &SCHEMA, &["startDate", "endDate"])?;
    let sort = resolve_sort(Some("id"), None, &SCHEMA);
    let orders = Model::find(&store, &filter, &sort)
        .await
        .map_err(|e| e.into_api(Model::RESOURCE_NAME))?;
    Ok(Json(
        DemoResponse::new(
            "where + date operators (gte, lt)",
            "Orders placed within the date range; the end date is fully included",
            orders,
        )
        .with_filter(filter),
    ))
}

async fn q_sort(
    State(store): State<Store>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<DemoResponse<Model>>, ApiError> {
    let sort = resolve_sort(
        params.get("by").map(String::as_str),
        params.get("dir").map(String::as_str),
        &SCHEMA,
    );
    let orders = Model::find(&store, &FilterExpression::default(), &sort)
        .await
        .map_err(|e| e.into_api(Model::RESOURCE_NAME))?;
    Ok(Json(
        DemoResponse::new(
            "orderBy (sorting)",
            "Orders ordered by an allow-listed field, ascending unless dir=desc",
            orders,
        )
        .with_sort(sort),
    ))
}

pub fn router(store: Store) -> Router {
    Router::new()
        .route("/", get(list_orders).post(create_order))
        .route("/search", get(search_orders))
        .route("/q/projection", get(q_projection))
        .route("/q/status", get(q_status))
        .route("/q/amount-range", get(q_amount_range))
        .route("/q/date-range", get(q_date_range))
        .route("/q/sort", get(q_sort))
        .route("/{id}", get(get_order).put(update_order).delete(delete_order))
        .with_state(store)
}
