//! Product records: model, schema, service rules and HTTP surface.
//!
//! Listing and search only ever return active products; deactivation via
//! update is how products are hidden without deleting them.

use async_trait::async_trait;
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveValue::{NotSet, Set},
    JsonValue, entity::prelude::*,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::LazyLock;
use utoipa::ToSchema;

use crate::errors::ApiError;
use crate::query::{
    FilterCondition, FilterExpression, FilterValue, ProjectionSpec, SortSpec, resolve_sort,
    translate, translate_only,
};
use crate::response::{ApiResponse, DemoResponse, SearchResponse};
use crate::schema::{
    Binding, EntitySchema, FieldDescriptor, FieldKind, Operator, ParamSpec, SortDirection,
};
use crate::store::{Store, StoreEntity};
use crate::validation::{RequiredFields, none_if_empty, parse_id};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "products")]
#[serde(rename_all = "camelCase")]
#[schema(as = Product)]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub stock: i32,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

pub static SCHEMA: EntitySchema = EntitySchema {
    entity: "product",
    fields: &[
        FieldDescriptor {
            name: "id",
            column: "id",
            kind: FieldKind::Number,
            operators: &[Operator::Equals],
        },
        FieldDescriptor {
            name: "name",
            column: "name",
            kind: FieldKind::Text,
            operators: &[
                Operator::Equals,
                Operator::ContainsIgnoreCase,
                Operator::StartsWith,
            ],
        },
        FieldDescriptor {
            name: "description",
            column: "description",
            kind: FieldKind::Text,
            operators: &[Operator::ContainsIgnoreCase],
        },
        FieldDescriptor {
            name: "price",
            column: "price",
            kind: FieldKind::Number,
            operators: &[Operator::GreaterOrEqual, Operator::LessOrEqual],
        },
        FieldDescriptor {
            name: "stock",
            column: "stock",
            kind: FieldKind::Number,
            operators: &[
                Operator::GreaterOrEqual,
                Operator::LessOrEqual,
                Operator::GreaterThan,
            ],
        },
        FieldDescriptor {
            name: "category",
            column: "category",
            kind: FieldKind::Text,
            operators: &[Operator::Equals, Operator::ContainsIgnoreCase],
        },
        FieldDescriptor {
            name: "imageUrl",
            column: "image_url",
            kind: FieldKind::Text,
            operators: &[],
        },
        FieldDescriptor {
            name: "isActive",
            column: "is_active",
            kind: FieldKind::Boolean,
            operators: &[Operator::Equals],
        },
        FieldDescriptor {
            name: "createdAt",
            column: "created_at",
            kind: FieldKind::Date,
            operators: &[Operator::GreaterOrEqual, Operator::LessThan],
        },
    ],
    default_sort_field: "createdAt",
    default_sort_direction: SortDirection::Descending,
    keyword_fields: &["name"],
    sortable: &["id", "name", "price", "stock", "createdAt"],
    params: &[
        ParamSpec {
            name: "category",
            field: "category",
            binding: Binding::Contains,
        },
        ParamSpec {
            name: "minPrice",
            field: "price",
            binding: Binding::NumberMin,
        },
        ParamSpec {
            name: "maxPrice",
            field: "price",
            binding: Binding::NumberMax,
        },
        // Short aliases used by the range demo endpoint.
        ParamSpec {
            name: "min",
            field: "price",
            binding: Binding::NumberMin,
        },
        ParamSpec {
            name: "max",
            field: "price",
            binding: Binding::NumberMax,
        },
        ParamSpec {
            name: "inStock",
            field: "stock",
            binding: Binding::PositiveFlag,
        },
    ],
};

static PROJECTION: LazyLock<ProjectionSpec> = LazyLock::new(|| {
    ProjectionSpec::resolve(&["id", "name", "price", "stock"], &SCHEMA)
        .expect("product projection fields are registered")
});

#[async_trait]
impl StoreEntity for Model {
    type Entity = Entity;
    type Column = Column;
    type ActiveModel = ActiveModel;

    const RESOURCE_NAME: &'static str = "Product";
    const ID_COLUMN: Column = Column::Id;

    fn columns() -> &'static [(&'static str, Column)] {
        &[
            ("id", Column::Id),
            ("name", Column::Name),
            ("description", Column::Description),
            ("price", Column::Price),
            ("stock", Column::Stock),
            ("category", Column::Category),
            ("imageUrl", Column::ImageUrl),
            ("isActive", Column::IsActive),
            ("createdAt", Column::CreatedAt),
        ]
    }
}

#[derive(Clone, Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductPayload {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub stock: Option<i32>,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug)]
struct MandatoryFields {
    name: String,
    price: f64,
}

impl ProductPayload {
    fn mandatory(&self) -> Result<MandatoryFields, ApiError> {
        let mut required = RequiredFields::new();
        let name = required.text("name", self.name.as_deref());
        let price = required.number("price", self.price);
        required.check()?;
        Ok(MandatoryFields { name, price })
    }
}

/// Listing and search never expose deactivated products.
fn active_only() -> FilterCondition {
    let field = SCHEMA
        .field("isActive")
        .expect("isActive is registered in the product schema");
    FilterCondition::new(field, Operator::Equals, FilterValue::Bool(true))
}

async fn list_products(
    State(store): State<Store>,
) -> Result<Json<ApiResponse<Vec<Model>>>, ApiError> {
    let mut filter = FilterExpression::default();
    filter.push(active_only());
    let sort = SortSpec::default_for(&SCHEMA);
    let products = Model::find(&store, &filter, &sort)
        .await
        .map_err(|e| e.into_api(Model::RESOURCE_NAME))?;
    Ok(Json(ApiResponse::list("Fetched products successfully", products)))
}

async fn get_product(
    State(store): State<Store>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Model>>, ApiError> {
    let id = parse_id(&id)?;
    let product = Model::find_one(&store, id)
        .await
        .map_err(|e| e.into_api(Model::RESOURCE_NAME))?
        .ok_or_else(|| ApiError::not_found(Model::RESOURCE_NAME))?;
    Ok(Json(ApiResponse::success("Fetched product successfully", product)))
}

async fn create_product(
    State(store): State<Store>,
    Json(payload): Json<ProductPayload>,
) -> Result<(StatusCode, Json<ApiResponse<Model>>), ApiError> {
    let mandatory = payload.mandatory()?;

    let active = ActiveModel {
        id: NotSet,
        name: Set(mandatory.name),
        description: Set(none_if_empty(payload.description)),
        price: Set(mandatory.price),
        stock: Set(payload.stock.unwrap_or(0)),
        category: Set(none_if_empty(payload.category)),
        image_url: Set(none_if_empty(payload.image_url)),
        is_active: Set(true),
        created_at: Set(Utc::now()),
    };
    let product = Model::insert(&store, active)
        .await
        .map_err(|e| e.into_api(Model::RESOURCE_NAME))?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("Product created successfully", product)),
    ))
}

async fn update_product(
    State(store): State<Store>,
    Path(id): Path<String>,
    Json(payload): Json<ProductPayload>,
) -> Result<Json<ApiResponse<Model>>, ApiError> {
    let id = parse_id(&id)?;
    let mandatory = payload.mandatory()?;

    let active = ActiveModel {
        id: Set(id),
        name: Set(mandatory.name),
        description: Set(payload.description),
        price: Set(mandatory.price),
        // Stock and the active flag are only touched when supplied.
        stock: payload.stock.map_or(NotSet, Set),
        category: Set(payload.category),
        image_url: Set(payload.image_url),
        is_active: payload.is_active.map_or(NotSet, Set),
        created_at: NotSet,
    };
    let product = Model::update(&store, active)
        .await
        .map_err(|e| e.into_api(Model::RESOURCE_NAME))?;
    Ok(Json(ApiResponse::success("Product updated successfully", product)))
}

async fn delete_product(
    State(store): State<Store>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Model>>, ApiError> {
    let id = parse_id(&id)?;
    let product = Model::delete_by_id(&store, id)
        .await
        .map_err(|e| e.into_api(Model::RESOURCE_NAME))?;
    Ok(Json(ApiResponse::success("Product deleted successfully", product)))
}

async fn search_products(
    State(store): State<Store>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<SearchResponse<Model>>, ApiError> {
    let mut filter = translate(&params, &SCHEMA)?;
    filter.push(active_only());
    let sort = resolve_sort(
        params.get("sort").map(String::as_str),
        params.get("order").map(String::as_str),
        &SCHEMA,
    );
    let products = Model::find(&store, &filter, &sort)
        .await
        .map_err(|e| e.into_api(Model::RESOURCE_NAME))?;
    Ok(Json(SearchResponse::new(
        "Product search completed successfully",
        filter,
        sort,
        products,
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
            "Returns only the named columns for each product",
            rows,
        )
        .with_projection(PROJECTION.clone()),
    ))
}

async fn q_price_range(
    State(store): State<Store>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<DemoResponse<Model>>, ApiError> {
    let filter = translate_only(&params, &SCHEMA, &["min", "max"])?;
    let sort = resolve_sort(Some("id"), None, &SCHEMA);
    let products = Model::find(&store, &filter, &sort)
        .await
        .map_err(|e| e.into_api(Model::RESOURCE_NAME))?;
    Ok(Json(
        DemoResponse::new(
            "where + number operators (gte, lte)",
            "Products priced inside the inclusive min/max range",
            products,
        )
        .with_filter(filter),
    ))
}

async fn q_stock_filter(
    State(store): State<Store>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<DemoResponse<Model>>, ApiError> {
    let filter = translate_only(&params, &SCHEMA, &["inStock"])?;
    let sort = resolve_sort(Some("id"), None, &SCHEMA);
    let products = Model::find(&store, &filter, &sort)
        .await
        .map_err(|e| e.into_api(Model::RESOURCE_NAME))?;
    Ok(Json(
        DemoResponse::new(
            "where + number operators (gt, lte)",
            "inStock=true keeps stocked products, inStock=false the rest",
            products,
        )
        .with_filter(filter),
    ))
}

async fn q_category(
    State(store): State<Store>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<DemoResponse<Model>>, ApiError> {
    let filter = translate_only(&params, &SCHEMA, &["category"])?;
    let sort = resolve_sort(Some("id"), None, &SCHEMA);
    let products = Model::find(&store, &filter, &sort)
        .await
        .map_err(|e| e.into_api(Model::RESOURCE_NAME))?;
    Ok(Json(
        DemoResponse::new(
            "where + text operators (contains)",
            "Products whose category contains the given fragment",
            products,
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
    let products = Model::find(&store, &FilterExpression::default(), &sort)
        .await
        .map_err(|e| e.into_api(Model::RESOURCE_NAME))?;
    Ok(Json(
        DemoResponse::new(
            "orderBy (sorting)",
            "Products ordered by an allow-listed field, ascending unless dir=desc",
            products,
        )
        .with_sort(sort),
    ))
}

pub fn router(store: Store) -> Router {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/search", get(search_products))
        .route("/q/projection", get(q_projection))
        .route("/q/price-range", get(q_price_range))
        .route("/q/stock-filter", get(q_stock_filter))
        .route("/q/category", get(q_category))
        .route("/q/sort", get(q_sort))
        .route(
            "/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .with_state(store)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn projection_resolves_against_schema() {
        let names: Vec<&str> = PROJECTION.fields().iter().map(|f| f.name).collect();
        assert_eq!(names, vec!["id", "name", "price", "stock"]);
    }

    #[test]
    fn mandatory_fields_are_name_and_price() {
        let err = ProductPayload::default().mandatory().unwrap_err();
        match err {
            ApiError::Validation { missing } => {
                assert_eq!(missing, vec!["name", "price"]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn active_only_targets_the_flag_column() {
        let condition = active_only();
        assert_eq!(condition.field.name, "isActive");
        assert_eq!(condition.value, FilterValue::Bool(true));
    }
}
