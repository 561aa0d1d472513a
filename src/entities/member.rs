//! Member records: model, schema, service rules and HTTP surface.

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
#[sea_orm(table_name = "members")]
#[serde(rename_all = "camelCase")]
#[schema(as = Member)]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    #[sea_orm(unique)]
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

pub static SCHEMA: EntitySchema = EntitySchema {
    entity: "member",
    fields: &[
        FieldDescriptor {
            name: "id",
            column: "id",
            kind: FieldKind::Number,
            operators: &[Operator::Equals],
        },
        FieldDescriptor {
            name: "firstName",
            column: "first_name",
            kind: FieldKind::Text,
            operators: &[
                Operator::Equals,
                Operator::ContainsIgnoreCase,
                Operator::StartsWith,
            ],
        },
        FieldDescriptor {
            name: "lastName",
            column: "last_name",
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
            name: "address",
            column: "address",
            kind: FieldKind::Text,
            operators: &[Operator::ContainsIgnoreCase],
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
    keyword_fields: &["firstName", "lastName", "email"],
    sortable: &["id", "firstName", "lastName", "email", "createdAt"],
    params: &[
        ParamSpec {
            name: "domain",
            field: "email",
            binding: Binding::Contains,
        },
        ParamSpec {
            name: "prefix",
            field: "lastName",
            binding: Binding::Prefix,
        },
    ],
};

/// Server-defined projected column set for the projection demo.
static PROJECTION: LazyLock<ProjectionSpec> = LazyLock::new(|| {
    ProjectionSpec::resolve(&["id", "firstName", "lastName", "email"], &SCHEMA)
        .expect("member projection fields are registered")
});

#[async_trait]
impl StoreEntity for Model {
    type Entity = Entity;
    type Column = Column;
    type ActiveModel = ActiveModel;

    const RESOURCE_NAME: &'static str = "Member";
    const ID_COLUMN: Column = Column::Id;

    fn columns() -> &'static [(&'static str, Column)] {
        &[
            ("id", Column::Id),
            ("firstName", Column::FirstName),
            ("lastName", Column::LastName),
            ("email", Column::Email),
            ("phone", Column::Phone),
            ("address", Column::Address),
            ("createdAt", Column::CreatedAt),
        ]
    }
}

/// Create/update body. Mandatory fields stay optional here so a missing
/// key produces the API's own validation error, not a deserialization one.
#[derive(Clone, Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct MemberPayload {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug)]
struct MandatoryFields {
    first_name: String,
    last_name: String,
    email: String,
}

impl MemberPayload {
    fn mandatory(&self) -> Result<MandatoryFields, ApiError> {
        let mut required = RequiredFields::new();
        let first_name = required.text("firstName", self.first_name.as_deref());
        let last_name = required.text("lastName", self.last_name.as_deref());
        let email = required.text("email", self.email.as_deref());
        required.check()?;
        Ok(MandatoryFields {
            first_name,
            last_name,
            email,
        })
    }
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

async fn list_members(
    State(store): State<Store>,
) -> Result<Json<ApiResponse<Vec<Model>>>, ApiError> {
    let filter = FilterExpression::default();
    let sort = SortSpec::default_for(&SCHEMA);
    let members = Model::find(&store, &filter, &sort)
        .await
        .map_err(|e| e.into_api(Model::RESOURCE_NAME))?;
    Ok(Json(ApiResponse::list("Fetched members successfully", members)))
}

async fn get_member(
    State(store): State<Store>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Model>>, ApiError> {
    let id = parse_id(&id)?;
    let member = Model::find_one(&store, id)
        .await
        .map_err(|e| e.into_api(Model::RESOURCE_NAME))?
        .ok_or_else(|| ApiError::not_found(Model::RESOURCE_NAME))?;
    Ok(Json(ApiResponse::success("Fetched member successfully", member)))
}

async fn create_member(
    State(store): State<Store>,
    Json(payload): Json<MemberPayload>,
) -> Result<(StatusCode, Json<ApiResponse<Model>>), ApiError> {
    let mandatory = payload.mandatory()?;
    ensure_unique_email(&store, &mandatory.email, None, "This email is already in use").await?;

    let active = ActiveModel {
        id: NotSet,
        first_name: Set(mandatory.first_name),
        last_name: Set(mandatory.last_name),
        email: Set(mandatory.email),
        phone: Set(none_if_empty(payload.phone)),
        address: Set(none_if_empty(payload.address)),
        created_at: Set(Utc::now()),
    };
    let member = Model::insert(&store, active)
        .await
        .map_err(|e| e.into_api(Model::RESOURCE_NAME))?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("Member created successfully", member)),
    ))
}

async fn update_member(
    State(store): State<Store>,
    Path(id): Path<String>,
    Json(payload): Json<MemberPayload>,
) -> Result<Json<ApiResponse<Model>>, ApiError> {
    let id = parse_id(&id)?;
    let mandatory = payload.mandatory()?;
    ensure_unique_email(
        &store,
        &mandatory.email,
        Some(id),
        "This email is already in use by another member",
    )
    .await?;

    let active = ActiveModel {
        id: Set(id),
        first_name: Set(mandatory.first_name),
        last_name: Set(mandatory.last_name),
        email: Set(mandatory.email),
        phone: Set(payload.phone),
        address: Set(payload.address),
        created_at: NotSet,
    };
    let member = Model::update(&store, active)
        .await
        .map_err(|e| e.into_api(Model::RESOURCE_NAME))?;
    Ok(Json(ApiResponse::success("Member updated successfully", member)))
}

async fn delete_member(
    State(store): State<Store>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Model>>, ApiError> {
    let id = parse_id(&id)?;
    let member = Model::delete_by_id(&store, id)
        .await
        .map_err(|e| e.into_api(Model::RESOURCE_NAME))?;
    Ok(Json(ApiResponse::success("Member deleted successfully", member)))
}

async fn search_members(
    State(store): State<Store>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<SearchResponse<Model>>, ApiError> {
    let filter = translate(&params, &SCHEMA)?;
    let sort = resolve_sort(
        params.get("sort").map(String::as_str),
        params.get("order").map(String::as_str),
        &SCHEMA,
    );
    let members = Model::find(&store, &filter, &sort)
        .await
        .map_err(|e| e.into_api(Model::RESOURCE_NAME))?;
    Ok(Json(SearchResponse::new(
        "Member search completed successfully",
        filter,
        sort,
        members,
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
            "Returns only the named columns for each member",
            rows,
        )
        .with_projection(PROJECTION.clone()),
    ))
}

async fn q_prefix(
    State(store): State<Store>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<DemoResponse<Model>>, ApiError> {
    let filter = translate_only(&params, &SCHEMA, &["prefix"])?;
    let sort = resolve_sort(Some("lastName"), None, &SCHEMA);
    let members = Model::find(&store, &filter, &sort)
        .await
        .map_err(|e| e.into_api(Model::RESOURCE_NAME))?;
    Ok(Json(
        DemoResponse::new(
            "where + text operators (startsWith)",
            "Members whose last name starts with the given prefix",
            members,
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
    let members = Model::find(&store, &FilterExpression::default(), &sort)
        .await
        .map_err(|e| e.into_api(Model::RESOURCE_NAME))?;
    Ok(Json(
        DemoResponse::new(
            "orderBy (sorting)",
            "Members ordered by an allow-listed field, ascending unless dir=desc",
            members,
        )
        .with_sort(sort),
    ))
}

pub fn router(store: Store) -> Router {
    Router::new()
        .route("/", get(list_members).post(create_member))
        .route("/search", get(search_members))
        .route("/q/projection", get(q_projection))
        .route("/q/prefix", get(q_prefix))
        .route("/q/sort", get(q_sort))
        .route(
            "/{id}",
            get(get_member).put(update_member).delete(delete_member),
        )
        .with_state(store)
}
