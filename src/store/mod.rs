//! Query execution boundary.
//!
//! [`Store`] is an explicitly constructed handle around the database
//! connection, passed to services at construction time — there is no
//! global connection. [`StoreEntity`] is the per-entity configuration
//! (Sea-ORM types plus the API-name→column mapping) with the generic
//! operations as default methods, so entity modules only declare data.
//!
//! All operations return [`StoreError`], which distinguishes "record not
//! found" from every other backend failure; callers never inspect
//! backend-specific error codes.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr,
    EntityTrait, IntoActiveModel, JsonValue, PrimaryKeyTrait, QueryFilter, QueryOrder, QuerySelect,
    entity::prelude::*,
};
use std::fmt;

use crate::errors::ApiError;
use crate::query::{FilterExpression, ProjectionSpec, SortSpec};

/// Injected query-executor handle. Cloning shares the underlying
/// connection pool.
#[derive(Clone)]
pub struct Store {
    db: DatabaseConnection,
}

impl Store {
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    #[must_use]
    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }
}

/// Failure at the execution boundary.
#[derive(Debug)]
pub enum StoreError {
    /// The addressed record does not exist (zero rows affected, or an
    /// explicit record-not-found from the driver).
    NotFound,
    /// Any other backend failure.
    Backend(DbErr),
}

impl StoreError {
    /// Maps into the API taxonomy, naming the resource for the 404 body.
    #[must_use]
    pub fn into_api(self, resource: &'static str) -> ApiError {
        match self {
            Self::NotFound => ApiError::not_found(resource),
            Self::Backend(err) => ApiError::storage(err),
        }
    }
}

impl From<DbErr> for StoreError {
    fn from(err: DbErr) -> Self {
        match err {
            DbErr::RecordNotFound(_) => Self::NotFound,
            other => Self::Backend(other),
        }
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "record not found"),
            Self::Backend(err) => write!(f, "backend error: {err}"),
        }
    }
}

impl std::error::Error for StoreError {}

/// Per-entity store configuration plus the generic CRUD/query operations.
#[async_trait]
pub trait StoreEntity: Sized + Send + Sync
where
    Self::Entity: EntityTrait + Sync,
    Self::ActiveModel: ActiveModelTrait<Entity = Self::Entity> + ActiveModelBehavior + Send + Sync,
    <Self::Entity as EntityTrait>::Model: Send + Sync + IntoActiveModel<Self::ActiveModel>,
    <<Self::Entity as EntityTrait>::PrimaryKey as PrimaryKeyTrait>::ValueType: From<i32>,
{
    type Entity: EntityTrait;
    type Column: ColumnTrait + Copy;
    type ActiveModel: ActiveModelTrait;

    /// Capitalized singular for error messages, e.g. `"Member"`.
    const RESOURCE_NAME: &'static str;
    const ID_COLUMN: Self::Column;

    /// API field name → column, for every field of the schema.
    fn columns() -> &'static [(&'static str, Self::Column)];

    /// Resolves a sort spec to a column; the resolver guarantees the field
    /// is registered, so the id column is only a formal fallback.
    #[must_use]
    fn sort_column(sort: &SortSpec) -> Self::Column {
        Self::columns()
            .iter()
            .find(|(name, _)| *name == sort.field.name)
            .map_or(Self::ID_COLUMN, |&(_, column)| column)
    }

    async fn find(
        store: &Store,
        filter: &FilterExpression,
        sort: &SortSpec,
    ) -> Result<Vec<<Self::Entity as EntityTrait>::Model>, StoreError> {
        let models = Self::Entity::find()
            .filter(filter.to_condition())
            .order_by(Self::sort_column(sort), sort.direction.into())
            .all(store.connection())
            .await?;
        Ok(models)
    }

    /// Like [`StoreEntity::find`], but returns JSON rows restricted to the
    /// projected columns, keyed by API field names.
    async fn find_projected(
        store: &Store,
        filter: &FilterExpression,
        sort: &SortSpec,
        projection: &ProjectionSpec,
    ) -> Result<Vec<JsonValue>, StoreError> {
        let mut query = Self::Entity::find().select_only();
        for field in projection.fields() {
            let column = Self::columns()
                .iter()
                .find(|(name, _)| *name == field.name)
                .map_or(Self::ID_COLUMN, |&(_, column)| column);
            query = query.column_as(column, field.name);
        }
        let rows = query
            .filter(filter.to_condition())
            .order_by(Self::sort_column(sort), sort.direction.into())
            .into_json()
            .all(store.connection())
            .await?;
        Ok(rows)
    }

    async fn find_one(
        store: &Store,
        id: i32,
    ) -> Result<Option<<Self::Entity as EntityTrait>::Model>, StoreError> {
        let model = Self::Entity::find_by_id(id).one(store.connection()).await?;
        Ok(model)
    }

    /// First record matching an arbitrary condition; used for uniqueness
    /// lookups.
    async fn find_first(
        store: &Store,
        condition: Condition,
    ) -> Result<Option<<Self::Entity as EntityTrait>::Model>, StoreError> {
        let model = Self::Entity::find()
            .filter(condition)
            .one(store.connection())
            .await?;
        Ok(model)
    }

    async fn insert(
        store: &Store,
        active: Self::ActiveModel,
    ) -> Result<<Self::Entity as EntityTrait>::Model, StoreError> {
        let model = active.insert(store.connection()).await?;
        Ok(model)
    }

    /// Updates by primary key. A zero-row update surfaces from the driver
    /// as record-not-found and maps to [`StoreError::NotFound`]; there is
    /// no pre-read.
    async fn update(
        store: &Store,
        active: Self::ActiveModel,
    ) -> Result<<Self::Entity as EntityTrait>::Model, StoreError> {
        let model = active.update(store.connection()).await?;
        Ok(model)
    }

    /// Deletes by primary key and returns the deleted record. The
    /// authoritative not-found signal is the delete affecting zero rows.
    async fn delete_by_id(
        store: &Store,
        id: i32,
    ) -> Result<<Self::Entity as EntityTrait>::Model, StoreError> {
        let model = Self::find_one(store, id).await?.ok_or(StoreError::NotFound)?;
        let result = Self::Entity::delete_by_id(id)
            .exec(store.connection())
            .await?;
        if result.rows_affected == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(model)
    }
}
