//! Field registry: per-entity schemas describing which fields exist, how
//! they are typed, and which operators untrusted query input may apply to
//! them.
//!
//! Schemas are `static` configuration built at compile time. Nothing here
//! is mutated after startup, so concurrent reads need no locking.

use serde::Serialize;
use std::fmt;

/// The value class of a field, which constrains parsing and operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Number,
    Date,
    Boolean,
}

/// Comparison operators a filter condition can carry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Operator {
    Equals,
    ContainsIgnoreCase,
    StartsWith,
    GreaterOrEqual,
    LessOrEqual,
    GreaterThan,
    LessThan,
}

/// Sort direction. Serialized as the lowercase form the API echoes back.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum SortDirection {
    #[serde(rename = "asc")]
    Ascending,
    #[serde(rename = "desc")]
    Descending,
}

impl From<SortDirection> for sea_orm::Order {
    fn from(direction: SortDirection) -> Self {
        match direction {
            SortDirection::Ascending => Self::Asc,
            SortDirection::Descending => Self::Desc,
        }
    }
}

/// One field of an entity: its API name (camelCase, as it appears on the
/// wire), the SQL column it lowers to, and the operators allowed on it.
#[derive(Debug)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub column: &'static str,
    pub kind: FieldKind,
    pub operators: &'static [Operator],
}

impl FieldDescriptor {
    #[must_use]
    pub fn allows(&self, operator: Operator) -> bool {
        self.operators.contains(&operator)
    }
}

/// How a recognized query parameter maps onto a field condition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Binding {
    /// Exact match on the raw value.
    Equals,
    /// Case-insensitive substring match.
    Contains,
    /// Case-insensitive prefix match.
    Prefix,
    /// Numeric lower bound (inclusive).
    NumberMin,
    /// Numeric upper bound (inclusive).
    NumberMax,
    /// Date lower bound, start of the given day (inclusive).
    DateStart,
    /// Date upper bound, exclusive at the start of the following day so
    /// the supplied end date is fully included.
    DateEnd,
    /// Tri-state flag over a numeric field: `"true"` keeps rows with a
    /// positive value, `"false"` keeps the rest, anything else is ignored.
    PositiveFlag,
}

/// A recognized query parameter and the field condition it produces.
#[derive(Debug)]
pub struct ParamSpec {
    pub name: &'static str,
    pub field: &'static str,
    pub binding: Binding,
}

/// Immutable description of one entity: ordered fields, default ordering,
/// keyword-search fields, sortable allow-list and parameter bindings.
#[derive(Debug)]
pub struct EntitySchema {
    pub entity: &'static str,
    pub fields: &'static [FieldDescriptor],
    pub default_sort_field: &'static str,
    pub default_sort_direction: SortDirection,
    pub keyword_fields: &'static [&'static str],
    pub sortable: &'static [&'static str],
    pub params: &'static [ParamSpec],
}

impl EntitySchema {
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&'static FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    #[must_use]
    pub fn is_sortable(&self, name: &str) -> bool {
        self.sortable.contains(&name)
    }

    /// The field the sort resolver falls back to. Schemas are validated by
    /// tests to always name an existing field here.
    #[must_use]
    pub fn default_field(&self) -> &'static FieldDescriptor {
        self.field(self.default_sort_field)
            .unwrap_or(&self.fields[0])
    }
}

/// Lookup failure for [`describe`].
#[derive(Debug, PartialEq, Eq)]
pub struct UnknownEntity(pub String);

impl fmt::Display for UnknownEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "no schema registered for entity '{}'", self.0)
    }
}

impl std::error::Error for UnknownEntity {}

/// Resolve an entity name to its registered schema.
///
/// # Errors
///
/// Returns [`UnknownEntity`] if no schema is registered under that name.
pub fn describe(entity: &str) -> Result<&'static EntitySchema, UnknownEntity> {
    match entity {
        "member" => Ok(&crate::entities::member::SCHEMA),
        "order" => Ok(&crate::entities::order::SCHEMA),
        "product" => Ok(&crate::entities::product::SCHEMA),
        other => Err(UnknownEntity(other.to_string())),
    }
}
