//! Sort resolution against the per-entity allow-list.

use serde::ser::{Serialize, SerializeStruct, Serializer};

use crate::schema::{EntitySchema, FieldDescriptor, SortDirection};

/// A resolved, safe ordering clause. The field is always drawn from the
/// schema, never from raw input.
#[derive(Clone, Copy, Debug)]
pub struct SortSpec {
    pub field: &'static FieldDescriptor,
    pub direction: SortDirection,
}

impl SortSpec {
    /// The schema's default ordering, used by the plain list endpoints.
    #[must_use]
    pub fn default_for(schema: &'static EntitySchema) -> Self {
        Self {
            field: schema.default_field(),
            direction: schema.default_sort_direction,
        }
    }
}

impl Serialize for SortSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("SortSpec", 2)?;
        state.serialize_field("field", self.field.name)?;
        state.serialize_field("direction", &self.direction)?;
        state.end()
    }
}

/// Resolves a requested sort field and direction.
///
/// The field is used only if it is on the schema's sortable allow-list;
/// anything else falls back to the default field. The direction matches
/// the exact string `"desc"`; every other value, including absence and
/// `"DESC"`, resolves to ascending.
#[must_use]
pub fn resolve_sort(
    by: Option<&str>,
    dir: Option<&str>,
    schema: &'static EntitySchema,
) -> SortSpec {
    let field = by
        .filter(|requested| schema.is_sortable(requested))
        .and_then(|requested| schema.field(requested))
        .unwrap_or_else(|| schema.default_field());
    let direction = if dir == Some("desc") {
        SortDirection::Descending
    } else {
        SortDirection::Ascending
    };
    SortSpec { field, direction }
}
