//! Projection: restricting returned columns to a named subset.
//!
//! Projection sets are server-defined constants, not client input; they
//! are still validated against the schema so a stale field list fails
//! loudly at first use rather than producing a broken query.

use serde::Serialize;

use crate::schema::{EntitySchema, FieldDescriptor};

/// An allow-listed set of fields to return. An empty set means "all
/// fields" and is never passed to the projected query path.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(transparent)]
pub struct ProjectionSpec {
    #[serde(serialize_with = "field_names")]
    fields: Vec<&'static FieldDescriptor>,
}

fn field_names<S: serde::Serializer>(
    fields: &[&'static FieldDescriptor],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(fields.iter().map(|f| f.name))
}

impl ProjectionSpec {
    /// Validates every name against the schema.
    ///
    /// # Errors
    ///
    /// Returns the first unknown field name.
    pub fn resolve(
        names: &[&'static str],
        schema: &'static EntitySchema,
    ) -> Result<Self, &'static str> {
        let mut fields = Vec::with_capacity(names.len());
        for name in names.iter().copied() {
            match schema.field(name) {
                Some(field) => fields.push(field),
                None => return Err(name),
            }
        }
        Ok(Self { fields })
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    #[must_use]
    pub fn fields(&self) -> &[&'static FieldDescriptor] {
        &self.fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::member;

    #[test]
    fn resolves_known_fields_in_order() {
        let projection =
            ProjectionSpec::resolve(&["id", "firstName", "email"], &member::SCHEMA)
                .expect("all fields registered");
        let names: Vec<&str> = projection.fields().iter().map(|f| f.name).collect();
        assert_eq!(names, vec!["id", "firstName", "email"]);
    }

    #[test]
    fn rejects_unknown_field() {
        let err = ProjectionSpec::resolve(&["id", "nickname"], &member::SCHEMA).unwrap_err();
        assert_eq!(err, "nickname");
    }

    #[test]
    fn serializes_as_name_list() {
        let projection = ProjectionSpec::resolve(&["id", "email"], &member::SCHEMA).unwrap();
        let json = serde_json::to_value(&projection).expect("serializable");
        assert_eq!(json, serde_json::json!(["id", "email"]));
    }
}
