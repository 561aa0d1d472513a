//! Success-side response envelopes.
//!
//! Every endpoint answers `{status, message, ...}` so clients can branch
//! uniformly on `status`; list-shaped responses also carry `total`, and
//! the search/demo endpoints echo the query descriptors they constructed.

use serde::Serialize;

use crate::query::{FilterExpression, ProjectionSpec, SortSpec};

/// Envelope for single-record and list responses.
#[derive(Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub status: &'static str,
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<usize>,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    #[must_use]
    pub fn success(message: &'static str, data: T) -> Self {
        Self {
            status: "success",
            message,
            total: None,
            data,
        }
    }
}

impl<T: Serialize> ApiResponse<Vec<T>> {
    #[must_use]
    pub fn list(message: &'static str, data: Vec<T>) -> Self {
        Self {
            status: "success",
            message,
            total: Some(data.len()),
            data,
        }
    }
}

/// Envelope for the combined search endpoints: data plus the filter and
/// sort descriptors that produced it.
#[derive(Serialize)]
pub struct SearchResponse<T: Serialize> {
    pub status: &'static str,
    pub message: &'static str,
    pub total: usize,
    pub filter: FilterExpression,
    pub sort: SortSpec,
    pub data: Vec<T>,
}

impl<T: Serialize> SearchResponse<T> {
    #[must_use]
    pub fn new(
        message: &'static str,
        filter: FilterExpression,
        sort: SortSpec,
        data: Vec<T>,
    ) -> Self {
        Self {
            status: "success",
            message,
            total: data.len(),
            filter,
            sort,
            data,
        }
    }
}

/// Envelope for the single-concept demo endpoints. Each one names the
/// concept it demonstrates and echoes the descriptor it constructed.
#[derive(Serialize)]
pub struct DemoResponse<T: Serialize> {
    pub status: &'static str,
    pub concept: &'static str,
    pub description: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<FilterExpression>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<SortSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projection: Option<ProjectionSpec>,
    pub data: Vec<T>,
}

impl<T: Serialize> DemoResponse<T> {
    #[must_use]
    pub fn new(concept: &'static str, description: &'static str, data: Vec<T>) -> Self {
        Self {
            status: "success",
            concept,
            description,
            filter: None,
            sort: None,
            projection: None,
            data,
        }
    }

    #[must_use]
    pub fn with_filter(mut self, filter: FilterExpression) -> Self {
        self.filter = Some(filter);
        self
    }

    #[must_use]
    pub fn with_sort(mut self, sort: SortSpec) -> Self {
        self.sort = Some(sort);
        self
    }

    #[must_use]
    pub fn with_projection(mut self, projection: ProjectionSpec) -> Self {
        self.projection = Some(projection);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_envelope_counts_rows() {
        let response = ApiResponse::list("Fetched", vec![1, 2, 3]);
        let json = serde_json::to_value(&response).expect("serializable");
        assert_eq!(json["status"], "success");
        assert_eq!(json["total"], 3);
    }

    #[test]
    fn single_envelope_omits_total() {
        let response = ApiResponse::success("Fetched", 42);
        let json = serde_json::to_value(&response).expect("serializable");
        assert!(json.get("total").is_none());
    }

    #[test]
    fn demo_envelope_skips_absent_descriptors() {
        let response: DemoResponse<i32> = DemoResponse::new("sorting", "orders rows", vec![]);
        let json = serde_json::to_value(&response).expect("serializable");
        assert!(json.get("filter").is_none());
        assert!(json.get("projection").is_none());
    }
}
