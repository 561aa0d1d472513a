//! The backend-agnostic predicate tree and its lowering to Sea-ORM
//! conditions.
//!
//! A [`FilterExpression`] is an AND over nodes; each node is either a
//! single field condition or an OR group of conditions (used for keyword
//! search across several text fields). Expressions are built per request
//! by the translator and discarded after the query runs.

use chrono::{DateTime, Utc};
use sea_orm::{
    Condition, Value,
    sea_query::{Alias, Expr, Func, SimpleExpr},
};
use serde::ser::{Serialize, SerializeStruct, Serializer};

use crate::schema::{FieldDescriptor, Operator};

/// A typed filter operand.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(untagged)]
pub enum FilterValue {
    Text(String),
    Integer(i64),
    Number(f64),
    Bool(bool),
    Date(DateTime<Utc>),
}

impl From<&FilterValue> for Value {
    fn from(value: &FilterValue) -> Self {
        match value {
            FilterValue::Text(s) => s.clone().into(),
            FilterValue::Integer(i) => (*i).into(),
            FilterValue::Number(f) => (*f).into(),
            FilterValue::Bool(b) => (*b).into(),
            FilterValue::Date(d) => (*d).into(),
        }
    }
}

/// One field condition. The field is a reference into the entity's static
/// schema, so a condition can only ever name a registered field.
#[derive(Clone, Debug)]
pub struct FilterCondition {
    pub field: &'static FieldDescriptor,
    pub operator: Operator,
    pub value: FilterValue,
}

impl FilterCondition {
    /// Builds a condition, upholding the invariant that the operator is
    /// allowed on the field. Callers construct conditions only from static
    /// schema data, so a violation is a configuration bug.
    #[must_use]
    pub fn new(field: &'static FieldDescriptor, operator: Operator, value: FilterValue) -> Self {
        debug_assert!(
            field.allows(operator),
            "operator {operator:?} not allowed on field '{}'",
            field.name
        );
        Self {
            field,
            operator,
            value,
        }
    }

    /// Lowers the condition to a Sea-ORM expression. Case-insensitive text
    /// matching uppercases both sides, which works across the supported
    /// backends.
    fn to_expr(&self) -> SimpleExpr {
        let column = Expr::col(Alias::new(self.field.column));
        match self.operator {
            Operator::Equals => column.eq(&self.value),
            Operator::GreaterOrEqual => column.gte(&self.value),
            Operator::LessOrEqual => column.lte(&self.value),
            Operator::GreaterThan => column.gt(&self.value),
            Operator::LessThan => column.lt(&self.value),
            Operator::ContainsIgnoreCase => {
                SimpleExpr::FunctionCall(Func::upper(column)).like(format!(
                    "%{}%",
                    self.text_operand().to_uppercase()
                ))
            }
            Operator::StartsWith => SimpleExpr::FunctionCall(Func::upper(column))
                .like(format!("{}%", self.text_operand().to_uppercase())),
        }
    }

    fn text_operand(&self) -> &str {
        match &self.value {
            FilterValue::Text(s) => s,
            _ => "",
        }
    }
}

impl Serialize for FilterCondition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("FilterCondition", 3)?;
        state.serialize_field("field", self.field.name)?;
        state.serialize_field("operator", &self.operator)?;
        state.serialize_field("value", &self.value)?;
        state.end()
    }
}

/// A node of the predicate tree.
#[derive(Clone, Debug, serde::Serialize)]
#[serde(untagged)]
pub enum FilterNode {
    Condition(FilterCondition),
    AnyOf {
        #[serde(rename = "anyOf")]
        any_of: Vec<FilterCondition>,
    },
}

/// AND of conditions and OR groups. An empty expression matches all rows.
#[derive(Clone, Debug, Default, serde::Serialize)]
#[serde(transparent)]
pub struct FilterExpression {
    nodes: Vec<FilterNode>,
}

impl FilterExpression {
    pub fn push(&mut self, condition: FilterCondition) {
        self.nodes.push(FilterNode::Condition(condition));
    }

    /// Adds an OR group. Empty and single-condition groups collapse to
    /// nothing and a plain condition respectively.
    pub fn push_any_of(&mut self, mut conditions: Vec<FilterCondition>) {
        match conditions.len() {
            0 => {}
            1 => self.push(conditions.remove(0)),
            _ => self.nodes.push(FilterNode::AnyOf { any_of: conditions }),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[must_use]
    pub fn nodes(&self) -> &[FilterNode] {
        &self.nodes
    }

    /// Lowers the whole tree to a Sea-ORM [`Condition`].
    #[must_use]
    pub fn to_condition(&self) -> Condition {
        let mut all = Condition::all();
        for node in &self.nodes {
            match node {
                FilterNode::Condition(condition) => all = all.add(condition.to_expr()),
                FilterNode::AnyOf { any_of } => {
                    let mut any = Condition::any();
                    for condition in any_of {
                        any = any.add(condition.to_expr());
                    }
                    all = all.add(any);
                }
            }
        }
        all
    }
}
