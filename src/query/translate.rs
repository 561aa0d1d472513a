//! Translation of untrusted query-string parameters into a validated
//! [`FilterExpression`].
//!
//! The translator only ever reads parameters the schema declares; anything
//! else in the query string is ignored. Values that must be numeric or
//! dates are parsed strictly and reject the request with the offending
//! parameter name instead of silently coercing.

use std::collections::HashMap;

use chrono::{DateTime, Days, NaiveDate, Utc};

use crate::errors::ApiError;
use crate::query::filter::{FilterCondition, FilterExpression, FilterValue};
use crate::schema::{Binding, EntitySchema, Operator, ParamSpec};

/// Translates the full recognized parameter set: keyword search plus every
/// declared binding.
///
/// # Errors
///
/// Returns [`ApiError::InvalidParameter`] when a numeric or date parameter
/// cannot be parsed.
pub fn translate(
    params: &HashMap<String, String>,
    schema: &'static EntitySchema,
) -> Result<FilterExpression, ApiError> {
    let mut expression = FilterExpression::default();
    apply_keyword(params, schema, &mut expression);
    for spec in schema.params {
        apply_binding(params, schema, spec, &mut expression)?;
    }
    Ok(expression)
}

/// Translates only the named bindings, without keyword search. The demo
/// endpoints use this so each one honors exactly the parameters it
/// demonstrates.
///
/// # Errors
///
/// Returns [`ApiError::InvalidParameter`] when a numeric or date parameter
/// cannot be parsed.
pub fn translate_only(
    params: &HashMap<String, String>,
    schema: &'static EntitySchema,
    names: &[&str],
) -> Result<FilterExpression, ApiError> {
    let mut expression = FilterExpression::default();
    for spec in schema.params.iter().filter(|s| names.contains(&s.name)) {
        apply_binding(params, schema, spec, &mut expression)?;
    }
    Ok(expression)
}

fn apply_keyword(
    params: &HashMap<String, String>,
    schema: &'static EntitySchema,
    expression: &mut FilterExpression,
) {
    let keyword = params
        .get("keyword")
        .or_else(|| params.get("search"))
        .map(|raw| raw.trim())
        .filter(|raw| !raw.is_empty());
    let Some(keyword) = keyword else { return };

    let group = schema
        .keyword_fields
        .iter()
        .filter_map(|name| schema.field(name))
        .map(|field| {
            FilterCondition::new(
                field,
                Operator::ContainsIgnoreCase,
                FilterValue::Text(keyword.to_string()),
            )
        })
        .collect();
    expression.push_any_of(group);
}

fn apply_binding(
    params: &HashMap<String, String>,
    schema: &'static EntitySchema,
    spec: &'static ParamSpec,
    expression: &mut FilterExpression,
) -> Result<(), ApiError> {
    let Some(raw) = params.get(spec.name) else {
        return Ok(());
    };
    if raw.is_empty() {
        return Ok(());
    }
    let Some(field) = schema.field(spec.field) else {
        return Ok(());
    };

    match spec.binding {
        Binding::Equals => expression.push(FilterCondition::new(
            field,
            Operator::Equals,
            FilterValue::Text(raw.clone()),
        )),
        Binding::Contains => expression.push(FilterCondition::new(
            field,
            Operator::ContainsIgnoreCase,
            FilterValue::Text(raw.clone()),
        )),
        Binding::Prefix => expression.push(FilterCondition::new(
            field,
            Operator::StartsWith,
            FilterValue::Text(raw.clone()),
        )),
        Binding::NumberMin => expression.push(FilterCondition::new(
            field,
            Operator::GreaterOrEqual,
            FilterValue::Number(parse_number(spec.name, raw)?),
        )),
        Binding::NumberMax => expression.push(FilterCondition::new(
            field,
            Operator::LessOrEqual,
            FilterValue::Number(parse_number(spec.name, raw)?),
        )),
        Binding::DateStart => expression.push(FilterCondition::new(
            field,
            Operator::GreaterOrEqual,
            FilterValue::Date(parse_date(spec.name, raw)?),
        )),
        Binding::DateEnd => {
            // Exclusive upper bound one day past the supplied end date, so
            // every record timestamped on the end date itself matches.
            let end = parse_date(spec.name, raw)?
                .checked_add_days(Days::new(1))
                .ok_or_else(|| ApiError::invalid_parameter(spec.name))?;
            expression.push(FilterCondition::new(
                field,
                Operator::LessThan,
                FilterValue::Date(end),
            ));
        }
        Binding::PositiveFlag => match raw.as_str() {
            "true" => expression.push(FilterCondition::new(
                field,
                Operator::GreaterThan,
                FilterValue::Integer(0),
            )),
            "false" => expression.push(FilterCondition::new(
                field,
                Operator::LessOrEqual,
                FilterValue::Integer(0),
            )),
            _ => {}
        },
    }
    Ok(())
}

fn parse_number(name: &'static str, raw: &str) -> Result<f64, ApiError> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| ApiError::invalid_parameter(name))
}

/// Accepts `YYYY-MM-DD` (interpreted as start of day, UTC) or a full
/// RFC 3339 timestamp.
fn parse_date(name: &'static str, raw: &str) -> Result<DateTime<Utc>, ApiError> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        let midnight = date
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| ApiError::invalid_parameter(name))?;
        return Ok(midnight.and_utc());
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| ApiError::invalid_parameter(name))
}
