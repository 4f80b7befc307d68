// SPDX-License-Identifier: Apache-2.0

#![warn(missing_docs)]

//! Text → [`RuleSet`] (spec.md §4.2).
//!
//! Parsing happens in two passes: [`grammar::lql::query`] recognizes
//! surface shape only (no schema awareness), producing a [`grammar::RawTerm`]
//! per whitespace-delimited token; [`resolve`] then walks those terms left
//! to right, resolving each path against a [`Schema`], coercing the raw
//! literal to a typed [`Value`], validating operator/type compatibility,
//! and expanding ranges into `>=`/`<=` pairs.
//!

mod grammar;

use crate::error::LqlError;
use crate::op::Operator;
use crate::rule::{ChartRule, ChartValueType, FilterRule, RuleSet};
use crate::schema::{FieldType, Schema};
use crate::value::Value;
use grammar::{CompareOp, RawRhs, RawTerm};
use jiff::{Timestamp, civil::Date};
use tracing::debug;

/// Parse `query` into a schema-validated [`RuleSet`].
///
/// Returns the first error encountered (fail-fast, per spec.md §7) rather
/// than a partial rule set.
pub fn parse(query: &str, schema: &Schema) -> Result<RuleSet, LqlError> {
    debug!(query, "parsing LQL query");

    let terms = grammar::lql::query(query).map_err(|e| {
        let err = LqlError::Tokenize(format!("could not parse query: {e}"));
        debug!(query, error = %err, "query failed to tokenize");
        err
    })?;

    let mut rule_set = RuleSet::new();
    for term in terms {
        if let Err(err) = resolve(term, schema, &mut rule_set) {
            debug!(query, error = %err, "parse short-circuited on first error");
            return Err(err);
        }
    }
    rule_set.canonical_sort();
    debug!(
        query,
        filters = rule_set.search.len(),
        "parsed query into a RuleSet"
    );
    Ok(rule_set)
}

fn resolve(term: RawTerm, schema: &Schema, rule_set: &mut RuleSet) -> Result<(), LqlError> {
    match term {
        RawTerm::FreeText { text, negate } => {
            let mut filter = FilterRule::new("event_message", Operator::Match, Value::Str(text));
            if negate {
                filter = filter.negated();
            }
            rule_set.search.push(filter);
            Ok(())
        }
        RawTerm::Chart { path } => {
            let field_type = schema
                .resolve(&path)
                .ok_or_else(|| LqlError::unknown_field(&path, schema.suggest(&path)))?;
            let value_type = match field_type {
                FieldType::Integer => ChartValueType::Integer,
                FieldType::Float => ChartValueType::Float,
                other => {
                    return Err(LqlError::OperatorMismatch(format!(
                        "chart directive on `{path}` requires a numeric field, found {other}"
                    )));
                }
            };
            // last `chart:` directive wins (spec.md §9's documented,
            // preserved ambiguity).
            rule_set.chart.clear();
            rule_set.chart.push(ChartRule {
                path,
                value_type,
                aggregate: None,
                period: None,
            });
            Ok(())
        }
        RawTerm::Path { path, negate, rhs } => {
            resolve_path_term(&path, negate, rhs, schema, rule_set)
        }
    }
}

fn resolve_path_term(
    path: &str,
    negate: bool,
    rhs: RawRhs,
    schema: &Schema,
    rule_set: &mut RuleSet,
) -> Result<(), LqlError> {
    // an empty, unquoted value never parses under any target type, so it
    // is reported before path resolution even runs (spec.md §8 scenario
    // 5: an unknown path with an empty value still surfaces as a
    // value-parse error, not an unknown-field error).
    if let RawRhs::Bare(raw) = &rhs {
        if raw.is_empty() {
            return Err(LqlError::ValueParse {
                path: path.to_string(),
                raw: String::new(),
            });
        }
    }

    let field_type = schema
        .resolve(path)
        .ok_or_else(|| LqlError::unknown_field(path, schema.suggest(path)))?
        .clone();

    let mut filters = match rhs {
        RawRhs::Regex(pattern) => {
            validate_operator_type(path, Operator::Match, &field_type)?;
            vec![FilterRule::new(path, Operator::Match, Value::Str(pattern))]
        }
        RawRhs::Compare(op, raw) => {
            let operator = compare_operator(op);
            validate_operator_type(path, operator, &field_type)?;
            let value = coerce_scalar(path, &raw, &field_type)?;
            vec![FilterRule::new(path, operator, value)]
        }
        RawRhs::Quoted(text) => vec![FilterRule::new(
            path,
            Operator::Eq,
            coerce_quoted(path, text, &field_type)?,
        )],
        RawRhs::Bare(raw) => resolve_bare(path, &raw, &field_type)?,
    };

    if negate {
        filters = filters.into_iter().map(FilterRule::negated).collect();
    }
    rule_set.search.extend(filters);
    Ok(())
}

fn resolve_bare(path: &str, raw: &str, field_type: &FieldType) -> Result<Vec<FilterRule>, LqlError> {
    if let Some((lo_raw, hi_raw)) = split_range(raw) {
        validate_operator_type(path, Operator::Gte, field_type)?;
        let lo = coerce_scalar(path, lo_raw, field_type)?;
        let hi = coerce_scalar(path, hi_raw, field_type)?;
        match lo.partial_cmp(&hi) {
            Some(std::cmp::Ordering::Greater) => {
                return Err(LqlError::Range(format!(
                    "range on `{path}` is invalid: {lo_raw} > {hi_raw}"
                )));
            }
            None => {
                return Err(LqlError::Range(format!(
                    "range on `{path}` has bounds that cannot be compared: {lo_raw}..{hi_raw}"
                )));
            }
            Some(_) => {}
        }
        return Ok(vec![
            FilterRule::new(path, Operator::Gte, lo),
            FilterRule::new(path, Operator::Lte, hi),
        ]);
    }

    if let FieldType::List(inner) = field_type {
        validate_operator_type(path, Operator::ListIncludes, field_type)?;
        let value = coerce_scalar(path, raw, inner)?;
        return Ok(vec![FilterRule::new(path, Operator::ListIncludes, value)]);
    }

    let value = coerce_scalar(path, raw, field_type)?;
    Ok(vec![FilterRule::new(path, Operator::Eq, value)])
}

/// Check that `operator` is permitted against `path`'s resolved
/// `field_type`, per the invariants in spec.md §3: `~` requires a
/// string-typed path (or a list of strings), the four ordering comparators
/// require a numeric or temporal path, and `list_includes` requires a
/// `list<T>` path.
fn validate_operator_type(path: &str, operator: Operator, field_type: &FieldType) -> Result<(), LqlError> {
    if operator.is_match()
        && !(field_type.is_string() || matches!(field_type, FieldType::List(t) if t.is_string()))
    {
        return Err(LqlError::OperatorMismatch(format!(
            "`{operator}` requires a string-typed path, `{path}` is {field_type}"
        )));
    }
    if operator.is_ordering() && !(field_type.is_numeric() || field_type.is_temporal()) {
        return Err(LqlError::OperatorMismatch(format!(
            "`{operator}` requires a numeric or temporal path, `{path}` is {field_type}"
        )));
    }
    if operator.is_list_includes() && !field_type.is_list() {
        return Err(LqlError::OperatorMismatch(format!(
            "`{operator}` requires a list-typed path, `{path}` is {field_type}"
        )));
    }
    Ok(())
}

fn split_range(raw: &str) -> Option<(&str, &str)> {
    raw.find("..").map(|i| (&raw[..i], &raw[i + 2..]))
}

fn compare_operator(op: CompareOp) -> Operator {
    match op {
        CompareOp::Lt => Operator::Lt,
        CompareOp::Lte => Operator::Lte,
        CompareOp::Gt => Operator::Gt,
        CompareOp::Gte => Operator::Gte,
    }
}

/// Coerce `raw` to `field_type`'s `Value` representation.
///
/// `path == "timestamp"` gets the dedicated timestamp error message
/// (spec.md §4.2, §8 scenario 4); every other path gets the generic
/// path-qualified value-parse error.
fn coerce_scalar(path: &str, raw: &str, field_type: &FieldType) -> Result<Value, LqlError> {
    match field_type {
        FieldType::String => Ok(Value::Str(raw.to_string())),
        FieldType::Integer => raw
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|_| value_parse_error(path, raw)),
        FieldType::Float => raw
            .parse::<f64>()
            .map(Value::Float)
            .or_else(|_| raw.parse::<i64>().map(|i| Value::Float(i as f64)))
            .map_err(|_| value_parse_error(path, raw)),
        FieldType::Boolean => match raw {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            _ => Err(value_parse_error(path, raw)),
        },
        FieldType::Date | FieldType::DateTime => coerce_temporal(path, raw),
        FieldType::List(inner) => coerce_scalar(path, raw, inner),
        FieldType::Object => Err(LqlError::OperatorMismatch(format!(
            "`{path}` is an object field and has no comparable value"
        ))),
    }
}

fn coerce_temporal(path: &str, raw: &str) -> Result<Value, LqlError> {
    if let Ok(ts) = raw.parse::<Timestamp>() {
        return Ok(Value::DateTime(ts));
    }
    if let Ok(d) = raw.parse::<Date>() {
        return Ok(Value::Date(d));
    }
    if path == "timestamp" {
        Err(LqlError::Timestamp(raw.to_string()))
    } else {
        Err(value_parse_error(path, raw))
    }
}

fn coerce_quoted(path: &str, text: String, field_type: &FieldType) -> Result<Value, LqlError> {
    match field_type {
        FieldType::String => Ok(Value::Str(text)),
        FieldType::List(inner) if inner.is_string() => Ok(Value::Str(text)),
        other => coerce_scalar(path, &text, other),
    }
}

fn value_parse_error(path: &str, raw: &str) -> LqlError {
    LqlError::ValueParse {
        path: path.to_string(),
        raw: raw.to_string(),
    }
}
