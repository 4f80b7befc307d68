// SPDX-License-Identifier: Apache-2.0

#![warn(missing_docs)]

//! Parsed rule types: [`FilterRule`], [`ChartRule`], [`RuleSet`] and the
//! stored [`Rule`] a routing destination owns (spec.md §3).
//!

use crate::op::{Modifiers, Operator};
use crate::value::Value;
use serde::{Deserialize, Serialize};

/// A single predicate produced by the parser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterRule {
    /// A schema path, or the literal `event_message`.
    pub path: String,
    /// The comparison operator.
    pub operator: Operator,
    /// The (schema-coerced) comparison value.
    pub value: Value,
    /// Flags modifying how this filter is applied (currently just
    /// `negate`).
    pub modifiers: Modifiers,
}

impl FilterRule {
    pub(crate) fn new(path: impl Into<String>, operator: Operator, value: Value) -> Self {
        FilterRule {
            path: path.into(),
            operator,
            value,
            modifiers: Modifiers::NONE,
        }
    }

    pub(crate) fn negated(mut self) -> Self {
        self.modifiers = self.modifiers.negated();
        self
    }

    /// `true` if this filter's `negate` modifier is set.
    pub fn is_negated(&self) -> bool {
        self.modifiers.is_negated()
    }

    // (negate_bit, operator_rank, path, value_sort_key) — spec.md §4.2's
    // canonical ordering contract, made total across mixed `Value`
    // variants via `Value::sort_key`.
    fn sort_key(&self) -> (u8, u8, &str, String) {
        (
            self.is_negated() as u8,
            operator_rank(self.operator),
            self.path.as_str(),
            self.value.sort_key(),
        )
    }
}

fn operator_rank(op: Operator) -> u8 {
    match op {
        Operator::Eq => 0,
        Operator::Neq => 1,
        Operator::Lt => 2,
        Operator::Lte => 3,
        Operator::Gt => 4,
        Operator::Gte => 5,
        Operator::Match => 6,
        Operator::ListIncludes => 7,
    }
}

/// The numeric type a [`ChartRule`]'s aggregated value carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartValueType {
    /// Aggregated as a whole number.
    Integer,
    /// Aggregated as a floating-point number.
    Float,
}

/// At most one per [`RuleSet`] (spec.md §3). `aggregate`/`period` are
/// opaque hints the core never validates or interprets — they exist purely
/// so a `chart:` directive round-trips through external storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartRule {
    /// The numeric schema path being charted.
    pub path: String,
    /// The resolved numeric type of `path`.
    pub value_type: ChartValueType,
    /// Opaque aggregation hint (e.g. `"count"`, `"avg"`), uninterpreted by
    /// the core.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregate: Option<String>,
    /// Opaque period hint (e.g. `"minute"`, `"hour"`), uninterpreted by the
    /// core.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<String>,
}

/// The parsed output of [`crate::parse`]: an ordered list of filters and an
/// optional chart directive.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleSet {
    /// Filter predicates, conjoined (AND), in canonical order.
    pub search: Vec<FilterRule>,
    /// At most one chart directive. A `Vec` rather than an `Option` purely
    /// to mirror spec.md §3's literal phrasing ("length 0 or 1"); parsing
    /// never produces more than one element.
    pub chart: Vec<ChartRule>,
}

impl RuleSet {
    pub(crate) fn new() -> Self {
        RuleSet::default()
    }

    /// Sort `search` into the canonical, deterministic order specified by
    /// spec.md §4.2, so that two queries differing only in term order or
    /// whitespace parse to byte-identical rule sets.
    pub(crate) fn canonical_sort(&mut self) {
        self.search
            .sort_by(|a, b| a.sort_key().partial_cmp(&b.sort_key()).unwrap());
    }
}

/// A stored routing rule: the parsed filters plus whatever opaque fields an
/// external owner (source/sink identifiers, creation timestamps, ...)
/// attaches. The evaluator only ever reads `filters` (spec.md §6).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    /// The conjoined filter predicates to evaluate against an event.
    pub filters: Vec<FilterRule>,
    /// Fields owned by the external caller, passed through unexamined.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Rule {
    /// Build a [`Rule`] directly from a [`RuleSet`]'s `search` filters,
    /// with no opaque fields attached.
    pub fn from_rule_set(rule_set: &RuleSet) -> Self {
        Rule {
            filters: rule_set.search.clone(),
            extra: serde_json::Map::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_sort_orders_by_operator_then_path_then_value() {
        let mut rs = RuleSet::new();
        rs.search.push(FilterRule::new(
            "b",
            Operator::Eq,
            Value::Str("x".into()),
        ));
        rs.search.push(FilterRule::new(
            "a",
            Operator::Eq,
            Value::Str("x".into()),
        ));
        rs.search
            .push(FilterRule::new("a", Operator::Lt, Value::Int(5)));
        rs.canonical_sort();

        assert_eq!(rs.search[0].path, "a");
        assert_eq!(rs.search[0].operator, Operator::Eq);
        assert_eq!(rs.search[1].path, "b");
        assert_eq!(rs.search[2].operator, Operator::Lt);
    }

    #[test]
    fn test_negated_sorts_after_non_negated() {
        let mut rs = RuleSet::new();
        rs.search
            .push(FilterRule::new("a", Operator::Eq, Value::Int(1)).negated());
        rs.search
            .push(FilterRule::new("a", Operator::Eq, Value::Int(1)));
        rs.canonical_sort();

        assert!(!rs.search[0].is_negated());
        assert!(rs.search[1].is_negated());
    }

    #[test]
    fn test_ruleset_roundtrip_json() {
        let mut rs = RuleSet::new();
        rs.search
            .push(FilterRule::new("event_message", Operator::Match, Value::Str("user".into())));
        rs.chart.push(ChartRule {
            path: "metadata.count".into(),
            value_type: ChartValueType::Integer,
            aggregate: None,
            period: None,
        });

        let s = serde_json::to_string(&rs).unwrap();
        let back: RuleSet = serde_json::from_str(&s).unwrap();
        assert_eq!(rs, back);
    }
}
