// SPDX-License-Identifier: Apache-2.0

#![warn(missing_docs)]

//! The routing evaluator: `(Event, Rule) → bool` (spec.md §4.3).
//!

use crate::event::Event;
use crate::op::Operator;
use crate::rule::{FilterRule, Rule};
use crate::value::Value;
use regex_cache::RegexCache;
use std::sync::LazyLock;
use tracing::trace;

mod regex_cache;

static REGEX_CACHE: LazyLock<RegexCache> =
    LazyLock::new(|| RegexCache::with_capacity(crate::config::config().regex_cache_size()));

/// `true` iff every filter in `rule.filters` matches `event`. An empty
/// filter list matches unconditionally (spec.md §4.3).
///
/// Total: no input can make this panic or return an error. A type
/// mismatch between a filter's value and the event's resolved value is
/// just another way to not match.
pub fn matches(event: &Event, rule: &Rule) -> bool {
    rule.filters.iter().all(|filter| matches_filter(event, filter))
}

fn matches_filter(event: &Event, filter: &FilterRule) -> bool {
    let lookup = event.lookup(&filter.path);
    let base = lookup.any(|candidate| evaluate(filter.operator, candidate, &filter.value));
    base ^ filter.is_negated()
}

fn evaluate(operator: Operator, candidate: Option<&Value>, rule_value: &Value) -> bool {
    match operator {
        Operator::Eq => candidate.is_some_and(|c| c == rule_value),
        Operator::Neq => candidate.is_some_and(|c| c != rule_value),
        Operator::Lt => candidate.is_some_and(|c| c < rule_value),
        Operator::Lte => candidate.is_some_and(|c| c <= rule_value),
        Operator::Gt => candidate.is_some_and(|c| c > rule_value),
        Operator::Gte => candidate.is_some_and(|c| c >= rule_value),
        Operator::Match => {
            let (Some(candidate), Value::Str(pattern)) = (candidate, rule_value) else {
                return false;
            };
            match REGEX_CACHE.is_match(pattern, &candidate.as_match_str()) {
                Ok(hit) => hit,
                Err(e) => {
                    trace!(pattern, error = %e, "invalid regex pattern, treating as no match");
                    false
                }
            }
        }
        Operator::ListIncludes => match candidate {
            Some(Value::List(items)) => items.iter().any(|item| item == rule_value),
            _ => false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event(json: serde_json::Value) -> Event {
        Event::from_json(&json)
    }

    fn rule(filters: Vec<FilterRule>) -> Rule {
        Rule {
            filters,
            extra: serde_json::Map::new(),
        }
    }

    #[test]
    fn test_empty_filter_list_always_matches() {
        let e = event(json!({"event_message": "x", "timestamp": "2024-01-01T00:00:00Z"}));
        assert!(matches(&e, &rule(vec![])));
    }

    #[test]
    fn test_scenario_6_list_includes() {
        let e = event(json!({
            "event_message": "m",
            "timestamp": "2024-01-01T00:00:00Z",
            "metadata": {"list_of_ints": [1, 2, 5, 0, -100, 1000000]}
        }));
        let f = FilterRule::new("metadata.list_of_ints", Operator::ListIncludes, Value::Int(2));
        assert!(matches(&e, &rule(vec![f])));

        let e_empty = event(json!({
            "event_message": "m",
            "timestamp": "2024-01-01T00:00:00Z",
            "metadata": {"list_of_ints": []}
        }));
        let f2 = FilterRule::new("metadata.list_of_ints", Operator::ListIncludes, Value::Int(2));
        assert!(!matches(&e_empty, &rule(vec![f2])));
    }

    #[test]
    fn test_scenario_7_regex_match() {
        let e = event(json!({
            "event_message": "m",
            "timestamp": "2024-01-01T00:00:00Z",
            "metadata": {"regex_string": "111"}
        }));
        let f = FilterRule::new(
            "metadata.regex_string",
            Operator::Match,
            Value::Str("\\d\\d\\d".to_string()),
        );
        assert!(matches(&e, &rule(vec![f])));

        let e2 = event(json!({
            "event_message": "m",
            "timestamp": "2024-01-01T00:00:00Z",
            "metadata": {"regex_string": "11z"}
        }));
        let f2 = FilterRule::new(
            "metadata.regex_string",
            Operator::Match,
            Value::Str("\\d\\d\\d".to_string()),
        );
        assert!(!matches(&e2, &rule(vec![f2])));
    }

    #[test]
    fn test_scenario_8_combined_rule() {
        let f1 = FilterRule::new(
            "event_message",
            Operator::Match,
            Value::Str("count: \\d\\d\\d".to_string()),
        );
        let f2 = FilterRule::new(
            "metadata.request.url",
            Operator::Match,
            Value::Str("sources$".to_string()),
        );
        let r = rule(vec![f1, f2]);

        let e = event(json!({
            "event_message": "info count: 113",
            "timestamp": "2024-01-01T00:00:00Z",
            "metadata": {"request": {"url": "/api/user/4/sources"}}
        }));
        assert!(matches(&e, &r));

        let e2 = event(json!({
            "event_message": "info count: 113",
            "timestamp": "2024-01-01T00:00:00Z",
            "metadata": {"request": {"url": "/api/user/4/sources$/4/5"}}
        }));
        assert!(!matches(&e2, &r));
    }

    #[test]
    fn test_missing_path_fails_non_negated_succeeds_negated() {
        let e = event(json!({
            "event_message": "m",
            "timestamp": "2024-01-01T00:00:00Z",
            "metadata": {}
        }));
        let f = FilterRule::new("metadata.absent", Operator::Eq, Value::Int(1));
        assert!(!matches(&e, &rule(vec![f.clone()])));
        assert!(matches(&e, &rule(vec![f.negated()])));
    }

    #[test]
    fn test_fan_out_across_list_of_maps_is_existential() {
        let e = event(json!({
            "event_message": "m",
            "timestamp": "2024-01-01T00:00:00Z",
            "metadata": {"items": [{"status": "ok"}, {"status": "error"}]}
        }));
        let f = FilterRule::new(
            "metadata.items.status",
            Operator::Eq,
            Value::Str("error".to_string()),
        );
        assert!(matches(&e, &rule(vec![f])));
    }

    #[test]
    fn test_cross_type_numeric_comparison() {
        let e = event(json!({
            "event_message": "m",
            "timestamp": "2024-01-01T00:00:00Z",
            "metadata": {"ratio": 5}
        }));
        let f = FilterRule::new("metadata.ratio", Operator::Gte, Value::Float(4.5));
        assert!(matches(&e, &rule(vec![f])));
    }

    #[test]
    fn test_type_mismatch_never_matches() {
        let e = event(json!({
            "event_message": "m",
            "timestamp": "2024-01-01T00:00:00Z",
            "metadata": {"name": "alice"}
        }));
        let f = FilterRule::new("metadata.name", Operator::Gt, Value::Int(5));
        assert!(!matches(&e, &rule(vec![f])));
    }

    #[test]
    #[tracing_test::traced_test]
    fn test_invalid_regex_pattern_never_matches() {
        let e = event(json!({
            "event_message": "m",
            "timestamp": "2024-01-01T00:00:00Z",
            "metadata": {"s": "whatever"}
        }));
        let f = FilterRule::new("metadata.s", Operator::Match, Value::Str("(unclosed".to_string()));
        assert!(!matches(&e, &rule(vec![f])));
    }
}
