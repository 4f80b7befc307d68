// SPDX-License-Identifier: Apache-2.0

#![warn(missing_docs)]

//! The ingested log event the evaluator tests rules against (spec.md §3,
//! §4.3).
//!

use crate::value::Value;
use jiff::{Timestamp, civil::Date};
use std::collections::BTreeMap;

/// A node in an event's `metadata` subtree.
///
/// Modeled as a tree of tagged variants (spec.md §9's first option) rather
/// than a path-indexed flat map, specifically so `list<map>` fan-out
/// (spec.md §4.3) has a direct representation instead of needing to be
/// reconstructed from flattened keys.
#[derive(Debug, Clone, PartialEq)]
pub enum Doc {
    /// An interior object node.
    Map(BTreeMap<String, Doc>),
    /// A list of nodes, any of which may themselves be `Map`s (the
    /// fan-out case) or scalars.
    List(Vec<Doc>),
    /// A leaf value.
    Scalar(Value),
    /// The key was absent at this point in the path.
    Missing,
}

impl Doc {
    /// Build a `Doc` tree from an arbitrary JSON value, doing best-effort
    /// scalar typing: whole numbers become `Value::Int`, numbers with a
    /// fractional part become `Value::Float`, booleans become
    /// `Value::Bool`, everything else (including strings that happen to
    /// look like numbers or dates) stays `Value::Str` — schema-drift
    /// tolerance is the evaluator's job, not event construction's
    /// (spec.md §6).
    ///
    /// A JSON array is only kept as a `Doc::List` (element-wise fan-out,
    /// spec.md §4.3) when it contains objects; an array of scalars has
    /// nothing to fan out into and instead becomes a single
    /// `Doc::Scalar(Value::List(..))` leaf, so a path terminating exactly
    /// at it resolves to a real list value for `list_includes`/equality
    /// (spec.md §8 scenario 6).
    pub fn from_json(value: &serde_json::Value) -> Doc {
        match value {
            serde_json::Value::Object(map) => Doc::Map(
                map.iter()
                    .map(|(k, v)| (k.clone(), Doc::from_json(v)))
                    .collect(),
            ),
            serde_json::Value::Array(items) if items.iter().any(serde_json::Value::is_object) => {
                Doc::List(items.iter().map(Doc::from_json).collect())
            }
            serde_json::Value::Array(items) => Doc::Scalar(Value::List(
                items
                    .iter()
                    .filter_map(|item| match Doc::from_json(item) {
                        Doc::Scalar(value) => Some(value),
                        _ => None,
                    })
                    .collect(),
            )),
            serde_json::Value::Null => Doc::Missing,
            serde_json::Value::Bool(b) => Doc::Scalar(Value::Bool(*b)),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Doc::Scalar(Value::Int(i))
                } else {
                    Doc::Scalar(Value::Float(n.as_f64().unwrap_or(f64::NAN)))
                }
            }
            serde_json::Value::String(s) => Doc::Scalar(Value::Str(s.clone())),
        }
    }

    fn get(&self, key: &str) -> &Doc {
        match self {
            Doc::Map(m) => m.get(key).unwrap_or(&Doc::Missing),
            _ => &Doc::Missing,
        }
    }
}

/// The result of walking a dotted path into an [`Event`].
#[derive(Debug, Clone)]
pub enum Lookup<'a> {
    /// The ordinary case: the path never passed through a list.
    One(Option<&'a Value>),
    /// The path fanned out through a `list<map>` at some point; holds one
    /// entry per element the path was evaluated against (each itself
    /// optional, since the key may be missing from some elements and not
    /// others).
    Many(Vec<Option<&'a Value>>),
}

impl<'a> Lookup<'a> {
    /// `true` if *any* resolved value is present (non-missing). Existential
    /// semantics for the `Many` case, matching SQL `UNNEST` (spec.md
    /// §4.3).
    pub fn any<F>(&self, mut predicate: F) -> bool
    where
        F: FnMut(Option<&'a Value>) -> bool,
    {
        match self {
            Lookup::One(v) => predicate(*v),
            Lookup::Many(vs) => vs.iter().any(|v| predicate(*v)),
        }
    }
}

/// One ingested log record: a fixed `event_message`/`timestamp` pair plus a
/// free-form, recursive `metadata` document (spec.md §3). Immutable once
/// constructed.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    /// The event's free-text message.
    pub event_message: String,
    /// The event's ingestion instant.
    pub timestamp: Timestamp,
    /// The free-form metadata subtree.
    pub metadata: Doc,
    // `event_message`/`timestamp` as `Value`s, cached at construction so
    // `lookup` can hand out a `&Value` for the two top-level system paths
    // without materializing one on every call.
    event_message_value: Value,
    timestamp_value: Value,
}

impl Event {
    /// Construct an event directly.
    pub fn new(event_message: impl Into<String>, timestamp: Timestamp, metadata: Doc) -> Self {
        let event_message = event_message.into();
        let event_message_value = Value::Str(event_message.clone());
        let timestamp_value = Value::DateTime(timestamp);
        Event {
            event_message,
            timestamp,
            metadata,
            event_message_value,
            timestamp_value,
        }
    }

    /// Build an [`Event`] from a JSON document shaped like spec.md §3:
    /// top-level `event_message`, `timestamp`, and `metadata` keys.
    /// `timestamp` may be an RFC-3339 string or a bare date; parse failures
    /// fall back to the Unix epoch rather than panicking, since malformed
    /// *events* must never error (spec.md §6, §7) — they just won't match
    /// temporal filters sensibly.
    pub fn from_json(value: &serde_json::Value) -> Event {
        let event_message = value
            .get("event_message")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();

        let timestamp = value
            .get("timestamp")
            .and_then(|v| v.as_str())
            .and_then(parse_timestamp)
            .unwrap_or(Timestamp::UNIX_EPOCH);

        let metadata = value
            .get("metadata")
            .map(Doc::from_json)
            .unwrap_or_else(|| Doc::Map(BTreeMap::new()));

        Event::new(event_message, timestamp, metadata)
    }

    /// Walk a dotted `path` into this event, per spec.md §4.3:
    /// `event_message`/`timestamp` are top-level; `metadata.a.b.c` descends
    /// `a`, `b`, `c` under `metadata`; a list of maps fans out
    /// element-wise once the path enters it.
    pub fn lookup(&self, path: &str) -> Lookup<'_> {
        if path == "event_message" {
            return Lookup::One(Some(&self.event_message_value));
        }
        if path == "timestamp" {
            return Lookup::One(Some(&self.timestamp_value));
        }

        let rest = match path.strip_prefix("metadata.") {
            Some(rest) => rest,
            None if path == "metadata" => "",
            None => return Lookup::One(None),
        };

        if rest.is_empty() {
            return Lookup::One(None);
        }

        walk(&self.metadata, rest.split('.'))
    }
}

fn walk<'a, 'p>(doc: &'a Doc, mut keys: std::str::Split<'p, char>) -> Lookup<'a> {
    let Some(key) = keys.next() else {
        return Lookup::One(doc_as_value(doc));
    };

    match doc {
        Doc::Map(_) => walk(doc.get(key), keys),
        Doc::List(items) => {
            // fan out: each element of the list is resolved against the
            // *same remaining* path (existential semantics applied later
            // by the caller via `Lookup::any`).
            let mut results = Vec::with_capacity(items.len());
            for item in items {
                match walk(item, keys.clone()) {
                    Lookup::One(v) => results.push(v),
                    Lookup::Many(vs) => results.extend(vs),
                }
            }
            Lookup::Many(results)
        }
        Doc::Scalar(_) | Doc::Missing => Lookup::One(None),
    }
}

fn parse_timestamp(s: &str) -> Option<Timestamp> {
    s.parse::<Timestamp>().ok().or_else(|| {
        s.parse::<Date>()
            .ok()
            .and_then(|d| d.to_zoned(jiff::tz::TimeZone::UTC).ok())
            .map(|z| z.timestamp())
    })
}

fn doc_as_value(doc: &Doc) -> Option<&Value> {
    match doc {
        Doc::Scalar(v) => Some(v),
        _ => None,
    }
}
