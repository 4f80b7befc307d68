// SPDX-License-Identifier: Apache-2.0

#![warn(missing_docs)]

//! Runtime value representation shared by the schema, parser and evaluator.
//!
//! A dynamically-typed source value is lifted, as early as possible, into
//! this tagged [`Value`] enum so that downstream consumers (the evaluator,
//! and external callers persisting a [`crate::RuleSet`]) never have to
//! re-inspect a raw string to know what they're holding.
//!

use core::fmt;
use jiff::{Timestamp, Zoned, civil::Date, tz::TimeZone};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A typed scalar or list-of-scalars value, as specified by the LQL data
/// model.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Value {
    /// A UTF-8 string.
    Str(String),
    /// A whole number.
    Int(i64),
    /// A number carrying a decimal point.
    Float(f64),
    /// `true` / `false`.
    Bool(bool),
    /// A timezone-free calendar date (`YYYY-MM-DD`).
    Date(#[serde(with = "date_as_string")] Date),
    /// A UTC instant (`YYYY-MM-DDTHH:MM:SSZ`).
    DateTime(#[serde(with = "timestamp_as_string")] Timestamp),
    /// A homogeneous list of scalars.
    List(Vec<Value>),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(x) => write!(f, "{x}"),
            Value::Int(x) => write!(f, "{x}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Bool(x) => write!(f, "{x}"),
            Value::Date(x) => write!(f, "{x}"),
            Value::DateTime(x) => write!(f, "{x}"),
            Value::List(xs) => {
                write!(f, "[")?;
                for (i, x) in xs.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{x}")?;
                }
                write!(f, "]")
            }
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Date(a), Value::Date(b)) => a == b,
            // cross-numeric and date/datetime equality both widen, same as
            // ordering does below; `==` is defined as `partial_cmp ==
            // Some(Equal)` for every other combination.
            _ => matches!(self.partial_cmp(other), Some(Ordering::Equal)),
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Value::Str(a), Value::Str(b)) => a.partial_cmp(b),
            (Value::Bool(a), Value::Bool(b)) => a.partial_cmp(b),
            (Value::Int(a), Value::Int(b)) => a.partial_cmp(b),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
            // numeric widening: comparing an Int against a Float compares
            // numerically after widening the Int to f64, per the evaluator's
            // cross-type comparison rule.
            (Value::Int(a), Value::Float(b)) => (*a as f64).partial_cmp(b),
            (Value::Float(a), Value::Int(b)) => a.partial_cmp(&(*b as f64)),
            (Value::Date(a), Value::Date(b)) => a.partial_cmp(b),
            (Value::DateTime(a), Value::DateTime(b)) => a.partial_cmp(b),
            // a Date compares chronologically against a DateTime by widening
            // the Date to midnight UTC of that calendar day.
            (Value::Date(a), Value::DateTime(b)) => date_to_zoned(a).partial_cmp(&zoned(b)),
            (Value::DateTime(a), Value::Date(b)) => zoned(a).partial_cmp(&date_to_zoned(b)),
            // lists only support equality (via the derived fallback above),
            // never ordering comparisons; no schema path is ever typed so
            // that `<`/`<=`/`>`/`>=` reach a `List`.
            _ => None,
        }
    }
}

// reinterpret an f64's bit pattern as a u64 that sorts the same way the
// float itself orders, so Int/Float can share one numeric sort key after
// widening to f64 (mirrors the same widening `partial_cmp` applies above).
fn monotonic_bits(f: f64) -> u64 {
    let bits = f.to_bits();
    if f.is_sign_negative() {
        !bits
    } else {
        bits | (1u64 << 63)
    }
}

fn zoned(ts: &Timestamp) -> Zoned {
    ts.to_zoned(TimeZone::UTC)
}

fn date_to_zoned(d: &Date) -> Zoned {
    d.to_zoned(TimeZone::UTC)
        .expect("every representable civil::Date has a valid UTC midnight")
}

impl Value {
    /// A short, lowercase, human-readable name for this value's variant,
    /// used in error messages (`"string"`, `"integer"`, ...).
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Str(_) => "string",
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::Bool(_) => "boolean",
            Value::Date(_) => "date",
            Value::DateTime(_) => "datetime",
            Value::List(_) => "list",
        }
    }

    /// The string form of this value, used by the `~` operator when
    /// matching a regex against a non-string event value (e.g. a number
    /// stringified for substring/regex comparison).
    pub fn as_match_str(&self) -> String {
        match self {
            Value::Str(s) => s.clone(),
            other => other.to_string(),
        }
    }

    /// A byte-stable sort key used only to make the canonical `search` list
    /// ordering total across mixed `Value` variants (`PartialOrd` above
    /// deliberately has no cross-variant order beyond numeric/temporal
    /// widening). Two values that compare `Equal` under `PartialOrd` must
    /// produce the same sort key; this holds because the widened numeric
    /// and temporal comparisons above always normalize to a single
    /// representation here too.
    pub(crate) fn sort_key(&self) -> String {
        match self {
            Value::Str(s) => format!("s:{s}"),
            Value::Bool(b) => format!("b:{b}"),
            Value::Int(i) => format!("n:{:020}", monotonic_bits(*i as f64)),
            Value::Float(f) => format!("n:{:020}", monotonic_bits(*f)),
            Value::Date(d) => format!("t:{}", date_to_zoned(d).timestamp()),
            Value::DateTime(t) => format!("t:{}", zoned(t).timestamp()),
            Value::List(xs) => {
                let parts: Vec<String> = xs.iter().map(Value::sort_key).collect();
                format!("l:[{}]", parts.join(","))
            }
        }
    }
}

mod date_as_string {
    use jiff::civil::Date;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Date, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&d.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Date, D::Error> {
        let s = String::deserialize(d)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

mod timestamp_as_string {
    use jiff::Timestamp;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(t: &Timestamp, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&t.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Timestamp, D::Error> {
        let s = String::deserialize(d)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
