// SPDX-License-Identifier: Apache-2.0

#![warn(missing_docs)]

//! In-memory representation of a table schema: the set of known field
//! paths and their semantic types, consumed by the parser for path
//! validation and value coercion (spec.md §4.1).
//!

use core::fmt;
use std::collections::BTreeMap;

/// The semantic type of a schema path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    /// A UTF-8 string.
    String,
    /// A whole number.
    Integer,
    /// A number carrying a decimal point.
    Float,
    /// `true` / `false`.
    Boolean,
    /// A UTC instant.
    DateTime,
    /// A timezone-free calendar date.
    Date,
    /// A homogeneous list of the given scalar type.
    List(Box<FieldType>),
    /// An interior node with no value of its own (only children).
    Object,
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::String => write!(f, "string"),
            FieldType::Integer => write!(f, "integer"),
            FieldType::Float => write!(f, "float"),
            FieldType::Boolean => write!(f, "boolean"),
            FieldType::DateTime => write!(f, "datetime"),
            FieldType::Date => write!(f, "date"),
            FieldType::List(t) => write!(f, "list<{t}>"),
            FieldType::Object => write!(f, "object"),
        }
    }
}

impl FieldType {
    /// `true` for `Integer`/`Float`.
    pub fn is_numeric(&self) -> bool {
        matches!(self, FieldType::Integer | FieldType::Float)
    }

    /// `true` for `Date`/`DateTime`.
    pub fn is_temporal(&self) -> bool {
        matches!(self, FieldType::Date | FieldType::DateTime)
    }

    /// `true` for `String`.
    pub fn is_string(&self) -> bool {
        matches!(self, FieldType::String)
    }

    /// `true` for `List(_)`.
    pub fn is_list(&self) -> bool {
        matches!(self, FieldType::List(_))
    }
}

/// The set of known field paths and their semantic types.
///
/// Two system paths are always present regardless of how a `Schema` is
/// constructed: `event_message: string` and `timestamp: datetime`
/// (spec.md §3).
#[derive(Debug, Clone)]
pub struct Schema {
    fields: BTreeMap<String, FieldType>,
}

impl Default for Schema {
    fn default() -> Self {
        Schema::new()
    }
}

impl Schema {
    /// An empty schema carrying only the two always-present system paths.
    pub fn new() -> Self {
        let mut fields = BTreeMap::new();
        fields.insert("event_message".to_string(), FieldType::String);
        fields.insert("timestamp".to_string(), FieldType::DateTime);
        Schema { fields }
    }

    /// Build a schema from explicit path → type descriptors. Callers that
    /// already know the shape of their data (schema builders, tests) should
    /// prefer this over [`Schema::from_samples`], which only infers types.
    pub fn from_descriptors(descriptors: &BTreeMap<String, FieldType>) -> Self {
        let mut schema = Schema::new();
        for (path, ty) in descriptors {
            schema.fields.insert(path.clone(), ty.clone());
        }
        schema
    }

    /// Build a schema by recursively inferring types from a nested document
    /// of sample values (spec.md §4.1): whole-number samples become
    /// `Integer`, any sample containing a decimal point becomes `Float`,
    /// `true`/`false` become `Boolean`, anything else becomes `String`; a
    /// JSON array is typed by its first element (defaulting to
    /// `list<string>` when empty).
    pub fn from_samples(samples: &serde_json::Value) -> Self {
        let mut schema = Schema::new();
        if let serde_json::Value::Object(map) = samples {
            infer_object(map, "metadata", &mut schema.fields);
        }
        schema
    }

    /// Resolve `path` to its semantic type, or `None` if unknown.
    pub fn resolve(&self, path: &str) -> Option<&FieldType> {
        self.fields.get(path)
    }

    /// `true` if `path` resolves to a numeric type.
    pub fn is_numeric(&self, path: &str) -> bool {
        self.resolve(path).is_some_and(FieldType::is_numeric)
    }

    /// `true` if `path` resolves to a temporal type.
    pub fn is_temporal(&self, path: &str) -> bool {
        self.resolve(path).is_some_and(FieldType::is_temporal)
    }

    /// `true` if `path` resolves to `String`.
    pub fn is_string(&self, path: &str) -> bool {
        self.resolve(path).is_some_and(FieldType::is_string)
    }

    /// `true` if `path` resolves to a list type.
    pub fn is_list(&self, path: &str) -> bool {
        self.resolve(path).is_some_and(FieldType::is_list)
    }

    /// All known paths, in a deterministic (sorted) order. Used both for
    /// typo-suggestion in error messages and in tests asserting a schema's
    /// shape.
    pub fn paths(&self) -> Vec<&str> {
        self.fields.keys().map(String::as_str).collect()
    }

    /// Return the closest known path to `path` by edit distance, if one is
    /// close enough to plausibly be a typo. Powers the "Did you mean ...?"
    /// clause of [`crate::LqlError::UnknownField`].
    pub fn suggest(&self, path: &str) -> Option<&str> {
        const MAX_DISTANCE: usize = 3;

        self.paths()
            .into_iter()
            .map(|candidate| (candidate, levenshtein(path, candidate)))
            .filter(|(_, dist)| *dist <= MAX_DISTANCE)
            .min_by_key(|(_, dist)| *dist)
            .map(|(candidate, _)| candidate)
    }
}

fn infer_object(
    map: &serde_json::Map<String, serde_json::Value>,
    prefix: &str,
    fields: &mut BTreeMap<String, FieldType>,
) {
    for (key, value) in map {
        let path = format!("{prefix}.{key}");
        match value {
            serde_json::Value::Object(nested) => {
                fields.insert(path.clone(), FieldType::Object);
                infer_object(nested, &path, fields);
            }
            serde_json::Value::Array(items) => {
                let elem_ty = items.first().map(infer_scalar).unwrap_or(FieldType::String);
                fields.insert(path, FieldType::List(Box::new(elem_ty)));
            }
            other => {
                fields.insert(path, infer_scalar(other));
            }
        }
    }
}

fn infer_scalar(value: &serde_json::Value) -> FieldType {
    match value {
        serde_json::Value::Bool(_) => FieldType::Boolean,
        serde_json::Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                FieldType::Integer
            } else {
                FieldType::Float
            }
        }
        serde_json::Value::String(s) if s.contains('.') && s.parse::<f64>().is_ok() => {
            FieldType::Float
        }
        serde_json::Value::String(s) if s.parse::<i64>().is_ok() => FieldType::Integer,
        _ => FieldType::String,
    }
}

/// Classic iterative edit-distance, used only for schema-path typo
/// suggestions; no external dependency is warranted for something this
/// small.
fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let mut row: Vec<usize> = (0..=b.len()).collect();

    for (i, ca) in a.iter().enumerate() {
        let mut prev = row[0];
        row[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let tmp = row[j + 1];
            row[j + 1] = if ca == cb {
                prev
            } else {
                1 + prev.min(row[j]).min(row[j + 1])
            };
            prev = tmp;
        }
    }
    row[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_system_paths_always_present() {
        let schema = Schema::new();
        assert_eq!(schema.resolve("event_message"), Some(&FieldType::String));
        assert_eq!(schema.resolve("timestamp"), Some(&FieldType::DateTime));
    }

    #[test]
    fn test_infer_from_samples() {
        let samples = json!({
            "users": {
                "source_count": 50,
                "ratio": 1.5,
                "active": true,
                "name": "alice",
                "tags": [1, 2, 3]
            }
        });
        let schema = Schema::from_samples(&samples);
        assert_eq!(
            schema.resolve("metadata.users.source_count"),
            Some(&FieldType::Integer)
        );
        assert_eq!(
            schema.resolve("metadata.users.ratio"),
            Some(&FieldType::Float)
        );
        assert_eq!(
            schema.resolve("metadata.users.active"),
            Some(&FieldType::Boolean)
        );
        assert_eq!(
            schema.resolve("metadata.users.name"),
            Some(&FieldType::String)
        );
        assert_eq!(
            schema.resolve("metadata.users.tags"),
            Some(&FieldType::List(Box::new(FieldType::Integer)))
        );
        assert_eq!(schema.resolve("metadata.users"), Some(&FieldType::Object));
    }

    #[test]
    fn test_suggest_typo() {
        let mut descriptors = BTreeMap::new();
        descriptors.insert(
            "metadata.user.email_address".to_string(),
            FieldType::String,
        );
        let schema = Schema::from_descriptors(&descriptors);
        assert_eq!(
            schema.suggest("metadata.user.emailAddress"),
            Some("metadata.user.email_address")
        );
    }

    #[test]
    fn test_suggest_none_when_too_far() {
        let schema = Schema::new();
        assert_eq!(schema.suggest("completely.unrelated.path.xyz"), None);
    }
}
