// SPDX-License-Identifier: Apache-2.0

#![warn(missing_docs)]

//! LQL comparison operators and filter modifiers.
//!

use core::fmt;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

/// A comparison operator usable in a [`crate::FilterRule`].
///
/// `range` (the `lo..hi` surface syntax) is deliberately not a member: it
/// is internal to the parser and always desugars to a `Gte`/`Lte` pair
/// before a [`crate::FilterRule`] is ever constructed (spec.md §3, §4.2).
///
/// Variant declaration order is also the canonical sort rank used when
/// ordering a parsed [`crate::RuleSet`]'s `search` list (spec.md §4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// `=` deep equality.
    Eq,
    /// `<>` negation of `=`.
    Neq,
    /// `<` strictly less than.
    Lt,
    /// `<=` less than or equal to.
    Lte,
    /// `>` strictly greater than.
    Gt,
    /// `>=` greater than or equal to.
    Gte,
    /// `~` regex/substring match.
    Match,
    /// `list_includes` membership test against a list-valued path.
    ListIncludes,
}

impl Operator {
    /// `true` for the four ordering comparators (`<`, `<=`, `>`, `>=`),
    /// which per spec.md §3 require a numeric or temporal `path`.
    pub fn is_ordering(&self) -> bool {
        matches!(
            self,
            Operator::Lt | Operator::Lte | Operator::Gt | Operator::Gte
        )
    }

    /// `true` for `~`, which per spec.md §3 requires a string-typed `path`.
    pub fn is_match(&self) -> bool {
        matches!(self, Operator::Match)
    }

    /// `true` for `list_includes`, which per spec.md §3 requires a
    /// `list<T>`-typed `path`.
    pub fn is_list_includes(&self) -> bool {
        matches!(self, Operator::ListIncludes)
    }

    /// The wire/display token, also used as the canonical spelling in error
    /// messages (spec.md §6: "Enum values ... should be encoded as stable
    /// string tokens").
    pub fn token(&self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Neq => "<>",
            Operator::Lt => "<",
            Operator::Lte => "<=",
            Operator::Gt => ">",
            Operator::Gte => ">=",
            Operator::Match => "~",
            Operator::ListIncludes => "list_includes",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.token())
    }
}

impl Serialize for Operator {
    // persisted as the stable string token, not the Rust variant name
    // (spec.md §6).
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(self.token())
    }
}

impl<'de> Deserialize<'de> for Operator {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let s = String::deserialize(d)?;
        match s.as_str() {
            "=" => Ok(Operator::Eq),
            "<>" => Ok(Operator::Neq),
            "<" => Ok(Operator::Lt),
            "<=" => Ok(Operator::Lte),
            ">" => Ok(Operator::Gt),
            ">=" => Ok(Operator::Gte),
            "~" => Ok(Operator::Match),
            "list_includes" => Ok(Operator::ListIncludes),
            other => Err(de::Error::custom(format!("unknown operator token {other:?}"))),
        }
    }
}

/// Flags attached to a [`crate::FilterRule`]. Modeled as a small bitset
/// (following the teacher's `Ignoring` bitset in its string-comparison
/// type) rather than a bare `bool` so the wire format and the canonical
/// sort key both read as "is this modifier set", leaving room for future
/// members without changing either.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers(u8);

impl Modifiers {
    const NEGATE: u8 = 0b01;

    /// The empty modifier set.
    pub const NONE: Modifiers = Modifiers(0);

    /// A modifier set with just `negate` present.
    pub const NEGATED: Modifiers = Modifiers(Self::NEGATE);

    /// `true` if the `negate` flag is set.
    pub fn is_negated(&self) -> bool {
        self.0 & Self::NEGATE != 0
    }

    /// Return a copy of this with `negate` set.
    pub fn negated(self) -> Self {
        Modifiers(self.0 | Self::NEGATE)
    }
}

impl fmt::Display for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_negated() {
            write!(f, "negate")
        } else {
            write!(f, "")
        }
    }
}

impl Serialize for Modifiers {
    // persisted as a set of string tokens, e.g. `["negate"]` or `[]`
    // (spec.md §6), not the internal bitset representation.
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        let tokens: Vec<&str> = if self.is_negated() { vec!["negate"] } else { vec![] };
        tokens.serialize(s)
    }
}

impl<'de> Deserialize<'de> for Modifiers {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let tokens = Vec::<String>::deserialize(d)?;
        let mut m = Modifiers::NONE;
        for t in tokens {
            match t.as_str() {
                "negate" => m = m.negated(),
                other => return Err(de::Error::custom(format!("unknown modifier token {other:?}"))),
            }
        }
        Ok(m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_tokens_roundtrip_json() {
        for op in [
            Operator::Eq,
            Operator::Neq,
            Operator::Lt,
            Operator::Lte,
            Operator::Gt,
            Operator::Gte,
            Operator::Match,
            Operator::ListIncludes,
        ] {
            let s = serde_json::to_string(&op).unwrap();
            let back: Operator = serde_json::from_str(&s).unwrap();
            assert_eq!(op, back);
        }
    }

    #[test]
    fn test_negate_modifier() {
        let m = Modifiers::NONE;
        assert!(!m.is_negated());
        let m = m.negated();
        assert!(m.is_negated());
    }
}
