// SPDX-License-Identifier: Apache-2.0

#![warn(missing_docs)]

//! LQL: a schema-aware log query language and its routing evaluator.
//!
//! The crate has three layers, in dependency order (leaves first):
//!
//! 1. [`Schema`] — the in-memory shape of a table: known `metadata.*`
//!    paths and their semantic [`FieldType`]s, plus the two always-present
//!    system paths `event_message: string` and `timestamp: datetime`.
//! 2. [`parse`] — text → [`RuleSet`]. A PEG grammar recognizes surface
//!    syntax (quoting, negation, ranges, comparators, `chart:` directives);
//!    a second pass resolves every `path:` term against a [`Schema`],
//!    coerces the raw literal to a typed [`Value`], and rejects
//!    operator/type mismatches.
//! 3. [`matches`] — `(&Event, &Rule) → bool`. Walks a dotted path into an
//!    [`Event`]'s `metadata` document, dispatching on [`op::Operator`] with
//!    existential semantics across any `list<map>` it passes through.
//!
//! ```
//! use lql::{Event, Rule, Schema, parse};
//!
//! let schema = Schema::new();
//! let rule_set = parse("user sign up", &schema).unwrap();
//! let rule = Rule::from_rule_set(&rule_set);
//!
//! let event = Event::from_json(&serde_json::json!({
//!     "event_message": "user sign up succeeded",
//!     "timestamp": "2024-01-01T00:00:00Z",
//!     "metadata": {}
//! }));
//! assert!(lql::matches(&event, &rule));
//! ```
//!
//! # Third-party crates
//!
//! * [`peg`](https://crates.io/crates/peg) builds the recursive-descent
//!   query grammar from a concise rule definition.
//! * [`jiff`](https://crates.io/crates/jiff) backs [`Value::Date`] and
//!   [`Value::DateTime`] with timezone-aware date/time handling.
//! * [`regress`](https://crates.io/crates/regress) is the `~` operator's
//!   regex engine; it is linear-time, which matters because LQL patterns
//!   are untrusted user input.
//! * [`serde`]/[`serde_json`] back `RuleSet`/`Rule` persistence and
//!   `Event`/`Schema` JSON ingestion.
//! * [`dashmap`]/[`lru`] back the evaluator's bounded, concurrent regex
//!   cache.
//! * [`thiserror`] backs [`LqlError`]; [`tracing`] instruments parsing and
//!   evaluation; [`dotenvy`] backs the `config` module's environment
//!   overrides.

mod config;
mod error;
mod event;
mod evaluator;
mod op;
mod parser;
mod rule;
mod schema;
mod value;

pub use error::LqlError;
pub use event::{Doc, Event, Lookup};
pub use evaluator::matches;
pub use op::{Modifiers, Operator};
pub use parser::parse;
pub use rule::{ChartRule, ChartValueType, FilterRule, Rule, RuleSet};
pub use schema::{FieldType, Schema};
pub use value::Value;

pub mod prelude;
