// SPDX-License-Identifier: Apache-2.0

#![warn(missing_docs)]

//! Group imports of the common traits and types a caller of this library
//! needs, for use via a single glob import.
//!

pub use super::error::LqlError;
pub use super::event::{Doc, Event, Lookup};
pub use super::evaluator::matches;
pub use super::op::{Modifiers, Operator};
pub use super::parser::parse;
pub use super::rule::{ChartRule, ChartValueType, FilterRule, Rule, RuleSet};
pub use super::schema::{FieldType, Schema};
pub use super::value::Value;
