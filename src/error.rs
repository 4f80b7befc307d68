// SPDX-License-Identifier: Apache-2.0

#![warn(missing_docs)]

//! Errors raised from this library.
//!

use thiserror::Error;

/// Variants of error raised while parsing or validating an LQL query.
///
/// `Display` on every variant renders exactly the user-visible message
/// text; callers that only want the flat string contract of
/// [`crate::parse`] can call `.to_string()`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LqlError {
    /// Malformed quoting, a trailing bare operator, or any other input the
    /// grammar itself could not recognize as a sequence of terms.
    #[error("{0}")]
    Tokenize(String),

    /// `path` is not present in the schema. The message is fully rendered
    /// at construction time (see [`LqlError::unknown_field`]) since the
    /// optional "did you mean" clause isn't a plain field interpolation.
    #[error("{message}")]
    UnknownField {
        /// The offending path, verbatim as written in the query.
        path: String,
        /// Fully rendered `Unknown field "<path>"[. Did you mean "<x>"?]`.
        message: String,
    },

    /// The raw literal for `path` could not be coerced to its resolved
    /// schema type.
    #[error("Error while parsing `{path}` field metadata filter value: \"{raw}\"")]
    ValueParse {
        /// The path whose value failed to parse.
        path: String,
        /// The raw, unparsed literal text.
        raw: String,
    },

    /// A `timestamp:` term's value was neither a valid ISO-8601 instant nor
    /// a valid range of two instants.
    #[error(
        "Error while parsing timestamp filter value: expected ISO8601 string or range, got {0}"
    )]
    Timestamp(String),

    /// A `lo..hi` range term had `lo > hi`, or bounds whose types cannot be
    /// widened to a common type.
    #[error("{0}")]
    Range(String),

    /// An operator was used against a path whose resolved type does not
    /// support it (e.g. `~` on a numeric path).
    #[error("{0}")]
    OperatorMismatch(String),
}

impl LqlError {
    /// Construct an [`LqlError::UnknownField`] for `path`, with an optional
    /// near-match suggestion.
    pub(crate) fn unknown_field(path: &str, did_you_mean: Option<&str>) -> Self {
        let message = match did_you_mean {
            Some(s) => format!("Unknown field \"{path}\". Did you mean \"{s}\"?"),
            None => format!("Unknown field \"{path}\""),
        };
        LqlError::UnknownField {
            path: path.to_string(),
            message,
        }
    }
}
