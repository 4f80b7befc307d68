// SPDX-License-Identifier: Apache-2.0

//! PEG grammar for LQL surface syntax (spec.md §4.2).
//!
//! Being a PEG parser means the following limits/constraints/directives
//! should be observed when writing and ordering rules...
//!
//! * From the [pest book](https://pest.rs/book/grammars/peg.html): **_In
//!   general, when writing a parser with choices, put the longest or most
//!   specific choice first, and the shortest or most general choice
//!   last._**
//! * Once an alternative consumes characters, a PEG never backtracks past
//!   them: `first _ second`, once `first` parses successfully, `second`
//!   only ever runs on what `first` did not consume.
//!
//! This grammar only recognizes *surface shape* — it has no notion of a
//! schema. Everything type-dependent (is this path numeric? does this
//! operator apply to a string path?) happens one layer up, in
//! [`super::resolve`].

/// A comparison operator recognized directly by the grammar (`<`, `<=`,
/// `>`, `>=`); equality, regex match and list membership are inferred from
/// context one layer up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum CompareOp {
    Lt,
    Lte,
    Gt,
    Gte,
}

/// The unresolved right-hand side of a `path:` term.
#[derive(Debug, Clone, PartialEq)]
pub(super) enum RawRhs {
    /// `path:~pattern` — regex source is the rest of the token, unescaped.
    Regex(String),
    /// `path:<op>value` for one of the four ordering comparators.
    Compare(CompareOp, String),
    /// An unquoted bare token. May still turn out to be a `lo..hi` range
    /// once [`super::resolve`] inspects it — quoted values never are.
    Bare(String),
    /// A quoted phrase: taken as a literal value, never split as a range.
    Quoted(String),
}

/// One whitespace-delimited term, before schema resolution.
#[derive(Debug, Clone, PartialEq)]
pub(super) enum RawTerm {
    /// A bare word or quoted phrase with no `path:` prefix — free-text
    /// search against `event_message`.
    FreeText { text: String, negate: bool },
    /// `chart:path`.
    Chart { path: String },
    /// `path:rhs`.
    Path {
        path: String,
        negate: bool,
        rhs: RawRhs,
    },
}

peg::parser! {
    pub(super) grammar lql() for str {
        // ===== whitespace ===================================================
        rule ws_char() = quiet! { [
            ' ' | '\t' | '\n' | '\r'
            | '\u{000B}' // line tabulation
            | '\u{000C}' // form feed
            | '\u{0085}' // next line
            | '\u{00A0}' // no-break space
            | '\u{2028}' // line separator
            | '\u{2029}' // paragraph separator
        ] }

        rule _ = quiet! { ws_char()* }
        rule ws_plus() = quiet! { ws_char()+ }

        pub rule query() -> Vec<RawTerm>
        = _ terms:(term() ** ws_plus()) _ ![_] { terms }

        rule term() -> RawTerm
        = "-" t:chart_term()           { t }
        / "-" t:path_term(true)        { t }
        / "-" t:quoted_free_text(true) { t }
        / "-" t:bare_free_text(true)   { t }
        / chart_term()
        / path_term(false)
        / quoted_free_text(false)
        / bare_free_text(false)

        rule chart_term() -> RawTerm
        = "chart" ":" p:path() { RawTerm::Chart { path: p } }

        rule path_term(negate: bool) -> RawTerm
        = p:path() ":" r:rhs() { RawTerm::Path { path: p, negate, rhs: r } }

        rule quoted_free_text(negate: bool) -> RawTerm
        = s:quoted_string() { RawTerm::FreeText { text: s, negate } }

        rule bare_free_text(negate: bool) -> RawTerm
        = s:rest_token() { RawTerm::FreeText { text: s.to_string(), negate } }

        // the trailing empty alternative handles a bare trailing colon
        // (`path:` followed by whitespace or end of input) as an empty
        // value rather than folding the whole token back into free text.
        rule rhs() -> RawRhs
        = "~" v:rest_token()          { RawRhs::Regex(v.to_string()) }
        / op:comparator() v:rest_token() { RawRhs::Compare(op, v.to_string()) }
        / v:quoted_string()           { RawRhs::Quoted(v) }
        / v:rest_token()              { RawRhs::Bare(v.to_string()) }
        / ""                          { RawRhs::Bare(String::new()) }

        rule comparator() -> CompareOp
        = "<=" { CompareOp::Lte }
        / ">=" { CompareOp::Gte }
        / "<"  { CompareOp::Lt }
        / ">"  { CompareOp::Gt }

        // `term()`'s negated and non-negated branches each try `chart_term()`
        // then `path_term()` at the same starting offset, so a `path:`/
        // `chart:` term re-parses the same path twice per attempted sign;
        // memoize it rather than re-walking the segment list each time.
        #[cache]
        rule path() -> String
        = s:$(path_segment() ++ ".") { s.to_string() }

        rule path_segment()
        = ['a'..='z' | 'A'..='Z' | '0'..='9' | '_']+

        rule rest_token() -> &'input str
        = $((!ws_char() [_])+)

        rule quoted_string() -> String
        = "\"" s:quoted_char()* "\"" { s.into_iter().collect() }

        rule quoted_char() -> char
        = "\\\"" { '"' }
        / "\\\\" { '\\' }
        / !['"'] c:[_] { c }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_splits_bare_words() {
        let terms = lql::query("user sign up").unwrap();
        assert_eq!(terms.len(), 3);
        assert!(matches!(&terms[0], RawTerm::FreeText { text, negate: false } if text == "user"));
    }

    #[test]
    fn test_quoted_phrase_is_one_term() {
        let terms = lql::query("new \"user sign up\" server").unwrap();
        assert_eq!(terms.len(), 3);
        assert!(
            matches!(&terms[1], RawTerm::FreeText { text, negate: false } if text == "user sign up")
        );
    }

    #[test]
    fn test_path_eq_term() {
        let terms = lql::query("metadata.status:200").unwrap();
        assert_eq!(terms.len(), 1);
        match &terms[0] {
            RawTerm::Path { path, negate, rhs } => {
                assert_eq!(path, "metadata.status");
                assert!(!negate);
                assert_eq!(*rhs, RawRhs::Bare("200".to_string()));
            }
            other => panic!("unexpected term {other:?}"),
        }
    }

    #[test]
    fn test_negated_path_term() {
        let terms = lql::query("-metadata.status:200").unwrap();
        match &terms[0] {
            RawTerm::Path { negate, .. } => assert!(negate),
            other => panic!("unexpected term {other:?}"),
        }
    }

    #[test]
    fn test_regex_and_comparator_rhs() {
        let terms = lql::query("event_message:~\\d\\d\\d metadata.count:>=5").unwrap();
        assert_eq!(
            terms[0],
            RawTerm::Path {
                path: "event_message".to_string(),
                negate: false,
                rhs: RawRhs::Regex("\\d\\d\\d".to_string()),
            }
        );
        assert_eq!(
            terms[1],
            RawTerm::Path {
                path: "metadata.count".to_string(),
                negate: false,
                rhs: RawRhs::Compare(CompareOp::Gte, "5".to_string()),
            }
        );
    }

    #[test]
    fn test_chart_directive() {
        let terms = lql::query("chart:metadata.count").unwrap();
        assert_eq!(
            terms[0],
            RawTerm::Chart {
                path: "metadata.count".to_string()
            }
        );
    }

    #[test]
    fn test_range_is_a_bare_token() {
        let terms = lql::query("metadata.users.source_count:50..200").unwrap();
        assert_eq!(
            terms[0],
            RawTerm::Path {
                path: "metadata.users.source_count".to_string(),
                negate: false,
                rhs: RawRhs::Bare("50..200".to_string()),
            }
        );
    }

    #[test]
    fn test_whitespace_variants_are_interchangeable() {
        let a = lql::query("user sign up").unwrap();
        let b = lql::query("user\tsign\n  up").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_quoted_path_value_is_not_bare() {
        let terms = lql::query("metadata.user.name:\"jane doe\"").unwrap();
        assert_eq!(
            terms[0],
            RawTerm::Path {
                path: "metadata.user.name".to_string(),
                negate: false,
                rhs: RawRhs::Quoted("jane doe".to_string()),
            }
        );
    }

    #[test]
    fn test_quoted_empty_string_value() {
        let terms = lql::query("metadata.user.name:\"\"").unwrap();
        assert_eq!(
            terms[0],
            RawTerm::Path {
                path: "metadata.user.name".to_string(),
                negate: false,
                rhs: RawRhs::Quoted(String::new()),
            }
        );
    }

    #[test]
    fn test_empty_query() {
        assert_eq!(lql::query("").unwrap(), Vec::new());
        assert_eq!(lql::query("   ").unwrap(), Vec::new());
    }

    #[test]
    fn test_trailing_colon_is_an_empty_value() {
        let terms = lql::query("metadata.user.emailAddress:").unwrap();
        assert_eq!(
            terms[0],
            RawTerm::Path {
                path: "metadata.user.emailAddress".to_string(),
                negate: false,
                rhs: RawRhs::Bare(String::new()),
            }
        );
    }
}
