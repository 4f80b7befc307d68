// SPDX-License-Identifier: Apache-2.0

//! Property-style fuzz test: shuffling the whitespace between a query's
//! terms must never change the parsed, canonically-sorted `RuleSet`.

use lql::{FieldType, Schema, parse};
use rand::Rng;
use std::collections::BTreeMap;

fn random_whitespace() -> String {
    const CHARS: [char; 4] = [' ', '\t', '\n', '\r'];
    let mut rng = rand::rng();
    let len = rng.random_range(1..=4);
    (0..len)
        .map(|_| CHARS[rng.random_range(0..CHARS.len())])
        .collect()
}

#[test]
fn fuzz_test_whitespace_shuffle_is_order_preserving() {
    let mut descriptors = BTreeMap::new();
    descriptors.insert("metadata.users.source_count".to_string(), FieldType::Integer);
    descriptors.insert("metadata.request.status".to_string(), FieldType::String);
    let schema = Schema::from_descriptors(&descriptors);

    let terms = [
        "user",
        "sign",
        "up",
        "metadata.users.source_count:50..200",
        "-metadata.request.status:~error",
        "chart:metadata.users.source_count",
    ];

    let baseline = parse(&terms.join(" "), &schema).unwrap();

    for _ in 0..200 {
        let sep = random_whitespace();
        let shuffled = terms.join(sep.as_str());
        let parsed = parse(&shuffled, &schema).unwrap();
        assert_eq!(
            parsed, baseline,
            "whitespace-only variation of the same terms changed the parsed RuleSet"
        );
    }
}
