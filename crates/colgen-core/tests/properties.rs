//! Property tests for the generalizer: identity on miss, regex substitution,
//! and idempotence of idempotent rule sets.

use std::collections::BTreeMap;

use colgen_core::{PatternSpec, RuleOptions, RuleSet, RuleSource, generalize};
use proptest::prelude::*;
use regex::Regex;
use serde_json::{Value, json};

/// Lowercase keys mapped to uppercase categories, so no value is also a key.
fn arb_lookup() -> impl Strategy<Value = BTreeMap<String, String>> {
    prop::collection::btree_map("[a-z]{1,6}", "[A-Z]{1,6}", 1..20)
}

fn compile_lookup(entries: BTreeMap<String, String>) -> RuleSet {
    RuleSource::Lookup(entries)
        .compile(RuleOptions::default())
        .expect("compile lookup")
}

proptest! {
    #[test]
    fn lookup_miss_is_identity(entries in arb_lookup(), raw in "[0-9]{1,8}") {
        let rules = compile_lookup(entries);
        let value = json!(raw);
        prop_assert_eq!(generalize(&value, &rules), value);
    }

    #[test]
    fn lookup_miss_preserves_numbers(entries in arb_lookup(), raw in 0u32..100_000) {
        let rules = compile_lookup(entries);
        let value = json!(raw);
        prop_assert_eq!(generalize(&value, &rules), value);
    }

    #[test]
    fn lookup_hit_returns_mapped_value(entries in arb_lookup(), pick in any::<prop::sample::Index>()) {
        let pairs: Vec<(String, String)> = entries
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        let (key, expected) = pick.get(&pairs).clone();
        let rules = compile_lookup(entries);
        prop_assert_eq!(generalize(&json!(key), &rules), json!(expected));
    }

    #[test]
    fn regex_match_equals_substitution(raw in "[a-z0-9 -]{0,24}") {
        let rules = RuleSet::patterns(vec![PatternSpec::new(r"\d+", "N")], RuleOptions::default())
            .expect("compile patterns");
        let reference = Regex::new(r"\d+").expect("reference regex");
        let out = generalize(&json!(raw), &rules);
        if reference.is_match(&raw) {
            prop_assert_eq!(out, json!(reference.replace_all(&raw, "N").into_owned()));
        } else {
            prop_assert_eq!(out, json!(raw));
        }
    }

    #[test]
    fn lookup_is_idempotent(entries in arb_lookup(), raw in "[a-zA-Z]{1,6}") {
        let rules = compile_lookup(entries);
        let once = generalize(&Value::String(raw), &rules);
        let twice = generalize(&once, &rules);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn idempotent_patterns_are_idempotent(raw in "[a-z0-9@. ]{0,24}") {
        let rules = RuleSet::patterns(
            vec![
                PatternSpec::new(r"^[^@]+@", "*@"),
                PatternSpec::new(r"\d+", "N"),
            ],
            RuleOptions::default(),
        )
        .expect("compile patterns");
        let once = generalize(&json!(raw), &rules);
        let twice = generalize(&once, &rules);
        prop_assert_eq!(once, twice);
    }
}
