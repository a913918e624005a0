//! Property-based tests for the binding contract.

use std::collections::{BTreeSet, HashMap};

use proptest::prelude::*;
use structproto::{
    coerce, coerce_text, prototypify, CoercionError, Prototype, ResolveOptions, StringBinder,
    Value,
};

#[derive(Debug, Default, Prototype)]
struct Form {
    #[proto(p = "*ALPHA")]
    alpha: String,
    #[proto(p = "*BRAVO")]
    bravo: Option<i64>,
    #[proto(p = "CHARLIE")]
    charlie: Vec<u8>,
    #[proto(p = "*DELTA")]
    delta: bool,
    #[proto(p = "ECHO")]
    echo: Option<Box<Option<i32>>>,
}

const REQUIRED: [&str; 3] = ["ALPHA", "BRAVO", "DELTA"];

fn input_for(name: &str) -> Value {
    match name {
        "ALPHA" => Value::from("a"),
        "BRAVO" => Value::from("-42"),
        "CHARLIE" => Value::from("1,2"),
        "DELTA" => Value::from("true"),
        _ => Value::from("7"),
    }
}

/// Strategy for any subset of the form's external names
fn supplied_names() -> impl Strategy<Value = BTreeSet<&'static str>> {
    prop::sample::subsequence(vec!["ALPHA", "BRAVO", "CHARLIE", "DELTA", "ECHO"], 0..=5)
        .prop_map(|names| names.into_iter().collect())
}

proptest! {
    #[test]
    fn test_missing_field_is_smallest_unsupplied(names in supplied_names()) {
        let input: HashMap<String, Value> = names
            .iter()
            .map(|name| (name.to_string(), input_for(name)))
            .collect();

        let mut form = Form::default();
        let result = prototypify(&mut form, &ResolveOptions::new().tag_name("p"))
            .unwrap()
            .bind_map(&input, &StringBinder);

        let expected = REQUIRED.iter().find(|name| !names.contains(*name)).copied();
        match (result, expected) {
            (Ok(()), None) => {}
            (Err(err), Some(name)) => prop_assert_eq!(err.missing_field(), Some(name)),
            (result, expected) => {
                prop_assert!(false, "got {:?}, expected missing {:?}", result.err(), expected)
            }
        }
    }

    #[test]
    fn test_comma_joined_integers_round_trip(items in prop::collection::vec(any::<i32>(), 1..16)) {
        let joined = items.iter().map(i32::to_string).collect::<Vec<_>>().join(",");
        prop_assert_eq!(coerce_text::<Vec<i32>>(&joined).unwrap(), items);
    }

    #[test]
    fn test_comma_joined_strings_round_trip(items in prop::collection::vec("[a-z ]{1,8}", 1..16)) {
        let joined = items.join(",");
        prop_assert_eq!(coerce_text::<Vec<String>>(&joined).unwrap(), items);
    }

    #[test]
    fn test_slice_failure_reports_first_bad_index(
        items in prop::collection::vec(any::<u16>(), 0..8),
        bad in 0usize..8,
    ) {
        let bad = bad.min(items.len());
        let mut values: Vec<Value> = items.iter().map(|i| Value::from(i.to_string())).collect();
        values.insert(bad, Value::from("x"));

        let err: CoercionError = coerce::<Vec<u16>>(&Value::Seq(values)).unwrap_err();
        prop_assert_eq!(err.index(), Some(bad));
    }

    #[test]
    fn test_exact_opaque_bool_is_cloned(flag in any::<bool>()) {
        prop_assert_eq!(coerce::<bool>(&Value::opaque(flag)).unwrap(), flag);
    }
}

#[test]
fn test_nested_options_are_allocated() {
    let mut form = Form::default();
    prototypify(&mut form, &ResolveOptions::new().tag_name("p"))
        .unwrap()
        .bind_iter(
            [
                ("ALPHA", "a"),
                ("BRAVO", "1"),
                ("DELTA", "false"),
                ("ECHO", "7"),
                ("CHARLIE", "3,4"),
            ]
            .map(|(name, text)| (name, Value::from(text))),
            &StringBinder,
        )
        .unwrap();

    assert_eq!(form.echo, Some(Box::new(Some(7))));
    assert_eq!(form.charlie, [3, 4]);
    assert!(!form.delta);
}

#[test]
fn test_slice_failure_example() {
    let input = Value::seq(["1", "x", "3"]);
    let err = coerce::<Vec<i32>>(&input).unwrap_err();
    assert_eq!(err.index(), Some(1));
    assert!(err.to_string().contains("at index 1: "), "{err}");
}
