use proptest::prelude::*;
use pup::{Session, Value, list_to_pairs, pairs_to_list};

// ============================================================================
// Strategies
// ============================================================================

fn finite_number() -> impl Strategy<Value = f64> {
    any::<f64>().prop_filter("Must be finite", |f| f.is_finite())
}

fn non_empty_numbers() -> impl Strategy<Value = Vec<Value>> {
    prop::collection::vec(finite_number().prop_map(Value::Number), 1..64)
}

fn small_int() -> impl Strategy<Value = i64> {
    -10_000i64..10_000i64
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn pairs_round_trip(items in non_empty_numbers()) {
        prop_assert_eq!(pairs_to_list(&list_to_pairs(items.clone())), items);
    }

    #[test]
    fn single_element_is_bare(n in finite_number()) {
        prop_assert_eq!(list_to_pairs(vec![Value::Number(n)]), Value::Number(n));
    }

    #[test]
    fn curried_addition_matches_host(a in small_int(), b in small_int()) {
        let session = Session::new();
        let result = session.eval(&format!("(+ {a} {b})")).unwrap();
        prop_assert_eq!(result, Some(Value::number((a + b) as f64)));
    }

    #[test]
    fn fold_plus_is_sum(ns in prop::collection::vec(small_int(), 1..32)) {
        let session = Session::new();
        let literal = ns.iter().map(|n| n.to_string()).collect::<Vec<_>>().join(" ");
        let result = session.eval(&format!("(fold + [{literal}])")).unwrap();
        prop_assert_eq!(result, Some(Value::number(ns.iter().sum::<i64>() as f64)));
    }

    #[test]
    fn length_counts_elements(ns in prop::collection::vec(small_int(), 0..32)) {
        let session = Session::new();
        let literal = ns.iter().map(|n| n.to_string()).collect::<Vec<_>>().join(" ");
        let result = session.eval(&format!("(length [{literal}])")).unwrap();
        prop_assert_eq!(result, Some(Value::number(ns.len() as f64)));
    }
}
