use super::*;
use crate::fixtures::{Fixture, c};
use crate::types::TypeDescriptor;

#[test]
fn more_derived_sorts_first() {
    let fx = Fixture::new();
    let ord = KeyOrdering::new(&fx.store);
    let int_list = fx.key(c(fx.int_list));
    let seq = fx.key(fx.seq(c(fx.integer)));
    let covariant = fx.key(fx.seq(TypeDescriptor::extends(c(fx.number))));

    assert_eq!(ord.compare(&int_list, &seq).unwrap(), Ordering::Less);
    assert_eq!(ord.compare(&seq, &int_list).unwrap(), Ordering::Greater);
    assert_eq!(ord.compare(&seq, &covariant).unwrap(), Ordering::Less);
    assert_eq!(ord.compare(&seq, &seq.clone()).unwrap(), Ordering::Equal);
}

#[test]
fn unrelated_keys_fall_back_to_text() {
    let fx = Fixture::new();
    let ord = KeyOrdering::new(&fx.store);
    let text = fx.key(c(fx.text));
    let number = fx.key(c(fx.number));
    assert_eq!(ord.compare(&text, &number).unwrap(), Ordering::Greater);
    assert_eq!(ord.compare(&number, &text).unwrap(), Ordering::Less);
}

#[test]
fn is_more_specific_is_strict() {
    let fx = Fixture::new();
    let ord = KeyOrdering::new(&fx.store);
    let integer = fx.key(c(fx.integer));
    let number = fx.key(c(fx.number));
    assert!(ord.is_more_specific(&integer, &number).unwrap());
    assert!(!ord.is_more_specific(&number, &integer).unwrap());
    assert!(!ord.is_more_specific(&integer, &integer).unwrap());
}

fn sample(fx: &Fixture) -> Vec<Key> {
    vec![
        fx.key(c(fx.object)),
        fx.key(fx.seq(TypeDescriptor::extends(c(fx.number)))),
        fx.key(c(fx.text)),
        fx.key(c(fx.int_list)),
        fx.key(fx.seq(c(fx.integer))),
        fx.key(fx.list(c(fx.integer))),
    ]
}

#[test]
fn sort_places_subtypes_before_supertypes() {
    let fx = Fixture::new();
    let ord = KeyOrdering::new(&fx.store);
    let mut keys = sample(&fx);
    ord.sort(&mut keys).unwrap();
    let texts: Vec<&str> = keys.iter().map(Key::as_str).collect();
    assert_eq!(
        texts,
        [
            "IntList",
            "ArrayList<Integer>",
            "Sequence<Integer>",
            "Sequence<? extends Number>",
            "Text",
            "Object",
        ]
    );
}

#[test]
fn sort_is_independent_of_input_order() {
    let fx = Fixture::new();
    let ord = KeyOrdering::new(&fx.store);
    let mut forward = sample(&fx);
    let mut backward = sample(&fx);
    backward.reverse();
    let mut rotated = sample(&fx);
    rotated.rotate_left(2);

    ord.sort(&mut forward).unwrap();
    ord.sort(&mut backward).unwrap();
    ord.sort(&mut rotated).unwrap();
    assert_eq!(forward, backward);
    assert_eq!(forward, rotated);
}

#[test]
fn sorted_output_never_puts_a_supertype_first() {
    let fx = Fixture::new();
    let ord = KeyOrdering::new(&fx.store);
    let mut keys = sample(&fx);
    ord.sort(&mut keys).unwrap();
    for (i, earlier) in keys.iter().enumerate() {
        for later in &keys[i + 1..] {
            assert!(
                !ord.is_more_specific(later, earlier).unwrap(),
                "{later} should precede {earlier}"
            );
        }
    }
}

#[test]
fn most_specific_picks_the_most_derived() {
    let fx = Fixture::new();
    let ord = KeyOrdering::new(&fx.store);
    let keys = sample(&fx);
    let best = ord.most_specific(&keys).unwrap().unwrap();
    assert_eq!(best.as_str(), "IntList");
    let empty: Vec<Key> = Vec::new();
    assert!(ord.most_specific(&empty).unwrap().is_none());
}

#[test]
fn same_named_unrelated_keys_still_order_apart() {
    let fx = Fixture::new();
    let first = fx.store.declare_class("Node", &[]);
    let second = fx.store.declare_class("Node", &[]);
    let a = fx.key(c(first));
    let b = fx.key(c(second));
    assert_eq!(a.as_str(), b.as_str());
    assert_ne!(a, b);

    let ord = KeyOrdering::new(&fx.store);
    assert_eq!(ord.compare(&a, &b).unwrap(), Ordering::Less);
    assert_eq!(ord.compare(&b, &a).unwrap(), Ordering::Greater);

    let mut keys = vec![b.clone(), a.clone()];
    ord.sort(&mut keys).unwrap();
    assert_eq!(keys, [a, b]);
}
