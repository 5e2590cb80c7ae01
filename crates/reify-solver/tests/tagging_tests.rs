use super::*;
use crate::fixtures::{Fixture, c};

#[test]
fn tag_survives_json() {
    let fx = Fixture::new();
    let key = fx.key(fx.map(c(fx.text), fx.seq(TypeDescriptor::extends(c(fx.number)))));
    let tag = KeyTag::new(&key);
    let json = serde_json::to_string(&tag).unwrap();
    let back: KeyTag = serde_json::from_str(&json).unwrap();
    assert_eq!(back, tag);
    assert_eq!(back.text, "Mapping<Text, Sequence<? extends Number>>");
    assert!(back.verify(&key).is_ok());
    assert_eq!(back.to_key(&fx.store).unwrap(), key);
}

#[test]
fn mismatched_tag_is_rejected_with_both_texts() {
    let fx = Fixture::new();
    let written = fx.key(fx.seq(c(fx.integer)));
    let expected = fx.key(fx.seq(c(fx.number)));
    let err = KeyTag::from(&written).verify(&expected).unwrap_err();
    assert_eq!(
        err,
        ReflectError::TagMismatch {
            expected: "Sequence<Number>".into(),
            recorded: "Sequence<Integer>".into(),
        }
    );
}

#[test]
fn verification_is_structural_not_assignability() {
    let fx = Fixture::new();
    // ArrayList<Integer> may be cast to Sequence<Integer>, but a stream that
    // recorded one is not a stream of the other.
    let written = fx.key(fx.list(c(fx.integer)));
    let expected = fx.key(fx.seq(c(fx.integer)));
    assert!(expected.is_assignable_from(&fx.store, &written).unwrap());
    assert!(KeyTag::new(&written).verify(&expected).is_err());
}

#[test]
fn tag_against_foreign_store_is_revalidated() {
    let fx = Fixture::new();
    let key = fx.key(fx.seq(c(fx.text)));
    let tag = KeyTag::new(&key);

    let empty = crate::def::DefinitionStore::new();
    assert!(tag.to_key(&empty).is_err());
}
