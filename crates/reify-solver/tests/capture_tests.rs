use super::*;
use crate::fixtures::{Fixture, c};

#[test]
fn captures_fixed_argument() {
    let fx = Fixture::new();
    let key = capture_type_argument(&fx.store, fx.text_list_token, fx.type_literal).unwrap();
    assert_eq!(key, fx.key(fx.seq(c(fx.text))));
    assert_eq!(key.as_str(), "Sequence<Text>");
}

#[test]
fn raw_extension_is_missing_parameter() {
    let fx = Fixture::new();
    let err = capture_type_argument(&fx.store, fx.raw_token, fx.type_literal).unwrap_err();
    assert_eq!(
        err,
        ReflectError::MissingTypeParameter {
            declaration: "RawToken".into(),
            capture_base: "TypeLiteral".into(),
        }
    );
}

#[test]
fn generic_capturing_class_does_not_fix_argument() {
    let fx = Fixture::new();
    let err = capture_type_argument(&fx.store, fx.generic_token, fx.type_literal).unwrap_err();
    assert!(matches!(err, ReflectError::MissingTypeParameter { .. }));
}

#[test]
fn base_must_be_an_immediate_supertype() {
    let fx = Fixture::new();
    let err = capture_type_argument(&fx.store, fx.text, fx.type_literal).unwrap_err();
    assert!(matches!(err, ReflectError::MissingTypeParameter { .. }));

    // IntList reaches Sequence only through ArrayList.
    let err = capture_type_argument(&fx.store, fx.int_list, fx.sequence).unwrap_err();
    assert!(matches!(err, ReflectError::MissingTypeParameter { .. }));
}

#[test]
fn unknown_capturing_class() {
    let fx = Fixture::new();
    let err = capture_type_argument(&fx.store, DefId(31_337), fx.type_literal).unwrap_err();
    assert_eq!(err, ReflectError::UnknownDefinition(31_337));
}
