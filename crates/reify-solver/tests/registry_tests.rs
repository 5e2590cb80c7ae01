use super::*;
use crate::error::ReflectError;
use crate::fixtures::{Fixture, c};
use crate::types::TypeDescriptor;
use rayon::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};

#[test]
fn register_and_get_last_writer_wins() {
    let fx = Fixture::new();
    let registry = KeyRegistry::new();
    let key = fx.key(fx.seq(c(fx.text)));
    assert!(registry.register(key.clone(), "first").is_none());
    assert_eq!(registry.register(key.clone(), "second").as_deref(), Some(&"first"));
    assert_eq!(registry.get(&key).as_deref(), Some(&"second"));
    assert_eq!(registry.len(), 1);
}

#[test]
fn structurally_equal_keys_share_an_entry() {
    let fx = Fixture::new();
    let registry = KeyRegistry::new();
    registry.register(fx.key(fx.map(c(fx.text), c(fx.integer))), 7);
    let rebuilt = fx.key(fx.map(c(fx.text), c(fx.integer)));
    assert!(registry.contains(&rebuilt));
    assert_eq!(registry.get(&rebuilt).as_deref(), Some(&7));
}

#[test]
fn get_or_insert_with_populates_once_under_contention() {
    let fx = Fixture::new();
    let registry = KeyRegistry::new();
    let key = fx.key(fx.list(c(fx.integer)));
    let calls = AtomicUsize::new(0);

    let values: Vec<usize> = (0..64)
        .into_par_iter()
        .map(|_| {
            *registry.get_or_insert_with(key.clone(), || {
                calls.fetch_add(1, Ordering::SeqCst);
                99
            })
        })
        .collect();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(values.iter().all(|v| *v == 99));
    assert_eq!(registry.len(), 1);
}

#[test]
fn failed_initializer_leaves_no_entry() {
    let fx = Fixture::new();
    let registry: KeyRegistry<u32> = KeyRegistry::new();
    let key = fx.key(c(fx.text));
    let err = registry
        .get_or_try_insert_with(key.clone(), || {
            Err(ReflectError::UnknownDefinition(1))
        })
        .unwrap_err();
    assert_eq!(err, ReflectError::UnknownDefinition(1));
    assert!(registry.is_empty());

    let value = registry.get_or_try_insert_with(key.clone(), || Ok(5)).unwrap();
    assert_eq!(*value, 5);
    let again = registry.get_or_try_insert_with(key, || Ok(6)).unwrap();
    assert_eq!(*again, 5);
}

#[test]
fn resolve_prefers_exact_match() {
    let fx = Fixture::new();
    let registry = KeyRegistry::new();
    let seq = fx.key(fx.seq(c(fx.integer)));
    registry.register(seq.clone(), "sequence");
    registry.register(fx.key(fx.list(c(fx.integer))), "list");

    let (key, value) = registry.resolve(&fx.store, &seq).unwrap().unwrap();
    assert_eq!(key, seq);
    assert_eq!(*value, "sequence");
}

#[test]
fn resolve_picks_most_derived_assignable_entry() {
    let fx = Fixture::new();
    let registry = KeyRegistry::new();
    registry.register(fx.key(c(fx.object)), "object");
    registry.register(fx.key(fx.seq(c(fx.integer))), "sequence");
    registry.register(fx.key(fx.list(c(fx.integer))), "list");
    registry.register(fx.key(fx.seq(c(fx.text))), "texts");

    let required = fx.key(fx.seq(TypeDescriptor::extends(c(fx.number))));
    let (key, value) = registry.resolve(&fx.store, &required).unwrap().unwrap();
    assert_eq!(key.as_str(), "ArrayList<Integer>");
    assert_eq!(*value, "list");

    let unrelated = fx.key(c(fx.blob));
    assert!(registry.resolve(&fx.store, &unrelated).unwrap().is_none());
}

#[test]
fn keys_remove_and_clear() {
    let fx = Fixture::new();
    let registry = KeyRegistry::new();
    let text = fx.key(c(fx.text));
    registry.register(text.clone(), ());
    registry.register(fx.key(c(fx.integer)), ());
    registry.register(fx.key(c(fx.blob)), ());

    let texts: Vec<String> = registry.keys().iter().map(ToString::to_string).collect();
    assert_eq!(texts, ["Blob", "Integer", "Text"]);

    assert!(registry.remove(&text).is_some());
    assert!(registry.remove(&text).is_none());
    assert_eq!(registry.len(), 2);
    registry.clear();
    assert!(registry.is_empty());
}

#[test]
fn concurrent_registration_and_lookup() {
    let fx = Fixture::new();
    let registry = KeyRegistry::new();
    let keys: Vec<Key> = [fx.text, fx.integer, fx.number, fx.blob, fx.object]
        .iter()
        .map(|def| fx.key(c(*def)))
        .collect();

    (0..200).into_par_iter().for_each(|i| {
        let key = &keys[i % keys.len()];
        registry.register(key.clone(), i);
        assert!(registry.get(key).is_some());
    });
    assert_eq!(registry.len(), keys.len());
}
