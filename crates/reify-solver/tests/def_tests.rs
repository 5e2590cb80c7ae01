use super::*;

#[test]
fn def_ids_start_at_first_valid() {
    let store = DefinitionStore::new();
    assert!(store.is_empty());
    let a = store.declare_class("A", &[]);
    let b = store.declare_interface("B", &["T"]);
    assert_eq!(a.0, DefId::FIRST_VALID);
    assert_eq!(b.0, DefId::FIRST_VALID + 1);
    assert!(a.is_valid());
    assert!(!DefId::INVALID.is_valid());
    assert_eq!(store.len(), 2);
}

#[test]
fn declared_info_round_trips() {
    let store = DefinitionStore::new();
    let map = store.declare_interface("Mapping", &["K", "V"]);
    let info = store.get(map).unwrap();
    assert_eq!(info.kind, DefKind::Interface);
    assert_eq!(info.arity(), 2);
    assert_eq!(&*store.resolve_name(info.name), "Mapping");
    assert_eq!(&*store.resolve_name(info.type_params[1].name), "V");
    assert!(info.supertypes.is_empty());
    assert_eq!(info.enclosing, None);
}

#[test]
fn lookup_by_name() {
    let store = DefinitionStore::new();
    let text = store.declare_class("Text", &[]);
    assert_eq!(store.lookup("Text"), Some(text));
    assert_eq!(store.lookup("Missing"), None);
}

#[test]
fn later_registration_shadows_name() {
    let store = DefinitionStore::new();
    let first = store.declare_class("Node", &[]);
    let second = store.declare_class("Node", &["T"]);
    assert_eq!(store.lookup("Node"), Some(second));
    assert!(store.contains(first));
}

#[test]
fn set_supertypes_replaces_snapshot() {
    let store = DefinitionStore::new();
    let object = store.declare_class("Object", &[]);
    let text = store.declare_class("Text", &[]);
    let before = store.get(text).unwrap();
    assert!(store.set_supertypes(text, vec![TypeDescriptor::concrete(object)]));
    // Readers holding the old snapshot keep their view.
    assert!(before.supertypes.is_empty());
    assert_eq!(
        store.get(text).unwrap().supertypes,
        vec![TypeDescriptor::concrete(object)]
    );
    assert!(!store.set_supertypes(DefId(999), Vec::new()));
}

#[test]
fn set_param_bounds_targets_named_parameter() {
    let store = DefinitionStore::new();
    let number = store.declare_class("Number", &[]);
    let holder = store.declare_class("Holder", &["N"]);
    assert!(store.set_param_bounds(holder, "N", [TypeDescriptor::concrete(number)]));
    assert!(!store.set_param_bounds(holder, "Missing", []));

    let var = store.class_var(holder, "N").unwrap();
    assert_eq!(
        store.type_var_bounds(&var).unwrap().as_slice(),
        &[TypeDescriptor::concrete(number)]
    );
}

#[test]
fn class_var_requires_declared_parameter() {
    let store = DefinitionStore::new();
    let seq = store.declare_interface("Sequence", &["E"]);
    let plain = store.declare_class("Plain", &[]);
    assert!(store.class_var(seq, "E").is_some());
    assert!(store.class_var(plain, "E").is_none());
    assert_eq!(
        store.var(seq, "E"),
        Some(TypeDescriptor::Var(TypeVarRef::new(
            GenericDecl::Class(seq),
            store.intern("E")
        )))
    );
}

#[test]
fn method_type_params_are_visible_through_hierarchy() {
    let store = DefinitionStore::new();
    let number = store.declare_class("Number", &[]);
    let util = store.declare_class("Util", &[]);
    let method = store.intern("max");
    let t = store.intern("T");
    store.declare_method_type_params(
        util,
        method,
        vec![TypeParamInfo::new(t).with_bounds([TypeDescriptor::concrete(number)])],
    );
    let var = TypeVarRef::new(GenericDecl::Method(util, method), t);
    assert_eq!(
        store.type_var_bounds(&var).unwrap().as_slice(),
        &[TypeDescriptor::concrete(number)]
    );
    assert!(store.method_type_params(util, store.intern("min")).is_none());
}

#[test]
fn concurrent_registration_allocates_distinct_ids() {
    use rayon::prelude::*;

    let store = DefinitionStore::new();
    let ids: Vec<DefId> = (0..64)
        .into_par_iter()
        .map(|i| store.declare_class(&format!("C{i}"), &[]))
        .collect();
    let unique: rustc_hash::FxHashSet<_> = ids.iter().copied().collect();
    assert_eq!(unique.len(), 64);
    assert_eq!(store.len(), 64);
}

#[test]
fn root_class_is_declared_explicitly() {
    let store = DefinitionStore::new();
    let object = store.declare_class("Object", &[]);
    assert_eq!(store.root_class(), None);
    assert!(!store.set_root(DefId(404)));
    assert!(store.set_root(object));
    assert_eq!(store.root_class(), Some(object));
}
