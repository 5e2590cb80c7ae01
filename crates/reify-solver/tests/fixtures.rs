//! A small host hierarchy shared by the unit tests.
//!
//! ```text
//! Object
//! Comparable<T>                       : Object
//! Number                              : Object
//! Integer                             : Number, Comparable<Integer>
//! PositiveInteger                     : Integer
//! Text                                : Object, Comparable<Text>
//! Blob                                : Object
//! Iterable<E>                         : Object
//! Sequence<E>                         : Iterable<E>
//! ArrayList<E>                        : Object, Sequence<E>
//! IntList                             : ArrayList<Integer>
//! Mapping<K, V>                       : Object
//! HashMapping<K, V>                   : Object, Mapping<K, V>
//! Inverse<A, B>                       : HashMapping<B, A>
//! SortedBag<T extends Comparable<? super T>> : Object, Sequence<T>
//! NumberBox<N extends Number>         : Object
//! Outer<T>                            : Object
//! Outer<T>.Inner<U>                   : Object
//! TypeLiteral<T>                      : Object
//! TextListToken                       : TypeLiteral<Sequence<Text>>
//! RawToken                            : TypeLiteral
//! GenericToken<X>                     : TypeLiteral<X>
//! ```

use crate::def::{DefId, DefinitionStore};
use crate::key::Key;
use crate::types::TypeDescriptor;

pub(crate) struct Fixture {
    pub store: DefinitionStore,
    pub object: DefId,
    pub comparable: DefId,
    pub number: DefId,
    pub integer: DefId,
    pub positive: DefId,
    pub text: DefId,
    pub blob: DefId,
    pub iterable: DefId,
    pub sequence: DefId,
    pub array_list: DefId,
    pub int_list: DefId,
    pub mapping: DefId,
    pub hash_mapping: DefId,
    pub inverse: DefId,
    pub sorted_bag: DefId,
    pub number_box: DefId,
    pub outer: DefId,
    pub inner: DefId,
    pub type_literal: DefId,
    pub text_list_token: DefId,
    pub raw_token: DefId,
    pub generic_token: DefId,
}

pub(crate) fn c(def: DefId) -> TypeDescriptor {
    TypeDescriptor::concrete(def)
}

pub(crate) fn p<const N: usize>(def: DefId, args: [TypeDescriptor; N]) -> TypeDescriptor {
    TypeDescriptor::parameterized(def, args)
}

impl Fixture {
    pub fn new() -> Self {
        let store = DefinitionStore::new();
        let object = store.declare_class("Object", &[]);
        let comparable = store.declare_interface("Comparable", &["T"]);
        let number = store.declare_class("Number", &[]);
        let integer = store.declare_class("Integer", &[]);
        let positive = store.declare_class("PositiveInteger", &[]);
        let text = store.declare_class("Text", &[]);
        let blob = store.declare_class("Blob", &[]);
        let iterable = store.declare_interface("Iterable", &["E"]);
        let sequence = store.declare_interface("Sequence", &["E"]);
        let array_list = store.declare_class("ArrayList", &["E"]);
        let int_list = store.declare_class("IntList", &[]);
        let mapping = store.declare_interface("Mapping", &["K", "V"]);
        let hash_mapping = store.declare_class("HashMapping", &["K", "V"]);
        let inverse = store.declare_class("Inverse", &["A", "B"]);
        let sorted_bag = store.declare_class("SortedBag", &["T"]);
        let number_box = store.declare_class("NumberBox", &["N"]);
        let outer = store.declare_class("Outer", &["T"]);
        let inner = store.declare_class("Inner", &["U"]);
        let type_literal = store.declare_class("TypeLiteral", &["T"]);
        let text_list_token = store.declare_class("TextListToken", &[]);
        let raw_token = store.declare_class("RawToken", &[]);
        let generic_token = store.declare_class("GenericToken", &["X"]);

        let var = |def: DefId, name: &str| store.var(def, name).unwrap();

        store.set_root(object);

        store.set_supertypes(comparable, vec![c(object)]);
        store.set_supertypes(number, vec![c(object)]);
        store.set_supertypes(integer, vec![c(number), p(comparable, [c(integer)])]);
        store.set_supertypes(positive, vec![c(integer)]);
        store.set_supertypes(text, vec![c(object), p(comparable, [c(text)])]);
        store.set_supertypes(blob, vec![c(object)]);
        store.set_supertypes(iterable, vec![c(object)]);
        store.set_supertypes(sequence, vec![p(iterable, [var(sequence, "E")])]);
        store.set_supertypes(
            array_list,
            vec![c(object), p(sequence, [var(array_list, "E")])],
        );
        store.set_supertypes(int_list, vec![p(array_list, [c(integer)])]);
        store.set_supertypes(mapping, vec![c(object)]);
        store.set_supertypes(
            hash_mapping,
            vec![
                c(object),
                p(mapping, [var(hash_mapping, "K"), var(hash_mapping, "V")]),
            ],
        );
        store.set_supertypes(
            inverse,
            vec![p(hash_mapping, [var(inverse, "B"), var(inverse, "A")])],
        );

        let t = var(sorted_bag, "T");
        store.set_param_bounds(
            sorted_bag,
            "T",
            [p(comparable, [TypeDescriptor::super_of(t.clone())])],
        );
        store.set_supertypes(sorted_bag, vec![c(object), p(sequence, [t])]);

        store.set_param_bounds(number_box, "N", [c(number)]);
        store.set_supertypes(number_box, vec![c(object)]);

        store.set_supertypes(outer, vec![c(object)]);
        store.set_enclosing(inner, outer);
        store.set_supertypes(inner, vec![c(object)]);

        store.set_supertypes(type_literal, vec![c(object)]);
        store.set_supertypes(
            text_list_token,
            vec![p(type_literal, [p(sequence, [c(text)])])],
        );
        store.set_supertypes(raw_token, vec![c(type_literal)]);
        store.set_supertypes(
            generic_token,
            vec![p(type_literal, [var(generic_token, "X")])],
        );

        Self {
            store,
            object,
            comparable,
            number,
            integer,
            positive,
            text,
            blob,
            iterable,
            sequence,
            array_list,
            int_list,
            mapping,
            hash_mapping,
            inverse,
            sorted_bag,
            number_box,
            outer,
            inner,
            type_literal,
            text_list_token,
            raw_token,
            generic_token,
        }
    }

    pub fn var(&self, def: DefId, name: &str) -> TypeDescriptor {
        self.store.var(def, name).unwrap()
    }

    pub fn key(&self, descriptor: TypeDescriptor) -> Key {
        Key::of(&self.store, descriptor).unwrap()
    }

    /// `Sequence<arg>`
    pub fn seq(&self, arg: TypeDescriptor) -> TypeDescriptor {
        p(self.sequence, [arg])
    }

    /// `ArrayList<arg>`
    pub fn list(&self, arg: TypeDescriptor) -> TypeDescriptor {
        p(self.array_list, [arg])
    }

    /// `Mapping<k, v>`
    pub fn map(&self, k: TypeDescriptor, v: TypeDescriptor) -> TypeDescriptor {
        p(self.mapping, [k, v])
    }

    /// `HashMapping<k, v>`
    pub fn hash_map(&self, k: TypeDescriptor, v: TypeDescriptor) -> TypeDescriptor {
        p(self.hash_mapping, [k, v])
    }

    /// `Outer<t>.Inner<u>`
    pub fn inner_of(&self, t: TypeDescriptor, u: TypeDescriptor) -> TypeDescriptor {
        TypeDescriptor::owned_parameterized(p(self.outer, [t]), self.inner, [u])
    }
}
