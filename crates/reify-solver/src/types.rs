//! Generic type descriptors.
//!
//! A `TypeDescriptor` is the structural shape of a generic type, independent
//! of any host declaration handle. The variant set is closed: every algorithm
//! in this crate matches it exhaustively.
//!
//! - `Concrete(DefId)`: a bare nominal type (`Text`, or the raw `Sequence`)
//! - `Parameterized`: `Owner<..>.Name<Arg1, Arg2>`
//! - `Var`: a reference to a declared type variable
//! - `Wildcard`: `?`, `? extends U`, `? super L`
//!
//! Children live behind `Arc`, so cloning a descriptor is cheap and the
//! actualizer can share unchanged subtrees between input and output.
//!
//! Equality and hashing are structural. Type variables compare by declaring
//! context and name only; their bounds live in the declaring
//! `TypeHierarchy`, which keeps self-referential bounds such as
//! `T extends Comparable<? super T>` finite.

use crate::def::DefId;
use reify_common::Atom;
use rustc_hash::FxHasher;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Ordered descriptor list used for type arguments and bounds.
pub type TypeList = SmallVec<[TypeDescriptor; 2]>;

/// The declaration that introduces a type variable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GenericDecl {
    /// A class or interface type parameter.
    Class(DefId),
    /// A method type parameter: declaring class plus method name.
    Method(DefId, Atom),
}

impl GenericDecl {
    /// The class that (directly or through a method) declares the variable.
    pub const fn owner(self) -> DefId {
        match self {
            Self::Class(def) | Self::Method(def, _) => def,
        }
    }
}

/// Identity of a declared type variable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeVarRef {
    pub decl: GenericDecl,
    pub name: Atom,
}

impl TypeVarRef {
    pub const fn new(decl: GenericDecl, name: Atom) -> Self {
        Self { decl, name }
    }
}

/// `Owner<..>.Raw<Args..>`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParameterizedType {
    pub owner: Option<TypeDescriptor>,
    pub raw: DefId,
    pub args: TypeList,
}

/// Wildcard bounds.
///
/// Bounds are sets: equality and hashing ignore their order.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WildcardType {
    pub lower: TypeList,
    pub upper: TypeList,
}

impl WildcardType {
    pub fn is_unbounded(&self) -> bool {
        self.lower.is_empty() && self.upper.is_empty()
    }
}

fn same_set(a: &[TypeDescriptor], b: &[TypeDescriptor]) -> bool {
    a.iter().all(|x| b.contains(x)) && b.iter().all(|x| a.contains(x))
}

fn set_hash<H: Hasher>(items: &[TypeDescriptor], state: &mut H) {
    // Order-independent: sum the per-element hashes of the distinct members.
    let mut acc = 0u64;
    for (i, item) in items.iter().enumerate() {
        if items[..i].contains(item) {
            continue;
        }
        let mut hasher = FxHasher::default();
        item.hash(&mut hasher);
        acc = acc.wrapping_add(hasher.finish());
    }
    state.write_u64(acc);
}

impl PartialEq for WildcardType {
    fn eq(&self, other: &Self) -> bool {
        same_set(&self.lower, &other.lower) && same_set(&self.upper, &other.upper)
    }
}

impl Eq for WildcardType {}

impl Hash for WildcardType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        set_hash(&self.lower, state);
        set_hash(&self.upper, state);
    }
}

/// Structural representation of a generic type shape.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeDescriptor {
    Concrete(DefId),
    Parameterized(Arc<ParameterizedType>),
    Var(TypeVarRef),
    Wildcard(Arc<WildcardType>),
}

impl TypeDescriptor {
    pub const fn concrete(def: DefId) -> Self {
        Self::Concrete(def)
    }

    pub fn parameterized(raw: DefId, args: impl IntoIterator<Item = TypeDescriptor>) -> Self {
        Self::Parameterized(Arc::new(ParameterizedType {
            owner: None,
            raw,
            args: args.into_iter().collect(),
        }))
    }

    pub fn owned_parameterized(
        owner: TypeDescriptor,
        raw: DefId,
        args: impl IntoIterator<Item = TypeDescriptor>,
    ) -> Self {
        Self::Parameterized(Arc::new(ParameterizedType {
            owner: Some(owner),
            raw,
            args: args.into_iter().collect(),
        }))
    }

    pub const fn var(decl: GenericDecl, name: Atom) -> Self {
        Self::Var(TypeVarRef { decl, name })
    }

    pub fn wildcard(
        lower: impl IntoIterator<Item = TypeDescriptor>,
        upper: impl IntoIterator<Item = TypeDescriptor>,
    ) -> Self {
        Self::Wildcard(Arc::new(WildcardType {
            lower: lower.into_iter().collect(),
            upper: upper.into_iter().collect(),
        }))
    }

    /// `? extends bound`
    pub fn extends(bound: TypeDescriptor) -> Self {
        Self::wildcard([], [bound])
    }

    /// `? super bound`
    pub fn super_of(bound: TypeDescriptor) -> Self {
        Self::wildcard([bound], [])
    }

    /// `?`
    pub fn unbounded() -> Self {
        Self::wildcard([], [])
    }

    /// Nominal identity of a `Concrete` or `Parameterized` descriptor.
    ///
    /// `None` for placeholders (`Var`, `Wildcard`), which have no identity
    /// until they are actualized.
    pub fn raw_identity(&self) -> Option<DefId> {
        match self {
            Self::Concrete(def) => Some(*def),
            Self::Parameterized(p) => Some(p.raw),
            Self::Var(_) | Self::Wildcard(_) => None,
        }
    }

    /// Own type arguments; empty unless `Parameterized`.
    pub fn type_args(&self) -> &[TypeDescriptor] {
        match self {
            Self::Parameterized(p) => &p.args,
            _ => &[],
        }
    }

    pub fn owner(&self) -> Option<&TypeDescriptor> {
        match self {
            Self::Parameterized(p) => p.owner.as_ref(),
            _ => None,
        }
    }

    pub fn as_var(&self) -> Option<&TypeVarRef> {
        match self {
            Self::Var(var) => Some(var),
            _ => None,
        }
    }

    pub fn as_wildcard(&self) -> Option<&WildcardType> {
        match self {
            Self::Wildcard(w) => Some(w),
            _ => None,
        }
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self, Self::Wildcard(_))
    }

    /// `true` if any type variable is reachable from this descriptor.
    pub fn has_type_vars(&self) -> bool {
        match self {
            Self::Concrete(_) => false,
            Self::Var(_) => true,
            Self::Parameterized(p) => {
                p.owner.as_ref().is_some_and(Self::has_type_vars)
                    || p.args.iter().any(Self::has_type_vars)
            }
            Self::Wildcard(w) => {
                w.lower.iter().any(Self::has_type_vars) || w.upper.iter().any(Self::has_type_vars)
            }
        }
    }

    /// `true` if the descriptor mentions `var` anywhere.
    pub fn mentions(&self, var: &TypeVarRef) -> bool {
        match self {
            Self::Concrete(_) => false,
            Self::Var(v) => v == var,
            Self::Parameterized(p) => {
                p.owner.as_ref().is_some_and(|o| o.mentions(var))
                    || p.args.iter().any(|a| a.mentions(var))
            }
            Self::Wildcard(w) => {
                w.lower.iter().any(|b| b.mentions(var)) || w.upper.iter().any(|b| b.mentions(var))
            }
        }
    }

    /// Resolved: has a nominal identity and no reachable type variables.
    pub fn is_resolved(&self) -> bool {
        self.raw_identity().is_some() && !self.has_type_vars()
    }

    /// Drop all type arguments, keeping the nominal identity.
    pub fn erase(&self) -> Option<Self> {
        self.raw_identity().map(Self::Concrete)
    }

    /// Deterministic structural hash (same input, same value, every run).
    pub fn structural_hash(&self) -> u64 {
        let mut hasher = FxHasher::default();
        self.hash(&mut hasher);
        hasher.finish()
    }
}

#[cfg(test)]
#[path = "../tests/types_tests.rs"]
mod tests;
