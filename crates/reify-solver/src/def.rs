//! Definition identifiers and storage for the solver.
//!
//! This module provides a solver-owned nominal identity (`DefId`) and an
//! in-memory declaration table (`DefinitionStore`) that implements the
//! [`TypeHierarchy`] adapter. An ingestion adapter that reads a host's own
//! declaration reflection populates the store once; the engine only ever
//! reads it.
//!
//! Supertypes are registered separately from the class itself so that
//! self-referential hierarchies can be declared:
//!
//! ```ignore
//! let store = DefinitionStore::new();
//! let comparable = store.declare_interface("Comparable", &["T"]);
//! let integer = store.declare_class("Integer", &[]);
//! store.set_supertypes(integer, vec![
//!     TypeDescriptor::parameterized(comparable, [TypeDescriptor::concrete(integer)]),
//! ]);
//! ```

use crate::hierarchy::TypeHierarchy;
use crate::types::{GenericDecl, TypeDescriptor, TypeList, TypeVarRef};
use dashmap::DashMap;
use reify_common::{Atom, ShardedInterner};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use tracing::trace;

/// Global counter for assigning unique instance IDs to `DefinitionStore` instances.
static NEXT_INSTANCE_ID: AtomicU64 = AtomicU64::new(1);

// =============================================================================
// DefId - Nominal Identity
// =============================================================================

/// Solver-owned nominal identity of a class or interface.
///
/// `DefId`s are only meaningful relative to the store that allocated them.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DefId(pub u32);

impl DefId {
    /// Sentinel value for invalid `DefId`.
    pub const INVALID: Self = Self(0);

    /// First valid `DefId`.
    pub const FIRST_VALID: u32 = 1;

    pub const fn is_valid(self) -> bool {
        self.0 >= Self::FIRST_VALID
    }
}

/// Kind of nominal declaration.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DefKind {
    Class,
    Interface,
}

// =============================================================================
// Declarations
// =============================================================================

/// A declared type parameter and its upper bounds.
///
/// Bounds may mention the parameter itself (`T extends Comparable<? super T>`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeParamInfo {
    pub name: Atom,
    pub bounds: TypeList,
}

impl TypeParamInfo {
    pub fn new(name: Atom) -> Self {
        Self {
            name,
            bounds: TypeList::new(),
        }
    }

    pub fn with_bounds(mut self, bounds: impl IntoIterator<Item = TypeDescriptor>) -> Self {
        self.bounds = bounds.into_iter().collect();
        self
    }
}

/// Everything the engine needs to know about one nominal declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassInfo {
    pub kind: DefKind,

    /// Name used in canonical text forms.
    pub name: Atom,

    /// Declared type parameters, in declaration order.
    pub type_params: Vec<TypeParamInfo>,

    /// Declared supertype shapes (superclass first, then interfaces). May
    /// reference this declaration's own type variables.
    pub supertypes: Vec<TypeDescriptor>,

    /// Enclosing declaration for inner types whose shape carries an owner.
    pub enclosing: Option<DefId>,
}

impl ClassInfo {
    pub fn class(name: Atom, type_params: Vec<TypeParamInfo>) -> Self {
        Self {
            kind: DefKind::Class,
            name,
            type_params,
            supertypes: Vec::new(),
            enclosing: None,
        }
    }

    pub fn interface(name: Atom, type_params: Vec<TypeParamInfo>) -> Self {
        Self {
            kind: DefKind::Interface,
            ..Self::class(name, type_params)
        }
    }

    pub fn with_supertypes(mut self, supertypes: Vec<TypeDescriptor>) -> Self {
        self.supertypes = supertypes;
        self
    }

    pub const fn with_enclosing(mut self, enclosing: DefId) -> Self {
        self.enclosing = Some(enclosing);
        self
    }

    pub fn arity(&self) -> usize {
        self.type_params.len()
    }

    pub fn type_param(&self, name: Atom) -> Option<&TypeParamInfo> {
        self.type_params.iter().find(|p| p.name == name)
    }
}

// =============================================================================
// DefinitionStore
// =============================================================================

/// Thread-safe storage for nominal declarations.
///
/// Uses `DashMap` so ingestion and lookups may run from multiple threads.
/// Entries are `Arc<ClassInfo>` snapshots: an update replaces the snapshot,
/// and readers holding the old one keep a consistent view.
pub struct DefinitionStore {
    /// Unique instance ID for debugging
    instance_id: u64,

    names: ShardedInterner,

    /// `DefId` -> declaration
    definitions: DashMap<DefId, Arc<ClassInfo>>,

    /// Declared name -> `DefId`
    by_name: DashMap<Atom, DefId>,

    /// (declaring class, method name) -> method type parameters
    method_params: DashMap<(DefId, Atom), Arc<[TypeParamInfo]>>,

    next_id: AtomicU32,

    /// Root class; `DefId::INVALID` until declared.
    root: AtomicU32,
}

impl Default for DefinitionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DefinitionStore {
    pub fn new() -> Self {
        let instance_id = NEXT_INSTANCE_ID.fetch_add(1, Ordering::SeqCst);
        trace!(instance_id, "DefinitionStore::new");
        Self {
            instance_id,
            names: ShardedInterner::new(),
            definitions: DashMap::new(),
            by_name: DashMap::new(),
            method_params: DashMap::new(),
            next_id: AtomicU32::new(DefId::FIRST_VALID),
            root: AtomicU32::new(DefId::INVALID.0),
        }
    }

    pub fn intern(&self, name: &str) -> Atom {
        self.names.intern(name)
    }

    fn allocate(&self) -> DefId {
        DefId(self.next_id.fetch_add(1, Ordering::SeqCst))
    }

    /// Register a new declaration and return its `DefId`.
    ///
    /// A later registration under the same name shadows the earlier one for
    /// [`lookup`](Self::lookup); both `DefId`s stay valid.
    pub fn register(&self, info: ClassInfo) -> DefId {
        let id = self.allocate();
        trace!(
            instance_id = self.instance_id,
            def_id = id.0,
            kind = ?info.kind,
            arity = info.arity(),
            "DefinitionStore::register"
        );
        self.by_name.insert(info.name, id);
        self.definitions.insert(id, Arc::new(info));
        id
    }

    /// Register a class whose type parameters are unbounded.
    pub fn declare_class(&self, name: &str, type_params: &[&str]) -> DefId {
        let info = ClassInfo::class(self.intern(name), self.params(type_params));
        self.register(info)
    }

    /// Register an interface whose type parameters are unbounded.
    pub fn declare_interface(&self, name: &str, type_params: &[&str]) -> DefId {
        let info = ClassInfo::interface(self.intern(name), self.params(type_params));
        self.register(info)
    }

    fn params(&self, names: &[&str]) -> Vec<TypeParamInfo> {
        names
            .iter()
            .map(|n| TypeParamInfo::new(self.intern(n)))
            .collect()
    }

    fn update(&self, id: DefId, f: impl FnOnce(&mut ClassInfo)) -> bool {
        match self.definitions.get_mut(&id) {
            Some(mut entry) => {
                f(Arc::make_mut(entry.value_mut()));
                true
            }
            None => false,
        }
    }

    /// Replace the declared supertypes. Returns `false` for an unknown `DefId`.
    pub fn set_supertypes(&self, id: DefId, supertypes: Vec<TypeDescriptor>) -> bool {
        trace!(def_id = id.0, count = supertypes.len(), "set_supertypes");
        self.update(id, |info| info.supertypes = supertypes)
    }

    /// Replace the bounds of one declared type parameter.
    pub fn set_param_bounds(
        &self,
        id: DefId,
        param: &str,
        bounds: impl IntoIterator<Item = TypeDescriptor>,
    ) -> bool {
        let Some(name) = self.names.lookup(param) else {
            return false;
        };
        let bounds: TypeList = bounds.into_iter().collect();
        let mut found = false;
        let known = self.update(id, |info| {
            if let Some(p) = info.type_params.iter_mut().find(|p| p.name == name) {
                p.bounds = bounds;
                found = true;
            }
        });
        known && found
    }

    /// Declare the class every other class derives from (`Object`).
    pub fn set_root(&self, id: DefId) -> bool {
        if !self.contains(id) {
            return false;
        }
        self.root.store(id.0, Ordering::SeqCst);
        true
    }

    pub fn set_enclosing(&self, id: DefId, enclosing: DefId) -> bool {
        self.update(id, |info| info.enclosing = Some(enclosing))
    }

    /// Declare the type parameters of a generic method.
    pub fn declare_method_type_params(
        &self,
        owner: DefId,
        method: Atom,
        params: Vec<TypeParamInfo>,
    ) {
        trace!(def_id = owner.0, count = params.len(), "declare_method_type_params");
        self.method_params.insert((owner, method), params.into());
    }

    pub fn get(&self, id: DefId) -> Option<Arc<ClassInfo>> {
        self.definitions.get(&id).map(|r| Arc::clone(r.value()))
    }

    pub fn contains(&self, id: DefId) -> bool {
        self.definitions.contains_key(&id)
    }

    /// Find a declaration by its registered name.
    pub fn lookup(&self, name: &str) -> Option<DefId> {
        let atom = self.names.lookup(name)?;
        self.by_name.get(&atom).map(|r| *r.value())
    }

    /// Reference to a class type parameter, by name.
    pub fn class_var(&self, id: DefId, name: &str) -> Option<TypeVarRef> {
        let atom = self.names.lookup(name)?;
        self.get(id)?.type_param(atom)?;
        Some(TypeVarRef::new(GenericDecl::Class(id), atom))
    }

    /// Descriptor for a class type parameter, by name.
    pub fn var(&self, id: DefId, name: &str) -> Option<TypeDescriptor> {
        self.class_var(id, name).map(TypeDescriptor::Var)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

impl TypeHierarchy for DefinitionStore {
    fn class_info(&self, def: DefId) -> Option<Arc<ClassInfo>> {
        self.get(def)
    }

    fn method_type_params(&self, owner: DefId, method: Atom) -> Option<Arc<[TypeParamInfo]>> {
        self.method_params
            .get(&(owner, method))
            .map(|r| Arc::clone(r.value()))
    }

    fn resolve_name(&self, name: Atom) -> Arc<str> {
        self.names.resolve(name)
    }

    fn root_class(&self) -> Option<DefId> {
        Some(DefId(self.root.load(Ordering::SeqCst))).filter(|id| id.is_valid())
    }
}

#[cfg(test)]
#[path = "../tests/def_tests.rs"]
mod tests;
