//! `Key`: an immutable, hashable handle over a resolved descriptor, and
//! `KeyBox`: a value paired with its Key, supporting checked downcasts.
//!
//! A Key is created once, when a caller fixes a generic shape, and never
//! changes afterwards. It carries the descriptor, its nominal identity, a
//! precomputed structural hash and its canonical text, so hashing and
//! display never walk the tree again. New shapes are always new Keys.

use crate::def::DefId;
use crate::error::{ReflectError, Result};
use crate::format::TypeFormatter;
use crate::hierarchy::{self, TypeHierarchy, require_class};
use crate::instantiate::{Bindings, actualize};
use crate::subtype::{SubtypeChecker, is_assignable};
use crate::types::{TypeDescriptor, TypeVarRef};
use std::any::Any;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use tracing::debug;

struct KeyData {
    descriptor: TypeDescriptor,
    raw: DefId,
    hash: u64,
    text: Arc<str>,
    partial: bool,
}

/// Immutable identity of a generic shape.
#[derive(Clone)]
pub struct Key(Arc<KeyData>);

impl Key {
    /// Freeze a fully resolved descriptor.
    ///
    /// Fails with `InvalidDescriptor` if the root is a placeholder, a type
    /// variable is reachable, an identity is unknown, or an arity is wrong.
    pub fn of(env: &dyn TypeHierarchy, descriptor: TypeDescriptor) -> Result<Self> {
        Self::freeze(env, descriptor, false)
    }

    /// Freeze an intentionally partial descriptor (for example a generic
    /// method's declared return shape). Type variables are allowed;
    /// identities and arities are still validated.
    pub fn template(env: &dyn TypeHierarchy, descriptor: TypeDescriptor) -> Result<Self> {
        Self::freeze(env, descriptor, true)
    }

    /// The bare (unparameterized) Key of a nominal identity.
    pub fn raw(env: &dyn TypeHierarchy, def: DefId) -> Result<Self> {
        Self::of(env, TypeDescriptor::Concrete(def))
    }

    /// `def<args..>`, binding the class's declared parameters in order.
    ///
    /// Arguments are bound positionally and checked against declared bounds.
    pub fn parameterized(
        env: &dyn TypeHierarchy,
        def: DefId,
        args: impl IntoIterator<Item = TypeDescriptor>,
    ) -> Result<Self> {
        let template = hierarchy::class_template(env, def)?;
        let descriptor = actualize(env, &template, &Bindings::queue(args))?;
        Self::of(env, descriptor)
    }

    fn freeze(env: &dyn TypeHierarchy, descriptor: TypeDescriptor, partial: bool) -> Result<Self> {
        let raw = hierarchy::require_raw(env, &descriptor)?;
        validate(env, &descriptor, partial)?;
        let text: Arc<str> = TypeFormatter::new(env).format(&descriptor).into();
        let partial = partial && descriptor.has_type_vars();
        Ok(Self(Arc::new(KeyData {
            hash: descriptor.structural_hash(),
            descriptor,
            raw,
            text,
            partial,
        })))
    }

    pub fn descriptor(&self) -> &TypeDescriptor {
        &self.0.descriptor
    }

    /// Denormalized nominal identity.
    pub fn raw_identity(&self) -> DefId {
        self.0.raw
    }

    pub fn type_arguments(&self) -> &[TypeDescriptor] {
        self.0.descriptor.type_args()
    }

    /// Canonical text form (`Mapping<Text, Sequence<Integer>>`).
    pub fn as_str(&self) -> &str {
        &self.0.text
    }

    /// `true` for a template Key that still mentions type variables.
    pub fn is_partial(&self) -> bool {
        self.0.partial
    }

    pub fn structural_hash(&self) -> u64 {
        self.0.hash
    }

    /// Substitute `bindings` into this Key's descriptor; the result must be
    /// fully resolved.
    pub fn actualize(&self, env: &dyn TypeHierarchy, bindings: &Bindings) -> Result<Self> {
        Self::of(env, actualize(env, self.descriptor(), bindings)?)
    }

    /// The bare Key of this Key's nominal identity.
    pub fn erase(&self, env: &dyn TypeHierarchy) -> Result<Self> {
        match self.0.descriptor {
            TypeDescriptor::Concrete(_) => Ok(self.clone()),
            _ => Self::raw(env, self.0.raw),
        }
    }

    /// This Key reinterpreted through the ancestor identity `ancestor`.
    pub fn supertype_key(&self, env: &dyn TypeHierarchy, ancestor: DefId) -> Result<Self> {
        require_class(env, ancestor)?;
        match hierarchy::as_supertype(env, self.descriptor(), ancestor)? {
            Some(descriptor) if descriptor == self.0.descriptor => Ok(self.clone()),
            Some(descriptor) => Self::freeze(env, descriptor, self.is_partial()),
            None => Err(ReflectError::NotASupertype {
                descriptor: self.as_str().to_owned(),
                ancestor: TypeFormatter::new(env).format(&TypeDescriptor::Concrete(ancestor)),
            }),
        }
    }

    /// `true` if a value keyed by `other` may be used where `self` is required.
    pub fn is_assignable_from(&self, env: &dyn TypeHierarchy, other: &Key) -> Result<bool> {
        if self == other {
            return Ok(true);
        }
        is_assignable(env, self.descriptor(), other.descriptor())
    }
}

/// Validate identities, arities and (unless `partial`) the absence of
/// reachable type variables.
fn validate(env: &dyn TypeHierarchy, descriptor: &TypeDescriptor, partial: bool) -> Result<()> {
    hierarchy::check_arity(env, descriptor)?;
    if partial {
        return Ok(());
    }
    match first_var(descriptor) {
        Some(var) => Err(ReflectError::invalid(
            TypeFormatter::new(env).format(descriptor),
            format!("unresolved type variable `{}`", env.resolve_name(var.name)),
        )),
        None => Ok(()),
    }
}

fn first_var(descriptor: &TypeDescriptor) -> Option<&TypeVarRef> {
    match descriptor {
        TypeDescriptor::Concrete(_) => None,
        TypeDescriptor::Var(var) => Some(var),
        TypeDescriptor::Parameterized(p) => p
            .owner
            .iter()
            .chain(&p.args)
            .find_map(first_var),
        TypeDescriptor::Wildcard(w) => w.lower.iter().chain(&w.upper).find_map(first_var),
    }
}

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
            || (self.0.hash == other.0.hash && self.0.descriptor == other.0.descriptor)
    }
}

impl Eq for Key {}

impl Hash for Key {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.0.hash);
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.text)
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Key({})", self.0.text)
    }
}

// =============================================================================
// KeyBox
// =============================================================================

/// A value paired with its Key.
///
/// The pairing is trusted: the constructor does not re-validate that the
/// value is an instance of the Key's identity. Casts, however, are checked.
#[derive(Clone, Debug)]
pub struct KeyBox<V> {
    key: Key,
    value: V,
}

/// A type-erased box, the usual currency across erasure boundaries.
pub type AnyBox = KeyBox<Arc<dyn Any + Send + Sync>>;

impl<V> KeyBox<V> {
    pub fn new(key: Key, value: V) -> Self {
        Self { key, value }
    }

    pub fn key(&self) -> &Key {
        &self.key
    }

    pub fn value(&self) -> &V {
        &self.value
    }

    pub fn into_value(self) -> V {
        self.value
    }

    pub fn into_parts(self) -> (Key, V) {
        (self.key, self.value)
    }

    /// Transform the value, keeping the Key. The caller vouches that the
    /// new value still matches it.
    pub fn map<U>(self, f: impl FnOnce(V) -> U) -> KeyBox<U> {
        KeyBox {
            key: self.key,
            value: f(self.value),
        }
    }

    /// Borrow the value as `target` iff `target` is assignable from this
    /// box's Key; otherwise `CastError` with both canonical texts.
    pub fn cast_ref(&self, env: &dyn TypeHierarchy, target: &Key) -> Result<&V> {
        if target.is_assignable_from(env, &self.key)? {
            return Ok(&self.value);
        }
        if let Ok(Some(reason)) =
            SubtypeChecker::new(env).explain_failure(target.descriptor(), self.key.descriptor())
        {
            debug!(?reason, "KeyBox::cast rejected");
        }
        Err(ReflectError::CastError {
            required: target.as_str().to_owned(),
            actual: self.key.as_str().to_owned(),
        })
    }

    /// Convert into a consuming cast; on failure the box is returned intact
    /// alongside the error.
    pub fn try_cast(
        self,
        env: &dyn TypeHierarchy,
        target: &Key,
    ) -> std::result::Result<Self, (Self, ReflectError)> {
        if let Err(err) = self.cast_ref(env, target).map(|_| ()) {
            return Err((self, err));
        }
        Ok(Self {
            key: target.clone(),
            value: self.value,
        })
    }
}

impl<V: Clone> KeyBox<V> {
    /// A new box holding the same value under `target`, iff the cast is
    /// allowed.
    pub fn cast(&self, env: &dyn TypeHierarchy, target: &Key) -> Result<Self> {
        let value = self.cast_ref(env, target)?.clone();
        Ok(Self {
            key: target.clone(),
            value,
        })
    }
}

impl AnyBox {
    pub fn of<T: Any + Send + Sync>(key: Key, value: T) -> Self {
        Self::new(key, Arc::new(value))
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }
}

#[cfg(test)]
#[path = "../tests/key_tests.rs"]
mod tests;
