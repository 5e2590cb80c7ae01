//! Actualization: substituting bindings for type-variable and wildcard
//! placeholders.
//!
//! Two binding modes are supported:
//!
//! - **Map mode** ([`TypeSubstitution`]): each variable is looked up by
//!   identity. Variables without a binding stay in place, so the result may
//!   be partial. Wildcards are kept, with their bounds actualized.
//! - **Queue mode**: bindings are consumed positionally in pre-order,
//!   left-to-right (owner arguments before own arguments, each declaration's
//!   parameters in declared order). A variable is bound at its first
//!   occurrence and reuses that binding afterwards; every wildcard consumes
//!   one binding. Coverage must be exact.
//!
//! Every accepted candidate is checked against the declared bounds of the
//! placeholder it replaces. Unchanged subtrees are shared with the template.

use crate::def::TypeParamInfo;
use crate::error::{ReflectError, Result};
use crate::format::TypeFormatter;
use crate::hierarchy::{TypeHierarchy, require_class};
use crate::key::Key;
use crate::recursion::{DepthCounter, RecursionProfile};
use crate::subtype::SubtypeChecker;
use crate::types::{
    GenericDecl, ParameterizedType, TypeDescriptor, TypeList, TypeVarRef, WildcardType,
};
use rustc_hash::FxHashMap;
use std::sync::Arc;
use tracing::trace;

// =============================================================================
// TypeSubstitution - map-mode bindings
// =============================================================================

/// Variable identity -> bound descriptor.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TypeSubstitution {
    map: FxHashMap<TypeVarRef, TypeDescriptor>,
}

impl TypeSubstitution {
    pub fn new() -> Self {
        Self::default()
    }

    /// Zip declared parameters with arguments. Extra entries on either side
    /// are ignored; use [`for_descriptor`](Self::for_descriptor) when arity
    /// must be validated.
    pub fn from_args(decl: GenericDecl, params: &[TypeParamInfo], args: &[TypeDescriptor]) -> Self {
        let mut subst = Self::new();
        for (param, arg) in params.iter().zip(args) {
            subst.insert(TypeVarRef::new(decl, param.name), arg.clone());
        }
        subst
    }

    /// Bindings a parameterized descriptor fixes for its own class and,
    /// recursively, for its owner. Bare and placeholder descriptors fix none.
    pub fn for_descriptor(env: &dyn TypeHierarchy, descriptor: &TypeDescriptor) -> Result<Self> {
        let mut subst = Self::new();
        subst.collect(env, descriptor)?;
        Ok(subst)
    }

    fn collect(&mut self, env: &dyn TypeHierarchy, descriptor: &TypeDescriptor) -> Result<()> {
        let TypeDescriptor::Parameterized(p) = descriptor else {
            return Ok(());
        };
        let info = require_class(env, p.raw)?;
        if info.arity() != p.args.len() {
            return Err(ReflectError::invalid(
                TypeFormatter::new(env).format(descriptor),
                format!(
                    "expected {} type argument(s), found {}",
                    info.arity(),
                    p.args.len()
                ),
            ));
        }
        for (param, arg) in info.type_params.iter().zip(&p.args) {
            self.insert(
                TypeVarRef::new(GenericDecl::Class(p.raw), param.name),
                arg.clone(),
            );
        }
        if let Some(owner) = &p.owner {
            self.collect(env, owner)?;
        }
        Ok(())
    }

    pub fn insert(&mut self, var: TypeVarRef, binding: TypeDescriptor) -> Option<TypeDescriptor> {
        self.map.insert(var, binding)
    }

    pub fn get(&self, var: &TypeVarRef) -> Option<&TypeDescriptor> {
        self.map.get(var)
    }

    pub fn contains(&self, var: &TypeVarRef) -> bool {
        self.map.contains_key(var)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TypeVarRef, &TypeDescriptor)> {
        self.map.iter()
    }
}

// =============================================================================
// Bindings - binding context for one actualization call
// =============================================================================

/// Binding context for one actualization call. Never stored in a Key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Bindings {
    Map(TypeSubstitution),
    Queue(Vec<TypeDescriptor>),
}

impl Bindings {
    pub fn map() -> Self {
        Self::Map(TypeSubstitution::new())
    }

    pub fn queue(items: impl IntoIterator<Item = TypeDescriptor>) -> Self {
        Self::Queue(items.into_iter().collect())
    }

    /// Map-mode bindings fixed by a receiver Key (class parameter i ->
    /// argument i, owners included). A raw receiver fixes nothing.
    pub fn for_receiver(env: &dyn TypeHierarchy, receiver: &Key) -> Result<Self> {
        TypeSubstitution::for_descriptor(env, receiver.descriptor()).map(Self::Map)
    }

    /// Add a map-mode binding. Returns `false` (and does nothing) in queue mode.
    pub fn insert(&mut self, var: TypeVarRef, binding: TypeDescriptor) -> bool {
        match self {
            Self::Map(subst) => {
                subst.insert(var, binding);
                true
            }
            Self::Queue(_) => false,
        }
    }

    /// Append a queue-mode binding. Returns `false` (and does nothing) in map mode.
    pub fn push(&mut self, binding: TypeDescriptor) -> bool {
        match self {
            Self::Queue(items) => {
                items.push(binding);
                true
            }
            Self::Map(_) => false,
        }
    }

    pub fn is_queue(&self) -> bool {
        matches!(self, Self::Queue(_))
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Map(subst) => subst.len(),
            Self::Queue(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<TypeSubstitution> for Bindings {
    fn from(subst: TypeSubstitution) -> Self {
        Self::Map(subst)
    }
}

// =============================================================================
// Entry points
// =============================================================================

/// Replace every reachable placeholder in `template` that `bindings` covers.
///
/// Errors: `BindingExhausted`/`ExcessBindings` (queue mode cardinality),
/// `BoundViolation` (a candidate fails a declared bound), `DepthExceeded`.
pub fn actualize(
    env: &dyn TypeHierarchy,
    template: &TypeDescriptor,
    bindings: &Bindings,
) -> Result<TypeDescriptor> {
    let source = match bindings {
        Bindings::Map(subst) => Source::Map(subst),
        Bindings::Queue(items) => Source::Queue {
            items,
            next: 0,
            bound: TypeSubstitution::new(),
        },
    };
    Actualizer::new(env, source, true).run(template)
}

/// Map-mode actualization without bound checks, for trusted declarations
/// (declared supertypes, bounds being resolved for a check).
pub(crate) fn actualize_unchecked(
    env: &dyn TypeHierarchy,
    template: &TypeDescriptor,
    subst: &TypeSubstitution,
) -> Result<TypeDescriptor> {
    if subst.is_empty() {
        return Ok(template.clone());
    }
    Actualizer::new(env, Source::Map(subst), false).run(template)
}

/// Verify that `candidate` satisfies every declared bound of `var`.
///
/// The candidate is substituted for `var` itself (and `known` for the other
/// variables) before checking, so `T extends Comparable<? super T>` is
/// checked as `Comparable<? super Candidate>`. A bound that still mentions
/// unresolved variables is deferred.
///
/// A wildcard candidate narrows the declared bound instead of replacing the
/// variable: `?` always fits, `? extends X` fits when `X` and the bound are
/// related. Bounds that mention the variable itself are deferred for it.
pub fn check_var_bounds(
    env: &dyn TypeHierarchy,
    var: &TypeVarRef,
    candidate: &TypeDescriptor,
    known: &TypeSubstitution,
) -> Result<()> {
    let Some(bounds) = env.type_var_bounds(var) else {
        return Ok(());
    };
    if bounds.is_empty() {
        return Ok(());
    }
    let wildcard = candidate.as_wildcard();
    let mut scope = known.clone();
    if wildcard.is_none() {
        scope.insert(*var, candidate.clone());
    }
    let mut checker = SubtypeChecker::new(env);
    for bound in &bounds {
        let resolved = actualize_unchecked(env, bound, &scope)?;
        if resolved.has_type_vars() {
            trace!("check_var_bounds: deferring bound with unresolved variables");
            continue;
        }
        let fits = match wildcard {
            Some(w) => checker.wildcard_within_bound(w, &resolved)?,
            None => checker.is_assignable(&resolved, candidate)?,
        };
        if !fits {
            let fmt = TypeFormatter::new(env);
            return Err(ReflectError::BoundViolation {
                placeholder: fmt.format(&TypeDescriptor::Var(*var)),
                bound: fmt.format(&resolved),
                candidate: fmt.format(candidate),
            });
        }
    }
    Ok(())
}

// =============================================================================
// Actualizer
// =============================================================================

enum Source<'b> {
    Map(&'b TypeSubstitution),
    Queue {
        items: &'b [TypeDescriptor],
        next: usize,
        /// Variables bound so far, reused on later occurrences.
        bound: TypeSubstitution,
    },
}

struct Actualizer<'a, 'b> {
    env: &'a dyn TypeHierarchy,
    source: Source<'b>,
    check_bounds: bool,
    depth: DepthCounter,
}

impl<'a, 'b> Actualizer<'a, 'b> {
    fn new(env: &'a dyn TypeHierarchy, source: Source<'b>, check_bounds: bool) -> Self {
        Self {
            env,
            source,
            check_bounds,
            depth: DepthCounter::with_profile(RecursionProfile::Actualization),
        }
    }

    fn run(mut self, template: &TypeDescriptor) -> Result<TypeDescriptor> {
        let out = self.visit(template)?.unwrap_or_else(|| template.clone());
        if let Source::Queue { items, next, .. } = &self.source {
            if *next < items.len() {
                return Err(ReflectError::ExcessBindings {
                    template: TypeFormatter::new(self.env).format(template),
                    remaining: items.len() - next,
                });
            }
        }
        Ok(out)
    }

    fn known(&self) -> &TypeSubstitution {
        match &self.source {
            Source::Map(subst) => subst,
            Source::Queue { bound, .. } => bound,
        }
    }

    /// `Ok(None)` means the subtree is unchanged.
    fn visit(&mut self, descriptor: &TypeDescriptor) -> Result<Option<TypeDescriptor>> {
        if !self.depth.enter() {
            let profile = RecursionProfile::Actualization;
            return Err(ReflectError::DepthExceeded {
                operation: profile.operation(),
                limit: profile.max_depth(),
            });
        }
        let result = self.visit_inner(descriptor);
        self.depth.leave();
        result
    }

    fn visit_inner(&mut self, descriptor: &TypeDescriptor) -> Result<Option<TypeDescriptor>> {
        match descriptor {
            TypeDescriptor::Concrete(_) => Ok(None),
            TypeDescriptor::Parameterized(p) => {
                let owner = match &p.owner {
                    Some(owner) => self.visit(owner)?,
                    None => None,
                };
                let args = self.visit_list(&p.args)?;
                if owner.is_none() && args.is_none() {
                    return Ok(None);
                }
                Ok(Some(TypeDescriptor::Parameterized(Arc::new(
                    ParameterizedType {
                        owner: owner.or_else(|| p.owner.clone()),
                        raw: p.raw,
                        args: args.unwrap_or_else(|| p.args.clone()),
                    },
                ))))
            }
            TypeDescriptor::Var(var) => self.substitute_var(var),
            TypeDescriptor::Wildcard(w) => {
                if matches!(self.source, Source::Queue { .. }) {
                    self.consume_wildcard(descriptor).map(Some)
                } else {
                    self.visit_wildcard_bounds(w)
                }
            }
        }
    }

    fn visit_list(&mut self, items: &[TypeDescriptor]) -> Result<Option<TypeList>> {
        let mut rebuilt: Option<TypeList> = None;
        for (i, item) in items.iter().enumerate() {
            match self.visit(item)? {
                Some(new) => rebuilt
                    .get_or_insert_with(|| items[..i].iter().cloned().collect())
                    .push(new),
                None => {
                    if let Some(rebuilt) = &mut rebuilt {
                        rebuilt.push(item.clone());
                    }
                }
            }
        }
        Ok(rebuilt)
    }

    fn visit_wildcard_bounds(&mut self, w: &WildcardType) -> Result<Option<TypeDescriptor>> {
        let lower = self.visit_list(&w.lower)?;
        let upper = self.visit_list(&w.upper)?;
        if lower.is_none() && upper.is_none() {
            return Ok(None);
        }
        Ok(Some(TypeDescriptor::Wildcard(Arc::new(WildcardType {
            lower: lower.unwrap_or_else(|| w.lower.clone()),
            upper: upper.unwrap_or_else(|| w.upper.clone()),
        }))))
    }

    fn dequeue(&mut self, placeholder: &TypeDescriptor) -> Result<TypeDescriptor> {
        let Source::Queue { items, next, .. } = &mut self.source else {
            return Err(ReflectError::invalid(
                TypeFormatter::new(self.env).format(placeholder),
                "dequeue outside queue mode",
            ));
        };
        match items.get(*next) {
            Some(candidate) => {
                *next += 1;
                Ok(candidate.clone())
            }
            None => Err(ReflectError::BindingExhausted {
                placeholder: TypeFormatter::new(self.env).format(placeholder),
                consumed: *next,
            }),
        }
    }

    fn substitute_var(&mut self, var: &TypeVarRef) -> Result<Option<TypeDescriptor>> {
        let mapped = match &self.source {
            Source::Map(subst) => Some(subst.get(var).cloned()),
            Source::Queue { bound, .. } => match bound.get(var) {
                Some(existing) => return Ok(Some(existing.clone())),
                None => None,
            },
        };
        let candidate = match mapped {
            Some(Some(candidate)) => candidate,
            Some(None) => return Ok(None),
            None => self.dequeue(&TypeDescriptor::Var(*var))?,
        };
        if self.check_bounds {
            check_var_bounds(self.env, var, &candidate, self.known())?;
        }
        if let Source::Queue { bound, .. } = &mut self.source {
            bound.insert(*var, candidate.clone());
        }
        trace!(var = var.name.0, "actualize: substituted variable");
        Ok(Some(candidate))
    }

    fn consume_wildcard(&mut self, wildcard: &TypeDescriptor) -> Result<TypeDescriptor> {
        let candidate = self.dequeue(wildcard)?;
        if !self.check_bounds {
            return Ok(candidate);
        }
        let resolved = actualize_unchecked(self.env, wildcard, self.known())?;
        let TypeDescriptor::Wildcard(bounds) = &resolved else {
            return Ok(candidate);
        };
        if resolved.has_type_vars() {
            return Ok(candidate);
        }
        if !SubtypeChecker::new(self.env).wildcard_contains(bounds, &candidate)? {
            let fmt = TypeFormatter::new(self.env);
            return Err(ReflectError::BoundViolation {
                placeholder: fmt.format(wildcard),
                bound: fmt.format(&resolved),
                candidate: fmt.format(&candidate),
            });
        }
        Ok(candidate)
    }
}

#[cfg(test)]
#[path = "../tests/instantiate_tests.rs"]
mod tests;
