//! The host-hierarchy adapter and the walks built on it.
//!
//! `TypeHierarchy` is the single capability the engine needs from a host:
//! given a nominal identity, produce its declared parameters and supertype
//! shapes. Everything host-specific stays on the other side of this trait.

use crate::def::{ClassInfo, DefId, TypeParamInfo};
use crate::error::{ReflectError, Result};
use crate::format::TypeFormatter;
use crate::instantiate::{TypeSubstitution, actualize_unchecked};
use crate::recursion::{RecursionGuard, RecursionProfile, RecursionResult};
use crate::types::{GenericDecl, TypeDescriptor, TypeList, TypeVarRef};
use reify_common::Atom;
use rustc_hash::FxHashSet;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::trace;

/// Read-only view of host declarations.
pub trait TypeHierarchy: Send + Sync {
    /// Declaration of a nominal identity, if known.
    fn class_info(&self, def: DefId) -> Option<Arc<ClassInfo>>;

    /// Type parameters of a generic method, if declared.
    fn method_type_params(&self, owner: DefId, method: Atom) -> Option<Arc<[TypeParamInfo]>>;

    /// Text of an interned declaration name.
    fn resolve_name(&self, name: Atom) -> Arc<str>;

    /// The hierarchy's root class, the implicit upper bound of a wildcard
    /// that declares none. `None` if the host has no single root.
    fn root_class(&self) -> Option<DefId> {
        None
    }

    /// Declared upper bounds of a type variable.
    fn type_var_bounds(&self, var: &TypeVarRef) -> Option<TypeList> {
        match var.decl {
            GenericDecl::Class(def) => self
                .class_info(def)?
                .type_param(var.name)
                .map(|p| p.bounds.clone()),
            GenericDecl::Method(owner, method) => self
                .method_type_params(owner, method)?
                .iter()
                .find(|p| p.name == var.name)
                .map(|p| p.bounds.clone()),
        }
    }
}

pub(crate) fn require_class(env: &dyn TypeHierarchy, def: DefId) -> Result<Arc<ClassInfo>> {
    env.class_info(def)
        .ok_or(ReflectError::UnknownDefinition(def.0))
}

pub(crate) fn require_raw(env: &dyn TypeHierarchy, descriptor: &TypeDescriptor) -> Result<DefId> {
    descriptor.raw_identity().ok_or_else(|| {
        ReflectError::invalid(
            TypeFormatter::new(env).format(descriptor),
            "placeholder has no nominal identity",
        )
    })
}

/// Validate every `Parameterized` node against its declaration's arity.
///
/// Undeclared identities fail with `UnknownDefinition`; a wrong argument
/// count fails with `InvalidDescriptor` naming the whole descriptor.
pub fn check_arity(env: &dyn TypeHierarchy, descriptor: &TypeDescriptor) -> Result<()> {
    check_arity_in(env, descriptor, descriptor)
}

fn check_arity_in(
    env: &dyn TypeHierarchy,
    node: &TypeDescriptor,
    root: &TypeDescriptor,
) -> Result<()> {
    match node {
        TypeDescriptor::Concrete(def) => {
            require_class(env, *def)?;
        }
        TypeDescriptor::Parameterized(p) => {
            let info = require_class(env, p.raw)?;
            if info.arity() != p.args.len() {
                return Err(ReflectError::invalid(
                    TypeFormatter::new(env).format(root),
                    format!(
                        "`{}` declares {} type parameter(s), found {} argument(s)",
                        env.resolve_name(info.name),
                        info.arity(),
                        p.args.len()
                    ),
                ));
            }
            if let Some(owner) = &p.owner {
                check_arity_in(env, owner, root)?;
            }
            for arg in &p.args {
                check_arity_in(env, arg, root)?;
            }
        }
        TypeDescriptor::Var(_) => {}
        TypeDescriptor::Wildcard(w) => {
            for bound in w.lower.iter().chain(&w.upper) {
                check_arity_in(env, bound, root)?;
            }
        }
    }
    Ok(())
}

/// The class's own generic shape: `Name<T1, .., Tn>`, or `Name` when it
/// declares no parameters.
pub fn class_template(env: &dyn TypeHierarchy, def: DefId) -> Result<TypeDescriptor> {
    let info = require_class(env, def)?;
    if info.type_params.is_empty() {
        return Ok(TypeDescriptor::Concrete(def));
    }
    Ok(TypeDescriptor::parameterized(
        def,
        info.type_params
            .iter()
            .map(|p| TypeDescriptor::var(GenericDecl::Class(def), p.name)),
    ))
}

/// Nominal sub-identity: `true` if `sub` is `sup` or reaches it through
/// declared supertypes. Cyclic declarations terminate.
pub fn is_subclass(env: &dyn TypeHierarchy, sub: DefId, sup: DefId) -> Result<bool> {
    if sub == sup {
        return Ok(true);
    }
    let profile = RecursionProfile::HierarchyWalk;
    let mut visited = FxHashSet::default();
    let mut queue = VecDeque::from([sub]);
    while let Some(current) = queue.pop_front() {
        if !visited.insert(current) {
            continue;
        }
        if visited.len() as u32 > profile.max_iterations() {
            return Err(ReflectError::DepthExceeded {
                operation: profile.operation(),
                limit: profile.max_iterations(),
            });
        }
        let info = require_class(env, current)?;
        for supertype in &info.supertypes {
            let Some(raw) = supertype.raw_identity() else {
                continue;
            };
            if raw == sup {
                return Ok(true);
            }
            queue.push_back(raw);
        }
    }
    Ok(false)
}

/// Locate `from`'s supertype shape whose nominal identity is `ancestor`,
/// actualizing each declared supertype with the bindings of the class that
/// declares it.
///
/// A raw `from` (a bare descriptor of a class that declares parameters)
/// yields a raw ancestor. Returns `None` when `ancestor` is not reachable.
pub fn as_supertype(
    env: &dyn TypeHierarchy,
    from: &TypeDescriptor,
    ancestor: DefId,
) -> Result<Option<TypeDescriptor>> {
    let mut walker = SupertypeWalker {
        env,
        guard: RecursionGuard::with_profile(RecursionProfile::HierarchyWalk),
    };
    walker.walk(from, ancestor)
}

struct SupertypeWalker<'a> {
    env: &'a dyn TypeHierarchy,
    guard: RecursionGuard<DefId>,
}

impl SupertypeWalker<'_> {
    fn walk(&mut self, from: &TypeDescriptor, ancestor: DefId) -> Result<Option<TypeDescriptor>> {
        let raw = require_raw(self.env, from)?;
        if raw == ancestor {
            return Ok(Some(from.clone()));
        }
        match self.guard.enter(raw) {
            RecursionResult::Entered => {}
            RecursionResult::Cycle => return Ok(None),
            RecursionResult::DepthExceeded | RecursionResult::IterationExceeded => {
                let profile = RecursionProfile::HierarchyWalk;
                return Err(ReflectError::DepthExceeded {
                    operation: profile.operation(),
                    limit: profile.max_depth(),
                });
            }
        }
        let result = self.walk_supertypes(from, raw, ancestor);
        self.guard.leave(raw);
        result
    }

    fn walk_supertypes(
        &mut self,
        from: &TypeDescriptor,
        raw: DefId,
        ancestor: DefId,
    ) -> Result<Option<TypeDescriptor>> {
        let info = require_class(self.env, raw)?;
        let erased = matches!(from, TypeDescriptor::Concrete(_)) && !info.type_params.is_empty();
        let bindings = if erased {
            None
        } else {
            Some(TypeSubstitution::for_descriptor(self.env, from)?)
        };

        for supertype in &info.supertypes {
            let shaped = match &bindings {
                Some(bindings) => actualize_unchecked(self.env, supertype, bindings)?,
                None => match supertype.erase() {
                    Some(bare) => bare,
                    None => continue,
                },
            };
            if let Some(found) = self.walk(&shaped, ancestor)? {
                trace!(from = raw.0, ancestor = ancestor.0, "as_supertype: found");
                return Ok(Some(found));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
#[path = "../tests/hierarchy_tests.rs"]
mod tests;
