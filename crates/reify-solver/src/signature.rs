//! Generic method signatures and reflective argument checks.
//!
//! A signature is declared against its owning class's type variables (and
//! optionally its own method-level variables). Calling through a receiver
//! Key first actualizes the class variables with the receiver's bindings;
//! whatever is left mentions only method-level variables.

use crate::def::{DefId, TypeParamInfo};
use crate::error::{ReflectError, Result};
use crate::format::TypeFormatter;
use crate::hierarchy::{self, TypeHierarchy};
use crate::instantiate::{Bindings, TypeSubstitution, actualize, check_var_bounds};
use crate::key::Key;
use crate::subtype::SubtypeChecker;
use crate::types::{GenericDecl, TypeDescriptor, TypeVarRef};
use reify_common::Atom;
use tracing::debug;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MethodSignature {
    pub owner: DefId,
    pub name: Atom,
    /// Method-level type parameters. Their bounds must also be visible
    /// through the hierarchy (`DefinitionStore::declare_method_type_params`).
    pub type_params: Vec<TypeParamInfo>,
    pub params: Vec<TypeDescriptor>,
    pub return_type: TypeDescriptor,
}

impl MethodSignature {
    pub fn new(
        owner: DefId,
        name: Atom,
        params: Vec<TypeDescriptor>,
        return_type: TypeDescriptor,
    ) -> Self {
        Self {
            owner,
            name,
            type_params: Vec::new(),
            params,
            return_type,
        }
    }

    pub fn with_type_params(mut self, type_params: Vec<TypeParamInfo>) -> Self {
        self.type_params = type_params;
        self
    }

    /// The declaration context of this method's own type variables.
    pub const fn decl(&self) -> GenericDecl {
        GenericDecl::Method(self.owner, self.name)
    }

    /// Reference to one of this method's own type variables.
    pub fn method_var(&self, name: Atom) -> TypeDescriptor {
        TypeDescriptor::var(self.decl(), name)
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// The signature as seen through `receiver`: class type variables are
    /// replaced by the receiver's arguments (a raw receiver replaces none).
    pub fn actualize_for(&self, env: &dyn TypeHierarchy, receiver: &Key) -> Result<Self> {
        let Some(as_owner) = hierarchy::as_supertype(env, receiver.descriptor(), self.owner)? else {
            return Err(ReflectError::NotASupertype {
                descriptor: receiver.as_str().to_owned(),
                ancestor: TypeFormatter::new(env).format(&TypeDescriptor::Concrete(self.owner)),
            });
        };
        let bindings = Bindings::Map(TypeSubstitution::for_descriptor(env, &as_owner)?);
        let params = self
            .params
            .iter()
            .map(|p| actualize(env, p, &bindings))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            owner: self.owner,
            name: self.name,
            type_params: self.type_params.clone(),
            params,
            return_type: actualize(env, &self.return_type, &bindings)?,
        })
    }

    /// Check an invocation through `receiver` with arguments keyed by `args`.
    ///
    /// A parameter that is exactly a method-level variable accepts any
    /// argument within that variable's bounds; one that only mentions such a
    /// variable is checked by nominal identity alone. A class variable left
    /// by a raw receiver is checked against the erasure of its bounds.
    pub fn check_arguments(
        &self,
        env: &dyn TypeHierarchy,
        receiver: &Key,
        args: &[Key],
    ) -> Result<()> {
        if args.len() != self.arity() {
            return Err(ReflectError::ArityMismatch {
                signature: self.display(env),
                expected: self.arity(),
                actual: args.len(),
            });
        }
        let actual = self.actualize_for(env, receiver)?;
        let mut inferred = TypeSubstitution::new();
        let mut checker = SubtypeChecker::new(env);
        for (index, (param, arg)) in actual.params.iter().zip(args).enumerate() {
            let fits = match param {
                TypeDescriptor::Var(var) if var.decl == self.decl() => {
                    match inferred.get(var) {
                        Some(previous) => checker.is_assignable(previous, arg.descriptor())?,
                        None => {
                            let within = satisfies_bounds(env, var, arg, &inferred)?;
                            if within {
                                inferred.insert(*var, arg.descriptor().clone());
                            }
                            within
                        }
                    }
                }
                TypeDescriptor::Var(var) => erased_bounds_fit(env, &mut checker, var, arg)?,
                _ if param.has_type_vars() => match param.erase() {
                    Some(erased) => checker.is_assignable(&erased, arg.descriptor())?,
                    None => true,
                },
                _ => checker.is_assignable(param, arg.descriptor())?,
            };
            if !fits {
                debug!(index, "check_arguments: argument rejected");
                return Err(ReflectError::CastError {
                    required: TypeFormatter::new(env).format(param),
                    actual: arg.as_str().to_owned(),
                });
            }
        }
        Ok(())
    }

    /// Key of the return type as seen through `receiver`. A return type that
    /// still mentions method-level variables yields a partial template Key.
    /// A return type that became a wildcard (`NumberBox<?>.get()`) yields its
    /// upper bound: the explicit one, else the variable's declared bound,
    /// else the root class.
    pub fn return_key(&self, env: &dyn TypeHierarchy, receiver: &Key) -> Result<Key> {
        let actual = self.actualize_for(env, receiver)?;
        if let TypeDescriptor::Wildcard(w) = &actual.return_type {
            let upper = w
                .upper
                .first()
                .cloned()
                .or_else(|| declared_upper(env, &self.return_type))
                .or_else(|| env.root_class().map(TypeDescriptor::Concrete));
            return match upper {
                Some(upper) => Key::of(env, upper),
                None => Err(ReflectError::invalid(
                    TypeFormatter::new(env).format(&actual.return_type),
                    "wildcard return type has no upper bound",
                )),
            };
        }
        if actual.return_type.has_type_vars() {
            Key::template(env, actual.return_type)
        } else {
            Key::of(env, actual.return_type)
        }
    }

    /// `Owner.name(P1, P2)` for diagnostics.
    pub fn display(&self, env: &dyn TypeHierarchy) -> String {
        let fmt = TypeFormatter::new(env);
        format!(
            "{}.{}({})",
            fmt.format(&TypeDescriptor::Concrete(self.owner)),
            env.resolve_name(self.name),
            fmt.format_list(&self.params)
        )
    }
}

/// First declared bound of a variable return type that mentions no variables.
fn declared_upper(env: &dyn TypeHierarchy, declared: &TypeDescriptor) -> Option<TypeDescriptor> {
    let bounds = env.type_var_bounds(declared.as_var()?)?;
    bounds.iter().find(|b| !b.has_type_vars()).cloned()
}

fn erased_bounds_fit(
    env: &dyn TypeHierarchy,
    checker: &mut SubtypeChecker<'_>,
    var: &TypeVarRef,
    arg: &Key,
) -> Result<bool> {
    let bounds = env.type_var_bounds(var).unwrap_or_default();
    for erased in bounds.iter().filter_map(TypeDescriptor::erase) {
        if !checker.is_assignable(&erased, arg.descriptor())? {
            return Ok(false);
        }
    }
    Ok(true)
}

fn satisfies_bounds(
    env: &dyn TypeHierarchy,
    var: &TypeVarRef,
    arg: &Key,
    known: &TypeSubstitution,
) -> Result<bool> {
    match check_var_bounds(env, var, arg.descriptor(), known) {
        Ok(()) => Ok(true),
        Err(ReflectError::BoundViolation { .. }) => Ok(false),
        Err(err) => Err(err),
    }
}

#[cfg(test)]
#[path = "../tests/signature_tests.rs"]
mod tests;
