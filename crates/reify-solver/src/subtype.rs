//! Assignability with nominal subclassing and generic variance.
//!
//! `is_assignable(to, from)` answers "may a value of shape `from` be used
//! where `to` is required":
//!
//! 1. `from`'s nominal identity must be a sub-identity of `to`'s.
//! 2. A bare `to` accepts any parameterization (raw compatibility).
//! 3. Otherwise `from` is viewed through `to`'s identity (`fromAsTo`) by
//!    walking its declared hierarchy, and the argument lists are compared
//!    pairwise: plain arguments are invariant (structural equality),
//!    wildcard arguments accept anything within their bounds.
//!
//! An ordinary mismatch is `Ok(false)`. Errors are reserved for malformed
//! input (unknown identities, arity mismatches, depth limits).

use crate::def::DefId;
use crate::error::{ReflectError, Result};
use crate::format::TypeFormatter;
use crate::hierarchy::{self, TypeHierarchy};
use crate::recursion::{DepthCounter, RecursionProfile};
use crate::types::{ParameterizedType, TypeDescriptor, TypeList, WildcardType};
use std::sync::Arc;
use tracing::{debug, trace};

/// Why an assignability check failed, for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssignFailure {
    /// `from`'s nominal identity does not derive from `to`'s.
    NotSubclass { required: String, actual: String },
    /// `from` reaches `to`'s identity only as a raw (unparameterized) shape.
    RawSource { required: String, actual: String },
    /// Argument `index` of `fromAsTo` does not fit `to`'s argument.
    ArgumentMismatch {
        index: usize,
        required: String,
        actual: String,
    },
    /// Placeholder shapes (variables, wildcards) that do not fit.
    Incompatible { required: String, actual: String },
}

pub struct SubtypeChecker<'a> {
    env: &'a dyn TypeHierarchy,
    depth: DepthCounter,
    profile: RecursionProfile,
}

impl<'a> SubtypeChecker<'a> {
    pub fn new(env: &'a dyn TypeHierarchy) -> Self {
        Self::with_profile(env, RecursionProfile::Assignability)
    }

    pub fn with_profile(env: &'a dyn TypeHierarchy, profile: RecursionProfile) -> Self {
        Self {
            env,
            depth: DepthCounter::with_profile(profile),
            profile,
        }
    }

    /// `true` if a value of shape `from` may be used where `to` is required.
    pub fn is_assignable(&mut self, to: &TypeDescriptor, from: &TypeDescriptor) -> Result<bool> {
        if !self.depth.enter() {
            return Err(ReflectError::DepthExceeded {
                operation: self.profile.operation(),
                limit: self.profile.max_depth(),
            });
        }
        let result = self.check(to, from);
        self.depth.leave();
        result
    }

    fn check(&mut self, to: &TypeDescriptor, from: &TypeDescriptor) -> Result<bool> {
        if to == from {
            return Ok(true);
        }
        match (to, from) {
            (TypeDescriptor::Wildcard(w), _) => self.wildcard_contains(w, from),
            (_, TypeDescriptor::Var(var)) => {
                // A variable stands in for whatever its bounds admit.
                let bounds = self.env.type_var_bounds(var).unwrap_or_default();
                for bound in &bounds {
                    if self.is_assignable(to, bound)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            (TypeDescriptor::Var(_), _) => Ok(false),
            (_, TypeDescriptor::Wildcard(w)) => {
                for upper in &self.implicit_upper(&w.upper) {
                    if self.is_assignable(to, upper)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            (
                TypeDescriptor::Concrete(_) | TypeDescriptor::Parameterized(_),
                TypeDescriptor::Concrete(_) | TypeDescriptor::Parameterized(_),
            ) => self.check_nominal(to, from),
        }
    }

    fn check_nominal(&mut self, to: &TypeDescriptor, from: &TypeDescriptor) -> Result<bool> {
        let to_raw = hierarchy::require_raw(self.env, to)?;
        let from_raw = hierarchy::require_raw(self.env, from)?;
        if !hierarchy::is_subclass(self.env, from_raw, to_raw)? {
            trace!(to = to_raw.0, from = from_raw.0, "is_assignable: not a subclass");
            return Ok(false);
        }
        let TypeDescriptor::Parameterized(to_p) = to else {
            return Ok(true);
        };
        let Some(from_p) = self.from_as_to(from, to_raw)? else {
            trace!(to = to_raw.0, from = from_raw.0, "is_assignable: raw source");
            return Ok(false);
        };
        self.check_arguments(to, to_p, &from_p)
    }

    /// `from` seen through `to_raw`; `None` when it only reaches it raw.
    fn from_as_to(
        &mut self,
        from: &TypeDescriptor,
        to_raw: DefId,
    ) -> Result<Option<Arc<ParameterizedType>>> {
        let from_as_to = hierarchy::as_supertype(self.env, from, to_raw)?.ok_or_else(|| {
            let fmt = TypeFormatter::new(self.env);
            ReflectError::NotASupertype {
                descriptor: fmt.format(from),
                ancestor: fmt.format(&TypeDescriptor::Concrete(to_raw)),
            }
        })?;
        match from_as_to {
            TypeDescriptor::Parameterized(p) => Ok(Some(p)),
            _ => Ok(None),
        }
    }

    fn check_arguments(
        &mut self,
        to: &TypeDescriptor,
        to_p: &ParameterizedType,
        from_p: &ParameterizedType,
    ) -> Result<bool> {
        if to_p.args.len() != from_p.args.len() {
            return Err(ReflectError::invalid(
                TypeFormatter::new(self.env).format(to),
                format!(
                    "argument count {} does not match {}",
                    to_p.args.len(),
                    from_p.args.len()
                ),
            ));
        }
        if let (Some(to_owner), Some(from_owner)) = (&to_p.owner, &from_p.owner) {
            if !self.is_assignable(to_owner, from_owner)? {
                return Ok(false);
            }
        }
        for (index, (to_arg, from_arg)) in to_p.args.iter().zip(&from_p.args).enumerate() {
            if !self.argument_fits(to_p.raw, index, to_arg, from_arg)? {
                trace!(index, "is_assignable: argument mismatch");
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Generic positions are invariant unless `to_arg` is a wildcard.
    fn argument_fits(
        &mut self,
        raw: DefId,
        index: usize,
        to_arg: &TypeDescriptor,
        from_arg: &TypeDescriptor,
    ) -> Result<bool> {
        match to_arg {
            TypeDescriptor::Wildcard(w) => {
                let from_arg = self.with_declared_upper(raw, index, from_arg)?;
                if !self.depth.enter() {
                    return Err(ReflectError::DepthExceeded {
                        operation: self.profile.operation(),
                        limit: self.profile.max_depth(),
                    });
                }
                let result = self.wildcard_contains(w, &from_arg);
                self.depth.leave();
                result
            }
            _ => Ok(to_arg == from_arg),
        }
    }

    /// A wildcard argument without an upper bound is implicitly bounded by
    /// the declared bounds of the parameter it fills (`NumberBox<?>` is
    /// `NumberBox<? extends Number>`). Bounds that mention type variables are
    /// left to the root.
    fn with_declared_upper(
        &self,
        raw: DefId,
        index: usize,
        from_arg: &TypeDescriptor,
    ) -> Result<TypeDescriptor> {
        let TypeDescriptor::Wildcard(w) = from_arg else {
            return Ok(from_arg.clone());
        };
        if !w.upper.is_empty() {
            return Ok(from_arg.clone());
        }
        let info = hierarchy::require_class(self.env, raw)?;
        let declared: TypeList = info
            .type_params
            .get(index)
            .map(|param| {
                param
                    .bounds
                    .iter()
                    .filter(|b| !b.has_type_vars())
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        if declared.is_empty() {
            return Ok(from_arg.clone());
        }
        Ok(TypeDescriptor::wildcard(w.lower.iter().cloned(), declared))
    }

    /// Explicit upper bounds, or the root class when there are none.
    fn implicit_upper(&self, upper: &[TypeDescriptor]) -> TypeList {
        if !upper.is_empty() {
            return upper.iter().cloned().collect();
        }
        self.env
            .root_class()
            .map(TypeDescriptor::Concrete)
            .into_iter()
            .collect()
    }

    /// `true` if `candidate` lies within the wildcard's bounds.
    ///
    /// A wildcard candidate is contained when its own bounds are at least as
    /// tight: `? extends U` contains `? extends F` iff `F <: U`, and
    /// `? super L` contains `? super M` iff `L <: M`. A candidate without an
    /// upper bound extends the root class.
    pub fn wildcard_contains(
        &mut self,
        w: &WildcardType,
        candidate: &TypeDescriptor,
    ) -> Result<bool> {
        let TypeDescriptor::Wildcard(inner) = candidate else {
            return self.within_bounds(w, candidate);
        };
        let inner_upper = self.implicit_upper(&inner.upper);
        for upper in &w.upper {
            if !self.any_assignable(&inner_upper, |c, f| c.is_assignable(upper, f))? {
                return Ok(false);
            }
        }
        for lower in &w.lower {
            if !self.any_assignable(&inner.lower, |c, m| c.is_assignable(m, lower))? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// `true` if the wildcard and a declared `bound` admit a common type.
    ///
    /// Each explicit upper bound must be related to `bound` in either
    /// direction and each lower bound must lie below it. An unbounded
    /// wildcard is capped by `bound` itself and always fits.
    pub fn wildcard_within_bound(
        &mut self,
        w: &WildcardType,
        bound: &TypeDescriptor,
    ) -> Result<bool> {
        for upper in &w.upper {
            if !self.is_assignable(bound, upper)? && !self.is_assignable(upper, bound)? {
                return Ok(false);
            }
        }
        for lower in &w.lower {
            if !self.is_assignable(bound, lower)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn within_bounds(&mut self, w: &WildcardType, candidate: &TypeDescriptor) -> Result<bool> {
        for upper in &w.upper {
            if !self.is_assignable(upper, candidate)? {
                return Ok(false);
            }
        }
        for lower in &w.lower {
            if !self.is_assignable(candidate, lower)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn any_assignable(
        &mut self,
        items: &[TypeDescriptor],
        mut f: impl FnMut(&mut Self, &TypeDescriptor) -> Result<bool>,
    ) -> Result<bool> {
        for item in items {
            if f(self, item)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// `None` if assignable, otherwise the first reason found.
    pub fn explain_failure(
        &mut self,
        to: &TypeDescriptor,
        from: &TypeDescriptor,
    ) -> Result<Option<AssignFailure>> {
        if self.is_assignable(to, from)? {
            return Ok(None);
        }
        let fmt = TypeFormatter::new(self.env);
        let required = fmt.format(to);
        let actual = fmt.format(from);
        let (Some(to_raw), Some(from_raw)) = (to.raw_identity(), from.raw_identity()) else {
            return Ok(Some(AssignFailure::Incompatible { required, actual }));
        };
        if !hierarchy::is_subclass(self.env, from_raw, to_raw)? {
            return Ok(Some(AssignFailure::NotSubclass { required, actual }));
        }
        let Some(from_p) = self.from_as_to(from, to_raw)? else {
            return Ok(Some(AssignFailure::RawSource { required, actual }));
        };
        for (index, (to_arg, from_arg)) in to.type_args().iter().zip(&from_p.args).enumerate() {
            if !self.argument_fits(to_raw, index, to_arg, from_arg)? {
                let reason = AssignFailure::ArgumentMismatch {
                    index,
                    required: fmt.format(to_arg),
                    actual: fmt.format(from_arg),
                };
                debug!(?reason, "explain_failure");
                return Ok(Some(reason));
            }
        }
        Ok(Some(AssignFailure::Incompatible { required, actual }))
    }
}

/// `true` if a value of shape `from` may be used where `to` is required.
pub fn is_assignable(
    env: &dyn TypeHierarchy,
    to: &TypeDescriptor,
    from: &TypeDescriptor,
) -> Result<bool> {
    SubtypeChecker::new(env).is_assignable(to, from)
}

#[cfg(test)]
#[path = "../tests/subtype_tests.rs"]
mod tests;
