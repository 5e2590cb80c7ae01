//! Runtime Generic Type Descriptors
//!
//! This crate reconstructs full generic shapes (`Mapping<Text, Sequence<Integer>>`)
//! on runtimes whose values only carry their raw nominal identity. It provides:
//!
//! - **Descriptors**: a closed-sum structural model of generic types with
//!   structural equality and hashing
//! - **Actualization**: substitution of type variables and wildcards, by
//!   identity (map mode) or positionally (queue mode), with bound checks
//! - **Assignability**: nominal subclassing plus invariant arguments and
//!   wildcard variance
//! - **Keys and boxes**: immutable, hashable shape handles and value
//!   carriers with checked downcasts
//!
//! Everything host-specific goes through the [`TypeHierarchy`] adapter;
//! [`DefinitionStore`] is the in-memory implementation.
mod capture;
pub mod def;
pub mod error;
mod format;
pub mod hierarchy;
mod instantiate;
mod key;
mod ordering;
pub mod recursion;
mod registry;
mod signature;
mod subtype;
mod tagging;
pub mod types;

pub use capture::capture_type_argument;
pub use def::{ClassInfo, DefId, DefKind, DefinitionStore, TypeParamInfo};
pub use error::{ReflectError, Result};
pub use format::TypeFormatter;
pub use hierarchy::{TypeHierarchy, as_supertype, check_arity, class_template, is_subclass};
pub use instantiate::{Bindings, TypeSubstitution, actualize, check_var_bounds};
pub use key::{AnyBox, Key, KeyBox};
pub use ordering::KeyOrdering;
pub use recursion::{DepthCounter, RecursionGuard, RecursionProfile, RecursionResult};
pub use registry::KeyRegistry;
pub use signature::MethodSignature;
pub use subtype::{AssignFailure, SubtypeChecker, is_assignable};
pub use tagging::KeyTag;
pub use types::{GenericDecl, ParameterizedType, TypeDescriptor, TypeList, TypeVarRef, WildcardType};

pub use reify_common::{Atom, limits};

// Shared host hierarchy for unit tests.
#[cfg(test)]
#[path = "../tests/fixtures.rs"]
pub(crate) mod fixtures;
#[cfg(test)]
#[path = "../tests/scenario_tests.rs"]
mod scenario_tests;
