//! Capture idiom: recover an erased type argument from a declaration that
//! fixes it.
//!
//! A caller declares `class TextListToken extends TypeLiteral<Sequence<Text>>`
//! and asks for the argument its capturing class hands to `TypeLiteral`. Only
//! the capturing class's immediate declared supertypes are inspected, once.

use crate::def::DefId;
use crate::error::{ReflectError, Result};
use crate::format::TypeFormatter;
use crate::hierarchy::{TypeHierarchy, require_class};
use crate::key::Key;
use crate::types::TypeDescriptor;
use tracing::debug;

/// Key of the first type argument `capturing_class` passes to `capture_base`.
///
/// Fails with `MissingTypeParameter` when `capture_base` is not an immediate
/// supertype, is extended raw, or receives an argument that still mentions
/// type variables (the capturing class is itself generic over it).
pub fn capture_type_argument(
    env: &dyn TypeHierarchy,
    capturing_class: DefId,
    capture_base: DefId,
) -> Result<Key> {
    let info = require_class(env, capturing_class)?;
    let missing = || {
        let fmt = TypeFormatter::new(env);
        ReflectError::MissingTypeParameter {
            declaration: fmt.format(&TypeDescriptor::Concrete(capturing_class)),
            capture_base: fmt.format(&TypeDescriptor::Concrete(capture_base)),
        }
    };
    let declared = info
        .supertypes
        .iter()
        .find(|s| s.raw_identity() == Some(capture_base))
        .ok_or_else(missing)?;
    let argument = declared.type_args().first().ok_or_else(missing)?;
    if argument.has_type_vars() {
        debug!(
            capturing_class = capturing_class.0,
            "capture_type_argument: argument is not fixed"
        );
        return Err(missing());
    }
    Key::of(env, argument.clone())
}

#[cfg(test)]
#[path = "../tests/capture_tests.rs"]
mod tests;
