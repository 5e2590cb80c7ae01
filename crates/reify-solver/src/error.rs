//! Failure taxonomy for the descriptor engine.
//!
//! Every failure is raised synchronously at the violating call. Nothing is
//! retried internally and no operation leaves a partial result behind.

use thiserror::Error;

/// Result type alias for solver operations.
pub type Result<T> = std::result::Result<T, ReflectError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReflectError {
    /// Malformed shape: unresolved placeholder escaping its binding context,
    /// wrong arity, or a placeholder where a nominal identity is required.
    #[error("invalid descriptor `{descriptor}`: {reason}")]
    InvalidDescriptor { descriptor: String, reason: String },

    /// Queue-mode actualization ran out of bindings.
    #[error("ran out of bindings at `{placeholder}` after consuming {consumed}")]
    BindingExhausted { placeholder: String, consumed: usize },

    /// Queue-mode actualization finished with bindings left over.
    #[error("{remaining} binding(s) left unconsumed after actualizing `{template}`")]
    ExcessBindings { template: String, remaining: usize },

    /// A candidate does not satisfy a declared upper or lower bound.
    #[error("`{candidate}` does not satisfy bound `{bound}` of `{placeholder}`")]
    BoundViolation {
        placeholder: String,
        bound: String,
        candidate: String,
    },

    /// The requested ancestor shape is not reachable from the descriptor.
    #[error("`{ancestor}` is not a supertype of `{descriptor}`")]
    NotASupertype { descriptor: String, ancestor: String },

    /// A checked downcast or argument check failed.
    #[error("cannot cast `{actual}` to `{required}`")]
    CastError { required: String, actual: String },

    /// The capture idiom was applied to a declaration that does not fix its
    /// type argument.
    #[error("`{declaration}` does not fix a type argument of `{capture_base}`")]
    MissingTypeParameter {
        declaration: String,
        capture_base: String,
    },

    /// The hierarchy has no declaration for a referenced identity.
    #[error("no declaration registered for definition #{0}")]
    UnknownDefinition(u32),

    /// An invocation supplied the wrong number of arguments.
    #[error("`{signature}` expects {expected} argument(s), got {actual}")]
    ArityMismatch {
        signature: String,
        expected: usize,
        actual: usize,
    },

    /// A recursion limit fired; the input is pathologically deep or cyclic.
    #[error("{operation} exceeded the depth limit of {limit}")]
    DepthExceeded { operation: &'static str, limit: u32 },

    /// A recorded stream tag does not match the expected Key.
    #[error("stream tag mismatch: expected `{expected}`, recorded `{recorded}`")]
    TagMismatch { expected: String, recorded: String },
}

impl ReflectError {
    pub(crate) fn invalid(descriptor: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidDescriptor {
            descriptor: descriptor.into(),
            reason: reason.into(),
        }
    }

    /// Returns `true` for failures caused by a value or binding not fitting a
    /// shape, as opposed to malformed input.
    pub fn is_mismatch(&self) -> bool {
        matches!(
            self,
            Self::BoundViolation { .. } | Self::CastError { .. } | Self::TagMismatch { .. }
        )
    }
}
