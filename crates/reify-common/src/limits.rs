//! Centralized limits for recursive descriptor computations.
//!
//! Descriptor trees are shallow in practice (nesting follows declaration
//! nesting), so these limits only fire on malformed or adversarial input.
//! They keep every engine operation bounded without a cancellation concept.
//!
//! # Solver profiles
//!
//! The solver wraps these values in `reify_solver::recursion::RecursionProfile`
//! so that each guard names its purpose at the call site.

/// Maximum nesting depth while substituting bindings into a descriptor.
///
/// ```text
/// Mapping<Text, Sequence<Sequence<Sequence< ... 64 levels ... >>>>
/// ```
///
/// Exceeding it reports `DepthExceeded` instead of overflowing the stack.
pub const MAX_ACTUALIZATION_DEPTH: u32 = 64;

/// Maximum nesting depth for assignability checks.
///
/// Each wildcard bound or nested argument adds one level. Bound checks of
/// self-referential variables (`T extends Comparable<? super T>`) re-enter
/// the checker once per bound, so this is deliberately larger than the
/// actualization depth.
pub const MAX_ASSIGNABILITY_DEPTH: u32 = 128;

/// Maximum number of supertype edges followed when locating an ancestor
/// shape or answering a nominal sub-identity question.
pub const MAX_HIERARCHY_DEPTH: u32 = 256;

/// Maximum number of total visits during a single hierarchy walk.
pub const MAX_HIERARCHY_VISITS: u32 = 10_000;
