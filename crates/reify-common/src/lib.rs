//! Common types and utilities for the reify generic-shape runtime.
//!
//! This crate provides foundational types used across all reify crates:
//! - String interning for declaration names (`Atom`, `ShardedInterner`)
//! - Centralized recursion limits
//! - Tracing subscriber setup

// String interning for class and type-variable names
pub mod interner;
pub use interner::{Atom, ShardedInterner};

// Centralized limits and thresholds
pub mod limits;

// Opt-in tracing subscriber
pub mod tracing_config;
pub use tracing_config::init_tracing;
