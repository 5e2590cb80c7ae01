//! Specificity ordering over Keys.
//!
//! `compare(a, b)` is `Less` when `a` is strictly more derived than `b` (a
//! value keyed by `a` may be used where `b` is required, but not the
//! reverse), `Equal` when both directions hold, `Greater` when only the
//! reverse holds. Unrelated shapes fall back to their canonical text, then
//! to nominal identity and structural hash when names collide.
//!
//! The relation is not a total order in general (a chain of related and
//! unrelated Keys can be intransitive through the text fallback), so
//! [`KeyOrdering::sort`] does not hand it to `slice::sort_by`. It instead
//! emits, in text order, the first Key no remaining Key strictly precedes.

use crate::error::Result;
use crate::hierarchy::TypeHierarchy;
use crate::key::Key;
use std::cmp::Ordering;

pub struct KeyOrdering<'a> {
    env: &'a dyn TypeHierarchy,
}

impl<'a> KeyOrdering<'a> {
    pub fn new(env: &'a dyn TypeHierarchy) -> Self {
        Self { env }
    }

    pub fn compare(&self, a: &Key, b: &Key) -> Result<Ordering> {
        if a == b {
            return Ok(Ordering::Equal);
        }
        let a_fits_b = b.is_assignable_from(self.env, a)?;
        let b_fits_a = a.is_assignable_from(self.env, b)?;
        Ok(match (a_fits_b, b_fits_a) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            (false, false) => text_order(a, b),
        })
    }

    /// `true` if `a` is strictly more derived than `b`.
    pub fn is_more_specific(&self, a: &Key, b: &Key) -> Result<bool> {
        if a == b {
            return Ok(false);
        }
        Ok(b.is_assignable_from(self.env, a)? && !a.is_assignable_from(self.env, b)?)
    }

    /// Sort most-derived first. Deterministic for a given input set,
    /// whatever the input order.
    pub fn sort(&self, keys: &mut [Key]) -> Result<()> {
        keys.sort_by(|a, b| text_order(a, b));
        for start in 0..keys.len() {
            let pick = self.first_minimal(&keys[start..])?;
            keys[start..=start + pick].rotate_right(1);
        }
        Ok(())
    }

    /// Index of the first Key that no other Key in `keys` strictly precedes.
    fn first_minimal(&self, keys: &[Key]) -> Result<usize> {
        'candidates: for (i, candidate) in keys.iter().enumerate() {
            for other in keys {
                if self.is_more_specific(other, candidate)? {
                    continue 'candidates;
                }
            }
            return Ok(i);
        }
        // Strict specificity is acyclic, so some Key is always minimal.
        Ok(0)
    }

    /// The most derived Key in `keys`, if any.
    pub fn most_specific<'k>(
        &self,
        keys: impl IntoIterator<Item = &'k Key>,
    ) -> Result<Option<&'k Key>> {
        let mut keys: Vec<&Key> = keys.into_iter().collect();
        keys.sort_by(|a, b| text_order(a, b));
        'candidates: for candidate in &keys {
            for other in &keys {
                if self.is_more_specific(other, candidate)? {
                    continue 'candidates;
                }
            }
            return Ok(Some(*candidate));
        }
        Ok(keys.first().copied())
    }
}

/// Canonical text, then identity and hash so distinct shapes that render
/// alike (shadowed declarations) still order apart.
fn text_order(a: &Key, b: &Key) -> Ordering {
    a.as_str()
        .cmp(b.as_str())
        .then_with(|| a.raw_identity().cmp(&b.raw_identity()))
        .then_with(|| a.structural_hash().cmp(&b.structural_hash()))
}

#[cfg(test)]
#[path = "../tests/ordering_tests.rs"]
mod tests;
