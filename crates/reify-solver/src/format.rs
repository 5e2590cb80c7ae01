//! Canonical text form of descriptors.
//!
//! `Outer<A>.Inner<B>`, `Mapping<Text, Sequence<Integer>>`, `? extends Number`,
//! `? super Integer`, `?`. Deterministic for a given hierarchy, used for
//! diagnostics and as the ordering fallback. Not a parse format.

use crate::def::DefId;
use crate::hierarchy::TypeHierarchy;
use crate::types::{TypeDescriptor, WildcardType};
use std::fmt::Write;

pub struct TypeFormatter<'a> {
    env: &'a dyn TypeHierarchy,
}

impl<'a> TypeFormatter<'a> {
    pub fn new(env: &'a dyn TypeHierarchy) -> Self {
        Self { env }
    }

    pub fn format(&self, descriptor: &TypeDescriptor) -> String {
        let mut out = String::new();
        self.write(&mut out, descriptor);
        out
    }

    pub fn format_list(&self, descriptors: &[TypeDescriptor]) -> String {
        let mut out = String::new();
        self.write_list(&mut out, descriptors, ", ");
        out
    }

    fn write(&self, out: &mut String, descriptor: &TypeDescriptor) {
        match descriptor {
            TypeDescriptor::Concrete(def) => self.write_name(out, *def),
            TypeDescriptor::Parameterized(p) => {
                if let Some(owner) = &p.owner {
                    self.write(out, owner);
                    out.push('.');
                }
                self.write_name(out, p.raw);
                if !p.args.is_empty() {
                    out.push('<');
                    self.write_list(out, &p.args, ", ");
                    out.push('>');
                }
            }
            TypeDescriptor::Var(var) => out.push_str(&self.env.resolve_name(var.name)),
            TypeDescriptor::Wildcard(w) => self.write_wildcard(out, w),
        }
    }

    fn write_wildcard(&self, out: &mut String, w: &WildcardType) {
        out.push('?');
        if !w.upper.is_empty() {
            out.push_str(" extends ");
            self.write_bound_set(out, &w.upper);
        }
        if !w.lower.is_empty() {
            out.push_str(" super ");
            self.write_bound_set(out, &w.lower);
        }
    }

    /// Bounds are sets: sorted by text and deduplicated, so equal wildcards
    /// render identically.
    fn write_bound_set(&self, out: &mut String, bounds: &[TypeDescriptor]) {
        let mut texts: Vec<String> = bounds.iter().map(|b| self.format(b)).collect();
        texts.sort_unstable();
        texts.dedup();
        out.push_str(&texts.join(" & "));
    }

    fn write_list(&self, out: &mut String, items: &[TypeDescriptor], sep: &str) {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                out.push_str(sep);
            }
            self.write(out, item);
        }
    }

    fn write_name(&self, out: &mut String, def: DefId) {
        match self.env.class_info(def) {
            Some(info) => out.push_str(&self.env.resolve_name(info.name)),
            None => {
                let _ = write!(out, "#{}", def.0);
            }
        }
    }
}
