//! Per-name stacks of open sections.
//!
//! Each distinct section name owns an independent LIFO stack of
//! [`SectionStart`] entries, so sections with the same name nest and
//! sections with different names interleave freely (open A, open B, close A,
//! close B is legal). Only the stack for a single name is LIFO.
//!
//! Popping an empty stack is a caller contract violation (double exit or
//! exit without enter). The registry reports it as `None`; the facade turns
//! that into a checked error instead of undefined behavior.

use crate::record::SectionStart;
use rustc_hash::FxHashMap;

/// Registry of currently-open sections, keyed by section name.
#[derive(Debug, Default)]
pub struct SectionRegistry {
    open: FxHashMap<String, Vec<SectionStart>>,
}

impl SectionRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a start entry onto `name`'s stack. Nesting depth is bounded only
    /// by memory.
    pub fn push(&mut self, name: &str, start: SectionStart) {
        self.open.entry(name.to_string()).or_default().push(start);
    }

    /// Pop the most recent start entry for `name`.
    ///
    /// Returns `None` when no section under that name is open: a double
    /// exit or an exit without a matching enter.
    pub fn pop(&mut self, name: &str) -> Option<SectionStart> {
        self.open.get_mut(name).and_then(Vec::pop)
    }

    /// Number of currently-open sections under `name`.
    #[must_use]
    pub fn open_count(&self, name: &str) -> usize {
        self.open.get(name).map_or(0, Vec::len)
    }

    /// Total number of currently-open sections across all names.
    #[must_use]
    pub fn total_open(&self) -> usize {
        self.open.values().map(Vec::len).sum()
    }

    /// Abandon every open section without recording it.
    pub fn clear(&mut self) {
        self.open.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start(at: f64) -> SectionStart {
        SectionStart { started_at: at }
    }

    #[test]
    fn test_push_pop_is_lifo_within_a_name() {
        let mut registry = SectionRegistry::new();
        registry.push("load", start(1.0));
        registry.push("load", start(2.0));
        registry.push("load", start(3.0));
        assert_eq!(registry.open_count("load"), 3);

        assert_eq!(registry.pop("load"), Some(start(3.0)));
        assert_eq!(registry.pop("load"), Some(start(2.0)));
        assert_eq!(registry.pop("load"), Some(start(1.0)));
        assert_eq!(registry.open_count("load"), 0);
    }

    #[test]
    fn test_names_interleave_independently() {
        let mut registry = SectionRegistry::new();
        registry.push("a", start(1.0));
        registry.push("b", start(2.0));

        // Closing "a" first must not disturb "b"'s stack.
        assert_eq!(registry.pop("a"), Some(start(1.0)));
        assert_eq!(registry.pop("b"), Some(start(2.0)));
    }

    #[test]
    fn test_pop_empty_stack_is_none() {
        let mut registry = SectionRegistry::new();
        assert_eq!(registry.pop("never-entered"), None);

        registry.push("once", start(1.0));
        assert!(registry.pop("once").is_some());
        assert_eq!(registry.pop("once"), None);
    }

    #[test]
    fn test_clear_abandons_open_sections() {
        let mut registry = SectionRegistry::new();
        registry.push("a", start(1.0));
        registry.push("b", start(2.0));
        assert_eq!(registry.total_open(), 2);

        registry.clear();
        assert_eq!(registry.total_open(), 0);
        assert_eq!(registry.pop("a"), None);
    }
}
