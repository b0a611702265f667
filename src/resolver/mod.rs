//! Dependency-ordered import resolution
//!
//! The core of the write-output pass: given an entry chunk key, produce the
//! deduplicated sequence of chunk keys the entry transitively needs at load
//! time, dependencies first and the entry itself last. A script that defines
//! a symbol must be referenced before the script that uses it, so ordering
//! here is load-order-critical.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::bundle::Bundle;

/// Memoizing dependency-order resolver over one bundle's chunk graph.
///
/// One resolver serves exactly one bundle-write event. Results are cached per
/// entry key, and when a later entry's traversal reaches a previously
/// resolved entry, the cached list is spliced in wholesale instead of being
/// re-traversed. Total work across all entries therefore stays proportional
/// to the graph size, not to entries times graph size.
pub struct ImportResolver<'a> {
    bundle: &'a Bundle,
    cache: HashMap<String, Vec<String>>,
}

impl<'a> ImportResolver<'a> {
    /// Create a resolver for the given bundle.
    pub fn new(bundle: &'a Bundle) -> Self {
        Self {
            bundle,
            cache: HashMap::new(),
        }
    }

    /// Resolve `key` to its load-ordered chunk list.
    ///
    /// Every chunk reachable from `key` appears exactly once, after all of
    /// its own imports, with `key` itself in final position. Import edges
    /// that would close a cycle are skipped at the first re-encounter rather
    /// than reported as errors, so resolution always terminates. Repeated
    /// calls for the same key return the cached result.
    ///
    /// # Panics
    ///
    /// Panics if `key`, or any import reachable from it, is missing from the
    /// bundle (see [`Bundle::imports_of`]).
    pub fn resolve(&mut self, key: &str) -> &[String] {
        if !self.cache.contains_key(key) {
            let mut ordered = Vec::new();
            let mut visiting = HashSet::new();
            self.search(key, &mut visiting, &mut ordered);

            debug!("resolved {} -> {} chunk(s)", key, ordered.len());

            self.cache.insert(key.to_string(), ordered);
        }

        &self.cache[key]
    }

    /// Depth-first post-order emission into `ordered`.
    ///
    /// `visiting` holds every key currently on the recursion stack or already
    /// emitted during this top-level call; it suppresses both infinite
    /// recursion on cycles and duplicate emission of diamond-shared imports.
    fn search(&mut self, key: &str, visiting: &mut HashSet<String>, ordered: &mut Vec<String>) {
        if let Some(resolved) = self.cache.get(key) {
            // Splice a previously resolved entry's list in, minus anything
            // this call already emitted, then mark the whole list so later
            // siblings do not re-emit it.
            for sub_key in resolved {
                if visiting.insert(sub_key.clone()) {
                    ordered.push(sub_key.clone());
                }
            }
            return;
        }

        if !visiting.insert(key.to_string()) {
            // Cycle: the frame that first reached this key emits it.
            return;
        }

        let bundle = self.bundle;
        for sub_key in bundle.imports_of(key) {
            self.search(sub_key, visiting, ordered);
        }

        ordered.push(key.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::OutputChunk;

    fn bundle(edges: &[(&str, &[&str])]) -> Bundle {
        let mut bundle = Bundle::new();
        for (key, imports) in edges {
            bundle.insert(*key, OutputChunk::new(imports.iter().copied()));
        }
        bundle
    }

    #[test]
    fn test_simple_chain_is_dependency_first() {
        let bundle = bundle(&[("index.js", &["foo.js"]), ("foo.js", &[])]);
        let mut resolver = ImportResolver::new(&bundle);

        assert_eq!(resolver.resolve("index.js"), ["foo.js", "index.js"]);
    }

    #[test]
    fn test_acyclic_graph_is_topologically_ordered() {
        let bundle = bundle(&[
            ("entry", &["a", "b"]),
            ("a", &["shared"]),
            ("b", &["shared"]),
            ("shared", &[]),
        ]);
        let mut resolver = ImportResolver::new(&bundle);

        let order = resolver.resolve("entry").to_vec();
        assert_eq!(order, ["shared", "a", "b", "entry"]);
    }

    #[test]
    fn test_cycle_terminates_and_emits_each_key_once() {
        let bundle = bundle(&[("a", &["b"]), ("b", &["c"]), ("c", &["a"])]);
        let mut resolver = ImportResolver::new(&bundle);

        let order = resolver.resolve("a").to_vec();
        assert_eq!(order, ["c", "b", "a"]);
    }

    #[test]
    fn test_self_import_is_skipped() {
        let bundle = bundle(&[("loop.js", &["loop.js"])]);
        let mut resolver = ImportResolver::new(&bundle);

        assert_eq!(resolver.resolve("loop.js"), ["loop.js"]);
    }

    #[test]
    fn test_diamond_shared_dependency_emitted_once_per_entry() {
        let bundle = bundle(&[
            ("index", &["pref"]),
            ("index2", &["pref"]),
            ("pref", &["poly"]),
            ("poly", &[]),
        ]);
        let mut resolver = ImportResolver::new(&bundle);

        assert_eq!(resolver.resolve("index"), ["poly", "pref", "index"]);
        assert_eq!(resolver.resolve("index2"), ["poly", "pref", "index2"]);
    }

    #[test]
    fn test_cached_entry_is_spliced_into_later_queries() {
        let bundle = bundle(&[
            ("pref", &["poly"]),
            ("poly", &[]),
            ("index", &["pref"]),
        ]);
        let mut resolver = ImportResolver::new(&bundle);

        // Resolve the shared entry first so the later query hits the cache.
        assert_eq!(resolver.resolve("pref"), ["poly", "pref"]);
        assert_eq!(resolver.resolve("index"), ["poly", "pref", "index"]);
    }

    #[test]
    fn test_spliced_list_suppresses_later_sibling_duplicates() {
        // `entry` imports a cached entry whose list contains `z`, then a
        // fresh import that also reaches `z`.
        let bundle = bundle(&[
            ("x", &["z"]),
            ("y", &["z"]),
            ("z", &[]),
            ("entry", &["x", "y"]),
        ]);
        let mut resolver = ImportResolver::new(&bundle);

        assert_eq!(resolver.resolve("x"), ["z", "x"]);
        assert_eq!(resolver.resolve("entry"), ["z", "x", "y", "entry"]);
    }

    #[test]
    fn test_repeated_resolution_is_stable() {
        let bundle = bundle(&[("a", &["b", "c"]), ("b", &[]), ("c", &["b"])]);
        let mut resolver = ImportResolver::new(&bundle);

        let first = resolver.resolve("a").to_vec();
        let second = resolver.resolve("a").to_vec();
        assert_eq!(first, second);
        assert_eq!(first, ["b", "c", "a"]);
    }

    #[test]
    fn test_imports_resolve_in_declaration_order() {
        let bundle = bundle(&[("entry", &["late", "early"]), ("late", &[]), ("early", &[])]);
        let mut resolver = ImportResolver::new(&bundle);

        assert_eq!(resolver.resolve("entry"), ["late", "early", "entry"]);
    }

    #[test]
    #[should_panic(expected = "not present in the bundle")]
    fn test_dangling_import_violates_graph_contract() {
        let bundle = bundle(&[("entry", &["missing"])]);
        let mut resolver = ImportResolver::new(&bundle);
        resolver.resolve("entry");
    }
}
