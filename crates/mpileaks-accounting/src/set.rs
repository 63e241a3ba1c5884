use std::collections::{BTreeSet, HashMap};

use mpileaks_callpath::CallPath;

use crate::accountant::Accountant;
use crate::countmap::CountMap;
use crate::handle::Handle;

/// One handle's outstanding allocations: the distinct call-paths that
/// allocated it, and how many allocate calls are currently outstanding in
/// total (a handle can be allocated and freed several times before its
/// value is reused by the host library).
#[derive(Debug, Default, Clone)]
struct SetRecord {
    paths: BTreeSet<CallPath>,
    refcount: u32,
}

/// Associates a handle with the *set* of call-paths that may have allocated
/// it, for handle kinds the host library can re-allocate through more than
/// one call site (requests, communicators, groups, datatypes, file
/// handles, error handlers, info objects, reduction operators, keyval
/// registries).
///
/// Ported from `Handle2Set<T>`. Each handle kind defines its own null
/// sentinel(s) — a plain zero test is wrong for kinds with more than one
/// null value (e.g. a group that is empty rather than unset) — so the test
/// is supplied by the caller rather than hardcoded here.
#[derive(Debug)]
pub struct SetAccountant {
    entries: HashMap<Handle, SetRecord>,
    missing_alloc: CountMap,
    is_null: fn(Handle) -> bool,
}

impl Default for SetAccountant {
    fn default() -> Self {
        SetAccountant::new()
    }
}

impl SetAccountant {
    pub fn new() -> Self {
        SetAccountant::with_null_test(Handle::is_null)
    }

    pub fn with_null_test(is_null: fn(Handle) -> bool) -> Self {
        SetAccountant {
            entries: HashMap::new(),
            missing_alloc: CountMap::new(),
            is_null,
        }
    }
}

impl Accountant for SetAccountant {
    fn is_handle_null(&self, handle: Handle) -> bool {
        (self.is_null)(handle)
    }

    fn contains_handle(&self, handle: Handle) -> bool {
        self.entries.contains_key(&handle)
    }

    fn add_callpath(&mut self, handle: Handle, path: CallPath) {
        let record = self.entries.entry(handle).or_default();
        record.refcount += 1;
        record.paths.insert(path);
    }

    fn remove_callpath(&mut self, handle: Handle) {
        let Some(record) = self.entries.get_mut(&handle) else {
            tracing::error!(
                "mpileaks: Internal Error: SetAccountant: remove_callpath called on handle absent from the map"
            );
            return;
        };

        if record.paths.is_empty() || record.refcount == 0 {
            tracing::error!(
                "mpileaks: Internal Error: SetAccountant: handle present with no outstanding callpaths"
            );
            self.entries.remove(&handle);
            return;
        }

        record.refcount -= 1;
        if record.refcount == 0 {
            self.entries.remove(&handle);
        }
    }

    fn record_missing_alloc(&mut self, path: CallPath) {
        self.missing_alloc.increase(path, 1);
    }

    /// Every handle whose outstanding set names exactly one call-path: that
    /// call-path is the definite allocation site.
    fn definite_leaks(&self) -> Vec<(CallPath, u32)> {
        let mut totals = CountMap::new();
        for record in self.entries.values() {
            if record.paths.len() == 1 {
                let path = record.paths.iter().next().unwrap().clone();
                totals.increase(path, record.refcount);
            }
        }
        totals.into_list()
    }

    /// Every handle whose outstanding set names more than one call-path:
    /// each of those call-paths is a possible allocation site, counted at
    /// the handle's full outstanding refcount (a leak attributed to more
    /// than one candidate site simultaneously).
    fn possible_leaks(&self) -> Vec<(CallPath, u32)> {
        let mut totals = CountMap::new();
        for record in self.entries.values() {
            if record.paths.len() > 1 {
                for path in &record.paths {
                    totals.increase(path.clone(), record.refcount);
                }
            }
        }
        totals.into_list()
    }

    fn missing_alloc(&self) -> Vec<(CallPath, u32)> {
        self.missing_alloc.to_list()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mpileaks_callpath::Frame;

    fn path(symbol: &str) -> CallPath {
        CallPath::new(vec![Frame {
            module: Some("app".into()),
            symbol: Some(symbol.into()),
            line: Some(1),
            addr: 0x1000,
        }])
    }

    #[test]
    fn single_site_is_definite() {
        let mut acc = SetAccountant::new();
        acc.add_callpath(Handle(1), path("f"));
        assert_eq!(acc.definite_leaks(), vec![(path("f"), 1)]);
        assert!(acc.possible_leaks().is_empty());
    }

    #[test]
    fn two_sites_are_possible_at_full_refcount() {
        let mut acc = SetAccountant::new();
        acc.add_callpath(Handle(1), path("f"));
        acc.add_callpath(Handle(1), path("g"));
        let mut possible = acc.possible_leaks();
        possible.sort_by(|a, b| a.1.cmp(&b.1).then(a.0.cmp(&b.0)));
        assert_eq!(possible, vec![(path("f"), 2), (path("g"), 2)]);
        assert!(acc.definite_leaks().is_empty());
    }

    #[test]
    fn refcount_drops_to_zero_retires_handle() {
        let mut acc = SetAccountant::new();
        acc.add_callpath(Handle(1), path("f"));
        assert!(acc.contains_handle(Handle(1)));
        acc.remove_callpath(Handle(1));
        assert!(!acc.contains_handle(Handle(1)));
        assert!(acc.definite_leaks().is_empty());
    }

    #[test]
    fn free_without_matching_alloc_is_missing_alloc() {
        let mut acc = SetAccountant::new();
        acc.record_missing_alloc(path("free_site"));
        assert_eq!(acc.missing_alloc(), vec![(path("free_site"), 1)]);
    }

    #[test]
    fn one_free_after_two_sites_leaves_both_possible_at_remaining_refcount() {
        // Allocated once at site A, once at site B, freed once; record
        // persists with refcount 1, both sites stay candidates since
        // `paths` is never trimmed on a refcount decrement.
        let mut acc = SetAccountant::new();
        acc.add_callpath(Handle(1), path("a"));
        acc.add_callpath(Handle(1), path("b"));
        acc.remove_callpath(Handle(1));

        assert!(acc.definite_leaks().is_empty());
        let mut possible = acc.possible_leaks();
        possible.sort_by(|x, y| x.0.cmp(&y.0));
        assert_eq!(possible, vec![(path("a"), 1), (path("b"), 1)]);
    }
}
