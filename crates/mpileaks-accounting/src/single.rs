use std::collections::HashMap;

use mpileaks_callpath::CallPath;

use crate::accountant::Accountant;
use crate::countmap::CountMap;
use crate::handle::Handle;

/// Associates a handle with exactly one call-path: the simplest container,
/// for handle kinds the host library allocates through a single call site
/// per handle value (memory-registration base pointers from
/// `MPI_Alloc_mem`, windows).
///
/// Ported from `Handle2Callpath<T>`. Like [`crate::set::SetAccountant`],
/// the null test is handle-kind specific rather than a blanket zero check —
/// a memory base pointer, for instance, never goes null on free and is
/// never excluded from tracking on that basis.
#[derive(Debug)]
pub struct SingleAccountant {
    entries: HashMap<Handle, CallPath>,
    callpath2count: CountMap,
    missing_alloc: CountMap,
    is_null: fn(Handle) -> bool,
}

impl Default for SingleAccountant {
    fn default() -> Self {
        SingleAccountant::new()
    }
}

impl SingleAccountant {
    pub fn new() -> Self {
        SingleAccountant::with_null_test(Handle::is_null)
    }

    pub fn with_null_test(is_null: fn(Handle) -> bool) -> Self {
        SingleAccountant {
            entries: HashMap::new(),
            callpath2count: CountMap::new(),
            missing_alloc: CountMap::new(),
            is_null,
        }
    }
}

impl Accountant for SingleAccountant {
    fn is_handle_null(&self, handle: Handle) -> bool {
        (self.is_null)(handle)
    }

    fn contains_handle(&self, handle: Handle) -> bool {
        self.entries.contains_key(&handle)
    }

    fn add_callpath(&mut self, handle: Handle, path: CallPath) {
        if self.entries.contains_key(&handle) {
            tracing::error!(
                "mpileaks: Internal Error: SingleAccountant: attempting to overwrite callpath of existing handle; cannot associate one handle to more than one callpath (use SetAccountant instead)"
            );
            return;
        }
        self.callpath2count.increase(path.clone(), 1);
        self.entries.insert(handle, path);
    }

    fn remove_callpath(&mut self, handle: Handle) {
        let Some(path) = self.entries.remove(&handle) else {
            tracing::error!(
                "mpileaks: Internal Error: SingleAccountant: remove_callpath called on handle absent from the map"
            );
            return;
        };
        self.callpath2count.decrease(&path, 1);
    }

    fn record_missing_alloc(&mut self, path: CallPath) {
        self.missing_alloc.increase(path, 1);
    }

    fn definite_leaks(&self) -> Vec<(CallPath, u32)> {
        self.callpath2count.to_list()
    }

    /// A handle-to-callpath mapping is never ambiguous, so this variant
    /// never reports a possible leak.
    fn possible_leaks(&self) -> Vec<(CallPath, u32)> {
        Vec::new()
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
    fn tracks_one_path_per_handle() {
        let mut acc = SingleAccountant::new();
        acc.add_callpath(Handle(1), path("f"));
        assert_eq!(acc.definite_leaks(), vec![(path("f"), 1)]);
        assert!(acc.possible_leaks().is_empty());
    }

    #[test]
    fn re_adding_existing_handle_is_ignored_not_overwritten() {
        let mut acc = SingleAccountant::new();
        acc.add_callpath(Handle(1), path("f"));
        acc.add_callpath(Handle(1), path("g"));
        assert_eq!(acc.definite_leaks(), vec![(path("f"), 1)]);
    }

    #[test]
    fn remove_retires_the_handle() {
        let mut acc = SingleAccountant::new();
        acc.add_callpath(Handle(1), path("f"));
        acc.remove_callpath(Handle(1));
        assert!(!acc.contains_handle(Handle(1)));
        assert!(acc.definite_leaks().is_empty());
    }
}
