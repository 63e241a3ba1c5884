use std::collections::HashMap;

use mpileaks_callpath::CallPath;

use crate::accountant::Accountant;
use crate::countmap::CountMap;
use crate::handle::Handle;

/// Associates a handle with an ordered stack of call-paths, for handle
/// kinds where a single handle value can be allocated and freed in nested
/// fashion before being retired. Reserved: no bundled interpose wrapper
/// currently instantiates this variant, but it is exercised directly by
/// this crate's tests.
///
/// Ported from `Handle2Stack<T>`. Null testing is handle-kind specific, the
/// same as `SetAccountant`/`SingleAccountant`.
#[derive(Debug)]
pub struct StackAccountant {
    entries: HashMap<Handle, Vec<CallPath>>,
    callpath2count: CountMap,
    missing_alloc: CountMap,
    is_null: fn(Handle) -> bool,
}

impl Default for StackAccountant {
    fn default() -> Self {
        StackAccountant::new()
    }
}

impl StackAccountant {
    pub fn new() -> Self {
        StackAccountant::with_null_test(Handle::is_null)
    }

    pub fn with_null_test(is_null: fn(Handle) -> bool) -> Self {
        StackAccountant {
            entries: HashMap::new(),
            callpath2count: CountMap::new(),
            missing_alloc: CountMap::new(),
            is_null,
        }
    }
}

impl Accountant for StackAccountant {
    fn is_handle_null(&self, handle: Handle) -> bool {
        (self.is_null)(handle)
    }

    fn contains_handle(&self, handle: Handle) -> bool {
        self.entries
            .get(&handle)
            .is_some_and(|stack| !stack.is_empty())
    }

    fn add_callpath(&mut self, handle: Handle, path: CallPath) {
        self.callpath2count.increase(path.clone(), 1);
        self.entries.entry(handle).or_default().push(path);
    }

    fn remove_callpath(&mut self, handle: Handle) {
        let Some(stack) = self.entries.get_mut(&handle) else {
            tracing::error!(
                "mpileaks: Internal Error: StackAccountant: remove_callpath called on handle absent from the map"
            );
            return;
        };
        if let Some(top) = stack.pop() {
            self.callpath2count.decrease(&top, 1);
        }
        if stack.is_empty() {
            self.entries.remove(&handle);
        }
    }

    fn record_missing_alloc(&mut self, path: CallPath) {
        self.missing_alloc.increase(path, 1);
    }

    fn definite_leaks(&self) -> Vec<(CallPath, u32)> {
        self.callpath2count.to_list()
    }

    /// No notion of an ambiguous allocation site exists for a stack of
    /// definite call-paths, same policy as `SingleAccountant`.
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
    fn nested_allocations_pop_in_lifo_order() {
        let mut acc = StackAccountant::new();
        acc.add_callpath(Handle(1), path("outer"));
        acc.add_callpath(Handle(1), path("inner"));

        let mut leaks = acc.definite_leaks();
        leaks.sort_by(|a, b| a.0.cmp(&b.0));
        assert_eq!(leaks, vec![(path("inner"), 1), (path("outer"), 1)]);

        acc.remove_callpath(Handle(1));
        assert_eq!(acc.definite_leaks(), vec![(path("outer"), 1)]);
        assert!(acc.contains_handle(Handle(1)));

        acc.remove_callpath(Handle(1));
        assert!(acc.definite_leaks().is_empty());
        assert!(!acc.contains_handle(Handle(1)));
    }
}
