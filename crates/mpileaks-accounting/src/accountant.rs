use std::sync::{Arc, Mutex};

use mpileaks_callpath::{CallPath, CallPathRuntime};

use crate::handle::Handle;

/// Result of attempting to retire a handle's tracked call-path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    /// A previously tracked allocation was found and retired.
    Removed,
    /// No allocation was on record for this handle; the free-site call-path
    /// was folded into `missing_alloc`.
    NotFound,
}

/// The behavior specific to one handle kind (request, communicator, window,
/// ...). Every variant (`SetAccountant`, `SingleAccountant`,
/// `StackAccountant`) implements exactly these operations; the shared
/// allocate/free guard logic lives once in [`Tracked`] rather than being
/// re-derived per variant.
///
/// Grounded on `Callpath2Count`'s role as the "uniform interface" base class
/// the original tool's template instances (`Handle2Set<T>`,
/// `Handle2Callpath<T>`, ...) all implement.
pub trait Accountant: Send {
    fn is_handle_null(&self, handle: Handle) -> bool;
    fn contains_handle(&self, handle: Handle) -> bool;
    fn add_callpath(&mut self, handle: Handle, path: CallPath);
    /// Retires the tracked call-path(s) for `handle`. Only called once
    /// `contains_handle` has confirmed the handle is present.
    fn remove_callpath(&mut self, handle: Handle);
    /// Folds a free-site call-path into `missing_alloc`, for a free on a
    /// handle this accountant never recorded an allocate for.
    fn record_missing_alloc(&mut self, path: CallPath);
    fn definite_leaks(&self) -> Vec<(CallPath, u32)>;
    fn possible_leaks(&self) -> Vec<(CallPath, u32)>;
    fn missing_alloc(&self) -> Vec<(CallPath, u32)>;
}

/// Narrow, object-safe read side of an [`Accountant`], used by [`Roster`] so
/// finalize-time reporting never needs the concrete accountant type.
pub trait LeakReport: Send + Sync {
    fn definite_leaks(&self) -> Vec<(CallPath, u32)>;
    fn possible_leaks(&self) -> Vec<(CallPath, u32)>;
    fn missing_alloc(&self) -> Vec<(CallPath, u32)>;
}

/// Wraps one concrete [`Accountant`] with the allocate/free guard logic
/// every handle kind shares: skip null handles, capture a call-path one
/// frame shallower than the interpose wrapper itself (`chop + 1`), and hand
/// the result to the accountant.
pub struct Tracked<A: Accountant> {
    runtime: CallPathRuntime,
    inner: Mutex<A>,
}

impl<A: Accountant> Tracked<A> {
    pub fn new(accountant: A) -> Self {
        Tracked {
            runtime: CallPathRuntime::new(),
            inner: Mutex::new(accountant),
        }
    }

    pub fn allocate(&self, handle: Handle, chop: i32, depth: i32) {
        if self.inner.lock().unwrap().is_handle_null(handle) {
            return;
        }
        let path = self.runtime.capture(chop_frames(chop), depth);
        self.inner.lock().unwrap().add_callpath(handle, path);
    }

    pub fn free(&self, handle: Handle, chop: i32, depth: i32) -> RemoveOutcome {
        let mut guard = self.inner.lock().unwrap();
        if guard.is_handle_null(handle) {
            return RemoveOutcome::NotFound;
        }
        if guard.contains_handle(handle) {
            guard.remove_callpath(handle);
            RemoveOutcome::Removed
        } else {
            drop(guard);
            let path = self.runtime.capture(chop_frames(chop), depth);
            self.inner.lock().unwrap().record_missing_alloc(path);
            RemoveOutcome::NotFound
        }
    }

    /// Borrows the accountant directly, for variants whose free semantics
    /// need more than a single captured path (the request family's
    /// array-completion snapshot/compare handled in `mpileaks-interpose`).
    pub fn with_inner<R>(&self, f: impl FnOnce(&mut A) -> R) -> R {
        f(&mut self.inner.lock().unwrap())
    }
}

impl<A: Accountant> LeakReport for Tracked<A> {
    fn definite_leaks(&self) -> Vec<(CallPath, u32)> {
        self.inner.lock().unwrap().definite_leaks()
    }

    fn possible_leaks(&self) -> Vec<(CallPath, u32)> {
        self.inner.lock().unwrap().possible_leaks()
    }

    fn missing_alloc(&self) -> Vec<(CallPath, u32)> {
        self.inner.lock().unwrap().missing_alloc()
    }
}

fn chop_frames(chop: i32) -> usize {
    (chop + 1).max(0) as usize
}

/// Process-wide list of every registered accountant, queried once at
/// finalize time to assemble the three report sections.
///
/// Grounded on `h2cpc_objs`, the original's global `list<Callpath2Count*>`
/// populated by each `Callpath2Count` subclass's constructor.
#[derive(Default)]
pub struct Roster {
    entries: Mutex<Vec<Arc<dyn LeakReport>>>,
}

impl Roster {
    pub fn new() -> Self {
        Roster::default()
    }

    pub fn register(&self, accountant: Arc<dyn LeakReport>) {
        self.entries.lock().unwrap().push(accountant);
    }

    pub fn definite_leaks(&self) -> Vec<(CallPath, u32)> {
        self.merge(|a| a.definite_leaks())
    }

    pub fn possible_leaks(&self) -> Vec<(CallPath, u32)> {
        self.merge(|a| a.possible_leaks())
    }

    pub fn missing_alloc(&self) -> Vec<(CallPath, u32)> {
        self.merge(|a| a.missing_alloc())
    }

    fn merge(&self, f: impl Fn(&Arc<dyn LeakReport>) -> Vec<(CallPath, u32)>) -> Vec<(CallPath, u32)> {
        self.entries.lock().unwrap().iter().flat_map(f).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::set::SetAccountant;

    #[test]
    fn roster_merges_across_registered_accountants() {
        let roster = Roster::new();
        let a = Arc::new(Tracked::new(SetAccountant::new()));
        let b = Arc::new(Tracked::new(SetAccountant::new()));
        a.allocate(Handle(1), 0, -1);
        b.allocate(Handle(2), 0, -1);
        roster.register(a.clone());
        roster.register(b.clone());

        assert_eq!(roster.definite_leaks().len(), 2);
    }

    #[test]
    fn tracked_skips_null_handles() {
        let t = Tracked::new(SetAccountant::new());
        t.allocate(Handle(0), 0, -1);
        assert!(t.definite_leaks().is_empty());
    }
}
