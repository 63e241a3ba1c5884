use std::collections::BTreeMap;

use mpileaks_callpath::CallPath;

/// Map from call-path to a positive count, ordered by call-path so every
/// consumer (the printer, the reduction engine) iterates deterministically
/// without a separate sort step.
///
/// Ported from `Callpath2Count`'s `increase_count`/`decrease_count`/
/// `map2list` helpers: a count map never holds a zero or negative entry —
/// `decrease` removes the entry outright once it would reach zero.
#[derive(Debug, Default, Clone)]
pub struct CountMap {
    counts: BTreeMap<CallPath, u32>,
}

impl CountMap {
    pub fn new() -> Self {
        CountMap::default()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Adds `n` to the count for `path`, inserting a fresh entry if absent.
    pub fn increase(&mut self, path: CallPath, n: u32) {
        debug_assert!(n > 0, "CountMap::increase called with n == 0");
        *self.counts.entry(path).or_insert(0) += n;
    }

    /// Subtracts `n` from the count for `path`. Removes the entry once the
    /// count would reach zero or below. Decreasing a path that isn't
    /// present, or past zero, is an internal inconsistency rather than a
    /// panic — it is logged and otherwise ignored, mirroring the original
    /// tool continuing to run a profiling overlay rather than crashing the
    /// profiled application.
    pub fn decrease(&mut self, path: &CallPath, n: u32) {
        let Some(current) = self.counts.get_mut(path) else {
            tracing::error!(
                "mpileaks: Internal Error: Callpath2Count: found a path in handle2cpc, but no count found in callpath2count"
            );
            return;
        };

        if n > *current {
            tracing::error!("mpileaks: Internal Error: Callpath2Count: negative count detected");
            self.counts.remove(path);
            return;
        }

        if n == *current {
            self.counts.remove(path);
        } else {
            *current -= n;
        }
    }

    pub fn to_list(&self) -> Vec<(CallPath, u32)> {
        self.counts
            .iter()
            .map(|(path, count)| (path.clone(), *count))
            .collect()
    }

    pub fn into_list(self) -> Vec<(CallPath, u32)> {
        self.counts.into_iter().collect()
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
    fn increase_accumulates_on_same_path() {
        let mut map = CountMap::new();
        map.increase(path("f"), 2);
        map.increase(path("f"), 3);
        assert_eq!(map.to_list(), vec![(path("f"), 5)]);
    }

    #[test]
    fn decrease_to_zero_removes_entry() {
        let mut map = CountMap::new();
        map.increase(path("f"), 1);
        map.decrease(&path("f"), 1);
        assert!(map.is_empty());
    }

    #[test]
    fn decrease_partial_keeps_entry() {
        let mut map = CountMap::new();
        map.increase(path("f"), 5);
        map.decrease(&path("f"), 2);
        assert_eq!(map.to_list(), vec![(path("f"), 3)]);
    }

    #[test]
    fn decrease_missing_path_is_noop() {
        let mut map = CountMap::new();
        map.decrease(&path("f"), 1);
        assert!(map.is_empty());
    }

    #[quickcheck_macros::quickcheck]
    fn never_holds_a_zero_or_negative_entry(bumps: Vec<(u8, u32)>) -> bool {
        let mut map = CountMap::new();
        for (sym, n) in bumps {
            if n == 0 {
                continue;
            }
            map.increase(path(&sym.to_string()), n);
        }
        map.to_list().iter().all(|(_, count)| *count > 0)
    }
}
