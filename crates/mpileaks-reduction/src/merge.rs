use mpileaks_callpath::CallPath;

/// Two-pointer merge of two call-path-ascending-sorted lists, summing
/// counts where the same call-path appears in both. Ported from
/// `list_merge`.
pub fn merge_sorted(
    mut list1: Vec<(CallPath, u32)>,
    list2: Vec<(CallPath, u32)>,
) -> Vec<(CallPath, u32)> {
    let mut merged = Vec::with_capacity(list1.len() + list2.len());
    let mut it1 = list1.drain(..).peekable();
    let mut it2 = list2.into_iter().peekable();

    loop {
        match (it1.peek(), it2.peek()) {
            (Some((p1, _)), Some((p2, _))) => {
                if p2 < p1 {
                    merged.push(it2.next().unwrap());
                } else if p1 < p2 {
                    merged.push(it1.next().unwrap());
                } else {
                    let (path, c1) = it1.next().unwrap();
                    let (_, c2) = it2.next().unwrap();
                    merged.push((path, c1 + c2));
                }
            }
            (Some(_), None) => merged.push(it1.next().unwrap()),
            (None, Some(_)) => merged.push(it2.next().unwrap()),
            (None, None) => break,
        }
    }
    merged
}

/// Sorts ascending by call-path, matching `compare_callpaths`.
pub fn sort_by_callpath(list: &mut [(CallPath, u32)]) {
    list.sort_by(|a, b| a.0.cmp(&b.0));
}

/// Sorts by count descending, then call-path ascending, matching
/// `compare_counts`.
pub fn sort_by_count_desc(list: &mut [(CallPath, u32)]) {
    list.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
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
            addr: 0x1,
        }])
    }

    #[test]
    fn merge_sums_shared_callpaths() {
        let a = vec![(path("a"), 1), (path("c"), 4)];
        let b = vec![(path("a"), 2), (path("b"), 3)];
        let merged = merge_sorted(a, b);
        let mut sorted = merged;
        sort_by_callpath(&mut sorted);
        assert_eq!(sorted, vec![(path("a"), 3), (path("b"), 3), (path("c"), 4)]);
    }

    #[test]
    fn count_sort_breaks_ties_by_callpath() {
        let mut list = vec![(path("b"), 5), (path("a"), 5), (path("z"), 9)];
        sort_by_count_desc(&mut list);
        assert_eq!(list, vec![(path("z"), 9), (path("a"), 5), (path("b"), 5)]);
    }

    #[quickcheck_macros::quickcheck]
    fn merge_is_commutative(a_counts: Vec<u32>, b_counts: Vec<u32>) -> bool {
        let symbols = ["a", "b", "c", "d"];
        let build = |counts: &[u32]| -> Vec<(CallPath, u32)> {
            // A real per-peer list never repeats a call-path (it comes out of
            // a `CountMap`), so fold same-symbol entries together rather
            // than feeding the two-pointer merge malformed input.
            let mut totals = std::collections::BTreeMap::new();
            for (i, &n) in counts.iter().enumerate() {
                if n == 0 {
                    continue;
                }
                *totals.entry(symbols[i % symbols.len()]).or_insert(0u32) += n;
            }
            let mut list: Vec<(CallPath, u32)> =
                totals.into_iter().map(|(sym, n)| (path(sym), n)).collect();
            sort_by_callpath(&mut list);
            list
        };
        let a = build(&a_counts);
        let b = build(&b_counts);

        let mut forward = merge_sorted(a.clone(), b.clone());
        let mut backward = merge_sorted(b, a);
        sort_by_callpath(&mut forward);
        sort_by_callpath(&mut backward);
        forward == backward
    }
}
