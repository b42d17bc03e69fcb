use crate::patch::{Patch, PatchBuilder};
use tracing::debug;

/// Row-major `(base.len() + 1) x (work.len() + 1)` table of LCS lengths.
struct Table {
    cells: Vec<usize>,
    width: usize,
}

impl Table {
    fn build<T: Eq>(base: &[T], work: &[T]) -> Self {
        let width = work.len() + 1;
        let mut table = Table {
            cells: vec![0; (base.len() + 1) * width],
            width,
        };
        for (i, b) in base.iter().enumerate() {
            for (j, w) in work.iter().enumerate() {
                let value = if b == w {
                    table.get(i, j) + 1
                } else {
                    table.get(i + 1, j).max(table.get(i, j + 1))
                };
                table.set(i + 1, j + 1, value);
            }
        }
        table
    }

    fn get(&self, i: usize, j: usize) -> usize {
        self.cells[i * self.width + j]
    }

    fn set(&mut self, i: usize, j: usize, value: usize) {
        self.cells[i * self.width + j] = value;
    }
}

/// Computes a longest common subsequence of `base` and `work`.
///
/// The table costs `O(base.len() * work.len())` in time and memory. When
/// several subsequences are equally long, backtracking prefers dropping a
/// base element over dropping a work element, which keeps the result
/// deterministic.
///
/// # Examples
///
/// ```
/// use seqpatch::lcs::lcs;
///
/// assert_eq!(lcs(&[1, 2, 3, 4], &[2, 4, 5]), vec![2, 4]);
/// ```
pub fn lcs<T: Eq + Clone>(base: &[T], work: &[T]) -> Vec<T> {
    let table = Table::build(base, work);
    let mut common = Vec::with_capacity(table.get(base.len(), work.len()));
    let (mut x, mut y) = (base.len(), work.len());
    while x != 0 && y != 0 {
        let here = table.get(x, y);
        if here == table.get(x - 1, y) {
            x -= 1;
        } else if here == table.get(x, y - 1) {
            y -= 1;
        } else {
            common.push(base[x - 1].clone());
            x -= 1;
            y -= 1;
        }
    }
    common.reverse();
    common
}

/// Computes the patch that turns `base` into `work`.
///
/// Consecutive insertions and consecutive deletions are merged into single
/// changes, and both lists come out in ascending base order.
///
/// # Examples
///
/// ```
/// use seqpatch::lcs::diff;
/// use seqpatch::patch::{Addition, Deletion};
///
/// let patch = diff(&["a", "b", "c"], &["a", "x", "c"]);
/// assert_eq!(patch.deletions(), &[Deletion::new(2, 1)]);
/// assert_eq!(patch.additions(), &[Addition::new(2, vec!["x"])]);
/// ```
pub fn diff<T: Eq + Clone>(base: &[T], work: &[T]) -> Patch<T> {
    let common = lcs(base, work);
    let mut builder = PatchBuilder::new();
    let (mut in_base, mut in_work, mut in_common) = (0, 0, 0);

    while in_base < base.len() || in_work < work.len() {
        let next = common.get(in_common);
        let base_matches = base.get(in_base) == next;
        let work_matches = work.get(in_work) == next;

        if base_matches && work_matches {
            in_base += 1;
            in_work += 1;
            in_common += 1;
            builder.keep();
        } else if base_matches {
            builder.insert(in_base, work[in_work].clone());
            in_work += 1;
        } else {
            in_base += 1;
            builder.delete(in_base);
        }
    }

    let patch = builder.finish();
    debug!(
        base = base.len(),
        work = work.len(),
        common = common.len(),
        additions = patch.additions().len(),
        deletions = patch.deletions().len(),
        "computed patch"
    );
    patch
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patch::{Addition, Deletion};
    use proptest::prelude::*;

    fn is_subsequence<T: Eq>(needle: &[T], haystack: &[T]) -> bool {
        let mut rest = haystack.iter();
        needle.iter().all(|n| rest.any(|h| h == n))
    }

    proptest! {
        #[test]
        fn test_lcs_is_common(old: Vec<u8>, new: Vec<u8>) {
            let common = lcs(&old, &new);
            prop_assert!(is_subsequence(&common, &old));
            prop_assert!(is_subsequence(&common, &new));
        }

        #[test]
        fn test_length_invariant(
            old in prop::collection::vec(0u8..6, 0..40),
            new in prop::collection::vec(0u8..6, 0..40),
        ) {
            let common = lcs(&old, &new).len();
            let patch = diff(&old, &new);
            let deleted: usize = patch.deletions().iter().map(|d| d.length).sum();
            let added: usize = patch.additions().iter().map(|a| a.len()).sum();
            prop_assert_eq!(old.len(), deleted + common);
            prop_assert_eq!(new.len(), added + common);
        }

        #[test]
        fn test_idempotency(els: Vec<u8>) {
            prop_assert!(diff(&els, &els).is_empty());
        }

        #[test]
        fn test_new_empty(els in prop::collection::vec(any::<u8>(), 1..50)) {
            let patch = diff(&els, &[]);
            prop_assert!(patch.additions().is_empty());
            prop_assert_eq!(patch.deletions(), &[Deletion::new(1, els.len())]);
        }

        #[test]
        fn test_old_empty(els in prop::collection::vec(any::<u8>(), 1..50)) {
            let patch = diff(&[], &els);
            prop_assert!(patch.deletions().is_empty());
            prop_assert_eq!(patch.additions(), &[Addition::new(0, els.clone())]);
        }

        #[test]
        fn test_changes_are_ordered(old: Vec<u8>, new: Vec<u8>) {
            let patch = diff(&old, &new);
            prop_assert!(patch.additions().windows(2).all(|w| w[0].start < w[1].start));
            prop_assert!(patch
                .deletions()
                .windows(2)
                .all(|w| w[0].start + w[0].length <= w[1].start));
        }
    }

    #[test]
    fn test_lcs_prefers_dropping_base() {
        // both [a] and [b] are valid answers
        assert_eq!(lcs(&["a", "b"], &["b", "a"]), vec!["a"]);
    }

    #[test]
    fn test_lcs_duplicates() {
        assert_eq!(lcs(&["a", "a", "b"], &["a", "b", "b"]), vec!["a", "b"]);
    }

    #[test]
    fn test_simple_diff() {
        let patch = diff(&["a", "b", "c"], &["a", "x", "c"]);
        assert_eq!(patch.deletions(), &[Deletion::new(2, 1)]);
        assert_eq!(patch.additions(), &[Addition::new(2, vec!["x"])]);
    }

    #[test]
    fn test_insertion_in_middle() {
        let patch = diff(&["a", "b"], &["a", "z", "b"]);
        assert!(patch.deletions().is_empty());
        assert_eq!(patch.additions(), &[Addition::new(1, vec!["z"])]);
    }

    #[test]
    fn test_deletion_in_middle() {
        let patch = diff(&["a", "b", "c"], &["a", "c"]);
        assert!(patch.additions().is_empty());
        assert_eq!(patch.deletions(), &[Deletion::new(2, 1)]);
    }

    #[test]
    fn test_single_element_different() {
        let patch = diff(&["a"], &["b"]);
        assert_eq!(patch.deletions(), &[Deletion::new(1, 1)]);
        assert_eq!(patch.additions(), &[Addition::new(1, vec!["b"])]);
    }

    #[test]
    fn test_completely_different() {
        let patch = diff(&["a", "b", "c"], &["x", "y", "z"]);
        assert_eq!(patch.deletions(), &[Deletion::new(1, 3)]);
        assert_eq!(patch.additions(), &[Addition::new(3, vec!["x", "y", "z"])]);
    }

    #[test]
    fn test_longer_replacement() {
        let patch = diff(&["a", "b", "c", "d"], &["a", "x", "d"]);
        assert_eq!(patch.deletions(), &[Deletion::new(2, 2)]);
        assert_eq!(patch.additions(), &[Addition::new(3, vec!["x"])]);
    }
}
