mod types;
pub use types::*;

use crate::error::{PatchError, Result};
use tracing::trace;

/// Collects consecutive insertions and deletions into single changes while
/// the diff walks the base and work sequences.
pub(crate) struct PatchBuilder<T> {
    patch: Patch<T>,
    addition: Option<Addition<T>>,
    deletion: Option<Deletion>,
}

impl<T> PatchBuilder<T> {
    pub(crate) fn new() -> Self {
        PatchBuilder {
            patch: Patch::new(),
            addition: None,
            deletion: None,
        }
    }

    /// `at` is the number of base elements consumed so far.
    pub(crate) fn insert(&mut self, at: usize, element: T) {
        self.close_deletion();
        match self.addition {
            Some(ref mut a) => a.elements.push(element),
            None => self.addition = Some(Addition::new(at, vec![element])),
        }
    }

    /// `at` is the 1-based position of the removed base element.
    pub(crate) fn delete(&mut self, at: usize) {
        self.close_addition();
        match self.deletion {
            Some(ref mut d) => d.length += 1,
            None => self.deletion = Some(Deletion::new(at, 1)),
        }
    }

    pub(crate) fn keep(&mut self) {
        self.close_addition();
        self.close_deletion();
    }

    pub(crate) fn finish(mut self) -> Patch<T> {
        self.keep();
        self.patch
    }

    fn close_addition(&mut self) {
        if let Some(a) = self.addition.take() {
            self.patch.push_addition(a);
        }
    }

    fn close_deletion(&mut self) {
        if let Some(d) = self.deletion.take() {
            self.patch.push_deletion(d);
        }
    }
}

/// Rebuilds the work sequence from `base` and a patch computed against it.
///
/// Changes are replayed from the highest base position down so that earlier
/// positions stay valid. A deletion wins a tie with an addition at the same
/// position, and an addition anchored where the last deletion started is
/// moved back over the removed elements, which turns the pair into an
/// in-place replacement.
pub fn apply<T: Clone>(base: &[T], patch: &Patch<T>) -> Result<Vec<T>> {
    let mut work = base.to_vec();
    let mut additions = patch.additions().iter().rev().peekable();
    let mut deletions = patch.deletions().iter().rev().peekable();
    let mut last_deletion: Option<&Deletion> = None;

    loop {
        let deletion_first = match (additions.peek(), deletions.peek()) {
            (None, None) => break,
            (None, Some(_)) => true,
            (Some(_), None) => false,
            (Some(a), Some(d)) => d.start >= a.start,
        };

        if deletion_first {
            let Some(deletion) = deletions.next() else {
                break;
            };
            let from = deletion.start.checked_sub(1).ok_or_else(|| {
                PatchError::invalid("deletion at position 0, positions start at 1")
            })?;
            let to = from
                .checked_add(deletion.length)
                .filter(|&to| to <= work.len());
            let Some(to) = to else {
                return Err(PatchError::invalid(format!(
                    "deletion {},{} reaches past the end of a sequence of {} elements",
                    deletion.start,
                    deletion.length,
                    work.len()
                )));
            };
            trace!(start = deletion.start, length = deletion.length, "applying deletion");
            work.drain(from..to);
            last_deletion = Some(deletion);
        } else {
            let Some(addition) = additions.next() else {
                break;
            };
            let mut at = addition.start;
            if let Some(d) = last_deletion.filter(|d| d.start == at) {
                at = at.checked_sub(d.length).ok_or_else(|| {
                    PatchError::invalid(format!(
                        "addition at {} overlaps deletion {},{}",
                        addition.start, d.start, d.length
                    ))
                })?;
            }
            if at > work.len() {
                return Err(PatchError::invalid(format!(
                    "addition at {} lies past the end of a sequence of {} elements",
                    addition.start,
                    work.len()
                )));
            }
            trace!(start = addition.start, index = at, length = addition.len(), "applying addition");
            work.splice(at..at, addition.elements.iter().cloned());
        }
    }

    Ok(work)
}
