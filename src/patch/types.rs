/// A run of elements taken from the work sequence.
///
/// `start` counts the base elements that precede the insertion point, so an
/// addition at `0` lands in front of the whole base and an addition at `n`
/// lands after the `n`-th base element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Addition<T> {
    pub start: usize,
    pub elements: Vec<T>,
}

impl<T> Addition<T> {
    pub fn new(start: usize, elements: Vec<T>) -> Self {
        Addition { start, elements }
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

/// Removes `length` base elements, the first of which sits at the 1-based
/// position `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deletion {
    pub start: usize,
    pub length: usize,
}

impl Deletion {
    pub fn new(start: usize, length: usize) -> Self {
        Deletion { start, length }
    }
}

/// Additions and deletions that turn a base sequence into a work sequence.
///
/// Both lists are ordered by ascending base position, the order in which the
/// diff walks the base sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patch<T> {
    additions: Vec<Addition<T>>,
    deletions: Vec<Deletion>,
}

impl<T> Patch<T> {
    pub fn new() -> Self {
        Patch {
            additions: vec![],
            deletions: vec![],
        }
    }

    pub fn from_parts(additions: Vec<Addition<T>>, deletions: Vec<Deletion>) -> Self {
        Patch {
            additions,
            deletions,
        }
    }

    pub fn additions(&self) -> &[Addition<T>] {
        &self.additions
    }

    pub fn deletions(&self) -> &[Deletion] {
        &self.deletions
    }

    pub fn is_empty(&self) -> bool {
        self.additions.is_empty() && self.deletions.is_empty()
    }

    pub(crate) fn push_addition(&mut self, addition: Addition<T>) {
        self.additions.push(addition);
    }

    pub(crate) fn push_deletion(&mut self, deletion: Deletion) {
        self.deletions.push(deletion);
    }
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Patch::new()
    }
}
