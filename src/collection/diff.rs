//! Structural difference between two snapshots.
//!
//! Survivors (identifiers present in both snapshots) that belong to the
//! longest increasing run of old positions stay put. Every other survivor is
//! reported as a move, so a pure reorder of N ids moves as few of them as
//! possible. Sections are ranked among sections; items are ranked within
//! their section, so moving a whole section never moves its items.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use super::snapshot::{Identifier, Snapshot};

/// Section and item position inside a snapshot or collection view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct IndexPath {
    pub section: usize,
    pub item: usize,
}

impl IndexPath {
    pub fn new(section: usize, item: usize) -> Self {
        Self { section, item }
    }
}

impl fmt::Display for IndexPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.section, self.item)
    }
}

/// Changes that turn one snapshot into another.
///
/// Deletions use positions in the old snapshot, insertions positions in the
/// new one, and moves go from old to new. Items inside a deleted or inserted
/// section are covered by the section change and not listed again.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SnapshotDiff {
    pub deleted_sections: Vec<usize>,
    pub inserted_sections: Vec<usize>,
    pub moved_sections: Vec<(usize, usize)>,
    pub deleted_items: Vec<IndexPath>,
    pub inserted_items: Vec<IndexPath>,
    pub moved_items: Vec<(IndexPath, IndexPath)>,
}

impl SnapshotDiff {
    pub fn between<S: Identifier, I: Identifier>(old: &Snapshot<S, I>, new: &Snapshot<S, I>) -> Self {
        let mut diff = SnapshotDiff::default();

        let old_sections: HashMap<&S, usize> = old
            .sections()
            .enumerate()
            .map(|(index, (id, _))| (id, index))
            .collect();
        let new_sections: HashMap<&S, usize> = new
            .sections()
            .enumerate()
            .map(|(index, (id, _))| (id, index))
            .collect();

        for (index, (id, _)) in old.sections().enumerate() {
            if !new_sections.contains_key(id) {
                diff.deleted_sections.push(index);
            }
        }

        let mut surviving_sections = Vec::new();
        for (index, (id, _)) in new.sections().enumerate() {
            match old_sections.get(id) {
                Some(&from) => surviving_sections.push((from, index)),
                None => diff.inserted_sections.push(index),
            }
        }
        let sources: Vec<usize> = surviving_sections.iter().map(|&(from, _)| from).collect();
        let stays = longest_increasing_run(&sources);
        for (&(from, to), stays) in surviving_sections.iter().zip(stays) {
            if !stays {
                diff.moved_sections.push((from, to));
            }
        }

        let old_items = positions(old);
        let new_items = positions(new);

        for (id, &(from, section)) in &old_items {
            if !new_items.contains_key(id) && new_sections.contains_key(section) {
                diff.deleted_items.push(from);
            }
        }

        for (section, (section_id, items)) in new.sections().enumerate() {
            let section_is_new = !old_sections.contains_key(section_id);
            // (old path, new path) of items that stay in this section, in new order.
            let mut kept = Vec::new();
            for (item, id) in items.iter().enumerate() {
                let to = IndexPath::new(section, item);
                match old_items.get(id) {
                    Some(&(from, old_section)) if old_section == section_id => kept.push((from, to)),
                    Some(&(from, _)) => diff.moved_items.push((from, to)),
                    None if !section_is_new => diff.inserted_items.push(to),
                    None => {}
                }
            }
            let ranks: Vec<usize> = kept.iter().map(|(from, _)| from.item).collect();
            let stays = longest_increasing_run(&ranks);
            for (&(from, to), stays) in kept.iter().zip(stays) {
                if !stays {
                    diff.moved_items.push((from, to));
                }
            }
        }

        diff.deleted_items.sort();
        diff.moved_items.sort_by_key(|&(_, to)| to);
        diff
    }

    pub fn is_empty(&self) -> bool {
        self.change_count() == 0
    }

    pub fn change_count(&self) -> usize {
        self.deleted_sections.len()
            + self.inserted_sections.len()
            + self.moved_sections.len()
            + self.deleted_items.len()
            + self.inserted_items.len()
            + self.moved_items.len()
    }
}

/// item -> (path, section identifier)
fn positions<S: Identifier, I: Identifier>(snapshot: &Snapshot<S, I>) -> HashMap<&I, (IndexPath, &S)> {
    let mut out = HashMap::new();
    for (section, (section_id, items)) in snapshot.sections().enumerate() {
        for (item, id) in items.iter().enumerate() {
            out.insert(id, (IndexPath::new(section, item), section_id));
        }
    }
    out
}

/// Marks the members of one longest strictly increasing subsequence.
fn longest_increasing_run(values: &[usize]) -> Vec<bool> {
    // tails[k]: index into `values` of the smallest tail of a run of length k+1
    let mut tails: Vec<usize> = Vec::new();
    let mut previous: Vec<Option<usize>> = vec![None; values.len()];

    for (index, &value) in values.iter().enumerate() {
        let slot = tails.partition_point(|&tail| values[tail] < value);
        if slot > 0 {
            previous[index] = Some(tails[slot - 1]);
        }
        if slot == tails.len() {
            tails.push(index);
        } else {
            tails[slot] = index;
        }
    }

    let mut members = vec![false; values.len()];
    let mut cursor = tails.last().copied();
    while let Some(index) = cursor {
        members[index] = true;
        cursor = previous[index];
    }
    members
}

#[cfg(test)]
mod tests {
    use super::*;

    type Snap = Snapshot<&'static str, u32>;

    fn snap(sections: &[(&'static str, &[u32])]) -> Snap {
        sections.iter().fold(Snap::empty(), |snapshot, (section, items)| {
            snapshot
                .appending_sections([*section])
                .appending_items_to(items.iter().copied(), section)
        })
    }

    #[test]
    fn identical_snapshots_have_empty_diff() {
        let a = snap(&[("A", &[1, 2]), ("B", &[3])]);
        assert!(SnapshotDiff::between(&a, &a.clone()).is_empty());
    }

    #[test]
    fn from_empty_inserts_sections_only() {
        let new = snap(&[("A", &[1, 2])]);
        let diff = SnapshotDiff::between(&Snap::empty(), &new);
        assert_eq!(diff.inserted_sections, vec![0]);
        assert!(diff.inserted_items.is_empty());
        assert_eq!(diff.change_count(), 1);
    }

    #[test]
    fn item_inserts_and_deletes() {
        let old = snap(&[("A", &[1, 2, 3])]);
        let new = snap(&[("A", &[1, 3, 4])]);
        let diff = SnapshotDiff::between(&old, &new);
        assert_eq!(diff.deleted_items, vec![IndexPath::new(0, 1)]);
        assert_eq!(diff.inserted_items, vec![IndexPath::new(0, 2)]);
        assert!(diff.moved_items.is_empty());
    }

    #[test]
    fn reorder_moves_minimum() {
        let old = snap(&[("A", &[1, 2, 3, 4])]);
        let new = snap(&[("A", &[4, 1, 2, 3])]);
        let diff = SnapshotDiff::between(&old, &new);
        assert_eq!(
            diff.moved_items,
            vec![(IndexPath::new(0, 3), IndexPath::new(0, 0))]
        );
    }

    #[test]
    fn item_changing_section_is_a_move() {
        let old = snap(&[("A", &[1, 2]), ("B", &[3])]);
        let new = snap(&[("A", &[1]), ("B", &[2, 3])]);
        let diff = SnapshotDiff::between(&old, &new);
        assert_eq!(
            diff.moved_items,
            vec![(IndexPath::new(0, 1), IndexPath::new(1, 0))]
        );
    }

    #[test]
    fn swapping_sections_keeps_their_items() {
        let old = snap(&[("A", &[1]), ("B", &[2])]);
        let new = snap(&[("B", &[2]), ("A", &[1])]);
        let diff = SnapshotDiff::between(&old, &new);
        assert_eq!(diff.moved_sections.len(), 1);
        assert!(diff.moved_items.is_empty());
        assert_eq!(diff.change_count(), 1);
    }

    #[test]
    fn reorder_inside_moved_section() {
        let old = snap(&[("A", &[1, 2]), ("B", &[3, 4])]);
        let new = snap(&[("B", &[4, 3]), ("A", &[1, 2])]);
        let diff = SnapshotDiff::between(&old, &new);
        assert_eq!(diff.moved_sections.len(), 1);
        assert_eq!(diff.moved_items.len(), 1);
        assert_eq!(diff.moved_items[0].1.section, 0);
    }

    #[test]
    fn section_moves_and_deletes() {
        let old = snap(&[("A", &[]), ("B", &[]), ("C", &[])]);
        let new = snap(&[("C", &[]), ("A", &[])]);
        let diff = SnapshotDiff::between(&old, &new);
        assert_eq!(diff.deleted_sections, vec![1]);
        assert_eq!(diff.moved_sections, vec![(2, 0)]);
    }

    #[test]
    fn deleted_section_swallows_its_items() {
        let old = snap(&[("A", &[1]), ("B", &[2])]);
        let new = snap(&[("A", &[1])]);
        let diff = SnapshotDiff::between(&old, &new);
        assert_eq!(diff.deleted_sections, vec![1]);
        assert!(diff.deleted_items.is_empty());
    }

    #[test]
    fn lis_marks_longest_run() {
        assert_eq!(
            longest_increasing_run(&[3, 0, 1, 2]),
            vec![false, true, true, true]
        );
        assert!(longest_increasing_run(&[]).is_empty());
    }
}
