//! Immutable section/item snapshots.

use std::collections::HashSet;
use std::fmt::Debug;
use std::hash::Hash;

use thiserror::Error;

use super::ack::Acknowledgment;
use super::data_source::DiffableDataSource;

/// Bound shared by section and item identifiers.
pub trait Identifier: Clone + Eq + Hash + Debug + Send + Sync + 'static {}

impl<T> Identifier for T where T: Clone + Eq + Hash + Debug + Send + Sync + 'static {}

/// Precondition failures reported by the `try_*` builders.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SnapshotError {
    #[error("section identifier {0} is already in the snapshot")]
    DuplicateSection(String),

    #[error("item identifier {0} is already in the snapshot")]
    DuplicateItem(String),

    #[error("section identifier {0} is not in the snapshot")]
    UnknownSection(String),

    #[error("item identifier {0} is not in the snapshot")]
    UnknownItem(String),

    #[error("cannot append items to a snapshot with no sections")]
    NoSections,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Section<S, I> {
    id: S,
    items: Vec<I>,
}

/// Ordered sections, each holding an ordered list of item identifiers.
///
/// Identifiers are unique across the whole snapshot. Every builder method
/// returns a new snapshot and leaves the receiver untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot<S, I> {
    sections: Vec<Section<S, I>>,
}

impl<S, I> Default for Snapshot<S, I> {
    fn default() -> Self {
        Self {
            sections: Vec::new(),
        }
    }
}

fn expect_valid<T>(operation: &str, result: Result<T, SnapshotError>) -> T {
    match result {
        Ok(value) => value,
        Err(err) => panic!("{operation}: {err}"),
    }
}

impl<S: Identifier, I: Identifier> Snapshot<S, I> {
    pub fn empty() -> Self {
        Self::default()
    }

    /// # Panics
    ///
    /// Panics if a section identifier is already present or repeated.
    pub fn appending_sections(&self, sections: impl IntoIterator<Item = S>) -> Self {
        expect_valid("appending_sections", self.try_appending_sections(sections))
    }

    pub fn try_appending_sections(
        &self,
        sections: impl IntoIterator<Item = S>,
    ) -> Result<Self, SnapshotError> {
        let mut next = self.clone();
        for id in sections {
            if next.index_of_section(&id).is_some() {
                return Err(SnapshotError::DuplicateSection(format!("{id:?}")));
            }
            next.sections.push(Section {
                id,
                items: Vec::new(),
            });
        }
        Ok(next)
    }

    /// # Panics
    ///
    /// Panics if `section` is unknown or an item identifier is already present.
    pub fn appending_items_to(&self, items: impl IntoIterator<Item = I>, section: &S) -> Self {
        expect_valid("appending_items_to", self.try_appending_items_to(items, section))
    }

    pub fn try_appending_items_to(
        &self,
        items: impl IntoIterator<Item = I>,
        section: &S,
    ) -> Result<Self, SnapshotError> {
        let index = self
            .index_of_section(section)
            .ok_or_else(|| SnapshotError::UnknownSection(format!("{section:?}")))?;
        self.inserting_at(items, index, None)
    }

    /// Appends to the last section.
    ///
    /// # Panics
    ///
    /// Panics if the snapshot has no sections or an item identifier is
    /// already present.
    pub fn appending_items(&self, items: impl IntoIterator<Item = I>) -> Self {
        expect_valid("appending_items", self.try_appending_items(items))
    }

    pub fn try_appending_items(
        &self,
        items: impl IntoIterator<Item = I>,
    ) -> Result<Self, SnapshotError> {
        let last = self
            .sections
            .len()
            .checked_sub(1)
            .ok_or(SnapshotError::NoSections)?;
        self.inserting_at(items, last, None)
    }

    /// # Panics
    ///
    /// Panics if `anchor` is unknown or an item identifier is already present.
    pub fn inserting_items_before(&self, items: impl IntoIterator<Item = I>, anchor: &I) -> Self {
        expect_valid(
            "inserting_items_before",
            self.try_inserting_items_before(items, anchor),
        )
    }

    pub fn try_inserting_items_before(
        &self,
        items: impl IntoIterator<Item = I>,
        anchor: &I,
    ) -> Result<Self, SnapshotError> {
        let (section, position) = self.locate(anchor)?;
        self.inserting_at(items, section, Some(position))
    }

    /// # Panics
    ///
    /// Panics if `anchor` is unknown or an item identifier is already present.
    pub fn inserting_items_after(&self, items: impl IntoIterator<Item = I>, anchor: &I) -> Self {
        expect_valid(
            "inserting_items_after",
            self.try_inserting_items_after(items, anchor),
        )
    }

    pub fn try_inserting_items_after(
        &self,
        items: impl IntoIterator<Item = I>,
        anchor: &I,
    ) -> Result<Self, SnapshotError> {
        let (section, position) = self.locate(anchor)?;
        self.inserting_at(items, section, Some(position + 1))
    }

    /// Removes the given items. Identifiers not in the snapshot are ignored.
    pub fn deleting_items(&self, items: &[I]) -> Self {
        let doomed: HashSet<&I> = items.iter().collect();
        let mut next = self.clone();
        for section in &mut next.sections {
            section.items.retain(|item| !doomed.contains(item));
        }
        next
    }

    /// Removes the given sections along with their items. Unknown
    /// identifiers are ignored.
    pub fn deleting_sections(&self, sections: &[S]) -> Self {
        let mut next = self.clone();
        next.sections.retain(|section| !sections.contains(&section.id));
        next
    }

    pub fn deleting_all_items(&self) -> Self {
        Self::empty()
    }

    pub fn number_of_sections(&self) -> usize {
        self.sections.len()
    }

    pub fn number_of_items(&self) -> usize {
        self.sections.iter().map(|section| section.items.len()).sum()
    }

    pub fn number_of_items_in(&self, section: &S) -> Option<usize> {
        self.item_identifiers_in(section).map(<[I]>::len)
    }

    pub fn section_identifiers(&self) -> Vec<S> {
        self.sections.iter().map(|section| section.id.clone()).collect()
    }

    /// All items, section by section.
    pub fn item_identifiers(&self) -> Vec<I> {
        self.sections
            .iter()
            .flat_map(|section| section.items.iter().cloned())
            .collect()
    }

    pub fn item_identifiers_in(&self, section: &S) -> Option<&[I]> {
        self.sections
            .iter()
            .find(|candidate| &candidate.id == section)
            .map(|section| section.items.as_slice())
    }

    pub fn section_of(&self, item: &I) -> Option<&S> {
        self.sections
            .iter()
            .find(|section| section.items.contains(item))
            .map(|section| &section.id)
    }

    /// Position of `item` in [`item_identifiers`](Self::item_identifiers).
    pub fn index_of_item(&self, item: &I) -> Option<usize> {
        self.sections
            .iter()
            .flat_map(|section| section.items.iter())
            .position(|candidate| candidate == item)
    }

    pub fn index_of_section(&self, section: &S) -> Option<usize> {
        self.sections
            .iter()
            .position(|candidate| &candidate.id == section)
    }

    pub fn contains_item(&self, item: &I) -> bool {
        self.locate(item).is_ok()
    }

    /// Sections in order, paired with their items.
    pub fn sections(&self) -> impl Iterator<Item = (&S, &[I])> + '_ {
        self.sections
            .iter()
            .map(|section| (&section.id, section.items.as_slice()))
    }

    /// Applies this snapshot to `data_source`.
    pub fn apply_to(&self, data_source: &DiffableDataSource<S, I>, animated: bool) -> Acknowledgment {
        data_source.apply(self.clone(), animated)
    }

    fn locate(&self, item: &I) -> Result<(usize, usize), SnapshotError> {
        self.sections
            .iter()
            .enumerate()
            .find_map(|(s, section)| {
                section
                    .items
                    .iter()
                    .position(|candidate| candidate == item)
                    .map(|i| (s, i))
            })
            .ok_or_else(|| SnapshotError::UnknownItem(format!("{item:?}")))
    }

    /// Inserts `items` into section `section` at `position`, or at the end.
    fn inserting_at(
        &self,
        items: impl IntoIterator<Item = I>,
        section: usize,
        position: Option<usize>,
    ) -> Result<Self, SnapshotError> {
        let mut seen: HashSet<I> = self
            .sections
            .iter()
            .flat_map(|section| section.items.iter().cloned())
            .collect();
        let mut incoming = Vec::new();
        for item in items {
            if !seen.insert(item.clone()) {
                return Err(SnapshotError::DuplicateItem(format!("{item:?}")));
            }
            incoming.push(item);
        }

        let mut next = self.clone();
        let target = &mut next.sections[section].items;
        let at = position.unwrap_or(target.len());
        target.splice(at..at, incoming);
        Ok(next)
    }
}
