//! Collection view: sections of cells, a reuse pool and the commit tick.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::builder::{Fragment, IntoFragment};
use crate::view::{View, ViewId, ViewKind, ViewTree};

use super::cell::{content_view, CellRegistration};
use super::diff::{IndexPath, SnapshotDiff};
use super::layout::{CompositionalLayout, LayoutEnvironment, LayoutSection, ListAppearance};

/// Hook a data source leaves in the collection view it drives.
pub(crate) trait DataSourceLink: Send + Sync {
    fn tear_down(&self);
}

type CommitHook = Box<dyn FnOnce() + Send>;

/// Scrollable grid/list host.
///
/// The collection view only shows cells; which cells go where is decided by
/// the [`DiffableDataSource`](super::DiffableDataSource) connected to it.
/// Animated updates finish at the next [`commit_animations`](Self::commit_animations),
/// which the host calls once per frame.
#[derive(Clone)]
pub struct CollectionView {
    inner: Arc<CollectionInner>,
}

struct CollectionInner {
    view: View,
    layout: CompositionalLayout,
    environment: Mutex<LayoutEnvironment>,
    state: Mutex<CollectionState>,
    torn_down: AtomicBool,
}

#[derive(Default)]
struct CollectionState {
    sections: Vec<Vec<View>>,
    section_layouts: Vec<Option<LayoutSection>>,
    reuse_identifiers: HashMap<ViewId, Arc<str>>,
    reuse_pool: HashMap<Arc<str>, Vec<View>>,
    pending_commits: Vec<CommitHook>,
    last_diff: Option<SnapshotDiff>,
    data_source: Option<Weak<dyn DataSourceLink>>,
}

impl CollectionView {
    pub fn new(layout: CompositionalLayout) -> Self {
        Self {
            inner: Arc::new(CollectionInner {
                view: View::new(ViewKind::Collection),
                layout,
                environment: Mutex::new(LayoutEnvironment::default()),
                state: Mutex::new(CollectionState::default()),
                torn_down: AtomicBool::new(false),
            }),
        }
    }

    /// Collection view with a list layout.
    pub fn list(appearance: ListAppearance) -> Self {
        Self::new(CompositionalLayout::list(appearance))
    }

    pub fn view(&self) -> &View {
        &self.inner.view
    }

    pub fn layout(&self) -> &CompositionalLayout {
        &self.inner.layout
    }

    pub fn environment(&self) -> LayoutEnvironment {
        *self.inner.environment.lock()
    }

    /// Takes effect at the next update.
    pub fn set_environment(&self, environment: LayoutEnvironment) {
        *self.inner.environment.lock() = environment;
    }

    pub fn number_of_sections(&self) -> usize {
        self.inner.state.lock().sections.len()
    }

    pub fn number_of_items(&self, section: usize) -> usize {
        self.inner
            .state
            .lock()
            .sections
            .get(section)
            .map_or(0, Vec::len)
    }

    pub fn cell_for_item(&self, index_path: IndexPath) -> Option<View> {
        self.inner
            .state
            .lock()
            .sections
            .get(index_path.section)
            .and_then(|cells| cells.get(index_path.item))
            .cloned()
    }

    /// Visible cells, section by section.
    pub fn visible_cells(&self) -> Vec<View> {
        self.inner.state.lock().sections.concat()
    }

    pub fn section_layout(&self, section: usize) -> Option<LayoutSection> {
        self.inner
            .state
            .lock()
            .section_layouts
            .get(section)
            .cloned()
            .flatten()
    }

    /// Cells parked for reuse, across all reuse identifiers.
    pub fn reuse_pool_size(&self) -> usize {
        self.inner.state.lock().reuse_pool.values().map(Vec::len).sum()
    }

    pub fn last_diff(&self) -> Option<SnapshotDiff> {
        self.inner.state.lock().last_diff.clone()
    }

    pub fn pending_animations(&self) -> usize {
        self.inner.state.lock().pending_commits.len()
    }

    /// Returns a cell configured for `item`, recycled from the pool when one
    /// with the registration's reuse identifier is parked there.
    pub fn dequeue_configured_reusable_cell<I>(
        &self,
        registration: &CellRegistration<I>,
        index_path: IndexPath,
        item: &I,
    ) -> View
    where
        I: Send + Sync + 'static,
    {
        let recycled = {
            let mut state = self.inner.state.lock();
            state
                .reuse_pool
                .get_mut(registration.reuse_identifier())
                .and_then(Vec::pop)
        };
        let cell = match recycled {
            Some(cell) => cell,
            None => {
                let cell = View::new(ViewKind::Cell);
                content_view(&cell);
                self.inner
                    .state
                    .lock()
                    .reuse_identifiers
                    .insert(cell.id(), Arc::from(registration.reuse_identifier()));
                cell
            }
        };
        registration.configure(&cell, item);
        tracing::trace!(cell = %cell.id(), %index_path, "dequeued cell");
        cell
    }

    /// Finishes every animated update started since the last call. Returns
    /// how many finished.
    pub fn commit_animations(&self) -> usize {
        let pending = std::mem::take(&mut self.inner.state.lock().pending_commits);
        let count = pending.len();
        for hook in pending {
            hook();
        }
        if count > 0 {
            tracing::debug!(collection = %self.inner.view.id(), count, "committed animations");
        }
        count
    }

    /// Detaches all cells and tears down the connected data source.
    pub fn tear_down(&self) {
        if self.inner.torn_down.swap(true, Ordering::SeqCst) {
            return;
        }
        let (link, cells) = {
            let mut state = self.inner.state.lock();
            state.pending_commits.clear();
            state.section_layouts.clear();
            (state.data_source.take(), std::mem::take(&mut state.sections))
        };
        if let Some(link) = link.and_then(|weak| weak.upgrade()) {
            link.tear_down();
        }
        for cell in cells.iter().flatten() {
            cell.remove_from_superview();
        }
        tracing::info!(collection = %self.inner.view.id(), "collection view torn down");
    }

    pub fn is_torn_down(&self) -> bool {
        self.inner.torn_down.load(Ordering::SeqCst)
    }

    pub fn tree(&self) -> ViewTree {
        self.inner.view.tree()
    }

    /// Installs `link` as the driving data source, tearing down any previous
    /// one.
    pub(crate) fn connect(&self, link: Weak<dyn DataSourceLink>) {
        let previous = self.inner.state.lock().data_source.replace(link);
        if let Some(previous) = previous.and_then(|weak| weak.upgrade()) {
            tracing::debug!(collection = %self.inner.view.id(), "replacing data source");
            previous.tear_down();
        }
    }

    /// Shows `sections` in place of the current cells. Cells in `retired`
    /// go back to the reuse pool.
    pub(crate) fn install(&self, sections: Vec<Vec<View>>, retired: Vec<View>, diff: SnapshotDiff) {
        if self.is_torn_down() {
            return;
        }
        let environment = self.environment();
        let layouts: Vec<Option<LayoutSection>> = (0..sections.len())
            .map(|index| self.inner.layout.section(index, &environment))
            .collect();

        let mut state = self.inner.state.lock();
        for cell in state.sections.iter().flatten() {
            cell.remove_from_superview();
        }
        for cell in sections.iter().flatten() {
            self.inner.view.add_subview(cell);
        }
        for cell in retired {
            cell.remove_from_superview();
            if let Some(reuse_identifier) = state.reuse_identifiers.get(&cell.id()).cloned() {
                state.reuse_pool.entry(reuse_identifier).or_default().push(cell);
            }
        }
        state.sections = sections;
        state.section_layouts = layouts;
        state.last_diff = Some(diff);
    }

    /// Runs `hook` at the next commit tick.
    pub(crate) fn defer_until_commit(&self, hook: CommitHook) {
        self.inner.state.lock().pending_commits.push(hook);
    }
}

impl IntoFragment for CollectionView {
    fn into_fragment(self) -> Fragment {
        Fragment::Leaf(self.inner.view.clone())
    }
}
