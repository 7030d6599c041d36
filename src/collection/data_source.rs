//! Snapshot renderer: applies whole snapshots to a collection view.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::builder::IntoFragment;
use crate::config::RenderConfig;
use crate::stream::{Bridge, Cancellable, Publisher, RenderTarget, Subscriber};
use crate::view::View;

use super::ack::{AckSender, Acknowledgment};
use super::cell::{CellRegistrable, CellRegistration};
use super::diff::{IndexPath, SnapshotDiff};
use super::snapshot::{Identifier, Snapshot};
use super::view::{CollectionView, DataSourceLink};

type CellProvider<I> = Box<dyn Fn(&CollectionView, IndexPath, &I) -> View + Send + Sync>;

/// Drives a [`CollectionView`] from [`Snapshot`]s.
///
/// At most one apply is in flight at a time. An apply that arrives while
/// another is in flight waits in a single slot; a newer one takes the slot
/// over and inherits the acknowledgments of the one it replaced.
pub struct DiffableDataSource<S, I> {
    inner: Arc<SourceInner<S, I>>,
}

impl<S, I> Clone for DiffableDataSource<S, I> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct SourceInner<S, I> {
    me: Weak<SourceInner<S, I>>,
    collection: CollectionView,
    cell_provider: CellProvider<I>,
    state: Mutex<SourceState<S, I>>,
    animate_differences: AtomicBool,
    torn_down: AtomicBool,
}

struct SourceState<S, I> {
    current: Snapshot<S, I>,
    cells: HashMap<I, View>,
    in_flight: Option<Vec<AckSender>>,
    queued: Option<PendingApply<S, I>>,
    applied: u64,
}

struct PendingApply<S, I> {
    snapshot: Snapshot<S, I>,
    animated: bool,
    acks: Vec<AckSender>,
}

impl<S: Identifier, I: Identifier> DiffableDataSource<S, I> {
    /// Data source whose cells come from `cell_provider`. Replaces any data
    /// source previously connected to `collection`.
    ///
    /// `cell_provider` runs with no lock of this data source held, so it may
    /// read the data source (for example its current snapshot).
    pub fn new<F>(collection: &CollectionView, cell_provider: F) -> Self
    where
        F: Fn(&CollectionView, IndexPath, &I) -> View + Send + Sync + 'static,
    {
        let inner = Arc::new_cyclic(|me| SourceInner {
            me: me.clone(),
            collection: collection.clone(),
            cell_provider: Box::new(cell_provider),
            state: Mutex::new(SourceState {
                current: Snapshot::empty(),
                cells: HashMap::new(),
                in_flight: None,
                queued: None,
                applied: 0,
            }),
            animate_differences: AtomicBool::new(true),
            torn_down: AtomicBool::new(false),
        });
        let link: Weak<SourceInner<S, I>> = Arc::downgrade(&inner);
        collection.connect(link);
        Self { inner }
    }

    pub fn with_registration(collection: &CollectionView, registration: CellRegistration<I>) -> Self {
        Self::new(collection, registration.cell_provider())
    }

    pub fn with_registrable<C>(collection: &CollectionView) -> Self
    where
        C: CellRegistrable<Item = I>,
    {
        Self::with_registration(collection, C::make_registration())
    }

    /// Each cell shows `content(item)` inside its content view.
    pub fn with_content<R, F>(collection: &CollectionView, content: F) -> Self
    where
        R: IntoFragment,
        F: Fn(&I) -> R + Send + Sync + 'static,
    {
        Self::with_registration(collection, CellRegistration::new("herald.content", content))
    }

    /// Applies `[render]` defaults.
    pub fn with_config(self, config: &RenderConfig) -> Self {
        self.set_animating_differences(config.animate_differences);
        self
    }

    pub fn collection_view(&self) -> &CollectionView {
        &self.inner.collection
    }

    /// Makes `snapshot` the current state of the collection view.
    ///
    /// The returned acknowledgment resolves once the collection view shows
    /// `snapshot`. With `animated` and a non-empty difference that happens at
    /// the next [`CollectionView::commit_animations`]; otherwise before this
    /// call returns, unless an earlier apply is still in flight.
    pub fn apply(&self, snapshot: Snapshot<S, I>, animated: bool) -> Acknowledgment {
        self.inner.apply(snapshot, animated)
    }

    pub fn snapshot(&self) -> Snapshot<S, I> {
        self.inner.state.lock().current.clone()
    }

    pub fn item_identifier(&self, index_path: IndexPath) -> Option<I> {
        self.inner
            .state
            .lock()
            .current
            .sections()
            .nth(index_path.section)
            .and_then(|(_, items)| items.get(index_path.item))
            .cloned()
    }

    pub fn index_path(&self, item: &I) -> Option<IndexPath> {
        let state = self.inner.state.lock();
        let found = state
            .current
            .sections()
            .enumerate()
            .find_map(|(section, (_, items))| {
                items
                    .iter()
                    .position(|candidate| candidate == item)
                    .map(|position| IndexPath::new(section, position))
            });
        found
    }

    /// True while an apply is being materialized or waits for its commit
    /// tick.
    pub fn is_applying(&self) -> bool {
        self.inner.state.lock().in_flight.is_some()
    }

    pub fn has_queued_apply(&self) -> bool {
        self.inner.state.lock().queued.is_some()
    }

    /// Number of snapshots materialized so far. Superseded snapshots never
    /// count.
    pub fn applied_count(&self) -> u64 {
        self.inner.state.lock().applied
    }

    /// Animation flag used for snapshots delivered through
    /// [`subscriber`](Self::subscriber).
    pub fn set_animating_differences(&self, animate: bool) {
        self.inner.animate_differences.store(animate, Ordering::SeqCst);
    }

    pub fn animates_differences(&self) -> bool {
        self.inner.animate_differences.load(Ordering::SeqCst)
    }

    /// Subscriber that applies every delivered snapshot.
    ///
    /// Holds the data source weakly; values arriving after it is dropped or
    /// torn down are ignored.
    pub fn subscriber(&self) -> Arc<dyn Subscriber<Snapshot<S, I>>> {
        Bridge::new(&self.inner, |inner: &SourceInner<S, I>, snapshot: Snapshot<S, I>| {
            let animated = inner.animate_differences.load(Ordering::SeqCst);
            // The stream has nobody to hand the acknowledgment to.
            let _ = inner.apply(snapshot, animated);
        })
    }

    /// Attaches [`subscriber`](Self::subscriber) to `publisher`.
    pub fn bind<P>(&self, publisher: &P) -> Cancellable
    where
        P: Publisher<Output = Snapshot<S, I>> + ?Sized,
    {
        publisher.subscribe(self.subscriber())
    }

    /// Resolves every outstanding acknowledgment and stops applying.
    pub fn tear_down(&self) {
        self.inner.tear_down();
    }

    pub fn is_torn_down(&self) -> bool {
        RenderTarget::is_torn_down(&*self.inner)
    }
}

impl<S: Identifier, I: Identifier> SourceInner<S, I> {
    fn apply(&self, snapshot: Snapshot<S, I>, animated: bool) -> Acknowledgment {
        let (tx, ack) = Acknowledgment::pending();
        if self.is_torn_down() {
            tracing::trace!("apply after tear-down ignored");
            tx.resolve();
            return ack;
        }

        let mut state = self.state.lock();
        if state.in_flight.is_some() {
            let mut acks = match state.queued.take() {
                Some(superseded) => {
                    tracing::debug!(
                        sections = superseded.snapshot.number_of_sections(),
                        items = superseded.snapshot.number_of_items(),
                        "queued snapshot superseded"
                    );
                    superseded.acks
                }
                None => Vec::new(),
            };
            acks.push(tx);
            state.queued = Some(PendingApply {
                snapshot,
                animated,
                acks,
            });
            return ack;
        }
        state.in_flight = Some(Vec::new());
        drop(state);

        self.run(PendingApply {
            snapshot,
            animated,
            acks: vec![tx],
        });
        ack
    }

    /// Materializes `next` and then whatever got queued meanwhile, until an
    /// apply has to wait for the commit tick. The caller has already marked
    /// an apply in flight.
    fn run(&self, mut next: PendingApply<S, I>) {
        while let Some(following) = self.materialize(next) {
            next = following;
        }
    }

    /// Diffs against the current snapshot and hands the resulting cells to
    /// the collection view. Returns the queued apply to run next when this
    /// one finished on the spot.
    fn materialize(&self, apply: PendingApply<S, I>) -> Option<PendingApply<S, I>> {
        let PendingApply {
            snapshot,
            animated,
            acks,
        } = apply;
        let (diff, mut retired) = {
            let mut state = self.state.lock();
            let diff = SnapshotDiff::between(&state.current, &snapshot);
            (diff, std::mem::take(&mut state.cells))
        };

        // Cell providers run unlocked; they may read this data source.
        let mut cells = HashMap::with_capacity(snapshot.number_of_items());
        let mut sections = Vec::with_capacity(snapshot.number_of_sections());
        for (section, (_, items)) in snapshot.sections().enumerate() {
            let mut row = Vec::with_capacity(items.len());
            for (position, item) in items.iter().enumerate() {
                let cell = match retired.remove(item) {
                    Some(cell) => cell,
                    None => (self.cell_provider)(
                        &self.collection,
                        IndexPath::new(section, position),
                        item,
                    ),
                };
                cells.insert(item.clone(), cell.clone());
                row.push(cell);
            }
            sections.push(row);
        }

        let mut state = self.state.lock();
        if self.is_torn_down() {
            state.in_flight = None;
            acks.into_iter().for_each(AckSender::resolve);
            return None;
        }

        let deferred = animated && !diff.is_empty();
        tracing::debug!(
            collection = %self.collection.view().id(),
            sections = snapshot.number_of_sections(),
            items = snapshot.number_of_items(),
            changes = diff.change_count(),
            animated = deferred,
            "applying snapshot"
        );

        self.collection
            .install(sections, retired.into_values().collect(), diff);
        state.current = snapshot;
        state.cells = cells;
        state.applied += 1;

        if deferred {
            state.in_flight = Some(acks);
            let me = self.me.clone();
            self.collection.defer_until_commit(Box::new(move || {
                if let Some(inner) = me.upgrade() {
                    inner.finish_in_flight();
                }
            }));
            return None;
        }

        acks.into_iter().for_each(AckSender::resolve);
        let queued = state.queued.take();
        state.in_flight = queued.as_ref().map(|_| Vec::new());
        queued
    }

    /// Commit tick: resolves the in-flight apply and starts the queued one.
    fn finish_in_flight(&self) {
        let queued = {
            let mut state = self.state.lock();
            if let Some(acks) = state.in_flight.take() {
                acks.into_iter().for_each(AckSender::resolve);
            }
            let queued = state.queued.take();
            if queued.is_some() {
                state.in_flight = Some(Vec::new());
            }
            queued
        };
        if let Some(queued) = queued {
            self.run(queued);
        }
    }

    fn tear_down(&self) {
        if self.torn_down.swap(true, Ordering::SeqCst) {
            return;
        }
        let mut state = self.state.lock();
        let in_flight = state.in_flight.take().unwrap_or_default();
        let queued = state.queued.take().map(|queued| queued.acks).unwrap_or_default();
        let resolved = in_flight.len() + queued.len();
        in_flight
            .into_iter()
            .chain(queued)
            .for_each(AckSender::resolve);
        tracing::info!(
            collection = %self.collection.view().id(),
            resolved,
            "data source torn down"
        );
    }
}

impl<S: Identifier, I: Identifier> RenderTarget for SourceInner<S, I> {
    fn is_torn_down(&self) -> bool {
        self.torn_down.load(Ordering::SeqCst) || self.collection.is_torn_down()
    }
}

impl<S: Identifier, I: Identifier> DataSourceLink for SourceInner<S, I> {
    fn tear_down(&self) {
        SourceInner::tear_down(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::ListAppearance;
    use crate::stream::PassthroughSubject;

    type Snap = Snapshot<&'static str, u32>;

    fn source() -> DiffableDataSource<&'static str, u32> {
        let collection = CollectionView::list(ListAppearance::Plain);
        DiffableDataSource::with_content(&collection, |item: &u32| {
            crate::view::Label::new(item.to_string())
        })
    }

    fn numbers(items: &[u32]) -> Snap {
        Snap::empty()
            .appending_sections(["main"])
            .appending_items(items.iter().copied())
    }

    #[test]
    fn non_animated_apply_resolves_immediately() {
        let source = source();
        let mut ack = source.apply(numbers(&[1, 2, 3]), false);
        assert!(ack.is_resolved());
        assert_eq!(source.collection_view().visible_cells().len(), 3);
        assert_eq!(source.item_identifier(IndexPath::new(0, 1)), Some(2));
        assert_eq!(source.index_path(&3), Some(IndexPath::new(0, 2)));
    }

    #[test]
    fn animated_apply_waits_for_commit() {
        let source = source();
        let mut ack = source.apply(numbers(&[1]), true);
        assert!(!ack.is_resolved());
        assert!(source.is_applying());

        source.collection_view().commit_animations();
        assert!(ack.is_resolved());
        assert!(!source.is_applying());
    }

    #[test]
    fn surviving_items_keep_their_cells() {
        let source = source();
        let _ = source.apply(numbers(&[1, 2]), false);
        let kept = source
            .collection_view()
            .cell_for_item(IndexPath::new(0, 1))
            .unwrap();

        let _ = source.apply(numbers(&[2, 3]), false);
        assert_eq!(
            source.collection_view().cell_for_item(IndexPath::new(0, 0)),
            Some(kept)
        );
        assert_eq!(source.collection_view().reuse_pool_size(), 0);
    }

    #[test]
    fn removed_cells_are_recycled() {
        let source = source();
        let _ = source.apply(numbers(&[1, 2]), false);
        let _ = source.apply(numbers(&[1]), false);
        assert_eq!(source.collection_view().reuse_pool_size(), 1);

        let _ = source.apply(numbers(&[1, 5]), false);
        assert_eq!(source.collection_view().reuse_pool_size(), 0);
        let cell = source
            .collection_view()
            .cell_for_item(IndexPath::new(0, 1))
            .unwrap();
        assert_eq!(cell.tree().children[0].children[0].text.as_deref(), Some("5"));
    }

    #[test]
    fn newest_queued_snapshot_wins() {
        let source = source();
        let mut first = source.apply(numbers(&[1]), true);
        let mut second = source.apply(numbers(&[2]), true);
        let mut third = source.apply(numbers(&[3]), true);
        assert!(source.has_queued_apply());

        source.collection_view().commit_animations();
        assert!(first.is_resolved());
        assert!(!second.is_resolved());
        assert_eq!(source.snapshot(), numbers(&[3]));

        source.collection_view().commit_animations();
        assert!(second.is_resolved());
        assert!(third.is_resolved());
        assert_eq!(source.applied_count(), 2);
    }

    #[test]
    fn teardown_resolves_outstanding_acks() {
        let source = source();
        let mut first = source.apply(numbers(&[1]), true);
        let mut second = source.apply(numbers(&[2]), true);

        source.tear_down();
        assert!(first.is_resolved());
        assert!(second.is_resolved());

        let mut late = source.apply(numbers(&[9]), false);
        assert!(late.is_resolved());
        assert_eq!(source.snapshot(), numbers(&[1]));
    }

    #[test]
    fn subscriber_applies_with_configured_animation() {
        let source = source().with_config(&RenderConfig {
            animate_differences: false,
        });
        let subject = PassthroughSubject::new();
        let _sub = source.bind(&subject);

        subject.send(numbers(&[4, 5]));
        assert!(!source.is_applying());
        assert_eq!(source.snapshot(), numbers(&[4, 5]));
    }

    #[test]
    fn cell_content_may_read_the_data_source() {
        let collection = CollectionView::list(ListAppearance::Plain);
        let slot: Arc<std::sync::OnceLock<DiffableDataSource<&'static str, u32>>> =
            Arc::new(std::sync::OnceLock::new());
        let reader = Arc::clone(&slot);
        let source = DiffableDataSource::with_content(&collection, move |item: &u32| {
            let shown = reader
                .get()
                .map_or(0, |source| source.snapshot().number_of_items());
            crate::view::Label::new(format!("{item}/{shown}"))
        });
        let _ = slot.set(source.clone());

        let _ = source.apply(numbers(&[1]), false);
        let mut ack = source.apply(numbers(&[1, 2]), false);

        assert!(ack.is_resolved());
        let cell = collection.cell_for_item(IndexPath::new(0, 1)).unwrap();
        assert_eq!(cell.tree().children[0].children[0].text.as_deref(), Some("2/1"));
    }

    #[test]
    fn collection_teardown_stops_bound_stream() {
        let source = source();
        let subject = PassthroughSubject::new();
        let _sub = source.bind(&subject);

        source.collection_view().tear_down();
        subject.send(numbers(&[1]));

        assert!(source.is_torn_down());
        assert_eq!(source.snapshot(), Snap::empty());
    }
}
