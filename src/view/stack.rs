//! Stack container and the linear renderer that drives it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::builder::{Fragment, FragmentList, IntoFragment};
use crate::config::StackConfig;
use crate::mvi::dispatch;
use crate::render::linear::{LinearIntent, LinearReducer, LinearState};
use crate::stream::{bind, Cancellable, Publisher, RenderTarget};

use super::node::{View, ViewKind};

/// Container that lays out an ordered list of arranged children.
///
/// The stack owns the state of whatever renderer is bound to it. Callers
/// must not add or remove arranged children by hand while a stream is
/// bound.
#[derive(Clone)]
pub struct StackView {
    inner: Arc<StackInner>,
}

struct StackInner {
    view: View,
    state: Mutex<StackState>,
    torn_down: AtomicBool,
}

struct StackState {
    config: StackConfig,
    arranged: Vec<View>,
    render: LinearState,
}

impl StackView {
    /// Creates a stack whose initial arranged children come from `content`.
    pub fn new(config: StackConfig, content: impl IntoFragment) -> Self {
        let stack = Self::empty(config);
        stack.replace_arranged_subviews(content);
        stack
    }

    pub fn empty(config: StackConfig) -> Self {
        Self {
            inner: Arc::new(StackInner {
                view: View::new(ViewKind::Stack),
                state: Mutex::new(StackState {
                    config,
                    arranged: Vec::new(),
                    render: LinearState::Empty,
                }),
                torn_down: AtomicBool::new(false),
            }),
        }
    }

    pub fn view(&self) -> &View {
        &self.inner.view
    }

    pub fn config(&self) -> StackConfig {
        self.inner.state.lock().config
    }

    pub fn arranged_subviews(&self) -> Vec<View> {
        self.inner.state.lock().arranged.clone()
    }

    pub fn render_state(&self) -> LinearState {
        self.inner.state.lock().render.clone()
    }

    /// Appends `content` after the current arranged children.
    pub fn add_arranged_subviews(&self, content: impl IntoFragment) {
        let fragments = content.into_fragment().flatten();
        let mut state = self.inner.state.lock();
        self.inner.attach(&mut state, &fragments);
    }

    /// Detaches every arranged child and returns them in their former order.
    pub fn remove_all_arranged_subviews(&self) -> Vec<View> {
        let mut state = self.inner.state.lock();
        self.inner.detach_all(&mut state)
    }

    /// Replaces all arranged children with `content`.
    pub fn replace_arranged_subviews(&self, content: impl IntoFragment) {
        self.inner.replace(content.into_fragment().flatten());
    }

    /// Re-renders the arranged children from `content(value)` for every value
    /// `publisher` delivers.
    ///
    /// The binding holds the stack weakly: once every `StackView` handle is
    /// dropped, or [`tear_down`](Self::tear_down) is called, further values
    /// are ignored.
    pub fn render<P, F, R>(&self, publisher: &P, content: F) -> Cancellable
    where
        P: Publisher + ?Sized,
        F: Fn(P::Output) -> R + Send + Sync + 'static,
        R: IntoFragment,
    {
        bind(&self.inner, publisher, move |inner: &StackInner, value| {
            let fragments = content(value).into_fragment().flatten();
            inner.replace(fragments);
        })
    }

    /// Clears the stack and stops accepting stream values.
    pub fn tear_down(&self) {
        if self.inner.torn_down.swap(true, Ordering::SeqCst) {
            return;
        }
        let mut state = self.inner.state.lock();
        self.inner.detach_all(&mut state);
        dispatch!(state.render, LinearReducer, LinearIntent::Clear);
        tracing::info!(stack = %self.inner.view.id(), "stack torn down");
    }

    pub fn is_torn_down(&self) -> bool {
        self.inner.torn_down.load(Ordering::SeqCst)
    }
}

impl StackInner {
    /// Tear-down and attach run under one lock with nothing in between, so
    /// the old and new children are never visible mixed together.
    fn replace(&self, fragments: FragmentList) {
        if self.is_torn_down() {
            return;
        }
        let mut state = self.state.lock();
        let removed = self.detach_all(&mut state);
        let added = self.attach(&mut state, &fragments);
        dispatch!(state.render, LinearReducer, LinearIntent::Replace { fragments });
        tracing::debug!(
            stack = %self.view.id(),
            removed = removed.len(),
            added,
            generation = state.render.generation(),
            "replaced arranged subviews"
        );
    }

    fn detach_all(&self, state: &mut StackState) -> Vec<View> {
        let removed = std::mem::take(&mut state.arranged);
        for view in &removed {
            view.deactivate_constraints();
        }
        for view in &removed {
            view.remove_from_superview();
        }
        removed
    }

    /// A view listed twice, or already arranged, keeps its first position.
    /// Returns how many views were attached.
    fn attach(&self, state: &mut StackState, fragments: &FragmentList) -> usize {
        let mut added = 0;
        for view in fragments {
            if state.arranged.contains(view) {
                continue;
            }
            self.view.add_subview(view);
            state.arranged.push(view.clone());
            added += 1;
        }
        added
    }
}

impl IntoFragment for StackView {
    fn into_fragment(self) -> Fragment {
        Fragment::Leaf(self.inner.view.clone())
    }
}

impl RenderTarget for StackInner {
    fn is_torn_down(&self) -> bool {
        self.torn_down.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fragments;
    use crate::stream::PassthroughSubject;
    use crate::view::Insets;

    #[test]
    fn new_arranges_builder_content_in_order() {
        let a = View::plain();
        let b = View::plain();
        let stack = StackView::new(StackConfig::vertical(), fragments![a.clone(), b.clone()]);

        assert_eq!(stack.arranged_subviews(), vec![a.clone(), b.clone()]);
        assert_eq!(stack.view().subviews(), vec![a.clone(), b]);
        assert_eq!(a.superview(), Some(stack.view().clone()));
    }

    #[test]
    fn replace_detaches_old_children_and_their_constraints() {
        let anchor = View::plain();
        let old = View::plain();
        old.pin(&anchor, Insets::ZERO);
        let stack = StackView::new(StackConfig::vertical(), old.clone());

        let new = View::plain();
        stack.replace_arranged_subviews(new.clone());

        assert_eq!(stack.arranged_subviews(), vec![new]);
        assert!(old.superview().is_none());
        assert!(old.active_constraints().is_empty());
    }

    #[test]
    fn duplicate_view_is_arranged_once() {
        let a = View::plain();
        let b = View::plain();
        let stack = StackView::new(
            StackConfig::vertical(),
            fragments![a.clone(), b.clone(), a.clone()],
        );

        assert_eq!(stack.arranged_subviews(), vec![a.clone(), b.clone()]);
        assert_eq!(stack.view().subviews(), stack.arranged_subviews());

        stack.add_arranged_subviews(b.clone());
        assert_eq!(stack.arranged_subviews(), vec![a, b]);
    }

    #[test]
    fn add_appends_after_existing() {
        let a = View::plain();
        let b = View::plain();
        let stack = StackView::new(StackConfig::horizontal(), a.clone());
        stack.add_arranged_subviews(vec![b.clone()]);
        assert_eq!(stack.arranged_subviews(), vec![a, b]);
    }

    #[test]
    fn remove_all_returns_children_in_order() {
        let views: Vec<View> = (0..3).map(|_| View::plain()).collect();
        let stack = StackView::new(StackConfig::vertical(), views.clone());
        let removed = stack.remove_all_arranged_subviews();
        assert_eq!(removed, views);
        assert!(stack.view().subviews().is_empty());
    }

    #[test]
    fn render_replaces_content_on_each_value() {
        let stack = StackView::empty(StackConfig::vertical());
        let subject = PassthroughSubject::new();
        let _sub = stack.render(&subject, |count: usize| {
            Fragment::list((0..count).map(|_| View::plain()))
        });

        subject.send(3);
        assert_eq!(stack.arranged_subviews().len(), 3);
        subject.send(1);
        assert_eq!(stack.arranged_subviews().len(), 1);
        assert_eq!(stack.view().subviews().len(), 1);
        assert_eq!(stack.render_state().generation(), 2);
    }

    #[test]
    fn torn_down_stack_ignores_values() {
        let stack = StackView::empty(StackConfig::vertical());
        let subject = PassthroughSubject::new();
        let _sub = stack.render(&subject, |_: ()| View::plain());

        subject.send(());
        stack.tear_down();
        subject.send(());

        assert!(stack.arranged_subviews().is_empty());
        assert_eq!(stack.render_state(), LinearState::Empty);
        assert!(stack.is_torn_down());
    }
}
