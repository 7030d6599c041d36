//! Reference-identity view handles.
//!
//! A [`View`] is the opaque descriptor the builders produce and the renderers
//! consume. Two handles are the same view only when they point at the same
//! allocation; nothing in the crate ever compares views structurally.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use serde::Serialize;

use crate::stream::{bind, Cancellable, Publisher, RenderTarget};

use super::constraint::{Constraint, Edge, Insets};
use super::label::LabelStyle;

static NEXT_VIEW_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique view identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ViewId(u64);

impl ViewId {
    fn next() -> Self {
        Self(NEXT_VIEW_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What a view is, for dumps and debugging only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewKind {
    Plain,
    Spacer,
    Label,
    Stack,
    Collection,
    Cell,
    ContentView,
    Custom(String),
}

/// Handle to one unit of renderable content.
#[derive(Clone)]
pub struct View {
    inner: Arc<ViewInner>,
}

struct ViewInner {
    id: ViewId,
    kind: ViewKind,
    state: Mutex<ViewState>,
}

#[derive(Default)]
struct ViewState {
    superview: Option<Weak<ViewInner>>,
    subviews: Vec<View>,
    constraints: Vec<Constraint>,
    text: Option<String>,
    label_style: Option<LabelStyle>,
    hugging_required: bool,
    bindings: Vec<Cancellable>,
}

impl RenderTarget for ViewInner {}

impl View {
    /// Label views start out with the default [`LabelStyle`].
    pub fn new(kind: ViewKind) -> Self {
        let state = ViewState {
            label_style: (kind == ViewKind::Label).then(LabelStyle::default),
            ..ViewState::default()
        };
        Self {
            inner: Arc::new(ViewInner {
                id: ViewId::next(),
                kind,
                state: Mutex::new(state),
            }),
        }
    }

    pub fn plain() -> Self {
        Self::new(ViewKind::Plain)
    }

    pub fn custom(name: impl Into<String>) -> Self {
        Self::new(ViewKind::Custom(name.into()))
    }

    /// Flexible filler that refuses to grow past its content in both axes.
    pub fn spacer() -> Self {
        let view = Self::new(ViewKind::Spacer);
        view.inner.state.lock().hugging_required = true;
        view
    }

    pub fn id(&self) -> ViewId {
        self.inner.id
    }

    pub fn kind(&self) -> &ViewKind {
        &self.inner.kind
    }

    pub fn ptr_eq(&self, other: &View) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn hugs_content(&self) -> bool {
        self.inner.state.lock().hugging_required
    }

    pub fn text(&self) -> Option<String> {
        self.inner.state.lock().text.clone()
    }

    pub(crate) fn set_text(&self, text: Option<String>) {
        self.inner.state.lock().text = text;
    }

    /// Text styling; `None` for views that are not labels.
    pub fn label_style(&self) -> Option<LabelStyle> {
        self.inner.state.lock().label_style.clone()
    }

    pub(crate) fn update_label_style(&self, update: impl FnOnce(&mut LabelStyle)) {
        let mut state = self.inner.state.lock();
        update(state.label_style.get_or_insert_with(LabelStyle::default));
    }

    /// Keeps this view's text in step with `publisher` for as long as the
    /// view exists.
    pub fn bind_text<P>(&self, publisher: &P)
    where
        P: Publisher<Output = String> + ?Sized,
    {
        let binding = bind(&self.inner, publisher, |inner: &ViewInner, text| {
            inner.state.lock().text = Some(text);
        });
        self.inner.state.lock().bindings.push(binding);
    }

    pub fn superview(&self) -> Option<View> {
        self.inner
            .state
            .lock()
            .superview
            .as_ref()
            .and_then(Weak::upgrade)
            .map(|inner| View { inner })
    }

    pub fn subviews(&self) -> Vec<View> {
        self.inner.state.lock().subviews.clone()
    }

    /// Appends `child` as the last subview, detaching it from any previous
    /// superview first.
    pub fn add_subview(&self, child: &View) {
        if child.ptr_eq(self) {
            return;
        }
        child.remove_from_superview();
        child.inner.state.lock().superview = Some(Arc::downgrade(&self.inner));
        self.inner.state.lock().subviews.push(child.clone());
    }

    /// Adds `child` and pins its four edges to this view.
    pub fn add_pinned_subview(&self, child: &View) {
        self.add_subview(child);
        child.pin(self, Insets::ZERO);
    }

    /// Detaches this view from its superview. Constraints relating the view
    /// to its former superview are deactivated; other constraints are kept.
    pub fn remove_from_superview(&self) {
        let parent = self.inner.state.lock().superview.take();
        let Some(parent) = parent.and_then(|weak| weak.upgrade()) else {
            return;
        };
        parent
            .state
            .lock()
            .subviews
            .retain(|view| !Arc::ptr_eq(&view.inner, &self.inner));
        let parent_id = parent.id;
        for constraint in self.inner.state.lock().constraints.iter() {
            if constraint.related() == parent_id {
                constraint.deactivate();
            }
        }
    }

    pub fn constraints(&self) -> Vec<Constraint> {
        self.inner.state.lock().constraints.clone()
    }

    pub fn active_constraints(&self) -> Vec<Constraint> {
        self.inner
            .state
            .lock()
            .constraints
            .iter()
            .filter(|c| c.is_active())
            .cloned()
            .collect()
    }

    /// Installs an active constraint owned by this view.
    pub fn add_constraint(&self, constraint: Constraint) {
        self.inner.state.lock().constraints.push(constraint);
    }

    /// Deactivates every constraint this view owns.
    pub fn deactivate_constraints(&self) {
        for constraint in self.inner.state.lock().constraints.iter() {
            constraint.deactivate();
        }
    }

    /// Pins all four edges of this view to `target`, inset by `insets`.
    pub fn pin(&self, target: &View, insets: Insets) {
        let edges = [
            (Edge::Top, insets.top),
            (Edge::Leading, insets.leading),
            (Edge::Bottom, -insets.bottom),
            (Edge::Trailing, -insets.trailing),
        ];
        let mut state = self.inner.state.lock();
        for (edge, constant) in edges {
            state
                .constraints
                .push(Constraint::new(self.id(), edge, target.id(), constant));
        }
    }

    /// Structural dump of this view and its descendants.
    pub fn tree(&self) -> ViewTree {
        let (subviews, text, style, active) = {
            let state = self.inner.state.lock();
            (
                state.subviews.clone(),
                state.text.clone(),
                state.label_style.clone(),
                state.constraints.iter().filter(|c| c.is_active()).count(),
            )
        };
        ViewTree {
            id: self.id(),
            kind: self.kind().clone(),
            text,
            style,
            active_constraints: active,
            children: subviews.iter().map(View::tree).collect(),
        }
    }
}

impl PartialEq for View {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for View {}

impl fmt::Debug for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("View")
            .field("id", &self.inner.id)
            .field("kind", &self.inner.kind)
            .finish()
    }
}

/// Serializable snapshot of a view subtree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewTree {
    pub id: ViewId,
    pub kind: ViewKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<LabelStyle>,
    pub active_constraints: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ViewTree>,
}

impl ViewTree {
    /// Indented one-line-per-view rendering.
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_into(&mut out, 0);
        out
    }

    fn render_into(&self, out: &mut String, depth: usize) {
        out.push_str(&"  ".repeat(depth));
        out.push_str(&format!("{:?} {}", self.kind, self.id));
        if let Some(text) = &self.text {
            out.push_str(&format!(" {:?}", text));
        }
        if let Some(style) = &self.style {
            out.push_str(&format!(" [{}]", style.summary()));
        }
        out.push('\n');
        for child in &self.children {
            child.render_into(out, depth + 1);
        }
    }
}
