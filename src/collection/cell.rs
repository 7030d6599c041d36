//! Cell registrations: item → cell content.

use std::sync::Arc;

use crate::builder::{Fragment, FragmentList, IntoFragment};
use crate::view::{Label, TextStyle, View, ViewKind};

use super::diff::IndexPath;
use super::view::CollectionView;

/// Content-view child of a cell. Created on first use.
pub(crate) fn content_view(cell: &View) -> View {
    if let Some(existing) = cell
        .subviews()
        .into_iter()
        .find(|child| child.kind() == &ViewKind::ContentView)
    {
        return existing;
    }
    let content = View::new(ViewKind::ContentView);
    cell.add_pinned_subview(&content);
    content
}

/// Describes how to fill a cell for one item.
///
/// The registration never creates or recycles cells itself; the collection
/// view does that and hands the cell back for configuration. Configuring the
/// same cell twice for the same item yields the same content.
pub struct CellRegistration<I> {
    reuse_identifier: Arc<str>,
    content: Arc<dyn Fn(&I) -> Fragment + Send + Sync>,
}

impl<I> Clone for CellRegistration<I> {
    fn clone(&self) -> Self {
        Self {
            reuse_identifier: Arc::clone(&self.reuse_identifier),
            content: Arc::clone(&self.content),
        }
    }
}

impl<I: Send + Sync + 'static> CellRegistration<I> {
    pub fn new<R, F>(reuse_identifier: impl Into<String>, content: F) -> Self
    where
        R: IntoFragment,
        F: Fn(&I) -> R + Send + Sync + 'static,
    {
        Self {
            reuse_identifier: Arc::from(reuse_identifier.into()),
            content: Arc::new(move |item: &I| content(item).into_fragment()),
        }
    }

    /// Registration for list rows described by a [`ListContentConfiguration`].
    pub fn list<F>(reuse_identifier: impl Into<String>, configure: F) -> Self
    where
        F: Fn(&mut ListContentConfiguration, &I) + Send + Sync + 'static,
    {
        Self::new(reuse_identifier, move |item: &I| {
            let mut configuration = ListContentConfiguration::default();
            configure(&mut configuration, item);
            configuration.into_fragment()
        })
    }

    pub fn reuse_identifier(&self) -> &str {
        &self.reuse_identifier
    }

    pub fn content(&self, item: &I) -> FragmentList {
        (self.content)(item).flatten()
    }

    /// Replaces whatever `cell` showed with the content for `item`, each
    /// view pinned to the cell's content view.
    pub fn configure(&self, cell: &View, item: &I) {
        let host = content_view(cell);
        for previous in host.subviews() {
            previous.remove_from_superview();
        }
        for view in &self.content(item) {
            host.add_pinned_subview(view);
        }
    }

    /// Cell provider for a [`DiffableDataSource`](super::DiffableDataSource)
    /// that dequeues through this registration.
    pub fn cell_provider(self) -> impl Fn(&CollectionView, IndexPath, &I) -> View + Send + Sync + 'static {
        move |collection: &CollectionView, index_path: IndexPath, item: &I| {
            collection.dequeue_configured_reusable_cell(&self, index_path, item)
        }
    }
}

/// Types that know how to render one item as cell content.
pub trait CellRegistrable: 'static {
    type Item: Send + Sync + 'static;

    fn content(item: &Self::Item) -> Fragment;

    fn make_registration() -> CellRegistration<Self::Item> {
        CellRegistration::new(std::any::type_name::<Self>(), Self::content)
    }
}

/// Default content of a list row: primary and secondary text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListContentConfiguration {
    pub text: Option<String>,
    pub secondary_text: Option<String>,
}

impl IntoFragment for ListContentConfiguration {
    fn into_fragment(self) -> Fragment {
        Fragment::seq([
            Fragment::optional(self.text.is_some(), || {
                Label::new(self.text.unwrap_or_default()).preferred_font(TextStyle::Body)
            }),
            Fragment::optional(self.secondary_text.is_some(), || {
                Label::new(self.secondary_text.unwrap_or_default())
                    .preferred_font(TextStyle::Footnote)
            }),
        ])
    }
}
