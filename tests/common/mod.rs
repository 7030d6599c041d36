//! Shared test utilities.

#![allow(dead_code, unused_imports)]

use herald::collection::{CollectionView, DiffableDataSource, ListAppearance, Snapshot};
use herald::stream::{Completion, Demand, Subscriber, Subscription};
use herald::view::{Label, View, ViewId};
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

pub type Feed = Snapshot<&'static str, u32>;

/// `n` fresh plain views.
pub fn plain_views(n: usize) -> Vec<View> {
    (0..n).map(|_| View::plain()).collect()
}

pub fn ids(views: &[View]) -> Vec<ViewId> {
    views.iter().map(View::id).collect()
}

/// Snapshot with one `"main"` section holding `items`.
pub fn feed(items: &[u32]) -> Feed {
    Feed::empty()
        .appending_sections(["main"])
        .appending_items(items.iter().copied())
}

/// Data source over a plain list whose cells show the item number.
pub fn number_source() -> DiffableDataSource<&'static str, u32> {
    let collection = CollectionView::list(ListAppearance::Plain);
    DiffableDataSource::with_content(&collection, |item: &u32| Label::new(item.to_string()))
}

/// Create a temporary config file with `content`.
pub fn temp_config(content: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = temp_dir.path().join("config.toml");
    std::fs::write(&config_path, content).expect("Failed to write config");
    (temp_dir, config_path)
}

// -- Subscribers ---------------------------------------------------------------

/// Subscriber that records everything it receives.
pub struct Recorder<T> {
    pub values: Mutex<Vec<T>>,
    pub completions: Mutex<usize>,
    initial_demand: Demand,
}

impl<T> Recorder<T> {
    pub fn unlimited() -> Arc<Self> {
        Self::with_demand(Demand::Unlimited)
    }

    pub fn with_demand(initial_demand: Demand) -> Arc<Self> {
        Arc::new(Self {
            values: Mutex::new(Vec::new()),
            completions: Mutex::new(0),
            initial_demand,
        })
    }
}

impl<T: Send> Subscriber<T> for Recorder<T> {
    fn receive_subscription(&self, subscription: Arc<dyn Subscription>) {
        subscription.request(self.initial_demand);
    }

    fn receive(&self, value: T) -> Demand {
        self.values.lock().push(value);
        Demand::None
    }

    fn receive_completion(&self, _completion: Completion) {
        *self.completions.lock() += 1;
    }
}
