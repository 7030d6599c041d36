//! Snapshot rendering into collection views.
//!
//! # Architecture
//!
//! ```text
//! Snapshot ──apply──→ DiffableDataSource ──diff──→ CollectionView
//!                        │  (one in flight,          │
//!                        │   one queued)             └─ commit_animations()
//!                        └─ Acknowledgment ←───────────── resolves in-flight apply
//! ```
//!
//! - `snapshot.rs` - immutable section/item value and its builders
//! - `diff.rs` - structural difference between two snapshots
//! - `data_source.rs` - apply serialization, cell reuse by item identity
//! - `view.rs` - visible cells, reuse pool, commit tick
//! - `cell.rs` - cell registrations
//! - `layout.rs` - compositional layout descriptions

mod ack;
mod cell;
mod data_source;
mod diff;
mod layout;
mod snapshot;
mod view;

pub use ack::Acknowledgment;
pub use cell::{CellRegistrable, CellRegistration, ListContentConfiguration};
pub use data_source::DiffableDataSource;
pub use diff::{IndexPath, SnapshotDiff};
pub use layout::{
    CompositionalLayout, Dimension, GroupAxis, IntoSection, LayoutEnvironment, LayoutGroup,
    LayoutItem, LayoutSection, LayoutSize, ListAppearance, SectionChoice,
};
pub use snapshot::{Identifier, Snapshot, SnapshotError};
pub use view::CollectionView;
