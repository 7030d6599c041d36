//! Layout constraints as plain records.
//!
//! Herald never solves layout. A constraint only remembers which two views it
//! relates and whether it is still active, which is all the renderers need
//! when they tear content down.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::node::ViewId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Top,
    Leading,
    Bottom,
    Trailing,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Insets {
    pub top: f64,
    pub leading: f64,
    pub bottom: f64,
    pub trailing: f64,
}

impl Insets {
    pub const ZERO: Insets = Insets {
        top: 0.0,
        leading: 0.0,
        bottom: 0.0,
        trailing: 0.0,
    };

    pub fn uniform(value: f64) -> Self {
        Self {
            top: value,
            leading: value,
            bottom: value,
            trailing: value,
        }
    }
}

/// Edge-to-edge constraint between two views.
///
/// Clones share the activation flag, so deactivating through any handle is
/// visible through all of them.
#[derive(Debug, Clone)]
pub struct Constraint {
    item: ViewId,
    edge: Edge,
    related: ViewId,
    constant: f64,
    active: Arc<AtomicBool>,
}

impl Constraint {
    pub fn new(item: ViewId, edge: Edge, related: ViewId, constant: f64) -> Self {
        Self {
            item,
            edge,
            related,
            constant,
            active: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn item(&self) -> ViewId {
        self.item
    }

    pub fn edge(&self) -> Edge {
        self.edge
    }

    pub fn related(&self) -> ViewId {
        self.related
    }

    pub fn constant(&self) -> f64 {
        self.constant
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    pub fn deactivate(&self) {
        self.active.store(false, Ordering::SeqCst);
    }
}
