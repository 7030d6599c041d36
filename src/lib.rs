//! Herald: declarative view composition and reactive reconciliation.
//!
//! Content is described with builder expressions ([`builder`]), rendered
//! into stacks or collection views ([`view`], [`collection`]) and kept up to
//! date by binding those renderers to non-failing streams ([`stream`],
//! [`render`]).

pub mod builder;
pub mod collection;
pub mod config;
pub mod error;
pub mod logging;
pub mod mvi;
pub mod render;
pub mod stream;
pub mod view;

pub use error::{HeraldError, Result};
