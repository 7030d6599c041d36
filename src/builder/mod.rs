//! Fragment builder.
//!
//! Call sites describe content as a tree of builder expressions (a view, a
//! list of views, an optional branch, one of two branches) and flatten it
//! into one ordered [`FragmentList`]. Flattening is pure and cannot fail.

mod fragment;

pub use fragment::{Fragment, FragmentList, IntoFragment};
