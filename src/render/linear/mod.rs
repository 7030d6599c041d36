//! Linear (stack-style) renderer.
//!
//! Every delivered value rebuilds the whole content and replaces the
//! stack's arranged children with it.
//!
//! # Architecture
//!
//! - `state.rs` - Empty / Populated
//! - `intent.rs` - Replace, Clear
//! - `reducer.rs` - pure transitions; the stack performs the view mutations

mod intent;
mod reducer;
mod state;

pub use intent::LinearIntent;
pub use reducer::LinearReducer;
pub use state::LinearState;
