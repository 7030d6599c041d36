//! State/intent/reducer primitives for renderer state machines.
//!
//! # Architecture
//!
//! ```text
//! Intent ──→ Reducer ──→ State
//!    ↑                     │
//!    └── side effects ─────┘
//! ```
//!
//! - **State**: what a renderer currently holds for its target
//! - **Intent**: a request to move to new content
//! - **Reducer**: pure transition; mutations of the live view tree happen
//!   around the dispatch, never inside it

mod intent;
mod reducer;
mod state;

pub use intent::Intent;
pub use reducer::Reducer;
pub use state::RenderState;

/// Runs `$reducer` over the state stored in `$state` and stores the result.
macro_rules! dispatch {
    ($state:expr, $reducer:ty, $intent:expr) => {
        $state = <$reducer as $crate::mvi::Reducer>::reduce(std::mem::take(&mut $state), $intent);
    };
}

pub(crate) use dispatch;
