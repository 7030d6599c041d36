//! Reducer trait.

use super::intent::Intent;
use super::state::RenderState;

/// Pure transition function: (State, Intent) -> State.
pub trait Reducer {
    type State: RenderState;
    type Intent: Intent;

    fn reduce(state: Self::State, intent: Self::Intent) -> Self::State;
}
