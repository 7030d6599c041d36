//! Reducer for the linear renderer.

use crate::mvi::Reducer;

use super::intent::LinearIntent;
use super::state::LinearState;

/// Pure transitions. Detaching and attaching views happens in the stack
/// around the dispatch.
pub struct LinearReducer;

impl Reducer for LinearReducer {
    type State = LinearState;
    type Intent = LinearIntent;

    fn reduce(state: Self::State, intent: Self::Intent) -> Self::State {
        match intent {
            LinearIntent::Replace { fragments } => LinearState::Populated {
                current: fragments,
                generation: state.generation() + 1,
            },
            LinearIntent::Clear => LinearState::Empty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::FragmentList;
    use crate::view::View;

    fn list(n: usize) -> FragmentList {
        (0..n).map(|_| View::plain()).collect()
    }

    #[test]
    fn replace_from_empty_populates() {
        let fragments = list(2);
        let state = LinearReducer::reduce(
            LinearState::Empty,
            LinearIntent::Replace {
                fragments: fragments.clone(),
            },
        );
        assert_eq!(state.current(), Some(&fragments));
        assert_eq!(state.generation(), 1);
    }

    #[test]
    fn replace_discards_previous_content() {
        let first = list(3);
        let second = list(1);
        let state = LinearReducer::reduce(
            LinearState::Empty,
            LinearIntent::Replace { fragments: first },
        );
        let state = LinearReducer::reduce(
            state,
            LinearIntent::Replace {
                fragments: second.clone(),
            },
        );
        assert_eq!(state.current(), Some(&second));
        assert_eq!(state.generation(), 2);
    }

    #[test]
    fn replace_with_empty_list_stays_populated() {
        let state = LinearReducer::reduce(
            LinearState::Empty,
            LinearIntent::Replace {
                fragments: FragmentList::new(),
            },
        );
        assert!(state.is_populated());
        assert!(state.current().is_some_and(FragmentList::is_empty));
    }

    #[test]
    fn clear_empties() {
        let state = LinearReducer::reduce(
            LinearState::Empty,
            LinearIntent::Replace { fragments: list(1) },
        );
        let state = LinearReducer::reduce(state, LinearIntent::Clear);
        assert_eq!(state, LinearState::Empty);
    }
}
