//! State for the linear renderer.

use crate::builder::FragmentList;
use crate::mvi::RenderState;

/// What a stack renderer currently has on screen.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum LinearState {
    /// Nothing rendered yet, or the target was torn down.
    #[default]
    Empty,

    /// `current` is materialized as the stack's arranged children, in order.
    Populated { current: FragmentList, generation: u64 },
}

impl RenderState for LinearState {}

impl LinearState {
    pub fn current(&self) -> Option<&FragmentList> {
        match self {
            Self::Empty => None,
            Self::Populated { current, .. } => Some(current),
        }
    }

    /// Number of replacements applied since the last teardown.
    pub fn generation(&self) -> u64 {
        match self {
            Self::Empty => 0,
            Self::Populated { generation, .. } => *generation,
        }
    }

    pub fn is_populated(&self) -> bool {
        matches!(self, Self::Populated { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_empty() {
        let state = LinearState::default();
        assert!(!state.is_populated());
        assert!(state.current().is_none());
        assert_eq!(state.generation(), 0);
    }
}
