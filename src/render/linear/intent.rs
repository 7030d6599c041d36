//! Intents for the linear renderer.

use crate::builder::FragmentList;
use crate::mvi::Intent;

#[derive(Debug)]
pub enum LinearIntent {
    /// Freshly built content replaces whatever is current.
    Replace { fragments: FragmentList },

    /// The target went away; forget the current content.
    Clear,
}

impl Intent for LinearIntent {}
