//! View handles, constraints, and the built-in containers.

mod constraint;
mod label;
mod node;
mod screen;
mod stack;

pub use constraint::{Constraint, Edge, Insets};
pub use label::{Color, Font, FontWeight, Label, LabelStyle, LineBreak, TextStyle};
pub use node::{View, ViewId, ViewKind, ViewTree};
pub use screen::Screen;
pub use stack::StackView;
