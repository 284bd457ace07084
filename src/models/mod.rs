mod action;
mod layout;
mod location;

pub use action::{Action, ActionError};
pub use layout::{DiffLayoutMode, LayoutMode};
pub use location::{normalize_fragment, LocationState};
