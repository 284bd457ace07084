mod dom;
mod events;

pub use dom::{Page, BREADCRUMBS, CONTAINER_LIMITED};
pub use events::{ClickBinding, MouseButton, PageEvent, TabClick};

#[cfg(test)]
pub use dom::{Element, CONTAINER_FLUID, CONTENT_WRAPPER};
