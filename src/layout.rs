use crate::models::{Action, LayoutMode};
use crate::page::{Page, BREADCRUMBS, CONTAINER_LIMITED};

/// Keeps the content container width in step with the active panel.
///
/// Breadcrumb containers are never touched.
pub struct LayoutAdjuster;

impl LayoutAdjuster {
    pub fn apply(page: &mut Page, action: Action) -> LayoutMode {
        let mode = LayoutMode::for_action(action);
        match mode {
            LayoutMode::Expanded => Self::remove_limit(page),
            LayoutMode::Limited => Self::restore_limit(page),
        }
        tracing::trace!("Layout for {} is {:?}", action, mode);
        mode
    }

    pub fn remove_limit(page: &mut Page) {
        Self::set_limited(page, false);
    }

    pub fn restore_limit(page: &mut Page) {
        Self::set_limited(page, true);
    }

    fn set_limited(page: &mut Page, limited: bool) {
        for container in page.layout_containers_mut() {
            if !container.has_class(BREADCRUMBS) {
                container.toggle_class(CONTAINER_LIMITED, limited);
            }
        }
    }

    /// Mode currently shown by the non-breadcrumb containers.
    pub fn current(page: &Page) -> LayoutMode {
        let limited = page
            .containers()
            .iter()
            .filter(|c| !c.has_class(BREADCRUMBS))
            .any(|c| c.has_class(CONTAINER_LIMITED));
        if limited {
            LayoutMode::Limited
        } else {
            LayoutMode::Expanded
        }
    }
}
