use std::collections::{BTreeMap, BTreeSet};

use crate::models::{Action, LocationState};
use crate::routing::MergeRequestPath;

use super::events::{PageEvent, TabBar};

pub const CONTENT_WRAPPER: &str = "content-wrapper";
pub const CONTAINER_FLUID: &str = "container-fluid";
pub const CONTAINER_LIMITED: &str = "container-limited";
pub const BREADCRUMBS: &str = "breadcrumbs";

/// A layout element identified only by its class list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    classes: BTreeSet<String>,
}

impl Element {
    pub fn with_classes(classes: &[&str]) -> Self {
        Self {
            classes: classes.iter().map(|c| c.to_string()).collect(),
        }
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.contains(class)
    }

    pub fn add_class(&mut self, class: &str) {
        self.classes.insert(class.to_string());
    }

    pub fn remove_class(&mut self, class: &str) {
        self.classes.remove(class);
    }

    pub fn toggle_class(&mut self, class: &str, on: bool) {
        if on {
            self.add_class(class);
        } else {
            self.remove_class(class);
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Panel {
    pub active: bool,
    pub html: Option<String>,
}

/// In-memory model of the merge request page: address, panels, layout
/// containers and the tab bar.
pub struct Page {
    title: String,
    origin: String,
    location: LocationState,
    base: MergeRequestPath,
    panels: BTreeMap<Action, Panel>,
    containers: Vec<Element>,
    tab_bar: TabBar,
    events: Vec<PageEvent>,
}

impl Page {
    pub fn new(title: impl Into<String>, location: LocationState) -> Self {
        let base = MergeRequestPath::parse(&location.path);
        let panels = Action::all()
            .into_iter()
            .map(|action| (action, Panel::default()))
            .collect();

        Self {
            title: title.into(),
            origin: String::new(),
            location,
            base,
            panels,
            containers: vec![
                Element::with_classes(&[
                    CONTENT_WRAPPER,
                    CONTAINER_FLUID,
                    CONTAINER_LIMITED,
                    BREADCRUMBS,
                ]),
                Element::with_classes(&[CONTENT_WRAPPER, CONTAINER_FLUID, CONTAINER_LIMITED]),
            ],
            tab_bar: TabBar::new(),
            events: Vec::new(),
        }
    }

    /// Scheme and host prefixed to tab links, e.g. `https://gitlab.com`.
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = origin.into().trim_end_matches('/').to_string();
        self
    }

    #[cfg(test)]
    pub fn with_containers(mut self, containers: Vec<Element>) -> Self {
        self.containers = containers;
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn location(&self) -> &LocationState {
        &self.location
    }

    pub fn set_location(&mut self, location: LocationState) {
        self.location = location;
    }

    /// Absolute link of a tab, independent of the currently active panel.
    pub fn tab_href(&self, action: Action) -> String {
        format!("{}{}", self.origin, self.base.to_path(action))
    }

    pub fn tab_bar(&self) -> TabBar {
        self.tab_bar.clone()
    }

    pub fn set_panel_active(&mut self, action: Action, active: bool) {
        self.panels.entry(action).or_default().active = active;
    }

    #[cfg(test)]
    pub fn is_panel_active(&self, action: Action) -> bool {
        self.panels.get(&action).is_some_and(|p| p.active)
    }

    #[cfg(test)]
    pub fn active_panels(&self) -> Vec<Action> {
        self.panels
            .iter()
            .filter(|(_, panel)| panel.active)
            .map(|(action, _)| *action)
            .collect()
    }

    pub fn inject_html(&mut self, action: Action, html: &str) {
        self.panels.entry(action).or_default().html = Some(html.to_string());
    }

    pub fn panel_html(&self, action: Action) -> Option<&str> {
        self.panels.get(&action).and_then(|p| p.html.as_deref())
    }

    /// Containers matching `.content-wrapper .container-fluid`.
    pub fn layout_containers_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.containers
            .iter_mut()
            .filter(|c| c.has_class(CONTENT_WRAPPER) && c.has_class(CONTAINER_FLUID))
    }

    pub fn containers(&self) -> &[Element] {
        &self.containers
    }

    pub fn dispatch(&mut self, event: PageEvent) {
        tracing::trace!("Page event dispatched: {:?}", event);
        self.events.push(event);
    }

    #[cfg(test)]
    pub fn events(&self) -> &[PageEvent] {
        &self.events
    }

    #[cfg(test)]
    pub fn scroll_events(&self) -> usize {
        self.events
            .iter()
            .filter(|e| **e == PageEvent::Scroll)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_page() -> Page {
        Page::new(
            "Merge request !1",
            LocationState::new("/foo/bar/merge_requests/1/diffs", "", ""),
        )
        .with_origin("https://gitlab.example.com/")
    }

    #[test]
    fn page_starts_with_no_active_panel() {
        let page = create_test_page();
        assert!(page.active_panels().is_empty());
    }

    #[test]
    fn page_tab_href_uses_base_path() {
        let page = create_test_page();
        assert_eq!(
            page.tab_href(Action::Notes),
            "https://gitlab.example.com/foo/bar/merge_requests/1"
        );
        assert_eq!(
            page.tab_href(Action::Commits),
            "https://gitlab.example.com/foo/bar/merge_requests/1/commits"
        );
    }

    #[test]
    fn page_inject_html_stores_panel_markup() {
        let mut page = create_test_page();
        assert_eq!(page.panel_html(Action::Diffs), None);

        page.inject_html(Action::Diffs, "<div class=\"diff-file\"></div>");
        assert_eq!(
            page.panel_html(Action::Diffs),
            Some("<div class=\"diff-file\"></div>")
        );
    }

    #[test]
    fn page_layout_containers_match_wrapper_and_fluid() {
        let mut page = create_test_page().with_containers(vec![
            Element::with_classes(&[CONTENT_WRAPPER, CONTAINER_FLUID]),
            Element::with_classes(&[CONTAINER_FLUID]),
            Element::with_classes(&[CONTENT_WRAPPER]),
        ]);
        assert_eq!(page.layout_containers_mut().count(), 1);
    }

    #[test]
    fn page_counts_scroll_events() {
        let mut page = create_test_page();
        page.dispatch(PageEvent::Scroll);
        page.dispatch(PageEvent::TabShown(Action::Diffs));
        page.dispatch(PageEvent::Scroll);
        assert_eq!(page.scroll_events(), 2);
        assert_eq!(page.events().len(), 3);
    }

    #[test]
    fn element_toggle_class() {
        let mut element = Element::default();
        element.toggle_class(CONTAINER_LIMITED, true);
        assert!(element.has_class(CONTAINER_LIMITED));
        element.toggle_class(CONTAINER_LIMITED, false);
        assert!(!element.has_class(CONTAINER_LIMITED));
    }
}
