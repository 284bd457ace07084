use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::browser::{Browser, HistoryState, WindowOpener, BLANK_TARGET};
use crate::fetch::PanelFetcher;
use crate::fragment::FragmentTarget;
use crate::layout::LayoutAdjuster;
use crate::loader::{LoadStatus, PanelLoader};
use crate::models::{normalize_fragment, Action, ActionError, LayoutMode, LocationState};
use crate::page::{ClickBinding, Page, PageEvent, TabClick};
use crate::routing::{self, MergeRequestPath};

/// Tab click handling installed on the tab bar.
///
/// New-tab gestures open the link externally and stop propagation; anything
/// else has its default navigation suppressed and the action is queued for
/// the controller's next turn.
#[derive(Clone)]
struct ClickHandler {
    opener: Rc<dyn WindowOpener>,
    pending: Rc<RefCell<VecDeque<String>>>,
}

impl ClickHandler {
    fn new(opener: Rc<dyn WindowOpener>) -> Self {
        Self {
            opener,
            pending: Rc::new(RefCell::new(VecDeque::new())),
        }
    }

    fn click_tab(&self, event: &mut TabClick) {
        if event.opens_in_new_tab() {
            event.stop_immediate_propagation();
            if let Err(e) = self.opener.open(&event.href, BLANK_TARGET) {
                warn!("Failed to open {} in a new tab: {}", event.href, e);
            }
            return;
        }

        event.prevent_default();
        self.pending.borrow_mut().push_back(event.action.clone());
    }

    fn drain(&self) -> Vec<String> {
        self.pending.borrow_mut().drain(..).collect()
    }

    fn clear(&self) {
        self.pending.borrow_mut().clear();
    }
}

/// State machine over the merge request panels.
///
/// Owns the active action and the address. Every transition replaces the
/// current history entry exactly once.
pub struct TabController<F: PanelFetcher + 'static> {
    page: Rc<RefCell<Page>>,
    browser: Browser,
    loader: PanelLoader<F>,
    current_action: Action,
    clicks: ClickHandler,
    binding: Option<ClickBinding>,
    pipelines_mounted: bool,
    last_fetch: Option<JoinHandle<()>>,
}

impl<F: PanelFetcher + 'static> TabController<F> {
    pub fn new(page: Rc<RefCell<Page>>, browser: Browser, fetcher: Rc<F>) -> Self {
        let current_action = MergeRequestPath::parse(&page.borrow().location().path).action();
        let loader = PanelLoader::new(fetcher, Rc::clone(&page), browser.clone());
        let clicks = ClickHandler::new(Rc::clone(&browser.opener));

        Self {
            page,
            browser,
            loader,
            current_action,
            clicks,
            binding: None,
            pipelines_mounted: false,
            last_fetch: None,
        }
    }

    pub fn current_action(&self) -> Action {
        self.current_action
    }

    pub fn location(&self) -> LocationState {
        self.page.borrow().location().clone()
    }

    pub fn page(&self) -> Rc<RefCell<Page>> {
        Rc::clone(&self.page)
    }

    pub fn load_status(&self, action: Action) -> LoadStatus {
        self.loader.status(action)
    }

    /// Handle of the most recently started panel fetch.
    #[allow(dead_code)]
    pub fn take_last_fetch(&mut self) -> Option<JoinHandle<()>> {
        self.last_fetch.take()
    }

    #[cfg(test)]
    pub fn is_bound(&self) -> bool {
        self.binding.is_some()
    }

    /// Start listening for tab clicks. Clicks are queued and handled by
    /// [`process_clicks`](Self::process_clicks) on the next turn.
    pub fn bind_events(&mut self) {
        if self.binding.is_some() {
            debug!("Tab click handler already bound");
            return;
        }

        let clicks = self.clicks.clone();
        let binding = self
            .page
            .borrow()
            .tab_bar()
            .listen(move |event| clicks.click_tab(event));
        self.binding = Some(binding);
    }

    pub fn unbind_events(&mut self) {
        if let Some(binding) = self.binding.take() {
            binding.release();
        }
        self.clicks.clear();
    }

    /// Activate tabs for clicks queued since the last turn. Returns how many
    /// clicks were handled.
    pub fn process_clicks(&mut self) -> usize {
        let clicks = self.clicks.drain();
        let count = clicks.len();
        for action in clicks {
            if let Err(e) = self.activate_tab_named(&action) {
                warn!("Ignoring tab click: {}", e);
            }
        }
        count
    }

    /// Activate a tab by its raw name. Unknown names leave all state as is.
    pub fn activate_tab_named(&mut self, name: &str) -> Result<(), ActionError> {
        let action = name.parse::<Action>()?;
        self.activate_tab(action);
        Ok(())
    }

    pub fn activate_tab(&mut self, action: Action) {
        let previous = self.current_action;
        debug!("Activating tab {} (was {})", action, previous);

        {
            let mut page = self.page.borrow_mut();
            for other in Action::all() {
                page.set_panel_active(other, other == action);
            }
        }
        self.current_action = action;

        self.set_current_action(action);
        let path = self.location().path;

        match action {
            Action::Commits => self.track_fetch(self.loader.load_commits(&path)),
            Action::Diffs => self.track_fetch(self.loader.load_diff(&path)),
            Action::Pipelines => self.mount_pipelines_view(),
            Action::Notes => {}
        }
        if action != Action::Pipelines {
            self.destroy_pipelines_view();
        }

        LayoutAdjuster::apply(&mut self.page.borrow_mut(), action);
    }

    /// Replace the current history entry with the address of `action`.
    /// Returns the new address.
    pub fn set_current_action(&mut self, action: Action) -> String {
        let location = self.location();
        let new_state = routing::derive_location(
            &location.path,
            &location.query,
            &location.fragment,
            action,
        );

        let title = self.page.borrow().title().to_string();
        self.browser.history.replace_state(
            HistoryState {
                url: new_state.clone(),
            },
            &title,
            &new_state,
        );

        let path = MergeRequestPath::parse(&location.path).to_path(action);
        self.page.borrow_mut().set_location(LocationState {
            path,
            ..location
        });
        new_state
    }

    /// Lifecycle hook for a tab that finished becoming active. The layout
    /// always follows the action active now, whatever started earlier.
    pub fn tab_shown(&mut self) -> LayoutMode {
        let action = self.current_action;
        let mut page = self.page.borrow_mut();
        page.dispatch(PageEvent::TabShown(action));
        LayoutAdjuster::apply(&mut page, action)
    }

    /// Point the address at another fragment and, if diffs are loaded,
    /// reveal the comment it names.
    pub fn navigate_fragment(&mut self, fragment: &str) -> FragmentTarget {
        let location = self.location().with_fragment(&normalize_fragment(fragment));
        let url = location.address();
        let title = self.page.borrow().title().to_string();

        self.browser
            .history
            .replace_state(HistoryState { url: url.clone() }, &title, &url);
        self.page.borrow_mut().set_location(location);

        if self.loader.is_loaded(Action::Diffs) {
            self.loader.resolve_fragment()
        } else {
            FragmentTarget::NoMatch
        }
    }

    pub fn mount_pipelines_view(&mut self) {
        if !self.pipelines_mounted {
            info!("Mounting pipelines view");
            self.browser.pipelines.mount();
            self.pipelines_mounted = true;
        }
    }

    pub fn destroy_pipelines_view(&mut self) {
        if self.pipelines_mounted {
            self.browser.pipelines.destroy();
            self.pipelines_mounted = false;
        }
    }

    /// Release the click handler and the pipelines view.
    pub fn teardown(&mut self) {
        self.unbind_events();
        self.destroy_pipelines_view();
    }

    fn track_fetch(&mut self, handle: Option<JoinHandle<()>>) {
        if handle.is_some() {
            self.last_fetch = handle;
        }
    }
}

impl<F: PanelFetcher + 'static> Drop for TabController<F> {
    fn drop(&mut self) {
        self.teardown();
    }
}
