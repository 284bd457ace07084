use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::browser::Browser;
use crate::fetch::PanelFetcher;
use crate::fragment::{self, FragmentTarget};
use crate::models::Action;
use crate::page::{Page, PageEvent};
use crate::routing;

/// Lifecycle of one lazily loaded panel. `Loaded` is terminal.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadStatus {
    #[default]
    Idle,
    Loading,
    Loaded,
    Failed(String),
}

impl LoadStatus {
    pub fn is_loaded(&self) -> bool {
        matches!(self, LoadStatus::Loaded)
    }
}

/// Fetches panel content at most once per page and injects it.
///
/// Fetches run as fire-and-forget local tasks, so callers must be inside a
/// `tokio::task::LocalSet`. A completing fetch never looks at which panel is
/// active and never touches the layout.
pub struct PanelLoader<F: PanelFetcher + 'static> {
    fetcher: Rc<F>,
    page: Rc<RefCell<Page>>,
    browser: Browser,
    states: Rc<RefCell<BTreeMap<Action, LoadStatus>>>,
}

impl<F: PanelFetcher + 'static> PanelLoader<F> {
    pub fn new(fetcher: Rc<F>, page: Rc<RefCell<Page>>, browser: Browser) -> Self {
        Self {
            fetcher,
            page,
            browser,
            states: Rc::new(RefCell::new(BTreeMap::new())),
        }
    }

    pub fn status(&self, action: Action) -> LoadStatus {
        self.states
            .borrow()
            .get(&action)
            .cloned()
            .unwrap_or_default()
    }

    pub fn is_loaded(&self, action: Action) -> bool {
        self.status(action).is_loaded()
    }

    #[cfg(test)]
    pub(crate) fn mark_loaded(&self, action: Action) {
        self.states.borrow_mut().insert(action, LoadStatus::Loaded);
    }

    /// Load the Changes panel for `path`.
    ///
    /// Once loaded, only a scroll notification is dispatched. Returns the
    /// handle of the spawned fetch, if one was started.
    pub fn load_diff(&self, path: &str) -> Option<JoinHandle<()>> {
        match self.status(Action::Diffs) {
            LoadStatus::Loaded => {
                debug!("Diffs already loaded, dispatching scroll only");
                self.page.borrow_mut().dispatch(PageEvent::Scroll);
                return None;
            }
            LoadStatus::Loading => {
                debug!("Diffs fetch already in flight");
                return None;
            }
            LoadStatus::Idle | LoadStatus::Failed(_) => {}
        }

        let url = self.resource_url(path, Action::Diffs);
        self.set_status(Action::Diffs, LoadStatus::Loading);

        let fetcher = Rc::clone(&self.fetcher);
        let page = Rc::clone(&self.page);
        let states = Rc::clone(&self.states);
        let browser = self.browser.clone();

        Some(tokio::task::spawn_local(async move {
            match fetcher.get_json(&url).await {
                Ok(content) => {
                    {
                        let mut page = page.borrow_mut();
                        page.inject_html(Action::Diffs, &content.html);
                        states.borrow_mut().insert(Action::Diffs, LoadStatus::Loaded);
                        page.dispatch(PageEvent::Scroll);
                    }
                    info!("Loaded diffs from {} ({} bytes)", url, content.html.len());

                    let fragment_id = page.borrow().location().fragment_id().to_string();
                    let mode = browser.view_mode.diff_view_type();
                    let target = fragment::resolve(&content.html, &fragment_id, mode);
                    fragment::reveal(&target, browser.notes.as_ref());
                }
                Err(e) => {
                    warn!("Failed to load diffs from {}: {}", url, e);
                    states
                        .borrow_mut()
                        .insert(Action::Diffs, LoadStatus::Failed(e.to_string()));
                }
            }
        }))
    }

    /// Load the Commits panel for `path`. Same at-most-once contract as
    /// [`load_diff`](Self::load_diff), without scroll or fragment handling.
    pub fn load_commits(&self, path: &str) -> Option<JoinHandle<()>> {
        match self.status(Action::Commits) {
            LoadStatus::Loaded | LoadStatus::Loading => return None,
            LoadStatus::Idle | LoadStatus::Failed(_) => {}
        }

        let url = self.resource_url(path, Action::Commits);
        self.set_status(Action::Commits, LoadStatus::Loading);

        let fetcher = Rc::clone(&self.fetcher);
        let page = Rc::clone(&self.page);
        let states = Rc::clone(&self.states);

        Some(tokio::task::spawn_local(async move {
            match fetcher.get_json(&url).await {
                Ok(content) => {
                    page.borrow_mut()
                        .inject_html(Action::Commits, &content.html);
                    states
                        .borrow_mut()
                        .insert(Action::Commits, LoadStatus::Loaded);
                    info!("Loaded commits from {}", url);
                }
                Err(e) => {
                    warn!("Failed to load commits from {}: {}", url, e);
                    states
                        .borrow_mut()
                        .insert(Action::Commits, LoadStatus::Failed(e.to_string()));
                }
            }
        }))
    }

    /// Resolve the current fragment against already loaded diff markup and
    /// reveal the comment it points at.
    pub fn resolve_fragment(&self) -> FragmentTarget {
        let (markup, fragment_id) = {
            let page = self.page.borrow();
            match page.panel_html(Action::Diffs) {
                Some(html) => (html.to_string(), page.location().fragment_id().to_string()),
                None => return FragmentTarget::NoMatch,
            }
        };

        let mode = self.browser.view_mode.diff_view_type();
        let target = fragment::resolve(&markup, &fragment_id, mode);
        fragment::reveal(&target, self.browser.notes.as_ref());
        target
    }

    fn resource_url(&self, path: &str, action: Action) -> String {
        let query = self.page.borrow().location().query.clone();
        routing::json_resource(path, action, &query)
    }

    fn set_status(&self, action: Action, status: LoadStatus) {
        self.states.borrow_mut().insert(action, status);
    }
}

#[cfg(test)]
pub(crate) mod mock_fetch {
    use async_trait::async_trait;
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use tokio::sync::oneshot;

    use crate::fetch::{FetchError, PanelContent, PanelFetcher};

    /// Records requested urls. Responses are immediate unless a gate was
    /// queued with [`MockFetcher::hold_next`].
    #[derive(Default)]
    pub struct MockFetcher {
        requests: RefCell<Vec<String>>,
        html: RefCell<String>,
        fail_with: RefCell<Option<String>>,
        gates: RefCell<VecDeque<oneshot::Receiver<()>>>,
    }

    impl MockFetcher {
        pub fn with_html(html: &str) -> Self {
            let fetcher = Self::default();
            *fetcher.html.borrow_mut() = html.to_string();
            fetcher
        }

        pub fn failing(message: &str) -> Self {
            let fetcher = Self::default();
            *fetcher.fail_with.borrow_mut() = Some(message.to_string());
            fetcher
        }

        pub fn succeed(&self) {
            *self.fail_with.borrow_mut() = None;
        }

        /// Park the next request until the returned sender fires.
        pub fn hold_next(&self) -> oneshot::Sender<()> {
            let (tx, rx) = oneshot::channel();
            self.gates.borrow_mut().push_back(rx);
            tx
        }

        pub fn requests(&self) -> Vec<String> {
            self.requests.borrow().clone()
        }
    }

    #[async_trait(?Send)]
    impl PanelFetcher for MockFetcher {
        async fn get_json(&self, url: &str) -> Result<PanelContent, FetchError> {
            self.requests.borrow_mut().push(url.to_string());

            let gate = self.gates.borrow_mut().pop_front();
            if let Some(gate) = gate {
                let _ = gate.await;
            }

            if let Some(message) = self.fail_with.borrow().clone() {
                return Err(FetchError::Transport(message));
            }
            Ok(PanelContent::from_html(self.html.borrow().clone()))
        }
    }
}
