use anyhow::Result;
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton as TermButton,
    MouseEvent, MouseEventKind,
};
use ratatui::backend::Backend;
use ratatui::layout::Rect;
use ratatui::Terminal;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use crate::browser::{DiffViewMode, ViewModeSetting};
use crate::controller::TabController;
use crate::fetch::PanelFetcher;
use crate::fragment::{self, FragmentTarget};
use crate::layout::LayoutAdjuster;
use crate::loader::LoadStatus;
use crate::models::{Action, LayoutMode};
use crate::page::{MouseButton, Page, TabClick};

use super::ui::UI;
use super::widgets::{HelpModal, PanelView, StatusSnapshot, TabStrip};

const EVENT_POLL_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Debug, Clone, Copy, Default)]
pub struct LayoutAreas {
    pub tabs: Rect,
    pub body: Rect,
}

/// Terminal front-end over a [`TabController`].
///
/// Tab clicks go through the page's tab bar like any other listener and are
/// handled on the following turn of the loop.
pub struct ReviewApp<F: PanelFetcher + 'static> {
    controller: TabController<F>,
    page: Rc<RefCell<Page>>,
    view_mode: Rc<ViewModeSetting>,

    tab_strip: TabStrip,
    panel_view: PanelView,
    help_modal: HelpModal,
    layout_areas: LayoutAreas,

    running: bool,
    transition_pending: bool,
    message: Option<String>,
}

impl<F: PanelFetcher + 'static> ReviewApp<F> {
    pub fn new(mut controller: TabController<F>, view_mode: Rc<ViewModeSetting>) -> Self {
        controller.bind_events();
        let page = controller.page();
        let mut tab_strip = TabStrip::new();
        tab_strip.set_active(controller.current_action());

        Self {
            controller,
            page,
            view_mode,
            tab_strip,
            panel_view: PanelView::new(),
            help_modal: HelpModal::new(),
            layout_areas: LayoutAreas::default(),
            running: true,
            transition_pending: false,
            message: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn quit(&mut self) {
        self.running = false;
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    fn set_message(&mut self, msg: impl Into<String>) {
        self.message = Some(msg.into());
    }

    pub fn controller(&self) -> &TabController<F> {
        &self.controller
    }

    pub fn tab_strip(&self) -> &TabStrip {
        &self.tab_strip
    }

    pub fn panel_view(&self) -> &PanelView {
        &self.panel_view
    }

    pub fn help_modal(&self) -> &HelpModal {
        &self.help_modal
    }

    pub fn set_layout_areas(&mut self, areas: LayoutAreas) {
        self.layout_areas = areas;
    }

    fn page_height(&self) -> u16 {
        self.layout_areas.body.height.saturating_sub(2).max(1)
    }

    pub fn layout_mode(&self) -> LayoutMode {
        LayoutAdjuster::current(&self.page.borrow())
    }

    /// Markup and load status of the active panel.
    pub fn active_panel(&self) -> (Action, Option<String>, LoadStatus) {
        let action = self.controller.current_action();
        let html = self
            .page
            .borrow()
            .panel_html(action)
            .map(str::to_string);
        (action, html, self.controller.load_status(action))
    }

    pub fn status_snapshot(&self) -> StatusSnapshot {
        StatusSnapshot {
            address: self.controller.location().address(),
            layout: self.layout_mode(),
            view_mode: self.view_mode.diff_view_type(),
            diffs: self.controller.load_status(Action::Diffs),
            commits: self.controller.load_status(Action::Commits),
            message: self.message.clone(),
        }
    }

    /// Activate the tab named by the initial address.
    pub fn start(&mut self) {
        let action = self.controller.current_action();
        self.select(action);
    }

    pub fn select(&mut self, action: Action) {
        self.controller.activate_tab(action);
        self.after_transition();
    }

    fn after_transition(&mut self) {
        self.tab_strip.set_active(self.controller.current_action());
        self.panel_view.reset_scroll();
        self.transition_pending = true;
    }

    /// Run `tab_shown` once the transition has been drawn.
    pub fn finish_transition(&mut self) {
        if self.transition_pending {
            self.controller.tab_shown();
            self.transition_pending = false;
        }
    }

    pub fn process_pending_clicks(&mut self) {
        if self.controller.process_clicks() > 0 {
            self.after_transition();
        }
    }

    pub fn toggle_view_mode(&mut self) {
        let mode = self.view_mode.toggle();
        self.set_message(format!("Diff view: {}", mode));
    }

    /// Move the fragment to the next (or previous) comment in the loaded
    /// changes and reveal it.
    pub fn cycle_comment(&mut self, forward: bool) {
        let ids = self
            .page
            .borrow()
            .panel_html(Action::Diffs)
            .map(fragment::note_ids)
            .unwrap_or_default();
        if ids.is_empty() {
            self.set_message("No comments in loaded changes");
            return;
        }

        let current = self.controller.location().fragment_id().to_string();
        let next = match ids.iter().position(|id| *id == current) {
            Some(i) if forward => (i + 1) % ids.len(),
            Some(i) => (i + ids.len() - 1) % ids.len(),
            None if forward => 0,
            None => ids.len() - 1,
        };

        match self.controller.navigate_fragment(&ids[next]) {
            FragmentTarget::CommentMatch { element, column } => {
                self.set_message(format!("Revealed {} ({} column)", element.id, column));
            }
            FragmentTarget::NoMatch => self.set_message(format!("{} not found", ids[next])),
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        tracing::trace!("Key pressed: {:?}", key.code);

        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.quit();
            return;
        }

        if self.help_modal.is_visible() {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
                self.help_modal.hide();
            }
            return;
        }

        self.message = None;
        match key.code {
            KeyCode::Char('q') => self.quit(),
            KeyCode::Char('?') => self.help_modal.toggle(),
            KeyCode::Char(c @ '1'..='4') => {
                let index = c as usize - '1' as usize;
                self.select(Action::all()[index]);
            }
            KeyCode::Tab => self.select(self.controller.current_action().next()),
            KeyCode::BackTab => self.select(self.controller.current_action().prev()),
            KeyCode::Char('v') => self.toggle_view_mode(),
            KeyCode::Char('n') => self.cycle_comment(true),
            KeyCode::Char('N') => self.cycle_comment(false),
            KeyCode::Down | KeyCode::Char('j') => self.panel_view.scroll_down(1),
            KeyCode::Up | KeyCode::Char('k') => self.panel_view.scroll_up(1),
            KeyCode::PageDown => self.panel_view.scroll_down(self.page_height()),
            KeyCode::PageUp => self.panel_view.scroll_up(self.page_height()),
            _ => {}
        }
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        if self.help_modal.is_visible() {
            return;
        }

        let button = match mouse.kind {
            MouseEventKind::Down(TermButton::Left) => MouseButton::Left,
            MouseEventKind::Down(TermButton::Middle) => MouseButton::Middle,
            MouseEventKind::ScrollDown => {
                self.panel_view.scroll_down(3);
                return;
            }
            MouseEventKind::ScrollUp => {
                self.panel_view.scroll_up(3);
                return;
            }
            _ => return,
        };

        let Some(action) = self
            .tab_strip
            .action_at(self.layout_areas.tabs, mouse.column, mouse.row)
        else {
            return;
        };

        let (href, tab_bar) = {
            let page = self.page.borrow();
            (page.tab_href(action), page.tab_bar())
        };
        let mut click = TabClick::new(action.name(), href.clone()).with_button(button);
        if mouse.modifiers.contains(KeyModifiers::CONTROL) {
            click = click.with_ctrl();
        }
        if mouse.modifiers.contains(KeyModifiers::ALT) {
            click = click.with_meta();
        }

        tab_bar.dispatch(&mut click);
        if click.propagation_stopped() {
            self.set_message(format!("Opened {} in browser", href));
        }
    }

    pub fn handle_events(&mut self) -> Result<()> {
        if event::poll(EVENT_POLL_INTERVAL)? {
            match event::read()? {
                Event::Key(key) => self.handle_key(key),
                Event::Mouse(mouse) => self.handle_mouse(mouse),
                _ => {}
            }
        }
        Ok(())
    }

    async fn event_loop<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        self.start();

        while self.is_running() {
            self.process_pending_clicks();
            terminal.draw(|frame| UI::render(frame, self))?;
            self.finish_transition();
            self.handle_events()?;
            // let spawned panel fetches make progress
            tokio::task::yield_now().await;
        }
        Ok(())
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut terminal = UI::setup_terminal()?;
        let result = self.event_loop(&mut terminal).await;
        UI::restore_terminal()?;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::mock_fetch::MockFetcher;
    use crate::loader::test_support::{create_test_page, TestBrowser};
    use crate::models::DiffLayoutMode;
    use tokio::task::LocalSet;

    const DIFF_WITH_NOTES: &str = r#"<li class="note" id="note_1">a</li><li class="note" id="note_2">b</li>"#;

    fn create_test_app(address: &str, html: &str) -> (ReviewApp<MockFetcher>, TestBrowser) {
        let browser = TestBrowser::new(DiffLayoutMode::Inline);
        let page = create_test_page(address);
        let controller = TabController::new(
            page,
            browser.browser(),
            Rc::new(MockFetcher::with_html(html)),
        );
        let app = ReviewApp::new(controller, Rc::clone(&browser.view_mode));
        (app, browser)
    }

    fn focused(browser: &TestBrowser) -> Option<String> {
        browser.notes.focused().map(|request| request.target.id)
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn click(column: u16, row: u16, button: TermButton, modifiers: KeyModifiers) -> MouseEvent {
        MouseEvent {
            kind: MouseEventKind::Down(button),
            column,
            row,
            modifiers,
        }
    }

    #[test]
    fn review_app_starts_running_and_bound() {
        let (app, _browser) = create_test_app("/foo/bar/merge_requests/1", "");
        assert!(app.is_running());
        assert!(app.controller().is_bound());
    }

    #[test]
    fn q_and_ctrl_c_quit() {
        let (mut app, _browser) = create_test_app("/foo/bar/merge_requests/1", "");
        app.handle_key(press(KeyCode::Char('q')));
        assert!(!app.is_running());

        let (mut app, _browser) = create_test_app("/foo/bar/merge_requests/1", "");
        app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(!app.is_running());
    }

    #[tokio::test]
    async fn number_keys_select_tabs() {
        LocalSet::new()
            .run_until(async {
                let (mut app, browser) = create_test_app("/foo/bar/merge_requests/1", "");

                app.handle_key(press(KeyCode::Char('2')));
                assert_eq!(app.controller().current_action(), Action::Commits);
                assert_eq!(app.tab_strip().active(), Action::Commits);

                app.handle_key(press(KeyCode::Char('4')));
                app.finish_transition();
                assert_eq!(app.controller().current_action(), Action::Pipelines);
                assert_eq!(app.layout_mode(), LayoutMode::Expanded);
                assert_eq!(browser.history.replace_count(), 2);
            })
            .await;
    }

    #[tokio::test]
    async fn tab_and_backtab_cycle() {
        LocalSet::new()
            .run_until(async {
                let (mut app, _browser) = create_test_app("/foo/bar/merge_requests/1", "");

                app.handle_key(press(KeyCode::BackTab));
                assert_eq!(app.controller().current_action(), Action::Pipelines);

                app.handle_key(press(KeyCode::Tab));
                assert_eq!(app.controller().current_action(), Action::Notes);
            })
            .await;
    }

    #[test]
    fn help_modal_swallows_keys() {
        let (mut app, _browser) = create_test_app("/foo/bar/merge_requests/1", "");
        app.handle_key(press(KeyCode::Char('?')));
        assert!(app.help_modal().is_visible());

        app.handle_key(press(KeyCode::Char('2')));
        assert_eq!(app.controller().current_action(), Action::Notes);

        app.handle_key(press(KeyCode::Esc));
        assert!(!app.help_modal().is_visible());
    }

    #[test]
    fn v_toggles_diff_view_mode() {
        let (mut app, browser) = create_test_app("/foo/bar/merge_requests/1", "");
        app.handle_key(press(KeyCode::Char('v')));

        assert_eq!(browser.view_mode.diff_view_type(), DiffLayoutMode::SideBySide);
        assert_eq!(app.message(), Some("Diff view: parallel"));
        assert_eq!(app.status_snapshot().view_mode, DiffLayoutMode::SideBySide);
    }

    #[tokio::test]
    async fn tab_click_is_handled_on_next_turn() {
        LocalSet::new()
            .run_until(async {
                let (mut app, browser) = create_test_app("/foo/bar/merge_requests/1", "");
                app.set_layout_areas(LayoutAreas {
                    tabs: Rect::new(0, 0, 80, 3),
                    body: Rect::new(0, 3, 80, 20),
                });

                app.handle_mouse(click(14, 1, TermButton::Left, KeyModifiers::NONE));
                assert_eq!(app.controller().current_action(), Action::Notes);

                app.process_pending_clicks();
                assert_eq!(app.controller().current_action(), Action::Commits);
                assert!(browser.opener.opened().is_empty());
            })
            .await;
    }

    #[test]
    fn ctrl_click_opens_tab_externally() {
        let (mut app, browser) = create_test_app("/foo/bar/merge_requests/1", "");
        app.set_layout_areas(LayoutAreas {
            tabs: Rect::new(0, 0, 80, 3),
            body: Rect::default(),
        });

        app.handle_mouse(click(14, 1, TermButton::Left, KeyModifiers::CONTROL));
        app.process_pending_clicks();

        assert_eq!(
            browser.opener.opened(),
            vec![(
                "https://gitlab.example.com/foo/bar/merge_requests/1/commits".to_string(),
                "_blank".to_string()
            )]
        );
        assert_eq!(app.controller().current_action(), Action::Notes);
        assert!(app.message().unwrap().starts_with("Opened"));
    }

    #[test]
    fn middle_click_opens_tab_externally() {
        let (mut app, browser) = create_test_app("/foo/bar/merge_requests/1", "");
        app.set_layout_areas(LayoutAreas {
            tabs: Rect::new(0, 0, 80, 3),
            body: Rect::default(),
        });

        app.handle_mouse(click(2, 1, TermButton::Middle, KeyModifiers::NONE));
        app.process_pending_clicks();

        assert_eq!(browser.opener.opened().len(), 1);
        assert_eq!(browser.history.replace_count(), 0);
    }

    #[tokio::test]
    async fn cycle_comment_walks_loaded_notes() {
        LocalSet::new()
            .run_until(async {
                let (mut app, browser) =
                    create_test_app("/foo/bar/merge_requests/1/diffs", DIFF_WITH_NOTES);
                app.start();
                tokio::task::yield_now().await;
                assert!(app.controller().load_status(Action::Diffs).is_loaded());

                app.handle_key(press(KeyCode::Char('n')));
                assert_eq!(focused(&browser).as_deref(), Some("note_1"));

                app.handle_key(press(KeyCode::Char('n')));
                assert_eq!(focused(&browser).as_deref(), Some("note_2"));
                assert_eq!(app.controller().location().fragment, "#note_2");

                app.handle_key(press(KeyCode::Char('N')));
                assert_eq!(focused(&browser).as_deref(), Some("note_1"));
                assert_eq!(browser.notes.requests().len(), 3);
            })
            .await;
    }

    #[test]
    fn cycle_comment_without_changes_reports_message() {
        let (mut app, _browser) = create_test_app("/foo/bar/merge_requests/1", "");
        app.cycle_comment(true);
        assert_eq!(app.message(), Some("No comments in loaded changes"));
    }

    #[tokio::test]
    async fn active_panel_reports_loaded_markup() {
        LocalSet::new()
            .run_until(async {
                let (mut app, _browser) =
                    create_test_app("/foo/bar/merge_requests/1/commits", "<ol>c1</ol>");
                app.start();
                tokio::task::yield_now().await;

                let (action, html, status) = app.active_panel();
                assert_eq!(action, Action::Commits);
                assert_eq!(html.as_deref(), Some("<ol>c1</ol>"));
                assert_eq!(status, LoadStatus::Loaded);
            })
            .await;
    }
}
