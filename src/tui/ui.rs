use std::io::{self, Stdout};

use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    Frame, Terminal,
};

use crate::fetch::PanelFetcher;
use crate::models::Action;

use super::app::{LayoutAreas, ReviewApp};
use super::widgets::StatusLine;

pub struct UI;

impl UI {
    pub fn setup_terminal() -> io::Result<Terminal<CrosstermBackend<Stdout>>> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        Terminal::new(backend)
    }

    pub fn restore_terminal() -> io::Result<()> {
        disable_raw_mode()?;
        execute!(io::stdout(), DisableMouseCapture, LeaveAlternateScreen)?;
        Ok(())
    }

    pub fn render<F: PanelFetcher + 'static>(frame: &mut Frame, app: &mut ReviewApp<F>) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(5),
                Constraint::Length(3),
            ])
            .split(frame.area());

        app.set_layout_areas(LayoutAreas {
            tabs: chunks[0],
            body: chunks[1],
        });

        let (action, html, status) = app.active_panel();
        let diffs = app.controller().load_status(Action::Diffs);
        app.tab_strip().render(frame, chunks[0], &diffs);
        app.panel_view().render(
            frame,
            chunks[1],
            action,
            html.as_deref(),
            &status,
            app.layout_mode(),
        );
        StatusLine::render(frame, chunks[2], &app.status_snapshot());

        if app.help_modal().is_visible() {
            let modal_area = Self::centered_area(frame.area(), 60, 70);
            app.help_modal().render(frame, modal_area);
        }
    }

    fn centered_area(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
        let popup_layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Percentage((100 - percent_y) / 2),
                Constraint::Percentage(percent_y),
                Constraint::Percentage((100 - percent_y) / 2),
            ])
            .split(area);

        Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage((100 - percent_x) / 2),
                Constraint::Percentage(percent_x),
                Constraint::Percentage((100 - percent_x) / 2),
            ])
            .split(popup_layout[1])[1]
    }
}
