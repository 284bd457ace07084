use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use scraper::Html;

use crate::loader::LoadStatus;
use crate::models::{Action, LayoutMode};

/// Width of the body when the layout is limited.
pub const LIMITED_WIDTH: u16 = 100;

/// Reduce panel markup to readable lines: the text nodes of the parsed
/// fragment, entities decoded, blank lines dropped.
pub fn markup_preview(markup: &str) -> Vec<String> {
    let document = Html::parse_fragment(markup);
    document
        .root_element()
        .text()
        .flat_map(str::lines)
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Area the panel body occupies for a layout mode.
pub fn body_area(area: Rect, layout: LayoutMode) -> Rect {
    match layout {
        LayoutMode::Expanded => area,
        LayoutMode::Limited if area.width > LIMITED_WIDTH => Rect {
            x: area.x + (area.width - LIMITED_WIDTH) / 2,
            width: LIMITED_WIDTH,
            ..area
        },
        LayoutMode::Limited => area,
    }
}

pub struct PanelView {
    scroll: u16,
}

impl PanelView {
    pub fn new() -> Self {
        Self { scroll: 0 }
    }

    pub fn scroll(&self) -> u16 {
        self.scroll
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.scroll = self.scroll.saturating_sub(lines);
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.scroll = self.scroll.saturating_add(lines);
    }

    pub fn reset_scroll(&mut self) {
        self.scroll = 0;
    }

    fn body_lines(action: Action, html: Option<&str>, status: &LoadStatus) -> Vec<Line<'static>> {
        if let Some(html) = html {
            return markup_preview(html).into_iter().map(Line::from).collect();
        }

        let placeholder = match (action, status) {
            (_, LoadStatus::Loading) => "Loading…".to_string(),
            (_, LoadStatus::Failed(msg)) => format!("Failed to load: {}", msg),
            (Action::Notes, _) => "Discussion overview".to_string(),
            (Action::Pipelines, _) => "Pipelines view mounted".to_string(),
            _ => "Nothing loaded yet".to_string(),
        };
        vec![Line::styled(placeholder, Style::default().fg(Color::DarkGray))]
    }

    pub fn render(
        &self,
        frame: &mut Frame,
        area: Rect,
        action: Action,
        html: Option<&str>,
        status: &LoadStatus,
        layout: LayoutMode,
    ) {
        let area = body_area(area, layout);
        let lines = Self::body_lines(action, html, status);

        let paragraph = Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Gray))
                    .title(format!(" {} ", action.label()))
                    .title_alignment(Alignment::Left),
            )
            .wrap(Wrap { trim: false })
            .scroll((self.scroll, 0));

        frame.render_widget(paragraph, area);
    }
}

impl Default for PanelView {
    fn default() -> Self {
        Self::new()
    }
}
