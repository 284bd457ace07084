use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::loader::LoadStatus;
use crate::models::Action;

const SEPARATOR: &str = "│";

/// The four merge request tabs, clickable by column.
pub struct TabStrip {
    active: Action,
}

impl TabStrip {
    pub fn new() -> Self {
        Self {
            active: Action::default(),
        }
    }

    pub fn set_active(&mut self, action: Action) {
        self.active = action;
    }

    pub fn active(&self) -> Action {
        self.active
    }

    fn tab_text(index: usize, action: Action) -> String {
        format!(" {} {} ", index + 1, action.label())
    }

    /// Tab under `column`, given the area the strip was last rendered into.
    pub fn action_at(&self, area: Rect, column: u16, row: u16) -> Option<Action> {
        let inner_row = area.y + 1;
        if row != inner_row {
            return None;
        }

        let mut x = area.x + 1;
        for (i, action) in Action::all().into_iter().enumerate() {
            let width = Self::tab_text(i, action).width() as u16;
            if column >= x && column < x + width {
                return Some(action);
            }
            x += width + SEPARATOR.width() as u16;
        }
        None
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, diffs: &LoadStatus) {
        let mut spans = Vec::new();
        for (i, action) in Action::all().into_iter().enumerate() {
            if i > 0 {
                spans.push(Span::styled(SEPARATOR, Style::default().fg(Color::DarkGray)));
            }
            let style = if action == self.active {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            spans.push(Span::styled(Self::tab_text(i, action), style));
        }

        if *diffs == LoadStatus::Loading {
            spans.push(Span::styled(" ◐ loading changes", Style::default().fg(Color::Yellow)));
        }

        let paragraph = Paragraph::new(Line::from(spans)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(" Merge Request "),
        );

        frame.render_widget(paragraph, area);
    }
}

impl Default for TabStrip {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strip_area() -> Rect {
        Rect::new(0, 0, 80, 3)
    }

    #[test]
    fn tab_strip_starts_on_overview() {
        assert_eq!(TabStrip::new().active(), Action::Notes);
    }

    #[test]
    fn action_at_maps_columns_to_tabs() {
        let strip = TabStrip::new();
        // " 1 Overview " spans columns 1..13, then a separator
        assert_eq!(strip.action_at(strip_area(), 1, 1), Some(Action::Notes));
        assert_eq!(strip.action_at(strip_area(), 12, 1), Some(Action::Notes));
        assert_eq!(strip.action_at(strip_area(), 13, 1), None);
        assert_eq!(strip.action_at(strip_area(), 14, 1), Some(Action::Commits));
    }

    #[test]
    fn action_at_finds_last_tab() {
        let strip = TabStrip::new();
        let start = 1 + [" 1 Overview ", " 2 Commits ", " 3 Changes "]
            .iter()
            .map(|t| t.width() as u16 + 1)
            .sum::<u16>();
        assert_eq!(
            strip.action_at(strip_area(), start, 1),
            Some(Action::Pipelines)
        );
    }

    #[test]
    fn action_at_ignores_border_rows() {
        let strip = TabStrip::new();
        assert_eq!(strip.action_at(strip_area(), 3, 0), None);
        assert_eq!(strip.action_at(strip_area(), 3, 2), None);
    }

    #[test]
    fn set_active_changes_highlight() {
        let mut strip = TabStrip::new();
        strip.set_active(Action::Diffs);
        assert_eq!(strip.active(), Action::Diffs);
    }
}
