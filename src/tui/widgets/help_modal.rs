use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

pub struct HelpModal {
    visible: bool,
}

impl HelpModal {
    pub fn new() -> Self {
        Self { visible: false }
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn toggle(&mut self) {
        self.visible = !self.visible;
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        if !self.visible {
            return;
        }

        frame.render_widget(Clear, area);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(Span::styled(
                " Help ",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ));

        let inner_area = block.inner(area);
        frame.render_widget(block, area);

        let content_area = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1)])
            .split(inner_area)[0];

        frame.render_widget(Paragraph::new(self.build_help_lines()), content_area);
    }

    fn build_help_lines(&self) -> Vec<Line<'static>> {
        vec![
            Self::section_title("Keyboard Shortcuts", Color::Cyan),
            Line::from(""),
            Self::subsection_title("Tabs"),
            Self::key_line("1 - 4", "Overview / Commits / Changes / Pipelines"),
            Self::key_line("Tab / Shift+Tab", "Next / previous tab"),
            Self::key_line("Mouse Click", "Activate clicked tab"),
            Self::key_line("Ctrl/Alt+Click", "Open tab in the system browser"),
            Self::key_line("Middle Click", "Open tab in the system browser"),
            Line::from(""),
            Self::subsection_title("Changes"),
            Self::key_line("v", "Toggle inline / parallel diff view"),
            Self::key_line("n / N", "Jump to next / previous comment"),
            Self::key_line("j / k", "Scroll down / up"),
            Self::key_line("PageDown / PageUp", "Scroll a page"),
            Line::from(""),
            Self::subsection_title("Global"),
            Self::key_line("?", "Toggle this help"),
            Self::key_line("q / Ctrl+C", "Quit"),
            Line::from(""),
            Line::from(vec![
                Span::styled("Esc / ?", Style::default().fg(Color::Yellow)),
                Span::raw(": Close this help"),
            ]),
        ]
    }

    fn section_title(title: &'static str, color: Color) -> Line<'static> {
        Line::from(Span::styled(
            title,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ))
    }

    fn subsection_title(title: &'static str) -> Line<'static> {
        Line::from(Span::styled(
            format!("━━━ {} ━━━", title),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ))
    }

    fn key_line(key: &'static str, description: &'static str) -> Line<'static> {
        Line::from(vec![
            Span::raw("  "),
            Span::styled(format!("{:20}", key), Style::default().fg(Color::Yellow)),
            Span::raw(description),
        ])
    }
}

impl Default for HelpModal {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn help_text() -> String {
        HelpModal::new()
            .build_help_lines()
            .iter()
            .flat_map(|line| line.spans.iter().map(|s| s.content.to_string()))
            .collect()
    }

    #[test]
    fn modal_starts_hidden() {
        assert!(!HelpModal::new().is_visible());
    }

    #[test]
    fn toggle_switches_visibility() {
        let mut modal = HelpModal::new();
        modal.toggle();
        assert!(modal.is_visible());

        modal.hide();
        assert!(!modal.is_visible());
    }

    #[test]
    fn help_text_lists_tab_keys() {
        let text = help_text();
        assert!(text.contains("1 - 4"), "build_help_lines: should list tab keys");
        assert!(
            text.contains("system browser"),
            "build_help_lines: should describe opening tabs externally"
        );
    }

    #[test]
    fn help_text_lists_view_toggle_and_comments() {
        let text = help_text();
        assert!(text.contains("parallel diff view"));
        assert!(text.contains("next / previous comment"));
    }
}
