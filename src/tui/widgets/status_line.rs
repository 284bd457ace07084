use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::loader::LoadStatus;
use crate::models::{DiffLayoutMode, LayoutMode};

/// Snapshot of what the status line shows for one frame.
#[derive(Debug, Clone)]
pub struct StatusSnapshot {
    pub address: String,
    pub layout: LayoutMode,
    pub view_mode: DiffLayoutMode,
    pub diffs: LoadStatus,
    pub commits: LoadStatus,
    pub message: Option<String>,
}

fn status_marker(status: &LoadStatus) -> (&'static str, Color) {
    match status {
        LoadStatus::Idle => ("○", Color::Gray),
        LoadStatus::Loading => ("◐", Color::Yellow),
        LoadStatus::Loaded => ("●", Color::Green),
        LoadStatus::Failed(_) => ("✗", Color::Red),
    }
}

fn layout_name(layout: LayoutMode) -> &'static str {
    match layout {
        LayoutMode::Expanded => "expanded",
        LayoutMode::Limited => "limited",
    }
}

pub struct StatusLine;

impl StatusLine {
    pub fn spans(snapshot: &StatusSnapshot) -> Vec<Span<'static>> {
        let (diff_marker, diff_color) = status_marker(&snapshot.diffs);
        let (commit_marker, commit_color) = status_marker(&snapshot.commits);

        let mut spans = vec![
            Span::styled(
                snapshot.address.clone(),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" | "),
            Span::raw(format!("layout: {} ", layout_name(snapshot.layout))),
            Span::raw(format!("view: {} ", snapshot.view_mode)),
            Span::raw("| "),
            Span::styled(format!("{} changes ", diff_marker), Style::default().fg(diff_color)),
            Span::styled(
                format!("{} commits", commit_marker),
                Style::default().fg(commit_color),
            ),
        ];

        if let Some(message) = &snapshot.message {
            let style = if message.contains("Failed") {
                Style::default().fg(Color::Red)
            } else {
                Style::default().fg(Color::Green)
            };
            spans.push(Span::raw(" | "));
            spans.push(Span::styled(message.clone(), style));
        }
        spans
    }

    pub fn render(frame: &mut Frame, area: Rect, snapshot: &StatusSnapshot) {
        let mut spans = Self::spans(snapshot);
        spans.push(Span::raw(" | "));
        spans.push(Span::styled("?", Style::default().fg(Color::Yellow)));
        spans.push(Span::raw(": Help"));

        let paragraph = Paragraph::new(Line::from(spans)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        );
        frame.render_widget(paragraph, area);
    }
}
