use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    prelude::*,
    widgets::*,
};

use crate::App;
use crate::state::{ConnectionState, TaskStatusType};

/// Render the bottom status line: task progress on the left, connection
/// and key hints on the right
pub fn render_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let state = app.store.state();
    let theme = &state.theme;

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(44)])
        .split(area);

    let status_line = match state.task.status {
        Some(ref status) => {
            let (icon, style) = match status.status_type {
                TaskStatusType::Running => ("⏳", theme.warning()),
                TaskStatusType::Success => ("✓", theme.success()),
                TaskStatusType::Error => ("✗", theme.error()),
                TaskStatusType::Warning => ("⚠", theme.warning()),
            };
            Line::from(Span::styled(format!(" {} {}", icon, status.message), style))
        }
        None => Line::from(""),
    };
    f.render_widget(
        Paragraph::new(status_line).style(Style::default().bg(theme.surface_raised)),
        chunks[0],
    );

    let (connection, connection_style) = match state.images.connection {
        ConnectionState::Disconnected => ("○ offline", theme.muted()),
        ConnectionState::Connecting => ("◌ connecting", theme.warning()),
        ConnectionState::Connected => ("● connected", theme.success()),
        ConnectionState::Failed => ("✗ not connected", theme.error()),
    };
    let mut spans = Vec::new();
    if state.config.mock {
        spans.push(Span::styled("[mock] ", theme.warning()));
    }
    spans.extend([
        Span::styled(connection, connection_style),
        Span::styled("  r", theme.key_hint()),
        Span::styled(" reload ", theme.key_description()),
        Span::styled("s", theme.key_hint()),
        Span::styled(" sync ", theme.key_description()),
        Span::styled("?", theme.key_hint()),
        Span::styled(" help ", theme.key_description()),
    ]);
    f.render_widget(
        Paragraph::new(Line::from(spans))
            .alignment(Alignment::Right)
            .style(Style::default().bg(theme.surface_raised)),
        chunks[1],
    );
}
