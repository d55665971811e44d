use ratatui::{
    layout::{Constraint, Direction, Layout, Margin, Rect},
    prelude::*,
    widgets::*,
};

use crate::shortcuts::get_shortcuts;
use crate::theme::Theme;

/// Render the shortcuts help as a centered floating window
/// Returns the maximum scroll offset
pub fn render_shortcuts_panel(
    f: &mut Frame,
    area: Rect,
    scroll_offset: usize,
    theme: &Theme,
) -> usize {
    let popup_width = (area.width * 80 / 100).min(90);
    let popup_height = (area.height * 90 / 100).min(36);
    let popup_area = Rect {
        x: area.x + area.width.saturating_sub(popup_width) / 2,
        y: area.y + area.height.saturating_sub(popup_height) / 2,
        width: popup_width,
        height: popup_height,
    };

    f.render_widget(Clear, popup_area);

    let inner = popup_area.inner(Margin {
        horizontal: 2,
        vertical: 1,
    });
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // Scrollable content
            Constraint::Length(1), // Sticky footer
        ])
        .split(inner);
    let (content_area, footer_area) = (chunks[0], chunks[1]);

    let mut text_lines = Vec::new();
    for category in get_shortcuts() {
        text_lines.push(Line::from(Span::styled(
            category.name,
            theme.warning().add_modifier(Modifier::UNDERLINED),
        )));
        text_lines.push(Line::from(""));

        for shortcut in category.shortcuts {
            text_lines.push(Line::from(vec![
                Span::styled(format!("  {:24}", shortcut.key_display), theme.success()),
                Span::styled(shortcut.description, theme.key_description()),
            ]));
        }

        text_lines.push(Line::from(""));
    }

    let total_lines = text_lines.len();
    let visible_height = content_area.height as usize;
    let max_scroll = total_lines.saturating_sub(visible_height);
    let actual_scroll = scroll_offset.min(max_scroll);

    let title = if total_lines > visible_height {
        format!(
            " Keyboard Shortcuts  [{}/{}] ",
            actual_scroll + 1,
            total_lines
        )
    } else {
        " Keyboard Shortcuts ".to_string()
    };

    f.render_widget(
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .title_style(theme.panel_title())
            .border_style(theme.panel_border())
            .style(Style::default().bg(theme.surface_overlay)),
        popup_area,
    );

    f.render_widget(
        Paragraph::new(text_lines)
            .wrap(Wrap { trim: false })
            .scroll((actual_scroll as u16, 0))
            .style(Style::default().bg(theme.surface_overlay)),
        content_area,
    );

    let footer_line = Line::from(vec![
        Span::styled("Press ", theme.muted()),
        Span::styled("?", theme.key_hint()),
        Span::styled(" or ", theme.muted()),
        Span::styled("Esc", theme.key_hint()),
        Span::styled(" to close this help", theme.muted()),
    ]);
    f.render_widget(
        Paragraph::new(footer_line)
            .style(Style::default().bg(theme.surface_overlay))
            .alignment(Alignment::Center),
        footer_area,
    );

    max_scroll
}
