use ratatui::{
    layout::{Margin, Rect},
    prelude::*,
    widgets::*,
};

use crate::theme::Theme;
use crate::view_models::tag_table::PullCommandsViewModel;

/// Render the pull commands for one tag as a centered floating window
pub fn render_pull_popup(f: &mut Frame, area: Rect, vm: &PullCommandsViewModel, theme: &Theme) {
    // Label line + command line + spacer per command, plus borders and footer
    let popup_height = (vm.commands.len() as u16 * 3 + 4).min(area.height);
    let popup_width = (area.width * 80 / 100).min(120);
    let popup_area = Rect {
        x: area.x + area.width.saturating_sub(popup_width) / 2,
        y: area.y + area.height.saturating_sub(popup_height) / 2,
        width: popup_width,
        height: popup_height,
    };

    f.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(vm.title.clone())
        .title_style(theme.panel_title())
        .border_style(theme.panel_border())
        .title_bottom(Line::from(vec![
            Span::styled(" Esc", theme.key_hint()),
            Span::styled(" close ", theme.muted()),
        ]))
        .style(Style::default().bg(theme.surface_overlay));
    f.render_widget(block, popup_area);

    let inner = popup_area.inner(Margin {
        horizontal: 2,
        vertical: 1,
    });

    let mut lines = Vec::new();
    for (label, command) in &vm.commands {
        lines.push(Line::from(Span::styled(
            label.clone(),
            theme.key_description(),
        )));
        lines.push(Line::from(Span::styled(
            format!("  $ {}", command),
            theme.text().add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(""));
    }

    f.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .style(Style::default().bg(theme.surface_overlay)),
        inner,
    );
}
