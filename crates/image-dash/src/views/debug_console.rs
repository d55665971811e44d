use ::log::Level;
use ratatui::{prelude::*, widgets::*};

use crate::App;

/// Longest target shown before it is shortened with "..."
const TARGET_WIDTH: usize = 24;

/// Render the debug console as a Quake-style drop-down panel
/// Returns the visible viewport height for page down scrolling
pub fn render_debug_console(f: &mut Frame, area: Rect, app: &App) -> usize {
    let console_state = &app.store.state().debug_console;
    let theme = &app.store.state().theme;

    let console_height = (area.height * console_state.height_percent) / 100;
    let console_area = Rect {
        height: console_height.min(area.height),
        ..area
    };

    f.render_widget(Clear, console_area);

    // A poisoned buffer still holds valid entries
    let logs = console_state
        .logs
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());

    let visible_height = console_height.saturating_sub(2) as usize; // Borders
    let total_logs = logs.len();

    let scroll_offset = if console_state.auto_scroll {
        total_logs.saturating_sub(visible_height)
    } else {
        console_state
            .scroll_offset
            .min(total_logs.saturating_sub(visible_height))
    };

    let log_items: Vec<ListItem> = logs
        .iter()
        .skip(scroll_offset)
        .take(visible_height)
        .map(|entry| {
            let level_color = match entry.level {
                Level::Error => theme.failure,
                Level::Warn => theme.caution,
                Level::Info => theme.fg,
                Level::Debug => theme.fg_dim,
                Level::Trace => theme.fg_faint,
            };

            let target = if entry.target.chars().count() > TARGET_WIDTH {
                let head: String = entry.target.chars().take(TARGET_WIDTH - 3).collect();
                format!("{}...", head)
            } else {
                format!("{:width$}", entry.target, width = TARGET_WIDTH)
            };

            ListItem::new(format!(
                "{} {:5} {} {}",
                entry.timestamp.format("%H:%M:%S%.3f"),
                entry.level.to_string().to_uppercase(),
                target,
                entry.message
            ))
            .style(Style::default().fg(level_color))
        })
        .collect();

    let logs_list = List::new(log_items).block(
        Block::bordered()
            .title(format!(
                " Debug Console ({}/{}) {} ",
                scroll_offset + visible_height.min(total_logs),
                total_logs,
                if console_state.auto_scroll {
                    "[AUTO]"
                } else {
                    "[MANUAL]"
                }
            ))
            .title_bottom(" `~` Close | j/k Scroll | Space Page | a Auto-scroll | c Clear ")
            .border_style(Style::default().fg(theme.accent))
            .style(Style::default().bg(theme.surface_raised)),
    );

    f.render_widget(logs_list, console_area);

    visible_height
}
