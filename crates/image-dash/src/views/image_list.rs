use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    prelude::*,
    widgets::*,
};

use crate::App;
use crate::state::Focus;
use crate::theme::Theme;
use crate::view_models::image_list::{ImageListViewModel, ListBody};
use crate::view_models::tag_table::RepositoryDetailViewModel;

/// Skeleton rows drawn while a load is pending
const SKELETON_ROWS: usize = 6;

/// Render the image list screen: banner, list body and (if expanded) the
/// detail panel of the selected repository
pub fn render_image_list(f: &mut Frame, area: Rect, app: &App) {
    let state = app.store.state();
    let theme = &state.theme;
    let vm = ImageListViewModel::from_state(&state.images, state.ui.spinner_frame);

    let mut constraints = Vec::new();
    if vm.banner.is_some() {
        constraints.push(Constraint::Length(3));
    }
    constraints.push(Constraint::Min(0));
    constraints.push(Constraint::Length(1)); // Last-sync footer
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    let (body_area, footer_area) = (chunks[chunks.len() - 2], chunks[chunks.len() - 1]);
    if let Some(ref banner) = vm.banner {
        render_error_banner(f, chunks[0], banner, theme);
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .title(vm.title.clone())
        .title_style(theme.panel_title())
        .border_style(theme.panel_border())
        .style(Style::default().bg(theme.surface));

    match vm.body {
        ListBody::Loading {
            spinner,
            ref message,
        } => render_skeleton(f, body_area, block, spinner, message, theme),
        ListBody::Error { ref message } => {
            let text = vec![
                Line::from(""),
                Line::from(Span::styled(format!("✗ {}", message), theme.error())),
                Line::from(""),
                hint_line(&[("r", "reload"), ("s", "sync")], theme),
            ];
            f.render_widget(
                Paragraph::new(text)
                    .block(block)
                    .alignment(Alignment::Center)
                    .wrap(Wrap { trim: false }),
                body_area,
            );
        }
        ListBody::Empty {
            ref message,
            ref hint,
        } => {
            let text = vec![
                Line::from(""),
                Line::from(Span::styled(message.clone(), theme.text())),
                Line::from(""),
                Line::from(Span::styled(hint.clone(), theme.key_hint())),
            ];
            f.render_widget(
                Paragraph::new(text)
                    .block(block)
                    .alignment(Alignment::Center),
                body_area,
            );
        }
        ListBody::Rows { ref rows, selected } => {
            let detail = detail_view_model(app);
            let (list_area, detail_area) = match detail {
                Some(_) => {
                    let split = Layout::default()
                        .direction(Direction::Vertical)
                        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
                        .split(body_area);
                    (split[0], Some(split[1]))
                }
                None => (body_area, None),
            };

            let header = Row::new(vec!["", "Name", "Latest", "Registry", "Tags", "Description"])
                .style(theme.table_header())
                .height(1);

            let table_rows = rows.iter().enumerate().map(|(i, row)| {
                Row::new(vec![
                    Cell::from(row.marker),
                    Cell::from(row.name.clone()),
                    Cell::from(row.latest.clone()),
                    Cell::from(row.registry.clone()),
                    Cell::from(row.tag_count.clone()),
                    Cell::from(row.description.clone()),
                ])
                .style(theme.table_row(i))
            });

            let images_focused = state.images.focus == Focus::Images;
            let table = Table::new(
                table_rows,
                [
                    Constraint::Length(2),
                    Constraint::Percentage(25),
                    Constraint::Percentage(20),
                    Constraint::Percentage(20),
                    Constraint::Length(9),
                    Constraint::Fill(1),
                ],
            )
            .header(header)
            .block(block)
            .row_highlight_style(if images_focused {
                theme.table_selected()
            } else {
                Style::default().add_modifier(Modifier::BOLD)
            })
            .highlight_symbol(if images_focused { "> " } else { "  " })
            .highlight_spacing(HighlightSpacing::Always);

            let mut table_state = TableState::default().with_selected(selected);
            f.render_stateful_widget(table, list_area, &mut table_state);

            if let (Some(detail), Some(detail_area)) = (detail, detail_area) {
                render_repository_detail(f, detail_area, &detail, theme);
            }
        }
    }

    f.render_widget(
        Paragraph::new(Span::styled(format!(" {}", vm.footer), theme.muted()))
            .style(Style::default().bg(theme.surface_raised)),
        footer_area,
    );
}

/// Detail view model of the selected repository, if it is expanded
fn detail_view_model(app: &App) -> Option<RepositoryDetailViewModel> {
    let images = &app.store.state().images;
    let image = images.selected_image()?;
    let row = images.rows.get(&image.name).filter(|row| row.expanded)?;
    Some(RepositoryDetailViewModel::from_state(
        image,
        row,
        images.focus == Focus::Tags,
    ))
}

fn render_repository_detail(
    f: &mut Frame,
    area: Rect,
    vm: &RepositoryDetailViewModel,
    theme: &Theme,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(vm.title.clone())
        .title_bottom(hint_line(
            &[
                ("←/→", "page"),
                ("z", "page size"),
                ("p", "password"),
                ("t", "token"),
                ("Enter", "pull"),
            ],
            theme,
        ))
        .title_style(theme.panel_title())
        .border_style(Style::default().fg(theme.accent_detail))
        .style(Style::default().bg(theme.surface_raised));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(vm.fields.len() as u16),
            Constraint::Length(1), // Pager header
            Constraint::Min(0),
        ])
        .split(inner);

    let field_lines: Vec<Line> = vm
        .fields
        .iter()
        .map(|(label, value)| {
            Line::from(vec![
                Span::styled(format!("{:12}", label), theme.key_description()),
                Span::styled(value.clone(), theme.text()),
            ])
        })
        .collect();
    f.render_widget(Paragraph::new(field_lines), chunks[0]);

    f.render_widget(
        Paragraph::new(Span::styled(vm.tags.header.clone(), theme.warning())),
        chunks[1],
    );

    let header = Row::new(vec!["Tag", "Digest", "Arch"]).style(theme.table_header());
    let rows = vm.tags.rows.iter().enumerate().map(|(i, tag)| {
        Row::new(vec![
            Cell::from(tag.name.clone()),
            Cell::from(tag.digest.clone()),
            Cell::from(tag.architectures.clone()),
        ])
        .style(theme.table_row(i))
    });
    let table = Table::new(
        rows,
        [
            Constraint::Percentage(55),
            Constraint::Length(20),
            Constraint::Fill(1),
        ],
    )
    .header(header)
    .row_highlight_style(theme.table_selected())
    .highlight_symbol("> ")
    .highlight_spacing(HighlightSpacing::Always);

    let mut table_state = TableState::default().with_selected(vm.tags.selected);
    f.render_stateful_widget(table, chunks[2], &mut table_state);
}

fn render_skeleton(
    f: &mut Frame,
    area: Rect,
    block: Block,
    spinner: &str,
    message: &str,
    theme: &Theme,
) {
    let inner = block.inner(area);
    f.render_widget(block, area);

    let width = inner.width.saturating_sub(4) as usize;
    let mut lines = vec![
        Line::from(Span::styled(format!("{} {}", spinner, message), theme.text())),
        Line::from(""),
    ];
    // Alternate bar widths so the skeleton reads as rows of varying content
    for i in 0..SKELETON_ROWS {
        let bar = width * if i % 2 == 0 { 3 } else { 2 } / 4;
        lines.push(Line::from(Span::styled(
            "▆".repeat(bar),
            Style::default().fg(theme.skeleton),
        )));
    }

    f.render_widget(
        Paragraph::new(lines).block(Block::default().padding(Padding::horizontal(1))),
        inner,
    );
}

fn render_error_banner(f: &mut Frame, area: Rect, message: &str, theme: &Theme) {
    let line = Line::from(vec![
        Span::styled(format!(" ✗ {} ", message), theme.error()),
        Span::styled(" x ", theme.key_hint()),
        Span::styled("dismiss", theme.muted()),
    ]);
    f.render_widget(
        Paragraph::new(line).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Error ")
                .border_style(theme.error()),
        ),
        area,
    );
}

/// Inline "key action" hints
fn hint_line<'a>(hints: &[(&'a str, &'a str)], theme: &Theme) -> Line<'a> {
    let mut spans = Vec::new();
    for (key, label) in hints {
        spans.push(Span::styled(format!(" {} ", key), theme.key_hint()));
        spans.push(Span::styled(*label, theme.key_description()));
    }
    spans.push(Span::raw(" "));
    Line::from(spans)
}
