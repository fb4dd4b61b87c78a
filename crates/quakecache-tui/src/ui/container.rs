use chrono::Local;
use ratatui::{
    layout::{Constraint, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use quakecache_core::render::{ContainerView, CONTAINER_ID};
use quakecache_core::utils::truncate_string;

use crate::app::{App, Focus};
use crate::ui::styles;

/// Longest location shown before truncating
const MAX_LOCATION_LEN: usize = 48;

/// Render the data container. The whole area is redrawn from `app.view`.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let focused = matches!(app.focus, Focus::Container);
    let block = Block::default()
        .title(format!(" {} ", app.view.title()))
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(focused));

    let Some(table) = app.view.to_table(&Local) else {
        let lines = match &app.view {
            ContainerView::Message(msg) => vec![Line::from(msg.clone())],
            _ => vec![
                Line::from(""),
                Line::from(vec![
                    Span::styled("  Press ", styles::muted_style()),
                    Span::styled("[f]", styles::help_key_style()),
                    Span::styled(" to fetch data or ", styles::muted_style()),
                    Span::styled("[o]", styles::help_key_style()),
                    Span::styled(" to show stored data", styles::muted_style()),
                ]),
            ],
        };
        frame.render_widget(Paragraph::new(lines).block(block), area);
        return;
    };

    let is_summary = matches!(app.view, ContainerView::Summary(_));

    let header = Row::new(table.headers.iter().map(|h| Cell::from(h.clone())))
        .style(styles::title_style())
        .height(1);

    let rows: Vec<Row> = table
        .rows
        .iter()
        .map(|cells| {
            let cells = cells.iter().enumerate().map(|(col, text)| {
                // Location column
                if !is_summary && col == 1 {
                    Cell::from(truncate_string(text, MAX_LOCATION_LEN))
                } else {
                    Cell::from(text.clone())
                }
            });
            Row::new(cells).style(styles::list_item_style())
        })
        .collect();

    let widths: Vec<Constraint> = if is_summary {
        vec![Constraint::Length(12), Constraint::Length(8)]
    } else {
        vec![
            Constraint::Length(14), // ID
            Constraint::Fill(3),    // Location
            Constraint::Length(9),  // Magnitude
            Constraint::Length(8),  // magType
            Constraint::Length(24), // Time
        ]
    };

    let hint = if is_summary { " - [Enter] show records of selected magType" } else { "" };
    let block = block.title_bottom(Line::from(Span::styled(
        format!(" #{}{} ", CONTAINER_ID, hint),
        styles::muted_style(),
    )));

    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .row_highlight_style(styles::selected_style());

    let mut state = TableState::default();
    if focused && app.row_count() > 0 {
        state.select(Some(app.row_selection));
    }

    frame.render_stateful_widget(table, area, &mut state);
}
