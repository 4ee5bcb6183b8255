//! UI rendering for the TUI.
//!
//! Provides layout and widget rendering using ratatui.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph, Tabs},
};

use tasklist_core::FilterKind;

use crate::app::{App, Mode};
use crate::rows::{BAR_WIDTH, render_row_line};

/// Tab titles for the filter bar, in `FilterKind::index` order.
const TAB_TITLES: [&str; 3] = ["All", "Active", "Inactive"];

/// Legend text for keyboard shortcuts.
const LEGEND: &str = concat!(
    " [Enter] Add  [Up/Down] Move  [Space] Select  [Ctrl+S] Start/Stop",
    "  [Ctrl+D] Delete  [Tab] Filter  [Esc] Quit ",
);

/// Cells in a row that are not the task name.
///
/// Checkbox, name padding, date, bar, percentage and control label.
const ROW_FIXED_WIDTH: usize = 4 + 1 + 18 + BAR_WIDTH + 6 + 7;

/// Narrowest name column we shrink to.
const MIN_NAME_WIDTH: usize = 8;

/// Draw the entire UI.
pub fn draw(frame: &mut Frame, app: &App) {
    let chunks = create_main_layout(frame.area());

    draw_input(frame, chunks[0], app);
    draw_tabs(frame, chunks[1], app.filter());
    draw_task_list(frame, chunks[2], app);
    draw_status(frame, chunks[3], app);
    draw_legend(frame, chunks[4]);
}

/// Create the main layout: input, filter tabs, list, status line, legend.
fn create_main_layout(area: Rect) -> Vec<Rect> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Name input
            Constraint::Length(3), // Filter tabs
            Constraint::Min(0),    // Task list
            Constraint::Length(1), // Status line
            Constraint::Length(1), // Legend bar
        ])
        .split(area)
        .to_vec()
}

/// Draw the name input box.
fn draw_input(frame: &mut Frame, area: Rect, app: &App) {
    let editing = app.mode() == Mode::Editing;
    let border_color = if editing { Color::Yellow } else { Color::Cyan };

    let input = Paragraph::new(format!("{}_", app.input())).block(
        Block::default()
            .title(" New task ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border_color)),
    );

    frame.render_widget(input, area);
}

/// Draw the filter tab bar.
fn draw_tabs(frame: &mut Frame, area: Rect, active: FilterKind) {
    let titles: Vec<Line> = TAB_TITLES.iter().map(|t| Line::from(*t)).collect();

    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .select(active.index())
        .style(Style::default().fg(Color::White))
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

    frame.render_widget(tabs, area);
}

/// Draw the visible rows of the task list, scrolled so the cursor stays in view.
fn draw_task_list(frame: &mut Frame, area: Rect, app: &App) {
    let manager = app.manager();
    let block = Block::default()
        .title(format!(" Tasks ({}) ", manager.len()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    if manager.is_empty() {
        let empty = Paragraph::new(empty_message(app.filter()))
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let height = area.height.saturating_sub(2) as usize;
    let offset = scroll_offset(app.cursor(), height);
    let width = name_width(area.width);

    let lines: Vec<Line> = manager
        .rows()
        .enumerate()
        .skip(offset)
        .take(height)
        .map(|(position, row)| render_row_line(&row, position == app.cursor(), width))
        .collect();

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Draw the status line, or the delete prompt while confirming.
fn draw_status(frame: &mut Frame, area: Rect, app: &App) {
    let Some(status) = app.status() else {
        return;
    };

    let style = if status.is_error() {
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
    } else if app.mode() == Mode::ConfirmDelete {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray)
    };

    frame.render_widget(Paragraph::new(format!(" {}", status.text())).style(style), area);
}

/// Draw the legend bar at the bottom.
fn draw_legend(frame: &mut Frame, area: Rect) {
    let legend = Paragraph::new(LEGEND).style(Style::default().fg(Color::Black).bg(Color::Cyan));

    frame.render_widget(legend, area);
}

fn empty_message(filter: FilterKind) -> &'static str {
    match filter {
        FilterKind::All => "No tasks yet. Type a name and press Enter.",
        FilterKind::Active => "No running tasks",
        FilterKind::Inactive => "No stopped or finished tasks",
    }
}

/// First row to show so that `cursor` fits in `height` rows.
fn scroll_offset(cursor: usize, height: usize) -> usize {
    if height == 0 {
        return 0;
    }
    cursor.saturating_sub(height - 1)
}

/// Width left for task names inside a bordered list of `area_width` cells.
fn name_width(area_width: u16) -> usize {
    (area_width as usize)
        .saturating_sub(2 + ROW_FIXED_WIDTH)
        .max(MIN_NAME_WIDTH)
}
