//! Row rendering for the task list.
//!
//! Maps a `TaskRow` snapshot to a styled line: selection box, name,
//! creation date, progress bar and the start/stop control.

use chrono::{DateTime, Local};
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};
use tasklist_core::{MAX_PROGRESS, TaskRow, TaskState};

/// Creation date format shown in each row
pub const DATE_FORMAT: &str = "%d.%m.%Y %H:%M";

/// Width of the progress bar in cells
pub const BAR_WIDTH: usize = 20;

/// Glyphs used by the progress bar
mod glyph {
    pub const FILLED: char = '█';
    pub const EMPTY: char = '░';
}

/// Format a creation timestamp for display.
pub fn format_date(date: &DateTime<Local>) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Label of the start/stop control for a task in `state`.
pub fn control_label(state: TaskState) -> &'static str {
    match state {
        TaskState::Idle => "[Start]",
        TaskState::Running => "[Stop] ",
        TaskState::Done => "[Done] ",
    }
}

/// Selection checkbox.
pub fn checkbox(selected: bool) -> &'static str {
    if selected { "[x]" } else { "[ ]" }
}

/// Render `progress` as a fixed-width bar.
///
/// Partial cells round down, so the bar is only full at 100.
pub fn progress_bar(progress: u8, width: usize) -> String {
    let progress = progress.min(MAX_PROGRESS) as usize;
    let filled = progress * width / MAX_PROGRESS as usize;
    let mut bar = String::with_capacity(width * 3);
    bar.extend(std::iter::repeat_n(glyph::FILLED, filled));
    bar.extend(std::iter::repeat_n(glyph::EMPTY, width - filled));
    bar
}

/// Color for the progress bar and control of a task in `state`.
fn state_color(state: TaskState) -> Color {
    match state {
        TaskState::Idle => Color::Gray,
        TaskState::Running => Color::Green,
        TaskState::Done => Color::Blue,
    }
}

/// Render a single task row as a styled line.
pub fn render_row_line(row: &TaskRow, is_cursor: bool, name_width: usize) -> Line<'static> {
    let state = row.state();
    let color = state_color(state);

    let name_style = if is_cursor {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
            .bg(Color::DarkGray)
    } else {
        Style::default().fg(Color::White)
    };

    Line::from(vec![
        Span::raw(format!("{} ", checkbox(row.selected))),
        Span::styled(
            format!("{:<name_width$} ", truncate(&row.name, name_width)),
            name_style,
        ),
        Span::styled(
            format!("{}  ", format_date(&row.created_at)),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(progress_bar(row.progress, BAR_WIDTH), Style::default().fg(color)),
        Span::raw(format!(" {:>3}% ", row.progress)),
        Span::styled(
            control_label(state),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
    ])
}

/// Cut `name` to at most `width` characters, marking the cut with `…`.
fn truncate(name: &str, width: usize) -> String {
    if name.chars().count() <= width {
        return name.to_string();
    }
    let mut cut: String = name.chars().take(width.saturating_sub(1)).collect();
    cut.push('…');
    cut
}
