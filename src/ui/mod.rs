//! User interface rendering
//!
//! Draws the plugin checklist, batch progress and the end-of-run summary
//! from an `AppState`. Rendering never mutates state.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, ListState, Paragraph, Wrap},
};

use crate::app::{AppMode, AppState};
use crate::report::RunReport;
use crate::theme::Styles;

/// Key hints shown at the bottom, per mode
fn nav_hints(mode: AppMode) -> &'static str {
    match mode {
        AppMode::Selecting => {
            "↑↓/jk: Move | Space: Toggle | a: All | n: None | s: Sort | Enter: Clean | ?: Help | q: Quit"
        }
        AppMode::Cleaning => "Esc: Cancel after current plugin | q: Cancel and quit",
        AppMode::Done => "Enter/q: Quit",
    }
}

/// Render the whole screen
pub fn render(f: &mut Frame, state: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(if state.mode == AppMode::Cleaning { 3 } else { 0 }),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(f.area());

    let header = Paragraph::new(Line::from(Span::styled(state.title.clone(), Styles::title())))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Styles::border())
                .title(" Plugin Cleaner "),
        );
    f.render_widget(header, chunks[0]);

    match state.mode {
        AppMode::Selecting => render_checklist(f, state, chunks[1]),
        AppMode::Cleaning | AppMode::Done => render_log(f, state, chunks[1]),
    }

    if state.mode == AppMode::Cleaning {
        render_progress(f, state, chunks[2]);
    }

    f.render_widget(
        Paragraph::new(state.status_message.clone()).style(Styles::text()),
        chunks[3],
    );
    f.render_widget(
        Paragraph::new(nav_hints(state.mode)).style(Styles::nav_hint()),
        chunks[4],
    );

    if let Some(report) = &state.report {
        render_summary(f, report);
    }
    if state.help_visible {
        render_help(f);
    }
}

fn render_checklist(f: &mut Frame, state: &AppState, area: Rect) {
    let items: Vec<ListItem> = state
        .selection
        .entries()
        .iter()
        .map(|entry| {
            let mark = if entry.checked { "[x]" } else { "[ ]" };
            let style = if entry.checked {
                Styles::checked()
            } else {
                Styles::unchecked()
            };
            ListItem::new(Line::from(vec![
                Span::styled(format!("{} {}", mark, entry.name), style),
                Span::styled(format!("  ({})", entry.priority), Styles::text_muted()),
            ]))
        })
        .collect();

    let title = format!(
        " Plugins ({}/{} selected, by {}) ",
        state.selection.checked_count(),
        state.selection.len(),
        state.selection.sort_order()
    );
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Styles::border())
                .title(title),
        )
        .highlight_style(Styles::selected())
        .highlight_symbol("> ");

    let mut list_state = ListState::default();
    if !state.selection.is_empty() {
        list_state.select(Some(state.cursor));
    }
    f.render_stateful_widget(list, area, &mut list_state);
}

fn render_log(f: &mut Frame, state: &AppState, area: Rect) {
    // Keep the newest lines in view
    let visible = area.height.saturating_sub(2) as usize;
    let skip = state.log.len().saturating_sub(visible);
    let lines: Vec<Line> = state
        .log
        .iter()
        .skip(skip)
        .map(|line| {
            let style = if line.starts_with('✓') {
                Styles::success()
            } else if line.starts_with('✗') {
                Styles::error()
            } else {
                Styles::warning()
            };
            Line::from(Span::styled(line.clone(), style))
        })
        .collect();

    let log = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Styles::border())
            .title(" Results "),
    );
    f.render_widget(log, area);
}

fn render_progress(f: &mut Frame, state: &AppState, area: Rect) {
    let Some(progress) = &state.progress else {
        return;
    };
    let ratio = if progress.total == 0 {
        0.0
    } else {
        (progress.done as f64 / progress.total as f64).clamp(0.0, 1.0)
    };
    let label = match &progress.current {
        Some(name) => format!("{}/{}  {}", progress.done, progress.total, name),
        None => format!("{}/{}", progress.done, progress.total),
    };
    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title(" Progress "))
        .gauge_style(Styles::gauge())
        .ratio(ratio)
        .label(label);
    f.render_widget(gauge, area);
}

fn render_summary(f: &mut Frame, report: &RunReport) {
    let failure = report.exit_code() == 1;
    let mut lines = Vec::new();
    if let Some(err) = &report.launch_error {
        lines.push(Line::from(Span::styled(err.title(), Styles::error())));
        lines.push(Line::from(err.body()));
        lines.push(Line::from(""));
    }
    if report.canceled {
        lines.push(Line::from(Span::styled("Cancelled", Styles::warning())));
    }
    let title_style = if report.summary.is_failure() {
        Styles::error()
    } else {
        Styles::success()
    };
    lines.push(Line::from(Span::styled(report.summary.title(), title_style)));
    for line in report.summary.body().lines() {
        lines.push(Line::from(line.to_string()));
    }

    let area = centered_rect(60, 50, f.area());
    f.render_widget(Clear, area);
    let dialog = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .style(Styles::dialog(failure))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(if failure { Styles::error() } else { Styles::border() })
                .title(" Summary "),
        );
    f.render_widget(dialog, area);
}

fn render_help(f: &mut Frame) {
    let lines = vec![
        Line::from(Span::styled("Keys", Styles::title())),
        Line::from("Up/Down, j/k   move"),
        Line::from("PgUp/PgDn      move by 10"),
        Line::from("Home/End, g/G  first / last"),
        Line::from("Space          toggle plugin"),
        Line::from("a / n          select all / none"),
        Line::from("s              sort by priority or name"),
        Line::from("Enter, c       clean selected plugins"),
        Line::from("Esc            cancel while cleaning"),
        Line::from("q              quit"),
    ];
    let area = centered_rect(50, 60, f.area());
    f.render_widget(Clear, area);
    f.render_widget(
        Paragraph::new(lines).style(Styles::dialog(false)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Styles::border())
                .title(" Help (any key to close) "),
        ),
        area,
    );
}

/// Rectangle of `percent_x` by `percent_y` centered in `area`
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
