//! Roster view rendering.
//!
//! Displays the projected roster as a table with stress status and the
//! latest value of every metric.

use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};
use wellwatch_types::StaffRecord;

use crate::app::App;
use crate::data::{RosterStatus, SortKey};

/// Render the roster table, keeping its scroll offset in `app.table_state`.
pub fn render(frame: &mut Frame, app: &mut App, area: Rect) {
    let mut state = std::mem::take(&mut app.table_state);
    render_table(frame, app, area, &mut state);
    app.table_state = state;
}

fn render_table(frame: &mut Frame, app: &App, area: Rect, state: &mut TableState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    match app.roster.status() {
        RosterStatus::Ready => {}
        RosterStatus::Pending => {
            render_placeholder(frame, block.title(" Staff "), "Loading roster...", area);
            return;
        }
        RosterStatus::Unavailable(reason) => {
            let message = format!("Data unavailable: {}  (press r to retry)", reason);
            render_placeholder(frame, block.title(" Staff "), &message, area);
            return;
        }
    }

    let staff = app.visible_staff();

    let header = Row::new(vec![
        Cell::from(format_header("Name", SortKey::Name, app)),
        Cell::from("Role"),
        Cell::from(format_header("HR", SortKey::Hr, app)),
        Cell::from(format_header("HRV", SortKey::Hrv, app)),
        Cell::from(format_header("Steady", SortKey::Steadiness, app)),
        Cell::from(format_header("Sleep", SortKey::SleepIndex, app)),
        Cell::from(format_header("MWI", SortKey::Mwi, app)),
        Cell::from("Updated"),
        Cell::from(format_header("Status", SortKey::Status, app)),
    ])
    .height(1)
    .style(app.theme.header);

    let rows: Vec<Row> = staff.iter().map(|r| staff_row(r, app)).collect();

    let widths = [
        Constraint::Fill(3),   // Name
        Constraint::Fill(2),   // Role
        Constraint::Length(5), // HR
        Constraint::Length(5), // HRV
        Constraint::Length(7), // Steadiness
        Constraint::Length(6), // Sleep
        Constraint::Length(6), // MWI
        Constraint::Length(9), // Updated
        Constraint::Min(6),    // Status
    ];

    let selected = app.selected_index.min(staff.len().saturating_sub(1));

    let filter_info = if app.filter_active {
        format!(" /{}_", app.filter_text)
    } else if !app.filter_text.is_empty() {
        format!(" /{}/ [c:clear]", app.filter_text)
    } else {
        String::new()
    };

    let position_info = if !staff.is_empty() {
        format!(" [{}/{}]", selected + 1, staff.len())
    } else {
        String::new()
    };

    let title = format!(
        " Staff ({}/{}) [s:sort {}{}]{}{} ",
        staff.len(),
        app.roster.len(),
        app.sort.key.label(),
        app.sort.direction.arrow(),
        filter_info,
        position_info
    );

    let table = Table::new(rows, widths)
        .header(header)
        .block(block.title(title))
        .row_highlight_style(app.theme.selected)
        .highlight_symbol("▶ ");

    state.select(Some(selected));

    frame.render_stateful_widget(table, area, state);
}

fn staff_row<'a>(record: &'a StaffRecord, app: &App) -> Row<'a> {
    let status_style = app.theme.stress_style(record.stress_level);
    Row::new(vec![
        Cell::from(record.name.as_str()),
        Cell::from(record.role.as_str()),
        Cell::from(format_int(record.current_heart_rate)),
        Cell::from(format_int(record.current_hrv)),
        Cell::from(format_float(record.current_steadiness, 2)),
        Cell::from(format_float(record.current_sleep_index, 1)),
        Cell::from(format_float(record.mental_wellness_index, 0)),
        Cell::from(
            record
                .last_update
                .map(|ts| ts.format("%H:%M:%S").to_string())
                .unwrap_or_else(|| "-".to_string()),
        ),
        Cell::from(record.stress_level.symbol()).style(status_style),
    ])
}

fn render_placeholder(frame: &mut Frame, block: Block, message: &str, area: Rect) {
    let paragraph = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("  {}", message),
            Style::default().add_modifier(Modifier::DIM),
        )),
    ])
    .block(block);
    frame.render_widget(paragraph, area);
}

fn format_header(name: &str, key: SortKey, app: &App) -> Span<'static> {
    if app.sort.key == key {
        Span::raw(format!("{}{}", name, app.sort.direction.arrow()))
    } else {
        Span::raw(name.to_string())
    }
}

pub(crate) fn format_int(value: Option<u32>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

pub(crate) fn format_float(value: Option<f64>, precision: usize) -> String {
    value
        .map(|v| format!("{:.*}", precision, v))
        .unwrap_or_else(|| "-".to_string())
}
