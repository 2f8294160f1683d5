//! Detail overlay rendering.
//!
//! Displays a modal overlay charting the selected staff member's history
//! for the active time window and metric.

use chrono::Utc;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Clear, Dataset, GraphType, Paragraph},
    Frame,
};

use super::roster::{format_float, format_int};
use crate::app::App;
use crate::data::{ChartSeries, HistoryState};

/// Minimum width required for the detail overlay to render properly.
const MIN_OVERLAY_WIDTH: u16 = 50;
/// Minimum height required for the detail overlay to render properly.
const MIN_OVERLAY_HEIGHT: u16 = 16;

/// Render the history chart as a modal overlay.
pub fn render_overlay(frame: &mut Frame, app: &App, area: Rect) {
    if area.width < MIN_OVERLAY_WIDTH || area.height < MIN_OVERLAY_HEIGHT {
        return;
    }

    let Some(staff_id) = app.history.selected_staff() else {
        return;
    };
    let record = app.roster.get(staff_id);

    let overlay_width = (area.width * 95 / 100).clamp(MIN_OVERLAY_WIDTH, 120);
    let overlay_height = (area.height * 90 / 100).clamp(MIN_OVERLAY_HEIGHT, 50);

    let x = area.x + (area.width.saturating_sub(overlay_width)) / 2;
    let y = area.y + (area.height.saturating_sub(overlay_height)) / 2;
    let overlay_area = Rect::new(x, y, overlay_width, overlay_height);

    frame.render_widget(Clear, overlay_area);

    let chunks = Layout::vertical([
        Constraint::Length(5), // Staff summary
        Constraint::Min(8),    // Chart
        Constraint::Length(1), // Footer
    ])
    .split(overlay_area);

    // ===== HEADER SECTION =====
    let mut header_lines = Vec::new();
    match record {
        Some(r) => {
            header_lines.push(Line::from(vec![
                Span::styled(format!(" {} ", r.name), Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(format!("({})  ", r.role)),
                Span::styled(
                    format!("{} {}", r.stress_level.symbol(), r.stress_level.label()),
                    app.theme.stress_style(r.stress_level).add_modifier(Modifier::BOLD),
                ),
            ]));
            header_lines.push(Line::from(""));
            header_lines.push(Line::from(format!(
                " HR: {}  HRV: {}  Steadiness: {}  Sleep: {}  MWI: {}  Slept: {}h",
                format_int(r.current_heart_rate),
                format_int(r.current_hrv),
                format_float(r.current_steadiness, 2),
                format_float(r.current_sleep_index, 1),
                format_float(r.mental_wellness_index, 0),
                format_float(r.sleep_hours_last_night, 1),
            )));
        }
        None => header_lines.push(Line::from(format!(" Staff #{}", staff_id))),
    }

    let header = Paragraph::new(header_lines).block(
        Block::default()
            .title(" Staff Detail ")
            .borders(Borders::ALL)
            .border_type(app.theme.border_type)
            .border_style(Style::default().fg(app.theme.highlight)),
    );
    frame.render_widget(header, chunks[0]);

    // ===== CHART SECTION =====
    let window = app.history.window();
    let metric = app.chart_metric;
    let title = format!(
        " {} [{}] ({}) ",
        metric.label(),
        window.label(),
        app.history.state().label()
    );
    let chart_block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    match app.history.state() {
        HistoryState::Ready(points) => {
            let series = ChartSeries::build(points, metric, window, Utc::now());
            if series.is_empty() {
                render_message(frame, chart_block, "No data in this window", chunks[1]);
            } else {
                render_chart(frame, app, chart_block, &series, chunks[1]);
            }
        }
        HistoryState::Loading => render_message(frame, chart_block, "Loading...", chunks[1]),
        HistoryState::Error(message) => {
            let text = format!("Failed to load history: {}  (Enter to retry)", message);
            render_message(frame, chart_block, &text, chunks[1]);
        }
        HistoryState::Idle => render_message(frame, chart_block, "", chunks[1]),
    }

    // ===== FOOTER =====
    let footer = Paragraph::new(Line::from(vec![Span::styled(
        " ←/→ window  m metric  Esc close ",
        Style::default().add_modifier(Modifier::DIM),
    )]));
    frame.render_widget(footer, chunks[2]);
}

fn render_chart(frame: &mut Frame, app: &App, block: Block, series: &ChartSeries, area: Rect) {
    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(app.theme.chart_line))
        .data(&series.data);

    let [y_min, y_max] = series.y_bounds;
    let precision = if y_max - y_min <= 10.0 { 1 } else { 0 };
    let y_labels = vec![
        Span::raw(format!("{:.*}", precision, y_min)),
        Span::raw(format!("{:.*}", precision, (y_min + y_max) / 2.0)),
        Span::raw(format!("{:.*}", precision, y_max)),
    ];
    let x_labels: Vec<Span> = series.x_labels.iter().map(|l| Span::raw(l.clone())).collect();

    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .style(Style::default().fg(app.theme.border))
                .bounds(series.x_bounds)
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .style(Style::default().fg(app.theme.border))
                .bounds(series.y_bounds)
                .labels(y_labels),
        );

    frame.render_widget(chart, area);
}

fn render_message(frame: &mut Frame, block: Block, message: &str, area: Rect) {
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
