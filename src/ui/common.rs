//! Common UI components shared across views.
//!
//! This module contains the header bar, window tabs, status bar, and help overlay.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs},
    Frame,
};
use wellwatch_types::{StressLevel, TimeWindow};

use crate::app::App;
use crate::data::RosterStatus;

/// Render the header bar with the roster overview.
///
/// Displays: connection indicator, staff counts by stress level, active role filter.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let connection = app.connection_status();
    let connection_span = Span::styled(
        format!(" ● {} ", connection.label()),
        app.theme.connection_style(connection),
    );

    if !matches!(app.roster.status(), RosterStatus::Ready) {
        let line = Line::from(vec![
            connection_span,
            Span::styled("WELLWATCH ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("│ Waiting for roster..."),
        ]);
        frame.render_widget(Paragraph::new(line), area);
        return;
    }

    let counts = app.stress_counts();
    let count_span = |n: usize, level: StressLevel| {
        if n > 0 {
            Span::styled(format!("{}", n), app.theme.stress_style(level))
        } else {
            Span::styled("0", Style::default().add_modifier(Modifier::DIM))
        }
    };

    let line = Line::from(vec![
        connection_span,
        Span::styled("WELLWATCH ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("│ "),
        count_span(counts.normal, StressLevel::Normal),
        Span::raw(" ok "),
        count_span(counts.high, StressLevel::High),
        Span::raw(" high "),
        count_span(counts.critical, StressLevel::Critical),
        Span::raw(" crit │ "),
        Span::styled(
            format!("{}", counts.total()),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(" staff │ role: "),
        Span::styled(
            app.role_filter.label().to_string(),
            Style::default().fg(app.theme.highlight),
        ),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

/// Render the time window selector.
///
/// Highlights the active window.
pub fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = TimeWindow::ALL
        .iter()
        .map(|w| Line::from(format!(" {} ", w.label())))
        .collect();

    let selected = TimeWindow::ALL
        .iter()
        .position(|w| *w == app.history.window())
        .unwrap_or(0);

    let tabs = Tabs::new(titles)
        .select(selected)
        .style(app.theme.tab_inactive)
        .highlight_style(app.theme.tab_active)
        .padding("", "")
        .divider("|");

    frame.render_widget(tabs, area);
}

/// Map a column in the tab bar back to the window under it.
pub fn window_at_column(column: u16) -> Option<TimeWindow> {
    // Each tab is " label " followed by a one-column divider.
    let mut start = 0u16;
    for window in TimeWindow::ALL {
        let width = window.label().len() as u16 + 2;
        if column < start + width {
            return Some(window);
        }
        start += width + 1;
    }
    None
}

/// Render the status bar at the bottom.
///
/// Shows the provider, roster state and available controls, or a
/// temporary status message.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    let status = match app.roster.status() {
        RosterStatus::Ready => {
            let controls = if app.filter_active {
                "Type to search | Enter:apply Esc:cancel"
            } else if app.show_detail_overlay {
                "←→:window m:metric ↑↓:staff Esc:close ?:help"
            } else {
                "/:search s:sort S:reverse f:role ←→:window Enter:chart ?:help q:quit"
            };
            format!(" {} | {}", app.source_description(), controls)
        }
        RosterStatus::Unavailable(reason) => {
            format!(" Data unavailable: {} | r:retry q:quit", reason)
        }
        RosterStatus::Pending => " Loading roster... | q:quit".to_string(),
    };

    let paragraph = Paragraph::new(status).style(Style::default().add_modifier(Modifier::DIM));
    frame.render_widget(paragraph, area);
}

/// Render the help overlay with keyboard shortcuts.
///
/// Displayed as a centered modal on top of the current view.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let section = |title: &'static str| {
        Line::from(vec![Span::styled(
            title,
            Style::default().add_modifier(Modifier::BOLD),
        )])
    };

    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        section(" Roster"),
        Line::from("  ↑/↓ j/k     Navigate list"),
        Line::from("  PgUp/PgDn   Jump 10 rows"),
        Line::from("  Home/End    Jump to first/last"),
        Line::from("  s / S       Next sort key / reverse"),
        Line::from("  1-7         Sort by column"),
        Line::from("  f           Cycle role filter"),
        Line::from("  /  c        Search by name / clear"),
        Line::from("  Enter       Open history chart"),
        Line::from(""),
        section(" History chart"),
        Line::from("  ←/→ h/l     Change time window"),
        Line::from("  m           Change metric"),
        Line::from("  Enter       Refetch"),
        Line::from("  Esc         Close"),
        Line::from(""),
        section(" General"),
        Line::from("  r           Reload data"),
        Line::from("  e           Export to JSON"),
        Line::from("  q           Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let paragraph = Paragraph::new(help_text).block(block);

    let help_width = 44u16.min(area.width.saturating_sub(4));
    let help_height = 26u16.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(help_width)) / 2;
    let y = area.y + (area.height.saturating_sub(help_height)) / 2;
    let help_area = Rect::new(x, y, help_width, help_height);

    frame.render_widget(ratatui::widgets::Clear, help_area);
    frame.render_widget(paragraph, help_area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tab_columns_map_to_windows() {
        // " 1m |" -> columns 0..4 for 1m, divider at 4, " 5m " at 5..9
        assert_eq!(window_at_column(0), Some(TimeWindow::OneMinute));
        assert_eq!(window_at_column(3), Some(TimeWindow::OneMinute));
        assert_eq!(window_at_column(5), Some(TimeWindow::FiveMinutes));
        assert_eq!(window_at_column(500), None);
    }

    #[test]
    fn rendered_tab_labels_map_back_to_their_window() {
        use crate::transport::ChannelTransport;
        use ratatui::{backend::TestBackend, Terminal};

        let (_handle, transport) = ChannelTransport::create("test");
        let app = App::new(Box::new(transport));
        let mut terminal = Terminal::new(TestBackend::new(80, 1)).unwrap();
        terminal
            .draw(|frame| render_tabs(frame, &app, frame.area()))
            .unwrap();

        let buffer = terminal.backend().buffer();
        let row: String = (0..80).map(|x| buffer[(x, 0)].symbol()).collect();

        for window in TimeWindow::ALL {
            let label = format!(" {} ", window.label());
            let start = row.find(&label).unwrap() as u16;
            for col in start..start + label.len() as u16 {
                assert_eq!(window_at_column(col), Some(window), "column {col} in {row:?}");
            }
        }
    }
}
