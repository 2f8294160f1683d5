use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use tracing::warn;

use crate::app::App;
use crate::data::SortKey;
use crate::ui::common::window_at_column;

/// File written by the export key.
pub const EXPORT_FILE: &str = "wellwatch_export.json";

/// Poll for events with a timeout
pub fn poll_event(timeout: Duration) -> Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

/// Handle a key event
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    // If help is shown, any key closes it
    if app.show_help {
        app.show_help = false;
        return;
    }

    if app.show_detail_overlay {
        handle_overlay_input(app, key);
        return;
    }

    if app.filter_active {
        handle_filter_input(app, key);
        return;
    }

    match key.code {
        KeyCode::Char('q') => app.quit(),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => app.quit(),

        // Navigation
        KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::PageUp => app.select_prev_n(10),
        KeyCode::PageDown => app.select_next_n(10),
        KeyCode::Home => app.select_first(),
        KeyCode::End => app.select_last(),

        // Time window (also applies to the next chart opened)
        KeyCode::Left | KeyCode::Char('h') => app.prev_window(),
        KeyCode::Right | KeyCode::Char('l') => app.next_window(),

        KeyCode::Enter => app.enter_detail(),
        KeyCode::Esc | KeyCode::Backspace => app.go_back(),

        KeyCode::Char('r') => app.reload(),
        KeyCode::Char('?') => app.toggle_help(),

        // Sorting
        KeyCode::Char('s') => app.cycle_sort(),
        KeyCode::Char('S') => app.toggle_sort_direction(),
        KeyCode::Char(c @ '1'..='7') => {
            let idx = c as usize - '1' as usize;
            app.select_sort(SortKey::ALL[idx]);
        }

        // Role filter
        KeyCode::Char('f') => app.cycle_role_filter(),

        // Name search
        KeyCode::Char('/') => app.start_filter(),
        KeyCode::Char('c') => {
            if !app.filter_text.is_empty() {
                app.clear_filter();
            }
        }

        KeyCode::Char('e') => export(app),

        _ => {}
    }
}

/// Keys while the history chart is open
fn handle_overlay_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Backspace | KeyCode::Char('q') => app.close_overlay(),
        KeyCode::Enter => app.enter_detail(),

        // Scrolling through staff switches the chart
        KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::PageUp => app.select_prev_n(10),
        KeyCode::PageDown => app.select_next_n(10),
        KeyCode::Home => app.select_first(),
        KeyCode::End => app.select_last(),

        KeyCode::Left | KeyCode::Char('h') => app.prev_window(),
        KeyCode::Right | KeyCode::Char('l') => app.next_window(),
        KeyCode::Char('m') | KeyCode::Tab => app.next_metric(),

        KeyCode::Char('r') => app.reload(),
        KeyCode::Char('?') => app.toggle_help(),
        KeyCode::Char('e') => export(app),
        _ => {}
    }
}

/// Handle key input while filter is active
fn handle_filter_input(app: &mut App, key: KeyEvent) {
    match key.code {
        // Confirm filter
        KeyCode::Enter => {
            app.filter_active = false;
        }

        // Cancel filter (keep text but exit input mode)
        KeyCode::Esc => {
            app.cancel_filter();
        }

        // Clear and exit
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.clear_filter();
        }

        KeyCode::Backspace => {
            app.filter_pop();
            if app.filter_text.is_empty() {
                app.filter_active = false;
            }
        }

        KeyCode::Char(c) => {
            app.filter_push(c);
        }

        _ => {}
    }
}

fn export(app: &mut App) {
    let export_path = PathBuf::from(EXPORT_FILE);
    match app.export_state(&export_path) {
        Ok(()) => {
            app.set_status_message(format!("Exported to {}", export_path.display()));
        }
        Err(e) => {
            warn!(error = %e, "Export failed");
            app.set_status_message(format!("Export failed: {}", e));
        }
    }
}

/// Handle mouse events
pub fn handle_mouse_event(app: &mut App, mouse: MouseEvent, content_start_row: u16) {
    match mouse.kind {
        MouseEventKind::ScrollUp => app.select_prev(),
        MouseEventKind::ScrollDown => app.select_next(),

        MouseEventKind::Down(MouseButton::Left) => {
            let clicked_row = mouse.row;

            // Window tabs (row 1, after header)
            if clicked_row == 1 {
                if let Some(window) = window_at_column(mouse.column) {
                    app.set_window(window);
                }
                return;
            }

            if app.show_detail_overlay {
                return;
            }

            // Content area: after header, tabs, border and table header
            if clicked_row > content_start_row {
                let item_row = (clicked_row - content_start_row - 1) as usize;
                app.select_row(app.table_state.offset() + item_row);
            }
        }

        MouseEventKind::Down(MouseButton::Right) => app.go_back(),

        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;
    use wellwatch_types::{StaffRecord, TimeWindow};

    use crate::transport::{ChannelTransport, TransportEvent, TransportHandle, TransportRequest};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: event::KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn app() -> (TransportHandle, App) {
        let (mut handle, transport) = ChannelTransport::create("test");
        let mut app = App::new(Box::new(transport));
        handle.take_requests();
        handle.send(TransportEvent::Roster(Ok(vec![
            StaffRecord::new(1, "Alice", "Doctor"),
            StaffRecord::new(2, "Bob", "Nurse"),
        ])));
        app.pump();
        (handle, app)
    }

    fn click(row: u16) -> MouseEvent {
        MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 5,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn row_click_accounts_for_scrolled_table() {
        use ratatui::{backend::TestBackend, Terminal};

        let (handle, mut app) = app();
        let many: Vec<StaffRecord> = (1..=20)
            .map(|id| StaffRecord::new(id, format!("Staff {id:02}"), "Nurse"))
            .collect();
        handle.send(TransportEvent::Roster(Ok(many)));
        app.pump();
        app.select_last();

        // Eight rows leave room for five staff below the border and header.
        let mut terminal = Terminal::new(TestBackend::new(100, 8)).unwrap();
        terminal
            .draw(|frame| crate::ui::roster::render(frame, &mut app, frame.area()))
            .unwrap();
        let offset = app.table_state.offset();
        assert!(offset > 0);

        // First visible row: header (0) + tabs (1) + border (2) + table header (3).
        handle_mouse_event(&mut app, click(4), 3);
        assert_eq!(app.selected_index, offset);
        assert_eq!(app.selected_record().unwrap().id, offset as u64 + 1);
    }

    #[test]
    fn help_closes_on_any_key() {
        let (_handle, mut app) = app();
        handle_key_event(&mut app, key(KeyCode::Char('?')));
        assert!(app.show_help);
        handle_key_event(&mut app, key(KeyCode::Char('x')));
        assert!(!app.show_help);
        assert!(app.running);
    }

    #[test]
    fn number_keys_pick_sort_column() {
        let (_handle, mut app) = app();
        handle_key_event(&mut app, key(KeyCode::Char('2')));
        assert_eq!(app.sort.key, SortKey::Name);
        handle_key_event(&mut app, key(KeyCode::Char('4')));
        assert_eq!(app.sort.key, SortKey::Hr);
    }

    #[test]
    fn enter_opens_chart_and_esc_closes() {
        let (mut handle, mut app) = app();
        handle_key_event(&mut app, key(KeyCode::Enter));
        assert!(app.show_detail_overlay);
        assert!(matches!(
            handle.take_requests().as_slice(),
            [TransportRequest::History(_)]
        ));

        handle_key_event(&mut app, key(KeyCode::Right));
        assert_eq!(app.history.window(), TimeWindow::TenMinutes);

        handle_key_event(&mut app, key(KeyCode::Esc));
        assert!(!app.show_detail_overlay);
        assert_eq!(app.history.selected_staff(), None);
    }

    #[test]
    fn typing_in_search_mode_does_not_trigger_commands() {
        let (_handle, mut app) = app();
        handle_key_event(&mut app, key(KeyCode::Char('/')));
        handle_key_event(&mut app, key(KeyCode::Char('q')));
        assert!(app.running);
        assert_eq!(app.filter_text, "q");
        handle_key_event(&mut app, key(KeyCode::Backspace));
        assert!(!app.filter_active);
    }

    #[test]
    fn q_quits() {
        let (_handle, mut app) = app();
        handle_key_event(&mut app, key(KeyCode::Char('q')));
        assert!(!app.running);
    }
}
