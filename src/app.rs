//! Application state and navigation logic.

use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::Result;
use ratatui::widgets::TableState;
use tracing::{debug, info};
use wellwatch_types::{StaffId, StaffRecord, StressLevel, TimeWindow};

use crate::data::{
    available_roles, project, ChartMetric, FetchRequest, HistoryReconciler, Resolution,
    RoleFilter, RosterStatus, RosterStore, SortKey, SortState,
};
use crate::transport::{ConnectionStatus, Transport, TransportEvent};
use crate::ui::Theme;

/// How long a status message stays visible.
const STATUS_MESSAGE_TTL: Duration = Duration::from_secs(3);

/// Number of staff per stress level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StressCounts {
    pub normal: usize,
    pub high: usize,
    pub critical: usize,
}

impl StressCounts {
    pub fn total(&self) -> usize {
        self.normal + self.high + self.critical
    }
}

/// Main application state.
///
/// Owned by the terminal loop. All roster and history mutations happen in
/// [`App::pump`] or in response to a key, never from another task.
pub struct App {
    pub running: bool,
    pub show_help: bool,
    pub show_detail_overlay: bool,

    transport: Box<dyn Transport>,
    pub roster: RosterStore,
    pub history: HistoryReconciler,

    // Selection context
    pub selected_index: usize,
    pub sort: SortState,
    pub role_filter: RoleFilter,
    pub chart_metric: ChartMetric,

    // Name search
    pub filter_text: String,
    pub filter_active: bool,

    // UI
    pub theme: Theme,
    /// Roster table scroll state, kept across frames.
    pub table_state: TableState,

    // Status message (temporary feedback)
    pub status_message: Option<(String, Instant)>,
}

impl App {
    /// Create the app and request the initial roster.
    pub fn new(transport: Box<dyn Transport>) -> Self {
        let mut app = Self {
            running: true,
            show_help: false,
            show_detail_overlay: false,
            table_state: TableState::default(),
            transport,
            roster: RosterStore::new(),
            history: HistoryReconciler::default(),
            selected_index: 0,
            sort: SortState::default(),
            role_filter: RoleFilter::All,
            chart_metric: ChartMetric::default(),
            filter_text: String::new(),
            filter_active: false,
            theme: Theme::default(),
            status_message: None,
        };
        app.transport.request_roster();
        app
    }

    pub fn with_sort(mut self, sort: SortState) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_window(mut self, window: TimeWindow) -> Self {
        self.history = HistoryReconciler::new(window);
        self
    }

    pub fn with_role_filter(mut self, filter: RoleFilter) -> Self {
        self.role_filter = filter;
        self
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    /// Returns a description of the data provider.
    pub fn source_description(&self) -> &str {
        self.transport.description()
    }

    pub fn connection_status(&self) -> ConnectionStatus {
        self.transport.status()
    }

    /// Set a temporary status message that will be shown for a few seconds.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    /// Get the current status message if it hasn't expired.
    pub fn get_status_message(&self) -> Option<&str> {
        if let Some((msg, time)) = &self.status_message {
            if time.elapsed() < STATUS_MESSAGE_TTL {
                return Some(msg);
            }
        }
        None
    }

    /// Apply everything the transport has delivered since the last call.
    ///
    /// Events are applied one at a time in arrival order. Returns the number
    /// of events applied.
    pub fn pump(&mut self) -> usize {
        let keep = self.selected_staff_id();
        let mut applied = 0;

        while let Some(event) = self.transport.poll() {
            self.apply_event(event);
            applied += 1;
        }

        if applied > 0 {
            self.restore_selection(keep);
            self.follow_selection();
        }
        applied
    }

    fn apply_event(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::Roster(Ok(records)) => {
                self.roster.initialize(records);
            }
            TransportEvent::Roster(Err(e)) => {
                self.roster.mark_unavailable(e.to_string());
                self.set_status_message(format!("Roster unavailable: {}", e));
            }
            TransportEvent::History { ticket, result } => {
                if self.history.resolve(ticket, result) == Resolution::Stale {
                    debug!(generation = ticket.generation(), "Ignoring stale history response");
                }
            }
            TransportEvent::Update(record) => {
                self.roster.apply_update(record.clone());
                self.history.observe(&record);
            }
        }
    }

    /// Re-request the roster, and the open chart's history if any.
    pub fn reload(&mut self) {
        info!("Reloading roster");
        self.transport.request_roster();
        if let Some(id) = self.history.selected_staff() {
            let request = self.history.select_staff(id);
            self.dispatch(request);
        }
        self.set_status_message("Reloading...".to_string());
    }

    fn dispatch(&mut self, request: FetchRequest) {
        self.transport.request_history(request);
    }

    /// The roster as currently filtered, searched and sorted.
    pub fn visible_staff(&self) -> Vec<&StaffRecord> {
        let mut rows = project(self.roster.snapshot(), &self.role_filter, self.sort);
        if !self.filter_text.is_empty() {
            rows.retain(|r| self.matches_filter(&r.name));
        }
        rows
    }

    pub fn selected_record(&self) -> Option<&StaffRecord> {
        self.visible_staff().get(self.selected_index).copied()
    }

    fn selected_staff_id(&self) -> Option<StaffId> {
        self.selected_record().map(|r| r.id)
    }

    /// Keep the highlighted row on the same staff member after the
    /// projection reorders, or clamp if they are no longer visible.
    fn restore_selection(&mut self, id: Option<StaffId>) {
        let rows = self.visible_staff();
        let position = id.and_then(|id| rows.iter().position(|r| r.id == id));
        let len = rows.len();
        match position {
            Some(pos) => self.selected_index = pos,
            None => self.selected_index = self.selected_index.min(len.saturating_sub(1)),
        }
    }

    /// Per-level counts over the whole roster.
    pub fn stress_counts(&self) -> StressCounts {
        let mut counts = StressCounts::default();
        for record in self.roster.snapshot() {
            match record.stress_level {
                StressLevel::Normal => counts.normal += 1,
                StressLevel::High => counts.high += 1,
                StressLevel::Critical => counts.critical += 1,
            }
        }
        counts
    }

    /// Move selection down by one item.
    pub fn select_next(&mut self) {
        self.select_next_n(1);
    }

    /// Move selection up by one item.
    pub fn select_prev(&mut self) {
        self.select_prev_n(1);
    }

    /// Move selection down by n items.
    pub fn select_next_n(&mut self, n: usize) {
        let max = self.visible_staff().len().saturating_sub(1);
        self.selected_index = (self.selected_index + n).min(max);
        self.follow_selection();
    }

    /// Move selection up by n items.
    pub fn select_prev_n(&mut self, n: usize) {
        self.selected_index = self.selected_index.saturating_sub(n);
        self.follow_selection();
    }

    /// Jump to the first item in the list.
    pub fn select_first(&mut self) {
        self.selected_index = 0;
        self.follow_selection();
    }

    /// Jump to the last item in the list.
    pub fn select_last(&mut self) {
        self.selected_index = self.visible_staff().len().saturating_sub(1);
        self.follow_selection();
    }

    /// Select a row by its visual position.
    pub fn select_row(&mut self, row: usize) {
        if row < self.visible_staff().len() {
            self.selected_index = row;
            self.follow_selection();
        }
    }

    /// While the chart is open, moving the cursor switches the chart to the
    /// newly highlighted staff member.
    fn follow_selection(&mut self) {
        if !self.show_detail_overlay {
            return;
        }
        let Some(id) = self.selected_staff_id() else {
            return;
        };
        if self.history.selected_staff() != Some(id) {
            let request = self.history.select_staff(id);
            self.dispatch(request);
        }
    }

    /// Open the chart for the highlighted staff member.
    ///
    /// Always issues a fetch, so this also retries a failed load.
    pub fn enter_detail(&mut self) {
        let Some(id) = self.selected_staff_id() else {
            return;
        };
        let request = self.history.select_staff(id);
        self.dispatch(request);
        self.show_detail_overlay = true;
    }

    /// Close the chart and drop its selection.
    pub fn close_overlay(&mut self) {
        self.show_detail_overlay = false;
        self.history.clear_selection();
    }

    /// Navigate back: close overlay first, then clear an applied search.
    pub fn go_back(&mut self) {
        if self.show_detail_overlay {
            self.close_overlay();
        } else if !self.filter_text.is_empty() {
            self.clear_filter();
        }
    }

    /// Toggle the help overlay.
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    pub fn set_window(&mut self, window: TimeWindow) {
        if let Some(request) = self.history.select_window(window) {
            self.dispatch(request);
        }
    }

    pub fn next_window(&mut self) {
        self.set_window(self.history.window().next());
    }

    pub fn prev_window(&mut self) {
        self.set_window(self.history.window().prev());
    }

    pub fn next_metric(&mut self) {
        self.chart_metric = self.chart_metric.next();
    }

    /// Select a sort key; the current key again flips its direction.
    pub fn select_sort(&mut self, key: SortKey) {
        let keep = self.selected_staff_id();
        self.sort.select(key);
        self.restore_selection(keep);
    }

    /// Cycle to the next sort key.
    pub fn cycle_sort(&mut self) {
        self.select_sort(self.sort.key.next());
    }

    /// Toggle sort direction of the current key.
    pub fn toggle_sort_direction(&mut self) {
        self.select_sort(self.sort.key);
    }

    /// Cycle the role filter through `All` and every role on the roster.
    pub fn cycle_role_filter(&mut self) {
        let keep = self.selected_staff_id();
        let roles = available_roles(self.roster.snapshot());
        self.role_filter = self.role_filter.next(&roles);
        self.restore_selection(keep);
    }

    /// Enter filter input mode (starts capturing keystrokes for search).
    pub fn start_filter(&mut self) {
        self.filter_active = true;
    }

    /// Exit filter input mode without clearing the filter text.
    pub fn cancel_filter(&mut self) {
        self.filter_active = false;
    }

    /// Clear the filter text and exit filter mode.
    pub fn clear_filter(&mut self) {
        let keep = self.selected_staff_id();
        self.filter_text.clear();
        self.filter_active = false;
        self.restore_selection(keep);
    }

    /// Append a character to the filter text.
    pub fn filter_push(&mut self, c: char) {
        self.filter_text.push(c);
        self.selected_index = 0;
    }

    /// Remove the last character from the filter text.
    pub fn filter_pop(&mut self) {
        self.filter_text.pop();
        self.selected_index = 0;
    }

    /// Check if a staff name matches the current search.
    pub fn matches_filter(&self, name: &str) -> bool {
        if self.filter_text.is_empty() {
            return true;
        }
        name.to_lowercase().contains(&self.filter_text.to_lowercase())
    }

    /// Signal the application to quit.
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Export the visible roster to a file.
    pub fn export_state(&self, path: &Path) -> Result<()> {
        if !matches!(self.roster.status(), RosterStatus::Ready) {
            anyhow::bail!("No data to export");
        }

        let counts = self.stress_counts();
        let staff = self.visible_staff();
        let export = serde_json::json!({
            "summary": {
                "total_staff": counts.total(),
                "normal": counts.normal,
                "high": counts.high,
                "critical": counts.critical,
            },
            "view": {
                "role_filter": self.role_filter.label(),
                "sort": self.sort.key.label(),
                "direction": format!("{:?}", self.sort.direction),
                "search": self.filter_text,
                "window": self.history.window().label(),
            },
            "staff": staff,
        });

        let json = serde_json::to_string_pretty(&export)?;
        std::fs::write(path, json)?;
        info!(path = %path.display(), rows = staff.len(), "Exported roster");
        Ok(())
    }
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("running", &self.running)
            .field("source", &self.transport.description())
            .field("roster", &self.roster.len())
            .field("history", &self.history.state().label())
            .finish()
    }
}
