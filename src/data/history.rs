//! Historical series for the selected staff member.
//!
//! A [`HistoryReconciler`] combines one bulk fetch per selection with the
//! live updates observed afterwards:
//!
//! ```text
//!            select_staff / select_window
//!   Idle ───────────────────────────────▶ Loading ──resolve(Ok)──▶ Ready ◀─┐
//!                                          │   ▲                    │     │ observe
//!                                resolve(Err)  └──── reselect ──────┘─────┘
//!                                          ▼
//!                                        Error
//! ```
//!
//! Every fetch is tagged with a [`FetchTicket`]. A response is committed only
//! if its ticket is the one currently outstanding, so a late answer for a
//! previous selection can never overwrite the current one.

use tracing::debug;
use wellwatch_types::{MetricPoint, StaffId, StaffRecord, TimeWindow};

/// Tag identifying one issued fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FetchTicket {
    generation: u64,
}

impl FetchTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// A fetch the caller must perform and report back through
/// [`HistoryReconciler::resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub ticket: FetchTicket,
    pub staff_id: StaffId,
    pub window: TimeWindow,
}

/// Reconciler state for the current selection.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum HistoryState {
    /// No staff member selected.
    #[default]
    Idle,
    /// A fetch is in flight; the sequence is empty.
    Loading,
    /// Fetch succeeded; live updates are being appended.
    Ready(Vec<MetricPoint>),
    /// Fetch failed; a new selection is required to retry.
    Error(String),
}

impl HistoryState {
    pub fn label(&self) -> &'static str {
        match self {
            HistoryState::Idle => "idle",
            HistoryState::Loading => "loading",
            HistoryState::Ready(_) => "ready",
            HistoryState::Error(_) => "error",
        }
    }
}

/// Outcome of [`HistoryReconciler::resolve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The response belonged to the current selection and was applied.
    Committed,
    /// The response belonged to an abandoned selection and was dropped.
    Stale,
}

/// Keeps the chart series for one staff member and one window current.
#[derive(Debug, Clone)]
pub struct HistoryReconciler {
    staff_id: Option<StaffId>,
    window: TimeWindow,
    state: HistoryState,
    outstanding: Option<FetchTicket>,
    next_generation: u64,
}

impl Default for HistoryReconciler {
    fn default() -> Self {
        Self::new(TimeWindow::default())
    }
}

impl HistoryReconciler {
    /// Create an idle reconciler with the given initial window.
    pub fn new(window: TimeWindow) -> Self {
        Self {
            staff_id: None,
            window,
            state: HistoryState::Idle,
            outstanding: None,
            next_generation: 0,
        }
    }

    pub fn state(&self) -> &HistoryState {
        &self.state
    }

    /// The current sequence; empty unless `Ready`.
    pub fn points(&self) -> &[MetricPoint] {
        match &self.state {
            HistoryState::Ready(points) => points,
            _ => &[],
        }
    }

    pub fn selected_staff(&self) -> Option<StaffId> {
        self.staff_id
    }

    pub fn window(&self) -> TimeWindow {
        self.window
    }

    /// Select a staff member and start loading their history.
    ///
    /// The previous sequence is discarded immediately, even when the same
    /// staff member is selected again.
    pub fn select_staff(&mut self, id: StaffId) -> FetchRequest {
        self.staff_id = Some(id);
        self.begin_fetch(id)
    }

    /// Change the window. Starts a new fetch if a staff member is selected.
    pub fn select_window(&mut self, window: TimeWindow) -> Option<FetchRequest> {
        self.window = window;
        let id = self.staff_id?;
        Some(self.begin_fetch(id))
    }

    /// Drop the selection. Any in-flight response becomes stale.
    pub fn clear_selection(&mut self) {
        self.staff_id = None;
        self.outstanding = None;
        self.state = HistoryState::Idle;
    }

    /// Apply the result of a fetch.
    pub fn resolve<E: std::fmt::Display>(
        &mut self,
        ticket: FetchTicket,
        result: Result<Vec<MetricPoint>, E>,
    ) -> Resolution {
        if self.outstanding != Some(ticket) {
            debug!(
                generation = ticket.generation,
                current = ?self.outstanding.map(|t| t.generation),
                "Discarding stale history response"
            );
            return Resolution::Stale;
        }

        self.outstanding = None;
        self.state = match result {
            Ok(points) => {
                debug!(points = points.len(), "History loaded");
                HistoryState::Ready(points)
            }
            Err(e) => {
                debug!(error = %e, "History load failed");
                HistoryState::Error(e.to_string())
            }
        };
        Resolution::Committed
    }

    /// Offer a roster update for live-append.
    ///
    /// Appends a point only while `Ready`, for the selected staff member,
    /// when the series already has a baseline and the update's `last_update`
    /// is strictly newer than the last point. Returns whether a point was
    /// appended.
    pub fn observe(&mut self, record: &StaffRecord) -> bool {
        if self.staff_id != Some(record.id) {
            return false;
        }
        let HistoryState::Ready(points) = &mut self.state else {
            return false;
        };
        let Some(last_ts) = points.last().map(|p| p.timestamp) else {
            return false;
        };
        match MetricPoint::from_record(record) {
            Some(point) if point.timestamp > last_ts => {
                points.push(point);
                true
            }
            _ => false,
        }
    }

    fn begin_fetch(&mut self, staff_id: StaffId) -> FetchRequest {
        self.next_generation += 1;
        let ticket = FetchTicket {
            generation: self.next_generation,
        };
        self.outstanding = Some(ticket);
        self.state = HistoryState::Loading;
        FetchRequest {
            ticket,
            staff_id,
            window: self.window,
        }
    }
}
