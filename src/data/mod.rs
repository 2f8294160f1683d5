//! Roster and history state for the dashboard.
//!
//! Everything in this module is plain, synchronous state owned by the
//! event loop. Async I/O lives in [`crate::transport`]; its results are
//! handed to these types one at a time.
//!
//! ## Submodules
//!
//! - [`roster`]: [`RosterStore`], the authoritative snapshot of every staff member
//! - [`projection`]: pure filter/sort of the roster for display
//! - [`history`]: [`HistoryReconciler`], fetch + live-append for the selected staff member
//! - [`chart`]: plot coordinates and axis labels for a history series
//!
//! ## Data Flow
//!
//! ```text
//! initial fetch ──▶ RosterStore::initialize
//! push update ────▶ RosterStore::apply_update ──▶ HistoryReconciler::observe
//!                          │
//!                          ▼
//!                  projection::project ──▶ roster table
//!
//! selection ─────▶ HistoryReconciler::select_* ──▶ FetchRequest ──▶ transport
//! fetch result ──▶ HistoryReconciler::resolve (stale responses dropped)
//!                          │
//!                          ▼
//!                  ChartSeries::build ──▶ detail chart
//! ```

pub mod chart;
pub mod history;
pub mod projection;
pub mod roster;

pub use chart::{ChartMetric, ChartSeries};
pub use history::{FetchRequest, FetchTicket, HistoryReconciler, HistoryState, Resolution};
pub use projection::{available_roles, project, RoleFilter, SortDirection, SortKey, SortState};
pub use roster::{RosterStatus, RosterStore};
