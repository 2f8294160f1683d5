//! # wellwatch
//!
//! A terminal dashboard and library for watching live staff wellness metrics.
//!
//! The dashboard keeps a roster of staff records current from a push stream,
//! lets the user filter and sort it, and charts one staff member's history
//! over a selectable time window. History is fetched once per selection and
//! then extended from the same push stream.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         Application                          │
//! │  ┌─────────┐    ┌──────────┐    ┌─────────┐    ┌──────────┐  │
//! │  │  app    │───▶│   data   │───▶│   ui    │───▶│ Terminal │  │
//! │  │ (state) │    │ (roster, │    │(render) │    │          │  │
//! │  └────┬────┘    │ history) │    └─────────┘    └──────────┘  │
//! │       │         └──────────┘                                 │
//! │       ▼                                                      │
//! │  ┌───────────┐                                               │
//! │  │ transport │◀── HttpTransport (REST + push) | ChannelTransport
//! │  └───────────┘                                               │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`app`]**: Application state, selection and key-driven actions
//! - **[`data`]**: [`RosterStore`], the roster [`project`]ion, the
//!   [`HistoryReconciler`] and chart formatting
//! - **[`transport`]**: the [`Transport`] trait with a live REST/push
//!   implementation and an in-memory one
//! - **[`ui`]**: ratatui rendering and themes
//! - **[`config`]**: layered configuration
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Against a local provider on the default ports
//! wellwatch
//!
//! # Another provider, starting on the 1h window sorted by wellness index
//! wellwatch --server http://10.0.0.5:5001 --push 10.0.0.5:5002 --window 1h --sort mwi
//! ```
//!
//! ### As a library with the in-memory transport
//!
//! ```
//! use wellwatch::{App, ChannelTransport, TransportEvent};
//! use wellwatch_types::{StaffRecord, StressLevel};
//!
//! let (handle, transport) = ChannelTransport::create("embedded");
//! let mut app = App::new(Box::new(transport));
//!
//! handle.send(TransportEvent::Roster(Ok(vec![
//!     StaffRecord::new(1, "Alice", "Doctor"),
//!     StaffRecord::new(2, "Bob", "Nurse").with_stress_level(StressLevel::Critical),
//! ])));
//! app.pump();
//!
//! assert_eq!(app.visible_staff()[0].name, "Bob");
//! ```
//!
//! ### Using the core types directly
//!
//! ```
//! use wellwatch::{project, RoleFilter, RosterStore, SortKey, SortState};
//! use wellwatch_types::StaffRecord;
//!
//! let mut store = RosterStore::new();
//! store.initialize(vec![
//!     StaffRecord::new(1, "Carol", "Nurse").with_mwi(40.0),
//!     StaffRecord::new(2, "Dave", "Nurse").with_mwi(75.0),
//! ]);
//!
//! let rows = project(store.snapshot(), &RoleFilter::All, SortState::new(SortKey::Mwi));
//! assert_eq!(rows[0].name, "Dave");
//! ```

pub mod app;
pub mod config;
pub mod data;
pub mod events;
pub mod transport;
pub mod ui;

// Re-export main types for convenience
pub use app::{App, StressCounts};
pub use data::{
    project, ChartMetric, FetchRequest, FetchTicket, HistoryReconciler, HistoryState,
    Resolution, RoleFilter, RosterStatus, RosterStore, SortDirection, SortKey, SortState,
};
pub use transport::{
    ApiClient, ChannelTransport, ConnectionStatus, FetchError, HttpTransport, Transport,
    TransportEvent, TransportHandle, TransportRequest,
};
