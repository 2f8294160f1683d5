//! Transport abstraction between the dashboard and the data provider.
//!
//! The event loop never awaits. It asks a [`Transport`] to start a fetch,
//! then polls for [`TransportEvent`]s on every tick. Push updates from the
//! provider arrive through the same queue, so the loop applies fetch results
//! and updates one at a time in arrival order.

mod api;
mod channel;
mod error;
mod http;
mod push;

pub use api::ApiClient;
pub use channel::{ChannelTransport, TransportHandle, TransportRequest};
pub use error::FetchError;
pub use http::HttpTransport;
pub use push::{read_updates, Backoff, PushClient};

use std::fmt::{self, Debug};

use wellwatch_types::{MetricPoint, StaffRecord};

use crate::data::{FetchRequest, FetchTicket};

/// State of the push connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    #[default]
    Connecting,
    Connected,
    Disconnected,
}

impl ConnectionStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ConnectionStatus::Connecting => "Connecting",
            ConnectionStatus::Connected => "Connected",
            ConnectionStatus::Disconnected => "Disconnected",
        }
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Something the transport has delivered to the event loop.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    /// Result of the initial roster fetch.
    Roster(Result<Vec<StaffRecord>, FetchError>),
    /// Result of a history fetch, tagged with the ticket it was issued under.
    History {
        ticket: FetchTicket,
        result: Result<Vec<MetricPoint>, FetchError>,
    },
    /// A single live update pushed by the provider.
    Update(StaffRecord),
}

/// Trait for talking to the data provider.
///
/// Implementations start I/O in the background and report completions
/// through [`Transport::poll`].
///
/// # Example
///
/// ```
/// use wellwatch::{ChannelTransport, Transport};
///
/// let (_handle, mut transport) = ChannelTransport::create("test");
/// transport.request_roster();
/// assert!(transport.poll().is_none());
/// ```
pub trait Transport: Send + Debug {
    /// Start fetching the full roster.
    fn request_roster(&mut self);

    /// Start fetching history for `request`. The result is reported with
    /// the request's ticket.
    fn request_history(&mut self, request: FetchRequest);

    /// Take the next delivered event, if any. Must not block.
    fn poll(&mut self) -> Option<TransportEvent>;

    /// Current state of the push connection.
    fn status(&self) -> ConnectionStatus;

    /// Human-readable description of the provider, for the status bar.
    fn description(&self) -> &str;
}
