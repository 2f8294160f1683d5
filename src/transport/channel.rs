//! In-memory transport.
//!
//! Requests go out through one channel and events come back through
//! another, so a test or an embedding application can play the provider.

use tokio::sync::{mpsc, watch};

use super::{ConnectionStatus, Transport, TransportEvent};
use crate::data::FetchRequest;

/// A request issued by the dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportRequest {
    Roster,
    History(FetchRequest),
}

/// The provider's side of a [`ChannelTransport`].
#[derive(Debug)]
pub struct TransportHandle {
    pub requests: mpsc::UnboundedReceiver<TransportRequest>,
    pub events: mpsc::UnboundedSender<TransportEvent>,
    pub status: watch::Sender<ConnectionStatus>,
}

impl TransportHandle {
    /// Drain every request issued so far.
    pub fn take_requests(&mut self) -> Vec<TransportRequest> {
        let mut out = Vec::new();
        while let Ok(request) = self.requests.try_recv() {
            out.push(request);
        }
        out
    }

    /// Deliver an event to the dashboard. Returns false if it has gone away.
    pub fn send(&self, event: TransportEvent) -> bool {
        self.events.send(event).is_ok()
    }
}

/// Transport driven entirely through channels.
///
/// # Example
///
/// ```
/// use wellwatch::{ChannelTransport, Transport, TransportEvent, TransportRequest};
///
/// let (mut handle, mut transport) = ChannelTransport::create("memory");
/// transport.request_roster();
/// assert_eq!(handle.take_requests(), vec![TransportRequest::Roster]);
///
/// handle.send(TransportEvent::Roster(Ok(vec![])));
/// assert!(matches!(transport.poll(), Some(TransportEvent::Roster(Ok(_)))));
/// ```
#[derive(Debug)]
pub struct ChannelTransport {
    requests: mpsc::UnboundedSender<TransportRequest>,
    events: mpsc::UnboundedReceiver<TransportEvent>,
    status: watch::Receiver<ConnectionStatus>,
    description: String,
}

impl ChannelTransport {
    /// Create a connected (handle, transport) pair.
    pub fn create(source_description: &str) -> (TransportHandle, Self) {
        let (req_tx, req_rx) = mpsc::unbounded_channel();
        let (ev_tx, ev_rx) = mpsc::unbounded_channel();
        let (status_tx, status_rx) = watch::channel(ConnectionStatus::Connected);

        let handle = TransportHandle {
            requests: req_rx,
            events: ev_tx,
            status: status_tx,
        };
        let transport = Self {
            requests: req_tx,
            events: ev_rx,
            status: status_rx,
            description: format!("channel: {}", source_description),
        };
        (handle, transport)
    }
}

impl Transport for ChannelTransport {
    fn request_roster(&mut self) {
        let _ = self.requests.send(TransportRequest::Roster);
    }

    fn request_history(&mut self, request: FetchRequest) {
        let _ = self.requests.send(TransportRequest::History(request));
    }

    fn poll(&mut self) -> Option<TransportEvent> {
        self.events.try_recv().ok()
    }

    fn status(&self) -> ConnectionStatus {
        *self.status.borrow()
    }

    fn description(&self) -> &str {
        &self.description
    }
}
