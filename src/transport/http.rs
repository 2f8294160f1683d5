//! Live transport: REST fetches plus the TCP push stream.

use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::debug;

use super::{ApiClient, Backoff, ConnectionStatus, PushClient, Transport, TransportEvent};
use crate::data::FetchRequest;

/// Transport backed by the provider's REST API and push stream.
///
/// Fetches run as tasks on the given runtime; each completion is queued
/// for the event loop alongside push updates.
#[derive(Debug)]
pub struct HttpTransport {
    api: ApiClient,
    runtime: Handle,
    sender: mpsc::UnboundedSender<TransportEvent>,
    receiver: mpsc::UnboundedReceiver<TransportEvent>,
    push: Option<PushClient>,
    description: String,
}

impl HttpTransport {
    /// Create a transport for `api`. Push updates are not received until
    /// [`HttpTransport::connect_push`] is called.
    pub fn new(api: ApiClient, runtime: Handle) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let description = format!("http: {}", api.base_url());
        Self {
            api,
            runtime,
            sender,
            receiver,
            push: None,
            description,
        }
    }

    /// Open the push stream at `addr` (host:port).
    pub fn connect_push(&mut self, addr: &str, backoff: Backoff) {
        let _guard = self.runtime.enter();
        self.push = Some(PushClient::spawn(addr, backoff, self.sender.clone()));
    }
}

impl Transport for HttpTransport {
    fn request_roster(&mut self) {
        let api = self.api.clone();
        let sender = self.sender.clone();
        self.runtime.spawn(async move {
            let result = api.fetch_roster().await;
            let _ = sender.send(TransportEvent::Roster(result));
        });
    }

    fn request_history(&mut self, request: FetchRequest) {
        debug!(
            staff_id = request.staff_id,
            window = %request.window,
            generation = request.ticket.generation(),
            "Issuing history fetch"
        );
        let api = self.api.clone();
        let sender = self.sender.clone();
        self.runtime.spawn(async move {
            let result = api.fetch_history(request.staff_id, request.window).await;
            let _ = sender.send(TransportEvent::History {
                ticket: request.ticket,
                result,
            });
        });
    }

    fn poll(&mut self) -> Option<TransportEvent> {
        self.receiver.try_recv().ok()
    }

    fn status(&self) -> ConnectionStatus {
        self.push
            .as_ref()
            .map(PushClient::status)
            .unwrap_or(ConnectionStatus::Disconnected)
    }

    fn description(&self) -> &str {
        &self.description
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::transport::FetchError;

    #[tokio::test]
    async fn unreachable_roster_fetch_reports_error() {
        let api = ApiClient::new("http://127.0.0.1:9", Duration::from_millis(500)).unwrap();
        let mut transport = HttpTransport::new(api, Handle::current());
        assert_eq!(transport.description(), "http: http://127.0.0.1:9");
        assert_eq!(transport.status(), ConnectionStatus::Disconnected);

        transport.request_roster();

        let mut event = None;
        for _ in 0..50 {
            tokio::time::sleep(Duration::from_millis(20)).await;
            event = transport.poll();
            if event.is_some() {
                break;
            }
        }
        match event {
            Some(TransportEvent::Roster(Err(e))) => {
                assert!(!matches!(e, FetchError::NotFound));
            }
            other => panic!("unexpected event {:?}", other),
        }
    }
}
