//! Push update stream.
//!
//! The provider pushes one JSON-encoded [`StaffRecord`] per line over a TCP
//! connection. [`PushClient`] keeps that connection alive, reconnecting with
//! exponential backoff, and forwards every parsed record to the event queue.

use std::io;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use wellwatch_types::StaffRecord;

use super::{ConnectionStatus, TransportEvent};

/// Exponential reconnect delay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Backoff {
    initial: Duration,
    max: Duration,
    current: Duration,
}

impl Backoff {
    pub fn new(initial: Duration, max: Duration) -> Self {
        Self {
            initial,
            max,
            current: initial,
        }
    }

    /// Delay before the next attempt. Doubles on every call up to the cap.
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = (self.current * 2).min(self.max);
        delay
    }

    /// Start over after a successful connection.
    pub fn reset(&mut self) {
        self.current = self.initial;
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(Duration::from_millis(500), Duration::from_secs(30))
    }
}

/// Read newline-delimited staff records until EOF.
///
/// Malformed lines are logged and skipped. Returns the number of records
/// forwarded. Stops early if the event queue has been dropped.
///
/// ```
/// use tokio::sync::mpsc;
/// use wellwatch::transport::read_updates;
///
/// # tokio_test::block_on(async {
/// let (tx, mut rx) = mpsc::unbounded_channel();
/// let input = b"{\"id\":1,\"name\":\"Alice\",\"role\":\"Doctor\"}\nnot json\n";
///
/// let forwarded = read_updates(&input[..], &tx).await.unwrap();
/// assert_eq!(forwarded, 1);
/// assert!(rx.try_recv().is_ok());
/// # });
/// ```
pub async fn read_updates<R>(
    reader: R,
    events: &mpsc::UnboundedSender<TransportEvent>,
) -> io::Result<usize>
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut line = Vec::new();
    let mut forwarded = 0;

    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line).await? == 0 {
            return Ok(forwarded);
        }

        let trimmed = line.trim_ascii();
        if trimmed.is_empty() {
            continue;
        }

        // Invalid UTF-8 fails here too and is skipped like any malformed line.
        match serde_json::from_slice::<StaffRecord>(trimmed) {
            Ok(record) => {
                if events.send(TransportEvent::Update(record)).is_err() {
                    return Ok(forwarded);
                }
                forwarded += 1;
            }
            Err(e) => warn!(error = %e, "Skipping malformed push update"),
        }
    }
}

/// Background task holding the push connection open.
#[derive(Debug)]
pub struct PushClient {
    status: watch::Receiver<ConnectionStatus>,
    task: JoinHandle<()>,
}

impl PushClient {
    /// Connect to `addr` and forward updates to `events` until the receiver
    /// is dropped.
    pub fn spawn(
        addr: impl Into<String>,
        backoff: Backoff,
        events: mpsc::UnboundedSender<TransportEvent>,
    ) -> Self {
        let (status_tx, status) = watch::channel(ConnectionStatus::Connecting);
        let task = tokio::spawn(run(addr.into(), backoff, events, status_tx));
        Self { status, task }
    }

    pub fn status(&self) -> ConnectionStatus {
        *self.status.borrow()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<ConnectionStatus> {
        self.status.clone()
    }
}

impl Drop for PushClient {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run(
    addr: String,
    mut backoff: Backoff,
    events: mpsc::UnboundedSender<TransportEvent>,
    status: watch::Sender<ConnectionStatus>,
) {
    loop {
        match TcpStream::connect(&addr).await {
            Ok(stream) => {
                info!(%addr, "Push connection established");
                backoff.reset();
                status.send_replace(ConnectionStatus::Connected);

                match read_updates(stream, &events).await {
                    Ok(count) => info!(%addr, received = count, "Push connection closed"),
                    Err(e) => warn!(%addr, error = %e, "Push connection lost"),
                }
            }
            Err(e) => debug!(%addr, error = %e, "Push connect failed"),
        }

        status.send_replace(ConnectionStatus::Disconnected);
        if events.is_closed() {
            break;
        }

        let delay = backoff.next_delay();
        debug!(?delay, "Reconnecting push stream");
        tokio::time::sleep(delay).await;
    }
}
