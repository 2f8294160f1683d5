//! Push stream: every staff update as one JSON line over TCP.
//!
//! Each connected client gets its own task fed from a broadcast channel.
//! A client that falls too far behind skips the missed updates and keeps
//! receiving; nothing is replayed on connect.

use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};
use wellwatch_types::StaffRecord;

/// Updates buffered per client before it starts lagging.
pub const UPDATE_BUFFER: usize = 256;

/// Accept push clients on `listener` until `stop` flips to true.
pub async fn serve(
    listener: TcpListener,
    updates: broadcast::Sender<StaffRecord>,
    mut stop: watch::Receiver<bool>,
) {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "Push stream listening");
    }

    loop {
        let (stream, peer) = tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok(conn) => conn,
                Err(e) => {
                    warn!(error = %e, "Failed to accept push connection");
                    continue;
                }
            },
            _ = stop.changed() => break,
        };

        info!(%peer, "Push client connected");
        let rx = updates.subscribe();
        let stop = stop.clone();
        tokio::spawn(async move {
            let sent = stream_updates(stream, rx, stop).await;
            info!(%peer, sent, "Push client disconnected");
        });
    }

    info!("Push stream stopped");
}

/// Forward updates to one client. Returns the number of lines written.
async fn stream_updates(
    mut stream: TcpStream,
    mut updates: broadcast::Receiver<StaffRecord>,
    mut stop: watch::Receiver<bool>,
) -> usize {
    let mut sent = 0;
    loop {
        let record = tokio::select! {
            received = updates.recv() => match received {
                Ok(record) => record,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Push client lagging, skipping updates");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            _ = stop.changed() => break,
        };

        let mut line = match serde_json::to_vec(&record) {
            Ok(line) => line,
            Err(e) => {
                warn!(staff_id = record.id, error = %e, "Failed to encode update");
                continue;
            }
        };
        line.push(b'\n');

        if let Err(e) = stream.write_all(&line).await {
            debug!(error = %e, "Push write failed");
            break;
        }
        sent += 1;
    }
    sent
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::io::{AsyncBufReadExt, BufReader};
    use tokio::time::timeout;
    use wellwatch_types::StressLevel;

    async fn wait_for_subscriber(updates: &broadcast::Sender<StaffRecord>) {
        timeout(Duration::from_secs(5), async {
            while updates.receiver_count() == 0 {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn clients_receive_json_lines() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (updates, _) = broadcast::channel(UPDATE_BUFFER);
        let (stop_tx, stop_rx) = watch::channel(false);
        let server = tokio::spawn(serve(listener, updates.clone(), stop_rx));

        let stream = TcpStream::connect(addr).await.unwrap();
        wait_for_subscriber(&updates).await;

        updates
            .send(StaffRecord::new(1, "Alice", "Doctor").with_stress_level(StressLevel::High))
            .unwrap();
        updates.send(StaffRecord::new(2, "Bob", "Nurse")).unwrap();

        let mut lines = BufReader::new(stream).lines();
        let first = timeout(Duration::from_secs(5), lines.next_line())
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        let record: StaffRecord = serde_json::from_str(&first).unwrap();
        assert_eq!(record.id, 1);
        assert_eq!(record.stress_level, StressLevel::High);

        let second = timeout(Duration::from_secs(5), lines.next_line())
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        assert!(second.contains("\"Bob\""));

        stop_tx.send(true).unwrap();
        server.await.unwrap();
    }

    #[tokio::test]
    async fn stop_closes_client_streams() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (updates, _) = broadcast::channel(UPDATE_BUFFER);
        let (stop_tx, stop_rx) = watch::channel(false);
        let server = tokio::spawn(serve(listener, updates.clone(), stop_rx));

        let stream = TcpStream::connect(addr).await.unwrap();
        wait_for_subscriber(&updates).await;
        stop_tx.send(true).unwrap();
        server.await.unwrap();

        let mut lines = BufReader::new(stream).lines();
        let end = timeout(Duration::from_secs(5), lines.next_line()).await.unwrap();
        assert!(matches!(end, Ok(None)));
    }
}
