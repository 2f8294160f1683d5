//! Dashboard against a live simulated provider on loopback ports.

use std::time::Duration;

use chrono::Utc;
use tokio::runtime::Handle;
use wellwatch::data::HistoryState;
use wellwatch::transport::Backoff;
use wellwatch::{ApiClient, App, ConnectionStatus, FetchError, HttpTransport, RosterStatus};
use wellwatch_sim::{Provider, RunningProvider, SimConfig};
use wellwatch_types::{StressLevel, TimeWindow};

const WAIT: Duration = Duration::from_secs(10);

async fn start_provider() -> RunningProvider {
    let cfg = SimConfig {
        http_addr: "127.0.0.1:0".to_string(),
        push_addr: "127.0.0.1:0".to_string(),
        // Only the immediate first tick fires during a test.
        tick_ms: 600_000,
        seed: Some(11),
        ..SimConfig::default()
    };
    let provider = Provider::new(cfg).start().await.unwrap();

    tokio::time::timeout(WAIT, async {
        while provider.store().history(1, None, false, Utc::now()) == Some(vec![]) {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();
    provider
}

fn client(provider: &RunningProvider) -> ApiClient {
    ApiClient::new(provider.base_url(), Duration::from_secs(5)).unwrap()
}

async fn connected_app(provider: &RunningProvider) -> App {
    let mut transport = HttpTransport::new(client(provider), Handle::current());
    transport.connect_push(
        &provider.push_addr().to_string(),
        Backoff::new(Duration::from_millis(50), Duration::from_millis(500)),
    );
    let mut app = App::new(Box::new(transport));

    pump_until(&mut app, |app| {
        *app.roster.status() == RosterStatus::Ready
            && app.connection_status() == ConnectionStatus::Connected
    })
    .await;

    tokio::time::timeout(WAIT, async {
        while provider.push_clients() == 0 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();
    app
}

async fn pump_until(app: &mut App, done: impl Fn(&App) -> bool) {
    tokio::time::timeout(WAIT, async {
        loop {
            app.pump();
            if done(&*app) {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn api_client_reads_roster_and_history() {
    let provider = start_provider().await;
    let api = client(&provider);

    let roster = api.fetch_roster().await.unwrap();
    assert_eq!(roster.len(), 4);
    assert!(roster.iter().all(|r| r.last_update.is_some()));

    let history = api.fetch_history(1, TimeWindow::FiveMinutes).await.unwrap();
    assert_eq!(history.len(), 1);
    assert!(history[0].heart_rate.is_some());

    let all = api.fetch_history(2, TimeWindow::All).await.unwrap();
    assert_eq!(all.len(), 1);

    assert_eq!(
        api.fetch_history(99, TimeWindow::OneHour).await,
        Err(FetchError::NotFound)
    );

    provider.shutdown().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn push_updates_reach_the_roster() {
    let provider = start_provider().await;
    let mut app = connected_app(&provider).await;
    assert_eq!(app.visible_staff().len(), 4);

    let mut record = provider.store().staff(4).unwrap();
    record.stress_level = StressLevel::Critical;
    record.current_heart_rate = Some(130);
    record.last_update = Some(Utc::now());
    provider.publish(record);

    pump_until(&mut app, |app| {
        app.roster
            .get(4)
            .is_some_and(|r| r.stress_level == StressLevel::Critical)
    })
    .await;

    // Default sort puts critical staff first.
    assert_eq!(app.visible_staff()[0].id, 4);
    assert_eq!(app.stress_counts().critical, 1);

    provider.shutdown().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn open_chart_extends_from_push() {
    let provider = start_provider().await;
    let mut app = connected_app(&provider).await;

    app.select_first();
    let id = app.selected_record().unwrap().id;
    app.enter_detail();

    pump_until(&mut app, |app| matches!(app.history.state(), HistoryState::Ready(_))).await;
    let before = app.history.points().len();
    assert_eq!(before, 1);

    let mut record = provider.store().staff(id).unwrap();
    record.current_heart_rate = Some(88);
    record.last_update = Some(Utc::now() + chrono::Duration::seconds(1));
    provider.publish(record);

    pump_until(&mut app, |app| app.history.points().len() == before + 1).await;
    assert_eq!(app.history.points()[before].heart_rate, Some(88));

    provider.shutdown().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn unreachable_provider_marks_roster_unavailable() {
    let api = ApiClient::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
    let transport = HttpTransport::new(api, Handle::current());
    let mut app = App::new(Box::new(transport));

    pump_until(&mut app, |app| {
        matches!(app.roster.status(), RosterStatus::Unavailable(_))
    })
    .await;
    assert!(app.visible_staff().is_empty());
    assert_eq!(app.connection_status(), ConnectionStatus::Disconnected);
}
