//! REST API for the roster and per-staff history.
//!
//! | Method | Path                       | Response                         |
//! |--------|----------------------------|----------------------------------|
//! | GET    | `/api/staff`               | array of staff records           |
//! | GET    | `/api/staff/{id}/data`     | array of points, oldest first    |
//! | GET    | `/health`                  | `OK`                             |
//!
//! The history endpoint accepts `minutes` (lookback, omitted for all of it)
//! and `sample` (`true` to thin long series). Unknown staff get a 404 with
//! `{"error": "Staff member not found"}`.

use std::convert::Infallible;

use chrono::Utc;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HeaderValue, ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_TYPE};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode, Uri};
use hyper_util::rt::TokioIo;
use serde::Serialize;
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{debug, info, warn};
use wellwatch_types::{StaffId, Timestamp};

use crate::store::SimStore;

/// Accept connections on `listener` until `stop` flips to true.
pub async fn serve(listener: TcpListener, store: SimStore, mut stop: watch::Receiver<bool>) {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "REST API listening");
    }

    loop {
        let (stream, peer) = tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok(conn) => conn,
                Err(e) => {
                    warn!(error = %e, "Failed to accept REST connection");
                    continue;
                }
            },
            _ = stop.changed() => break,
        };

        debug!(%peer, "REST connection accepted");
        let io = TokioIo::new(stream);
        let store = store.clone();

        tokio::spawn(async move {
            let service = service_fn(move |req: Request<hyper::body::Incoming>| {
                let store = store.clone();
                async move { Ok::<_, Infallible>(route(req.method(), req.uri(), &store, Utc::now())) }
            });

            if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                debug!(%peer, error = %e, "REST connection closed with error");
            }
        });
    }

    info!("REST API stopped");
}

/// Resolve one request against the store.
pub fn route(method: &Method, uri: &Uri, store: &SimStore, now: Timestamp) -> Response<Full<Bytes>> {
    if method != Method::GET {
        return error_response(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed");
    }

    let segments: Vec<&str> = uri.path().trim_matches('/').split('/').collect();
    match segments.as_slice() {
        ["health"] | ["healthz"] => text_response(StatusCode::OK, "OK"),
        ["api", "staff"] => json_response(StatusCode::OK, &store.roster()),
        ["api", "staff", id, "data"] => staff_history(id, uri.query(), store, now),
        _ => error_response(StatusCode::NOT_FOUND, "Not found"),
    }
}

fn staff_history(id: &str, query: Option<&str>, store: &SimStore, now: Timestamp) -> Response<Full<Bytes>> {
    let Ok(id) = id.parse::<StaffId>() else {
        return error_response(StatusCode::NOT_FOUND, "Not found");
    };
    let params = match HistoryParams::parse(query) {
        Ok(params) => params,
        Err(message) => return error_response(StatusCode::BAD_REQUEST, &message),
    };

    match store.history(id, params.minutes, params.sample, now) {
        Some(points) => {
            debug!(staff_id = id, points = points.len(), "Serving history");
            json_response(StatusCode::OK, &points)
        }
        None => error_response(StatusCode::NOT_FOUND, "Staff member not found"),
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
struct HistoryParams {
    minutes: Option<u32>,
    sample: bool,
}

impl HistoryParams {
    fn parse(query: Option<&str>) -> Result<Self, String> {
        let mut params = Self::default();
        for pair in query.unwrap_or_default().split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            match key {
                "minutes" => {
                    let minutes = value
                        .parse()
                        .map_err(|_| format!("Invalid minutes: {value}"))?;
                    params.minutes = Some(minutes);
                }
                "sample" => params.sample = matches!(value, "true" | "1"),
                _ => {}
            }
        }
        Ok(params)
    }
}

fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<Full<Bytes>> {
    match serde_json::to_string(body) {
        Ok(json) => response(status, "application/json", json),
        Err(e) => {
            warn!(error = %e, "Failed to serialize response");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Serialization failed")
        }
    }
}

fn error_response(status: StatusCode, message: &str) -> Response<Full<Bytes>> {
    response(status, "application/json", json!({ "error": message }).to_string())
}

fn text_response(status: StatusCode, body: &'static str) -> Response<Full<Bytes>> {
    response(status, "text/plain", body.to_string())
}

fn response(status: StatusCode, content_type: &'static str, body: String) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from(body)));
    *response.status_mut() = status;
    let headers = response.headers_mut();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use http_body_util::BodyExt;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use wellwatch_types::{MetricPoint, StaffRecord};

    fn t0() -> Timestamp {
        Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap()
    }

    fn store() -> SimStore {
        let store = SimStore::default();
        store.seed(vec![
            StaffRecord::new(1, "Dr. Alice Green", "Doctor"),
            StaffRecord::new(2, "Bob White", "Nurse"),
        ]);
        for m in 0..30 {
            let at = t0() + Duration::minutes(m);
            store.record(
                StaffRecord::new(1, "Dr. Alice Green", "Doctor").with_last_update(at),
                MetricPoint {
                    heart_rate: Some(70),
                    ..MetricPoint::empty(at)
                },
            );
        }
        store
    }

    fn get(path: &str, store: &SimStore) -> Response<Full<Bytes>> {
        let uri: Uri = path.parse().unwrap();
        route(&Method::GET, &uri, store, t0() + Duration::minutes(30))
    }

    async fn body_json(response: Response<Full<Bytes>>) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn roster_endpoint_lists_staff() {
        let response = get("/api/staff", &store());
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], "*");

        let body = body_json(response).await;
        let staff = body.as_array().unwrap();
        assert_eq!(staff.len(), 2);
        assert_eq!(staff[1]["name"], "Bob White");
    }

    #[tokio::test]
    async fn history_endpoint_applies_minutes() {
        let response = get("/api/staff/1/data?minutes=10&sample=false", &store());
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        // Minutes 20..=29 fall inside the 10 minute lookback.
        assert_eq!(body.as_array().unwrap().len(), 10);
    }

    #[tokio::test]
    async fn history_without_minutes_returns_everything() {
        let body = body_json(get("/api/staff/1/data", &store())).await;
        assert_eq!(body.as_array().unwrap().len(), 30);
    }

    #[tokio::test]
    async fn known_staff_without_history_is_empty() {
        let response = get("/api/staff/2/data?minutes=5", &store());
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!([]));
    }

    #[tokio::test]
    async fn unknown_staff_is_not_found() {
        let response = get("/api/staff/99/data", &store());
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            body_json(response).await,
            json!({ "error": "Staff member not found" })
        );
    }

    #[test]
    fn bad_minutes_is_rejected() {
        let response = get("/api/staff/1/data?minutes=soon", &store());
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn other_routes() {
        let store = store();
        assert_eq!(get("/health", &store).status(), StatusCode::OK);
        assert_eq!(get("/api/nope", &store).status(), StatusCode::NOT_FOUND);
        assert_eq!(get("/api/staff/abc/data", &store).status(), StatusCode::NOT_FOUND);

        let uri: Uri = "/api/staff".parse().unwrap();
        let response = route(&Method::POST, &uri, &store, t0());
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[test]
    fn history_params() {
        assert_eq!(HistoryParams::parse(None), Ok(HistoryParams::default()));
        assert_eq!(
            HistoryParams::parse(Some("minutes=60&sample=true&x=1")),
            Ok(HistoryParams {
                minutes: Some(60),
                sample: true
            })
        );
        assert!(HistoryParams::parse(Some("minutes=-1")).is_err());
    }

    #[tokio::test]
    async fn serves_over_tcp() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (stop_tx, stop_rx) = watch::channel(false);
        let server = tokio::spawn(serve(listener, store(), stop_rx));

        let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(b"GET /health HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
            .await
            .unwrap();
        let mut raw = String::new();
        stream.read_to_string(&mut raw).await.unwrap();
        assert!(raw.starts_with("HTTP/1.1 200 OK"));
        assert!(raw.ends_with("OK"));

        stop_tx.send(true).unwrap();
        server.await.unwrap();
    }
}
