//! HTTP client for pulling a complete read-model snapshot from the live feed.

use aegis_core::{
    DisasterZone, EmergencyMessage, EvacuationRoute, ModelError, ResourceAllocation, Snapshot,
    SystemStatus,
};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, info};

pub const ZONES_PATH: &str = "/api/zones";
pub const MESSAGES_PATH: &str = "/api/messages";
pub const ROUTES_PATH: &str = "/api/routes";
pub const ALLOCATIONS_PATH: &str = "/api/allocations";
pub const STATUS_PATH: &str = "/api/status";

#[derive(Error, Debug)]
pub enum FeedError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status} for {path}: {body}")]
    Server {
        path: &'static str,
        status: u16,
        body: String,
    },
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid record {id}: {source}")]
    Invalid {
        id: String,
        #[source]
        source: ModelError,
    },
}

/// HTTP client for the live feed's read endpoints.
pub struct FeedClient {
    client: reqwest::Client,
    base_url: String,
}

impl FeedClient {
    /// Create a client for the given feed base URL.
    ///
    /// `base_url` should be like `http://localhost:8080` (a trailing slash is dropped).
    pub fn new(base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch all five collections and return them only if every request succeeds.
    ///
    /// Requests run concurrently. Any failed request, unparsable body, or
    /// record that breaks an invariant at `now` fails the whole fetch, so a
    /// caller never holds a partially populated snapshot.
    pub async fn fetch_snapshot(&self, now: DateTime<Utc>) -> Result<Snapshot, FeedError> {
        info!(base_url = %self.base_url, "fetching snapshot from feed");

        let (zones, messages, routes, allocations, status) = futures::try_join!(
            self.get_json::<Vec<DisasterZone>>(ZONES_PATH),
            self.get_json::<Vec<EmergencyMessage>>(MESSAGES_PATH),
            self.get_json::<Vec<EvacuationRoute>>(ROUTES_PATH),
            self.get_json::<Vec<ResourceAllocation>>(ALLOCATIONS_PATH),
            self.get_json::<SystemStatus>(STATUS_PATH),
        )?;

        let snapshot = Snapshot {
            zones,
            messages,
            routes,
            allocations,
            status,
        };
        snapshot
            .validate(now)
            .map_err(|(id, source)| FeedError::Invalid { id, source })?;

        info!(
            zones = snapshot.zones.len(),
            messages = snapshot.messages.len(),
            routes = snapshot.routes.len(),
            allocations = snapshot.allocations.len(),
            "fetched snapshot"
        );
        Ok(snapshot)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &'static str) -> Result<T, FeedError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "GET");

        let resp = self.client.get(&url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(FeedError::Server {
                path,
                status: status.as_u16(),
                body,
            });
        }

        let bytes = resp.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aegis_core::{DataSource, MockSource};
    use chrono::TimeZone;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, 12, 0, 0).unwrap()
    }

    type Routes = HashMap<&'static str, (u16, String)>;

    fn mock_routes() -> Routes {
        let mock = MockSource::new(now());
        let ok = |body: String| (200, body);
        HashMap::from([
            (ZONES_PATH, ok(serde_json::to_string(&mock.list_disaster_zones()).unwrap())),
            (MESSAGES_PATH, ok(serde_json::to_string(&mock.list_messages()).unwrap())),
            (ROUTES_PATH, ok(serde_json::to_string(&mock.list_routes()).unwrap())),
            (ALLOCATIONS_PATH, ok(serde_json::to_string(&mock.list_allocations()).unwrap())),
            (STATUS_PATH, ok(serde_json::to_string(&mock.get_system_status()).unwrap())),
        ])
    }

    /// Serve canned responses on a loopback port, one connection per request.
    async fn serve(routes: Routes) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let routes = Arc::new(routes);

        tokio::spawn(async move {
            while let Ok((mut sock, _)) = listener.accept().await {
                let routes = Arc::clone(&routes);
                tokio::spawn(async move {
                    let mut buf = vec![0u8; 8192];
                    let n = sock.read(&mut buf).await.unwrap_or(0);
                    let req = String::from_utf8_lossy(&buf[..n]);
                    let path = req.split_whitespace().nth(1).unwrap_or("/");
                    let (status, body) = routes
                        .get(path)
                        .cloned()
                        .unwrap_or((404, "not found".to_string()));
                    let resp = format!(
                        "HTTP/1.1 {status} Canned\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                        body.len()
                    );
                    let _ = sock.write_all(resp.as_bytes()).await;
                    let _ = sock.shutdown().await;
                });
            }
        });

        format!("http://{addr}/")
    }

    #[test]
    fn feed_client_trims_trailing_slash() {
        let client = FeedClient::new("http://localhost:8080/".into());
        assert_eq!(client.base_url(), "http://localhost:8080");
    }

    #[test]
    fn allocation_payload_parses() {
        let json = r#"[{
            "id": "1",
            "region": "Zone Alpha",
            "type": "medical",
            "quantity": 150,
            "priority": 1,
            "estimatedNeed": 200,
            "currentAllocation": 75,
            "coordinates": [40.7629, -73.9791]
        }]"#;
        let parsed: Vec<ResourceAllocation> = serde_json::from_str(json).unwrap();
        assert_eq!(parsed[0].estimated_need, 200);
        assert_eq!(parsed[0].coordinates.lat, 40.7629);
    }

    #[test]
    fn negative_need_is_a_parse_error() {
        let json = r#"{"id":"1","region":"r","type":"rescue","quantity":1,"priority":1,
            "estimatedNeed":-5,"currentAllocation":0,"coordinates":[0,0]}"#;
        assert!(serde_json::from_str::<ResourceAllocation>(json).is_err());
    }

    #[tokio::test]
    async fn fetches_complete_snapshot() {
        let base = serve(mock_routes()).await;
        let client = FeedClient::new(base);

        let snap = client.fetch_snapshot(now()).await.unwrap();
        assert_eq!(snap, Snapshot::capture(&MockSource::new(now())));
    }

    #[tokio::test]
    async fn one_failed_endpoint_fails_the_fetch() {
        let mut routes = mock_routes();
        routes.insert(ALLOCATIONS_PATH, (503, "warming up".into()));
        let client = FeedClient::new(serve(routes).await);

        match client.fetch_snapshot(now()).await {
            Err(FeedError::Server { path, status, body }) => {
                assert_eq!(path, ALLOCATIONS_PATH);
                assert_eq!(status, 503);
                assert_eq!(body, "warming up");
            }
            other => panic!("expected server error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn invalid_record_fails_the_fetch() {
        let mut routes = mock_routes();
        let mut zones = MockSource::new(now()).list_disaster_zones();
        zones[1].polygon.truncate(2);
        routes.insert(ZONES_PATH, (200, serde_json::to_string(&zones).unwrap()));
        let client = FeedClient::new(serve(routes).await);

        match client.fetch_snapshot(now()).await {
            Err(FeedError::Invalid { id, source }) => {
                assert_eq!(id, "2");
                assert_eq!(source, ModelError::DegeneratePolygon { points: 2 });
            }
            other => panic!("expected invalid record, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_body_is_a_json_error() {
        let mut routes = mock_routes();
        routes.insert(STATUS_PATH, (200, "{\"cvModel\":".into()));
        let client = FeedClient::new(serve(routes).await);

        let err = client.fetch_snapshot(now()).await.unwrap_err();
        assert!(matches!(err, FeedError::Json(_)), "got {err:?}");
    }
}
