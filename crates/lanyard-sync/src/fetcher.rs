//! HTTP implementation of [`PresenceFetcher`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use lanyard_core::config::api::ApiConfig;
use lanyard_core::error::{AppError, ErrorKind, FetchError, FetchFailure, RequestDescriptor};
use lanyard_core::traits::PresenceFetcher;
use lanyard_core::types::{ApiResponse, Presence, Snowflake};

/// Fetches presences from `GET /v1/users/{id}`.
#[derive(Debug, Clone)]
pub struct HttpPresenceFetcher {
    client: reqwest::Client,
}

impl HttpPresenceFetcher {
    /// Builds a fetcher with its own connection pool.
    pub fn new() -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("lanyard-presence/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                AppError::with_source(ErrorKind::Internal, "Failed to build HTTP client", e)
            })?;
        Ok(Self { client })
    }

    /// Wraps an existing client, sharing its pool.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PresenceFetcher for HttpPresenceFetcher {
    async fn fetch(
        &self,
        id: &Snowflake,
        api: &ApiConfig,
        cancel: &CancellationToken,
    ) -> Result<Presence, FetchFailure> {
        let url = api.rest_url(id);
        debug!(url = %url, "Fetching presence");

        let request = self
            .client
            .get(&url)
            .header(ACCEPT, "application/json")
            .timeout(Duration::from_secs(api.request_timeout_seconds));

        let exchange = async {
            let response = request
                .send()
                .await
                .map_err(|e| FetchFailure::transport(format!("GET {url} failed: {e}"), e))?;
            let status = response.status().as_u16();
            let body = response.bytes().await.map_err(|e| {
                FetchFailure::transport(format!("Reading body of GET {url} failed: {e}"), e)
            })?;
            Ok::<_, FetchFailure>((status, body))
        };

        // Dropping the exchange future aborts the in-flight request.
        let (status, body) = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(FetchFailure::Cancelled),
            result = exchange => result?,
        };

        match ApiResponse::<Presence>::from_slice(&body) {
            Ok(ApiResponse::Success(presence)) => Ok(presence),
            Ok(ApiResponse::Errored(body)) => Err(FetchFailure::Server(FetchError {
                request: RequestDescriptor {
                    method: "GET".to_string(),
                    url,
                },
                code: status,
                body,
            })),
            Err(source) => {
                warn!(url = %url, status, error = %source, "Malformed API response");
                Err(FetchFailure::Malformed { status, source })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::testing::key;

    fn api_for(server: &MockServer) -> ApiConfig {
        ApiConfig {
            hostname: server.address().to_string(),
            secure: false,
            request_timeout_seconds: 5,
        }
    }

    fn presence_body(id: &str) -> serde_json::Value {
        json!({
            "success": true,
            "data": {
                "discord_user": {"id": id, "username": "phineas"},
                "discord_status": "online",
                "activities": [],
                "kv": {}
            }
        })
    }

    #[tokio::test]
    async fn test_fetch_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/users/94490510688792576"))
            .and(header("accept", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(presence_body("94490510688792576")))
            .expect(1)
            .mount(&server)
            .await;

        let fetcher = HttpPresenceFetcher::new().unwrap();
        let presence = fetcher
            .fetch(&key("94490510688792576"), &api_for(&server), &CancellationToken::new())
            .await
            .expect("fetch should succeed");

        assert_eq!(presence.user_id().as_str(), "94490510688792576");
        assert!(presence.is_online());
    }

    #[tokio::test]
    async fn test_fetch_not_found_is_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/users/1"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "success": false,
                "error": {"message": "User not found", "code": "user_not_found"}
            })))
            .mount(&server)
            .await;

        let api = api_for(&server);
        let err = HttpPresenceFetcher::new()
            .unwrap()
            .fetch(&key("1"), &api, &CancellationToken::new())
            .await
            .unwrap_err();

        match err {
            FetchFailure::Server(e) => {
                assert_eq!(e.code, 404);
                assert_eq!(e.server_code(), "user_not_found");
                assert_eq!(e.message(), "User not found");
                assert_eq!(e.request.method, "GET");
                assert_eq!(e.request.url, api.rest_url(&key("1")));
            }
            other => panic!("expected server error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502).set_body_string("<html>bad gateway</html>"))
            .mount(&server)
            .await;

        let err = HttpPresenceFetcher::new()
            .unwrap()
            .fetch(&key("1"), &api_for(&server), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, FetchFailure::Malformed { status: 502, .. }));
    }

    #[tokio::test]
    async fn test_fetch_cancelled_mid_flight() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(presence_body("1"))
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            trigger.cancel();
        });

        let started = std::time::Instant::now();
        let err = HttpPresenceFetcher::new()
            .unwrap()
            .fetch(&key("1"), &api_for(&server), &cancel)
            .await
            .unwrap_err();

        assert!(err.is_cancelled());
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_fetch_unreachable_host_is_transport_failure() {
        let api = ApiConfig {
            hostname: "127.0.0.1:1".to_string(),
            secure: false,
            request_timeout_seconds: 2,
        };
        let err = HttpPresenceFetcher::new()
            .unwrap()
            .fetch(&key("1"), &api, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, FetchFailure::Transport { .. }));
    }
}
