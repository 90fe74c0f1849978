//! HTTP health checks.
//!
//! A server is healthy when `GET <url>/health` answers exactly 200 within
//! the client timeout. Anything else is unhealthy; the error is only logged.

use std::time::Duration;

use async_trait::async_trait;
use mcpdeploy_core::HealthVerifier;
use mcpdeploy_core::ports::health_endpoint;
use reqwest::{Client, StatusCode};
use tracing::debug;

/// Error building the HTTP client.
pub type HealthClientError = reqwest::Error;

/// `HealthVerifier` backed by a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpHealthVerifier {
    client: Client,
}

impl HttpHealthVerifier {
    /// Build a verifier whose requests time out after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, HealthClientError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HealthVerifier for HttpHealthVerifier {
    async fn check(&self, base_url: &str) -> bool {
        let endpoint = health_endpoint(base_url);

        match self.client.get(&endpoint).send().await {
            Ok(response) if response.status() == StatusCode::OK => true,
            Ok(response) => {
                debug!(url = %endpoint, status = %response.status(), "Health check returned non-200 status");
                false
            }
            Err(e) => {
                debug!(url = %endpoint, error = %e, "Health check failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Router;
    use axum::http::StatusCode as AxumStatus;
    use axum::routing::get;
    use tokio::net::TcpListener;

    async fn serve(router: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.ok();
        });
        format!("http://{addr}")
    }

    fn verifier() -> HttpHealthVerifier {
        HttpHealthVerifier::new(Duration::from_secs(2)).unwrap()
    }

    #[tokio::test]
    async fn ok_status_is_healthy() {
        let url = serve(Router::new().route("/health", get(|| async { "ok" }))).await;
        assert!(verifier().check(&url).await);
        assert!(verifier().check(&format!("{url}/")).await);
    }

    #[tokio::test]
    async fn non_200_status_is_unhealthy() {
        let url = serve(Router::new().route(
            "/health",
            get(|| async { (AxumStatus::NO_CONTENT, "") }),
        ))
        .await;
        assert!(!verifier().check(&url).await);

        let url = serve(Router::new().route(
            "/health",
            get(|| async { (AxumStatus::SERVICE_UNAVAILABLE, "down") }),
        ))
        .await;
        assert!(!verifier().check(&url).await);
    }

    #[tokio::test]
    async fn missing_endpoint_is_unhealthy() {
        let url = serve(Router::new().route("/", get(|| async { "root" }))).await;
        assert!(!verifier().check(&url).await);
    }

    #[tokio::test]
    async fn unreachable_server_is_unhealthy() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        assert!(!verifier().check(&format!("http://127.0.0.1:{port}")).await);
        assert!(!verifier().check("not a url").await);
    }
}
