//! HTTP transport layer for the Zenodo SDK.

use crate::config::ClientConfig;
use crate::error::{ZenodoError, ZenodoResult};
use crate::upstream::{Method, Query, Upstream};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{header, Client, RequestBuilder, Response};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

/// HTTP transport for making API requests.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    config: Arc<ClientConfig>,
}

impl HttpTransport {
    /// Create a new HTTP transport with the given configuration.
    pub fn new(config: Arc<ClientConfig>) -> ZenodoResult<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));

        if let Some(ref token) = config.api_token {
            headers.insert(
                header::AUTHORIZATION,
                header::HeaderValue::from_str(&format!("Bearer {}", token))
                    .map_err(|_| ZenodoError::Config("Invalid API token format".to_string()))?,
            );
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .build()?;

        Ok(Self { client, config })
    }

    /// The configuration this transport was built with.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Build a URL for the given API-relative path.
    fn build_url(&self, path: &str) -> ZenodoResult<url::Url> {
        self.config
            .base_url
            .join(path.trim_start_matches('/'))
            .map_err(ZenodoError::InvalidUrl)
    }

    /// Absolute URLs are used as-is, anything else is joined onto the base.
    fn resolve_url(&self, url: &str) -> ZenodoResult<url::Url> {
        match url::Url::parse(url) {
            Ok(absolute) => Ok(absolute),
            Err(url::ParseError::RelativeUrlWithoutBase) => self.build_url(url),
            Err(e) => Err(e.into()),
        }
    }

    /// Execute a request with retries.
    async fn execute_with_retry(&self, request_builder: RequestBuilder) -> ZenodoResult<Response> {
        let retry_config = &self.config.retry_config;
        let mut attempts = 0;

        loop {
            let request = request_builder
                .try_clone()
                .ok_or_else(|| ZenodoError::Config("Request cannot be cloned".to_string()))?;

            match request.send().await {
                Ok(response) => {
                    let status = response.status().as_u16();

                    if response.status().is_success() {
                        return Ok(response);
                    }

                    if attempts < retry_config.max_retries
                        && retry_config.should_retry_status(status)
                    {
                        let backoff = retry_config.backoff_for_attempt(attempts);
                        warn!(
                            status = status,
                            attempt = attempts + 1,
                            backoff_ms = backoff.as_millis(),
                            "Request failed, retrying"
                        );
                        tokio::time::sleep(backoff).await;
                        attempts += 1;
                        continue;
                    }

                    let body = response.text().await.unwrap_or_default();
                    return Err(ZenodoError::from_response(status, &body));
                }
                Err(e) => {
                    let err = ZenodoError::from_transport(e);
                    if attempts < retry_config.max_retries && err.is_retryable() {
                        let backoff = retry_config.backoff_for_attempt(attempts);
                        warn!(
                            error = %err,
                            attempt = attempts + 1,
                            backoff_ms = backoff.as_millis(),
                            "Request failed to complete, retrying"
                        );
                        tokio::time::sleep(backoff).await;
                        attempts += 1;
                        continue;
                    }
                    return Err(err);
                }
            }
        }
    }
}

#[async_trait]
impl Upstream for HttpTransport {
    async fn fetch(&self, method: Method, path: &str, query: &Query) -> ZenodoResult<Value> {
        let url = self.build_url(path)?;
        debug!(method = %method, url = %url, params = query.len(), "Upstream request");

        let builder = self.client.request(method, url).query(query);
        let response = self.execute_with_retry(builder).await?;
        let body = response.bytes().await.map_err(ZenodoError::from_transport)?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn fetch_bytes(&self, url: &str) -> ZenodoResult<Bytes> {
        let url = self.resolve_url(url)?;
        debug!(url = %url, "Download request");

        let response = self.execute_with_retry(self.client.get(url)).await?;
        response.bytes().await.map_err(ZenodoError::from_transport)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RetryConfig;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn create_config(base_url: &str) -> Arc<ClientConfig> {
        let mut config = ClientConfig::new(url::Url::parse(base_url).unwrap());
        config.retry_config = RetryConfig::no_retry();
        Arc::new(config)
    }

    fn create_config_with_token(base_url: &str, token: &str) -> Arc<ClientConfig> {
        let mut config = ClientConfig::new(url::Url::parse(base_url).unwrap());
        config.api_token = Some(token.to_string());
        config.retry_config = RetryConfig::no_retry();
        Arc::new(config)
    }

    fn api_base(server: &MockServer) -> String {
        format!("{}/api/", server.uri())
    }

    #[tokio::test]
    async fn test_fetch_record() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/records/123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 123,
                "metadata": {"title": "Ocean temperatures"}
            })))
            .mount(&server)
            .await;

        let transport = HttpTransport::new(create_config(&api_base(&server))).unwrap();

        let record = transport.fetch(Method::GET, "records/123", &[]).await.unwrap();
        assert_eq!(record["metadata"]["title"], "Ocean temperatures");
    }

    #[tokio::test]
    async fn test_fetch_sends_query_params() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/records"))
            .and(query_param("q", "climate"))
            .and(query_param("size", "5"))
            .and(query_param("sort", "mostrecent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "hits": {"hits": [], "total": 0}
            })))
            .mount(&server)
            .await;

        let transport = HttpTransport::new(create_config(&api_base(&server))).unwrap();

        let query = vec![
            ("q".to_string(), "climate".to_string()),
            ("size".to_string(), "5".to_string()),
            ("sort".to_string(), "mostrecent".to_string()),
        ];
        let result = transport.fetch(Method::GET, "records", &query).await.unwrap();
        assert_eq!(result["hits"]["total"], 0);
    }

    #[tokio::test]
    async fn test_authorization_header() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/records/1"))
            .and(header("Authorization", "Bearer tok-123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 1})))
            .mount(&server)
            .await;

        let transport =
            HttpTransport::new(create_config_with_token(&api_base(&server), "tok-123")).unwrap();

        let record = transport.fetch(Method::GET, "records/1", &[]).await.unwrap();
        assert_eq!(record["id"], 1);
    }

    #[tokio::test]
    async fn test_auth_failures_are_distinguished() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/records/401"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "status": 401,
                "message": "The server could not verify that you are authorized"
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/records/403"))
            .respond_with(ResponseTemplate::new(403).set_body_string("Forbidden"))
            .mount(&server)
            .await;

        let transport = HttpTransport::new(create_config(&api_base(&server))).unwrap();

        match transport.fetch(Method::GET, "records/401", &[]).await {
            Err(ZenodoError::Authentication { status, .. }) => assert_eq!(status, 401),
            other => panic!("Expected Authentication error, got {other:?}"),
        }
        match transport.fetch(Method::GET, "records/403", &[]).await {
            Err(ZenodoError::Authentication { status, .. }) => assert_eq!(status, 403),
            other => panic!("Expected Authentication error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_error_on_404() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/records/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "status": 404,
                "message": "PID does not exist."
            })))
            .mount(&server)
            .await;

        let transport = HttpTransport::new(create_config(&api_base(&server))).unwrap();

        match transport.fetch(Method::GET, "records/missing", &[]).await {
            Err(ZenodoError::Api { status, message, .. }) => {
                assert_eq!(status, 404);
                assert_eq!(message, "PID does not exist.");
            }
            other => panic!("Expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_retries_transient_status() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/records/7"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/records/7"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 7})))
            .mount(&server)
            .await;

        let mut config = ClientConfig::new(url::Url::parse(&api_base(&server)).unwrap());
        config.retry_config = RetryConfig {
            max_retries: 2,
            initial_backoff: Duration::from_millis(1),
            ..Default::default()
        };
        let transport = HttpTransport::new(Arc::new(config)).unwrap();

        let record = transport.fetch(Method::GET, "records/7", &[]).await.unwrap();
        assert_eq!(record["id"], 7);
    }

    #[tokio::test]
    async fn test_retries_after_timeout() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/records/8"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"id": 0}))
                    .set_delay(Duration::from_millis(500)),
            )
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/records/8"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 8})))
            .mount(&server)
            .await;

        let mut config = ClientConfig::new(url::Url::parse(&api_base(&server)).unwrap());
        config.timeout = Duration::from_millis(100);
        config.retry_config = RetryConfig {
            max_retries: 1,
            initial_backoff: Duration::from_millis(1),
            ..Default::default()
        };
        let transport = HttpTransport::new(Arc::new(config)).unwrap();

        let record = transport.fetch(Method::GET, "records/8", &[]).await.unwrap();
        assert_eq!(record["id"], 8);
    }

    #[tokio::test]
    async fn test_connection_failure_maps_to_http_error() {
        // Nothing listens on a port released right after binding.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let base = format!("http://{}/api/", listener.local_addr().unwrap());
        drop(listener);

        let mut config = ClientConfig::new(url::Url::parse(&base).unwrap());
        config.retry_config = RetryConfig {
            max_retries: 2,
            initial_backoff: Duration::from_millis(1),
            ..Default::default()
        };
        let transport = HttpTransport::new(Arc::new(config)).unwrap();

        let err = transport.fetch(Method::GET, "records/1", &[]).await.unwrap_err();
        assert!(matches!(err, ZenodoError::Http(_)));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_timeout_maps_to_timeout_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/records/slow"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"id": 1}))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let mut config = ClientConfig::new(url::Url::parse(&api_base(&server)).unwrap());
        config.timeout = Duration::from_millis(50);
        config.retry_config = RetryConfig::no_retry();
        let transport = HttpTransport::new(Arc::new(config)).unwrap();

        let result = transport.fetch(Method::GET, "records/slow", &[]).await;
        assert!(matches!(result, Err(ZenodoError::Timeout)));
    }

    #[tokio::test]
    async fn test_invalid_json_body() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/records/html"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
            .mount(&server)
            .await;

        let transport = HttpTransport::new(create_config(&api_base(&server))).unwrap();

        let result = transport.fetch(Method::GET, "records/html", &[]).await;
        assert!(matches!(result, Err(ZenodoError::Json(_))));
    }

    #[tokio::test]
    async fn test_fetch_bytes_absolute_url() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/files/abc/data.csv"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"a,b\n1,2\n".to_vec()))
            .mount(&server)
            .await;

        let transport = HttpTransport::new(create_config(&api_base(&server))).unwrap();

        let url = format!("{}/files/abc/data.csv", server.uri());
        let bytes = transport.fetch_bytes(&url).await.unwrap();
        assert_eq!(&bytes[..], b"a,b\n1,2\n");
    }

    #[tokio::test]
    async fn test_build_url() {
        let transport = HttpTransport::new(create_config("http://localhost:8080/api/")).unwrap();

        let url = transport.build_url("records/42").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/api/records/42");

        let url = transport.build_url("/records/42").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/api/records/42");
    }
}
