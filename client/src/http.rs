//! HTTP implementation of [`ProcessingClient`]

use std::time::Duration;

use async_trait::async_trait;
use docbench_core::{ClientError, ProcessingClient, ServerReport, TestDocument};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder};
use tracing::{debug, trace};

use crate::config::{ClientConfig, ConfigValidationError, SubmitMode};
use crate::wire::ProcessResponse;

/// Longest error body kept in a [`ClientError::Status`]
const MAX_ERROR_BODY: usize = 512;

/// Client for a document-processing service exposing `POST /process`
/// and `GET /health`
///
/// Cheap to share: the inner reqwest client pools connections and every
/// session task goes through the same instance.
#[derive(Debug, Clone)]
pub struct HttpProcessClient {
    client: Client,
    base_url: String,
    submit_mode: SubmitMode,
    request_timeout: Duration,
}

impl HttpProcessClient {
    /// Validate `config` and build the pooled HTTP client.
    pub fn new(config: ClientConfig) -> Result<Self, ConfigValidationError> {
        config.validate()?;

        let client = Client::builder()
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(concat!("docbench/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ConfigValidationError::Build(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.normalized_base_url().to_string(),
            submit_mode: config.submit_mode,
            request_timeout: config.request_timeout,
        })
    }

    /// Submission mode in use
    pub fn submit_mode(&self) -> SubmitMode {
        self.submit_mode
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Attach the document to the request; returns the payload size in bytes.
    async fn attach(
        &self,
        request: RequestBuilder,
        document: &TestDocument,
    ) -> Result<(RequestBuilder, usize), ClientError> {
        match self.submit_mode {
            SubmitMode::Multipart => {
                let bytes = tokio::fs::read(document.path()).await?;
                let size = bytes.len();
                let part = Part::bytes(bytes)
                    .file_name(document.file_name())
                    .mime_str("text/plain")?;
                Ok((request.multipart(Form::new().part("file", part)), size))
            }
            SubmitMode::FileContent => {
                let content = tokio::fs::read_to_string(document.path()).await?;
                let size = content.len();
                let body = serde_json::json!({ "file_content": content });
                Ok((request.json(&body), size))
            }
            SubmitMode::FilePath => {
                let body = serde_json::json!({
                    "file_path": document.path().display().to_string(),
                });
                Ok((request.json(&body), document.len()))
            }
        }
    }

    fn transport_error(&self, error: reqwest::Error) -> ClientError {
        if error.is_timeout() {
            ClientError::Timeout(self.request_timeout)
        } else {
            ClientError::Http(error)
        }
    }
}

/// Turn a non-2xx response into [`ClientError::Status`]
async fn status_error(response: reqwest::Response) -> ClientError {
    let status = response.status().as_u16();
    let mut body = response.text().await.unwrap_or_default();
    if body.len() > MAX_ERROR_BODY {
        let mut cut = MAX_ERROR_BODY;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
    }
    ClientError::Status { status, body }
}

#[async_trait]
impl ProcessingClient for HttpProcessClient {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn process(&self, document: &TestDocument) -> Result<ServerReport, ClientError> {
        let request = self.client.post(self.endpoint("/process"));
        let (request, payload_bytes) = self.attach(request, document).await?;

        trace!(
            mode = %self.submit_mode,
            payload_bytes,
            "Submitting {}",
            document.file_name()
        );

        let response = request
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(e))?;

        let parsed: ProcessResponse = serde_json::from_slice(&body)
            .map_err(|e| ClientError::MalformedBody(e.to_string()))?;

        if !parsed.success {
            return Err(ClientError::Rejected(
                parsed
                    .message
                    .unwrap_or_else(|| "success=false without message".to_string()),
            ));
        }

        let data = parsed
            .data
            .ok_or_else(|| ClientError::MalformedBody("missing data object".to_string()))?;

        Ok(data.into_report(payload_bytes))
    }

    async fn health_check(&self) -> Result<(), ClientError> {
        let url = self.endpoint("/health");
        debug!("Health check: {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        if !response.status().is_success() {
            return Err(status_error(response).await);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docbench_core::ErrorKind;
    use std::path::Path;
    use tempfile::TempDir;
    use wiremock::matchers::{body_partial_json, body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn stage(dir: &Path, name: &str, content: &str) -> TestDocument {
        let file = dir.join(name);
        std::fs::write(&file, content).unwrap();
        TestDocument::new(5, content, file)
    }

    fn client_for(server: &MockServer, mode: SubmitMode) -> HttpProcessClient {
        HttpProcessClient::new(ClientConfig::new(server.uri()).with_submit_mode(mode)).unwrap()
    }

    fn success_body() -> serde_json::Value {
        serde_json::json!({
            "success": true,
            "message": "Document processed successfully",
            "data": {
                "processing_time_ms": 120.0,
                "total_chunks": 4,
                "successful_chunks": 4,
                "content_quality_score": 0.7,
                "avg_chunk_quality": 0.75,
                "information_density": 0.4
            }
        })
    }

    #[tokio::test]
    async fn test_multipart_upload_parses_report() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/process"))
            .and(body_string_contains("name=\"file\""))
            .and(body_string_contains("filename=\"doc_s0_0_5kb.txt\""))
            .respond_with(ResponseTemplate::new(200).set_body_json(success_body()))
            .expect(1)
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let doc = stage(dir.path(), "doc_s0_0_5kb.txt", "document processing system. ");
        let client = client_for(&server, SubmitMode::Multipart);

        let report = client.process(&doc).await.unwrap();
        assert_eq!(report.processing_time, 0.12);
        assert_eq!(report.total_chunks, 4);
        assert_eq!(report.avg_quality_score, 0.75);
        assert_eq!(report.avg_information_density, 0.4);
        assert_eq!(report.payload_bytes, doc.len());
    }

    #[tokio::test]
    async fn test_file_content_mode_sends_json() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/process"))
            .and(body_partial_json(serde_json::json!({ "file_content": "memory latency. " })))
            .respond_with(ResponseTemplate::new(200).set_body_json(success_body()))
            .expect(1)
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let doc = stage(dir.path(), "c.txt", "memory latency. ");
        let report = client_for(&server, SubmitMode::FileContent)
            .process(&doc)
            .await
            .unwrap();
        assert_eq!(report.successful_chunks, 4);
    }

    #[tokio::test]
    async fn test_file_path_mode_sends_path_only() {
        let server = MockServer::start().await;
        let dir = TempDir::new().unwrap();
        let doc = stage(dir.path(), "p.txt", "throughput benchmark. ");

        Mock::given(method("POST"))
            .and(path("/process"))
            .and(body_partial_json(serde_json::json!({
                "file_path": doc.path().display().to_string()
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(success_body()))
            .expect(1)
            .mount(&server)
            .await;

        // The file is not read locally in this mode
        std::fs::remove_file(doc.path()).unwrap();
        let report = client_for(&server, SubmitMode::FilePath)
            .process(&doc)
            .await
            .unwrap();
        assert_eq!(report.payload_bytes, doc.len());
    }

    #[tokio::test]
    async fn test_server_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/process"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let doc = stage(dir.path(), "a.txt", "x");
        let err = client_for(&server, SubmitMode::Multipart)
            .process(&doc)
            .await
            .unwrap_err();

        match &err {
            ClientError::Status { status, body } => {
                assert_eq!(*status, 500);
                assert_eq!(body, "boom");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(err.to_error_kind(), ErrorKind::ServerError);
    }

    #[tokio::test]
    async fn test_success_false_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": false,
                "message": "Document too large"
            })))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let doc = stage(dir.path(), "a.txt", "x");
        let err = client_for(&server, SubmitMode::Multipart)
            .process(&doc)
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Rejected(ref m) if m == "Document too large"));
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let doc = stage(dir.path(), "a.txt", "x");
        let err = client_for(&server, SubmitMode::Multipart)
            .process(&doc)
            .await
            .unwrap_err();
        assert_eq!(err.to_error_kind(), ErrorKind::InvalidResponse);
    }

    #[tokio::test]
    async fn test_missing_data_object() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "success": true })),
            )
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let doc = stage(dir.path(), "a.txt", "x");
        let err = client_for(&server, SubmitMode::Multipart)
            .process(&doc)
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::MalformedBody(_)));
    }

    #[tokio::test]
    async fn test_missing_staged_file_is_io_error() {
        let server = MockServer::start().await;
        let doc = TestDocument::new(1, "x", "/nonexistent/docbench/a.txt");
        let err = client_for(&server, SubmitMode::Multipart)
            .process(&doc)
            .await
            .unwrap_err();
        assert_eq!(err.to_error_kind(), ErrorKind::Io);
    }

    #[tokio::test]
    async fn test_request_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(success_body())
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let client = HttpProcessClient::new(
            ClientConfig::new(server.uri()).with_request_timeout(Duration::from_secs(1)),
        )
        .unwrap();

        let dir = TempDir::new().unwrap();
        let doc = stage(dir.path(), "a.txt", "x");
        let err = client.process(&doc).await.unwrap_err();
        assert!(matches!(err, ClientError::Timeout(d) if d == Duration::from_secs(1)));
    }

    #[tokio::test]
    async fn test_health_check() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{\"status\":\"ok\"}"))
            .mount(&server)
            .await;

        let client = client_for(&server, SubmitMode::Multipart);
        assert!(client.health_check().await.is_ok());
        assert_eq!(client.base_url(), server.uri());
    }

    #[tokio::test]
    async fn test_health_check_unhealthy() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = client_for(&server, SubmitMode::Multipart)
            .health_check()
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Status { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_unreachable_service() {
        let client = HttpProcessClient::new(ClientConfig::new("http://127.0.0.1:1")).unwrap();
        let err = client.health_check().await.unwrap_err();
        assert_eq!(err.to_error_kind(), ErrorKind::ConnectionError);
    }

    #[test]
    fn test_invalid_config_rejected() {
        assert!(HttpProcessClient::new(ClientConfig::new("not-a-url")).is_err());
    }
}
