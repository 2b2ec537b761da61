//! Video Intelligence REST API client.
//!
//! The annotation call is a long-running operation on Google's side: we
//! submit `videos:annotate`, get back an operation name, and poll it until
//! it resolves (sub-second for short clips, several minutes for long ones).
//! The whole wait is bounded by a configurable deadline so a wedged
//! operation surfaces as a failure instead of a hang.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use base64::Engine;
use gcp_auth::{CustomServiceAccount, TokenProvider};
use reqwest::{Client, StatusCode};
use serde::Serialize;
use tracing::{debug, info, warn};

use tidy_models::VideoAnnotations;

use crate::error::{AnnotateError, AnnotateResult};
use crate::gcs::rewrite_to_gcs_uri;
use crate::token_cache::TokenCache;
use crate::types::{AnnotateOperation, Operation};

/// Hard ceiling for inline (base64) video content. The API rejects larger
/// payloads; anything bigger must go through a GCS URI.
pub const MAX_INLINE_BYTES: u64 = 20 * 1024 * 1024;

/// Annotation features this pipeline can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    Label,
    Object,
    Text,
    Shot,
}

impl Feature {
    /// REST enum name for the feature.
    pub fn rest_name(&self) -> &'static str {
        match self {
            Feature::Label => "LABEL_DETECTION",
            Feature::Object => "OBJECT_TRACKING",
            Feature::Text => "TEXT_DETECTION",
            Feature::Shot => "SHOT_CHANGE_DETECTION",
        }
    }
}

/// Annotation client configuration.
#[derive(Debug, Clone)]
pub struct AnnotateConfig {
    /// API base URL (overridable for tests)
    pub endpoint: String,
    /// Per-request HTTP timeout
    pub request_timeout: Duration,
    /// Connect timeout
    pub connect_timeout: Duration,
    /// Delay between operation polls
    pub poll_interval: Duration,
    /// Overall deadline for one annotation operation
    pub operation_timeout: Duration,
    /// Ceiling for the inline-content fallback
    pub max_inline_bytes: u64,
}

impl Default for AnnotateConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://videointelligence.googleapis.com".to_string(),
            request_timeout: Duration::from_secs(60),
            connect_timeout: Duration::from_secs(5),
            poll_interval: Duration::from_secs(5),
            operation_timeout: Duration::from_secs(600), // 10 minutes
            max_inline_bytes: MAX_INLINE_BYTES,
        }
    }
}

impl AnnotateConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            endpoint: std::env::var("VIDEO_INTELLIGENCE_ENDPOINT")
                .unwrap_or(defaults.endpoint),
            request_timeout: Duration::from_secs(
                std::env::var("ANNOTATE_REQUEST_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(60),
            ),
            connect_timeout: Duration::from_secs(
                std::env::var("ANNOTATE_CONNECT_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(5),
            ),
            poll_interval: Duration::from_secs(
                std::env::var("ANNOTATE_POLL_INTERVAL_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(5),
            ),
            operation_timeout: Duration::from_secs(
                std::env::var("ANNOTATE_OPERATION_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(600),
            ),
            max_inline_bytes: defaults.max_inline_bytes,
        }
    }
}

/// The reference actually sent to the annotation service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoSource {
    /// A `gs://` URI; no size limit applies
    GcsUri(String),
    /// Raw bytes, base64-encoded into the request
    Inline(Vec<u8>),
}

/// Provider seam for the orchestrator: anything that can turn a video
/// reference into normalized annotations.
#[async_trait]
pub trait VideoAnnotator: Send + Sync {
    async fn annotate(
        &self,
        video_ref: &str,
        features: &[Feature],
    ) -> AnnotateResult<VideoAnnotations>;
}

enum Credentials {
    Gcp(TokenCache),
    /// Fixed bearer token; for tests and emulators only
    Static(String),
}

/// Google Video Intelligence client.
///
/// Construct once at process start and share by reference; the inner
/// reqwest client pools connections and the token cache is single-flight.
pub struct VideoIntelClient {
    http: Client,
    config: AnnotateConfig,
    credentials: Credentials,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AnnotateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    input_uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    input_content: Option<String>,
    features: Vec<&'static str>,
}

impl VideoIntelClient {
    /// Create a new client using service-account credentials.
    pub fn new(config: AnnotateConfig) -> AnnotateResult<Self> {
        let auth = Self::create_auth_provider()?;
        let http = Self::build_http(&config)?;
        Ok(Self {
            http,
            config,
            credentials: Credentials::Gcp(TokenCache::new(auth)),
        })
    }

    /// Create a client with a fixed bearer token (tests/emulators).
    pub fn with_static_token(config: AnnotateConfig, token: impl Into<String>) -> AnnotateResult<Self> {
        let http = Self::build_http(&config)?;
        Ok(Self {
            http,
            config,
            credentials: Credentials::Static(token.into()),
        })
    }

    /// Create from environment variables.
    pub fn from_env() -> AnnotateResult<Self> {
        Self::new(AnnotateConfig::from_env())
    }

    fn build_http(config: &AnnotateConfig) -> AnnotateResult<Client> {
        Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(Duration::from_secs(90))
            .user_agent(concat!("tidy-annotate/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(AnnotateError::Network)
    }

    fn create_auth_provider() -> AnnotateResult<Arc<dyn TokenProvider>> {
        let service_account = CustomServiceAccount::from_env().map_err(|e| {
            AnnotateError::auth_error(format!("Failed to load service account: {}", e))
        })?;

        match service_account {
            Some(sa) => Ok(Arc::new(sa)),
            None => Err(AnnotateError::auth_error(
                "GOOGLE_APPLICATION_CREDENTIALS not set. \
                 Set it to the path of your service account JSON file.",
            )),
        }
    }

    async fn token(&self) -> AnnotateResult<String> {
        match &self.credentials {
            Credentials::Gcp(cache) => cache.get_token().await,
            Credentials::Static(token) => Ok(token.clone()),
        }
    }

    /// Verify credentials are usable without submitting an annotation.
    pub async fn health_check(&self) -> AnnotateResult<()> {
        self.token().await.map(|_| ())
    }

    /// Resolve the most efficient reference for a video.
    ///
    /// Order matters: a `gs://` URI (given or rewritten) has no size limit,
    /// so downloading bytes is strictly a last resort.
    pub async fn resolve_source(&self, video_ref: &str) -> AnnotateResult<VideoSource> {
        if video_ref.starts_with("gs://") {
            debug!("Using provided GCS URI: {}", video_ref);
            return Ok(VideoSource::GcsUri(video_ref.to_string()));
        }

        if let Some(gcs_uri) = rewrite_to_gcs_uri(video_ref) {
            debug!("Rewrote blob URL to GCS URI: {}", gcs_uri);
            return Ok(VideoSource::GcsUri(gcs_uri));
        }

        debug!("No GCS rewrite possible, falling back to byte download");
        let bytes = self.download_video(video_ref).await?;
        Ok(VideoSource::Inline(bytes))
    }

    /// Download video bytes for the inline fallback, enforcing the ceiling.
    async fn download_video(&self, url: &str) -> AnnotateResult<Vec<u8>> {
        let response = self.http.get(url).send().await?;

        if !response.status().is_success() {
            return Err(AnnotateError::download_failed(format!(
                "Failed to download video: {}",
                response.status()
            )));
        }

        let limit = self.config.max_inline_bytes;
        if let Some(length) = response.content_length() {
            if length > limit {
                return Err(AnnotateError::TooLarge {
                    size_mb: length / (1024 * 1024),
                    limit_mb: limit / (1024 * 1024),
                });
            }
        }

        // Stream the body so a missing or lying Content-Length can't buffer
        // past the ceiling.
        let mut response = response;
        let mut bytes: Vec<u8> = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            let total = bytes.len() as u64 + chunk.len() as u64;
            if total > limit {
                return Err(AnnotateError::TooLarge {
                    size_mb: total / (1024 * 1024),
                    limit_mb: limit / (1024 * 1024),
                });
            }
            bytes.extend_from_slice(&chunk);
        }

        debug!("Downloaded {} bytes for inline annotation", bytes.len());
        Ok(bytes)
    }

    /// Submit the annotation request, returning the operation name.
    async fn submit(
        &self,
        source: &VideoSource,
        features: &[Feature],
    ) -> AnnotateResult<String> {
        let request = match source {
            VideoSource::GcsUri(uri) => AnnotateRequest {
                input_uri: Some(uri.clone()),
                input_content: None,
                features: features.iter().map(Feature::rest_name).collect(),
            },
            VideoSource::Inline(bytes) => AnnotateRequest {
                input_uri: None,
                input_content: Some(base64::engine::general_purpose::STANDARD.encode(bytes)),
                features: features.iter().map(Feature::rest_name).collect(),
            },
        };

        let token = self.token().await?;
        let url = format!("{}/v1/videos:annotate", self.config.endpoint);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&token)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::error_for_status(status, body));
        }

        let operation: AnnotateOperation = response.json().await?;
        Ok(operation.name)
    }

    /// Poll the operation until it resolves or the deadline passes.
    async fn await_operation(&self, name: &str, deadline: Instant) -> AnnotateResult<Operation> {
        let url = format!("{}/v1/{}", self.config.endpoint, name);

        loop {
            let token = self.token().await?;
            let response = self.http.get(&url).bearer_auth(&token).send().await?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(Self::error_for_status(status, body));
            }

            let operation: Operation = response.json().await?;
            if operation.done {
                return Ok(operation);
            }

            if Instant::now() + self.config.poll_interval > deadline {
                return Err(AnnotateError::Timeout(
                    self.config.operation_timeout.as_secs(),
                ));
            }
            tokio::time::sleep(self.config.poll_interval).await;
        }
    }

    fn error_for_status(status: StatusCode, body: String) -> AnnotateError {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                AnnotateError::auth_error(format!("{}: {}", status, body))
            }
            _ => AnnotateError::operation_failed(format!("{}: {}", status, body)),
        }
    }
}

#[async_trait]
impl VideoAnnotator for VideoIntelClient {
    async fn annotate(
        &self,
        video_ref: &str,
        features: &[Feature],
    ) -> AnnotateResult<VideoAnnotations> {
        let started = Instant::now();
        let deadline = started + self.config.operation_timeout;

        let source = self.resolve_source(video_ref).await?;
        let operation_name = self.submit(&source, features).await?;
        info!(
            operation = %operation_name,
            "Submitted annotation request, waiting for operation"
        );

        let operation = self.await_operation(&operation_name, deadline).await?;

        if let Some(error) = operation.error {
            // Surface the vendor's failure reason verbatim.
            let message = error.message.unwrap_or_else(|| {
                format!("operation failed with code {}", error.code.unwrap_or(0))
            });
            warn!(operation = %operation_name, "Annotation operation failed: {}", message);
            return Err(AnnotateError::operation_failed(message));
        }

        let raw = operation
            .response
            .and_then(|r| r.annotation_results.into_iter().next())
            .ok_or(AnnotateError::NoResults)?;

        let mut annotations = crate::types::normalize(raw);
        annotations.processing_time_ms = started.elapsed().as_millis() as u64;

        info!(
            labels = annotations.labels.len(),
            objects = annotations.objects.len(),
            elapsed_ms = annotations.processing_time_ms,
            "Annotation complete"
        );
        Ok(annotations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(server: &MockServer) -> VideoIntelClient {
        let config = AnnotateConfig {
            endpoint: server.uri(),
            poll_interval: Duration::from_millis(10),
            operation_timeout: Duration::from_secs(5),
            max_inline_bytes: 64,
            ..AnnotateConfig::default()
        };
        VideoIntelClient::with_static_token(config, "test-token").unwrap()
    }

    #[tokio::test]
    async fn test_annotate_gs_uri_end_to_end() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/videos:annotate"))
            .and(body_partial_json(serde_json::json!({
                "inputUri": "gs://bucket/clip.mp4",
                "features": ["LABEL_DETECTION", "OBJECT_TRACKING"]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "name": "projects/p/locations/us/operations/42"
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/v1/projects/p/locations/us/operations/42"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "done": true,
                "response": {
                    "annotationResults": [{
                        "segmentLabelAnnotations": [{
                            "entity": {"description": "Kitchen"},
                            "segments": [{"segment": {"startTimeOffset": "0s", "endTimeOffset": "4.500s"},
                                          "confidence": 0.92}]
                        }],
                        "shotAnnotations": [{"startTimeOffset": "0s", "endTimeOffset": "4.500s"}]
                    }]
                }
            })))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let annotations = client
            .annotate("gs://bucket/clip.mp4", &[Feature::Label, Feature::Object])
            .await
            .unwrap();

        assert_eq!(annotations.labels.len(), 1);
        assert_eq!(annotations.labels[0].description, "Kitchen");
        assert_eq!(annotations.shots[0].end_time, 4.5);
    }

    #[tokio::test]
    async fn test_annotate_polls_until_done() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/videos:annotate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "name": "operations/7"
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/v1/operations/7"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "done": false
            })))
            .up_to_n_times(2)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/v1/operations/7"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "done": true,
                "response": {"annotationResults": [{
                    "shotAnnotations": [{"startTimeOffset": "0s", "endTimeOffset": "1s"}]
                }]}
            })))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let annotations = client
            .annotate("gs://bucket/clip.mp4", &[Feature::Shot])
            .await
            .unwrap();
        assert_eq!(annotations.shots.len(), 1);
    }

    #[tokio::test]
    async fn test_operation_error_propagates_vendor_message() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/videos:annotate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "name": "operations/9"
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/v1/operations/9"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "done": true,
                "error": {"code": 3, "message": "Unsupported video codec"}
            })))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let err = client
            .annotate("gs://bucket/clip.mp4", &[Feature::Label])
            .await
            .unwrap_err();
        match err {
            AnnotateError::OperationFailed(msg) => assert_eq!(msg, "Unsupported video codec"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_results_is_a_failure_not_a_success() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/videos:annotate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "name": "operations/11"
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/v1/operations/11"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "done": true,
                "response": {"annotationResults": []}
            })))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let err = client
            .annotate("gs://bucket/clip.mp4", &[Feature::Label])
            .await
            .unwrap_err();
        assert!(matches!(err, AnnotateError::NoResults));
    }

    #[tokio::test]
    async fn test_oversized_download_fails_before_submit() {
        let server = MockServer::start().await;

        // 128 bytes against the 64-byte test ceiling; no annotate mock is
        // mounted, so reaching the API would fail the test anyway.
        Mock::given(method("GET"))
            .and(path("/videos/big.mp4"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0u8; 128]))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let url = format!("{}/videos/big.mp4", server.uri());
        let err = client.annotate(&url, &[Feature::Label]).await.unwrap_err();
        assert!(matches!(err, AnnotateError::TooLarge { .. }));
    }

    #[tokio::test]
    async fn test_auth_failure_is_fatal_error_kind() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/videos:annotate"))
            .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let err = client
            .annotate("gs://bucket/clip.mp4", &[Feature::Label])
            .await
            .unwrap_err();
        assert!(err.is_auth());
    }

    #[test]
    fn test_feature_rest_names() {
        assert_eq!(Feature::Label.rest_name(), "LABEL_DETECTION");
        assert_eq!(Feature::Object.rest_name(), "OBJECT_TRACKING");
        assert_eq!(Feature::Text.rest_name(), "TEXT_DETECTION");
        assert_eq!(Feature::Shot.rest_name(), "SHOT_CHANGE_DETECTION");
    }
}
