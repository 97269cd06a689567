use crate::backend::retry::{calculate_retry_delay, error_chain_to_string, is_retryable_error};
use crate::backend::{ApiKeyStatus, BackendMode, BackendStatus};
use crate::domain::model::{AnalysisOutcome, AnalysisRequest};
use crate::domain::ports::AnalysisBackend;
use crate::pricing;
use crate::utils::error::{AnalysisError, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};

pub const LIVE_SOURCE: &str = "CrewAI Real System";

/// Wire envelope returned by the analysis service.
#[derive(Debug, Deserialize)]
struct AnalyzeResponse {
    success: bool,
    #[serde(default)]
    analysis: Option<String>,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    processing_time: Option<f64>,
    #[serde(default)]
    estimated_cost: Option<f64>,
    #[serde(default)]
    error: Option<String>,
}

/// Client for a live CrewAI analysis service.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    endpoint: String,
    retry_attempts: u32,
}

impl HttpBackend {
    pub fn new(
        endpoint: &str,
        timeout_seconds: u64,
        retry_attempts: u32,
        headers: &HashMap<String, String>,
    ) -> Result<Self> {
        let mut header_map = HeaderMap::new();
        for (raw_name, raw_value) in headers {
            let name = HeaderName::from_bytes(raw_name.as_bytes()).map_err(|e| {
                AnalysisError::InvalidConfigValueError {
                    field: "backend.headers".to_string(),
                    value: raw_name.clone(),
                    reason: e.to_string(),
                }
            })?;
            let value = HeaderValue::from_str(raw_value).map_err(|e| {
                AnalysisError::InvalidConfigValueError {
                    field: "backend.headers".to_string(),
                    value: raw_value.clone(),
                    reason: e.to_string(),
                }
            })?;
            header_map.insert(name, value);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .default_headers(header_map)
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            retry_attempts: retry_attempts.max(1),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn analyze_url(&self) -> String {
        format!("{}/api/analyze", self.endpoint)
    }

    fn health_url(&self) -> String {
        format!("{}/health", self.endpoint)
    }

    async fn attempt(&self, request: &AnalysisRequest) -> Result<AnalysisOutcome> {
        debug!("Making API request to: {}", self.analyze_url());
        let response = self
            .client
            .post(self.analyze_url())
            .json(request)
            .send()
            .await?;

        debug!("API response status: {}", response.status());

        if !response.status().is_success() {
            return Err(AnalysisError::BackendError {
                message: format!("backend returned {}", response.status()),
            });
        }

        let body: AnalyzeResponse = response.json().await?;

        if !body.success {
            return Err(AnalysisError::BackendError {
                message: body
                    .error
                    .unwrap_or_else(|| "backend reported failure without detail".to_string()),
            });
        }

        let analysis = body.analysis.unwrap_or_default();
        if analysis.trim().is_empty() {
            return Err(AnalysisError::BackendError {
                message: "backend returned an empty analysis".to_string(),
            });
        }

        Ok(AnalysisOutcome {
            analysis,
            source: body.source.unwrap_or_else(|| LIVE_SOURCE.to_string()),
            simulated: false,
            processing_time: body.processing_time.unwrap_or(0.0),
            estimated_cost: body
                .estimated_cost
                .unwrap_or_else(|| pricing::real_cost(request.analysis_type, &request.company)),
            fallback_reason: None,
            // the live service returns free text only, extraction happens downstream
            structured: None,
        })
    }
}

#[async_trait]
impl AnalysisBackend for HttpBackend {
    async fn run_analysis(&self, request: &AnalysisRequest) -> Result<AnalysisOutcome> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.attempt(request).await {
                Ok(outcome) => return Ok(outcome),
                Err(err) => {
                    let message = error_chain_to_string(&err);
                    if attempt >= self.retry_attempts || !is_retryable_error(&message) {
                        return Err(err);
                    }
                    let delay = calculate_retry_delay(attempt);
                    warn!(
                        "Backend attempt {}/{} failed ({}), retrying in {}ms",
                        attempt, self.retry_attempts, message, delay
                    );
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                }
            }
        }
    }

    async fn status(&self) -> BackendStatus {
        let ready = match self.client.get(self.health_url()).send().await {
            Ok(response) => response.status().is_success(),
            Err(err) => {
                debug!("Health probe failed: {}", err);
                false
            }
        };

        BackendStatus {
            ready,
            mode: BackendMode::Live,
            endpoint: Some(self.endpoint.clone()),
            version: env!("CARGO_PKG_VERSION").to_string(),
            api_keys: ApiKeyStatus::detect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{AnalysisType, CompanyProfile};
    use httpmock::prelude::*;
    use serde_json::json;

    fn sample_request() -> AnalysisRequest {
        AnalysisRequest::new(
            CompanyProfile::new("ACME", "Tecnología", "Madrid"),
            AnalysisType::Market,
        )
    }

    fn backend_for(server: &MockServer, attempts: u32) -> HttpBackend {
        HttpBackend::new(&server.base_url(), 5, attempts, &HashMap::new()).unwrap()
    }

    #[tokio::test]
    async fn test_successful_analysis_round_trip() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/api/analyze")
                .json_body_partial(r#"{"analysis_type": "market"}"#);
            then.status(200).json_body(json!({
                "success": true,
                "analysis": "El análisis revela gran potencial de crecimiento en el mercado objetivo.",
                "source": "CrewAI Real System",
                "processing_time": 12.5,
                "estimated_cost": 0.10
            }));
        });

        let backend = backend_for(&server, 1);
        let outcome = backend.run_analysis(&sample_request()).await.unwrap();

        mock.assert();
        assert!(!outcome.simulated);
        assert_eq!(outcome.source, LIVE_SOURCE);
        assert_eq!(outcome.processing_time, 12.5);
        assert!(outcome.analysis.contains("potencial"));
        assert!(outcome.structured.is_none());
    }

    #[tokio::test]
    async fn test_missing_cost_falls_back_to_cost_model() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/api/analyze");
            then.status(200).json_body(json!({
                "success": true,
                "analysis": "Resultado del análisis con suficiente contenido."
            }));
        });

        let backend = backend_for(&server, 1);
        let mut request = sample_request();
        request.analysis_type = AnalysisType::Strategic;
        let outcome = backend.run_analysis(&request).await.unwrap();

        assert_eq!(outcome.estimated_cost, 0.50);
    }

    #[tokio::test]
    async fn test_backend_failure_is_reported() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/api/analyze");
            then.status(200).json_body(json!({
                "success": false,
                "error": "Sistema no está listo. Verifica configuración."
            }));
        });

        let backend = backend_for(&server, 3);
        let err = backend.run_analysis(&sample_request()).await.unwrap_err();
        match err {
            AnalysisError::BackendError { message } => {
                assert!(message.contains("no está listo"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_retries_transient_server_error() {
        let server = MockServer::start();
        let failing = server.mock(|when, then| {
            when.method(POST).path("/api/analyze");
            then.status(503);
        });

        let backend = backend_for(&server, 2);
        let err = backend.run_analysis(&sample_request()).await.unwrap_err();

        // first attempt plus one retry
        failing.assert_hits(2);
        assert!(error_chain_to_string(&err).contains("503"));
    }

    #[tokio::test]
    async fn test_client_error_is_not_retried() {
        let server = MockServer::start();
        let failing = server.mock(|when, then| {
            when.method(POST).path("/api/analyze");
            then.status(404);
        });

        let backend = backend_for(&server, 3);
        let err = backend.run_analysis(&sample_request()).await.unwrap_err();

        failing.assert_hits(1);
        assert!(matches!(err, AnalysisError::BackendError { .. }));
    }

    #[tokio::test]
    async fn test_health_probe_drives_status() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/health");
            then.status(200).json_body(json!({"status": "ok"}));
        });

        let backend = backend_for(&server, 1);
        let status = backend.status().await;
        assert!(status.ready);
        assert_eq!(status.mode, BackendMode::Live);
        assert_eq!(status.endpoint.as_deref(), Some(server.base_url().as_str()));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_reports_not_ready() {
        let backend =
            HttpBackend::new("http://127.0.0.1:1", 1, 1, &HashMap::new()).unwrap();
        let status = backend.status().await;
        assert!(!status.ready);
    }

    #[test]
    fn test_invalid_header_name_is_rejected() {
        let mut headers = HashMap::new();
        headers.insert("bad header".to_string(), "value".to_string());
        let err = HttpBackend::new("http://localhost:8000", 5, 1, &headers).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::InvalidConfigValueError { .. }
        ));
    }

    #[test]
    fn test_endpoint_trailing_slash_is_normalized() {
        let backend =
            HttpBackend::new("http://localhost:8000/", 5, 1, &HashMap::new()).unwrap();
        assert_eq!(backend.analyze_url(), "http://localhost:8000/api/analyze");
        assert_eq!(backend.health_url(), "http://localhost:8000/health");
    }
}
