use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, error, info, warn};

use super::types::{GenerateRequest, GenerateResponse};
use super::TextOracle;
use crate::config::{OracleConfig, RequestConfig};
use crate::error::{OracleError, OracleResult};

/// Client for the Gemini `generateContent` API
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    request_config: RequestConfig,
}

impl GeminiClient {
    /// Create a new Gemini client
    pub fn new(config: &OracleConfig, request_config: RequestConfig) -> OracleResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(request_config.timeout_ms))
            .build()
            .map_err(OracleError::Http)?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            request_config,
        })
    }

    /// Get the base URL (for testing)
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Execute a single generateContent request (internal)
    async fn execute_request(&self, url: &str, request: &GenerateRequest) -> OracleResult<String> {
        debug!(model = %self.model, "Calling Gemini generateContent");

        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    OracleError::Timeout {
                        timeout_ms: self.request_config.timeout_ms,
                    }
                } else {
                    OracleError::Http(e)
                }
            })?;

        let status = response.status();

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(OracleError::Api {
                status: status.as_u16(),
                message: error_body,
            });
        }

        let body: GenerateResponse =
            response
                .json()
                .await
                .map_err(|e| OracleError::InvalidResponse {
                    message: format!("Failed to parse response: {}", e),
                })?;

        body.text().ok_or_else(|| OracleError::InvalidResponse {
            message: "Response contained no candidate text".to_string(),
        })
    }
}

#[async_trait]
impl TextOracle for GeminiClient {
    async fn generate(&self, prompt: &str) -> OracleResult<String> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        let request = GenerateRequest::from_prompt(prompt);

        let mut last_error = None;
        let mut retries = 0;

        while retries <= self.request_config.max_retries {
            if retries > 0 {
                let delay = Duration::from_millis(
                    self.request_config.retry_delay_ms * (2_u64.pow(retries - 1)),
                );
                warn!(
                    model = %self.model,
                    retry = retries,
                    delay_ms = delay.as_millis(),
                    "Retrying Gemini request"
                );
                tokio::time::sleep(delay).await;
            }

            let start = Instant::now();

            match self.execute_request(&url, &request).await {
                Ok(text) => {
                    let latency = start.elapsed();
                    info!(
                        model = %self.model,
                        latency_ms = latency.as_millis(),
                        "Gemini call succeeded"
                    );
                    return Ok(text);
                }
                Err(e) => {
                    let latency = start.elapsed();
                    error!(
                        model = %self.model,
                        error = %e,
                        latency_ms = latency.as_millis(),
                        retry = retries,
                        "Gemini call failed"
                    );
                    last_error = Some(e);
                    retries += 1;
                }
            }
        }

        Err(OracleError::Unavailable {
            message: last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "Unknown error".to_string()),
            retries,
        })
    }
}
