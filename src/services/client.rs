//! Resilient request client
//!
//! Performs one logical HTTP request with rate limiting, credential prep,
//! payload validation, timeout, linear-backoff retry, and classified
//! failure reporting. Feature code talks to the backend only through this.

use crate::config::Settings;
use crate::models::request::{ApiRequest, PartData, RequestBody};
use crate::models::response::{ApiFailure, ApiSuccess, CallResult};
use crate::security::policy::PayloadPolicy;
use crate::security::rate_limit::RateLimiter;
use crate::services::classify::{Disposition, ResponseClassifier};
use crate::services::inflight::InflightRegistry;
use crate::services::token::TokenProvider;
use crate::utils::error::{ApiError, ApiResult};
use anyhow::Context;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CACHE_CONTROL, PRAGMA};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn, Instrument};
use uuid::Uuid;

/// Immutable context for one send attempt
#[derive(Debug, Clone, Copy)]
struct Attempt {
    /// 1-based attempt number
    number: u32,
    /// Total send-attempt budget for the call
    budget: u32,
}

impl Attempt {
    fn is_last(&self) -> bool {
        self.number >= self.budget
    }

    /// Linear backoff: attempt N waits N * base before the next send
    fn backoff_delay(&self, base_delay_ms: u64) -> Duration {
        Duration::from_millis(base_delay_ms.saturating_mul(self.number as u64))
    }
}

/// Session-expired handler registered by the embedding app
type SessionExpiredHandler = Arc<dyn Fn() + Send + Sync>;

/// TarTrack API client
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    upload_http: Client,
    settings: Settings,
    rate_limiter: Arc<RateLimiter>,
    inflight: Arc<InflightRegistry>,
    policy: Arc<PayloadPolicy>,
    classifier: ResponseClassifier,
    tokens: Arc<dyn TokenProvider>,
    on_session_expired: Option<SessionExpiredHandler>,
}

impl ApiClient {
    /// Create a new client instance
    pub fn new(settings: Settings, tokens: Arc<dyn TokenProvider>) -> ApiResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(settings.api.timeout_secs))
            .user_agent(concat!("tartrack-client/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        let upload_http = Client::builder()
            .timeout(Duration::from_secs(settings.api.upload_timeout_secs))
            .user_agent(concat!("tartrack-client/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create upload HTTP client")?;

        let classifier = ResponseClassifier::from_security_config(&settings.security);

        Ok(Self {
            http,
            upload_http,
            settings,
            rate_limiter: Arc::new(RateLimiter::new()),
            inflight: Arc::new(InflightRegistry::new()),
            policy: Arc::new(PayloadPolicy::standard()),
            classifier,
            tokens,
            on_session_expired: None,
        })
    }

    /// Register the single session-expired handler
    pub fn on_session_expired(mut self, handler: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_session_expired = Some(Arc::new(handler));
        self
    }

    /// Replace the payload policy registry
    pub fn with_policy(mut self, policy: PayloadPolicy) -> Self {
        self.policy = Arc::new(policy);
        self
    }

    /// The limiter backing this client; exposed for test isolation
    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.rate_limiter
    }

    /// The double-submission registry; exposed for test isolation
    pub fn inflight_registry(&self) -> &InflightRegistry {
        &self.inflight
    }

    /// Perform one logical request, returning a structured outcome
    ///
    /// Failures never escape as errors; callers branch on the result.
    pub async fn execute(&self, request: ApiRequest) -> CallResult {
        let request_id = Uuid::new_v4();
        let span = tracing::info_span!(
            "api_call",
            request_id = %request_id,
            method = %request.method,
            endpoint = %request.endpoint,
        );

        match self.run(request).instrument(span).await {
            Ok(success) => Ok(success),
            Err(error) => {
                if error.should_log() {
                    warn!(
                        kind = error.error_kind(),
                        status = error.status_code(),
                        "Request failed: {error}"
                    );
                }
                Err(ApiFailure::from_error(error, self.settings.is_dev_mode()))
            }
        }
    }

    /// GET a JSON endpoint
    pub async fn get(&self, endpoint: impl Into<String>) -> CallResult {
        self.execute(ApiRequest::get(endpoint)).await
    }

    /// POST a JSON payload
    pub async fn post(&self, endpoint: impl Into<String>, body: serde_json::Value) -> CallResult {
        self.execute(ApiRequest::post(endpoint).json(body)).await
    }

    /// PUT a JSON payload
    pub async fn put(&self, endpoint: impl Into<String>, body: serde_json::Value) -> CallResult {
        self.execute(ApiRequest::put(endpoint).json(body)).await
    }

    /// PATCH a JSON payload
    pub async fn patch(&self, endpoint: impl Into<String>, body: serde_json::Value) -> CallResult {
        self.execute(ApiRequest::patch(endpoint).json(body)).await
    }

    /// DELETE an endpoint
    pub async fn delete(&self, endpoint: impl Into<String>) -> CallResult {
        self.execute(ApiRequest::delete(endpoint)).await
    }

    /// Upload a multipart form, e.g. a trip report
    pub async fn upload(
        &self,
        endpoint: impl Into<String>,
        parts: Vec<crate::models::request::UploadPart>,
    ) -> CallResult {
        self.execute(ApiRequest::post(endpoint).multipart(parts)).await
    }

    /// The pipeline: rate-limit check, payload validation, then the
    /// attempt loop. Retries re-enter at credential prep.
    async fn run(&self, mut request: ApiRequest) -> ApiResult<ApiSuccess> {
        self.rate_limiter.check(
            &request.endpoint,
            self.settings.rate_limit.effective_limit(),
            Duration::from_secs(self.settings.rate_limit.window_secs),
        )?;

        if let RequestBody::Json(body) = &mut request.body {
            self.policy.apply(&request.endpoint, body)?;
        }

        // Mutations are keyed after validation so the normalized body
        // decides what counts as "the same request"
        let _inflight = if request.method != reqwest::Method::GET {
            Some(
                self.inflight
                    .begin(&request.endpoint, inflight_key(&request))?,
            )
        } else {
            None
        };

        let budget = request
            .retries
            .unwrap_or(self.settings.retry.max_attempts)
            .max(1);

        let mut last_error = None;
        for number in 1..=budget {
            let attempt = Attempt { number, budget };

            match self.send_attempt(&request).await {
                Ok(success) => {
                    debug!(attempt = attempt.number, status = success.status, "Request completed");
                    return Ok(success);
                }
                Err(error) => {
                    if error.is_session_expired() {
                        self.handle_session_expiry(&error).await;
                        return Err(error);
                    }

                    if error.is_retryable() && !attempt.is_last() {
                        let delay = attempt.backoff_delay(self.settings.retry.base_delay_ms);
                        warn!(
                            attempt = attempt.number,
                            budget = attempt.budget,
                            "Attempt failed ({}), retrying in {:?}",
                            error.error_kind(),
                            delay
                        );
                        tokio::time::sleep(delay).await;
                        last_error = Some(error);
                        continue;
                    }

                    return Err(error);
                }
            }
        }

        Err(last_error.expect("attempt budget is at least 1"))
    }

    /// One send attempt: credential prep, build, send, classify
    async fn send_attempt(&self, request: &ApiRequest) -> ApiResult<ApiSuccess> {
        let mut headers = hardening_headers();

        for (name, value) in &request.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| ApiError::Validation(format!("Invalid header name: {name}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|_| ApiError::Validation("Invalid header value".to_string()))?;
            headers.insert(name, value);
        }

        // Credential prep happens on every attempt so a refreshed token is
        // picked up between retries
        if !request.skip_auth {
            self.tokens.refresh_if_needed().await?;
            if let Some(token) = self.tokens.bearer_token().await {
                let value = HeaderValue::from_str(&format!("Bearer {token}"))
                    .map_err(|_| ApiError::Validation("Invalid bearer token".to_string()))?;
                headers.insert(AUTHORIZATION, value);
            }
        }

        let url = self.endpoint_url(&request.endpoint);
        let client = if request.is_upload() {
            &self.upload_http
        } else {
            &self.http
        };

        let mut builder = client
            .request(request.method.clone(), &url)
            .headers(headers);

        builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(body) => builder.json(body),
            RequestBody::Multipart(parts) => builder.multipart(build_form(parts)?),
        };

        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        let response = match builder.send().await {
            Ok(response) => response,
            Err(error) => return Err(self.classifier.classify_transport_error(&error)),
        };

        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();

        match self.classifier.classify_response(status, &body) {
            Disposition::Success { data, status } => Ok(ApiSuccess { data, status }),
            Disposition::Failed(error) => Err(error),
        }
    }

    /// Tear down the local session and notify the registered handler.
    /// Runs once per call chain; session expiry is terminal, never retried.
    async fn handle_session_expiry(&self, error: &ApiError) {
        self.tokens.clear_session().await;

        if error.should_log() {
            warn!("Session expired, clearing local credentials");
        }

        if let Some(handler) = &self.on_session_expired {
            handler();
        }
    }

    fn endpoint_url(&self, endpoint: &str) -> String {
        let base = self.settings.api.base_url.trim_end_matches('/');
        if endpoint.starts_with('/') {
            format!("{base}{endpoint}")
        } else {
            format!("{base}/{endpoint}")
        }
    }
}

/// Key identifying one logical mutation for the double-submission guard
fn inflight_key(request: &ApiRequest) -> String {
    let body = match &request.body {
        RequestBody::Empty => String::new(),
        RequestBody::Json(value) => value.to_string(),
        RequestBody::Multipart(parts) => parts
            .iter()
            .map(|part| format!("{}:{}", part.name, part.file_name.as_deref().unwrap_or("")))
            .collect::<Vec<_>>()
            .join(","),
    };
    format!("{} {} {}", request.method, request.endpoint, body)
}

/// The fixed hardening set attached to every request
fn hardening_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        HeaderName::from_static("x-requested-with"),
        HeaderValue::from_static("XMLHttpRequest"),
    );
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(
        HeaderName::from_static("x-content-type-options"),
        HeaderValue::from_static("nosniff"),
    );
    headers
}

/// Assemble the reqwest multipart form, letting the transport set the
/// boundary and content type
fn build_form(parts: &[crate::models::request::UploadPart]) -> ApiResult<reqwest::multipart::Form> {
    let mut form = reqwest::multipart::Form::new();

    for part in parts {
        let mut piece = match &part.data {
            PartData::Text(text) => reqwest::multipart::Part::text(text.clone()),
            PartData::Bytes(bytes) => reqwest::multipart::Part::bytes(bytes.clone()),
        };

        if let Some(file_name) = &part.file_name {
            piece = piece.file_name(file_name.clone());
        }
        if let Some(mime_type) = &part.mime_type {
            piece = piece
                .mime_str(mime_type)
                .map_err(|_| ApiError::Validation(format!("Invalid mime type: {mime_type}")))?;
        }

        form = form.part(part.name.clone(), piece);
    }

    Ok(form)
}
