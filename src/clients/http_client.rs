//! HTTP client for platform API communication.
//!
//! This module provides the [`HttpClient`] type, the reqwest-backed
//! [`Transport`] used by resource clients.

use std::collections::HashMap;
use std::time::Duration;

use reqwest::multipart::{Form, Part};

use crate::clients::errors::{HttpError, HttpResponseError, MaxHttpRetriesExceededError};
use crate::clients::http_request::{HttpMethod, HttpRequest, RequestBody};
use crate::clients::http_response::HttpResponse;
use crate::clients::transport::Transport;
use crate::config::{BaseUrl, LosConfig};
use crate::rest::{MultipartPayload, MultipartPart};

/// Fixed retry wait time in seconds.
pub const RETRY_WAIT_TIME: u64 = 1;

/// SDK version from Cargo.toml.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// HTTP client for making requests to the platform API.
///
/// The client handles:
/// - URL construction from the configured base URL
/// - Default headers including User-Agent and the API key
/// - Retry logic for 429 and 5xx responses
/// - Conversion of non-2xx responses into [`HttpError`]
///
/// # Thread Safety
///
/// `HttpClient` is `Send + Sync`, making it safe to share across async tasks.
///
/// # Example
///
/// ```rust,ignore
/// use los_api::{BaseUrl, HttpClient, HttpRequest, HttpMethod};
///
/// let client = HttpClient::new(BaseUrl::new("https://api.example.com")?, None)?;
///
/// let request = HttpRequest::builder(HttpMethod::Get, "/application-statuses")
///     .query_param("productId", "p-1")
///     .build()?;
///
/// let response = client.request(request).await?;
/// ```
#[derive(Debug)]
pub struct HttpClient {
    client: reqwest::Client,
    base_url: BaseUrl,
    default_headers: HashMap<String, String>,
    default_tries: u32,
}

// Verify HttpClient is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<HttpClient>();
};

impl HttpClient {
    /// Creates a new HTTP client for the given base URL.
    ///
    /// # Arguments
    ///
    /// * `base_url` - The URL every request path is joined onto
    /// * `config` - Optional configuration for the API key, retries, timeout
    ///   and `user_agent_prefix`
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Network`] if the underlying reqwest client cannot
    /// be created (e.g. TLS initialization failure).
    pub fn new(base_url: BaseUrl, config: Option<&LosConfig>) -> Result<Self, HttpError> {
        let user_agent_prefix = config
            .and_then(LosConfig::user_agent_prefix)
            .map_or(String::new(), |prefix| format!("{prefix} | "));
        let user_agent = format!("{user_agent_prefix}LOS API Library v{SDK_VERSION} | Rust");

        let mut default_headers = HashMap::new();
        default_headers.insert("User-Agent".to_string(), user_agent);
        default_headers.insert("Accept".to_string(), "application/json".to_string());

        if let Some(api_key) = config.and_then(LosConfig::api_key) {
            default_headers.insert(
                "Authorization".to_string(),
                format!("Bearer {}", api_key.as_ref()),
            );
        }

        let mut builder = reqwest::Client::builder().use_rustls_tls();
        if let Some(timeout) = config.and_then(LosConfig::timeout) {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            base_url,
            default_headers,
            default_tries: config.map_or(1, LosConfig::tries),
        })
    }

    /// Creates a client for the platform API described by `config`.
    ///
    /// # Errors
    ///
    /// See [`HttpClient::new`].
    pub fn from_config(config: &LosConfig) -> Result<Self, HttpError> {
        Self::new(config.base_url().clone(), Some(config))
    }

    /// Creates a client for the accounts (auth) service described by `config`.
    ///
    /// # Errors
    ///
    /// See [`HttpClient::new`].
    pub fn auth_from_config(config: &LosConfig) -> Result<Self, HttpError> {
        Self::new(config.auth_base_url().clone(), Some(config))
    }

    /// Returns the base URL for this client.
    #[must_use]
    pub const fn base_url(&self) -> &BaseUrl {
        &self.base_url
    }

    /// Returns the default headers for this client.
    #[must_use]
    pub const fn default_headers(&self) -> &HashMap<String, String> {
        &self.default_headers
    }

    /// Sends an HTTP request to the platform API.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] if:
    /// - Request validation fails (`InvalidRequest`)
    /// - Network error or timeout occurs (`Network`)
    /// - Non-2xx response received (`Response`)
    /// - Max retries exceeded (`MaxRetries`)
    pub async fn request(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        request.verify()?;

        let url = self.base_url.join(&request.path);

        let mut headers = self.default_headers.clone();
        if let Some(content_type) = request.body.as_ref().and_then(RequestBody::content_type) {
            headers.insert("Content-Type".to_string(), content_type.to_string());
        }
        if let Some(extra) = &request.extra_headers {
            for (key, value) in extra {
                headers.insert(key.clone(), value.clone());
            }
        }

        let max_tries = request.tries.max(self.default_tries);
        let mut tries: u32 = 0;
        loop {
            tries += 1;

            let mut req_builder = match request.http_method {
                HttpMethod::Get => self.client.get(&url),
                HttpMethod::Post => self.client.post(&url),
                HttpMethod::Put => self.client.put(&url),
                HttpMethod::Delete => self.client.delete(&url),
            };

            for (key, value) in &headers {
                req_builder = req_builder.header(key, value);
            }

            if !request.query.is_empty() {
                req_builder = req_builder.query(&request.query);
            }

            // Forms are single-use, so multipart bodies are rebuilt per attempt
            match &request.body {
                Some(RequestBody::Json(body)) => req_builder = req_builder.body(body.to_string()),
                Some(RequestBody::Multipart(payload)) => {
                    req_builder = req_builder.multipart(multipart_form(payload));
                }
                None => {}
            }

            let res = req_builder.send().await?;

            let code = res.status().as_u16();
            let res_headers = Self::parse_response_headers(res.headers());
            let body_text = res.text().await?;
            let body = Self::parse_body(code, &body_text);

            let response = HttpResponse::new(code, res_headers, body);

            if response.is_ok() {
                return Ok(response);
            }

            let error_message = Self::serialize_error(&response);
            let error_reference = response.request_id().map(String::from);

            if !response.is_retryable() || tries >= max_tries {
                if response.is_retryable() && max_tries > 1 {
                    return Err(HttpError::MaxRetries(MaxHttpRetriesExceededError {
                        code,
                        tries: max_tries,
                        message: error_message,
                        error_reference,
                    }));
                }
                return Err(HttpError::Response(HttpResponseError {
                    code,
                    message: error_message,
                    error_reference,
                }));
            }

            let delay = Self::calculate_retry_delay(&response);
            tracing::warn!(
                "Request to {} failed with status {}, retrying in {:?} (attempt {} of {})",
                request.path,
                code,
                delay,
                tries,
                max_tries
            );
            tokio::time::sleep(delay).await;
        }
    }

    fn parse_body(code: u16, body_text: &str) -> serde_json::Value {
        if body_text.trim().is_empty() {
            return serde_json::Value::Null;
        }
        serde_json::from_str(body_text).unwrap_or_else(|_| {
            if (200..300).contains(&code) || code >= 500 {
                serde_json::json!({ "raw_body": body_text })
            } else {
                serde_json::json!({})
            }
        })
    }

    fn parse_response_headers(
        headers: &reqwest::header::HeaderMap,
    ) -> HashMap<String, Vec<String>> {
        let mut result: HashMap<String, Vec<String>> = HashMap::new();
        for (name, value) in headers {
            let key = name.as_str().to_lowercase();
            let value = value.to_str().unwrap_or_default().to_string();
            result.entry(key).or_default().push(value);
        }
        result
    }

    /// 429 honours `Retry-After`; everything else waits the fixed delay.
    fn calculate_retry_delay(response: &HttpResponse) -> Duration {
        if response.code == 429 {
            if let Some(delay) = response
                .retry_request_after
                .and_then(|seconds| Duration::try_from_secs_f64(seconds).ok())
            {
                return delay;
            }
        }
        Duration::from_secs(RETRY_WAIT_TIME)
    }

    fn serialize_error(response: &HttpResponse) -> String {
        let mut error_body = serde_json::Map::new();

        for key in ["message", "error", "errors"] {
            if let Some(value) = response.body.get(key) {
                error_body.insert(key.to_string(), value.clone());
            }
        }

        if let Some(request_id) = response.request_id() {
            error_body.insert(
                "error_reference".to_string(),
                serde_json::json!(format!(
                    "If you report this error, please include this id: {request_id}."
                )),
            );
        }

        serde_json::to_string(&error_body).unwrap_or_else(|_| "{}".to_string())
    }
}

impl Transport for HttpClient {
    async fn perform(&self, request: HttpRequest) -> Result<serde_json::Value, HttpError> {
        self.request(request).await.map(HttpResponse::into_body)
    }
}

/// Converts a multipart payload into a reqwest form, preserving part order.
fn multipart_form(payload: &MultipartPayload) -> Form {
    payload
        .parts()
        .iter()
        .fold(Form::new(), |form, part| match part {
            MultipartPart::Text { name, value } => form.text(name.clone(), value.clone()),
            MultipartPart::File {
                name,
                bytes,
                file_name,
            } => form.part(
                name.clone(),
                Part::bytes(bytes.clone()).file_name(file_name.clone()),
            ),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiKey;

    fn base_url() -> BaseUrl {
        BaseUrl::new("https://api.example.com").unwrap()
    }

    #[test]
    fn test_client_construction() {
        let client = HttpClient::new(base_url(), None).unwrap();
        assert_eq!(client.base_url().as_ref(), "https://api.example.com");
    }

    #[test]
    fn test_user_agent_header_format() {
        let client = HttpClient::new(base_url(), None).unwrap();

        let user_agent = client.default_headers().get("User-Agent").unwrap();
        assert!(user_agent.contains("LOS API Library v"));
        assert!(user_agent.contains("Rust"));
    }

    #[test]
    fn test_user_agent_with_prefix() {
        let config = LosConfig::builder()
            .base_url(base_url())
            .user_agent_prefix("MyApp/1.0")
            .build()
            .unwrap();

        let client = HttpClient::from_config(&config).unwrap();
        let user_agent = client.default_headers().get("User-Agent").unwrap();
        assert!(user_agent.starts_with("MyApp/1.0 | "));
    }

    #[test]
    fn test_api_key_header_injection() {
        let config = LosConfig::builder()
            .base_url(base_url())
            .api_key(ApiKey::new("key-123").unwrap())
            .build()
            .unwrap();

        let client = HttpClient::from_config(&config).unwrap();
        assert_eq!(
            client.default_headers().get("Authorization"),
            Some(&"Bearer key-123".to_string())
        );
    }

    #[test]
    fn test_no_authorization_header_without_api_key() {
        let client = HttpClient::new(base_url(), None).unwrap();
        assert!(client.default_headers().get("Authorization").is_none());
    }

    #[test]
    fn test_auth_client_uses_auth_base_url() {
        let config = LosConfig::builder()
            .base_url(base_url())
            .auth_base_url(BaseUrl::new("https://auth.example.com").unwrap())
            .build()
            .unwrap();

        let client = HttpClient::auth_from_config(&config).unwrap();
        assert_eq!(client.base_url().as_ref(), "https://auth.example.com");
    }

    #[test]
    fn test_parse_body_variants() {
        assert_eq!(HttpClient::parse_body(204, ""), serde_json::Value::Null);
        assert_eq!(
            HttpClient::parse_body(200, r#"{"id":"1"}"#),
            serde_json::json!({"id": "1"})
        );
        assert_eq!(
            HttpClient::parse_body(200, "ok"),
            serde_json::json!({"raw_body": "ok"})
        );
        assert_eq!(HttpClient::parse_body(404, "nope"), serde_json::json!({}));
    }

    #[test]
    fn test_serialize_error_includes_message_and_reference() {
        let mut headers = HashMap::new();
        headers.insert("x-request-id".to_string(), vec!["req-9".to_string()]);
        let response = HttpResponse::new(
            400,
            headers,
            serde_json::json!({"message": "bad filter", "other": 1}),
        );

        let message = HttpClient::serialize_error(&response);
        assert!(message.contains("bad filter"));
        assert!(message.contains("req-9"));
        assert!(!message.contains("other"));
    }

    fn rate_limited(retry_after: &str) -> HttpResponse {
        let mut headers = HashMap::new();
        headers.insert("retry-after".to_string(), vec![retry_after.to_string()]);
        HttpResponse::new(429, headers, serde_json::json!({}))
    }

    #[test]
    fn test_retry_delay_honours_retry_after() {
        assert_eq!(
            HttpClient::calculate_retry_delay(&rate_limited("2.5")),
            Duration::from_millis(2500)
        );
    }

    #[test]
    fn test_retry_delay_falls_back_when_retry_after_overflows() {
        assert_eq!(
            HttpClient::calculate_retry_delay(&rate_limited("1e20")),
            Duration::from_secs(RETRY_WAIT_TIME)
        );
    }

    #[test]
    fn test_retry_delay_ignores_retry_after_on_server_errors() {
        let mut headers = HashMap::new();
        headers.insert("retry-after".to_string(), vec!["30".to_string()]);
        let response = HttpResponse::new(503, headers, serde_json::json!({}));
        assert_eq!(
            HttpClient::calculate_retry_delay(&response),
            Duration::from_secs(RETRY_WAIT_TIME)
        );
    }

    #[test]
    fn test_client_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<HttpClient>();
    }
}
