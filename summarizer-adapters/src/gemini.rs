//! Google Gemini adapter.

use std::{env, fmt, time::Duration};

use async_trait::async_trait;
use futures::stream;
use hyper::body::to_bytes;
use hyper::header::CONTENT_TYPE;
use hyper::{Body, Request, StatusCode, Uri};
use serde::{Deserialize, Serialize};
use tokio::time::timeout;
use tracing::debug;

use crate::http_client::{HyperClient, build_https_client};
use crate::traits::{
    AdapterError, AdapterMetadata, AdapterResult, AdapterStream, InferenceChunk, InferenceRequest,
    ModelAdapter,
};

/// Environment variable holding the Gemini API key.
pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Configuration for the Gemini adapter.
#[derive(Clone)]
pub struct GeminiConfig {
    api_key: Option<String>,
    model: String,
    base_url: String,
    timeout: Duration,
    default_temperature: Option<f32>,
}

impl fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("has_api_key", &self.api_key.is_some())
            .finish_non_exhaustive()
    }
}

impl GeminiConfig {
    /// Creates a configuration using the supplied model identifier.
    ///
    /// Both `gemini-1.5-flash` and `models/gemini-1.5-flash` are accepted.
    #[must_use]
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            api_key: None,
            model: model.into(),
            base_url: "https://generativelanguage.googleapis.com/".to_owned(),
            timeout: Duration::from_secs(60),
            default_temperature: None,
        }
    }

    /// Loads the API key from the `GEMINI_API_KEY` environment variable.
    ///
    /// Blank values are treated as absent.
    #[must_use]
    pub fn from_env(model: impl Into<String>) -> Self {
        let cfg = Self::new(model);
        match env::var(GEMINI_API_KEY_ENV) {
            Ok(key) => cfg.with_api_key(key),
            Err(_) => cfg,
        }
    }

    /// Overrides the base URL used for API calls.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::Configuration`] if the supplied URL is invalid.
    pub fn with_base_url(mut self, base_url: impl AsRef<str>) -> AdapterResult<Self> {
        self.base_url = sanitize_base_url(base_url.as_ref())?;
        Ok(self)
    }

    /// Sets the default sampling temperature used when requests omit it.
    #[must_use]
    pub fn with_default_temperature(mut self, temperature: f32) -> Self {
        self.default_temperature = Some(temperature);
        self
    }

    /// Sets the HTTP request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Supplies an explicit API key. Blank keys clear it.
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        let key = key.into();
        self.api_key = (!key.trim().is_empty()).then_some(key);
        self
    }

    /// Whether an API key is configured.
    #[must_use]
    pub const fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Returns the configured model identifier.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }
}

/// Google Gemini adapter that calls the `generateContent` API over HTTPS.
pub struct GeminiAdapter {
    client: HyperClient,
    base_endpoint: String,
    metadata: AdapterMetadata,
    api_key: String,
    timeout: Duration,
    default_temperature: Option<f32>,
}

impl fmt::Debug for GeminiAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiAdapter")
            .field("model", &self.metadata.model())
            .field("base_endpoint", &self.base_endpoint)
            .finish_non_exhaustive()
    }
}

impl GeminiAdapter {
    /// Constructs a new adapter with the provided configuration.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::MissingCredential`] if the API key is missing.
    pub fn new(config: GeminiConfig) -> AdapterResult<Self> {
        let api_key = config.api_key.ok_or(AdapterError::MissingCredential {
            variable: GEMINI_API_KEY_ENV,
        })?;

        let model_path = config
            .model
            .strip_prefix("models/")
            .unwrap_or(&config.model);
        let base_endpoint = format!(
            "{}v1beta/models/{model_path}:generateContent",
            config.base_url
        );
        let metadata = AdapterMetadata::new("gemini", config.model.clone());

        let client = build_https_client()?;

        Ok(Self {
            client,
            base_endpoint,
            metadata,
            api_key,
            timeout: config.timeout,
            default_temperature: config.default_temperature,
        })
    }

    fn build_request(&self, request: &InferenceRequest) -> GenerateContentRequest {
        let temperature = request.temperature().or(self.default_temperature);
        let generation_config =
            if temperature.is_some() || request.max_output_tokens().is_some() {
                Some(GenerationConfig {
                    temperature,
                    max_output_tokens: request.max_output_tokens(),
                })
            } else {
                None
            };

        GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_owned(),
                parts: vec![Part {
                    text: request.prompt().to_owned(),
                }],
            }],
            generation_config,
        }
    }

    fn build_uri(&self) -> AdapterResult<Uri> {
        format!("{}?key={}", self.base_endpoint, self.api_key)
            .parse::<Uri>()
            .map_err(|err| AdapterError::configuration(format!("invalid Gemini endpoint: {err}")))
    }
}

#[async_trait]
impl ModelAdapter for GeminiAdapter {
    fn metadata(&self) -> &AdapterMetadata {
        &self.metadata
    }

    async fn infer(&self, request: InferenceRequest) -> AdapterResult<AdapterStream> {
        let payload = self.build_request(&request);
        let body = serde_json::to_vec(&payload).map_err(|err| {
            AdapterError::invalid_request(format!("failed to encode Gemini request: {err}"))
        })?;

        let endpoint = self.build_uri()?;
        debug!(model = self.metadata.model(), bytes = body.len(), "sending Gemini request");

        let req = Request::post(endpoint)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .map_err(|err| {
                AdapterError::transport(format!("failed to build Gemini request: {err}"))
            })?;

        let response = timeout(self.timeout, self.client.request(req))
            .await
            .map_err(|_| AdapterError::transport("Gemini request timed out"))?
            .map_err(|err| AdapterError::transport(format!("Gemini request failed: {err}")))?;

        let status = response.status();
        let bytes = to_bytes(response.into_body()).await.map_err(|err| {
            AdapterError::transport(format!("failed to read Gemini response: {err}"))
        })?;

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(AdapterError::RateLimited { retry_after: None });
        }
        if !status.is_success() {
            let reason = String::from_utf8_lossy(&bytes).to_string();
            return Err(AdapterError::response(format!(
                "Gemini returned {status}: {reason}"
            )));
        }

        let content = parse_response(&bytes)?;
        let stream = stream::once(async move { Ok(InferenceChunk::new(content, true)) });
        Ok(Box::pin(stream))
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    role: String,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}

fn parse_response(bytes: &[u8]) -> AdapterResult<String> {
    let response: GenerateContentResponse = serde_json::from_slice(bytes)
        .map_err(|err| AdapterError::response(format!("failed to decode Gemini response: {err}")))?;

    if response.candidates.is_empty() {
        return Err(AdapterError::response("Gemini returned no candidates"));
    }

    Ok(response
        .candidates
        .into_iter()
        .flat_map(|candidate| candidate.content.parts)
        .map(|part| part.text)
        .collect::<Vec<_>>()
        .join("\n"))
}

fn sanitize_base_url(input: &str) -> AdapterResult<String> {
    let mut base = input.trim().to_owned();
    if !(base.starts_with("http://") || base.starts_with("https://")) {
        return Err(AdapterError::configuration(
            "Gemini base URL must start with http:// or https://",
        ));
    }
    if !base.ends_with('/') {
        base.push('/');
    }
    base.parse::<Uri>()
        .map_err(|err| AdapterError::configuration(format!("invalid Gemini base URL: {err}")))?;
    Ok(base)
}
