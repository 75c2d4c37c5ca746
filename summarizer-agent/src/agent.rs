//! The profile summarizer agent.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use summarizer_adapters::gemini::{GEMINI_API_KEY_ENV, GeminiAdapter, GeminiConfig};
use summarizer_adapters::traits::ModelAdapter;
use summarizer_config::{ConfigLoader, ResolvedConfig};
use tracing::{debug, info};

use crate::error::{SummarizerError, SummarizerResult};
use crate::profile::{NormalizeOptions, ProfileRecord, read_json_records};
use crate::render::{compose_prompt, extract_summary, render_block};

/// Config key holding the sampling temperature.
pub const TEMPERATURE_KEY: &str = "temp";
/// Config key holding the model identifier.
pub const MODEL_KEY: &str = "model_name";
/// Config key holding the base prompt.
pub const PROMPT_KEY: &str = "prompt";

/// Settings read from a resolved configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct SummarizerSettings {
    /// Sampling temperature.
    pub temperature: f32,
    /// Model identifier passed to the backend.
    pub model_name: String,
    /// Base prompt; leading and trailing whitespace is removed.
    pub prompt: String,
}

impl SummarizerSettings {
    /// Extracts `temp`, `model_name` and `prompt` from `config`.
    ///
    /// Integer temperatures are widened. Other keys are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`SummarizerError::Config`] if a key is missing or mistyped.
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_config(config: &ResolvedConfig) -> SummarizerResult<Self> {
        let temperature = config.require_f64(TEMPERATURE_KEY)? as f32;
        let model_name = config.require_str(MODEL_KEY)?.to_owned();
        let prompt = config.require_str(PROMPT_KEY)?.trim().to_owned();

        let extra = config
            .iter()
            .filter(|(key, _)| ![TEMPERATURE_KEY, MODEL_KEY, PROMPT_KEY].contains(&key.as_str()))
            .count();
        if extra > 0 {
            debug!(extra, "ignoring unused config keys");
        }

        Ok(Self {
            temperature,
            model_name,
            prompt,
        })
    }
}

/// Queues profile records and summarizes them with one model call.
pub struct ProfileSummarizer {
    settings: SummarizerSettings,
    adapter: Arc<dyn ModelAdapter>,
    inputs: Vec<ProfileRecord>,
    last_summary: Option<String>,
}

impl fmt::Debug for ProfileSummarizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProfileSummarizer")
            .field("settings", &self.settings)
            .field("provider", &self.adapter.metadata().provider())
            .field("queued", &self.inputs.len())
            .finish_non_exhaustive()
    }
}

impl ProfileSummarizer {
    /// Loads the configuration at `path` and builds a Gemini-backed agent.
    ///
    /// # Errors
    ///
    /// Returns configuration errors, or [`SummarizerError::MissingCredential`]
    /// when `GEMINI_API_KEY` is not set.
    pub fn from_config_file(path: impl AsRef<Path>) -> SummarizerResult<Self> {
        let config = ConfigLoader::new().load(path)?;
        Self::from_config(&config)
    }

    /// Builds a Gemini-backed agent, reading the API key from the environment.
    ///
    /// # Errors
    ///
    /// See [`ProfileSummarizer::with_credential`].
    pub fn from_config(config: &ResolvedConfig) -> SummarizerResult<Self> {
        let settings = SummarizerSettings::from_config(config)?;
        let gemini = GeminiConfig::from_env(settings.model_name.clone());
        Self::with_gemini(settings, gemini)
    }

    /// Builds a Gemini-backed agent with an explicit API key.
    ///
    /// # Errors
    ///
    /// Returns [`SummarizerError::MissingCredential`] when `api_key` is
    /// `None` or blank, configuration errors for missing keys, and adapter
    /// errors if the HTTP client cannot be built.
    pub fn with_credential(config: &ResolvedConfig, api_key: Option<String>) -> SummarizerResult<Self> {
        let settings = SummarizerSettings::from_config(config)?;
        let mut gemini = GeminiConfig::new(settings.model_name.clone());
        if let Some(key) = api_key {
            gemini = gemini.with_api_key(key);
        }
        Self::with_gemini(settings, gemini)
    }

    fn with_gemini(settings: SummarizerSettings, gemini: GeminiConfig) -> SummarizerResult<Self> {
        if !gemini.has_api_key() {
            return Err(SummarizerError::MissingCredential {
                variable: GEMINI_API_KEY_ENV,
            });
        }
        debug!(model = gemini.model(), "building Gemini adapter");

        let adapter = GeminiAdapter::new(gemini.with_default_temperature(settings.temperature))?;
        Ok(Self::with_adapter(settings, Arc::new(adapter)))
    }

    /// Builds an agent on top of any backend.
    #[must_use]
    pub fn with_adapter(settings: SummarizerSettings, adapter: Arc<dyn ModelAdapter>) -> Self {
        info!(
            provider = adapter.metadata().provider(),
            model = %settings.model_name,
            temperature = settings.temperature,
            "profile summarizer ready"
        );
        Self {
            settings,
            adapter,
            inputs: Vec::new(),
            last_summary: None,
        }
    }

    /// Returns the active settings.
    #[must_use]
    pub const fn settings(&self) -> &SummarizerSettings {
        &self.settings
    }

    /// Queues a single profile record.
    pub fn append_input(&mut self, record: ProfileRecord) {
        self.inputs.push(record);
    }

    /// Queues one or many records read from a JSON file.
    ///
    /// The file may hold an object (one record) or a list of objects.
    ///
    /// # Errors
    ///
    /// Returns [`SummarizerError::Io`] or [`SummarizerError::InvalidProfile`];
    /// nothing is queued on failure.
    pub fn append_input_from_json(
        &mut self,
        path: impl AsRef<Path>,
        options: NormalizeOptions,
    ) -> SummarizerResult<usize> {
        let records = read_json_records(path.as_ref(), options)?;
        let count = records.len();
        self.inputs.extend(records);
        debug!(path = %path.as_ref().display(), count, "queued profile records");
        Ok(count)
    }

    /// Records waiting for the next [`process`](Self::process) call.
    #[must_use]
    pub fn pending(&self) -> &[ProfileRecord] {
        &self.inputs
    }

    /// Renders the queued records as they will be sent to the model.
    #[must_use]
    pub fn render_block(&self) -> String {
        render_block(&self.inputs)
    }

    /// Summarizes every queued record with one backend call.
    ///
    /// On success the queue is cleared and the summary is kept for
    /// [`final_result`](Self::final_result). On failure the queue is left
    /// intact.
    ///
    /// # Errors
    ///
    /// Returns [`SummarizerError::EmptyQueue`] when nothing is queued and
    /// [`SummarizerError::Adapter`] when the backend fails.
    pub async fn process(&mut self) -> SummarizerResult<String> {
        if self.inputs.is_empty() {
            return Err(SummarizerError::EmptyQueue);
        }

        let block = self.render_block();
        let prompt = compose_prompt(&self.settings.prompt, &block);
        debug!(records = self.inputs.len(), prompt_len = prompt.len(), "invoking model");

        let raw = self
            .adapter
            .generate(&prompt, self.settings.temperature)
            .await?;
        let summary = extract_summary(&raw);

        self.inputs.clear();
        self.last_summary = Some(summary.clone());
        Ok(summary)
    }

    /// The most recent summary, if any.
    #[must_use]
    pub fn final_result(&self) -> Option<&str> {
        self.last_summary.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Mutex;

    use async_trait::async_trait;
    use futures::stream;
    use summarizer_adapters::traits::{
        AdapterError, AdapterMetadata, AdapterResult, AdapterStream, InferenceChunk,
        InferenceRequest,
    };
    use summarizer_config::{ConfigError, ConfigValue, Mapping};

    struct StaticAdapter {
        metadata: AdapterMetadata,
        response: String,
        prompts: Mutex<Vec<InferenceRequest>>,
    }

    impl StaticAdapter {
        fn new(response: impl Into<String>) -> Arc<Self> {
            Arc::new(Self {
                metadata: AdapterMetadata::new("test", "static"),
                response: response.into(),
                prompts: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl ModelAdapter for StaticAdapter {
        fn metadata(&self) -> &AdapterMetadata {
            &self.metadata
        }

        async fn infer(&self, request: InferenceRequest) -> AdapterResult<AdapterStream> {
            self.prompts.lock().unwrap().push(request);
            let chunk = InferenceChunk::new(self.response.clone(), true);
            Ok(Box::pin(stream::once(async move { Ok(chunk) })))
        }
    }

    struct FailingAdapter {
        metadata: AdapterMetadata,
    }

    #[async_trait]
    impl ModelAdapter for FailingAdapter {
        fn metadata(&self) -> &AdapterMetadata {
            &self.metadata
        }

        async fn infer(&self, _request: InferenceRequest) -> AdapterResult<AdapterStream> {
            Err(AdapterError::transport("offline"))
        }
    }

    fn settings() -> SummarizerSettings {
        SummarizerSettings {
            temperature: 0.0,
            model_name: "models/gemini-1.5-flash-latest".to_owned(),
            prompt: "Summarise attributes. Return ONLY the final paragraph.".to_owned(),
        }
    }

    fn config(entries: &[(&str, ConfigValue)]) -> ResolvedConfig {
        let values: Mapping = entries
            .iter()
            .map(|(key, value)| ((*key).to_owned(), value.clone()))
            .collect();
        ResolvedConfig::new(values, "/cfg/config.txt")
    }

    #[tokio::test]
    async fn process_clears_queue_and_keeps_result() {
        let mut agent = ProfileSummarizer::with_adapter(settings(), StaticAdapter::new("Result 1"));
        agent.append_input(ProfileRecord::new().with("a", 1));

        assert_eq!(agent.process().await.unwrap(), "Result 1");
        assert_eq!(agent.final_result(), Some("Result 1"));
        assert!(agent.pending().is_empty());
    }

    #[tokio::test]
    async fn final_result_tracks_latest_call() {
        let mut agent = ProfileSummarizer::with_adapter(settings(), StaticAdapter::new("Result 1"));
        agent.append_input(ProfileRecord::new().with("a", 1));
        agent.process().await.unwrap();

        agent.adapter = StaticAdapter::new("Result 2");
        agent.append_input(ProfileRecord::new().with("b", 2));
        assert_eq!(agent.process().await.unwrap(), "Result 2");
        assert_eq!(agent.final_result(), Some("Result 2"));
    }

    #[tokio::test]
    async fn empty_queue_is_rejected() {
        let mut agent = ProfileSummarizer::with_adapter(settings(), StaticAdapter::new("unused"));
        let err = agent.process().await.unwrap_err();
        assert!(matches!(err, SummarizerError::EmptyQueue));
        assert_eq!(agent.final_result(), None);
    }

    #[tokio::test]
    async fn prompt_includes_scaffold_and_temperature() {
        let adapter = StaticAdapter::new("Summary: done");
        let mut agent = ProfileSummarizer::with_adapter(
            SummarizerSettings {
                temperature: 0.5,
                ..settings()
            },
            Arc::clone(&adapter) as Arc<dyn ModelAdapter>,
        );
        agent.append_input(ProfileRecord::new().with("first_name", "Jian").with("age", 33));

        assert_eq!(agent.process().await.unwrap(), "done");

        let requests = adapter.prompts.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].temperature(), Some(0.5));
        assert_eq!(
            requests[0].prompt(),
            "Summarise attributes. Return ONLY the final paragraph.\n\nUser attributes:\nage: 33\nfirst_name: Jian\n\nSummary:"
        );
    }

    #[tokio::test]
    async fn backend_failure_keeps_queue() {
        let adapter = Arc::new(FailingAdapter {
            metadata: AdapterMetadata::new("test", "failing"),
        });
        let mut agent = ProfileSummarizer::with_adapter(settings(), adapter);
        agent.append_input(ProfileRecord::new().with("a", 1));

        let err = agent.process().await.unwrap_err();
        assert!(matches!(err, SummarizerError::Adapter { .. }));
        assert_eq!(agent.pending().len(), 1);
    }

    #[test]
    fn settings_require_keys() {
        let cfg = config(&[
            ("temp", ConfigValue::Integer(1)),
            ("model_name", ConfigValue::from("m")),
            ("prompt", ConfigValue::from("  trimmed prompt \n")),
            ("unused", ConfigValue::Bool(true)),
        ]);
        let settings = SummarizerSettings::from_config(&cfg).unwrap();
        assert!((settings.temperature - 1.0).abs() < f32::EPSILON);
        assert_eq!(settings.prompt, "trimmed prompt");

        let cfg = config(&[("temp", ConfigValue::Float(0.2)), ("model_name", ConfigValue::from("m"))]);
        let err = SummarizerSettings::from_config(&cfg).unwrap_err();
        assert!(matches!(
            err,
            SummarizerError::Config(ConfigError::MissingKey { .. })
        ));
    }

    #[test]
    fn missing_api_key_is_missing_credential() {
        let cfg = config(&[
            ("temp", ConfigValue::Float(0.1)),
            ("model_name", ConfigValue::from("m")),
            ("prompt", ConfigValue::from("p")),
        ]);
        let err = ProfileSummarizer::with_credential(&cfg, None).unwrap_err();
        assert!(matches!(
            err,
            SummarizerError::MissingCredential {
                variable: "GEMINI_API_KEY"
            }
        ));
    }

    #[test]
    fn blank_api_key_is_missing_credential() {
        let cfg = config(&[
            ("temp", ConfigValue::Float(0.1)),
            ("model_name", ConfigValue::from("m")),
            ("prompt", ConfigValue::from("p")),
        ]);
        let err = ProfileSummarizer::with_credential(&cfg, Some("  ".into())).unwrap_err();
        assert!(matches!(err, SummarizerError::MissingCredential { .. }));
    }

    #[test]
    fn explicit_api_key_builds_gemini_agent() {
        let cfg = config(&[
            ("temp", ConfigValue::Float(0.1)),
            ("model_name", ConfigValue::from("models/gemini-1.5-flash-latest")),
            ("prompt", ConfigValue::from("p")),
        ]);
        let agent = ProfileSummarizer::with_credential(&cfg, Some("test-key".into())).unwrap();
        assert_eq!(agent.settings().model_name, "models/gemini-1.5-flash-latest");
        assert_eq!(agent.adapter.metadata().provider(), "gemini");
    }
}
