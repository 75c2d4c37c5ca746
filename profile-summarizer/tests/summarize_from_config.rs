#![cfg(feature = "agent")]

use std::fs;
use std::sync::Arc;

use async_trait::async_trait;
use futures::stream;
use profile_summarizer::adapters::traits::{
    AdapterMetadata, AdapterResult, AdapterStream, InferenceChunk, InferenceRequest, ModelAdapter,
};
use profile_summarizer::agent::{
    NormalizeOptions, ProfileRecord, ProfileSummarizer, SummarizerError, SummarizerSettings,
};
use profile_summarizer::config::ConfigError;
use tempfile::tempdir;

/// Echoes the prompt it receives, wrapped in a scaffold the agent must strip.
struct EchoAdapter {
    metadata: AdapterMetadata,
}

impl EchoAdapter {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            metadata: AdapterMetadata::new("test", "echo"),
        })
    }
}

#[async_trait]
impl ModelAdapter for EchoAdapter {
    fn metadata(&self) -> &AdapterMetadata {
        &self.metadata
    }

    async fn infer(&self, request: InferenceRequest) -> AdapterResult<AdapterStream> {
        let text = format!("{}\nProfiles: {}", request.prompt(), request.prompt().lines().count());
        let chunk = InferenceChunk::new(text, true);
        Ok(Box::pin(stream::once(async move { Ok(chunk) })))
    }
}

#[tokio::test]
async fn pointer_chain_config_drives_agent() {
    let dir = tempdir().unwrap();
    let configs = dir.path().join("configs");
    fs::create_dir(&configs).unwrap();

    fs::write(configs.join("prompt.txt"), "  Summarise the people below.\n").unwrap();
    fs::write(
        configs.join("config.txt"),
        "# authoritative settings\ntemp=0.2\nmodel_name=models/gemini-1.5-flash-latest\nprompt=@@prompt.txt\n",
    )
    .unwrap();
    fs::write(configs.join("config.json"), r#""@@config.txt""#).unwrap();

    let config = profile_summarizer::load(configs.join("config.json")).unwrap();
    let settings = SummarizerSettings::from_config(&config).unwrap();
    assert_eq!(settings.prompt, "Summarise the people below.");

    let mut agent = ProfileSummarizer::with_adapter(settings, EchoAdapter::new());
    agent.append_input(ProfileRecord::new().with("first_name", "Layla").with("age", 28));
    agent.append_input(ProfileRecord::new().with("first_name", "Kai").with("age", 34));

    assert_eq!(
        agent.render_block(),
        "age: 28\nfirst_name: Layla\n\nage: 34\nfirst_name: Kai"
    );

    // The echoed prompt ends with the "Summary:" scaffold, so only the text
    // after it survives.
    let summary = agent.process().await.unwrap();
    assert_eq!(summary, "Profiles: 10");
    assert_eq!(agent.final_result(), Some("Profiles: 10"));
    assert!(agent.pending().is_empty());
}

#[tokio::test]
async fn json_profiles_are_queued() {
    let dir = tempdir().unwrap();
    let profiles = dir.path().join("profiles.json");
    fs::write(
        &profiles,
        r#"[{"First_Name": " Layla ", "Hobbies": [" kickboxing "]}, {"first_name": "Kai"}]"#,
    )
    .unwrap();

    let settings = SummarizerSettings {
        temperature: 0.0,
        model_name: "static".to_owned(),
        prompt: "Summarise.".to_owned(),
    };
    let mut agent = ProfileSummarizer::with_adapter(settings, EchoAdapter::new());
    let queued = agent
        .append_input_from_json(&profiles, NormalizeOptions::default())
        .unwrap();

    assert_eq!(queued, 2);
    assert_eq!(
        agent.render_block(),
        "first_name: Layla\nhobbies: kickboxing\n\nfirst_name: Kai"
    );
}

#[test]
fn config_errors_surface_through_agent() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.txt");
    fs::write(&path, "temp=0.1\nthis line is broken\n").unwrap();

    let err = ProfileSummarizer::from_config_file(&path).unwrap_err();
    assert!(matches!(
        err,
        SummarizerError::Config(ConfigError::MalformedLine { line_number: 2, .. })
    ));
}

#[cfg(not(feature = "yaml"))]
#[test]
fn yaml_needs_the_yaml_feature_with_agent_enabled() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.yaml");
    fs::write(&path, "temp: 0.2\nmodel_name: m\nprompt: p\n").unwrap();

    let err = ProfileSummarizer::from_config_file(&path).unwrap_err();
    assert!(matches!(
        err,
        SummarizerError::Config(ConfigError::MissingOptionalDependency { feature: "yaml", .. })
    ));
}
