//! Summarizes demo profiles, or profiles read from a file, with Gemini.
//!
//! ```text
//! GEMINI_API_KEY=... cargo run -p summarize-profiles -- --config json
//! GEMINI_API_KEY=... cargo run -p summarize-profiles -- --file demos/configs/profiles.json
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use profile_summarizer::agent::{MODEL_KEY, NormalizeOptions, ProfileRecord, ProfileSummarizer};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(author, version, about = "Summarize profile records with a config-driven agent")]
struct Args {
    /// `yaml`, `json`, or a path to any config file.
    #[arg(long, default_value = "yaml")]
    config: String,

    /// Directory holding the `yaml` / `json` shortcut configs.
    #[arg(long, default_value = "demos/configs")]
    config_dir: PathBuf,

    /// Override `model_name` from the chosen config.
    #[arg(long)]
    model: Option<String>,

    /// Profile file: JSON (object or list of objects) or `key: value` text.
    #[arg(long)]
    file: Option<PathBuf>,
}

impl Args {
    fn config_path(&self) -> PathBuf {
        match self.config.to_lowercase().as_str() {
            "yaml" => self.config_dir.join("config.yaml"),
            "json" => self.config_dir.join("config.json"),
            _ => PathBuf::from(&self.config),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let args = Args::parse();
    let config_path = args.config_path();

    let mut config = profile_summarizer::load(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    if let Some(model) = &args.model {
        info!(model = %model, "overriding model from command line");
        config.insert(MODEL_KEY, model.as_str());
    }

    let mut agent = ProfileSummarizer::from_config(&config)?;

    match &args.file {
        Some(path) => queue_file(&mut agent, path)?,
        None => queue_demo_profiles(&mut agent),
    }

    let summary = agent.process().await?;
    println!("\n=== PROFILE SUMMARY ===\n");
    println!("{summary}");
    Ok(())
}

fn queue_file(agent: &mut ProfileSummarizer, path: &Path) -> Result<()> {
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        let count = agent.append_input_from_json(path, NormalizeOptions::default())?;
        info!(count, path = %path.display(), "queued JSON profiles");
    } else {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading profile {}", path.display()))?;
        agent.append_input(ProfileRecord::from_text(&text));
    }
    Ok(())
}

fn queue_demo_profiles(agent: &mut ProfileSummarizer) {
    agent.append_input(
        ProfileRecord::new()
            .with("first_name", "Layla")
            .with("gender", "female")
            .with("age", 28)
            .with("location", "Dubai, UAE")
            .with("role", "Sr. Front-End Engineer")
            .with("company", "FinTechX")
            .with("years_in_role", 3)
            .with("hobbies", vec!["kickboxing", "food blogging"])
            .with("goals", "lead a cross-functional UI guild"),
    );
    agent.append_input(
        ProfileRecord::new()
            .with("first_name", "Kai")
            .with("gender", "nonbinary")
            .with("age", 34)
            .with("pronouns", "they/them")
            .with("location", "Berlin, Germany")
            .with("role", "Product Manager")
            .with("industry", "ClimateTech")
            .with("hobbies", vec!["bouldering", "analog photography"])
            .with("goals", "scale carbon-offset API to EU market"),
    );
    agent.append_input(
        ProfileRecord::new()
            .with("first_name", "María")
            .with("age", 41)
            .with("location", "Mexico City")
            .with("role", "Head of Marketing")
            .with("company", "EduSoft LATAM")
            .with("languages", vec!["Spanish", "English"])
            .with("recent_win", "closed $1 M partnership with UNAM"),
    );
}
