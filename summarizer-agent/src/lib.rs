//! Profile summarizer agent.
//!
//! Queue free-form profile records, render them into a deterministic text
//! block, call a text generation backend once and strip the scaffolding it
//! echoes back.
//!
//! ```no_run
//! use summarizer_agent::{ProfileRecord, ProfileSummarizer};
//!
//! # async fn run() -> summarizer_agent::SummarizerResult<()> {
//! let mut agent = ProfileSummarizer::from_config_file("configs/config.json")?;
//! agent.append_input(ProfileRecord::new().with("first_name", "Layla").with("age", 28));
//! println!("{}", agent.process().await?);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs, clippy::pedantic)]

mod agent;
mod error;
mod profile;
mod render;

/// Agent and the settings it is built from.
pub use agent::{MODEL_KEY, PROMPT_KEY, ProfileSummarizer, SummarizerSettings, TEMPERATURE_KEY};
/// Error type and result alias for summarizer operations.
pub use error::{SummarizerError, SummarizerResult};
/// Profile records and their ingestion helpers.
pub use profile::{NormalizeOptions, ProfileRecord, ProfileValue, RAW_TEXT_LIMIT, read_json_records};
/// Rendering and post-processing helpers.
pub use render::{compose_prompt, extract_summary, render_block};
