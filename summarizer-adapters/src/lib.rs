//! Text generation backends used by the profile summarizer.
//!
//! Backends implement the [`traits::ModelAdapter`] interface so callers can
//! swap the hosted model for a deterministic stand-in in tests.

#![warn(missing_docs, clippy::pedantic)]

pub mod gemini;
pub mod traits;

mod http_client;
