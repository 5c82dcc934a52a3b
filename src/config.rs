//! Configuration for the generation client and the dialogue session.
//!
//! Both structs have sensible defaults and deserialize with every field
//! optional, so a host can load them from whatever format it already uses.

use serde::Deserialize;
use std::time::Duration;

/// How the client talks to the generation service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationMode {
    /// Request a newline-delimited JSON stream and report every delta.
    #[default]
    Streaming,
    /// Request a single JSON body; one synthetic delta carries the whole reply.
    Blocking,
}

/// Configuration for [`crate::client::StreamingReplyClient`].
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Full URL of the generate endpoint.
    pub endpoint: String,
    /// Model name sent with every request.
    pub model: String,
    /// Streaming or single-body responses.
    pub mode: GenerationMode,
    /// Optional whole-request deadline. `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:11434/api/generate".to_string(),
            model: "llama3:8b".to_string(),
            mode: GenerationMode::Streaming,
            timeout: None,
        }
    }
}

/// Configuration for [`crate::session::DialogueSession`].
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DialogueConfig {
    /// Persona looked up at the start of every turn.
    pub character_id: String,
    /// Reveal speed at a speech rate of 1.0.
    pub chars_per_second: f32,
    /// Floor applied to a persona's speech rate.
    pub min_speech_rate: f32,
    /// Label animated while waiting for the first fragment.
    pub thinking_label: String,
    /// Time between thinking-indicator frames.
    pub thinking_interval: Duration,
}

impl Default for DialogueConfig {
    fn default() -> Self {
        Self {
            character_id: "default".to_string(),
            chars_per_second: 40.0,
            min_speech_rate: 0.01,
            thinking_label: "Thinking".to_string(),
            thinking_interval: Duration::from_millis(300),
        }
    }
}

impl DialogueConfig {
    /// Reveal rate for a persona speaking at `speech_rate`.
    pub fn reveal_rate(&self, speech_rate: f32) -> f32 {
        self.chars_per_second * speech_rate.max(self.min_speech_rate)
    }
}
