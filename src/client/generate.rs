//! Streaming Reply Client: one request in, one final reply out.
//!
//! The client never fails a turn. A refused connection, a dropped stream or
//! an undecodable body all degrade to "whatever text arrived", which may be
//! the empty string. The reason is logged for the operator.

use super::transport::{GenerateRequest, HttpTransport, Transport};
use crate::actor::ConversationTurn;
use crate::config::{ClientConfig, GenerationMode};
use crate::persona::Persona;
use crate::prompt::{DefaultPromptBuilder, PromptBuilder};
use crate::stream;
use serde::Deserialize;

/// Text-generation capability used by the dialogue session.
pub trait ReplyGenerator: Send + Sync {
    /// Produce the NPC reply for `player_line`.
    ///
    /// `on_delta` receives cumulative snapshots of the reply in
    /// non-decreasing length order. Exactly one final value is returned,
    /// even when nothing was generated.
    fn generate(
        &self,
        persona: &Persona,
        history: &[ConversationTurn],
        player_line: &str,
        on_delta: &mut dyn FnMut(&str),
    ) -> String;
}

/// Single-body response of the non-streaming endpoint.
#[derive(Debug, Default, Deserialize)]
struct CompletionBody {
    #[serde(default)]
    response: Option<String>,
}

/// Generation client for an NDJSON `generate` endpoint.
pub struct StreamingReplyClient<T = HttpTransport> {
    /// Request delivery.
    transport: T,
    /// Model name sent with each request.
    model: String,
    /// Streaming or single-body.
    mode: GenerationMode,
    /// Persona/history framing.
    prompts: Box<dyn PromptBuilder>,
}

impl StreamingReplyClient<HttpTransport> {
    /// Create an HTTP client from configuration.
    pub fn new(config: &ClientConfig) -> Self {
        let transport = HttpTransport::new(config.endpoint.clone(), config.timeout);
        Self::with_transport(transport, config)
    }
}

impl<T: Transport> StreamingReplyClient<T> {
    /// Create a client over a custom transport.
    pub fn with_transport(transport: T, config: &ClientConfig) -> Self {
        Self {
            transport,
            model: config.model.clone(),
            mode: config.mode,
            prompts: Box::new(DefaultPromptBuilder),
        }
    }

    /// Replace the prompt builder.
    #[must_use]
    pub fn with_prompt_builder(mut self, prompts: impl PromptBuilder + 'static) -> Self {
        self.prompts = Box::new(prompts);
        self
    }

    /// Configured response mode.
    pub const fn mode(&self) -> GenerationMode {
        self.mode
    }

    /// Stream a completion for an already framed prompt.
    ///
    /// Returns the accumulated text when the stream reports completion or
    /// the connection ends, whichever comes first.
    pub fn generate_stream(&self, prompt: &str, on_delta: &mut dyn FnMut(&str)) -> String {
        let request = GenerateRequest { model: &self.model, prompt, stream: true };

        let body = match self.transport.send(&request) {
            Ok(body) => body,
            Err(err) => {
                tracing::warn!(error = %err, model = %self.model, "generation request failed");
                return String::new();
            }
        };

        let (text, read_error) = stream::decode_reader(body, on_delta);
        if let Some(err) = read_error {
            tracing::warn!(error = %err, chars = text.len(), "generation stream aborted, keeping partial reply");
        }
        text
    }

    /// Request a completion as a single JSON body.
    ///
    /// A body without a `response` field yields the empty string.
    pub fn generate_blocking(&self, prompt: &str) -> String {
        let request = GenerateRequest { model: &self.model, prompt, stream: false };

        let body = self.transport.send(&request).and_then(|body| {
            let parsed: CompletionBody = serde_json::from_reader(body)?;
            Ok(parsed)
        });

        match body {
            Ok(body) => body.response.unwrap_or_default(),
            Err(err) => {
                tracing::warn!(error = %err, model = %self.model, "generation request failed");
                String::new()
            }
        }
    }
}

impl<T: Transport> ReplyGenerator for StreamingReplyClient<T> {
    fn generate(
        &self,
        persona: &Persona,
        history: &[ConversationTurn],
        player_line: &str,
        on_delta: &mut dyn FnMut(&str),
    ) -> String {
        let prompt = self.prompts.build(persona, history, player_line);
        match self.mode {
            GenerationMode::Streaming => self.generate_stream(&prompt, on_delta),
            GenerationMode::Blocking => {
                let reply = self.generate_blocking(&prompt);
                if !reply.is_empty() {
                    on_delta(&reply);
                }
                reply
            }
        }
    }
}
