//! Crate-wide error type.

use thiserror::Error;

/// Errors produced by the dialogue core.
///
/// Most of these never reach the conversational surface: transport and
/// decoding failures are downgraded to partial replies inside the client,
/// and speech failures to "no audio". They are still typed so the
/// collaborators can report what went wrong through the log.
#[derive(Debug, Error)]
pub enum Error {
    /// The HTTP request could not be sent or the body could not be read.
    #[error("transport error: {0}")]
    Transport(String),

    /// The generation service answered with a non-success status.
    #[error("generation service returned status {0}")]
    Status(u16),

    /// A body could not be encoded or decoded as JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading from a response stream failed mid-way.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// No persona is registered under the configured character id.
    #[error("persona not found: {0}")]
    PersonaNotFound(String),

    /// An audio payload could not be parsed as RIFF/WAVE.
    #[error("WAV decoding failed: {0}")]
    Wav(#[from] hound::Error),

    /// A WAV file used a sample format other than 16-bit PCM.
    #[error("invalid WAV data: {0}")]
    InvalidWav(&'static str),

    /// The OS refused to spawn a worker thread.
    #[error("failed to spawn worker thread: {0}")]
    WorkerSpawn(#[source] std::io::Error),
}

impl From<ureq::Error> for Error {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::StatusCode(code) => Self::Status(code),
            ureq::Error::Io(io) => Self::Io(io),
            other => Self::Transport(other.to_string()),
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
