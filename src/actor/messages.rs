//! Message types exchanged between the network and presentation contexts.

use crate::speech::AudioClip;

/// Cumulative reply text at one point in time.
///
/// Snapshots supersede each other; only the newest one matters for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplySnapshot {
    /// Everything generated so far.
    pub full_text: String,
}

impl ReplySnapshot {
    /// Wrap a cumulative text.
    pub fn new(full_text: impl Into<String>) -> Self {
        Self { full_text: full_text.into() }
    }
}

/// One completed exchange, appended to history after the reply is final.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationTurn {
    /// What the player said.
    pub player_line: String,
    /// What the NPC answered.
    pub npc_reply: String,
}

impl ConversationTurn {
    /// Create a turn record.
    pub fn new(player_line: impl Into<String>, npc_reply: impl Into<String>) -> Self {
        Self {
            player_line: player_line.into(),
            npc_reply: npc_reply.into(),
        }
    }
}

/// Results posted by worker threads back to the presentation context.
///
/// Every event carries the turn number it belongs to so a late result
/// from an earlier turn can be recognised and dropped.
#[derive(Debug, Clone)]
pub enum TurnEvent {
    /// The generation call returned.
    ReplyFinished {
        /// Turn number.
        turn: u64,
        /// Final accumulated reply, possibly empty.
        reply: String,
    },

    /// The speech-synthesis attempt resolved.
    SpeechResolved {
        /// Turn number.
        turn: u64,
        /// Synthesized audio, or `None` when no audio is available.
        clip: Option<AudioClip>,
    },

    /// A transcription finished.
    Transcribed {
        /// Recognised text; empty means nothing was recognised.
        text: String,
    },
}

/// Where the current turn is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TurnPhase {
    /// No turn in progress; submissions are accepted.
    #[default]
    Idle,
    /// Request in flight, nothing generated yet.
    Thinking,
    /// Request in flight, content arriving, reveal held for audio.
    Streaming,
    /// Request finished, speech synthesis in flight, reveal held.
    AwaitingAudio,
    /// Gate released; text still revealing or audio still playing.
    Revealing,
}

impl TurnPhase {
    /// Whether a turn is in progress.
    pub const fn is_busy(self) -> bool {
        !matches!(self, Self::Idle)
    }

    /// Whether the network request is still outstanding.
    pub const fn is_requesting(self) -> bool {
        matches!(self, Self::Thinking | Self::Streaming)
    }
}
