//! # Grommel
//!
//! Streaming NPC dialogue for games and interactive fiction.
//!
//! Grommel sends a player's line to a local text-generation server, decodes
//! the streamed reply incrementally, and paces its on-screen reveal so the
//! text never runs ahead of the character's synthesized voice.
//!
//! ## Core Concepts
//!
//! - **Incremental decoding**: newline-delimited JSON is framed from raw
//!   chunks and accumulated into cumulative snapshots
//! - **Latest-wins queue**: the network thread publishes snapshots, the
//!   presentation tick only ever reads the newest one
//! - **Audio gate**: the reveal is held until speech synthesis resolves,
//!   then catches up at a rate scaled by the persona's speech rate
//! - **Tick driven**: every presentation change happens in
//!   [`DialogueSession::tick`]; blocking calls run on worker threads
//!
//! ## Example
//!
//! ```rust,ignore
//! use grommel::{ClientConfig, DialogueConfig, DialogueSession, Persona, PersonaBook, StreamingReplyClient};
//! use std::sync::Arc;
//!
//! let client = StreamingReplyClient::new(&ClientConfig::default());
//! let personas: PersonaBook = [Persona::new("default", "Eliara", "A wandering herbalist.")]
//!     .into_iter()
//!     .collect();
//! let mut session = DialogueSession::new(DialogueConfig::default(), Arc::new(client), Arc::new(personas));
//!
//! session.submit_line("Good evening!")?;
//! loop {
//!     session.tick(frame_dt);
//!     draw(&session.current_visible_text());
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod actor;
pub mod client;
pub mod config;
pub mod error;
pub mod persona;
pub mod present;
pub mod prompt;
pub mod session;
pub mod speech;
pub mod stream;

// Re-exports for convenience
pub use actor::{ConversationTurn, DeltaQueue, ReplySnapshot, Tick, TickerActor, TurnPhase};
pub use client::{HttpTransport, ReplyGenerator, StreamingReplyClient, Transport};
pub use config::{ClientConfig, DialogueConfig, GenerationMode};
pub use error::{Error, Result};
pub use persona::{Persona, PersonaBook, PersonaSource};
pub use present::{AudioGate, RevealScheduler, ThinkingIndicator};
pub use prompt::{DefaultPromptBuilder, PromptBuilder};
pub use session::{DialogueSession, Submission};
pub use speech::{AudioClip, Synthesizer, Transcriber};
pub use stream::{DeltaDecoder, LineFramer};
