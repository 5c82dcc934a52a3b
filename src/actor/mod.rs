//! Actor Model: message passing between the network and presentation contexts.
//!
//! Blocking work runs on short-lived worker threads; the host's tick loop
//! owns all presentation state and only ever polls channels:
//!
//! ```text
//! ┌────────────────────┐   ReplySnapshot    ┌──────────────────┐
//! │ Generation Worker  │ ─────────────────▶ │                  │
//! └────────────────────┘   (DeltaQueue)     │                  │
//!          │                                │    Tick Loop     │
//!          │ TurnEvent::ReplyFinished       │ (DialogueSession)│
//!          └──────────────────────────────▶ │                  │
//! ┌────────────────────┐ TurnEvent::Speech… │                  │
//! │   Speech Worker    │ ─────────────────▶ │                  │
//! └────────────────────┘                    └──────────────────┘
//!                                                   ▲
//! ┌────────────────────┐        Tick                │
//! │   Ticker Thread    │ ───────────────────────────┘
//! └────────────────────┘
//! ```

mod messages;
mod queue;
mod ticker;
mod worker;

pub use messages::{ConversationTurn, ReplySnapshot, TurnEvent, TurnPhase};
pub use queue::{DeltaProducer, DeltaQueue};
pub use ticker::{Tick, TickerActor};
pub use worker::{spawn_generation, spawn_speech, spawn_transcription, GenerationJob, Worker};
