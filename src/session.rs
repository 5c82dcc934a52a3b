//! Dialogue Session: one NPC conversation, driven by the host's tick.
//!
//! The session is the outbound surface for a UI layer:
//!
//! - [`DialogueSession::submit_line`] starts a turn.
//! - [`DialogueSession::tick`] advances everything; call it every frame.
//! - [`DialogueSession::current_visible_text`] is what to draw.
//! - [`DialogueSession::is_busy`] gates the input box.
//!
//! # Turn lifecycle
//!
//! ```text
//! Idle ─submit─▶ Thinking ─first fragment─▶ Streaming ─reply final─▶ AwaitingAudio
//!                   │                                                    │
//!                   └──── empty reply (no audio requested) ───┐    speech resolved
//!                                                              ▼         ▼
//! Idle ◀──── reveal complete and audio finished ──────────── Revealing
//! ```
//!
//! All presentation state lives here and is only touched from `tick` and
//! `submit_line`. Worker threads communicate exclusively through the
//! delta queue and the event channel.

use crate::actor::{
    spawn_generation, spawn_speech, spawn_transcription, ConversationTurn, DeltaQueue,
    GenerationJob, TurnEvent, TurnPhase, Worker,
};
use crate::client::ReplyGenerator;
use crate::config::DialogueConfig;
use crate::error::Result;
use crate::persona::{Persona, PersonaSource};
use crate::present::{AudioGate, RevealScheduler, ThinkingIndicator};
use crate::speech::{AudioClip, Synthesizer, Transcriber};
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::borrow::Cow;
use std::sync::Arc;
use std::time::Duration;

/// Outcome of a submission attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    /// A new turn started.
    Started {
        /// Turn number.
        turn: u64,
    },
    /// Nothing happened: a turn is already running or the line was blank.
    Ignored,
}

/// Per-turn data kept while the turn runs.
#[derive(Debug)]
struct ActiveTurn {
    persona: Persona,
    player_line: String,
}

/// A conversation with one NPC.
pub struct DialogueSession {
    /// Configuration.
    config: DialogueConfig,
    /// Text generation backend.
    generator: Arc<dyn ReplyGenerator>,
    /// Speech synthesis backend, if any.
    synthesizer: Option<Arc<dyn Synthesizer>>,
    /// Speech recognition backend, if any.
    transcriber: Option<Arc<dyn Transcriber>>,
    /// Persona lookup.
    personas: Arc<dyn PersonaSource>,
    /// Snapshots from the generation worker.
    queue: DeltaQueue,
    /// Worker results.
    events_tx: Sender<TurnEvent>,
    events_rx: Receiver<TurnEvent>,
    /// Presentation state.
    reveal: RevealScheduler,
    gate: AudioGate,
    thinking: ThinkingIndicator,
    /// Lifecycle.
    phase: TurnPhase,
    turn: u64,
    active: Option<ActiveTurn>,
    history: Vec<ConversationTurn>,
    /// Running workers.
    generation: Option<Worker>,
    speech: Option<Worker>,
    transcription: Option<Worker>,
    /// Workers whose result has arrived, joined once their thread exits.
    retired: Vec<Worker>,
    /// Clip waiting for the host to play it.
    audio: Option<AudioClip>,
    /// Playback time left for the current clip.
    audio_remaining: Duration,
}

impl DialogueSession {
    /// Create a session without speech backends.
    pub fn new(
        config: DialogueConfig,
        generator: Arc<dyn ReplyGenerator>,
        personas: Arc<dyn PersonaSource>,
    ) -> Self {
        let (events_tx, events_rx) = unbounded();
        let thinking = ThinkingIndicator::new(config.thinking_label.clone(), config.thinking_interval);
        let reveal = RevealScheduler::new(config.chars_per_second);

        Self {
            config,
            generator,
            synthesizer: None,
            transcriber: None,
            personas,
            queue: DeltaQueue::new(),
            events_tx,
            events_rx,
            reveal,
            gate: AudioGate::new(),
            thinking,
            phase: TurnPhase::Idle,
            turn: 0,
            active: None,
            history: Vec::new(),
            generation: None,
            speech: None,
            transcription: None,
            retired: Vec::new(),
            audio: None,
            audio_remaining: Duration::ZERO,
        }
    }

    /// Attach a speech synthesizer.
    #[must_use]
    pub fn with_synthesizer(mut self, synthesizer: Arc<dyn Synthesizer>) -> Self {
        self.synthesizer = Some(synthesizer);
        self
    }

    /// Attach a speech recognizer.
    #[must_use]
    pub fn with_transcriber(mut self, transcriber: Arc<dyn Transcriber>) -> Self {
        self.transcriber = Some(transcriber);
        self
    }

    /// Start a turn for `line`.
    ///
    /// Ignored while a turn is running or when `line` is blank. A missing
    /// persona aborts before anything is sent; the session stays idle.
    pub fn submit_line(&mut self, line: &str) -> Result<Submission> {
        if self.phase.is_busy() {
            tracing::debug!(phase = ?self.phase, "submit ignored, turn in progress");
            return Ok(Submission::Ignored);
        }
        if line.trim().is_empty() {
            return Ok(Submission::Ignored);
        }

        let persona = match self.personas.require(&self.config.character_id) {
            Ok(persona) => persona,
            Err(err) => {
                tracing::error!(error = %err, "cannot start turn");
                return Err(err);
            }
        };

        let turn = self.turn + 1;
        self.queue.clear();
        self.reveal.reset(self.config.reveal_rate(persona.speech_rate));
        self.audio = None;
        self.audio_remaining = Duration::ZERO;
        self.gate.hold();
        self.thinking.start();

        let job = GenerationJob {
            turn,
            persona: persona.clone(),
            history: self.history.clone(),
            player_line: line.to_string(),
        };
        match spawn_generation(job, Arc::clone(&self.generator), self.queue.producer(), self.events_tx.clone()) {
            Ok(worker) => self.generation = Some(worker),
            Err(err) => {
                tracing::error!(error = %err, "cannot start turn");
                self.thinking.stop();
                self.gate.release();
                return Err(err);
            }
        }

        self.turn = turn;
        self.active = Some(ActiveTurn {
            persona,
            player_line: line.to_string(),
        });
        self.phase = TurnPhase::Thinking;
        tracing::debug!(turn, "turn started");
        Ok(Submission::Started { turn })
    }

    /// Transcribe captured speech and submit it as a line once recognised.
    ///
    /// Returns `false` when there is no recognizer, a turn is running, or a
    /// transcription is already pending.
    pub fn submit_speech(&mut self, samples: Vec<f32>, sample_rate: u32) -> Result<bool> {
        let Some(transcriber) = self.transcriber.as_ref() else {
            tracing::warn!("speech submitted but no transcriber is configured");
            return Ok(false);
        };
        if self.phase.is_busy() || self.transcription.is_some() {
            return Ok(false);
        }

        let worker = spawn_transcription(samples, sample_rate, Arc::clone(transcriber), self.events_tx.clone())?;
        self.transcription = Some(worker);
        Ok(true)
    }

    /// Advance the session by `dt`. Never blocks.
    pub fn tick(&mut self, dt: Duration) {
        // Sampled before draining: a worker that has exited has already sent its event.
        let generation_exited = self.generation.as_ref().is_some_and(Worker::is_finished);
        let speech_exited = self.speech.as_ref().is_some_and(Worker::is_finished);
        let transcription_exited = self.transcription.as_ref().is_some_and(Worker::is_finished);

        self.reveal.tick(dt, &self.queue, &self.gate);
        if self.phase == TurnPhase::Thinking && self.reveal.has_content() {
            self.on_first_content();
        }

        let events: Vec<TurnEvent> = self.events_rx.try_iter().collect();
        for event in events {
            self.handle_event(event);
        }

        if generation_exited && self.phase.is_requesting() {
            tracing::error!(turn = self.turn, "generation worker exited without a reply");
            self.finish_request(String::new());
        }
        if speech_exited && self.phase == TurnPhase::AwaitingAudio {
            tracing::error!(turn = self.turn, "speech worker exited without a result");
            self.resolve_audio(None);
        }
        if transcription_exited {
            if let Some(worker) = self.transcription.take() {
                self.retire(worker);
            }
        }
        self.reap_workers();

        self.thinking.tick(dt);

        if self.phase == TurnPhase::Revealing {
            self.audio_remaining = self.audio_remaining.saturating_sub(dt);
            if self.queue.is_empty() && self.reveal.is_complete() && self.audio_remaining.is_zero() {
                self.finish_turn();
            }
        }
    }

    /// Text the host should display right now.
    ///
    /// The thinking label replaces the reply while it is animating.
    pub fn current_visible_text(&self) -> Cow<'_, str> {
        match self.thinking.label() {
            Some(label) => Cow::Owned(label),
            None => Cow::Borrowed(self.reveal.visible_text()),
        }
    }

    /// Whether a turn is in progress.
    pub const fn is_busy(&self) -> bool {
        self.phase.is_busy()
    }

    /// Current lifecycle phase.
    pub const fn phase(&self) -> TurnPhase {
        self.phase
    }

    /// Number of the latest turn (0 before the first).
    pub const fn turn(&self) -> u64 {
        self.turn
    }

    /// Completed exchanges, oldest first.
    pub fn history(&self) -> &[ConversationTurn] {
        &self.history
    }

    /// Take the synthesized clip for playback. Yields it once per turn.
    pub fn take_audio(&mut self) -> Option<AudioClip> {
        self.audio.take()
    }

    /// Whether the thinking indicator is animating.
    pub const fn is_thinking(&self) -> bool {
        self.thinking.is_active()
    }

    /// Whether the reveal is held for audio.
    pub const fn is_held(&self) -> bool {
        self.gate.is_held()
    }

    fn handle_event(&mut self, event: TurnEvent) {
        match event {
            TurnEvent::ReplyFinished { turn, reply } => {
                if turn == self.turn && self.phase.is_requesting() {
                    self.finish_request(reply);
                } else {
                    tracing::debug!(turn, current = self.turn, "dropping stale reply");
                }
            }
            TurnEvent::SpeechResolved { turn, clip } => {
                if turn == self.turn && self.phase == TurnPhase::AwaitingAudio {
                    self.resolve_audio(clip);
                } else {
                    tracing::debug!(turn, current = self.turn, "dropping stale speech result");
                }
            }
            TurnEvent::Transcribed { text } => {
                if let Some(worker) = self.transcription.take() {
                    self.retire(worker);
                }
                let text = text.trim();
                if text.is_empty() {
                    tracing::debug!("no speech recognised");
                    return;
                }
                if let Err(err) = self.submit_line(text) {
                    tracing::warn!(error = %err, "transcribed line was not submitted");
                }
            }
        }
    }

    fn on_first_content(&mut self) {
        if self.thinking.stop() {
            tracing::debug!(turn = self.turn, "first content arrived");
        }
        self.phase = TurnPhase::Streaming;
    }

    /// The network call returned: record the turn and request speech.
    fn finish_request(&mut self, reply: String) {
        if let Some(worker) = self.generation.take() {
            self.retire(worker);
        }
        let Some(active) = self.active.as_ref() else {
            return;
        };
        let persona = active.persona.clone();
        self.history
            .push(ConversationTurn::new(active.player_line.clone(), reply.clone()));

        if reply.trim().is_empty() {
            tracing::warn!(turn = self.turn, "generation produced no text");
            self.thinking.stop();
            self.resolve_audio(None);
            return;
        }

        if self.phase == TurnPhase::Thinking {
            self.on_first_content();
        }
        // The final reply supersedes every queued snapshot.
        self.queue.clear();
        self.reveal.park(reply.clone());

        let Some(synthesizer) = self.synthesizer.as_ref() else {
            self.resolve_audio(None);
            return;
        };
        match spawn_speech(self.turn, reply, &persona, Arc::clone(synthesizer), self.events_tx.clone()) {
            Ok(worker) => {
                self.speech = Some(worker);
                self.phase = TurnPhase::AwaitingAudio;
            }
            Err(err) => {
                tracing::warn!(error = %err, "speech synthesis unavailable");
                self.resolve_audio(None);
            }
        }
    }

    /// The speech attempt resolved (or was never made): open the gate.
    fn resolve_audio(&mut self, clip: Option<AudioClip>) {
        if let Some(worker) = self.speech.take() {
            self.retire(worker);
        }
        self.audio_remaining = clip.as_ref().map_or(Duration::ZERO, AudioClip::duration);
        self.audio = clip;
        self.gate.release();
        self.phase = TurnPhase::Revealing;
    }

    fn retire(&mut self, worker: Worker) {
        self.retired.push(worker);
    }

    /// Join retired workers whose thread has exited. Never waits.
    fn reap_workers(&mut self) {
        let (exited, running): (Vec<Worker>, Vec<Worker>) =
            std::mem::take(&mut self.retired).into_iter().partition(Worker::is_finished);
        self.retired = running;
        for worker in exited {
            worker.join();
        }
    }

    fn finish_turn(&mut self) {
        self.active = None;
        self.phase = TurnPhase::Idle;
        tracing::debug!(turn = self.turn, "turn complete");
    }
}
