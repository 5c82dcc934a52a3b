//! Worker threads for the blocking external calls.
//!
//! Generation, synthesis and transcription all block. Each one runs on its
//! own named thread and reports back through a [`TurnEvent`] channel that
//! the tick loop drains. Nothing here touches presentation state.

use super::messages::{ConversationTurn, TurnEvent};
use super::queue::DeltaProducer;
use crate::client::ReplyGenerator;
use crate::error::{Error, Result};
use crate::persona::Persona;
use crate::speech::{Synthesizer, Transcriber};
use crossbeam_channel::Sender;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Handle to a running worker thread.
#[derive(Debug)]
pub struct Worker {
    /// Thread name, for logs.
    name: &'static str,
    /// Join handle; taken on join.
    handle: Option<JoinHandle<()>>,
}

impl Worker {
    /// Spawn `job` on a named thread.
    pub fn spawn<F>(name: &'static str, job: F) -> Result<Self>
    where
        F: FnOnce() + Send + 'static,
    {
        let handle = thread::Builder::new()
            .name(name.to_string())
            .spawn(job)
            .map_err(Error::WorkerSpawn)?;
        Ok(Self { name, handle: Some(handle) })
    }

    /// Thread name.
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Whether the thread has exited (normally or by panic).
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Wait for the thread to exit.
    pub fn join(mut self) {
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::error!(worker = self.name, "worker thread panicked");
            }
        }
    }
}

/// Inputs for one generation call. Owned copies: the network thread never
/// sees the session's live history.
#[derive(Debug, Clone)]
pub struct GenerationJob {
    /// Turn number.
    pub turn: u64,
    /// Persona for this turn.
    pub persona: Persona,
    /// History snapshot at submit time.
    pub history: Vec<ConversationTurn>,
    /// New player utterance.
    pub player_line: String,
}

/// Run a generation call, streaming snapshots into `deltas`.
pub fn spawn_generation(
    job: GenerationJob,
    generator: Arc<dyn ReplyGenerator>,
    deltas: DeltaProducer,
    events: Sender<TurnEvent>,
) -> Result<Worker> {
    Worker::spawn("grommel-generate", move || {
        let GenerationJob { turn, persona, history, player_line } = job;
        let mut on_delta = |full_text: &str| {
            deltas.push(full_text);
        };
        let reply = generator.generate(&persona, &history, &player_line, &mut on_delta);
        tracing::debug!(turn, chars = reply.len(), "generation finished");
        let _ = events.send(TurnEvent::ReplyFinished { turn, reply });
    })
}

/// Synthesize the final reply. Any failure resolves as "no audio".
pub fn spawn_speech(
    turn: u64,
    text: String,
    persona: &Persona,
    synthesizer: Arc<dyn Synthesizer>,
    events: Sender<TurnEvent>,
) -> Result<Worker> {
    let speaker = persona.speaker_id.clone();
    let rate = persona.speech_rate;
    Worker::spawn("grommel-speech", move || {
        let clip = match synthesizer.synthesize(&text, speaker.as_deref(), Some(rate)) {
            Ok(clip) => clip,
            Err(err) => {
                tracing::warn!(turn, error = %err, "speech synthesis failed, continuing without audio");
                None
            }
        };
        let _ = events.send(TurnEvent::SpeechResolved { turn, clip });
    })
}

/// Transcribe captured audio. Failures resolve as "nothing recognised".
pub fn spawn_transcription(
    samples: Vec<f32>,
    sample_rate: u32,
    transcriber: Arc<dyn Transcriber>,
    events: Sender<TurnEvent>,
) -> Result<Worker> {
    Worker::spawn("grommel-transcribe", move || {
        let text = transcriber.transcribe(&samples, sample_rate).unwrap_or_else(|err| {
            tracing::warn!(error = %err, "transcription failed");
            String::new()
        });
        let _ = events.send(TurnEvent::Transcribed { text });
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::DeltaQueue;
    use crate::speech::AudioClip;
    use crossbeam_channel::unbounded;
    use std::time::Duration;

    struct Echo;

    impl ReplyGenerator for Echo {
        fn generate(
            &self,
            _persona: &Persona,
            history: &[ConversationTurn],
            player_line: &str,
            on_delta: &mut dyn FnMut(&str),
        ) -> String {
            let reply = format!("{}:{player_line}", history.len());
            on_delta(&reply[..1]);
            on_delta(&reply);
            reply
        }
    }

    struct Broken;

    impl Synthesizer for Broken {
        fn synthesize(&self, _: &str, _: Option<&str>, _: Option<f32>) -> Result<Option<AudioClip>> {
            Err(Error::Transport("engine offline".into()))
        }
    }

    #[test]
    fn test_generation_worker_reports_reply_and_deltas() {
        let queue = DeltaQueue::new();
        let (tx, rx) = unbounded();
        let job = GenerationJob {
            turn: 7,
            persona: Persona::new("default", "Eliara", ""),
            history: vec![ConversationTurn::new("a", "b")],
            player_line: "hey".into(),
        };

        let worker = spawn_generation(job, Arc::new(Echo), queue.producer(), tx).unwrap();
        assert_eq!(worker.name(), "grommel-generate");

        match rx.recv_timeout(Duration::from_secs(2)).unwrap() {
            TurnEvent::ReplyFinished { turn, reply } => {
                assert_eq!(turn, 7);
                assert_eq!(reply, "1:hey");
            }
            other => panic!("unexpected event {other:?}"),
        }
        worker.join();
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.drain_latest().unwrap().full_text, "1:hey");
    }

    #[test]
    fn test_speech_failure_resolves_without_audio() {
        let (tx, rx) = unbounded();
        let persona = Persona::new("default", "Eliara", "");
        let worker = spawn_speech(3, "hello".into(), &persona, Arc::new(Broken), tx).unwrap();

        match rx.recv_timeout(Duration::from_secs(2)).unwrap() {
            TurnEvent::SpeechResolved { turn, clip } => {
                assert_eq!(turn, 3);
                assert!(clip.is_none());
            }
            other => panic!("unexpected event {other:?}"),
        }
        worker.join();
    }
}
