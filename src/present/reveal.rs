//! Reveal Scheduler: paces the visible part of the reply.
//!
//! A leaky bucket converts elapsed time into characters. Fractional
//! progress is carried between ticks, so the reveal speed does not depend
//! on frame rate. The cursor counts grapheme clusters, which keeps emoji
//! and combining marks intact while they appear.

use super::gate::AudioGate;
use crate::actor::DeltaQueue;
use std::time::Duration;
use unicode_segmentation::UnicodeSegmentation;

/// Per-tick reveal state machine.
#[derive(Debug, Clone, Default)]
pub struct RevealScheduler {
    /// Latest known full text.
    target: String,
    /// Byte offset just past each grapheme of `target`.
    boundaries: Vec<usize>,
    /// Graphemes currently visible.
    visible: usize,
    /// Sub-character progress carried to the next tick.
    carry: f64,
    /// Characters per second.
    rate: f64,
    /// Newest snapshot drained while the gate was held.
    pending: Option<String>,
}

impl RevealScheduler {
    /// Create a scheduler revealing `rate` characters per second.
    pub fn new(rate: f32) -> Self {
        Self {
            rate: f64::from(rate.max(0.0)),
            ..Self::default()
        }
    }

    /// Clear all text and progress for a new turn.
    pub fn reset(&mut self, rate: f32) {
        *self = Self::new(rate);
    }

    /// Change the reveal rate, keeping the current carry.
    pub fn set_rate(&mut self, rate: f32) {
        self.rate = f64::from(rate.max(0.0));
    }

    /// Current rate in characters per second.
    #[allow(clippy::cast_possible_truncation)]
    pub fn rate(&self) -> f32 {
        self.rate as f32
    }

    /// Replace the target text.
    ///
    /// The visible cursor is clamped down if the new text is shorter; it is
    /// never moved forward here.
    pub fn set_target(&mut self, text: String) {
        self.boundaries = text
            .grapheme_indices(true)
            .map(|(start, g)| start + g.len())
            .collect();
        self.target = text;
        self.visible = self.visible.min(self.boundaries.len());
    }

    /// Park `text` as the next target. It replaces the current target on the
    /// first tick with the gate open, unless a newer snapshot arrives first.
    pub fn park(&mut self, text: String) {
        self.pending = Some(text);
    }

    /// Advance the cursor by `dt` worth of characters. Returns how many became visible.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn advance(&mut self, dt: Duration) -> usize {
        self.carry += dt.as_secs_f64() * self.rate;
        let whole = self.carry.floor();
        if whole < 1.0 {
            return 0;
        }
        self.carry -= whole;

        let before = self.visible;
        let step = if whole >= usize::MAX as f64 { usize::MAX } else { whole as usize };
        self.visible = self.visible.saturating_add(step).min(self.boundaries.len());
        self.visible - before
    }

    /// Run one presentation tick.
    ///
    /// While `gate` is held the queue is still drained, but the newest
    /// snapshot is parked and nothing visible changes. Once the gate is
    /// open the parked or newly drained text becomes the target and the
    /// cursor advances.
    pub fn tick(&mut self, dt: Duration, queue: &DeltaQueue, gate: &AudioGate) -> &str {
        let latest = queue.drain_latest().map(|snapshot| snapshot.full_text);

        if gate.is_held() {
            if latest.is_some() {
                self.pending = latest;
            }
            return self.visible_text();
        }

        if let Some(text) = latest.or_else(|| self.pending.take()) {
            self.pending = None;
            self.set_target(text);
        }

        self.advance(dt);
        self.visible_text()
    }

    /// Text revealed so far.
    pub fn visible_text(&self) -> &str {
        match self.visible {
            0 => "",
            n => &self.target[..self.boundaries[n - 1]],
        }
    }

    /// Full target text.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Visible length in grapheme clusters.
    pub const fn visible_count(&self) -> usize {
        self.visible
    }

    /// Target length in grapheme clusters.
    pub fn target_len(&self) -> usize {
        self.boundaries.len()
    }

    /// Whether any non-empty text has arrived, shown or parked.
    pub fn has_content(&self) -> bool {
        !self.target.is_empty() || self.pending.as_deref().is_some_and(|text| !text.is_empty())
    }

    /// Whether every character of the target is visible and nothing is parked.
    pub fn is_complete(&self) -> bool {
        self.pending.is_none() && self.visible == self.boundaries.len()
    }
}
