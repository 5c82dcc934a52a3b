//! Thinking Indicator: "Thinking", "Thinking.", "Thinking..", "Thinking...".
//!
//! Runs from the moment a request is issued until the first generated
//! content arrives. It is advanced by the same tick as everything else,
//! so there is no separate timer to cancel.

use std::time::Duration;

/// Periodic idle animation.
#[derive(Debug, Clone)]
pub struct ThinkingIndicator {
    /// Label shown with zero dots.
    base: String,
    /// Time per animation frame.
    interval: Duration,
    /// Whether the animation is running.
    active: bool,
    /// Frames shown since start.
    tick_count: u64,
    /// Time accumulated toward the next frame.
    elapsed: Duration,
}

impl ThinkingIndicator {
    /// Create a stopped indicator.
    pub fn new(base: impl Into<String>, interval: Duration) -> Self {
        Self {
            base: base.into(),
            interval,
            active: false,
            tick_count: 0,
            elapsed: Duration::ZERO,
        }
    }

    /// Start (or restart) the animation from zero dots.
    pub fn start(&mut self) {
        self.active = true;
        self.tick_count = 0;
        self.elapsed = Duration::ZERO;
    }

    /// Stop the animation. Returns `false` if it was not running.
    pub fn stop(&mut self) -> bool {
        std::mem::replace(&mut self.active, false)
    }

    /// Advance the animation clock.
    pub fn tick(&mut self, dt: Duration) {
        if !self.active || self.interval.is_zero() {
            return;
        }
        self.elapsed += dt;
        while self.elapsed >= self.interval {
            self.elapsed -= self.interval;
            self.tick_count += 1;
        }
    }

    /// Whether the animation is running.
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Frames shown since the last start.
    pub const fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Current label, or `None` when stopped.
    #[allow(clippy::cast_possible_truncation)]
    pub fn label(&self) -> Option<String> {
        if !self.active {
            return None;
        }
        let dots = (self.tick_count % 4) as usize;
        Some(format!("{}{}", self.base, ".".repeat(dots)))
    }
}
