//! Audio Gate: holds the reveal until the turn's speech result arrives.
//!
//! Text and voice should start together. The gate is closed before the
//! request goes out and opened once the paired synthesis attempt resolves,
//! whether or not it produced audio. Text arrival alone never opens it.

/// Boolean gate owned by the presentation context.
#[derive(Debug, Clone, Default)]
pub struct AudioGate {
    held: bool,
}

impl AudioGate {
    /// Create an open gate.
    pub const fn new() -> Self {
        Self { held: false }
    }

    /// Close the gate for a new turn.
    pub fn hold(&mut self) {
        self.held = true;
        tracing::debug!("audio gate held");
    }

    /// Open the gate. Returns `false` if it was already open.
    pub fn release(&mut self) -> bool {
        if !self.held {
            return false;
        }
        self.held = false;
        tracing::debug!("audio gate released");
        true
    }

    /// Whether reveal progress is currently suppressed.
    pub const fn is_held(&self) -> bool {
        self.held
    }
}
