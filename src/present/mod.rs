//! Presentation-side state machines.
//!
//! Everything here is owned by the tick loop and never touched from the
//! network thread. Each component is advanced by `tick(dt)`:
//!
//! - [`RevealScheduler`] paces the visible reply text.
//! - [`AudioGate`] withholds the reveal until speech is ready.
//! - [`ThinkingIndicator`] animates while waiting for the first fragment.

mod gate;
mod reveal;
mod thinking;

pub use gate::AudioGate;
pub use reveal::RevealScheduler;
pub use thinking::ThinkingIndicator;
