//! Ticker Actor: fixed-cadence clock for the presentation loop.
//!
//! The dialogue session is driven by `tick(dt)` calls. Hosts that already
//! own a frame loop call it from there; hosts that don't can spawn this
//! actor and `select!` on its receiver alongside their own input channel.

use crate::error::{Error, Result};
use crossbeam_channel::{bounded, Receiver, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// A tick event sent at regular intervals.
#[derive(Debug, Clone, Copy)]
pub struct Tick {
    /// Frame number (monotonically increasing).
    pub frame: u64,
    /// Time elapsed since the ticker was started.
    pub elapsed: Duration,
    /// Time since the previous delivered tick.
    pub dt: Duration,
}

/// Ticker actor that generates regular timing events.
pub struct TickerActor {
    /// Handle to the ticker thread.
    handle: Option<JoinHandle<()>>,
    /// Flag to signal shutdown.
    shutdown: Arc<AtomicBool>,
    /// Receiver for tick events.
    tick_rx: Receiver<Tick>,
}

impl TickerActor {
    /// Spawn a ticker firing every `interval` (e.g. 16ms for ~60 FPS).
    pub fn spawn(interval: Duration) -> Result<Self> {
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_clone = shutdown.clone();

        // Small buffer: a slow consumer skips ticks instead of queueing them.
        let (tick_tx, tick_rx) = bounded(2);

        let handle = thread::Builder::new()
            .name("grommel-ticker".to_string())
            .spawn(move || {
                Self::run_loop(&tick_tx, &shutdown_clone, interval);
            })
            .map_err(Error::WorkerSpawn)?;

        Ok(Self {
            handle: Some(handle),
            shutdown,
            tick_rx,
        })
    }

    /// Get a reference to the tick receiver.
    ///
    /// ```ignore
    /// loop {
    ///     select! {
    ///         recv(lines) -> line => { session.submit_line(&line?)?; }
    ///         recv(ticker.receiver()) -> tick => {
    ///             session.tick(tick?.dt);
    ///             draw(&session.current_visible_text());
    ///         }
    ///     }
    /// }
    /// ```
    #[inline]
    pub const fn receiver(&self) -> &Receiver<Tick> {
        &self.tick_rx
    }

    /// Signal the ticker to shutdown.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    /// Wait for the ticker thread to finish.
    pub fn join(mut self) {
        self.shutdown();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }

    /// Main ticker loop.
    fn run_loop(tick_tx: &Sender<Tick>, shutdown: &AtomicBool, interval: Duration) {
        let start = Instant::now();
        let mut frame = 0u64;
        let mut next_tick = start + interval;
        let mut last_sent = start;

        loop {
            if shutdown.load(Ordering::Relaxed) {
                break;
            }

            let now = Instant::now();
            if now >= next_tick {
                let tick = Tick {
                    frame,
                    elapsed: now - start,
                    dt: now - last_sent,
                };

                // Dropped ticks fold their time into the next delivered `dt`.
                if tick_tx.try_send(tick).is_ok() {
                    last_sent = now;
                    frame += 1;
                }

                next_tick += interval;
                if next_tick < now {
                    next_tick = now + interval;
                }
            } else {
                let sleep_duration = next_tick - now;
                thread::sleep(sleep_duration.min(Duration::from_millis(1)));
            }
        }
    }
}

impl Drop for TickerActor {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticker_basic() {
        let ticker = TickerActor::spawn(Duration::from_millis(10)).unwrap();

        let tick = ticker.receiver().recv_timeout(Duration::from_millis(100));
        assert!(tick.is_ok());
        let tick = tick.unwrap();
        assert_eq!(tick.frame, 0);
        assert!(tick.dt >= Duration::from_millis(10));

        let tick2 = ticker.receiver().recv_timeout(Duration::from_millis(50));
        assert!(tick2.is_ok());

        ticker.join();
    }

    #[test]
    fn test_ticker_dt_covers_skipped_ticks() {
        let ticker = TickerActor::spawn(Duration::from_millis(5)).unwrap();

        // Let the two-slot buffer fill and force drops.
        thread::sleep(Duration::from_millis(60));
        let first = ticker.receiver().recv_timeout(Duration::from_millis(50)).unwrap();
        let second = ticker.receiver().recv_timeout(Duration::from_millis(50)).unwrap();
        let third = ticker.receiver().recv_timeout(Duration::from_millis(50)).unwrap();
        assert_eq!(second.frame, first.frame + 1);
        assert!(third.dt >= Duration::from_millis(20));

        ticker.join();
    }

    #[test]
    fn test_ticker_shutdown() {
        let ticker = TickerActor::spawn(Duration::from_millis(100)).unwrap();
        ticker.shutdown();

        thread::sleep(Duration::from_millis(50));
        ticker.join();
    }
}
