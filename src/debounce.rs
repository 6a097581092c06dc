//! Coalescing timer for editor refreshes and config saves.
//!
//! Rapid edits (ticking checkboxes, dragging rows) each schedule work; only
//! the last one survives, and it runs once the delay has passed without a
//! newer request. The owner polls [`Debouncer::tick`] from its event loop:
//!
//! ```ignore
//! save.schedule(config.clone());
//! // later, in the update loop:
//! if let Some(config) = save.tick() {
//!     manager.save(&config)?;
//! }
//! ```

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay: Duration,
    /// Pending payload and the instant it becomes due.
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedule `payload`, replacing any pending one and restarting the delay.
    pub fn schedule(&mut self, payload: T) {
        self.schedule_at(payload, Instant::now());
    }

    pub fn schedule_at(&mut self, payload: T, now: Instant) {
        self.pending = Some((payload, now + self.delay));
        tracing::trace!("Debouncer: scheduled in {}ms", self.delay.as_millis());
    }

    pub fn cancel(&mut self) {
        if self.pending.take().is_some() {
            tracing::trace!("Debouncer: cancelled pending run");
        }
    }

    /// Payload, once its delay has elapsed. Clears the pending state.
    pub fn tick(&mut self) -> Option<T> {
        self.tick_at(Instant::now())
    }

    pub fn tick_at(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((_, due)) if now >= *due => self.pending.take().map(|(payload, _)| payload),
            _ => None,
        }
    }

    /// Pending payload right away, due or not.
    pub fn flush(&mut self) -> Option<T> {
        self.pending.take().map(|(payload, _)| payload)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}
