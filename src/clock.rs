//! Countdown clock with a one-shot expiry latch.
//!
//! The clock is seeded from server syncs and decremented once per externally
//! driven tick. Expiry is terminal: once latched it fires exactly once and no
//! later seed can resurrect the countdown short of a full page reload.

/// Result of one clock tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Time remains; the display was decremented.
    Counting,
    /// The countdown just reached zero. Reported exactly once; the caller
    /// must run the expiry side effect (forced logout navigation).
    Expired,
    /// Expiry already fired on an earlier tick.
    AlreadyExpired,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CountdownClock {
    remaining: f64,
    expired: bool,
}

impl CountdownClock {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the remaining time from an authoritative server value.
    ///
    /// Ignored after expiry: a stale or racing sync must not un-expire the
    /// session.
    pub fn seed(&mut self, seconds: f64) {
        if self.expired {
            tracing::debug!(seconds, "ignoring countdown seed after expiry");
            return;
        }
        self.remaining = seconds.max(0.0);
    }

    /// Advances the countdown by one second.
    pub fn tick(&mut self) -> TickOutcome {
        if self.remaining > 0.0 {
            self.remaining -= 1.0;
            return TickOutcome::Counting;
        }

        if !self.expired {
            self.expired = true;
            tracing::info!("countdown expired");
            return TickOutcome::Expired;
        }

        TickOutcome::AlreadyExpired
    }

    #[must_use]
    pub fn expired(&self) -> bool {
        self.expired
    }

    /// Whole seconds remaining, clamped at zero. Fractional server values are
    /// truncated toward zero.
    #[must_use]
    pub fn remaining_seconds(&self) -> u64 {
        if self.expired || self.remaining <= 0.0 {
            return 0;
        }
        self.remaining.floor() as u64
    }

    /// `HH:MM:SS` display string, zero-padded, clamped at `00:00:00`.
    #[must_use]
    pub fn display(&self) -> String {
        let total = self.remaining_seconds();
        let hours = total / 3600;
        let minutes = (total % 3600) / 60;
        let seconds = total % 60;
        format!("{hours:02}:{minutes:02}:{seconds:02}")
    }
}
