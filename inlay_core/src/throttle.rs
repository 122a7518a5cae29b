// Copyright 2026 the Inlay Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Trailing-edge rate limiting.
//!
//! [`RateLimiter`] keeps consecutive effective runs at least one window
//! apart. It owns no timer: [`attempt`](RateLimiter::attempt) tells the
//! caller whether to run now or when to arm a timer, and the caller reports
//! the timer firing with [`fire`](RateLimiter::fire).
//!
//! ```text
//!   attempt   attempt attempt attempt          fire
//!      │         │       │       │               │
//!      ▼         ▼       ▼       ▼               ▼
//!   RunNow   Scheduled  Coalesced ...        runs once
//!      ├──────────── window ───────────────────┤
//! ```

use crate::time::{Duration, HostTime};

/// Outcome of [`RateLimiter::attempt`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Attempt {
    /// The limiter is idle; run immediately.
    RunNow,
    /// A trailing run was scheduled; arm a timer for this time.
    Scheduled(HostTime),
    /// A trailing run is already scheduled for this time; nothing to do.
    Coalesced(HostTime),
}

/// A trailing-edge rate limiter.
#[derive(Clone, Copy, Debug)]
pub struct RateLimiter {
    window: Duration,
    last_run: Option<HostTime>,
    deadline: Option<HostTime>,
}

impl RateLimiter {
    /// Creates an idle limiter with the given minimum spacing between runs.
    #[must_use]
    pub const fn new(window: Duration) -> Self {
        Self {
            window,
            last_run: None,
            deadline: None,
        }
    }

    /// The minimum spacing between runs.
    #[must_use]
    pub const fn window(&self) -> Duration {
        self.window
    }

    /// When the scheduled trailing run is due, if one is scheduled.
    #[must_use]
    pub const fn deadline(&self) -> Option<HostTime> {
        self.deadline
    }

    /// Requests a run at `now`.
    ///
    /// Runs immediately when nothing has run within the last window and no
    /// trailing run is pending. Otherwise schedules (or reuses) a single
    /// trailing run at the window boundary.
    pub fn attempt(&mut self, now: HostTime) -> Attempt {
        if let Some(deadline) = self.deadline {
            return Attempt::Coalesced(deadline);
        }
        match self.last_run {
            Some(last) if now.saturating_duration_since(last) < self.window => {
                let deadline = last + self.window;
                self.deadline = Some(deadline);
                Attempt::Scheduled(deadline)
            }
            _ => {
                self.last_run = Some(now);
                Attempt::RunNow
            }
        }
    }

    /// Reports that the caller's timer fired at `now`.
    ///
    /// Returns `true` if the trailing run should execute; `false` if it was
    /// [canceled](Self::cancel) in the meantime.
    pub fn fire(&mut self, now: HostTime) -> bool {
        if self.deadline.take().is_some() {
            self.last_run = Some(now);
            true
        } else {
            false
        }
    }

    /// Drops any scheduled trailing run.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }
}
