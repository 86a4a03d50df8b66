// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Deadline bookkeeping for the deferred idle evaluation.
//!
//! The hardware alarm only knows when to fire. Whether that expiry still
//! means anything is tracked here: a cancel clears the deadline, so an
//! expiry that was already in flight when the link went active is
//! recognized and dropped.

use crate::hil::time::Ticks32;

/// Idle timeout used when the caller does not pass a deadline.
pub const DEFAULT_IDLE_TIMEOUT_MS: u32 = 3;

/// Outcome of [`IdleTimer::request`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rearm {
    /// A later deadline is already pending and stays in force.
    Keep,
    /// The alarm must be (re)armed for this deadline.
    Arm(Ticks32),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IdleTimer {
    deadline: Option<Ticks32>,
    last_cancel: Option<Ticks32>,
}

impl IdleTimer {
    pub const fn new() -> IdleTimer {
        IdleTimer {
            deadline: None,
            last_cancel: None,
        }
    }

    /// Deadline of the pending evaluation, if one is armed.
    pub fn deadline(&self) -> Option<Ticks32> {
        self.deadline
    }

    /// When the link last went active and cancelled the evaluation.
    pub fn last_cancel(&self) -> Option<Ticks32> {
        self.last_cancel
    }

    /// Drops the pending deadline. Returns whether one was pending.
    pub fn cancel(&mut self, now: Ticks32) -> bool {
        self.last_cancel = Some(now);
        self.deadline.take().is_some()
    }

    /// Asks for an evaluation at `deadline`. A pending deadline that lies
    /// strictly later wins; anything else is replaced.
    pub fn request(&mut self, deadline: Ticks32) -> Rearm {
        match self.deadline {
            Some(pending) if pending.is_after(deadline) => Rearm::Keep,
            _ => {
                self.deadline = Some(deadline);
                Rearm::Arm(deadline)
            }
        }
    }

    /// Consumes the deadline when the alarm fires. Returns `false` for an
    /// expiry that was cancelled after it had already fired.
    pub fn expire(&mut self) -> bool {
        self.deadline.take().is_some()
    }
}
