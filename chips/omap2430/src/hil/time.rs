// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Hardware agnostic interface for the one-shot alarm backing the idle timer.

use crate::ErrorCode;

/// A 32-bit wrapping tick count.
///
/// Comparisons are modular: a value is "after" another if it lies less than
/// half the counter range ahead of it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Ticks32(u32);

impl From<u32> for Ticks32 {
    fn from(val: u32) -> Self {
        Ticks32(val)
    }
}

impl Ticks32 {
    pub fn into_u32(self) -> u32 {
        self.0
    }

    pub fn wrapping_add(self, other: Self) -> Self {
        Ticks32(self.0.wrapping_add(other.0))
    }

    pub fn wrapping_sub(self, other: Self) -> Self {
        Ticks32(self.0.wrapping_sub(other.0))
    }

    /// Returns whether `self` is strictly later than `other`.
    pub fn is_after(self, other: Self) -> bool {
        (other.0.wrapping_sub(self.0) as i32) < 0
    }
}

/// Clock frequency in Hz, used to convert real time into ticks.
pub trait Frequency {
    fn frequency() -> u32;
}

/// 1KHz `Frequency`
#[derive(Debug)]
pub struct Freq1KHz;
impl Frequency for Freq1KHz {
    fn frequency() -> u32 {
        1000
    }
}

pub trait Time {
    type Frequency: Frequency;

    /// Returns the current time in hardware clock units.
    fn now(&self) -> Ticks32;

    /// Converts milliseconds into ticks of this clock, rounding down.
    fn ticks_from_ms(&self, ms: u32) -> Ticks32 {
        let ticks = (u64::from(ms) * u64::from(Self::Frequency::frequency())) / 1000;
        Ticks32(ticks as u32)
    }
}

/// A one-shot alarm that calls its [`AlarmClient`] once `reference + dt` has
/// passed.
pub trait Alarm<'a>: Time {
    fn set_alarm_client(&self, client: &'a dyn AlarmClient);

    /// Arms the alarm to fire `dt` ticks after `reference`, replacing any
    /// pending expiry.
    fn set_alarm(&self, reference: Ticks32, dt: Ticks32);

    /// Disarms the alarm.
    ///
    /// Returns `FAIL` if the alarm already expired and the callback can no
    /// longer be withdrawn; the client will still see one `alarm()`.
    fn disarm(&self) -> Result<(), ErrorCode>;
}

pub trait AlarmClient {
    /// Called once when an armed alarm expires.
    fn alarm(&self);
}
