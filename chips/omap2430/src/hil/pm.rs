// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Power management services provided by the SoC integration.

/// Power-domain constraints the controller places while a cable is attached.
pub trait PowerConstraints {
    /// Bounds the MPU wake-up latency in microseconds. `None` removes the
    /// bound.
    fn set_max_mpu_wakeup_lat(&self, latency_us: Option<u32>);

    /// Requests a minimum VDD1 operating performance point.
    fn set_vdd1_opp(&self, opp: u8);
}

/// Counts how many times the controller's power domain lost context.
pub trait ContextLossCounter {
    fn context_loss_count(&self) -> u32;
}

/// Functional clock of the controller.
pub trait ClockInterface {
    fn is_enabled(&self) -> bool;
    fn enable(&self);
    fn disable(&self);
}
